use utoipa::{Modify, OpenApi};

use crate::features::provinces::{dtos as provinces_dtos, handlers as provinces_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        provinces_handlers::search_provinces,
        provinces_handlers::list_provinces,
        provinces_handlers::get_province,
        provinces_handlers::delete_province,
        provinces_handlers::save_province,
        provinces_handlers::save_province_with_cities,
        provinces_handlers::list_cities,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Provinces
            provinces_dtos::SaveProvinceDto,
            provinces_dtos::NewProvinceDto,
            provinces_dtos::NewCityDto,
            provinces_dtos::SaveProvinceWithCitiesDto,
            provinces_dtos::ProvinceResponseDto,
            provinces_dtos::CityResponseDto,
            provinces_dtos::ProvinceWithCitiesResponseDto,
            ApiResponse<provinces_dtos::ProvinceResponseDto>,
            ApiResponse<Vec<provinces_dtos::ProvinceResponseDto>>,
            ApiResponse<Vec<provinces_dtos::CityResponseDto>>,
            ApiResponse<provinces_dtos::ProvinceWithCitiesResponseDto>,
        )
    ),
    tags(
        (name = "provinces", description = "Provinces and their cities"),
    ),
    info(
        title = "Province Core API",
        version = "0.1.0",
        description = "API documentation for the province/city service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_province_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/provinces",
            "/api/provinces/conditional",
            "/api/provinces/with-cities",
            "/api/provinces/{id}",
            "/api/provinces/{id}/cities",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("desc"));
    }
}
