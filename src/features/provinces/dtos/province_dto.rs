use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::provinces::models::{
    City, NewCity, NewProvince, Province, ProvinceDraft, ProvinceWithCities,
};
use crate::shared::constants::{MAX_PAGE, MAX_PAGE_SIZE};

/// Query parameters for listing provinces
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceListQuery {
    /// Page number (1-indexed); paginates only together with `rows`
    #[validate(range(min = 1, max = MAX_PAGE, message = "page must be between 1 and 1000000"))]
    #[param(minimum = 1, maximum = 1_000_000, example = 1)]
    pub page: Option<i64>,

    /// Page size; paginates only together with `page`
    #[validate(range(min = 1, max = MAX_PAGE_SIZE, message = "rows must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub rows: Option<i64>,
}

/// Request DTO for creating (no id) or selectively updating (with id) a province
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProvinceDto {
    /// Existing province id; omit to create a new province
    pub id: Option<i32>,

    #[validate(length(max = 64, message = "Province name must not exceed 64 characters"))]
    pub province_name: Option<String>,

    #[validate(length(max = 16, message = "Province code must not exceed 16 characters"))]
    pub province_code: Option<String>,
}

impl From<SaveProvinceDto> for ProvinceDraft {
    fn from(dto: SaveProvinceDto) -> Self {
        Self {
            id: dto.id,
            province_name: dto.province_name,
            province_code: dto.province_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProvinceDto {
    #[validate(length(max = 64, message = "Province name must not exceed 64 characters"))]
    pub province_name: Option<String>,

    #[validate(length(max = 16, message = "Province code must not exceed 16 characters"))]
    pub province_code: Option<String>,
}

impl From<NewProvinceDto> for NewProvince {
    fn from(dto: NewProvinceDto) -> Self {
        Self {
            province_name: dto.province_name,
            province_code: dto.province_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCityDto {
    #[validate(length(max = 64, message = "City name must not exceed 64 characters"))]
    pub city_name: Option<String>,

    #[validate(length(max = 16, message = "City code must not exceed 16 characters"))]
    pub city_code: Option<String>,
}

impl From<NewCityDto> for NewCity {
    fn from(dto: NewCityDto) -> Self {
        Self {
            city_name: dto.city_name,
            city_code: dto.city_code,
        }
    }
}

/// Request DTO for saving a province together with its cities in one transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProvinceWithCitiesDto {
    #[validate(nested)]
    pub province: NewProvinceDto,

    #[validate(nested)]
    #[serde(default)]
    pub cities: Vec<NewCityDto>,

    /// Roll the whole save back after the writes succeed (dry run)
    #[serde(default)]
    pub rollback_only: bool,
}

/// Response DTO for province data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceResponseDto {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Province> for ProvinceResponseDto {
    fn from(province: Province) -> Self {
        Self {
            id: province.id,
            province_name: province.province_name,
            province_code: province.province_code,
            created_at: province.created_at,
            updated_at: province.updated_at,
        }
    }
}

/// Response DTO for city data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityResponseDto {
    pub id: i32,
    pub province_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<City> for CityResponseDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            province_id: city.province_id,
            city_name: city.city_name,
            city_code: city.city_code,
            created_at: city.created_at,
        }
    }
}

/// Response DTO for a province saved together with its cities
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceWithCitiesResponseDto {
    /// False when the save was rolled back; the ids below then no longer exist
    pub committed: bool,
    pub province: ProvinceResponseDto,
    pub cities: Vec<CityResponseDto>,
}

impl ProvinceWithCitiesResponseDto {
    pub fn new(saved: ProvinceWithCities, committed: bool) -> Self {
        Self {
            committed,
            province: saved.province.into(),
            cities: saved.cities.into_iter().map(Into::into).collect(),
        }
    }
}
