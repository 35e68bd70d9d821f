use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::core::transaction::CommitMode;
use crate::features::provinces::dtos::{
    CityResponseDto, ProvinceListQuery, ProvinceResponseDto, ProvinceWithCitiesResponseDto,
    SaveProvinceDto, SaveProvinceWithCitiesDto,
};
use crate::features::provinces::services::ProvinceService;
use crate::shared::types::{ApiResponse, Meta};

/// Conditional province search
///
/// Provinces whose name contains "江" and whose code contains "X", the
/// province named "山东", and the provinces coded XJ or SC, ordered by code
/// descending and then id ascending.
#[utoipa::path(
    get,
    path = "/api/provinces/conditional",
    responses(
        (status = 200, description = "Matching provinces", body = ApiResponse<Vec<ProvinceResponseDto>>)
    ),
    tag = "provinces"
)]
pub async fn search_provinces(
    State(service): State<Arc<ProvinceService>>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    let provinces = service.get_by_conditional().await?;
    let dtos: Vec<ProvinceResponseDto> = provinces.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// List provinces, paginated when both `page` and `rows` are given
#[utoipa::path(
    get,
    path = "/api/provinces",
    params(ProvinceListQuery),
    responses(
        (status = 200, description = "List of provinces", body = ApiResponse<Vec<ProvinceResponseDto>>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "provinces"
)]
pub async fn list_provinces(
    State(service): State<Arc<ProvinceService>>,
    AppQuery(query): AppQuery<ProvinceListQuery>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = service.get_all(&query).await?;
    let dtos: Vec<ProvinceResponseDto> = listing.items.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta {
            total: listing.total,
        }),
    )))
}

/// Get a province by id
#[utoipa::path(
    get,
    path = "/api/provinces/{id}",
    params(
        ("id" = i32, Path, description = "Province id")
    ),
    responses(
        (status = 200, description = "Province details", body = ApiResponse<ProvinceResponseDto>),
        (status = 404, description = "Province not found")
    ),
    tag = "provinces"
)]
pub async fn get_province(
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProvinceResponseDto>>> {
    let province = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Province with id {} not found", id)))?;
    Ok(Json(ApiResponse::success(
        Some(province.into()),
        None,
        None,
    )))
}

/// Delete a province by id (no-op when it does not exist)
#[utoipa::path(
    delete,
    path = "/api/provinces/{id}",
    params(
        ("id" = i32, Path, description = "Province id")
    ),
    responses(
        (status = 200, description = "Province deleted (or never existed)", body = ApiResponse<()>)
    ),
    tag = "provinces"
)]
pub async fn delete_province(
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Province deleted".to_string()),
        None,
    )))
}

/// Create a province, or selectively update it when `id` is present
#[utoipa::path(
    post,
    path = "/api/provinces",
    request_body = SaveProvinceDto,
    responses(
        (status = 200, description = "Province saved", body = ApiResponse<ProvinceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Province to update not found")
    ),
    tag = "provinces"
)]
pub async fn save_province(
    State(service): State<Arc<ProvinceService>>,
    AppJson(dto): AppJson<SaveProvinceDto>,
) -> Result<Json<ApiResponse<ProvinceResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = dto.id;
    let province = service.save(dto.into()).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Province with id {} not found",
            id.unwrap_or_default()
        ))
    })?;
    Ok(Json(ApiResponse::success(
        Some(province.into()),
        Some("Province saved".to_string()),
        None,
    )))
}

/// Save a province and its cities atomically
///
/// With `rollbackOnly` the writes are performed and then rolled back; the
/// response still succeeds and reports `committed: false`.
#[utoipa::path(
    post,
    path = "/api/provinces/with-cities",
    request_body = SaveProvinceWithCitiesDto,
    responses(
        (status = 200, description = "Province and cities saved or rolled back", body = ApiResponse<ProvinceWithCitiesResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "provinces"
)]
pub async fn save_province_with_cities(
    State(service): State<Arc<ProvinceService>>,
    AppJson(dto): AppJson<SaveProvinceWithCitiesDto>,
) -> Result<Json<ApiResponse<ProvinceWithCitiesResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mode = if dto.rollback_only {
        CommitMode::RollbackOnly
    } else {
        CommitMode::Commit
    };
    let cities = dto.cities.into_iter().map(Into::into).collect();

    let outcome = service
        .save_province_and_cities(dto.province.into(), cities, mode)
        .await?;
    let committed = outcome.is_committed();
    let message = if committed {
        "Province and cities saved"
    } else {
        "Province and cities rolled back"
    };

    Ok(Json(ApiResponse::success(
        Some(ProvinceWithCitiesResponseDto::new(
            outcome.into_inner(),
            committed,
        )),
        Some(message.to_string()),
        None,
    )))
}

/// List the cities of a province
#[utoipa::path(
    get,
    path = "/api/provinces/{id}/cities",
    params(
        ("id" = i32, Path, description = "Province id")
    ),
    responses(
        (status = 200, description = "Cities of the province", body = ApiResponse<Vec<CityResponseDto>>)
    ),
    tag = "provinces"
)]
pub async fn list_cities(
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<CityResponseDto>>>> {
    let cities = service.list_cities(id).await?;
    let dtos: Vec<CityResponseDto> = cities.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}
