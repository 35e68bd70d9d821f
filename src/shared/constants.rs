/// Largest page size accepted from API callers
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number accepted from API callers
pub const MAX_PAGE: i64 = 1_000_000;

/// Column list shared by every province SELECT/RETURNING clause
pub const PROVINCE_COLUMNS: &str = "id, province_name, province_code, created_at, updated_at";

/// Column list shared by every city SELECT/RETURNING clause
pub const CITY_COLUMNS: &str = "id, province_id, city_name, city_code, created_at";
