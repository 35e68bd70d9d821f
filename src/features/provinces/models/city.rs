use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::provinces::models::Province;

/// City row, owned by a province through `province_id`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct City {
    pub id: i32,
    pub province_id: i32,
    pub city_name: Option<String>,
    pub city_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCity {
    pub city_name: Option<String>,
    pub city_code: Option<String>,
}

/// A province together with the cities written alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceWithCities {
    pub province: Province,
    pub cities: Vec<City>,
}
