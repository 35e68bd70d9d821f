use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::Result;
use crate::core::transaction::PgExecutor;
use crate::features::provinces::models::{City, NewCity};
use crate::features::provinces::repositories::CityRepository;
use crate::shared::constants::CITY_COLUMNS;

pub struct PgCityRepository {
    executor: PgExecutor,
}

impl PgCityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_executor(PgExecutor::Pool(pool))
    }

    pub fn with_executor(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CityRepository for PgCityRepository {
    async fn insert(&self, province_id: i32, city: &NewCity) -> Result<City> {
        let sql = format!(
            "INSERT INTO cities (province_id, city_name, city_code) VALUES ($1, $2, $3) RETURNING {}",
            CITY_COLUMNS
        );

        self.executor
            .fetch_one(
                sqlx::query_as::<_, City>(&sql)
                    .bind(province_id)
                    .bind(city.city_name.as_deref())
                    .bind(city.city_code.as_deref()),
            )
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to insert city for province {}: {:?}", province_id, e)
            })
    }

    async fn select_by_province_id(&self, province_id: i32) -> Result<Vec<City>> {
        let sql = format!(
            "SELECT {} FROM cities WHERE province_id = $1 ORDER BY id ASC",
            CITY_COLUMNS
        );

        self.executor
            .fetch_all(sqlx::query_as::<_, City>(&sql).bind(province_id))
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to fetch cities for province {}: {:?}", province_id, e)
            })
    }
}
