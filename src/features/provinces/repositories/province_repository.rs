use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::Result;
use crate::core::query::Criteria;
use crate::core::transaction::PgExecutor;
use crate::features::provinces::models::{NewProvince, Province, ProvinceColumn, ProvinceDraft};
use crate::features::provinces::repositories::ProvinceRepository;
use crate::shared::constants::PROVINCE_COLUMNS;
use crate::shared::types::PageRequest;

pub struct PgProvinceRepository {
    executor: PgExecutor,
}

impl PgProvinceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_executor(PgExecutor::Pool(pool))
    }

    pub fn with_executor(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ProvinceRepository for PgProvinceRepository {
    async fn select_by_criteria(
        &self,
        criteria: &Criteria<ProvinceColumn>,
    ) -> Result<Vec<Province>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM provinces", PROVINCE_COLUMNS));
        criteria.push_sql(&mut qb);
        tracing::debug!("Province criteria query: {}", qb.sql());

        self.executor
            .fetch_all(qb.build_query_as::<Province>())
            .await
            .inspect_err(|e| tracing::error!("Failed to query provinces by criteria: {:?}", e))
    }

    async fn select_all(&self) -> Result<Vec<Province>> {
        let sql = format!("SELECT {} FROM provinces ORDER BY id ASC", PROVINCE_COLUMNS);

        self.executor
            .fetch_all(sqlx::query_as::<_, Province>(&sql))
            .await
            .inspect_err(|e| tracing::error!("Failed to fetch provinces: {:?}", e))
    }

    async fn select_page(&self, page: PageRequest) -> Result<(Vec<Province>, i64)> {
        let (total,) = self
            .executor
            .fetch_one(sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM provinces"))
            .await
            .inspect_err(|e| tracing::error!("Failed to count provinces: {:?}", e))?;

        let sql = format!(
            "SELECT {} FROM provinces ORDER BY id ASC LIMIT $1 OFFSET $2",
            PROVINCE_COLUMNS
        );
        let provinces = self
            .executor
            .fetch_all(
                sqlx::query_as::<_, Province>(&sql)
                    .bind(page.limit())
                    .bind(page.offset()),
            )
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "Failed to fetch province page {} (rows {}): {:?}",
                    page.page,
                    page.rows,
                    e
                )
            })?;

        Ok((provinces, total))
    }

    async fn select_by_id(&self, id: i32) -> Result<Option<Province>> {
        let sql = format!("SELECT {} FROM provinces WHERE id = $1", PROVINCE_COLUMNS);

        self.executor
            .fetch_optional(sqlx::query_as::<_, Province>(&sql).bind(id))
            .await
            .inspect_err(|e| tracing::error!("Failed to fetch province {}: {:?}", id, e))
    }

    async fn delete_by_id(&self, id: i32) -> Result<u64> {
        let result = self
            .executor
            .execute(sqlx::query("DELETE FROM provinces WHERE id = $1").bind(id))
            .await
            .inspect_err(|e| tracing::error!("Failed to delete province {}: {:?}", id, e))?;

        Ok(result.rows_affected())
    }

    async fn insert(&self, province: &NewProvince) -> Result<Province> {
        let sql = format!(
            "INSERT INTO provinces (province_name, province_code) VALUES ($1, $2) RETURNING {}",
            PROVINCE_COLUMNS
        );

        self.executor
            .fetch_one(
                sqlx::query_as::<_, Province>(&sql)
                    .bind(province.province_name.as_deref())
                    .bind(province.province_code.as_deref()),
            )
            .await
            .inspect_err(|e| tracing::error!("Failed to insert province: {:?}", e))
    }

    async fn update_selective(&self, id: i32, draft: &ProvinceDraft) -> Result<Option<Province>> {
        let mut qb = update_selective_query(id, draft);

        self.executor
            .fetch_optional(qb.build_query_as::<Province>())
            .await
            .inspect_err(|e| tracing::error!("Failed to update province {}: {:?}", id, e))
    }
}

/// Only the `Some` fields are assigned; `updated_at` is always bumped.
fn update_selective_query(id: i32, draft: &ProvinceDraft) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE provinces SET ");
    let mut assignments = qb.separated(", ");
    if let Some(name) = &draft.province_name {
        assignments.push("province_name = ");
        assignments.push_bind_unseparated(name.clone());
    }
    if let Some(code) = &draft.province_code {
        assignments.push("province_code = ");
        assignments.push_bind_unseparated(code.clone());
    }
    assignments.push("updated_at = NOW()");

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" RETURNING ")
        .push(PROVINCE_COLUMNS);
    qb
}
