use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::Result;
use crate::core::transaction::{PgTransaction, Transactional};
use crate::features::provinces::repositories::{
    CityRepository, PgCityRepository, PgProvinceRepository, ProvinceRepository,
    ProvinceUnitOfWork, UnitOfWorkFactory,
};

pub struct PgUnitOfWorkFactory {
    pool: PgPool,
}

impl PgUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn ProvinceUnitOfWork>> {
        let tx = PgTransaction::begin(&self.pool).await?;
        Ok(Box::new(PgUnitOfWork::new(tx)))
    }
}

/// Province and city repositories sharing one transaction.
///
/// Dropping it without `commit` rolls the transaction back.
pub struct PgUnitOfWork {
    tx: PgTransaction,
    provinces: PgProvinceRepository,
    cities: PgCityRepository,
}

impl PgUnitOfWork {
    fn new(tx: PgTransaction) -> Self {
        Self {
            provinces: PgProvinceRepository::with_executor(tx.executor()),
            cities: PgCityRepository::with_executor(tx.executor()),
            tx,
        }
    }
}

#[async_trait]
impl Transactional for PgUnitOfWork {
    fn set_rollback_only(&mut self) {
        self.tx.set_rollback_only();
    }

    fn is_rollback_only(&self) -> bool {
        self.tx.is_rollback_only()
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        Box::new(this.tx).commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let this = *self;
        Box::new(this.tx).rollback().await
    }
}

impl ProvinceUnitOfWork for PgUnitOfWork {
    fn provinces(&self) -> &dyn ProvinceRepository {
        &self.provinces
    }

    fn cities(&self) -> &dyn CityRepository {
        &self.cities
    }
}
