//! Storage seams for the provinces feature.
//!
//! Services talk to these traits only. The PostgreSQL implementations run
//! either on the pool or on a unit of work's transaction; the in-memory
//! implementation backs the unit tests.

mod city_repository;
#[cfg(test)]
pub mod memory;
mod province_repository;
mod unit_of_work;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::query::Criteria;
use crate::core::transaction::Transactional;
use crate::features::provinces::models::{
    City, NewCity, NewProvince, Province, ProvinceColumn, ProvinceDraft,
};
use crate::shared::types::PageRequest;

pub use city_repository::PgCityRepository;
pub use province_repository::PgProvinceRepository;
pub use unit_of_work::PgUnitOfWorkFactory;

#[async_trait]
pub trait ProvinceRepository: Send + Sync {
    async fn select_by_criteria(&self, criteria: &Criteria<ProvinceColumn>)
        -> Result<Vec<Province>>;

    /// Every province, ordered by id
    async fn select_all(&self) -> Result<Vec<Province>>;

    /// One page of provinces ordered by id, plus the total row count
    async fn select_page(&self, page: PageRequest) -> Result<(Vec<Province>, i64)>;

    async fn select_by_id(&self, id: i32) -> Result<Option<Province>>;

    /// Returns the number of rows removed
    async fn delete_by_id(&self, id: i32) -> Result<u64>;

    async fn insert(&self, province: &NewProvince) -> Result<Province>;

    /// Overwrite only the `Some` fields of `draft`; `None` when no row has `id`
    async fn update_selective(&self, id: i32, draft: &ProvinceDraft) -> Result<Option<Province>>;
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn insert(&self, province_id: i32, city: &NewCity) -> Result<City>;

    async fn select_by_province_id(&self, province_id: i32) -> Result<Vec<City>>;
}

/// A transaction with repositories bound to it
pub trait ProvinceUnitOfWork: Transactional {
    fn provinces(&self) -> &dyn ProvinceRepository;

    fn cities(&self) -> &dyn CityRepository;
}

#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ProvinceUnitOfWork>>;
}
