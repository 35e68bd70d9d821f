use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::Result;
use crate::core::query::{Condition, Criteria, SortDir};
use crate::core::transaction::{self, CommitMode, TxOutcome};
use crate::features::provinces::dtos::ProvinceListQuery;
use crate::features::provinces::models::{
    City, NewCity, NewProvince, Province, ProvinceColumn, ProvinceDraft, ProvinceWithCities,
};
use crate::features::provinces::repositories::{
    CityRepository, PgCityRepository, PgProvinceRepository, PgUnitOfWorkFactory,
    ProvinceRepository, ProvinceUnitOfWork, UnitOfWorkFactory,
};
use crate::shared::types::{Listing, PageRequest};

/// Provinces whose name contains "江" and whose code contains "X", plus
/// "山东", plus the codes XJ and SC; highest code first, then lowest id.
pub(crate) fn conditional_criteria() -> Criteria<ProvinceColumn> {
    Criteria::new()
        .filter(Condition::any([
            Condition::all([
                Condition::contains(ProvinceColumn::ProvinceName, "江"),
                Condition::contains(ProvinceColumn::ProvinceCode, "X"),
            ]),
            Condition::eq(ProvinceColumn::ProvinceName, "山东"),
            Condition::is_in(ProvinceColumn::ProvinceCode, ["XJ", "SC"]),
        ]))
        .order_by(ProvinceColumn::ProvinceCode, SortDir::Desc)
        .order_by(ProvinceColumn::Id, SortDir::Asc)
}

/// Service for provinces and the cities they own
pub struct ProvinceService {
    provinces: Arc<dyn ProvinceRepository>,
    cities: Arc<dyn CityRepository>,
    unit_of_work: Arc<dyn UnitOfWorkFactory>,
}

impl ProvinceService {
    pub fn new(pool: PgPool) -> Self {
        Self::with_repositories(
            Arc::new(PgProvinceRepository::new(pool.clone())),
            Arc::new(PgCityRepository::new(pool.clone())),
            Arc::new(PgUnitOfWorkFactory::new(pool)),
        )
    }

    pub fn with_repositories(
        provinces: Arc<dyn ProvinceRepository>,
        cities: Arc<dyn CityRepository>,
        unit_of_work: Arc<dyn UnitOfWorkFactory>,
    ) -> Self {
        Self {
            provinces,
            cities,
            unit_of_work,
        }
    }

    /// Run the fixed conditional search
    pub async fn get_by_conditional(&self) -> Result<Vec<Province>> {
        let provinces = self
            .provinces
            .select_by_criteria(&conditional_criteria())
            .await?;
        tracing::debug!("Conditional search matched {} provinces", provinces.len());
        Ok(provinces)
    }

    /// List provinces, paginated only when both `page` and `rows` are given
    pub async fn get_all(&self, query: &ProvinceListQuery) -> Result<Listing<Province>> {
        match PageRequest::from_parts(query.page, query.rows) {
            Some(page) => {
                let (items, total) = self.provinces.select_page(page).await?;
                Ok(Listing::paged(items, total))
            }
            None => Ok(Listing::unpaged(self.provinces.select_all().await?)),
        }
    }

    /// Absent rows are `None`, not an error
    pub async fn get_by_id(&self, id: i32) -> Result<Option<Province>> {
        self.provinces.select_by_id(id).await
    }

    /// Deleting a missing id is a no-op
    pub async fn delete_by_id(&self, id: i32) -> Result<()> {
        let removed = self.provinces.delete_by_id(id).await?;
        if removed > 0 {
            tracing::info!("Province deleted: id={}", id);
        } else {
            tracing::debug!("Province delete matched nothing: id={}", id);
        }
        Ok(())
    }

    /// Selective update when `id` is set, insert otherwise.
    ///
    /// Returns `None` only when updating an id that does not exist.
    pub async fn save(&self, draft: ProvinceDraft) -> Result<Option<Province>> {
        match draft.id {
            Some(id) => {
                let updated = self.provinces.update_selective(id, &draft).await?;
                if updated.is_some() {
                    tracing::info!("Province updated: id={}", id);
                }
                Ok(updated)
            }
            None => {
                let province = self.provinces.insert(&draft.into()).await?;
                tracing::info!(
                    "Province created: id={}, code={:?}",
                    province.id,
                    province.province_code
                );
                Ok(Some(province))
            }
        }
    }

    /// Insert a province and its cities as one unit of work.
    ///
    /// With `CommitMode::RollbackOnly` every write is undone and the call
    /// still returns `Ok(TxOutcome::RolledBack(..))`. Any failing step rolls
    /// everything back and returns that step's error.
    pub async fn save_province_and_cities(
        &self,
        province: NewProvince,
        cities: Vec<NewCity>,
        mode: CommitMode,
    ) -> Result<TxOutcome<ProvinceWithCities>> {
        let mut uow = self.unit_of_work.begin().await?;

        let result = Self::write_province_and_cities(uow.as_ref(), &province, &cities).await;
        if result.is_ok() && mode == CommitMode::RollbackOnly {
            uow.set_rollback_only();
        }

        let outcome = transaction::complete(uow, result).await?;
        let saved = match &outcome {
            TxOutcome::Committed(saved) | TxOutcome::RolledBack(saved) => saved,
        };
        tracing::info!(
            "Province with cities {}: province_id={}, cities={}",
            if outcome.is_committed() {
                "committed"
            } else {
                "rolled back"
            },
            saved.province.id,
            saved.cities.len()
        );

        Ok(outcome)
    }

    async fn write_province_and_cities(
        uow: &dyn ProvinceUnitOfWork,
        province: &NewProvince,
        cities: &[NewCity],
    ) -> Result<ProvinceWithCities> {
        // Full read kept for parity with the legacy save path; the rows are unused
        let existing = uow.provinces().select_all().await?;
        tracing::debug!("Provinces before insert: {}", existing.len());

        let province = uow.provinces().insert(province).await?;

        let mut saved: Vec<City> = Vec::with_capacity(cities.len());
        for city in cities {
            saved.push(uow.cities().insert(province.id, city).await?);
        }

        Ok(ProvinceWithCities {
            province,
            cities: saved,
        })
    }

    /// Cities owned by a province, oldest first
    pub async fn list_cities(&self, province_id: i32) -> Result<Vec<City>> {
        self.cities.select_by_province_id(province_id).await
    }
}
