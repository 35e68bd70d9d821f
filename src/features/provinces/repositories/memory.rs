//! In-memory repositories with the same observable semantics as PostgreSQL:
//! NULL never matches a predicate, NULLs sort as the largest value, cities
//! need an existing province, and a unit of work stages its writes on a copy
//! of the store that only replaces the shared state on commit.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::core::query::{Condition, Criteria, SortDir};
use crate::core::transaction::Transactional;
use crate::features::provinces::models::{
    City, NewCity, NewProvince, Province, ProvinceColumn, ProvinceDraft,
};
use crate::features::provinces::repositories::{
    CityRepository, ProvinceRepository, ProvinceUnitOfWork, UnitOfWorkFactory,
};
use crate::shared::types::PageRequest;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    provinces: BTreeMap<i32, Province>,
    cities: BTreeMap<i32, City>,
    last_province_id: i32,
    last_city_id: i32,
}

#[derive(Debug, Default)]
struct Faults {
    city_code: Option<String>,
}

type SharedState = Arc<Mutex<MemoryState>>;
type SharedFaults = Arc<Mutex<Faults>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn storage_error(message: String) -> AppError {
    AppError::Database(sqlx::Error::Protocol(message))
}

/// Handle to one in-memory database
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: SharedState,
    faults: SharedFaults,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn province_repository(&self) -> MemoryProvinceRepository {
        MemoryProvinceRepository {
            state: Arc::clone(&self.state),
        }
    }

    pub fn city_repository(&self) -> MemoryCityRepository {
        MemoryCityRepository {
            state: Arc::clone(&self.state),
            faults: Arc::clone(&self.faults),
        }
    }

    pub fn unit_of_work_factory(&self) -> MemoryUnitOfWorkFactory {
        MemoryUnitOfWorkFactory {
            shared: Arc::clone(&self.state),
            faults: Arc::clone(&self.faults),
        }
    }

    /// Make every city insert carrying this code fail with a storage error
    pub fn fail_city_inserts_with_code(&self, code: &str) {
        lock(&self.faults).city_code = Some(code.to_string());
    }

    pub fn provinces(&self) -> Vec<Province> {
        lock(&self.state).provinces.values().cloned().collect()
    }

    pub fn cities(&self) -> Vec<City> {
        lock(&self.state).cities.values().cloned().collect()
    }
}

// ==================== Predicate evaluation ====================

fn column_text(province: &Province, column: ProvinceColumn) -> Option<String> {
    match column {
        ProvinceColumn::Id => Some(province.id.to_string()),
        ProvinceColumn::ProvinceName => province.province_name.clone(),
        ProvinceColumn::ProvinceCode => province.province_code.clone(),
    }
}

pub fn evaluate(condition: &Condition<ProvinceColumn>, province: &Province) -> bool {
    match condition {
        Condition::Contains(column, needle) => {
            column_text(province, *column).is_some_and(|v| v.contains(needle.as_str()))
        }
        Condition::Eq(column, value) => column_text(province, *column).as_ref() == Some(value),
        Condition::In(column, values) => {
            column_text(province, *column).is_some_and(|v| values.contains(&v))
        }
        Condition::All(conditions) => conditions.iter().all(|c| evaluate(c, province)),
        Condition::Any(conditions) => conditions.iter().any(|c| evaluate(c, province)),
    }
}

fn compare_column(a: &Province, b: &Province, column: ProvinceColumn) -> Ordering {
    if let ProvinceColumn::Id = column {
        return a.id.cmp(&b.id);
    }
    match (column_text(a, column), column_text(b, column)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn apply_criteria(state: &MemoryState, criteria: &Criteria<ProvinceColumn>) -> Vec<Province> {
    let mut rows: Vec<Province> = state
        .provinces
        .values()
        .filter(|p| criteria.condition.as_ref().map_or(true, |c| evaluate(c, p)))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        criteria
            .order
            .iter()
            .map(|key| {
                let ord = compare_column(a, b, key.column);
                match key.dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

// ==================== Repositories ====================

pub struct MemoryProvinceRepository {
    state: SharedState,
}

#[async_trait]
impl ProvinceRepository for MemoryProvinceRepository {
    async fn select_by_criteria(
        &self,
        criteria: &Criteria<ProvinceColumn>,
    ) -> Result<Vec<Province>> {
        Ok(apply_criteria(&lock(&self.state), criteria))
    }

    async fn select_all(&self) -> Result<Vec<Province>> {
        Ok(lock(&self.state).provinces.values().cloned().collect())
    }

    async fn select_page(&self, page: PageRequest) -> Result<(Vec<Province>, i64)> {
        let state = lock(&self.state);
        let rows = state
            .provinces
            .values()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok((rows, state.provinces.len() as i64))
    }

    async fn select_by_id(&self, id: i32) -> Result<Option<Province>> {
        Ok(lock(&self.state).provinces.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: i32) -> Result<u64> {
        let mut state = lock(&self.state);
        if state.cities.values().any(|c| c.province_id == id) {
            return Err(storage_error(format!(
                "foreign key violation: province {} is still referenced by cities",
                id
            )));
        }
        Ok(u64::from(state.provinces.remove(&id).is_some()))
    }

    async fn insert(&self, province: &NewProvince) -> Result<Province> {
        let mut state = lock(&self.state);
        state.last_province_id += 1;
        let now = Utc::now();
        let row = Province {
            id: state.last_province_id,
            province_name: province.province_name.clone(),
            province_code: province.province_code.clone(),
            created_at: now,
            updated_at: now,
        };
        state.provinces.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_selective(&self, id: i32, draft: &ProvinceDraft) -> Result<Option<Province>> {
        let mut state = lock(&self.state);
        let Some(row) = state.provinces.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &draft.province_name {
            row.province_name = Some(name.clone());
        }
        if let Some(code) = &draft.province_code {
            row.province_code = Some(code.clone());
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

pub struct MemoryCityRepository {
    state: SharedState,
    faults: SharedFaults,
}

#[async_trait]
impl CityRepository for MemoryCityRepository {
    async fn insert(&self, province_id: i32, city: &NewCity) -> Result<City> {
        if let (Some(code), Some(failing)) = (&city.city_code, &lock(&self.faults).city_code) {
            if code == failing {
                return Err(storage_error(format!("injected failure for city {}", code)));
            }
        }

        let mut state = lock(&self.state);
        if !state.provinces.contains_key(&province_id) {
            return Err(storage_error(format!(
                "foreign key violation: province {} does not exist",
                province_id
            )));
        }

        state.last_city_id += 1;
        let row = City {
            id: state.last_city_id,
            province_id,
            city_name: city.city_name.clone(),
            city_code: city.city_code.clone(),
            created_at: Utc::now(),
        };
        state.cities.insert(row.id, row.clone());
        Ok(row)
    }

    async fn select_by_province_id(&self, province_id: i32) -> Result<Vec<City>> {
        Ok(lock(&self.state)
            .cities
            .values()
            .filter(|c| c.province_id == province_id)
            .cloned()
            .collect())
    }
}

// ==================== Unit of work ====================

pub struct MemoryUnitOfWorkFactory {
    shared: SharedState,
    faults: SharedFaults,
}

#[async_trait]
impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn ProvinceUnitOfWork>> {
        let staged: SharedState = Arc::new(Mutex::new(lock(&self.shared).clone()));

        Ok(Box::new(MemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            provinces: MemoryProvinceRepository {
                state: Arc::clone(&staged),
            },
            cities: MemoryCityRepository {
                state: Arc::clone(&staged),
                faults: Arc::clone(&self.faults),
            },
            staged,
            rollback_only: false,
        }))
    }
}

/// Writes land in `staged` and replace `shared` wholesale on commit (single writer)
pub struct MemoryUnitOfWork {
    shared: SharedState,
    staged: SharedState,
    provinces: MemoryProvinceRepository,
    cities: MemoryCityRepository,
    rollback_only: bool,
}

#[async_trait]
impl Transactional for MemoryUnitOfWork {
    fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let staged = lock(&self.staged).clone();
        *lock(&self.shared) = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

impl ProvinceUnitOfWork for MemoryUnitOfWork {
    fn provinces(&self) -> &dyn ProvinceRepository {
        &self.provinces
    }

    fn cities(&self) -> &dyn CityRepository {
        &self.cities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_province(name: &str, code: &str) -> NewProvince {
        NewProvince {
            province_name: Some(name.to_string()),
            province_code: Some(code.to_string()),
        }
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let uow = store.unit_of_work_factory().begin().await.unwrap();

        let province = uow.provinces().insert(&new_province("山东", "SD")).await.unwrap();
        assert!(store.provinces().is_empty());
        assert_eq!(
            uow.provinces().select_by_id(province.id).await.unwrap(),
            Some(province.clone())
        );

        uow.commit().await.unwrap();
        assert_eq!(store.provinces(), vec![province]);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryStore::new();
        let uow = store.unit_of_work_factory().begin().await.unwrap();
        uow.provinces().insert(&new_province("山东", "SD")).await.unwrap();
        uow.rollback().await.unwrap();

        assert!(store.provinces().is_empty());
    }

    #[tokio::test]
    async fn test_city_requires_existing_province() {
        let store = MemoryStore::new();
        let result = store
            .city_repository()
            .insert(42, &NewCity::default())
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_nulls_sort_last_ascending() {
        let store = MemoryStore::new();
        let repo = store.province_repository();
        repo.insert(&NewProvince {
            province_name: Some("无代码".to_string()),
            province_code: None,
        })
        .await
        .unwrap();
        repo.insert(&new_province("四川", "SC")).await.unwrap();

        let asc = repo
            .select_by_criteria(
                &Criteria::new().order_by(ProvinceColumn::ProvinceCode, SortDir::Asc),
            )
            .await
            .unwrap();
        assert_eq!(asc.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);

        let desc = repo
            .select_by_criteria(
                &Criteria::new().order_by(ProvinceColumn::ProvinceCode, SortDir::Desc),
            )
            .await
            .unwrap();
        assert_eq!(desc.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
