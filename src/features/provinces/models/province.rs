use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::query::Column;

/// Province row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Province {
    pub id: i32,
    pub province_name: Option<String>,
    pub province_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filterable/sortable province columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvinceColumn {
    Id,
    ProvinceName,
    ProvinceCode,
}

impl Column for ProvinceColumn {
    fn name(self) -> &'static str {
        match self {
            ProvinceColumn::Id => "id",
            ProvinceColumn::ProvinceName => "province_name",
            ProvinceColumn::ProvinceCode => "province_code",
        }
    }
}

/// Input to an upsert: `id` selects update vs insert, `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvinceDraft {
    pub id: Option<i32>,
    pub province_name: Option<String>,
    pub province_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProvince {
    pub province_name: Option<String>,
    pub province_code: Option<String>,
}

impl From<ProvinceDraft> for NewProvince {
    fn from(draft: ProvinceDraft) -> Self {
        Self {
            province_name: draft.province_name,
            province_code: draft.province_code,
        }
    }
}
