pub mod years;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::optional::deserialize_nullable;
use crate::models::common::{NamedRef, PaginationInfo, PaginationQuery, UserBrief};
use crate::models::documents::Document;

/// Фонд оценочных средств со связанными данными
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fos.ts")]
pub struct FosDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fos_type: NamedRef,
    pub discipline: NamedRef,
    /// Преподаватели дисциплины
    pub teachers: Vec<UserBrief>,
    pub year: Option<String>,
    pub document_count: i64,
    /// Заполняется только в карточке ФОС
    #[serde(default)]
    pub documents: Vec<Document>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fos.ts")]
pub struct FosListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub teacher_id: Option<i64>,
    pub type_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub year: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fos.ts")]
pub struct CreateFosRequest {
    pub name: String,
    pub description: Option<String>,
    pub type_id: i64,
    pub discipline_id: i64,
    pub year: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fos.ts")]
pub struct UpdateFosRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[ts(optional, type = "string | null")]
    pub description: Option<Option<String>>,
    pub type_id: Option<i64>,
    pub discipline_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[ts(optional, type = "string | null")]
    pub year: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FosListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub teacher_id: Option<i64>,
    pub type_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub year: Option<String>,
}

impl From<FosListParams> for FosListQuery {
    fn from(params: FosListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
            teacher_id: params.teacher_id,
            type_id: params.type_id,
            discipline_id: params.discipline_id,
            year: params.year.filter(|y| !y.is_empty()),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fos.ts")]
pub struct FosListResponse {
    pub items: Vec<FosDetail>,
    pub pagination: PaginationInfo,
    pub default_filter_applied: bool,
}
