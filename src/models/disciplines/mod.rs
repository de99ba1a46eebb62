use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{NamedRef, PaginationInfo, PaginationQuery, UserBrief};
use crate::models::common::optional::deserialize_nullable;
use crate::models::groups::Group;

/// Дисциплина со связанными данными
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/discipline.ts")]
pub struct DisciplineDetail {
    pub id: i64,
    pub name: String,
    pub discipline_type: NamedRef,
    pub qualification: Option<NamedRef>,
    pub teachers: Vec<UserBrief>,
    pub groups: Vec<Group>,
    pub fos_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl DisciplineDetail {
    pub fn named_ref(&self) -> NamedRef {
        NamedRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Параметры списка (из HTTP-запроса)
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/discipline.ts")]
pub struct DisciplineListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub teacher_id: Option<i64>,
    pub type_id: Option<i64>,
    pub qualification_id: Option<i64>,
    pub group_id: Option<i64>,
    /// `all` отключает фильтр по преподавателю
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/discipline.ts")]
pub struct CreateDisciplineRequest {
    pub name: String,
    pub type_id: i64,
    pub qualification_id: Option<i64>,
    #[serde(default)]
    pub teacher_ids: Vec<i64>,
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/discipline.ts")]
pub struct UpdateDisciplineRequest {
    pub name: Option<String>,
    pub type_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[ts(optional, type = "number | null")]
    pub qualification_id: Option<Option<i64>>,
    pub teacher_ids: Option<Vec<i64>>,
    pub group_ids: Option<Vec<i64>>,
}

/// Запрос списка для хранилища
#[derive(Debug, Clone, Default)]
pub struct DisciplineListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub teacher_id: Option<i64>,
    pub type_id: Option<i64>,
    pub qualification_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl From<DisciplineListParams> for DisciplineListQuery {
    fn from(params: DisciplineListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
            teacher_id: params.teacher_id,
            type_id: params.type_id,
            qualification_id: params.qualification_id,
            group_id: params.group_id,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/discipline.ts")]
pub struct DisciplineListResponse {
    pub items: Vec<DisciplineDetail>,
    pub pagination: PaginationInfo,
    /// Список отфильтрован по текущему преподавателю без явного запроса
    pub default_filter_applied: bool,
}
