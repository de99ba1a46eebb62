use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{NamedRef, PaginationInfo, PaginationQuery};

/// Допустимые номера курса
pub const COURSE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

/// Учебная группа
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub course: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Group {
    pub fn named_ref(&self) -> NamedRef {
        NamedRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub course: Option<i32>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    pub course: i32,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub course: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub course: Option<i32>,
}

impl From<GroupListParams> for GroupListQuery {
    fn from(params: GroupListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
            course: params.course,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListResponse {
    pub items: Vec<Group>,
    pub pagination: PaginationInfo,
}
