use super::entities::User;
use crate::models::common::{PaginationInfo, UserBrief};
use serde::Serialize;
use ts_rs::TS;

/// Строка списка пользователей: учётная запись и нагрузка преподавателя
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    /// Сколько дисциплин ведёт
    pub discipline_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<UserListItem>,
    pub pagination: PaginationInfo,
}

/// Преподаватели для выбора в формах дисциплин
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct TeacherListResponse {
    pub items: Vec<UserBrief>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserResponse {
    pub user: User,
}
