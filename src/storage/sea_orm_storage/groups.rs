//! Учебные группы

use super::SeaOrmStorage;
use crate::entity::groups::{ActiveModel, Column, Entity as Groups};
use crate::errors::{FosAdminError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    groups::{CreateGroupRequest, Group, GroupListQuery, GroupListResponse, UpdateGroupRequest},
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn list_groups_with_pagination_impl(
        &self,
        query: GroupListQuery,
    ) -> Result<GroupListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Groups::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.like(contains_pattern(search.trim())));
        }

        if let Some(course) = query.course {
            select = select.filter(Column::Course.eq(course));
        }

        let paginator = select
            .order_by_asc(Column::Course)
            .order_by_asc(Column::Name)
            .paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка подсчёта групп: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка подсчёта страниц: {e}"))
        })?;
        let groups = paginator.fetch_page(page - 1).await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка запроса групп: {e}"))
        })?;

        Ok(GroupListResponse {
            items: groups.into_iter().map(|m| m.into_group()).collect(),
            pagination: PaginationInfo::from_counts(page, size, total, pages),
        })
    }

    pub async fn all_groups_impl(&self) -> Result<Vec<Group>> {
        let groups = Groups::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| FosAdminError::database_operation(format!("Ошибка запроса групп: {e}")))?;

        Ok(groups.into_iter().map(|m| m.into_group()).collect())
    }

    pub async fn get_group_by_id_impl(&self, id: i64) -> Result<Option<Group>> {
        let group = Groups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FosAdminError::database_operation(format!("Ошибка запроса группы: {e}")))?;

        Ok(group.map(|m| m.into_group()))
    }

    pub async fn get_groups_by_names_impl(&self, names: &[String]) -> Result<Vec<Group>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let groups = Groups::find()
            .filter(Column::Name.is_in(names.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| FosAdminError::database_operation(format!("Ошибка запроса групп: {e}")))?;

        Ok(groups.into_iter().map(|m| m.into_group()).collect())
    }

    pub async fn create_group_impl(&self, req: CreateGroupRequest) -> Result<Group> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            course: Set(req.course),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось создать группу: {e}"))
        })?;

        Ok(result.into_group())
    }

    pub async fn update_group_impl(
        &self,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        if self.get_group_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(course) = update.course {
            model.course = Set(course);
        }

        let result = model.update(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось изменить группу: {e}"))
        })?;

        Ok(Some(result.into_group()))
    }

    /// Связи с дисциплинами удаляются каскадом
    pub async fn delete_group_impl(&self, id: i64) -> Result<bool> {
        let result = Groups::delete_by_id(id).exec(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось удалить группу: {e}"))
        })?;

        Ok(result.rows_affected > 0)
    }
}
