use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::discipline_users::{self, Entity as DisciplineUsers};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{FosAdminError, Result};
use crate::models::{
    PaginationInfo, UserBrief,
    common::pagination::normalize_page,
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{UserListItem, UserListResponse},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// Создать пользователя
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось создать пользователя: {e}"))
        })?;

        Ok(result.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id).one(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка запроса пользователя: {e}"))
        })?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка запроса пользователя: {e}"))
            })?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка запроса пользователя: {e}"))
            })?;

        Ok(result.map(|m| m.into_user()))
    }

    /// Поиск по логину или почте
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка запроса пользователя: {e}"))
            })?;

        Ok(result.map(|m| m.into_user()))
    }

    /// Список пользователей с пагинацией
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(contains_pattern(search)))
                    .add(Column::Email.like(contains_pattern(search)))
                    .add(Column::DisplayName.like(contains_pattern(search))),
            );
        }

        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_asc(Column::Username);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка подсчёта пользователей: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка подсчёта страниц: {e}"))
        })?;
        let users = paginator.fetch_page(page - 1).await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка запроса пользователей: {e}"))
        })?;

        let ids: Vec<i64> = users.iter().map(|m| m.id).collect();
        let counts = self.count_disciplines_by_user(&ids).await?;

        Ok(UserListResponse {
            items: users
                .into_iter()
                .map(|m| UserListItem {
                    discipline_count: counts.get(&m.id).copied().unwrap_or(0),
                    user: m.into_user(),
                })
                .collect(),
            pagination: PaginationInfo::from_counts(page, size, total, pages),
        })
    }

    /// Число дисциплин у каждого из пользователей
    async fn count_disciplines_by_user(&self, user_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let counts: Vec<(i64, i64)> = DisciplineUsers::find()
            .select_only()
            .column(discipline_users::Column::UserId)
            .column_as(discipline_users::Column::DisciplineId.count(), "discipline_count")
            .filter(discipline_users::Column::UserId.is_in(user_ids.iter().copied()))
            .group_by(discipline_users::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка подсчёта дисциплин: {e}"))
            })?;

        Ok(counts.into_iter().collect())
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!(
                    "Не удалось обновить время входа: {e}"
                ))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// Изменить пользователя
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        // пустая строка очищает отображаемое имя
        if let Some(display_name) = update.display_name {
            let display_name = display_name.trim().to_string();
            model.display_name = Set((!display_name.is_empty()).then_some(display_name));
        }

        model.update(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось изменить пользователя: {e}"))
        })?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось удалить пользователя: {e}"))
        })?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find().count(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка подсчёта пользователей: {e}"))
        })?;

        Ok(count)
    }

    /// Активные пользователи, по имени
    pub async fn list_teachers_impl(&self) -> Result<Vec<UserBrief>> {
        let users = Users::find()
            .filter(Column::Status.eq(UserStatus::Active.to_string()))
            .order_by_asc(Column::DisplayName)
            .order_by_asc(Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка запроса преподавателей: {e}"))
            })?;

        let mut teachers: Vec<UserBrief> = users.into_iter().map(|m| m.into_brief()).collect();
        // NULL в display_name сортируется по-разному в разных СУБД
        teachers.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        Ok(teachers)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::models::dictionaries::DictionaryKind;
    use crate::models::users::requests::UserListQuery;

    fn all_users() -> UserListQuery {
        UserListQuery {
            page: Some(1),
            size: Some(50),
            role: None,
            status: None,
            search: None,
        }
    }

    #[tokio::test]
    async fn test_user_list_counts_disciplines() {
        let storage = fixtures::storage().await;
        let ivanov = fixtures::teacher(&storage, "ivanov").await;
        let petrov = fixtures::teacher(&storage, "petrov").await;
        let kind =
            fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        fixtures::discipline(&storage, "Алгебра", kind, &[ivanov, petrov]).await;
        fixtures::discipline(&storage, "Геометрия", kind, &[ivanov]).await;

        let list = storage
            .list_users_with_pagination_impl(all_users())
            .await
            .unwrap();
        let count_of = |id: i64| {
            list.items
                .iter()
                .find(|item| item.user.id == id)
                .map(|item| item.discipline_count)
        };

        assert_eq!(count_of(ivanov), Some(2));
        assert_eq!(count_of(petrov), Some(1));
    }

    #[tokio::test]
    async fn test_user_without_disciplines_has_zero_count() {
        let storage = fixtures::storage().await;
        let sidorov = fixtures::teacher(&storage, "sidorov").await;

        let list = storage
            .list_users_with_pagination_impl(all_users())
            .await
            .unwrap();
        let item = list.items.iter().find(|item| item.user.id == sidorov).unwrap();
        assert_eq!(item.discipline_count, 0);

        let teachers = storage.list_teachers_impl().await.unwrap();
        assert!(teachers.iter().any(|t| t.id == sidorov));
    }
}
