//! Справочники: одна реализация на три одинаковые таблицы

use super::SeaOrmStorage;
use crate::errors::{FosAdminError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    dictionaries::{DictionaryItem, DictionaryKind, DictionaryListQuery, DictionaryListResponse},
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Выполнить блок с модулем сущности выбранного справочника под именем `$table`
macro_rules! with_dictionary_table {
    ($kind:expr, $table:ident => $body:block) => {
        match $kind {
            DictionaryKind::FosTypes => {
                use crate::entity::fos_types as $table;
                $body
            }
            DictionaryKind::DisciplineTypes => {
                use crate::entity::discipline_types as $table;
                $body
            }
            DictionaryKind::Qualifications => {
                use crate::entity::qualifications as $table;
                $body
            }
        }
    };
}

fn db_error(kind: DictionaryKind, action: &str, e: impl std::fmt::Display) -> FosAdminError {
    FosAdminError::database_operation(format!("{} ({}): {action}: {e}", kind.item_title(), kind))
}

impl SeaOrmStorage {
    pub async fn list_dictionary_items_impl(
        &self,
        kind: DictionaryKind,
        query: DictionaryListQuery,
    ) -> Result<DictionaryListResponse> {
        let (page, size) = normalize_page(query.page, query.size);
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        with_dictionary_table!(kind, table => {
            let mut select = table::Entity::find();
            if let Some(ref search) = search {
                select = select.filter(table::Column::Name.like(contains_pattern(search)));
            }

            let paginator = select
                .order_by_asc(table::Column::Name)
                .paginate(&self.db, size);
            let total = paginator
                .num_items()
                .await
                .map_err(|e| db_error(kind, "ошибка подсчёта", e))?;
            let pages = paginator
                .num_pages()
                .await
                .map_err(|e| db_error(kind, "ошибка подсчёта страниц", e))?;
            let items = paginator
                .fetch_page(page - 1)
                .await
                .map_err(|e| db_error(kind, "ошибка запроса списка", e))?;

            Ok(DictionaryListResponse {
                items: items.into_iter().map(|m| m.into_dictionary_item()).collect(),
                pagination: PaginationInfo::from_counts(page, size, total, pages),
            })
        })
    }

    pub async fn all_dictionary_items_impl(
        &self,
        kind: DictionaryKind,
    ) -> Result<Vec<DictionaryItem>> {
        with_dictionary_table!(kind, table => {
            let items = table::Entity::find()
                .order_by_asc(table::Column::Name)
                .all(&self.db)
                .await
                .map_err(|e| db_error(kind, "ошибка запроса списка", e))?;
            Ok(items.into_iter().map(|m| m.into_dictionary_item()).collect())
        })
    }

    pub async fn get_dictionary_item_impl(
        &self,
        kind: DictionaryKind,
        id: i64,
    ) -> Result<Option<DictionaryItem>> {
        with_dictionary_table!(kind, table => {
            let item = table::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(|e| db_error(kind, "ошибка запроса", e))?;
            Ok(item.map(|m| m.into_dictionary_item()))
        })
    }

    /// Поиск по точному названию (для импорта)
    pub async fn find_dictionary_item_by_name_impl(
        &self,
        kind: DictionaryKind,
        name: &str,
    ) -> Result<Option<DictionaryItem>> {
        with_dictionary_table!(kind, table => {
            let item = table::Entity::find()
                .filter(table::Column::Name.eq(name))
                .one(&self.db)
                .await
                .map_err(|e| db_error(kind, "ошибка запроса", e))?;
            Ok(item.map(|m| m.into_dictionary_item()))
        })
    }

    pub async fn create_dictionary_item_impl(
        &self,
        kind: DictionaryKind,
        name: String,
    ) -> Result<DictionaryItem> {
        let now = chrono::Utc::now().timestamp();

        with_dictionary_table!(kind, table => {
            let model = table::ActiveModel {
                name: Set(name),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let result = model
                .insert(&self.db)
                .await
                .map_err(|e| db_error(kind, "не удалось создать", e))?;
            Ok(result.into_dictionary_item())
        })
    }

    pub async fn update_dictionary_item_impl(
        &self,
        kind: DictionaryKind,
        id: i64,
        name: String,
    ) -> Result<Option<DictionaryItem>> {
        if self.get_dictionary_item_impl(kind, id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        with_dictionary_table!(kind, table => {
            let model = table::ActiveModel {
                id: Set(id),
                name: Set(name),
                updated_at: Set(now),
                ..Default::default()
            };
            let result = model
                .update(&self.db)
                .await
                .map_err(|e| db_error(kind, "не удалось изменить", e))?;
            Ok(Some(result.into_dictionary_item()))
        })
    }

    /// Удаление; при ссылках с RESTRICT ошибка БД пробрасывается как есть
    pub async fn delete_dictionary_item_impl(&self, kind: DictionaryKind, id: i64) -> Result<bool> {
        with_dictionary_table!(kind, table => {
            let result = table::Entity::delete_by_id(id)
                .exec(&self.db)
                .await
                .map_err(|e| db_error(kind, "не удалось удалить", e))?;
            Ok(result.rows_affected > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::models::dictionaries::DictionaryKind;

    #[tokio::test]
    async fn test_delete_referenced_item_is_foreign_key_violation() {
        let storage = fixtures::storage().await;
        let used = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let unused = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Резерв").await;
        let fos_type = fixtures::fos_type_ids(&storage).await[0];
        let discipline = fixtures::discipline(&storage, "Алгебра", used, &[]).await;
        fixtures::fos(&storage, discipline, fos_type, None).await;

        let err = storage
            .delete_dictionary_item_impl(DictionaryKind::DisciplineTypes, used)
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err}");

        let err = storage
            .delete_dictionary_item_impl(DictionaryKind::FosTypes, fos_type)
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err}");

        assert!(
            storage
                .delete_dictionary_item_impl(DictionaryKind::DisciplineTypes, unused)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .delete_dictionary_item_impl(DictionaryKind::DisciplineTypes, unused)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_deleting_qualification_clears_discipline_reference() {
        let storage = fixtures::storage().await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let qualification =
            fixtures::dictionary_item(&storage, DictionaryKind::Qualifications, "Бакалавр").await;
        let discipline = storage
            .create_discipline_impl(crate::models::disciplines::CreateDisciplineRequest {
                name: "Алгебра".to_string(),
                type_id: kind,
                qualification_id: Some(qualification),
                teacher_ids: Vec::new(),
                group_ids: Vec::new(),
            })
            .await
            .unwrap();
        assert!(discipline.qualification.is_some());

        assert!(
            storage
                .delete_dictionary_item_impl(DictionaryKind::Qualifications, qualification)
                .await
                .unwrap()
        );
        let discipline = storage.get_discipline_by_id_impl(discipline.id).await.unwrap().unwrap();
        assert!(discipline.qualification.is_none());
    }
}
