//! Фонды оценочных средств

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{discipline_users, disciplines, documents, fos, fos_types};
use crate::errors::{FosAdminError, Result};
use crate::models::{
    NamedRef, PaginationInfo,
    common::pagination::normalize_page,
    fos::{CreateFosRequest, FosDetail, FosListQuery, FosListResponse, UpdateFosRequest},
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

fn db_error(action: &str, e: impl std::fmt::Display) -> FosAdminError {
    FosAdminError::database_operation(format!("{action}: {e}"))
}

impl SeaOrmStorage {
    /// ФОС со связями; документы подгружаются только по запросу
    async fn load_fos_details<C: ConnectionTrait>(
        conn: &C,
        models: Vec<FosModel>,
        with_documents: bool,
    ) -> Result<Vec<FosDetail>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let type_ids: Vec<i64> = models.iter().map(|m| m.type_id).collect();
        let discipline_ids: Vec<i64> = models.iter().map(|m| m.discipline_id).collect();

        let type_map: HashMap<i64, NamedRef> = FosTypes::find()
            .filter(fos_types::Column::Id.is_in(type_ids))
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса типов ФОС", e))?
            .into_iter()
            .map(|m| (m.id, m.into_named_ref()))
            .collect();

        let discipline_map: HashMap<i64, NamedRef> = Disciplines::find()
            .select_only()
            .column(disciplines::Column::Id)
            .column(disciplines::Column::Name)
            .filter(disciplines::Column::Id.is_in(discipline_ids.clone()))
            .into_tuple::<(i64, String)>()
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплин", e))?
            .into_iter()
            .map(|(id, name)| (id, NamedRef { id, name }))
            .collect();

        let teacher_map = Self::load_discipline_teachers(conn, &discipline_ids).await?;

        let document_counts: HashMap<i64, i64> = Documents::find()
            .select_only()
            .column(documents::Column::FosId)
            .column_as(documents::Column::Id.count(), "document_count")
            .filter(documents::Column::FosId.is_in(ids.clone()))
            .group_by(documents::Column::FosId)
            .into_tuple::<(i64, i64)>()
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка подсчёта документов", e))?
            .into_iter()
            .collect();

        let mut document_map: HashMap<i64, Vec<crate::models::documents::Document>> =
            HashMap::new();
        if with_documents {
            let docs = Documents::find()
                .filter(documents::Column::FosId.is_in(ids))
                .order_by_asc(documents::Column::Id)
                .all(conn)
                .await
                .map_err(|e| db_error("Ошибка запроса документов", e))?;
            for doc in docs {
                document_map
                    .entry(doc.fos_id)
                    .or_default()
                    .push(doc.into_document());
            }
        }

        Ok(models
            .into_iter()
            .map(|m| FosDetail {
                fos_type: type_map.get(&m.type_id).cloned().unwrap_or(NamedRef {
                    id: m.type_id,
                    name: String::new(),
                }),
                discipline: discipline_map
                    .get(&m.discipline_id)
                    .cloned()
                    .unwrap_or(NamedRef {
                        id: m.discipline_id,
                        name: String::new(),
                    }),
                teachers: teacher_map
                    .get(&m.discipline_id)
                    .cloned()
                    .unwrap_or_default(),
                document_count: document_counts.get(&m.id).copied().unwrap_or(0),
                documents: document_map.remove(&m.id).unwrap_or_default(),
                created_at: crate::entity::timestamp_to_datetime(m.created_at),
                updated_at: crate::entity::timestamp_to_datetime(m.updated_at),
                id: m.id,
                name: m.name,
                description: m.description,
                year: m.year,
            })
            .collect())
    }

    pub async fn list_fos_with_pagination_impl(&self, query: FosListQuery) -> Result<FosListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Fos::find();

        // поиск по id, названию и описанию
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            let mut condition = Condition::any()
                .add(fos::Column::Name.like(contains_pattern(search)))
                .add(fos::Column::Description.like(contains_pattern(search)));
            if let Ok(id) = search.parse::<i64>() {
                condition = condition.add(fos::Column::Id.eq(id));
            }
            select = select.filter(condition);
        }

        if let Some(type_id) = query.type_id {
            select = select.filter(fos::Column::TypeId.eq(type_id));
        }

        if let Some(discipline_id) = query.discipline_id {
            select = select.filter(fos::Column::DisciplineId.eq(discipline_id));
        }

        if let Some(ref year) = query.year {
            select = select.filter(fos::Column::Year.eq(year.as_str()));
        }

        if let Some(teacher_id) = query.teacher_id {
            select = select
                .join(JoinType::InnerJoin, fos::Relation::Discipline.def())
                .join(
                    JoinType::InnerJoin,
                    disciplines::Relation::DisciplineUsers.def(),
                )
                .filter(discipline_users::Column::UserId.eq(teacher_id));
        }

        let paginator = select
            .order_by_desc(fos::Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("Ошибка подсчёта ФОС", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("Ошибка подсчёта страниц", e))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("Ошибка запроса ФОС", e))?;

        Ok(FosListResponse {
            items: Self::load_fos_details(&self.db, models, false).await?,
            pagination: PaginationInfo::from_counts(page, size, total, pages),
            default_filter_applied: false,
        })
    }

    pub async fn get_fos_by_id_impl(&self, id: i64) -> Result<Option<FosDetail>> {
        let Some(model) = Fos::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса ФОС", e))?
        else {
            return Ok(None);
        };

        Ok(Self::load_fos_details(&self.db, vec![model], true)
            .await?
            .pop())
    }

    pub async fn create_fos_impl(&self, req: CreateFosRequest) -> Result<FosDetail> {
        let now = chrono::Utc::now().timestamp();

        let model = FosActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            type_id: Set(req.type_id),
            discipline_id: Set(req.discipline_id),
            year: Set(req.year),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("Не удалось создать ФОС", e))?;

        self.get_fos_by_id_impl(created.id)
            .await?
            .ok_or_else(|| FosAdminError::database_operation("Созданный ФОС не найден"))
    }

    pub async fn update_fos_impl(
        &self,
        id: i64,
        update: UpdateFosRequest,
    ) -> Result<Option<FosDetail>> {
        if Fos::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса ФОС", e))?
            .is_none()
        {
            return Ok(None);
        }

        let mut model = FosActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(description);
        }

        if let Some(type_id) = update.type_id {
            model.type_id = Set(type_id);
        }

        if let Some(discipline_id) = update.discipline_id {
            model.discipline_id = Set(discipline_id);
        }

        if let Some(year) = update.year {
            model.year = Set(year);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| db_error("Не удалось изменить ФОС", e))?;

        self.get_fos_by_id_impl(id).await
    }

    /// Удаление; возвращает пути файлов его документов
    pub async fn delete_fos_impl(&self, id: i64) -> Result<Option<Vec<String>>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("Не удалось начать транзакцию", e))?;

        let paths: Vec<Option<String>> = Documents::find()
            .select_only()
            .column(documents::Column::Path)
            .filter(documents::Column::FosId.eq(id))
            .into_tuple::<Option<String>>()
            .all(&txn)
            .await
            .map_err(|e| db_error("Ошибка запроса документов ФОС", e))?;

        let result = Fos::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("Не удалось удалить ФОС", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("Не удалось удалить ФОС", e))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(
            paths
                .into_iter()
                .flatten()
                .filter(|p| !p.is_empty())
                .collect(),
        ))
    }

    /// Годы, встречающиеся у ФОС, от новых к старым
    pub async fn list_fos_years_impl(&self, teacher_id: Option<i64>) -> Result<Vec<String>> {
        let mut select = Fos::find()
            .select_only()
            .column(fos::Column::Year)
            .distinct()
            .filter(fos::Column::Year.is_not_null());

        if let Some(teacher_id) = teacher_id {
            select = select
                .join(JoinType::InnerJoin, fos::Relation::Discipline.def())
                .join(
                    JoinType::InnerJoin,
                    disciplines::Relation::DisciplineUsers.def(),
                )
                .filter(discipline_users::Column::UserId.eq(teacher_id));
        }

        let years = select
            .order_by_desc(fos::Column::Year)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса учебных годов", e))?;

        Ok(years.into_iter().filter(|y| !y.is_empty()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::models::dictionaries::DictionaryKind;
    use crate::models::fos::{CreateFosRequest, FosListQuery};

    #[tokio::test]
    async fn test_delete_fos_returns_paths_of_its_documents() {
        let storage = fixtures::storage().await;
        let teacher = fixtures::teacher(&storage, "petrov").await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let fos_type = fixtures::fos_type_ids(&storage).await[0];
        let discipline = fixtures::discipline(&storage, "Алгебра", kind, &[teacher]).await;

        let fos = fixtures::fos(&storage, discipline, fos_type, Some("2024-2025")).await;
        fixtures::document(&storage, fos, "fos/a.pdf").await;
        fixtures::document(&storage, fos, "fos/b.pdf").await;
        let other = fixtures::fos(&storage, discipline, fos_type, None).await;
        fixtures::document(&storage, other, "fos/c.pdf").await;

        let mut paths = storage.delete_fos_impl(fos).await.unwrap().unwrap();
        paths.sort();
        assert_eq!(paths, vec!["fos/a.pdf", "fos/b.pdf"]);

        assert!(storage.list_documents_by_fos_impl(fos).await.unwrap().is_empty());
        assert_eq!(storage.list_documents_by_fos_impl(other).await.unwrap().len(), 1);
        assert!(storage.delete_fos_impl(fos).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_teacher_follows_discipline_teachers() {
        let storage = fixtures::storage().await;
        let first = fixtures::teacher(&storage, "petrov").await;
        let second = fixtures::teacher(&storage, "ivanova").await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let fos_type = fixtures::fos_type_ids(&storage).await[0];

        let own = fixtures::discipline(&storage, "Алгебра", kind, &[first]).await;
        let shared = fixtures::discipline(&storage, "Геометрия", kind, &[first, second]).await;
        let foreign = fixtures::discipline(&storage, "Химия", kind, &[second]).await;
        let own_fos = fixtures::fos(&storage, own, fos_type, None).await;
        let shared_fos = fixtures::fos(&storage, shared, fos_type, None).await;
        let foreign_fos = fixtures::fos(&storage, foreign, fos_type, None).await;

        let list = |teacher_id| {
            storage.list_fos_with_pagination_impl(FosListQuery {
                teacher_id: Some(teacher_id),
                ..Default::default()
            })
        };

        let mut ids: Vec<i64> = list(first).await.unwrap().items.iter().map(|f| f.id).collect();
        ids.sort();
        assert_eq!(ids, vec![own_fos, shared_fos]);

        let mut ids: Vec<i64> = list(second).await.unwrap().items.iter().map(|f| f.id).collect();
        ids.sort();
        assert_eq!(ids, vec![shared_fos, foreign_fos]);
    }

    #[tokio::test]
    async fn test_search_matches_wildcards_literally() {
        let storage = fixtures::storage().await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let fos_type = fixtures::fos_type_ids(&storage).await[0];
        let discipline = fixtures::discipline(&storage, "Алгебра", kind, &[]).await;

        for name in ["Тест a_b", "Тест axb", "Итог 100%"] {
            storage
                .create_fos_impl(CreateFosRequest {
                    name: name.to_string(),
                    description: None,
                    type_id: fos_type,
                    discipline_id: discipline,
                    year: None,
                })
                .await
                .unwrap();
        }

        let search = |text: &str| {
            storage.list_fos_with_pagination_impl(FosListQuery {
                search: Some(text.to_string()),
                ..Default::default()
            })
        };

        let names: Vec<String> = search("a_b").await.unwrap().items.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Тест a_b"]);
        let names: Vec<String> = search("0%").await.unwrap().items.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Итог 100%"]);
        assert_eq!(search("Тест").await.unwrap().items.len(), 2);
    }
}
