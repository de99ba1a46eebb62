//! Дисциплины и их связи с преподавателями и группами

use std::collections::{BTreeSet, HashMap};

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{
    discipline_groups, discipline_types, discipline_users, disciplines, documents, fos, groups,
    qualifications, users,
};
use crate::errors::{FosAdminError, Result};
use crate::models::{
    NamedRef, PaginationInfo, UserBrief,
    common::pagination::normalize_page,
    disciplines::{
        CreateDisciplineRequest, DisciplineDetail, DisciplineListQuery, DisciplineListResponse,
        UpdateDisciplineRequest,
    },
    groups::Group,
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

fn db_error(action: &str, e: impl std::fmt::Display) -> FosAdminError {
    FosAdminError::database_operation(format!("{action}: {e}"))
}

/// Уникальные id без изменения порядка первого появления
fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

impl SeaOrmStorage {
    /// Преподаватели по дисциплинам
    pub(super) async fn load_discipline_teachers<C: ConnectionTrait>(
        conn: &C,
        discipline_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<UserBrief>>> {
        if discipline_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = DisciplineUsers::find()
            .filter(discipline_users::Column::DisciplineId.is_in(discipline_ids.iter().copied()))
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса преподавателей дисциплин", e))?;

        let user_ids: Vec<i64> = links.iter().map(|l| l.user_id).collect();
        let user_map: HashMap<i64, UserBrief> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            Users::find()
                .filter(users::Column::Id.is_in(unique_ids(&user_ids)))
                .all(conn)
                .await
                .map_err(|e| db_error("Ошибка запроса преподавателей", e))?
                .into_iter()
                .map(|m| (m.id, m.into_brief()))
                .collect()
        };

        let mut result: HashMap<i64, Vec<UserBrief>> = HashMap::new();
        for link in links {
            if let Some(user) = user_map.get(&link.user_id) {
                result
                    .entry(link.discipline_id)
                    .or_default()
                    .push(user.clone());
            }
        }
        for teachers in result.values_mut() {
            teachers.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        }

        Ok(result)
    }

    async fn load_discipline_groups<C: ConnectionTrait>(
        conn: &C,
        discipline_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Group>>> {
        if discipline_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = DisciplineGroups::find()
            .filter(discipline_groups::Column::DisciplineId.is_in(discipline_ids.iter().copied()))
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса групп дисциплин", e))?;

        let group_ids: Vec<i64> = links.iter().map(|l| l.group_id).collect();
        let group_map: HashMap<i64, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            Groups::find()
                .filter(groups::Column::Id.is_in(unique_ids(&group_ids)))
                .all(conn)
                .await
                .map_err(|e| db_error("Ошибка запроса групп", e))?
                .into_iter()
                .map(|m| (m.id, m.into_group()))
                .collect()
        };

        let mut result: HashMap<i64, Vec<Group>> = HashMap::new();
        for link in links {
            if let Some(group) = group_map.get(&link.group_id) {
                result
                    .entry(link.discipline_id)
                    .or_default()
                    .push(group.clone());
            }
        }
        for list in result.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(result)
    }

    /// Число ФОС по дисциплинам (с фильтром по году, если задан)
    pub(super) async fn count_fos_by_discipline<C: ConnectionTrait>(
        conn: &C,
        discipline_ids: &[i64],
        year: Option<&str>,
    ) -> Result<HashMap<i64, i64>> {
        if discipline_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut select = Fos::find()
            .select_only()
            .column(fos::Column::DisciplineId)
            .column_as(fos::Column::Id.count(), "fos_count")
            .filter(fos::Column::DisciplineId.is_in(discipline_ids.iter().copied()));
        if let Some(year) = year {
            select = select.filter(fos::Column::Year.eq(year));
        }

        let rows = select
            .group_by(fos::Column::DisciplineId)
            .into_tuple::<(i64, i64)>()
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка подсчёта ФОС", e))?;

        Ok(rows.into_iter().collect())
    }

    /// Дисциплины со всеми связями, в том же порядке
    pub(super) async fn load_discipline_details<C: ConnectionTrait>(
        conn: &C,
        models: Vec<DisciplineModel>,
    ) -> Result<Vec<DisciplineDetail>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let type_ids = unique_ids(&models.iter().map(|m| m.type_id).collect::<Vec<_>>());
        let qualification_ids = unique_ids(
            &models
                .iter()
                .filter_map(|m| m.qualification_id)
                .collect::<Vec<_>>(),
        );

        let type_map: HashMap<i64, NamedRef> = DisciplineTypes::find()
            .filter(discipline_types::Column::Id.is_in(type_ids))
            .all(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса типов дисциплин", e))?
            .into_iter()
            .map(|m| (m.id, m.into_named_ref()))
            .collect();

        let qualification_map: HashMap<i64, NamedRef> = if qualification_ids.is_empty() {
            HashMap::new()
        } else {
            Qualifications::find()
                .filter(qualifications::Column::Id.is_in(qualification_ids))
                .all(conn)
                .await
                .map_err(|e| db_error("Ошибка запроса квалификаций", e))?
                .into_iter()
                .map(|m| (m.id, m.into_named_ref()))
                .collect()
        };

        let mut teacher_map = Self::load_discipline_teachers(conn, &ids).await?;
        let mut group_map = Self::load_discipline_groups(conn, &ids).await?;
        let fos_counts = Self::count_fos_by_discipline(conn, &ids, None).await?;

        Ok(models
            .into_iter()
            .map(|m| DisciplineDetail {
                discipline_type: type_map.get(&m.type_id).cloned().unwrap_or(NamedRef {
                    id: m.type_id,
                    name: String::new(),
                }),
                qualification: m
                    .qualification_id
                    .and_then(|id| qualification_map.get(&id).cloned()),
                teachers: teacher_map.remove(&m.id).unwrap_or_default(),
                groups: group_map.remove(&m.id).unwrap_or_default(),
                fos_count: fos_counts.get(&m.id).copied().unwrap_or(0),
                created_at: crate::entity::timestamp_to_datetime(m.created_at),
                updated_at: crate::entity::timestamp_to_datetime(m.updated_at),
                id: m.id,
                name: m.name,
            })
            .collect())
    }

    pub async fn list_disciplines_with_pagination_impl(
        &self,
        query: DisciplineListQuery,
    ) -> Result<DisciplineListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Disciplines::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select
                .filter(disciplines::Column::Name.like(contains_pattern(search.trim())));
        }

        if let Some(type_id) = query.type_id {
            select = select.filter(disciplines::Column::TypeId.eq(type_id));
        }

        if let Some(qualification_id) = query.qualification_id {
            select = select.filter(disciplines::Column::QualificationId.eq(qualification_id));
        }

        // пара (дисциплина, преподаватель) уникальна, дублей строк нет
        if let Some(teacher_id) = query.teacher_id {
            select = select
                .join(
                    JoinType::InnerJoin,
                    disciplines::Relation::DisciplineUsers.def(),
                )
                .filter(discipline_users::Column::UserId.eq(teacher_id));
        }

        if let Some(group_id) = query.group_id {
            select = select
                .join(
                    JoinType::InnerJoin,
                    disciplines::Relation::DisciplineGroups.def(),
                )
                .filter(discipline_groups::Column::GroupId.eq(group_id));
        }

        let paginator = select
            .order_by_asc(disciplines::Column::Name)
            .order_by_asc(disciplines::Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("Ошибка подсчёта дисциплин", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("Ошибка подсчёта страниц", e))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплин", e))?;

        Ok(DisciplineListResponse {
            items: Self::load_discipline_details(&self.db, models).await?,
            pagination: PaginationInfo::from_counts(page, size, total, pages),
            default_filter_applied: false,
        })
    }

    pub async fn get_discipline_by_id_impl(&self, id: i64) -> Result<Option<DisciplineDetail>> {
        Self::get_discipline_detail(&self.db, id).await
    }

    async fn get_discipline_detail<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<DisciplineDetail>> {
        let Some(model) = Disciplines::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплины", e))?
        else {
            return Ok(None);
        };

        Ok(Self::load_discipline_details(conn, vec![model])
            .await?
            .pop())
    }

    async fn replace_discipline_teachers<C: ConnectionTrait>(
        conn: &C,
        discipline_id: i64,
        user_ids: &[i64],
    ) -> Result<()> {
        DisciplineUsers::delete_many()
            .filter(discipline_users::Column::DisciplineId.eq(discipline_id))
            .exec(conn)
            .await
            .map_err(|e| db_error("Не удалось обновить преподавателей дисциплины", e))?;

        let links: Vec<discipline_users::ActiveModel> = unique_ids(user_ids)
            .into_iter()
            .map(|user_id| discipline_users::ActiveModel {
                discipline_id: Set(discipline_id),
                user_id: Set(user_id),
            })
            .collect();
        if !links.is_empty() {
            DisciplineUsers::insert_many(links)
                .exec(conn)
                .await
                .map_err(|e| db_error("Не удалось назначить преподавателей", e))?;
        }

        Ok(())
    }

    async fn replace_discipline_groups<C: ConnectionTrait>(
        conn: &C,
        discipline_id: i64,
        group_ids: &[i64],
    ) -> Result<()> {
        DisciplineGroups::delete_many()
            .filter(discipline_groups::Column::DisciplineId.eq(discipline_id))
            .exec(conn)
            .await
            .map_err(|e| db_error("Не удалось обновить группы дисциплины", e))?;

        let links: Vec<discipline_groups::ActiveModel> = unique_ids(group_ids)
            .into_iter()
            .map(|group_id| discipline_groups::ActiveModel {
                discipline_id: Set(discipline_id),
                group_id: Set(group_id),
            })
            .collect();
        if !links.is_empty() {
            DisciplineGroups::insert_many(links)
                .exec(conn)
                .await
                .map_err(|e| db_error("Не удалось назначить группы", e))?;
        }

        Ok(())
    }

    /// Создание вместе со связями, одной транзакцией
    pub async fn create_discipline_impl(
        &self,
        req: CreateDisciplineRequest,
    ) -> Result<DisciplineDetail> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("Не удалось начать транзакцию", e))?;

        let model = DisciplineActiveModel {
            name: Set(req.name),
            type_id: Set(req.type_id),
            qualification_id: Set(req.qualification_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = model
            .insert(&txn)
            .await
            .map_err(|e| db_error("Не удалось создать дисциплину", e))?;

        Self::replace_discipline_teachers(&txn, created.id, &req.teacher_ids).await?;
        Self::replace_discipline_groups(&txn, created.id, &req.group_ids).await?;

        let detail = Self::get_discipline_detail(&txn, created.id)
            .await?
            .ok_or_else(|| FosAdminError::database_operation("Созданная дисциплина не найдена"))?;

        txn.commit()
            .await
            .map_err(|e| db_error("Не удалось сохранить дисциплину", e))?;

        Ok(detail)
    }

    pub async fn update_discipline_impl(
        &self,
        id: i64,
        update: UpdateDisciplineRequest,
    ) -> Result<Option<DisciplineDetail>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("Не удалось начать транзакцию", e))?;

        if Disciplines::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплины", e))?
            .is_none()
        {
            return Ok(None);
        }

        let mut model = DisciplineActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(type_id) = update.type_id {
            model.type_id = Set(type_id);
        }

        if let Some(qualification_id) = update.qualification_id {
            model.qualification_id = Set(qualification_id);
        }

        model
            .update(&txn)
            .await
            .map_err(|e| db_error("Не удалось изменить дисциплину", e))?;

        if let Some(teacher_ids) = update.teacher_ids {
            Self::replace_discipline_teachers(&txn, id, &teacher_ids).await?;
        }

        if let Some(group_ids) = update.group_ids {
            Self::replace_discipline_groups(&txn, id, &group_ids).await?;
        }

        let detail = Self::get_discipline_detail(&txn, id).await?;

        txn.commit()
            .await
            .map_err(|e| db_error("Не удалось сохранить дисциплину", e))?;

        Ok(detail)
    }

    /// Удаление; возвращает пути файлов документов, удалённых каскадом
    pub async fn delete_discipline_impl(&self, id: i64) -> Result<Option<Vec<String>>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("Не удалось начать транзакцию", e))?;

        let paths: Vec<Option<String>> = Documents::find()
            .select_only()
            .column(documents::Column::Path)
            .join(JoinType::InnerJoin, documents::Relation::Fos.def())
            .filter(fos::Column::DisciplineId.eq(id))
            .into_tuple::<Option<String>>()
            .all(&txn)
            .await
            .map_err(|e| db_error("Ошибка запроса документов дисциплины", e))?;

        let result = Disciplines::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("Не удалось удалить дисциплину", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("Не удалось удалить дисциплину", e))?;

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

    pub async fn list_discipline_choices_impl(
        &self,
        teacher_id: Option<i64>,
    ) -> Result<Vec<NamedRef>> {
        let mut select = Disciplines::find()
            .select_only()
            .column(disciplines::Column::Id)
            .column(disciplines::Column::Name);

        if let Some(teacher_id) = teacher_id {
            select = select
                .join(
                    JoinType::InnerJoin,
                    disciplines::Relation::DisciplineUsers.def(),
                )
                .filter(discipline_users::Column::UserId.eq(teacher_id));
        }

        let rows = select
            .order_by_asc(disciplines::Column::Name)
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплин", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_keeps_first_order() {
        assert_eq!(unique_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(unique_ids(&[]).is_empty());
    }
}

#[cfg(test)]
mod storage_tests {
    use super::super::fixtures;
    use crate::models::dictionaries::DictionaryKind;
    use crate::models::disciplines::DisciplineListQuery;

    #[tokio::test]
    async fn test_delete_discipline_returns_paths_of_cascaded_documents() {
        let storage = fixtures::storage().await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let fos_type = fixtures::fos_type_ids(&storage).await[0];
        let discipline = fixtures::discipline(&storage, "Алгебра", kind, &[]).await;
        let kept = fixtures::discipline(&storage, "Физика", kind, &[]).await;

        let first = fixtures::fos(&storage, discipline, fos_type, None).await;
        let second = fixtures::fos(&storage, discipline, fos_type, Some("2024-2025")).await;
        fixtures::document(&storage, first, "fos/1.docx").await;
        fixtures::document(&storage, second, "fos/2.docx").await;
        let kept_fos = fixtures::fos(&storage, kept, fos_type, None).await;
        fixtures::document(&storage, kept_fos, "fos/3.docx").await;

        let mut paths = storage.delete_discipline_impl(discipline).await.unwrap().unwrap();
        paths.sort();
        assert_eq!(paths, vec!["fos/1.docx", "fos/2.docx"]);

        assert!(storage.get_fos_by_id_impl(first).await.unwrap().is_none());
        assert!(storage.get_fos_by_id_impl(second).await.unwrap().is_none());
        assert_eq!(storage.list_documents_by_fos_impl(kept_fos).await.unwrap().len(), 1);
        assert!(storage.delete_discipline_impl(discipline).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_teacher_joins_discipline_users() {
        let storage = fixtures::storage().await;
        let first = fixtures::teacher(&storage, "petrov").await;
        let second = fixtures::teacher(&storage, "ivanova").await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;

        fixtures::discipline(&storage, "Алгебра", kind, &[first]).await;
        fixtures::discipline(&storage, "Геометрия", kind, &[first, second]).await;
        fixtures::discipline(&storage, "Химия", kind, &[second]).await;

        let response = storage
            .list_disciplines_with_pagination_impl(DisciplineListQuery {
                teacher_id: Some(first),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = response.items.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Алгебра", "Геометрия"]);

        // у совместной дисциплины в ответе оба преподавателя
        assert_eq!(response.items[1].teachers.len(), 2);
    }
}
