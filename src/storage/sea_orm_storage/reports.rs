//! Выборки для отчётов

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{discipline_users, disciplines, documents, fos};
use crate::errors::{FosAdminError, Result};
use crate::models::reports::{DisciplineReportRow, FosReportRow};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

fn db_error(action: &str, e: impl std::fmt::Display) -> FosAdminError {
    FosAdminError::database_operation(format!("{action}: {e}"))
}

impl SeaOrmStorage {
    /// Число ФОС каждого типа по дисциплинам преподавателя за учебный год
    pub async fn fos_report_rows_impl(&self, teacher_id: i64, year: &str) -> Result<Vec<FosReportRow>> {
        let disciplines: Vec<(i64, String)> = Disciplines::find()
            .select_only()
            .column(disciplines::Column::Id)
            .column(disciplines::Column::Name)
            .join(
                JoinType::InnerJoin,
                disciplines::Relation::DisciplineUsers.def(),
            )
            .filter(discipline_users::Column::UserId.eq(teacher_id))
            .order_by_asc(disciplines::Column::Name)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплин преподавателя", e))?;

        if disciplines.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = disciplines.iter().map(|(id, _)| *id).collect();
        let counts: Vec<(i64, i64, i64)> = Fos::find()
            .select_only()
            .column(fos::Column::DisciplineId)
            .column(fos::Column::TypeId)
            .column_as(fos::Column::Id.count(), "fos_count")
            .filter(fos::Column::DisciplineId.is_in(ids))
            .filter(fos::Column::Year.eq(year))
            .group_by(fos::Column::DisciplineId)
            .group_by(fos::Column::TypeId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка подсчёта ФОС", e))?;

        let mut by_discipline: HashMap<i64, HashMap<i64, i64>> = HashMap::new();
        for (discipline_id, type_id, count) in counts {
            by_discipline
                .entry(discipline_id)
                .or_default()
                .insert(type_id, count);
        }

        Ok(disciplines
            .into_iter()
            .map(|(id, name)| FosReportRow {
                discipline: name,
                counts: by_discipline.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    /// Все дисциплины со связями и числом ФОС и документов (за год, если задан)
    pub async fn discipline_report_rows_impl(
        &self,
        year: Option<&str>,
    ) -> Result<Vec<DisciplineReportRow>> {
        let models = Disciplines::find()
            .order_by_asc(disciplines::Column::Name)
            .order_by_asc(disciplines::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка запроса дисциплин", e))?;
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

        let details = Self::load_discipline_details(&self.db, models).await?;
        let fos_counts = Self::count_fos_by_discipline(&self.db, &ids, year).await?;

        let mut document_select = Documents::find()
            .select_only()
            .column(fos::Column::DisciplineId)
            .column_as(documents::Column::Id.count(), "document_count")
            .join(JoinType::InnerJoin, documents::Relation::Fos.def());
        if let Some(year) = year {
            document_select = document_select.filter(fos::Column::Year.eq(year));
        }
        let document_counts: HashMap<i64, i64> = document_select
            .group_by(fos::Column::DisciplineId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("Ошибка подсчёта документов", e))?
            .into_iter()
            .collect();

        Ok(details
            .into_iter()
            .map(|detail| DisciplineReportRow {
                discipline_id: detail.id,
                fos_count: fos_counts.get(&detail.id).copied().unwrap_or(0),
                document_count: document_counts.get(&detail.id).copied().unwrap_or(0),
                name: detail.name,
                type_name: detail.discipline_type.name,
                qualification: detail.qualification.map(|q| q.name),
                groups: detail.groups.into_iter().map(|g| g.name).collect(),
                teachers: detail
                    .teachers
                    .iter()
                    .map(|t| t.full_name().to_string())
                    .collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::super::fixtures;
    use crate::models::dictionaries::DictionaryKind;

    #[tokio::test]
    async fn test_fos_report_counts_per_type_for_one_year() {
        let storage = fixtures::storage().await;
        let teacher = fixtures::teacher(&storage, "petrov").await;
        let other_teacher = fixtures::teacher(&storage, "ivanova").await;
        let kind = fixtures::dictionary_item(&storage, DictionaryKind::DisciplineTypes, "Основная").await;
        let types = fixtures::fos_type_ids(&storage).await;
        let (exam, test) = (types[0], types[2]);

        let algebra = fixtures::discipline(&storage, "Алгебра", kind, &[teacher]).await;
        fixtures::discipline(&storage, "Физика", kind, &[teacher]).await;
        let chemistry = fixtures::discipline(&storage, "Химия", kind, &[other_teacher]).await;

        fixtures::fos(&storage, algebra, exam, Some("2024-2025")).await;
        fixtures::fos(&storage, algebra, exam, Some("2024-2025")).await;
        fixtures::fos(&storage, algebra, test, Some("2024-2025")).await;
        fixtures::fos(&storage, algebra, test, Some("2023-2024")).await;
        fixtures::fos(&storage, algebra, test, None).await;
        fixtures::fos(&storage, chemistry, exam, Some("2024-2025")).await;

        let rows = storage.fos_report_rows_impl(teacher, "2024-2025").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].discipline, "Алгебра");
        assert_eq!(rows[0].counts, HashMap::from([(exam, 2), (test, 1)]));
        // дисциплина без ФОС за год остаётся в отчёте с пустыми счётчиками
        assert_eq!(rows[1].discipline, "Физика");
        assert!(rows[1].counts.is_empty());

        let rows = storage.fos_report_rows_impl(teacher, "2023-2024").await.unwrap();
        assert_eq!(rows[0].counts, HashMap::from([(test, 1)]));

        let nobody = fixtures::teacher(&storage, "sidorov").await;
        assert!(storage.fos_report_rows_impl(nobody, "2024-2025").await.unwrap().is_empty());
    }
}
