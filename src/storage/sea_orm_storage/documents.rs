use super::SeaOrmStorage;
use crate::entity::documents::{ActiveModel, Column, Entity as Documents};
use crate::errors::{FosAdminError, Result};
use crate::models::documents::{CreateDocument, Document, UpdateDocument};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn get_document_by_id_impl(&self, id: i64) -> Result<Option<Document>> {
        let result = Documents::find_by_id(id).one(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Ошибка запроса документа: {e}"))
        })?;

        Ok(result.map(|m| m.into_document()))
    }

    /// Документы ФОС в порядке добавления
    pub async fn list_documents_by_fos_impl(&self, fos_id: i64) -> Result<Vec<Document>> {
        let result = Documents::find()
            .filter(Column::FosId.eq(fos_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                FosAdminError::database_operation(format!("Ошибка запроса документов: {e}"))
            })?;

        Ok(result.into_iter().map(|m| m.into_document()).collect())
    }

    pub async fn create_document_impl(&self, req: CreateDocument) -> Result<Document> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            fos_id: Set(req.fos_id),
            path: Set(Some(req.file.path)),
            original_name: Set(Some(req.file.original_name)),
            file_size: Set(req.file.file_size),
            content_type: Set(Some(req.file.content_type)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось сохранить документ: {e}"))
        })?;

        Ok(result.into_document())
    }

    /// Изменение названия и (или) замена файла
    pub async fn update_document_impl(
        &self,
        id: i64,
        update: UpdateDocument,
    ) -> Result<Option<Document>> {
        if self.get_document_by_id_impl(id).await?.is_none() {
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

        if let Some(file) = update.file {
            model.path = Set(Some(file.path));
            model.original_name = Set(Some(file.original_name));
            model.file_size = Set(file.file_size);
            model.content_type = Set(Some(file.content_type));
        }

        let result = model.update(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось изменить документ: {e}"))
        })?;

        Ok(Some(result.into_document()))
    }

    pub async fn delete_document_impl(&self, id: i64) -> Result<Option<Document>> {
        let Some(document) = self.get_document_by_id_impl(id).await? else {
            return Ok(None);
        };

        let result = Documents::delete_by_id(id).exec(&self.db).await.map_err(|e| {
            FosAdminError::database_operation(format!("Не удалось удалить документ: {e}"))
        })?;

        Ok((result.rows_affected > 0).then_some(document))
    }
}
