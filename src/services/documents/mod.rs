//! Документы ФОС: загрузка, скачивание, замена и удаление файлов

pub mod create;
pub mod delete;
pub mod download;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::documents::Document;
use crate::models::fos::FosDetail;
use crate::storage::Storage;

pub struct DocumentService {
    storage: Option<Arc<dyn Storage>>,
}

impl DocumentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_document(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        create::create_document(self, request, payload).await
    }

    pub async fn download_document(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        download::download_document(self, id, request).await
    }

    pub async fn update_document(
        &self,
        id: i64,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        update::update_document(self, id, request, payload).await
    }

    pub async fn delete_document(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_document(self, id, request).await
    }
}

/// Документ вместе с его ФОС или готовый ответ об ошибке
async fn load_document_with_fos(
    storage: &Arc<dyn Storage>,
    id: i64,
) -> Result<(Document, FosDetail), HttpResponse> {
    let document = match storage.get_document_by_id(id).await {
        Ok(Some(document)) => document,
        Ok(None) => {
            return Err(super::not_found(
                ErrorCode::DocumentNotFound,
                "Документ не найден",
            ));
        }
        Err(e) => {
            return Err(super::internal_error(
                ErrorCode::InternalServerError,
                format!("Ошибка получения документа: {e}"),
            ));
        }
    };

    match storage.get_fos_by_id(document.fos_id).await {
        Ok(Some(fos)) => Ok((document, fos)),
        Ok(None) => Err(super::not_found(ErrorCode::FosNotFound, "ФОС не найден")),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения ФОС: {e}"),
        )),
    }
}
