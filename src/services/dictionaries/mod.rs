//! Справочники: типы ФОС, типы дисциплин, квалификации

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::FosAdminError;
use crate::models::dictionaries::{
    DictionaryItemRequest, DictionaryKind, DictionaryListParams,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

pub struct DictionaryService {
    storage: Option<Arc<dyn Storage>>,
}

impl DictionaryService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_items(
        &self,
        kind: DictionaryKind,
        query: DictionaryListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_items(self, kind, query, request).await
    }

    pub async fn get_item(
        &self,
        kind: DictionaryKind,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_item(self, kind, id, request).await
    }

    pub async fn create_item(
        &self,
        kind: DictionaryKind,
        body: DictionaryItemRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_item(self, kind, body, request).await
    }

    pub async fn update_item(
        &self,
        kind: DictionaryKind,
        id: i64,
        body: DictionaryItemRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_item(self, kind, id, body, request).await
    }

    pub async fn delete_item(
        &self,
        kind: DictionaryKind,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_item(self, kind, id, request).await
    }
}

/// Проверенное название, не занятое другой записью того же справочника
async fn checked_name(
    storage: &Arc<dyn Storage>,
    kind: DictionaryKind,
    name: &str,
    current_id: Option<i64>,
) -> Result<String, HttpResponse> {
    let name = validate_name(name)
        .map_err(|msg| super::bad_request(ErrorCode::BadRequest, msg))?;

    match storage.find_dictionary_item_by_name(kind, &name).await {
        Ok(Some(existing)) if Some(existing.id) != current_id => {
            Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::Conflict,
                format!("{} «{}» уже существует", kind.item_title(), name),
            )))
        }
        Ok(_) => Ok(name),
        Err(e) => Err(storage_failure(e)),
    }
}

fn storage_failure(e: FosAdminError) -> HttpResponse {
    super::internal_error(
        ErrorCode::InternalServerError,
        format!("Ошибка справочника: {e}"),
    )
}

fn item_not_found(kind: DictionaryKind) -> HttpResponse {
    super::not_found(
        ErrorCode::DictionaryItemNotFound,
        match kind {
            DictionaryKind::FosTypes => "Тип ФОС не найден",
            DictionaryKind::DisciplineTypes => "Тип дисциплины не найден",
            DictionaryKind::Qualifications => "Квалификация не найдена",
        },
    )
}
