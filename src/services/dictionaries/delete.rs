use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DictionaryService, item_not_found, storage_failure};
use crate::models::dictionaries::DictionaryKind;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_item(
    service: &DictionaryService,
    kind: DictionaryKind,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_dictionary_item(kind, id).await {
        Ok(true) => {
            tracing::info!("Dictionary {} item {} deleted", kind, id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(format!(
                "{} удалён(а)",
                kind.item_title()
            ))))
        }
        Ok(false) => Ok(item_not_found(kind)),
        // запись ещё используется дисциплинами или ФОС
        Err(e) if e.is_foreign_key_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::DictionaryItemInUse,
                format!("{} используется и не может быть удалён(а)", kind.item_title()),
            ),
        )),
        Err(e) => Ok(storage_failure(e)),
    }
}
