use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DictionaryService, item_not_found, storage_failure};
use crate::models::ApiResponse;
use crate::models::dictionaries::DictionaryKind;

pub async fn get_item(
    service: &DictionaryService,
    kind: DictionaryKind,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_dictionary_item(kind, id).await {
        Ok(Some(item)) => Ok(HttpResponse::Ok().json(ApiResponse::success(item, "Запись получена"))),
        Ok(None) => Ok(item_not_found(kind)),
        Err(e) => Ok(storage_failure(e)),
    }
}
