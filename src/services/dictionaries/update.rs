use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DictionaryService, checked_name, item_not_found, storage_failure};
use crate::models::ApiResponse;
use crate::models::dictionaries::{DictionaryItemRequest, DictionaryKind};

pub async fn update_item(
    service: &DictionaryService,
    kind: DictionaryKind,
    id: i64,
    body: DictionaryItemRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let name = match checked_name(&storage, kind, &body.name, Some(id)).await {
        Ok(name) => name,
        Err(response) => return Ok(response),
    };

    match storage.update_dictionary_item(kind, id, name).await {
        Ok(Some(item)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            item,
            format!("{} изменён(а)", kind.item_title()),
        ))),
        Ok(None) => Ok(item_not_found(kind)),
        Err(e) => Ok(storage_failure(e)),
    }
}
