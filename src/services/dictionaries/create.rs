use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DictionaryService, checked_name, storage_failure};
use crate::models::ApiResponse;
use crate::models::dictionaries::{DictionaryItemRequest, DictionaryKind};

pub async fn create_item(
    service: &DictionaryService,
    kind: DictionaryKind,
    body: DictionaryItemRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let name = match checked_name(&storage, kind, &body.name, None).await {
        Ok(name) => name,
        Err(response) => return Ok(response),
    };

    match storage.create_dictionary_item(kind, name).await {
        Ok(item) => {
            tracing::info!("Dictionary {} item {} created", kind, item.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                item,
                format!("{} добавлен(а)", kind.item_title()),
            )))
        }
        Err(e) => Ok(storage_failure(e)),
    }
}
