use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DictionaryService, storage_failure};
use crate::models::ApiResponse;
use crate::models::dictionaries::{DictionaryKind, DictionaryListParams, DictionaryListQuery};

pub async fn list_items(
    service: &DictionaryService,
    kind: DictionaryKind,
    query: DictionaryListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_dictionary_items(kind, DictionaryListQuery::from(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Справочник получен",
        ))),
        Err(e) => Ok(storage_failure(e)),
    }
}
