use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::dictionaries::{DictionaryItemRequest, DictionaryListParams};
use crate::services::DictionaryService;
use crate::utils::{SafeDictionaryKind, SafeIDI64};

static DICTIONARY_SERVICE: Lazy<DictionaryService> = Lazy::new(DictionaryService::new_lazy);

pub async fn list_items(
    req: HttpRequest,
    kind: SafeDictionaryKind,
    query: web::Query<DictionaryListParams>,
) -> ActixResult<HttpResponse> {
    DICTIONARY_SERVICE
        .list_items(kind.0, query.into_inner(), &req)
        .await
}

pub async fn get_item(
    req: HttpRequest,
    kind: SafeDictionaryKind,
    id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    DICTIONARY_SERVICE.get_item(kind.0, id.0, &req).await
}

pub async fn create_item(
    req: HttpRequest,
    kind: SafeDictionaryKind,
    body: web::Json<DictionaryItemRequest>,
) -> ActixResult<HttpResponse> {
    DICTIONARY_SERVICE
        .create_item(kind.0, body.into_inner(), &req)
        .await
}

pub async fn update_item(
    req: HttpRequest,
    kind: SafeDictionaryKind,
    id: SafeIDI64,
    body: web::Json<DictionaryItemRequest>,
) -> ActixResult<HttpResponse> {
    DICTIONARY_SERVICE
        .update_item(kind.0, id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_item(
    req: HttpRequest,
    kind: SafeDictionaryKind,
    id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    DICTIONARY_SERVICE.delete_item(kind.0, id.0, &req).await
}

pub fn configure_dictionary_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dictionaries/{kind}")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_items))
            .route("/{id}", web::get().to(get_item))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::admin())
                    .route("", web::post().to(create_item))
                    .route("/{id}", web::put().to(update_item))
                    .route("/{id}", web::delete().to(delete_item)),
            ),
    );
}
