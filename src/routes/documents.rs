use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::DocumentService;
use crate::utils::SafeIDI64;

static DOCUMENT_SERVICE: Lazy<DocumentService> = Lazy::new(DocumentService::new_lazy);

pub async fn create_document(
    req: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE.create_document(&req, payload).await
}

pub async fn download_document(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE.download_document(id.0, &req).await
}

pub async fn update_document(
    req: HttpRequest,
    id: SafeIDI64,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE.update_document(id.0, &req, payload).await
}

pub async fn delete_document(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE.delete_document(id.0, &req).await
}

pub fn configure_document_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/documents")
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(create_document))
            .service(
                web::resource("/{id}/download")
                    .wrap(middleware::Compress::default())
                    .route(web::get().to(download_document)),
            )
            .route("/{id}", web::put().to(update_document))
            .route("/{id}", web::delete().to(delete_document)),
    );
}
