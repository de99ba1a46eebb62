use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::fos::{CreateFosRequest, FosListParams, UpdateFosRequest};
use crate::services::FosService;
use crate::utils::SafeIDI64;

static FOS_SERVICE: Lazy<FosService> = Lazy::new(FosService::new_lazy);

pub async fn list_fos(
    req: HttpRequest,
    query: web::Query<FosListParams>,
) -> ActixResult<HttpResponse> {
    FOS_SERVICE.list_fos(query.into_inner(), &req).await
}

pub async fn filter_options(req: HttpRequest) -> ActixResult<HttpResponse> {
    FOS_SERVICE.filter_options(&req).await
}

pub async fn get_fos(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FOS_SERVICE.get_fos(id.0, &req).await
}

pub async fn create_fos(
    req: HttpRequest,
    body: web::Json<CreateFosRequest>,
) -> ActixResult<HttpResponse> {
    FOS_SERVICE.create_fos(body.into_inner(), &req).await
}

pub async fn update_fos(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateFosRequest>,
) -> ActixResult<HttpResponse> {
    FOS_SERVICE.update_fos(id.0, body.into_inner(), &req).await
}

pub async fn delete_fos(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FOS_SERVICE.delete_fos(id.0, &req).await
}

pub async fn merge_documents(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FOS_SERVICE.merge_documents(id.0, &req).await
}

pub fn configure_fos_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/fos")
            .wrap(middlewares::RequireJWT)
            .route("/filters", web::get().to(filter_options))
            .route("", web::get().to(list_fos))
            .route("", web::post().to(create_fos))
            .route("/{id}", web::get().to(get_fos))
            .route("/{id}", web::put().to(update_fos))
            .route("/{id}", web::delete().to(delete_fos))
            .route("/{id}/merge", web::get().to(merge_documents)),
    );
}
