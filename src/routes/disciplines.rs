use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::disciplines::{
    CreateDisciplineRequest, DisciplineListParams, UpdateDisciplineRequest,
};
use crate::services::DisciplineService;
use crate::utils::SafeIDI64;

static DISCIPLINE_SERVICE: Lazy<DisciplineService> = Lazy::new(DisciplineService::new_lazy);

pub async fn list_disciplines(
    req: HttpRequest,
    query: web::Query<DisciplineListParams>,
) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE
        .list_disciplines(query.into_inner(), &req)
        .await
}

pub async fn filter_options(req: HttpRequest) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE.filter_options(&req).await
}

pub async fn get_discipline(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE.get_discipline(id.0, &req).await
}

pub async fn create_discipline(
    req: HttpRequest,
    body: web::Json<CreateDisciplineRequest>,
) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE
        .create_discipline(body.into_inner(), &req)
        .await
}

pub async fn update_discipline(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateDisciplineRequest>,
) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE
        .update_discipline(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_discipline(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE.delete_discipline(id.0, &req).await
}

pub async fn import_disciplines(
    req: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    DISCIPLINE_SERVICE.import_disciplines(payload, &req).await
}

pub fn configure_discipline_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/disciplines")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/import")
                    .wrap(middlewares::RateLimit::import())
                    .wrap(middlewares::RequireRole::admin())
                    .route(web::post().to(import_disciplines)),
            )
            .route("/filters", web::get().to(filter_options))
            .route("", web::get().to(list_disciplines))
            .route("", web::post().to(create_discipline))
            .route("/{id}", web::get().to(get_discipline))
            .route("/{id}", web::put().to(update_discipline))
            .route("/{id}", web::delete().to(delete_discipline)),
    );
}
