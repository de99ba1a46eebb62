use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::groups::{CreateGroupRequest, GroupListParams, UpdateGroupRequest};
use crate::services::GroupService;
use crate::utils::SafeIDI64;

static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);

pub async fn list_groups(
    req: HttpRequest,
    query: web::Query<GroupListParams>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(query.into_inner(), &req).await
}

pub async fn get_group(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.get_group(id.0, &req).await
}

pub async fn create_group(
    req: HttpRequest,
    body: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.create_group(body.into_inner(), &req).await
}

pub async fn update_group(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .update_group(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_group(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.delete_group(id.0, &req).await
}

pub fn configure_group_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_groups))
            .route("/{id}", web::get().to(get_group))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::admin())
                    .route("", web::post().to(create_group))
                    .route("/{id}", web::put().to(update_group))
                    .route("/{id}", web::delete().to(delete_group)),
            ),
    );
}
