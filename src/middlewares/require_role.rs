/*!
 * Доступ по роли
 *
 * Работает внутри области с `RequireJWT`: роль берётся у пользователя,
 * которого тот положил в extensions. Справочники, группы, пользователи и
 * импорт дисциплин меняет только администратор:
 *
 * ```rust,ignore
 * web::scope("/api/v1/groups")
 *     .wrap(RequireJWT)
 *     .service(web::scope("").wrap(RequireRole::admin()).route(...))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[UserRole]>,
}

impl RequireRole {
    /// Любая из перечисленных ролей
    pub fn any_of(roles: &[&UserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|role| (*role).clone()).collect(),
        }
    }

    /// Только администратор (суперпользователь)
    pub fn admin() -> Self {
        Self::any_of(UserRole::admin_roles())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<[UserRole]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed = self.allowed.clone();

        Box::pin(async move {
            let user = req
                .extensions()
                .get::<User>()
                .map(|user| (user.id, user.role.clone()));

            let (status, code, message) = match user {
                Some((_, role)) if allowed.contains(&role) => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some((user_id, role)) => {
                    info!(
                        "Access denied for user {} with role {}, allowed: {:?}",
                        user_id, role, allowed
                    );
                    (
                        StatusCode::FORBIDDEN,
                        ErrorCode::Forbidden,
                        "Действие доступно только администратору",
                    )
                }
                None => {
                    info!("Role check without authenticated user: RequireJWT is missing");
                    (
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Требуется вход в систему",
                    )
                }
            };

            Ok(req.into_response(create_error_response(status, code, message).map_into_right_body()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;
    use actix_web::{App, HttpResponse, test, web};

    fn user(role: UserRole) -> User {
        User {
            id: 7,
            username: "petrov".to_string(),
            email: "petrov@example.com".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    async fn status_for(user: Option<User>) -> StatusCode {
        let app = test::init_service(
            App::new()
                .wrap(RequireRole::admin())
                .wrap_fn(move |req, srv| {
                    if let Some(user) = user.clone() {
                        req.extensions_mut().insert(user);
                    }
                    srv.call(req)
                })
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri("/").to_request())
            .await
            .status()
    }

    #[actix_web::test]
    async fn test_admin_passes() {
        assert_eq!(status_for(Some(user(UserRole::Admin))).await, StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_teacher_is_forbidden() {
        assert_eq!(
            status_for(Some(user(UserRole::Teacher))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
