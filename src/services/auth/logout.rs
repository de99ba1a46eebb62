use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use crate::middlewares::require_jwt::user_cache_key;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// Выход: refresh-cookie обнуляется, пользователь удаляется из кэша
pub async fn handle_logout(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    if let Some(token) = token
        && let Ok(cache) = crate::services::cache_from_request(request)
    {
        cache.remove(&user_cache_key(token)).await;
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::success_empty("Выход выполнен")))
}
