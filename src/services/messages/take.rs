use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::MessageService;
use crate::models::ApiResponse;
use crate::services::current_user;
use crate::utils::flash::take_flashes;

/// Отдать накопленные сообщения и очистить очередь
pub async fn take_messages(
    service: &MessageService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let cache = service.get_cache(request)?;

    let messages = take_flashes(cache.as_ref(), user.id).await;
    if !messages.is_empty() {
        debug!("Delivered {} flash messages to user {}", messages.len(), user.id);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(messages, "Сообщения получены")))
}
