//! Одноразовые сообщения и перенаправления для файловых эндпоинтов
//!
//! Сообщения хранятся в кэше под ключом `flash:{user_id}` и забираются
//! фронтендом через `GET /api/v1/messages` после перехода по `303 See Other`.

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use tracing::warn;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::messages::{FlashLevel, FlashMessage};

/// Главная страница админки
pub const ADMIN_INDEX_PATH: &str = "/admin/";

/// Страница редактирования ФОС
pub fn fos_change_path(fos_id: i64) -> String {
    format!("/admin/fos/{fos_id}/change")
}

fn flash_key(user_id: i64) -> String {
    format!("flash:{user_id}")
}

pub async fn push_flash(cache: &dyn ObjectCache, user_id: i64, message: FlashMessage) {
    let key = flash_key(user_id);
    let mut queue: Vec<FlashMessage> = match cache.get_raw(&key).await {
        CacheResult::Found(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => Vec::new(),
    };
    queue.push(message);

    match serde_json::to_string(&queue) {
        Ok(raw) => {
            cache
                .insert_raw(key, raw, AppConfig::get().cache.default_ttl)
                .await
        }
        Err(e) => warn!("Failed to serialize flash messages: {}", e),
    }
}

/// Забрать и удалить все сообщения пользователя
pub async fn take_flashes(cache: &dyn ObjectCache, user_id: i64) -> Vec<FlashMessage> {
    let key = flash_key(user_id);
    let messages = match cache.get_raw(&key).await {
        CacheResult::Found(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => return Vec::new(),
    };
    cache.remove(&key).await;
    messages
}

pub fn redirect_see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Поставить сообщения в очередь текущего пользователя и перенаправить
pub async fn flash_and_redirect(
    req: &HttpRequest,
    messages: Vec<(FlashLevel, String)>,
    location: &str,
) -> HttpResponse {
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    match (cache, RequireJWT::extract_user_id(req)) {
        (Some(cache), Some(user_id)) => {
            for (level, message) in messages {
                push_flash(cache.as_ref(), user_id, FlashMessage { level, message }).await;
            }
        }
        _ => warn!("Flash messages dropped: no cache or user in request"),
    }

    redirect_see_other(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;

    #[tokio::test]
    async fn test_messages_are_queued_and_taken_once() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        push_flash(
            &cache,
            5,
            FlashMessage {
                level: FlashLevel::Error,
                message: "Первое".into(),
            },
        )
        .await;
        push_flash(
            &cache,
            5,
            FlashMessage {
                level: FlashLevel::Info,
                message: "Второе".into(),
            },
        )
        .await;

        let messages = take_flashes(&cache, 5).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "Первое");
        assert_eq!(messages[1].level, FlashLevel::Info);

        assert!(take_flashes(&cache, 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_queues_are_per_user() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        push_flash(
            &cache,
            1,
            FlashMessage {
                level: FlashLevel::Success,
                message: "ok".into(),
            },
        )
        .await;
        assert!(take_flashes(&cache, 2).await.is_empty());
        assert_eq!(take_flashes(&cache, 1).await.len(), 1);
    }

    #[test]
    fn test_redirect() {
        let resp = redirect_see_other(&fos_change_path(12));
        assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/admin/fos/12/change"
        );
    }
}
