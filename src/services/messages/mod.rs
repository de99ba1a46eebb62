pub mod take;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;

/// Одноразовые сообщения текущего пользователя
pub struct MessageService {
    cache: Option<Arc<dyn ObjectCache>>,
}

impl MessageService {
    pub fn new_lazy() -> Self {
        Self { cache: None }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
        match &self.cache {
            Some(cache) => Ok(cache.clone()),
            None => super::cache_from_request(request),
        }
    }

    pub async fn take_messages(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        take::take_messages(self, request).await
    }
}
