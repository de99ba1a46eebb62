//! Проверенные параметры пути
//!
//! Некорректное значение сразу даёт `400` в формате `ApiResponse`.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::dictionaries::DictionaryKind;
use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(code: ErrorCode, message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message)),
    )
    .into()
}

/// Положительный i64 из сегмента пути
fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(
            ErrorCode::BadRequest,
            format!("Некорректный идентификатор '{name}': {raw}"),
        )),
    }
}

macro_rules! define_safe_id_extractor {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_id(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_id_extractor! {
    SafeIDI64 => "id",
}

/// Вид справочника из `{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeDictionaryKind(pub DictionaryKind);

impl FromRequest for SafeDictionaryKind {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("kind").unwrap_or_default();
        ready(raw.parse().map(SafeDictionaryKind).map_err(|_| {
            bad_path_param(
                ErrorCode::DictionaryKindInvalid,
                format!("Неизвестный справочник: {raw}"),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id() {
        let req = TestRequest::default().param("id", "15").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);
    }

    #[actix_web::test]
    async fn test_invalid_ids() {
        for raw in ["0", "-3", "abc", ""] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    #[actix_web::test]
    async fn test_dictionary_kind() {
        let req = TestRequest::default()
            .param("kind", "qualifications")
            .to_http_request();
        let kind = SafeDictionaryKind::extract(&req).await.unwrap();
        assert_eq!(kind.0, DictionaryKind::Qualifications);

        let req = TestRequest::default().param("kind", "users").to_http_request();
        assert!(SafeDictionaryKind::extract(&req).await.is_err());
    }
}
