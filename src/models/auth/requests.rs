use serde::Deserialize;
use ts_rs::TS;

/// Вход в систему
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    /// Логин или email
    pub username: String,
    /// Пароль
    pub password: String,
    /// Продлённый срок refresh-токена
    #[serde(default)]
    pub remember_me: bool,
}
