use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Одноразовое сообщение для пользователя
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}
