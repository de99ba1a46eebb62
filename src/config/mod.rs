//! Конфигурация приложения
//!
//! Порядок источников: `config.toml`, `config.{APP_ENV}.toml`, переменные окружения.

mod r#impl;
mod structs;

pub use structs::*;
