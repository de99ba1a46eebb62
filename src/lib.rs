//! FOS Admin: бэкенд администрирования фондов оценочных средств
//!
//! Actix Web поверх SeaORM.
//!
//! # Архитектура
//! - `cache`: кэш (Moka/Redis)
//! - `config`: конфигурация
//! - `entity`: сущности SeaORM
//! - `errors`: единый тип ошибок
//! - `middlewares`: аутентификация, роли, ограничение частоты
//! - `models`: модели API
//! - `routes`: маршруты
//! - `runtime`: запуск и остановка
//! - `services`: бизнес-логика (права, фильтры, отчёты, склейка DOCX)
//! - `storage`: хранилище (SeaORM)
//! - `utils`: вспомогательные функции

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
