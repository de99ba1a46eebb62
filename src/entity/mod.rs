//! SeaORM-сущности
//!
//! Используются только хранилищем, наружу отдаются модели из `crate::models`.

pub mod prelude;

pub mod discipline_groups;
pub mod discipline_types;
pub mod discipline_users;
pub mod disciplines;
pub mod documents;
pub mod fos;
pub mod fos_types;
pub mod groups;
pub mod qualifications;
pub mod users;

use chrono::{DateTime, Utc};

/// Unix-время из БД в `DateTime<Utc>`
pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
