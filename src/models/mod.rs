//! Модели API и бизнес-сущности
//!
//! Отделены от SeaORM-сущностей (`crate::entity`): хранилище конвертирует
//! модели БД в эти типы.

pub mod auth;
pub mod common;
pub mod dictionaries;
pub mod disciplines;
pub mod documents;
pub mod fos;
pub mod groups;
pub mod messages;
pub mod reports;
pub mod users;

pub use common::{
    ApiResponse, FilterOptions, ImportResult, ImportRowError, NamedRef, PaginatedResponse,
    PaginationInfo, PaginationQuery, UserBrief,
};

use serde::{Deserialize, Serialize};

/// Время запуска приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// Коды ответов API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Общие
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // Аутентификация
    AuthFailed = 2000,

    // Пользователи
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserCreationFailed = 3005,
    UserUpdateFailed = 3006,
    UserDeleteFailed = 3007,
    CanNotDeleteCurrentUser = 3008,

    // Справочники и группы
    DictionaryKindInvalid = 4000,
    DictionaryItemNotFound = 4001,
    DictionaryItemInUse = 4002,
    GroupNotFound = 4100,
    GroupCourseInvalid = 4101,

    // Дисциплины
    DisciplineNotFound = 5000,
    DisciplinePermissionDenied = 5001,
    DisciplineInvalid = 5002,

    // ФОС
    FosNotFound = 6000,
    FosPermissionDenied = 6001,
    FosInvalid = 6002,
    AcademicYearInvalid = 6003,

    // Документы и файлы
    DocumentNotFound = 7000,
    DocumentPermissionDenied = 7001,
    FileNotFound = 7100,
    FileUploadFailed = 7101,
    FileTypeNotAllowed = 7102,
    FileSizeExceeded = 7103,
    MultifileUploadNotAllowed = 7104,

    // Отчёты
    ReportGenerationFailed = 8000,
    ReportParameterMissing = 8001,

    // Импорт
    ImportFileParseFailed = 9000,
    ImportFileMissingColumn = 9001,
    ImportFileDataInvalid = 9002,
}
