//! Единая обработка ошибок
//!
//! Тип ошибки генерируется макросом: у каждого варианта есть код и название типа.

use std::fmt;

/// Макрос определения типа ошибок
///
/// Генерирует:
/// - enum с вариантами
/// - code() - код ошибки
/// - error_type() - название типа ошибки
/// - message() - текст ошибки
/// - конструкторы в snake_case
macro_rules! define_fos_admin_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum FosAdminError {
            $($variant(String),)*
        }

        impl FosAdminError {
            /// Код ошибки
            pub fn code(&self) -> &'static str {
                match self {
                    $(FosAdminError::$variant(_) => $code,)*
                }
            }

            /// Название типа ошибки
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(FosAdminError::$variant(_) => $type_name,)*
                }
            }

            /// Текст ошибки
            pub fn message(&self) -> &str {
                match self {
                    $(FosAdminError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl FosAdminError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        FosAdminError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_fos_admin_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    DocumentFormat("E014", "Document Format Error"),
    ReportGeneration("E015", "Report Generation Error"),
    Conflict("E016", "Resource Conflict"),
}

impl FosAdminError {
    /// Цветной вывод (для разработки)
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// Краткий вывод
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Нарушение внешнего ключа (удаление используемой записи)
    pub fn is_foreign_key_violation(&self) -> bool {
        let msg = self.message();
        msg.contains("FOREIGN KEY constraint failed")
            || msg.contains("violates foreign key constraint")
            || msg.contains("a foreign key constraint fails")
    }

    /// Нарушение уникальности
    pub fn is_unique_violation(&self) -> bool {
        let msg = self.message();
        msg.contains("UNIQUE constraint failed")
            || msg.contains("duplicate key value")
            || msg.contains("Duplicate entry")
    }
}

impl fmt::Display for FosAdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FosAdminError {}

impl From<sea_orm::DbErr> for FosAdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        FosAdminError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for FosAdminError {
    fn from(err: std::io::Error) -> Self {
        FosAdminError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for FosAdminError {
    fn from(err: serde_json::Error) -> Self {
        FosAdminError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for FosAdminError {
    fn from(err: chrono::ParseError) -> Self {
        FosAdminError::DateParse(err.to_string())
    }
}

impl From<zip::result::ZipError> for FosAdminError {
    fn from(err: zip::result::ZipError) -> Self {
        FosAdminError::DocumentFormat(err.to_string())
    }
}

impl From<quick_xml::Error> for FosAdminError {
    fn from(err: quick_xml::Error) -> Self {
        FosAdminError::DocumentFormat(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for FosAdminError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        FosAdminError::ReportGeneration(err.to_string())
    }
}

impl From<csv::Error> for FosAdminError {
    fn from(err: csv::Error) -> Self {
        FosAdminError::ReportGeneration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FosAdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FosAdminError::cache_connection("test").code(), "E001");
        assert_eq!(FosAdminError::database_config("test").code(), "E003");
        assert_eq!(FosAdminError::validation("test").code(), "E007");
        assert_eq!(FosAdminError::document_format("test").code(), "E014");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            FosAdminError::report_generation("test").error_type(),
            "Report Generation Error"
        );
        assert_eq!(
            FosAdminError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = FosAdminError::not_found("ФОС 7");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("ФОС 7"));
    }

    #[test]
    fn test_constraint_detection() {
        let sqlite = FosAdminError::database_operation(
            "Execution Error: error returned from database: FOREIGN KEY constraint failed",
        );
        assert!(sqlite.is_foreign_key_violation());
        assert!(!sqlite.is_unique_violation());

        let pg = FosAdminError::database_operation(
            "duplicate key value violates unique constraint \"users_username_key\"",
        );
        assert!(pg.is_unique_violation());
    }
}
