pub mod docx;
pub mod extractor;
pub mod file_magic;
pub mod flash;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod plural;
pub mod sql;
pub mod translit;
pub mod validate;

pub use extractor::{SafeDictionaryKind, SafeIDI64};
pub use file_magic::{content_type_for_extension, validate_magic_bytes};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use plural::ru_plural;
pub use sql::contains_pattern;
pub use translit::{safe_file_stem, translit};
