use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Документ ФОС
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/document.ts")]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub fos_id: i64,
    /// Путь относительно каталога загрузок
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub path: Option<String>,
    pub original_name: Option<String>,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    pub fn has_file(&self) -> bool {
        self.path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Имя файла для скачивания
    pub fn download_name(&self) -> String {
        self.original_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.path
                    .as_deref()
                    .and_then(|p| p.rsplit('/').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("document_{}", self.id))
    }
}

/// Сохранённый на диск файл
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub original_name: String,
    pub file_size: i64,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub name: String,
    pub fos_id: i64,
    pub file: StoredFile,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub file: Option<StoredFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(path: Option<&str>, original_name: Option<&str>) -> Document {
        Document {
            id: 9,
            name: "Билеты".to_string(),
            fos_id: 1,
            path: path.map(str::to_string),
            original_name: original_name.map(str::to_string),
            file_size: 0,
            content_type: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_has_file() {
        assert!(document(Some("documents/a.docx"), None).has_file());
        assert!(!document(Some(""), None).has_file());
        assert!(!document(None, None).has_file());
    }

    #[test]
    fn test_download_name() {
        assert_eq!(
            document(Some("documents/a.docx"), Some("Билеты.docx")).download_name(),
            "Билеты.docx"
        );
        assert_eq!(document(Some("documents/a.docx"), None).download_name(), "a.docx");
        assert_eq!(document(None, None).download_name(), "document_9");
    }
}
