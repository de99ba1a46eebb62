//! Справочники: типы ФОС, типы дисциплин, квалификации
//!
//! Все три таблицы устроены одинаково, поэтому API у них общий,
//! а конкретная таблица выбирается по [`DictionaryKind`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{NamedRef, PaginationInfo, PaginationQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "../frontend/src/types/generated/dictionary.ts")]
pub enum DictionaryKind {
    FosTypes,
    DisciplineTypes,
    Qualifications,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 3] = [
        DictionaryKind::FosTypes,
        DictionaryKind::DisciplineTypes,
        DictionaryKind::Qualifications,
    ];

    /// Сегмент пути в URL
    pub fn slug(&self) -> &'static str {
        match self {
            DictionaryKind::FosTypes => "fos-types",
            DictionaryKind::DisciplineTypes => "discipline-types",
            DictionaryKind::Qualifications => "qualifications",
        }
    }

    /// Название записи для сообщений
    pub fn item_title(&self) -> &'static str {
        match self {
            DictionaryKind::FosTypes => "Тип ФОС",
            DictionaryKind::DisciplineTypes => "Тип дисциплины",
            DictionaryKind::Qualifications => "Квалификация",
        }
    }
}

impl std::fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("Unknown dictionary: {s}"))
    }
}

/// Запись справочника
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dictionary.ts")]
pub struct DictionaryItem {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<DictionaryItem> for NamedRef {
    fn from(item: DictionaryItem) -> Self {
        NamedRef {
            id: item.id,
            name: item.name,
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dictionary.ts")]
pub struct DictionaryListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

/// Создание и изменение записи
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dictionary.ts")]
pub struct DictionaryItemRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DictionaryListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}

impl From<DictionaryListParams> for DictionaryListQuery {
    fn from(params: DictionaryListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dictionary.ts")]
pub struct DictionaryListResponse {
    pub items: Vec<DictionaryItem>,
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_slugs() {
        for kind in DictionaryKind::ALL {
            assert_eq!(kind.slug().parse::<DictionaryKind>().unwrap(), kind);
        }
        assert!("users".parse::<DictionaryKind>().is_err());
    }

    #[test]
    fn test_kind_serde_matches_slug() {
        let json = serde_json::to_string(&DictionaryKind::DisciplineTypes).unwrap();
        assert_eq!(json, "\"discipline-types\"");
    }
}
