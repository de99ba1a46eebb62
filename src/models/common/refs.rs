use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Ссылка на запись справочника или связанную сущность
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Краткие сведения о преподавателе
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
pub struct UserBrief {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
}

impl UserBrief {
    /// Имя для отображения: ФИО, если задано, иначе логин
    pub fn full_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_falls_back_to_username() {
        let mut user = UserBrief {
            id: 1,
            username: "ivanov".to_string(),
            display_name: None,
        };
        assert_eq!(user.full_name(), "ivanov");

        user.display_name = Some("  ".to_string());
        assert_eq!(user.full_name(), "ivanov");

        user.display_name = Some("Иванов И.И.".to_string());
        assert_eq!(user.full_name(), "Иванов И.И.");
    }
}
