use sea_orm::sea_query::LikeExpr;

/// Экранирование `%`, `_` и `\` для LIKE
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Поиск подстроки через LIKE с `ESCAPE '\'`
pub fn contains_pattern(input: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_pattern(input))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::groups::{Column, Entity as Groups};
    use sea_orm::{ColumnTrait, DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_escape() {
        assert_eq!(escape_like_pattern("ФОС"), "ФОС");
        assert_eq!(escape_like_pattern("100%_done\\"), "100\\%\\_done\\\\");
    }

    #[test]
    fn test_contains_pattern_emits_escape_clause() {
        let sql = Groups::find()
            .filter(Column::Name.like(contains_pattern("a_b")))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains(r"%a\_b%"), "{sql}");
    }
}
