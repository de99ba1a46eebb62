//! Фильтр «мои записи» по умолчанию для списков дисциплин и ФОС
//!
//! Если ни в запросе, ни в адресе страницы, с которой пришёл пользователь
//! (Referer), нет параметров фильтра, список ограничивается его дисциплинами.

use std::collections::HashMap;

use actix_web::web;

use crate::models::disciplines::DisciplineListParams;
use crate::models::fos::FosListParams;
use crate::models::users::entities::User;

/// Значение `scope`, отключающее фильтр по преподавателю
pub const SCOPE_ALL: &str = "all";
/// Значение `scope`, явно выбирающее записи текущего пользователя
pub const SCOPE_MINE: &str = "mine";

/// Параметры списка, к которым применяется фильтр
pub trait ListFilterParams {
    /// Имена параметров фильтра в query string списка
    const FILTER_KEYS: &'static [&'static str];

    fn has_explicit_filter(&self) -> bool;
    fn scope(&self) -> Option<&str>;
    fn set_teacher(&mut self, teacher_id: i64);
}

fn is_set<T>(value: &Option<T>) -> bool {
    value.is_some()
}

fn is_non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ListFilterParams for DisciplineListParams {
    const FILTER_KEYS: &'static [&'static str] = &[
        "teacher_id",
        "type_id",
        "qualification_id",
        "group_id",
        "scope",
    ];

    fn has_explicit_filter(&self) -> bool {
        is_set(&self.teacher_id)
            || is_set(&self.type_id)
            || is_set(&self.qualification_id)
            || is_set(&self.group_id)
            || is_known_scope(self.scope.as_deref())
    }

    fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn set_teacher(&mut self, teacher_id: i64) {
        self.teacher_id = Some(teacher_id);
    }
}

impl ListFilterParams for FosListParams {
    const FILTER_KEYS: &'static [&'static str] = &[
        "teacher_id",
        "type_id",
        "discipline_id",
        "year",
        "scope",
    ];

    fn has_explicit_filter(&self) -> bool {
        is_set(&self.teacher_id)
            || is_set(&self.type_id)
            || is_set(&self.discipline_id)
            || is_non_empty(&self.year)
            || is_known_scope(self.scope.as_deref())
    }

    fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn set_teacher(&mut self, teacher_id: i64) {
        self.teacher_id = Some(teacher_id);
    }
}

/// Query string из заголовка Referer (абсолютный URL или путь), без фрагмента
fn referer_query(referer: &str) -> Option<&str> {
    let without_fragment = referer.split('#').next().unwrap_or(referer);
    without_fragment.split_once('?').map(|(_, query)| query)
}

/// Есть ли в адресе предыдущей страницы непустой параметр фильтра
pub fn referer_has_filter(referer: Option<&str>, filter_keys: &[&str]) -> bool {
    let Some(query) = referer.and_then(referer_query) else {
        return false;
    };
    match web::Query::<HashMap<String, String>>::from_query(query) {
        Ok(params) => filter_keys
            .iter()
            .any(|key| params.get(*key).is_some_and(|v| !v.trim().is_empty())),
        Err(_) => false,
    }
}

/// Подставить фильтр по текущему преподавателю; `true`, если он применён
pub fn apply_default_filter<P: ListFilterParams>(
    params: &mut P,
    user: &User,
    referer: Option<&str>,
) -> bool {
    if is_scope_mine(params.scope()) {
        params.set_teacher(user.id);
        return false;
    }
    if params.has_explicit_filter() {
        return false;
    }
    if referer_has_filter(referer, P::FILTER_KEYS) {
        return false;
    }
    if user.is_superuser() {
        return false;
    }
    params.set_teacher(user.id);
    true
}

/// Отключён ли фильтр по преподавателю явным `scope=all`
pub fn is_scope_all(scope: Option<&str>) -> bool {
    scope.is_some_and(|s| s.trim().eq_ignore_ascii_case(SCOPE_ALL))
}

fn is_known_scope(scope: Option<&str>) -> bool {
    is_scope_all(scope) || is_scope_mine(scope)
}

fn is_scope_mine(scope: Option<&str>) -> bool {
    scope.is_some_and(|s| s.trim().eq_ignore_ascii_case(SCOPE_MINE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: "petrov".to_string(),
            email: "petrov@example.com".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_teacher_gets_own_list_by_default() {
        let mut params = FosListParams::default();
        let applied = apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            None,
        );
        assert!(applied);
        assert_eq!(params.teacher_id, Some(7));
    }

    #[test]
    fn test_explicit_filter_is_kept() {
        let mut params = FosListParams {
            type_id: Some(2),
            ..Default::default()
        };
        assert!(!apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            None
        ));
        assert_eq!(params.teacher_id, None);

        let mut params = DisciplineListParams {
            scope: Some(SCOPE_ALL.to_string()),
            ..Default::default()
        };
        assert!(!apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            None
        ));
        assert_eq!(params.teacher_id, None);
    }

    #[test]
    fn test_empty_year_is_not_a_filter() {
        let params = FosListParams {
            year: Some(String::new()),
            ..Default::default()
        };
        assert!(!params.has_explicit_filter());

        let params = DisciplineListParams {
            scope: Some("whatever".to_string()),
            ..Default::default()
        };
        assert!(!params.has_explicit_filter());
    }

    #[test]
    fn test_referer_with_filter_skips_default() {
        let mut params = DisciplineListParams::default();
        let applied = apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            Some("https://fos.example.com/admin/disciplines/?type_id=3&page=2"),
        );
        assert!(!applied);
        assert_eq!(params.teacher_id, None);
    }

    #[test]
    fn test_referer_without_filter_applies_default() {
        // тот же список, но без фильтров в адресе
        let mut params = FosListParams::default();
        assert!(apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            Some("/admin/fos/"),
        ));
        assert_eq!(params.teacher_id, Some(7));

        let mut params = DisciplineListParams::default();
        assert!(apply_default_filter(
            &mut params,
            &user(7, UserRole::Teacher),
            Some("https://fos.example.com/admin/disciplines/?page=2&q=физика"),
        ));
    }

    #[test]
    fn test_referer_filter_keys_depend_on_list() {
        let referer = Some("/admin/fos/?year=2023-2024");
        assert!(referer_has_filter(referer, FosListParams::FILTER_KEYS));
        assert!(!referer_has_filter(referer, DisciplineListParams::FILTER_KEYS));

        assert!(referer_has_filter(
            Some("/admin/fos/?discipline_id=4#top"),
            FosListParams::FILTER_KEYS
        ));
        assert!(!referer_has_filter(
            Some("/admin/fos/?type_id="),
            FosListParams::FILTER_KEYS
        ));
        assert!(!referer_has_filter(Some("/admin/fos/"), FosListParams::FILTER_KEYS));
        assert!(!referer_has_filter(None, FosListParams::FILTER_KEYS));
    }

    #[test]
    fn test_superuser_is_not_filtered() {
        let mut params = FosListParams::default();
        assert!(!apply_default_filter(
            &mut params,
            &user(1, UserRole::Admin),
            None
        ));
        assert_eq!(params.teacher_id, None);
    }

    #[test]
    fn test_scope_mine_is_explicit_owner_filter() {
        let mut params = FosListParams {
            scope: Some(SCOPE_MINE.to_string()),
            ..Default::default()
        };
        let applied = apply_default_filter(
            &mut params,
            &user(1, UserRole::Admin),
            Some("/admin/fos/"),
        );
        assert!(!applied);
        assert_eq!(params.teacher_id, Some(1));
    }

    #[test]
    fn test_scope_all() {
        assert!(is_scope_all(Some("all")));
        assert!(is_scope_all(Some("ALL")));
        assert!(!is_scope_all(Some("mine")));
        assert!(!is_scope_all(None));
    }
}
