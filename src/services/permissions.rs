//! Права доступа к строкам
//!
//! Чистые функции над уже загруженными связями. Владельцы записи берутся по
//! цепочке Документ -> ФОС -> Дисциплина -> преподаватели.

use crate::models::disciplines::DisciplineDetail;
use crate::models::documents::Document;
use crate::models::fos::FosDetail;
use crate::models::users::entities::User;

/// Запись, у которой есть владельцы-преподаватели
pub trait Owned {
    fn owner_ids(&self) -> Vec<i64>;
}

impl Owned for DisciplineDetail {
    fn owner_ids(&self) -> Vec<i64> {
        self.teachers.iter().map(|t| t.id).collect()
    }
}

impl Owned for FosDetail {
    fn owner_ids(&self) -> Vec<i64> {
        self.teachers.iter().map(|t| t.id).collect()
    }
}

/// Документ вместе с загруженным ФОС
pub struct OwnedDocument<'a> {
    pub document: &'a Document,
    pub fos: &'a FosDetail,
}

impl Owned for OwnedDocument<'_> {
    fn owner_ids(&self) -> Vec<i64> {
        if self.document.fos_id != self.fos.id {
            return Vec::new();
        }
        self.fos.owner_ids()
    }
}

pub fn has_view_permission(user: &User) -> bool {
    user.is_active()
}

pub fn has_change_permission(user: &User, owned: &impl Owned) -> bool {
    if !user.is_active() {
        return false;
    }
    user.is_superuser() || owned.owner_ids().contains(&user.id)
}

/// Добавление записи под `parent` (ФОС под дисциплину, документ под ФОС)
pub fn has_add_permission(user: &User, parent: &impl Owned) -> bool {
    has_change_permission(user, parent)
}

pub fn has_delete_permission(user: &User, owned: &impl Owned) -> bool {
    has_change_permission(user, owned)
}

/// Справочники, группы и пользователи
pub fn can_manage_reference_data(user: &User) -> bool {
    user.is_active() && user.is_superuser()
}

/// Отчёт по ФОС преподавателя: свой или любой для администратора
pub fn can_export_teacher_report(user: &User, teacher_id: i64) -> bool {
    user.is_active() && (user.is_superuser() || user.id == teacher_id)
}

/// Преподаватели новой дисциплины: автор-преподаватель всегда среди них
pub fn discipline_teachers_for(user: &User, mut requested: Vec<i64>) -> Vec<i64> {
    if !user.is_superuser() && !requested.contains(&user.id) {
        requested.push(user.id);
    }
    requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};
    use crate::models::{NamedRef, UserBrief};

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn teacher(id: i64) -> UserBrief {
        UserBrief {
            id,
            username: format!("user{id}"),
            display_name: None,
        }
    }

    fn fos(id: i64, teachers: &[i64]) -> FosDetail {
        FosDetail {
            id,
            name: "Тест".to_string(),
            description: None,
            fos_type: NamedRef {
                id: 1,
                name: "Реферат".to_string(),
            },
            discipline: NamedRef {
                id: 3,
                name: "Физика".to_string(),
            },
            teachers: teachers.iter().copied().map(teacher).collect(),
            year: None,
            document_count: 0,
            documents: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn document(fos_id: i64) -> Document {
        Document {
            id: 1,
            name: "Билеты".to_string(),
            fos_id,
            path: None,
            original_name: None,
            file_size: 0,
            content_type: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_owner_can_change() {
        let fos = fos(10, &[2, 3]);
        assert!(has_change_permission(&user(2, UserRole::Teacher), &fos));
        assert!(has_delete_permission(&user(3, UserRole::Teacher), &fos));
        assert!(!has_change_permission(&user(4, UserRole::Teacher), &fos));
    }

    #[test]
    fn test_superuser_can_change_anything() {
        let fos = fos(10, &[]);
        assert!(has_change_permission(&user(1, UserRole::Admin), &fos));
        assert!(has_add_permission(&user(1, UserRole::Admin), &fos));
    }

    #[test]
    fn test_inactive_user_is_denied() {
        let mut owner = user(2, UserRole::Teacher);
        owner.status = UserStatus::Suspended;
        assert!(!has_view_permission(&owner));
        assert!(!has_change_permission(&owner, &fos(10, &[2])));
    }

    #[test]
    fn test_document_ownership_follows_fund() {
        let fos = fos(10, &[2]);
        let doc = document(10);
        let owned = OwnedDocument {
            document: &doc,
            fos: &fos,
        };
        assert!(has_change_permission(&user(2, UserRole::Teacher), &owned));
        assert!(!has_change_permission(&user(5, UserRole::Teacher), &owned));

        let foreign = document(11);
        let mismatched = OwnedDocument {
            document: &foreign,
            fos: &fos,
        };
        assert!(!has_change_permission(&user(2, UserRole::Teacher), &mismatched));
    }

    #[test]
    fn test_reference_data_and_reports() {
        assert!(can_manage_reference_data(&user(1, UserRole::Admin)));
        assert!(!can_manage_reference_data(&user(2, UserRole::Teacher)));

        assert!(can_export_teacher_report(&user(2, UserRole::Teacher), 2));
        assert!(!can_export_teacher_report(&user(2, UserRole::Teacher), 3));
        assert!(can_export_teacher_report(&user(1, UserRole::Admin), 3));
    }

    #[test]
    fn test_teacher_is_added_to_own_discipline() {
        assert_eq!(
            discipline_teachers_for(&user(2, UserRole::Teacher), vec![5]),
            vec![5, 2]
        );
        assert_eq!(
            discipline_teachers_for(&user(2, UserRole::Teacher), vec![2, 5]),
            vec![2, 5]
        );
        assert_eq!(
            discipline_teachers_for(&user(1, UserRole::Admin), vec![5]),
            vec![5]
        );
    }
}
