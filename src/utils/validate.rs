use once_cell::sync::Lazy;
use regex::Regex;

/// Максимальная длина названий (дисциплины, ФОС, записи справочников)
pub const MAX_NAME_LENGTH: usize = 255;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        return Err("Логин должен содержать от 3 до 150 символов");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Логин может содержать только буквы, цифры и символы @ . + - _");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Некорректный адрес электронной почты");
    }
    Ok(())
}

/// Обязательное название длиной до [`MAX_NAME_LENGTH`] символов
pub fn validate_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Название не может быть пустым");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Название не может быть длиннее 255 символов");
    }
    Ok(trimmed.to_string())
}

/// Результат проверки пароля
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// Политика паролей: от 8 символов, есть буквы и цифры, не из списка частых
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Пароль должен содержать не менее 8 символов");
    }
    if !password.chars().any(char::is_alphabetic) {
        errors.push("Пароль должен содержать хотя бы одну букву");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Пароль должен содержать хотя бы одну цифру");
    }

    const COMMON: [&str; 6] = [
        "password1",
        "qwerty123",
        "admin123",
        "12345678a",
        "parol123",
        "abcd1234",
    ];
    if COMMON.iter().any(|weak| password.eq_ignore_ascii_case(weak)) {
        errors.push("Пароль слишком простой");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("ivanov.ii").is_ok());
        assert!(validate_username("teacher@kaf").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("with space").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("ivanov@university.ru").is_ok());
        assert!(validate_email("ivanov@").is_err());
    }

    #[test]
    fn test_name_is_trimmed_and_bounded() {
        assert_eq!(validate_name("  Математика ").unwrap(), "Математика");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"я".repeat(255)).is_ok());
        assert!(validate_name(&"я".repeat(256)).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Zachet2024").is_valid);
        assert!(validate_password("пароль2024").is_valid);

        let result = validate_password("short1");
        assert!(!result.is_valid);
        assert!(result.errors.contains(&"Пароль должен содержать не менее 8 символов"));

        assert!(!validate_password("onlyletters").is_valid);
        assert!(!validate_password("QWERTY123").is_valid);
    }
}
