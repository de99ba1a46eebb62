use crate::config::AppConfig;
use crate::errors::FosAdminError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// Argon2id с параметрами из конфигурации
fn hasher() -> Result<Argon2<'static>, FosAdminError> {
    let config = &AppConfig::get().argon2;
    let params = Params::new(config.memory_cost, config.time_cost, config.parallelism, None)
        .map_err(|e| FosAdminError::validation(format!("Invalid Argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str) -> Result<String, FosAdminError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FosAdminError::validation(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Параметры берутся из самого хэша
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Zachet2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Zachet2024", &hash));
        assert!(!verify_password("zachet2024", &hash));
    }

    #[test]
    fn test_malformed_hash() {
        assert!(!verify_password("anything", "plain-text"));
    }
}
