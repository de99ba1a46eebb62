use chrono::Datelike;
use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Значение из поставляемого config.toml
const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Расширения в виде `.docx`: с точкой, в нижнем регистре
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for extension in extensions {
        let extension = extension.trim().trim_start_matches('.').to_lowercase();
        if extension.is_empty() {
            continue;
        }
        let extension = format!(".{extension}");
        if !normalized.contains(&extension) {
            normalized.push(extension);
        }
    }
    normalized
}

impl AppConfig {
    /// Загрузка и проверка конфигурации
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // базовый файл конфигурации
            .add_source(File::with_name("config").required(false))
            // файл для конкретного окружения
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // переменные окружения с префиксом
            .add_source(
                Environment::with_prefix("FOSADMIN")
                    .separator("_")
                    .try_parsing(true),
            );

        // Короткие переменные окружения
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cache.redis.key_prefix",
                std::env::var("REDIS_KEY_PREFIX").ok(),
            )?
            .set_override_option("cache.redis.default_ttl", std::env::var("REDIS_TTL").ok())?
            .set_override_option("upload.dir", std::env::var("UPLOAD_DIR").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // Число воркеров
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.upload.allowed_types = normalize_extensions(&app_config.upload.allowed_types);
        app_config.validate()?;

        Ok(app_config)
    }

    /// Проверка значений, которые config не может проверить по типам
    pub fn validate(&self) -> Result<(), ConfigError> {
        let current_year = chrono::Local::now().year();
        if !(1990..=current_year).contains(&self.app.first_academic_year) {
            return Err(ConfigError::Message(format!(
                "app.first_academic_year must be between 1990 and {current_year}, got {}",
                self.app.first_academic_year
            )));
        }

        if self.upload.dir.trim().is_empty() {
            return Err(ConfigError::Message("upload.dir must not be empty".into()));
        }
        if self.upload.allowed_types.is_empty() {
            return Err(ConfigError::Message(
                "upload.allowed_types must list at least one extension".into(),
            ));
        }
        // файл приходит в теле multipart-запроса
        if self.upload.max_size == 0 || self.upload.max_size > self.server.limits.max_payload_size {
            return Err(ConfigError::Message(format!(
                "upload.max_size must be between 1 and server.limits.max_payload_size ({}), got {}",
                self.server.limits.max_payload_size, self.upload.max_size
            )));
        }

        if self.is_production()
            && (self.jwt.secret.trim().is_empty() || self.jwt.secret == DEFAULT_JWT_SECRET)
        {
            return Err(ConfigError::Message(
                "jwt.secret must be set in production".into(),
            ));
        }

        Ok(())
    }

    /// Глобальный экземпляр конфигурации
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// Инициализация (вызывается при старте)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// Адрес для bind
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Путь к Unix-сокету (если задан)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AppConfig {
        AppConfig::load().unwrap()
    }

    #[test]
    fn test_extensions_are_normalized() {
        let raw: Vec<String> = ["DOCX", ".Pdf", " odt ", ".docx", "."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(normalize_extensions(&raw), vec![".docx", ".pdf", ".odt"]);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = loaded();
        assert!(config.validate().is_ok());
        assert!(config.upload.allowed_types.iter().all(|t| t.starts_with('.')));
    }

    #[test]
    fn test_upload_limit_must_fit_payload_limit() {
        let mut config = loaded();
        config.upload.max_size = config.server.limits.max_payload_size + 1;
        assert!(config.validate().is_err());

        config.upload.max_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_first_academic_year_bounds() {
        let mut config = loaded();
        config.app.first_academic_year = chrono::Local::now().year() + 1;
        assert!(config.validate().is_err());

        config.app.first_academic_year = 1980;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_own_jwt_secret() {
        let mut config = loaded();
        config.app.environment = "production".into();
        config.jwt.secret = DEFAULT_JWT_SECRET.into();
        assert!(config.validate().is_err());

        config.jwt.secret = "s3cr3t-from-env".into();
        assert!(config.validate().is_ok());
    }
}
