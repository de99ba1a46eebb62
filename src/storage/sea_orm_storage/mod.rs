//! Хранилище на SeaORM
//!
//! Поддерживаются SQLite, PostgreSQL и MySQL.

mod dictionaries;
mod disciplines;
mod documents;
mod fos;
mod groups;
mod reports;
mod users;

use crate::config::AppConfig;
use crate::errors::{FosAdminError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Хранилище на SeaORM
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// Подключение к БД и применение миграций
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| FosAdminError::database_operation(format!("Ошибка применения миграций: {e}")))?;

        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite: WAL и настройки pragma
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| FosAdminError::database_config(format!("Некорректный адрес SQLite: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| FosAdminError::database_connection(format!("Не удалось подключиться к SQLite: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// PostgreSQL, MySQL
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| FosAdminError::database_connection(format!("Не удалось подключиться к БД: {e}")))
    }

    /// Тип БД определяется по адресу
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(FosAdminError::database_config(format!(
                "Не удалось определить тип БД по адресу: {url}. Поддерживаются sqlite://, postgres://, mysql:// и пути к файлам .db/.sqlite"
            )))
        }
    }
}

use crate::models::{
    NamedRef, UserBrief,
    dictionaries::{DictionaryItem, DictionaryKind, DictionaryListQuery, DictionaryListResponse},
    disciplines::{
        CreateDisciplineRequest, DisciplineDetail, DisciplineListQuery, DisciplineListResponse,
        UpdateDisciplineRequest,
    },
    documents::{CreateDocument, Document, UpdateDocument},
    fos::{CreateFosRequest, FosDetail, FosListQuery, FosListResponse, UpdateFosRequest},
    groups::{CreateGroupRequest, Group, GroupListQuery, GroupListResponse, UpdateGroupRequest},
    reports::{DisciplineReportRow, FosReportRow},
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // Пользователи
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn list_teachers(&self) -> Result<Vec<UserBrief>> {
        self.list_teachers_impl().await
    }

    // Справочники
    async fn list_dictionary_items(
        &self,
        kind: DictionaryKind,
        query: DictionaryListQuery,
    ) -> Result<DictionaryListResponse> {
        self.list_dictionary_items_impl(kind, query).await
    }

    async fn all_dictionary_items(&self, kind: DictionaryKind) -> Result<Vec<DictionaryItem>> {
        self.all_dictionary_items_impl(kind).await
    }

    async fn get_dictionary_item(
        &self,
        kind: DictionaryKind,
        id: i64,
    ) -> Result<Option<DictionaryItem>> {
        self.get_dictionary_item_impl(kind, id).await
    }

    async fn find_dictionary_item_by_name(
        &self,
        kind: DictionaryKind,
        name: &str,
    ) -> Result<Option<DictionaryItem>> {
        self.find_dictionary_item_by_name_impl(kind, name).await
    }

    async fn create_dictionary_item(
        &self,
        kind: DictionaryKind,
        name: String,
    ) -> Result<DictionaryItem> {
        self.create_dictionary_item_impl(kind, name).await
    }

    async fn update_dictionary_item(
        &self,
        kind: DictionaryKind,
        id: i64,
        name: String,
    ) -> Result<Option<DictionaryItem>> {
        self.update_dictionary_item_impl(kind, id, name).await
    }

    async fn delete_dictionary_item(&self, kind: DictionaryKind, id: i64) -> Result<bool> {
        self.delete_dictionary_item_impl(kind, id).await
    }

    // Группы
    async fn list_groups_with_pagination(&self, query: GroupListQuery) -> Result<GroupListResponse> {
        self.list_groups_with_pagination_impl(query).await
    }

    async fn all_groups(&self) -> Result<Vec<Group>> {
        self.all_groups_impl().await
    }

    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(id).await
    }

    async fn get_groups_by_names(&self, names: &[String]) -> Result<Vec<Group>> {
        self.get_groups_by_names_impl(names).await
    }

    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>> {
        self.update_group_impl(id, update).await
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        self.delete_group_impl(id).await
    }

    // Дисциплины
    async fn list_disciplines_with_pagination(
        &self,
        query: DisciplineListQuery,
    ) -> Result<DisciplineListResponse> {
        self.list_disciplines_with_pagination_impl(query).await
    }

    async fn get_discipline_by_id(&self, id: i64) -> Result<Option<DisciplineDetail>> {
        self.get_discipline_by_id_impl(id).await
    }

    async fn create_discipline(
        &self,
        discipline: CreateDisciplineRequest,
    ) -> Result<DisciplineDetail> {
        self.create_discipline_impl(discipline).await
    }

    async fn update_discipline(
        &self,
        id: i64,
        update: UpdateDisciplineRequest,
    ) -> Result<Option<DisciplineDetail>> {
        self.update_discipline_impl(id, update).await
    }

    async fn delete_discipline(&self, id: i64) -> Result<Option<Vec<String>>> {
        self.delete_discipline_impl(id).await
    }

    async fn list_discipline_choices(&self, teacher_id: Option<i64>) -> Result<Vec<NamedRef>> {
        self.list_discipline_choices_impl(teacher_id).await
    }

    // ФОС
    async fn list_fos_with_pagination(&self, query: FosListQuery) -> Result<FosListResponse> {
        self.list_fos_with_pagination_impl(query).await
    }

    async fn get_fos_by_id(&self, id: i64) -> Result<Option<FosDetail>> {
        self.get_fos_by_id_impl(id).await
    }

    async fn create_fos(&self, fos: CreateFosRequest) -> Result<FosDetail> {
        self.create_fos_impl(fos).await
    }

    async fn update_fos(&self, id: i64, update: UpdateFosRequest) -> Result<Option<FosDetail>> {
        self.update_fos_impl(id, update).await
    }

    async fn delete_fos(&self, id: i64) -> Result<Option<Vec<String>>> {
        self.delete_fos_impl(id).await
    }

    async fn list_fos_years(&self, teacher_id: Option<i64>) -> Result<Vec<String>> {
        self.list_fos_years_impl(teacher_id).await
    }

    // Документы
    async fn get_document_by_id(&self, id: i64) -> Result<Option<Document>> {
        self.get_document_by_id_impl(id).await
    }

    async fn list_documents_by_fos(&self, fos_id: i64) -> Result<Vec<Document>> {
        self.list_documents_by_fos_impl(fos_id).await
    }

    async fn create_document(&self, document: CreateDocument) -> Result<Document> {
        self.create_document_impl(document).await
    }

    async fn update_document(&self, id: i64, update: UpdateDocument) -> Result<Option<Document>> {
        self.update_document_impl(id, update).await
    }

    async fn delete_document(&self, id: i64) -> Result<Option<Document>> {
        self.delete_document_impl(id).await
    }

    // Отчёты
    async fn fos_report_rows(&self, teacher_id: i64, year: &str) -> Result<Vec<FosReportRow>> {
        self.fos_report_rows_impl(teacher_id, year).await
    }

    async fn discipline_report_rows(&self, year: Option<&str>) -> Result<Vec<DisciplineReportRow>> {
        self.discipline_report_rows_impl(year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("fos_admin.db").unwrap(),
            "sqlite://fos_admin.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/fos").unwrap(),
            "postgres://u:p@localhost/fos"
        );
        let err = SeaOrmStorage::build_database_url("fos_admin").unwrap_err();
        assert_eq!(err.code(), "E003");
    }
}

/// Заготовки для тестов хранилища: SQLite в памяти с миграциями
#[cfg(test)]
pub(crate) mod fixtures {
    use super::SeaOrmStorage;
    use crate::models::dictionaries::DictionaryKind;
    use crate::models::disciplines::CreateDisciplineRequest;
    use crate::models::documents::{CreateDocument, StoredFile};
    use crate::models::fos::CreateFosRequest;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    pub async fn storage() -> SeaOrmStorage {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmStorage { db }
    }

    pub async fn teacher(storage: &SeaOrmStorage, username: &str) -> i64 {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.org"),
                password: "hash".to_string(),
                role: UserRole::Teacher,
                display_name: None,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn dictionary_item(storage: &SeaOrmStorage, kind: DictionaryKind, name: &str) -> i64 {
        storage
            .create_dictionary_item_impl(kind, name.to_string())
            .await
            .unwrap()
            .id
    }

    /// id типов ФОС из начальных данных миграции
    pub async fn fos_type_ids(storage: &SeaOrmStorage) -> Vec<i64> {
        storage
            .all_dictionary_items_impl(DictionaryKind::FosTypes)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    pub async fn discipline(
        storage: &SeaOrmStorage,
        name: &str,
        type_id: i64,
        teacher_ids: &[i64],
    ) -> i64 {
        storage
            .create_discipline_impl(CreateDisciplineRequest {
                name: name.to_string(),
                type_id,
                qualification_id: None,
                teacher_ids: teacher_ids.to_vec(),
                group_ids: Vec::new(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn fos(
        storage: &SeaOrmStorage,
        discipline_id: i64,
        type_id: i64,
        year: Option<&str>,
    ) -> i64 {
        storage
            .create_fos_impl(CreateFosRequest {
                name: format!("ФОС {discipline_id}/{type_id}"),
                description: None,
                type_id,
                discipline_id,
                year: year.map(str::to_string),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn document(storage: &SeaOrmStorage, fos_id: i64, path: &str) -> i64 {
        storage
            .create_document_impl(CreateDocument {
                name: path.to_string(),
                fos_id,
                file: StoredFile {
                    path: path.to_string(),
                    original_name: path.to_string(),
                    file_size: 1,
                    content_type: "application/pdf".to_string(),
                },
            })
            .await
            .unwrap()
            .id
    }
}
