use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Пользователи
    // создать пользователя (пароль уже захэширован)
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // вход по логину или почте
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;
    // активные пользователи для выпадающих списков
    async fn list_teachers(&self) -> Result<Vec<UserBrief>>;

    /// Справочники
    async fn list_dictionary_items(
        &self,
        kind: DictionaryKind,
        query: DictionaryListQuery,
    ) -> Result<DictionaryListResponse>;
    // все записи, по имени
    async fn all_dictionary_items(&self, kind: DictionaryKind) -> Result<Vec<DictionaryItem>>;
    async fn get_dictionary_item(
        &self,
        kind: DictionaryKind,
        id: i64,
    ) -> Result<Option<DictionaryItem>>;
    async fn find_dictionary_item_by_name(
        &self,
        kind: DictionaryKind,
        name: &str,
    ) -> Result<Option<DictionaryItem>>;
    async fn create_dictionary_item(
        &self,
        kind: DictionaryKind,
        name: String,
    ) -> Result<DictionaryItem>;
    async fn update_dictionary_item(
        &self,
        kind: DictionaryKind,
        id: i64,
        name: String,
    ) -> Result<Option<DictionaryItem>>;
    // запись, на которую ссылаются, не удаляется (ошибка внешнего ключа)
    async fn delete_dictionary_item(&self, kind: DictionaryKind, id: i64) -> Result<bool>;

    /// Группы
    async fn list_groups_with_pagination(&self, query: GroupListQuery) -> Result<GroupListResponse>;
    async fn all_groups(&self) -> Result<Vec<Group>>;
    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>>;
    async fn get_groups_by_names(&self, names: &[String]) -> Result<Vec<Group>>;
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group>;
    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>>;
    async fn delete_group(&self, id: i64) -> Result<bool>;

    /// Дисциплины
    async fn list_disciplines_with_pagination(
        &self,
        query: DisciplineListQuery,
    ) -> Result<DisciplineListResponse>;
    async fn get_discipline_by_id(&self, id: i64) -> Result<Option<DisciplineDetail>>;
    async fn create_discipline(&self, discipline: CreateDisciplineRequest)
    -> Result<DisciplineDetail>;
    async fn update_discipline(
        &self,
        id: i64,
        update: UpdateDisciplineRequest,
    ) -> Result<Option<DisciplineDetail>>;
    // пути файлов удалённых каскадом документов; None, если дисциплины нет
    async fn delete_discipline(&self, id: i64) -> Result<Option<Vec<String>>>;
    // дисциплины для фильтров (все или только преподавателя)
    async fn list_discipline_choices(&self, teacher_id: Option<i64>) -> Result<Vec<NamedRef>>;

    /// ФОС
    async fn list_fos_with_pagination(&self, query: FosListQuery) -> Result<FosListResponse>;
    // вместе с документами
    async fn get_fos_by_id(&self, id: i64) -> Result<Option<FosDetail>>;
    async fn create_fos(&self, fos: CreateFosRequest) -> Result<FosDetail>;
    async fn update_fos(&self, id: i64, update: UpdateFosRequest) -> Result<Option<FosDetail>>;
    async fn delete_fos(&self, id: i64) -> Result<Option<Vec<String>>>;
    // учебные годы, встречающиеся у ФОС
    async fn list_fos_years(&self, teacher_id: Option<i64>) -> Result<Vec<String>>;

    /// Документы
    async fn get_document_by_id(&self, id: i64) -> Result<Option<Document>>;
    // по возрастанию id
    async fn list_documents_by_fos(&self, fos_id: i64) -> Result<Vec<Document>>;
    async fn create_document(&self, document: CreateDocument) -> Result<Document>;
    async fn update_document(&self, id: i64, update: UpdateDocument) -> Result<Option<Document>>;
    // удалённая запись (для очистки файла)
    async fn delete_document(&self, id: i64) -> Result<Option<Document>>;

    /// Отчёты
    async fn fos_report_rows(&self, teacher_id: i64, year: &str) -> Result<Vec<FosReportRow>>;
    async fn discipline_report_rows(&self, year: Option<&str>) -> Result<Vec<DisciplineReportRow>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
