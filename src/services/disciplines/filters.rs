use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::DisciplineService;
use crate::errors::Result;
use crate::models::dictionaries::DictionaryKind;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, FilterOptions, NamedRef};
use crate::services::{current_user, internal_error};
use crate::storage::Storage;

/// Варианты фильтров для текущего пользователя
///
/// `types_kind` выбирает справочник типов: типы дисциплин для списка
/// дисциплин, типы ФОС для списка ФОС. Преподаватель видит только свои
/// дисциплины и годы, список преподавателей получает только администратор.
pub(crate) async fn build_filter_options(
    storage: &Arc<dyn Storage>,
    user: &User,
    types_kind: DictionaryKind,
) -> Result<FilterOptions> {
    let owner = (!user.is_superuser()).then_some(user.id);

    let types = storage.all_dictionary_items(types_kind).await?;
    let qualifications = storage
        .all_dictionary_items(DictionaryKind::Qualifications)
        .await?;
    let groups = storage.all_groups().await?;
    let years = storage.list_fos_years(owner).await?;
    let disciplines = storage.list_discipline_choices(owner).await?;
    let teachers = if user.is_superuser() {
        Some(storage.list_teachers().await?)
    } else {
        None
    };

    Ok(FilterOptions {
        types: types.into_iter().map(NamedRef::from).collect(),
        qualifications: qualifications.into_iter().map(NamedRef::from).collect(),
        groups: groups.iter().map(|g| g.named_ref()).collect(),
        years,
        disciplines,
        teachers,
    })
}

pub async fn filter_options(
    service: &DisciplineService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    match build_filter_options(&storage, &user, DictionaryKind::DisciplineTypes).await {
        Ok(options) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            options,
            "Варианты фильтров получены",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения вариантов фильтров: {e}"),
        )),
    }
}
