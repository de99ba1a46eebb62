use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReportService;
use crate::config::AppConfig;
use crate::models::fos::years::current_academic_year_choices;
use crate::models::reports::ReportOptions;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

/// Преподаватели и учебные годы для формы экспорта
///
/// Преподаватель видит в списке только себя.
pub async fn report_options(
    service: &ReportService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let teachers = if user.is_superuser() {
        let storage = service.get_storage(request)?;
        match storage.list_teachers().await {
            Ok(teachers) => teachers,
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    format!("Ошибка получения преподавателей: {e}"),
                ));
            }
        }
    } else {
        vec![user.brief()]
    };

    let mut years = current_academic_year_choices(AppConfig::get().app.first_academic_year);
    years.reverse();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ReportOptions { teachers, years },
        "Параметры отчётов получены",
    )))
}
