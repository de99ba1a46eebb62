use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reports::{DisciplineReportForm, FosReportForm};
use crate::services::ReportService;

static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn report_options(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.options(&req).await
}

pub async fn export_fos(
    req: HttpRequest,
    form: web::Form<FosReportForm>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.export_fos(form.into_inner(), &req).await
}

pub async fn export_disciplines(
    req: HttpRequest,
    form: web::Form<DisciplineReportForm>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .export_disciplines(form.into_inner(), &req)
        .await
}

pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middlewares::RequireJWT)
            .route("/options", web::get().to(report_options))
            .route("/fos", web::post().to(export_fos))
            .route("/disciplines", web::post().to(export_disciplines)),
    );
}
