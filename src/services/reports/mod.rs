//! Выгрузка отчётов в XLSX и CSV

pub mod discipline_report;
pub mod fos_report;
mod layout;
pub mod options;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::reports::{DisciplineReportForm, FosReportForm};
use crate::storage::Storage;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn options(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        options::report_options(self, request).await
    }

    pub async fn export_fos(
        &self,
        form: FosReportForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        fos_report::export_fos_report(self, form, request).await
    }

    pub async fn export_disciplines(
        &self,
        form: DisciplineReportForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        discipline_report::export_discipline_report(self, form, request).await
    }
}
