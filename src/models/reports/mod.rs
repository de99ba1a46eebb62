use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{NamedRef, UserBrief};

/// Форма отчёта по ФОС преподавателя
#[derive(Debug, Default, Deserialize)]
pub struct FosReportForm {
    pub user_id: Option<String>,
    pub year: Option<String>,
}

/// Форма отчёта по дисциплинам
#[derive(Debug, Default, Deserialize)]
pub struct DisciplineReportForm {
    pub year: Option<String>,
    pub format: Option<String>,
}

/// Варианты для формы экспорта
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportOptions {
    pub teachers: Vec<UserBrief>,
    pub years: Vec<String>,
}

/// Строка отчёта по ФОС: число фондов каждого типа по дисциплине
#[derive(Debug, Clone)]
pub struct FosReportRow {
    pub discipline: String,
    /// id типа ФОС -> количество
    pub counts: HashMap<i64, i64>,
}

/// Данные отчёта по ФОС
#[derive(Debug, Clone)]
pub struct FosReportData {
    pub teacher: UserBrief,
    pub year: String,
    pub fos_types: Vec<NamedRef>,
    pub rows: Vec<FosReportRow>,
}

/// Строка отчёта по дисциплинам
#[derive(Debug, Clone)]
pub struct DisciplineReportRow {
    pub discipline_id: i64,
    pub name: String,
    pub type_name: String,
    pub qualification: Option<String>,
    pub groups: Vec<String>,
    pub teachers: Vec<String>,
    pub fos_count: i64,
    pub document_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "xlsx" => Ok(ReportFormat::Xlsx),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!("Unsupported report format: {s}")),
        }
    }
}
