use serde::Serialize;
use ts_rs::TS;

use super::{NamedRef, UserBrief};

/// Варианты значений для фильтров списков дисциплин и ФОС
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
pub struct FilterOptions {
    pub types: Vec<NamedRef>,
    pub qualifications: Vec<NamedRef>,
    pub groups: Vec<NamedRef>,
    pub years: Vec<String>,
    pub disciplines: Vec<NamedRef>,
    /// Только для администратора
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<UserBrief>>,
}
