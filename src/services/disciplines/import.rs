//! Импорт дисциплин из CSV или XLSX
//!
//! Колонки: `name`, `type`, `qualification`, `teachers`, `groups`.
//! Преподаватели задаются логинами, группы названиями, оба списка через
//! запятую. Строки с ошибками пропускаются, остальные создаются.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use calamine::{Reader, Xlsx};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{error, info};

use super::DisciplineService;
use crate::config::AppConfig;
use crate::errors::Result as StorageResult;
use crate::models::dictionaries::DictionaryKind;
use crate::models::disciplines::CreateDisciplineRequest;
use crate::models::{ApiResponse, ErrorCode, ImportResult, ImportRowError};
use crate::services::upload::read_multipart;
use crate::services::{bad_request, internal_error};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

const MAX_IMPORT_ROWS: usize = 1000;
const IMPORT_FILE_TYPES: [&str; 2] = [".csv", ".xlsx"];

#[derive(Debug, PartialEq)]
enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
}

impl ImportParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile => ErrorCode::ImportFileDataInvalid,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("Нет обязательной колонки: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "В файле нет данных".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ImportRow {
    row_num: usize,
    name: String,
    type_name: String,
    qualification: Option<String>,
    teachers: Vec<String>,
    groups: Vec<String>,
}

/// Номера колонок по заголовку
struct Columns {
    name: usize,
    type_name: usize,
    qualification: Option<usize>,
    teachers: Option<usize>,
    groups: Option<usize>,
}

impl Columns {
    fn from_headers<I>(headers: I) -> Result<Self, ImportParseError>
    where
        I: IntoIterator<Item = String>,
    {
        let header_map: HashMap<String, usize> = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_lowercase(), i))
            .collect();

        let required = |column: &str| {
            header_map
                .get(column)
                .copied()
                .ok_or_else(|| ImportParseError::MissingColumn(column.to_string()))
        };

        Ok(Self {
            name: required("name")?,
            type_name: required("type")?,
            qualification: header_map.get("qualification").copied(),
            teachers: header_map.get("teachers").copied(),
            groups: header_map.get("groups").copied(),
        })
    }

    fn build_row(&self, row_num: usize, cell: impl Fn(usize) -> String) -> ImportRow {
        ImportRow {
            row_num,
            name: cell(self.name),
            type_name: cell(self.type_name),
            qualification: self.qualification.map(&cell).filter(|s| !s.is_empty()),
            teachers: self.teachers.map(&cell).map(|s| split_list(&s)).unwrap_or_default(),
            groups: self.groups.map(&cell).map(|s| split_list(&s)).unwrap_or_default(),
        }
    }
}

/// Значения через запятую без пустых и повторов
fn split_list(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

/// Excel в русской локали сохраняет CSV через точку с запятой
fn detect_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|&b| b == b'\n').next().unwrap_or_default();
    let commas = first_line.iter().filter(|&&b| b == b',').count();
    let semicolons = first_line.iter().filter(|&&b| b == b';').count();
    if semicolons > commas { b';' } else { b',' }
}

fn parse_csv(data: &[u8]) -> Result<Vec<ImportRow>, ImportParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(detect_delimiter(data))
        .from_reader(Cursor::new(data));

    let headers = rdr
        .headers()
        .map_err(|e| ImportParseError::ParseFailed(format!("Не удалось прочитать заголовок: {e}")))?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportParseError::EmptyFile);
    }
    let columns = Columns::from_headers(headers.iter().map(str::to_string))?;

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let row_num = index + 2;
        let record = result.map_err(|e| {
            ImportParseError::ParseFailed(format!("Ошибка разбора строки {row_num}: {e}"))
        })?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(columns.build_row(row_num, |i| {
            record.get(i).unwrap_or_default().trim().to_string()
        }));
    }
    Ok(rows)
}

fn parse_xlsx(data: &[u8]) -> Result<Vec<ImportRow>, ImportParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|e| ImportParseError::ParseFailed(format!("Не удалось открыть XLSX: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportParseError::ParseFailed("В книге нет листов".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportParseError::ParseFailed(format!("Не удалось прочитать лист: {e}")))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(ImportParseError::EmptyFile)?;
    let columns = Columns::from_headers(header_row.iter().map(|cell| cell.to_string()))?;

    let mut rows = Vec::new();
    for (index, row) in rows_iter.enumerate() {
        let cell = |i: usize| {
            row.get(i)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default()
        };
        if (0..row.len()).all(|i| cell(i).is_empty()) {
            continue;
        }
        rows.push(columns.build_row(index + 2, cell));
    }
    Ok(rows)
}

fn parse_rows(data: &[u8], extension: &str) -> Result<Vec<ImportRow>, ImportParseError> {
    if extension == ".xlsx" {
        parse_xlsx(data)
    } else {
        parse_csv(data)
    }
}

/// Справочные данные для сопоставления строк
#[derive(Default)]
struct Lookup {
    types: HashMap<String, i64>,
    qualifications: HashMap<String, i64>,
    teachers: HashMap<String, i64>,
    groups: HashMap<String, i64>,
}

impl Lookup {
    /// Все имена сравниваются без учёта регистра
    async fn load(storage: &Arc<dyn Storage>, rows: &[ImportRow]) -> StorageResult<Self> {
        let by_name = |items: Vec<crate::models::dictionaries::DictionaryItem>| {
            items
                .into_iter()
                .map(|item| (item.name.to_lowercase(), item.id))
                .collect::<HashMap<_, _>>()
        };

        let needs_teachers = rows.iter().any(|r| !r.teachers.is_empty());
        let needs_groups = rows.iter().any(|r| !r.groups.is_empty());

        // LOWER() в SQLite не понимает кириллицу, поэтому сравниваем в памяти
        let teachers = if needs_teachers {
            storage
                .list_teachers()
                .await?
                .into_iter()
                .map(|t| (t.username.to_lowercase(), t.id))
                .collect()
        } else {
            HashMap::new()
        };
        let groups = if needs_groups {
            storage
                .all_groups()
                .await?
                .into_iter()
                .map(|g| (g.name.to_lowercase(), g.id))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            types: by_name(storage.all_dictionary_items(DictionaryKind::DisciplineTypes).await?),
            qualifications: by_name(
                storage
                    .all_dictionary_items(DictionaryKind::Qualifications)
                    .await?,
            ),
            teachers,
            groups,
        })
    }

    /// Запрос на создание или ошибки строки
    fn resolve(&self, row: &ImportRow) -> Result<CreateDisciplineRequest, Vec<ImportRowError>> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(ImportRowError {
                row: row.row_num,
                field: field.to_string(),
                message,
            })
        };

        let name = validate_name(&row.name)
            .map_err(|msg| fail("name", msg.to_string()))
            .ok();

        let type_id = if row.type_name.is_empty() {
            fail("type", "Не указан тип дисциплины".to_string());
            None
        } else {
            let found = self.types.get(&row.type_name.to_lowercase()).copied();
            if found.is_none() {
                fail("type", format!("Неизвестный тип дисциплины: {}", row.type_name));
            }
            found
        };

        let qualification_id = match &row.qualification {
            Some(q) => {
                let found = self.qualifications.get(&q.to_lowercase()).copied();
                if found.is_none() {
                    fail("qualification", format!("Неизвестная квалификация: {q}"));
                }
                found
            }
            None => None,
        };

        let mut teacher_ids = Vec::new();
        for username in &row.teachers {
            match self.teachers.get(&username.to_lowercase()) {
                Some(&id) => teacher_ids.push(id),
                None => fail("teachers", format!("Преподаватель не найден: {username}")),
            }
        }

        let mut group_ids = Vec::new();
        for group in &row.groups {
            match self.groups.get(&group.to_lowercase()) {
                Some(&id) => group_ids.push(id),
                None => fail("groups", format!("Группа не найдена: {group}")),
            }
        }

        match (name, type_id) {
            (Some(name), Some(type_id)) if errors.is_empty() => Ok(CreateDisciplineRequest {
                name,
                type_id,
                qualification_id,
                teacher_ids,
                group_ids,
            }),
            _ => Err(errors),
        }
    }
}

pub async fn import_disciplines(
    service: &DisciplineService,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let allowed: Vec<String> = IMPORT_FILE_TYPES.iter().map(|t| t.to_string()).collect();
    let form = match read_multipart(payload, AppConfig::get().upload.max_size, &allowed).await {
        Ok(form) => form,
        Err(e) => return Ok(e.into_response()),
    };
    let Some(file) = form.file else {
        return Ok(bad_request(ErrorCode::FileNotFound, "Файл не загружен"));
    };

    let rows = match parse_rows(&file.data, &file.extension) {
        Ok(rows) => rows,
        Err(e) => return Ok(bad_request(e.error_code(), e.message())),
    };
    if rows.is_empty() {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            "В файле нет строк с данными",
        ));
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            format!("За один раз можно импортировать не более {MAX_IMPORT_ROWS} строк"),
        ));
    }

    let storage = service.get_storage(request)?;
    let lookup = match Lookup::load(&storage, &rows).await {
        Ok(lookup) => lookup,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                format!("Ошибка загрузки справочников для импорта: {e}"),
            ));
        }
    };

    let mut errors = Vec::new();
    let mut success = 0;
    for row in &rows {
        let create = match lookup.resolve(row) {
            Ok(create) => create,
            Err(mut row_errors) => {
                errors.append(&mut row_errors);
                continue;
            }
        };
        match storage.create_discipline(create).await {
            Ok(_) => success += 1,
            Err(e) if e.is_unique_violation() => errors.push(ImportRowError {
                row: row.row_num,
                field: "name".to_string(),
                message: format!("Дисциплина «{}» уже существует", row.name),
            }),
            Err(e) => {
                error!("Failed to import discipline at row {}: {}", row.row_num, e);
                errors.push(ImportRowError {
                    row: row.row_num,
                    field: String::new(),
                    message: format!("Не удалось создать: {e}"),
                });
            }
        }
    }

    let result = ImportResult {
        total: rows.len(),
        success,
        failed: rows.len() - success,
        errors,
    };
    info!(
        "Discipline import finished: {} of {} rows created",
        result.success, result.total
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Импорт завершён")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> Lookup {
        Lookup {
            types: HashMap::from([("лекционный курс".to_string(), 1)]),
            qualifications: HashMap::from([("бакалавр".to_string(), 2)]),
            teachers: HashMap::from([("ivanov".to_string(), 10), ("petrova".to_string(), 11)]),
            groups: HashMap::from([("ивт-21".to_string(), 20)]),
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" ivanov, petrova ,,ivanov"), vec!["ivanov", "petrova"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_parse_csv_with_optional_columns() {
        let data = "name,type,teachers\nФизика,Лекционный курс,\"ivanov, petrova\"\n,,\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_num, 2);
        assert_eq!(rows[0].name, "Физика");
        assert_eq!(rows[0].qualification, None);
        assert_eq!(rows[0].teachers, vec!["ivanov", "petrova"]);
        assert!(rows[0].groups.is_empty());
    }

    #[test]
    fn test_parse_csv_semicolon_and_bom() {
        let data = "\u{feff}Name;Type;Groups\nХимия;Практикум;ИВТ-21, ИВТ-22\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].type_name, "Практикум");
        assert_eq!(rows[0].groups, vec!["ИВТ-21", "ИВТ-22"]);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_csv("name,teachers\nФизика,ivanov\n".as_bytes()).unwrap_err();
        assert_eq!(err, ImportParseError::MissingColumn("type".to_string()));
        assert_eq!(err.error_code(), ErrorCode::ImportFileMissingColumn);
    }

    #[test]
    fn test_parse_xlsx() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["name", "type", "qualification"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "Физика").unwrap();
        sheet.write_string(1, 1, "Лекционный курс").unwrap();
        sheet.write_string(1, 2, "Бакалавр").unwrap();
        let data = workbook.save_to_buffer().unwrap();

        let rows = parse_rows(&data, ".xlsx").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].qualification.as_deref(), Some("Бакалавр"));
    }

    #[test]
    fn test_resolve_valid_row() {
        let row = ImportRow {
            row_num: 2,
            name: "Физика".to_string(),
            type_name: "ЛЕКЦИОННЫЙ КУРС".to_string(),
            qualification: Some("Бакалавр".to_string()),
            teachers: vec!["petrova".to_string()],
            groups: vec!["ИВТ-21".to_string()],
        };
        let create = lookup().resolve(&row).unwrap();
        assert_eq!(create.type_id, 1);
        assert_eq!(create.qualification_id, Some(2));
        assert_eq!(create.teacher_ids, vec![11]);
        assert_eq!(create.group_ids, vec![20]);
    }

    #[test]
    fn test_resolve_ignores_case_of_teachers_and_groups() {
        let row = ImportRow {
            row_num: 3,
            name: "Химия".to_string(),
            type_name: "Лекционный курс".to_string(),
            qualification: None,
            teachers: vec!["Petrova".to_string(), "IVANOV".to_string()],
            groups: vec!["ивт-21".to_string()],
        };
        let create = lookup().resolve(&row).unwrap();
        assert_eq!(create.teacher_ids, vec![11, 10]);
        assert_eq!(create.group_ids, vec![20]);
    }

    #[test]
    fn test_resolve_collects_all_errors() {
        let row = ImportRow {
            row_num: 5,
            name: " ".to_string(),
            type_name: "Семинар".to_string(),
            qualification: None,
            teachers: vec!["sidorov".to_string()],
            groups: vec!["ИВТ-99".to_string()],
        };
        let errors = lookup().resolve(&row).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "type", "teachers", "groups"]);
        assert!(errors.iter().all(|e| e.row == 5));
    }
}
