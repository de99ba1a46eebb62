//! Отчёт по дисциплинам: XLSX с листом сводки или плоский CSV

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet};
use std::collections::BTreeMap;
use tracing::{error, info};

use super::layout::{cell_format, column_widths, header_format, title_format};
use super::{CSV_CONTENT_TYPE, ReportService, XLSX_CONTENT_TYPE};
use crate::config::AppConfig;
use crate::errors::{FosAdminError, Result};
use crate::models::fos::years::{current_academic_year_choices, is_valid_academic_year};
use crate::models::messages::FlashLevel;
use crate::models::reports::{DisciplineReportForm, DisciplineReportRow, ReportFormat};
use crate::services::current_user;
use crate::services::upload::file_response;
use crate::utils::flash::{ADMIN_INDEX_PATH, flash_and_redirect};

const TABLE_SHEET: &str = "Дисциплины";
const SUMMARY_SHEET: &str = "Сводка";
const HEADER_ROW: u32 = 2;
const TEACHER_COL: u16 = 5;
const COLUMNS: [&str; 8] = [
    "№",
    "Дисциплина",
    "Тип",
    "Квалификация",
    "Группы",
    "Преподаватель",
    "ФОС",
    "Документы",
];
const NO_TEACHER: &str = "Без преподавателя";
const LIST_SEPARATOR: &str = ", ";

/// Ячейки строки без колонки преподавателя
fn discipline_cells(index: usize, row: &DisciplineReportRow) -> [(u16, CellValue); 7] {
    [
        (0, CellValue::Number((index + 1) as f64)),
        (1, CellValue::Text(row.name.clone())),
        (2, CellValue::Text(row.type_name.clone())),
        (3, CellValue::Text(row.qualification.clone().unwrap_or_default())),
        (4, CellValue::Text(row.groups.join(LIST_SEPARATOR))),
        (6, CellValue::Number(row.fos_count as f64)),
        (7, CellValue::Number(row.document_count as f64)),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    fn display(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue, format: &Format) -> Result<()> {
    match value {
        CellValue::Text(text) => sheet.write_string_with_format(row, col, text, format)?,
        CellValue::Number(n) => sheet.write_number_with_format(row, col, *n, format)?,
    };
    Ok(())
}

/// Число дисциплин по типам, по алфавиту
fn disciplines_by_type(rows: &[DisciplineReportRow]) -> Vec<(String, i64)> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.type_name.clone()).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Число дисциплин у каждого преподавателя, по убыванию
fn disciplines_by_teacher(rows: &[DisciplineReportRow]) -> Vec<(String, i64)> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows {
        if row.teachers.is_empty() {
            *counts.entry(NO_TEACHER.to_string()).or_default() += 1;
        }
        for teacher in &row.teachers {
            *counts.entry(teacher.clone()).or_default() += 1;
        }
    }
    let mut result: Vec<(String, i64)> = counts.into_iter().collect();
    result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    result
}

fn report_title(year: Option<&str>) -> String {
    match year {
        Some(year) => format!("Отчёт по дисциплинам, учебный год {year}"),
        None => "Отчёт по дисциплинам".to_string(),
    }
}

/// Строка на пару (дисциплина, преподаватель); ячейки дисциплины
/// объединяются по вертикали
fn write_table_sheet(sheet: &mut Worksheet, rows: &[DisciplineReportRow], year: Option<&str>) -> Result<()> {
    sheet.set_name(TABLE_SHEET)?;

    let header = header_format();
    let cell = cell_format();
    let last_col = (COLUMNS.len() - 1) as u16;

    sheet.merge_range(0, 0, 0, last_col, &report_title(year), &title_format())?;
    for (col, text) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(HEADER_ROW, col as u16, *text, &header)?;
    }

    let mut widths_source: Vec<Vec<String>> =
        vec![COLUMNS.iter().map(|c| c.to_string()).collect()];
    let mut row_num = HEADER_ROW + 1;

    for (index, row) in rows.iter().enumerate() {
        let teachers: Vec<&str> = if row.teachers.is_empty() {
            vec![""]
        } else {
            row.teachers.iter().map(String::as_str).collect()
        };
        let last_row = row_num + teachers.len() as u32 - 1;

        let cells = discipline_cells(index, row);
        for (col, value) in &cells {
            if last_row > row_num {
                sheet.merge_range(row_num, *col, last_row, *col, "", &cell)?;
            }
            write_cell(sheet, row_num, *col, value, &cell)?;
        }
        for (offset, teacher) in teachers.iter().enumerate() {
            sheet.write_string_with_format(row_num + offset as u32, TEACHER_COL, *teacher, &cell)?;
        }

        let mut line: Vec<String> = vec![String::new(); COLUMNS.len()];
        for (col, value) in &cells {
            line[*col as usize] = value.display();
        }
        line[TEACHER_COL as usize] = teachers
            .iter()
            .max_by_key(|t| t.chars().count())
            .copied()
            .unwrap_or_default()
            .to_string();
        widths_source.push(line);

        row_num = last_row + 1;
    }

    for (col, width) in column_widths(widths_source).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }
    Ok(())
}

/// Таблица «название / количество» с диаграммой справа; возвращает следующую свободную строку
fn write_summary_block(
    sheet: &mut Worksheet,
    first_row: u32,
    title: &str,
    label: &str,
    data: &[(String, i64)],
    chart_type: ChartType,
) -> Result<u32> {
    let header = header_format();
    let cell = cell_format();

    sheet.write_string_with_format(first_row, 0, title, &Format::new().set_bold())?;
    sheet.write_string_with_format(first_row + 1, 0, label, &header)?;
    sheet.write_string_with_format(first_row + 1, 1, "Дисциплин", &header)?;

    let data_row = first_row + 2;
    for (offset, (name, count)) in data.iter().enumerate() {
        sheet.write_string_with_format(data_row + offset as u32, 0, name, &cell)?;
        sheet.write_number_with_format(data_row + offset as u32, 1, *count as f64, &cell)?;
    }

    if !data.is_empty() {
        let last_data_row = data_row + data.len() as u32 - 1;
        let mut chart = Chart::new(chart_type);
        chart.title().set_name(title);
        if !matches!(chart_type, ChartType::Pie) {
            chart.legend().set_hidden();
        }
        chart
            .add_series()
            .set_name("Дисциплин")
            .set_categories((SUMMARY_SHEET, data_row, 0, last_data_row, 0))
            .set_values((SUMMARY_SHEET, data_row, 1, last_data_row, 1));
        sheet.insert_chart(first_row, 3, &chart)?;
    }

    // место под диаграмму стандартной высоты
    Ok(data_row + (data.len() as u32).max(16) + 2)
}

fn write_summary_sheet(sheet: &mut Worksheet, rows: &[DisciplineReportRow]) -> Result<()> {
    sheet.set_name(SUMMARY_SHEET)?;

    let by_type = disciplines_by_type(rows);
    let by_teacher = disciplines_by_teacher(rows);

    let next = write_summary_block(
        sheet,
        0,
        "По типам дисциплин",
        "Тип",
        &by_type,
        ChartType::Pie,
    )?;
    write_summary_block(
        sheet,
        next,
        "По преподавателям",
        "Преподаватель",
        &by_teacher,
        ChartType::Bar,
    )?;

    let mut widths_source: Vec<Vec<String>> = vec![vec!["Преподаватель".to_string(), "Дисциплин".to_string()]];
    widths_source.extend(
        by_type
            .iter()
            .chain(&by_teacher)
            .map(|(name, count)| vec![name.clone(), count.to_string()]),
    );
    for (col, width) in column_widths(widths_source).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }
    Ok(())
}

fn build_workbook(rows: &[DisciplineReportRow], year: Option<&str>) -> Result<Vec<u8>> {
    let mut table = Worksheet::new();
    write_table_sheet(&mut table, rows, year)?;
    let mut summary = Worksheet::new();
    write_summary_sheet(&mut summary, rows)?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(table);
    workbook.push_worksheet(summary);
    Ok(workbook.save_to_buffer()?)
}

/// Плоская таблица, преподаватели через запятую; с BOM для Excel
fn build_csv(rows: &[DisciplineReportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());
    writer.write_record(COLUMNS)?;
    for (index, row) in rows.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            row.name.clone(),
            row.type_name.clone(),
            row.qualification.clone().unwrap_or_default(),
            row.groups.join(LIST_SEPARATOR),
            row.teachers.join(LIST_SEPARATOR),
            row.fos_count.to_string(),
            row.document_count.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| FosAdminError::report_generation(e.to_string()))
}

fn report_file_name(year: Option<&str>, format: ReportFormat) -> String {
    let extension = match format {
        ReportFormat::Xlsx => "xlsx",
        ReportFormat::Csv => "csv",
    };
    format!("disciplines_report_{}.{extension}", year.unwrap_or("all"))
}

/// Формат и необязательный год или сообщение для пользователя
fn parse_form(
    form: &DisciplineReportForm,
    years: &[String],
) -> std::result::Result<(ReportFormat, Option<String>), String> {
    let format = form
        .format
        .as_deref()
        .unwrap_or_default()
        .trim()
        .parse::<ReportFormat>()
        .map_err(|_| "Неподдерживаемый формат отчёта".to_string())?;

    let year = form
        .year
        .as_deref()
        .map(str::trim)
        .filter(|y| !y.is_empty());
    if let Some(year) = year
        && !is_valid_academic_year(year, years)
    {
        return Err(format!("Недопустимый учебный год: {year}"));
    }

    Ok((format, year.map(str::to_string)))
}

async fn flash_error(request: &HttpRequest, message: impl Into<String>) -> HttpResponse {
    flash_and_redirect(
        request,
        vec![(FlashLevel::Error, message.into())],
        ADMIN_INDEX_PATH,
    )
    .await
}

pub async fn export_discipline_report(
    service: &ReportService,
    form: DisciplineReportForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let years = current_academic_year_choices(AppConfig::get().app.first_academic_year);
    let (format, year) = match parse_form(&form, &years) {
        Ok(params) => params,
        Err(message) => return Ok(flash_error(request, message).await),
    };

    let storage = service.get_storage(request)?;
    let rows = match storage.discipline_report_rows(year.as_deref()).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to load discipline report data: {}", e);
            return Ok(flash_error(request, "Не удалось сформировать отчёт").await);
        }
    };

    let built = match format {
        ReportFormat::Xlsx => build_workbook(&rows, year.as_deref()).map(|b| (b, XLSX_CONTENT_TYPE)),
        ReportFormat::Csv => build_csv(&rows).map(|b| (b, CSV_CONTENT_TYPE)),
    };

    match built {
        Ok((buffer, content_type)) => {
            info!(
                "Discipline report ({:?}, {} rows) exported by user {}",
                format,
                rows.len(),
                user.id
            );
            Ok(file_response(
                buffer,
                content_type,
                &report_file_name(year.as_deref(), format),
            ))
        }
        Err(e) => {
            error!("Failed to build discipline report: {}", e);
            Ok(flash_error(request, format!("Не удалось сформировать отчёт: {e}")).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn row(id: i64, name: &str, type_name: &str, teachers: &[&str]) -> DisciplineReportRow {
        DisciplineReportRow {
            discipline_id: id,
            name: name.to_string(),
            type_name: type_name.to_string(),
            qualification: Some("Бакалавр".to_string()),
            groups: vec!["ИВТ-21".to_string(), "ИВТ-22".to_string()],
            teachers: teachers.iter().map(|t| t.to_string()).collect(),
            fos_count: 2,
            document_count: 5,
        }
    }

    fn rows() -> Vec<DisciplineReportRow> {
        vec![
            row(1, "Физика", "Лекции", &["Иванов И.И.", "Петрова А.В."]),
            row(2, "Химия", "Практика", &["Петрова А.В."]),
            row(3, "История", "Лекции", &[]),
        ]
    }

    #[test]
    fn test_summary_by_type() {
        assert_eq!(
            disciplines_by_type(&rows()),
            vec![("Лекции".to_string(), 2), ("Практика".to_string(), 1)]
        );
    }

    #[test]
    fn test_summary_by_teacher() {
        assert_eq!(
            disciplines_by_teacher(&rows()),
            vec![
                ("Петрова А.В.".to_string(), 2),
                ("Без преподавателя".to_string(), 1),
                ("Иванов И.И.".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_csv_joins_teachers() {
        let csv = String::from_utf8(build_csv(&rows()).unwrap()).unwrap();
        let csv = csv.trim_start_matches('\u{feff}');
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "№,Дисциплина,Тип,Квалификация,Группы,Преподаватель,ФОС,Документы"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,Физика,Лекции,Бакалавр,\"ИВТ-21, ИВТ-22\",\"Иванов И.И., Петрова А.В.\",2,5"
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_workbook_rows_per_teacher() {
        let buffer = build_workbook(&rows(), Some("2023-2024")).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(buffer)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![TABLE_SHEET.to_string(), SUMMARY_SHEET.to_string()]);

        let range = workbook.worksheet_range(TABLE_SHEET).unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Отчёт по дисциплинам, учебный год 2023-2024".to_string()))
        );
        let first = HEADER_ROW + 1;
        assert_eq!(range.get_value((first, 1)), Some(&Data::String("Физика".to_string())));
        assert_eq!(
            range.get_value((first, TEACHER_COL as u32)),
            Some(&Data::String("Иванов И.И.".to_string()))
        );
        assert_eq!(
            range.get_value((first + 1, TEACHER_COL as u32)),
            Some(&Data::String("Петрова А.В.".to_string()))
        );
        // вторая дисциплина начинается после двух строк первой
        assert_eq!(range.get_value((first + 2, 1)), Some(&Data::String("Химия".to_string())));
        assert_eq!(range.get_value((first + 3, 1)), Some(&Data::String("История".to_string())));

    }

    #[test]
    fn test_parse_form() {
        let years = vec!["2023-2024".to_string()];
        let form = DisciplineReportForm {
            year: None,
            format: Some("CSV".into()),
        };
        assert_eq!(parse_form(&form, &years).unwrap(), (ReportFormat::Csv, None));

        let form = DisciplineReportForm {
            year: Some("2023-2024".into()),
            format: None,
        };
        assert_eq!(
            parse_form(&form, &years).unwrap(),
            (ReportFormat::Xlsx, Some("2023-2024".to_string()))
        );

        let form = DisciplineReportForm {
            year: None,
            format: Some("pdf".into()),
        };
        assert!(parse_form(&form, &years).is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            report_file_name(Some("2023-2024"), ReportFormat::Csv),
            "disciplines_report_2023-2024.csv"
        );
        assert_eq!(report_file_name(None, ReportFormat::Xlsx), "disciplines_report_all.xlsx");
    }
}
