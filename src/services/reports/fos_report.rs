//! Отчёт по ФОС преподавателя за учебный год
//!
//! Строка на дисциплину, колонка на тип ФОС, итоговая строка и две
//! диаграммы по итогам: столбчатая и круговая.

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};
use tracing::{error, info};

use super::layout::{caption_format, cell_format, column_widths, header_format, title_format, total_format};
use super::{ReportService, XLSX_CONTENT_TYPE};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::dictionaries::DictionaryKind;
use crate::models::fos::years::{current_academic_year_choices, is_valid_academic_year};
use crate::models::messages::FlashLevel;
use crate::models::reports::{FosReportData, FosReportForm};
use crate::models::NamedRef;
use crate::services::permissions::can_export_teacher_report;
use crate::services::upload::file_response;
use crate::services::current_user;
use crate::utils::flash::{ADMIN_INDEX_PATH, flash_and_redirect};
use crate::utils::plural::count_with_noun;
use crate::utils::safe_file_stem;

const SHEET_NAME: &str = "ФОС";
const HEADER_ROW: u32 = 4;
const FIRST_TYPE_COL: u16 = 2;

/// Таблица отчёта до записи в лист
#[derive(Debug, PartialEq)]
struct FosTable {
    header: Vec<String>,
    rows: Vec<FosTableRow>,
    /// По типам ФОС, в порядке колонок
    totals: Vec<i64>,
    grand_total: i64,
}

#[derive(Debug, PartialEq)]
struct FosTableRow {
    discipline: String,
    counts: Vec<i64>,
    total: i64,
}

fn build_table(data: &FosReportData) -> FosTable {
    let mut header = vec!["№".to_string(), "Дисциплина".to_string()];
    header.extend(data.fos_types.iter().map(|t| t.name.clone()));
    header.push("Всего".to_string());

    let mut totals = vec![0; data.fos_types.len()];
    let rows: Vec<FosTableRow> = data
        .rows
        .iter()
        .map(|row| {
            let counts: Vec<i64> = data
                .fos_types
                .iter()
                .map(|t| row.counts.get(&t.id).copied().unwrap_or(0))
                .collect();
            for (total, count) in totals.iter_mut().zip(&counts) {
                *total += count;
            }
            FosTableRow {
                discipline: row.discipline.clone(),
                total: counts.iter().sum(),
                counts,
            }
        })
        .collect();

    FosTable {
        header,
        grand_total: totals.iter().sum(),
        totals,
        rows,
    }
}

/// `Итого: 5 ФОС по 3 дисциплинам`
fn summary_line(table: &FosTable) -> String {
    format!(
        "Итого: {} ФОС по {}",
        table.grand_total,
        count_with_noun(
            table.rows.len() as i64,
            ["дисциплине", "дисциплинам", "дисциплинам"]
        )
    )
}

fn write_sheet(sheet: &mut Worksheet, data: &FosReportData, table: &FosTable) -> Result<()> {
    sheet.set_name(SHEET_NAME)?;

    let title = title_format();
    let caption = caption_format();
    let header = header_format();
    let cell = cell_format();
    let total = total_format();

    let last_col = (table.header.len() - 1) as u16;
    sheet.merge_range(0, 0, 0, last_col, "Отчёт по фондам оценочных средств", &title)?;
    sheet.merge_range(
        1,
        0,
        1,
        last_col,
        &format!("Преподаватель: {}", data.teacher.full_name()),
        &caption,
    )?;
    sheet.merge_range(2, 0, 2, last_col, &format!("Учебный год: {}", data.year), &caption)?;

    for (col, text) in table.header.iter().enumerate() {
        sheet.write_string_with_format(HEADER_ROW, col as u16, text, &header)?;
    }

    let mut row_num = HEADER_ROW + 1;
    for (index, row) in table.rows.iter().enumerate() {
        sheet.write_number_with_format(row_num, 0, (index + 1) as f64, &cell)?;
        sheet.write_string_with_format(row_num, 1, &row.discipline, &cell)?;
        for (offset, count) in row.counts.iter().enumerate() {
            sheet.write_number_with_format(
                row_num,
                FIRST_TYPE_COL + offset as u16,
                *count as f64,
                &cell,
            )?;
        }
        sheet.write_number_with_format(row_num, last_col, row.total as f64, &total)?;
        row_num += 1;
    }

    let total_row = row_num;
    sheet.merge_range(total_row, 0, total_row, 1, "Итого", &total)?;
    for (offset, sum) in table.totals.iter().enumerate() {
        sheet.write_number_with_format(total_row, FIRST_TYPE_COL + offset as u16, *sum as f64, &total)?;
    }
    sheet.write_number_with_format(total_row, last_col, table.grand_total as f64, &total)?;
    sheet.write_string(total_row + 1, 0, summary_line(table))?;

    let mut cells: Vec<Vec<String>> = vec![table.header.clone()];
    cells.extend(table.rows.iter().enumerate().map(|(i, row)| {
        let mut line = vec![(i + 1).to_string(), row.discipline.clone()];
        line.extend(row.counts.iter().map(i64::to_string));
        line.push(row.total.to_string());
        line
    }));
    for (col, width) in column_widths(cells).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    if !table.totals.is_empty() && !table.rows.is_empty() {
        insert_charts(sheet, table, total_row, last_col)?;
    }

    Ok(())
}

/// Диаграммы по строке «Итого»: категории из заголовка типов
fn insert_charts(sheet: &mut Worksheet, table: &FosTable, total_row: u32, last_col: u16) -> Result<()> {
    let last_type_col = FIRST_TYPE_COL + table.totals.len() as u16 - 1;
    let categories = (SHEET_NAME, HEADER_ROW, FIRST_TYPE_COL, HEADER_ROW, last_type_col);
    let values = (SHEET_NAME, total_row, FIRST_TYPE_COL, total_row, last_type_col);

    let mut bar = Chart::new(ChartType::Column);
    bar.title().set_name("ФОС по типам");
    bar.legend().set_hidden();
    bar.add_series()
        .set_name("Количество")
        .set_categories(categories)
        .set_values(values);

    let mut pie = Chart::new(ChartType::Pie);
    pie.title().set_name("Доля типов ФОС");
    pie.add_series()
        .set_categories(categories)
        .set_values(values);

    let chart_row = total_row + 3;
    sheet.insert_chart(chart_row, 0, &bar)?;
    sheet.insert_chart(chart_row, (last_col + 2).max(8), &pie)?;
    Ok(())
}

fn build_workbook(data: &FosReportData) -> Result<Vec<u8>> {
    let table = build_table(data);
    let mut sheet = Worksheet::new();
    write_sheet(&mut sheet, data, &table)?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(sheet);
    Ok(workbook.save_to_buffer()?)
}

fn report_file_name(data: &FosReportData) -> String {
    format!(
        "fos_report_{}_{}.xlsx",
        safe_file_stem(&data.teacher.username),
        data.year
    )
}

/// Проверенные параметры формы или сообщение для пользователя
fn parse_form(form: &FosReportForm, years: &[String]) -> std::result::Result<(i64, String), String> {
    let user_id = form
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or("Не выбран преподаватель")?
        .parse::<i64>()
        .map_err(|_| "Некорректный идентификатор преподавателя".to_string())?;

    let year = form
        .year
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or("Не выбран учебный год")?;
    if !is_valid_academic_year(year, years) {
        return Err(format!("Недопустимый учебный год: {year}"));
    }

    Ok((user_id, year.to_string()))
}

async fn flash_error(request: &HttpRequest, message: impl Into<String>) -> HttpResponse {
    flash_and_redirect(
        request,
        vec![(FlashLevel::Error, message.into())],
        ADMIN_INDEX_PATH,
    )
    .await
}

pub async fn export_fos_report(
    service: &ReportService,
    form: FosReportForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let years = current_academic_year_choices(AppConfig::get().app.first_academic_year);
    let (teacher_id, year) = match parse_form(&form, &years) {
        Ok(params) => params,
        Err(message) => return Ok(flash_error(request, message).await),
    };
    if !can_export_teacher_report(&user, teacher_id) {
        return Ok(flash_error(request, "Можно выгрузить только собственный отчёт").await);
    }

    let storage = service.get_storage(request)?;
    let teacher = match storage.get_user_by_id(teacher_id).await {
        Ok(Some(teacher)) => teacher.brief(),
        Ok(None) => return Ok(flash_error(request, "Преподаватель не найден").await),
        Err(e) => {
            error!("Failed to load teacher {} for report: {}", teacher_id, e);
            return Ok(flash_error(request, "Не удалось сформировать отчёт").await);
        }
    };

    let fos_types = storage.all_dictionary_items(DictionaryKind::FosTypes).await;
    let rows = storage.fos_report_rows(teacher_id, &year).await;
    let data = match (fos_types, rows) {
        (Ok(fos_types), Ok(rows)) => FosReportData {
            teacher,
            year,
            fos_types: fos_types.into_iter().map(NamedRef::from).collect(),
            rows,
        },
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to load fos report data: {}", e);
            return Ok(flash_error(request, "Не удалось сформировать отчёт").await);
        }
    };

    match build_workbook(&data) {
        Ok(buffer) => {
            info!(
                "Fos report for teacher {} ({}) exported by user {}",
                teacher_id, data.year, user.id
            );
            Ok(file_response(buffer, XLSX_CONTENT_TYPE, &report_file_name(&data)))
        }
        Err(e) => {
            error!("Failed to build fos report: {}", e);
            Ok(flash_error(request, format!("Не удалось сформировать отчёт: {e}")).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserBrief;
    use crate::models::reports::FosReportRow;
    use calamine::{Data, Reader, Xlsx};
    use std::collections::HashMap;
    use std::io::Cursor;

    fn data() -> FosReportData {
        FosReportData {
            teacher: UserBrief {
                id: 2,
                username: "petrova".to_string(),
                display_name: Some("Петрова А.В.".to_string()),
            },
            year: "2023-2024".to_string(),
            fos_types: vec![
                NamedRef {
                    id: 1,
                    name: "Тест".to_string(),
                },
                NamedRef {
                    id: 2,
                    name: "Реферат".to_string(),
                },
            ],
            rows: vec![
                FosReportRow {
                    discipline: "Физика".to_string(),
                    counts: HashMap::from([(1, 2), (2, 1)]),
                },
                FosReportRow {
                    discipline: "Химия".to_string(),
                    counts: HashMap::from([(2, 3), (9, 4)]),
                },
            ],
        }
    }

    #[test]
    fn test_table_counts_by_type() {
        let table = build_table(&data());
        assert_eq!(table.header, vec!["№", "Дисциплина", "Тест", "Реферат", "Всего"]);
        assert_eq!(table.rows[0].counts, vec![2, 1]);
        assert_eq!(table.rows[0].total, 3);
        // неизвестный тип не попадает в таблицу
        assert_eq!(table.rows[1].counts, vec![0, 3]);
        assert_eq!(table.totals, vec![2, 4]);
        assert_eq!(table.grand_total, 6);
    }

    #[test]
    fn test_summary_line_uses_plural() {
        let table = build_table(&data());
        assert_eq!(summary_line(&table), "Итого: 6 ФОС по 2 дисциплинам");

        let mut single = data();
        single.rows.truncate(1);
        assert_eq!(summary_line(&build_table(&single)), "Итого: 3 ФОС по 1 дисциплине");
    }

    #[test]
    fn test_parse_form() {
        let years = vec!["2023-2024".to_string()];
        let form = FosReportForm {
            user_id: Some("7".into()),
            year: Some("2023-2024".into()),
        };
        assert_eq!(parse_form(&form, &years).unwrap(), (7, "2023-2024".to_string()));

        let missing_user = FosReportForm {
            user_id: Some(" ".into()),
            year: Some("2023-2024".into()),
        };
        assert_eq!(parse_form(&missing_user, &years).unwrap_err(), "Не выбран преподаватель");

        let missing_year = FosReportForm {
            user_id: Some("7".into()),
            year: None,
        };
        assert_eq!(parse_form(&missing_year, &years).unwrap_err(), "Не выбран учебный год");

        let bad_year = FosReportForm {
            user_id: Some("7".into()),
            year: Some("1999-2000".into()),
        };
        assert!(parse_form(&bad_year, &years).is_err());
    }

    #[test]
    fn test_workbook_contents() {
        let buffer = build_workbook(&data()).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(buffer)).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Отчёт по фондам оценочных средств".to_string()))
        );
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("Преподаватель: Петрова А.В.".to_string()))
        );
        assert_eq!(
            range.get_value((HEADER_ROW, 3)),
            Some(&Data::String("Реферат".to_string()))
        );
        assert_eq!(range.get_value((HEADER_ROW + 2, 1)), Some(&Data::String("Химия".to_string())));
        assert_eq!(range.get_value((HEADER_ROW + 3, 0)), Some(&Data::String("Итого".to_string())));
        assert_eq!(range.get_value((HEADER_ROW + 3, 4)), Some(&Data::Float(6.0)));
    }

    #[test]
    fn test_workbook_without_types_or_rows() {
        let mut empty = data();
        empty.fos_types.clear();
        empty.rows.clear();
        assert!(build_workbook(&empty).is_ok());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(report_file_name(&data()), "fos_report_petrova_2023-2024.xlsx");
    }
}
