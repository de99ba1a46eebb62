//! Общие форматы и размеры колонок для листов отчётов

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 60;

pub(super) fn title_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center)
}

pub(super) fn caption_format() -> Format {
    Format::new().set_align(FormatAlign::Left)
}

pub(super) fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_text_wrap()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_background_color("#D9E1F2")
}

pub(super) fn cell_format() -> Format {
    Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

pub(super) fn total_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

/// Ширина колонок по самому длинному тексту в каждой из них
pub(super) fn column_widths<R, C>(rows: R) -> Vec<f64>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (col, text) in row.into_iter().enumerate() {
            let len = text
                .lines()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0);
            if widths.len() <= col {
                widths.resize(col + 1, 0);
            }
            widths[col] = widths[col].max(len);
        }
    }
    widths
        .into_iter()
        .map(|w| (w + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let rows = vec![
            vec!["№".to_string(), "Дисциплина".to_string()],
            vec!["1".to_string(), "Теория вероятностей".to_string(), "x".to_string()],
        ];
        assert_eq!(column_widths(rows), vec![4.0, 21.0, 4.0]);
    }

    #[test]
    fn test_column_width_is_capped() {
        let rows = vec![vec!["я".repeat(200)]];
        assert_eq!(column_widths(rows), vec![60.0]);
    }
}
