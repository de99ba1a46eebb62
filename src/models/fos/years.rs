//! Учебные годы вида `2023-2024`

use chrono::Datelike;

/// Варианты учебного года от `first_year` до `current_year` включительно
pub fn academic_year_choices(first_year: i32, current_year: i32) -> Vec<String> {
    (first_year..=current_year)
        .map(|y| format!("{}-{}", y, y + 1))
        .collect()
}

/// Варианты на текущую дату
pub fn current_academic_year_choices(first_year: i32) -> Vec<String> {
    academic_year_choices(first_year, chrono::Utc::now().year())
}

pub fn is_valid_academic_year(value: &str, choices: &[String]) -> bool {
    choices.iter().any(|choice| choice == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_are_inclusive() {
        let years = academic_year_choices(2021, 2023);
        assert_eq!(years, vec!["2021-2022", "2022-2023", "2023-2024"]);
    }

    #[test]
    fn test_empty_when_first_year_in_future() {
        assert!(academic_year_choices(2030, 2025).is_empty());
    }

    #[test]
    fn test_validation() {
        let years = academic_year_choices(2020, 2024);
        assert!(is_valid_academic_year("2024-2025", &years));
        assert!(!is_valid_academic_year("2019-2020", &years));
        assert!(!is_valid_academic_year("2024-2026", &years));
        assert!(!is_valid_academic_year("2024", &years));
    }
}
