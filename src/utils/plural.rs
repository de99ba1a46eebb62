//! Выбор формы слова по числу

/// Форма для `value` из `[одна, несколько, много]`: 1 час, 2 часа, 5 часов.
pub fn ru_plural<'a>(value: i64, variants: [&'a str; 3]) -> &'a str {
    let v = value.unsigned_abs();
    let (mod10, mod100) = (v % 10, v % 100);
    if mod10 == 1 && mod100 != 11 {
        variants[0]
    } else if (2..=4).contains(&mod10) && !(10..20).contains(&mod100) {
        variants[1]
    } else {
        variants[2]
    }
}

/// Число вместе со словом: `3 документа`
pub fn count_with_noun(value: i64, variants: [&str; 3]) -> String {
    format!("{} {}", value, ru_plural(value, variants))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURS: [&str; 3] = ["час", "часа", "часов"];

    #[test]
    fn test_forms() {
        assert_eq!(ru_plural(1, HOURS), "час");
        assert_eq!(ru_plural(2, HOURS), "часа");
        assert_eq!(ru_plural(4, HOURS), "часа");
        assert_eq!(ru_plural(5, HOURS), "часов");
        assert_eq!(ru_plural(0, HOURS), "часов");
    }

    #[test]
    fn test_teens_and_tens() {
        assert_eq!(ru_plural(11, HOURS), "часов");
        assert_eq!(ru_plural(12, HOURS), "часов");
        assert_eq!(ru_plural(14, HOURS), "часов");
        assert_eq!(ru_plural(21, HOURS), "час");
        assert_eq!(ru_plural(22, HOURS), "часа");
        assert_eq!(ru_plural(111, HOURS), "часов");
        assert_eq!(ru_plural(101, HOURS), "час");
    }

    #[test]
    fn test_negative_uses_absolute_value() {
        assert_eq!(ru_plural(-1, HOURS), "час");
        assert_eq!(ru_plural(-3, HOURS), "часа");
    }

    #[test]
    fn test_count_with_noun() {
        assert_eq!(
            count_with_noun(3, ["документ", "документа", "документов"]),
            "3 документа"
        );
    }
}
