//! Транслитерация кириллицы для имён файлов

fn latin_for(c: char) -> Option<&'static str> {
    let s = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "ju",
        'я' => "ja",
        _ => return None,
    };
    Some(s)
}

/// Русский текст латиницей
pub fn translit(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match latin_for(lower) {
            Some(latin) if c != lower => {
                // Ж -> Zh: заглавная только первая буква
                let mut chars = latin.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

/// Безопасное имя файла: латиница, цифры и `-_.`, остальное -> `_`
pub fn safe_file_stem(text: &str) -> String {
    let latin = translit(text.trim());
    let mut out = String::with_capacity(latin.len());
    for c in latin.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        assert_eq!(translit("математика"), "matematika");
        assert_eq!(translit("щука и ёж"), "schuka i ezh");
        assert_eq!(translit("объявление"), "objavlenie");
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(translit("Жуков"), "Zhukov");
        assert_eq!(translit("ЯЗЫК"), "JaZYK");
        assert_eq!(translit("Цех"), "Tseh");
    }

    #[test]
    fn test_non_cyrillic_kept() {
        assert_eq!(translit("SQL 2024"), "SQL 2024");
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("Базы данных"), "Bazy_dannyh");
        assert_eq!(safe_file_stem("Физика (ч. 1)"), "Fizika_ch._1");
        assert_eq!(safe_file_stem("   "), "file");
        assert_eq!(safe_file_stem("«»"), "file");
    }
}
