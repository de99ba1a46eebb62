//! Проверка сигнатуры загружаемого файла по расширению

const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Совпадают ли первые байты файла с его расширением (`.docx`, с точкой).
///
/// Пустой файл и неизвестное расширение не проходят проверку.
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // OOXML, OpenDocument и архивы - всё ZIP
        ".docx" | ".xlsx" | ".pptx" | ".odt" | ".ods" | ".zip" => data.starts_with(&ZIP_SIGNATURE),
        // старые форматы MS Office
        ".doc" | ".xls" | ".ppt" => data.starts_with(&OLE_SIGNATURE),
        ".pdf" => data.starts_with(b"%PDF"),
        ".rtf" => data.starts_with(b"{\\rtf"),
        ".txt" | ".csv" => std::str::from_utf8(&data[..data.len().min(512)]).is_ok()
            || !data.contains(&0),
        _ => false,
    }
}

/// MIME-тип по расширению (для ответа при скачивании)
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".doc" => "application/msword",
        ".xls" => "application/vnd.ms-excel",
        ".odt" => "application/vnd.oasis.opendocument.text",
        ".pdf" => "application/pdf",
        ".rtf" => "application/rtf",
        ".zip" => "application/zip",
        ".txt" => "text/plain; charset=utf-8",
        ".csv" => "text/csv; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ooxml_is_zip() {
        let header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&header, ".docx"));
        assert!(validate_magic_bytes(&header, ".DOCX"));
        assert!(validate_magic_bytes(&header, ".odt"));
        assert!(!validate_magic_bytes(&header, ".doc"));
        assert!(!validate_magic_bytes(&header, ".pdf"));
    }

    #[test]
    fn test_legacy_office() {
        assert!(validate_magic_bytes(&OLE_SIGNATURE, ".doc"));
        assert!(validate_magic_bytes(&OLE_SIGNATURE, ".xls"));
        assert!(!validate_magic_bytes(&OLE_SIGNATURE, ".docx"));
    }

    #[test]
    fn test_pdf_and_rtf() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(validate_magic_bytes(b"{\\rtf1\\ansi", ".rtf"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".rtf"));
    }

    #[test]
    fn test_text() {
        assert!(validate_magic_bytes("Вопросы к экзамену".as_bytes(), ".txt"));
        assert!(validate_magic_bytes(b"name,type\n", ".csv"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".docx"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for_extension(".PDF"), "application/pdf");
        assert_eq!(content_type_for_extension(".bin"), "application/octet-stream");
    }
}
