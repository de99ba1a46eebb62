//! Объединение документов ФОС в один файл Word
//!
//! Ошибки не возвращаются в JSON: пользователь получает одноразовое
//! сообщение и перенаправляется на страницу ФОС.

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::fmt::Display;
use tracing::{error, info, warn};

use super::FosService;
use crate::errors::{FosAdminError, Result};
use crate::models::documents::Document;
use crate::models::messages::FlashLevel;
use crate::services::upload::{file_response, read_stored_file, save_merged_file, upload_root};
use crate::utils::docx::DocxComposer;
use crate::utils::flash::{ADMIN_INDEX_PATH, flash_and_redirect, fos_change_path};
use crate::utils::{content_type_for_extension, safe_file_stem};

pub const NO_DOCUMENTS_MESSAGE: &str = "Данный ФОС не содержит ни одного документа";
pub const INVALID_MASTER_MESSAGE: &str = "Загруженный документ не является валидным MS Word файлом";
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "Произошла непредвиденная ошибка. Попробуйте позже или обратитесь к администратору";

const DOCX_EXTENSION: &str = ".docx";

/// Что делать с документами ФОС
#[derive(Debug)]
enum MergePlan<'a> {
    Empty,
    Single(&'a Document),
    Compose {
        first: &'a Document,
        rest: Vec<&'a Document>,
    },
}

/// Документы упорядочены по id; без файла у первого ФОС считается пустым
fn plan_merge(documents: &[Document]) -> MergePlan<'_> {
    match documents {
        [] => MergePlan::Empty,
        [first, ..] if !first.has_file() => MergePlan::Empty,
        [single] => MergePlan::Single(single),
        [first, rest @ ..] => MergePlan::Compose {
            first,
            rest: rest.iter().filter(|d| d.has_file()).collect(),
        },
    }
}

/// `{дисциплина латиницей}_fos_{id}.docx`
pub fn merged_file_name(discipline_name: &str, fos_id: i64) -> String {
    format!(
        "{}_fos_{}{}",
        safe_file_stem(discipline_name),
        fos_id,
        DOCX_EXTENSION
    )
}

#[derive(Debug)]
enum MergeError {
    /// Первый документ не открывается как DOCX
    InvalidMaster(FosAdminError),
    Unexpected(FosAdminError),
}

/// Склеить документы; вложения, которые не читаются, пропускаются
fn compose(
    first: &[u8],
    rest: Vec<(i64, Result<Vec<u8>>)>,
) -> std::result::Result<Vec<u8>, MergeError> {
    let mut composer = DocxComposer::from_bytes(first).map_err(MergeError::InvalidMaster)?;

    for (document_id, data) in rest {
        if let Err(e) = data.and_then(|data| composer.append(&data)) {
            warn!("Document {} skipped during merge: {}", document_id, e);
        }
    }
    info!("Merged {} documents into master", composer.appended_count());

    composer.to_bytes().map_err(MergeError::Unexpected)
}

fn stored_path(document: &Document) -> &str {
    document.path.as_deref().unwrap_or_default()
}

/// Лог, сообщение с текстом ошибки и общее сообщение, возврат на страницу ФОС
async fn unexpected_error(request: &HttpRequest, fos_id: i64, err: impl Display) -> HttpResponse {
    error!("Failed to merge documents of fos {}: {}", fos_id, err);
    flash_and_redirect(
        request,
        vec![
            (FlashLevel::Error, err.to_string()),
            (FlashLevel::Error, UNEXPECTED_ERROR_MESSAGE.to_string()),
        ],
        &fos_change_path(fos_id),
    )
    .await
}

pub async fn merge_documents(
    service: &FosService,
    fos_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let fos = match storage.get_fos_by_id(fos_id).await {
        Ok(Some(fos)) => fos,
        Ok(None) => {
            return Ok(flash_and_redirect(
                request,
                vec![(FlashLevel::Error, format!("ФОС с id {fos_id} не найден"))],
                ADMIN_INDEX_PATH,
            )
            .await);
        }
        Err(e) => return Ok(unexpected_error(request, fos_id, e).await),
    };
    let documents = match storage.list_documents_by_fos(fos_id).await {
        Ok(documents) => documents,
        Err(e) => return Ok(unexpected_error(request, fos_id, e).await),
    };

    let root = upload_root();
    let (first, rest) = match plan_merge(&documents) {
        MergePlan::Empty => {
            return Ok(flash_and_redirect(
                request,
                vec![(FlashLevel::Error, NO_DOCUMENTS_MESSAGE.to_string())],
                &fos_change_path(fos_id),
            )
            .await);
        }
        MergePlan::Single(document) => {
            return Ok(match read_stored_file(&root, stored_path(document)) {
                Ok(data) => file_response(
                    data,
                    document
                        .content_type
                        .as_deref()
                        .unwrap_or("application/octet-stream"),
                    &document.download_name(),
                ),
                Err(e) => unexpected_error(request, fos_id, e).await,
            });
        }
        MergePlan::Compose { first, rest } => (first, rest),
    };

    let first_data = match read_stored_file(&root, stored_path(first)) {
        Ok(data) => data,
        Err(e) => return Ok(unexpected_error(request, fos_id, e).await),
    };
    let rest_data: Vec<(i64, Result<Vec<u8>>)> = rest
        .iter()
        .map(|d| (d.id, read_stored_file(&root, stored_path(d))))
        .collect();

    let merged = match tokio::task::spawn_blocking(move || compose(&first_data, rest_data)).await
    {
        Ok(Ok(merged)) => merged,
        Ok(Err(MergeError::InvalidMaster(e))) => {
            warn!("First document of fos {} is not a valid DOCX: {}", fos_id, e);
            return Ok(flash_and_redirect(
                request,
                vec![(FlashLevel::Error, INVALID_MASTER_MESSAGE.to_string())],
                &fos_change_path(fos_id),
            )
            .await);
        }
        Ok(Err(MergeError::Unexpected(e))) => {
            return Ok(unexpected_error(request, fos_id, e).await);
        }
        Err(e) => return Ok(unexpected_error(request, fos_id, e).await),
    };

    let file_name = merged_file_name(&fos.discipline.name, fos_id);
    if let Err(e) = save_merged_file(&root, &file_name, &merged) {
        return Ok(unexpected_error(request, fos_id, e).await);
    }
    info!("Fos {} merged into {}", fos_id, file_name);

    Ok(file_response(
        merged,
        content_type_for_extension(DOCX_EXTENSION),
        &file_name,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    fn document(id: i64, path: Option<&str>) -> Document {
        Document {
            id,
            name: format!("Документ {id}"),
            fos_id: 1,
            path: path.map(str::to_string),
            original_name: None,
            file_size: 0,
            content_type: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn docx(text: &str) -> Vec<u8> {
        let content_types = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(content_types.as_bytes()).unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn body_text(docx: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut entry = archive.by_name("word/document.xml").unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_plan_empty() {
        assert!(matches!(plan_merge(&[]), MergePlan::Empty));
        let docs = [document(1, None), document(2, Some("documents/b.docx"))];
        assert!(matches!(plan_merge(&docs), MergePlan::Empty));
    }

    #[test]
    fn test_plan_single() {
        let docs = [document(1, Some("documents/a.docx"))];
        assert!(matches!(plan_merge(&docs), MergePlan::Single(doc) if doc.id == 1));
    }

    #[test]
    fn test_plan_skips_documents_without_file() {
        let docs = [
            document(1, Some("documents/a.docx")),
            document(2, Some("")),
            document(3, Some("documents/c.docx")),
        ];
        match plan_merge(&docs) {
            MergePlan::Compose { first, rest } => {
                assert_eq!(first.id, 1);
                assert_eq!(rest.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_merged_file_name() {
        assert_eq!(merged_file_name("Физика", 12), "Fizika_fos_12.docx");
        assert_eq!(
            merged_file_name("Теория вероятностей", 3),
            "Teorija_verojatnostej_fos_3.docx"
        );
    }

    #[test]
    fn test_compose_skips_broken_documents() {
        let merged = compose(
            &docx("Первый"),
            vec![
                (2, Ok(b"not a zip".to_vec())),
                (3, Err(FosAdminError::file_operation("missing"))),
                (4, Ok(docx("Четвёртый"))),
            ],
        )
        .unwrap();

        let text = body_text(&merged);
        let first = text.find("Первый").unwrap();
        let fourth = text.find("Четвёртый").unwrap();
        assert!(first < fourth);
    }

    #[test]
    fn test_compose_rejects_invalid_master() {
        let result = compose(b"plain text", vec![(2, Ok(docx("Второй")))]);
        assert!(matches!(result, Err(MergeError::InvalidMaster(_))));
    }
}
