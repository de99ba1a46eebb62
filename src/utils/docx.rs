//! Склейка документов Word (DOCX)
//!
//! Первый документ становится основой: тело каждого следующего документа
//! вставляется перед итоговыми свойствами раздела основы (`<w:sectPr>`),
//! документы разделяются разрывом страницы. Объявления пространств имён
//! корня переносятся в корень основы.
//!
//! Связи с изображениями и внешними гиперссылками переносятся с новыми
//! идентификаторами, остальные ссылки `r:*` из вставленного текста удаляются.
//! Нумерация (`numbering.xml`) получает новые `w:abstractNumId`/`w:numId`,
//! недостающие стили копируются, сноски перенумеровываются. Если у основы
//! такой части нет, она берётся из добавляемого документа целиком.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::ops::Range;

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::{Captures, Regex};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::{FosAdminError, Result};

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Предел суммарного размера распакованных частей одного архива
const MAX_UNPACKED_SIZE: u64 = 256 * 1024 * 1024;

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;
const EMPTY_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_TYPE_IMAGE: &str = "/image";
const REL_TYPE_HYPERLINK: &str = "/hyperlink";

static REL_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s*\br:(id|embed|link|pict)="([^"]*)""#).expect("Invalid relationship regex")
});

static NUM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(<w:numId\s+w:val=")(\d+)(")"#).expect("Invalid numId regex"));

static FOOTNOTE_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<w:footnoteReference\b[^>]*?\bw:id=")(-?\d+)(")"#)
        .expect("Invalid footnote reference regex")
});

static PICTURE_BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:lvlPicBulletId\b[^>]*/>").expect("Invalid picture bullet regex")
});

fn format_error(message: impl std::fmt::Display) -> FosAdminError {
    FosAdminError::document_format(message.to_string())
}

/// Связь из `document.xml.rels`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

/// Части документа, которые сливаются с одноимёнными частями основы.
/// Порядок в `ALL` важен: стили и сноски ссылаются на новую нумерацию.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SharedPart {
    Numbering,
    Styles,
    Footnotes,
}

impl SharedPart {
    const ALL: [SharedPart; 3] = [SharedPart::Numbering, SharedPart::Styles, SharedPart::Footnotes];

    fn file_name(self) -> &'static str {
        match self {
            SharedPart::Numbering => "numbering.xml",
            SharedPart::Styles => "styles.xml",
            SharedPart::Footnotes => "footnotes.xml",
        }
    }

    fn rel_suffix(self) -> &'static str {
        match self {
            SharedPart::Numbering => "/numbering",
            SharedPart::Styles => "/styles",
            SharedPart::Footnotes => "/footnotes",
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            SharedPart::Numbering => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"
            }
            SharedPart::Styles => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"
            }
            SharedPart::Footnotes => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml"
            }
        }
    }

    /// Путь части по связям документа
    fn locate(self, rels: &[Relationship]) -> Option<String> {
        rels.iter()
            .find(|rel| !rel.external && rel.rel_type.ends_with(self.rel_suffix()))
            .map(|rel| resolve_target("word", &rel.target))
    }
}

/// Содержимое архива с сохранением порядка частей
#[derive(Debug, Clone, Default)]
struct Package {
    names: Vec<String>,
    parts: HashMap<String, Vec<u8>>,
}

impl Package {
    fn read(data: &[u8]) -> Result<Self> {
        Self::read_with_limit(data, MAX_UNPACKED_SIZE)
    }

    /// Чтение архива, не более `limit` байт распакованных данных на все части
    fn read_with_limit(data: &[u8], limit: u64) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut package = Package::default();
        let mut remaining = limit;

        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            // заявленному в архиве размеру не доверяем
            let mut buf = Vec::new();
            let read = entry.take(remaining + 1).read_to_end(&mut buf)? as u64;
            if read > remaining {
                return Err(format_error(format!(
                    "Archive unpacks to more than {limit} bytes"
                )));
            }
            remaining -= read;
            package.insert(name, buf);
        }

        Ok(package)
    }

    fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    fn get_text(&self, name: &str) -> Result<Option<String>> {
        self.get(name)
            .map(|bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| format_error(format!("{name} is not UTF-8: {e}")))
            })
            .transpose()
    }

    fn insert(&mut self, name: String, data: Vec<u8>) {
        if !self.parts.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.parts.insert(name, data);
    }

    fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }
}

/// Сборщик итогового документа
#[derive(Debug)]
pub struct DocxComposer {
    package: Package,
    document: String,
    rels: String,
    content_types: String,
    rel_ids: HashSet<String>,
    next_id: usize,
    appended: usize,
}

impl DocxComposer {
    /// Загрузить основной документ
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let package = Package::read(data)?;

        let document = package
            .get_text(DOCUMENT_PART)?
            .ok_or_else(|| format_error("word/document.xml not found"))?;
        check_well_formed(&document)?;
        body_bounds(&document)?;

        let content_types = package
            .get_text(CONTENT_TYPES_PART)?
            .ok_or_else(|| format_error("[Content_Types].xml not found"))?;
        let rels = package
            .get_text(DOCUMENT_RELS_PART)?
            .unwrap_or_else(|| EMPTY_RELS.to_string());

        let rel_ids = parse_relationships(&rels)?
            .into_iter()
            .map(|rel| rel.id)
            .collect();

        Ok(Self {
            package,
            document,
            rels,
            content_types,
            rel_ids,
            next_id: 1,
            appended: 0,
        })
    }

    /// Сколько документов добавлено к основному
    pub fn appended_count(&self) -> usize {
        self.appended
    }

    /// Добавить документ в конец, через разрыв страницы
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        let source = Package::read(data)?;
        let source_document = source
            .get_text(DOCUMENT_PART)?
            .ok_or_else(|| format_error("word/document.xml not found"))?;
        check_well_formed(&source_document)?;

        let source_rels = match source.get_text(DOCUMENT_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };

        let mut source_shared = Vec::new();
        for kind in SharedPart::ALL {
            let Some(path) = kind.locate(&source_rels) else {
                continue;
            };
            let Some(xml) = source.get_text(&path)? else {
                tracing::warn!("Part '{}' is missing in the appended document", path);
                continue;
            };
            check_well_formed(&xml)?;
            source_shared.push((kind, xml));
        }

        // Всё проверено, дальше изменяем только копии
        let mut rels = self.rels.clone();
        let mut content_types = self.content_types.clone();
        let mut new_media: Vec<(String, Vec<u8>)> = Vec::new();
        let mut id_map: HashMap<String, String> = HashMap::new();

        for rel in &source_rels {
            if rel.rel_type.ends_with(REL_TYPE_IMAGE) && !rel.external {
                let source_path = resolve_target("word", &rel.target);
                let Some(bytes) = source.get(&source_path) else {
                    tracing::warn!("Image part '{}' is missing, reference dropped", source_path);
                    continue;
                };
                let file_name = source_path.rsplit('/').next().unwrap_or("image");
                let new_id = self.allocate_id();
                let media_target = format!("media/{}_{}", new_id.to_lowercase(), file_name);

                new_media.push((format!("word/{media_target}"), bytes.to_vec()));
                append_relationship(
                    &mut rels,
                    &Relationship {
                        id: new_id.clone(),
                        rel_type: rel.rel_type.clone(),
                        target: media_target,
                        external: false,
                    },
                )?;
                id_map.insert(rel.id.clone(), new_id);
            } else if rel.rel_type.ends_with(REL_TYPE_HYPERLINK) && rel.external {
                let new_id = self.allocate_id();
                append_relationship(
                    &mut rels,
                    &Relationship {
                        id: new_id.clone(),
                        rel_type: rel.rel_type.clone(),
                        target: rel.target.clone(),
                        external: true,
                    },
                )?;
                id_map.insert(rel.id.clone(), new_id);
            }
        }

        let master_rels = parse_relationships(&self.rels)?;
        let mut shared_updates: Vec<(String, String)> = Vec::new();
        let mut num_map = HashMap::new();
        let mut footnote_map = HashMap::new();

        for (kind, source_xml) in &source_shared {
            // связи у этих частей свои, их не переносим
            let source_xml = remap_references(source_xml, &HashMap::new());
            let source_xml = remap_values(&NUM_ID_RE, &source_xml, &num_map);

            let master_path = kind.locate(&master_rels);
            let master_xml = match &master_path {
                Some(path) => self.package.get_text(path)?,
                None => None,
            };

            match (master_path, master_xml) {
                (Some(path), Some(mut master_xml)) => {
                    match kind {
                        SharedPart::Numbering => {
                            num_map = merge_numbering(&mut master_xml, &source_xml)?
                        }
                        SharedPart::Styles => merge_styles(&mut master_xml, &source_xml)?,
                        SharedPart::Footnotes => {
                            footnote_map = merge_footnotes(&mut master_xml, &source_xml)?
                        }
                    }
                    merge_namespaces(&mut master_xml, &source_xml)?;
                    check_well_formed(&master_xml)?;
                    shared_updates.push((path, master_xml));
                }
                (master_path, _) => {
                    let path = match master_path {
                        Some(path) => path,
                        None => {
                            let rel = Relationship {
                                id: self.allocate_id(),
                                rel_type: format!("{REL_TYPE_BASE}{}", kind.rel_suffix()),
                                target: kind.file_name().to_string(),
                                external: false,
                            };
                            append_relationship(&mut rels, &rel)?;
                            format!("word/{}", kind.file_name())
                        }
                    };
                    ensure_override_content_type(&mut content_types, &path, kind.content_type())?;
                    shared_updates.push((path, source_xml));
                }
            }
        }

        let content = strip_final_section(body_inner(&source_document)?);
        let content = remap_references(content, &id_map);
        let content = remap_values(&NUM_ID_RE, &content, &num_map);
        let content = remap_values(&FOOTNOTE_REFERENCE_RE, &content, &footnote_map);

        let mut document = self.document.clone();
        merge_namespaces(&mut document, &source_document)?;
        let insert_at = insertion_point(&document)?;
        let mut chunk = String::with_capacity(PAGE_BREAK.len() + content.len());
        chunk.push_str(PAGE_BREAK);
        chunk.push_str(&content);
        document.insert_str(insert_at, &chunk);

        for (name, _) in &new_media {
            if let Some(extension) = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()) {
                ensure_default_content_type(&mut content_types, &extension)?;
            }
        }

        self.document = document;
        self.rels = rels;
        self.content_types = content_types;
        for (name, bytes) in new_media {
            self.package.insert(name, bytes);
        }
        for (name, xml) in shared_updates {
            self.package.insert(name, xml.into_bytes());
        }

        self.appended += 1;
        Ok(())
    }

    /// Итоговый архив
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        check_well_formed(&self.document)?;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut names = self.package.names.clone();
        if !self.package.contains(DOCUMENT_RELS_PART) {
            names.push(DOCUMENT_RELS_PART.to_string());
        }

        for name in &names {
            let bytes: &[u8] = match name.as_str() {
                DOCUMENT_PART => self.document.as_bytes(),
                DOCUMENT_RELS_PART => self.rels.as_bytes(),
                CONTENT_TYPES_PART => self.content_types.as_bytes(),
                other => self.package.get(other).unwrap_or_default(),
            };
            writer.start_file(name.as_str(), options)?;
            writer.write_all(bytes)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("rIdFos{}", self.next_id);
            self.next_id += 1;
            if self.rel_ids.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Разбор XML до конца с проверкой парности тегов
fn check_well_formed(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(format_error(format!(
                    "Malformed XML at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }
}

/// Открывающий тег корневого элемента части
#[derive(Debug)]
struct RootTag {
    range: Range<usize>,
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

impl RootTag {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        loop {
            let (tag, self_closing) = match reader.read_event().map_err(format_error)? {
                Event::Start(tag) => (tag, false),
                Event::Empty(tag) => (tag, true),
                Event::Eof => return Err(format_error("Root element not found")),
                _ => continue,
            };

            let end = reader.buffer_position() as usize;
            let start = xml[..end]
                .rfind('<')
                .ok_or_else(|| format_error("Root element not found"))?;
            let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
            let mut attributes = Vec::new();
            for attr in tag.attributes() {
                let attr = attr.map_err(format_error)?;
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value().map_err(format_error)?.into_owned();
                attributes.push((key, value));
            }

            return Ok(Self {
                range: start..end,
                name,
                attributes,
                self_closing,
            });
        }
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    fn render(&self) -> String {
        let mut tag = format!("<{}", self.name);
        for (key, value) in &self.attributes {
            tag.push_str(&format!(
                r#" {key}="{}""#,
                quick_xml::escape::escape(value.as_str())
            ));
        }
        tag.push_str(if self.self_closing { "/>" } else { ">" });
        tag
    }
}

/// Перенести в корень `target` объявления `xmlns:*` и `mc:Ignorable` корня `source`
fn merge_namespaces(target: &mut String, source: &str) -> Result<()> {
    let source_root = RootTag::parse(source)?;
    let mut root = RootTag::parse(target)?;
    let mut changed = false;

    for (key, uri) in &source_root.attributes {
        if !key.starts_with("xmlns:") {
            continue;
        }
        match root.attribute(key) {
            None => {
                root.attributes.push((key.clone(), uri.clone()));
                changed = true;
            }
            Some(existing) if existing != uri => {
                tracing::warn!(
                    "Namespace '{}' is bound to '{}' in the master document, '{}' ignored",
                    key,
                    existing,
                    uri
                );
            }
            Some(_) => {}
        }
    }

    if let Some(ignorable) = source_root.attribute("mc:Ignorable")
        && root.attribute("xmlns:mc").is_some()
    {
        let mut prefixes: Vec<String> = root
            .attribute("mc:Ignorable")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let before = prefixes.len();
        for prefix in ignorable.split_whitespace() {
            // игнорировать можно только объявленный префикс
            let declared = root.attribute(&format!("xmlns:{prefix}")).is_some();
            if declared && !prefixes.iter().any(|known| known == prefix) {
                prefixes.push(prefix.to_string());
            }
        }
        if prefixes.len() != before {
            root.set_attribute("mc:Ignorable", prefixes.join(" "));
            changed = true;
        }
    }

    if changed {
        let rendered = root.render();
        target.replace_range(root.range.clone(), &rendered);
    }
    Ok(())
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event().map_err(format_error)? {
            Event::Empty(tag) | Event::Start(tag) if tag.local_name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };
                for attr in tag.attributes() {
                    let attr = attr.map_err(format_error)?;
                    let value = attr.unescape_value().map_err(format_error)?.into_owned();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value == "External",
                        _ => {}
                    }
                }
                if !rel.id.is_empty() {
                    relationships.push(rel);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

fn append_relationship(rels: &mut String, rel: &Relationship) -> Result<()> {
    let position = rels
        .rfind("</Relationships>")
        .ok_or_else(|| format_error("Relationships part has no closing tag"))?;

    let mode = if rel.external {
        r#" TargetMode="External""#
    } else {
        ""
    };
    let element = format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
        quick_xml::escape::escape(rel.id.as_str()),
        quick_xml::escape::escape(rel.rel_type.as_str()),
        quick_xml::escape::escape(rel.target.as_str()),
        mode
    );
    rels.insert_str(position, &element);
    Ok(())
}

/// Путь части архива по `Target` связи
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{base_dir}/{target}"),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn ensure_default_content_type(content_types: &mut String, extension: &str) -> Result<()> {
    let needle = format!(r#"Extension="{extension}""#);
    if content_types.to_lowercase().contains(&needle) {
        return Ok(());
    }

    let position = content_types
        .rfind("</Types>")
        .ok_or_else(|| format_error("[Content_Types].xml has no closing tag"))?;
    let element = format!(
        r#"<Default Extension="{}" ContentType="{}"/>"#,
        extension,
        media_content_type(extension)
    );
    content_types.insert_str(position, &element);
    Ok(())
}

fn ensure_override_content_type(
    content_types: &mut String,
    part: &str,
    content_type: &str,
) -> Result<()> {
    let part_name = format!("/{part}");
    if content_types.contains(&format!(r#"PartName="{part_name}""#)) {
        return Ok(());
    }

    let position = content_types
        .rfind("</Types>")
        .ok_or_else(|| format_error("[Content_Types].xml has no closing tag"))?;
    let element = format!(r#"<Override PartName="{part_name}" ContentType="{content_type}"/>"#);
    content_types.insert_str(position, &element);
    Ok(())
}

fn media_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

/// Начало тега `name` ровно с этим именем (`<w:sectPr`, но не `<w:sectPrChange`)
fn find_tag(xml: &str, name: &str, from: usize) -> Option<usize> {
    let pattern = format!("<{name}");
    let mut offset = from;
    while let Some(found) = xml[offset..].find(&pattern) {
        let start = offset + found;
        let next = xml[start + pattern.len()..].chars().next();
        if matches!(next, Some('>' | '/' | ' ' | '\t' | '\r' | '\n')) {
            return Some(start);
        }
        offset = start + pattern.len();
    }
    None
}

/// Границы содержимого `<w:body>`: (после открывающего тега, начало `</w:body>`)
fn body_bounds(document: &str) -> Result<(usize, usize)> {
    let open = find_tag(document, "w:body", 0)
        .ok_or_else(|| format_error("Document has no <w:body>"))?;
    let content_start = document[open..]
        .find('>')
        .map(|i| open + i + 1)
        .ok_or_else(|| format_error("Unterminated <w:body> tag"))?;
    let close = document
        .rfind("</w:body>")
        .filter(|&close| close >= content_start)
        .ok_or_else(|| format_error("Document has no </w:body>"))?;
    Ok((content_start, close))
}

fn body_inner(document: &str) -> Result<&str> {
    let (start, end) = body_bounds(document)?;
    Ok(&document[start..end])
}

/// Конец элемента, начинающегося в `start`, с учётом вложенных одноимённых
fn element_end(xml: &str, start: usize, name: &str) -> Option<usize> {
    let tag_end = start + xml[start..].find('>')?;
    if xml[..tag_end].ends_with('/') {
        return Some(tag_end + 1);
    }

    let closing = format!("</{name}>");
    let mut depth = 1usize;
    let mut pos = tag_end + 1;
    loop {
        let next_close = pos + xml[pos..].find(&closing)?;
        match find_tag(xml, name, pos).filter(|&open| open < next_close) {
            Some(open) => {
                let open_end = open + xml[open..].find('>')?;
                if !xml[..open_end].ends_with('/') {
                    depth += 1;
                }
                pos = open_end + 1;
            }
            None => {
                depth -= 1;
                pos = next_close + closing.len();
                if depth == 0 {
                    return Some(pos);
                }
            }
        }
    }
}

/// Диапазоны всех элементов `name` подряд, без вложенных
fn elements(xml: &str, name: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(start) = find_tag(xml, name, from) {
        let Some(end) = element_end(xml, start, name) else {
            break;
        };
        found.push(start..end);
        from = end;
    }
    found
}

/// Границы значения атрибута в открывающем теге элемента
fn attribute_span(element: &str, attr: &str) -> Option<Range<usize>> {
    let tag_end = element.find('>')?;
    let needle = format!("{attr}=\"");
    let mut from = 0;
    while let Some(found) = element[from..tag_end].find(&needle) {
        let start = from + found;
        if element[..start].ends_with(|c: char| c.is_ascii_whitespace()) {
            let value_start = start + needle.len();
            let value_end = value_start + element[value_start..].find('"')?;
            return Some(value_start..value_end);
        }
        from = start + needle.len();
    }
    None
}

fn tag_attribute<'a>(element: &'a str, attr: &str) -> Option<&'a str> {
    attribute_span(element, attr).map(|span| &element[span])
}

fn with_attribute(element: &str, attr: &str, value: &str) -> String {
    match attribute_span(element, attr) {
        Some(span) => format!("{}{}{}", &element[..span.start], value, &element[span.end..]),
        None => element.to_string(),
    }
}

fn without_attribute(element: &str, attr: &str) -> String {
    match attribute_span(element, attr) {
        // пробел перед именем, имя, `="`, значение и закрывающая кавычка
        Some(span) => {
            let start = span.start - attr.len() - 3;
            format!("{}{}", &element[..start], &element[span.end + 1..])
        }
        None => element.to_string(),
    }
}

/// Следующий свободный числовой идентификатор среди элементов `name`
fn next_free_id(xml: &str, name: &str, attr: &str, first: i64) -> i64 {
    elements(xml, name)
        .into_iter()
        .filter_map(|range| tag_attribute(&xml[range], attr)?.parse::<i64>().ok())
        .max()
        .map_or(first, |max| (max + 1).max(first))
}

/// Добавить определения нумерации с новыми идентификаторами.
/// Возвращает соответствие старых `w:numId` новым.
fn merge_numbering(master: &mut String, source: &str) -> Result<HashMap<String, String>> {
    let mut next_abstract = next_free_id(master, "w:abstractNum", "w:abstractNumId", 0);
    let mut next_num = next_free_id(master, "w:num", "w:numId", 1);

    let mut abstract_map: HashMap<String, String> = HashMap::new();
    let mut abstract_block = String::new();
    for range in elements(source, "w:abstractNum") {
        let element = &source[range];
        let Some(old_id) = tag_attribute(element, "w:abstractNumId") else {
            continue;
        };
        let new_id = next_abstract.to_string();
        next_abstract += 1;
        // маркеры-картинки живут в части основы под другими номерами
        let element = PICTURE_BULLET_RE.replace_all(element, "");
        abstract_block.push_str(&with_attribute(&element, "w:abstractNumId", &new_id));
        abstract_map.insert(old_id.to_string(), new_id);
    }

    let mut num_map = HashMap::new();
    let mut num_block = String::new();
    for range in elements(source, "w:num") {
        let element = &source[range];
        let Some(old_id) = tag_attribute(element, "w:numId") else {
            continue;
        };
        let abstract_id = find_tag(element, "w:abstractNumId", 0)
            .and_then(|pos| tag_attribute(&element[pos..], "w:val"))
            .and_then(|old| abstract_map.get(old));
        let Some(abstract_id) = abstract_id else {
            continue;
        };

        let new_id = next_num.to_string();
        next_num += 1;
        let mut rewritten = with_attribute(element, "w:numId", &new_id);
        if let Some(pos) = find_tag(&rewritten, "w:abstractNumId", 0) {
            rewritten = format!(
                "{}{}",
                &rewritten[..pos],
                with_attribute(&rewritten[pos..], "w:val", abstract_id)
            );
        }
        num_block.push_str(&rewritten);
        num_map.insert(old_id.to_string(), new_id);
    }

    // порядок по схеме: abstractNum*, num*, numIdMacAtCleanup?
    let abstract_at = elements(master, "w:abstractNum")
        .last()
        .map(|range| range.end)
        .or_else(|| find_tag(master, "w:num", 0))
        .or_else(|| find_tag(master, "w:numIdMacAtCleanup", 0))
        .or_else(|| master.rfind("</w:numbering>"))
        .ok_or_else(|| format_error("Numbering part has no closing tag"))?;
    master.insert_str(abstract_at, &abstract_block);

    let num_at = elements(master, "w:num")
        .last()
        .map(|range| range.end)
        .or_else(|| find_tag(master, "w:numIdMacAtCleanup", 0))
        .or_else(|| master.rfind("</w:numbering>"))
        .ok_or_else(|| format_error("Numbering part has no closing tag"))?;
    master.insert_str(num_at, &num_block);

    Ok(num_map)
}

/// Скопировать стили, которых нет у основы. Одноимённые стили основы не меняются.
fn merge_styles(master: &mut String, source: &str) -> Result<()> {
    let known: HashSet<String> = elements(master, "w:style")
        .into_iter()
        .filter_map(|range| tag_attribute(&master[range], "w:styleId").map(str::to_string))
        .collect();

    let mut block = String::new();
    for range in elements(source, "w:style") {
        let element = &source[range];
        match tag_attribute(element, "w:styleId") {
            // стиль по умолчанию у основы уже есть
            Some(id) if !known.contains(id) => block.push_str(&without_attribute(element, "w:default")),
            _ => {}
        }
    }
    if block.is_empty() {
        return Ok(());
    }

    let position = master
        .rfind("</w:styles>")
        .ok_or_else(|| format_error("Styles part has no closing tag"))?;
    master.insert_str(position, &block);
    Ok(())
}

/// Добавить обычные сноски под новыми номерами.
/// Возвращает соответствие старых `w:id` новым.
fn merge_footnotes(master: &mut String, source: &str) -> Result<HashMap<String, String>> {
    let mut next_id = next_free_id(master, "w:footnote", "w:id", 1);
    let mut map = HashMap::new();
    let mut block = String::new();

    for range in elements(source, "w:footnote") {
        let element = &source[range];
        // разделители у основы свои
        if tag_attribute(element, "w:type").is_some_and(|kind| kind != "normal") {
            continue;
        }
        let Some(old_id) = tag_attribute(element, "w:id") else {
            continue;
        };
        let new_id = next_id.to_string();
        next_id += 1;
        block.push_str(&with_attribute(element, "w:id", &new_id));
        map.insert(old_id.to_string(), new_id);
    }
    if block.is_empty() {
        return Ok(map);
    }

    let position = master
        .rfind("</w:footnotes>")
        .ok_or_else(|| format_error("Footnotes part has no closing tag"))?;
    master.insert_str(position, &block);
    Ok(map)
}

/// Начало `<w:sectPr>`, которым заканчивается тело
fn final_section(inner: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(start) = find_tag(inner, "w:sectPr", from) {
        if element_end(inner, start, "w:sectPr").is_some_and(|end| inner[end..].trim().is_empty()) {
            return Some(start);
        }
        from = start + 1;
    }
    None
}

/// Убрать итоговый `<w:sectPr>` вставляемого документа
fn strip_final_section(inner: &str) -> &str {
    match final_section(inner) {
        Some(start) => &inner[..start],
        None => inner,
    }
}

/// Куда вставлять в основной документ: перед итоговым `<w:sectPr>` тела,
/// иначе перед `</w:body>`
fn insertion_point(document: &str) -> Result<usize> {
    let (start, end) = body_bounds(document)?;
    Ok(match final_section(&document[start..end]) {
        Some(section) => start + section,
        None => end,
    })
}

fn remap_references(content: &str, id_map: &HashMap<String, String>) -> String {
    REL_REFERENCE_RE
        .replace_all(content, |caps: &Captures| match id_map.get(&caps[2]) {
            Some(new_id) => format!(r#" r:{}="{}""#, &caps[1], new_id),
            None => String::new(),
        })
        .into_owned()
}

/// Заменить числовые значения из второй группы `re` по таблице, прочие не трогать
fn remap_values(re: &Regex, xml: &str, map: &HashMap<String, String>) -> String {
    if map.is_empty() {
        return xml.to_string();
    }
    re.replace_all(xml, |caps: &Captures| match map.get(&caps[2]) {
        Some(new_value) => format!("{}{}{}", &caps[1], new_value, &caps[3]),
        None => caps[0].to_string(),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    const IMAGE_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    const LINK_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    const HEADER_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn build_docx(document: &str, rels: Option<&str>, extra: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file(CONTENT_TYPES_PART, options).unwrap();
        writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        if let Some(rels) = rels {
            writer.start_file(DOCUMENT_RELS_PART, options).unwrap();
            writer.write_all(rels.as_bytes()).unwrap();
        }
        for (name, bytes) in extra {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn rels_xml(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{entries}</Relationships>"#
        )
    }

    fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    const SECTION: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#;

    #[test]
    fn test_append_keeps_order_and_master_section() {
        let master = build_docx(
            &document_xml(&format!("{}{}", paragraph("Первый"), SECTION)),
            None,
            &[],
        );
        let second = build_docx(
            &document_xml(&format!(
                "{}<w:sectPr><w:pgSz w:w=\"1\"/></w:sectPr>",
                paragraph("Второй")
            )),
            None,
            &[],
        );
        let third = build_docx(&document_xml(&paragraph("Третий")), None, &[]);

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&second).unwrap();
        composer.append(&third).unwrap();
        assert_eq!(composer.appended_count(), 2);

        let merged = composer.to_bytes().unwrap();
        let document = read_part(&merged, DOCUMENT_PART);

        let first = document.find("Первый").unwrap();
        let second = document.find("Второй").unwrap();
        let third = document.find("Третий").unwrap();
        assert!(first < second && second < third);
        assert_eq!(document.matches(PAGE_BREAK).count(), 2);
        // остаётся только раздел основного документа, в конце тела
        assert_eq!(document.matches("<w:sectPr>").count(), 1);
        assert!(document.find(SECTION).unwrap() > third);
        assert!(!document.contains("w:w=\"1\""));
    }

    #[test]
    fn test_section_change_is_not_final_section() {
        let body = format!(
            "{}<w:sectPr><w:sectPrChange w:id=\"1\"><w:sectPr/></w:sectPrChange></w:sectPr>",
            paragraph("Основа")
        );
        let master = build_docx(&document_xml(&body), None, &[]);
        let other = build_docx(&document_xml(&paragraph("Добавка")), None, &[]);

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let document = read_part(&composer.to_bytes().unwrap(), DOCUMENT_PART);

        let appended = document.find("Добавка").unwrap();
        let section = document.find("<w:sectPr><w:sectPrChange").unwrap();
        assert!(appended < section);
    }

    #[test]
    fn test_master_without_section_appends_before_body_end() {
        let master = build_docx(&document_xml(&paragraph("А")), None, &[]);
        let other = build_docx(&document_xml(&paragraph("Б")), None, &[]);

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let document = read_part(&composer.to_bytes().unwrap(), DOCUMENT_PART);
        assert!(document.contains(&format!("{}{}{}</w:body>", paragraph("А"), PAGE_BREAK, paragraph("Б"))));
    }

    #[test]
    fn test_images_and_links_are_copied_with_new_ids() {
        let master_rels = rels_xml(&format!(
            r#"<Relationship Id="rId1" Type="{IMAGE_TYPE}" Target="media/image1.png"/>"#
        ));
        let master = build_docx(
            &document_xml(&format!("{}{}", paragraph("Основа"), SECTION)),
            Some(&master_rels),
            &[("word/media/image1.png", b"\x89PNG master")],
        );

        let body = format!(
            r#"<w:p><w:r><w:drawing><a:blip xmlns:a="urn:a" r:embed="rId1"/></w:drawing></w:r><w:hyperlink r:id="rId2"><w:r><w:t>сайт</w:t></w:r></w:hyperlink><w:r><w:t>{}</w:t></w:r></w:p><w:p><w:headerReference r:id="rId3"/></w:p>"#,
            "Вложение"
        );
        let other_rels = rels_xml(&format!(
            r#"<Relationship Id="rId1" Type="{IMAGE_TYPE}" Target="media/image1.jpeg"/><Relationship Id="rId2" Type="{LINK_TYPE}" Target="https://example.org/?a=1&amp;b=2" TargetMode="External"/><Relationship Id="rId3" Type="{HEADER_TYPE}" Target="header1.xml"/>"#
        ));
        let other = build_docx(
            &document_xml(&body),
            Some(&other_rels),
            &[("word/media/image1.jpeg", b"\xFF\xD8\xFF other")],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let merged = composer.to_bytes().unwrap();

        let document = read_part(&merged, DOCUMENT_PART);
        assert!(document.contains(r#"r:embed="rIdFos1""#));
        assert!(document.contains(r#"r:id="rIdFos2""#));
        assert!(!document.contains("rId3"));
        assert!(document.contains("<w:headerReference/>"));

        let rels = read_part(&merged, DOCUMENT_RELS_PART);
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains(r#"Target="media/ridfos1_image1.jpeg""#));
        assert!(rels.contains(r#"Target="https://example.org/?a=1&amp;b=2" TargetMode="External""#));
        assert!(!rels.contains("header1.xml"));

        // картинка основы не перезаписана
        let mut archive = ZipArchive::new(Cursor::new(merged.as_slice())).unwrap();
        let mut master_image = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut master_image)
            .unwrap();
        assert_eq!(master_image, b"\x89PNG master");
        assert!(archive.by_name("word/media/ridfos1_image1.jpeg").is_ok());

        let content_types = read_part(&merged, CONTENT_TYPES_PART);
        assert!(content_types.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
    }

    #[test]
    fn test_existing_ids_are_not_reused() {
        let master_rels = rels_xml(&format!(
            r#"<Relationship Id="rIdFos1" Type="{LINK_TYPE}" Target="https://a.ru" TargetMode="External"/>"#
        ));
        let master = build_docx(&document_xml(&paragraph("А")), Some(&master_rels), &[]);
        let other_rels = rels_xml(&format!(
            r#"<Relationship Id="rId7" Type="{LINK_TYPE}" Target="https://b.ru" TargetMode="External"/>"#
        ));
        let other = build_docx(
            &document_xml(r#"<w:p><w:hyperlink r:id="rId7"/></w:p>"#),
            Some(&other_rels),
            &[],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let document = read_part(&composer.to_bytes().unwrap(), DOCUMENT_PART);
        assert!(document.contains(r#"r:id="rIdFos2""#));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        assert!(DocxComposer::from_bytes(b"not a zip").is_err());

        let broken = build_docx("<w:document><w:body><w:p></w:body>", None, &[]);
        let err = DocxComposer::from_bytes(&broken).unwrap_err();
        assert_eq!(err.code(), "E014");

        let master = build_docx(&document_xml(&paragraph("А")), None, &[]);
        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        assert!(composer.append(b"PK garbage").is_err());
        assert!(composer.append(&broken).is_err());
        assert_eq!(composer.appended_count(), 0);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word", "media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("word", "../media/a.png"), "media/a.png");
        assert_eq!(resolve_target("word", "/word/media/a.png"), "word/media/a.png");
    }

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    const W14_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
    const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

    fn shared_rel(id: &str, kind: SharedPart) -> String {
        format!(
            r#"<Relationship Id="{id}" Type="{REL_TYPE_BASE}{}" Target="{}"/>"#,
            kind.rel_suffix(),
            kind.file_name()
        )
    }

    fn numbering_xml(items: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:numbering xmlns:w="{W_NS}">{items}</w:numbering>"#)
    }

    fn abstract_num(id: u32, marker: &str) -> String {
        format!(
            r#"<w:abstractNum w:abstractNumId="{id}"><w:lvl w:ilvl="0"><w:lvlText w:val="{marker}"/></w:lvl></w:abstractNum>"#
        )
    }

    fn num(id: u32, abstract_id: u32) -> String {
        format!(r#"<w:num w:numId="{id}"><w:abstractNumId w:val="{abstract_id}"/></w:num>"#)
    }

    fn list_item(num_id: u32, text: &str) -> String {
        format!(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
        )
    }

    fn styles_xml(items: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="{W_NS}">{items}</w:styles>"#)
    }

    fn footnotes_xml(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:footnotes xmlns:w="{W_NS}"><w:footnote w:type="separator" w:id="-1"><w:p/></w:footnote><w:footnote w:type="continuationSeparator" w:id="0"><w:p/></w:footnote>{items}</w:footnotes>"#
        )
    }

    fn footnote(id: u32, text: &str) -> String {
        format!(r#"<w:footnote w:id="{id}"><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:footnote>"#)
    }

    fn footnote_ref(id: u32) -> String {
        format!(r#"<w:r><w:footnoteReference w:id="{id}"/></w:r>"#)
    }

    /// Префиксы элементов и атрибутов, для которых нет объявления `xmlns:*`
    fn undeclared_prefixes(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut declared = HashSet::new();
        let mut used = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(tag) | Event::Empty(tag) => {
                    used.push(String::from_utf8_lossy(tag.name().as_ref()).into_owned());
                    for attr in tag.attributes() {
                        let key = String::from_utf8_lossy(attr.unwrap().key.as_ref()).into_owned();
                        match key.strip_prefix("xmlns:") {
                            Some(prefix) => {
                                declared.insert(prefix.to_string());
                            }
                            None => used.push(key),
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        let mut undeclared: Vec<String> = used
            .iter()
            .filter_map(|name| name.split_once(':').map(|(prefix, _)| prefix.to_string()))
            .filter(|prefix| prefix != "xml" && !declared.contains(prefix))
            .collect();
        undeclared.dedup();
        undeclared
    }

    #[test]
    fn test_unpacked_size_is_limited() {
        let big = document_xml(&paragraph(&"а".repeat(100_000)));
        let docx = build_docx(&big, None, &[]);

        let err = Package::read_with_limit(&docx, 64 * 1024).unwrap_err();
        assert_eq!(err.code(), "E014");
        assert!(Package::read_with_limit(&docx, 1024 * 1024).is_ok());
    }

    #[test]
    fn test_append_carries_namespace_declarations() {
        let master = build_docx(&document_xml(&paragraph("Основа")), None, &[]);
        let other_document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:mc="{MC_NS}" xmlns:w14="{W14_NS}" mc:Ignorable="w14"><w:body><w:p w14:paraId="1A2B3C4D"><w:r><w:t>Добавка</w:t></w:r></w:p></w:body></w:document>"#
        );
        let other = build_docx(&other_document, None, &[]);

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let document = read_part(&composer.to_bytes().unwrap(), DOCUMENT_PART);

        assert!(document.contains(r#"w14:paraId="1A2B3C4D""#));
        assert!(document.contains(&format!(r#"xmlns:w14="{W14_NS}""#)));
        assert!(document.contains(r#"mc:Ignorable="w14""#));
        assert_eq!(undeclared_prefixes(&document), Vec::<String>::new());
    }

    #[test]
    fn test_conflicting_namespace_prefix_keeps_master_binding() {
        let mut master = format!(r#"<w:document xmlns:w="{W_NS}" xmlns:x="urn:master"><w:body/></w:document>"#);
        let source = format!(r#"<w:document xmlns:w="{W_NS}" xmlns:x="urn:other" xmlns:y="urn:y"><w:body/></w:document>"#);

        merge_namespaces(&mut master, &source).unwrap();
        assert!(master.contains(r#"xmlns:x="urn:master""#));
        assert!(!master.contains("urn:other"));
        assert!(master.contains(r#"xmlns:y="urn:y""#));
        check_well_formed(&master).unwrap();
    }

    #[test]
    fn test_numbering_is_renumbered() {
        let master_rels = rels_xml(&shared_rel("rId1", SharedPart::Numbering));
        let master = build_docx(
            &document_xml(&list_item(1, "Основа")),
            Some(&master_rels),
            &[(
                "word/numbering.xml",
                numbering_xml(&format!("{}{}", abstract_num(0, "%1."), num(1, 0))).as_bytes(),
            )],
        );

        let other_numbering = numbering_xml(&format!(
            r#"<w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:lvlPicBulletId w:val="0"/><w:lvlText w:val="%1)"/></w:lvl></w:abstractNum>{}{}"#,
            num(1, 0),
            num(2, 0)
        ));
        let other = build_docx(
            &document_xml(&format!("{}{}", list_item(2, "Вопрос"), list_item(0, "Без списка"))),
            Some(&rels_xml(&shared_rel("rId5", SharedPart::Numbering))),
            &[("word/numbering.xml", other_numbering.as_bytes())],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let merged = composer.to_bytes().unwrap();

        let numbering = read_part(&merged, "word/numbering.xml");
        assert_eq!(elements(&numbering, "w:abstractNum").len(), 2);
        assert!(numbering.contains(r#"<w:abstractNum w:abstractNumId="1"><w:lvl w:ilvl="0"><w:lvlText w:val="%1)"/>"#));
        assert!(!numbering.contains("w:lvlPicBulletId"));
        assert!(numbering.contains(&num(2, 1)));
        assert!(numbering.contains(&num(3, 1)));
        // определения идут раньше экземпляров
        assert!(numbering.find(r#"w:abstractNumId="1""#).unwrap() < numbering.find(&num(1, 0)).unwrap());

        let document = read_part(&merged, DOCUMENT_PART);
        assert!(document.contains(&list_item(1, "Основа")));
        assert!(document.contains(&list_item(3, "Вопрос")));
        assert!(document.contains(&list_item(0, "Без списка")));
    }

    #[test]
    fn test_missing_numbering_is_adopted() {
        let master = build_docx(&document_xml(&paragraph("Основа")), None, &[]);
        let other_numbering = numbering_xml(&format!("{}{}", abstract_num(0, "%1."), num(1, 0)));
        let other = build_docx(
            &document_xml(&list_item(1, "Вопрос")),
            Some(&rels_xml(&shared_rel("rId2", SharedPart::Numbering))),
            &[("word/numbering.xml", other_numbering.as_bytes())],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let merged = composer.to_bytes().unwrap();

        assert_eq!(read_part(&merged, "word/numbering.xml"), other_numbering);
        let rels = read_part(&merged, DOCUMENT_RELS_PART);
        assert!(rels.contains(&format!(r#"Type="{REL_TYPE_BASE}/numbering" Target="numbering.xml""#)));
        let content_types = read_part(&merged, CONTENT_TYPES_PART);
        assert!(content_types.contains(r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#));
        assert!(read_part(&merged, DOCUMENT_PART).contains(&list_item(1, "Вопрос")));
    }

    #[test]
    fn test_missing_styles_are_copied() {
        let master_styles = styles_xml(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:rPr><w:sz w:val="28"/></w:rPr></w:style>"#,
        );
        let master = build_docx(
            &document_xml(&paragraph("Основа")),
            Some(&rels_xml(&shared_rel("rId1", SharedPart::Styles))),
            &[("word/styles.xml", master_styles.as_bytes())],
        );

        let other_styles = styles_xml(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:rPr><w:sz w:val="20"/></w:rPr></w:style><w:style w:type="paragraph" w:default="1" w:styleId="a"><w:name w:val="Обычный"/></w:style><w:style w:type="paragraph" w:styleId="Question"><w:basedOn w:val="a"/></w:style>"#,
        );
        let other = build_docx(
            &document_xml(r#"<w:p><w:pPr><w:pStyle w:val="Question"/></w:pPr></w:p>"#),
            Some(&rels_xml(&shared_rel("rId9", SharedPart::Styles))),
            &[("word/styles.xml", other_styles.as_bytes())],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let styles = read_part(&composer.to_bytes().unwrap(), "word/styles.xml");

        assert_eq!(styles.matches(r#"w:styleId="Normal""#).count(), 1);
        assert!(styles.contains(r#"<w:sz w:val="28"/>"#));
        assert!(!styles.contains(r#"<w:sz w:val="20"/>"#));
        assert!(styles.contains(r#"<w:style w:type="paragraph" w:styleId="a">"#));
        assert!(styles.contains(r#"<w:style w:type="paragraph" w:styleId="Question">"#));
        assert_eq!(styles.matches(r#"w:default="1""#).count(), 1);
    }

    #[test]
    fn test_footnotes_are_renumbered() {
        let master_rels = rels_xml(&shared_rel("rId1", SharedPart::Footnotes));
        let master = build_docx(
            &document_xml(&format!("<w:p>{}</w:p>", footnote_ref(1))),
            Some(&master_rels),
            &[("word/footnotes.xml", footnotes_xml(&footnote(1, "Сноска А")).as_bytes())],
        );

        let other_footnotes = footnotes_xml(&format!("{}{}", footnote(1, "Сноска Б"), footnote(2, "Сноска В")));
        let other = build_docx(
            &document_xml(&format!("<w:p>{}{}</w:p>", footnote_ref(1), footnote_ref(2))),
            Some(&rels_xml(&shared_rel("rId3", SharedPart::Footnotes))),
            &[("word/footnotes.xml", other_footnotes.as_bytes())],
        );

        let mut composer = DocxComposer::from_bytes(&master).unwrap();
        composer.append(&other).unwrap();
        let merged = composer.to_bytes().unwrap();

        let footnotes = read_part(&merged, "word/footnotes.xml");
        assert!(footnotes.contains(&footnote(1, "Сноска А")));
        assert!(footnotes.contains(&footnote(2, "Сноска Б")));
        assert!(footnotes.contains(&footnote(3, "Сноска В")));
        assert_eq!(footnotes.matches(r#"w:type="separator""#).count(), 1);

        let document = read_part(&merged, DOCUMENT_PART);
        assert_eq!(document.matches(&footnote_ref(1)).count(), 1);
        assert!(document.contains(&format!("<w:p>{}{}</w:p>", footnote_ref(2), footnote_ref(3))));
    }

    #[test]
    fn test_attribute_helpers() {
        let element = r#"<w:style w:type="paragraph" w:default="1" w:styleId="a"><w:name w:val="x"/></w:style>"#;
        assert_eq!(tag_attribute(element, "w:styleId"), Some("a"));
        assert_eq!(tag_attribute(element, "w:val"), None);
        assert_eq!(
            without_attribute(element, "w:default"),
            r#"<w:style w:type="paragraph" w:styleId="a"><w:name w:val="x"/></w:style>"#
        );
        assert_eq!(
            with_attribute(element, "w:styleId", "b"),
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="b"><w:name w:val="x"/></w:style>"#
        );
        assert_eq!(next_free_id(&numbering_xml(""), "w:num", "w:numId", 1), 1);
        assert_eq!(next_free_id(&footnotes_xml(""), "w:footnote", "w:id", 1), 1);
    }
}
