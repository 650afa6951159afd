// Word-processing document (docx) to HTML conversion
//
// The package is a zip of XML parts. The main document part is located via
// the package relationships, parsed into a small block/inline model, then
// handed to the HTML writer together with styles, numbering, relationships
// and resolved images. Anything the mapping does not cover is dropped
// quietly or reported through `Conversion::messages`.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use filedock_core::codec;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::docx_html::HtmlWriter;
use crate::docx_styles::{Numbering, NumberingRef, StyleMap};
use crate::error::FormatError;

const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const STYLES_REL: &str = "/styles";
const NUMBERING_REL: &str = "/numbering";

/// Result of converting a document: the HTML fragment plus any warnings
/// about content that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub html: String,
    pub messages: Vec<String>,
}

/// Convert docx bytes into an HTML fragment.
pub fn convert_to_html(bytes: &[u8]) -> Result<Conversion, FormatError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FormatError::UnsupportedFormat(format!("Not a document package: {}", e)))?;

    let document_path = main_document_path(&mut archive);
    let document_xml = read_part(&mut archive, &document_path).ok_or_else(|| {
        FormatError::UnsupportedFormat(format!("Document part '{}' not found", document_path))
    })?;

    let base_dir = parent_dir(&document_path);
    let relationships = read_part(&mut archive, &rels_path_for(&document_path))
        .map(|xml| parse_relationships(&xml))
        .unwrap_or_default();

    let styles = related_part(&mut archive, &relationships, base_dir, STYLES_REL, "styles.xml")
        .map(|xml| StyleMap::parse(&xml))
        .unwrap_or_default();
    let numbering = related_part(&mut archive, &relationships, base_dir, NUMBERING_REL, "numbering.xml")
        .map(|xml| Numbering::parse(&xml))
        .unwrap_or_default();

    let blocks = parse_document(&document_xml)?;

    let mut messages = Vec::new();
    let mut images = HashMap::new();
    let mut rel_ids = Vec::new();
    collect_image_rels(&blocks, &mut rel_ids);
    for rel_id in rel_ids {
        if images.contains_key(&rel_id) {
            continue;
        }
        match relationships.get(&rel_id) {
            Some(rel) if rel.external => {
                images.insert(rel_id, rel.target.clone());
            }
            Some(rel) => {
                let path = resolve_target(base_dir, &rel.target);
                match read_part_bytes(&mut archive, &path) {
                    Some(data) => {
                        let mime = mime_guess::from_path(&path).first_or_octet_stream();
                        images.insert(rel_id, codec::data_url(mime.essence_str(), &data));
                    }
                    None => messages.push(format!("Image part '{}' not found", path)),
                }
            }
            None => messages.push(format!("Image relationship '{}' not found", rel_id)),
        }
    }

    let mut writer = HtmlWriter::new(&styles, &numbering, &relationships, &images);
    writer.write_blocks(&blocks);
    let (html, writer_messages) = writer.finish();
    messages.extend(writer_messages);

    for message in &messages {
        log::debug!("docx conversion: {}", message);
    }

    Ok(Conversion { html, messages })
}

// ============================================================================
// Document model
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Block {
    Paragraph(Paragraph),
    /// rows -> cells -> cell content
    Table(Vec<Vec<Vec<Block>>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Paragraph {
    pub style_id: Option<String>,
    pub numbering: Option<NumberingRef>,
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Inline {
    Text { text: String, format: RunFormat },
    Break,
    Link {
        rel_id: Option<String>,
        anchor: Option<String>,
        children: Vec<Inline>,
    },
    Image { rel_id: String, alt: Option<String> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub vertical: VerticalAlign,
}

/// A package relationship (`_rels/*.rels` entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub kind: String,
    pub target: String,
    pub external: bool,
}

// ============================================================================
// Package access
// ============================================================================

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<String> {
    let bytes = read_part_bytes(archive, path)?;
    let text = String::from_utf8_lossy(&bytes);
    Some(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}

fn read_part_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<Vec<u8>> {
    let mut file = archive.by_name(path).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

fn main_document_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> String {
    read_part(archive, "_rels/.rels")
        .map(|xml| parse_relationships(&xml))
        .and_then(|rels| {
            rels.into_values()
                .find(|rel| rel.kind.ends_with(OFFICE_DOCUMENT_REL) && !rel.external)
                .map(|rel| resolve_target("", &rel.target))
        })
        .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string())
}

/// Read the part the document relates to with `kind`, falling back to the
/// conventional file name next to the document.
fn related_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, Relationship>,
    base_dir: &str,
    kind: &str,
    fallback: &str,
) -> Option<String> {
    let path = relationships
        .values()
        .find(|rel| rel.kind.ends_with(kind) && !rel.external)
        .map(|rel| resolve_target(base_dir, &rel.target))
        .unwrap_or_else(|| resolve_target(base_dir, fallback));
    read_part(archive, &path)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn rels_path_for(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", path),
    }
}

/// Resolve a relationship target against the source part's directory.
/// Absolute targets are package-rooted.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(rooted) = target.strip_prefix('/') {
        return normalize(parts, rooted);
    }
    parts.extend(base_dir.split('/').filter(|s| !s.is_empty()));
    normalize(parts, target)
}

fn normalize<'a>(mut parts: Vec<&'a str>, target: &'a str) -> String {
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

pub(crate) fn parse_relationships(xml: &str) -> HashMap<String, Relationship> {
    let mut relationships = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(e, b"Id");
                let target = attr_value(e, b"Target");
                if let (Some(id), Some(target)) = (id, target) {
                    let kind = attr_value(e, b"Type").unwrap_or_default();
                    let external = attr_value(e, b"TargetMode").as_deref() == Some("External");
                    relationships.insert(id, Relationship { kind, target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Malformed relationships part: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    relationships
}

fn collect_image_rels(blocks: &[Block], out: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => collect_inline_image_rels(&p.inlines, out),
            Block::Table(rows) => {
                for cell in rows.iter().flatten() {
                    collect_image_rels(cell, out);
                }
            }
        }
    }
}

fn collect_inline_image_rels(inlines: &[Inline], out: &mut Vec<String>) {
    for inline in inlines {
        match inline {
            Inline::Image { rel_id, .. } => out.push(rel_id.clone()),
            Inline::Link { children, .. } => collect_inline_image_rels(children, out),
            Inline::Text { .. } | Inline::Break => {}
        }
    }
}

// ============================================================================
// XML helpers
// ============================================================================

/// Attribute value by local name, ignoring the namespace prefix.
pub(crate) fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| unescape_xml(&String::from_utf8_lossy(&a.value)))
}

/// Resolve the predefined XML entities and numeric character references.
/// Unknown references are kept verbatim.
pub(crate) fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            out.push_str(&rest[start..]);
            return out;
        };
        match resolve_entity(&after[..end]) {
            Some(c) => out.push(c),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Element toggles like `<w:b/>` are on unless `w:val` turns them off.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr_value(e, b"val").as_deref(), Some("false" | "0" | "off" | "none"))
}

// ============================================================================
// Body parsing
// ============================================================================

type XmlReader<'a> = Reader<&'a [u8]>;

fn xml_error(e: quick_xml::Error) -> FormatError {
    FormatError::Conversion(format!("Malformed document XML: {}", e))
}

fn unexpected_eof() -> FormatError {
    FormatError::Conversion("Document XML ended unexpectedly".to_string())
}

fn skip(reader: &mut XmlReader<'_>, e: &BytesStart<'_>) -> Result<(), FormatError> {
    reader.read_to_end(e.name()).map_err(xml_error)?;
    Ok(())
}

pub(crate) fn parse_document(xml: &str) -> Result<Vec<Block>, FormatError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => return parse_blocks(&mut reader, b"body"),
            Event::Empty(e) if e.local_name().as_ref() == b"body" => return Ok(Vec::new()),
            Event::Eof => return Err(FormatError::Conversion("Document has no body".to_string())),
            _ => {}
        }
    }
}

/// Block content up to the closing `end` element (body, table cell, sdt).
fn parse_blocks(reader: &mut XmlReader<'_>, end: &[u8]) -> Result<Vec<Block>, FormatError> {
    let mut blocks = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(parse_paragraph(reader)?)),
                b"tbl" => blocks.push(Block::Table(parse_table(reader)?)),
                b"sectPr" | b"tcPr" | b"sdtPr" | b"sdtEndPr" | b"del" | b"moveFrom" | b"Fallback" => {
                    skip(reader, &e)?
                }
                // sdt, sdtContent, ins, customXml: descend
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == end => return Ok(blocks),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn parse_table(reader: &mut XmlReader<'_>) -> Result<Vec<Vec<Vec<Block>>>, FormatError> {
    let mut rows: Vec<Vec<Vec<Block>>> = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => rows.push(Vec::new()),
                b"tc" => {
                    let cell = parse_blocks(reader, b"tc")?;
                    if let Some(row) = rows.last_mut() {
                        row.push(cell);
                    }
                }
                b"tblPr" | b"tblGrid" | b"trPr" | b"tblPrEx" | b"sdtPr" => skip(reader, &e)?,
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"tbl" => return Ok(rows),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn parse_paragraph(reader: &mut XmlReader<'_>) -> Result<Paragraph, FormatError> {
    let mut paragraph = Paragraph::default();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"pPr" => {
                parse_paragraph_properties(reader, &mut paragraph)?
            }
            Event::Start(e) => parse_inline_start(reader, &e, &mut paragraph.inlines)?,
            Event::End(e) if e.local_name().as_ref() == b"p" => return Ok(paragraph),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Inline content up to the closing `end` element.
fn parse_inlines(reader: &mut XmlReader<'_>, end: &[u8]) -> Result<Vec<Inline>, FormatError> {
    let mut inlines = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => parse_inline_start(reader, &e, &mut inlines)?,
            Event::End(e) if e.local_name().as_ref() == end => return Ok(inlines),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn parse_inline_start(
    reader: &mut XmlReader<'_>,
    e: &BytesStart<'_>,
    out: &mut Vec<Inline>,
) -> Result<(), FormatError> {
    match e.local_name().as_ref() {
        b"r" => parse_run(reader, out),
        b"hyperlink" => {
            let rel_id = attr_value(e, b"id");
            let anchor = attr_value(e, b"anchor");
            let children = parse_inlines(reader, b"hyperlink")?;
            out.push(Inline::Link { rel_id, anchor, children });
            Ok(())
        }
        b"del" | b"moveFrom" | b"Fallback" | b"sdtPr" | b"sdtEndPr" => skip(reader, e),
        // ins, smartTag, sdt, sdtContent, fldSimple: descend
        _ => Ok(()),
    }
}

fn parse_paragraph_properties(reader: &mut XmlReader<'_>, paragraph: &mut Paragraph) -> Result<(), FormatError> {
    let mut num_id: Option<String> = None;
    let mut level: usize = 0;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if matches!(e.local_name().as_ref(), b"pPrChange" | b"sectPr" | b"rPr") => {
                skip(reader, &e)?
            }
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" => paragraph.style_id = attr_value(&e, b"val"),
                b"numId" => num_id = attr_value(&e, b"val"),
                b"ilvl" => level = attr_value(&e, b"val").map_or(0, |v| list_level(&v)),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"pPr" => break,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }

    // numId 0 removes numbering inherited from the style
    paragraph.numbering = num_id.map(|num_id| NumberingRef { num_id, level });
    Ok(())
}

/// Deepest list level WordprocessingML defines (`ilvl` 0..=8)
pub(crate) const MAX_LIST_LEVEL: usize = 8;

/// Parse an `ilvl` value, clamped to the levels a numbering definition
/// can describe. Unparseable values mean level 0.
pub(crate) fn list_level(value: &str) -> usize {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    // All digits: a parse failure can only be overflow
    value.parse::<usize>().map_or(MAX_LIST_LEVEL, |level| level.min(MAX_LIST_LEVEL))
}

fn parse_run(reader: &mut XmlReader<'_>, out: &mut Vec<Inline>) -> Result<(), FormatError> {
    let mut format = RunFormat::default();
    let mut text = String::new();

    let flush = |text: &mut String, format: RunFormat, out: &mut Vec<Inline>| {
        if !text.is_empty() {
            out.push(Inline::Text {
                text: std::mem::take(text),
                format,
            });
        }
    };

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPr" => format = parse_run_properties(reader)?,
                b"t" => read_text(reader, &mut text, b"t")?,
                b"drawing" => {
                    flush(&mut text, format, out);
                    if let Some(image) = parse_drawing(reader)? {
                        out.push(image);
                    }
                }
                b"pict" | b"object" => {
                    flush(&mut text, format, out);
                    let end = e.local_name().as_ref().to_vec();
                    if let Some(image) = parse_picture(reader, &end)? {
                        out.push(image);
                    }
                }
                b"instrText" | b"delText" | b"Fallback" => skip(reader, &e)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" => {
                    // Page and column breaks have no inline equivalent
                    let kind = attr_value(&e, b"type");
                    if matches!(kind.as_deref(), None | Some("textWrapping")) {
                        flush(&mut text, format, out);
                        out.push(Inline::Break);
                    }
                }
                b"cr" => {
                    flush(&mut text, format, out);
                    out.push(Inline::Break);
                }
                b"noBreakHyphen" => text.push('-'),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"r" => {
                flush(&mut text, format, out);
                return Ok(());
            }
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn read_text(reader: &mut XmlReader<'_>, text: &mut String, end: &[u8]) -> Result<(), FormatError> {
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Text(t) => text.push_str(&unescape_xml(&String::from_utf8_lossy(t.as_ref()))),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::GeneralRef(r) => {
                let name = String::from_utf8_lossy(&r).to_string();
                match resolve_entity(&name) {
                    Some(c) => text.push(c),
                    None => {
                        text.push('&');
                        text.push_str(&name);
                        text.push(';');
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == end => return Ok(()),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn parse_run_properties(reader: &mut XmlReader<'_>) -> Result<RunFormat, FormatError> {
    let mut format = RunFormat::default();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"rPrChange" => skip(reader, &e)?,
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"b" => format.bold = toggle_on(&e),
                b"i" => format.italic = toggle_on(&e),
                b"strike" | b"dstrike" => format.strike |= toggle_on(&e),
                b"vertAlign" => {
                    format.vertical = match attr_value(&e, b"val").as_deref() {
                        Some("superscript") => VerticalAlign::Superscript,
                        Some("subscript") => VerticalAlign::Subscript,
                        _ => VerticalAlign::Baseline,
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"rPr" => return Ok(format),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// DrawingML picture: `docPr` carries the description, `blip` the image
/// relationship.
fn parse_drawing(reader: &mut XmlReader<'_>) -> Result<Option<Inline>, FormatError> {
    let mut alt: Option<String> = None;
    let mut rel_id: Option<String> = None;
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"docPr" => {
                    alt = attr_value(&e, b"descr")
                        .filter(|s| !s.trim().is_empty())
                        .or_else(|| attr_value(&e, b"title").filter(|s| !s.trim().is_empty()));
                }
                b"blip" if rel_id.is_none() => rel_id = attr_value(&e, b"embed"),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"drawing" => break,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
    Ok(rel_id.map(|rel_id| Inline::Image { rel_id, alt }))
}

/// Legacy VML picture: `imagedata` carries the relationship and title.
fn parse_picture(reader: &mut XmlReader<'_>, end: &[u8]) -> Result<Option<Inline>, FormatError> {
    let mut image: Option<Inline> = None;
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"imagedata" && image.is_none() => {
                if let Some(rel_id) = attr_value(&e, b"id") {
                    let alt = attr_value(&e, b"title").filter(|s| !s.trim().is_empty());
                    image = Some(Inline::Image { rel_id, alt });
                }
            }
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W_NS: &str = "xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
                        xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
                        xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\" \
                        xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\"";

    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    fn package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn document(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document {}><w:body>{}<w:sectPr/></w:body></w:document>",
            W_NS, body
        )
    }

    fn docx(body: &str) -> Vec<u8> {
        let doc = document(body);
        package(&[("_rels/.rels", PACKAGE_RELS.as_bytes()), ("word/document.xml", doc.as_bytes())])
    }

    fn docx_with(body: &str, extra: &[(&str, &[u8])]) -> Vec<u8> {
        let doc = document(body);
        let mut parts: Vec<(&str, &[u8])> = vec![("_rels/.rels", PACKAGE_RELS.as_bytes()), ("word/document.xml", doc.as_bytes())];
        parts.extend_from_slice(extra);
        package(&parts)
    }

    fn html(body: &str) -> String {
        convert_to_html(&docx(body)).unwrap().html
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(
            html("<w:p><w:r><w:t>Hello</w:t></w:r></w:p><w:p><w:r><w:t>World</w:t></w:r></w:p>"),
            "<p>Hello</p><p>World</p>"
        );
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        assert_eq!(html("<w:p/><w:p><w:pPr/></w:p><w:p><w:r><w:t>x</w:t></w:r></w:p>"), "<p>x</p>");
    }

    #[test]
    fn test_run_formatting_and_merge() {
        let out = html(
            "<w:p>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Bo</w:t></w:r>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>ld</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\"> and </w:t></w:r>\
             <w:r><w:rPr><w:i/></w:rPr><w:t>it</w:t></w:r>\
             <w:r><w:rPr><w:b w:val=\"false\"/><w:strike/></w:rPr><w:t>gone</w:t></w:r>\
             <w:r><w:rPr><w:vertAlign w:val=\"superscript\"/></w:rPr><w:t>2</w:t></w:r>\
             </w:p>",
        );
        assert_eq!(out, "<p><strong>Bold</strong> and <em>it</em><s>gone</s><sup>2</sup></p>");
    }

    #[test]
    fn test_text_entities_and_escaping() {
        assert_eq!(
            html("<w:p><w:r><w:t>a &lt;b&gt; &amp; &#169;</w:t></w:r></w:p>"),
            "<p>a &lt;b&gt; &amp; \u{a9}</p>"
        );
    }

    #[test]
    fn test_breaks_and_tabs() {
        let out = html(
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t><w:br w:type=\"page\"/><w:t>d</w:t></w:r></w:p>",
        );
        assert_eq!(out, "<p>a\tb<br />cd</p>");
    }

    #[test]
    fn test_deleted_text_and_field_codes_dropped() {
        let out = html(
            "<w:p>\
             <w:del><w:r><w:delText>old</w:delText></w:r></w:del>\
             <w:ins><w:r><w:t>new</w:t></w:r></w:ins>\
             <w:r><w:instrText> PAGE </w:instrText></w:r>\
             </w:p>",
        );
        assert_eq!(out, "<p>new</p>");
    }

    #[test]
    fn test_headings_by_style() {
        let styles = format!(
            "<w:styles {}><w:style w:type=\"paragraph\" w:styleId=\"Titre1\"><w:name w:val=\"heading 1\"/></w:style></w:styles>",
            W_NS
        );
        let bytes = docx_with(
            "<w:p><w:pPr><w:pStyle w:val=\"Titre1\"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>\
             <w:p><w:pPr><w:pStyle w:val=\"Heading3\"/></w:pPr><w:r><w:t>Deep</w:t></w:r></w:p>",
            &[("word/styles.xml", styles.as_bytes())],
        );
        let conversion = convert_to_html(&bytes).unwrap();
        assert_eq!(conversion.html, "<h1>Intro</h1><h3>Deep</h3>");
        assert!(conversion.messages.is_empty());
    }

    #[test]
    fn test_unrecognised_style_reported_once() {
        let out = convert_to_html(&docx(
            "<w:p><w:pPr><w:pStyle w:val=\"Fancy\"/></w:pPr><w:r><w:t>a</w:t></w:r></w:p>\
             <w:p><w:pPr><w:pStyle w:val=\"Fancy\"/></w:pPr><w:r><w:t>b</w:t></w:r></w:p>",
        ))
        .unwrap();
        assert_eq!(out.html, "<p>a</p><p>b</p>");
        assert_eq!(out.messages.len(), 1);
        assert!(out.messages[0].contains("Fancy"));
    }

    #[test]
    fn test_nested_lists() {
        let numbering = format!(
            "<w:numbering {}>\
             <w:abstractNum w:abstractNumId=\"0\">\
             <w:lvl w:ilvl=\"0\"><w:numFmt w:val=\"bullet\"/></w:lvl>\
             <w:lvl w:ilvl=\"1\"><w:numFmt w:val=\"decimal\"/></w:lvl>\
             </w:abstractNum>\
             <w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num>\
             </w:numbering>",
            W_NS
        );
        let item = |level: u8, text: &str| {
            format!(
                "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>",
                level, text
            )
        };
        let body = format!(
            "{}{}{}{}<w:p><w:r><w:t>after</w:t></w:r></w:p>",
            item(0, "A"),
            item(1, "A1"),
            item(1, "A2"),
            item(0, "B")
        );
        let bytes = docx_with(&body, &[("word/numbering.xml", numbering.as_bytes())]);
        assert_eq!(
            convert_to_html(&bytes).unwrap().html,
            "<ul><li>A<ol><li>A1</li><li>A2</li></ol></li><li>B</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_out_of_range_list_level_is_clamped() {
        let body = "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"18446744073709551615\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr>\
                    <w:r><w:t>deep</w:t></w:r></w:p>\
                    <w:p><w:pPr><w:numPr><w:ilvl w:val=\"99999999999999999999999\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr>\
                    <w:r><w:t>deeper</w:t></w:r></w:p>";
        let html = convert_to_html(&docx(body)).unwrap().html;

        assert_eq!(html.matches("<ul>").count(), MAX_LIST_LEVEL + 1);
        assert_eq!(html.matches("</ul>").count(), MAX_LIST_LEVEL + 1);
        assert!(html.contains("<li>deep</li><li>deeper</li>"));
    }

    #[test]
    fn test_list_level() {
        assert_eq!(list_level("0"), 0);
        assert_eq!(list_level(" 3 "), 3);
        assert_eq!(list_level("100000000"), MAX_LIST_LEVEL);
        assert_eq!(list_level("18446744073709551616"), MAX_LIST_LEVEL);
        assert_eq!(list_level("-1"), 0);
        assert_eq!(list_level(""), 0);
    }

    #[test]
    fn test_hyperlinks() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;
        let bytes = docx_with(
            "<w:p><w:hyperlink r:id=\"rId5\"><w:r><w:t>site</w:t></w:r></w:hyperlink>\
             <w:r><w:t xml:space=\"preserve\"> </w:t></w:r>\
             <w:hyperlink w:anchor=\"intro\"><w:r><w:t>top</w:t></w:r></w:hyperlink></w:p>",
            &[("word/_rels/document.xml.rels", rels.as_bytes())],
        );
        assert_eq!(
            convert_to_html(&bytes).unwrap().html,
            "<p><a href=\"https://example.com/?a=1&amp;b=2\">site</a> <a href=\"#intro\">top</a></p>"
        );
    }

    #[test]
    fn test_tables() {
        let out = html(
            "<w:tbl><w:tblPr/><w:tblGrid><w:gridCol/></w:tblGrid>\
             <w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        assert_eq!(out, "<table><tr><td><p>a</p></td><td><p>b</p></td></tr></table>");
    }

    #[test]
    fn test_embedded_image() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;
        let body = "<w:p><w:r><w:drawing><wp:inline><wp:docPr id=\"1\" name=\"Picture 1\" descr=\"A chart\"/>\
                    <a:graphic><a:graphicData><a:blip r:embed=\"rId9\"/></a:graphicData></a:graphic>\
                    </wp:inline></w:drawing></w:r></w:p>";
        let bytes = docx_with(
            body,
            &[
                ("word/_rels/document.xml.rels", rels.as_bytes()),
                ("word/media/image1.png", b"png"),
            ],
        );
        assert_eq!(
            convert_to_html(&bytes).unwrap().html,
            "<p><img alt=\"A chart\" src=\"data:image/png;base64,cG5n\" /></p>"
        );
    }

    #[test]
    fn test_missing_image_reported() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/gone.png"/>
</Relationships>"#;
        let body = "<w:p><w:r><w:t>x</w:t><w:drawing><a:blip r:embed=\"rId9\"/></w:drawing></w:r></w:p>";
        let bytes = docx_with(body, &[("word/_rels/document.xml.rels", rels.as_bytes())]);
        let out = convert_to_html(&bytes).unwrap();
        assert_eq!(out.html, "<p>x</p>");
        assert!(out.messages.iter().any(|m| m.contains("word/media/gone.png")));
    }

    #[test]
    fn test_main_part_from_package_rels() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/content/main.xml"/>
</Relationships>"#;
        let doc = document("<w:p><w:r><w:t>moved</w:t></w:r></w:p>");
        let bytes = package(&[("_rels/.rels", rels.as_bytes()), ("content/main.xml", doc.as_bytes())]);
        assert_eq!(convert_to_html(&bytes).unwrap().html, "<p>moved</p>");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            convert_to_html(b"plain text"),
            Err(FormatError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_zip_without_document() {
        let bytes = package(&[("hello.txt", b"hi")]);
        assert!(matches!(convert_to_html(&bytes), Err(FormatError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_malformed_xml() {
        let bytes = package(&[("word/document.xml", b"<w:document><w:body><w:p></w:body>")]);
        assert!(matches!(convert_to_html(&bytes), Err(FormatError::Conversion(_))));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word", "media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("word", "../customXml/item.xml"), "customXml/item.xml");
        assert_eq!(resolve_target("word", "/word/styles.xml"), "word/styles.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }

    #[test]
    fn test_unescape_xml() {
        assert_eq!(unescape_xml("a&amp;b&#x41;&#66;&unknown;"), "a&bAB&unknown;");
        assert_eq!(unescape_xml("dangling &amp"), "dangling &amp");
    }
}
