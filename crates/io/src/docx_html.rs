// HTML emission for the parsed document model

use std::collections::{HashMap, HashSet};

use crate::docx::{Block, Inline, Paragraph, Relationship, RunFormat, VerticalAlign, MAX_LIST_LEVEL};
use crate::docx_styles::{Numbering, StyleMap};
use crate::html::{escape_attr, escape_text};

/// Paragraph styles that map to a plain `<p>` without a warning.
const PLAIN_STYLES: &[&str] = &["normal", "body text", "list paragraph", "no spacing", "default paragraph font"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

pub(crate) struct HtmlWriter<'a> {
    styles: &'a StyleMap,
    numbering: &'a Numbering,
    relationships: &'a HashMap<String, Relationship>,
    /// relationship id -> image src
    images: &'a HashMap<String, String>,
    out: String,
    messages: Vec<String>,
    reported_styles: HashSet<String>,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(
        styles: &'a StyleMap,
        numbering: &'a Numbering,
        relationships: &'a HashMap<String, Relationship>,
        images: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            styles,
            numbering,
            relationships,
            images,
            out: String::new(),
            messages: Vec::new(),
            reported_styles: HashSet::new(),
        }
    }

    pub fn finish(self) -> (String, Vec<String>) {
        (self.out, self.messages)
    }

    /// Write a run of blocks. Consecutive numbered paragraphs become one
    /// (possibly nested) list; any other block closes open lists.
    pub fn write_blocks(&mut self, blocks: &[Block]) {
        let mut lists: Vec<ListKind> = Vec::new();

        for block in blocks {
            match block {
                Block::Paragraph(paragraph) => match self.list_position(paragraph) {
                    Some((level, kind)) => {
                        self.open_list_item(&mut lists, level, kind);
                        let content = self.render_inlines(&paragraph.inlines);
                        self.out.push_str(&content);
                    }
                    None => {
                        self.close_lists(&mut lists);
                        self.write_paragraph(paragraph);
                    }
                },
                Block::Table(rows) => {
                    self.close_lists(&mut lists);
                    self.write_table(rows);
                }
            }
        }

        self.close_lists(&mut lists);
    }

    fn list_position(&self, paragraph: &Paragraph) -> Option<(usize, ListKind)> {
        let numbering = paragraph.numbering.as_ref().or_else(|| {
            paragraph
                .style_id
                .as_deref()
                .and_then(|id| self.styles.numbering(id))
        })?;
        if numbering.num_id == "0" {
            return None;
        }
        let kind = if self.numbering.is_ordered(&numbering.num_id, numbering.level) {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };
        Some((numbering.level, kind))
    }

    fn open_list_item(&mut self, lists: &mut Vec<ListKind>, level: usize, kind: ListKind) {
        let depth = level.min(MAX_LIST_LEVEL) + 1;

        while lists.len() > depth {
            if let Some(closed) = lists.pop() {
                self.out.push_str("</li></");
                self.out.push_str(closed.tag());
                self.out.push('>');
            }
        }

        if lists.len() == depth {
            if lists[depth - 1] == kind {
                self.out.push_str("</li>");
            } else if let Some(closed) = lists.pop() {
                self.out.push_str("</li></");
                self.out.push_str(closed.tag());
                self.out.push('>');
            }
        }

        // Skipped levels get an empty item to hang the nested list on
        while lists.len() < depth {
            self.out.push('<');
            self.out.push_str(kind.tag());
            self.out.push('>');
            lists.push(kind);
            if lists.len() < depth {
                self.out.push_str("<li>");
            }
        }

        self.out.push_str("<li>");
    }

    fn close_lists(&mut self, lists: &mut Vec<ListKind>) {
        while let Some(closed) = lists.pop() {
            self.out.push_str("</li></");
            self.out.push_str(closed.tag());
            self.out.push('>');
        }
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph) {
        let content = self.render_inlines(&paragraph.inlines);
        if content.is_empty() {
            return;
        }
        let tag = self.paragraph_tag(paragraph);
        self.out.push('<');
        self.out.push_str(&tag);
        self.out.push('>');
        self.out.push_str(&content);
        self.out.push_str("</");
        self.out.push_str(&tag);
        self.out.push('>');
    }

    fn paragraph_tag(&mut self, paragraph: &Paragraph) -> String {
        let Some(style_id) = paragraph.style_id.as_deref() else {
            return "p".to_string();
        };
        let name = self.styles.name(style_id);

        if let Some(level) = name.and_then(heading_level_from_name).or_else(|| heading_level_from_id(style_id)) {
            return format!("h{}", level);
        }

        let known = name
            .map(|n| PLAIN_STYLES.contains(&n.to_ascii_lowercase().as_str()))
            .unwrap_or_else(|| style_id.eq_ignore_ascii_case("normal"));
        if !known && self.reported_styles.insert(style_id.to_string()) {
            self.messages.push(format!(
                "Unrecognised paragraph style: '{}' (Style ID: {})",
                name.unwrap_or(style_id),
                style_id
            ));
        }
        "p".to_string()
    }

    fn write_table(&mut self, rows: &[Vec<Vec<Block>>]) {
        self.out.push_str("<table>");
        for row in rows {
            self.out.push_str("<tr>");
            for cell in row {
                self.out.push_str("<td>");
                self.write_blocks(cell);
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>");
        }
        self.out.push_str("</table>");
    }

    /// Render inline content, merging adjacent text with equal formatting
    /// so split runs do not produce `<strong>a</strong><strong>b</strong>`.
    fn render_inlines(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        let mut pending: Option<(RunFormat, String)> = None;

        for inline in inlines {
            if let Inline::Text { text, format } = inline {
                match pending.as_mut() {
                    Some((current, buf)) if current == format => buf.push_str(text),
                    _ => {
                        if let Some((fmt, buf)) = pending.take() {
                            out.push_str(&formatted(fmt, &buf));
                        }
                        pending = Some((*format, text.clone()));
                    }
                }
                continue;
            }

            if let Some((fmt, buf)) = pending.take() {
                out.push_str(&formatted(fmt, &buf));
            }
            match inline {
                Inline::Break => out.push_str("<br />"),
                Inline::Link { rel_id, anchor, children } => {
                    let content = self.render_inlines(children);
                    match self.link_href(rel_id.as_deref(), anchor.as_deref()) {
                        Some(href) => {
                            out.push_str("<a href=\"");
                            out.push_str(&escape_attr(&href));
                            out.push_str("\">");
                            out.push_str(&content);
                            out.push_str("</a>");
                        }
                        None => out.push_str(&content),
                    }
                }
                Inline::Image { rel_id, alt } => {
                    // Unresolvable images were reported when the package was read
                    if let Some(src) = self.images.get(rel_id) {
                        out.push_str("<img ");
                        if let Some(alt) = alt {
                            out.push_str("alt=\"");
                            out.push_str(&escape_attr(alt));
                            out.push_str("\" ");
                        }
                        out.push_str("src=\"");
                        out.push_str(&escape_attr(src));
                        out.push_str("\" />");
                    }
                }
                Inline::Text { .. } => {}
            }
        }

        if let Some((fmt, buf)) = pending {
            out.push_str(&formatted(fmt, &buf));
        }
        out
    }

    fn link_href(&self, rel_id: Option<&str>, anchor: Option<&str>) -> Option<String> {
        let target = rel_id.and_then(|id| self.relationships.get(id)).map(|rel| rel.target.as_str());
        match (target, anchor) {
            (Some(target), Some(anchor)) => Some(format!("{}#{}", target, anchor)),
            (Some(target), None) => Some(target.to_string()),
            (None, Some(anchor)) => Some(format!("#{}", anchor)),
            (None, None) => None,
        }
    }
}

fn formatted(format: RunFormat, text: &str) -> String {
    let mut html = escape_text(text);
    match format.vertical {
        VerticalAlign::Superscript => html = format!("<sup>{}</sup>", html),
        VerticalAlign::Subscript => html = format!("<sub>{}</sub>", html),
        VerticalAlign::Baseline => {}
    }
    if format.strike {
        html = format!("<s>{}</s>", html);
    }
    if format.italic {
        html = format!("<em>{}</em>", html);
    }
    if format.bold {
        html = format!("<strong>{}</strong>", html);
    }
    html
}

/// "heading 2" -> 2
fn heading_level_from_name(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    let level = lower.strip_prefix("heading")?.trim();
    parse_heading_level(level)
}

/// "Heading2" -> 2
fn heading_level_from_id(style_id: &str) -> Option<u8> {
    let lower = style_id.to_ascii_lowercase();
    parse_heading_level(lower.strip_prefix("heading")?)
}

fn parse_heading_level(s: &str) -> Option<u8> {
    s.parse::<u8>().ok().filter(|level| (1..=6).contains(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str, format: RunFormat) -> Inline {
        Inline::Text { text: s.to_string(), format }
    }

    fn render(blocks: &[Block]) -> (String, Vec<String>) {
        let styles = StyleMap::default();
        let numbering = Numbering::default();
        let relationships = HashMap::new();
        let images = HashMap::new();
        let mut writer = HtmlWriter::new(&styles, &numbering, &relationships, &images);
        writer.write_blocks(blocks);
        writer.finish()
    }

    fn para(inlines: Vec<Inline>) -> Block {
        Block::Paragraph(Paragraph {
            inlines,
            ..Paragraph::default()
        })
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level_from_name("heading 1"), Some(1));
        assert_eq!(heading_level_from_name("Heading 6"), Some(6));
        assert_eq!(heading_level_from_name("heading 7"), None);
        assert_eq!(heading_level_from_name("Header"), None);
        assert_eq!(heading_level_from_id("Heading4"), Some(4));
        assert_eq!(heading_level_from_id("HeadingX"), None);
    }

    #[test]
    fn test_nested_formatting_order() {
        let format = RunFormat {
            bold: true,
            italic: true,
            ..RunFormat::default()
        };
        assert_eq!(formatted(format, "x"), "<strong><em>x</em></strong>");
    }

    #[test]
    fn test_different_formats_not_merged() {
        let bold = RunFormat {
            bold: true,
            ..RunFormat::default()
        };
        let (html, _) = render(&[para(vec![
            text("a", bold),
            text("b", RunFormat::default()),
            text("c", bold),
        ])]);
        assert_eq!(html, "<p><strong>a</strong>b<strong>c</strong></p>");
    }

    #[test]
    fn test_link_without_target_keeps_text() {
        let (html, _) = render(&[para(vec![Inline::Link {
            rel_id: Some("rId404".into()),
            anchor: None,
            children: vec![text("plain", RunFormat::default())],
        }])]);
        assert_eq!(html, "<p>plain</p>");
    }

    #[test]
    fn test_unresolved_image_emits_nothing() {
        let (html, _) = render(&[para(vec![Inline::Image {
            rel_id: "rId1".into(),
            alt: None,
        }])]);
        assert_eq!(html, "");
    }

    #[test]
    fn test_list_skipping_levels_stays_well_formed() {
        let item = Block::Paragraph(Paragraph {
            numbering: Some(crate::docx_styles::NumberingRef {
                num_id: "3".into(),
                level: 2,
            }),
            inlines: vec![text("deep", RunFormat::default())],
            ..Paragraph::default()
        });
        let (html, _) = render(&[item]);
        assert_eq!(html, "<ul><li><ul><li><ul><li>deep</li></ul></li></ul></li></ul>");
    }

    #[test]
    fn test_table_closes_open_list() {
        let item = Block::Paragraph(Paragraph {
            numbering: Some(crate::docx_styles::NumberingRef {
                num_id: "1".into(),
                level: 0,
            }),
            inlines: vec![text("one", RunFormat::default())],
            ..Paragraph::default()
        });
        let table = Block::Table(vec![vec![vec![para(vec![text("cell", RunFormat::default())])]]]);
        let (html, _) = render(&[item, table]);
        assert_eq!(html, "<ul><li>one</li></ul><table><tr><td><p>cell</p></td></tr></table>");
    }
}
