// Paragraph styles and list numbering from a word-processing package
//
// Only what the HTML mapping needs: style id -> display name, style-level
// numbering, and whether a numbering level is bulleted or ordered.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::docx::{attr_value, list_level};

/// Numbering reference: `numId` plus 0-based level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NumberingRef {
    pub num_id: String,
    pub level: usize,
}

/// Paragraph styles from `styles.xml`.
#[derive(Debug, Default)]
pub(crate) struct StyleMap {
    names: HashMap<String, String>,
    numbering: HashMap<String, NumberingRef>,
}

impl StyleMap {
    pub fn parse(xml: &str) -> Self {
        let mut map = StyleMap::default();
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        // Current paragraph style being read
        let mut current: Option<String> = None;
        let mut num_id: Option<String> = None;
        let mut level: usize = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"style" => {
                        let is_paragraph = attr_value(e, b"type").as_deref() == Some("paragraph");
                        current = if is_paragraph { attr_value(e, b"styleId") } else { None };
                        num_id = None;
                        level = 0;
                    }
                    b"name" => {
                        if let (Some(id), Some(name)) = (&current, attr_value(e, b"val")) {
                            map.names.insert(id.clone(), name);
                        }
                    }
                    b"numId" if current.is_some() => num_id = attr_value(e, b"val"),
                    b"ilvl" if current.is_some() => {
                        level = attr_value(e, b"val").map_or(0, |v| list_level(&v));
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => {
                    if let (Some(id), Some(num)) = (current.take(), num_id.take()) {
                        if num != "0" {
                            map.numbering.insert(id, NumberingRef { num_id: num, level });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("Malformed styles part: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        map
    }

    /// Display name of a paragraph style (e.g. "heading 1").
    pub fn name(&self, style_id: &str) -> Option<&str> {
        self.names.get(style_id).map(String::as_str)
    }

    /// Numbering a paragraph inherits from its style.
    pub fn numbering(&self, style_id: &str) -> Option<&NumberingRef> {
        self.numbering.get(style_id)
    }
}

/// List definitions from `numbering.xml`.
#[derive(Debug, Default)]
pub(crate) struct Numbering {
    /// numId -> abstractNumId
    instances: HashMap<String, String>,
    /// (abstractNumId, level) -> numFmt
    formats: HashMap<(String, usize), String>,
}

impl Numbering {
    pub fn parse(xml: &str) -> Self {
        let mut numbering = Numbering::default();
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        let mut abstract_id: Option<String> = None;
        let mut level: Option<usize> = None;
        let mut num_id: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"abstractNum" => {
                        abstract_id = attr_value(e, b"abstractNumId");
                        level = None;
                    }
                    b"lvl" => level = attr_value(e, b"ilvl").and_then(|v| v.parse().ok()),
                    b"numFmt" => {
                        if let (Some(id), Some(lvl), Some(fmt)) = (&abstract_id, level, attr_value(e, b"val")) {
                            numbering.formats.insert((id.clone(), lvl), fmt);
                        }
                    }
                    b"num" => num_id = attr_value(e, b"numId"),
                    b"abstractNumId" => {
                        if let (Some(id), Some(target)) = (num_id.clone(), attr_value(e, b"val")) {
                            numbering.instances.insert(id, target);
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"abstractNum" => abstract_id = None,
                    b"lvl" => level = None,
                    b"num" => num_id = None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("Malformed numbering part: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        numbering
    }

    /// True when the level uses a counter format rather than a bullet.
    /// Unknown numbering renders as a bulleted list.
    pub fn is_ordered(&self, num_id: &str, level: usize) -> bool {
        self.instances
            .get(num_id)
            .and_then(|abstract_id| self.formats.get(&(abstract_id.clone(), level)))
            .is_some_and(|fmt| fmt != "bullet" && fmt != "none")
    }
}
