//! OSIS XML reader producing the same VerseRecords as the USFM reader.
//!
//! Handles both container verses:
//! - `<verse osisID="Gen.1.1">...</verse>`
//!
//! and milestone verses:
//! - `<verse sID="Gen.1.1" osisID="Gen.1.1"/>...<verse eID="Gen.1.1"/>`
//!
//! Text inside `<note>` elements is not part of the verse.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::encoding::read_text_file;
use crate::error::{ConvertError, Result};
use crate::types::VerseRecord;
use crate::usfm_parse::parse_usfm;

fn get_attribute(element: &BytesStart, attr_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == attr_name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Split an osisID such as `Gen.1.1` into book, chapter, verse. For a list of
/// ids (`Gen.1.1 Gen.1.2`) the first one is used.
pub fn parse_osis_id(osis_id: &str, line: usize) -> Result<(String, u32, u32)> {
    let malformed = |value: &str| ConvertError::MalformedMarker {
        marker: "verse".to_string(),
        line,
        value: value.to_string(),
    };

    let first = osis_id.split_whitespace().next().unwrap_or_default();
    // A work prefix may precede the reference: "Bible.HebWLC:Gen.1.1"
    let reference = first.rsplit(':').next().unwrap_or(first);

    let parts: Vec<&str> = reference.split('.').collect();
    if parts.len() != 3 || parts[0].is_empty() {
        return Err(malformed(osis_id));
    }

    let chapter = parts[1].parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| malformed(osis_id))?;
    let verse = parts[2].parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| malformed(osis_id))?;

    Ok((parts[0].to_string(), chapter, verse))
}

struct OpenVerse {
    book: String,
    chapter: u32,
    verse: u32,
    text: String,
}

fn flush(open: &mut Option<OpenVerse>, records: &mut Vec<VerseRecord>) {
    if let Some(v) = open.take() {
        let text = v.text.split_whitespace().collect::<Vec<&str>>().join(" ");
        records.push(VerseRecord {
            book: v.book,
            chapter: v.chapter,
            verse: v.verse,
            text,
        });
    }
}

fn line_at(content: &str, position: usize) -> usize {
    content.as_bytes()[..position.min(content.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count() + 1
}

fn open_verse(osis_id: &str, line: usize) -> Result<Option<OpenVerse>> {
    let (book, chapter, verse) = parse_osis_id(osis_id, line)?;
    Ok(Some(OpenVerse { book, chapter, verse, text: String::new() }))
}

pub fn parse_osis(content: &str) -> Result<Vec<VerseRecord>> {
    let mut reader = Reader::from_str(content);

    let mut records: Vec<VerseRecord> = Vec::new();
    let mut open: Option<OpenVerse> = None;
    let mut note_depth: usize = 0;

    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                match e.local_name().as_ref() {
                    b"verse" => {
                        if let Some(osis_id) = get_attribute(e, b"osisID") {
                            flush(&mut open, &mut records);
                            open = open_verse(&osis_id, line_at(content, position))?;
                        }
                    }
                    b"note" => note_depth += 1,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"verse" {
                    if let Some(start_id) = get_attribute(e, b"sID") {
                        flush(&mut open, &mut records);
                        let osis_id = get_attribute(e, b"osisID").unwrap_or(start_id);
                        open = open_verse(&osis_id, line_at(content, position))?;
                    } else if get_attribute(e, b"eID").is_some() {
                        flush(&mut open, &mut records);
                    } else if let Some(osis_id) = get_attribute(e, b"osisID") {
                        // <verse osisID="..."/> is an empty verse
                        flush(&mut open, &mut records);
                        open = open_verse(&osis_id, line_at(content, position))?;
                        flush(&mut open, &mut records);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                match e.local_name().as_ref() {
                    b"verse" => flush(&mut open, &mut records),
                    b"note" => note_depth = note_depth.saturating_sub(1),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if note_depth == 0 {
                    if let Some(ref mut v) = open {
                        let text = e.unescape()
                            .map_err(|err| ConvertError::Xml(format!("line {}: {}", line_at(content, position), err)))?;
                        v.text.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if note_depth == 0 {
                    if let Some(ref mut v) = open {
                        v.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                let line = line_at(content, reader.buffer_position());
                return Err(ConvertError::Xml(format!("line {}: {}", line, e)));
            }
            _ => {}
        }

        buf.clear();
    }

    flush(&mut open, &mut records);
    Ok(records)
}

/// Read a corpus file, choosing the parser by extension: .osis and .xml are
/// OSIS, everything else is USFM.
pub fn parse_verse_file(path: &Path) -> Result<Vec<VerseRecord>> {
    crate::ensure_input_exists(path)?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let content = read_text_file(path)?;
    match ext.as_str() {
        "osis" | "xml" => parse_osis(&content),
        _ => parse_usfm(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osis_id() {
        assert_eq!(parse_osis_id("Gen.1.1", 0).unwrap(), ("Gen".to_string(), 1, 1));
        assert_eq!(parse_osis_id("Ps.119.176 Ps.119.177", 0).unwrap(), ("Ps".to_string(), 119, 176));
        assert_eq!(parse_osis_id("Bible.HebWLC:Gen.2.4", 0).unwrap(), ("Gen".to_string(), 2, 4));
        assert!(parse_osis_id("Gen.1", 0).is_err());
        assert!(parse_osis_id("Gen.x.1", 0).is_err());
        assert!(parse_osis_id("Gen.1.0", 0).is_err());
    }

    #[test]
    fn test_container_verses() {
        let xml = r#"<osis><osisText><div type="book" osisID="Gen"><chapter osisID="Gen.1">
            <verse osisID="Gen.1.1"><w lemma="strong:H7225">בְּרֵאשִׁית</w> <w>בָּרָא</w></verse>
            <verse osisID="Gen.1.2">וְהָאָרֶץ<note>a note</note> הָיְתָה</verse>
        </chapter></div></osisText></osis>"#;
        let verses = parse_osis(xml).unwrap();
        assert_eq!(verses, vec![
            VerseRecord::new("Gen", 1, 1, "בְּרֵאשִׁית בָּרָא"),
            VerseRecord::new("Gen", 1, 2, "וְהָאָרֶץ הָיְתָה"),
        ]);
    }

    #[test]
    fn test_milestone_verses() {
        let xml = r#"<osis><chapter osisID="Ruth.1">
            <verse sID="Ruth.1.1" osisID="Ruth.1.1"/>In the days &amp; times<verse eID="Ruth.1.1"/>
            between
            <verse sID="Ruth.1.2" osisID="Ruth.1.2"/>And the name<verse eID="Ruth.1.2"/>
        </chapter></osis>"#;
        let verses = parse_osis(xml).unwrap();
        assert_eq!(verses, vec![
            VerseRecord::new("Ruth", 1, 1, "In the days & times"),
            VerseRecord::new("Ruth", 1, 2, "And the name"),
        ]);
    }

    #[test]
    fn test_malformed_osis_id() {
        let xml = r#"<osis><verse osisID="Gen.one.1">x</verse></osis>"#;
        assert!(matches!(parse_osis(xml), Err(ConvertError::MalformedMarker { .. })));
    }

    #[test]
    fn test_broken_xml() {
        let xml = r#"<osis><verse osisID="Gen.1.1">x</chapter></osis>"#;
        assert!(matches!(parse_osis(xml), Err(ConvertError::Xml(_))));
    }
}
