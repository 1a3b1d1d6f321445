use std::path::Path;

use lopdf::Document;
use regex::Regex;

use crate::error::{ConvertError, Result};
use crate::helpers::normalize;
use crate::logger::{info, warn};
use crate::settings::ConverterSettings;
use crate::types::{EntryIdGenerator, LexiconDefinition, LexiconEntry};

/// Hebrew block, U+0590 to U+05FF
pub const HEBREW_ALPHABET_CLASS: &str = r"\x{0590}-\x{05FF}";
/// Syriac block, U+0700 to U+074F
pub const SYRIAC_ALPHABET_CLASS: &str = r"\x{0700}-\x{074F}";

/// Below this many characters per page the text layer is probably missing.
const MIN_CHARS_PER_PAGE: usize = 20;

/// A headword and its definition as found in the text, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub lemma: String,
    pub definition: String,
}

impl RawEntry {
    pub fn new(lemma: &str, definition: &str) -> Self {
        RawEntry {
            lemma: lemma.to_string(),
            definition: definition.to_string(),
        }
    }
}

/// Recognizes entries in one line of extracted text. Each lexicon has its own
/// layout, so the rule is supplied by the caller.
pub trait EntryBoundary {
    fn detect(&self, line: &str) -> Vec<RawEntry>;
}

impl<F> EntryBoundary for F
where
    F: Fn(&str) -> Vec<RawEntry>,
{
    fn detect(&self, line: &str) -> Vec<RawEntry> {
        self(line)
    }
}

/// A line starting with a word in the lemma alphabet, then whitespace, then
/// the definition.
#[derive(Debug, Clone)]
pub struct LemmaLineBoundary {
    re: Regex,
}

impl LemmaLineBoundary {
    /// `class` is the inside of a regex character class, e.g. `\x{0590}-\x{05FF}`.
    pub fn with_alphabet(class: &str) -> std::result::Result<Self, regex::Error> {
        let re = Regex::new(&format!(r"^([{}]+)\s+(.+)$", class))?;
        Ok(LemmaLineBoundary { re })
    }
}

impl Default for LemmaLineBoundary {
    fn default() -> Self {
        LemmaLineBoundary::with_alphabet(HEBREW_ALPHABET_CLASS)
            .expect("Hebrew lemma pattern is valid")
    }
}

impl EntryBoundary for LemmaLineBoundary {
    fn detect(&self, line: &str) -> Vec<RawEntry> {
        match self.re.captures(line) {
            Some(caps) => vec![RawEntry::new(&caps[1], &caps[2])],
            None => Vec::new(),
        }
    }
}

pub fn lexicon_entry(id: String, raw: &RawEntry, settings: &ConverterSettings) -> LexiconEntry {
    LexiconEntry {
        id,
        lemma: normalize(&raw.lemma),
        language: settings.lexicon_language.clone(),
        pos: settings.lexicon_pos.clone(),
        definitions: vec![LexiconDefinition {
            gloss: raw.definition.trim().to_string(),
            source: settings.lexicon_source.clone(),
        }],
        etymology: String::new(),
        related_forms: Vec::new(),
        modern_equivalent: String::new(),
        notes: String::new(),
    }
}

/// True when a document has too little text for its page count, which
/// usually means scanned pages without a text layer.
pub fn looks_scanned(page_count: usize, char_count: usize) -> bool {
    page_count > 0 && char_count < page_count * MIN_CHARS_PER_PAGE
}

/// Scan extracted text line by line. Lines that the boundary rule doesn't
/// recognize produce nothing.
pub fn parse_lexicon_text(
    text: &str,
    boundary: &dyn EntryBoundary,
    settings: &ConverterSettings,
) -> Vec<LexiconEntry> {
    let mut ids = EntryIdGenerator::new(&settings.lexicon_id_prefix, settings.id_width);

    // Extracted PDF lines often carry indentation.
    text.lines()
        .map(str::trim)
        .flat_map(|line| boundary.detect(line))
        .map(|raw| lexicon_entry(ids.next_id(), &raw, settings))
        .collect()
}

/// Extract the text layer of a PDF.
pub fn extract_pdf_text(pdf_path: &Path) -> Result<String> {
    let text = pdf_extract::extract_text(pdf_path)
        .map_err(|e| ConvertError::PdfExtract(format!("{}: {}", pdf_path.display(), e)))?;

    // Page count only serves the scanned-document warning.
    let page_count = Document::load(pdf_path)
        .map(|doc| doc.get_pages().len())
        .unwrap_or(0);

    let char_count = text.chars().filter(|c| !c.is_whitespace()).count();
    info(&format!("Extracted {} characters from {} pages", char_count, page_count));

    if looks_scanned(page_count, char_count) {
        warn(&format!(
            "{} has {} pages but only {} characters of text. It may be a scanned document without a text layer.",
            pdf_path.display(), page_count, char_count
        ));
    }

    Ok(text)
}

pub fn parse_pdf_lexicon(
    pdf_path: &Path,
    boundary: &dyn EntryBoundary,
    settings: &ConverterSettings,
) -> Result<Vec<LexiconEntry>> {
    crate::ensure_input_exists(pdf_path)?;
    info(&format!("Extracting text from {}", pdf_path.display()));

    let text = extract_pdf_text(pdf_path)?;
    let entries = parse_lexicon_text(&text, boundary, settings);

    info(&format!("Parsed {} entries.", entries.len()));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hebrew_line_boundary() {
        let b = LemmaLineBoundary::default();
        assert_eq!(b.detect("אור light, daylight"), vec![RawEntry::new("אור", "light, daylight")]);
        // Headword with niqqud is still inside the block.
        assert_eq!(b.detect("אוֹר  light").len(), 1);
        assert!(b.detect("light אור").is_empty());
        assert!(b.detect("אור").is_empty());
        assert!(b.detect("").is_empty());
    }

    #[test]
    fn test_parse_lexicon_text() {
        let text = "Page 1\nאב father\n\nnot an entry\nאם mother\r\n";
        let settings = ConverterSettings::default();
        let entries = parse_lexicon_text(text, &LemmaLineBoundary::default(), &settings);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "LEX00001");
        assert_eq!(entries[0].lemma, "אב");
        assert_eq!(entries[0].definitions[0].gloss, "father");
        assert_eq!(entries[0].definitions[0].source, "PDF Lexicon");
        assert_eq!(entries[0].language, "Hebrew");
        assert_eq!(entries[0].pos, "unknown");
        assert_eq!(entries[1].id, "LEX00002");
        assert_eq!(entries[1].definitions[0].gloss, "mother");
    }

    #[test]
    fn test_closure_boundary_can_yield_several_entries() {
        // "lemma = gloss; lemma = gloss" on one line
        let rule = |line: &str| -> Vec<RawEntry> {
            line.split(';')
                .filter_map(|part| part.split_once('='))
                .map(|(l, d)| RawEntry::new(l.trim(), d.trim()))
                .collect()
        };
        let settings = ConverterSettings::default();
        let entries = parse_lexicon_text("a = one; b = two\nc = three", &rule, &settings);
        let lemmas: Vec<&str> = entries.iter().map(|e| e.lemma.as_str()).collect();
        assert_eq!(lemmas, vec!["a", "b", "c"]);
        assert_eq!(entries[2].id, "LEX00003");
    }

    #[test]
    fn test_syriac_alphabet() {
        let b = LemmaLineBoundary::with_alphabet(SYRIAC_ALPHABET_CLASS).unwrap();
        assert_eq!(b.detect("ܐܒܐ father").len(), 1);
        assert!(b.detect("אב father").is_empty());
    }

    #[test]
    fn test_empty_text_is_not_an_error() {
        let settings = ConverterSettings::default();
        assert!(parse_lexicon_text("", &LemmaLineBoundary::default(), &settings).is_empty());
    }

    #[test]
    fn test_looks_scanned() {
        assert!(looks_scanned(3, 10));
        assert!(!looks_scanned(3, 60));
        assert!(!looks_scanned(0, 0));
    }

    #[test]
    fn test_indented_lines() {
        let settings = ConverterSettings::default();
        let entries = parse_lexicon_text("   אב father  \n", &LemmaLineBoundary::default(), &settings);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].definitions[0].gloss, "father");
    }

    #[test]
    fn test_missing_pdf() {
        let settings = ConverterSettings::default();
        let res = parse_pdf_lexicon(Path::new("/no/such/lexicon.pdf"), &LemmaLineBoundary::default(), &settings);
        assert!(matches!(res, Err(ConvertError::InputNotFound(_))));
    }
}
