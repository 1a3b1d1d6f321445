//! Streaming USFM reader producing one VerseRecord per `\v` marker.
//!
//! Only `\id`, `\c` and `\v` are interpreted. Lines starting with any other
//! marker are skipped, plain text lines are collected into the open verse.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::encoding::read_text_file;
use crate::error::{ConvertError, Result};
use crate::logger::{debug, warn};
use crate::types::VerseRecord;

lazy_static! {
    static ref RE_MARKER: Regex = Regex::new(r"^\\(\w+)\s*(.*)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    NoBook,
    HaveBook,
    HaveChapter,
    InVerse,
}

/// The verse being collected, with the reference it was opened under.
#[derive(Debug)]
struct OpenVerse {
    book: String,
    chapter: u32,
    verse: u32,
    lines: Vec<String>,
}

#[derive(Debug)]
pub struct UsfmParser {
    state: ParserState,
    book: Option<String>,
    chapter: Option<u32>,
    verse: Option<u32>,
    open: Option<OpenVerse>,
    records: Vec<VerseRecord>,
    line_no: usize,
}

impl Default for UsfmParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UsfmParser {
    pub fn new() -> Self {
        UsfmParser {
            state: ParserState::NoBook,
            book: None,
            chapter: None,
            verse: None,
            open: None,
            records: Vec::new(),
            line_no: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    fn parse_number(&self, marker: &str, value: &str) -> Result<u32> {
        match value.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConvertError::MalformedMarker {
                marker: marker.to_string(),
                line: self.line_no,
                value: value.to_string(),
            }),
        }
    }

    fn flush(&mut self) {
        if let Some(v) = self.open.take() {
            self.records.push(VerseRecord {
                book: v.book,
                chapter: v.chapter,
                verse: v.verse,
                text: v.lines.join(" "),
            });
        }
    }

    /// Opens the pending verse once book, chapter and verse number are all
    /// known. The reference is fixed at that point, later `\c` or `\id`
    /// markers only apply to the verses that follow.
    fn try_open_verse(&mut self) {
        if self.open.is_some() {
            return;
        }
        if let (Some(book), Some(chapter), Some(verse)) = (&self.book, self.chapter, self.verse) {
            self.open = Some(OpenVerse {
                book: book.clone(),
                chapter,
                verse,
                lines: Vec::new(),
            });
            self.state = ParserState::InVerse;
        }
    }

    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let Some(caps) = RE_MARKER.captures(line) else {
            match self.open {
                Some(ref mut v) => v.lines.push(line.to_string()),
                None => debug(&format!("line {}: text outside of a verse dropped", self.line_no)),
            }
            return Ok(());
        };

        let marker = caps.get(1).map_or("", |m| m.as_str());
        let content = caps.get(2).map_or("", |m| m.as_str());

        match marker {
            "id" => {
                let Some(book) = content.split_whitespace().next() else {
                    warn(&format!("line {}: \\id marker without a book code", self.line_no));
                    return Ok(());
                };
                self.book = Some(book.to_string());
                if self.open.is_none() {
                    self.state = ParserState::HaveBook;
                }
                self.try_open_verse();
            }
            "c" => {
                // Chapters are meaningless before a book is declared.
                if self.book.is_none() {
                    return Ok(());
                }
                self.chapter = Some(self.parse_number(marker, content)?);
                if self.open.is_none() {
                    self.state = ParserState::HaveChapter;
                }
                self.try_open_verse();
            }
            "v" => {
                let verse = self.parse_number(marker, content)?;
                self.flush();
                self.verse = Some(verse);
                self.try_open_verse();
            }
            _ => {}
        }

        Ok(())
    }

    pub fn finish(mut self) -> Vec<VerseRecord> {
        self.flush();
        self.records
    }
}

pub fn parse_usfm(content: &str) -> Result<Vec<VerseRecord>> {
    let mut parser = UsfmParser::new();
    for line in content.lines() {
        parser.feed_line(line)?;
    }
    Ok(parser.finish())
}

pub fn parse_usfm_file(path: &Path) -> Result<Vec<VerseRecord>> {
    crate::ensure_input_exists(path)?;
    let content = read_text_file(path)?;
    parse_usfm(&content)
}
