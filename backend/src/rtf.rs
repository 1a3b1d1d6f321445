//! RTF to plain text, for e-Sword v9-10 (.dctx) definitions.
//!
//! Only the text layer is kept: formatting control words are dropped, header
//! destinations (font and color tables, stylesheets, pictures) are skipped.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::helpers::compact_lines;

/// Destinations whose content is never text.
const SKIP_DESTINATIONS: &[&str] = &[
    "fonttbl", "colortbl", "stylesheet", "info", "pict", "object", "fldinst",
    "header", "headerl", "headerr", "headerf", "footer", "footerl", "footerr", "footerf",
    "listtable", "listoverridetable", "rsidtbl", "xmlnstbl", "generator",
    "themedata", "colorschememapping", "latentstyles", "datastore", "filetbl",
];

#[derive(Debug, Clone, Copy)]
struct GroupState {
    skip: bool,
    // Number of fallback characters following a \uN
    uc: usize,
}

struct RtfReader {
    chars: Vec<char>,
    pos: usize,
    out: String,
    // \'hh bytes waiting to be decoded together, for multi-byte code pages
    pending: Vec<u8>,
    encoding: &'static Encoding,
    state: GroupState,
    stack: Vec<GroupState>,
    skip_fallback: usize,
    // High half of a UTF-16 pair written as two \u control words
    high_surrogate: Option<u32>,
}

impl RtfReader {
    fn new(rtf: &str) -> Self {
        RtfReader {
            chars: rtf.chars().collect(),
            pos: 0,
            out: String::new(),
            pending: Vec::new(),
            encoding: WINDOWS_1252,
            state: GroupState { skip: false, uc: 1 },
            stack: Vec::new(),
            skip_fallback: 0,
            high_surrogate: None,
        }
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let (decoded, _, _) = self.encoding.decode(&self.pending);
        self.out.push_str(&decoded);
        self.pending.clear();
    }

    fn push_char(&mut self, c: char) {
        if self.skip_fallback > 0 {
            self.skip_fallback -= 1;
            return;
        }
        if self.high_surrogate.take().is_some() && !self.state.skip {
            self.flush_pending();
            self.out.push('\u{FFFD}');
        }
        if !self.state.skip {
            self.flush_pending();
            self.out.push(c);
        }
    }

    fn push_byte(&mut self, b: u8) {
        if self.skip_fallback > 0 {
            self.skip_fallback -= 1;
            return;
        }
        if !self.state.skip {
            self.pending.push(b);
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(mut self) -> String {
        while let Some(c) = self.peek(0) {
            match c {
                '{' => {
                    self.flush_pending();
                    self.stack.push(self.state);
                    self.pos += 1;
                }
                '}' => {
                    self.flush_pending();
                    if let Some(prev) = self.stack.pop() {
                        self.state = prev;
                    }
                    self.pos += 1;
                }
                '\\' => self.read_control(),
                // Raw line breaks are not content in RTF.
                '\r' | '\n' => self.pos += 1,
                _ => {
                    self.push_char(c);
                    self.pos += 1;
                }
            }
        }
        self.flush_pending();
        self.out
    }

    fn read_control(&mut self) {
        let Some(next) = self.peek(1) else {
            self.pos += 1;
            return;
        };

        if next.is_ascii_alphabetic() {
            self.read_control_word();
            return;
        }

        match next {
            '\'' => {
                let hex: String = self.chars.iter().skip(self.pos + 2).take(2).collect();
                if let Ok(b) = u8::from_str_radix(&hex, 16) {
                    self.push_byte(b);
                }
                self.pos += 2 + hex.chars().count();
            }
            '*' => {
                self.state.skip = true;
                self.pos += 2;
            }
            '\\' | '{' | '}' => {
                self.push_char(next);
                self.pos += 2;
            }
            '~' => {
                self.push_char('\u{00A0}');
                self.pos += 2;
            }
            '_' => {
                self.push_char('-');
                self.pos += 2;
            }
            '\n' | '\r' => {
                self.push_char('\n');
                self.pos += 2;
            }
            // \- optional hyphen and unknown control symbols
            _ => self.pos += 2,
        }
    }

    fn read_control_word(&mut self) {
        self.pos += 1;
        let mut word = String::new();
        while let Some(c) = self.peek(0) {
            if !c.is_ascii_alphabetic() {
                break;
            }
            word.push(c);
            self.pos += 1;
        }

        let mut param_str = String::new();
        if self.peek(0) == Some('-') {
            param_str.push('-');
            self.pos += 1;
        }
        while let Some(c) = self.peek(0) {
            if !c.is_ascii_digit() {
                break;
            }
            param_str.push(c);
            self.pos += 1;
        }
        let param: Option<i32> = param_str.parse().ok();

        // A single space delimits the control word and is not content.
        if self.peek(0) == Some(' ') {
            self.pos += 1;
        }

        self.apply_control_word(&word, param);
    }

    fn apply_control_word(&mut self, word: &str, param: Option<i32>) {
        if SKIP_DESTINATIONS.contains(&word) {
            self.state.skip = true;
            return;
        }

        match word {
            "ansicpg" => {
                if let Some(cp) = param {
                    self.flush_pending();
                    self.encoding = encoding_for_code_page(cp);
                }
            }
            "uc" => {
                self.state.uc = param.unwrap_or(1).max(0) as usize;
            }
            "u" => {
                if let Some(mut n) = param {
                    if n < 0 {
                        n += 65536;
                    }
                    let n = n as u32;
                    // Not subject to a previous fallback count.
                    self.skip_fallback = 0;

                    let pending_high = self.high_surrogate.take();
                    match n {
                        0xD800..=0xDBFF => {
                            if pending_high.is_some() {
                                self.push_char('\u{FFFD}');
                            }
                            self.high_surrogate = Some(n);
                        }
                        0xDC00..=0xDFFF => {
                            let c = pending_high
                                .and_then(|high| char::from_u32(0x10000 + ((high - 0xD800) << 10) + (n - 0xDC00)))
                                .unwrap_or('\u{FFFD}');
                            self.push_char(c);
                        }
                        _ => {
                            if pending_high.is_some() {
                                self.push_char('\u{FFFD}');
                            }
                            self.push_char(char::from_u32(n).unwrap_or('\u{FFFD}'));
                        }
                    }
                    self.skip_fallback = self.state.uc;
                }
            }
            "par" | "line" | "sect" | "page" | "row" => self.push_char('\n'),
            "tab" | "cell" => self.push_char('\t'),
            "emdash" => self.push_char('\u{2014}'),
            "endash" => self.push_char('\u{2013}'),
            "bullet" => self.push_char('\u{2022}'),
            "lquote" => self.push_char('\u{2018}'),
            "rquote" => self.push_char('\u{2019}'),
            "ldblquote" => self.push_char('\u{201C}'),
            "rdblquote" => self.push_char('\u{201D}'),
            "emspace" | "enspace" | "qmspace" => self.push_char(' '),
            _ => {}
        }
    }
}

fn encoding_for_code_page(cp: i32) -> &'static Encoding {
    if cp == 65001 {
        return UTF_8;
    }
    Encoding::for_label(format!("windows-{}", cp).as_bytes())
        .or_else(|| Encoding::for_label(format!("cp{}", cp).as_bytes()))
        .unwrap_or(WINDOWS_1252)
}

/// Convert an RTF document or fragment to plain text.
///
/// Input that doesn't look like RTF is returned with only line compaction.
pub fn rtf_to_text(rtf: &str) -> String {
    let text = RtfReader::new(rtf).run();
    compact_lines(&text)
}
