//! Numeric values of Hebrew words.
//!
//! Letters are valued by their position in the 22-letter alphabet. Final forms
//! (ך ם ן ף ץ) count as their base letter in every method. The word is
//! NFD-decomposed first so that niqqud and cantillation marks separate from
//! their letters; any character outside the alphabet contributes nothing.

use std::fmt;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;

use crate::error::{ConvertError, Result};

/// The alphabet in order, base forms only.
pub const HEBREW_ALPHABET: [char; 22] = [
    'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ',
    'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ', 'ק', 'ר', 'ש', 'ת',
];

/// Mispar hechrachi: 1-9, 10-90, 100-400.
pub const STANDARD_VALUES: [u32; 22] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 20,
    30, 40, 50, 60, 70, 80, 90, 100, 200, 300, 400,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GematriaMethod {
    Standard,
    Ordinal,
    Reduced,
    Atbash,
}

impl GematriaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GematriaMethod::Standard => "standard",
            GematriaMethod::Ordinal => "ordinal",
            GematriaMethod::Reduced => "reduced",
            GematriaMethod::Atbash => "atbash",
        }
    }
}

impl fmt::Display for GematriaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GematriaMethod {
    type Err = ConvertError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(GematriaMethod::Standard),
            "ordinal" => Ok(GematriaMethod::Ordinal),
            "reduced" => Ok(GematriaMethod::Reduced),
            "atbash" => Ok(GematriaMethod::Atbash),
            _ => Err(ConvertError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Zero-based alphabet position, final forms mapped to their base letter.
pub fn letter_index(c: char) -> Option<usize> {
    let base = match c {
        'ך' => 'כ',
        'ם' => 'מ',
        'ן' => 'נ',
        'ף' => 'פ',
        'ץ' => 'צ',
        _ => c,
    };
    HEBREW_ALPHABET.iter().position(|&l| l == base)
}

/// Value of a single letter under a method, None for non-letters.
pub fn letter_value(c: char, method: GematriaMethod) -> Option<u32> {
    let idx = letter_index(c)?;
    let value = match method {
        GematriaMethod::Standard => STANDARD_VALUES[idx],
        GematriaMethod::Ordinal => idx as u32 + 1,
        // Mispar katan: the standard value with its zeros dropped
        GematriaMethod::Reduced => {
            let mut v = STANDARD_VALUES[idx];
            while v % 10 == 0 {
                v /= 10;
            }
            v
        }
        // א<->ת, ב<->ש, ...
        GematriaMethod::Atbash => STANDARD_VALUES[HEBREW_ALPHABET.len() - 1 - idx],
    };
    Some(value)
}

pub fn gematria(word: &str, method: GematriaMethod) -> u64 {
    word.nfd()
        .filter_map(|c| letter_value(c, method))
        .map(u64::from)
        .sum()
}

/// Like `gematria()`, with the method given by name.
pub fn gematria_str(word: &str, method_name: &str) -> Result<u64> {
    let method = GematriaMethod::from_str(method_name)?;
    Ok(gematria(word, method))
}
