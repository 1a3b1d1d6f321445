use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::helpers::normalize;
use crate::logger::{debug, info};
use crate::types::{ConcordanceEntry, LexiconEntry, VerseRecord};

lazy_static! {
    static ref RE_TOKEN_SEPARATOR: Regex = Regex::new(r"[\s\d\p{P}]+").unwrap();
}

/// The corpora a concordance can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corpus {
    Tanakh,
    Targums,
    Peshitta,
}

impl Corpus {
    pub fn name(&self) -> &'static str {
        match self {
            Corpus::Tanakh => "Tanakh",
            Corpus::Targums => "Targums",
            Corpus::Peshitta => "Peshitta",
        }
    }

    pub fn output_file_name(&self) -> String {
        format!("{}_concordance.json", self.name().to_lowercase())
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The two lexicon fields the concordance needs. Lexicon files may carry any
/// other keys.
#[derive(Debug, Deserialize)]
struct LexiconKey {
    id: String,
    lemma: String,
}

/// Normalized lemma to lexicon id. When two entries share a lemma the later
/// one wins.
pub fn lemma_map(entries: &[LexiconEntry]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|e| (normalize(&e.lemma), e.id.clone()))
        .collect()
}

pub fn load_lexicon(path: &Path) -> Result<HashMap<String, String>> {
    crate::ensure_input_exists(path)?;

    let json = fs::read_to_string(path)?;
    let keys: Vec<LexiconKey> = serde_json::from_str(&json)?;

    let mut map = HashMap::with_capacity(keys.len());
    for k in keys {
        map.insert(normalize(&k.lemma), k.id);
    }

    info(&format!("Loaded {} lemmas from {}", map.len(), path.display()));
    Ok(map)
}

/// Split verse text into normalized tokens. Whitespace, digits and
/// punctuation separate tokens. Indices into the result are the occurrence
/// indices of the concordance.
pub fn tokenize(text: &str) -> Vec<String> {
    RE_TOKEN_SEPARATOR
        .split(text)
        .filter(|t| !t.is_empty())
        .map(normalize)
        .collect()
}

/// One entry per token that matches a lemma, in verse order then token order.
pub fn build_concordance(
    verses: &[VerseRecord],
    lemma_map: &HashMap<String, String>,
    source: &str,
) -> Vec<ConcordanceEntry> {
    let mut entries: Vec<ConcordanceEntry> = Vec::new();

    for verse in verses {
        for (idx, token) in tokenize(&verse.text).iter().enumerate() {
            if let Some(lemma_id) = lemma_map.get(token) {
                entries.push(ConcordanceEntry {
                    lemma_id: lemma_id.clone(),
                    source: source.to_string(),
                    reference: verse.reference(),
                    occurrence_indices: vec![idx],
                });
            }
        }
    }

    debug(&format!("{}: {} occurrences in {} verses", source, entries.len(), verses.len()));
    entries
}
