use serde::{Serialize, Deserialize};

/// A headword of the modern dictionary, extracted from an e-Sword module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: String,
    pub word: String,
    pub definitions: Vec<DictionaryDefinition>,
    // Reserved for the enrichment step, always empty at extraction time.
    pub biblical_lemma_ids: Vec<String>,
    pub pos: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryDefinition {
    pub gloss: String,
    pub example: String,
}

/// A lexicon headword. The `lemma` is the key the concordance joins on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: String,
    pub lemma: String,
    pub language: String,
    pub pos: String,
    pub definitions: Vec<LexiconDefinition>,
    pub etymology: String,
    pub related_forms: Vec<String>,
    pub modern_equivalent: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconDefinition {
    pub gloss: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl VerseRecord {
    pub fn new(book: &str, chapter: u32, verse: u32, text: &str) -> Self {
        VerseRecord {
            book: book.to_string(),
            chapter,
            verse,
            text: text.to_string(),
        }
    }

    pub fn reference(&self) -> VerseReference {
        VerseReference {
            book: self.book.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseReference {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcordanceEntry {
    pub lemma_id: String,
    pub source: String,
    pub reference: VerseReference,
    /// Token positions within the verse. Holds a single index, one entry is
    /// emitted per occurrence.
    pub occurrence_indices: Vec<usize>,
}

/// Sequential ids with a fixed prefix: MH00001, MH00002, ...
#[derive(Debug, Clone)]
pub struct EntryIdGenerator {
    prefix: String,
    width: usize,
    counter: usize,
}

impl EntryIdGenerator {
    pub fn new(prefix: &str, width: usize) -> Self {
        EntryIdGenerator {
            prefix: prefix.to_string(),
            width,
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}{:0width$}", self.prefix, self.counter, width = self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_zero_padded_and_increasing() {
        let mut ids = EntryIdGenerator::new("MH", 5);
        assert_eq!(ids.next_id(), "MH00001");
        assert_eq!(ids.next_id(), "MH00002");

        let mut ids = EntryIdGenerator::new("LEX", 3);
        let all: Vec<String> = (0..1200).map(|_| ids.next_id()).collect();
        assert_eq!(all[0], "LEX001");
        assert_eq!(all[999], "LEX1000");
        // Numeric order holds even when the padding width is exceeded.
        let nums: Vec<usize> = all.iter().map(|s| s[3..].parse().unwrap()).collect();
        assert!(nums.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_concordance_entry_json_keys() {
        let entry = ConcordanceEntry {
            lemma_id: "LEX00001".to_string(),
            source: "Tanakh".to_string(),
            reference: VerseRecord::new("GEN", 1, 3, "").reference(),
            occurrence_indices: vec![2],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["reference"]["book"], "GEN");
        assert_eq!(json["occurrence_indices"], serde_json::json!([2]));
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}
