use std::path::Path;

use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};

use crate::error::{ConvertError, Result};
use crate::helpers::{html_to_text, normalize, normalize_opt};
use crate::logger::{debug, info};
use crate::rtf::rtf_to_text;
use crate::settings::ConverterSettings;
use crate::types::{DictionaryDefinition, DictionaryEntry, EntryIdGenerator};

/// Entry queries tried in order. Modules differ in the casing of the table and
/// column names. The first query that runs is used, even if it returns no rows.
pub const ENTRY_QUERIES: &[&str] = &[
    "SELECT word, definition FROM entries",
    "SELECT Word AS word, Definition AS definition FROM Entries",
];

/// e-Sword dictionary module variants, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    /// e-Sword 9-10, definitions stored as RTF
    Dctx,
    /// e-Sword 11+, definitions stored as HTML
    Dcti,
}

impl ModuleType {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "dctx" => Ok(ModuleType::Dctx),
            "dcti" => Ok(ModuleType::Dcti),
            _ => Err(ConvertError::UnsupportedFormat(format!(".{}", ext))),
        }
    }

    pub fn payload_to_text(&self, payload: &str) -> String {
        match self {
            ModuleType::Dctx => rtf_to_text(payload),
            ModuleType::Dcti => html_to_text(payload),
        }
    }
}

#[derive(QueryableByName, Debug)]
struct EntryRow {
    #[diesel(sql_type = Nullable<Text>)]
    word: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    definition: Option<String>,
}

/// Opens the module read-only, the source is never modified.
fn open_read_only(db_path: &Path) -> Result<SqliteConnection> {
    let path_str = db_path.to_string_lossy()
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    let db_url = format!("file:{}?mode=ro", path_str);

    SqliteConnection::establish(&db_url)
        .map_err(|e| ConvertError::StoreAccess(format!("{}: {}", db_path.display(), e)))
}

fn load_entry_rows(db_conn: &mut SqliteConnection) -> Result<Vec<EntryRow>> {
    let mut last_error = String::new();

    for query in ENTRY_QUERIES {
        match diesel::sql_query(*query).load::<EntryRow>(db_conn) {
            Ok(rows) => {
                debug(&format!("'{}' returned {} rows", query, rows.len()));
                return Ok(rows);
            }
            Err(e) => {
                debug(&format!("'{}' failed: {}", query, e));
                last_error = e.to_string();
            }
        }
    }

    Err(ConvertError::StoreAccess(last_error))
}

pub fn dictionary_entry(id: String, word: &str, gloss: &str) -> DictionaryEntry {
    DictionaryEntry {
        id,
        word: normalize(word),
        definitions: vec![DictionaryDefinition {
            gloss: normalize(gloss),
            example: String::new(),
        }],
        biblical_lemma_ids: Vec::new(),
        pos: String::new(),
        notes: String::new(),
    }
}

/// Extract dictionary entries from an e-Sword .dctx or .dcti module, one per
/// row, in the order the store returns them.
pub fn parse_esword_module(db_path: &Path, settings: &ConverterSettings) -> Result<Vec<DictionaryEntry>> {
    let module_type = ModuleType::from_path(db_path)?;
    crate::ensure_input_exists(db_path)?;

    info(&format!("Reading {:?} module: {}", module_type, db_path.display()));

    let mut db_conn = open_read_only(db_path)?;
    let rows = load_entry_rows(&mut db_conn)?;

    let mut ids = EntryIdGenerator::new(&settings.dictionary_id_prefix, settings.id_width);

    let entries: Vec<DictionaryEntry> = rows
        .iter()
        .map(|row| {
            let word = normalize_opt(row.word.as_deref());
            let gloss = module_type.payload_to_text(row.definition.as_deref().unwrap_or_default());
            dictionary_entry(ids.next_id(), &word, &gloss)
        })
        .collect();

    info(&format!("Extracted {} entries from {}", entries.len(), db_path.display()));
    Ok(entries)
}
