pub mod error;
pub mod types;
pub mod helpers;
pub mod rtf;
pub mod settings;
pub mod logger;
pub mod gematria;
pub mod export_helpers;
pub mod encoding;
pub mod esword_import;
pub mod pdf_lexicon;
pub mod usfm_parse;
pub mod osis_parse;
pub mod concordance;

use std::path::Path;

pub use error::{ConvertError, Result};

pub static DICTIONARY_ID_PREFIX: &str = "MH";
pub static LEXICON_ID_PREFIX: &str = "LEX";
pub static ID_WIDTH: usize = 5;

/// Fails with `InputNotFound` unless the path exists.
pub fn ensure_input_exists(path: &Path) -> Result<()> {
    // try_exists() so that permission errors are reported as missing input
    match path.try_exists() {
        Ok(true) => Ok(()),
        _ => Err(ConvertError::InputNotFound(path.to_path_buf())),
    }
}
