use std::env;

use crate::logger::warn;
use crate::{DICTIONARY_ID_PREFIX, ID_WIDTH, LEXICON_ID_PREFIX};

/// Values stamped onto extracted entries. Passed explicitly to each pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSettings {
    pub dictionary_id_prefix: String,
    pub lexicon_id_prefix: String,
    pub id_width: usize,
    pub lexicon_language: String,
    pub lexicon_pos: String,
    pub lexicon_source: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        ConverterSettings {
            dictionary_id_prefix: DICTIONARY_ID_PREFIX.to_string(),
            lexicon_id_prefix: LEXICON_ID_PREFIX.to_string(),
            id_width: ID_WIDTH,
            lexicon_language: "Hebrew".to_string(),
            lexicon_pos: "unknown".to_string(),
            lexicon_source: "PDF Lexicon".to_string(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

impl ConverterSettings {
    /// Defaults overridden by CONCORDANCE_* environment variables, which may
    /// also come from a .env file.
    pub fn from_env() -> Self {
        let mut settings = ConverterSettings::default();

        if let Some(s) = env_string("CONCORDANCE_DICTIONARY_ID_PREFIX") {
            settings.dictionary_id_prefix = s;
        }
        if let Some(s) = env_string("CONCORDANCE_LEXICON_ID_PREFIX") {
            settings.lexicon_id_prefix = s;
        }
        if let Some(s) = env_string("CONCORDANCE_ID_WIDTH") {
            match s.parse::<usize>() {
                Ok(n) if n > 0 => settings.id_width = n,
                _ => warn(&format!("Ignoring invalid CONCORDANCE_ID_WIDTH: {}", s)),
            }
        }
        if let Some(s) = env_string("CONCORDANCE_LEXICON_LANGUAGE") {
            settings.lexicon_language = s;
        }
        if let Some(s) = env_string("CONCORDANCE_LEXICON_POS") {
            settings.lexicon_pos = s;
        }
        if let Some(s) = env_string("CONCORDANCE_LEXICON_SOURCE") {
            settings.lexicon_source = s;
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "CONCORDANCE_DICTIONARY_ID_PREFIX",
        "CONCORDANCE_LEXICON_ID_PREFIX",
        "CONCORDANCE_ID_WIDTH",
        "CONCORDANCE_LEXICON_LANGUAGE",
        "CONCORDANCE_LEXICON_POS",
        "CONCORDANCE_LEXICON_SOURCE",
    ];

    fn clear_env() {
        for k in KEYS {
            unsafe { env::remove_var(k); }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let settings = ConverterSettings::from_env();
        assert_eq!(settings, ConverterSettings::default());
        assert_eq!(settings.dictionary_id_prefix, "MH");
        assert_eq!(settings.lexicon_id_prefix, "LEX");
        assert_eq!(settings.id_width, 5);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("CONCORDANCE_LEXICON_LANGUAGE", "Aramaic");
            env::set_var("CONCORDANCE_ID_WIDTH", "7");
            env::set_var("CONCORDANCE_LEXICON_SOURCE", "  ");
        }
        let settings = ConverterSettings::from_env();
        assert_eq!(settings.lexicon_language, "Aramaic");
        assert_eq!(settings.id_width, 7);
        // Blank values don't override.
        assert_eq!(settings.lexicon_source, "PDF Lexicon");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_width_is_ignored() {
        clear_env();
        unsafe { env::set_var("CONCORDANCE_ID_WIDTH", "zero"); }
        assert_eq!(ConverterSettings::from_env().id_width, 5);
        unsafe { env::set_var("CONCORDANCE_ID_WIDTH", "0"); }
        assert_eq!(ConverterSettings::from_env().id_width, 5);
        clear_env();
    }
}
