// Reading corpus text files: BOM detection, decoding to UTF-8, CRLF to LF.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::Result;
use crate::logger;

/// Reads a text file, decodes it by its BOM (UTF-8 when there is none) and
/// converts to Unix line endings.
pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let (encoding, bom_len) = detect_encoding(&bytes);

    logger::debug(&format!(
        "File: {:?}, Encoding: {}, BOM: {}",
        path.file_name().unwrap_or_default(),
        encoding.name(),
        bom_len > 0
    ));

    let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);

    if had_errors {
        logger::warn(&format!("Encoding errors detected while decoding {:?}", path));
    }

    Ok(decoded.replace("\r\n", "\n"))
}

/// Detects the encoding from the BOM. Returns the BOM length in bytes.
fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return (UTF_16LE, 2);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return (UTF_16BE, 2);
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (UTF_8, 3);
    }
    (UTF_8, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_boms() {
        assert_eq!(detect_encoding(&[0xFF, 0xFE, 0x41, 0x00]), (UTF_16LE, 2));
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0x00, 0x41]), (UTF_16BE, 2));
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, 0x41]), (UTF_8, 3));
        assert_eq!(detect_encoding(b"ABC"), (UTF_8, 0));
    }

    #[test]
    fn test_read_utf16le_with_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gen.usfm");

        let mut bytes = vec![0xFF, 0xFE];
        for unit in "\\id GEN\r\n\\c 1\r\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(&path, bytes).unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "\\id GEN\n\\c 1\n");
    }

    #[test]
    fn test_read_utf8_bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.usfm");
        fs::write(&path, b"\xEF\xBB\xBF\\id GEN\n").unwrap();
        assert_eq!(read_text_file(&path).unwrap(), "\\id GEN\n");
    }
}
