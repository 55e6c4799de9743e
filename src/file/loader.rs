//! Test case file loading.
//!
//! This module reads test case JSON from files or stdin, transparently
//! decompressing gzip input, and splits it into documents.

use crate::document::node::CaseValue;
use crate::document::parser::parse_documents;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

/// Loads and parses a test case file.
///
/// The file may hold one object or an array of objects; see
/// [`parse_documents`] for how other shapes are handled. A path of `-`
/// reads from stdin.
///
/// # Examples
///
/// ```no_run
/// use casequill::file::loader::load_cases_file;
///
/// let cases = load_cases_file("test_cases.json").unwrap();
/// println!("{} cases", cases.len());
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file path does not exist or cannot be read
/// - A `.gz` file is not valid gzip
/// - The contents are not valid JSON
pub fn load_cases_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaseValue>> {
    let path = path.as_ref();
    let content = read_input(path)?;
    let cases = parse_documents(&content)
        .with_context(|| format!("Failed to parse {}", display_name(path)))?;
    tracing::debug!("Loaded {} case(s) from {}", cases.len(), display_name(path));
    Ok(cases)
}

/// Reads the raw text of an input file, or stdin for `-`.
///
/// Files ending in `.gz` are decompressed. Stdin is decompressed when it
/// starts with the gzip magic bytes.
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if path.as_os_str() == STDIN_PATH {
        return read_stdin();
    }

    // Check if file is gzipped
    let is_gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_gzipped {
        read_gzipped_file(path)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Reads stdin until EOF.
fn read_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    decode_bytes(buffer)
}

/// Decodes raw input bytes, decompressing them first if they are gzip.
fn decode_bytes(buffer: Vec<u8>) -> Result<String> {
    // Check for gzip magic bytes (0x1f 0x8b)
    if buffer.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&buffer)
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in input")
    }
}

fn display_name(path: &Path) -> String {
    if path.as_os_str() == STDIN_PATH {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Reads and decompresses a gzipped file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The file is not valid gzip format (corrupted)
/// - The decompressed content is not valid UTF-8
fn read_gzipped_file<P: AsRef<Path>>(path: P) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

/// Decompresses gzip-encoded bytes to a UTF-8 string.
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped input")?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn gzip(data: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_plain_bytes() {
        let text = decode_bytes(b"{\"a\": 1}".to_vec()).unwrap();
        assert_eq!(text, "{\"a\": 1}");
    }

    #[test]
    fn test_decode_gzip_bytes() {
        let text = decode_bytes(gzip("[{\"a\": 1}]")).unwrap();
        assert_eq!(text, "[{\"a\": 1}]");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let result = decode_bytes(vec![0xff, 0xfe, 0xfd]);
        assert!(result.unwrap_err().to_string().contains("UTF-8"));
    }

    #[test]
    fn test_load_gzipped_cases_file() {
        let dir = TempDir::new().unwrap();
        let gz_path = dir.path().join("cases.json.gz");
        fs::write(&gz_path, gzip(r#"[{"mhm": {"age": 30}}, {"mhm": {"age": null}}]"#)).unwrap();

        let cases = load_cases_file(&gz_path).unwrap();
        assert_eq!(cases.len(), 2);
    }

    #[test]
    fn test_read_gzipped_file_corrupted() {
        let dir = TempDir::new().unwrap();
        let gz_path = dir.path().join("broken.json.gz");
        fs::write(&gz_path, b"not gzip data").unwrap();

        let err_msg = read_input(&gz_path).unwrap_err().to_string();
        assert!(err_msg.contains("decompress") || err_msg.contains("corrupted"));
    }
}
