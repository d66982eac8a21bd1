//! Delimited source file reading with encoding auto-detection.
//!
//! Turns raw bytes into numbered lines and lines into [`RowData`]. No
//! dictionary-specific logic here.

use std::path::Path;
use tracing::warn;

use crate::error::{ParseError, ParseResult, RowError};
use crate::models::RowData;

/// Decoded source text with the encoding that was used.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub content: String,
    pub encoding: String,
}

impl SourceText {
    /// Lines with their 1-based numbers. Blank lines are kept so numbering
    /// matches the file.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.content.lines().enumerate().map(|(i, line)| (i + 1, line))
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as UTF-8. Anything else goes through chardet, and a
/// guess outside ISO-8859-1 and Windows-1252 is logged and replaced by
/// Windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let (charset, confidence, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => {
            warn!(
                detected = %charset,
                confidence,
                "unexpected source encoding, decoding as windows-1252; pass --encoding to override"
            );
            "windows-1252".to_string()
        }
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encoding labels are looked up with `encoding_rs`; a label it does
/// not know either is an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ParseResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => {
            let enc = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                ParseError::Encoding {
                    encoding: label.to_string(),
                }
            })?;
            enc.decode(bytes).0.into_owned()
        }
    };

    Ok(decoded
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(decoded))
}

/// Read and decode a source file. `encoding` overrides detection.
pub fn read_source(path: &Path, encoding: Option<&str>) -> ParseResult<SourceText> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_source(&bytes, encoding)
}

/// Decode source bytes. `encoding` overrides detection.
pub fn decode_source(bytes: &[u8], encoding: Option<&str>) -> ParseResult<SourceText> {
    let encoding = match encoding {
        Some(e) => e.to_string(),
        None => detect_encoding(bytes),
    };
    let content = decode_content(bytes, &encoding)?;
    Ok(SourceText { content, encoding })
}

/// Shape of a row: separator, width and minimum width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub separator: char,
    pub column_count: usize,
    pub min_column_count: usize,
}

impl RowLayout {
    /// A line whose cells are all empty, e.g. `;;` from a spreadsheet export.
    pub fn is_blank(&self, line: &str) -> bool {
        line.split(self.separator).all(|cell| cell.trim().is_empty())
    }

    /// Split a line into a row. Cells are trimmed; short rows are padded to
    /// the column count, long rows kept whole. Fewer cells than the minimum
    /// rejects the row.
    pub fn split(&self, line_number: usize, line: &str) -> Result<RowData, RowError> {
        let cells: Vec<String> = line
            .split(self.separator)
            .map(|s| s.trim().to_string())
            .collect();

        if cells.len() < self.min_column_count {
            return Err(RowError::TooShort {
                found: cells.len(),
                min: self.min_column_count,
            });
        }

        Ok(RowData::new(line_number, cells, self.column_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn layout() -> RowLayout {
        RowLayout {
            separator: '\t',
            column_count: 4,
            min_column_count: 2,
        }
    }

    #[test]
    fn test_split_pads_short_rows() {
        let row = layout().split(7, "noun\thuus, husen").unwrap();
        assert_eq!(row.line_number(), 7);
        assert_eq!(row.len(), 4);
        assert_eq!(row.column(1), "huus, husen");
        assert_eq!(row.column(3), "");
    }

    #[test]
    fn test_split_keeps_long_rows() {
        let row = layout().split(1, "a\tb\tc\td\te").unwrap();
        assert_eq!(row.len(), 5);
        assert_eq!(row.column(4), "e");
    }

    #[test]
    fn test_split_rejects_below_minimum() {
        let err = layout().split(1, "noun").unwrap_err();
        assert_eq!(err, RowError::TooShort { found: 1, min: 2 });
    }

    #[test]
    fn test_numbered_lines_keep_blank_lines() {
        let source = decode_source(b"a\n\nb\r\nc", None).unwrap();
        let lines: Vec<_> = source.numbered_lines().collect();
        assert_eq!(lines, vec![(1, "a"), (2, ""), (3, "b"), (4, "c")]);
    }

    #[test]
    fn test_bom_stripped() {
        let source = decode_source("\u{feff}noun\thuus".as_bytes(), Some("utf-8")).unwrap();
        assert!(source.content.starts_with("noun"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "plöögt" in ISO-8859-1
        let bytes: &[u8] = &[0x70, 0x6C, 0xF6, 0xF6, 0x67, 0x74];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "plöögt");
    }

    #[test]
    fn test_detect_utf8_with_umlauts() {
        let source = decode_source("noun;plöög, plööge;\n".as_bytes(), None).unwrap();
        assert_eq!(source.encoding, "utf-8");
        assert_eq!(source.content, "noun;plöög, plööge;\n");
    }

    #[test]
    fn test_detect_short_latin1_line() {
        let bytes = b"noun;\xE4\xF6\xFC\xDF, \xC4\xD6\xDC;\n";
        let encoding = detect_encoding(bytes);
        assert!(
            encoding == "iso-8859-1" || encoding == "windows-1252",
            "detected {encoding}"
        );

        let source = decode_source(bytes, None).unwrap();
        assert_eq!(source.content, "noun;äöüß, ÄÖÜ;\n");
    }

    #[test]
    fn test_blank_line_of_separators() {
        let layout = RowLayout {
            separator: ';',
            ..layout()
        };
        assert!(layout.is_blank(""));
        assert!(layout.is_blank(";;"));
        assert!(layout.is_blank(" ; \t; "));
        assert!(!layout.is_blank(";huus;"));
        assert!(!layout.is_blank("noun\thuus"));
    }

    #[test]
    fn test_unknown_encoding_label() {
        let err = decode_content(b"x", "klingon-8").unwrap_err();
        assert!(matches!(err, ParseError::Encoding { .. }));
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/words.tsv"), None).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_read_source_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "noun\thuus\n").unwrap();
        let source = read_source(file.path(), None).unwrap();
        assert_eq!(source.encoding, "utf-8");
        assert_eq!(source.numbered_lines().count(), 1);
    }
}
