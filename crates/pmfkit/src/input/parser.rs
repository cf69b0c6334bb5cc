//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::source::{RawTable, SourceMetadata};
use crate::error::{PmfError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses delimited text into raw tables.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file into a raw table named after the file stem.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<RawTable> {
        let path = path.as_ref();
        let io_err = |e| PmfError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents, self.config.quote)?,
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = self.parse_bytes(&name, &contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok(table.with_source(source))
    }

    /// Parse in-memory text, detecting the delimiter unless configured.
    pub fn parse_str(&self, name: &str, text: &str) -> Result<RawTable> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes, self.config.quote)?,
        };
        self.parse_bytes(name, bytes, delimiter)
    }

    fn parse_bytes(&self, name: &str, bytes: &[u8], delimiter: u8) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(PmfError::EmptyData(format!("'{}' has no columns", name)));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();

            // Pad row if needed
            while row.len() < expected_cols {
                row.push(String::new());
            }
            row.truncate(expected_cols);

            rows.push(row);
        }

        Ok(RawTable::new(name, headers, rows))
    }
}

/// Records inspected when detecting the delimiter.
const SNIFF_RECORDS: usize = 10;

/// Pick the delimiter under which the rows best agree with the header.
///
/// A PMF sheet has one label column (two for multi-index tables) followed
/// by one column per factor or iteration, so every data row splits into as
/// many fields as the header. Candidates are ranked by how many rows match
/// the header width, then by that width; ties keep [`DELIMITERS`] order.
fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    let mut best: Option<(usize, usize, u8)> = None;

    for &delimiter in DELIMITERS {
        let widths: Vec<usize> = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes)
            .records()
            .filter_map(|r| r.ok())
            .filter(|r| r.iter().any(|cell| !cell.trim().is_empty()))
            .take(SNIFF_RECORDS)
            .map(|r| r.len())
            .collect();

        let Some((&header, rest)) = widths.split_first() else {
            return Err(PmfError::EmptyData("No lines to analyze".to_string()));
        };
        if header < 2 {
            continue;
        }
        let agreeing = rest.iter().filter(|&&w| w == header).count();
        if best.is_none_or(|(a, h, _)| (agreeing, header) > (a, h)) {
            best = Some((agreeing, header, delimiter));
        }
    }

    Ok(best.map_or(b',', |(_, _, delimiter)| delimiter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_and_decimal_commas() {
        let data = b"Specie;\"Dust, road\";Traffic\nPM10;1,5;2,0\nEC;0,1;0,3\n";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b';');
    }

    #[test]
    fn test_detect_delimiter_empty() {
        assert!(detect_delimiter(b"\n\n", b'"').is_err());
    }

    #[test]
    fn test_parse_profile_text() {
        let parser = Parser::new();
        let table = parser
            .parse_str("profiles", "Specie,F1,F2\nPMrecons,4.0,2.0\n\nEC,0.2,0\n")
            .unwrap();

        assert_eq!(table.name, "profiles");
        assert_eq!(table.headers, vec!["Specie", "F1", "F2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, 0), Some("EC"));
        assert!(table.source.is_none());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let parser = Parser::new();
        let table = parser.parse_str("t", "a;b;c\n1;2\n3;4;5\n").unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let table = parser.parse_str("t", "a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(table.row_count(), 1);
    }
}
