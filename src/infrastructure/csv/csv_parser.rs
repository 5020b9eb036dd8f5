// ============================================================
// CSV PARSER
// ============================================================
// Decode delimited text into raw rows; header handling is left to the loader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::UTF_8;

use crate::domain::error::{AppError, Result};
use crate::domain::records::SourceRow;

/// CSV row source
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Open a CSV file and return its rows, header included.
    pub fn parse_file(&self, path: &Path) -> Result<impl Iterator<Item = Result<SourceRow>>> {
        let file = File::open(path).map_err(|e| {
            AppError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        self.rows(file)
    }

    /// Read everything from `reader` and return its rows, header included.
    ///
    /// The whole input is checked for UTF-8 and for well-formed quoting
    /// before any row is decoded, so a malformed file fails here with a
    /// `ParseError` naming the offending line.
    pub fn rows<R: Read>(&self, mut reader: R) -> Result<impl Iterator<Item = Result<SourceRow>>> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|e| AppError::LoadError(format!("Failed to read input: {}", e)))?;

        let content = decode_utf8(&buffer)?;
        check_quoting(content.as_bytes(), self.delimiter)?;

        let bytes = content.as_bytes();
        let newlines: Vec<usize> = bytes
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .map(|(offset, _)| offset)
            .collect();

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true) // Row length policy belongs to the loader
            .from_reader(bytes);

        let rows = reader
            .records()
            .map(|result| {
                result
                    .map(|record| to_source_row(bytes, &newlines, &record))
                    .map_err(AppError::from)
            })
            .collect::<Vec<_>>();

        Ok(rows.into_iter())
    }

    /// Parse CSV content from a string
    pub fn parse_content(&self, content: &str) -> Result<Vec<SourceRow>> {
        self.rows(content.as_bytes())?.collect()
    }
}

/// Decode UTF-8 input, dropping a leading BOM.
fn decode_utf8(bytes: &[u8]) -> Result<String> {
    let (content, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(AppError::ParseError(
            "Input is not valid UTF-8".to_string(),
        ));
    }
    Ok(content.into_owned())
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a `"` inside a quoted field: either an escaped quote or the
    /// closing one.
    QuoteInQuoted,
}

/// Strict RFC 4180 quoting check.
///
/// The `csv` crate accepts stray quotes silently, so a bare `"` in an
/// unquoted field, text after a closing quote, or a quoted field still open
/// at end of input are rejected here.
fn check_quoting(bytes: &[u8], delimiter: u8) -> Result<()> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1u64;
    let mut quote_line = 1u64;

    for &byte in bytes {
        state = match (state, byte) {
            (QuoteState::FieldStart, b'"') => {
                quote_line = line;
                QuoteState::Quoted
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, b'\r') => state,
            (QuoteState::FieldStart | QuoteState::Unquoted, _) if byte == delimiter => {
                QuoteState::FieldStart
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, b'\n') => QuoteState::FieldStart,
            (QuoteState::FieldStart | QuoteState::Unquoted, b'"') => {
                return Err(AppError::ParseError(format!(
                    "line {}: bare \" in non-quoted field",
                    line
                )));
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'\n') => QuoteState::FieldStart,
            // Closing quote followed by CRLF.
            (QuoteState::QuoteInQuoted, b'\r') => QuoteState::QuoteInQuoted,
            (QuoteState::QuoteInQuoted, _) if byte == delimiter => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                return Err(AppError::ParseError(format!(
                    "line {}: unexpected character after closing quote",
                    line
                )));
            }
        };

        if byte == b'\n' {
            line += 1;
        }
    }

    if let QuoteState::Quoted = state {
        return Err(AppError::ParseError(format!(
            "line {}: quoted field is never closed",
            quote_line
        )));
    }

    Ok(())
}

/// Tag a record with the 1-based line it starts on. Blank lines the reader
/// skipped before the record are not counted as its start.
fn to_source_row(bytes: &[u8], newlines: &[usize], record: &StringRecord) -> SourceRow {
    let offset = record
        .position()
        .map(|pos| pos.byte() as usize)
        .unwrap_or_default()
        .min(bytes.len());
    let start = offset
        + bytes[offset..]
            .iter()
            .take_while(|byte| matches!(byte, b'\r' | b'\n'))
            .count();
    let line = 1 + newlines.partition_point(|&newline| newline < start) as u64;

    SourceRow::new(line, record.iter().map(str::to_string).collect())
}
