//! CSV upload loading
//!
//! Reads an uploaded CSV into a schema-less `RawTable`. Cells are classified
//! as numbers, text or empty; nothing is validated against the shaker schema
//! here. Malformed rows are skipped and counted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{RawRecord, RawTable, RawValue};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Identity of an upload's contents (MD5 of the raw bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadDigest([u8; 16]);

impl UploadDigest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }
}

impl std::fmt::Display for UploadDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// An uploaded file: display name plus contents
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk, named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        Ok(Self { name, bytes })
    }

    pub fn digest(&self) -> UploadDigest {
        UploadDigest::of(&self.bytes)
    }

    /// No bytes beyond whitespace or a byte-order mark
    pub fn is_blank(&self) -> bool {
        let body = self.bytes.strip_prefix(UTF8_BOM).unwrap_or(&self.bytes[..]);
        body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Parsed upload plus ingestion bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUpload {
    pub table: RawTable,
    /// Rows dropped because the CSV reader rejected them
    pub error_rows: usize,
}

/// Summary of an ingested upload, surfaced in the report header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub name: String,
    pub digest: String,
    pub rows: usize,
    pub columns: usize,
    pub error_rows: usize,
    pub columns_found: String,
}

/// Parse CSV bytes into a raw table.
///
/// Short rows are padded with empty cells and long rows are truncated to the
/// header width, so every record aligns with the header.
pub fn read_table(bytes: &[u8]) -> Result<ParsedUpload> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut records = Vec::new();
    let mut error_rows = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                if error_rows < 10 {
                    tracing::warn!(row = line + 1, error = %e, "Skipping unreadable CSV row");
                }
                error_rows += 1;
                continue;
            }
        };

        // Blank lines come through as a single empty field
        if record.iter().all(str::is_empty) {
            continue;
        }

        let mut values: Vec<RawValue> = record.iter().take(width).map(RawValue::parse).collect();
        values.resize(width, RawValue::Empty);
        records.push(RawRecord { values });
    }

    tracing::debug!(rows = records.len(), columns = width, errors = error_rows, "CSV parsed");

    Ok(ParsedUpload {
        table: RawTable::new(headers, records),
        error_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_typed_cells() {
        let csv = "YYYY/MM/DD,HH:MM:SS,SHAKER #3 (PERCENT)\n2024/01/02,10:00:00,55.5\n";
        let parsed = read_table(csv.as_bytes()).unwrap();
        assert_eq!(parsed.table.headers().len(), 3);
        assert_eq!(parsed.table.len(), 1);
        assert_eq!(parsed.table.number(0, "SHAKER #3 (PERCENT)"), Some(55.5));
        assert_eq!(parsed.error_rows, 0);
    }

    #[test]
    fn ragged_rows_are_aligned_to_header() {
        let csv = "A,B,C\n1,2\n1,2,3,4\n";
        let parsed = read_table(csv.as_bytes()).unwrap();
        let rows = parsed.table.records();
        assert_eq!(rows[0].values.len(), 3);
        assert!(rows[0].values[2].is_empty());
        assert_eq!(rows[1].values.len(), 3);
    }

    #[test]
    fn byte_order_mark_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Timestamp,X\n2024-01-01 00:00:00,1\n");
        let parsed = read_table(&bytes).unwrap();
        assert!(parsed.table.has_column("Timestamp"));
    }

    #[test]
    fn blank_upload_detection() {
        assert!(Upload::new("a.csv", Vec::new()).is_blank());
        assert!(Upload::new("a.csv", b"  \n".to_vec()).is_blank());
        assert!(!Upload::new("a.csv", b"A\n1\n".to_vec()).is_blank());
    }

    #[test]
    fn digest_is_content_identity() {
        let a = Upload::new("a.csv", b"A\n1\n".to_vec());
        let b = Upload::new("renamed.csv", b"A\n1\n".to_vec());
        let c = Upload::new("a.csv", b"A\n2\n".to_vec());
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().to_string().len(), 32);
    }
}
