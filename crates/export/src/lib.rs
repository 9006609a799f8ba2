//! CSV Export
//!
//! Pure conversion of repair records to CSV text. Given the same ordered
//! input, the output is byte-identical: fixed column order, RFC 4180 quoting,
//! CRLF row terminators.

use chrono::{DateTime, SecondsFormat, Utc};
use storage::RepairRecord;
use thiserror::Error;

/// Export errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// Refusing to produce a header-only report is a business rule, not a
    /// technical limitation; callers map this to "nothing to export".
    #[error("no records to export")]
    EmptyExport,
}

const HEADER: &str = "Date/Time,Description,Location,Before Photo,After Photo,ID";

/// Render `records` as CSV, in the given order.
pub fn to_csv(records: &[RepairRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptyExport);
    }

    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(HEADER);
    out.push_str("\r\n");

    for record in records {
        let timestamp = record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let row = [
            field(&timestamp),
            field(&record.description),
            field(&record.location),
            field(&record.photo_before),
            field(&record.photo_after),
            record.id.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }

    Ok(out)
}

/// Download filename hint embedding the export timestamp.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("repairs-{}.csv", at.timestamp_millis())
}

// RFC 4180: quote fields containing separators or quotes, double embedded
// quotes.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
