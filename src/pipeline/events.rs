use chrono::{DateTime, FixedOffset};
use std::path::Path;

use crate::error::{ReportError, Result};

/// Source timestamp format: ISO-8601 with fractional seconds and offset,
/// e.g. `2024-03-07T14:02:11.531000-05:00`.
const ACTIVITY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

const LEAD_COLUMN: &str = "Origin";
const CODE_COLUMN: &str = "ActivityTypeId";
const DATE_COLUMN: &str = "ActivityDate";

/// One logged activity for a lead. Immutable once read.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    /// Join key across one file's rows ("Origin").
    pub lead_id: String,
    /// Integer activity code identifying what kind of event occurred.
    pub code: u32,
    /// Parsed timestamp; `None` when the source text fails strict parsing.
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// Parse a source timestamp leniently: malformed values become `None`
/// rather than errors, and fall out of downstream min/max aggregates.
pub fn parse_activity_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw.trim(), ACTIVITY_DATE_FORMAT).ok()
}

/// Read one file's activity events. Extra columns are ignored; a missing
/// required column is a `SchemaError` for that file. Rows whose activity
/// code is not an integer are skipped (they cannot match any taxonomy
/// code), as are rows with an empty lead identifier.
pub fn read_events(path: &Path) -> Result<Vec<ActivityEvent>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReportError::Schema {
                file: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let lead_idx = column(LEAD_COLUMN)?;
    let code_idx = column(CODE_COLUMN)?;
    let date_idx = column(DATE_COLUMN)?;

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record?;
        let lead_id = record.get(lead_idx).unwrap_or("").trim();
        if lead_id.is_empty() {
            continue;
        }
        let code: u32 = match record.get(code_idx).unwrap_or("").trim().parse() {
            Ok(code) => code,
            Err(_) => continue,
        };
        let timestamp = record
            .get(date_idx)
            .and_then(|raw| parse_activity_date(raw));
        events.push(ActivityEvent {
            lead_id: lead_id.to_string(),
            code,
            timestamp,
        });
    }
    Ok(events)
}
