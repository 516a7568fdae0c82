//! ISO-8601 timestamp rendering for modification-time comparison.
//!
//! Cache validity is decided by exact string equality of stored and current
//! modification timestamps, so both sides must render through the same
//! function. Millisecond precision matches the granularity the filesystem
//! reports.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

/// Renders a [`SystemTime`] as an ISO-8601 UTC string with millisecond
/// precision, e.g. `2026-08-30T12:34:56.789Z`.
pub fn system_time_iso(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a file's modification time and renders it with [`system_time_iso`].
pub fn mtime_iso(path: &Path) -> io::Result<String> {
    let metadata = std::fs::metadata(path)?;
    Ok(system_time_iso(metadata.modified()?))
}
