//! Before/after-compilation import diffing.

use std::collections::HashSet;

use loam_common::mtime_iso;

use crate::extract::{extract_imports, ScanOptions};
use crate::record::ImportRecord;
use crate::resolve::Resolver;

/// The import lists surrounding one compilation.
///
/// `before` entries that are absent from `after` are the dependencies whose
/// staleness cannot be detected by watching the compiled output; they carry
/// resolution and modification-time data.
#[derive(Debug, Clone)]
pub struct ImportDiff {
    /// Imports observed in the source before compilation, with disappeared
    /// entries enriched.
    pub before: Vec<ImportRecord>,
    /// Imports still observed in the compiled text.
    pub after: Vec<ImportRecord>,
}

/// Recomputes imports on the compiled text and enriches every `before`
/// import that no longer appears, by exact specifier match.
///
/// Each disappeared import is resolved as a declaration file first, then as
/// a plain module path; whichever succeeds contributes the resolved path and
/// that file's modification timestamp. Failures are recorded per attempt,
/// never raised.
pub fn diff_imports(
    before: Vec<ImportRecord>,
    compiled_text: &str,
    options: &ScanOptions,
    resolver: &Resolver,
) -> ImportDiff {
    let after = extract_imports(compiled_text, options);
    let surviving: HashSet<&str> = after.iter().map(|r| r.specifier.as_str()).collect();

    let before = before
        .into_iter()
        .map(|record| {
            if surviving.contains(record.specifier.as_str()) {
                record
            } else {
                enrich_disappeared(record, resolver)
            }
        })
        .collect();

    ImportDiff { before, after }
}

fn enrich_disappeared(mut record: ImportRecord, resolver: &Resolver) -> ImportRecord {
    let resolved = match resolver.resolve_declaration(&record.specifier) {
        Ok(path) => {
            record.declaration_only = true;
            Some(path)
        }
        Err(declaration_err) => {
            record.resolve_error_declaration = Some(declaration_err);
            match resolver.resolve_plain(&record.specifier) {
                Ok(path) => Some(path),
                Err(plain_err) => {
                    record.resolve_error_plain = Some(plain_err);
                    None
                }
            }
        }
    };

    if let Some(path) = resolved {
        match mtime_iso(&path) {
            Ok(iso) => record.mtime_iso = Some(iso),
            Err(e) => record.stat_error = Some(e.to_string()),
        }
        record.resolved_path = Some(path);
    }

    record
}
