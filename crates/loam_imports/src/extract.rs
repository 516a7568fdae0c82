//! Bounded-prefix static import extraction.
//!
//! Scans the leading portion of a source text for import declarations:
//! `import ... from '<spec>'`, bare `import '<spec>'`,
//! `export ... from '<spec>'`, and `require('<spec>')` call forms.
//!
//! Scanning a bounded prefix rather than the whole file is a deliberate
//! speed/completeness trade-off: import statements cluster at the top of a
//! file. The bound limits where a declaration may *begin*; a declaration
//! that starts before the bound is captured whole. Top-level string
//! literals and comments are skipped, so quoted or commented-out
//! declaration text is not recorded. This is a textual heuristic, not a
//! parser.

use crate::record::ImportRecord;

/// Options controlling import extraction.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum number of characters in which a new import declaration may
    /// begin. Zero disables extraction entirely.
    pub scan_limit: usize,

    /// Specifier prefix marking host built-in modules; matching specifiers
    /// are excluded from the result.
    pub builtin_prefix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scan_limit: 5000,
            builtin_prefix: "node:".to_string(),
        }
    }
}

/// Extracts the statically declared import targets from a source prefix.
///
/// Records appear in source order and carry only their specifier; see
/// [`crate::diff_imports`] for enrichment. Specifiers starting with the
/// configured builtin prefix are excluded.
pub fn extract_imports(source: &str, options: &ScanOptions) -> Vec<ImportRecord> {
    if options.scan_limit == 0 {
        return Vec::new();
    }

    let bound = source
        .char_indices()
        .nth(options.scan_limit)
        .map_or(source.len(), |(i, _)| i);

    let bytes = source.as_bytes();
    let mut records = Vec::new();
    let mut i = 0;

    while i < bound {
        let b = bytes[i];
        if b == b'\'' || b == b'"' || b == b'`' {
            // A string literal outside any declaration; its content must
            // not be scanned.
            let (_, after) = read_quoted(source, i);
            i = after;
        } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            i = skip_line_comment(bytes, i + 2);
        } else if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = skip_block_comment(bytes, i + 2);
        } else if keyword_at(bytes, i, "import") {
            let (spec, next) = scan_declaration(source, i + "import".len(), false);
            push_record(&mut records, spec, options);
            i = next;
        } else if keyword_at(bytes, i, "export") {
            let (spec, next) = scan_declaration(source, i + "export".len(), true);
            push_record(&mut records, spec, options);
            i = next;
        } else if keyword_at(bytes, i, "require") {
            let (spec, next) = scan_require(source, i + "require".len());
            push_record(&mut records, spec, options);
            i = next;
        } else {
            i += 1;
        }
    }

    records
}

fn push_record(records: &mut Vec<ImportRecord>, spec: Option<&str>, options: &ScanOptions) {
    if let Some(spec) = spec {
        let is_builtin =
            !options.builtin_prefix.is_empty() && spec.starts_with(&options.builtin_prefix);
        if !is_builtin {
            records.push(ImportRecord::new(spec));
        }
    }
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < bytes.len() && bytes[j] != b'\n' {
        j += 1;
    }
    j
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 2;
        }
        j += 1;
    }
    bytes.len()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `kw` occurs at byte offset `i` with identifier boundaries on
/// both sides.
fn keyword_at(bytes: &[u8], i: usize, kw: &str) -> bool {
    let k = kw.as_bytes();
    if i + k.len() > bytes.len() || &bytes[i..i + k.len()] != k {
        return false;
    }
    if i > 0 && is_ident_byte(bytes[i - 1]) {
        return false;
    }
    if i + k.len() < bytes.len() && is_ident_byte(bytes[i + k.len()]) {
        return false;
    }
    true
}

/// Scans an `import`/`export` declaration body for its quoted specifier.
///
/// For `export`, a `from` keyword must precede the specifier so that
/// `export const s = '...';` is not misread as a module reference. Returns
/// the specifier slice (if any) and the offset to resume scanning at.
fn scan_declaration(source: &str, start: usize, require_from: bool) -> (Option<&str>, usize) {
    let bytes = source.as_bytes();
    let mut seen_from = !require_from;
    let mut j = start;

    while j < bytes.len() {
        match bytes[j] {
            b';' => return (None, j + 1),
            b'\'' | b'"' => {
                let (literal, after) = read_quoted(source, j);
                if seen_from {
                    return (literal, after);
                }
                // String literal before `from`: part of an exported value,
                // not a module reference.
                j = after;
            }
            b'f' if keyword_at(bytes, j, "from") => {
                seen_from = true;
                j += "from".len();
            }
            _ => j += 1,
        }
    }

    (None, bytes.len())
}

/// Scans a `require(...)` call head for its quoted specifier.
fn scan_require(source: &str, start: usize) -> (Option<&str>, usize) {
    let bytes = source.as_bytes();
    let mut j = start;

    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if j >= bytes.len() || bytes[j] != b'(' {
        return (None, start);
    }
    j += 1;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if j < bytes.len() && (bytes[j] == b'\'' || bytes[j] == b'"') {
        let (literal, after) = read_quoted(source, j);
        return (literal, after);
    }

    (None, j)
}

/// Reads a quoted literal starting at the opening quote; returns the inner
/// slice and the offset just past the closing quote.
fn read_quoted(source: &str, open: usize) -> (Option<&str>, usize) {
    let bytes = source.as_bytes();
    let quote = bytes[open];
    let content_start = open + 1;
    let mut k = content_start;
    while k < bytes.len() && bytes[k] != quote {
        k += 1;
    }
    if k >= bytes.len() {
        // Unterminated literal; nothing usable.
        return (None, bytes.len());
    }
    (Some(&source[content_start..k]), k + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(source: &str, options: &ScanOptions) -> Vec<String> {
        extract_imports(source, options)
            .into_iter()
            .map(|r| r.specifier)
            .collect()
    }

    #[test]
    fn named_and_type_imports() {
        let source = "import {A} from './x'; import type {B} from './y';";
        assert_eq!(
            specs(source, &ScanOptions::default()),
            vec!["./x", "./y"]
        );
    }

    #[test]
    fn side_effect_and_default_imports() {
        let source = "import './polyfill';\nimport lib from \"some-lib\";\n";
        assert_eq!(
            specs(source, &ScanOptions::default()),
            vec!["./polyfill", "some-lib"]
        );
    }

    #[test]
    fn export_from() {
        let source = "export { helper } from './util';\nexport const s = './not-a-module';\n";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./util"]);
    }

    #[test]
    fn require_calls() {
        let source = "const a = require('./a');\nconst b = require( \"b-pkg\" );\n";
        assert_eq!(
            specs(source, &ScanOptions::default()),
            vec!["./a", "b-pkg"]
        );
    }

    #[test]
    fn import_equals_require() {
        let source = "import fs = require('./shim');";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./shim"]);
    }

    #[test]
    fn builtins_excluded() {
        let source = "import path from 'node:path'; import {A} from './a';";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./a"]);
    }

    #[test]
    fn multiline_import_clause() {
        let source = "import {\n  A,\n  B,\n} from './wide';";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./wide"]);
    }

    #[test]
    fn zero_limit_disables_extraction() {
        let options = ScanOptions {
            scan_limit: 0,
            ..ScanOptions::default()
        };
        assert!(specs("import {A} from './x';", &options).is_empty());
    }

    #[test]
    fn late_import_beyond_bound_is_skipped() {
        let mut source = String::new();
        source.push_str("import {A} from './early';\n");
        source.push_str(&"// padding\n".repeat(100));
        source.push_str("import {Z} from './late';\n");

        let options = ScanOptions {
            scan_limit: 50,
            ..ScanOptions::default()
        };
        assert_eq!(specs(&source, &options), vec!["./early"]);
    }

    #[test]
    fn statement_straddling_bound_is_captured_whole() {
        // Declaration begins inside the bound, specifier lies beyond it.
        let source = "import {AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA} from './straddle';";
        let options = ScanOptions {
            scan_limit: 10,
            ..ScanOptions::default()
        };
        assert_eq!(specs(source, &options), vec!["./straddle"]);
    }

    #[test]
    fn identifier_containing_keyword_is_not_matched() {
        let source = "const reimport = 1; const requires = [];";
        assert!(specs(source, &ScanOptions::default()).is_empty());
    }

    #[test]
    fn quoted_declaration_text_is_ignored() {
        let source = "const s = \"import x from './a'\";\nimport {B} from './b';";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./b"]);
    }

    #[test]
    fn commented_out_declarations_are_ignored() {
        let source = "// require('./old')\n/* import {A} from './gone'; */\nrequire('./live');";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./live"]);
    }

    #[test]
    fn template_literal_content_is_ignored() {
        let source = "const t = `require('./tpl')`;\nimport './real';";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./real"]);
    }

    #[test]
    fn duplicates_preserved_in_order() {
        let source = "import {A} from './x'; import {B} from './x';";
        assert_eq!(specs(source, &ScanOptions::default()), vec!["./x", "./x"]);
    }
}
