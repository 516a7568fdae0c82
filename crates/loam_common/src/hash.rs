//! Structural hashing for cache key derivation.
//!
//! Produces a short, stable hex digest from arbitrary structured values.
//! The digest is order-independent for maps (keys are sorted before folding),
//! folds in a type tag so scalars of different types never collide on their
//! textual form, and tolerates cyclic values and failing scalar coercions.
//!
//! This is a locality/dedup key for cache file names, not a cryptographic
//! hash; it must only be fast, deterministic across process restarts, and
//! collision-resistant enough for filenames.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// A shared, possibly self-referential node in a hashable value graph.
pub type SharedValue = Rc<RefCell<Value>>;

/// A custom scalar coercion attached to an object value.
///
/// Invoked after the object's entries have been folded; the returned string
/// is folded into the hash. A failing coercion is folded as a sentinel
/// instead of propagating.
pub type Coercion = Rc<dyn Fn() -> Result<String, String>>;

/// A hashable value.
///
/// Composite variants hold [`SharedValue`] children so that shared and
/// cyclic structures are representable; revisited composites fold a cycle
/// sentinel instead of recursing.
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list; folded with lexicographically sorted index keys so
    /// it hashes like a map keyed by index.
    List(Vec<SharedValue>),
    /// A keyed map, optionally carrying a custom scalar coercion.
    Object {
        /// Key/value entries in any insertion order.
        entries: Vec<(String, SharedValue)>,
        /// Optional scalar coercion folded after the entries.
        coerce: Option<Coercion>,
    },
}

impl Value {
    /// Wraps this value in a shared node.
    pub fn shared(self) -> SharedValue {
        Rc::new(RefCell::new(self))
    }

    /// Convenience constructor for a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Convenience constructor for an object without a coercion.
    pub fn object(entries: Vec<(String, SharedValue)>) -> Self {
        Value::Object {
            entries,
            coerce: None,
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Object { .. })
    }

    /// Type tag in `[object T]` form, folded before the value body.
    fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "[object Null]",
            Value::Bool(_) => "[object Boolean]",
            Value::Int(_) | Value::Float(_) => "[object Number]",
            Value::Str(_) => "[object String]",
            Value::List(_) => "[object Array]",
            Value::Object { .. } => "[object Object]",
        }
    }

    /// Coarse type name, folded after the tag.
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) | Value::Object { .. } => "object",
        }
    }
}

/// Computes the structural hash of a value graph.
///
/// The result is lowercase hex, zero-padded to at least 8 characters.
/// Structurally equal values hash identically regardless of map insertion
/// order; cyclic values terminate.
pub fn hash_sum(value: &SharedValue) -> String {
    let mut seen = Vec::new();
    let h = fold_shared(0, value, "", &mut seen);
    format!("{h:08x}")
}

/// Derives a cache key from a file path.
///
/// Hashes the path's string form; the same absolute path always yields the
/// same key.
pub fn hash_path(path: &Path) -> String {
    hash_sum(&Value::str(path.to_string_lossy()).shared())
}

/// Rolling text fold over a 32-bit signed accumulator.
///
/// Per UTF-16 code unit: `h = (h << 5) - h + unit`, wrapping. A negative
/// accumulator leaves the fold as sign-flip-and-double, widened to 64 bits
/// so the magnitude survives until the next fold truncates back down.
fn fold(hash: i64, text: &str) -> i64 {
    if text.is_empty() {
        return hash;
    }
    let mut h = hash as i32;
    for unit in text.encode_utf16() {
        h = h
            .wrapping_shl(5)
            .wrapping_sub(h)
            .wrapping_add(i32::from(unit));
    }
    if h < 0 {
        i64::from(h) * -2
    } else {
        i64::from(h)
    }
}

fn fold_shared(input: i64, value: &SharedValue, key: &str, seen: &mut Vec<*mut Value>) -> i64 {
    let node = value.borrow();
    let hash = fold(
        fold(fold(input, key), node.type_tag()),
        node.type_name(),
    );

    if !node.is_composite() {
        return fold_scalar(hash, &node);
    }

    let ptr = value.as_ptr();
    if seen.contains(&ptr) {
        return fold(hash, &format!("[Circular]{key}"));
    }
    seen.push(ptr);

    match &*node {
        Value::List(items) => {
            let mut keyed: Vec<(String, &SharedValue)> = items
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            keyed
                .into_iter()
                .fold(hash, |h, (k, item)| fold_shared(h, item, &k, seen))
        }
        Value::Object { entries, coerce } => {
            let mut sorted: Vec<&(String, SharedValue)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            let obj_hash = sorted
                .into_iter()
                .fold(hash, |h, (k, v)| fold_shared(h, v, k, seen));
            match coerce {
                None => obj_hash,
                Some(f) => match f() {
                    Ok(s) => fold(obj_hash, &s),
                    Err(msg) => fold(obj_hash, &format!("[coerce exception]{msg}")),
                },
            }
        }
        _ => unreachable!("is_composite covers exactly the composite variants"),
    }
}

fn fold_scalar(hash: i64, value: &Value) -> i64 {
    match value {
        Value::Null => fold(hash, "null"),
        Value::Bool(b) => fold(hash, if *b { "true" } else { "false" }),
        Value::Int(i) => fold(hash, &i.to_string()),
        Value::Float(f) => fold(hash, &f.to_string()),
        Value::Str(s) => fold(hash, s),
        Value::List(_) | Value::Object { .. } => {
            unreachable!("composites are folded by fold_shared")
        }
    }
}
