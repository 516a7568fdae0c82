//! Shared foundational types for the loam transpilation cache.
//!
//! This crate provides the structural hash used to derive cache keys from
//! file paths and the ISO-8601 timestamp rendering used for modification-time
//! comparison throughout the cache.

#![warn(missing_docs)]

pub mod hash;
pub mod timestamp;

pub use hash::{hash_path, hash_sum, Coercion, SharedValue, Value};
pub use timestamp::{mtime_iso, system_time_iso};
