//! Strata schema engine
//!
//! Operators declare ingestion formats for arbitrary log sources as schema
//! documents (field names, types, decode hints) instead of hand-writing
//! parsers. This crate turns such a declaration into a validated,
//! self-contained value tree and provides the operations built on top of
//! it:
//!
//! - [`validate_schema`] - check a raw document against the published
//!   structural contract before anything else runs
//! - [`resolve`] - expand named type references into a reference-free tree,
//!   with cycle detection and a nesting-depth cap
//! - [`merge`] - compute the least-permissive common supertype of two
//!   resolved trees
//! - [`infer_json`] / [`infer_samples`] - bootstrap a schema from decoded
//!   sample values
//! - [`diff`] / [`diff_walk`] - compute a classified list of structural
//!   changes between two versions
//! - [`check_schema_change`] - gate an update on backward compatibility
//!
//! # Design principles
//!
//! - **Pure transformations**: no I/O, no shared mutable state; every
//!   operation maps input trees to a new output value
//! - **Immutable after construction**: resolved trees are safe to share
//!   across any number of concurrent decode operations
//! - **Errors as values**: validation and resolution failures carry
//!   structured, multi-problem reports; only the merge-on-unresolved-tree
//!   precondition panics

mod compat;
mod diff;
mod error;
mod infer;
mod merge;
mod resolve;
mod validate;
mod value;

pub use compat::{check_changelog, check_schema_change, is_backward_compatible, CompatError};
pub use diff::{diff, diff_walk, field_pairs, Change, ChangeKind, ChangePayload, FieldPair};
pub use error::{Problem, Result, SchemaError};
pub use infer::{infer_json, infer_samples};
pub use merge::merge;
pub use resolve::{resolve, MAX_DEPTH};
pub use validate::validate_schema;
pub use value::{
    time_format, CsvParser, FastMatchParser, FieldSchema, NativeParser, Parser, RegexParser,
    Schema, ValueSchema, ValueType,
};

#[cfg(test)]
mod resolve_test;
#[cfg(test)]
mod validate_test;
