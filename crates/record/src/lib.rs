//! Strata record types
//!
//! Bridges the schema engine and the ingestion pipeline: a resolved value
//! tree from `strata-schema` compiles into a [`RecordType`] - an ordered
//! list of field descriptors carrying decode directives (timestamp codecs,
//! indicator tags, required flags) - and one generic interpreter decodes
//! JSON log lines against it. No per-schema code generation, no compile
//! step at ingest time.
//!
//! A typical caller resolves and compiles once per schema, then reuses the
//! descriptor for the lifetime of the process:
//!
//! ```
//! use strata_record::compile;
//! use strata_schema::{FieldSchema, ValueSchema};
//!
//! let schema = ValueSchema::object(vec![
//!     FieldSchema::new("ts", ValueSchema::event_timestamp("unix_ms")).required(),
//!     FieldSchema::new("message", ValueSchema::string()),
//! ]);
//! let record_type = compile(&schema).unwrap();
//! let record = record_type
//!     .decode(&serde_json::json!({"ts": 1700000000000i64, "message": "hi"}))
//!     .unwrap();
//! assert!(record.event_time().is_some());
//! ```

mod compile;
mod decode;
mod error;

pub use compile::{compile, FieldDescriptor, RecordType, TimeCodec, ValueKind};
pub use decode::{FieldValue, Record};
pub use error::{CompileError, DecodeError};

// Test modules - only compiled during testing
#[cfg(test)]
mod compile_test;
