//! Leaf-level JSON schema validation.
//!
//! Validate a parsed [`serde_json::Value`] against a declarative description
//! of a single primitive shape — one of string/number/integer/boolean/null/any
//! — plus refinement constraints (pattern, named format, numeric range with
//! inclusive/exclusive bounds, string length bounds, enumeration).
//!
//! Design goals:
//! - Validation failures are data ([`ErrorMessage`]), never panics or faults;
//!   a caller gets every violation for a value in one pass.
//! - Schema/constraint mismatches are configuration errors ([`SchemaError`]),
//!   rejected atomically at build time before any validator exists.
//! - Numeric bounds compare with exact decimal semantics, not binary floats,
//!   so boundary cases like `1.10` vs `1.1` behave as authored.
//! - Built schemas and the format registry are immutable and shareable across
//!   threads without synchronization.
//!
//! Composite schemas (objects, arrays, unions) are external collaborators:
//! they call [`SimpleTypeSchema::validate`] per leaf and re-root the returned
//! messages under their own location paths.

pub mod error;
pub mod format;
pub mod message;
pub mod schema;
pub mod simple_type;

pub use error::SchemaError;
pub use format::FormatValidator;
pub use message::ErrorMessage;
pub use schema::{SimpleTypeSchema, SimpleTypeSchemaBuilder};
pub use simple_type::{Scalar, SimpleType};
