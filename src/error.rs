//! Configuration errors raised while building a schema.

use thiserror::Error;

use crate::simple_type::SimpleType;

/// An invalid combination of type and constraint. These are schema-author
/// mistakes: they fail the build step, before a validator exists, and are
/// never reported as per-value validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("regex patterns are only legal for type string, not {simple_type}")]
    PatternNotAllowed { simple_type: SimpleType },

    #[error("pattern '{pattern}' is not a valid regular expression")]
    InvalidPattern { pattern: String },

    #[error("format {format} is not registered")]
    UnknownFormat { format: String },

    #[error("format {format} is not valid for type {simple_type}")]
    IncompatibleFormat {
        format: String,
        simple_type: SimpleType,
    },

    #[error("{field} can only be used for type: string")]
    LengthNotAllowed { field: &'static str },

    #[error("{field} can only be used for integer or number types")]
    RangeNotAllowed { field: &'static str },

    #[error("{field} bound {value} is not a representable decimal")]
    UnrepresentableBound {
        field: &'static str,
        value: String,
    },

    #[error("enumeration not allowed for null or any types")]
    EnumerationNotAllowed { simple_type: SimpleType },

    #[error("enumeration must contain at least one value")]
    EmptyEnumeration,

    #[error("values in enum must be of type {simple_type}")]
    EnumerationTypeMismatch { simple_type: SimpleType },
}
