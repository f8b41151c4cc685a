//! Named semantic formats and the process-wide format registry.
//!
//! A format is a pair of predicates: which simple types it may refine, and
//! whether a candidate value conforms. The registry maps format names to
//! their validators; it is built once, before any schema is constructed, and
//! never mutated afterward, so lookups need no synchronization. New formats
//! are added to the builtin table; existing entries keep their semantics.

use chrono::{DateTime, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::simple_type::SimpleType;

/// One registered format.
#[derive(Debug, Clone, Copy)]
pub struct FormatValidator {
    compatible: &'static [SimpleType],
    check: fn(&Value) -> bool,
}

impl FormatValidator {
    /// May this format refine a schema of the given type?
    pub fn is_compatible_type(&self, simple_type: SimpleType) -> bool {
        self.compatible.contains(&simple_type)
    }

    /// Does `value` conform? Callers gate on the schema's type match first,
    /// so the value is already of a compatible kind.
    pub fn is_valid(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

/// Look up a registered format by name. O(1).
pub fn lookup(name: &str) -> Option<&'static FormatValidator> {
    REGISTRY.get(name)
}

/// All registered format names, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

const STRING_ONLY: &[SimpleType] = &[SimpleType::String];
const NUMERIC: &[SimpleType] = &[SimpleType::Number, SimpleType::Integer];

static REGISTRY: Lazy<IndexMap<&'static str, FormatValidator>> = Lazy::new(|| {
    IndexMap::from([
        (
            "date-time",
            FormatValidator { compatible: STRING_ONLY, check: is_date_time },
        ),
        (
            "date",
            FormatValidator { compatible: STRING_ONLY, check: is_date },
        ),
        (
            "time",
            FormatValidator { compatible: STRING_ONLY, check: is_time },
        ),
        (
            "utc-millisec",
            FormatValidator { compatible: NUMERIC, check: always_valid },
        ),
        (
            "regex",
            FormatValidator { compatible: STRING_ONLY, check: is_regex },
        ),
        (
            "uri",
            FormatValidator { compatible: STRING_ONLY, check: is_uri },
        ),
    ])
});

fn text_of(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

/// Strict combined date+time+offset (RFC 3339); any parse failure is invalid.
fn is_date_time(value: &Value) -> bool {
    DateTime::parse_from_rfc3339(text_of(value)).is_ok()
}

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape regex"));
static TIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").expect("time shape regex"));

/// Strict `YYYY-MM-DD`. The shape regex rejects unpadded components and
/// trailing content (chrono would accept `2021-1-5`); the chrono parse then
/// rejects calendar-invalid dates like `2021-02-30`.
fn is_date(value: &Value) -> bool {
    let text = text_of(value);
    DATE_SHAPE.is_match(text) && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Strict `HH:MM:SS`, full-string match required.
fn is_time(value: &Value) -> bool {
    let text = text_of(value);
    TIME_SHAPE.is_match(text) && NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok()
}

fn always_valid(_value: &Value) -> bool {
    true
}

/// Valid iff the string compiles under this engine's regex syntax.
fn is_regex(value: &Value) -> bool {
    Regex::new(text_of(value)).is_ok()
}

static URI_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("relative-ref:/").expect("uri reference base"));

/// Syntactically well-formed URI reference. Relative references are resolved
/// against a fixed base so they count as well-formed too.
fn is_uri(value: &Value) -> bool {
    let text = text_of(value);
    match Url::parse(text) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => URI_BASE.join(text).is_ok(),
        Err(_) => false,
    }
}
