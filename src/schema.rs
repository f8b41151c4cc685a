//! The leaf schema: one simple type plus refinement constraints.

use std::cmp::Ordering;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};

use crate::error::SchemaError;
use crate::format::{self, FormatValidator};
use crate::message::ErrorMessage;
use crate::simple_type::{Scalar, SimpleType};

/// A built, immutable leaf validator. Construct through
/// [`SimpleTypeSchemaBuilder`]; validate any number of values, concurrently,
/// with [`validate`](Self::validate).
#[derive(Debug, Clone)]
pub struct SimpleTypeSchema {
    simple_type: SimpleType,
    pattern: Option<AnchoredPattern>,
    format: Option<CheckedFormat>,
    min_length: u32,
    max_length: u32,
    minimum: Option<NumericBound>,
    maximum: Option<NumericBound>,
    enumeration: Option<Vec<Value>>,
}

/// User pattern kept as authored for error messages, matched through an
/// internally anchored compilation (full-string match, both ends).
#[derive(Debug, Clone)]
struct AnchoredPattern {
    source: String,
    anchored: Regex,
}

#[derive(Debug, Clone)]
struct CheckedFormat {
    name: String,
    validator: &'static FormatValidator,
}

#[derive(Debug, Clone)]
struct NumericBound {
    exact: Decimal,
    exclusive: bool,
}

/// Collects constraints for a [`SimpleTypeSchema`]. Setters record values
/// without validating; [`build`](Self::build) checks every cross-field
/// invariant at once, so no call order can observe a partially-invalid
/// schema.
#[derive(Debug, Clone, Default)]
pub struct SimpleTypeSchemaBuilder {
    simple_type: SimpleType,
    pattern: Option<String>,
    format: Option<String>,
    min_length: u32,
    max_length: u32,
    minimum: Option<Number>,
    maximum: Option<Number>,
    exclusive_minimum: Option<bool>,
    exclusive_maximum: Option<bool>,
    enumeration: Option<Vec<Value>>,
}

impl SimpleTypeSchemaBuilder {
    pub fn new(simple_type: SimpleType) -> Self {
        Self {
            simple_type,
            ..Self::default()
        }
    }

    /// Regular expression the rendered value must fully match. Only legal
    /// for string schemas.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Name of a registered format (see [`crate::format`]).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Minimum rendered length in characters; 0 means unset. String only.
    pub fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = min_length;
        self
    }

    /// Maximum rendered length in characters; 0 means unset. String only.
    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    /// Lower numeric bound. Number/integer only.
    pub fn minimum(mut self, minimum: Number) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Upper numeric bound. Number/integer only.
    pub fn maximum(mut self, maximum: Number) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Make the lower bound exclusive. Number/integer only.
    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.exclusive_minimum = Some(exclusive);
        self
    }

    /// Make the upper bound exclusive. Number/integer only.
    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.exclusive_maximum = Some(exclusive);
        self
    }

    /// Closed set of allowed literal values. Forbidden for null/any; every
    /// element must match the schema's type.
    pub fn enumeration(mut self, values: Vec<Value>) -> Self {
        self.enumeration = Some(values);
        self
    }

    /// Check every invariant and build the immutable schema.
    pub fn build(self) -> Result<SimpleTypeSchema, SchemaError> {
        let simple_type = self.simple_type;

        let pattern = match self.pattern {
            None => None,
            Some(source) => {
                if simple_type != SimpleType::String {
                    return Err(SchemaError::PatternNotAllowed { simple_type });
                }
                Some(AnchoredPattern::compile(source)?)
            }
        };

        let format = match self.format {
            None => None,
            Some(name) => {
                let validator = format::lookup(&name).ok_or_else(|| {
                    SchemaError::UnknownFormat {
                        format: name.clone(),
                    }
                })?;
                if !validator.is_compatible_type(simple_type) {
                    return Err(SchemaError::IncompatibleFormat {
                        format: name,
                        simple_type,
                    });
                }
                Some(CheckedFormat { name, validator })
            }
        };

        if simple_type != SimpleType::String {
            if self.min_length > 0 {
                return Err(SchemaError::LengthNotAllowed { field: "minLength" });
            }
            if self.max_length > 0 {
                return Err(SchemaError::LengthNotAllowed { field: "maxLength" });
            }
        }

        let numeric = matches!(simple_type, SimpleType::Number | SimpleType::Integer);
        for (field, set) in [
            ("minimum", self.minimum.is_some()),
            ("maximum", self.maximum.is_some()),
            ("exclusiveMinimum", self.exclusive_minimum.is_some()),
            ("exclusiveMaximum", self.exclusive_maximum.is_some()),
        ] {
            if set && !numeric {
                return Err(SchemaError::RangeNotAllowed { field });
            }
        }
        let minimum = NumericBound::build(
            self.minimum,
            self.exclusive_minimum.unwrap_or(false),
            "minimum",
        )?;
        let maximum = NumericBound::build(
            self.maximum,
            self.exclusive_maximum.unwrap_or(false),
            "maximum",
        )?;

        let enumeration = match self.enumeration {
            None => None,
            Some(values) => {
                if matches!(simple_type, SimpleType::Null | SimpleType::Any) {
                    return Err(SchemaError::EnumerationNotAllowed { simple_type });
                }
                if values.is_empty() {
                    return Err(SchemaError::EmptyEnumeration);
                }
                if values.iter().any(|v| !simple_type.matches(v)) {
                    return Err(SchemaError::EnumerationTypeMismatch { simple_type });
                }
                Some(values)
            }
        };

        Ok(SimpleTypeSchema {
            simple_type,
            pattern,
            format,
            min_length: self.min_length,
            max_length: self.max_length,
            minimum,
            maximum,
            enumeration,
        })
    }
}

impl SimpleTypeSchema {
    pub fn builder(simple_type: SimpleType) -> SimpleTypeSchemaBuilder {
        SimpleTypeSchemaBuilder::new(simple_type)
    }

    /// Validate one JSON value. An empty result means valid.
    ///
    /// A type mismatch short-circuits with exactly one error; otherwise every
    /// applicable constraint reports independently, in the fixed order
    /// pattern → format → range → length → enumeration.
    pub fn validate(&self, value: &Value) -> Vec<ErrorMessage> {
        let mut results = Vec::new();
        if !self.is_acceptable_type(value) {
            results.push(ErrorMessage::new(
                "",
                format!("Invalid type: must be of type {}", self.simple_type),
            ));
            return results;
        }
        self.check_pattern(value, &mut results);
        self.check_format(value, &mut results);
        self.check_range(value, &mut results);
        self.check_length(value, &mut results);
        self.check_enumeration(value, &mut results);
        results
    }

    /// Human-readable name of the expected type.
    pub fn describe(&self) -> &'static str {
        self.simple_type.name()
    }

    /// Type-tag check only. Exposed so a composite validator can pre-dispatch
    /// among candidate leaf schemas, e.g. for a union type.
    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        self.simple_type.matches(value)
    }

    pub fn simple_type(&self) -> SimpleType {
        self.simple_type
    }

    /// The pattern as authored, if any.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.source.as_str())
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_ref().map(|f| f.name.as_str())
    }

    fn check_pattern(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(pattern) = &self.pattern else { return };
        let Some(scalar) = self.simple_type.native_value(value) else {
            return;
        };
        let text = scalar.render();
        if !pattern.anchored.is_match(&text) {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "String value '{text}' does not match regex '{}'",
                    pattern.source
                ),
            ));
        }
    }

    fn check_format(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(format) = &self.format else { return };
        if !format.validator.is_valid(value) {
            let shown = match self.simple_type.native_value(value) {
                Some(scalar) => scalar.render(),
                None => value.to_string(),
            };
            results.push(ErrorMessage::new(
                "",
                format!("Value '{shown}' is not a valid {}", format.name),
            ));
        }
    }

    fn check_range(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        if self.minimum.is_none() && self.maximum.is_none() {
            return;
        }
        let Some(Scalar::Number(number)) = self.simple_type.native_value(value) else {
            return;
        };
        let rendered = number.to_string();

        if let Some(min) = &self.minimum {
            let ord = compare_to_bound(&number, min.exact);
            if min.exclusive && ord != Ordering::Greater {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{rendered}' must be greater than {} when exclusiveMinimum is true",
                        min.exact
                    ),
                ));
            } else if ord == Ordering::Less {
                results.push(ErrorMessage::new(
                    "",
                    format!("Value '{rendered}' must be greater or equal to {}", min.exact),
                ));
            }
        }

        if let Some(max) = &self.maximum {
            let ord = compare_to_bound(&number, max.exact);
            if max.exclusive && ord != Ordering::Less {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{rendered}' must be less than {} when exclusiveMaximum is true",
                        max.exact
                    ),
                ));
            } else if ord == Ordering::Greater {
                results.push(ErrorMessage::new(
                    "",
                    format!(
                        "Value '{rendered}' must be less than or equal to {}",
                        max.exact
                    ),
                ));
            }
        }
    }

    fn check_length(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        if self.min_length == 0 && self.max_length == 0 {
            return;
        }
        let Some(scalar) = self.simple_type.native_value(value) else {
            return;
        };
        let text = scalar.render();
        let length = text.chars().count() as u32;
        if self.min_length > 0 && length < self.min_length {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Value '{text}' must be greater or equal to {} characters",
                    self.min_length
                ),
            ));
        }
        if self.max_length > 0 && length > self.max_length {
            results.push(ErrorMessage::new(
                "",
                format!(
                    "Value '{text}' must be less or equal to {} characters",
                    self.max_length
                ),
            ));
        }
    }

    fn check_enumeration(&self, value: &Value, results: &mut Vec<ErrorMessage>) {
        let Some(allowed) = &self.enumeration else { return };
        if !allowed.contains(value) {
            let listed = allowed
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            results.push(ErrorMessage::new(
                "",
                format!("Value {value} must be one of: [{listed}]"),
            ));
        }
    }
}

impl AnchoredPattern {
    fn compile(source: String) -> Result<Self, SchemaError> {
        // Compile the source first so the author's syntax error surfaces
        // unwrapped; the anchoring wrapper cannot fail on a valid source.
        if Regex::new(&source).is_err() {
            return Err(SchemaError::InvalidPattern { pattern: source });
        }
        let anchored = Regex::new(&format!("^(?:{source})$"))
            .map_err(|_| SchemaError::InvalidPattern {
                pattern: source.clone(),
            })?;
        Ok(Self { source, anchored })
    }
}

impl NumericBound {
    fn build(
        literal: Option<Number>,
        exclusive: bool,
        field: &'static str,
    ) -> Result<Option<Self>, SchemaError> {
        let Some(literal) = literal else { return Ok(None) };
        let exact =
            parse_decimal(&literal).ok_or_else(|| SchemaError::UnrepresentableBound {
                field,
                value: literal.to_string(),
            })?;
        Ok(Some(Self { exact, exclusive }))
    }
}

/// Exact decimal from a JSON number's string rendering. `None` for values
/// outside `Decimal`'s range (e.g. 1e300).
fn parse_decimal(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

fn compare_to_bound(number: &Number, bound: Decimal) -> Ordering {
    if let Some(exact) = parse_decimal(number) {
        return exact.cmp(&bound);
    }
    // Value exceeds Decimal's representable range; compare as floats.
    let approx = number.as_f64().unwrap_or(f64::NAN);
    approx
        .partial_cmp(&bound.to_f64().unwrap_or(f64::NAN))
        .unwrap_or(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(schema: &SimpleTypeSchema, value: &Value) -> Vec<String> {
        schema
            .validate(value)
            .iter()
            .map(|m| m.message().to_string())
            .collect()
    }

    #[test]
    fn bare_type_schema_accepts_matching_values() {
        let schema = SimpleTypeSchema::builder(SimpleType::String).build().unwrap();
        assert!(schema.validate(&json!("anything")).is_empty());
        assert_eq!(schema.describe(), "string");
        assert!(schema.is_acceptable_type(&json!("x")));
        assert!(!schema.is_acceptable_type(&json!(1)));
    }

    #[test]
    fn type_mismatch_short_circuits_with_one_error() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("a+")
            .min_length(10)
            .build()
            .unwrap();
        // The number would also fail pattern and length; only the type error
        // may be reported.
        let errors = schema.validate(&json!(42));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location(), "");
        assert_eq!(errors[0].message(), "Invalid type: must be of type string");
    }

    #[test]
    fn pattern_requires_full_string_match() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("[0-9]{3}")
            .build()
            .unwrap();
        assert!(schema.validate(&json!("123")).is_empty());
        // Substring hits are not enough; the match is anchored at both ends.
        assert_eq!(
            messages(&schema, &json!("x123y")),
            vec!["String value 'x123y' does not match regex '[0-9]{3}'"]
        );
    }

    #[test]
    fn format_failures_name_value_and_format() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .format("date")
            .build()
            .unwrap();
        assert!(schema.validate(&json!("2021-02-03")).is_empty());
        assert_eq!(
            messages(&schema, &json!("2021-02-30")),
            vec!["Value '2021-02-30' is not a valid date"]
        );
    }

    #[test]
    fn range_bounds_compare_as_exact_decimals() {
        let schema = SimpleTypeSchema::builder(SimpleType::Number)
            .minimum(Number::from_f64(1.1).unwrap())
            .build()
            .unwrap();
        // Decimal-equal at the boundary, not a float-representation miss.
        assert!(schema.validate(&json!(1.10)).is_empty());
        assert!(schema.validate(&json!(1.1)).is_empty());
        assert_eq!(
            messages(&schema, &json!(1.09)),
            vec!["Value '1.09' must be greater or equal to 1.1"]
        );
    }

    #[test]
    fn exclusive_minimum_rejects_the_boundary() {
        let schema = SimpleTypeSchema::builder(SimpleType::Number)
            .minimum(Number::from_f64(1.1).unwrap())
            .exclusive_minimum(true)
            .build()
            .unwrap();
        assert_eq!(
            messages(&schema, &json!(1.1)),
            vec!["Value '1.1' must be greater than 1.1 when exclusiveMinimum is true"]
        );
        assert!(schema.validate(&json!(1.100001)).is_empty());
    }

    #[test]
    fn exclusive_maximum_rejects_boundary_and_above() {
        let schema = SimpleTypeSchema::builder(SimpleType::Integer)
            .maximum(Number::from(10))
            .exclusive_maximum(true)
            .build()
            .unwrap();
        assert!(schema.validate(&json!(9)).is_empty());
        assert_eq!(
            messages(&schema, &json!(10)),
            vec!["Value '10' must be less than 10 when exclusiveMaximum is true"]
        );
        assert_eq!(
            messages(&schema, &json!(11)),
            vec!["Value '11' must be less than 10 when exclusiveMaximum is true"]
        );
    }

    #[test]
    fn inclusive_maximum_message() {
        let schema = SimpleTypeSchema::builder(SimpleType::Integer)
            .maximum(Number::from(10))
            .build()
            .unwrap();
        assert!(schema.validate(&json!(10)).is_empty());
        assert_eq!(
            messages(&schema, &json!(11)),
            vec!["Value '11' must be less than or equal to 10"]
        );
    }

    #[test]
    fn huge_numbers_fall_back_to_float_comparison() {
        let schema = SimpleTypeSchema::builder(SimpleType::Number)
            .minimum(Number::from(0))
            .maximum(Number::from(1000))
            .build()
            .unwrap();
        // 1e300 has no Decimal form; it must still order above the maximum.
        let errors = schema.validate(&json!(1e300));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("must be less than or equal to"));
    }

    #[test]
    fn length_bounds_are_character_counts() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .min_length(3)
            .max_length(3)
            .build()
            .unwrap();
        assert!(schema.validate(&json!("abc")).is_empty());
        assert_eq!(
            messages(&schema, &json!("ab")),
            vec!["Value 'ab' must be greater or equal to 3 characters"]
        );
        assert_eq!(
            messages(&schema, &json!("abcd")),
            vec!["Value 'abcd' must be less or equal to 3 characters"]
        );
        // Characters, not bytes.
        assert!(schema.validate(&json!("äöü")).is_empty());
    }

    #[test]
    fn enumeration_lists_the_allowed_set() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .enumeration(vec![json!("a"), json!("b")])
            .build()
            .unwrap();
        assert!(schema.validate(&json!("a")).is_empty());
        assert_eq!(
            messages(&schema, &json!("c")),
            vec![r#"Value "c" must be one of: ["a", "b"]"#]
        );
    }

    #[test]
    fn failing_checks_report_in_fixed_order() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("a+")
            .format("date")
            .min_length(20)
            .enumeration(vec![json!("zzz")])
            .build()
            .unwrap();
        let errors = messages(&schema, &json!("bcd"));
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("does not match regex"));
        assert!(errors[1].contains("is not a valid date"));
        assert!(errors[2].contains("greater or equal to 20 characters"));
        assert!(errors[3].contains("must be one of"));
    }

    #[test]
    fn validate_is_idempotent() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("[a-z]+")
            .build()
            .unwrap();
        let value = json!("NOPE");
        assert_eq!(schema.validate(&value), schema.validate(&value));
    }

    // ---- construction-time rejections ----

    #[test]
    fn pattern_rejected_for_non_string_types() {
        let err = SimpleTypeSchema::builder(SimpleType::Integer)
            .pattern("a+")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::PatternNotAllowed {
                simple_type: SimpleType::Integer
            }
        );
    }

    #[test]
    fn malformed_pattern_rejected() {
        let err = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("[unclosed")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn unknown_and_incompatible_formats_rejected() {
        let err = SimpleTypeSchema::builder(SimpleType::String)
            .format("no-such-format")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownFormat { .. }));

        let err = SimpleTypeSchema::builder(SimpleType::String)
            .format("utc-millisec")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::IncompatibleFormat {
                format: "utc-millisec".into(),
                simple_type: SimpleType::String
            }
        );

        let err = SimpleTypeSchema::builder(SimpleType::Integer)
            .format("date")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::IncompatibleFormat { .. }));
    }

    #[test]
    fn length_rejected_for_non_string_types() {
        let err = SimpleTypeSchema::builder(SimpleType::Number)
            .min_length(1)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::LengthNotAllowed { field: "minLength" });

        let err = SimpleTypeSchema::builder(SimpleType::Boolean)
            .max_length(4)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::LengthNotAllowed { field: "maxLength" });

        // 0 means unset and is fine on any type.
        assert!(SimpleTypeSchema::builder(SimpleType::Number)
            .min_length(0)
            .build()
            .is_ok());
    }

    #[test]
    fn range_rejected_for_non_numeric_types() {
        let err = SimpleTypeSchema::builder(SimpleType::String)
            .minimum(Number::from(1))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::RangeNotAllowed { field: "minimum" });

        // The exclusivity flags alone are already a range constraint.
        let err = SimpleTypeSchema::builder(SimpleType::String)
            .exclusive_maximum(true)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RangeNotAllowed {
                field: "exclusiveMaximum"
            }
        );
    }

    #[test]
    fn enumeration_rejected_for_null_any_and_wrong_element_types() {
        let err = SimpleTypeSchema::builder(SimpleType::Null)
            .enumeration(vec![json!(null)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::EnumerationNotAllowed {
                simple_type: SimpleType::Null
            }
        );

        let err = SimpleTypeSchema::builder(SimpleType::Any)
            .enumeration(vec![json!("a")])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EnumerationNotAllowed { .. }));

        let err = SimpleTypeSchema::builder(SimpleType::String)
            .enumeration(vec![json!("a"), json!(1)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::EnumerationTypeMismatch {
                simple_type: SimpleType::String
            }
        );

        let err = SimpleTypeSchema::builder(SimpleType::String)
            .enumeration(vec![])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyEnumeration);
    }

    #[test]
    fn integer_schema_rejects_fractional_numbers() {
        let schema = SimpleTypeSchema::builder(SimpleType::Integer).build().unwrap();
        assert!(schema.validate(&json!(5)).is_empty());
        assert_eq!(
            messages(&schema, &json!(5.5)),
            vec!["Invalid type: must be of type integer"]
        );
    }

    #[test]
    fn accessors_reflect_built_constraints() {
        let schema = SimpleTypeSchema::builder(SimpleType::String)
            .pattern("[a-z]+")
            .format("uri")
            .build()
            .unwrap();
        assert_eq!(schema.simple_type(), SimpleType::String);
        assert_eq!(schema.pattern(), Some("[a-z]+"));
        assert_eq!(schema.format(), Some("uri"));
    }
}
