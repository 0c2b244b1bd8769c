//! Declarative field validation.
//!
//! A [`Schema`] is an ordered list of [`Check`]s, each one `(field, rule,
//! message)`. Every check runs against a JSON object (decoded query string
//! or request body) and every failure is collected; nothing short-circuits
//! inside a schema.
//!
//! ```rust
//! use roster::validate::{Check, Rule, Schema};
//! use serde_json::json;
//!
//! const NAME: Schema = Schema {
//!     optional: &[],
//!     checks: &[Check::new("name", Rule::Length { min: 2, max: 8 }, "bad name")],
//! };
//!
//! let input = json!({ "name": "x" });
//! assert!(NAME.validate(input.as_object().unwrap()).is_err());
//! ```

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// One constraint on a single field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rule {
    /// The textual form of the value is not `""`.
    NotEmpty,
    /// The value is a JSON string.
    IsString,
    /// The textual form is between `min` and `max` characters, inclusive.
    Length { min: usize, max: usize },
}

impl Rule {
    fn passes(self, value: Option<&Value>) -> bool {
        match self {
            Self::IsString => matches!(value, Some(Value::String(_))),
            Self::NotEmpty => text(value).is_some_and(|t| !t.is_empty()),
            Self::Length { min, max } => {
                text(value).is_some_and(|t| (min..=max).contains(&t.chars().count()))
            }
        }
    }
}

/// Scalars read as text the way they would print; absent and `null` read as
/// `""`. Arrays and objects have no textual form.
fn text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value {
        None | Some(Value::Null) => Some(Cow::Borrowed("")),
        Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
        Some(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
        Some(Value::Bool(b)) => Some(Cow::Owned(b.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => None,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Check {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

impl Check {
    pub const fn new(field: &'static str, rule: Rule, message: &'static str) -> Self {
        Self { field, rule, message }
    }
}

/// An ordered set of checks.
///
/// Fields named in `optional` skip all their checks when absent from the
/// input; an empty value still counts as present.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub optional: &'static [&'static str],
    pub checks: &'static [Check],
}

/// A failed check as reported to the client.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Schema {
    /// Runs every check, in order, and returns all violations at once.
    pub fn violations(&self, input: &Map<String, Value>) -> Vec<Violation> {
        self.checks.iter()
            .filter_map(|check| {
                let value = input.get(check.field);
                if value.is_none() && self.optional.contains(&check.field) {
                    return None;
                }
                (!check.rule.passes(value)).then(|| Violation {
                    field: check.field.to_owned(),
                    message: check.message.to_owned(),
                })
            })
            .collect()
    }

    pub fn validate(&self, input: &Map<String, Value>) -> Result<(), ApiError> {
        let violations = self.violations(input);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: Schema = Schema {
        optional: &["nick"],
        checks: &[
            Check::new("name", Rule::NotEmpty, "name empty"),
            Check::new("name", Rule::Length { min: 3, max: 5 }, "name length"),
            Check::new("nick", Rule::IsString, "nick type"),
            Check::new("nick", Rule::Length { min: 2, max: 4 }, "nick length"),
        ],
    };

    fn messages(input: Value) -> Vec<String> {
        let input = input.as_object().cloned().unwrap_or_default();
        SCHEMA.violations(&input).into_iter().map(|v| v.message).collect()
    }

    #[test]
    fn missing_required_field_collects_every_failure() {
        assert_eq!(messages(json!({})), ["name empty", "name length"]);
    }

    #[test]
    fn absent_optional_field_is_skipped() {
        assert!(messages(json!({ "name": "abcd" })).is_empty());
    }

    #[test]
    fn present_but_empty_optional_field_is_checked() {
        assert_eq!(messages(json!({ "name": "abcd", "nick": "" })), ["nick length"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(messages(json!({ "name": "ñandú" })).is_empty());
    }

    #[test]
    fn numbers_are_measured_by_their_text() {
        assert!(messages(json!({ "name": 1234 })).is_empty());
        assert_eq!(messages(json!({ "name": 12 })), ["name length"]);
    }

    #[test]
    fn arrays_fail_type_and_length_checks() {
        assert_eq!(
            messages(json!({ "name": "abcd", "nick": ["ab", "cd"] })),
            ["nick type", "nick length"],
        );
    }

    #[test]
    fn validate_wraps_violations_in_an_api_error() {
        let err = SCHEMA.validate(&Map::new()).unwrap_err();
        match err {
            ApiError::Validation(v) => assert_eq!(v[0].field, "name"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
