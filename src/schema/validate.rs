//! Field-level checks for JSON crossing the network boundary.
//!
//! Every check records a [`Violation`] instead of bailing out, so a single
//! pass reports all the fields that are wrong. [`Fields`] covers the shape
//! of a value (presence, JSON type, identifiers, timestamps); content rules
//! are declared on the types with `validator` and folded in by [`check_at`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Rule a field failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The field is absent or `null`.
    Required,
    /// The field has the wrong JSON type.
    Type(&'static str),
    /// The string is empty.
    NonEmpty,
    /// The string is not a UUID.
    Identifier,
    /// The string is not an RFC 3339 timestamp with an offset.
    Timestamp,
    /// The value is earlier than the named sibling field.
    NotBefore(&'static str),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::Type(expected) => write!(f, "must be {expected}"),
            Self::NonEmpty => f.write_str("must not be empty"),
            Self::Identifier => f.write_str("must be a well-formed identifier"),
            Self::Timestamp => f.write_str("must be a well-formed timestamp"),
            Self::NotBefore(other) => write!(f, "must not be earlier than {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

/// Validation failure listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaError {
    #[must_use]
    pub fn single(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            violations: vec![Violation {
                field: field.into(),
                rule,
            }],
        }
    }

    /// Whether `field` failed `rule`.
    #[must_use]
    pub fn has(&self, field: &str, rule: &Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && &v.rule == rule)
    }
}

/// Types that can be built from an untrusted JSON value.
pub trait FromJson: Sized {
    /// Checks `value` and builds `Self`, reporting field paths relative to `path`.
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self>;

    /// # Errors
    ///
    /// Returns every violation found in `value`.
    fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let mut violations = Vec::new();
        match Self::from_json_at(value, "", &mut violations) {
            Some(parsed) if violations.is_empty() => Ok(parsed),
            _ => Err(SchemaError { violations }),
        }
    }
}

/// Records a violation for every declared rule `value` breaks.
///
/// Every rule declared in this crate is `length(min = 1)`.
pub(crate) fn check_at<T: Validate>(value: &T, path: &str, errors: &mut Vec<Violation>) {
    let Err(report) = value.validate() else {
        return;
    };
    let mut fields: Vec<String> = report
        .field_errors()
        .into_keys()
        .map(|field| qualify(path, &field))
        .collect();
    fields.sort();
    errors.extend(fields.into_iter().map(|field| Violation {
        field,
        rule: Rule::NonEmpty,
    }));
}

/// Checks the declared rules of an already typed value.
///
/// # Errors
///
/// Returns every field that breaks its rule.
pub fn check<T: Validate>(value: &T) -> Result<(), SchemaError> {
    let mut violations = Vec::new();
    check_at(value, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { violations })
    }
}

/// Qualifies `field` with the enclosing path (`notes[0]` + `title`).
pub(crate) fn qualify(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Cursor over one JSON object that records violations as fields are read.
pub(crate) struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    path: &'a str,
    errors: &'a mut Vec<Violation>,
}

impl<'a> Fields<'a> {
    /// Records a violation up front when `value` is not an object.
    pub fn new(value: &'a Value, path: &'a str, errors: &'a mut Vec<Violation>) -> Self {
        let object = value.as_object();
        if object.is_none() {
            errors.push(Violation {
                field: if path.is_empty() { "$".to_string() } else { path.to_string() },
                rule: Rule::Type("an object"),
            });
        }
        Self {
            object,
            path,
            errors,
        }
    }

    pub fn fail(&mut self, field: &str, rule: Rule) {
        self.errors.push(Violation {
            field: qualify(self.path, field),
            rule,
        });
    }

    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.object
            .and_then(|o| o.get(field))
            .filter(|v| !v.is_null())
    }

    /// Any string, possibly empty.
    pub fn string(&mut self, field: &str) -> Option<String> {
        self.object?;
        match self.raw(field) {
            None => {
                self.fail(field, Rule::Required);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.fail(field, Rule::Type("a string"));
                None
            }
        }
    }

    /// Absent or `null` yields `default`.
    pub fn string_or(&mut self, field: &str, default: &str) -> Option<String> {
        self.object?;
        if self.raw(field).is_none() {
            return Some(default.to_string());
        }
        self.string(field)
    }

    /// Absent or `null` yields `None` without a violation.
    pub fn optional_string(&mut self, field: &str) -> Option<String> {
        self.raw(field)?;
        self.string(field)
    }

    pub fn identifier(&mut self, field: &str) -> Option<Uuid> {
        let s = self.string(field)?;
        Uuid::parse_str(&s).map_or_else(
            |_| {
                self.fail(field, Rule::Identifier);
                None
            },
            Some,
        )
    }

    pub fn timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let s = self.string(field)?;
        DateTime::parse_from_rfc3339(&s).map_or_else(
            |_| {
                self.fail(field, Rule::Timestamp);
                None
            },
            |t| Some(t.with_timezone(&Utc)),
        )
    }

    pub fn unsigned(&mut self, field: &str) -> Option<u64> {
        self.object?;
        match self.raw(field) {
            None => {
                self.fail(field, Rule::Required);
                None
            }
            Some(v) => v.as_u64().or_else(|| {
                self.fail(field, Rule::Type("a non-negative integer"));
                None
            }),
        }
    }

    pub fn nested<T: FromJson>(&mut self, field: &str) -> Option<T> {
        self.object?;
        let Some(value) = self.raw(field) else {
            self.fail(field, Rule::Required);
            return None;
        };
        T::from_json_at(value, &qualify(self.path, field), self.errors)
    }

    /// Decodes every element; `None` if any element is invalid.
    pub fn array<T: FromJson>(&mut self, field: &str) -> Option<Vec<T>> {
        self.object?;
        let items = match self.raw(field) {
            None => {
                self.fail(field, Rule::Required);
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.fail(field, Rule::Type("an array"));
                return None;
            }
        };

        let base = qualify(self.path, field);
        let mut parsed = Vec::with_capacity(items.len());
        let mut complete = true;
        for (idx, item) in items.iter().enumerate() {
            match T::from_json_at(item, &format!("{base}[{idx}]"), self.errors) {
                Some(value) => parsed.push(value),
                None => complete = false,
            }
        }
        complete.then_some(parsed)
    }
}
