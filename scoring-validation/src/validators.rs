// Built-in rule providers

use crate::rules::{IntoRule, Rule};
use crate::value::{is_integer, text_of};
use crate::{ErrorKind, ValidationError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.+_-]+@[A-Za-z0-9._-]+\.[a-zA-Z]*$").unwrap());

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^7[0-9() -]*$").unwrap());

/// Default maximum length of textual values.
pub const DEFAULT_MAX_LEN: usize = 256;

/// Default date format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default age limit of birthday fields, in years.
pub const DEFAULT_MAX_AGE: u32 = 18;

fn type_error(field: &str, value: &Value, expected: &str) -> ValidationError {
    ValidationError::new(
        field,
        ErrorKind::WrongType,
        format!("{} must be {}", field, expected),
    )
    .with_value(text_of(value))
}

// Length

/// Maximum number of characters in the textual form of the value
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &Value, field: &str) -> Result<(), ValidationError> {
        let text = text_of(value);
        if text.chars().count() > self.0 {
            Err(ValidationError::new(
                field,
                ErrorKind::TooLong,
                format!(
                    "{} is too long, the maximum number of characters is {}",
                    field, self.0
                ),
            )
            .with_value(text))
        } else {
            Ok(())
        }
    }
}

impl IntoRule for MaxLength {
    fn into_rule(self) -> Rule {
        Rule::new("max_len", move |field, value| self.validate(value, field))
    }
}

// Types

/// Value must be a string
pub struct IsString;

impl IsString {
    pub fn validate(value: &Value, field: &str) -> Result<(), ValidationError> {
        if value.is_string() {
            Ok(())
        } else {
            Err(type_error(field, value, "a string"))
        }
    }
}

impl IntoRule for IsString {
    fn into_rule(self) -> Rule {
        Rule::new("type", |field, value| IsString::validate(value, field))
    }
}

/// Value must be a string or an integer
pub struct IsStringOrInteger;

impl IsStringOrInteger {
    pub fn validate(value: &Value, field: &str) -> Result<(), ValidationError> {
        if value.is_string() || is_integer(value) {
            Ok(())
        } else {
            Err(type_error(field, value, "a string or an integer"))
        }
    }
}

impl IntoRule for IsStringOrInteger {
    fn into_rule(self) -> Rule {
        Rule::new("type", |field, value| IsStringOrInteger::validate(value, field))
    }
}

/// Value must be an object
pub struct IsObject;

impl IsObject {
    pub fn validate(value: &Value, field: &str) -> Result<(), ValidationError> {
        if value.is_object() {
            Ok(())
        } else {
            Err(type_error(field, value, "an object"))
        }
    }
}

impl IntoRule for IsObject {
    fn into_rule(self) -> Rule {
        Rule::new("type", |field, value| IsObject::validate(value, field))
    }
}

/// Value must be a list containing only integers
pub struct IsIntegerList;

impl IsIntegerList {
    pub fn validate(value: &Value, field: &str) -> Result<(), ValidationError> {
        match value {
            Value::Array(items) if items.iter().all(is_integer) => Ok(()),
            Value::Array(_) => Err(type_error(field, value, "a list of integers only")),
            _ => Err(type_error(field, value, "a list")),
        }
    }
}

impl IntoRule for IsIntegerList {
    fn into_rule(self) -> Rule {
        Rule::new("type", |field, value| IsIntegerList::validate(value, field))
    }
}

// Masks

/// Textual form of the value must match a regular expression
#[derive(Debug, Clone)]
pub struct Matches {
    pub regex: Regex,
    pub mask: &'static str,
}

impl Matches {
    pub fn new(regex: Regex, mask: &'static str) -> Self {
        Self { regex, mask }
    }

    pub fn validate(&self, value: &Value, field: &str) -> Result<(), ValidationError> {
        let text = text_of(value);
        if self.regex.is_match(&text) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                ErrorKind::PatternMismatch,
                format!("{} does not match the {} mask", field, self.mask),
            )
            .with_value(text))
        }
    }
}

impl IntoRule for Matches {
    fn into_rule(self) -> Rule {
        Rule::new("mask", move |field, value| self.validate(value, field))
    }
}

/// Email mask; non-string values never match
pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: &Value, field: &str) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if EMAIL_REGEX.is_match(s) => Ok(()),
            _ => Err(ValidationError::new(
                field,
                ErrorKind::PatternMismatch,
                format!("{} does not match the email mask", field),
            )
            .with_value(text_of(value))),
        }
    }
}

impl IntoRule for IsEmail {
    fn into_rule(self) -> Rule {
        Rule::new("mask", |field, value| IsEmail::validate(value, field))
    }
}

/// Phone mask: digits, spaces, dashes and parentheses starting with `7`
pub struct IsPhone;

impl IntoRule for IsPhone {
    fn into_rule(self) -> Rule {
        Matches::new(Regex::clone(&PHONE_REGEX), "phone").into_rule()
    }
}

// Dates

fn parse_date(value: &Value, format: &str) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, format).ok())
}

/// Value must be a date string in the given `strftime` format
#[derive(Debug, Clone)]
pub struct DateFormat(pub String);

impl DateFormat {
    pub fn validate(&self, value: &Value, field: &str) -> Result<(), ValidationError> {
        if parse_date(value, &self.0).is_some() {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                ErrorKind::BadDateFormat,
                format!("{} has incorrect date format, should be {}", field, self.0),
            )
            .with_value(text_of(value)))
        }
    }
}

impl IntoRule for DateFormat {
    fn into_rule(self) -> Rule {
        Rule::new("type", move |field, value| self.validate(value, field))
    }
}

/// Date must not lie more than `years` × 365 days in the past.
///
/// A value that does not parse in `format` fails as well, next to the
/// [`DateFormat`] error for the same value.
#[derive(Debug, Clone)]
pub struct NotOlderThan {
    pub format: String,
    pub years: u32,
}

impl NotOlderThan {
    pub fn validate(&self, value: &Value, field: &str) -> Result<(), ValidationError> {
        self.validate_at(value, field, chrono::Local::now().date_naive())
    }

    /// Validate relative to an explicit `today`.
    pub fn validate_at(
        &self,
        value: &Value,
        field: &str,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        let too_old = match parse_date(value, &self.format) {
            Some(date) => (today - date).num_days() > i64::from(self.years) * 365,
            None => true,
        };

        if too_old {
            Err(ValidationError::new(
                field,
                ErrorKind::AgeOutOfRange,
                format!("{} date is older than {} years", field, self.years),
            )
            .with_value(text_of(value)))
        } else {
            Ok(())
        }
    }
}

impl IntoRule for NotOlderThan {
    fn into_rule(self) -> Rule {
        Rule::new("not_older", move |field, value| self.validate(value, field))
    }
}

// Choices

/// Value must equal one of the listed choices.
///
/// Numbers compare by value, so `1.0` matches a choice of `1`.
#[derive(Debug, Clone)]
pub struct OneOf(pub Vec<Value>);

fn same_choice(choice: &Value, value: &Value) -> bool {
    match (choice, value) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => choice == value,
    }
}

impl OneOf {
    pub fn validate(&self, value: &Value, field: &str) -> Result<(), ValidationError> {
        if self.0.iter().any(|choice| same_choice(choice, value)) {
            Ok(())
        } else {
            let options = self
                .0
                .iter()
                .map(|choice| choice.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(ValidationError::new(
                field,
                ErrorKind::NotInChoices,
                format!("{} must be one of [{}]", field, options),
            )
            .with_value(text_of(value)))
        }
    }
}

impl IntoRule for OneOf {
    fn into_rule(self) -> Rule {
        Rule::new("choice", move |field, value| self.validate(value, field))
    }
}
