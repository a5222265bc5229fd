// Field: one named, independently validated value

use crate::rules::{IntoRule, Rule};
use crate::validators::{
    DEFAULT_DATE_FORMAT, DEFAULT_MAX_AGE, DEFAULT_MAX_LEN, DateFormat, IsEmail, IsIntegerList,
    IsObject, IsPhone, IsString, IsStringOrInteger, MaxLength, NotOlderThan, OneOf,
};
use crate::value::{Input, is_truthy, present};
use crate::ValidationError;
use scoring_log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Declaration of one named value of a request.
///
/// A field checks presence first: a missing or `null` value fails only when
/// the field is required, and a present but falsy value fails only when the
/// field is not nullable. Neither case runs any rule. Otherwise every rule runs
/// in rule-name order and all of their errors are returned.
///
/// Fields hold no per-call state; one declaration is shared by every request.
///
/// # Examples
///
/// ```
/// use scoring_validation::Field;
/// use serde_json::json;
///
/// let phone = Field::phone().with_max_len(11);
/// let data = json!({"phone": "89175002040"});
/// let errors = phone.validate("phone", data.as_object().unwrap()).unwrap_err();
///
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].message, "phone does not match the phone mask");
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    required: bool,
    nullable: bool,
    rules: BTreeMap<&'static str, Rule>,
}

impl Field {
    /// Optional, nullable field without rules.
    pub fn new() -> Self {
        Self {
            required: false,
            nullable: true,
            rules: BTreeMap::new(),
        }
    }

    /// String of at most 256 characters.
    pub fn char() -> Self {
        Self::new()
            .with_rule(MaxLength(DEFAULT_MAX_LEN))
            .with_rule(IsString)
    }

    /// Nested arguments object.
    pub fn arguments() -> Self {
        Self::new().with_rule(IsObject)
    }

    /// String field that must also match the email mask.
    pub fn email() -> Self {
        Self::char().with_rule(IsEmail)
    }

    /// String or integer matching the phone mask.
    pub fn phone() -> Self {
        Self::new()
            .with_rule(MaxLength(DEFAULT_MAX_LEN))
            .with_rule(IsStringOrInteger)
            .with_rule(IsPhone)
    }

    /// Date string in the given `strftime` format.
    pub fn date(format: impl Into<String>) -> Self {
        Self::new().with_rule(DateFormat(format.into()))
    }

    /// Date string in [`DEFAULT_DATE_FORMAT`].
    pub fn iso_date() -> Self {
        Self::date(DEFAULT_DATE_FORMAT)
    }

    /// Date in the given format, no more than `years` years in the past.
    pub fn birthday(format: impl Into<String>, years: u32) -> Self {
        let format = format.into();
        Self::date(format.clone()).with_rule(NotOlderThan { format, years })
    }

    /// Birthday in [`DEFAULT_DATE_FORMAT`] within [`DEFAULT_MAX_AGE`] years.
    pub fn iso_birthday() -> Self {
        Self::birthday(DEFAULT_DATE_FORMAT, DEFAULT_MAX_AGE)
    }

    /// Value restricted to a fixed set of choices.
    pub fn choice(choices: impl IntoIterator<Item = Value>) -> Self {
        Self::new().with_rule(OneOf(choices.into_iter().collect()))
    }

    /// List of integer client identifiers.
    pub fn client_ids() -> Self {
        Self::new().with_rule(IsIntegerList)
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether a present but empty value is accepted.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Attach a rule.
    ///
    /// # Panics
    ///
    /// Panics if the field already has a rule with the same name; two rule
    /// providers colliding on a name is a declaration defect.
    pub fn with_rule(mut self, rule: impl IntoRule) -> Self {
        let rule = rule.into_rule();
        let name = rule.name();
        if self.rules.insert(name, rule).is_some() {
            panic!("rule `{}` is declared twice on the same field", name);
        }
        self
    }

    /// Attach a rule, replacing any rule with the same name.
    pub fn replace_rule(mut self, rule: impl IntoRule) -> Self {
        let rule = rule.into_rule();
        self.rules.insert(rule.name(), rule);
        self
    }

    /// Set the maximum length of the textual value.
    pub fn with_max_len(self, max_len: usize) -> Self {
        self.replace_rule(MaxLength(max_len))
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Rule names in execution order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    /// Validate the value stored under `name` in `data`.
    pub fn validate(&self, name: &str, data: &Input) -> Result<(), Vec<ValidationError>> {
        debug!(target: "scoring::field", "validate field \"{}\": started", name);

        let mut errors = Vec::new();

        match present(data, name) {
            None => {
                if self.required {
                    errors.push(ValidationError::required(name));
                } else {
                    debug!(
                        target: "scoring::field",
                        "optional field \"{}\" is missing, processing is not performed", name
                    );
                }
            }
            Some(value) if !self.nullable && !is_truthy(value) => {
                errors.push(ValidationError::empty(name));
            }
            Some(value) => {
                for (rule_name, rule) in &self.rules {
                    debug!(target: "scoring::field", "validate field \"{}\": rule {}", name, rule_name);
                    if let Err(error) = rule.check(name, value) {
                        errors.push(error);
                    }
                }
            }
        }

        if errors.is_empty() {
            debug!(target: "scoring::field", "validate field \"{}\": completed successfully", name);
            Ok(())
        } else {
            debug!(target: "scoring::field", "validate field \"{}\": {} error(s)", name, errors.len());
            Err(errors)
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn input(value: Value) -> Input {
        value.as_object().cloned().unwrap_or_default()
    }

    fn counting_rule(name: &'static str, calls: Arc<AtomicUsize>) -> Rule {
        Rule::new(name, move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn failing_rule(name: &'static str) -> Rule {
        Rule::new(name, move |field, _| {
            Err(ValidationError::new(field, ErrorKind::WrongType, name))
        })
    }

    #[test]
    fn test_required_missing_skips_rules() {
        let calls = Arc::new(AtomicUsize::new(0));
        let field = Field::new()
            .required()
            .with_rule(counting_rule("count", calls.clone()));

        for data in [json!({}), json!({"login": null})] {
            let errors = field.validate("login", &input(data)).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, ErrorKind::Required);
            assert_eq!(errors[0].message, "login is required");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_optional_missing_is_valid() {
        let calls = Arc::new(AtomicUsize::new(0));
        let field = Field::new().with_rule(counting_rule("count", calls.clone()));

        assert!(field.validate("account", &input(json!({}))).is_ok());
        assert!(field.validate("account", &input(json!({"account": null}))).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_not_nullable_rejects_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let field = Field::new()
            .required()
            .nullable(false)
            .with_rule(counting_rule("count", calls.clone()));

        for empty in [json!(""), json!([]), json!({})] {
            let errors = field
                .validate("method", &input(json!({ "method": empty })))
                .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, ErrorKind::Empty);
            assert_eq!(errors[0].message, "method cannot be empty");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nullable_runs_rules_on_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let field = Field::new().with_rule(counting_rule("count", calls.clone()));

        assert!(field.validate("login", &input(json!({"login": ""}))).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rules_run_in_name_order_without_short_circuit() {
        let field = Field::new()
            .with_rule(failing_rule("zeta"))
            .with_rule(failing_rule("alpha"))
            .with_rule(failing_rule("mid"));

        let errors = field.validate("x", &input(json!({"x": 1}))).unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    #[should_panic(expected = "rule `type` is declared twice")]
    fn test_duplicate_rule_panics() {
        let _ = Field::char().with_rule(IsObject);
    }

    #[test]
    fn test_with_max_len_replaces_default() {
        let field = Field::phone().with_max_len(11);
        assert_eq!(field.rule_names().collect::<Vec<_>>(), vec!["mask", "max_len", "type"]);

        let errors = field
            .validate("phone", &input(json!({"phone": "791750020401"})))
            .unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::TooLong);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let field = Field::email();
        let data = input(json!({"email": 42}));

        let first = field.validate("email", &data);
        let second = field.validate("email", &data);
        assert_eq!(first, second);
        assert_eq!(first.unwrap_err().len(), 2);
    }

    #[test]
    fn test_birthday_rules() {
        let field = Field::birthday("%d.%m.%Y", 70);
        assert!(field.validate("birthday", &input(json!({"birthday": "01.01.2000"}))).is_ok());

        let errors = field
            .validate("birthday", &input(json!({"birthday": "01.01.1890"})))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::AgeOutOfRange);

        let kinds: Vec<_> = field
            .validate("birthday", &input(json!({"birthday": "XXX"})))
            .unwrap_err()
            .into_iter()
            .map(|error| error.kind)
            .collect();
        assert_eq!(kinds, vec![ErrorKind::AgeOutOfRange, ErrorKind::BadDateFormat]);
    }

    #[test]
    fn test_iso_birthday_defaults() {
        let field = Field::iso_birthday();
        assert!(field.validate("birthday", &input(json!({"birthday": "2015-06-01"}))).is_ok());

        let errors = field
            .validate("birthday", &input(json!({"birthday": "1990-06-01"})))
            .unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::AgeOutOfRange);
    }

    #[test]
    fn test_nullable_zero_still_checked_against_choices() {
        let field = Field::choice([json!(1), json!(2), json!(3)]);
        let errors = field.validate("gender", &input(json!({"gender": 0}))).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::NotInChoices);
    }
}
