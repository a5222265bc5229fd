// Named field rules

use crate::ValidationError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type RuleFn = Arc<dyn Fn(&str, &Value) -> Result<(), ValidationError> + Send + Sync>;

/// A named constraint applied to one present, non-empty value.
///
/// Rules are the unit of composition for [`Field`](crate::Field): a field owns
/// a set of rules keyed by name and runs all of them in name order.
#[derive(Clone)]
pub struct Rule {
    name: &'static str,
    check: RuleFn,
}

impl Rule {
    /// Create a rule from a closure receiving the field name and value.
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    /// Rule name; determines execution order within a field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the rule against a value.
    pub fn check(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        (self.check)(field, value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Conversion of a rule provider into a named [`Rule`].
pub trait IntoRule {
    fn into_rule(self) -> Rule;
}

impl IntoRule for Rule {
    fn into_rule(self) -> Rule {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_custom_rule() {
        let rule = Rule::new("positive", |field, value| {
            if value.as_i64().is_some_and(|n| n > 0) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    field,
                    ErrorKind::WrongType,
                    format!("{} must be positive", field),
                ))
            }
        });

        assert_eq!(rule.name(), "positive");
        assert!(rule.check("count", &json!(3)).is_ok());
        assert_eq!(
            rule.check("count", &json!(-3)).unwrap_err().message,
            "count must be positive"
        );
    }

    #[test]
    fn test_debug_shows_name() {
        let rule = Rule::new("noop", |_, _| Ok(()));
        assert_eq!(format!("{:?}", rule), "Rule { name: \"noop\" }");
    }
}
