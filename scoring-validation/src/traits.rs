// Request validator trait

use crate::registry::{FieldSet, declared_fields};
use crate::value::Input;
use crate::ValidationErrors;
use scoring_log::debug;

/// Declared shape of one request or arguments payload.
///
/// Implementors declare their fields once through [`declare_fields`] and may
/// add a cross-field rule through [`validate_cross_fields`]. Validation runs
/// every field in name order, collects all errors, then runs the cross-field
/// rule regardless of the field outcomes.
///
/// [`declare_fields`]: RequestValidator::declare_fields
/// [`validate_cross_fields`]: RequestValidator::validate_cross_fields
///
/// # Examples
///
/// ```
/// use scoring_validation::{Field, FieldSet, RequestValidator};
/// use serde_json::json;
///
/// struct Login;
///
/// impl RequestValidator for Login {
///     fn declare_fields() -> FieldSet {
///         FieldSet::new()
///             .field("login", Field::char().required())
///             .field("email", Field::email())
///     }
/// }
///
/// let data = json!({"email": "nope"});
/// let errors = Login.validate(data.as_object().unwrap()).unwrap_err();
/// assert_eq!(
///     errors.messages(),
///     vec!["email does not match the email mask", "login is required"]
/// );
/// ```
pub trait RequestValidator: Send + Sync + 'static {
    /// Declare the fields of this shape. Called once per type.
    fn declare_fields() -> FieldSet
    where
        Self: Sized;

    /// Request-level rule spanning several fields; a no-op by default.
    fn validate_cross_fields(&self, _data: &Input, _errors: &mut ValidationErrors) {}

    /// Memoized field set of this shape.
    fn fields(&self) -> &'static FieldSet
    where
        Self: Sized,
    {
        declared_fields::<Self>()
    }

    /// Validate `data` against every declared field and the cross-field rule.
    fn validate(&self, data: &Input) -> Result<(), ValidationErrors>
    where
        Self: Sized,
    {
        let shape = std::any::type_name::<Self>();
        debug!(target: "scoring::validator", "start validate in {}", shape);

        let mut errors = ValidationErrors::default();

        for (name, field) in self.fields().iter() {
            if let Err(field_errors) = field.validate(name, data) {
                errors.extend(field_errors);
            }
        }

        self.validate_cross_fields(data, &mut errors);

        if !errors.is_empty() {
            debug!(target: "scoring::validator", "found {} errors in {}:", errors.len(), shape);
            for error in &errors {
                debug!(target: "scoring::validator", "{}", error);
            }
        }

        errors.into_result()
    }
}
