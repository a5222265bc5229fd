//! Declarative request validation for the scoring API
//!
//! A request shape is a [`RequestValidator`]: a fixed, named set of
//! [`Field`]s plus an optional cross-field rule. Each field owns a set of named
//! [`Rule`]s built from reusable providers (length, type, mask, date, choice).
//!
//! Validation never stops at the first problem: every field is checked, every
//! rule of a present value runs in rule-name order, and the cross-field rule
//! runs last, so a response always carries the complete list of violations.
//!
//! # Examples
//!
//! ## Field
//!
//! ```
//! use scoring_validation::{ErrorKind, Field};
//! use serde_json::json;
//!
//! let email = Field::email().required();
//! let data = json!({"email": "stupnikovotus.ru"});
//!
//! let errors = email.validate("email", data.as_object().unwrap()).unwrap_err();
//! assert_eq!(errors[0].kind, ErrorKind::PatternMismatch);
//! ```
//!
//! ## Request shape with a cross-field rule
//!
//! ```
//! use scoring_validation::*;
//! use serde_json::json;
//!
//! struct Contact;
//!
//! impl RequestValidator for Contact {
//!     fn declare_fields() -> FieldSet {
//!         FieldSet::new()
//!             .field("email", Field::email())
//!             .field("phone", Field::phone().with_max_len(11))
//!     }
//!
//!     fn validate_cross_fields(&self, data: &Input, errors: &mut ValidationErrors) {
//!         if !has_truthy(data, "email") && !has_truthy(data, "phone") {
//!             errors.add(ValidationError::new(
//!                 "contact",
//!                 ErrorKind::CrossField,
//!                 "email or phone is required",
//!             ));
//!         }
//!     }
//! }
//!
//! assert!(Contact.validate(json!({"phone": 79175002040u64}).as_object().unwrap()).is_ok());
//! assert!(Contact.validate(&Input::new()).is_err());
//! ```

mod errors;
mod field;
mod registry;
mod rules;
mod traits;
mod validators;
mod value;

pub use errors::*;
pub use field::*;
pub use registry::*;
pub use rules::*;
pub use traits::*;
pub use validators::*;
pub use value::*;
