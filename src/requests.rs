// Request shapes of the method endpoint

use serde::Deserialize;
use serde_json::{Number, Value};
use scoring_validation::{
    ErrorKind, Field, FieldSet, Input, RequestValidator, ValidationError, ValidationErrors,
    has_truthy,
};

/// Date format of the arguments payloads.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Oldest accepted birthday, in years.
pub const MAX_AGE_YEARS: u32 = 70;

/// Message of the online score pair rule.
pub const PAIR_RULE_MESSAGE: &str = "at least one pair of phone-email, first name-last name, \
     gender-birthday with non-empty values is required";

/// Envelope of every call to the method endpoint.
pub struct MethodRequest;

impl RequestValidator for MethodRequest {
    fn declare_fields() -> FieldSet {
        FieldSet::new()
            .field("account", Field::char())
            .field("arguments", Field::arguments().required())
            .field("login", Field::char().required())
            .field("method", Field::char().required().nullable(false))
            .field("token", Field::char().required())
    }
}

/// Envelope after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    #[serde(default)]
    pub account: Option<String>,
    pub login: String,
    pub token: String,
    pub method: String,
    pub arguments: Input,
}

impl MethodCall {
    pub fn account(&self) -> &str {
        self.account.as_deref().unwrap_or_default()
    }
}

/// Gender codes accepted by `online_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Unknown = 1,
    Male = 2,
    Female = 3,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unknown, Gender::Male, Gender::Female];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|gender| u64::from(gender.code()) == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Arguments of `online_score`.
pub struct OnlineScoreRequest;

impl RequestValidator for OnlineScoreRequest {
    fn declare_fields() -> FieldSet {
        FieldSet::new()
            .field("birthday", Field::birthday(DATE_FORMAT, MAX_AGE_YEARS))
            .field("email", Field::email())
            .field("first_name", Field::char())
            .field(
                "gender",
                Field::choice(Gender::ALL.map(|gender| Value::from(gender.code()))),
            )
            .field("last_name", Field::char())
            .field("phone", Field::phone().with_max_len(11))
    }

    fn validate_cross_fields(&self, data: &Input, errors: &mut ValidationErrors) {
        let pairs = [
            ("phone", "email"),
            ("last_name", "first_name"),
            ("gender", "birthday"),
        ];

        if !pairs
            .iter()
            .any(|(a, b)| has_truthy(data, a) && has_truthy(data, b))
        {
            errors.add(ValidationError::new(
                "arguments",
                ErrorKind::CrossField,
                PAIR_RULE_MESSAGE,
            ));
        }
    }
}

/// `online_score` arguments after validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreArguments {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// String or integer
    pub phone: Option<Value>,
    pub birthday: Option<String>,
    /// Integer code, possibly written as `2.0`
    pub gender: Option<f64>,
}

impl ScoreArguments {
    pub fn gender(&self) -> Option<Gender> {
        self.gender
            .filter(|code| code.fract() == 0.0 && *code >= 0.0)
            .and_then(|code| Gender::from_code(code as u64))
    }
}

/// Arguments of `clients_interests`.
pub struct ClientsInterestsRequest;

impl RequestValidator for ClientsInterestsRequest {
    fn declare_fields() -> FieldSet {
        FieldSet::new()
            .field("client_ids", Field::client_ids().required().nullable(false))
            .field("date", Field::date(DATE_FORMAT))
    }
}

/// `clients_interests` arguments after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct InterestsArguments {
    pub client_ids: Vec<Number>,
    #[serde(default)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Input {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_method_request_fields() {
        let names: Vec<_> = MethodRequest.fields().names().collect();
        assert_eq!(names, vec!["account", "arguments", "login", "method", "token"]);
    }

    #[test]
    fn test_empty_method_request() {
        let errors = MethodRequest.validate(&Input::new()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.get_field_errors("account").is_empty());
    }

    #[test]
    fn test_method_call_from_valid_envelope() {
        let data = input(json!({
            "login": "h&f",
            "method": "online_score",
            "token": "",
            "arguments": {"phone": "79175002040"}
        }));
        MethodRequest.validate(&data).unwrap();

        let call: MethodCall = serde_json::from_value(Value::Object(data)).unwrap();
        assert_eq!(call.account(), "");
        assert_eq!(call.arguments["phone"], "79175002040");
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code(2), Some(Gender::Male));
        assert_eq!(Gender::from_code(0), None);
        assert_eq!(Gender::Female.as_str(), "female");
    }

    #[test]
    fn test_pair_rule() {
        let errors = OnlineScoreRequest
            .validate(&input(json!({"phone": "79175002040"})))
            .unwrap_err();
        assert_eq!(errors.messages(), vec![PAIR_RULE_MESSAGE]);
        assert_eq!(errors.errors[0].kind, ErrorKind::CrossField);

        assert!(OnlineScoreRequest
            .validate(&input(json!({"gender": 1, "birthday": "01.01.2000"})))
            .is_ok());
    }

    #[test]
    fn test_gender_string_is_rejected() {
        let errors = OnlineScoreRequest
            .validate(&input(json!({"first_name": "a", "last_name": "b", "gender": "1"})))
            .unwrap_err();
        assert_eq!(errors.kinds_for("gender"), vec![ErrorKind::NotInChoices]);
    }

    #[test]
    fn test_float_gender_code() {
        let data = input(json!({"gender": 2.0, "birthday": "01.01.2000"}));
        assert!(OnlineScoreRequest.validate(&data).is_ok());

        let args: ScoreArguments = serde_json::from_value(Value::Object(data)).unwrap();
        assert_eq!(args.gender(), Some(Gender::Male));
    }

    #[test]
    fn test_empty_client_ids() {
        let errors = ClientsInterestsRequest
            .validate(&input(json!({"client_ids": []})))
            .unwrap_err();
        assert_eq!(errors.kinds_for("client_ids"), vec![ErrorKind::Empty]);
    }
}
