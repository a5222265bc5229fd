// Method endpoint dispatcher

use crate::auth::{check_auth, is_admin};
use crate::error::ServerError;
use crate::requests::{
    ClientsInterestsRequest, InterestsArguments, MethodCall, MethodRequest, OnlineScoreRequest,
    ScoreArguments,
};
use crate::scoring::{get_interests, get_score};
use crate::settings::Settings;
use hyper::StatusCode;
use scoring_cache::KvStore;
use scoring_log::{debug, info};
use scoring_validation::{Input, RequestValidator, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Outcome of a method call: a status code plus either a payload or errors.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResponse {
    pub code: StatusCode,
    pub response: Option<Value>,
    pub errors: Vec<String>,
}

impl MethodResponse {
    pub fn ok(response: Value) -> Self {
        Self {
            code: StatusCode::OK,
            response: Some(response),
            errors: Vec::new(),
        }
    }

    pub fn error(code: StatusCode, errors: Vec<String>) -> Self {
        Self {
            code,
            response: None,
            errors,
        }
    }

    fn invalid(errors: ValidationErrors) -> Self {
        Self::error(StatusCode::UNPROCESSABLE_ENTITY, errors.messages())
    }

    /// `{"code": c, "errors": [...]}` when errors are present, otherwise
    /// `{"code": c, "response": payload}`.
    pub fn to_json(&self) -> Value {
        if self.errors.is_empty() {
            json!({"code": self.code.as_u16(), "response": self.response})
        } else {
            json!({"code": self.code.as_u16(), "errors": self.errors})
        }
    }
}

/// Methods callable through the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    OnlineScore,
    ClientsInterests,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "online_score" => Some(Method::OnlineScore),
            "clients_interests" => Some(Method::ClientsInterests),
            _ => None,
        }
    }
}

/// Validates, authenticates and dispatches method calls.
#[derive(Clone)]
pub struct MethodHandler {
    settings: Arc<Settings>,
    store: KvStore,
}

impl MethodHandler {
    pub fn new(settings: Arc<Settings>, store: KvStore) -> Self {
        Self { settings, store }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one decoded request body.
    pub async fn post(&self, request: &Input) -> Result<MethodResponse, ServerError> {
        if let Err(errors) = MethodRequest.validate(request) {
            return Ok(MethodResponse::invalid(errors));
        }

        let call: MethodCall = typed(request)?;

        if !check_auth(&self.settings, &call) {
            return Ok(MethodResponse::error(
                StatusCode::FORBIDDEN,
                vec!["Forbidden".to_string()],
            ));
        }

        match Method::from_name(&call.method) {
            Some(Method::OnlineScore) => self.online_score(&call).await,
            Some(Method::ClientsInterests) => self.clients_interests(&call).await,
            None => {
                info!(target: "scoring::method", "unknown method \"{}\"", call.method);
                Ok(MethodResponse::error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    vec!["the requested method is not defined".to_string()],
                ))
            }
        }
    }

    async fn online_score(&self, call: &MethodCall) -> Result<MethodResponse, ServerError> {
        if let Err(errors) = OnlineScoreRequest.validate(&call.arguments) {
            return Ok(MethodResponse::invalid(errors));
        }

        if is_admin(&self.settings, &call.login) {
            return Ok(MethodResponse::ok(json!({"score": 42})));
        }

        let args: ScoreArguments = typed(&call.arguments)?;
        let score = get_score(&self.store, &args, self.settings.score_ttl()).await;
        debug!(target: "scoring::method", "{} - score {}", call.login, score);

        Ok(MethodResponse::ok(json!({"score": score})))
    }

    async fn clients_interests(&self, call: &MethodCall) -> Result<MethodResponse, ServerError> {
        if let Err(errors) = ClientsInterestsRequest.validate(&call.arguments) {
            return Ok(MethodResponse::invalid(errors));
        }

        let args: InterestsArguments = typed(&call.arguments)?;
        let ttl = self.settings.interests_ttl();

        let mut result = Map::new();
        for client_id in &args.client_ids {
            let interests = get_interests(&self.store, client_id, ttl).await;
            result.insert(client_id.to_string(), json!(interests));
        }

        Ok(MethodResponse::ok(Value::Object(result)))
    }
}

/// Typed view of an already validated payload.
fn typed<T: DeserializeOwned>(data: &Input) -> Result<T, ServerError> {
    serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| ServerError::Internal(format!("validated payload does not deserialize: {}", e)))
}
