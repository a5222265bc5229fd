//! End-to-end tests of the method dispatcher over an in-memory cache.

use hyper::StatusCode;
use scoring_api::auth::expected_token;
use scoring_api::scoring::{INTERESTS, score_key};
use scoring_api::{MethodHandler, MethodResponse, ScoreArguments, Settings};
use scoring_cache::{CacheStore, InMemoryCache, KvStore};
use serde_json::{Value, json};
use std::sync::Arc;

struct Fixture {
    handler: MethodHandler,
    memory: InMemoryCache,
    settings: Arc<Settings>,
}

impl Fixture {
    fn new() -> Self {
        let settings = Arc::new(Settings::defaults().unwrap());
        let memory = InMemoryCache::new();
        let handler = MethodHandler::new(settings.clone(), KvStore::from_store(memory.clone()));
        Self {
            handler,
            memory,
            settings,
        }
    }

    /// Envelope signed with a valid token.
    fn signed(&self, account: &str, login: &str, method: &str, arguments: Value) -> Value {
        let token = expected_token(&self.settings, account, login);
        json!({
            "account": account,
            "login": login,
            "method": method,
            "token": token,
            "arguments": arguments,
        })
    }

    async fn call(&self, request: Value) -> MethodResponse {
        let request = request.as_object().cloned().unwrap_or_default();
        self.handler.post(&request).await.unwrap()
    }
}

fn today() -> String {
    chrono::Local::now().format("%d.%m.%Y").to_string()
}

#[tokio::test]
async fn test_empty_request() {
    let fixture = Fixture::new();
    let response = fixture.call(json!({})).await;

    assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.errors.len(), 4);
    assert!(response.response.is_none());
}

#[tokio::test]
async fn test_bad_auth() {
    let fixture = Fixture::new();
    let requests = [
        json!({"account": "horns&hoofs", "login": "h&f", "method": "online_score", "token": "", "arguments": {}}),
        json!({"account": "horns&hoofs", "login": "h&f", "method": "online_score", "token": "sdd", "arguments": {}}),
        json!({"account": "horns&hoofs", "login": "admin", "method": "online_score", "token": "", "arguments": {}}),
    ];

    for request in requests {
        let response = fixture.call(request.clone()).await;
        assert_eq!(response.code, StatusCode::FORBIDDEN, "{}", request);
        assert_eq!(response.errors, vec!["Forbidden"]);
    }
}

#[tokio::test]
async fn test_invalid_method_request() {
    let fixture = Fixture::new();
    let requests = [
        json!({"account": "horns&hoofs", "login": "h&f", "method": "online_score"}),
        json!({"account": "horns&hoofs", "login": "h&f", "arguments": {}}),
        json!({"account": "horns&hoofs", "method": "online_score", "arguments": {}}),
    ];

    for request in requests {
        let response = fixture.call(request.clone()).await;
        assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY, "{}", request);
        assert!(!response.errors.is_empty(), "{}", request);
    }

    let mut empty_method = fixture.signed("horns&hoofs", "h&f", "online_score", json!({}));
    empty_method["method"] = json!("");
    let response = fixture.call(empty_method).await;
    assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_method() {
    let fixture = Fixture::new();
    let request = fixture.signed("horns&hoofs", "h&f", "credit_limit", json!({}));
    let response = fixture.call(request).await;

    assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.errors, vec!["the requested method is not defined"]);
}

#[tokio::test]
async fn test_invalid_score_request() {
    let fixture = Fixture::new();
    let arguments = [
        json!({}),
        json!({"phone": "79175002040"}),
        json!({"phone": "89175002040", "email": "stupnikov@otus.ru"}),
        json!({"phone": "79175002040", "email": "stupnikovotus.ru"}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": -1}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": "1"}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1, "birthday": "01.01.1890"}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1, "birthday": "XXX"}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1, "birthday": "01.01.2000", "first_name": 1}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": 1, "birthday": "01.01.2000", "first_name": "s", "last_name": 2}),
        json!({"phone": "79175002040", "birthday": "01.01.2000", "first_name": "s"}),
        json!({"email": "stupnikov@otus.ru", "gender": 1, "last_name": 2}),
    ];

    for args in arguments {
        let request = fixture.signed("horns&hoofs", "h&f", "online_score", args.clone());
        let response = fixture.call(request).await;
        assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY, "{}", args);
        assert!(!response.errors.is_empty(), "{}", args);
    }
}

#[tokio::test]
async fn test_ok_score_request() {
    let fixture = Fixture::new();
    let cases = [
        (json!({"phone": "79175002040", "email": "stupnikov@otus.ru"}), 3.0),
        (json!({"phone": 79175002040u64, "email": "stupnikov@otus.ru"}), 3.0),
        (json!({"gender": 1, "birthday": "01.01.2000", "first_name": "a", "last_name": "b"}), 2.0),
        (json!({"gender": 3, "birthday": "01.01.2000"}), 1.5),
        (json!({"gender": 2.0, "birthday": "01.01.2000"}), 1.5),
        (json!({"first_name": "a", "last_name": "b"}), 0.5),
        (
            json!({
                "phone": "79175002040",
                "email": "stupnikov@otus.ru",
                "gender": 1,
                "birthday": "01.01.2000",
                "first_name": "a",
                "last_name": "b"
            }),
            5.0,
        ),
    ];

    for (args, expected) in cases {
        let request = fixture.signed("horns&hoofs", "h&f", "online_score", args.clone());
        let response = fixture.call(request).await;

        assert_eq!(response.code, StatusCode::OK, "{}", args);
        assert!(response.errors.is_empty());
        assert_eq!(response.response, Some(json!({"score": expected})), "{}", args);
    }
}

#[tokio::test]
async fn test_score_is_served_from_cache() {
    let fixture = Fixture::new();
    let args = json!({"phone": "79175002040", "email": "stupnikov@otus.ru"});
    let typed: ScoreArguments = serde_json::from_value(args.clone()).unwrap();

    fixture
        .memory
        .set_json(&score_key(&typed), "4.5".to_string(), None)
        .await
        .unwrap();

    let request = fixture.signed("horns&hoofs", "h&f", "online_score", args);
    let response = fixture.call(request).await;
    assert_eq!(response.response, Some(json!({"score": 4.5})));
}

#[tokio::test]
async fn test_ok_score_admin_request() {
    let fixture = Fixture::new();
    let args = json!({"phone": "79175002040", "email": "stupnikov@otus.ru"});
    let request = fixture.signed("horns&hoofs", "admin", "online_score", args);
    let response = fixture.call(request).await;

    assert_eq!(response.code, StatusCode::OK);
    assert_eq!(response.response, Some(json!({"score": 42})));
    assert!(fixture.memory.is_empty().await);
}

#[tokio::test]
async fn test_admin_arguments_are_still_validated() {
    let fixture = Fixture::new();
    let request = fixture.signed("horns&hoofs", "admin", "online_score", json!({"phone": "79175002040"}));
    let response = fixture.call(request).await;

    assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_interests_request() {
    let fixture = Fixture::new();
    let arguments = [
        json!({}),
        json!({"date": "20.07.2017"}),
        json!({"client_ids": [], "date": "20.07.2017"}),
        json!({"client_ids": {"1": 2}, "date": "20.07.2017"}),
        json!({"client_ids": ["1", "2"], "date": "20.07.2017"}),
        json!({"client_ids": [1, 2], "date": "XXX"}),
    ];

    for args in arguments {
        let request = fixture.signed("horns&hoofs", "h&f", "clients_interests", args.clone());
        let response = fixture.call(request).await;
        assert_eq!(response.code, StatusCode::UNPROCESSABLE_ENTITY, "{}", args);
        assert!(!response.errors.is_empty(), "{}", args);
    }
}

#[tokio::test]
async fn test_ok_interests_request() {
    let fixture = Fixture::new();
    let arguments = [
        json!({"client_ids": [1, 2, 3], "date": today()}),
        json!({"client_ids": [1, 2], "date": "19.07.2017"}),
        json!({"client_ids": [0]}),
    ];

    for args in arguments {
        let request = fixture.signed("horns&hoofs", "h&f", "clients_interests", args.clone());
        let response = fixture.call(request).await;
        assert_eq!(response.code, StatusCode::OK, "{}", args);

        let payload = response.response.unwrap();
        let payload = payload.as_object().unwrap();
        assert_eq!(payload.len(), args["client_ids"].as_array().unwrap().len());

        for interests in payload.values() {
            let interests = interests.as_array().unwrap();
            assert_eq!(interests.len(), 2);
            assert!(interests
                .iter()
                .all(|i| INTERESTS.contains(&i.as_str().unwrap())));
        }
    }
}

#[tokio::test]
async fn test_interests_are_stable_per_client() {
    let fixture = Fixture::new();
    let args = json!({"client_ids": [5, 6]});

    let first = fixture
        .call(fixture.signed("horns&hoofs", "h&f", "clients_interests", args.clone()))
        .await;
    let second = fixture
        .call(fixture.signed("horns&hoofs", "h&f", "clients_interests", args))
        .await;

    assert_eq!(first.response, second.response);
    assert!(fixture.memory.get_json("i:5").await.unwrap().is_some());
}
