// HTTP transport for the method endpoint

use crate::handler::MethodHandler;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use scoring_log::{debug, error, info};
use scoring_validation::Input;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Path of the only routed endpoint, without slashes.
pub const METHOD_PATH: &str = "method";

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, handler: Arc<MethodHandler>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(target: "scoring::server", "listening on http://{}", addr);
    }

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let handler = handler.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<IncomingBody>| {
                let handler = handler.clone();
                async move { handle_request(req, handler).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(target: "scoring::server", "error serving {}: {:?}", peer, err);
            }
        });
    }
}

async fn handle_request(
    req: Request<IncomingBody>,
    handler: Arc<MethodHandler>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body = req.collect().await?.to_bytes();

    let (status, payload) = dispatch(&method, &path, body, handler).await;
    info!(target: "scoring::server", "{} {} {}", method, path, status.as_u16());

    Ok(json_response(status, &payload))
}

/// JSON response with the given status.
pub fn json_response(status: StatusCode, payload: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(payload.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Route a request and produce the status and JSON body to send back.
pub async fn dispatch(
    method: &Method,
    path: &str,
    body: Bytes,
    handler: Arc<MethodHandler>,
) -> (StatusCode, Value) {
    let route = path.trim_matches('/');
    if route != METHOD_PATH {
        return failure(StatusCode::NOT_FOUND, format!("Path {} Not Found", route));
    }
    if method != Method::POST {
        return failure(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    let request: Input = match serde_json::from_slice(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => return failure(StatusCode::BAD_REQUEST, "JSON Decode Error"),
    };
    debug!(target: "scoring::server", "request: {}", Value::Object(request.clone()));

    // Run the handler as its own task so a panic turns into a 500.
    let outcome = tokio::spawn(async move { handler.post(&request).await }).await;

    match outcome {
        Ok(Ok(response)) => (response.code, response.to_json()),
        Ok(Err(e)) => {
            error!(target: "scoring::server", "unexpected error: {}", e);
            internal_error()
        }
        Err(e) => {
            error!(target: "scoring::server", "handler task failed: {}", e);
            internal_error()
        }
    }
}

fn failure(code: StatusCode, error: impl Into<String>) -> (StatusCode, Value) {
    (code, json!({"code": code.as_u16(), "error": error.into()}))
}

fn internal_error() -> (StatusCode, Value) {
    failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MethodResponse;
    use crate::settings::Settings;
    use scoring_cache::{InMemoryCache, KvStore};

    fn handler() -> Arc<MethodHandler> {
        let settings = Arc::new(Settings::defaults().unwrap());
        Arc::new(MethodHandler::new(settings, KvStore::from_store(InMemoryCache::new())))
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, body) = dispatch(&Method::POST, "/score/", Bytes::new(), handler()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": 404, "error": "Path score Not Found"}));
    }

    #[tokio::test]
    async fn test_get_not_allowed() {
        let (status, _) = dispatch(&Method::GET, "/method/", Bytes::new(), handler()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_bad_json() {
        for body in [&b"{not json"[..], &b"[1, 2]"[..], &b"\"text\""[..]] {
            let (status, payload) =
                dispatch(&Method::POST, "/method", Bytes::from_static(body), handler()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(payload["error"], "JSON Decode Error");
        }
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let (status, payload) =
            dispatch(&Method::POST, "/method/", Bytes::from_static(b"{}"), handler()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(payload["code"], 422);
        assert_eq!(payload["errors"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_response_conversion() {
        let ok = MethodResponse::ok(json!({"score": 42}));
        let response = json_response(ok.code, &ok.to_json());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
