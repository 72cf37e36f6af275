//! Ready-made interceptors for common cross-cutting concerns.
//!
//! Each constructor returns a closure that can be handed straight to
//! `PipelineConfig::request_interceptor` or `response_interceptor`. A typical
//! JSON API client stacks them like this:
//!
//! ```no_run
//! use pipeline_core::interceptors::*;
//! use pipeline_core::{Pipeline, PipelineConfig, UreqTransport};
//!
//! let config = PipelineConfig::new()
//!     .request_interceptor(base_url("https://api.example.com"))
//!     .request_interceptor(default_headers([("accept", "application/json")]))
//!     .request_interceptor(snake_case_body())
//!     .request_interceptor(json_body())
//!     .response_interceptor(on_unauthorized(|_| { /* drop the session */ }))
//!     .response_interceptor(reject_http_failures())
//!     .response_interceptor(parse_json_body())
//!     .response_interceptor(camel_case_body());
//! let pipeline = Pipeline::with_config(UreqTransport::new(), config);
//! ```

use tracing::debug;

use crate::case::{keys_to_camel, keys_to_snake};
use crate::error::{Error, Result};
use crate::http::{Body, Request, Response};

fn is_absolute(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}

fn join(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Prefix relative addresses with `base`. Absolute addresses are left alone
/// and a missing address becomes `base`.
pub fn base_url(
    base: impl Into<String>,
) -> impl Fn(Request) -> Result<Request> + Send + Sync + 'static {
    let base = base.into();
    move |mut request| {
        if request.address().is_some_and(is_absolute) {
            return Ok(request);
        }
        let address = match request.address() {
            Some(address) => join(&base, address),
            None => base.clone(),
        };
        request.set_address(Some(address));
        Ok(request)
    }
}

/// Add each header the request does not already carry. Names compare
/// case-insensitively and existing values win.
pub fn default_headers<I, K, V>(
    headers: I,
) -> impl Fn(Request) -> Result<Request> + Send + Sync + 'static
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers: Vec<(String, String)> = headers
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect();
    move |mut request| {
        for (name, value) in &headers {
            if request.header(name).is_none() {
                request.set_header(name.clone(), value.clone());
            }
        }
        Ok(request)
    }
}

/// Rewrite the keys of a JSON body from camelCase to snake_case.
pub fn snake_case_body() -> impl Fn(Request) -> Result<Request> + Send + Sync + 'static {
    |mut request| {
        if let Some(body) = request.take_body() {
            request.set_body(keys_to_snake(body));
        }
        Ok(request)
    }
}

/// Serialize a structured body to a JSON string and mark it as JSON.
/// String and null bodies are left as they are.
pub fn json_body() -> impl Fn(Request) -> Result<Request> + Send + Sync + 'static {
    |mut request| {
        let text = match request.body() {
            Some(body) if !body.is_null() && !body.is_string() => Some(
                serde_json::to_string(body).map_err(|e| Error::Serialization(e.to_string()))?,
            ),
            _ => None,
        };
        let Some(text) = text else {
            return Ok(request);
        };
        request.set_body(text);
        if request.header("content-type").is_none() {
            request.set_header("content-type", "application/json");
        }
        Ok(request)
    }
}

/// Call `callback` when the server answers 401, then pass the response on.
pub fn on_unauthorized<F>(
    callback: F,
) -> impl Fn(Response) -> Result<Response> + Send + Sync + 'static
where
    F: Fn(&Response) + Send + Sync + 'static,
{
    move |response| {
        if response.status == 401 {
            debug!("credentials rejected");
            callback(&response);
        }
        Ok(response)
    }
}

/// Turn non-2xx responses into errors.
pub fn reject_http_failures() -> impl Fn(Response) -> Result<Response> + Send + Sync + 'static {
    |response| {
        if response.is_success() {
            return Ok(response);
        }
        if response.status == 404 {
            return Err(Error::NotFound);
        }
        Err(Error::HttpStatus {
            status: response.status,
            body: response.body.to_text(),
        })
    }
}

/// Parse a text or raw body as JSON. Blank text becomes `Body::Empty`.
pub fn parse_json_body() -> impl Fn(Response) -> Result<Response> + Send + Sync + 'static {
    |mut response| {
        let parsed = match &response.body {
            Body::Text(text) if text.trim().is_empty() => Some(Body::Empty),
            Body::Text(text) => Some(Body::Json(
                serde_json::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))?,
            )),
            Body::Bytes(bytes) => Some(Body::Json(
                serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))?,
            )),
            _ => None,
        };
        if let Some(body) = parsed {
            response.body = body;
        }
        Ok(response)
    }
}

/// Rewrite the keys of a JSON body from snake_case to camelCase.
pub fn camel_case_body() -> impl Fn(Response) -> Result<Response> + Send + Sync + 'static {
    |mut response| {
        if let Body::Json(value) = &mut response.body {
            *value = keys_to_camel(value.take());
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_joins_with_single_slash() {
        let add = base_url("https://api.example.com/");
        let request = add(Request::new().with_address("/users")).unwrap();
        assert_eq!(request.address(), Some("https://api.example.com/users"));
        let request = add(Request::new().with_address("users")).unwrap();
        assert_eq!(request.address(), Some("https://api.example.com/users"));
    }

    #[test]
    fn base_url_leaves_absolute_addresses() {
        let add = base_url("https://api.example.com");
        let request = add(Request::new().with_address("http://other.host/x")).unwrap();
        assert_eq!(request.address(), Some("http://other.host/x"));
    }

    #[test]
    fn base_url_fills_missing_address() {
        let add = base_url("https://api.example.com");
        let request = add(Request::new()).unwrap();
        assert_eq!(request.address(), Some("https://api.example.com"));
    }

    #[test]
    fn default_headers_do_not_override() {
        let add = default_headers([("Accept", "application/json"), ("X-Client", "pipeline")]);
        let request = Request::new().with("headers", json!({"accept": "text/plain"}));
        let request = add(request).unwrap();
        assert_eq!(request.header("accept").as_deref(), Some("text/plain"));
        assert_eq!(request.header("x-client").as_deref(), Some("pipeline"));
    }

    #[test]
    fn default_headers_keep_non_string_values() {
        let add = default_headers([("x-count", "1")]);
        let request = Request::new().with("headers", json!({"X-Count": 5}));
        let request = add(request).unwrap();
        assert_eq!(request.headers(), vec![("X-Count".to_string(), "5".to_string())]);
    }

    #[test]
    fn snake_case_body_rewrites_keys() {
        let request = Request::new().with("body", json!({"firstName": "Ada"}));
        let request = snake_case_body()(request).unwrap();
        assert_eq!(request.body(), Some(&json!({"first_name": "Ada"})));
    }

    #[test]
    fn json_body_serializes_and_sets_content_type() {
        let request = Request::new().with("body", json!({"a": [1, 2]}));
        let request = json_body()(request).unwrap();
        assert_eq!(request.body(), Some(&json!(r#"{"a":[1,2]}"#)));
        assert_eq!(request.header("content-type").as_deref(), Some("application/json"));
    }

    #[test]
    fn json_body_leaves_strings_alone() {
        let request = Request::new().with("body", "plain");
        let request = json_body()(request).unwrap();
        assert_eq!(request.body(), Some(&json!("plain")));
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn on_unauthorized_fires_only_for_401() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let hook = on_unauthorized(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let response = hook(Response::new(401)).unwrap();
        assert_eq!(response.status, 401);
        hook(Response::new(200)).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reject_http_failures_maps_statuses() {
        let reject = reject_http_failures();
        assert!(reject(Response::new(201)).is_ok());
        assert_eq!(reject(Response::new(404)).unwrap_err(), Error::NotFound);
        let err = reject(Response::new(500).with_body(Body::Text("boom".to_string()))).unwrap_err();
        assert_eq!(
            err,
            Error::HttpStatus {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn parse_json_body_parses_text() {
        let parse = parse_json_body();
        let response = Response::new(200).with_body(Body::Text(r#"{"a":1}"#.to_string()));
        assert_eq!(parse(response).unwrap().body, Body::Json(json!({"a": 1})));
        let response = Response::new(200).with_body(Body::Text("  ".to_string()));
        assert_eq!(parse(response).unwrap().body, Body::Empty);
    }

    #[test]
    fn parse_json_body_attempts_raw_bytes() {
        let response = Response::new(200).with_body(Body::Bytes(vec![0xff, 0xfe, 0x00, 0x01]));
        let err = parse_json_body()(response).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn parse_json_body_rejects_bad_json() {
        let response = Response::new(200).with_body(Body::Text("not json".to_string()));
        let err = parse_json_body()(response).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn camel_case_body_rewrites_json_only() {
        let camel = camel_case_body();
        let response = Response::new(200).with_body(Body::Json(json!({"user_name": "x"})));
        assert_eq!(camel(response).unwrap().body, Body::Json(json!({"userName": "x"})));
        let response = Response::new(200).with_body(Body::Text("user_name".to_string()));
        assert_eq!(
            camel(response).unwrap().body,
            Body::Text("user_name".to_string())
        );
    }
}
