//! The network primitive the pipeline delegates to.
//!
//! # Design
//! The pipeline receives its transport at construction instead of reaching
//! for a process-wide client, so tests substitute the network by passing a
//! closure through `transport_fn`. `UreqTransport` is the bundled real
//! transport: ureq is blocking, so each call runs on tokio's blocking pool
//! and `issue` stays async.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{Body, Request, Response};

/// Performs the actual round-trip for a folded request description.
pub trait Transport: Send + Sync {
    type Response: Send;

    /// Invoked as `send(address, request)`, where `address` is the
    /// request's own address field.
    fn send(
        &self,
        address: Option<String>,
        request: Request,
    ) -> impl Future<Output = Result<Self::Response>> + Send;
}

/// Adapts an async closure into a `Transport`.
#[derive(Debug, Clone)]
pub struct FnTransport<F> {
    f: F,
}

/// Build a transport from `f(address, request)`.
pub fn transport_fn<F, Fut, R>(f: F) -> FnTransport<F>
where
    F: Fn(Option<String>, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R>> + Send,
    R: Send,
{
    FnTransport { f }
}

impl<F, Fut, R> Transport for FnTransport<F>
where
    F: Fn(Option<String>, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R>> + Send,
    R: Send,
{
    type Response = R;

    fn send(
        &self,
        address: Option<String>,
        request: Request,
    ) -> impl Future<Output = Result<R>> + Send {
        (self.f)(address, request)
    }
}

/// Settings for `UreqTransport`.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Upper bound for the whole round-trip. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Largest response body read, in bytes. `None` reads everything.
    pub body_limit: Option<u64>,
}

/// HTTP transport backed by a shared `ureq::Agent`.
///
/// Status codes are returned as data; only failures to complete the
/// exchange become `Error::Transport`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: config.body_limit.unwrap_or(u64::MAX),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    type Response = Response;

    fn send(
        &self,
        address: Option<String>,
        request: Request,
    ) -> impl Future<Output = Result<Response>> + Send {
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        async move {
            let address = address
                .ok_or_else(|| Error::InvalidRequest("request has no address".to_string()))?;
            tokio::task::spawn_blocking(move || execute(&agent, &address, &request, body_limit))
                .await
                .map_err(|e| Error::Transport(e.to_string()))?
        }
    }
}

/// Encode the request body: strings go out verbatim, any other JSON value is
/// serialized and flagged as JSON.
fn encode_body(request: &Request) -> Result<Option<(String, bool)>> {
    match request.body() {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some((text.clone(), false))),
        Some(value) => serde_json::to_string(value)
            .map(|text| Some((text, true)))
            .map_err(|e| Error::Serialization(e.to_string())),
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn execute(
    agent: &ureq::Agent,
    address: &str,
    request: &Request,
    body_limit: u64,
) -> Result<Response> {
    let method = request.method();
    let mut headers = request.headers();
    let body = encode_body(request)?;
    if let Some((_, true)) = &body {
        if request.header("content-type").is_none() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
    }
    debug!(%method, %address, "sending request");

    let result = match method.as_str() {
        "GET" | "HEAD" if body.is_some() => {
            return Err(Error::InvalidRequest(format!("{method} request cannot have a body")));
        }
        "GET" => with_headers(agent.get(address), &headers).call(),
        "HEAD" => with_headers(agent.head(address), &headers).call(),
        "DELETE" | "OPTIONS" => {
            let builder = match method.as_str() {
                "DELETE" => agent.delete(address),
                _ => agent.options(address),
            };
            let builder = with_headers(builder, &headers);
            match body {
                Some((text, _)) => builder.force_send_body().send(text.as_bytes()),
                None => builder.call(),
            }
        }
        "POST" | "PUT" | "PATCH" => {
            let builder = match method.as_str() {
                "POST" => agent.post(address),
                "PUT" => agent.put(address),
                _ => agent.patch(address),
            };
            let builder = with_headers(builder, &headers);
            match body {
                Some((text, _)) => builder.send(text.as_bytes()),
                None => builder.send_empty(),
            }
        }
        other => return Err(Error::InvalidRequest(format!("unsupported method {other}"))),
    };

    let mut response = result.map_err(|e| match e {
        ureq::Error::BadUri(msg) => Error::InvalidRequest(msg),
        ureq::Error::Http(e) => Error::InvalidRequest(e.to_string()),
        other => Error::Transport(other.to_string()),
    })?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let bytes = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(|e| Error::Transport(e.to_string()))?;
    let body = if bytes.is_empty() {
        Body::Empty
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => Body::Text(text),
            Err(e) => Body::Bytes(e.into_bytes()),
        }
    };

    Ok(Response {
        status,
        headers,
        body,
    })
}
