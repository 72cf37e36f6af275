//! Error type shared by transports and interceptors.
//!
//! # Design
//! Transports and interceptors return the same `Error`, so the pipeline can
//! hand a failure back to the caller exactly as the failing stage produced
//! it. `NotFound` gets a dedicated variant because callers frequently
//! distinguish "the resource does not exist" from "the server returned an
//! unexpected status." All other non-2xx responses land in `HttpStatus` with
//! the raw status code and body.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by `Pipeline::issue`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The transport could not turn the request description into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A request body could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A caller-supplied interceptor rejected the value it was given.
    #[error("interceptor failed: {0}")]
    Interceptor(String),
}

impl Error {
    /// Shorthand for failing from a custom interceptor.
    pub fn interceptor(msg: impl Into<String>) -> Self {
        Error::Interceptor(msg.into())
    }
}
