//! HTTP client built from an injected transport and two interceptor chains.
//!
//! # Overview
//! `Pipeline::issue` seeds a request description from an address and an
//! optional set of fields, folds it through the request interceptors, hands
//! it to the transport, and folds the transport's value through the response
//! interceptors. Cross-cutting concerns (base URLs, default headers, body
//! encoding, auth handling, response parsing) live in interceptors instead
//! of at call sites.
//!
//! # Design
//! - The transport is a constructor argument, so tests swap the network for
//!   a closure via `transport_fn`.
//! - Interceptors are plain `Fn` values folded left to right; chains are
//!   fixed once the pipeline is built and shared read-only across calls.
//! - Transports and interceptors share one `Error` type, and the first
//!   failure is returned unchanged.
//! - `UreqTransport` and the `interceptors` module cover the common JSON API
//!   setup; neither is required to use the pipeline.

pub mod case;
pub mod error;
pub mod http;
pub mod interceptors;
pub mod pipeline;
pub mod transport;

pub use error::{Error, Result};
pub use http::{Body, Request, Response};
pub use pipeline::{Pipeline, PipelineConfig, RequestInterceptor, ResponseInterceptor};
pub use transport::{transport_fn, FnTransport, Transport, TransportConfig, UreqTransport};
