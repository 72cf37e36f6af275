//! The request/response interceptor pipeline.
//!
//! # Design
//! `Pipeline` holds an injected transport plus two interceptor chains that
//! are fixed at construction. `issue` seeds a request description, folds it
//! through the request chain, hands the result to the transport, and folds
//! the transport's value through the response chain. The only suspension
//! point is the transport call. The first failure of any stage is returned
//! as-is and every later stage is skipped.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::http::Request;
use crate::transport::Transport;

/// Replaces the outgoing request description.
pub type RequestInterceptor = Arc<dyn Fn(Request) -> Result<Request> + Send + Sync>;

/// Replaces the value the transport resolved to.
pub type ResponseInterceptor<R> = Arc<dyn Fn(R) -> Result<R> + Send + Sync>;

/// Interceptor chains for a `Pipeline`. Both default to empty.
pub struct PipelineConfig<R> {
    pub request_interceptors: Vec<RequestInterceptor>,
    pub response_interceptors: Vec<ResponseInterceptor<R>>,
}

impl<R> PipelineConfig<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the request chain.
    pub fn request_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(Request) -> Result<Request> + Send + Sync + 'static,
    {
        self.request_interceptors.push(Arc::new(f));
        self
    }

    /// Append to the response chain.
    pub fn response_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(R) -> Result<R> + Send + Sync + 'static,
    {
        self.response_interceptors.push(Arc::new(f));
        self
    }
}

impl<R> Default for PipelineConfig<R> {
    fn default() -> Self {
        Self {
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }
}

impl<R> Clone for PipelineConfig<R> {
    fn clone(&self) -> Self {
        Self {
            request_interceptors: self.request_interceptors.clone(),
            response_interceptors: self.response_interceptors.clone(),
        }
    }
}

impl<R> fmt::Debug for PipelineConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .finish()
    }
}

/// An HTTP client that threads every call through two interceptor chains.
///
/// Calls share nothing but the read-only chains and the transport, so one
/// pipeline can serve concurrent `issue` calls.
pub struct Pipeline<T: Transport> {
    transport: T,
    request_interceptors: Vec<RequestInterceptor>,
    response_interceptors: Vec<ResponseInterceptor<T::Response>>,
}

impl<T: Transport> Pipeline<T> {
    /// A pipeline with empty chains: requests go to `transport` untouched.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, PipelineConfig::default())
    }

    pub fn with_config(transport: T, config: PipelineConfig<T::Response>) -> Self {
        Self {
            transport,
            request_interceptors: config.request_interceptors,
            response_interceptors: config.response_interceptors,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request.
    ///
    /// The seed is `description` (empty when `None`) with its address set to
    /// `address`; the argument wins even when it is `None`. The transport is
    /// called with the folded request's address and the folded request.
    pub async fn issue(
        &self,
        address: Option<&str>,
        description: Option<Request>,
    ) -> Result<T::Response> {
        let mut request = Request::seeded(address, description);
        debug!(
            address = ?request.address(),
            request_interceptors = self.request_interceptors.len(),
            response_interceptors = self.response_interceptors.len(),
            "issuing request"
        );

        for interceptor in &self.request_interceptors {
            request = interceptor(request)?;
        }

        let address = request.address().map(str::to_owned);
        trace!(address = ?address, "handing request to transport");
        let mut response = self.transport.send(address, request).await?;

        for interceptor in &self.response_interceptors {
            response = interceptor(response)?;
        }
        Ok(response)
    }
}

impl<T: Transport + Clone> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            request_interceptors: self.request_interceptors.clone(),
            response_interceptors: self.response_interceptors.clone(),
        }
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("transport", &self.transport)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .finish()
    }
}
