//! Provenance and request id propagation.
//!
//! Reads `x-provenance-id` from the inbound request (minting one when
//! absent), mints a fresh `x-request-id`, exposes both as a typed request
//! extension and echoes both headers on the response. Downstream logging,
//! including the gate's denial path, picks the ids up from the extension.

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the id of the originating call chain.
pub const PROVENANCE_ID_HEADER: &str = "x-provenance-id";
/// Header carrying the id of this request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ids identifying a request and the call chain it belongs to.
#[derive(Debug, Clone)]
pub struct RequestIds {
    /// Carried across service hops; minted at the edge.
    pub provenance_id: String,
    /// Unique per request.
    pub request_id: String,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Tower layer installing [`RequestIds`] on every request.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Request id service wrapper.
pub struct RequestIdService<S> {
    inner: S,
}

impl<S: Clone> Clone for RequestIdService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let provenance_id = parts
                .headers
                .get(PROVENANCE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .unwrap_or_else(new_id);

            let ids = RequestIds {
                provenance_id,
                request_id: new_id(),
            };

            if let Ok(value) = HeaderValue::from_str(&ids.provenance_id) {
                parts.headers.insert(PROVENANCE_ID_HEADER, value);
            }
            parts.extensions.insert(ids.clone());

            let span = tracing::info_span!(
                "request",
                provenance_id = %ids.provenance_id,
                request_id = %ids.request_id,
            );

            let mut response = inner
                .call(Request::from_parts(parts, body))
                .instrument(span)
                .await?;

            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&ids.provenance_id) {
                headers.insert(PROVENANCE_ID_HEADER, value);
            }
            if let Ok(value) = HeaderValue::from_str(&ids.request_id) {
                headers.insert(REQUEST_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}
