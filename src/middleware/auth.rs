//! Authentication gate Tower layer.
//!
//! Sits in front of protected handlers: evaluates the skip predicate,
//! resolves a verification key, verifies the bearer token, checks the token
//! type and attaches the verified [`AuthContext`] before delegating. Every
//! failure path renders an [`ErrorEnvelope`] with the status code of its
//! category; the inner handler's response and error pass through unmodified.

use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::future::BoxFuture;
use http::request::Parts;
use http::{header, HeaderValue, Request, Response};
use jsonwebtoken::DecodingKey;
use tower::{Layer, Service};

use crate::context::AuthContext;
use crate::error::{AuthError, Categorized, ErrorCategory};
use crate::jwt::{self, TokenType, BEARER_PREFIX};
use crate::middleware::request_id::RequestIds;
use crate::notify::{Notification, NotificationPriority, NotifyHandle};
use crate::render::ErrorEnvelope;

/// Serialized fallback envelope, used only if envelope serialization itself
/// fails.
const FALLBACK_BODY: &str =
    r#"{"errors":[{"key":"ERR_UNEXPECTED","title":"Internal Server Error","detail":"An unexpected error occurred."}]}"#;

/// Resolves the public key used to verify a given request's token.
///
/// Supplied by the caller; may perform I/O and fail. A failure whose category
/// is not [`ErrorCategory::Unclassified`] renders with that category's status
/// code, anything else renders as the generic unexpected error. The gate
/// applies no timeout; that is the resolver's responsibility.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Returns the verification key for this request.
    async fn resolve(&self, parts: &Parts) -> Result<DecodingKey, Box<dyn Categorized>>;
}

/// Resolver that always returns the same key.
#[derive(Clone)]
pub struct StaticKeyResolver {
    key: DecodingKey,
}

impl StaticKeyResolver {
    /// Wraps a fixed verification key.
    pub fn new(key: DecodingKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, _parts: &Parts) -> Result<DecodingKey, Box<dyn Categorized>> {
        Ok(self.key.clone())
    }
}

type Skipper = Arc<dyn Fn(&Parts) -> bool + Send + Sync>;

fn default_skipper(parts: &Parts) -> bool {
    matches!(parts.uri.path(), "/" | "/health")
}

struct GateConfig {
    resolver: Arc<dyn KeyResolver>,
    skipper: Skipper,
    notifier: Option<NotifyHandle>,
}

/// Builder for [`AuthGateLayer`].
///
/// A key resolver is mandatory; building without one fails with
/// [`AuthError::NoKeyResolver`] so misconfiguration surfaces at startup.
#[derive(Default)]
pub struct AuthGateBuilder {
    resolver: Option<Arc<dyn KeyResolver>>,
    skipper: Option<Skipper>,
    notifier: Option<NotifyHandle>,
}

impl AuthGateBuilder {
    /// Sets the key resolver.
    pub fn key_resolver(mut self, resolver: impl KeyResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the skip predicate. The default bypasses `/` and `/health`.
    pub fn skip_when(
        mut self,
        skipper: impl Fn(&Parts) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.skipper = Some(Arc::new(skipper));
        self
    }

    /// Enables best-effort notifications on the unexpected-error path.
    pub fn notifier(mut self, handle: NotifyHandle) -> Self {
        self.notifier = Some(handle);
        self
    }

    /// Builds the layer.
    pub fn build(self) -> Result<AuthGateLayer, AuthError> {
        let resolver = self.resolver.ok_or(AuthError::NoKeyResolver)?;

        Ok(AuthGateLayer {
            config: Arc::new(GateConfig {
                resolver,
                skipper: self.skipper.unwrap_or_else(|| Arc::new(default_skipper)),
                notifier: self.notifier,
            }),
        })
    }
}

/// Tower layer wrapping a service with the authentication gate.
#[derive(Clone)]
pub struct AuthGateLayer {
    config: Arc<GateConfig>,
}

impl AuthGateLayer {
    /// Starts building a gate.
    pub fn builder() -> AuthGateBuilder {
        AuthGateBuilder::default()
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGate {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Authentication gate service wrapper.
pub struct AuthGate<S> {
    inner: S,
    config: Arc<GateConfig>,
}

impl<S: Clone> Clone for AuthGate<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthGate<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: From<String> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            if (config.skipper)(&parts) {
                return inner.call(Request::from_parts(parts, body)).await;
            }

            let key = match config.resolver.resolve(&parts).await {
                Ok(key) => key,
                Err(err) => return Ok(deny(&config, &parts, err)),
            };

            let header = parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();

            let claims = match jwt::claims_from_bearer(header, Some(&key)) {
                Ok(claims) => claims,
                Err(err) => return Ok(deny(&config, &parts, Box::new(err))),
            };

            if claims.token_type != TokenType::Access {
                return Ok(deny(&config, &parts, Box::new(AuthError::AccessTokenRequired)));
            }

            let raw = header.strip_prefix(BEARER_PREFIX).unwrap_or_default();
            AuthContext::attach(&mut parts.extensions, claims, raw);

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

/// Classifies and renders a gate failure as the outgoing response.
fn deny<ResBody: From<String>>(
    config: &GateConfig,
    parts: &Parts,
    err: Box<dyn Categorized>,
) -> Response<ResBody> {
    let category = err.category();
    let status = category.http_status();

    if category == ErrorCategory::Unclassified {
        if let Some(handle) = &config.notifier {
            let notification = Notification::new("unexpected error while authorizing request")
                .with_subject("auth-gate unexpected error")
                .with_priority(NotificationPriority::High)
                .with_error(err.to_string())
                .with_metadata("path", parts.uri.path());
            if let Err(enqueue_err) = handle.enqueue(notification) {
                tracing::warn!(error = %enqueue_err, "failed to enqueue notification");
            }
        }
    }

    let (provenance_id, request_id) = parts
        .extensions
        .get::<RequestIds>()
        .map(|ids| (ids.provenance_id.as_str(), ids.request_id.as_str()))
        .unwrap_or_default();

    let span = tracing::error_span!(
        "request_denied",
        provenance_id = %provenance_id,
        request_id = %request_id,
        status = %status,
    );
    let _enter = span.enter();

    let envelope = ErrorEnvelope::render([err]);
    let body = envelope
        .to_json()
        .unwrap_or_else(|_| FALLBACK_BODY.to_string());

    let mut response = Response::new(ResBody::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    response
}
