//! Error classification and response rendering.
//!
//! [`ErrorEnvelope`] is the single wire shape for error responses:
//! `{"errors":[{"key"?,"title","detail"?}]}`. Each entry is an [`ApiError`]
//! whose original cause is kept server-side for logging and never serialized.
//! Errors of category [`ErrorCategory::Unclassified`] are replaced by a fixed
//! generic record so internal state never leaks to callers.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Categorized, ErrorCategory};

/// Machine key rendered for unclassified errors.
pub const ERR_UNEXPECTED: &str = "ERR_UNEXPECTED";

const UNEXPECTED_TITLE: &str = "Internal Server Error";
const UNEXPECTED_DETAIL: &str = "An unexpected error occurred.";

/// A single classified, renderable error.
///
/// Holds the machine `key`, the category-derived `title` and the human
/// `detail` that go over the wire, plus the original cause which is only ever
/// logged. Equality compares the wire fields and ignores the cause.
#[derive(Debug)]
pub struct ApiError {
    cause: Option<Box<dyn Categorized>>,
    category: ErrorCategory,
    key: Option<String>,
    title: String,
    detail: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ApiError {
    /// Builds an error for a known category without a server-side cause.
    ///
    /// The title is derived from the category. Empty key or detail strings
    /// render the same as absent ones.
    pub fn from_category(
        category: ErrorCategory,
        key: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            cause: None,
            category,
            key: normalize(Some(key.into())),
            title: category.title().to_string(),
            detail: normalize(Some(detail.into())),
        }
    }

    /// Builds an error for a known category, retaining `cause` for logging.
    pub fn classified(
        category: ErrorCategory,
        key: Option<String>,
        detail: Option<String>,
        cause: Box<dyn Categorized>,
    ) -> Self {
        Self {
            cause: Some(cause),
            category,
            key: normalize(key),
            title: category.title().to_string(),
            detail: normalize(detail),
        }
    }

    /// Wraps an unclassified error in the fixed generic record.
    ///
    /// The original error survives only as the logged cause; its message is
    /// never rendered.
    pub fn unexpected(cause: Box<dyn Categorized>) -> Self {
        Self {
            cause: Some(cause),
            category: ErrorCategory::Unclassified,
            key: Some(ERR_UNEXPECTED.to_string()),
            title: UNEXPECTED_TITLE.to_string(),
            detail: Some(UNEXPECTED_DETAIL.to_string()),
        }
    }

    /// Classifies any categorized error into its renderable form.
    pub fn from_categorized(err: Box<dyn Categorized>) -> Self {
        match err.category() {
            ErrorCategory::Unclassified => Self::unexpected(err),
            category => Self::classified(category, err.key(), err.detail(), err),
        }
    }

    /// The category this error was classified under.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Machine-readable key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Human-readable title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Human-readable detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Server-side cause. Logged, never serialized.
    pub fn cause(&self) -> Option<&dyn Categorized> {
        self.cause.as_deref()
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.title == other.title && self.detail == other.detail
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cause) = &self.cause {
            return write!(f, "{cause}");
        }

        let parts: Vec<&str> = [
            self.key.as_deref(),
            Some(self.title.as_str()).filter(|t| !t.is_empty()),
            self.detail.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        write!(f, "{}", parts.join(": "))
    }
}

impl std::error::Error for ApiError {}

impl Categorized for ApiError {
    fn category(&self) -> ErrorCategory {
        self.category
    }

    fn key(&self) -> Option<String> {
        self.key.clone()
    }

    fn detail(&self) -> Option<String> {
        self.detail.clone()
    }

    // Already classified; passing through keeps classification idempotent.
    fn into_classified(self: Box<Self>) -> ApiError {
        *self
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields =
            1 + usize::from(self.key.is_some()) + usize::from(self.detail.is_some());
        let mut state = serializer.serialize_struct("ApiError", fields)?;
        if let Some(key) = &self.key {
            state.serialize_field("key", key)?;
        }
        state.serialize_field("title", &self.title)?;
        if let Some(detail) = &self.detail {
            state.serialize_field("detail", detail)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            key: Option<String>,
            #[serde(default)]
            title: String,
            #[serde(default)]
            detail: Option<String>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let key = normalize(wire.key);
        let detail = normalize(wire.detail);

        // Rebuild a synthetic cause so logging stays consistent for envelopes
        // received from a remote peer. The original cause chain is lost by
        // design.
        let message = if wire.title.is_empty() {
            detail.clone().unwrap_or_default()
        } else {
            format!("{}: {}", wire.title, detail.as_deref().unwrap_or_default())
        };
        let cause = SyntheticCause {
            key: key.clone().unwrap_or_default(),
            message,
        };

        Ok(Self {
            cause: Some(Box::new(cause)),
            category: ErrorCategory::Unclassified,
            key,
            title: wire.title,
            detail,
        })
    }
}

/// Stand-in cause for envelope entries parsed off the wire.
#[derive(Debug)]
struct SyntheticCause {
    key: String,
    message: String,
}

impl fmt::Display for SyntheticCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SyntheticCause {}

impl Categorized for SyntheticCause {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Unclassified
    }

    fn key(&self) -> Option<String> {
        normalize(Some(self.key.clone()))
    }

    fn detail(&self) -> Option<String> {
        normalize(Some(self.message.clone()))
    }

    fn into_classified(self: Box<Self>) -> ApiError {
        ApiError::from_categorized(self)
    }
}

/// Adapter that lets arbitrary errors enter the pipeline as unclassified.
#[derive(Debug)]
pub struct OpaqueError(anyhow::Error);

impl From<anyhow::Error> for OpaqueError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for OpaqueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl Categorized for OpaqueError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Unclassified
    }

    fn into_classified(self: Box<Self>) -> ApiError {
        ApiError::from_categorized(self)
    }
}

/// Ordered collection of classified errors returned to a caller in one
/// response.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Entries in input order; duplicates are preserved.
    pub errors: Vec<ApiError>,
}

impl ErrorEnvelope {
    /// Classifies each error independently and collects the results in input
    /// order.
    ///
    /// Full cause chains are logged here, at the point of classification, so
    /// unexpected failures stay diagnosable even though the client only sees
    /// the sanitized record.
    pub fn render<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Categorized>>,
    {
        let errors = errors
            .into_iter()
            .map(|err| {
                tracing::error!(
                    error = %cause_chain(&*err),
                    category = ?err.category(),
                    "request error"
                );
                err.into_classified()
            })
            .collect();

        Self { errors }
    }

    /// Renders an arbitrary error as the single generic unexpected record.
    pub fn unexpected(err: anyhow::Error) -> Self {
        Self::render([Box::new(OpaqueError::from(err)) as Box<dyn Categorized>])
    }

    /// Serializes the envelope to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an envelope from its JSON wire form.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ErrorEnvelope {}

fn cause_chain(err: &dyn Categorized) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
