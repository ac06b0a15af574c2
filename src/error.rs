use crate::providers::{Provider, ProviderError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown to end users when a hosted provider fails
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "AI analysis service is temporarily unavailable, please retry later";

/// Why a provider could not serve a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// HTTP 429
    RateLimited,
    /// HTTP 404
    EndpointNotFound,
    /// Any other non-success status
    Status(u16),
    /// Connection, TLS or body read failure
    Transport(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limit or quota exceeded"),
            Self::EndpointNotFound => write!(f, "endpoint does not exist"),
            Self::Status(code) => write!(f, "request failed with HTTP status {code}"),
            Self::Transport(detail) => write!(f, "transport error: {detail}"),
        }
    }
}

/// One failed attempt recorded by the fallback orchestrator
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub reason: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("API key required for provider: {0}")]
    MissingCredential(Provider),

    #[error("{provider} is unavailable: {reason}")]
    ProviderUnavailable {
        provider: Provider,
        reason: Unavailable,
    },

    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse { provider: Provider, detail: String },

    #[error("All {} configured providers failed: {}", .failures.len(), format_failures(.failures))]
    AllProvidersExhausted { failures: Vec<ProviderFailure> },

    #[error("No analysis providers are configured with an API key")]
    NoProvidersConfigured,

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type: {0}. Supported: PNG, JPEG, PDF")]
    UnsupportedMediaType(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AnalysisError {
    pub(crate) fn unavailable(provider: Provider, reason: Unavailable) -> Self {
        Self::ProviderUnavailable { provider, reason }
    }

    pub(crate) fn malformed(provider: Provider, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            detail: detail.into(),
        }
    }

    /// Errors raised by a single adapter call
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::MalformedResponse { .. }
        )
    }

    /// The message to show to an end user
    ///
    /// Hosted-provider failures collapse into one generic retry message; the
    /// detailed variant stays available through `Display` for logs.
    pub fn user_message(&self) -> String {
        if self.is_provider_failure() || matches!(self, Self::AllProvidersExhausted { .. }) {
            SERVICE_UNAVAILABLE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
