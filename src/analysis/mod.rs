//! Provider adapters that turn an image into a [`DiagnosisResult`].
//!
//! ```text
//! response.rs   <- fence stripping, JSON parsing, shape validation
//! prompt.rs     <- the instruction every hosted provider receives
//!      |
//! openai.rs  claude.rs  gemini.rs   <- hosted vision APIs
//! mock.rs                           <- offline score generator
//! ```

pub mod claude;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod response;

pub use claude::ClaudeService;
pub use gemini::GeminiService;
pub use mock::MockService;
pub use openai::OpenAiService;

use crate::error::{AnalysisError, Result, Unavailable};
use crate::image::ImageFile;
use crate::providers::{Provider, ProviderConfig};
use crate::types::DiagnosisResult;
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// A backend able to diagnose a design image
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Which provider this adapter talks to
    fn provider(&self) -> Provider;

    /// Produce a complete diagnosis for `file` or fail
    async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult>;
}

/// Credential, endpoint and model for a hosted provider
pub(crate) struct RemoteSettings {
    pub api_key: String,
    pub endpoint: url::Url,
    pub model: String,
}

impl RemoteSettings {
    /// Resolve `config` against the defaults of `provider`
    ///
    /// A missing credential fails here, before any request is built.
    pub(crate) fn resolve(provider: Provider, config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .credential()
            .ok_or(AnalysisError::MissingCredential(provider))?
            .to_string();

        let scoped = ProviderConfig {
            provider,
            ..config.clone()
        };
        let endpoint = scoped
            .effective_endpoint()?
            .ok_or_else(|| AnalysisError::unavailable(provider, Unavailable::EndpointNotFound))?;
        let model = scoped.effective_model().unwrap_or_default().to_string();

        Ok(Self {
            api_key,
            endpoint,
            model,
        })
    }
}

/// Send a prepared request and decode the JSON envelope of a success response
pub(crate) async fn send_json(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> Result<Value> {
    log_debug!("Sending {} analysis request", provider);

    let response = request
        .send()
        .await
        .map_err(|e| AnalysisError::unavailable(provider, Unavailable::Transport(e.to_string())))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log_warn!(
            "{} API request failed with status {}: {}",
            provider,
            status,
            body.chars().take(300).collect::<String>()
        );
        return Err(AnalysisError::unavailable(provider, classify_status(status)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AnalysisError::unavailable(provider, Unavailable::Transport(e.to_string())))?;

    log_debug!("{} API call succeeded ({} bytes)", provider, body.len());

    serde_json::from_str(&body).map_err(|e| {
        AnalysisError::malformed(provider, format!("response envelope is not JSON: {e}"))
    })
}

fn classify_status(status: StatusCode) -> Unavailable {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Unavailable::RateLimited,
        StatusCode::NOT_FOUND => Unavailable::EndpointNotFound,
        other => Unavailable::Status(other.as_u16()),
    }
}
