//! Provider selection.
//!
//! [`create_service`] maps a [`ProviderConfig`] onto a concrete adapter.
//! [`ServiceFactory`] owns a configuration and memoizes the adapter for its
//! default provider, so callers can share one instance instead of a global.

use crate::analysis::{
    AnalysisService, ClaudeService, GeminiService, MockService, OpenAiService,
};
use crate::config::Config;
use crate::error::Result;
use crate::image::ImageFile;
use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};
use crate::types::DiagnosisResult;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

/// Build the adapter for `config.provider`
///
/// Hosted providers without a credential fail with `MissingCredential`
/// before any network activity.
pub fn create_service(
    config: &ProviderConfig,
    mock_delay: Duration,
) -> Result<Arc<dyn AnalysisService>> {
    log_debug!("Creating analysis service for {}", config.provider);

    let service: Arc<dyn AnalysisService> = match config.provider {
        Provider::Mock => Arc::new(MockService::new(mock_delay)),
        Provider::Local => Arc::new(MockService::new(mock_delay).reporting_as(Provider::Local)),
        Provider::OpenAI => Arc::new(OpenAiService::new(config)?),
        Provider::Claude => Arc::new(ClaudeService::new(config)?),
        Provider::Gemini => Arc::new(GeminiService::new(config)?),
    };
    Ok(service)
}

/// Caller-owned factory with a lazily built default service
pub struct ServiceFactory {
    config: Config,
    default_service: OnceCell<Arc<dyn AnalysisService>>,
}

impl ServiceFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            default_service: OnceCell::new(),
        }
    }

    /// Factory over the environment-derived default configuration
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(Config::from_env()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swap in a new configuration and drop the memoized service
    pub fn reconfigure(&mut self, config: Config) {
        self.config = config;
        self.default_service = OnceCell::new();
    }

    /// Build a fresh adapter for an explicit provider configuration
    pub fn create(&self, provider_config: &ProviderConfig) -> Result<Arc<dyn AnalysisService>> {
        create_service(provider_config, self.config.analysis.mock_delay())
    }

    /// Build a fresh adapter for `provider` using the stored settings
    pub fn create_for(&self, provider: Provider) -> Result<Arc<dyn AnalysisService>> {
        self.create(&self.config.provider_config(provider))
    }

    /// The default provider's adapter, built on first use and reused afterwards
    pub fn default_service(&self) -> Result<Arc<dyn AnalysisService>> {
        self.default_service
            .get_or_try_init(|| self.create(&self.config.default_provider_config()))
            .map(Arc::clone)
    }

    /// Analyze with an explicit configuration, or with the default service
    pub async fn analyze(
        &self,
        file: &ImageFile,
        explicit: Option<&ProviderConfig>,
    ) -> Result<DiagnosisResult> {
        let service = match explicit {
            Some(provider_config) => self.create(provider_config)?,
            None => self.default_service()?,
        };
        service.analyze(file).await
    }
}
