//! Fallback across hosted providers.
//!
//! [`SmartAnalyzer`] keeps an ordered list of adapters and a cursor. Each
//! call starts at the cursor and walks the list once; a failure moves the
//! cursor to the next adapter, a success leaves it where it is. The cursor
//! survives between calls, so a provider that just failed is tried last next
//! time instead of first, but it is never dropped.

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::error::{AnalysisError, ProviderFailure, Result};
use crate::factory::create_service;
use crate::image::ImageFile;
use crate::providers::Provider;
use crate::types::DiagnosisResult;
use crate::{log_debug, log_info, log_warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Tries providers in priority order until one succeeds
pub struct SmartAnalyzer {
    services: Vec<Arc<dyn AnalysisService>>,
    cursor: Mutex<usize>,
}

impl SmartAnalyzer {
    /// Use `services` in the given order, starting with the first
    pub fn new(services: Vec<Arc<dyn AnalysisService>>) -> Self {
        Self {
            services,
            cursor: Mutex::new(0),
        }
    }

    /// Build from the configured fallback order, skipping providers without a key
    pub fn from_config(config: &Config) -> Result<Self> {
        let services = config
            .fallback_configs()
            .iter()
            .map(|provider_config| create_service(provider_config, config.analysis.mock_delay()))
            .collect::<Result<Vec<_>>>()?;

        log_debug!(
            "Fallback analyzer configured with: {}",
            services
                .iter()
                .map(|s| s.provider().name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self::new(services))
    }

    /// Providers in priority order
    pub fn providers(&self) -> Vec<Provider> {
        self.services.iter().map(|s| s.provider()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Index of the provider the next call starts with
    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    /// Analyze `file`, falling back across providers
    ///
    /// Every provider is attempted at most once per call, one at a time.
    pub async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult> {
        if self.services.is_empty() {
            return Err(AnalysisError::NoProvidersConfigured);
        }

        let total = self.services.len();
        let mut failures = Vec::with_capacity(total);

        // Fixed rotation from the cursor as it was when this call started
        let start = *self.cursor.lock() % total;
        for attempt in 1..=total {
            let index = (start + attempt - 1) % total;
            let service = &self.services[index];
            let provider = service.provider();

            tracing::info!(%provider, attempt, total, file = file.name(), "Trying provider");
            match service.analyze(file).await {
                Ok(result) => {
                    log_info!("{} analysis succeeded", provider);
                    return Ok(result);
                }
                Err(e) => {
                    log_warn!("{} analysis failed (attempt {}/{}): {}", provider, attempt, total, e);
                    self.advance_from(index, total);
                    failures.push(ProviderFailure {
                        provider,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(AnalysisError::AllProvidersExhausted { failures })
    }

    /// Move past `index`, unless a concurrent call already moved the cursor
    fn advance_from(&self, index: usize, total: usize) {
        let mut cursor = self.cursor.lock();
        if *cursor % total == index {
            *cursor = (index + 1) % total;
        }
    }
}
