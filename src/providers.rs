//! Analysis provider configuration.
//!
//! Single source of truth for supported providers and their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported analysis providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Mock,
    OpenAI,
    Claude,
    Gemini,
    Local,
}

impl Provider {
    /// All available providers
    pub const ALL: &'static [Provider] = &[
        Provider::Mock,
        Provider::OpenAI,
        Provider::Claude,
        Provider::Gemini,
        Provider::Local,
    ];

    /// Fallback priority: largest free quota first
    pub const FALLBACK_ORDER: &'static [Provider] =
        &[Provider::Gemini, Provider::Claude, Provider::OpenAI];

    /// Provider name as used in config files and CLI
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAI => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Local => "local",
        }
    }

    /// Whether this provider talks to a hosted vision API
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Claude | Self::Gemini)
    }

    /// Default vision model, if the provider has one
    pub const fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("gpt-4o"),
            Self::Claude => Some("claude-3-5-sonnet-latest"),
            Self::Gemini => Some("gemini-1.5-flash"),
            Self::Mock | Self::Local => None,
        }
    }

    /// Default public endpoint, if the provider has one
    pub const fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1/chat/completions"),
            Self::Claude => Some("https://api.anthropic.com/v1/messages"),
            Self::Gemini => Some("https://generativelanguage.googleapis.com/v1beta/models"),
            Self::Mock | Self::Local => None,
        }
    }

    /// Environment variable name for the API key
    pub const fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Claude => Some("ANTHROPIC_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Mock | Self::Local => None,
        }
    }

    /// Get all provider names as strings
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        // Accept the vendor names as aliases
        let normalized = match lower.as_str() {
            "anthropic" => "claude",
            "google" => "gemini",
            other => other,
        };

        Self::ALL
            .iter()
            .find(|p| p.name() == normalized)
            .copied()
            .ok_or_else(|| ProviderError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Provider configuration error
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}. Supported: mock, openai, claude, gemini, local")]
    Unknown(String),
    #[error("Invalid endpoint override for {provider}: {source}")]
    InvalidEndpoint {
        provider: Provider,
        #[source]
        source: url::ParseError,
    },
}

/// Configuration for a single provider, as handed to the factory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: Provider,
    /// API key (loaded from env or config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The credential, treating an empty string as absent
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Check if this config has an API key set
    pub fn has_api_key(&self) -> bool {
        self.credential().is_some()
    }

    /// Get effective model (configured or default)
    pub fn effective_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.provider.default_model())
    }

    /// Get effective endpoint (override or default), validated as a URL
    pub fn effective_endpoint(&self) -> Result<Option<url::Url>, ProviderError> {
        let raw = self
            .api_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.provider.default_endpoint());

        raw.map(|u| {
            url::Url::parse(u).map_err(|source| ProviderError::InvalidEndpoint {
                provider: self.provider,
                source,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("openai".parse::<Provider>().ok(), Some(Provider::OpenAI));
        assert_eq!("CLAUDE".parse::<Provider>().ok(), Some(Provider::Claude));
        assert_eq!("anthropic".parse::<Provider>().ok(), Some(Provider::Claude));
        assert_eq!("google".parse::<Provider>().ok(), Some(Provider::Gemini));
        assert_eq!("local".parse::<Provider>().ok(), Some(Provider::Local));
        assert!("invalid".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(Provider::default(), Provider::Mock);
        assert_eq!(Provider::Gemini.default_model(), Some("gemini-1.5-flash"));
        assert_eq!(Provider::Claude.api_key_env(), Some("ANTHROPIC_API_KEY"));
        assert!(Provider::Mock.api_key_env().is_none());
        assert!(!Provider::Local.is_remote());
    }

    #[test]
    fn test_empty_key_is_not_a_credential() {
        let config = ProviderConfig::new(Provider::OpenAI).with_api_key("  ");
        assert!(!config.has_api_key());
        assert_eq!(config.credential(), None);
    }

    #[test]
    fn test_effective_endpoint_override() {
        let config =
            ProviderConfig::new(Provider::OpenAI).with_api_url("http://127.0.0.1:9000/v1/chat");
        let url = config
            .effective_endpoint()
            .expect("valid url")
            .expect("endpoint present");
        assert_eq!(url.port(), Some(9000));

        let bad = ProviderConfig::new(Provider::Claude).with_api_url("not a url");
        assert!(bad.effective_endpoint().is_err());

        assert!(
            ProviderConfig::new(Provider::Mock)
                .effective_endpoint()
                .expect("no endpoint is fine")
                .is_none()
        );
    }
}
