use crate::image::MAX_FILE_SIZE;
use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable selecting the default provider
pub const PROVIDER_ENV: &str = "DESIGN_LENS_PROVIDER";
/// Environment variable overriding the default provider's endpoint
pub const API_URL_ENV: &str = "DESIGN_LENS_API_URL";
/// Environment variable enabling verbose logging
pub const VERBOSE_ENV: &str = "DESIGN_LENS_VERBOSE";

/// Configuration structure for Design Lens
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Provider used when none is given explicitly
    #[serde(default)]
    pub default_provider: Provider,
    /// Provider-specific settings, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential, endpoint and model for one provider
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FallbackConfig {
    /// Providers tried by the fallback analyzer, first to last
    #[serde(default = "default_fallback_order")]
    pub order: Vec<Provider>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            order: default_fallback_order(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Simulated latency of the mock provider
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
    /// Largest accepted input file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mock_delay_ms: default_mock_delay_ms(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl AnalysisConfig {
    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Include HTTP library logs
    #[serde(default)]
    pub verbose: bool,
}

fn default_fallback_order() -> Vec<Provider> {
    Provider::FALLBACK_ORDER.to_vec()
}

fn default_mock_delay_ms() -> u64 {
    3000
}

fn default_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: Provider::default(),
            providers: HashMap::new(),
            fallback: FallbackConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration file (if any), then apply environment overrides
    ///
    /// The result carries environment secrets; edit and save [`Config::load_file`] instead.
    pub fn load() -> Result<Self> {
        let config = Self::load_file()?.with_env_from(|name| std::env::var(name).ok())?;
        log_debug!("Configuration loaded: {:?}", config.masked());
        Ok(config)
    }

    /// The configuration file alone, without environment overrides
    pub fn load_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// A copy with environment overrides applied, leaving `self` as stored on disk
    pub fn with_env_from<F>(&self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut effective = self.clone();
        effective.apply_env_with(lookup)?;
        Ok(effective)
    }

    /// Default configuration derived from the environment only
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid configuration file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject provider tables that do not name a known provider, or name one twice
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<Provider, &str> = HashMap::new();
        for name in self.providers.keys() {
            let provider = name
                .parse::<Provider>()
                .map_err(|e| anyhow!("Invalid [providers.{name}] table: {e}"))?;
            if let Some(other) = seen.insert(provider, name) {
                return Err(anyhow!(
                    "[providers.{other}] and [providers.{name}] both configure {provider}"
                ));
            }
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to read variables
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(tag) = lookup(PROVIDER_ENV) {
            self.default_provider = tag
                .parse()
                .with_context(|| format!("Invalid {PROVIDER_ENV}"))?;
        }

        for provider in Provider::ALL {
            let Some(env_name) = provider.api_key_env() else {
                continue;
            };
            if let Some(key) = lookup(env_name) {
                self.settings_mut(*provider).api_key = Some(key);
            }
        }

        if let Some(url) = lookup(API_URL_ENV) {
            let provider = self.default_provider;
            self.settings_mut(provider).api_url = Some(url);
        }

        if lookup(VERBOSE_ENV).is_some() {
            self.logging.verbose = true;
        }

        Ok(())
    }

    fn settings(&self, provider: Provider) -> Option<&ProviderSettings> {
        self.providers.get(provider.name()).or_else(|| {
            // Tables may use an alias such as "anthropic"
            self.providers
                .iter()
                .find(|(name, _)| name.parse::<Provider>().ok() == Some(provider))
                .map(|(_, settings)| settings)
        })
    }

    fn settings_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        let key = self
            .providers
            .keys()
            .find(|name| name.parse::<Provider>().ok() == Some(provider))
            .cloned()
            .unwrap_or_else(|| provider.name().to_string());
        self.providers.entry(key).or_default()
    }

    /// Build the factory input for `provider`
    pub fn provider_config(&self, provider: Provider) -> ProviderConfig {
        let settings = self.settings(provider).cloned().unwrap_or_default();
        ProviderConfig {
            provider,
            api_key: settings.api_key,
            api_url: settings.api_url,
            model: settings.model,
        }
    }

    pub fn default_provider_config(&self) -> ProviderConfig {
        self.provider_config(self.default_provider)
    }

    /// Fallback candidates in priority order, skipping providers without a key
    pub fn fallback_configs(&self) -> Vec<ProviderConfig> {
        let mut seen = Vec::new();
        self.fallback
            .order
            .iter()
            .filter(|provider| {
                let first = !seen.contains(*provider);
                seen.push(**provider);
                first
            })
            .map(|provider| self.provider_config(*provider))
            .filter(ProviderConfig::has_api_key)
            .collect()
    }

    /// Update the configuration with new values
    pub fn update(
        &mut self,
        provider: Option<Provider>,
        api_key: Option<String>,
        api_url: Option<String>,
        model: Option<String>,
    ) {
        if let Some(provider) = provider {
            self.default_provider = provider;
        }

        let settings = self.settings_mut(self.default_provider);
        if let Some(key) = api_key {
            settings.api_key = Some(key);
        }
        if let Some(url) = api_url {
            settings.api_url = Some(url);
        }
        if let Some(model) = model {
            settings.model = Some(model);
        }

        log_debug!("Configuration updated: {:?}", self.masked());
    }

    /// Save the configuration to the file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log_debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// A copy with API keys masked, safe to print or log
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        for settings in copy.providers.values_mut() {
            if let Some(key) = settings.api_key.as_mut() {
                *key = mask_key(key);
            }
        }
        copy
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("design-lens");
        fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }
}

/// Keep the first four characters of a key; short keys show only their length
pub fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 8 {
        return format!("… ({len} chars)");
    }
    let visible: String = key.chars().take(4).collect();
    format!("{visible}… ({len} chars)")
}
