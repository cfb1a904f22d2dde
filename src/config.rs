use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Name of the legacy environment variable carrying the provider secret
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Settings for the OpenAI-compatible vision provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Display name, used in the connectivity probe reply
    #[serde(default = "default_provider_name")]
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// Text-only model used by the connectivity probe
    #[serde(default = "default_probe_model")]
    pub probe_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_probe_max_tokens")]
    pub probe_max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            vision_model: default_vision_model(),
            probe_model: default_probe_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            probe_max_tokens: default_probe_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Category name -> price per kilogram, overriding the built-in table
    #[serde(default)]
    pub prices: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_provider_name() -> String {
    "Groq".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_vision_model() -> String {
    "llava-v1.5-7b-4096-preview".to_string()
}

fn default_probe_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    300
}

fn default_probe_max_tokens() -> u32 {
    10
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://your-frontend.vercel.app".to_string(),
    ]
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from an optional file, `ECOCYCLE__*` variables and `GROQ_API_KEY`.
///
/// Fails when the result does not validate, most notably when no API key is set.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("ECOCYCLE").separator("__"))
        .build()?;

    let mut cfg: Config = settings.try_deserialize()?;

    if cfg.provider.api_key.trim().is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.provider.api_key = key;
        }
    }

    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.provider.api_key.trim().is_empty() {
        anyhow::bail!(
            "{} not found: set it in the environment or as provider.api_key",
            API_KEY_ENV
        );
    }

    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be greater than zero");
    }

    if cfg.provider.timeout_seconds == 0 {
        anyhow::bail!("provider.timeout_seconds must be greater than zero");
    }

    if cfg.provider.base_url.trim().is_empty() {
        anyhow::bail!("provider.base_url cannot be empty");
    }

    if !(0.0..=2.0).contains(&cfg.provider.temperature) {
        anyhow::bail!(
            "provider.temperature must be within [0, 2], got {}",
            cfg.provider.temperature
        );
    }

    crate::classifier::PricingTable::with_overrides(&cfg.pricing.prices)?;

    if cfg.metrics.enabled {
        let endpoint = cfg.metrics.endpoint.as_str();
        if !endpoint.starts_with('/') {
            anyhow::bail!("metrics.endpoint must start with '/': {}", endpoint);
        }
        if matches!(endpoint, "/" | "/classify" | "/test") {
            anyhow::bail!("metrics.endpoint '{}' collides with a service route", endpoint);
        }
    }

    Ok(())
}
