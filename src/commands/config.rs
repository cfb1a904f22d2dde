use anyhow::Result;
use colored::Colorize;
use ecocycle_classifier::{
    config::{self, Config},
    logging::SensitiveApiKey,
};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration with the API key masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", serde_json::to_string_pretty(&sanitized)?);

    Ok(())
}

fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.provider.api_key = SensitiveApiKey::new(&cfg.provider.api_key).to_string();
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecocycle_classifier::config::{CorsConfig, MetricsConfig, PricingConfig, ProviderConfig, ServerConfig};

    #[test]
    fn test_sanitize_secrets_masks_api_key() {
        let cfg = Config {
            server: ServerConfig::default(),
            provider: ProviderConfig {
                api_key: "gsk_live_0123456789".to_string(),
                ..ProviderConfig::default()
            },
            cors: CorsConfig::default(),
            pricing: PricingConfig::default(),
            metrics: MetricsConfig::default(),
        };

        let sanitized = sanitize_secrets(&cfg);
        assert_eq!(sanitized.provider.api_key, "gsk_live***");
        assert_eq!(sanitized.provider.base_url, cfg.provider.base_url);
    }
}
