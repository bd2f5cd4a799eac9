//! `roamer config`: Configuration commands.

use roamer_config::AppConfig;

const REDACTED: &str = "***";

pub fn print_default() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::default_toml());
    Ok(())
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", toml::to_string_pretty(&redacted(config))?);
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");
            if !config.has_api_key() {
                println!("   ⚠️  No API key set (set ROAMER_API_KEY, OPENAI_API_KEY or OPENROUTER_API_KEY)");
            }
            println!();
            println!("   Provider:     {}", config.default_provider);
            println!("   Model:        {}", roamer_providers::default_model(&config));
            println!("   History:      {} turns", config.memory.max_history);
            println!("   Timeout:      {}s", config.agents.call_timeout_secs);
            println!("   Prompt TTL:   {}s", config.prompts.cache_ttl_secs);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// A copy of `config` with every API key masked.
fn redacted(mut config: AppConfig) -> AppConfig {
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }
    config
}
