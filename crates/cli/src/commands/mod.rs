pub mod ask;
pub mod capabilities;
pub mod chat;
pub mod config_cmd;
pub mod suggest;

use roamer_config::AppConfig;

/// Load config and fail with setup instructions when no API key is set.
pub(crate) fn load_with_key() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ROAMER_API_KEY       (generic)");
        eprintln!("    OPENAI_API_KEY       (for OpenAI direct)");
        eprintln!("    OPENROUTER_API_KEY   (for OpenRouter)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}
