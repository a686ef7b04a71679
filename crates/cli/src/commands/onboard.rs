//! `oxpecker onboard` — Write a default configuration file.

use oxpecker_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        println!("Edit it directly, or delete it and re-run `oxpecker onboard`.");
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;

    println!("Wrote default config to {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  - Point base_url at your OpenAI-compatible backend");
    println!("    (the default expects a local Ollama at http://localhost:11434/v1)");
    println!("  - Set an API key via OXPECKER_API_KEY or OPENAI_API_KEY if the");
    println!("    backend requires one");
    println!("  - Run `oxpecker chat` to start a session");

    Ok(())
}
