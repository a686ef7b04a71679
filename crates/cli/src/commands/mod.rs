pub mod chat;
pub mod ingest;
pub mod onboard;

use oxpecker_config::AppConfig;
use oxpecker_providers::OpenAiCompatProvider;
use std::sync::Arc;
use std::time::Duration;

/// Build the generation provider from config.
///
/// With no API key the backend is assumed to be a local Ollama-style
/// endpoint that accepts any key.
pub(crate) fn build_provider(config: &AppConfig) -> Arc<OpenAiCompatProvider> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let provider = match &config.api_key {
        Some(key) => {
            OpenAiCompatProvider::with_timeout("openai_compat", &config.base_url, key, timeout)
        }
        None => OpenAiCompatProvider::with_timeout("ollama", &config.base_url, "ollama", timeout),
    };
    Arc::new(provider)
}
