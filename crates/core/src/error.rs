//! Error types for the Oxpecker domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Classification-layer ambiguity (an unparseable router or grader
//! response) is deliberately *not* represented here: those cases are
//! absorbed locally with documented fallback defaults and never
//! propagate as errors.

use thiserror::Error;

/// The top-level error type for all Oxpecker operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Boundary input errors ---
    #[error("Invalid input: {message}")]
    Input { message: String },

    // --- Generation backend errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Vector store / retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Session history errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Project data provider errors ---
    #[error("Project data error: {0}")]
    ProjectData(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Construct a boundary input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input { message: message.into() }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Ingestion failed for {url}: {reason}")]
    IngestFailed { url: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Token budget too small: {budget} tokens cannot fit the system message")]
    BudgetTooSmall { budget: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 503,
            message: "backend unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("backend unavailable"));
    }

    #[test]
    fn input_error_displays_message() {
        let err = Error::input("question must not be blank");
        assert!(err.to_string().contains("question must not be blank"));
    }

    #[test]
    fn history_error_displays_budget() {
        let err = Error::History(HistoryError::BudgetTooSmall { budget: 3 });
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn ingest_error_displays_url_and_reason() {
        let err = Error::Retrieval(RetrievalError::IngestFailed {
            url: "https://example.edu/schedule".into(),
            reason: "backend returned no embedding vectors".into(),
        });
        assert!(err.to_string().contains("https://example.edu/schedule"));
        assert!(err.to_string().contains("no embedding vectors"));
    }
}
