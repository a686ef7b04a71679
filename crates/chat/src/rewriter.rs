//! Question rewriting for the single retrieval retry.
//!
//! Invoked only when grading leaves nothing. A blank rewrite falls
//! back to the original question so the retry always has something to
//! embed.

use oxpecker_core::error::Error;
use oxpecker_core::message::Message;
use oxpecker_core::provider::{GenerationRequest, Provider};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompts::REWRITER_PROMPT;

pub struct Rewriter {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Rewriter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Reformulate `question` for better vector retrieval.
    pub async fn rewrite(&self, question: &str) -> Result<String, Error> {
        let prompt = REWRITER_PROMPT.replace("{question}", question);
        let mut request =
            GenerationRequest::chat(self.model.clone(), vec![Message::user(prompt)]);
        request.temperature = 0.0;

        let response = self.provider.complete(request).await?;
        let rewritten = response.content.trim();
        if rewritten.is_empty() {
            warn!("Rewriter produced an empty question, keeping the original");
            return Ok(question.to_string());
        }

        debug!(rewritten, "Rewrote question");
        Ok(rewritten.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockBackend;

    #[tokio::test]
    async fn returns_trimmed_rewrite() {
        let backend = Arc::new(MockBackend::completions(vec![
            "  What is the submission deadline for the final report?\n".into(),
        ]));
        let rewriter = Rewriter::new(backend.clone(), "llama3.1");

        let rewritten = rewriter.rewrite("deadline?").await.unwrap();
        assert_eq!(
            rewritten,
            "What is the submission deadline for the final report?"
        );

        let requests = backend.recorded_requests();
        assert_eq!(requests[0].temperature, 0.0);
        assert!(!requests[0].json);
        assert!(requests[0].messages[0].content.contains("deadline?"));
    }

    #[tokio::test]
    async fn blank_rewrite_keeps_original() {
        let backend = Arc::new(MockBackend::completions(vec!["   \n".into()]));
        let rewriter = Rewriter::new(backend, "llama3.1");

        let rewritten = rewriter.rewrite("deadline?").await.unwrap();
        assert_eq!(rewritten, "deadline?");
    }
}
