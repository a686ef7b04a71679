//! Relevance grading of retrieved passages.
//!
//! One JSON-mode classification call per passage, fanned out
//! concurrently. Results come back in input order, so each verdict is
//! paired with its passage by position. Malformed verdicts fail closed
//! (the passage is dropped); provider failures propagate and fail the
//! whole request.

use futures::future::join_all;
use oxpecker_core::error::Error;
use oxpecker_core::message::Message;
use oxpecker_core::provider::{GenerationRequest, Provider};
use oxpecker_core::retrieval::RetrievedPassage;
use oxpecker_core::route::Grade;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompts::GRADER_PROMPT;

pub struct Grader {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Grader {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Grade each passage against `question` and keep the relevant
    /// ones, preserving retrieval order.
    pub async fn filter(
        &self,
        question: &str,
        passages: Vec<RetrievedPassage>,
    ) -> Result<Vec<RetrievedPassage>, Error> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let total = passages.len();
        let calls = passages
            .iter()
            .map(|passage| self.grade_one(question, &passage.text));
        let verdicts = join_all(calls).await;

        let mut kept = Vec::with_capacity(total);
        for (passage, verdict) in passages.into_iter().zip(verdicts) {
            if verdict?.is_relevant() {
                kept.push(passage);
            }
        }

        debug!(total, kept = kept.len(), "Graded passages");
        Ok(kept)
    }

    async fn grade_one(&self, question: &str, document: &str) -> Result<Grade, Error> {
        let prompt = GRADER_PROMPT
            .replace("{document}", document)
            .replace("{question}", question);
        let request = GenerationRequest::classification(
            self.model.clone(),
            vec![Message::user(prompt)],
        );

        let response = self.provider.complete(request).await?;
        Ok(parse_grade(&response.content))
    }
}

/// Extract the `score` field from a grader response.
fn parse_grade(content: &str) -> Grade {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => match value.get("score").and_then(|v| v.as_str()) {
            Some(score) => Grade::parse(score),
            None => {
                warn!(response = %content, "Grader response missing score, dropping passage");
                Grade::Irrelevant
            }
        },
        Err(_) => {
            warn!(response = %content, "Unparseable grader response, dropping passage");
            Grade::Irrelevant
        }
    }
}
