//! Question routing.
//!
//! One JSON-mode classification call per request, never retried, never
//! cached. Connectivity failures propagate; an unparseable or
//! unrecognized response falls open to `GeneralKnowledge`, the safest
//! context-free path.

use oxpecker_core::error::Error;
use oxpecker_core::message::Message;
use oxpecker_core::provider::{GenerationRequest, Provider};
use oxpecker_core::route::RouteDecision;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompts::ROUTER_PROMPT;

pub struct Router {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Router {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Classify `question` into a source category.
    pub async fn route(&self, question: &str) -> Result<RouteDecision, Error> {
        let request = GenerationRequest::classification(
            self.model.clone(),
            vec![Message::system(ROUTER_PROMPT), Message::user(question)],
        );

        let response = self.provider.complete(request).await?;
        let decision = parse_route(&response.content);
        debug!(?decision, "Routed question");
        Ok(decision)
    }
}

/// Extract the `datasource` field from a classifier response.
fn parse_route(content: &str) -> RouteDecision {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => match value.get("datasource").and_then(|v| v.as_str()) {
            Some(datasource) => RouteDecision::parse(datasource),
            None => {
                warn!(response = %content, "Router response missing datasource, defaulting to general knowledge");
                RouteDecision::GeneralKnowledge
            }
        },
        Err(_) => {
            warn!(response = %content, "Unparseable router response, defaulting to general knowledge");
            RouteDecision::GeneralKnowledge
        }
    }
}
