//! Instruction assembly.
//!
//! Pure text substitution: vector-routed questions get the grounded
//! answer template with the surviving passages joined by newlines;
//! every other route passes the question through untouched. Project
//! data is not injected here — it lives in the session's system prompt.

use oxpecker_core::retrieval::RetrievedPassage;
use oxpecker_core::route::RouteDecision;

use crate::prompts::RAG_TEMPLATE;

/// Build the instruction text sent to the model as the user turn.
pub fn assemble(
    route: RouteDecision,
    question: &str,
    passages: &[RetrievedPassage],
) -> String {
    match route {
        RouteDecision::VectorSource => {
            let documents = passages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            RAG_TEMPLATE
                .replace("{question}", question)
                .replace("{documents}", &documents)
        }
        RouteDecision::ProjectSource | RouteDecision::GeneralKnowledge => question.to_string(),
    }
}
