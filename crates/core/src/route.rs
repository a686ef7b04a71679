//! Routing and grading verdicts.
//!
//! Both classifiers return free-form model output on the wire; these
//! closed enums are the only representation the rest of the pipeline
//! ever sees. Each carries an explicit fallback so an unrecognized or
//! malformed classifier response degrades to a defined behavior
//! instead of an error.

use serde::{Deserialize, Serialize};

/// Which information source should answer a question.
///
/// Computed fresh for every request, never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    /// Course/meta information held in the vector store.
    #[serde(rename = "vector_database")]
    VectorSource,
    /// Working hours, metrics, and risk data from the project database.
    #[serde(rename = "project_database")]
    ProjectSource,
    /// Everything else — answer from the model's general knowledge.
    #[serde(rename = "general_knowledge")]
    GeneralKnowledge,
}

impl RouteDecision {
    /// Parse a classifier datasource value.
    ///
    /// Fails open: anything unrecognized becomes `GeneralKnowledge`,
    /// the safest context-free path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "vector_database" => Self::VectorSource,
            "project_database" => Self::ProjectSource,
            _ => Self::GeneralKnowledge,
        }
    }
}

/// Binary relevance verdict for one retrieved passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    #[serde(rename = "yes")]
    Relevant,
    #[serde(rename = "no")]
    Irrelevant,
}

impl Grade {
    /// Parse a classifier score value.
    ///
    /// Fails closed: anything that is not an explicit "yes" excludes
    /// the passage, so malformed output never leaks noise into the
    /// assembled context.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "yes" => Self::Relevant,
            _ => Self::Irrelevant,
        }
    }

    pub fn is_relevant(self) -> bool {
        matches!(self, Self::Relevant)
    }
}
