//! Project data provider trait.
//!
//! The metrics backend (SQL extraction, report formatting) is a
//! collaborator; the orchestration core only needs the finished text
//! blob it folds into a session's system message at creation time.

use async_trait::async_trait;
use crate::error::Error;

/// Supplies a pre-formatted, multi-section project report for a
/// project identifier.
#[async_trait]
pub trait ProjectDataProvider: Send + Sync {
    /// Fetch and format the project context for `project_id`.
    async fn project_context(&self, project_id: i64) -> std::result::Result<String, Error>;
}

/// A provider that always returns a fixed blob — for tests and for
/// deployments without a metrics backend.
pub struct StaticProjectData {
    context: String,
}

impl StaticProjectData {
    pub fn new(context: impl Into<String>) -> Self {
        Self { context: context.into() }
    }
}

#[async_trait]
impl ProjectDataProvider for StaticProjectData {
    async fn project_context(&self, _project_id: i64) -> std::result::Result<String, Error> {
        Ok(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_blob() {
        let provider = StaticProjectData::new("Project hours: 120/200");
        let context = provider.project_context(7).await.unwrap();
        assert_eq!(context, "Project hours: 120/200");
    }
}
