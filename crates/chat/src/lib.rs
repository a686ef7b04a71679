//! The query-orchestration pipeline — the heart of Oxpecker.
//!
//! A chat turn flows through a fixed decision pipeline:
//!
//! 1. **Route** the question to a source (vector store, project data,
//!    or general knowledge)
//! 2. **Retrieve** and **grade** supporting passages for vector-routed
//!    questions
//! 3. **Rewrite** the question and retrieve once more when grading
//!    leaves nothing (one attempt, never a loop)
//! 4. **Assemble** the instruction text
//! 5. **Trim** session history to the token budget
//! 6. **Generate** and stream the answer, then append the completed
//!    turn to session history

pub mod assembler;
pub mod grader;
pub mod orchestrator;
pub mod prompts;
pub mod rewriter;
pub mod router;
pub mod stream_event;

pub use assembler::assemble;
pub use grader::Grader;
pub use orchestrator::ChatOrchestrator;
pub use rewriter::Rewriter;
pub use router::Router;
pub use stream_event::ChatStreamEvent;

#[cfg(test)]
pub(crate) mod test_helpers;
