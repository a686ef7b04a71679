//! # Oxpecker Core
//!
//! Domain types, traits, and error definitions for the Oxpecker
//! retrieval-augmented chat service. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (generation backend, vector store,
//! project data provider) is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod project;
pub mod provider;
pub mod retrieval;
pub mod route;
pub mod token;

// Re-export key types at crate root for ergonomics
pub use error::{Error, HistoryError, ProviderError, Result, RetrievalError};
pub use message::{Message, Role, SessionKey};
pub use project::ProjectDataProvider;
pub use provider::{
    EmbeddingRequest, EmbeddingResponse, GenerationRequest, Provider, StreamChunk, Usage,
};
pub use retrieval::{Document, RetrievedPassage, VectorStore};
pub use route::{Grade, RouteDecision};
