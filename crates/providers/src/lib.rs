//! Generation backend implementations for Oxpecker.
//!
//! One implementation covers the vast majority of deployments: any
//! OpenAI-compatible `/v1` endpoint (Ollama, OpenAI, OpenRouter, vLLM).
//! Everything upstream talks to the `Provider` trait from
//! `oxpecker-core`, so swapping backends is a configuration change.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
