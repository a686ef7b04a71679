//! The chat orchestrator: one `generate()` call runs a full turn.
//!
//! Error handling is all-or-nothing per turn: any failed external call
//! (other than the classifier fallbacks handled inside the router and
//! grader) aborts the turn, and session history is only appended once
//! the answer has streamed to completion. A caller that drops the
//! event receiver cancels the turn; the partial answer is discarded
//! and history is left untouched.

use oxpecker_core::error::{Error, ProviderError};
use oxpecker_core::message::{Message, SessionKey};
use oxpecker_core::provider::{GenerationRequest, Provider};
use oxpecker_core::retrieval::RetrievedPassage;
use oxpecker_core::route::RouteDecision;
use oxpecker_history::{trim, SessionStore};
use oxpecker_retrieval::Retriever;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::grader::Grader;
use crate::rewriter::Rewriter;
use crate::router::Router;
use crate::stream_event::ChatStreamEvent;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_HISTORY_TOKENS: usize = 10_240;
const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct ChatOrchestrator {
    provider: Arc<dyn Provider>,
    router: Router,
    grader: Grader,
    rewriter: Rewriter,
    retriever: Arc<Retriever>,
    sessions: Arc<SessionStore>,
    model: String,
    temperature: f32,
    max_history_tokens: usize,
    call_timeout: Duration,
}

impl ChatOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<Retriever>,
        sessions: Arc<SessionStore>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            router: Router::new(provider.clone(), model.clone()),
            grader: Grader::new(provider.clone(), model.clone()),
            rewriter: Rewriter::new(provider.clone(), model.clone()),
            provider,
            retriever,
            sessions,
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_history_tokens: DEFAULT_MAX_HISTORY_TOKENS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_history_tokens(mut self, max_tokens: usize) -> Self {
        self.max_history_tokens = max_tokens;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Run one chat turn and stream the answer.
    ///
    /// Resolves once generation has started; the returned receiver
    /// yields `Chunk` events followed by exactly one `Done` or `Error`.
    pub async fn generate(
        &self,
        question: &str,
        session_key: &SessionKey,
        project_id: Option<i64>,
    ) -> Result<mpsc::Receiver<ChatStreamEvent>, Error> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::input("question must not be blank"));
        }

        let route = self.bounded(self.router.route(question)).await?;
        info!(session = %session_key, ?route, "Processing question");

        let (effective_question, passages) = match route {
            RouteDecision::VectorSource => self.gather_context(question).await?,
            _ => (question.to_string(), Vec::new()),
        };

        let instruction = assemble(route, &effective_question, &passages);

        let session = self.sessions.get_or_create(session_key, project_id).await?;
        let history = session.snapshot().await;
        let trimmed = trim(&history, self.max_history_tokens, |messages| {
            self.provider.count_tokens(messages)
        })?;

        let mut messages = trimmed;
        messages.push(Message::user(instruction.clone()));

        let mut request = GenerationRequest::chat(self.model.clone(), messages);
        request.temperature = self.temperature;

        let mut upstream = self
            .bounded(async { Ok(self.provider.stream(request).await?) })
            .await?;

        let (tx, rx) = mpsc::channel(32);
        let session = session.clone();
        tokio::spawn(async move {
            let mut answer = String::new();
            while let Some(chunk) = upstream.recv().await {
                match chunk {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content {
                            if !content.is_empty() {
                                answer.push_str(&content);
                                if tx
                                    .send(ChatStreamEvent::Chunk { content })
                                    .await
                                    .is_err()
                                {
                                    // Receiver dropped: turn cancelled,
                                    // discard the partial answer.
                                    debug!(session = %session.key(), "Stream receiver dropped, discarding turn");
                                    return;
                                }
                            }
                        }
                        if chunk.done {
                            session
                                .append_turn(
                                    Message::user(instruction),
                                    Message::assistant(answer),
                                )
                                .await;
                            let _ = tx.send(ChatStreamEvent::Done { usage: chunk.usage }).await;
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(session = %session.key(), error = %err, "Generation stream failed");
                        let _ = tx
                            .send(ChatStreamEvent::Error {
                                message: err.to_string(),
                            })
                            .await;
                        return;
                    }
                }
            }
            // Upstream closed without a final chunk.
            warn!(session = %session.key(), "Generation stream ended without completing");
            let _ = tx
                .send(ChatStreamEvent::Error {
                    message: ProviderError::StreamInterrupted(
                        "stream ended before completion".into(),
                    )
                    .to_string(),
                })
                .await;
        });

        Ok(rx)
    }

    /// Retrieve and grade passages for a vector-routed question.
    ///
    /// When grading rejects everything, rewrite the question and
    /// retrieve once more. The second pass is not graded and its
    /// result is final, even if empty — one retry, never a loop.
    async fn gather_context(
        &self,
        question: &str,
    ) -> Result<(String, Vec<RetrievedPassage>), Error> {
        let passages = self.bounded(self.retriever.retrieve(question)).await?;
        let kept = self.bounded(self.grader.filter(question, passages)).await?;
        if !kept.is_empty() {
            return Ok((question.to_string(), kept));
        }

        debug!("No passage survived grading, rewriting the question");
        let rewritten = self.bounded(self.rewriter.rewrite(question)).await?;
        let passages = self.bounded(self.retriever.retrieve(&rewritten)).await?;
        Ok((rewritten, passages))
    }

    /// Wrap an external call in the configured timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                Error::Provider(ProviderError::Timeout(format!(
                    "call exceeded {}s",
                    self.call_timeout.as_secs()
                )))
            })?
    }
}
