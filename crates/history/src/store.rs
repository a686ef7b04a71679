//! The keyed session store.
//!
//! One session per session key, created on first reference. The
//! session's system message is built at creation: the base instruction
//! alone, or base instruction + project context when a project id is
//! supplied on the first call. The choice is fixed for the session's
//! lifetime — a later call with a different project id does not
//! rebuild the system message (current behavior, kept deliberately;
//! see DESIGN.md).
//!
//! Concurrency: the global map lock is only ever held for map
//! operations, never across an await into a collaborator. Message
//! access goes through a per-session mutex so a turn's user/assistant
//! pair is appended atomically while distinct sessions stay fully
//! independent.

use chrono::{DateTime, Duration, Utc};
use oxpecker_core::error::Error;
use oxpecker_core::message::{Message, SessionKey};
use oxpecker_core::project::ProjectDataProvider;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// One live session: ordered messages plus lifecycle timestamps.
pub struct SessionHandle {
    key: SessionKey,
    project_id: Option<i64>,
    messages: Mutex<Vec<Message>>,
    created_at: DateTime<Utc>,
    last_accessed: StdMutex<DateTime<Utc>>,
}

impl SessionHandle {
    fn new(key: SessionKey, project_id: Option<i64>, system_message: Message) -> Self {
        let now = Utc::now();
        Self {
            key,
            project_id,
            messages: Mutex::new(vec![system_message]),
            created_at: now,
            last_accessed: StdMutex::new(now),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// The project id supplied when this session was created, if any.
    pub fn project_id(&self) -> Option<i64> {
        self.project_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        *self.last_accessed.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self) {
        let mut guard = self.last_accessed.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Utc::now();
    }

    /// A point-in-time copy of the session's messages.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Append a completed turn — the user message and the assistant
    /// answer — under one lock acquisition, so concurrent turns on the
    /// same session can never interleave their pairs.
    pub async fn append_turn(&self, user: Message, assistant: Message) {
        let mut messages = self.messages.lock().await;
        messages.push(user);
        messages.push(assistant);
        drop(messages);
        self.touch();
    }
}

/// Summary of one session, for diagnostics.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub key: SessionKey,
    pub message_count: usize,
    pub project_id: Option<i64>,
    pub last_accessed: DateTime<Utc>,
}

/// The shared session store.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Arc<SessionHandle>>>,
    base_prompt: String,
    /// Template appended to the base prompt when project data is
    /// available; must contain a `{data}` placeholder.
    data_preamble: String,
    project_data: Option<Arc<dyn ProjectDataProvider>>,
}

impl SessionStore {
    pub fn new(
        base_prompt: impl Into<String>,
        data_preamble: impl Into<String>,
        project_data: Option<Arc<dyn ProjectDataProvider>>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            base_prompt: base_prompt.into(),
            data_preamble: data_preamble.into(),
            project_data,
        }
    }

    /// Get the session for `key`, creating it on first reference.
    ///
    /// `project_id` only matters on the creating call: it selects
    /// whether the system message carries project context.
    pub async fn get_or_create(
        &self,
        key: &SessionKey,
        project_id: Option<i64>,
    ) -> Result<Arc<SessionHandle>, Error> {
        if let Some(session) = self.sessions.read().await.get(key) {
            session.touch();
            return Ok(session.clone());
        }

        // Fetch project context before taking the write lock.
        let system_prompt = match (project_id, &self.project_data) {
            (Some(id), Some(provider)) => {
                let data = provider.project_context(id).await?;
                debug!(session = %key, project_id = id, "Building system prompt with project data");
                format!(
                    "{}\n\n{}",
                    self.base_prompt,
                    self.data_preamble.replace("{data}", &data)
                )
            }
            _ => self.base_prompt.clone(),
        };

        let mut sessions = self.sessions.write().await;
        // Another turn may have created the session while we fetched
        // project data; there is exactly one session per key.
        if let Some(session) = sessions.get(key) {
            session.touch();
            return Ok(session.clone());
        }

        info!(session = %key, project = ?project_id, "Creating session");
        let session = Arc::new(SessionHandle::new(
            key.clone(),
            project_id,
            Message::system(system_prompt),
        ));
        sessions.insert(key.clone(), session.clone());
        Ok(session)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle for longer than `max_idle`.
    ///
    /// Returns the number of evicted sessions.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_accessed() >= cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Summaries of all live sessions.
    pub async fn sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut infos = Vec::with_capacity(sessions.len());
        for session in sessions.values() {
            infos.push(SessionInfo {
                key: session.key.clone(),
                message_count: session.len().await,
                project_id: session.project_id,
                last_accessed: session.last_accessed(),
            });
        }
        infos
    }
}
