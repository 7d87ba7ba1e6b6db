//! Session runtime
//!
//! One `ChatSession` per session id, each owning its transcript. Input for a
//! session is processed one exchange at a time; sessions never share state.


use crate::assembler::RequestAssembler;
use crate::conversation::{ConversationStore, EmptyTurn, ImageBlob, Turn, Turns};
use crate::llm::ContentPayload;
use crate::state_machine::{transition, Effect, Event, ExchangeContext, ExchangeState, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Why an input event could not be processed
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Empty(#[from] EmptyTurn),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Exchange aborted: {0}")]
    Aborted(String),
}

/// What one exchange left behind, read under the session lock
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// The user turn followed by the reply or the rendered error
    pub appended: Vec<Turn>,
    /// The whole transcript right after this exchange
    pub transcript: Vec<Turn>,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: ExchangeState,
    pub turns: Vec<Turn>,
}

/// State for one chat session
#[derive(Debug)]
pub struct ChatSession {
    id: String,
    store: ConversationStore,
    state: ExchangeState,
    context: ExchangeContext,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, store: ConversationStore, context: ExchangeContext) -> Self {
        Self {
            id: id.into(),
            store,
            state: ExchangeState::Composing,
            context,
        }
    }

    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    pub fn turns(&self) -> Turns<'_> {
        self.store.all()
    }

    /// Run one input event through a full exchange
    ///
    /// Returns the turns this exchange appended: the user turn followed by
    /// either the reply or the rendered error. Backend failures are not
    /// errors here; they end up in the transcript.
    pub async fn handle_input(
        &mut self,
        assembler: &RequestAssembler,
        text: String,
        image: Option<ImageBlob>,
    ) -> Result<Vec<Turn>, InputError> {
        let payload = assembler.build_request(self.store.all(), &text, image.as_ref());
        let turn = Turn::user(text, image)?;

        let mut appended = Vec::new();
        let mut next = Some(Event::UserInput { turn, payload });

        while let Some(event) = next.take() {
            if let Some(payload) = self.step(event, &mut appended)? {
                next = Some(match assembler.submit(payload).await {
                    Ok(text) => Event::BackendReplied { text },
                    Err(error) => {
                        tracing::warn!(
                            session = %self.id,
                            error = %error,
                            "Model call failed, recording error turn"
                        );
                        Event::BackendFailed { error }
                    }
                });
            }
        }

        Ok(appended)
    }

    /// Wipe the transcript
    pub fn clear(&mut self) -> Result<(), InputError> {
        self.step(Event::Clear, &mut Vec::new())?;
        Ok(())
    }

    /// Apply one event and run its local effects. A model request is handed
    /// back to the caller instead of being run here.
    fn step(
        &mut self,
        event: Event,
        appended: &mut Vec<Turn>,
    ) -> Result<Option<ContentPayload>, TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;

        let mut request = None;
        for effect in result.effects {
            match effect {
                Effect::AppendTurn(turn) => {
                    appended.push(turn.clone());
                    self.store.append(turn);
                }
                Effect::RequestModel(payload) => request = Some(payload),
                Effect::ClearTranscript => self.store.clear(),
            }
        }
        tracing::debug!(
            session = %self.id,
            state = self.state.name(),
            turns = self.store.len(),
            "Exchange transition"
        );
        Ok(request)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state().clone(),
            turns: self.turns().cloned().collect(),
        }
    }
}

pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// Manager for all chat sessions
pub struct SessionManager {
    assembler: Arc<RequestAssembler>,
    max_turns: usize,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    /// `max_turns` of 0 leaves transcripts unbounded
    pub fn new(assembler: Arc<RequestAssembler>, max_turns: usize) -> Self {
        Self {
            assembler,
            max_turns,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn assembler(&self) -> &Arc<RequestAssembler> {
        &self.assembler
    }

    /// Start a session under a fresh id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.get_or_create(&id).await;
        id
    }

    /// Get a session, creating it on first input
    async fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.get(id).await {
            return handle;
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return Arc::clone(handle);
        }
        let handle = Arc::new(Mutex::new(ChatSession::new(
            id,
            ConversationStore::with_max_turns(self.max_turns),
            ExchangeContext::new(self.assembler.error_prefix()),
        )));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        tracing::info!(session = %id, active = sessions.len(), "Session created");
        handle
    }

    /// Look up a session without creating it
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// End a session, dropping its transcript
    pub async fn end(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session ended");
        }
        removed
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// State and transcript of a session, `None` if it does not exist
    ///
    /// Waits for an in-flight exchange to finish. Unknown ids are not
    /// created.
    pub async fn snapshot(&self, id: &str) -> Option<SessionSnapshot> {
        let handle = self.get(id).await?;
        let session = handle.lock().await;
        let snapshot = session.snapshot();
        Some(snapshot)
    }

    /// Process an input event for a session
    ///
    /// The exchange runs on its own task so that a dropped caller (a closed
    /// HTTP connection) cannot leave the session stuck mid-exchange.
    pub async fn submit(
        &self,
        id: &str,
        text: String,
        image: Option<ImageBlob>,
    ) -> Result<ExchangeOutcome, InputError> {
        let handle = self.get_or_create(id).await;
        let assembler = Arc::clone(&self.assembler);

        tokio::spawn(async move {
            let mut session = handle.lock().await;
            let appended = session.handle_input(&assembler, text, image).await?;
            let transcript = session.turns().cloned().collect();
            Ok::<_, InputError>(ExchangeOutcome {
                appended,
                transcript,
            })
        })
        .await
        .map_err(|e| InputError::Aborted(e.to_string()))?
    }

    /// Wipe a session's transcript. Clearing an unknown session is a no-op.
    pub async fn clear(&self, id: &str) -> Result<(), InputError> {
        let Some(handle) = self.get(id).await else {
            return Ok(());
        };
        let mut session = handle.lock().await;
        session.clear()?;
        tracing::info!(session = %id, "Transcript cleared");
        Ok(())
    }
}
