//! Server-held chat sessions, one per upload.
//!
//! Sessions live in process memory only and vanish on restart, like the files
//! they point at. Locks are held for bookkeeping only, never across a model call.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::conversation::{to_contents, ChatMessage, Conversation};
use crate::chat::update_detector::looks_like_updated_resume;
use crate::config::DEFAULT_MAX_SESSIONS;
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::resume::latex::{refresh_artifact, TemplateRenderer};
use crate::storage::FileStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub conversation: Conversation,
    /// Artifact refreshed when a reply looks like a revised resume.
    pub artifact_name: String,
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    /// Insertion order, oldest first.
    order: VecDeque<Uuid>,
}

/// Bounded session map. Opening a session past `capacity` drops the oldest.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<Sessions>,
    capacity: usize,
}

/// Outcome of one confirmed exchange.
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub messages: Vec<ChatMessage>,
    /// Set when the reply triggered a background artifact refresh.
    pub artifact_refresh: Option<JoinHandle<()>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Opens a session for a fresh upload (state `AwaitingFirstResponse`).
    pub async fn open(&self, resume_text: &str, artifact_name: &str) -> Result<Uuid, AppError> {
        let mut conversation = Conversation::new();
        conversation.attach_resume(resume_text)?;

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        sessions.by_id.insert(
            id,
            Session {
                conversation,
                artifact_name: artifact_name.to_string(),
            },
        );
        sessions.order.push_back(id);

        while sessions.by_id.len() > self.capacity {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            sessions.by_id.remove(&oldest);
            info!(session_id = %oldest, "Chat session evicted");
        }

        info!(session_id = %id, "Chat session opened");
        Ok(id)
    }

    /// Runs `f` against the session under the write lock.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        f(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }
}

/// Runs a whole exchange on its own task. Dropping the caller (a client
/// disconnect) does not interrupt it, so the turn is always confirmed or
/// rolled back and the conversation never stays pending.
async fn run_detached<F>(exchange: F) -> Result<TurnOutcome, AppError>
where
    F: Future<Output = Result<TurnOutcome, AppError>> + Send + 'static,
{
    tokio::spawn(exchange)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Chat exchange task failed: {e}")))?
}

/// Sends the synthesized summary turn and activates the conversation.
pub async fn request_summary(
    sessions: &Arc<SessionStore>,
    llm: Arc<dyn LanguageModel>,
    id: Uuid,
) -> Result<TurnOutcome, AppError> {
    let sessions = Arc::clone(sessions);
    run_detached(async move {
        let request = sessions
            .with_session(id, |s| s.conversation.begin_summary())
            .await?;

        match llm.generate(to_contents(&request)).await {
            Ok(reply) => {
                let messages = sessions
                    .with_session(id, |s| {
                        s.conversation.complete_summary(reply.clone());
                        Ok(s.conversation.messages())
                    })
                    .await?;
                Ok(TurnOutcome {
                    reply,
                    messages,
                    artifact_refresh: None,
                })
            }
            Err(err) => {
                sessions
                    .with_session(id, |s| {
                        s.conversation.fail_summary();
                        Ok(())
                    })
                    .await?;
                Err(err.into())
            }
        }
    })
    .await
}

/// Appends a user turn, asks the model, and either confirms or rolls back.
///
/// When the reply looks like a revised resume the artifact is refreshed in the
/// background; that task never affects the conversation.
pub async fn send_message(
    sessions: &Arc<SessionStore>,
    llm: Arc<dyn LanguageModel>,
    renderer: &TemplateRenderer,
    store: &FileStore,
    id: Uuid,
    content: &str,
) -> Result<TurnOutcome, AppError> {
    let sessions = Arc::clone(sessions);
    let renderer = renderer.clone();
    let store = store.clone();
    let content = content.to_string();

    run_detached(async move {
        let request = sessions
            .with_session(id, |s| s.conversation.push_user(content))
            .await?;

        let reply = match llm.generate(to_contents(&request)).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(session_id = %id, "Chat turn failed, rolling back user message");
                sessions
                    .with_session(id, |s| {
                        s.conversation.rollback_turn();
                        Ok(())
                    })
                    .await?;
                return Err(err.into());
            }
        };

        let (messages, resume_text, artifact_name) = sessions
            .with_session(id, |s| {
                s.conversation.complete_turn(reply.clone());
                Ok((
                    s.conversation.messages(),
                    s.conversation.resume_text().to_string(),
                    s.artifact_name.clone(),
                ))
            })
            .await?;

        let artifact_refresh = looks_like_updated_resume(&reply).then(|| {
            spawn_artifact_refresh(renderer, store, artifact_name, resume_text, reply.clone())
        });

        Ok(TurnOutcome {
            reply,
            messages,
            artifact_refresh,
        })
    })
    .await
}

/// Fire-and-forget artifact refresh. Failures are logged and dropped.
pub fn spawn_artifact_refresh(
    renderer: TemplateRenderer,
    store: FileStore,
    artifact_name: String,
    original_resume: String,
    suggestion: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match refresh_artifact(&renderer, &store, &artifact_name, &original_resume, &suggestion).await {
            Ok(_) => info!(artifact = %artifact_name, "Background artifact refresh complete"),
            Err(e) => warn!(artifact = %artifact_name, "Background artifact refresh failed: {e}"),
        }
    })
}
