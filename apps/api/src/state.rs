use std::sync::Arc;

use crate::chat::session::SessionStore;
use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::resume::latex::TemplateRenderer;
use crate::storage::records::ArtifactRegistry;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Production: `GeminiClient`.
    pub llm: Arc<dyn LanguageModel>,
    pub renderer: TemplateRenderer,
    pub store: FileStore,
    /// Upload → artifact mapping keyed by record id.
    pub records: Arc<ArtifactRegistry>,
    pub sessions: Arc<SessionStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            renderer: TemplateRenderer::new(llm.clone(), config.template_path.clone()),
            store: FileStore::new(&config.files_root),
            records: Arc::new(ArtifactRegistry::with_capacity(config.max_sessions)),
            sessions: Arc::new(SessionStore::with_capacity(config.max_sessions)),
            llm,
            config,
        }
    }
}
