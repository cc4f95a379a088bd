pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Headroom over the file ceiling for multipart framing and other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_handler))
        // Chat
        .route("/chat", post(chat::handle_chat))
        .route("/sessions/:id/summary", post(chat::handle_session_summary))
        .route("/sessions/:id/messages", post(chat::handle_session_message))
        // Resume pipeline
        .route("/upload", post(resume::handle_upload))
        .route("/render-latex", post(resume::handle_render_latex))
        .route("/update-artifact", post(resume::handle_update_artifact))
        .route("/read-artifact", post(resume::handle_read_artifact))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
