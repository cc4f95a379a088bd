//! Axum route handlers for upload, rendering, and artifact access.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppJson};
use crate::resume::extract::{document_part, transcribe, DocumentKind};
use crate::resume::latex::refresh_artifact;
use crate::state::AppState;
use crate::storage::naming::artifact_name_from_file_name;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub uploaded_file_name: String,
    pub tex_file_name: String,
    pub resume_content: String,
    pub record_id: Uuid,
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLatexRequest {
    #[serde(default)]
    pub enhanced_resume: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderLatexResponse {
    pub success: bool,
    pub latex: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtifactRequest {
    #[serde(default)]
    pub ai_suggestion: Option<String>,
    #[serde(default)]
    pub original_resume: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Preferred over `file_name` when present.
    #[serde(default)]
    pub record_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtifactResponse {
    pub success: bool,
    pub message: String,
    pub tex_content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadArtifactRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadArtifactResponse {
    pub success: bool,
    pub content: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn describe_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} byte")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload
///
/// Validates and stores the file, extracts its text, renders the LaTeX
/// artifact, and opens a chat session for it.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(DocumentKind, String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let kind = DocumentKind::from_mime(&content_type).ok_or_else(|| {
            AppError::Validation(
                "Invalid file type. Please upload a PDF, TXT, or DOCX file".to_string(),
            )
        })?;
        let original_name = field.file_name().unwrap_or("resume").to_string();
        let bytes = field.bytes().await?;

        upload = Some((kind, original_name, bytes));
        break;
    }

    let (kind, original_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds the {} limit",
            describe_size(state.config.max_upload_bytes)
        )));
    }

    let names = state.store.save_upload(&original_name, &bytes).await?;
    info!(
        upload = %names.upload_name,
        mime = kind.mime_type(),
        size = bytes.len(),
        "Resume uploaded"
    );

    let part = document_part(kind, &bytes)?;
    let (resume_content, latex) = tokio::try_join!(
        transcribe(state.llm.as_ref(), &part),
        state.renderer.render_document(&part),
    )?;

    state
        .store
        .write_artifact(&names.artifact_name, &latex)
        .await?;

    let record = state
        .records
        .register(
            names.timestamp,
            names.upload_name.clone(),
            names.artifact_name.clone(),
            resume_content.clone(),
        )
        .await;
    let session_id = state
        .sessions
        .open(&resume_content, &names.artifact_name)
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        file_name: names.sanitized,
        uploaded_file_name: names.upload_name,
        tex_file_name: names.artifact_name,
        resume_content,
        record_id: record.record_id,
        session_id,
    }))
}

/// POST /render-latex
pub async fn handle_render_latex(
    State(state): State<AppState>,
    AppJson(request): AppJson<RenderLatexRequest>,
) -> Result<Json<RenderLatexResponse>, AppError> {
    let resume = non_blank(request.enhanced_resume)
        .ok_or_else(|| AppError::Validation("No resume content provided".to_string()))?;

    let latex = state.renderer.render_text(&resume).await?;

    Ok(Json(RenderLatexResponse {
        success: true,
        latex,
    }))
}

/// POST /update-artifact
///
/// Regenerates an existing artifact from the original resume plus an AI
/// suggestion and overwrites it in place. With a `recordId` the original
/// resume may be omitted; the text transcribed at upload is used instead.
pub async fn handle_update_artifact(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateArtifactRequest>,
) -> Result<Json<UpdateArtifactResponse>, AppError> {
    let missing =
        || AppError::Validation("Missing aiSuggestion, originalResume, or fileName".to_string());

    let suggestion = non_blank(request.ai_suggestion).ok_or_else(missing)?;
    let original = non_blank(request.original_resume);

    let (artifact_name, original) = match (request.record_id, non_blank(request.file_name)) {
        (Some(record_id), _) => {
            let record = state
                .records
                .get(record_id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("Record {record_id} not found")))?;
            info!(
                record_id = %record_id,
                upload = %record.upload_name,
                uploaded_at = record.timestamp,
                "Updating artifact from record"
            );
            (
                record.artifact_name,
                original.unwrap_or(record.resume_text),
            )
        }
        (None, Some(file_name)) => (
            artifact_name_from_file_name(&file_name)?,
            original.ok_or_else(missing)?,
        ),
        (None, None) => return Err(missing()),
    };

    let tex_content =
        refresh_artifact(&state.renderer, &state.store, &artifact_name, &original, &suggestion)
            .await?;

    Ok(Json(UpdateArtifactResponse {
        success: true,
        message: "Files updated successfully".to_string(),
        tex_content,
    }))
}

/// POST /read-artifact
pub async fn handle_read_artifact(
    State(state): State<AppState>,
    AppJson(request): AppJson<ReadArtifactRequest>,
) -> Result<Json<ReadArtifactResponse>, AppError> {
    let file_name = non_blank(request.file_name)
        .ok_or_else(|| AppError::Validation("Missing fileName".to_string()))?;

    let content = state.store.read_artifact(&file_name).await?;

    Ok(Json(ReadArtifactResponse {
        success: true,
        content,
    }))
}
