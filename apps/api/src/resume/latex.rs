//! Template Renderer: asks the model to pour resume content into the fixed
//! reference template and stores the result as a `.tex` artifact.
//!
//! No LaTeX validation happens here: the output is best-effort model text with
//! a surrounding code fence removed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::{LanguageModel, Part};
use crate::resume::prompts::{render_document_prompt, render_text_prompt, render_update_prompt};
use crate::storage::FileStore;

const FENCE_OPEN: &str = "```latex";
const FENCE_CLOSE: &str = "```";

#[derive(Clone)]
pub struct TemplateRenderer {
    llm: Arc<dyn LanguageModel>,
    template_path: PathBuf,
}

impl TemplateRenderer {
    pub fn new(llm: Arc<dyn LanguageModel>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            llm,
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Reads the reference template. Read on every render so edits on disk
    /// are picked up without a restart.
    pub async fn load_template(&self) -> Result<String, AppError> {
        tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|e| {
                AppError::Template(format!(
                    "Failed to read reference template {}: {e}",
                    self.template_path.display()
                ))
            })
    }

    /// Upload path: the document part follows the instruction.
    pub async fn render_document(&self, document: &Part) -> Result<String, AppError> {
        let template = self.load_template().await?;
        let raw = self
            .llm
            .generate_from_parts(vec![
                Part::text(render_document_prompt(&template)),
                document.clone(),
            ])
            .await?;
        Ok(clean_latex_content(&raw))
    }

    /// Free-text path.
    pub async fn render_text(&self, resume_text: &str) -> Result<String, AppError> {
        let template = self.load_template().await?;
        let raw = self
            .llm
            .generate_from_parts(vec![Part::text(render_text_prompt(&template, resume_text))])
            .await?;
        Ok(clean_latex_content(&raw))
    }

    /// Revision path: original resume plus the assistant's suggestion.
    pub async fn render_update(&self, original_resume: &str, suggestion: &str) -> Result<String, AppError> {
        let template = self.load_template().await?;
        let raw = self
            .llm
            .generate_from_parts(vec![Part::text(render_update_prompt(
                &template,
                original_resume,
                suggestion,
            ))])
            .await?;
        Ok(clean_latex_content(&raw))
    }
}

/// Re-renders and overwrites an existing artifact. Returns the new LaTeX.
///
/// Used by `/update-artifact` and by the background refresh after a chat turn.
pub async fn refresh_artifact(
    renderer: &TemplateRenderer,
    store: &FileStore,
    artifact_name: &str,
    original_resume: &str,
    suggestion: &str,
) -> Result<String, AppError> {
    let latex = renderer.render_update(original_resume, suggestion).await?;
    let path = store.write_artifact(artifact_name, &latex).await?;
    info!(path = %path.display(), "Artifact refreshed");
    Ok(latex)
}

/// Removes a leading ```` ```latex ```` (any case, optional newline) and a
/// trailing ```` ``` ```` (optional preceding newline). Interior text is left
/// alone. Stripping repeats until nothing changes, so the function is idempotent.
pub fn clean_latex_content(content: &str) -> String {
    let mut current = content;
    loop {
        let next = strip_fence_once(current);
        if next.len() == current.len() {
            return current.to_string();
        }
        debug!(removed = current.len() - next.len(), "Stripped code fence");
        current = next;
    }
}

fn strip_fence_once(content: &str) -> &str {
    let mut out = content;

    if let (Some(prefix), Some(rest)) = (out.get(..FENCE_OPEN.len()), out.get(FENCE_OPEN.len()..)) {
        if prefix.eq_ignore_ascii_case(FENCE_OPEN) {
            out = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
        }
    }

    if let Some(rest) = out.trim_end().strip_suffix(FENCE_CLOSE) {
        out = rest
            .strip_suffix("\r\n")
            .or_else(|| rest.strip_suffix('\n'))
            .unwrap_or(rest);
    }

    out
}
