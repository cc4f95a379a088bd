// Resume pipeline: text extraction, LaTeX rendering, and the HTTP surface
// for upload and artifact access. All model calls go through `llm_client`.

pub mod extract;
pub mod handlers;
pub mod latex;
pub mod prompts;
