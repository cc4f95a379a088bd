// Conversation Manager, Resume-Update Heuristic, and the chat endpoints.

pub mod conversation;
pub mod handlers;
pub mod prompts;
pub mod session;
pub mod update_detector;
