//! Conversation Manager: one bounded chat transcript per session.
//!
//! State machine: `Empty → AwaitingFirstResponse → Active`.
//! The transcript holds at most `MAX_MESSAGES` turns; the oldest go first.
//! A user turn is appended optimistically and rolled back if the model call
//! fails, so the transcript only ever shows confirmed exchanges.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::chat::prompts::{coach_preamble, HISTORY_LEAD_IN, SUMMARY_PROMPT};
use crate::errors::AppError;
use crate::llm_client::{Content, Part};

/// Keep the last 10 user/assistant pairs.
pub const MAX_MESSAGE_PAIRS: usize = 10;
pub const MAX_MESSAGES: usize = MAX_MESSAGE_PAIRS * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Rejects an empty list or one whose final turn is not from the user.
pub fn validate_turns(messages: &[ChatMessage]) -> Result<(), AppError> {
    match messages.last() {
        None => Err(AppError::Validation("Invalid messages format".to_string())),
        Some(last) if last.role != Role::User => Err(AppError::Validation(
            "Last message must be from user".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

/// Maps chat turns onto Gemini contents (`assistant` → `model`).
///
/// Adjacent turns with the same role are merged into one content block so the
/// request always alternates, even right after the preamble.
pub fn to_contents(messages: &[ChatMessage]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::with_capacity(messages.len());
    for message in messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.push(Part::text(&message.content)),
            _ => contents.push(Content {
                role: role.to_string(),
                parts: vec![Part::text(&message.content)],
            }),
        }
    }
    contents
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    Empty,
    AwaitingFirstResponse,
    Active,
}

/// An optimistic user turn waiting for its reply, plus whatever it pushed out
/// of the window so a rollback can restore it.
#[derive(Debug, Clone)]
struct PendingTurn {
    evicted: Option<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    state: ConversationState,
    resume_text: String,
    messages: VecDeque<ChatMessage>,
    pending: Option<PendingTurn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            state: ConversationState::Empty,
            resume_text: String::new(),
            messages: VecDeque::with_capacity(MAX_MESSAGES),
            pending: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// First content arrival (a successful upload).
    pub fn attach_resume(&mut self, resume_text: impl Into<String>) -> Result<(), AppError> {
        if self.state != ConversationState::Empty {
            return Err(AppError::Conflict(
                "A resume is already attached to this conversation".to_string(),
            ));
        }
        self.resume_text = resume_text.into();
        self.state = ConversationState::AwaitingFirstResponse;
        Ok(())
    }

    /// The automatic "summarize this resume" request.
    pub fn begin_summary(&mut self) -> Result<Vec<ChatMessage>, AppError> {
        if self.state != ConversationState::AwaitingFirstResponse {
            return Err(AppError::Conflict(
                "The resume summary has already been requested".to_string(),
            ));
        }
        self.ensure_idle()?;
        self.pending = Some(PendingTurn { evicted: None });

        Ok(vec![ChatMessage::user(format!(
            "{}\n\n{SUMMARY_PROMPT}",
            coach_preamble(&self.resume_text)
        ))])
    }

    /// Stores `[summary prompt, reply]` and moves to `Active`.
    pub fn complete_summary(&mut self, reply: impl Into<String>) {
        self.pending = None;
        self.messages.clear();
        self.messages.push_back(ChatMessage::user(SUMMARY_PROMPT));
        self.messages.push_back(ChatMessage::assistant(reply));
        self.state = ConversationState::Active;
    }

    /// A failed summary leaves the conversation ready to try again.
    pub fn fail_summary(&mut self) {
        self.pending = None;
    }

    /// Appends the user's turn and returns the full outgoing request:
    /// preamble, the prior window, then the new turn.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<Vec<ChatMessage>, AppError> {
        if self.state != ConversationState::Active {
            return Err(AppError::Conflict(
                "Upload a resume and wait for its summary before chatting".to_string(),
            ));
        }
        self.ensure_idle()?;

        let content = content.into();
        if content.trim().is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let mut request = Vec::with_capacity(self.messages.len() + 2);
        request.push(ChatMessage::user(format!(
            "{}\n\n{HISTORY_LEAD_IN}",
            coach_preamble(&self.resume_text)
        )));
        request.extend(self.messages.iter().cloned());
        request.push(ChatMessage::user(content.clone()));

        self.messages.push_back(ChatMessage::user(content));
        let evicted = if self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front()
        } else {
            None
        };
        self.pending = Some(PendingTurn { evicted });

        Ok(request)
    }

    /// Confirms the pending user turn with the assistant's reply.
    pub fn complete_turn(&mut self, reply: impl Into<String>) {
        self.pending = None;
        self.messages.push_back(ChatMessage::assistant(reply));
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    /// Removes the optimistic user turn and restores anything it evicted.
    pub fn rollback_turn(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if matches!(self.messages.back(), Some(m) if m.role == Role::User) {
            self.messages.pop_back();
        }
        if let Some(evicted) = pending.evicted {
            self.messages.push_front(evicted);
        }
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.pending.is_some() {
            return Err(AppError::Conflict(
                "A reply is still pending for this conversation".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_conversation() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.attach_resume("Jane Doe\nRust engineer").unwrap();
        conversation.begin_summary().unwrap();
        conversation.complete_summary("Strong systems background.");
        conversation
    }

    #[test]
    fn test_state_machine_walks_forward() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.state(), ConversationState::Empty);

        conversation.attach_resume("resume").unwrap();
        assert_eq!(conversation.state(), ConversationState::AwaitingFirstResponse);

        let request = conversation.begin_summary().unwrap();
        assert_eq!(request.len(), 1);
        assert!(request[0].content.contains("resume"));
        assert!(request[0].content.ends_with(SUMMARY_PROMPT));

        conversation.complete_summary("summary");
        assert_eq!(conversation.state(), ConversationState::Active);
        assert_eq!(
            conversation.messages(),
            vec![ChatMessage::user(SUMMARY_PROMPT), ChatMessage::assistant("summary")]
        );
    }

    #[test]
    fn test_chat_before_summary_is_rejected() {
        let mut conversation = Conversation::new();
        assert!(matches!(
            conversation.push_user("hi"),
            Err(AppError::Conflict(_))
        ));
        conversation.attach_resume("resume").unwrap();
        assert!(matches!(
            conversation.push_user("hi"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_failed_summary_can_be_retried() {
        let mut conversation = Conversation::new();
        conversation.attach_resume("resume").unwrap();
        conversation.begin_summary().unwrap();
        conversation.fail_summary();

        assert_eq!(conversation.state(), ConversationState::AwaitingFirstResponse);
        assert!(conversation.begin_summary().is_ok());
    }

    #[test]
    fn test_request_starts_with_preamble_and_ends_with_user() {
        let mut conversation = active_conversation();

        let request = conversation.push_user("How do I improve my skills section?").unwrap();

        assert!(request[0].content.contains("Jane Doe\nRust engineer"));
        assert!(request[0].content.ends_with(HISTORY_LEAD_IN));
        assert_eq!(request[1], ChatMessage::user(SUMMARY_PROMPT));
        assert_eq!(
            request.last().unwrap(),
            &ChatMessage::user("How do I improve my skills section?")
        );
        assert!(validate_turns(&request).is_ok());
    }

    #[test]
    fn test_window_never_exceeds_twenty_and_evicts_oldest_first() {
        let mut conversation = active_conversation();

        for i in 0..25 {
            conversation.push_user(format!("question {i}")).unwrap();
            assert!(conversation.len() <= MAX_MESSAGES);
            conversation.complete_turn(format!("answer {i}"));
            assert!(conversation.len() <= MAX_MESSAGES);
        }

        let messages = conversation.messages();
        assert_eq!(messages.len(), MAX_MESSAGES);
        assert_eq!(messages[0], ChatMessage::user("question 15"));
        assert_eq!(messages[MAX_MESSAGES - 1], ChatMessage::assistant("answer 24"));
    }

    #[test]
    fn test_rollback_removes_only_the_optimistic_turn() {
        let mut conversation = active_conversation();
        let before = conversation.messages();

        conversation.push_user("this one fails").unwrap();
        conversation.rollback_turn();

        assert_eq!(conversation.messages(), before);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_rollback_restores_evicted_turn_at_full_window() {
        let mut conversation = active_conversation();
        for i in 0..9 {
            conversation.push_user(format!("q{i}")).unwrap();
            conversation.complete_turn(format!("a{i}"));
        }
        assert_eq!(conversation.len(), MAX_MESSAGES);
        let before = conversation.messages();

        conversation.push_user("overflow").unwrap();
        assert_eq!(conversation.len(), MAX_MESSAGES);
        conversation.rollback_turn();

        assert_eq!(conversation.messages(), before);
    }

    #[test]
    fn test_second_message_while_pending_is_rejected() {
        let mut conversation = active_conversation();
        conversation.push_user("first").unwrap();
        assert!(matches!(
            conversation.push_user("second"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_validate_turns_requires_final_user_turn() {
        assert!(validate_turns(&[]).is_err());
        assert!(validate_turns(&[ChatMessage::user("a"), ChatMessage::assistant("b")]).is_err());
        assert!(validate_turns(&[ChatMessage::assistant("b"), ChatMessage::user("a")]).is_ok());
    }

    #[test]
    fn test_to_contents_maps_roles_and_merges_neighbours() {
        let contents = to_contents(&[
            ChatMessage::user("preamble"),
            ChatMessage::user("summary please"),
            ChatMessage::assistant("summary"),
            ChatMessage::user("next"),
        ]);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts.len(), 2);
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].joined_text(), "next");
    }

    #[test]
    fn test_role_wire_format_is_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        let parsed: ChatMessage =
            serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
        assert_eq!(parsed.role, Role::User);
    }
}
