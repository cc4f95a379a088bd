//! Scripted in-process `LanguageModel` for handler and service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Content, LanguageModel, LlmError};

type Script = dyn Fn(&[Content]) -> Result<String, LlmError> + Send + Sync;

/// Replies by running `script` over the outgoing turns and records every call.
pub struct ScriptedModel {
    script: Box<Script>,
    calls: Mutex<Vec<Vec<Content>>>,
}

impl ScriptedModel {
    pub fn new(
        script: impl Fn(&[Content]) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(reply.to_string()))
    }

    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_| {
            Err(LlmError::Api {
                status: 500,
                message: message.to_string(),
            })
        })
    }

    pub fn calls(&self) -> Vec<Vec<Content>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, contents: Vec<Content>) -> Result<String, LlmError> {
        let reply = (self.script)(&contents);
        self.calls.lock().unwrap().push(contents);
        reply
    }
}
