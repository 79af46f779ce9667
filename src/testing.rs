use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use crate::error::GenerationError;
use crate::llm::TextGenerator;

/// Plays back canned results in order, repeating the last one, and records
/// every call it receives.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self::sequence(vec![Ok(text.to_string())])
    }

    pub fn failing(err: GenerationError) -> Self {
        Self::sequence(vec![Err(err)])
    }

    pub fn sequence(replies: Vec<Result<String, GenerationError>>) -> Self {
        assert!(!replies.is_empty(), "at least one reply is needed");
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), system_instruction.map(str::to_string)));

        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies[0].clone()
        }
    }
}

/// Holds every call until the test releases it.
pub struct GatedGenerator {
    reply: String,
    calls: AtomicUsize,
    pub started: Notify,
    gate: Semaphore,
}

impl GatedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lets `n` held calls complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.gate
            .acquire()
            .await
            .expect("gate is never closed")
            .forget();
        Ok(self.reply.clone())
    }
}

/// Panics on every call.
pub struct PanickingGenerator;

#[async_trait]
impl TextGenerator for PanickingGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, GenerationError> {
        panic!("generator blew up");
    }
}
