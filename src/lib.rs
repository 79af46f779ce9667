pub mod api;
pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod llm;
pub mod summary;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use chat::ChatSessions;
use config::Config;
use llm::TextGenerator;
use summary::SummaryController;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chats: Arc<ChatSessions>,
    pub summaries: Arc<SummaryController>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let chats = ChatSessions::with_limits(
            generator.clone(),
            config.chat_max_sessions,
            config.chat_session_ttl,
        );
        Self {
            config: Arc::new(config),
            chats: Arc::new(chats),
            summaries: Arc::new(SummaryController::new(generator)),
        }
    }
}
