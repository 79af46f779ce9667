use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chat::ChatView;
use crate::content::{Article, ArticleId, SiteProfile};
use crate::summary::{ExcerptView, SummaryMode};

#[derive(Serialize)]
pub struct SiteResponse {
    #[serde(flatten)]
    pub profile: &'static SiteProfile,
    /// Whether the chat and summary features have an API key behind them.
    pub ai_enabled: bool,
}

#[derive(Serialize)]
pub struct ArticleCard {
    #[serde(flatten)]
    pub article: Article,
    /// What the card shows in the body slot: the static excerpt or a summary.
    pub display: ExcerptView,
}

#[derive(Deserialize, Default)]
pub struct SummaryRequest {
    /// Overwrite an existing summary instead of returning it.
    #[serde(default)]
    pub regenerate: bool,
}

impl SummaryRequest {
    pub fn mode(&self) -> SummaryMode {
        if self.regenerate {
            SummaryMode::Regenerate
        } else {
            SummaryMode::Generate
        }
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub article_id: ArticleId,
    pub status: String,
    pub summary: Option<String>,
    pub display: ExcerptView,
    pub requested_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub chat: ChatView,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct PanelRequest {
    /// Absent means toggle.
    #[serde(default)]
    pub open: Option<bool>,
}

#[derive(Deserialize)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct NewsletterResponse {
    pub email: String,
    pub subscribed: bool,
}
