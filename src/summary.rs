use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::content::{Article, ArticleId};
use crate::llm::{TextGenerator, reply_text};

/// Lines of the static excerpt shown before a summary exists.
pub const EXCERPT_MAX_LINES: u8 = 3;
pub const GENERATED_BADGE: &str = "GEMINI AI";
pub const GENERATE_LABEL: &str = "AI 摘要";
pub const REGENERATE_LABEL: &str = "重新生成";

pub fn build_summary_prompt(title: &str, excerpt: &str) -> String {
    format!(
        "请为一篇标题为《{title}》的博客文章生成一个更有深度的、引人入胜的“导读”。

目前的简单摘录是：“{excerpt}”

要求：
1. 稍微扩展一点，加入一些引发思考的反问或哲理。
2. 语气要像是一个资深设计师在深夜的思考。
3. 字数控制在 80 字以内。
4. 用中文。
5. 加上一个相关的 emoji。"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMode {
    /// No-op when a summary is already cached.
    #[default]
    Generate,
    /// Overwrites a cached summary.
    Regenerate,
}

#[derive(Debug, Clone, Default)]
struct SummaryState {
    pending: bool,
    result: Option<String>,
    generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// A request was dispatched and its text stored.
    Generated(String),
    /// A summary already existed and was left alone.
    Cached(String),
    /// Another request for the same article is still running.
    InFlight,
}

impl SummaryOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            SummaryOutcome::Generated(_) => "generated",
            SummaryOutcome::Cached(_) => "cached",
            SummaryOutcome::InFlight => "pending",
        }
    }
}

/// What an article card shows in place of its body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExcerptBody {
    Excerpt { text: String, max_lines: u8 },
    /// Rendered in full inside a bordered callout.
    Generated {
        text: String,
        badge: &'static str,
        generated_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcerptView {
    pub body: ExcerptBody,
    pub loading: bool,
    pub action: &'static str,
}

/// Per-article summaries, each article guarded independently.
pub struct SummaryController {
    entries: Mutex<HashMap<ArticleId, SummaryState>>,
    generator: Arc<dyn TextGenerator>,
}

impl SummaryController {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generator,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ArticleId, SummaryState>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the article pending unless the guard says otherwise.
    fn try_begin(&self, id: ArticleId, mode: SummaryMode) -> Option<SummaryOutcome> {
        let mut entries = self.entries();
        let state = entries.entry(id).or_default();

        if state.pending {
            return Some(SummaryOutcome::InFlight);
        }
        if let (SummaryMode::Generate, Some(cached)) = (mode, &state.result) {
            return Some(SummaryOutcome::Cached(cached.clone()));
        }

        state.pending = true;
        None
    }

    pub async fn generate(&self, article: &Article, mode: SummaryMode) -> SummaryOutcome {
        if let Some(skipped) = self.try_begin(article.id, mode) {
            debug!(article = article.id, status = skipped.status(), "Summary request skipped");
            return skipped;
        }

        info!(article = article.id, ?mode, "Generating summary");
        let pending = PendingSummary { controller: self, id: article.id, settled: false };
        let prompt = build_summary_prompt(article.title, article.excerpt);
        let summary = reply_text(self.generator.generate(&prompt, None).await);

        pending.settle(summary.clone());
        SummaryOutcome::Generated(summary)
    }

    pub fn cached(&self, id: ArticleId) -> Option<String> {
        self.entries().get(&id).and_then(|state| state.result.clone())
    }

    pub fn is_pending(&self, id: ArticleId) -> bool {
        self.entries().get(&id).is_some_and(|state| state.pending)
    }

    pub fn view(&self, article: &Article) -> ExcerptView {
        let entries = self.entries();
        let state = entries.get(&article.id).cloned().unwrap_or_default();

        let (body, action) = match state.result {
            Some(text) => (
                ExcerptBody::Generated {
                    text,
                    badge: GENERATED_BADGE,
                    generated_at: state.generated_at,
                },
                REGENERATE_LABEL,
            ),
            None => (
                ExcerptBody::Excerpt {
                    text: article.excerpt.to_string(),
                    max_lines: EXCERPT_MAX_LINES,
                },
                GENERATE_LABEL,
            ),
        };

        ExcerptView {
            body,
            loading: state.pending,
            action,
        }
    }
}

/// Clears the pending flag of an article however its request ends.
struct PendingSummary<'a> {
    controller: &'a SummaryController,
    id: ArticleId,
    settled: bool,
}

impl PendingSummary<'_> {
    fn settle(mut self, summary: String) {
        let mut entries = self.controller.entries();
        let state = entries.entry(self.id).or_default();
        state.result = Some(summary);
        state.generated_at = Some(Utc::now());
        state.pending = false;
        self.settled = true;
    }
}

impl Drop for PendingSummary<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(article = self.id, "Summary request abandoned");
        if let Some(state) = self.controller.entries().get_mut(&self.id) {
            state.pending = false;
        }
    }
}
