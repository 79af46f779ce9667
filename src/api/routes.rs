use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::api::models::{
    ArticleCard, MessageRequest, NewsletterRequest, NewsletterResponse, PanelRequest,
    SessionResponse, SiteResponse, SummaryRequest, SummaryResponse,
};
use crate::api::response;
use crate::chat::ChatController;
use crate::content::{self, Article, ArticleId};
use crate::summary::SummaryOutcome;
use crate::AppState;
use std::sync::Arc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/site", get(site_handler))
        .route("/api/projects", get(projects_handler))
        .route("/api/articles", get(articles_handler))
        .route("/api/articles/:id", get(article_handler))
        .route("/api/articles/:id/summary", post(summary_handler))
        .route("/api/chat/sessions", post(create_session_handler))
        .route("/api/chat/sessions/:id", get(session_handler))
        .route("/api/chat/sessions/:id/messages", post(message_handler))
        .route("/api/chat/sessions/:id/panel", post(panel_handler))
        .route("/api/newsletter", post(newsletter_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

fn lookup_article(id: ArticleId) -> Result<&'static Article> {
    content::find_article(id).ok_or_else(|| AppError::NotFound(format!("No article with id {}", id)))
}

fn lookup_session(state: &AppState, id: &Uuid) -> Result<Arc<ChatController>> {
    state
        .chats
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("No chat session {}", id)))
}

fn card(state: &AppState, article: &Article) -> ArticleCard {
    ArticleCard {
        article: article.clone(),
        display: state.summaries.view(article),
    }
}

async fn site_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(SiteResponse {
        profile: content::profile(),
        ai_enabled: state.config.gemini_api_key.is_some(),
    })
}

async fn projects_handler() -> impl IntoResponse {
    response::success(content::projects())
}

async fn articles_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cards: Vec<ArticleCard> = content::articles()
        .iter()
        .map(|article| card(&state, article))
        .collect();
    response::success(cards)
}

async fn article_handler(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> Result<impl IntoResponse> {
    let article = lookup_article(id)?;
    Ok(response::success(card(&state, article)))
}

async fn summary_handler(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
    body: std::result::Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let article = lookup_article(id)?;
    // A bare POST without a JSON body is a plain generate request.
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => SummaryRequest::default(),
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    let start_time = std::time::Instant::now();
    // Detached so a dropped connection cannot leave the article pending.
    let summaries = state.summaries.clone();
    let mode = req.mode();
    let outcome = tokio::spawn(async move { summaries.generate(article, mode).await }).await?;
    info!(
        article = id,
        status = outcome.status(),
        elapsed = ?start_time.elapsed(),
        "Summary request finished"
    );

    let summary = match &outcome {
        SummaryOutcome::Generated(text) | SummaryOutcome::Cached(text) => Some(text.clone()),
        SummaryOutcome::InFlight => None,
    };

    Ok(response::success(SummaryResponse {
        article_id: id,
        status: outcome.status().to_string(),
        summary,
        display: state.summaries.view(article),
        requested_at: Utc::now(),
    }))
}

async fn create_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (session_id, controller) = state.chats.create();
    response::success(SessionResponse {
        session_id,
        chat: controller.view(),
    })
}

async fn session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let controller = lookup_session(&state, &id)?;
    Ok(response::success(SessionResponse {
        session_id: id,
        chat: controller.view(),
    }))
}

async fn message_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<impl IntoResponse> {
    let controller = lookup_session(&state, &id)?;

    let start_time = std::time::Instant::now();
    let chat = tokio::spawn(async move { controller.send(&req.text).await }).await??;
    info!(session = %id, elapsed = ?start_time.elapsed(), "Chat turn completed");

    Ok(response::success(SessionResponse { session_id: id, chat }))
}

async fn panel_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PanelRequest>,
) -> Result<impl IntoResponse> {
    let controller = lookup_session(&state, &id)?;
    Ok(response::success(SessionResponse {
        session_id: id,
        chat: controller.set_panel(req.open),
    }))
}

/// Subscriptions are not stored anywhere.
async fn newsletter_handler(Json(req): Json<NewsletterRequest>) -> impl IntoResponse {
    info!("Newsletter form submitted");
    response::accepted(
        NewsletterResponse {
            email: req.email,
            subscribed: false,
        },
        "Newsletter sign-up is not available yet".to_string(),
    )
}
