//! News API endpoints
//!
//! Handles HTTP requests for news management:
//! - GET /api/v1/news - List news (public, published only)
//! - GET /api/v1/news/:id - Get a news entry (public, published only)
//! - POST /api/v1/news - Create news (authenticated)
//! - PUT /api/v1/news/:id - Update news (authenticated)
//! - DELETE /api/v1/news/:id - Soft-delete news (admin)
//! - PUT /api/v1/news/restore/:id - Restore news (admin)
//! - PUT /api/v1/news/:id/revert - Revert to a prior revision (admin)
//! - GET /api/v1/news/:id/revisions - Revision history (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::categories::parse_status;
use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateNewsInput, ListParams, UpdateNewsInput};
use crate::services::NewsServiceError;

/// Request body for creating a news entry
#[derive(Debug, Deserialize)]
pub struct CreateNewsRequest {
    pub category_id: i64,
    pub title: String,
    #[serde(default)]
    pub title_second: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    pub image: Option<String>,
    #[serde(default)]
    pub tags: String,
    pub status: Option<String>,
}

/// Request body for updating a news entry
#[derive(Debug, Deserialize)]
pub struct UpdateNewsRequest {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub title_second: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
}

/// Request body for reverting to a revision
#[derive(Debug, Deserialize)]
pub struct RevertRequest {
    pub revision_id: i64,
}

/// Full news response
#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub title_second: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub tags: String,
    pub status: String,
    pub created_by: i64,
    pub updated_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::News> for NewsResponse {
    fn from(news: crate::models::News) -> Self {
        Self {
            id: news.id,
            category_id: news.category_id,
            title: news.title,
            title_second: news.title_second,
            slug: news.slug,
            summary: news.summary,
            body: news.body,
            image: news.image,
            tags: news.tags,
            status: news.status.to_string(),
            created_by: news.created_by,
            updated_by: news.updated_by,
            created_at: news.created_at.to_rfc3339(),
            updated_at: news.updated_at.to_rfc3339(),
        }
    }
}

/// Simplified news response for list views
#[derive(Debug, Serialize)]
pub struct NewsSummaryResponse {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub title_second: String,
    pub slug: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub tags: String,
    pub created_at: String,
}

impl From<crate::models::News> for NewsSummaryResponse {
    fn from(news: crate::models::News) -> Self {
        Self {
            id: news.id,
            category_id: news.category_id,
            title: news.title,
            title_second: news.title_second,
            slug: news.slug,
            summary: news.summary,
            image: news.image,
            tags: news.tags,
            created_at: news.created_at.to_rfc3339(),
        }
    }
}

/// Response for news list
#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub news: Vec<NewsSummaryResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Response for one revision entry
#[derive(Debug, Serialize)]
pub struct RevisionResponse {
    pub id: i64,
    pub subject_id: i64,
    pub event: String,
    pub snapshot: crate::models::NewsSnapshot,
    pub caused_by: i64,
    pub created_at: String,
}

impl From<crate::models::Revision> for RevisionResponse {
    fn from(revision: crate::models::Revision) -> Self {
        Self {
            id: revision.id,
            subject_id: revision.subject_id,
            event: revision.event.to_string(),
            snapshot: revision.snapshot,
            caused_by: revision.caused_by,
            created_at: revision.created_at.to_rfc3339(),
        }
    }
}

/// Response for revision history
#[derive(Debug, Serialize)]
pub struct RevisionListResponse {
    pub revisions: Vec<RevisionResponse>,
}

/// Build the public news router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_news))
        .route("/{id}", get(get_news))
}

/// Build the authenticated news router
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_news))
        .route("/{id}", put(update_news))
}

/// Build the admin news router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delete_news))
        .route("/restore/{id}", put(restore_news))
        .route("/{id}/revert", put(revert_news))
        .route("/{id}/revisions", get(list_revisions))
}

/// GET /api/v1/news - List published news
async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<NewsListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let result = state
        .news_service
        .get_all(&params)
        .await
        .map_err(map_news_error)?;

    let total = result.total;
    let total_pages = result.total_pages();
    Ok(Json(NewsListResponse {
        news: result.items.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
        total_pages,
    }))
}

/// GET /api/v1/news/:id - Get a published news entry
async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsResponse>, ApiError> {
    let news = state
        .news_service
        .get_by_id(id)
        .await
        .map_err(map_news_error)?;

    Ok(Json(news.into()))
}

/// POST /api/v1/news - Create a news entry
async fn create_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateNewsRequest>,
) -> Result<(StatusCode, Json<NewsResponse>), ApiError> {
    let status = parse_status(body.status.as_deref())?;

    let input = CreateNewsInput {
        category_id: body.category_id,
        title: body.title,
        title_second: body.title_second,
        slug: body.slug,
        summary: body.summary,
        body: body.body,
        image: body.image,
        tags: body.tags,
        status,
    };

    let created = state
        .news_service
        .create(&user.0.actor(), input)
        .await
        .map_err(map_news_error)?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/v1/news/:id - Update a news entry
async fn update_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNewsRequest>,
) -> Result<Json<NewsResponse>, ApiError> {
    let status = parse_status(body.status.as_deref())?;

    let input = UpdateNewsInput {
        category_id: body.category_id,
        title: body.title,
        title_second: body.title_second,
        slug: body.slug,
        summary: body.summary,
        body: body.body,
        image: body.image,
        tags: body.tags,
        status,
    };

    let updated = state
        .news_service
        .update(&user.0.actor(), id, input)
        .await
        .map_err(map_news_error)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/news/:id - Soft-delete a news entry (admin only)
async fn delete_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .news_service
        .delete(&user.0.actor(), id)
        .await
        .map_err(map_news_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/news/restore/:id - Restore a news entry (admin only)
async fn restore_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<NewsResponse>, ApiError> {
    let restored = state
        .news_service
        .restore(&user.0.actor(), id)
        .await
        .map_err(map_news_error)?;

    Ok(Json(restored.into()))
}

/// PUT /api/v1/news/:id/revert - Revert to a prior revision (admin only)
async fn revert_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<RevertRequest>,
) -> Result<Json<NewsResponse>, ApiError> {
    let reverted = state
        .news_service
        .revert_to_revision(&user.0.actor(), id, body.revision_id)
        .await
        .map_err(map_news_error)?;

    Ok(Json(reverted.into()))
}

/// GET /api/v1/news/:id/revisions - Revision history, newest first (admin only)
async fn list_revisions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<RevisionListResponse>, ApiError> {
    let revisions = state
        .news_service
        .revisions(&user.0.actor(), id)
        .await
        .map_err(map_news_error)?;

    Ok(Json(RevisionListResponse {
        revisions: revisions.into_iter().map(Into::into).collect(),
    }))
}

/// Map news service errors to API errors
fn map_news_error(e: NewsServiceError) -> ApiError {
    match e {
        NewsServiceError::Unauthorized(msg) => ApiError::forbidden(msg),
        NewsServiceError::NotFound(id) => ApiError::not_found(format!("News not found: {}", id)),
        NewsServiceError::CategoryNotFound(id) => {
            ApiError::validation_error(format!("Category not found: {}", id))
        }
        NewsServiceError::RevisionNotFound(id) => {
            ApiError::not_found(format!("Revision not found: {}", id))
        }
        NewsServiceError::RevertFailed(msg) => ApiError::internal_error(msg),
        NewsServiceError::SlugExists(slug) => {
            ApiError::conflict(format!("News slug already exists: {}", slug))
        }
        NewsServiceError::Validation(msg) => ApiError::validation_error(msg),
        NewsServiceError::Storage(e) => ApiError::internal_error(e.to_string()),
    }
}
