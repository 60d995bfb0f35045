//! Category API endpoints
//!
//! Handles HTTP requests for category management:
//! - GET /api/v1/categories - List categories (public, published only)
//! - GET /api/v1/categories/:id/news - News in a category (public)
//! - POST /api/v1/categories - Create category (authenticated)
//! - PUT /api/v1/categories/:id - Update category (admin)
//! - DELETE /api/v1/categories/:id - Soft-delete category (admin)
//! - PUT /api/v1/categories/restore/:id - Restore category (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::news::NewsSummaryResponse;
use crate::models::{CreateCategoryInput, EntityStatus, ListParams, UpdateCategoryInput};
use crate::services::CategoryServiceError;

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub title: String,
    pub parent_id: Option<i64>,
    pub status: Option<String>,
}

/// Request body for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub parent_id: Option<i64>,
    pub status: Option<String>,
}

/// Response for a single category
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub status: String,
    pub created_by: i64,
    pub updated_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Category> for CategoryResponse {
    fn from(category: crate::models::Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            parent_id: category.parent_id,
            status: category.status.to_string(),
            created_by: category.created_by,
            updated_by: category.updated_by,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

/// Response for category list
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Response for news list in a category
#[derive(Debug, Serialize)]
pub struct CategoryNewsResponse {
    pub news: Vec<NewsSummaryResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Build the public categories router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}/news", get(get_category_news))
}

/// Build the authenticated categories router
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", post(create_category))
}

/// Build the admin categories router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(update_category))
        .route("/{id}", delete(delete_category))
        .route("/restore/{id}", put(restore_category))
}

/// GET /api/v1/categories - List published categories
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let result = state
        .category_service
        .get_all(&params)
        .await
        .map_err(map_category_error)?;

    let total = result.total;
    let total_pages = result.total_pages();
    Ok(Json(CategoryListResponse {
        categories: result.items.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
        total_pages,
    }))
}

/// GET /api/v1/categories/:id/news - Published news in a category
async fn get_category_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CategoryNewsResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let result = state
        .category_service
        .news(id, &params)
        .await
        .map_err(map_category_error)?;

    let total = result.total;
    let total_pages = result.total_pages();
    Ok(Json(CategoryNewsResponse {
        news: result.items.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
        total_pages,
    }))
}

/// POST /api/v1/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let status = parse_status(body.status.as_deref())?;

    let input = CreateCategoryInput {
        title: body.title,
        parent_id: body.parent_id,
        status,
    };

    let created = state
        .category_service
        .create(&user.0.actor(), input)
        .await
        .map_err(map_category_error)?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/v1/categories/:id - Update a category (admin only)
async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let status = parse_status(body.status.as_deref())?;

    let input = UpdateCategoryInput {
        title: body.title,
        parent_id: body.parent_id,
        status,
    };

    let updated = state
        .category_service
        .update(&user.0.actor(), id, input)
        .await
        .map_err(map_category_error)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/categories/:id - Soft-delete a category (admin only)
async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .category_service
        .delete(&user.0.actor(), id)
        .await
        .map_err(map_category_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/categories/restore/:id - Restore a category (admin only)
async fn restore_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let restored = state
        .category_service
        .restore(&user.0.actor(), id)
        .await
        .map_err(map_category_error)?;

    Ok(Json(restored.into()))
}

/// Parse an optional status string from a request body
pub(crate) fn parse_status(status: Option<&str>) -> Result<Option<EntityStatus>, ApiError> {
    match status {
        None => Ok(None),
        Some(s) => EntityStatus::from_str(s)
            .map(Some)
            .map_err(|_| ApiError::validation_error(format!("Invalid status: {}", s))),
    }
}

/// Map category service errors to API errors
fn map_category_error(e: CategoryServiceError) -> ApiError {
    match e {
        CategoryServiceError::Unauthorized(msg) => ApiError::forbidden(msg),
        CategoryServiceError::NotFound(id) => {
            ApiError::not_found(format!("Category not found: {}", id))
        }
        CategoryServiceError::ParentNotFound(id) => {
            ApiError::validation_error(format!("Parent category not found: {}", id))
        }
        CategoryServiceError::CircularReference => {
            ApiError::validation_error("Category cannot be its own ancestor")
        }
        CategoryServiceError::Validation(msg) => ApiError::validation_error(msg),
        CategoryServiceError::Storage(e) => ApiError::internal_error(e.to_string()),
    }
}
