//! User API endpoints
//!
//! Handles HTTP requests for user management:
//! - GET /api/v1/users - List users (public, published only)
//! - GET /api/v1/users/:id - Get user profile (authenticated)
//! - PUT /api/v1/users/:id - Update user (self or admin)
//! - DELETE /api/v1/users/:id - Soft-delete user (admin)
//! - PUT /api/v1/users/restore/:id - Restore user (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::{map_user_error, UserResponse};
use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{ListParams, UpdateUserInput};

/// Request body for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Response for user list
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Build the public users router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

/// Build the authenticated users router
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_user))
        .route("/{id}", put(update_user))
}

/// Build the admin users router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delete_user))
        .route("/restore/{id}", put(restore_user))
}

/// GET /api/v1/users - List published users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let result = state
        .user_service
        .get_all(&params)
        .await
        .map_err(map_user_error)?;

    let total = result.total;
    let total_pages = result.total_pages();
    Ok(Json(UserListResponse {
        users: result.items.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
        total_pages,
    }))
}

/// GET /api/v1/users/:id - Get a published user profile
async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_id(id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(user.into()))
}

/// PUT /api/v1/users/:id - Update a user account
///
/// Regular users may only update themselves; admins may update anyone.
async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let input = UpdateUserInput {
        username: body.username,
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
    };

    let updated = state
        .user_service
        .update(&user.0.actor(), id, input)
        .await
        .map_err(map_user_error)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/users/:id - Soft-delete a user (admin only)
async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .delete(&user.0.actor(), id)
        .await
        .map_err(map_user_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/users/restore/:id - Restore a soft-deleted user (admin only)
async fn restore_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let restored = state
        .user_service
        .restore(&user.0.actor(), id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(restored.into()))
}
