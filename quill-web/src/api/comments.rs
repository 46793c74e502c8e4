// Quill - A blog publishing platform built with Rust
// Copyright (C) 2026 Quill Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use quill_core::{models::comment::Comment, policy};
use quill_db::repositories::{CommentRepository, PostRepository, UserRepository};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    api::ApiError,
    auth::{CurrentUser, OptionalUser},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub post: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    pub post: i64,
    pub content: String,
    pub parent_comment: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post: i64,
    pub author: String,
    pub content: String,
    pub parent_comment: Option<i64>,
    pub created_at: DateTime<Utc>,
}

async fn comment_response(
    pool: &SqlitePool,
    comment: &Comment,
) -> Result<CommentResponse, ApiError> {
    let id = comment
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Comment without id")))?;

    let user_repo = UserRepository::new(pool.clone());
    let author = user_repo
        .find_by_id(comment.author_id)
        .await?
        .map(|u| u.username)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Comment author missing")))?;

    Ok(CommentResponse {
        id,
        post: comment.post_id,
        author,
        content: comment.content.clone(),
        parent_comment: comment.parent_id,
        created_at: comment.created_at,
    })
}

async fn visible_post(
    pool: &SqlitePool,
    user: Option<&quill_core::models::user::User>,
    post_id: i64,
) -> Result<(), ApiError> {
    let post_repo = PostRepository::new(pool.clone());
    let post = post_repo
        .find_by_id(post_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !policy::can_view_post(user, &post) {
        return Err(ApiError::NotFound);
    }

    Ok(())
}

/// GET /api/comments?post={id}
pub async fn list_comments(
    State(state): State<AppState>,
    user: OptionalUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.0.as_ref().map(|c| &c.user);
    visible_post(&state.db, viewer, query.post).await?;

    let comment_repo = CommentRepository::new(state.db.clone());
    let comments = comment_repo.list_by_post(query.post).await?;

    let mut body = Vec::with_capacity(comments.len());
    for comment in &comments {
        body.push(comment_response(&state.db, comment).await?);
    }

    Ok(Json(body))
}

/// GET /api/comments/{id}
pub async fn get_comment(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comment_repo = CommentRepository::new(state.db.clone());
    let comment = comment_repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let viewer = user.0.as_ref().map(|c| &c.user);
    visible_post(&state.db, viewer, comment.post_id).await?;

    Ok(Json(comment_response(&state.db, &comment).await?))
}

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    visible_post(&state.db, Some(&current.user), payload.post).await?;

    let author_id = current
        .user
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User without id")))?;

    let mut comment = Comment::new(
        payload.post,
        author_id,
        payload.content,
        payload.parent_comment,
    );
    comment.is_valid().map_err(ApiError::BadRequest)?;

    let comment_repo = CommentRepository::new(state.db.clone());
    let id = comment_repo
        .create(&comment)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    comment.id = Some(id);

    let response = comment_response(&state.db, &comment).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let comment_repo = CommentRepository::new(state.db.clone());
    let mut comment = comment_repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !policy::can_edit_comment(&current.user, &comment) {
        return Err(ApiError::Forbidden);
    }

    comment.content = payload.content;
    comment.is_valid().map_err(ApiError::BadRequest)?;

    comment_repo.update(&comment).await?;

    Ok(Json(comment_response(&state.db, &comment).await?))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comment_repo = CommentRepository::new(state.db.clone());
    let comment = comment_repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !policy::can_delete_comment(&current.user, &comment) {
        return Err(ApiError::Forbidden);
    }

    comment_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
