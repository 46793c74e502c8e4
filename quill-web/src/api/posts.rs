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
use quill_core::{
    models::post::{Post, PostStatus},
    policy,
};
use quill_db::repositories::{PostRepository, UserRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    auth::{CurrentUser, OptionalUser},
    api::ApiError,
    pagination::Pagination,
    AppState,
};

const POSTS_PER_PAGE: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub status: String,
    pub published_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

async fn post_response(
    pool: &SqlitePool,
    post: &Post,
    author_username: Option<String>,
) -> Result<PostResponse, ApiError> {
    let id = post
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Post without id")))?;

    let author = match author_username {
        Some(username) => username,
        None => {
            let user_repo = UserRepository::new(pool.clone());
            user_repo
                .find_by_id(post.author_id)
                .await?
                .map(|u| u.username)
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Post author missing")))?
        }
    };

    let post_repo = PostRepository::new(pool.clone());
    let categories = post_repo
        .categories_for_post(id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let tags = post_repo
        .tags_for_post(id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    Ok(PostResponse {
        id,
        title: post.title.clone(),
        content: post.content.clone(),
        author,
        status: post.status.as_str().to_string(),
        published_at: post.published_at,
        categories,
        tags,
    })
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let post_repo = PostRepository::new(state.db.clone());
    let total = post_repo.count_published(search).await?;
    let pagination = Pagination::new(query.page.unwrap_or(1), POSTS_PER_PAGE, total);

    let listed = post_repo
        .list_published(search, pagination.per_page, pagination.offset())
        .await?;

    let mut posts = Vec::with_capacity(listed.len());
    for entry in listed {
        posts.push(post_response(&state.db, &entry.post, Some(entry.author_username)).await?);
    }

    Ok(Json(json!({
        "posts": posts,
        "page": pagination.page,
        "total_pages": pagination.total_pages,
        "total": pagination.total,
    })))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    let viewer = user.0.as_ref().map(|c| &c.user);
    if !policy::can_view_post(viewer, &post) {
        return Err(ApiError::NotFound);
    }

    Ok(Json(post_response(&state.db, &post, None).await?))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if !policy::can_create_post(&current.user) {
        return Err(ApiError::Forbidden);
    }

    let status = PostStatus::parse(&payload.status).map_err(ApiError::BadRequest)?;
    let author_id = current
        .user
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User without id")))?;

    let mut post = Post::new(payload.title, payload.content, author_id, status);
    post.is_valid().map_err(ApiError::BadRequest)?;

    let post_repo = PostRepository::new(state.db.clone());
    let id = post_repo.create(&post).await?;
    post.id = Some(id);

    post_repo.set_categories(id, &payload.category_ids).await?;
    post_repo.set_tags(id, &payload.tag_ids).await?;

    let response = post_response(&state.db, &post, Some(current.user.username)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let post_repo = PostRepository::new(state.db.clone());
    let mut post = post_repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    if !policy::can_edit_post(&current.user, &post) {
        return Err(ApiError::Forbidden);
    }

    post.title = payload.title;
    post.content = payload.content;
    post.status = PostStatus::parse(&payload.status).map_err(ApiError::BadRequest)?;
    post.is_valid().map_err(ApiError::BadRequest)?;

    post_repo.update(&post).await?;
    post_repo.set_categories(id, &payload.category_ids).await?;
    post_repo.set_tags(id, &payload.tag_ids).await?;

    Ok(Json(post_response(&state.db, &post, None).await?))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    if !policy::can_delete_post(&current.user, &post) {
        return Err(ApiError::Forbidden);
    }

    post_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
