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

//! Categories and tags are open reference data: reads and writes alike
//! need no authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::models::{category::Category, tag::Tag};
use quill_db::repositories::{CategoryRepository, TagRepository};
use serde::Deserialize;

use crate::{api::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TaxonomyPayload {
    pub name: String,
    pub slug: Option<String>,
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CategoryRepository::new(state.db.clone());
    Ok(Json(repo.list_all().await?))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(category))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<TaxonomyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut category = Category::new(payload.name, payload.slug);
    category.is_valid().map_err(ApiError::BadRequest)?;

    let repo = CategoryRepository::new(state.db.clone());
    let id = repo
        .create(&category)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    category.id = Some(id);

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaxonomyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CategoryRepository::new(state.db.clone());
    repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    let mut category = Category::new(payload.name, payload.slug);
    category.is_valid().map_err(ApiError::BadRequest)?;
    category.id = Some(id);

    repo.update(&category)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CategoryRepository::new(state.db.clone());
    repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let repo = TagRepository::new(state.db.clone());
    Ok(Json(repo.list_all().await?))
}

/// GET /api/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TagRepository::new(state.db.clone());
    let tag = repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(tag))
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<TaxonomyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tag = Tag::new(payload.name, payload.slug);
    tag.is_valid().map_err(ApiError::BadRequest)?;

    let repo = TagRepository::new(state.db.clone());
    let id = repo
        .create(&tag)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    tag.id = Some(id);

    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaxonomyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TagRepository::new(state.db.clone());
    repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    let mut tag = Tag::new(payload.name, payload.slug);
    tag.is_valid().map_err(ApiError::BadRequest)?;
    tag.id = Some(id);

    repo.update(&tag)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(tag))
}

/// DELETE /api/tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TagRepository::new(state.db.clone());
    repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
