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

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use quill_core::models::user::{Role, User};
use quill_db::repositories::{ApiTokenRepository, UserRepository};
use serde::Deserialize;
use serde_json::json;

use crate::{api::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub as_author: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut user = User::new(payload.email.clone(), payload.username.clone(), &payload.password)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if payload.as_author {
        user.role = Role::Author;
    }

    let user_repo = UserRepository::new(state.db.clone());

    if user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }
    if user_repo.find_by_username(&payload.username).await?.is_some() {
        return Err(ApiError::BadRequest("Username already taken".to_string()));
    }

    user_repo.create(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /api/login. Returns the caller's long-lived API token, creating
/// it on first login.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user_repo = UserRepository::new(state.db.clone());

    let user = if payload.username.contains('@') {
        user_repo.find_by_email(&payload.username).await?
    } else {
        user_repo.find_by_username(&payload.username).await?
    };

    let user = user.ok_or(ApiError::Unauthorized)?;

    match user.verify_password(&payload.password) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::Unauthorized),
        Err(e) => return Err(ApiError::Internal(e)),
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User without id")))?;

    let token_repo = ApiTokenRepository::new(state.db.clone());
    let token = token_repo.find_or_create(user_id).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token.id,
    })))
}
