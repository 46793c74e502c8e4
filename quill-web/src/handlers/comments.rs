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
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use quill_core::{models::comment::Comment, models::user::User, policy};
use quill_db::repositories::CommentRepository;
use serde::Deserialize;
use tera::Context;

use crate::{auth::OptionalUser, handlers::render_template, AppState};

#[derive(Debug, Deserialize)]
pub struct CommentEditForm {
    pub content: String,
}

async fn load_owned_comment(
    state: &AppState,
    user: &User,
    id: i64,
) -> Result<Comment, StatusCode> {
    let comment_repo = CommentRepository::new(state.db.clone());
    let comment = comment_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !policy::can_edit_comment(user, &comment) {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(comment)
}

/// Display the edit form for one of the user's own comments
pub async fn edit_comment_form(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let comment = load_owned_comment(&state, &current.user, id).await?;

    let mut context = Context::new();
    context.insert("user", &current.user);
    context.insert("comment", &comment);

    Ok(render_template(&state, "comment_edit.html", &context)?.into_response())
}

/// Handle comment edit submission
pub async fn edit_comment(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
    Form(form): Form<CommentEditForm>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let mut comment = load_owned_comment(&state, &current.user, id).await?;
    comment.content = form.content;

    if let Err(message) = comment.is_valid() {
        let mut context = Context::new();
        context.insert("user", &current.user);
        context.insert("comment", &comment);
        context.insert("error", &message);
        return Ok(render_template(&state, "comment_edit.html", &context)?.into_response());
    }

    let comment_repo = CommentRepository::new(state.db.clone());
    comment_repo
        .update(&comment)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(&format!("/post/{}", comment.post_id)).into_response())
}

/// Delete one of the user's own comments (replies go with it)
pub async fn delete_comment(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let comment_repo = CommentRepository::new(state.db.clone());
    let comment = comment_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !policy::can_delete_comment(&current.user, &comment) {
        return Err(StatusCode::FORBIDDEN);
    }

    comment_repo
        .delete(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(&format!("/post/{}", comment.post_id)).into_response())
}
