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
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill_db::repositories::{CategoryRepository, TagRepository};
use tera::Context;

use crate::{auth::OptionalUser, handlers::render_template, AppState};

/// List all categories
pub async fn categories_page(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Response, StatusCode> {
    let category_repo = CategoryRepository::new(state.db.clone());
    let categories = category_repo
        .list_all()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    if let Some(current) = &user.0 {
        context.insert("user", &current.user);
    }
    context.insert("categories", &categories);

    Ok(render_template(&state, "categories.html", &context)?.into_response())
}

/// List all tags
pub async fn tags_page(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Response, StatusCode> {
    let tag_repo = TagRepository::new(state.db.clone());
    let tags = tag_repo
        .list_all()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    if let Some(current) = &user.0 {
        context.insert("user", &current.user);
    }
    context.insert("tags", &tags);

    Ok(render_template(&state, "tags.html", &context)?.into_response())
}
