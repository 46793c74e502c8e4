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
    response::{IntoResponse, Redirect, Response},
    Form,
};
use quill_core::models::user::User;
use quill_db::repositories::UserRepository;
use serde::Deserialize;
use tera::Context;

use crate::{auth::OptionalUser, handlers::render_template, AppState};

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: String,
    pub username: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

fn render_profile(
    state: &AppState,
    user: &User,
    error: Option<&str>,
) -> Result<Response, StatusCode> {
    let mut context = Context::new();
    context.insert("user", user);
    if let Some(err) = error {
        context.insert("error", err);
    }

    Ok(render_template(state, "profile_edit.html", &context)?.into_response())
}

/// Display the profile form
pub async fn edit_profile_form(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    render_profile(&state, &current.user, None)
}

/// Handle profile update. The role is never editable here.
pub async fn edit_profile(
    State(state): State<AppState>,
    user: OptionalUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let mut updated = current.user.clone();
    updated.email = form.email.trim().to_string();
    updated.username = form.username.trim().to_string();
    updated.bio = form.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
    updated.profile_picture = form
        .profile_picture
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    if let Err(message) = updated.is_valid() {
        return render_profile(&state, &current.user, Some(&message));
    }

    let user_repo = UserRepository::new(state.db.clone());

    // Reject email/username collisions with other accounts
    if let Some(existing) = user_repo
        .find_by_email(&updated.email)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        if existing.id != updated.id {
            return render_profile(&state, &current.user, Some("Email already registered"));
        }
    }
    if let Some(existing) = user_repo
        .find_by_username(&updated.username)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        if existing.id != updated.id {
            return render_profile(&state, &current.user, Some("Username already taken"));
        }
    }

    user_repo
        .update(&updated)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to("/profile/edit").into_response())
}
