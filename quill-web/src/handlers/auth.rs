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
    response::{Html, IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use quill_core::models::{session::Session, user::{Role, User}};
use quill_db::repositories::{SessionRepository, UserRepository};
use serde::Deserialize;
use tera::Context;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub as_author: Option<String>,
}

fn render_form(
    state: &AppState,
    template: &str,
    error: Option<&str>,
) -> Result<Html<String>, StatusCode> {
    let mut context = Context::new();
    if let Some(err) = error {
        context.insert("error", err);
    }

    let html = state.templates.render(template, &context).map_err(|e| {
        tracing::error!("Failed to render {}: {:?}", template, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(html))
}

/// Display login form
pub async fn login_form(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    render_form(&state, "login.html", None)
}

/// Handle login POST request
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, StatusCode> {
    // Find user by username or email
    let user_repo = UserRepository::new(state.db.clone());

    let user = if form.username.contains('@') {
        user_repo
            .find_by_email(&form.username)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    } else {
        user_repo
            .find_by_username(&form.username)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    };

    let user = match user {
        Some(u) => u,
        None => {
            let html = render_form(&state, "login.html", Some("Invalid username or password"))?;
            return Ok((jar, html).into_response());
        }
    };

    match user.verify_password(&form.password) {
        Ok(true) => {}
        Ok(false) => {
            let html = render_form(&state, "login.html", Some("Invalid username or password"))?;
            return Ok((jar, html).into_response());
        }
        Err(e) => {
            tracing::error!("Password verification error: {:?}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let user_id = user.id.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    // Create session
    let session = Session::new(user_id);
    let session_id = session.id.clone();

    let session_repo = SessionRepository::new(state.db.clone());
    session_repo
        .create(&session)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Set session cookie
    let cookie = Cookie::build(("session_id", session_id))
        .path("/")
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/")).into_response())
}

/// Display registration form
pub async fn register_form(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    render_form(&state, "register.html", None)
}

/// Handle registration POST request. The role is chosen once at
/// registration and fixed afterwards.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut user = match User::new(form.email.clone(), form.username.clone(), &form.password) {
        Ok(u) => u,
        Err(e) => {
            let message = e.to_string();
            let html = render_form(&state, "register.html", Some(&message))?;
            return Ok((jar, html).into_response());
        }
    };

    if form.as_author.as_deref() == Some("true") {
        user.role = Role::Author;
    }

    let user_repo = UserRepository::new(state.db.clone());

    if user_repo
        .find_by_email(&form.email)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        let html = render_form(&state, "register.html", Some("Email already registered"))?;
        return Ok((jar, html).into_response());
    }
    if user_repo
        .find_by_username(&form.username)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        let html = render_form(&state, "register.html", Some("Username already taken"))?;
        return Ok((jar, html).into_response());
    }

    let user_id = user_repo
        .create(&user)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Log the new user straight in
    let session = Session::new(user_id);
    let session_id = session.id.clone();

    let session_repo = SessionRepository::new(state.db.clone());
    session_repo
        .create(&session)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let cookie = Cookie::build(("session_id", session_id))
        .path("/")
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/")).into_response())
}

/// Handle logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    if let Some(session_cookie) = jar.get("session_id") {
        let session_id = session_cookie.value();

        let session_repo = SessionRepository::new(state.db.clone());
        let _ = session_repo.delete(session_id).await; // Ignore errors
    }

    let jar = jar.remove("session_id");

    Ok((jar, Redirect::to("/")))
}
