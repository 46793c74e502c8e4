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
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use quill_core::models::user::User;
use quill_db::repositories::{ApiTokenRepository, SessionRepository, UserRepository};
use sqlx::SqlitePool;

/// Current authenticated user, resolved from the session cookie or a
/// bearer API token. Both the web handlers and the JSON API go through
/// this extractor, so a browser session and an API token carry exactly
/// the same identity.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);

        // First try the session cookie
        if let Some(session_id) = session_id_from_cookie(parts).await {
            let session_repo = SessionRepository::new(pool.clone());
            let session = session_repo
                .find_by_id(&session_id)
                .await
                .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
                .ok_or((StatusCode::UNAUTHORIZED, "Invalid session"))?;

            if session.is_expired() {
                return Err((StatusCode::UNAUTHORIZED, "Session expired"));
            }

            let user = find_user(&pool, session.user_id).await?;
            return Ok(CurrentUser { user });
        }

        // Then try a bearer API token
        if let Ok(TypedHeader(Authorization(bearer))) =
            parts.extract::<TypedHeader<Authorization<Bearer>>>().await
        {
            let token_repo = ApiTokenRepository::new(pool.clone());
            let token = token_repo
                .find_by_id(bearer.token())
                .await
                .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
                .ok_or((StatusCode::UNAUTHORIZED, "Invalid token"))?;

            let user = find_user(&pool, token.user_id).await?;
            return Ok(CurrentUser { user });
        }

        Err((StatusCode::UNAUTHORIZED, "Authentication required"))
    }
}

/// Optional authenticated user
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err((StatusCode::UNAUTHORIZED, _)) => Ok(OptionalUser(None)),
            Err(e) => Err(e),
        }
    }
}

async fn session_id_from_cookie(parts: &mut Parts) -> Option<String> {
    let cookies = parts.extract::<axum_extra::extract::CookieJar>().await.ok()?;
    cookies
        .get("session_id")
        .map(|cookie| cookie.value().to_string())
}

async fn find_user(pool: &SqlitePool, user_id: i64) -> Result<User, (StatusCode, &'static str)> {
    let user_repo = UserRepository::new(pool.clone());
    user_repo
        .find_by_id(user_id)
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found"))
}
