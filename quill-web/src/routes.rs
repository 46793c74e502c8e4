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
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{api, handlers, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/.health", get(health))
        // Public pages
        .route("/", get(handlers::home))
        .route("/post/{id}", get(handlers::post_detail))
        .route("/categories", get(handlers::categories_page))
        .route("/tags", get(handlers::tags_page))
        // Account
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route(
            "/profile/edit",
            get(handlers::edit_profile_form).post(handlers::edit_profile),
        )
        // Authoring
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/post/create",
            get(handlers::create_post_form).post(handlers::create_post),
        )
        .route(
            "/post/{id}/edit",
            get(handlers::edit_post_form).post(handlers::edit_post),
        )
        .route("/post/{id}/delete", post(handlers::delete_post))
        // Comments
        .route("/post/{id}/comment", post(handlers::add_comment))
        .route(
            "/comment/{id}/edit",
            get(handlers::edit_comment_form).post(handlers::edit_comment),
        )
        .route("/comment/{id}/delete", post(handlers::delete_comment))
        // JSON API
        .route("/api/register", post(api::auth::register))
        .route("/api/login", post(api::auth::login))
        .route(
            "/api/posts",
            get(api::posts::list_posts).post(api::posts::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(api::posts::get_post)
                .put(api::posts::update_post)
                .patch(api::posts::update_post)
                .delete(api::posts::delete_post),
        )
        .route(
            "/api/comments",
            get(api::comments::list_comments).post(api::comments::create_comment),
        )
        .route(
            "/api/comments/{id}",
            get(api::comments::get_comment)
                .put(api::comments::update_comment)
                .patch(api::comments::update_comment)
                .delete(api::comments::delete_comment),
        )
        .route(
            "/api/categories",
            get(api::taxonomy::list_categories).post(api::taxonomy::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(api::taxonomy::get_category)
                .put(api::taxonomy::update_category)
                .patch(api::taxonomy::update_category)
                .delete(api::taxonomy::delete_category),
        )
        .route(
            "/api/tags",
            get(api::taxonomy::list_tags).post(api::taxonomy::create_tag),
        )
        .route(
            "/api/tags/{id}",
            get(api::taxonomy::get_tag)
                .put(api::taxonomy::update_tag)
                .patch(api::taxonomy::update_tag)
                .delete(api::taxonomy::delete_tag),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check handler
async fn health() -> &'static str {
    "OK"
}
