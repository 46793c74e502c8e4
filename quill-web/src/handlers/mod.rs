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

use axum::{http::StatusCode, response::Html};
use tera::Context;

use crate::AppState;

pub mod auth;
pub mod comments;
pub mod posts;
pub mod profile;
pub mod taxonomy;

pub use auth::{login, login_form, logout, register, register_form};
pub use comments::{delete_comment, edit_comment, edit_comment_form};
pub use posts::{
    add_comment, create_post, create_post_form, dashboard, delete_post, edit_post, edit_post_form,
    home, post_detail,
};
pub use profile::{edit_profile, edit_profile_form};
pub use taxonomy::{categories_page, tags_page};

pub(crate) fn render_template(
    state: &AppState,
    name: &str,
    context: &Context,
) -> Result<Html<String>, StatusCode> {
    let html = state.templates.render(name, context).map_err(|e| {
        tracing::error!("Failed to render {}: {:?}", name, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(html))
}
