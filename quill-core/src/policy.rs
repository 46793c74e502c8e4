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

//! Authorization rules, shared by the web handlers and the JSON API so
//! both interfaces enforce exactly the same checks.

use crate::models::{comment::Comment, post::Post, user::User};

/// Only authors may create posts.
pub fn can_create_post(user: &User) -> bool {
    user.is_author()
}

/// Only authors may access the dashboard.
pub fn can_access_dashboard(user: &User) -> bool {
    user.is_author()
}

/// A post is mutable only by its author.
pub fn can_edit_post(user: &User, post: &Post) -> bool {
    user.id == Some(post.author_id)
}

pub fn can_delete_post(user: &User, post: &Post) -> bool {
    can_edit_post(user, post)
}

/// Published posts are visible to everyone, including anonymous
/// visitors; drafts only to their author.
pub fn can_view_post(user: Option<&User>, post: &Post) -> bool {
    if post.is_published() {
        return true;
    }
    user.map(|u| u.id == Some(post.author_id)).unwrap_or(false)
}

/// A comment is mutable only by its author.
pub fn can_edit_comment(user: &User, comment: &Comment) -> bool {
    user.id == Some(comment.author_id)
}

pub fn can_delete_comment(user: &User, comment: &Comment) -> bool {
    can_edit_comment(user, comment)
}
