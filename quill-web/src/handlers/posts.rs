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
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::Form as MultiForm;
use quill_core::{
    models::{
        comment::Comment,
        post::{Post, PostStatus},
        user::User,
    },
    policy,
};
use quill_db::repositories::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use serde::Deserialize;
use tera::Context;

use crate::{auth::OptionalUser, handlers::render_template, pagination::Pagination, AppState};

const POSTS_PER_PAGE: i64 = 5;
const COMMENTS_PER_PAGE: i64 = 5;
const DASHBOARD_PER_PAGE: i64 = 6;

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub cpage: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
    pub parent_id: Option<i64>,
}

fn insert_user(context: &mut Context, user: &OptionalUser) {
    if let Some(current) = &user.0 {
        context.insert("user", &current.user);
    }
}

/// Home page: published posts, newest first, with search and paging.
pub async fn home(
    State(state): State<AppState>,
    user: OptionalUser,
    Query(query): Query<HomeQuery>,
) -> Result<Response, StatusCode> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let post_repo = PostRepository::new(state.db.clone());
    let total = post_repo
        .count_published(search)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let pagination = Pagination::new(query.page.unwrap_or(1), POSTS_PER_PAGE, total);
    let posts = post_repo
        .list_published(search, pagination.per_page, pagination.offset())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    insert_user(&mut context, &user);
    context.insert("posts", &posts);
    context.insert("pagination", &pagination);
    if let Some(search) = search {
        context.insert("search", search);
    }

    Ok(render_template(&state, "home.html", &context)?.into_response())
}

/// Post detail page with its one-level comment thread.
pub async fn post_detail(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, StatusCode> {
    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    // Drafts are only visible to their author; everyone else sees a 404
    // rather than a hint that the post exists.
    let viewer = user.0.as_ref().map(|c| &c.user);
    if !policy::can_view_post(viewer, &post) {
        return Err(StatusCode::NOT_FOUND);
    }

    let user_repo = UserRepository::new(state.db.clone());
    let author = user_repo
        .find_by_id(post.author_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let can_edit = viewer.map(|u| policy::can_edit_post(u, &post)).unwrap_or(false);

    let comment_repo = CommentRepository::new(state.db.clone());
    let comment_count = comment_repo
        .count_top_level(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let pagination = Pagination::new(query.cpage.unwrap_or(1), COMMENTS_PER_PAGE, comment_count);

    let top_level = comment_repo
        .list_top_level(id, pagination.per_page, pagination.offset())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut comments = Vec::with_capacity(top_level.len());
    for comment in top_level {
        let comment_id = comment.comment.id.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
        let replies = comment_repo
            .list_replies(comment_id)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut value =
            serde_json::to_value(&comment).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        value["replies"] =
            serde_json::to_value(&replies).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        comments.push(value);
    }

    let categories = post_repo
        .categories_for_post(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let tags = post_repo
        .tags_for_post(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    insert_user(&mut context, &user);
    context.insert("post", &post);
    context.insert("author_username", &author.username);
    context.insert("can_edit", &can_edit);
    context.insert("categories", &categories);
    context.insert("tags", &tags);
    context.insert("comments", &comments);
    context.insert("comment_count", &comment_count);
    context.insert("pagination", &pagination);

    Ok(render_template(&state, "post_detail.html", &context)?.into_response())
}

/// Post a comment (or a reply) on a post.
pub async fn add_comment(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !policy::can_view_post(Some(&current.user), &post) {
        return Err(StatusCode::NOT_FOUND);
    }

    let author_id = current.user.id.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let comment = Comment::new(id, author_id, form.content, form.parent_id);

    let comment_repo = CommentRepository::new(state.db.clone());
    if let Err(e) = comment_repo.create(&comment).await {
        // Blank content or a bad parent: back to the post without saving
        tracing::debug!("Rejected comment on post {}: {:?}", id, e);
    }

    Ok(Redirect::to(&format!("/post/{}", id)).into_response())
}

/// Author dashboard: own posts, drafts included.
pub async fn dashboard(
    State(state): State<AppState>,
    user: OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    if !policy::can_access_dashboard(&current.user) {
        return Err(StatusCode::FORBIDDEN);
    }

    let author_id = current.user.id.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let post_repo = PostRepository::new(state.db.clone());

    let total = post_repo
        .count_by_author(author_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let pagination = Pagination::new(query.page.unwrap_or(1), DASHBOARD_PER_PAGE, total);

    let posts = post_repo
        .list_by_author(author_id, pagination.per_page, pagination.offset())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    context.insert("user", &current.user);
    context.insert("posts", &posts);
    context.insert("pagination", &pagination);

    Ok(render_template(&state, "dashboard.html", &context)?.into_response())
}

async fn render_post_form(
    state: &AppState,
    user: &User,
    form_title: &str,
    post: Option<&Post>,
    selected_categories: &[i64],
    selected_tags: &[i64],
    error: Option<&str>,
) -> Result<Response, StatusCode> {
    let category_repo = CategoryRepository::new(state.db.clone());
    let tag_repo = TagRepository::new(state.db.clone());

    let all_categories = category_repo
        .list_all()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let all_tags = tag_repo
        .list_all()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    context.insert("user", user);
    context.insert("form_title", form_title);
    if let Some(post) = post {
        context.insert("post", post);
    }
    context.insert("all_categories", &all_categories);
    context.insert("all_tags", &all_tags);
    context.insert("selected_category_ids", selected_categories);
    context.insert("selected_tag_ids", selected_tags);
    if let Some(err) = error {
        context.insert("error", err);
    }

    Ok(render_template(state, "post_form.html", &context)?.into_response())
}

/// Display the new-post form
pub async fn create_post_form(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    if !policy::can_create_post(&current.user) {
        return Err(StatusCode::FORBIDDEN);
    }

    render_post_form(&state, &current.user, "New Post", None, &[], &[], None).await
}

/// Handle new-post submission
pub async fn create_post(
    State(state): State<AppState>,
    user: OptionalUser,
    MultiForm(form): MultiForm<PostForm>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    if !policy::can_create_post(&current.user) {
        return Err(StatusCode::FORBIDDEN);
    }

    let status = PostStatus::parse(&form.status).map_err(|_| StatusCode::BAD_REQUEST)?;
    let author_id = current.user.id.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let post = Post::new(form.title, form.content, author_id, status);

    if let Err(message) = post.is_valid() {
        return render_post_form(
            &state,
            &current.user,
            "New Post",
            Some(&post),
            &form.categories,
            &form.tags,
            Some(&message),
        )
        .await;
    }

    let post_repo = PostRepository::new(state.db.clone());
    let post_id = post_repo
        .create(&post)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    post_repo
        .set_categories(post_id, &form.categories)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    post_repo
        .set_tags(post_id, &form.tags)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(&format!("/post/{}", post_id)).into_response())
}

async fn load_owned_post(
    state: &AppState,
    user: &User,
    id: i64,
) -> Result<Post, StatusCode> {
    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !policy::can_edit_post(user, &post) {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(post)
}

/// Display the edit-post form
pub async fn edit_post_form(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let post = load_owned_post(&state, &current.user, id).await?;

    let post_repo = PostRepository::new(state.db.clone());
    let selected_categories: Vec<i64> = post_repo
        .categories_for_post(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_iter()
        .filter_map(|c| c.id)
        .collect();
    let selected_tags: Vec<i64> = post_repo
        .tags_for_post(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_iter()
        .filter_map(|t| t.id)
        .collect();

    render_post_form(
        &state,
        &current.user,
        "Edit Post",
        Some(&post),
        &selected_categories,
        &selected_tags,
        None,
    )
    .await
}

/// Handle edit-post submission
pub async fn edit_post(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
    MultiForm(form): MultiForm<PostForm>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let mut post = load_owned_post(&state, &current.user, id).await?;

    post.title = form.title;
    post.content = form.content;
    post.status = PostStatus::parse(&form.status).map_err(|_| StatusCode::BAD_REQUEST)?;

    if let Err(message) = post.is_valid() {
        return render_post_form(
            &state,
            &current.user,
            "Edit Post",
            Some(&post),
            &form.categories,
            &form.tags,
            Some(&message),
        )
        .await;
    }

    let post_repo = PostRepository::new(state.db.clone());
    post_repo
        .update(&post)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    post_repo
        .set_categories(id, &form.categories)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    post_repo
        .set_tags(id, &form.tags)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(&format!("/post/{}", id)).into_response())
}

/// Delete a post and everything attached to it
pub async fn delete_post(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Response, StatusCode> {
    let current = match user.0 {
        Some(current) => current,
        None => return Ok(Redirect::to("/login").into_response()),
    };

    let post_repo = PostRepository::new(state.db.clone());
    let post = post_repo
        .find_by_id(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !policy::can_delete_post(&current.user, &post) {
        return Err(StatusCode::FORBIDDEN);
    }

    post_repo
        .delete(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to("/dashboard").into_response())
}
