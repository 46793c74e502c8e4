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

use anyhow::{Context, Result};
use std::path::Path;

use crate::template_engine::TemplateEngine;

pub fn init_templates(templates_dir: &str, development_mode: bool) -> Result<TemplateEngine> {
    // Create templates directory if it doesn't exist
    std::fs::create_dir_all(templates_dir).context("Failed to create templates directory")?;

    // Create default templates if they don't exist
    create_default_templates(templates_dir)?;

    let template_engine = TemplateEngine::new(templates_dir, development_mode)?;

    Ok(template_engine)
}

fn write_if_missing(templates_dir: &Path, name: &str, content: &str) -> Result<()> {
    let path = templates_dir.join(name);
    if !path.exists() {
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to create template {}", name))?;
    }
    Ok(())
}

fn create_default_templates(templates_dir: &str) -> Result<()> {
    let base_dir = Path::new(templates_dir);

    let base_template = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}Quill{% endblock %}</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }
        nav {
            border-bottom: 1px solid #eee;
            padding-bottom: 10px;
            margin-bottom: 20px;
        }
        nav a {
            margin-right: 15px;
            text-decoration: none;
            color: #0066cc;
        }
        nav a:hover {
            text-decoration: underline;
        }
        .auth-info {
            float: right;
            font-size: 0.9em;
        }
        .post-meta {
            color: #666;
            font-size: 0.9em;
        }
        .badge {
            display: inline-block;
            background: #eef;
            border-radius: 3px;
            padding: 1px 6px;
            font-size: 0.85em;
            margin-right: 4px;
        }
        .comment {
            border-left: 2px solid #eee;
            padding-left: 12px;
            margin-bottom: 12px;
        }
        .reply {
            margin-left: 30px;
        }
        .pagination {
            margin-top: 20px;
        }
        .error {
            color: #c00;
        }
        footer {
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            font-size: 0.9em;
            color: #666;
        }
    </style>
    {% block head %}{% endblock %}
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/categories">Categories</a>
        <a href="/tags">Tags</a>
        {% if user %}
            <span class="auth-info">
                {% if user.role == "author" %}
                    <a href="/dashboard">Dashboard</a> |
                {% endif %}
                <a href="/profile/edit">{{ user.username }}</a> |
                <a href="/logout">Logout</a>
            </span>
        {% else %}
            <span class="auth-info">
                <a href="/login">Login</a>
                <a href="/register">Register</a>
            </span>
        {% endif %}
    </nav>

    <main>
        {% block content %}{% endblock %}
    </main>

    <footer>
        <p>Powered by Quill</p>
    </footer>
</body>
</html>"#;
    write_if_missing(base_dir, "base.html", base_template)?;

    let home_template = r#"{% extends "base.html" %}

{% block title %}Quill{% endblock %}

{% block content %}
<h1>Latest Posts</h1>

<form method="get" action="/">
    <input type="text" name="search" placeholder="Search posts..."
           value="{{ search | default(value='') }}" style="width: 300px; padding: 5px;">
    <button type="submit">Search</button>
</form>

{% for post in posts %}
<article>
    <h2><a href="/post/{{ post.id }}">{{ post.title }}</a></h2>
    <p class="post-meta">by {{ post.author_username }} on {{ post.published_at | date(format="%Y-%m-%d") }}</p>
    <p>{{ post.content | truncate(length=300) }}</p>
</article>
{% else %}
<p>No posts found.</p>
{% endfor %}

<div class="pagination">
    {% if pagination.has_prev %}
        <a href="/?page={{ pagination.page - 1 }}{% if search %}&search={{ search }}{% endif %}">&laquo; Previous</a>
    {% endif %}
    Page {{ pagination.page }} of {{ pagination.total_pages }}
    {% if pagination.has_next %}
        <a href="/?page={{ pagination.page + 1 }}{% if search %}&search={{ search }}{% endif %}">Next &raquo;</a>
    {% endif %}
</div>
{% endblock %}"#;
    write_if_missing(base_dir, "home.html", home_template)?;

    let post_detail_template = r#"{% extends "base.html" %}

{% block title %}{{ post.title }} - Quill{% endblock %}

{% block content %}
<article>
    <h1>{{ post.title }}</h1>
    <p class="post-meta">
        by {{ author_username }} on {{ post.published_at | date(format="%Y-%m-%d") }}
        {% if post.status == "draft" %}<span class="badge">draft</span>{% endif %}
    </p>
    <p>
        {% for category in categories %}<span class="badge">{{ category.name }}</span>{% endfor %}
        {% for tag in tags %}<span class="badge">#{{ tag.name }}</span>{% endfor %}
    </p>

    {% if can_edit %}
    <p>
        <a href="/post/{{ post.id }}/edit">Edit</a>
        <form method="post" action="/post/{{ post.id }}/delete" style="display: inline;"
              onsubmit="return confirm('Delete this post?');">
            <button type="submit">Delete</button>
        </form>
    </p>
    {% endif %}

    <div>{{ post.content }}</div>
</article>

<section>
    <h2>Comments ({{ comment_count }})</h2>

    {% if user %}
    <form method="post" action="/post/{{ post.id }}/comment">
        <textarea name="content" rows="3" required style="width: 100%;"></textarea>
        <button type="submit">Comment</button>
    </form>
    {% else %}
    <p><a href="/login">Log in</a> to leave a comment.</p>
    {% endif %}

    {% for comment in comments %}
    <div class="comment">
        <p class="post-meta">{{ comment.author_username }} on {{ comment.created_at | date(format="%Y-%m-%d %H:%M") }}</p>
        <p>{{ comment.content }}</p>
        {% if user %}
            {% if user.id == comment.author_id %}
                <a href="/comment/{{ comment.id }}/edit">Edit</a>
                <form method="post" action="/comment/{{ comment.id }}/delete" style="display: inline;">
                    <button type="submit">Delete</button>
                </form>
            {% endif %}
            <form method="post" action="/post/{{ post.id }}/comment">
                <input type="hidden" name="parent_id" value="{{ comment.id }}">
                <input type="text" name="content" placeholder="Reply..." required style="width: 60%;">
                <button type="submit">Reply</button>
            </form>
        {% endif %}
        {% for reply in comment.replies %}
        <div class="comment reply">
            <p class="post-meta">{{ reply.author_username }} on {{ reply.created_at | date(format="%Y-%m-%d %H:%M") }}</p>
            <p>{{ reply.content }}</p>
            {% if user and user.id == reply.author_id %}
                <a href="/comment/{{ reply.id }}/edit">Edit</a>
                <form method="post" action="/comment/{{ reply.id }}/delete" style="display: inline;">
                    <button type="submit">Delete</button>
                </form>
            {% endif %}
        </div>
        {% endfor %}
    </div>
    {% else %}
    <p>No comments yet.</p>
    {% endfor %}

    <div class="pagination">
        {% if pagination.has_prev %}
            <a href="/post/{{ post.id }}?cpage={{ pagination.page - 1 }}">&laquo; Previous</a>
        {% endif %}
        {% if pagination.total_pages > 1 %}
            Page {{ pagination.page }} of {{ pagination.total_pages }}
        {% endif %}
        {% if pagination.has_next %}
            <a href="/post/{{ post.id }}?cpage={{ pagination.page + 1 }}">Next &raquo;</a>
        {% endif %}
    </div>
</section>
{% endblock %}"#;
    write_if_missing(base_dir, "post_detail.html", post_detail_template)?;

    let dashboard_template = r#"{% extends "base.html" %}

{% block title %}Dashboard - Quill{% endblock %}

{% block content %}
<h1>Your Posts</h1>

<p><a href="/post/create">Write a new post</a></p>

{% for post in posts %}
<article>
    <h2><a href="/post/{{ post.id }}">{{ post.title }}</a>
        {% if post.status == "draft" %}<span class="badge">draft</span>{% endif %}
    </h2>
    <p class="post-meta">{{ post.published_at | date(format="%Y-%m-%d") }}
        | <a href="/post/{{ post.id }}/edit">Edit</a>
    </p>
</article>
{% else %}
<p>You have not written any posts yet.</p>
{% endfor %}

<div class="pagination">
    {% if pagination.has_prev %}
        <a href="/dashboard?page={{ pagination.page - 1 }}">&laquo; Previous</a>
    {% endif %}
    Page {{ pagination.page }} of {{ pagination.total_pages }}
    {% if pagination.has_next %}
        <a href="/dashboard?page={{ pagination.page + 1 }}">Next &raquo;</a>
    {% endif %}
</div>
{% endblock %}"#;
    write_if_missing(base_dir, "dashboard.html", dashboard_template)?;

    let post_form_template = r#"{% extends "base.html" %}

{% block title %}{{ form_title }} - Quill{% endblock %}

{% block content %}
<h1>{{ form_title }}</h1>

{% if error %}
<p class="error">{{ error }}</p>
{% endif %}

<form method="post">
    <div style="margin-bottom: 15px;">
        <label for="title">Title:</label><br>
        <input type="text" id="title" name="title" required style="width: 100%; padding: 5px;"
               value="{{ post.title | default(value='') }}">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="content">Content:</label><br>
        <textarea id="content" name="content" rows="12" required style="width: 100%;">{{ post.content | default(value='') }}</textarea>
    </div>

    <div style="margin-bottom: 15px;">
        <label for="status">Status:</label>
        <select id="status" name="status">
            <option value="draft" {% if post and post.status == "draft" %}selected{% endif %}>Draft</option>
            <option value="published" {% if post and post.status == "published" %}selected{% endif %}>Published</option>
        </select>
    </div>

    <div style="margin-bottom: 15px;">
        <label>Categories:</label><br>
        {% for category in all_categories %}
        <label style="margin-right: 10px;">
            <input type="checkbox" name="categories" value="{{ category.id }}"
                   {% if category.id in selected_category_ids %}checked{% endif %}>
            {{ category.name }}
        </label>
        {% endfor %}
    </div>

    <div style="margin-bottom: 15px;">
        <label>Tags:</label><br>
        {% for tag in all_tags %}
        <label style="margin-right: 10px;">
            <input type="checkbox" name="tags" value="{{ tag.id }}"
                   {% if tag.id in selected_tag_ids %}checked{% endif %}>
            {{ tag.name }}
        </label>
        {% endfor %}
    </div>

    <button type="submit" style="padding: 5px 20px;">Save</button>
</form>
{% endblock %}"#;
    write_if_missing(base_dir, "post_form.html", post_form_template)?;

    let login_template = r#"{% extends "base.html" %}

{% block title %}Login - Quill{% endblock %}

{% block content %}
<h1>Login</h1>

{% if error %}
<p class="error">{{ error }}</p>
{% endif %}

<form method="post" action="/login">
    <div style="margin-bottom: 15px;">
        <label for="username">Username or Email:</label><br>
        <input type="text" id="username" name="username" required style="width: 300px; padding: 5px;">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="password">Password:</label><br>
        <input type="password" id="password" name="password" required style="width: 300px; padding: 5px;">
    </div>

    <div>
        <button type="submit" style="padding: 5px 20px;">Login</button>
    </div>
</form>

<p>No account yet? <a href="/register">Register</a></p>
{% endblock %}"#;
    write_if_missing(base_dir, "login.html", login_template)?;

    let register_template = r#"{% extends "base.html" %}

{% block title %}Register - Quill{% endblock %}

{% block content %}
<h1>Register</h1>

{% if error %}
<p class="error">{{ error }}</p>
{% endif %}

<form method="post" action="/register">
    <div style="margin-bottom: 15px;">
        <label for="email">Email:</label><br>
        <input type="email" id="email" name="email" required style="width: 300px; padding: 5px;">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="username">Username:</label><br>
        <input type="text" id="username" name="username" required style="width: 300px; padding: 5px;">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="password">Password:</label><br>
        <input type="password" id="password" name="password" required style="width: 300px; padding: 5px;">
    </div>

    <div style="margin-bottom: 15px;">
        <label>
            <input type="checkbox" name="as_author" value="true">
            Register as an author
        </label>
    </div>

    <div>
        <button type="submit" style="padding: 5px 20px;">Register</button>
    </div>
</form>

<p>Already registered? <a href="/login">Login</a></p>
{% endblock %}"#;
    write_if_missing(base_dir, "register.html", register_template)?;

    let profile_template = r#"{% extends "base.html" %}

{% block title %}Edit Profile - Quill{% endblock %}

{% block content %}
<h1>Edit Profile</h1>

{% if error %}
<p class="error">{{ error }}</p>
{% endif %}

<form method="post" action="/profile/edit">
    <div style="margin-bottom: 15px;">
        <label for="email">Email:</label><br>
        <input type="email" id="email" name="email" required style="width: 300px; padding: 5px;"
               value="{{ user.email }}">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="username">Username:</label><br>
        <input type="text" id="username" name="username" required style="width: 300px; padding: 5px;"
               value="{{ user.username }}">
    </div>

    <div style="margin-bottom: 15px;">
        <label for="bio">Bio:</label><br>
        <textarea id="bio" name="bio" rows="4" style="width: 100%;">{{ user.bio | default(value='') }}</textarea>
    </div>

    <div style="margin-bottom: 15px;">
        <label for="profile_picture">Profile picture URL:</label><br>
        <input type="text" id="profile_picture" name="profile_picture" style="width: 100%; padding: 5px;"
               value="{{ user.profile_picture | default(value='') }}">
    </div>

    <button type="submit" style="padding: 5px 20px;">Save</button>
</form>
{% endblock %}"#;
    write_if_missing(base_dir, "profile_edit.html", profile_template)?;

    let comment_edit_template = r#"{% extends "base.html" %}

{% block title %}Edit Comment - Quill{% endblock %}

{% block content %}
<h1>Edit Comment</h1>

{% if error %}
<p class="error">{{ error }}</p>
{% endif %}

<form method="post" action="/comment/{{ comment.id }}/edit">
    <textarea name="content" rows="4" required style="width: 100%;">{{ comment.content }}</textarea>
    <button type="submit">Save</button>
    <a href="/post/{{ comment.post_id }}">Cancel</a>
</form>
{% endblock %}"#;
    write_if_missing(base_dir, "comment_edit.html", comment_edit_template)?;

    let categories_template = r#"{% extends "base.html" %}

{% block title %}Categories - Quill{% endblock %}

{% block content %}
<h1>Categories</h1>

<ul>
{% for category in categories %}
    <li>{{ category.name }}</li>
{% else %}
    <li>No categories yet.</li>
{% endfor %}
</ul>
{% endblock %}"#;
    write_if_missing(base_dir, "categories.html", categories_template)?;

    let tags_template = r#"{% extends "base.html" %}

{% block title %}Tags - Quill{% endblock %}

{% block content %}
<h1>Tags</h1>

<ul>
{% for tag in tags %}
    <li>#{{ tag.name }}</li>
{% else %}
    <li>No tags yet.</li>
{% endfor %}
</ul>
{% endblock %}"#;
    write_if_missing(base_dir, "tags.html", tags_template)?;

    let error_template = r#"{% extends "base.html" %}

{% block title %}Error - Quill{% endblock %}

{% block content %}
<h1>{{ error_title | default(value="Error") }}</h1>
<p>{{ error_message | default(value="An error occurred") }}</p>
<p><a href="/">Return to homepage</a></p>
{% endblock %}"#;
    write_if_missing(base_dir, "error.html", error_template)?;

    Ok(())
}
