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
use quill_core::models::{
    category::Category,
    post::{Post, PostStatus},
    tag::Tag,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::datetime::parse_utc;

/// A post joined with its author's username, as needed by listings and
/// the search filter.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
}

type PostRow = (i64, String, String, i64, String, String);
type PostAuthorRow = (i64, String, String, i64, String, String, String);

const POST_COLUMNS: &str = "id, title, content, author_id, status, published_at";
const POST_AUTHOR_COLUMNS: &str =
    "p.id, p.title, p.content, p.author_id, p.status, p.published_at, u.username";

fn post_from_row(row: PostRow) -> Result<Post> {
    let (id, title, content, author_id, status, published_at) = row;

    Ok(Post {
        id: Some(id),
        title,
        content,
        author_id,
        status: PostStatus::parse(&status)
            .map_err(|e| anyhow::anyhow!("Invalid status column: {}", e))?,
        published_at: parse_utc(&published_at, "published_at")?,
    })
}

fn post_with_author_from_row(row: PostAuthorRow) -> Result<PostWithAuthor> {
    let (id, title, content, author_id, status, published_at, username) = row;

    Ok(PostWithAuthor {
        post: post_from_row((id, title, content, author_id, status, published_at))?,
        author_username: username,
    })
}

pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, post: &Post) -> Result<i64> {
        if post.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid post: {:?}", post.is_valid().err()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, content, author_id, status, published_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = ?",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find post by id")?;

        row.map(post_from_row).transpose()
    }

    /// Update title, content and status. The author column is never
    /// touched: a post's author is fixed at creation.
    pub async fn update(&self, post: &Post) -> Result<()> {
        if post.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid post: {:?}", post.is_valid().err()));
        }

        let id = post.id.ok_or_else(|| anyhow::anyhow!("Cannot update post without id"))?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Post not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Post not found"));
        }

        Ok(())
    }

    /// List published posts, newest first, optionally filtered by a
    /// case-insensitive substring match over title, content and author
    /// username.
    pub async fn list_published(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithAuthor>> {
        let rows = if let Some(search) = search {
            let pattern = format!("%{}%", search.to_lowercase());
            sqlx::query_as::<_, PostAuthorRow>(&format!(
                r#"
                SELECT {}
                FROM posts p
                JOIN users u ON u.id = p.author_id
                WHERE p.status = 'published'
                  AND (lower(p.title) LIKE ? OR lower(p.content) LIKE ? OR lower(u.username) LIKE ?)
                ORDER BY p.published_at DESC
                LIMIT ? OFFSET ?
                "#,
                POST_AUTHOR_COLUMNS
            ))
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to search published posts")?
        } else {
            sqlx::query_as::<_, PostAuthorRow>(&format!(
                r#"
                SELECT {}
                FROM posts p
                JOIN users u ON u.id = p.author_id
                WHERE p.status = 'published'
                ORDER BY p.published_at DESC
                LIMIT ? OFFSET ?
                "#,
                POST_AUTHOR_COLUMNS
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list published posts")?
        };

        rows.into_iter().map(post_with_author_from_row).collect()
    }

    pub async fn count_published(&self, search: Option<&str>) -> Result<i64> {
        let count: (i64,) = if let Some(search) = search {
            let pattern = format!("%{}%", search.to_lowercase());
            sqlx::query_as(
                r#"
                SELECT COUNT(*)
                FROM posts p
                JOIN users u ON u.id = p.author_id
                WHERE p.status = 'published'
                  AND (lower(p.title) LIKE ? OR lower(p.content) LIKE ? OR lower(u.username) LIKE ?)
                "#,
            )
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count published posts")?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM posts WHERE status = 'published'")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count published posts")?
        };

        Ok(count.0)
    }

    /// List an author's own posts, drafts included, newest first.
    pub async fn list_by_author(
        &self,
        author_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithAuthor>> {
        let rows = sqlx::query_as::<_, PostAuthorRow>(&format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = ?
            ORDER BY p.published_at DESC
            LIMIT ? OFFSET ?
            "#,
            POST_AUTHOR_COLUMNS
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts by author")?;

        rows.into_iter().map(post_with_author_from_row).collect()
    }

    pub async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by author")?;

        Ok(count.0)
    }

    /// Replace the post's category set
    pub async fn set_categories(&self, post_id: i64, category_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post categories")?;

        for category_id in category_ids {
            sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .context("Failed to link category to post")?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }

    /// Replace the post's tag set
    pub async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to link tag to post")?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }

    pub async fn categories_for_post(&self, post_id: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT c.id, c.name, c.slug
            FROM categories c
            JOIN post_categories pc ON pc.category_id = c.id
            WHERE pc.post_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load categories for post")?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Category {
                id: Some(id),
                name,
                slug,
            })
            .collect())
    }

    pub async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT t.id, t.name, t.slug
            FROM tags t
            JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load tags for post")?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Tag {
                id: Some(id),
                name,
                slug,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::models::user::User;

    async fn setup_test_db(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                bio TEXT,
                profile_picture TEXT,
                role TEXT NOT NULL DEFAULT 'reader',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                published_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE post_categories (
                post_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                PRIMARY KEY (post_id, category_id),
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE post_tags (
                post_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (post_id, tag_id),
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn create_test_user(pool: &SqlitePool, username: &str) -> Result<i64> {
        let user = User::new(
            format!("{}@example.com", username),
            username.to_string(),
            "password123",
        )?;
        let repo = crate::repositories::UserRepository::new(pool.clone());
        repo.create(&user).await
    }

    #[sqlx::test]
    async fn test_create_and_find_post() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        let post = Post::new(
            "First Post".to_string(),
            "Hello, world".to_string(),
            author_id,
            PostStatus::Published,
        );
        let id = repo.create(&post).await?;
        assert!(id > 0);

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.title, "First Post");
        assert_eq!(found.content, "Hello, world");
        assert_eq!(found.author_id, author_id);
        assert_eq!(found.status, PostStatus::Published);

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_invalid_post_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        let post = Post::new(
            "".to_string(),
            "content".to_string(),
            author_id,
            PostStatus::Draft,
        );
        let result = repo.create(&post).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid post"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_published_excludes_drafts() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        repo.create(&Post::new(
            "Published".to_string(),
            "visible".to_string(),
            author_id,
            PostStatus::Published,
        ))
        .await?;
        repo.create(&Post::new(
            "Draft".to_string(),
            "hidden".to_string(),
            author_id,
            PostStatus::Draft,
        ))
        .await?;

        let posts = repo.list_published(None, 10, 0).await?;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.title, "Published");
        assert_eq!(posts[0].author_username, "alice");

        assert_eq!(repo.count_published(None).await?, 1);

        Ok(())
    }

    #[sqlx::test]
    async fn test_search_matches_title_content_and_author() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let alice = create_test_user(&pool, "alice").await?;
        let bob = create_test_user(&pool, "bobwriter").await?;
        let repo = PostRepository::new(pool);

        repo.create(&Post::new(
            "Rust Tips".to_string(),
            "ownership and borrowing".to_string(),
            alice,
            PostStatus::Published,
        ))
        .await?;
        repo.create(&Post::new(
            "Gardening".to_string(),
            "tomatoes love rust-colored soil".to_string(),
            alice,
            PostStatus::Published,
        ))
        .await?;
        repo.create(&Post::new(
            "Unrelated".to_string(),
            "nothing here".to_string(),
            bob,
            PostStatus::Published,
        ))
        .await?;

        // Title and content match, case-insensitive
        let posts = repo.list_published(Some("RUST"), 10, 0).await?;
        assert_eq!(posts.len(), 2);
        assert_eq!(repo.count_published(Some("RUST")).await?, 2);

        // Author username match
        let posts = repo.list_published(Some("bobwriter"), 10, 0).await?;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.title, "Unrelated");

        // No match
        let posts = repo.list_published(Some("quantum"), 10, 0).await?;
        assert!(posts.is_empty());

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_published_pagination() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        for i in 0..7 {
            let mut post = Post::new(
                format!("Post {}", i),
                "content".to_string(),
                author_id,
                PostStatus::Published,
            );
            // Spread publication times so ordering is deterministic
            post.published_at = chrono::Utc::now() - chrono::Duration::minutes(7 - i);
            repo.create(&post).await?;
        }

        let page1 = repo.list_published(None, 5, 0).await?;
        assert_eq!(page1.len(), 5);
        assert_eq!(page1[0].post.title, "Post 6"); // newest first

        let page2 = repo.list_published(None, 5, 5).await?;
        assert_eq!(page2.len(), 2);

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_by_author_includes_drafts() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let alice = create_test_user(&pool, "alice").await?;
        let bob = create_test_user(&pool, "bob").await?;
        let repo = PostRepository::new(pool);

        repo.create(&Post::new(
            "Alice Draft".to_string(),
            "wip".to_string(),
            alice,
            PostStatus::Draft,
        ))
        .await?;
        repo.create(&Post::new(
            "Alice Published".to_string(),
            "done".to_string(),
            alice,
            PostStatus::Published,
        ))
        .await?;
        repo.create(&Post::new(
            "Bob Post".to_string(),
            "other".to_string(),
            bob,
            PostStatus::Published,
        ))
        .await?;

        let posts = repo.list_by_author(alice, 10, 0).await?;
        assert_eq!(posts.len(), 2);
        assert_eq!(repo.count_by_author(alice).await?, 2);
        assert_eq!(repo.count_by_author(bob).await?, 1);

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_post() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        let mut post = Post::new(
            "Original".to_string(),
            "text".to_string(),
            author_id,
            PostStatus::Draft,
        );
        let id = repo.create(&post).await?;
        post.id = Some(id);

        post.title = "Updated".to_string();
        post.status = PostStatus::Published;
        repo.update(&post).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.title, "Updated");
        assert_eq!(found.status, PostStatus::Published);
        assert_eq!(found.author_id, author_id);

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_without_id_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        let post = Post::new(
            "Title".to_string(),
            "text".to_string(),
            author_id,
            PostStatus::Draft,
        );
        let result = repo.update(&post).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("without id"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_post() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;
        let repo = PostRepository::new(pool);

        let id = repo
            .create(&Post::new(
                "Title".to_string(),
                "text".to_string(),
                author_id,
                PostStatus::Draft,
            ))
            .await?;

        repo.delete(id).await?;
        assert!(repo.find_by_id(id).await?.is_none());

        let result = repo.delete(id).await;
        assert!(result.is_err());

        Ok(())
    }

    #[sqlx::test]
    async fn test_set_and_get_categories() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;

        sqlx::query("INSERT INTO categories (name, slug) VALUES ('Rust', 'rust'), ('Web', 'web')")
            .execute(&pool)
            .await?;

        let repo = PostRepository::new(pool);
        let id = repo
            .create(&Post::new(
                "Title".to_string(),
                "text".to_string(),
                author_id,
                PostStatus::Published,
            ))
            .await?;

        repo.set_categories(id, &[1, 2]).await?;
        let categories = repo.categories_for_post(id).await?;
        assert_eq!(categories.len(), 2);

        // Setting replaces the previous links
        repo.set_categories(id, &[2]).await?;
        let categories = repo.categories_for_post(id).await?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Web");

        repo.set_categories(id, &[]).await?;
        assert!(repo.categories_for_post(id).await?.is_empty());

        Ok(())
    }

    #[sqlx::test]
    async fn test_set_and_get_tags() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let author_id = create_test_user(&pool, "alice").await?;

        sqlx::query("INSERT INTO tags (name, slug) VALUES ('async', 'async'), ('tokio', 'tokio')")
            .execute(&pool)
            .await?;

        let repo = PostRepository::new(pool);
        let id = repo
            .create(&Post::new(
                "Title".to_string(),
                "text".to_string(),
                author_id,
                PostStatus::Published,
            ))
            .await?;

        repo.set_tags(id, &[1, 2]).await?;
        let tags = repo.tags_for_post(id).await?;
        assert_eq!(tags.len(), 2);

        repo.set_tags(id, &[1]).await?;
        let tags = repo.tags_for_post(id).await?;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "async");

        Ok(())
    }
}
