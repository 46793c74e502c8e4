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
use quill_core::models::comment::Comment;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::datetime::parse_utc;

/// A comment joined with its author's username for display.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

type CommentRow = (i64, i64, i64, String, Option<i64>, String);
type CommentAuthorRow = (i64, i64, i64, String, Option<i64>, String, String);

const COMMENT_COLUMNS: &str = "id, post_id, author_id, content, parent_id, created_at";
const COMMENT_AUTHOR_COLUMNS: &str =
    "c.id, c.post_id, c.author_id, c.content, c.parent_id, c.created_at, u.username";

fn comment_from_row(row: CommentRow) -> Result<Comment> {
    let (id, post_id, author_id, content, parent_id, created_at) = row;

    Ok(Comment {
        id: Some(id),
        post_id,
        author_id,
        content,
        parent_id,
        created_at: parse_utc(&created_at, "created_at")?,
    })
}

fn comment_with_author_from_row(row: CommentAuthorRow) -> Result<CommentWithAuthor> {
    let (id, post_id, author_id, content, parent_id, created_at, username) = row;

    Ok(CommentWithAuthor {
        comment: comment_from_row((id, post_id, author_id, content, parent_id, created_at))?,
        author_username: username,
    })
}

pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a comment. When a parent is given it must be a top-level
    /// comment on the same post: threads are one level deep, so a reply
    /// can never be a parent itself.
    pub async fn create(&self, comment: &Comment) -> Result<i64> {
        if comment.is_valid().is_err() {
            return Err(anyhow::anyhow!(
                "Invalid comment: {:?}",
                comment.is_valid().err()
            ));
        }

        if let Some(parent_id) = comment.parent_id {
            let parent = self
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Parent comment not found"))?;

            if parent.post_id != comment.post_id {
                return Err(anyhow::anyhow!("Parent comment belongs to a different post"));
            }
            if parent.parent_id.is_some() {
                return Err(anyhow::anyhow!("Cannot reply to a reply"));
            }
        }

        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, content, parent_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.parent_id)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM comments WHERE id = ?",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find comment by id")?;

        row.map(comment_from_row).transpose()
    }

    /// Update the comment's content. Post, author and parent are fixed
    /// at creation.
    pub async fn update(&self, comment: &Comment) -> Result<()> {
        if comment.is_valid().is_err() {
            return Err(anyhow::anyhow!(
                "Invalid comment: {:?}",
                comment.is_valid().err()
            ));
        }

        let id = comment
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update comment without id"))?;

        let rows_affected = sqlx::query("UPDATE comments SET content = ? WHERE id = ?")
            .bind(&comment.content)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update comment")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Comment not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Comment not found"));
        }

        Ok(())
    }

    /// Top-level comments on a post, newest first.
    pub async fn list_top_level(
        &self,
        post_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            r#"
            SELECT {}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = ? AND c.parent_id IS NULL
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#,
            COMMENT_AUTHOR_COLUMNS
        ))
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list top-level comments")?;

        rows.into_iter().map(comment_with_author_from_row).collect()
    }

    pub async fn count_top_level(&self, post_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM comments WHERE post_id = ? AND parent_id IS NULL",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count top-level comments")?;

        Ok(count.0)
    }

    /// Replies to a top-level comment, oldest first.
    pub async fn list_replies(&self, parent_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            r#"
            SELECT {}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.parent_id = ?
            ORDER BY c.created_at ASC, c.id ASC
            "#,
            COMMENT_AUTHOR_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list replies")?;

        rows.into_iter().map(comment_with_author_from_row).collect()
    }

    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE post_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments by post")?;

        rows.into_iter().map(comment_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::models::{
        post::{Post, PostStatus},
        user::User,
    };

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
            CREATE TABLE comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                parent_id INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (parent_id) REFERENCES comments(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn create_fixtures(pool: &SqlitePool) -> Result<(i64, i64)> {
        let user = User::new(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "password123",
        )?;
        let user_repo = crate::repositories::UserRepository::new(pool.clone());
        let user_id = user_repo.create(&user).await?;

        let post_repo = crate::repositories::PostRepository::new(pool.clone());
        let post_id = post_repo
            .create(&Post::new(
                "A Post".to_string(),
                "content".to_string(),
                user_id,
                PostStatus::Published,
            ))
            .await?;

        Ok((user_id, post_id))
    }

    #[sqlx::test]
    async fn test_create_and_find_comment() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let id = repo
            .create(&Comment::new(post_id, user_id, "Nice post".to_string(), None))
            .await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.content, "Nice post");
        assert_eq!(found.post_id, post_id);
        assert!(found.parent_id.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_reply_to_comment() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let parent_id = repo
            .create(&Comment::new(post_id, user_id, "Parent".to_string(), None))
            .await?;
        let reply_id = repo
            .create(&Comment::new(
                post_id,
                user_id,
                "Reply".to_string(),
                Some(parent_id),
            ))
            .await?;

        let replies = repo.list_replies(parent_id).await?;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].comment.id, Some(reply_id));
        assert_eq!(replies[0].author_username, "alice");

        Ok(())
    }

    #[sqlx::test]
    async fn test_reply_to_reply_is_rejected() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let parent_id = repo
            .create(&Comment::new(post_id, user_id, "Parent".to_string(), None))
            .await?;
        let reply_id = repo
            .create(&Comment::new(
                post_id,
                user_id,
                "Reply".to_string(),
                Some(parent_id),
            ))
            .await?;

        let result = repo
            .create(&Comment::new(
                post_id,
                user_id,
                "Nested".to_string(),
                Some(reply_id),
            ))
            .await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Cannot reply to a reply"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_reply_across_posts_is_rejected() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let post_repo = crate::repositories::PostRepository::new(pool.clone());
        let other_post_id = post_repo
            .create(&Post::new(
                "Other".to_string(),
                "content".to_string(),
                user_id,
                PostStatus::Published,
            ))
            .await?;

        let repo = CommentRepository::new(pool);
        let parent_id = repo
            .create(&Comment::new(post_id, user_id, "Parent".to_string(), None))
            .await?;

        let result = repo
            .create(&Comment::new(
                other_post_id,
                user_id,
                "Wrong thread".to_string(),
                Some(parent_id),
            ))
            .await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("different post"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_reply_to_missing_parent_is_rejected() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let result = repo
            .create(&Comment::new(
                post_id,
                user_id,
                "Orphan".to_string(),
                Some(999),
            ))
            .await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Parent comment not found"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_top_level_excludes_replies() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let first = repo
            .create(&Comment::new(post_id, user_id, "First".to_string(), None))
            .await?;
        repo.create(&Comment::new(post_id, user_id, "Second".to_string(), None))
            .await?;
        repo.create(&Comment::new(
            post_id,
            user_id,
            "Reply".to_string(),
            Some(first),
        ))
        .await?;

        let top = repo.list_top_level(post_id, 10, 0).await?;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].comment.content, "Second"); // newest first
        assert_eq!(repo.count_top_level(post_id).await?, 2);

        Ok(())
    }

    #[sqlx::test]
    async fn test_top_level_newest_first() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        repo.create(&Comment::new(post_id, user_id, "Older".to_string(), None))
            .await?;
        repo.create(&Comment::new(post_id, user_id, "Newer".to_string(), None))
            .await?;

        let top = repo.list_top_level(post_id, 10, 0).await?;
        assert_eq!(top[0].comment.content, "Newer");
        assert_eq!(top[1].comment.content, "Older");

        Ok(())
    }

    #[sqlx::test]
    async fn test_top_level_pagination() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        for i in 0..7 {
            repo.create(&Comment::new(
                post_id,
                user_id,
                format!("Comment {}", i),
                None,
            ))
            .await?;
        }

        let page1 = repo.list_top_level(post_id, 5, 0).await?;
        assert_eq!(page1.len(), 5);
        assert_eq!(page1[0].comment.content, "Comment 6");

        let page2 = repo.list_top_level(post_id, 5, 5).await?;
        assert_eq!(page2.len(), 2);
        assert_eq!(page2[1].comment.content, "Comment 0");

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_comment() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let mut comment = Comment::new(post_id, user_id, "Original".to_string(), None);
        let id = repo.create(&comment).await?;
        comment.id = Some(id);

        comment.content = "Edited".to_string();
        repo.update(&comment).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.content, "Edited");

        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_comment_cascades_to_replies() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let (user_id, post_id) = create_fixtures(&pool).await?;

        let repo = CommentRepository::new(pool);
        let parent_id = repo
            .create(&Comment::new(post_id, user_id, "Parent".to_string(), None))
            .await?;
        let reply_id = repo
            .create(&Comment::new(
                post_id,
                user_id,
                "Reply".to_string(),
                Some(parent_id),
            ))
            .await?;

        repo.delete(parent_id).await?;
        assert!(repo.find_by_id(parent_id).await?.is_none());
        assert!(repo.find_by_id(reply_id).await?.is_none());

        Ok(())
    }
}
