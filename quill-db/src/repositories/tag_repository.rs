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
use quill_core::models::tag::Tag;
use sqlx::SqlitePool;

type TagRow = (i64, String, String);

fn tag_from_row(row: TagRow) -> Tag {
    let (id, name, slug) = row;
    Tag {
        id: Some(id),
        name,
        slug,
    }
}

pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tag: &Tag) -> Result<i64> {
        if tag.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid tag: {:?}", tag.is_valid().err()));
        }

        let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(&tag.name)
            .bind(&tag.slug)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to find tag by id")?;

        Ok(row.map(tag_from_row))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to find tag by slug")?;

        Ok(row.map(tag_from_row))
    }

    pub async fn list_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.into_iter().map(tag_from_row).collect())
    }

    pub async fn update(&self, tag: &Tag) -> Result<()> {
        if tag.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid tag: {:?}", tag.is_valid().err()));
        }

        let id = tag
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update tag without id"))?;

        let rows_affected = sqlx::query("UPDATE tags SET name = ?, slug = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(&tag.slug)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update tag")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Tag not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Tag not found"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_and_find_tag() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = TagRepository::new(pool);
        let tag = Tag::new("Async Rust".to_string(), None);
        let id = repo.create(&tag).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.name, "Async Rust");
        assert_eq!(found.slug, "async-rust");

        assert!(repo.find_by_slug("async-rust").await?.is_some());
        assert!(repo.find_by_slug("missing").await?.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_duplicate_name_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = TagRepository::new(pool);
        repo.create(&Tag::new("tokio".to_string(), None)).await?;

        let result = repo.create(&Tag::new("tokio".to_string(), None)).await;
        assert!(result.is_err());

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_all_sorted_by_name() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = TagRepository::new(pool);
        repo.create(&Tag::new("zig".to_string(), None)).await?;
        repo.create(&Tag::new("axum".to_string(), None)).await?;

        let all = repo.list_all().await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "axum");

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_and_delete_tag() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = TagRepository::new(pool);
        let mut tag = Tag::new("old".to_string(), None);
        let id = repo.create(&tag).await?;
        tag.id = Some(id);

        tag.name = "new".to_string();
        tag.slug = "new".to_string();
        repo.update(&tag).await?;
        assert_eq!(repo.find_by_id(id).await?.unwrap().name, "new");

        repo.delete(id).await?;
        assert!(repo.find_by_id(id).await?.is_none());

        Ok(())
    }
}
