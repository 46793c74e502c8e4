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
use quill_core::models::category::Category;
use sqlx::SqlitePool;

type CategoryRow = (i64, String, String);

fn category_from_row(row: CategoryRow) -> Category {
    let (id, name, slug) = row;
    Category {
        id: Some(id),
        name,
        slug,
    }
}

pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, category: &Category) -> Result<i64> {
        if category.is_valid().is_err() {
            return Err(anyhow::anyhow!(
                "Invalid category: {:?}",
                category.is_valid().err()
            ));
        }

        let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(&category.name)
            .bind(&category.slug)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find category by id")?;

        Ok(row.map(category_from_row))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find category by slug")?;

        Ok(row.map(category_from_row))
    }

    pub async fn list_all(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows.into_iter().map(category_from_row).collect())
    }

    pub async fn update(&self, category: &Category) -> Result<()> {
        if category.is_valid().is_err() {
            return Err(anyhow::anyhow!(
                "Invalid category: {:?}",
                category.is_valid().err()
            ));
        }

        let id = category
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update category without id"))?;

        let rows_affected = sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
            .bind(&category.name)
            .bind(&category.slug)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Category not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Category not found"));
        }

        Ok(())
    }
}
