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
use quill_core::models::api_token::ApiToken;
use sqlx::SqlitePool;

use crate::datetime::parse_utc;

type TokenRow = (String, i64, String);

fn token_from_row(row: TokenRow) -> Result<ApiToken> {
    let (id, user_id, created_at) = row;

    Ok(ApiToken {
        id,
        user_id,
        created_at: parse_utc(&created_at, "created_at")?,
    })
}

pub struct ApiTokenRepository {
    pool: SqlitePool,
}

impl ApiTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, token: &ApiToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (id, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&token.id)
        .bind(token.user_id)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create API token")?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ApiToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT id, user_id, created_at FROM api_tokens WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find API token by id")?;

        row.map(token_from_row).transpose()
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<ApiToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT id, user_id, created_at FROM api_tokens WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find API token by user_id")?;

        row.map(token_from_row).transpose()
    }

    /// Return the user's token, creating one on first use. Each user
    /// holds exactly one token.
    pub async fn find_or_create(&self, user_id: i64) -> Result<ApiToken> {
        if let Some(existing) = self.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        let token = ApiToken::new(user_id);
        self.create(&token).await?;
        Ok(token)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM api_tokens WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete API token")?;

        Ok(())
    }
}
