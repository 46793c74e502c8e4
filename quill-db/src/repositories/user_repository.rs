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
use quill_core::models::user::{Role, User};
use sqlx::SqlitePool;

use crate::datetime::parse_utc;

type UserRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
);

const USER_COLUMNS: &str =
    "id, email, username, password_hash, bio, profile_picture, role, created_at, updated_at";

fn user_from_row(row: UserRow) -> Result<User> {
    let (id, email, username, password_hash, bio, profile_picture, role, created_at, updated_at) =
        row;

    Ok(User {
        id: Some(id),
        email,
        username,
        password_hash,
        bio,
        profile_picture,
        role: Role::parse(&role).map_err(|e| anyhow::anyhow!("Invalid role column: {}", e))?,
        created_at: parse_utc(&created_at, "created_at")?,
        updated_at: parse_utc(&updated_at, "updated_at")?,
    })
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<i64> {
        if user.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid user: {:?}", user.is_valid().err()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, bio, profile_picture, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by id")?;

        row.map(user_from_row).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by email")?;

        row.map(user_from_row).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by username")?;

        row.map(user_from_row).transpose()
    }

    /// Update mutable profile fields. The role column is deliberately
    /// left out: it is fixed at registration.
    pub async fn update(&self, user: &User) -> Result<()> {
        if user.is_valid().is_err() {
            return Err(anyhow::anyhow!("Invalid user: {:?}", user.is_valid().err()));
        }

        let id = user.id.ok_or_else(|| anyhow::anyhow!("Cannot update user without id"))?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, username = ?, password_hash = ?, bio = ?, profile_picture = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .bind(user.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found"));
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
            CREATE TABLE IF NOT EXISTS users (
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

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_user_success() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool.clone());
        let user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;
        assert!(id > 0);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(count.0, 1);

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_user_duplicate_email_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user1 = User::new(
            "test@example.com".to_string(),
            "user1".to_string(),
            "password123",
        )?;
        let user2 = User::new(
            "test@example.com".to_string(), // Same email
            "user2".to_string(),
            "password456",
        )?;

        repo.create(&user1).await?;

        let result = repo.create(&user2).await;
        assert!(result.is_err());

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_user_duplicate_username_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user1 = User::new(
            "test1@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;
        let user2 = User::new(
            "test2@example.com".to_string(),
            "testuser".to_string(), // Same username
            "password456",
        )?;

        repo.create(&user1).await?;

        let result = repo.create(&user2).await;
        assert!(result.is_err());

        Ok(())
    }

    #[sqlx::test]
    async fn test_create_user_invalid_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let mut user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        user.email = "invalid-email".to_string();

        let result = repo.create(&user).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid user"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_id_round_trips_profile_fields() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let mut user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;
        user.bio = Some("I write about Rust".to_string());
        user.profile_picture = Some("/media/testuser.png".to_string());
        user.role = Role::Author;

        let id = repo.create(&user).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.email, user.email);
        assert_eq!(found.username, user.username);
        assert_eq!(found.bio.as_deref(), Some("I write about Rust"));
        assert_eq!(found.profile_picture.as_deref(), Some("/media/testuser.png"));
        assert_eq!(found.role, Role::Author);

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_id_non_existing() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);

        let found = repo.find_by_id(999).await?;
        assert!(found.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_email_existing() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;

        let found = repo.find_by_email("test@example.com").await?;
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, Some(id));

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_username_existing() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;

        let found = repo.find_by_username("testuser").await?;
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, Some(id));

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_user_success() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let mut user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;
        user.id = Some(id);

        user.email = "newemail@example.com".to_string();
        user.username = "newusername".to_string();
        user.bio = Some("updated bio".to_string());
        user.updated_at = chrono::Utc::now();

        repo.update(&user).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.email, "newemail@example.com");
        assert_eq!(found.username, "newusername");
        assert_eq!(found.bio.as_deref(), Some("updated bio"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_does_not_change_role() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let mut user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;
        user.id = Some(id);

        // Attempt to escalate to author through a profile update
        user.role = Role::Author;
        repo.update(&user).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.role, Role::Reader);

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_user_without_id_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let result = repo.update(&user).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("without id"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_user_success() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);
        let user = User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "password123",
        )?;

        let id = repo.create(&user).await?;
        repo.delete(id).await?;

        let found = repo.find_by_id(id).await?;
        assert!(found.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_user_non_existing_fails() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;

        let repo = UserRepository::new(pool);

        let result = repo.delete(999).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("User not found"));

        Ok(())
    }
}
