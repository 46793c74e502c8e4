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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer token for the JSON API. Each user holds at most one,
/// created on their first API login and reused afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiToken {
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl ApiToken {
    pub fn new(user_id: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token() {
        let token = ApiToken::new(42);
        assert_eq!(token.user_id, 42);
        assert!(uuid::Uuid::parse_str(&token.id).is_ok());
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = ApiToken::new(1);
        let b = ApiToken::new(1);
        assert_ne!(a.id, b.id);
    }
}
