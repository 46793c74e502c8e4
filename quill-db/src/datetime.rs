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
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a datetime column stored by SQLite. Rows written through sqlx
/// carry RFC3339 strings; rows created by `datetime('now')` defaults use
/// the plain SQLite format.
pub(crate) fn parse_utc(value: &str, column: &str) -> Result<DateTime<Utc>> {
    if value.contains('T') {
        let parsed = DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("Failed to parse {} as RFC3339", column))?;
        Ok(parsed.with_timezone(&Utc))
    } else {
        let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .with_context(|| format!("Failed to parse {} as SQLite format", column))?;
        Ok(parsed.and_utc())
    }
}
