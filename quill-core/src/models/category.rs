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

use crate::utils::slug::generate_slug_from_name;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Create a new category. When no slug is given, one is derived from
    /// the name.
    pub fn new(name: String, slug: Option<String>) -> Self {
        let slug = match slug {
            Some(s) if !s.trim().is_empty() => s,
            _ => generate_slug_from_name(&name),
        };
        Self {
            id: None,
            name,
            slug,
        }
    }

    pub fn validate_name(name: &str) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if name.len() > 100 {
            return Err("Name cannot exceed 100 characters".to_string());
        }
        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), String> {
        Self::validate_name(&self.name)?;
        if self.slug.trim().is_empty() {
            return Err("Slug cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_slug() {
        let category = Category::new("Web Development".to_string(), None);
        assert_eq!(category.slug, "web-development");
        assert!(category.is_valid().is_ok());
    }

    #[test]
    fn test_new_keeps_explicit_slug() {
        let category = Category::new("Web Development".to_string(), Some("webdev".to_string()));
        assert_eq!(category.slug, "webdev");
    }

    #[test]
    fn test_new_blank_slug_is_derived() {
        let category = Category::new("Rust".to_string(), Some("  ".to_string()));
        assert_eq!(category.slug, "rust");
    }

    #[test]
    fn test_validate_name() {
        assert!(Category::validate_name("Rust").is_ok());
        assert!(Category::validate_name("").is_err());
        assert!(Category::validate_name(&"a".repeat(101)).is_err());
    }
}
