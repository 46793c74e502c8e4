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

use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("Failed to compile slug regex"));

/// Generate a URL-friendly slug from a category or tag name
pub fn generate_slug_from_name(name: &str) -> String {
    // Convert to lowercase and trim
    let mut slug = name.trim().to_lowercase();

    // Replace non-alphanumeric characters with hyphens
    slug = SLUG_REGEX.replace_all(&slug, "-").to_string();

    // Remove leading/trailing hyphens
    slug = slug.trim_matches('-').to_string();

    // Handle empty results
    if slug.is_empty() {
        slug = "untitled".to_string();
    }

    // Ensure slug doesn't exceed reasonable length (100 chars)
    if slug.len() > 100 {
        slug = slug
            .chars()
            .take(100)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string();
    }

    slug
}
