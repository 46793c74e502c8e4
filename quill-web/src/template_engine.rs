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

use anyhow::Result;
use std::sync::{Arc, RwLock};
use tera::{Context, Tera};

/// A wrapper around Tera that can reload templates in development mode
pub enum TemplateEngine {
    /// Static templates loaded once at startup
    Static(Arc<Tera>),
    /// Reloadable templates that refresh on each render
    Reloadable {
        templates_dir: String,
        cached: Arc<RwLock<Tera>>,
    },
}

impl TemplateEngine {
    pub fn new(templates_dir: &str, development_mode: bool) -> Result<Self> {
        if development_mode {
            tracing::info!("Template hot reload enabled (development mode)");
            let tera = Self::create_tera_instance(templates_dir)?;
            Ok(Self::Reloadable {
                templates_dir: templates_dir.to_string(),
                cached: Arc::new(RwLock::new(tera)),
            })
        } else {
            tracing::info!("Templates loaded once (production mode)");
            let tera = Self::create_tera_instance(templates_dir)?;
            Ok(Self::Static(Arc::new(tera)))
        }
    }

    fn create_tera_instance(templates_dir: &str) -> Result<Tera> {
        let pattern = format!("{}/**/*.html", templates_dir);
        let tera = Tera::new(&pattern)?;
        Ok(tera)
    }

    /// Render a template
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        match self {
            Self::Static(tera) => Ok(tera.render(template_name, context)?),
            Self::Reloadable {
                templates_dir,
                cached,
            } => {
                // In development mode, reload templates on each request
                match Self::create_tera_instance(templates_dir) {
                    Ok(new_tera) => {
                        if let Ok(mut write_guard) = cached.write() {
                            *write_guard = new_tera;
                        }
                        let read_guard = cached
                            .read()
                            .map_err(|_| anyhow::anyhow!("Template cache lock poisoned"))?;
                        Ok(read_guard.render(template_name, context)?)
                    }
                    Err(e) => {
                        // If reload fails, use the cached version and log the error
                        tracing::warn!("Failed to reload templates: {}. Using cached version.", e);
                        let read_guard = cached
                            .read()
                            .map_err(|_| anyhow::anyhow!("Template cache lock poisoned"))?;
                        Ok(read_guard.render(template_name, context)?)
                    }
                }
            }
        }
    }
}

// Implement Clone manually since we need to handle the Arc properly
impl Clone for TemplateEngine {
    fn clone(&self) -> Self {
        match self {
            Self::Static(tera) => Self::Static(Arc::clone(tera)),
            Self::Reloadable {
                templates_dir,
                cached,
            } => Self::Reloadable {
                templates_dir: templates_dir.clone(),
                cached: Arc::clone(cached),
            },
        }
    }
}
