// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Patch templates.
//!
//! A template is an opaque JSON object. The only field we care about is
//! `regions`, which must be an array if present. Everything else is passed
//! through to the output untouched and in its original order.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;

/// The template bundled with the binary, used when no template is given.
pub const BUNDLED_TEMPLATE: &str = include_str!("../assets/template.json");

/// The field regions are appended to.
pub const REGIONS_FIELD: &str = "regions";

/// A parsed patch template.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    document: Map<String, Value>,
}

impl Template {
    /// Parses a template from a string. `origin` is only used for error reporting.
    pub fn parse(contents: &str, origin: &Path) -> Result<Template, Error> {
        let value: Value =
            serde_json::from_str(contents).map_err(|source| Error::TemplateParse {
                path: origin.to_path_buf(),
                source,
            })?;

        let document = match value {
            Value::Object(document) => document,
            other => {
                return Err(Error::TemplateShape {
                    path: origin.to_path_buf(),
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                })
            }
        };

        if let Some(regions) = document.get(REGIONS_FIELD) {
            if !regions.is_array() {
                return Err(Error::TemplateShape {
                    path: origin.to_path_buf(),
                    reason: format!(
                        "'{REGIONS_FIELD}' must be an array, found {}",
                        json_kind(regions)
                    ),
                });
            }
        }

        Ok(Template { document })
    }

    /// The number of regions already present in the template.
    pub fn region_count(&self) -> usize {
        self.document
            .get(REGIONS_FIELD)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Consumes the template, returning the underlying JSON object.
    pub fn into_document(self) -> Map<String, Value> {
        self.document
    }
}

/// Loads the template at the given path, or the bundled template if no path is given.
pub fn load_template(path: Option<&Path>) -> Result<Template, Error> {
    match path {
        Some(path) => {
            debug!(template = %path.display(), "Loading template");
            let contents = fs::read_to_string(path).map_err(|source| Error::TemplateRead {
                path: path.to_path_buf(),
                source,
            })?;
            Template::parse(&contents, path)
        }
        None => {
            debug!("Loading bundled template");
            Template::parse(BUNDLED_TEMPLATE, &PathBuf::from("<bundled template.json>"))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
