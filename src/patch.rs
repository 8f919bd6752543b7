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
use serde_json::{Map, Value};

use crate::error::Error;
use crate::region::Region;
use crate::template::{Template, REGIONS_FIELD};

/// The name of the patch file inside a preset or sample directory.
pub const PATCH_FILE_NAME: &str = "patch.json";

/// A template with regions appended to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    document: Map<String, Value>,
}

impl Patch {
    /// Appends the given regions after any regions already in the template.
    /// Nothing is deduplicated.
    pub fn assemble(template: Template, regions: &[Region]) -> Result<Patch, Error> {
        let mut document = template.into_document();

        let mut appended = regions
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, serde_json::Error>>()?;

        match document
            .entry(REGIONS_FIELD)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(existing) => existing.append(&mut appended),
            // Template::parse already rejects this.
            other => *other = Value::Array(appended),
        }

        Ok(Patch { document })
    }

    /// The regions in the patch, including any that came from the template.
    pub fn regions(&self) -> &[Value] {
        self.document
            .get(REGIONS_FIELD)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Serializes the patch to compact JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.document)?)
    }

    /// Gets the patch as a JSON object.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}
