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

use std::io;
use std::path::{self, Component, Path, PathBuf};

/// Extracts a file name from a path, returning the fallback if there isn't one
/// (for example a filesystem root). Non UTF-8 names are converted lossily.
pub fn file_name_or(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Makes a path absolute and removes `.` and `..` components lexically. Unlike
/// `canonicalize`, symlinks are left as they are and the path doesn't have to exist.
pub fn absolute_lexical(path: &Path) -> io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
