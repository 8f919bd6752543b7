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
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes a file of exactly `len` bytes and returns its path.
pub fn write_sized(dir: &Path, name: &str, len: usize) -> io::Result<PathBuf> {
    let path = dir.join(name);
    // Non-zero content so copies can be told apart from empty files.
    let contents: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, contents)?;
    Ok(path)
}

/// Writes a template file and returns its path.
pub fn write_template(dir: &Path, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join("template.json");
    fs::write(&path, contents)?;
    Ok(path)
}

/// Creates a sample directory with the given name and sized files inside it.
pub fn sample_dir(parent: &Path, name: &str, files: &[(&str, usize)]) -> io::Result<PathBuf> {
    let dir = parent.join(name);
    fs::create_dir(&dir)?;
    for (file, len) in files {
        write_sized(&dir, file, *len)?;
    }
    Ok(dir)
}
