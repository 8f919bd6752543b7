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
use std::path::PathBuf;

use crate::config::SampleFilter;

/// Typed errors for every stage of preset generation, so the CLI can map
/// them to exit codes and tests can match on the failure without string matching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{} is not a valid directory! ({reason})", .path.display())]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("Unable to read template file {}! {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to parse template JSON in {} - is the syntax valid? ({source})", .path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Template {} is not usable as a patch: {reason}", .path.display())]
    TemplateShape { path: PathBuf, reason: String },

    #[error("Unable to list directory {}: {source}", .path.display())]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to read sample {}: {source}", .path.display())]
    SampleRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No {filter} files were found in {}! Is this the right directory?", .path.display())]
    NoSamplesFound { path: PathBuf, filter: SampleFilter },

    #[error("Key counter overflowed after {count} samples")]
    KeyOverflow { count: usize },

    #[error("Unable to create preset directory {}: {source}", .path.display())]
    PresetDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Gave up creating a preset directory for {} after {attempts} attempts", .base.display())]
    PresetAttemptsExhausted { base: PathBuf, attempts: u32 },

    #[error("Unable to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to write patch file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to serialize patch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unable to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// The process exit status for this error. Invalid arguments never get here:
    /// clap rejects them and exits with its own usage status.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
