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
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

/// Default first key assigned to a region.
pub const DEFAULT_KEY_START: i64 = 53;

/// Default number of names tried when creating a preset directory.
pub const DEFAULT_MAX_PRESET_ATTEMPTS: u32 = 100;

/// Which directory entries count as samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SampleFilter {
    /// `.wav` or `.aiff` extension, any case.
    #[default]
    WavAiff,
    /// Names ending exactly in `.wav`.
    Wav,
}

impl SampleFilter {
    /// Returns true if the given file name is accepted by this filter.
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            // Everything after the last dot, so a file named just `.wav` still counts.
            SampleFilter::WavAiff => file_name.rsplit_once('.').is_some_and(|(_, ext)| {
                ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("aiff")
            }),
            SampleFilter::Wav => file_name.ends_with(".wav"),
        }
    }
}

impl fmt::Display for SampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFilter::WavAiff => write!(f, "wav or aiff"),
            SampleFilter::Wav => write!(f, "wav"),
        }
    }
}

/// Where the generated patch ends up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Create a sibling `<name>.preset` directory holding copies of the samples and the patch.
    #[default]
    Preset,
    /// Write `patch.json` into the sample directory itself.
    InPlace,
}

/// The order samples are assigned keys in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ScanOrder {
    /// Whatever order the filesystem lists entries in. Not stable across platforms.
    #[default]
    Listing,
    /// Sorted by file name.
    Name,
}

/// Everything a single run of the pipeline needs.
#[derive(Clone, Debug)]
pub struct Options {
    /// The directory containing samples.
    pub directory: PathBuf,
    /// The template to use. `None` uses the bundled template.
    pub template: Option<PathBuf>,
    /// The first key to assign.
    pub key_start: i64,
    /// The sample filter.
    pub filter: SampleFilter,
    /// The output mode.
    pub output: OutputMode,
    /// The scan order.
    pub order: ScanOrder,
    /// How many preset directory names to try before giving up.
    pub max_preset_attempts: u32,
    /// Worker threads for size reads and copies.
    pub jobs: usize,
}

impl Options {
    /// Creates options for the given directory with everything else defaulted.
    pub fn new(directory: impl Into<PathBuf>) -> Options {
        Options {
            directory: directory.into(),
            template: None,
            key_start: DEFAULT_KEY_START,
            filter: SampleFilter::default(),
            output: OutputMode::default(),
            order: ScanOrder::default(),
            max_preset_attempts: DEFAULT_MAX_PRESET_ATTEMPTS,
            jobs: num_cpus::get(),
        }
    }
}
