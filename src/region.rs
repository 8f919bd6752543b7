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

//! Region records, one per sample file.
//!
//! The frame count of a sample is not read from its header. It is derived from
//! the file size assuming an 88 byte wrapper around 16-bit mono frames, which
//! only holds for one particular container layout. Files that don't match that
//! layout get a wrong (possibly negative or fractional) frame count. We warn
//! about the obviously wrong ones but still emit the derived value unchanged.

use std::fmt;
use std::fs;

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::Error;
use crate::scanner::SampleFile;

/// Bytes assumed to be taken up by headers and wrappers.
pub const HEADER_BYTES: i64 = 88;

/// Bytes assumed per frame.
pub const FRAME_BYTES: i64 = 2;

/// The key center every region is pitched around.
pub const PITCH_KEY_CENTER: i32 = 60;

/// The highest key a typical instrument can play.
pub const MAX_INSTRUMENT_KEY: i64 = 127;

/// A frame count derived from a file size. Stored as the number of payload bytes so
/// that odd payloads keep their half frame instead of being rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCount {
    payload_bytes: i64,
}

impl FrameCount {
    /// Derives the frame count for a file of the given size: `(len - 88) / 2`.
    pub fn from_byte_len(len: u64) -> FrameCount {
        FrameCount {
            payload_bytes: i64::try_from(len)
                .unwrap_or(i64::MAX)
                .saturating_sub(HEADER_BYTES),
        }
    }

    /// True if the frame count is a whole number.
    pub fn is_whole(&self) -> bool {
        self.payload_bytes % FRAME_BYTES == 0
    }

    /// True if the frame count is below zero.
    pub fn is_negative(&self) -> bool {
        self.payload_bytes < 0
    }

    /// The frame count as a float.
    pub fn as_f64(&self) -> f64 {
        self.payload_bytes as f64 / FRAME_BYTES as f64
    }
}

impl Serialize for FrameCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_whole() {
            serializer.serialize_i64(self.payload_bytes / FRAME_BYTES)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl fmt::Display for FrameCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.payload_bytes / FRAME_BYTES)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

/// How a region plays when triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    OneShot,
}

/// A single key-mapped sample slot in a patch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Region {
    #[serde(rename = "fade.in")]
    fade_in: i32,
    #[serde(rename = "fade.out")]
    fade_out: i32,
    framecount: FrameCount,
    hikey: i64,
    lokey: i64,
    pan: i32,
    #[serde(rename = "pitch.keycenter")]
    pitch_keycenter: i32,
    playmode: PlayMode,
    reverse: bool,
    sample: String,
    #[serde(rename = "sample.end")]
    sample_end: FrameCount,
    transpose: i32,
    tune: i32,
}

impl Region {
    /// Creates a one-shot region mapping the given sample to a single key.
    pub fn new(sample: &str, key: i64, frame_count: FrameCount) -> Region {
        Region {
            fade_in: 0,
            fade_out: 0,
            framecount: frame_count,
            hikey: key,
            lokey: key,
            pan: 0,
            pitch_keycenter: PITCH_KEY_CENTER,
            playmode: PlayMode::OneShot,
            reverse: false,
            sample: sample.to_string(),
            sample_end: frame_count,
            transpose: 0,
            tune: 0,
        }
    }

    /// Gets the sample file name.
    pub fn sample(&self) -> &str {
        &self.sample
    }

    /// Gets the key this region is mapped to.
    pub fn key(&self) -> i64 {
        self.lokey
    }

    /// Gets the frame count.
    pub fn frame_count(&self) -> FrameCount {
        self.framecount
    }
}

/// Hands out keys in order, one per sample.
#[derive(Debug)]
pub struct KeyCounter {
    start: i64,
    next: Option<i64>,
    issued: usize,
}

impl KeyCounter {
    /// Creates a counter whose first key is `start`.
    pub fn new(start: i64) -> KeyCounter {
        KeyCounter {
            start,
            next: Some(start),
            issued: 0,
        }
    }

    /// Returns the next key, or an error if the counter has run out of room.
    pub fn next_key(&mut self) -> Result<i64, Error> {
        let key = self.next.ok_or(Error::KeyOverflow {
            count: self.issued,
        })?;
        self.next = key.checked_add(1);
        self.issued += 1;
        Ok(key)
    }

    /// The number of keys handed out so far.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// The first key.
    pub fn start(&self) -> i64 {
        self.start
    }
}

/// Builds regions from (sample name, byte length) pairs, assigning keys in iteration order.
pub fn regions_from_lengths<'a, I>(samples: I, keys: &mut KeyCounter) -> Result<Vec<Region>, Error>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut regions = Vec::new();
    for (name, len) in samples {
        let key = keys.next_key()?;
        let frame_count = FrameCount::from_byte_len(len);

        if frame_count.is_negative() || !frame_count.is_whole() {
            warn!(
                sample = name,
                bytes = len,
                frame_count = %frame_count,
                "Sample size doesn't match the expected layout; frame count is likely wrong"
            );
        }
        if !(0..=MAX_INSTRUMENT_KEY).contains(&key) {
            warn!(sample = name, key, "Key is outside the playable range 0-127");
        }

        debug!(sample = name, key, frame_count = %frame_count, "Built region");
        regions.push(Region::new(name, key, frame_count));
    }
    Ok(regions)
}

/// Reads the size of every sample on the given pool and builds their regions.
/// Sizes may be read in any order, keys are always assigned in sample order.
pub fn build_regions(
    samples: &[SampleFile],
    keys: &mut KeyCounter,
    pool: &ThreadPool,
) -> Result<Vec<Region>, Error> {
    let lengths = pool.install(|| {
        samples
            .par_iter()
            .map(|sample| {
                fs::metadata(sample.path())
                    .map(|metadata| metadata.len())
                    .map_err(|source| Error::SampleRead {
                        path: sample.path().to_path_buf(),
                        source,
                    })
            })
            .collect::<Result<Vec<u64>, Error>>()
    })?;

    regions_from_lengths(samples.iter().map(SampleFile::name).zip(lengths), keys)
}
