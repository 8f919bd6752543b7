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
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{SampleFilter, ScanOrder};
use crate::error::Error;

/// A sample file accepted by the scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleFile {
    /// The file name, relative to the sample directory.
    name: String,
    /// The full path to the file.
    path: PathBuf,
}

impl SampleFile {
    /// Gets the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the full path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lists the given directory and returns every file accepted by the filter.
/// Subdirectories and non-matching files are skipped. With `ScanOrder::Listing`
/// the result follows the order the filesystem returns entries in, which differs
/// between platforms.
pub fn scan_samples(
    directory: &Path,
    filter: SampleFilter,
    order: ScanOrder,
) -> Result<Vec<SampleFile>, Error> {
    let scan_error = |source| Error::ScanFailed {
        path: directory.to_path_buf(),
        source,
    };

    let mut samples = Vec::new();
    for entry in fs::read_dir(directory).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let path = entry.path();

        if path.is_dir() {
            debug!(entry = %path.display(), "Skipping subdirectory");
            continue;
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(name) => {
                debug!(entry = ?name, "Skipping entry with a non UTF-8 name");
                continue;
            }
        };

        if !filter.matches(&name) {
            debug!(entry = %name, "Skipping non-sample file");
            continue;
        }

        samples.push(SampleFile { name, path });
    }

    if order == ScanOrder::Name {
        samples.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(samples)
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use crate::config::{SampleFilter, ScanOrder};
    use crate::error;
    use crate::testutil::sample_dir;

    use super::scan_samples;

    #[test]
    fn filters_and_sorts() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(
            temp.path(),
            "kick",
            &[
                ("kick2.aiff", 2000),
                ("readme.txt", 10),
                ("kick1.wav", 1000),
                ("kick3.WAV", 500),
            ],
        )?;
        fs::create_dir(dir.join("nested.wav"))?;

        let samples = scan_samples(&dir, SampleFilter::WavAiff, ScanOrder::Name)?;
        let names: Vec<&str> = samples.iter().map(|sample| sample.name()).collect();
        assert_eq!(vec!["kick1.wav", "kick2.aiff", "kick3.WAV"], names);
        assert_eq!(dir.join("kick1.wav"), samples[0].path());

        let samples = scan_samples(&dir, SampleFilter::Wav, ScanOrder::Name)?;
        let names: Vec<&str> = samples.iter().map(|sample| sample.name()).collect();
        assert_eq!(vec!["kick1.wav"], names);

        Ok(())
    }

    #[test]
    fn listing_order_keeps_every_sample() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(
            temp.path(),
            "hats",
            &[("b.wav", 100), ("a.wav", 100), ("c.wav", 100)],
        )?;

        let mut names: Vec<String> = scan_samples(&dir, SampleFilter::Wav, ScanOrder::Listing)?
            .into_iter()
            .map(|sample| sample.name().to_string())
            .collect();
        names.sort();
        assert_eq!(vec!["a.wav", "b.wav", "c.wav"], names);
        Ok(())
    }

    #[test]
    fn empty_directory() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let samples = scan_samples(temp.path(), SampleFilter::WavAiff, ScanOrder::Listing)?;
        assert!(samples.is_empty());
        Ok(())
    }

    #[test]
    fn missing_directory() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let result = scan_samples(
            &temp.path().join("missing"),
            SampleFilter::WavAiff,
            ScanOrder::Listing,
        );
        assert!(matches!(result, Err(error::Error::ScanFailed { .. })));
        Ok(())
    }
}
