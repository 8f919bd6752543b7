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

//! Writing patches to disk.
//!
//! Patches are either written next to the samples they describe, or bundled
//! with copies of the samples into a fresh `<name>.preset` directory that sits
//! beside the sample directory. Preset directories are never reused: if the
//! name is taken, `<name>-2.preset`, `<name>-3.preset` and so on are tried.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPool;
use tempfile::Builder;
use tracing::debug;

use crate::error::Error;
use crate::patch::{Patch, PATCH_FILE_NAME};
use crate::scanner::SampleFile;
use crate::util::{absolute_lexical, file_name_or};

/// The suffix every preset directory carries.
pub const PRESET_SUFFIX: &str = ".preset";

/// Writes the patch as `patch.json` inside the sample directory, replacing any existing file.
pub fn write_in_place(directory: &Path, patch: &Patch) -> Result<PathBuf, Error> {
    let destination = directory.join(PATCH_FILE_NAME);
    write_patch_file(&destination, &patch.to_json()?)?;
    Ok(destination)
}

/// Creates a new preset directory for the given sample directory, copies the samples
/// into it and writes the patch. Returns the path of the written patch file.
pub fn write_preset(
    directory: &Path,
    samples: &[SampleFile],
    patch: &Patch,
    max_attempts: u32,
    pool: &ThreadPool,
) -> Result<PathBuf, Error> {
    let contents = patch.to_json()?;
    let preset_dir = create_preset_dir(directory, max_attempts)?;
    let destination = preset_dir.join(PATCH_FILE_NAME);

    let (copied, written) = pool.install(|| {
        rayon::join(
            || {
                samples
                    .par_iter()
                    .try_for_each(|sample| copy_sample(sample, &preset_dir))
            },
            || write_patch_file(&destination, &contents),
        )
    });
    copied?;
    written?;

    Ok(destination)
}

/// The preset name for a sample directory: its base name without any `.preset` suffix.
pub fn preset_base_name(directory: &Path) -> String {
    let name = file_name_or(directory, "samples");
    match name.strip_suffix(PRESET_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => name,
    }
}

/// The directory name for the given attempt. The first attempt gets the plain
/// name, later ones are numbered starting at 2.
pub fn preset_dir_name(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        format!("{base}{PRESET_SUFFIX}")
    } else {
        format!("{base}-{attempt}{PRESET_SUFFIX}")
    }
}

/// Creates a uniquely named preset directory as a sibling of the given sample directory.
/// The sample directory path is made absolute without resolving symlinks, so a linked
/// sample directory gets its preset next to the link under the link's name.
pub fn create_preset_dir(directory: &Path, max_attempts: u32) -> Result<PathBuf, Error> {
    let source_error = |source| Error::PresetDirectory {
        path: directory.to_path_buf(),
        source,
    };
    fs::metadata(directory).map_err(source_error)?;
    let directory = absolute_lexical(directory).map_err(source_error)?;

    let parent = directory.parent().unwrap_or(directory.as_path());
    create_unique_dir(parent, &preset_base_name(&directory), max_attempts)
}

/// Creates `<base>.preset` inside `parent`, falling back to `<base>-2.preset` and so on.
/// Only name collisions are retried; any other failure is returned immediately.
fn create_unique_dir(parent: &Path, base: &str, max_attempts: u32) -> Result<PathBuf, Error> {
    for attempt in 1..=max_attempts {
        let candidate = parent.join(preset_dir_name(base, attempt));
        match fs::create_dir(&candidate) {
            Ok(()) => {
                debug!(preset = %candidate.display(), "Created preset directory");
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(
                    preset = %candidate.display(),
                    attempt,
                    "Preset directory already exists. Trying again..."
                );
            }
            Err(source) => {
                return Err(Error::PresetDirectory {
                    path: candidate,
                    source,
                })
            }
        }
    }

    Err(Error::PresetAttemptsExhausted {
        base: parent.join(preset_dir_name(base, 1)),
        attempts: max_attempts,
    })
}

/// Copies a sample into the preset directory, keeping its name.
fn copy_sample(sample: &SampleFile, preset_dir: &Path) -> Result<(), Error> {
    let to = preset_dir.join(sample.name());
    fs::copy(sample.path(), &to).map_err(|source| Error::Copy {
        from: sample.path().to_path_buf(),
        to: to.clone(),
        source,
    })?;
    debug!(sample = sample.name(), "Copied sample");
    Ok(())
}

/// Writes the file by writing a temporary file next to it and renaming it into place,
/// so an interrupted write never leaves a truncated patch behind. A replaced file keeps
/// its permissions, a new one gets the same permissions a plain write would give it.
fn write_patch_file(destination: &Path, contents: &str) -> Result<(), Error> {
    let write_error = |source| Error::Write {
        path: destination.to_path_buf(),
        source,
    };

    let parent = destination.parent().unwrap_or(Path::new("."));
    let mut builder = Builder::new();
    builder.prefix(".patch").suffix(".tmp");
    if let Some(permissions) = new_file_permissions() {
        builder.permissions(permissions);
    }
    let mut file = builder.tempfile_in(parent).map_err(write_error)?;

    if let Ok(existing) = fs::metadata(destination) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }

    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.persist(destination).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Permissions requested for a new patch file. The process umask still applies.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;
    use std::io;
    use std::path::Path;

    use rayon::ThreadPoolBuilder;

    use crate::config::{SampleFilter, ScanOrder};
    use crate::error;
    use crate::patch::Patch;
    use crate::region::{FrameCount, Region};
    use crate::scanner::scan_samples;
    use crate::template::Template;
    use crate::testutil::sample_dir;

    use super::{
        create_preset_dir, create_unique_dir, preset_base_name, preset_dir_name, write_in_place,
        write_preset,
    };

    fn patch() -> Result<Patch, Box<dyn Error>> {
        let template = Template::parse(r#"{"regions": []}"#, Path::new("t.json"))?;
        Ok(Patch::assemble(
            template,
            &[Region::new("kick1.wav", 53, FrameCount::from_byte_len(1000))],
        )?)
    }

    #[test]
    fn base_names() {
        assert_eq!("kick", preset_base_name(Path::new("/samples/kick")));
        assert_eq!("kick", preset_base_name(Path::new("/samples/kick.preset")));
        assert_eq!("kick.wavs", preset_base_name(Path::new("/samples/kick.wavs")));
        assert_eq!(".preset", preset_base_name(Path::new("/samples/.preset")));
    }

    #[test]
    fn dir_names() {
        assert_eq!("kick.preset", preset_dir_name("kick", 1));
        assert_eq!("kick-2.preset", preset_dir_name("kick", 2));
        assert_eq!("kick-3.preset", preset_dir_name("kick", 3));
    }

    #[test]
    fn collisions_get_numbered() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick", &[])?;
        let parent = temp.path();

        assert_eq!(parent.join("kick.preset"), create_preset_dir(&dir, 10)?);
        assert_eq!(parent.join("kick-2.preset"), create_preset_dir(&dir, 10)?);
        assert_eq!(parent.join("kick-3.preset"), create_preset_dir(&dir, 10)?);
        Ok(())
    }

    #[test]
    fn preset_source_keeps_its_name() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick.preset", &[])?;
        let parent = temp.path();

        // The source itself occupies kick.preset.
        assert_eq!(parent.join("kick-2.preset"), create_preset_dir(&dir, 10)?);
        Ok(())
    }

    #[test]
    fn collisions_are_bounded() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick", &[])?;
        fs::create_dir(temp.path().join("kick.preset"))?;
        fs::create_dir(temp.path().join("kick-2.preset"))?;

        let result = create_preset_dir(&dir, 2);
        assert!(matches!(
            result,
            Err(error::Error::PresetAttemptsExhausted { attempts: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_source_is_fatal() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("missing");

        let result = create_preset_dir(&missing, 10);
        assert!(matches!(result, Err(error::Error::PresetDirectory { .. })));
        assert!(!temp.path().join("missing.preset").exists());
        Ok(())
    }

    #[test]
    fn non_collision_errors_are_fatal() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        // A regular file can't hold directories, so creation fails without a collision.
        let parent = temp.path().join("not-a-dir");
        fs::write(&parent, "x")?;

        match create_unique_dir(&parent, "kick", 10) {
            Err(error::Error::PresetDirectory { path, source }) => {
                assert_eq!(parent.join("kick.preset"), path);
                assert_ne!(io::ErrorKind::AlreadyExists, source.kind());
            }
            other => {
                return Err(format!("expected a preset directory error, got {other:?}").into())
            }
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_source_keeps_link_name() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let real = temp.path().join("real");
        let links = temp.path().join("links");
        fs::create_dir(&real)?;
        fs::create_dir(&links)?;
        let dir = sample_dir(&real, "kick", &[])?;
        std::os::unix::fs::symlink(&dir, links.join("snare"))?;

        let preset = create_preset_dir(&links.join("snare"), 10)?;
        assert_eq!(links.join("snare.preset"), preset);
        assert!(!real.join("kick.preset").exists());
        Ok(())
    }

    #[test]
    fn in_place_overwrites() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick", &[("kick1.wav", 1000)])?;
        fs::write(dir.join("patch.json"), "old")?;

        let destination = write_in_place(&dir, &patch()?)?;
        assert_eq!(dir.join("patch.json"), destination);
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&destination)?)?;
        assert_eq!(53, written["regions"][0]["hikey"]);
        Ok(())
    }

    #[test]
    fn preset_copies_samples() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(
            temp.path(),
            "kick",
            &[("kick1.wav", 1000), ("kick2.aiff", 2000), ("readme.txt", 3)],
        )?;
        let samples = scan_samples(&dir, SampleFilter::WavAiff, ScanOrder::Name)?;
        let pool = ThreadPoolBuilder::new().num_threads(2).build()?;

        let destination = write_preset(&dir, &samples, &patch()?, 10, &pool)?;
        let preset = temp.path().join("kick.preset");
        assert_eq!(preset.join("patch.json"), destination);
        assert_eq!(fs::read(dir.join("kick1.wav"))?, fs::read(preset.join("kick1.wav"))?);
        assert_eq!(fs::read(dir.join("kick2.aiff"))?, fs::read(preset.join("kick2.aiff"))?);
        assert!(!preset.join("readme.txt").exists());

        let mut entries: Vec<String> = fs::read_dir(&preset)?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().to_string()))
            .collect::<Result<_, _>>()?;
        entries.sort();
        assert_eq!(vec!["kick1.wav", "kick2.aiff", "patch.json"], entries);
        Ok(())
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> Result<u32, Box<dyn Error>> {
        use std::os::unix::fs::PermissionsExt;

        Ok(fs::metadata(path)?.permissions().mode() & 0o777)
    }

    #[cfg(unix)]
    #[test]
    fn in_place_keeps_permissions() -> Result<(), Box<dyn Error>> {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick", &[("kick1.wav", 1000)])?;
        let existing = dir.join("patch.json");
        fs::write(&existing, "old")?;
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o644))?;

        write_in_place(&dir, &patch()?)?;
        assert_eq!(0o644, mode(&existing)?);

        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640))?;
        write_in_place(&dir, &patch()?)?;
        assert_eq!(0o640, mode(&existing)?);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn new_patch_gets_default_permissions() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let dir = sample_dir(temp.path(), "kick", &[("kick1.wav", 1000)])?;
        let samples = scan_samples(&dir, SampleFilter::WavAiff, ScanOrder::Name)?;
        let pool = ThreadPoolBuilder::new().num_threads(2).build()?;

        // A plain write shows what the current umask gives a new file.
        let reference = temp.path().join("reference.json");
        fs::write(&reference, "{}")?;

        let destination = write_preset(&dir, &samples, &patch()?, 10, &pool)?;
        assert_eq!(mode(&reference)?, mode(&destination)?);

        let in_place = write_in_place(&dir, &patch()?)?;
        assert_eq!(mode(&reference)?, mode(&in_place)?);
        Ok(())
    }
}
