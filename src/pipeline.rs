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

//! The preset generation pipeline.
//!
//! Stages run in a fixed order: load the template, scan the sample directory,
//! build regions, assemble the patch, then write it out. Nothing touches the
//! filesystem until every earlier stage has succeeded, so a bad template or an
//! empty directory never leaves a half-written preset behind.

use std::path::PathBuf;

use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::config::{Options, OutputMode};
use crate::error::Error;
use crate::output::{write_in_place, write_preset};
use crate::patch::Patch;
use crate::region::{build_regions, KeyCounter};
use crate::scanner::scan_samples;
use crate::template::load_template;

/// What a successful run produced.
#[derive(Debug)]
pub struct Summary {
    /// The number of samples turned into regions.
    pub processed: usize,
    /// The total number of regions in the written patch.
    pub regions: usize,
    /// The patch file that was written.
    pub patch_file: PathBuf,
}

/// Runs the full pipeline with the given options.
pub fn run(options: &Options) -> Result<Summary, Error> {
    let template = load_template(options.template.as_deref())?;
    debug!(existing_regions = template.region_count(), "Template loaded");

    let samples = scan_samples(&options.directory, options.filter, options.order)?;
    if samples.is_empty() {
        return Err(Error::NoSamplesFound {
            path: options.directory.clone(),
            filter: options.filter,
        });
    }
    debug!(samples = samples.len(), "Directory scanned");

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.jobs.max(1))
        .thread_name(|i| format!("presetgen-io-{i}"))
        .build()?;

    let mut keys = KeyCounter::new(options.key_start);
    let regions = build_regions(&samples, &mut keys, &pool)?;
    let processed = keys.issued();

    let patch = Patch::assemble(template, &regions)?;

    let patch_file = match options.output {
        OutputMode::InPlace => {
            info!("{processed} files successfully processed.");
            write_in_place(&options.directory, &patch)?
        }
        OutputMode::Preset => {
            info!("{processed} files successfully processed. Creating preset...");
            write_preset(
                &options.directory,
                &samples,
                &patch,
                options.max_preset_attempts,
                &pool,
            )?
        }
    };
    info!("Patch file successfully written to {}", patch_file.display());

    Ok(Summary {
        processed,
        regions: patch.regions().len(),
        patch_file,
    })
}
