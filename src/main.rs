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
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    crate_description, crate_version, Arg, ArgAction, Command, CommandFactory, FromArgMatches,
    Parser,
};
use presetgen::config::{
    OutputMode, SampleFilter, ScanOrder, DEFAULT_KEY_START, DEFAULT_MAX_PRESET_ATTEMPTS,
};
use presetgen::{Error, Options};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = crate_description!(),
    disable_version_flag = true
)]
struct Cli {
    /// Directory containing samples.
    #[arg(value_parser = directory_path)]
    directory: PathBuf,

    /// JSON template to use. Defaults to the bundled template.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Starting key to use.
    #[arg(long, default_value_t = DEFAULT_KEY_START, allow_negative_numbers = true)]
    key_start: i64,

    /// Which files count as samples.
    #[arg(long, value_enum, default_value_t = SampleFilter::WavAiff)]
    filter: SampleFilter,

    /// Where to write the patch.
    #[arg(long, value_enum, default_value_t = OutputMode::Preset)]
    output: OutputMode,

    /// The order samples are assigned keys in.
    #[arg(long, value_enum, default_value_t = ScanOrder::Listing)]
    order: ScanOrder,

    /// How many preset directory names to try before giving up.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PRESET_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_attempts: u32,

    /// Worker threads for reading and copying samples. Defaults to the number of CPUs.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Increase log verbosity. May be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    debug: u8,
}

impl Cli {
    fn into_options(self) -> Options {
        let mut options = Options::new(self.directory);
        options.template = self.template;
        options.key_start = self.key_start;
        options.filter = self.filter;
        options.output = self.output;
        options.order = self.order;
        options.max_preset_attempts = self.max_attempts;
        if let Some(jobs) = self.jobs {
            options.jobs = jobs;
        }
        options
    }
}

/// Validates that the directory argument names an existing directory.
fn directory_path(path: &str) -> Result<PathBuf, Error> {
    let path = PathBuf::from(path);
    let metadata = fs::metadata(&path).map_err(|e| Error::InvalidDirectory {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::InvalidDirectory {
            path,
            reason: "not a directory".into(),
        });
    }
    Ok(path)
}

/// The command with `-v` as the version flag instead of clap's default `-V`.
fn command() -> Command {
    Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    )
}

fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    init_logging(cli.debug);

    tracing::info!("--- {} v{} ---", crate_description!(), crate_version!());

    match presetgen::run(&cli.into_options()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
