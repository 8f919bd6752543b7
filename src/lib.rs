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

//! Turns a directory of samples into a sampler preset: a JSON patch mapping
//! each sample to its own key, optionally bundled with copies of the samples.

pub mod config;
pub mod error;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod region;
pub mod scanner;
pub mod template;
#[cfg(test)]
mod testutil;
pub mod util;

pub use config::Options;
pub use error::Error;
pub use pipeline::{run, Summary};
