// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Logging and profiling
//!
//! All diagnostics go through `tracing`. The library only emits events; a
//! host installs a subscriber once, usually with [`init_tracing`]:
//!
//! ```ignore
//! let settings = SimulationSettings::load("config/simulation.json")?;
//! let _guard = tank_ecs::profiling::init_tracing(&settings.log)?;
//! ```
//!
//! `RUST_LOG` takes precedence over `LogSettings::level`.
//!
//! ## Spans
//!
//! Enable the `profiling` feature to compile in per-frame and per-system
//! `info_span!`s and to allow logging to a file through a non-blocking
//! `tracing-appender` writer:
//!
//! ```toml
//! [dependencies]
//! tank_ecs = { version = "0.3", features = ["profiling"] }
//! ```
//!
//! ## Performance Tips
//!
//! 1. Profile in release mode for accurate metrics
//! 2. Use `RUST_LOG=tank_ecs=trace` to see skipped stale references

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::{EcsError, Result};
use crate::game::config::LogSettings;

/// Keeps the background log writer alive; drop it last
#[must_use = "dropping the guard stops file logging"]
pub struct TracingGuard {
    #[cfg(feature = "profiling")]
    _writer: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global `tracing` subscriber.
///
/// Fails with [`EcsError::ConfigError`] for an invalid filter or when a
/// global subscriber is already set.
pub fn init_tracing(settings: &LogSettings) -> Result<TracingGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|err| EcsError::ConfigError(format!("log level {:?}: {err}", settings.level)))?,
    };

    let (writer, ansi, guard) = make_writer(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let installed = if settings.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|err| EcsError::ConfigError(err.to_string()))?;

    Ok(guard)
}

#[cfg(feature = "profiling")]
fn make_writer(settings: &LogSettings) -> Result<(BoxMakeWriter, bool, TracingGuard)> {
    match &settings.file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((
                BoxMakeWriter::new(non_blocking),
                false,
                TracingGuard {
                    _writer: Some(guard),
                },
            ))
        }
        None => Ok((
            BoxMakeWriter::new(std::io::stderr),
            true,
            TracingGuard { _writer: None },
        )),
    }
}

#[cfg(not(feature = "profiling"))]
fn make_writer(settings: &LogSettings) -> Result<(BoxMakeWriter, bool, TracingGuard)> {
    if let Some(path) = &settings.file {
        tracing::warn!(path = %path.display(), "file logging needs the `profiling` feature; using stderr");
    }
    Ok((BoxMakeWriter::new(std::io::stderr), true, TracingGuard {}))
}
