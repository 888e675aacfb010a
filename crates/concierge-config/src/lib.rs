// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Concierge gateway.
//!
//! Every entry point returns either a validated [`ConciergeConfig`] or the
//! full list of [`ConfigError`] diagnostics, ready for [`render_errors`].

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ConciergeConfig;

/// Where a configuration comes from.
#[derive(Debug, Clone, Copy)]
enum Origin<'a> {
    /// The standard file hierarchy plus environment.
    Standard,
    /// One explicit file plus environment.
    File(&'a Path),
    /// A TOML string, nothing else.
    Inline(&'a str),
}

impl Origin<'_> {
    fn load(self) -> Result<ConciergeConfig, figment::Error> {
        match self {
            Origin::Standard => loader::load_config(),
            Origin::File(path) => loader::load_config_from_path(path),
            Origin::Inline(content) => loader::load_config_from_str(content),
        }
    }

    /// The TOML text diagnostics may point into, keyed as figment reports it.
    fn sources(self) -> Vec<(String, String)> {
        match self {
            Origin::Standard => loader::search_paths().into_iter().filter_map(read_source).collect(),
            Origin::File(path) => read_source(path.to_path_buf()).into_iter().collect(),
            Origin::Inline(content) => {
                vec![(diagnostic::INLINE_SOURCE.to_string(), content.to_string())]
            }
        }
    }
}

fn read_source(path: PathBuf) -> Option<(String, String)> {
    let content = std::fs::read_to_string(&path).ok()?;
    let shown = std::path::absolute(&path).unwrap_or(path);
    Some((shown.display().to_string(), content))
}

fn load_and_validate_from(origin: Origin<'_>) -> Result<ConciergeConfig, Vec<ConfigError>> {
    let config = origin
        .load()
        .map_err(|err| diagnostic::figment_to_config_errors(err, &origin.sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<ConciergeConfig, Vec<ConfigError>> {
    load_and_validate_from(Origin::Standard)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ConciergeConfig, Vec<ConfigError>> {
    load_and_validate_from(Origin::File(path))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ConciergeConfig, Vec<ConfigError>> {
    load_and_validate_from(Origin::Inline(toml_content))
}
