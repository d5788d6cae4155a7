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

//! Startup settings and the resolved simulation config resource.
//!
//! [`SimulationSettings`] is what a host loads from JSON. Template names are
//! resolved against the [`Templates`] registry once at startup, producing the
//! read-only [`SimulationConfig`] world resource.
//!
//! ```
//! use tank_ecs::game::config::SimulationSettings;
//!
//! let settings = SimulationSettings::from_json_str(r#"{ "tank_count": 3 }"#).unwrap();
//! assert_eq!(settings.tank_count, 3);
//! assert_eq!(settings.tank_template, "tank");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::game::templates::{CANNONBALL_TEMPLATE, TANK_TEMPLATE};
use crate::template::{TemplateId, Templates};

/// Logging options consumed by [`crate::profiling::init_tracing`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
    /// Write to this file instead of stderr (needs the `profiling` feature)
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Host-facing simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub tank_template: String,
    pub cannonball_template: String,
    pub tank_count: u32,
    pub log: LogSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tank_template: TANK_TEMPLATE.to_string(),
            cannonball_template: CANNONBALL_TEMPLATE.to_string(),
            tank_count: 20,
            log: LogSettings::default(),
        }
    }
}

impl SimulationSettings {
    /// Parse settings; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        debug!(path = %path.display(), tank_count = settings.tank_count, "loaded simulation settings");
        Ok(settings)
    }

    /// Resolve template names into a [`SimulationConfig`]
    pub fn resolve(&self, templates: &Templates) -> Result<SimulationConfig> {
        Ok(SimulationConfig {
            tank_template: templates.id(&self.tank_template)?,
            cannonball_template: templates.id(&self.cannonball_template)?,
            tank_count: self.tank_count,
        })
    }
}

/// Singleton config resource, read-only after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tank_template: TemplateId,
    pub cannonball_template: TemplateId,
    pub tank_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcsError;
    use crate::game::templates::register_default_templates;

    #[test]
    fn test_defaults() {
        let settings = SimulationSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, SimulationSettings::default());
        assert_eq!(settings.tank_count, 20);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let err = SimulationSettings::from_json_str(r#"{ "tanks": 4 }"#).unwrap_err();
        assert!(matches!(err, EcsError::ConfigError(_)));
    }

    #[test]
    fn test_resolve_against_registry() {
        let mut templates = Templates::new();
        register_default_templates(&mut templates);

        let config = SimulationSettings::default().resolve(&templates).unwrap();
        assert_eq!(config.tank_template, templates.id(TANK_TEMPLATE).unwrap());
        assert_eq!(config.tank_count, 20);

        let missing = SimulationSettings {
            tank_template: "hovercraft".to_string(),
            ..SimulationSettings::default()
        };
        assert_eq!(
            missing.resolve(&templates),
            Err(EcsError::TemplateNotFound("hovercraft".to_string()))
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SimulationSettings::load("/nonexistent/tank_ecs/settings.json").unwrap_err();
        assert!(matches!(err, EcsError::IoError(_)));
    }
}
