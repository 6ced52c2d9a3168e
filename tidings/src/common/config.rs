/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Configuration for a Tidings bus
///
/// Loaded from TOML files in XDG-compliant directories, or supplied directly
/// through [`BusBuilder::config`](crate::common::BusBuilder::config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TidingsConfig {
    /// Limits and capacity configuration
    pub limits: LimitsConfig,
    /// Behavioral configuration switches
    pub behavior: BehaviorConfig,
    /// Path configuration for various directories
    pub paths: PathsConfig,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Log a warning each time a payload type's envelope pool reaches a multiple
    /// of this size. `0` disables the warning. This is never a cap.
    pub pool_growth_warning: usize,
    /// Initial capacity of a payload type's handler list
    pub subscriber_capacity: usize,
}

/// Behavioral configuration switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log handler and completion-callback panics at `error` level
    pub log_handler_faults: bool,
    /// Emit a `trace` record for every handler scheduled by a publish
    pub trace_dispatch: bool,
}

/// Path configuration for various directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for configuration files
    pub config_directory: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            pool_growth_warning: 1024,
            subscriber_capacity: 4,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_handler_faults: true,
            trace_dispatch: true,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_directory: "~/.config/tidings".to_string(),
        }
    }
}

impl TidingsConfig {
    /// Parse configuration from a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the document is malformed or a value has the wrong type.
    pub fn from_toml_str(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(config_str)
    }

    /// Load configuration from an explicit file path.
    ///
    /// Falls back to the defaults (and logs why) if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(config_str) => match Self::from_toml_str(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `tidings/config.toml` under `$XDG_CONFIG_HOME` (falling back to
    /// `~/.config`) and the XDG config search path.
    ///
    /// If no configuration file is found, returns the default configuration.
    /// If a configuration file exists but is malformed, logs an error and uses defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("tidings") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from(path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: TidingsConfig = TidingsConfig::load();
}
