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

use anyhow::Context;
use tokio::runtime::Handle;

use crate::common::config::CONFIG;
use crate::common::{Bus, TidingsConfig};

/// Configures a [`Bus`] before it is created.
///
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let bus = Bus::builder()
///     .runtime(runtime.handle().clone())
///     .config(TidingsConfig::load_from("tidings.toml"))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct BusBuilder {
    runtime: Option<Handle>,
    config: Option<TidingsConfig>,
}

impl BusBuilder {
    /// Runs handlers on the runtime behind `handle` instead of the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Uses `config` instead of the global configuration.
    pub fn config(mut self, config: TidingsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Creates the bus.
    ///
    /// # Errors
    ///
    /// Fails if no runtime handle was supplied and the caller is not running inside
    /// a Tokio runtime.
    pub fn build(self) -> anyhow::Result<Bus> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()
                .context("No Tokio runtime handle was supplied and none is running")?,
        };
        let config = self.config.unwrap_or_else(|| CONFIG.clone());
        Ok(Bus::from_parts(runtime, config))
    }
}
