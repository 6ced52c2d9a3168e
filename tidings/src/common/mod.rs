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

//! Core runtime pieces of Tidings.
//!
//! *   [`Bus`]: The type-keyed publish/subscribe hub.
//! *   [`BusBuilder`]: Configures a bus before it is created.
//! *   [`Reply`]: A utility struct for creating handler return types.
//! *   [`TidingsConfig`]: File-backed configuration.

// --- Public Re-exports ---
pub use bus::Bus;
pub use bus_builder::BusBuilder;
pub use config::{BehaviorConfig, LimitsConfig, PathsConfig, TidingsConfig, CONFIG};
pub use pool::PoolStats;
pub use reply::Reply;

// --- Crate-Internal Re-exports ---
pub(crate) use bus::BusInner;
pub use types::HandlerFuture;
pub(crate) use types::{panic_message, CompletionCallback, TypeMap};

// --- Submodules ---

/// Defines common type aliases.
mod types;

/// Defines the `Bus` and its dispatch logic.
mod bus;
/// Defines the `BusBuilder`.
mod bus_builder;
/// Defines the configuration system.
mod config;
/// Per-type envelope pools.
mod pool;
/// Per-type subscriber lists.
mod registry;
/// Defines the `Reply` utility.
mod reply;
