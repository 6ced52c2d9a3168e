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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Tidings
//!
//! An in-process publish/subscribe bus keyed by payload type, built on Tokio.
//!
//! ## Key Concepts
//!
//! - **Bus (`Bus`)**: Holds the per-type subscriber lists and envelope pools and
//!   runs handlers on a Tokio runtime.
//! - **Envelopes (`Message<T>`)**: Pooled, reusable carriers of a payload. An
//!   envelope is leased from the bus, published any number of times and recycled
//!   when its last handler is done with it.
//! - **Handlers (`Handler<T>`, `HandlerRef<T>`)**: Subscribers for one payload type.
//!   Every handler of a type runs concurrently, on its own task, for each publish.
//! - **Completion callbacks**: Run once per publish after every handler of that
//!   publish has finished. Recycling from the callback is the usual pattern.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidings::prelude::*;
//!
//! #[tidings_payload]
//! struct Ping {
//!     seq: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bus = Bus::new();
//!     bus.subscribe_fn(|msg: &Message<Ping>| {
//!         tracing::info!(seq = msg.payload().seq, "ping");
//!         Reply::ready()
//!     });
//!
//!     let msg = bus.message_with(Ping { seq: 1 });
//!     msg.set_callback(|m| {
//!         let _ = m.recycle();
//!     })?;
//!     msg.publish();
//!     Ok(())
//! }
//! ```

/// Bus, pools, registry, configuration and reply helpers.
pub(crate) mod common;

/// Defines the pooled message envelope.
pub(crate) mod message;

/// Defines the handler and payload traits.
pub(crate) mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `tidings-macro`)
/// *   [`tidings_macro::tidings_payload`]: Attribute macro for defining payload types.
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html): Needed to implement [`Handler`](crate::traits::Handler) on your own types.
///
/// ## Core Types
/// *   [`crate::common::Bus`]: The publish/subscribe hub.
/// *   [`crate::common::BusBuilder`]: Configures a bus before creation.
/// *   [`crate::common::Reply`]: Builds handler return values.
/// *   [`crate::common::TidingsConfig`]: Bus configuration.
/// *   [`crate::message::Message`]: The pooled envelope.
/// *   [`crate::message::MessageError`]: Errors from envelope operations.
/// *   [`crate::traits::Handler`]: Trait implemented by subscribers.
/// *   [`crate::traits::HandlerRef`]: Identity-bearing handler reference.
/// *   [`crate::traits::Payload`]: Marker trait for payload types.
pub mod prelude {
    // Macros from tidings-macro
    pub use tidings_macro::*;

    // External crate re-exports
    pub use async_trait::async_trait;

    // Core types
    pub use crate::common::{
        BehaviorConfig, Bus, BusBuilder, HandlerFuture, LimitsConfig, PathsConfig, PoolStats,
        Reply, TidingsConfig, CONFIG,
    };
    pub use crate::message::{Message, MessageError};
    pub use crate::traits::{Handler, HandlerRef, Payload};
}
