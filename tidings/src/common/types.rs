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

//! Defines common type aliases shared by the bus, pool, registry and envelope.

use std::any::{Any, TypeId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;

use crate::message::Message;

/// The boxed future a closure handler returns.
///
/// Build one with [`Reply`](crate::common::Reply) rather than by hand.
pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Crate-internal: a completion callback as stored on an envelope and snapshotted by
/// each publish.
pub(crate) type CompletionCallback<T> = Arc<dyn Fn(&Message<T>) + Send + Sync + 'static>;

/// Crate-internal: per-payload-type storage. Each value is the concrete
/// collection for the `TypeId` it is keyed by and is recovered with a checked
/// downcast.
pub(crate) type TypeMap = DashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// Renders a caught panic payload as text for logging.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
