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

//! Convenient helpers for creating handler return types.
//!
//! Closure handlers return a [`HandlerFuture`]. The [`Reply`] struct provides a
//! namespace for building one without boilerplate.
//!
//! # Infallible Handlers
//!
//! ```ignore
//! // Synchronous handler - no async work needed
//! bus.subscribe_fn(|msg: &Message<Ping>| {
//!     tracing::info!(seq = msg.payload().seq, "ping");
//!     Reply::ready()
//! });
//!
//! // Async handler
//! bus.subscribe_fn(|msg: &Message<Ping>| {
//!     let msg = msg.clone();
//!     Reply::pending(async move {
//!         store.save(msg.payload_cloned()).await;
//!     })
//! });
//! ```
//!
//! # Fallible Handlers
//!
//! A fallible handler's error is logged and otherwise swallowed: the bus never
//! reports handler outcomes back to the publisher.
//!
//! ```ignore
//! bus.subscribe_fn(|msg: &Message<Upload>| {
//!     let msg = msg.clone();
//!     Reply::try_pending(async move {
//!         storage.put(&msg.payload().key).await?;
//!         Ok::<(), StorageError>(())
//!     })
//! });
//! ```

use std::error::Error;
use std::future::Future;

use tracing::error;

use crate::common::HandlerFuture;

/// A utility namespace for creating handler return types.
///
/// ## Infallible Handlers
///
/// - [`Reply::ready()`] - For synchronous handlers with no async work
/// - [`Reply::pending()`] - For handlers with async work
///
/// ## Fallible Handlers
///
/// - [`Reply::try_pending()`] - For async handlers returning `Result`
/// - [`Reply::try_ok()`] - For immediate success
/// - [`Reply::try_err()`] - For immediate error
pub struct Reply;

impl Reply {
    /// Creates an immediately resolving future for synchronous handlers.
    #[inline]
    #[must_use]
    pub fn ready() -> HandlerFuture {
        Box::pin(async move {})
    }

    /// Wraps an async block into the required handler return type.
    #[inline]
    pub fn pending<F>(future: F) -> HandlerFuture
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Box::pin(future)
    }

    /// Wraps an async block returning `Result` for fallible handlers.
    ///
    /// An `Err` is logged at `error` level; the handler then counts as finished
    /// like any other.
    #[inline]
    pub fn try_pending<F, E>(future: F) -> HandlerFuture
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        Box::pin(async move {
            if let Err(err) = future.await {
                error!(error = %err, "Unhandled error from message handler");
            }
        })
    }

    /// Creates an immediate success result for fallible handlers.
    #[inline]
    #[must_use]
    pub fn try_ok() -> HandlerFuture {
        Self::ready()
    }

    /// Creates an immediate error result for fallible handlers.
    #[inline]
    #[must_use]
    pub fn try_err<E>(error: E) -> HandlerFuture
    where
        E: Error + Send + Sync + 'static,
    {
        Self::try_pending(async move { Err(error) })
    }
}
