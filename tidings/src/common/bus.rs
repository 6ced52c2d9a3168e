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

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, instrument, trace, warn};

use crate::common::config::CONFIG;
use crate::common::pool::MessagePool;
use crate::common::registry::SubscriptionRegistry;
use crate::common::{panic_message, BusBuilder, CompletionCallback, HandlerFuture, PoolStats, TidingsConfig};
use crate::message::{HandleGuard, Message};
use crate::traits::{HandlerRef, Payload};

/// An in-process publish/subscribe hub keyed by payload type.
///
/// Handlers subscribe to a payload type `T`; every [`Message<T>`] published through
/// the bus is delivered to each of them concurrently, on its own task of the bus's
/// Tokio runtime. Envelopes are pooled per type: [`Bus::message`] hands out a
/// recycled envelope when one is idle and only allocates when none is.
///
/// `Bus` is a cheap handle; clones share the same registry, pools and runtime.
///
/// ```ignore
/// let bus = Bus::new();
/// bus.subscribe_fn(|msg: &Message<String>| {
///     tracing::info!(text = msg.payload().as_str(), "received");
///     Reply::ready()
/// });
///
/// let msg = bus.message_with(String::from("hello"));
/// msg.set_callback(|m| { let _ = m.recycle(); })?;
/// msg.publish();
/// ```
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

/// Shared state behind every clone of a [`Bus`]. Envelopes hold a weak reference
/// to it so they can publish themselves.
pub(crate) struct BusInner {
    registry: SubscriptionRegistry,
    pool: MessagePool,
    runtime: Handle,
    config: TidingsConfig,
}

impl Bus {
    /// Creates a bus on the current Tokio runtime, configured from the global
    /// [`CONFIG`](crate::common::CONFIG).
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use [`Bus::builder`] to supply a
    /// runtime handle explicitly or to get an error instead.
    pub fn new() -> Self {
        Self::from_parts(Handle::current(), CONFIG.clone())
    }

    /// Starts building a bus with an explicit runtime and configuration.
    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    pub(crate) fn from_parts(runtime: Handle, config: TidingsConfig) -> Self {
        trace!(?config, "Creating bus");
        Self {
            inner: Arc::new(BusInner {
                registry: SubscriptionRegistry::new(config.limits.subscriber_capacity),
                pool: MessagePool::new(config.limits.pool_growth_warning),
                runtime,
                config,
            }),
        }
    }

    /// The configuration this bus was built with.
    pub fn config(&self) -> &TidingsConfig {
        &self.inner.config
    }

    /// Leases an envelope for `T`.
    ///
    /// Reuses an idle envelope when the pool has one, keeping whatever payload it
    /// last carried. Otherwise allocates a new envelope holding `T::default()`.
    /// Either way the envelope is returned in use.
    pub fn message<T: Payload + Default>(&self) -> Message<T> {
        match self.inner.pool.acquire::<T>() {
            Some(message) => message,
            None => self.allocate(T::default()),
        }
    }

    /// Leases an envelope for `T` carrying `payload`, reusing an idle one if possible.
    pub fn message_with<T: Payload>(&self, payload: T) -> Message<T> {
        match self.inner.pool.acquire::<T>() {
            Some(message) => {
                message.set_payload(payload);
                message
            }
            None => self.allocate(payload),
        }
    }

    fn allocate<T: Payload>(&self, payload: T) -> Message<T> {
        let message = Message::new(payload, Arc::downgrade(&self.inner));
        self.inner.pool.register(&message);
        message
    }

    /// Registers `handler` for every subsequent publish of `T`.
    ///
    /// Registering the same reference twice makes it run twice per publish.
    #[instrument(skip(self, handler), fields(message_type = std::any::type_name::<T>(), handler = handler.name()))]
    pub fn subscribe<T: Payload>(&self, handler: HandlerRef<T>) {
        self.inner.registry.subscribe(handler);
    }

    /// Registers a closure handler and returns the reference needed to unsubscribe it.
    pub fn subscribe_fn<T, F>(&self, handler: F) -> HandlerRef<T>
    where
        T: Payload,
        F: Fn(&Message<T>) -> HandlerFuture + Send + Sync + 'static,
    {
        let handler = HandlerRef::from_fn(handler);
        self.subscribe(handler.clone());
        handler
    }

    /// Removes the first registration of `handler` for `T`.
    ///
    /// Returns `false` if it was not registered. Publishes already in flight still
    /// deliver to it.
    #[instrument(skip(self, handler), fields(message_type = std::any::type_name::<T>(), handler = handler.name()))]
    pub fn unsubscribe<T: Payload>(&self, handler: &HandlerRef<T>) -> bool {
        self.inner.registry.unsubscribe(handler)
    }

    /// Publishes `message` to every handler currently subscribed to `T`.
    ///
    /// Equivalent to [`Message::publish`] on an envelope leased from this bus.
    pub fn publish<T: Payload>(&self, message: &Message<T>) {
        self.inner.dispatch(message);
    }

    /// The number of registrations for `T`, counting duplicates.
    pub fn subscriber_count<T: Payload>(&self) -> usize {
        self.inner.registry.count::<T>()
    }

    /// Current size and idle count of the envelope pool for `T`.
    pub fn pool_stats<T: Payload>(&self) -> PoolStats {
        self.inner.pool.stats::<T>()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl BusInner {
    /// Fans `message` out to a snapshot of the handlers for `T`.
    ///
    /// Every handle is taken before the first handler task is spawned, so the count
    /// cannot touch zero while the publish is still being scheduled. When the
    /// envelope carries a completion callback, a join task waits for every handler
    /// task of this publish and then runs the callback exactly once.
    #[instrument(skip_all, fields(message_type = message.type_name(), message_id = message.id()))]
    pub(crate) fn dispatch<T: Payload>(&self, message: &Message<T>) {
        if !message.is_in_use() {
            warn!("Publishing a message that has already been recycled");
        }

        let handlers = self.registry.snapshot::<T>();
        if handlers.is_empty() {
            trace!("No subscribers, nothing to dispatch");
            return;
        }

        let callback = message.completion_callback();
        let guards: Vec<HandleGuard<T>> = handlers.iter().map(|_| HandleGuard::new(message)).collect();
        trace!(count = handlers.len(), "Dispatching message");

        let log_faults = self.config.behavior.log_handler_faults;
        let units: Vec<JoinHandle<()>> = handlers
            .into_iter()
            .zip(guards)
            .map(|(handler, guard)| {
                if self.config.behavior.trace_dispatch {
                    trace!(handler = handler.name(), "Scheduling handler");
                }
                self.runtime.spawn(run_handler(handler, guard, log_faults))
            })
            .collect();

        if let Some(callback) = callback {
            let message = message.clone();
            self.runtime.spawn(complete(units, callback, message, log_faults));
        }
    }
}

/// Runs one handler against its envelope, containing any panic.
///
/// The guard is owned by this future, so the handle is released once it finishes
/// or is dropped.
async fn run_handler<T: Payload>(handler: HandlerRef<T>, guard: HandleGuard<T>, log_faults: bool) {
    let outcome = AssertUnwindSafe(async {
        handler.handler().handle(guard.message()).await;
    })
    .catch_unwind()
    .await;

    if let Err(panic) = outcome {
        if log_faults {
            error!(
                handler = handler.name(),
                message_type = guard.message().type_name(),
                message_id = guard.message().id(),
                panic = %panic_message(panic.as_ref()),
                "Message handler panicked"
            );
        }
    }
    drop(guard);
}

async fn complete<T: Payload>(
    units: Vec<JoinHandle<()>>,
    callback: CompletionCallback<T>,
    message: Message<T>,
    log_faults: bool,
) {
    for result in join_all(units).await {
        if let Err(join_error) = result {
            warn!(
                message_type = message.type_name(),
                message_id = message.id(),
                error = %join_error,
                "Handler task did not run to completion"
            );
        }
    }

    trace!(
        message_type = message.type_name(),
        message_id = message.id(),
        "All handlers finished, running completion callback"
    );
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| callback(&message)));
    if let Err(panic) = outcome {
        if log_faults {
            error!(
                message_type = message.type_name(),
                message_id = message.id(),
                panic = %panic_message(panic.as_ref()),
                "Completion callback panicked"
            );
        }
    }
}
