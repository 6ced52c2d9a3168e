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
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::HandlerFuture;
use crate::message::Message;
use crate::traits::Payload;

/// A subscriber for messages carrying a payload of type `T`.
///
/// The bus invokes [`handle`](Handler::handle) once per published message, on its own
/// Tokio task, concurrently with every other handler registered for `T`. The
/// message's handle count stays raised until the returned future completes (or
/// panics), which is what keeps [`Message::recycle`] from reclaiming an envelope
/// a handler is still reading.
///
/// Types can implement `Handler` directly:
///
/// ```ignore
/// struct AuditTrail;
///
/// #[async_trait]
/// impl Handler<OrderPlaced> for AuditTrail {
///     async fn handle(&self, message: &Message<OrderPlaced>) {
///         tracing::info!(order = message.payload().id, "order placed");
///     }
/// }
/// ```
///
/// Closures of the shape `Fn(&Message<T>) -> HandlerFuture` implement it through a
/// blanket impl; build their return value with [`Reply`](crate::common::Reply).
#[async_trait]
pub trait Handler<T: Payload>: Send + Sync + 'static {
    /// Processes one published message.
    async fn handle(&self, message: &Message<T>);

    /// A human-readable name used in log records. Defaults to the Rust type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<T, F> Handler<T> for F
where
    T: Payload,
    F: Fn(&Message<T>) -> HandlerFuture + Send + Sync + 'static,
{
    async fn handle(&self, message: &Message<T>) {
        (self)(message).await;
    }
}

/// A shared, identity-bearing reference to a registered [`Handler`].
///
/// Rust closures cannot be compared, so registration goes through a `HandlerRef`:
/// two `HandlerRef`s are the same handler exactly when they were cloned from one
/// another. Subscribing the same reference twice registers it twice (it will be
/// invoked twice per publish); [`Bus::unsubscribe`](crate::common::Bus::unsubscribe)
/// removes the first registration that is identical to the given reference.
pub struct HandlerRef<T: Payload> {
    handler: Arc<dyn Handler<T>>,
}

impl<T: Payload> HandlerRef<T> {
    /// Wraps a handler in a new reference with its own identity.
    pub fn new<H: Handler<T>>(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Wraps a closure in a new reference.
    ///
    /// Equivalent to [`HandlerRef::new`], but the explicit `Fn` bound lets the
    /// compiler infer the closure's argument type.
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(&Message<T>) -> HandlerFuture + Send + Sync + 'static,
    {
        Self::new(handler)
    }

    /// Returns `true` if both references point at the same registered handler.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), Arc::as_ptr(&other.handler))
    }

    /// The name reported by the wrapped handler.
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub(crate) fn handler(&self) -> Arc<dyn Handler<T>> {
        Arc::clone(&self.handler)
    }
}

impl<T: Payload> Clone for HandlerRef<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T: Payload> fmt::Debug for HandlerRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("name", &self.name())
            .finish()
    }
}
