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
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use tracing::{error, trace, warn};

use crate::common::{BusInner, CompletionCallback};
use crate::message::MessageError;
use crate::traits::Payload;

/// Source of process-unique message ids, used only for log correlation.
static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A reusable envelope carrying a payload of type `T` through the bus.
///
/// A `Message` is a cheap, cloneable handle: every clone refers to the same
/// envelope, and the envelope (not its payload) is what the bus pools and reuses.
/// An envelope moves through a simple cycle:
///
/// 1. **Leased**: handed out by [`Bus::message`](crate::common::Bus::message) or
///    [`Bus::message_with`](crate::common::Bus::message_with), marked in use.
/// 2. **Published**: [`publish`](Self::publish) raises the handle count once per
///    subscribed handler; each handler lowers it when it finishes.
/// 3. **Recycled**: [`recycle`](Self::recycle) marks it idle again, which is only
///    allowed once the handle count is back to zero.
///
/// The optional completion callback runs once per publish, after the last handler
/// of that publish has finished, and is the natural place to recycle.
pub struct Message<T: Payload> {
    inner: Arc<MessageInner<T>>,
}

struct MessageInner<T: Payload> {
    id: u64,
    payload: RwLock<T>,
    in_use: AtomicBool,
    handles: AtomicUsize,
    on_complete: Mutex<Option<CompletionCallback<T>>>,
    bus: Weak<BusInner>,
}

impl<T: Payload> Message<T> {
    /// Creates a leased (in use) envelope bound to `bus`.
    pub(crate) fn new(payload: T, bus: Weak<BusInner>) -> Self {
        Self {
            inner: Arc::new(MessageInner {
                id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
                payload: RwLock::new(payload),
                in_use: AtomicBool::new(true),
                handles: AtomicUsize::new(0),
                on_complete: Mutex::new(None),
                bus,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(payload: T) -> Self {
        Self::new(payload, Weak::new())
    }

    /// A process-unique identifier for this envelope.
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The Rust type name of the payload, as used in log records.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Replaces the payload.
    ///
    /// Blocks only while a handler is holding a read guard from [`payload`](Self::payload).
    pub fn set_payload(&self, payload: T) -> &Self {
        *self.inner.payload.write() = payload;
        self
    }

    /// Borrows the payload for reading.
    ///
    /// Handlers of one publish may hold read guards concurrently. Do not hold the
    /// guard across an `.await` for long: a producer calling
    /// [`set_payload`](Self::set_payload) waits for it.
    pub fn payload(&self) -> RwLockReadGuard<'_, T> {
        self.inner.payload.read()
    }

    /// Runs `f` with a shared borrow of the payload and returns its result.
    pub fn with_payload<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.payload.read())
    }

    /// Returns a clone of the payload.
    pub fn payload_cloned(&self) -> T
    where
        T: Clone,
    {
        self.inner.payload.read().clone()
    }

    /// Attaches the completion callback for subsequent publishes.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::CallbackAlreadySet`] if a callback is already attached;
    /// the existing callback is left in place.
    pub fn set_callback<F>(&self, callback: F) -> Result<&Self, MessageError>
    where
        F: Fn(&Message<T>) + Send + Sync + 'static,
    {
        let mut slot = self.inner.on_complete.lock();
        if slot.is_some() {
            return Err(MessageError::CallbackAlreadySet);
        }
        let callback: CompletionCallback<T> = Arc::new(callback);
        *slot = Some(callback);
        Ok(self)
    }

    /// Detaches the completion callback, if any.
    ///
    /// A publish already in flight keeps the callback it started with.
    pub fn reset_callback(&self) -> &Self {
        self.inner.on_complete.lock().take();
        self
    }

    /// Returns `true` if a completion callback is attached.
    pub fn has_callback(&self) -> bool {
        self.inner.on_complete.lock().is_some()
    }

    pub(crate) fn completion_callback(&self) -> Option<CompletionCallback<T>> {
        self.inner.on_complete.lock().clone()
    }

    /// Publishes this message to every handler currently subscribed to `T`.
    ///
    /// Returns immediately; handlers run on the bus's runtime. If the bus that
    /// created this envelope has been dropped, nothing is dispatched.
    pub fn publish(&self) -> &Self {
        match self.inner.bus.upgrade() {
            Some(bus) => bus.dispatch(self),
            None => warn!(
                message_type = self.type_name(),
                message_id = self.id(),
                "Bus has been dropped, message not published"
            ),
        }
        self
    }

    /// Returns the envelope to its pool so a later `Bus::message` call can reuse it.
    ///
    /// Recycling also detaches the completion callback, so the next lessee starts
    /// clean. Recycling an idle envelope again is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InUse`] if any handler is still running against this
    /// envelope. The envelope stays leased; recycle it from the completion callback
    /// (or once [`handle_count`](Self::handle_count) is zero) instead.
    pub fn recycle(&self) -> Result<(), MessageError> {
        let handles = self.inner.handles.load(Ordering::Acquire);
        if handles > 0 {
            trace!(
                message_type = self.type_name(),
                message_id = self.id(),
                handles,
                "Refusing to recycle a message with outstanding handles"
            );
            return Err(MessageError::InUse { handles });
        }
        self.inner.on_complete.lock().take();
        self.inner.in_use.store(false, Ordering::Release);
        trace!(message_type = self.type_name(), message_id = self.id(), "Message recycled");
        Ok(())
    }

    /// The number of handlers currently running against this envelope.
    #[inline]
    pub fn handle_count(&self) -> usize {
        self.inner.handles.load(Ordering::Acquire)
    }

    /// Returns `true` while the envelope is leased (between acquisition and recycle).
    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.inner.in_use.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles refer to the same envelope.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Atomically leases an idle envelope. Returns `false` if it was already in use.
    pub(crate) fn try_claim(&self) -> bool {
        self.inner
            .in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn increment_handles(&self) -> usize {
        self.inner.handles.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn decrement_handles(&self) -> usize {
        match self
            .inner
            .handles
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => {
                error!(
                    message_type = self.type_name(),
                    message_id = self.id(),
                    "Handle count underflow"
                );
                0
            }
        }
    }
}

impl<T: Payload> Clone for Message<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Payload> fmt::Debug for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id())
            .field("type", &self.type_name())
            .field("in_use", &self.is_in_use())
            .field("handles", &self.handle_count())
            .finish_non_exhaustive()
    }
}
