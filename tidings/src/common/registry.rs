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

use std::any::TypeId;

use tracing::{error, trace};

use crate::common::TypeMap;
use crate::traits::{HandlerRef, Payload};

/// Per-payload-type, ordered lists of subscribed handlers.
///
/// Lists are keyed by the payload's `TypeId` inside a `DashMap`, so subscribe,
/// unsubscribe and snapshot on the same type serialize on that entry's shard lock
/// while different types proceed independently. A list is created on the first
/// subscribe for its type and is never removed, even when it becomes empty.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    subscribers: TypeMap,
    capacity: usize,
}

type HandlerList<T> = Vec<HandlerRef<T>>;

impl SubscriptionRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            subscribers: TypeMap::default(),
            capacity,
        }
    }

    /// Appends `handler` to the list for `T`. Duplicates are kept.
    pub(crate) fn subscribe<T: Payload>(&self, handler: HandlerRef<T>) {
        let mut entry = self
            .subscribers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(HandlerList::<T>::with_capacity(self.capacity)));

        match entry.downcast_mut::<HandlerList<T>>() {
            Some(handlers) => {
                handlers.push(handler);
                trace!(
                    message_type = std::any::type_name::<T>(),
                    count = handlers.len(),
                    "Subscription added"
                );
            }
            None => error!(
                message_type = std::any::type_name::<T>(),
                "Subscriber list has an unexpected type"
            ),
        }
    }

    /// Removes the first registration identical to `handler`.
    ///
    /// Returns `false` (and changes nothing) if the type has never been subscribed
    /// to or the handler is not registered.
    pub(crate) fn unsubscribe<T: Payload>(&self, handler: &HandlerRef<T>) -> bool {
        let Some(mut entry) = self.subscribers.get_mut(&TypeId::of::<T>()) else {
            trace!(
                message_type = std::any::type_name::<T>(),
                "Unsubscribe for a type with no subscribers"
            );
            return false;
        };
        let Some(handlers) = entry.downcast_mut::<HandlerList<T>>() else {
            error!(
                message_type = std::any::type_name::<T>(),
                "Subscriber list has an unexpected type"
            );
            return false;
        };

        match handlers.iter().position(|registered| registered.ptr_eq(handler)) {
            Some(index) => {
                handlers.remove(index);
                trace!(
                    message_type = std::any::type_name::<T>(),
                    count = handlers.len(),
                    "Subscription removed"
                );
                true
            }
            None => false,
        }
    }

    /// A copy of the current handler list for `T`, possibly empty.
    ///
    /// The copy is what a publish dispatches to, so later subscribe and unsubscribe
    /// calls never change an in-flight publish.
    pub(crate) fn snapshot<T: Payload>(&self) -> HandlerList<T> {
        self.subscribers
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<HandlerList<T>>().cloned())
            .unwrap_or_default()
    }

    pub(crate) fn count<T: Payload>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<HandlerList<T>>().map(Vec::len))
            .unwrap_or(0)
    }
}
