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

use parking_lot::RwLock;
use tracing::{error, trace, warn};

use crate::common::TypeMap;
use crate::message::Message;
use crate::traits::Payload;

/// A snapshot of one payload type's envelope pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Envelopes ever created for the type. Pools never shrink.
    pub total: usize,
    /// Envelopes currently recycled and available for reuse.
    pub idle: usize,
}

struct Arena<T: Payload> {
    messages: RwLock<Vec<Message<T>>>,
}

impl<T: Payload> Default for Arena<T> {
    fn default() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }
}

/// Per-payload-type arenas of envelopes.
///
/// Acquisition scans for an idle envelope and leases it with a compare-and-swap on
/// its in-use flag, so two concurrent acquirers can never win the same envelope.
pub(crate) struct MessagePool {
    arenas: TypeMap,
    growth_warning: usize,
}

impl MessagePool {
    pub(crate) fn new(growth_warning: usize) -> Self {
        Self {
            arenas: TypeMap::default(),
            growth_warning,
        }
    }

    /// Leases an idle envelope for `T`, or returns `None` if every envelope is in use.
    pub(crate) fn acquire<T: Payload>(&self) -> Option<Message<T>> {
        let entry = self.arenas.get(&TypeId::of::<T>())?;
        let Some(arena) = entry.downcast_ref::<Arena<T>>() else {
            error!(
                message_type = std::any::type_name::<T>(),
                "Message pool has an unexpected type"
            );
            return None;
        };
        let found = arena.messages.read().iter().find(|m| m.try_claim()).cloned();
        if let Some(message) = &found {
            trace!(
                message_type = std::any::type_name::<T>(),
                message_id = message.id(),
                "Reusing pooled message"
            );
        }
        found
    }

    /// Adds a freshly created (already leased) envelope to the arena for `T`.
    pub(crate) fn register<T: Payload>(&self, message: &Message<T>) {
        let entry = self
            .arenas
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Arena::<T>::default()));
        let Some(arena) = entry.downcast_ref::<Arena<T>>() else {
            error!(
                message_type = std::any::type_name::<T>(),
                "Message pool has an unexpected type"
            );
            return;
        };

        let mut messages = arena.messages.write();
        messages.push(message.clone());
        let total = messages.len();
        trace!(
            message_type = std::any::type_name::<T>(),
            message_id = message.id(),
            total,
            "Pooled new message"
        );
        if self.growth_warning > 0 && total % self.growth_warning == 0 {
            warn!(
                message_type = std::any::type_name::<T>(),
                total, "Message pool keeps growing; are messages being recycled?"
            );
        }
    }

    pub(crate) fn stats<T: Payload>(&self) -> PoolStats {
        self.arenas
            .get(&TypeId::of::<T>())
            .and_then(|entry| {
                entry.downcast_ref::<Arena<T>>().map(|arena| {
                    let messages = arena.messages.read();
                    PoolStats {
                        total: messages.len(),
                        idle: messages.iter().filter(|m| !m.is_in_use()).count(),
                    }
                })
            })
            .unwrap_or_default()
    }
}
