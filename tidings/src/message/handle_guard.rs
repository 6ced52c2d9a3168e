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
use crate::message::Message;
use crate::traits::Payload;

/// One outstanding handle on a [`Message`].
///
/// Creating the guard raises the message's handle count; dropping it lowers the
/// count again. A handler task owns its guard for its whole life, so the count is
/// released whether the handler returns, panics, or is dropped by a runtime that
/// is shutting down.
pub(crate) struct HandleGuard<T: Payload> {
    message: Message<T>,
}

impl<T: Payload> HandleGuard<T> {
    pub(crate) fn new(message: &Message<T>) -> Self {
        message.increment_handles();
        Self {
            message: message.clone(),
        }
    }

    #[inline]
    pub(crate) fn message(&self) -> &Message<T> {
        &self.message
    }
}

impl<T: Payload> Drop for HandleGuard<T> {
    fn drop(&mut self) {
        self.message.decrement_handles();
    }
}
