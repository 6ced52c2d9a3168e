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
/// Represents the contract violations a [`Message`](super::Message) reports synchronously.
///
/// Neither variant is transient: both mean the caller used the envelope out of
/// order and must change what it does, not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// A completion callback is already attached. Call
    /// [`reset_callback`](super::Message::reset_callback) before attaching another.
    CallbackAlreadySet,
    /// The message is still being processed by `handles` handlers and cannot be
    /// recycled. Wait for the completion callback before recycling.
    InUse {
        /// The number of handlers still running when recycle was attempted.
        handles: usize,
    },
}

impl std::fmt::Display for MessageError {
    /// Formats the `MessageError` for display.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageError::CallbackAlreadySet => {
                write!(f, "Completion callback has already been set")
            }
            MessageError::InUse { handles } => write!(
                f,
                "Tried to recycle a message that is in use by {handles} handler(s)"
            ),
        }
    }
}

impl std::error::Error for MessageError {}
