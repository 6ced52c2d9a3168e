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

pub(crate) use handle_guard::HandleGuard;
pub use message::Message;
pub use message_error::MessageError;

/// Crate-internal drop guard tying one handler run to one handle.
mod handle_guard;
/// Defines the pooled `Message<T>` envelope.
#[allow(clippy::module_inception)]
mod message;
/// Defines the errors reported by envelope operations.
mod message_error;
