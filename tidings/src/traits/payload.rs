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
use std::any::Any;

/// A marker trait for types that can travel inside a [`Message`](crate::message::Message).
///
/// The bus keys both its subscription registry and its envelope pool by the
/// payload's [`TypeId`](std::any::TypeId), and hands envelopes to handlers
/// running on other threads, so a payload must be `Any + Send + Sync + 'static`.
///
/// A blanket implementation is provided: any type meeting those bounds is a
/// `Payload`. Nothing else is required, although types used with
/// [`Bus::message`](crate::common::Bus::message) must also be `Default`
/// (see [`tidings_payload`](tidings_macro::tidings_payload)).
pub trait Payload: Any + Send + Sync + 'static {}

impl<T> Payload for T where T: Any + Send + Sync + 'static {}
