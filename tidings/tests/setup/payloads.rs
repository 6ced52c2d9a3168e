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

#![allow(unused)]

use tidings::prelude::*;

#[tidings_payload]
pub struct Ping {
    pub seq: u64,
}

#[tidings_payload]
pub struct OrderPlaced {
    pub order_id: u64,
    pub customer: String,
}

#[tidings_payload]
pub enum Tally {
    #[default]
    Reset,
    Add(u32),
}

// Not Default: only sent with `message_with`.
#[tidings_payload(no_default)]
pub struct Temperature {
    pub celsius: f32,
}
