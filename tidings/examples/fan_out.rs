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

//! Fans order events out to several handlers and recycles each envelope once
//! every handler is done with it.
//!
//! Run with `cargo run --example fan_out`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tidings::prelude::*;
use tokio::sync::mpsc;

#[tidings_payload]
struct OrderPlaced {
    id: u64,
    total_cents: u64,
}

struct Revenue {
    cents: Arc<AtomicU64>,
}

#[async_trait]
impl Handler<OrderPlaced> for Revenue {
    async fn handle(&self, message: &Message<OrderPlaced>) {
        let total = message.payload().total_cents;
        self.cents.fetch_add(total, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "revenue"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let bus = Bus::new();
    let cents = Arc::new(AtomicU64::new(0));
    bus.subscribe(HandlerRef::new(Revenue {
        cents: Arc::clone(&cents),
    }));
    bus.subscribe_fn(|msg: &Message<OrderPlaced>| {
        let msg = msg.clone();
        Reply::pending(async move {
            // Pretend to send a confirmation email.
            tokio::time::sleep(Duration::from_millis(10)).await;
            let id = msg.payload().id;
            tracing::info!(order = id, "confirmation sent");
        })
    });

    let (drained, mut done) = mpsc::unbounded_channel();
    for id in 1..=5 {
        let msg = bus.message_with(OrderPlaced {
            id,
            total_cents: id * 1_000,
        });
        let drained = drained.clone();
        msg.set_callback(move |m| {
            if let Err(err) = m.recycle() {
                tracing::error!(%err, "could not recycle");
            }
            let _ = drained.send(m.id());
        })?;
        msg.publish();
    }

    for _ in 1..=5 {
        done.recv().await;
    }

    let stats = bus.pool_stats::<OrderPlaced>();
    tracing::info!(
        revenue_cents = cents.load(Ordering::SeqCst),
        pooled = stats.total,
        idle = stats.idle,
        "all orders handled"
    );
    Ok(())
}
