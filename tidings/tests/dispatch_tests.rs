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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::*;

use tidings::prelude::*;
use tidings_test::prelude::*;

use crate::setup::*;

mod setup;

/// Counts the orders it sees.
struct OrderLedger {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler<OrderPlaced> for OrderLedger {
    async fn handle(&self, message: &Message<OrderPlaced>) {
        let order_id = message.payload().order_id;
        trace!(order_id, "ledger entry");
        self.seen.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "order_ledger"
    }
}

#[tidings_test]
async fn test_publish_without_subscribers_takes_no_handles() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();

    let msg = bus.message::<Ping>();
    msg.publish();

    assert_eq!(msg.handle_count(), 0);
    msg.recycle()?;
    assert_eq!(bus.pool_stats::<Ping>(), PoolStats { total: 1, idle: 1 });
    Ok(())
}

#[tidings_test]
async fn test_every_handler_holds_a_handle_while_running() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();
    let gate = Arc::new(Semaphore::new(0));
    let entered = Arc::new(AtomicUsize::new(0));
    const HANDLERS: usize = 3;

    for _ in 0..HANDLERS {
        let gate = Arc::clone(&gate);
        let entered = Arc::clone(&entered);
        bus.subscribe_fn(move |_: &Message<Ping>| {
            let gate = Arc::clone(&gate);
            let entered = Arc::clone(&entered);
            Reply::pending(async move {
                entered.fetch_add(1, Ordering::SeqCst);
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            })
        });
    }

    let msg = bus.message_with(Ping { seq: 1 });
    msg.publish();
    assert_eq!(msg.handle_count(), HANDLERS);

    assert!(wait_until(|| entered.load(Ordering::SeqCst) == HANDLERS).await);
    assert_eq!(msg.handle_count(), HANDLERS);
    assert!(matches!(msg.recycle(), Err(MessageError::InUse { handles: HANDLERS })));

    gate.add_permits(HANDLERS);
    assert!(wait_until(|| msg.handle_count() == 0).await);
    msg.recycle()?;
    Ok(())
}

#[tidings_test]
async fn test_duplicate_subscriptions_run_twice() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let handler = HandlerRef::from_fn(move |_: &Message<Tally>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Reply::ready()
    });
    bus.subscribe(handler.clone());
    bus.subscribe(handler.clone());
    assert_eq!(bus.subscriber_count::<Tally>(), 2);

    let msg = bus.message_with(Tally::Add(1));
    msg.publish();
    assert!(wait_until(|| calls.load(Ordering::SeqCst) == 2).await);

    // Unsubscribing removes one registration at a time.
    bus.unsubscribe(&handler);
    assert_eq!(bus.subscriber_count::<Tally>(), 1);
    assert!(wait_until(|| msg.handle_count() == 0).await);
    msg.publish();
    assert!(wait_until(|| calls.load(Ordering::SeqCst) == 3).await);
    Ok(())
}

#[tidings_test]
async fn test_in_flight_publish_keeps_its_handler_snapshot() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();
    let gate = Arc::new(Semaphore::new(0));
    let late_calls = Arc::new(AtomicUsize::new(0));

    let held = Arc::clone(&gate);
    let early = bus.subscribe_fn(move |_: &Message<Ping>| {
        let held = Arc::clone(&held);
        Reply::pending(async move {
            if let Ok(permit) = held.acquire().await {
                permit.forget();
            }
        })
    });

    let msg = bus.message_with(Ping { seq: 7 });
    msg.publish();

    // Changes after the publish do not affect it.
    let counter = Arc::clone(&late_calls);
    bus.subscribe_fn(move |_: &Message<Ping>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Reply::ready()
    });
    bus.unsubscribe(&early);
    assert_eq!(msg.handle_count(), 1);

    gate.add_permits(1);
    assert!(wait_until(|| msg.handle_count() == 0).await);
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tidings_test]
async fn test_handler_types_and_closures_share_a_publish() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();
    let ledger_seen = Arc::new(AtomicUsize::new(0));
    let closure_seen = Arc::new(AtomicUsize::new(0));

    let ledger = HandlerRef::new(OrderLedger {
        seen: Arc::clone(&ledger_seen),
    });
    assert_eq!(ledger.name(), "order_ledger");
    bus.subscribe(ledger);

    let counter = Arc::clone(&closure_seen);
    bus.subscribe_fn(move |msg: &Message<OrderPlaced>| {
        let msg = msg.clone();
        let counter = Arc::clone(&counter);
        Reply::pending(async move {
            assert_eq!(msg.payload().customer, "ada");
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let msg = bus.message_with(OrderPlaced {
        order_id: 42,
        customer: String::from("ada"),
    });
    msg.publish();

    assert!(
        wait_until(|| ledger_seen.load(Ordering::SeqCst) == 1
            && closure_seen.load(Ordering::SeqCst) == 1)
        .await
    );
    Ok(())
}

#[tidings_test]
async fn test_payload_types_are_dispatched_separately() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Bus::new();
    let pings = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&pings);
    bus.subscribe_fn(move |_: &Message<Ping>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Reply::ready()
    });

    let tally = bus.message_with(Tally::Add(3));
    tally.publish();
    assert_eq!(tally.handle_count(), 0);

    bus.publish(&bus.message_with(Ping { seq: 2 }));
    assert!(wait_until(|| pings.load(Ordering::SeqCst) == 1).await);
    Ok(())
}

#[tidings_test]
async fn test_publish_after_bus_is_dropped_dispatches_nothing() -> anyhow::Result<()> {
    initialize_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let msg = {
        let bus = Bus::new();
        let counter = Arc::clone(&calls);
        bus.subscribe_fn(move |_: &Message<Ping>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Reply::ready()
        });
        bus.message_with(Ping { seq: 9 })
    };

    msg.publish();
    assert_eq!(msg.handle_count(), 0);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}
