//! # Example: basic_bus
//!
//! Wires one inline and one background subscriber on the same topic, posts a
//! few events with different priorities and prints the lifecycle notices.
//!
//! Shows how to:
//! - Build subscribers from closures with [`SubscriberFn`].
//! - Register them through [`EventBus::builder`].
//! - Re-prioritize a pending event by posting its id again.
//! - Follow delivery through [`EventBus::notices`].
//!
//! ## Flow
//! ```text
//! post(id, priority) ──► PriorityStore ──► dispatch pass (highest first)
//!     ├─► audit  (JustDoIt)   runs inline  ──► Executed
//!     └─► mailer (Background) admitted     ──► Admitted ... Reaped (on tick)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_bus
//! ```

use std::time::Duration;

use prioritybus::{BusConfig, Event, EventBus, ExecuteError, Mode, NoticeKind, SubscriberFn};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = BusConfig {
        tick: Duration::from_millis(100),
        ..BusConfig::default()
    };

    let audit = SubscriberFn::arc("audit", Mode::JustDoIt, |ev: Event| async move {
        println!("[audit]  event={} priority={}", ev.id, ev.priority);
        Ok::<_, ExecuteError>(())
    });
    let mailer = SubscriberFn::arc("mailer", Mode::Background, |ev: Event| async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        if ev.id.ends_with('3') {
            return Err(ExecuteError::fail("smtp unavailable"));
        }
        println!("[mailer] sent confirmation for {}", ev.id);
        Ok(())
    });

    let bus = EventBus::builder(cfg)
        .with_subscriber("orders", audit)
        .with_subscriber("orders", mailer)
        .build()?;

    let mut notices = bus.notices();
    let printer = tokio::spawn(async move {
        let mut reaped = 0;
        while let Ok(n) = notices.recv().await {
            match n.kind {
                NoticeKind::Dispatched => println!(
                    "[notice] dispatched {} (priority {})",
                    n.event_id.as_deref().unwrap_or("?"),
                    n.priority.unwrap_or_default()
                ),
                NoticeKind::Reaped => {
                    reaped += 1;
                    println!(
                        "[notice] reaped {}@{} outcome={} result={:?}",
                        n.subscriber.as_deref().unwrap_or("?"),
                        n.event_id.as_deref().unwrap_or("?"),
                        n.outcome.unwrap_or("?"),
                        n.result.as_deref().unwrap_or("")
                    );
                }
                NoticeKind::AllReaped | NoticeKind::GraceExceeded => break,
                _ => {}
            }
        }
        reaped
    });

    // Queue everything before the loop starts so one pass sees all of it.
    bus.post(Event::new("order-1", "orders").with_priority(1));
    bus.post(Event::new("order-2", "orders").with_priority(5));
    bus.post(Event::new("order-3", "orders").with_priority(3));
    // Same id again: moves order-1 to the front instead of queueing a duplicate.
    bus.post(Event::new("order-1", "orders").with_priority(10));
    println!("pending before start: {}", bus.pending());

    let token = CancellationToken::new();
    let driver = bus.spawn(token.clone());

    tokio::time::sleep(Duration::from_millis(600)).await;
    token.cancel();
    driver.await??;

    let reaped = printer.await?;
    println!("done: {reaped} background executions reaped");
    Ok(())
}
