//! # Example: background_cap
//!
//! Floods a single background subscriber and compares the two overflow
//! policies under a cap of 3 concurrent executions.
//!
//! - [`OverflowPolicy::Reject`]: excess admissions are refused and reported.
//! - [`OverflowPolicy::Wait`]: the dispatcher waits for a free slot; nothing is dropped.
//!
//! ## Run
//! ```bash
//! cargo run --example background_cap
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use prioritybus::{
    BusConfig, Event, EventBus, ExecuteError, Mode, NoticeKind, OverflowPolicy, SubscriberFn,
};
use tokio_util::sync::CancellationToken;

const EVENTS: usize = 8;

struct Report {
    executed: usize,
    rejected: usize,
    peak: usize,
}

async fn flood(policy: OverflowPolicy) -> Result<Report, Box<dyn std::error::Error>> {
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let executed = Arc::new(AtomicUsize::new(0));

    let worker = {
        let (current, peak, executed) = (current.clone(), peak.clone(), executed.clone());
        SubscriberFn::arc("worker", Mode::Background, move |_ev: Event| {
            let (current, peak, executed) = (current.clone(), peak.clone(), executed.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                executed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ExecuteError>(())
            }
        })
    };

    let cfg = BusConfig {
        max_background: 3,
        tick: Duration::from_millis(20),
        overflow: policy,
        ..BusConfig::default()
    };
    let bus = EventBus::builder(cfg).with_subscriber("jobs", worker).build()?;

    let mut notices = bus.notices();
    let token = CancellationToken::new();
    let driver = bus.spawn(token.clone());

    for i in 0..EVENTS {
        bus.post(Event::new(format!("job-{i}"), "jobs"));
    }

    // Every event ends up either reaped or rejected.
    let mut rejected = 0;
    let mut reaped = 0;
    while reaped + rejected < EVENTS {
        match notices.recv().await {
            Ok(n) if n.kind == NoticeKind::Reaped => reaped += 1,
            Ok(n) if n.kind == NoticeKind::CapacityExceeded => rejected += 1,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    token.cancel();
    driver.await??;

    Ok(Report {
        executed: executed.load(Ordering::SeqCst),
        rejected,
        peak: peak.load(Ordering::SeqCst),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    for policy in [OverflowPolicy::Reject, OverflowPolicy::Wait] {
        let r = flood(policy).await?;
        println!(
            "{policy:?}: executed={} rejected={} peak_concurrency={}",
            r.executed, r.rejected, r.peak
        );
    }
    Ok(())
}
