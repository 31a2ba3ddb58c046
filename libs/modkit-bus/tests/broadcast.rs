//! Broadcast protocol: ordering, fail-fast, all-complete barrier, aggregation.

mod common;

use std::time::Duration;

use common::*;
use modkit_bus::{
    BroadcastMode, BusConfig, BusError, CancellationToken, EventHandler, FailureKind,
    HandlerResult, Outcome, StatusKind, async_trait,
};

fn sequential() -> BusConfig {
    BusConfig::default()
}

fn parallel() -> BusConfig {
    BusConfig {
        broadcast_mode: BroadcastMode::Parallel,
        ..BusConfig::default()
    }
}

#[tokio::test]
async fn zero_handlers_is_success() {
    let bus = bus_with(sequential(), |_| {});
    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap();
    assert!(out.is_success());
    assert_eq!(out.status_kind(), StatusKind::Ok);
}

#[tokio::test]
async fn sequential_runs_in_registration_order() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        for name in ["first", "second", "third"] {
            let log = log.clone();
            b.registrar("test")
                .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok(name, &log)));
        }
    });

    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap();

    assert!(out.is_success());
    assert_eq!(
        entries(&log),
        vec![
            "first:start",
            "first:end",
            "second:start",
            "second:end",
            "third:start",
            "third:end"
        ]
    );
}

#[tokio::test]
async fn sequential_stops_at_first_failure_and_returns_it() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("first", &l)));
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing("second", &l, Outcome::bad_request("no such sku")))
        });
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("third", &l)));
    });

    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out, Outcome::bad_request("no such sku"));
    assert!(!entries(&log).iter().any(|e| e.starts_with("third")));
}

#[tokio::test(start_paused = true)]
async fn parallel_starts_all_and_waits_for_all() {
    let log = call_log();
    let bus = bus_with(parallel(), |b| {
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::ok("slow", &l).after(Duration::from_millis(50)))
        });
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::ok("fast", &l).after(Duration::from_millis(5)))
        });
    });

    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap();

    assert!(out.is_success());
    assert_eq!(
        entries(&log),
        vec!["slow:start", "fast:start", "fast:end", "slow:end"]
    );
}

#[tokio::test(start_paused = true)]
async fn parallel_aggregate_is_earliest_registered_failure() {
    let log = call_log();
    let bus = bus_with(parallel(), |b| {
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("ok", &l)));
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing("late", &l, Outcome::conflict("still referenced"))
                .after(Duration::from_millis(30)))
        });
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing("early", &l, Outcome::bad_request("bad id")))
        });
    });

    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap();

    // "early" finished first in time, but "late" was registered first.
    assert_eq!(out.status_kind(), StatusKind::Conflict);
    assert_eq!(out.error_message(), Some("still referenced"));
    let log = entries(&log);
    for name in ["ok", "late", "early"] {
        assert!(log.contains(&format!("{name}:end")), "{name} must finish");
    }
}

#[tokio::test]
async fn per_call_mode_overrides_configured_default() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing("a", &l, Outcome::not_found("gone")))
        });
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("b", &l)));
    });

    let out = bus
        .publish_broadcast_with(
            ProductDeleted { product_id: 1 },
            BroadcastMode::Parallel,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(out.status_kind(), StatusKind::NotFound);
    assert!(entries(&log).contains(&"b:end".to_string()));
}

#[tokio::test]
async fn sequential_fault_propagates_and_stops() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Faulty {
                name: "faulty",
                log: l.clone(),
            })
        });
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("after", &l)));
    });

    let err = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        BusError::Handler { event, source, .. } => {
            assert_eq!(event, "catalog.product_deleted");
            assert_eq!(source.to_string(), "search index unreachable");
        }
        other => panic!("expected handler fault, got {other:?}"),
    }
    assert_eq!(entries(&log), vec!["faulty:start"]);
}

#[tokio::test]
async fn parallel_fault_wins_over_business_failure_after_all_complete() {
    let log = call_log();
    let bus = bus_with(parallel(), |b| {
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing("failing", &l, Outcome::not_found("gone")))
        });
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Faulty {
                name: "faulty",
                log: l.clone(),
            })
        });
    });

    let err = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, BusError::Handler { .. }));
    assert!(!err.is_configuration_fault());
    assert!(entries(&log).contains(&"failing:end".to_string()));
}

/// Cancels the publish call's token from inside the handler.
struct CancelsCall;

#[async_trait]
impl EventHandler<ProductDeleted> for CancelsCall {
    async fn handle(&self, _e: &ProductDeleted, cancel: &CancellationToken) -> HandlerResult<()> {
        cancel.cancel();
        Ok(Outcome::ok())
    }
}

#[tokio::test]
async fn sequential_cancellation_prevents_new_handlers() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(|_| Ok(CancelsCall));
        let l = log.clone();
        b.registrar("test")
            .on_event::<ProductDeleted, _, _>(move |_| Ok(Scripted::ok("never", &l)));
    });

    let cancel = CancellationToken::new();
    let err = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BusError::Cancelled {
            completed: 1,
            total: 2,
            ..
        }
    ));
    assert!(entries(&log).is_empty());
}

/// Records whether it saw the cancellation signal.
struct ObservesCancel {
    log: CallLog,
}

#[async_trait]
impl EventHandler<ProductDeleted> for ObservesCancel {
    async fn handle(&self, _e: &ProductDeleted, cancel: &CancellationToken) -> HandlerResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("cancelled={}", cancel.is_cancelled()));
        Ok(Outcome::ok())
    }
}

#[tokio::test]
async fn parallel_passes_cancellation_as_a_signal_only() {
    let log = call_log();
    let bus = bus_with(parallel(), |b| {
        for _ in 0..2 {
            let l = log.clone();
            b.registrar("test")
                .on_event::<ProductDeleted, _, _>(move |_| Ok(ObservesCancel { log: l.clone() }));
        }
    });

    let cancel = CancellationToken::new();
    cancel.cancel();
    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &cancel)
        .await
        .unwrap();

    assert!(out.is_success());
    assert_eq!(entries(&log), vec!["cancelled=true", "cancelled=true"]);
}

struct Panics;

#[async_trait]
impl EventHandler<ProductDeleted> for Panics {
    async fn handle(&self, _e: &ProductDeleted, _c: &CancellationToken) -> HandlerResult<()> {
        panic!("handler exploded");
    }
}

#[tokio::test]
#[should_panic(expected = "handler exploded")]
async fn panics_are_not_converted_into_outcomes() {
    let bus = bus_with(sequential(), |b| {
        b.registrar("test").on_event::<ProductDeleted, _, _>(|_| Ok(Panics));
    });
    let _ = bus
        .publish_broadcast(ProductDeleted { product_id: 1 }, &CancellationToken::new())
        .await;
}

#[tokio::test]
async fn failure_kind_survives_broadcast_unchanged() {
    let log = call_log();
    let bus = bus_with(sequential(), |b| {
        let l = log.clone();
        b.registrar("test").on_event::<ProductDeleted, _, _>(move |_| {
            Ok(Scripted::failing(
                "a",
                &l,
                Outcome::failure(FailureKind::Unexpected, "disk full"),
            ))
        });
    });

    let out = bus
        .publish_broadcast(ProductDeleted { product_id: 9 }, &CancellationToken::new())
        .await
        .unwrap();
    let failure = out.as_failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::Unexpected);
    assert_eq!(failure.message(), "disk full");
}
