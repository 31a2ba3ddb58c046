//! Scoped services: one instance per publish call, released when it returns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use modkit_bus::{
    async_trait, BroadcastMode, BusConfig, CancellationToken, EventBus, EventHandler,
    HandlerRegistry, HandlerResult, IntegrationEvent, Outcome, Scope,
};

#[derive(Debug)]
struct AccountSuspended {
    fail: bool,
}

impl IntegrationEvent for AccountSuspended {
    const NAME: &'static str = "identity.account_suspended";
}

/// Counts live instances so tests can check release on scope drop.
struct UnitOfWork {
    id: usize,
    live: Arc<AtomicUsize>,
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Records which unit of work it received.
struct Recorder {
    uow: Arc<UnitOfWork>,
    seen: Arc<parking_lot::Mutex<Vec<usize>>>,
}

#[async_trait]
impl EventHandler<AccountSuspended> for Recorder {
    async fn handle(&self, e: &AccountSuspended, _c: &CancellationToken) -> HandlerResult<()> {
        self.seen.lock().push(self.uow.id);
        tokio::time::sleep(Duration::from_millis(10)).await;
        if e.fail {
            return Ok(Outcome::bad_request("suspension rejected"));
        }
        Ok(Outcome::ok())
    }
}

struct Fixture {
    bus: EventBus,
    built: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    seen: Arc<parking_lot::Mutex<Vec<usize>>>,
}

fn fixture(handlers: usize, mode: BroadcastMode) -> Fixture {
    let built = Arc::new(AtomicUsize::new(0));
    let live = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let mut builder = HandlerRegistry::builder();
    {
        let built = built.clone();
        let live = live.clone();
        builder
            .registrar("identity")
            .provide_scoped::<UnitOfWork, _>(move |_scope: &Scope| {
                let id = built.fetch_add(1, Ordering::SeqCst);
                live.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(UnitOfWork {
                    id,
                    live: live.clone(),
                }))
            });
    }
    for _ in 0..handlers {
        let seen = seen.clone();
        builder
            .registrar("identity")
            .on_event::<AccountSuspended, _, _>(move |scope| {
                Ok(Recorder {
                    uow: scope.resolve::<UnitOfWork>()?,
                    seen: seen.clone(),
                })
            });
    }

    let config = BusConfig {
        broadcast_mode: mode,
        ..BusConfig::default()
    };
    let bus = EventBus::new(builder.build(&config).unwrap(), config);
    Fixture {
        bus,
        built,
        live,
        seen,
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_publishes_get_distinct_instances() {
    let f = fixture(1, BroadcastMode::Sequential);
    let cancel = CancellationToken::new();

    let (a, b) = tokio::join!(
        f.bus
            .publish_broadcast(AccountSuspended { fail: false }, &cancel),
        f.bus
            .publish_broadcast(AccountSuspended { fail: false }, &cancel),
    );
    assert!(a.unwrap().is_success());
    assert!(b.unwrap().is_success());

    let mut seen = f.seen.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1]);
    assert_eq!(f.built.load(Ordering::SeqCst), 2);
    assert_eq!(f.live.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn handlers_in_one_call_share_the_scoped_instance() {
    let f = fixture(3, BroadcastMode::Parallel);

    let out = f
        .bus
        .publish_broadcast(AccountSuspended { fail: false }, &CancellationToken::new())
        .await
        .unwrap();

    assert!(out.is_success());
    assert_eq!(*f.seen.lock(), vec![0, 0, 0]);
    assert_eq!(f.built.load(Ordering::SeqCst), 1);
    assert_eq!(f.live.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn scope_released_on_failure() {
    let f = fixture(2, BroadcastMode::Sequential);

    let out = f
        .bus
        .publish_broadcast(AccountSuspended { fail: true }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.error_message(), Some("suspension rejected"));
    assert_eq!(f.built.load(Ordering::SeqCst), 1);
    assert_eq!(f.live.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn scope_released_on_cancellation() {
    let f = fixture(2, BroadcastMode::Sequential);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = f
        .bus
        .publish_broadcast(AccountSuspended { fail: false }, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        modkit_bus::BusError::Cancelled {
            completed: 0,
            total: 2,
            ..
        }
    ));
    assert!(f.seen.lock().is_empty());
    assert_eq!(f.live.load(Ordering::SeqCst), 0);
}
