use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use futures::FutureExt;
use route_dispatch_gate::{
    action::{ActionGroups, ActionSpec},
    dispatcher::{ActionDispatcher, DispatchError},
    route::{Location, RouteContext},
    DispatchCycle, DispatchGate, GateInput, InputChange,
};
use tokio::{
    sync::oneshot,
    time::{sleep, timeout},
};

/// Holds every dispatch unresolved until the test releases it.
struct GatedDispatcher {
    pending: Mutex<Vec<oneshot::Sender<()>>>,
}

impl GatedDispatcher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Releases the oldest pending dispatch, waiting for one to arrive
    /// if the dispatcher has not been reached yet.
    async fn release(&self) {
        let sender = timeout(Duration::from_secs(1), async {
            loop {
                let pending = {
                    let mut pending = self.pending.lock().unwrap();
                    if pending.is_empty() {
                        None
                    } else {
                        Some(pending.remove(0))
                    }
                };
                match pending {
                    Some(sender) => break sender,
                    None => sleep(Duration::from_millis(1)).await,
                }
            }
        })
        .await
        .expect("no dispatch arrived to release");
        let _ = sender.send(());
    }
}

#[async_trait]
impl ActionDispatcher for GatedDispatcher {
    async fn dispatch(
        &self,
        _groups: ActionGroups,
        _context: RouteContext,
    ) -> Result<(), DispatchError> {
        let (sender, receiver) = oneshot::channel();
        self.pending.lock().unwrap().push(sender);
        let _ = receiver.await;
        Ok(())
    }
}

fn pending_gate() -> (DispatchGate, DispatchCycle, Arc<GatedDispatcher>) {
    let dispatcher = GatedDispatcher::new();
    let mut input = GateInput::new(Location::new("/a"), ActionSpec::One("load".into()));
    input.dispatch_on_first_activation = true;
    let (gate, cycle) = DispatchGate::activate(input, dispatcher.clone());
    (gate, cycle.expect("first activation must dispatch"), dispatcher)
}

#[tokio::test]
async fn timeout_while_dispatch_pending() -> anyhow::Result<()> {
    let (gate, cycle, dispatcher) = pending_gate();
    let running = tokio::spawn(cycle.run());

    let subscription = gate.subscribe();
    timeout(Duration::from_millis(100), subscription.wait())
        .await
        .expect_err("subscription.wait() shouldn't return here");

    dispatcher.release().await;
    running.await?;
    Ok(())
}

#[tokio::test]
async fn wait_after_ready() {
    let input = GateInput::new(Location::new("/a"), ActionSpec::One("load".into()));
    let (gate, _) = DispatchGate::activate(input, GatedDispatcher::new());

    // already ready: wait should return immediately
    assert!(gate.ready().is_ready());
    assert!(gate.subscribe().wait().now_or_never().is_some());
}

#[tokio::test]
async fn wait_before_ready() -> anyhow::Result<()> {
    let (gate, cycle, dispatcher) = pending_gate();

    let subscription = gate.subscribe();
    let waiter = tokio::spawn(async move {
        timeout(Duration::from_millis(500), subscription.wait())
            .await
            .expect("subscription.wait() should not have timed out");
    });

    let running = tokio::spawn(cycle.run());
    dispatcher.release().await;
    running.await?;
    waiter.await?;

    assert!(gate.ready().is_ready());
    Ok(())
}

#[tokio::test]
async fn subscription_goes_pending_until_resolution() -> anyhow::Result<()> {
    let (gate, cycle, dispatcher) = pending_gate();
    let mut wait = tokio_test::task::spawn(gate.subscribe().wait());
    tokio_test::assert_pending!(wait.poll());

    let running = tokio::spawn(cycle.run());
    dispatcher.release().await;
    running.await?;

    tokio_test::assert_ready!(wait.poll());
    Ok(())
}

#[tokio::test]
async fn new_cycle_drops_readiness_again() -> anyhow::Result<()> {
    let dispatcher = GatedDispatcher::new();
    let input = GateInput::new(Location::new("/a"), ActionSpec::One("load".into()));
    let (gate, _) = DispatchGate::activate(input, dispatcher.clone());
    assert!(gate.ready().is_ready());

    let cycle = gate
        .on_input_change(InputChange::location(Location::new("/b")))
        .expect("changed location must dispatch");
    assert!(!gate.ready().is_ready());

    let running = tokio::spawn(cycle.run());
    dispatcher.release().await;
    running.await?;
    assert!(gate.ready().is_ready());
    Ok(())
}
