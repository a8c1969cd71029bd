use std::{fmt, sync::Arc};

use tokio::sync::watch::{channel, Receiver, Sender};

/// Broadcast side of the gate's readiness flag.
///
/// Owned by the [`DispatchGate`](crate::gate::DispatchGate), which drops
/// the flag to `false` when a dispatch cycle is triggered and raises it
/// back to `true` when the latest cycle resolves.  Unlike a one-shot
/// completion signal, the flag may go unready again after having been
/// ready, so observers should treat a successful wait as "ready at that
/// moment" rather than "ready forever".
#[derive(Clone)]
pub struct Ready {
    inner: Arc<ReadyInner>,
}

struct ReadyInner {
    sender: Sender<bool>,
}

/// A subscription to the readiness flag, typically held by futures that
/// must not proceed until the gate's content is safe to render.
pub struct ReadySubscription {
    // keeps a sender alive so the receiver never observes closure
    ready: Ready,
    receiver: Receiver<bool>,
}

impl Ready {
    pub(crate) fn new(initial: bool) -> Self {
        let (sender, _) = channel(initial);
        Self {
            inner: Arc::new(ReadyInner { sender }),
        }
    }

    pub(crate) fn set(&self, ready: bool) {
        self.inner.sender.send_replace(ready);
    }

    /// The current value of the flag, without waiting.
    pub fn is_ready(&self) -> bool {
        *self.inner.sender.borrow()
    }

    /// Subscribe to the flag.
    ///
    /// To make use of a subscription within a future, move it into the
    /// future and call [`wait`](ReadySubscription::wait) from there.
    pub fn subscribe(&self) -> ReadySubscription {
        ReadySubscription {
            ready: self.clone(),
            receiver: self.inner.sender.subscribe(),
        }
    }
}

impl ReadySubscription {
    /// Asynchronously wait until the gate is ready.
    ///
    /// Returns immediately if the flag is already `true`, otherwise waits
    /// for the next resolution to raise it.
    pub async fn wait(mut self) {
        self.receiver
            .wait_for(|ready| *ready)
            .await
            .expect("internal error: sender not properly managed");
    }
}

impl fmt::Debug for Ready {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ready")
            .field("ready", &*self.inner.sender.borrow())
            .field("subscribers", &self.inner.sender.receiver_count())
            .finish()
    }
}

impl fmt::Debug for ReadySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySubscription")
            .field("ready", &self.ready)
            .finish()
    }
}
