//! Debounced collection of changed light ids

use crate::hue::BridgeEvent;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, trace};

/// Distinct light ids changed within one debounce window
pub type ChangeBatch = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Idle,
    /// A timer closes the window at `deadline`
    Open { deadline: Instant },
    /// Closed and waiting for the receiver to take the ids
    Ready,
}

#[derive(Debug)]
struct Pending {
    ids: ChangeBatch,
    window: Window,
}

impl Pending {
    fn take_ready(&mut self) -> Option<ChangeBatch> {
        if self.window != Window::Ready {
            return None;
        }
        self.window = Window::Idle;
        let batch = std::mem::take(&mut self.ids);
        (!batch.is_empty()).then_some(batch)
    }
}

/// Coalesces change notifications into batches
///
/// The first registration in a quiet period opens a window; every id
/// registered before it closes joins the same batch. Later registrations
/// never push the deadline back, so a steady stream of events still
/// produces one batch per window.
///
/// Ids stay pending until the [`ChangeReceiver`] takes them. While the
/// consumer is busy, new registrations merge into the closed batch instead
/// of queueing behind it.
#[derive(Clone)]
pub struct ChangeAggregator {
    pending: Arc<Mutex<Pending>>,
    window: Duration,
    all_lights: Arc<[String]>,
    ready: mpsc::Sender<()>,
}

/// Consumer side of a [`ChangeAggregator`]
pub struct ChangeReceiver {
    pending: Arc<Mutex<Pending>>,
    ready: mpsc::Receiver<()>,
}

impl ChangeAggregator {
    /// `all_lights` is what a button press expands to.
    pub fn new(
        window: Duration,
        all_lights: impl IntoIterator<Item = String>,
    ) -> (Self, ChangeReceiver) {
        let pending = Arc::new(Mutex::new(Pending {
            ids: ChangeBatch::new(),
            window: Window::Idle,
        }));
        let (tx, rx) = mpsc::channel(1);
        let aggregator = Self {
            pending: pending.clone(),
            window,
            all_lights: all_lights.into_iter().collect(),
            ready: tx,
        };
        (aggregator, ChangeReceiver { pending, ready: rx })
    }

    pub fn register(&self, light_id: impl Into<String>) {
        self.register_many(std::iter::once(light_id.into()));
    }

    /// Add ids to the pending set, opening a window if none is open.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register_many(&self, light_ids: impl IntoIterator<Item = String>) {
        let deadline = {
            let mut pending = self.pending.lock();
            pending.ids.extend(light_ids);
            match pending.window {
                Window::Open { deadline } => {
                    trace!("{} lights pending until {:?}", pending.ids.len(), deadline);
                    return;
                }
                Window::Ready => {
                    trace!("{} lights waiting for the scheduler", pending.ids.len());
                    return;
                }
                Window::Idle => {}
            }
            if pending.ids.is_empty() {
                return;
            }
            let deadline = Instant::now() + self.window;
            pending.window = Window::Open { deadline };
            deadline
        };

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            this.close_window();
        });
    }

    /// Route one bridge event. A button short release refreshes every fixture.
    pub fn register_event(&self, event: &BridgeEvent) {
        if !event.is_update() {
            return;
        }
        if event.has_short_release() {
            info!("Button released, refreshing all {} lights", self.all_lights.len());
            self.register_many(self.all_lights.iter().cloned());
        } else {
            self.register_many(event.changed_ids().map(str::to_string));
        }
    }

    fn close_window(&self) {
        {
            let mut pending = self.pending.lock();
            if pending.ids.is_empty() {
                pending.window = Window::Idle;
                return;
            }
            pending.window = Window::Ready;
        }
        // A full slot already wakes the receiver
        let _ = self.ready.try_send(());
    }
}

impl ChangeReceiver {
    /// Wait for the next closed window and take its ids.
    ///
    /// Returns `None` once every aggregator handle is gone.
    pub async fn recv(&mut self) -> Option<ChangeBatch> {
        loop {
            self.ready.recv().await?;
            if let Some(batch) = self.take() {
                return Some(batch);
            }
        }
    }

    /// Take the ids of a closed window without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeBatch> {
        while self.ready.try_recv().is_ok() {}
        self.take()
    }

    fn take(&self) -> Option<ChangeBatch> {
        let batch = self.pending.lock().take_ready()?;
        info!("Dispatching {} changed lights", batch.len());
        Some(batch)
    }
}
