use std::time::Duration;

use log::trace;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period the search text must hold before it is applied.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// A value that survived the quiescence window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled<T> {
    pub generation: u64,
    pub value: T,
}

/// Trailing-edge debouncer.
///
/// Every `schedule` aborts the pending timer and starts a new one; only the
/// last value reaches the receiver. The pending timer is aborted on drop.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    tx: mpsc::UnboundedSender<Settled<T>>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<Settled<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            window,
            tx,
            pending: None,
            generation: 0,
        };
        (debouncer, rx)
    }

    /// Re-arms the timer with `value`. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, value: T) -> u64 {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let window = self.window;
        let tx = self.tx.clone();
        trace!("debounce #{generation} armed for {window:?}");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(Settled { generation, value });
        }));
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Accepts an emission from the receiver. Emissions from a timer that was
    /// superseded after it fired are discarded.
    pub fn settle(&mut self, settled: Settled<T>) -> Option<T> {
        if !self.is_current(settled.generation) {
            trace!("debounce #{} is stale, dropping", settled.generation);
            return None;
        }
        self.pending = None;
        Some(settled.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
