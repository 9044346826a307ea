//! The engine's serial command queue (§5): every OS-level callback source
//! canonicalizes its event and enqueues here before returning; one worker
//! thread drains it and performs all mode transitions synchronously.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use neru_protocol::{Request, Response};

/// Minimum queue depth required by §4.6's concurrency contract.
pub const MIN_QUEUE_DEPTH: usize = 32;

/// One IPC request paired with the channel its response goes back on.
/// The dispatcher blocks on `reply` while the engine thread processes the
/// request, matching "a connection is single-command, single-response"
/// (§4.8) even though the dispatcher itself may service many connections
/// concurrently.
pub struct IpcJob {
    pub request: Request,
    pub reply: Sender<Response>,
}

/// Everything that can arrive at the engine's serial queue.
pub enum EngineEvent {
    /// A canonicalized keystroke from the global-hotkey/key-tap pipeline.
    Key(String),
    /// The foreground application changed.
    FocusChanged { bundle_id: Option<String> },
    /// The focused window's title changed (logged, not acted on).
    TitleChanged,
    /// The OS reported a display-arrangement change.
    ScreenChanged,
    /// An IPC command awaiting dispatch.
    Ipc(IpcJob),
}

/// A bounded sender that drops the newest event and advances a counter
/// when the queue is full, per §4.6's coalescing-drop contract.
#[derive(Clone)]
pub struct CoalescingSender {
    inner: Sender<EngineEvent>,
    coalesced: std::sync::Arc<AtomicU64>,
}

impl CoalescingSender {
    /// Enqueues `event`, dropping it and advancing the coalesced counter
    /// if the queue is full. Only a disconnected receiver (the engine
    /// thread has exited) surfaces as an error.
    pub fn send(&self, event: EngineEvent) {
        match self.inner.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("engine queue full, dropping newest event");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("engine queue receiver gone, dropping event");
            }
        }
    }

    /// Count of events dropped so far because the queue was full.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Enqueues an IPC job, blocking the caller (a connection thread, never
    /// the engine thread) until there is room. Unlike [`Self::send`], this
    /// never drops: a dropped IPC request would strand a client blocked
    /// forever on its reply channel, which the coalescing-drop contract is
    /// not meant to cover.
    pub fn send_ipc(&self, job: IpcJob) {
        if self.inner.send(EngineEvent::Ipc(job)).is_err() {
            tracing::warn!("engine queue receiver gone, IPC request dropped");
        }
    }
}

/// Builds a fresh queue with at least [`MIN_QUEUE_DEPTH`] capacity.
pub fn channel(depth: usize) -> (CoalescingSender, Receiver<EngineEvent>) {
    let (tx, rx) = bounded(depth.max(MIN_QUEUE_DEPTH));
    (
        CoalescingSender {
            inner: tx,
            coalesced: std::sync::Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_drops_newest_and_counts() {
        let (tx, rx) = channel(1);
        tx.send(EngineEvent::ScreenChanged);
        tx.send(EngineEvent::ScreenChanged);
        assert_eq!(tx.coalesced_count(), 1);
        assert_eq!(rx.len(), 1);
    }
}
