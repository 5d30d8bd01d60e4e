//! Single-slot keep-only-latest buffer between the camera and the analyzer.
//!
//! The producer side never blocks: offering a frame while another is still
//! pending replaces the pending one, which is dropped (and thereby released)
//! without ever being dispatched. The consumer side receives at most one
//! frame at a time; a new frame is not delivered until the previous one has
//! been released.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::trace;

use crate::capture::frame::Frame;

#[derive(Default)]
struct Slot {
    pending: Option<Frame>,
    in_flight: bool,
    closed: bool,
}

struct GateInner {
    slot: Mutex<Slot>,
    cond: Condvar,
}

impl GateInner {
    fn mark_released(&self) {
        let mut slot = self.slot.lock();
        slot.in_flight = false;
        self.cond.notify_all();
    }
}

/// Single-slot frame buffer with a keep-only-latest policy.
#[derive(Clone)]
pub struct FrameGate {
    inner: Arc<GateInner>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                slot: Mutex::new(Slot::default()),
                cond: Condvar::new(),
            }),
        }
    }

    /// Offer a frame for analysis. Never blocks.
    ///
    /// If a frame is already pending it is replaced; the replaced frame is
    /// released without analysis. Frames offered after `close` are released
    /// immediately.
    pub fn offer(&self, frame: Frame) {
        let replaced;
        {
            let mut slot = self.inner.slot.lock();
            if slot.closed {
                replaced = Some(frame);
            } else {
                replaced = slot.pending.replace(frame);
                self.inner.cond.notify_all();
            }
        }
        // Dropped outside the lock so release hooks cannot deadlock on it.
        if replaced.is_some() {
            trace!("frame replaced before dispatch");
        }
    }

    /// Wait for the next frame.
    ///
    /// Blocks until a frame is pending and the previously delivered frame, if
    /// any, has been released. Returns `None` once the gate is closed and
    /// drained. The delivered frame carries a hook that re-opens delivery
    /// when it is released.
    pub fn take(&self) -> Option<Frame> {
        let mut slot = self.inner.slot.lock();
        loop {
            if slot.pending.is_some() {
                if !slot.in_flight {
                    if let Some(mut frame) = slot.pending.take() {
                        slot.in_flight = true;
                        let inner = Arc::clone(&self.inner);
                        frame.on_release(move || inner.mark_released());
                        return Some(frame);
                    }
                }
            } else if slot.closed {
                return None;
            }
            self.inner.cond.wait(&mut slot);
        }
    }

    /// Close the gate. A pending frame is still delivered before `take`
    /// starts returning `None`.
    pub fn close(&self) {
        let mut slot = self.inner.slot.lock();
        slot.closed = true;
        self.inner.cond.notify_all();
    }

    /// Whether a frame is waiting for dispatch.
    pub fn has_pending(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    /// Whether a delivered frame has not been released yet.
    pub fn in_flight(&self) -> bool {
        self.inner.slot.lock().in_flight
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new()
    }
}
