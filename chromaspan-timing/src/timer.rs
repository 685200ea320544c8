//! Single-slot scheduler for delayed phase transitions.
//!
//! A sequencer owns exactly one [`TimerSlot`]. Scheduling replaces whatever
//! was pending, so a transition armed by an earlier phase can never fire once
//! a later phase has taken over.

use tracing::trace;

#[derive(Debug)]
struct Pending<A> {
    due_ms: u64,
    action: A,
}

#[derive(Debug)]
pub struct TimerSlot<A> {
    pending: Option<Pending<A>>,
}

impl<A> TimerSlot<A> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Arms the slot to yield `action` once `delay_ms` has passed after
    /// `now_ms`. Any previously pending action is dropped.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: A) {
        let due_ms = now_ms.saturating_add(delay_ms);
        if let Some(old) = &self.pending {
            trace!(old_due_ms = old.due_ms, due_ms, "replacing pending timer");
        }
        self.pending = Some(Pending { due_ms, action });
    }

    /// Disarms the slot, returning the action that will no longer fire.
    pub fn cancel(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    /// Takes the pending action if it is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<A> {
        if self.pending.as_ref().is_some_and(|p| now_ms >= p.due_ms) {
            self.pending.take().map(|p| p.action)
        } else {
            None
        }
    }
}

impl<A> Default for TimerSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}
