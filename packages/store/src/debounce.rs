//! Cancel-and-reschedule coalescing for bursty input.
//!
//! Every input event calls [`Debouncer::schedule`], which cancels the timer
//! registered for the previous ticket and invalidates that ticket. The caller
//! starts a timer for [`Debouncer::delay`], hands its cancel handle to
//! [`Debouncer::set_pending`], and acts when it wakes only if
//! [`Debouncer::fire`] accepts its ticket. A burst of keystrokes produces
//! exactly one recompute after the last one. Timers themselves live in the UI
//! layer.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceTicket(u64);

pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("generation", &self.generation)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Cancel the outstanding timer and issue a fresh ticket.
    pub fn schedule(&mut self) -> DebounceTicket {
        self.cancel_pending();
        self.generation += 1;
        DebounceTicket(self.generation)
    }

    /// Register the cancel handle of the timer started for `ticket`. A handle
    /// for a superseded ticket is cancelled straight away.
    pub fn set_pending(&mut self, ticket: DebounceTicket, cancel: impl FnOnce() + 'static) {
        if self.is_current(ticket) {
            self.cancel_pending();
            self.pending = Some(Box::new(cancel));
        } else {
            cancel();
        }
    }

    /// Called by a timer when it wakes. True if its ticket is still the
    /// latest, in which case the caller should act.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Cancel the outstanding timer and invalidate its ticket.
    pub fn cancel(&mut self) {
        self.cancel_pending();
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        ticket.0 == self.generation
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn cancel_pending(&mut self) {
        if let Some(cancel) = self.pending.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = {
            let count = count.clone();
            move || count.set(count.get() + 1)
        };
        (count, handle)
    }

    #[test]
    fn test_only_latest_ticket_fires() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let first = debouncer.schedule();
        let second = debouncer.schedule();
        let third = debouncer.schedule();

        assert!(!debouncer.is_current(first));
        assert!(!debouncer.is_current(second));
        assert!(!debouncer.fire(first));
        assert!(debouncer.fire(third));
    }

    #[test]
    fn test_reschedule_cancels_previous_timer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let (first_cancelled, first_handle) = counter();
        let (second_cancelled, second_handle) = counter();

        let first = debouncer.schedule();
        debouncer.set_pending(first, first_handle);
        assert_eq!(first_cancelled.get(), 0);

        let second = debouncer.schedule();
        assert_eq!(first_cancelled.get(), 1);
        debouncer.set_pending(second, second_handle);

        assert!(debouncer.fire(second));
        assert!(!debouncer.has_pending());
        // The timer that fired is finished, not cancelled.
        assert_eq!(second_cancelled.get(), 0);
    }

    #[test]
    fn test_handle_for_superseded_ticket_is_cancelled_at_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let stale = debouncer.schedule();
        let _latest = debouncer.schedule();

        let (cancelled, handle) = counter();
        debouncer.set_pending(stale, handle);
        assert_eq!(cancelled.get(), 1);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_cancel_invalidates_pending_ticket() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let (cancelled, handle) = counter();
        let ticket = debouncer.schedule();
        debouncer.set_pending(ticket, handle);

        debouncer.cancel();
        assert_eq!(cancelled.get(), 1);
        assert!(!debouncer.is_current(ticket));
        assert!(!debouncer.fire(ticket));
        assert_eq!(debouncer.delay(), Duration::from_millis(300));
    }
}
