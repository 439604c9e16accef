/// Trailing-edge debouncer driven by a caller-supplied millisecond clock.
///
/// Each `queue` replaces the pending value and restarts the quiet period;
/// the value becomes ready once no new `queue` arrived for `delay_ms`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Take the pending value regardless of the quiet period.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds until the pending value is ready.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let (_, queued_at) = self.pending.as_ref()?;
        Some(self.delay_ms.saturating_sub(now_ms.saturating_sub(*queued_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_before_delay() {
        let mut debouncer = Debouncer::new(300);
        debouncer.queue("a", 1_000);
        assert_eq!(debouncer.take_ready(1_299), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.take_ready(1_300), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_requeue_restarts_quiet_period_and_keeps_latest() {
        let mut debouncer = Debouncer::new(300);
        debouncer.queue(1, 0);
        debouncer.queue(2, 200);
        debouncer.queue(3, 400);
        assert_eq!(debouncer.take_ready(600), None);
        assert_eq!(debouncer.take_ready(700), Some(3));
        assert_eq!(debouncer.take_ready(10_000), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut debouncer = Debouncer::new(10);
        debouncer.queue((), 0);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.take_ready(100), None);
    }

    #[test]
    fn test_flush_ignores_delay() {
        let mut debouncer = Debouncer::new(1_000);
        debouncer.queue("x", 0);
        assert_eq!(debouncer.flush(), Some("x"));
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_remaining_ms() {
        let mut debouncer = Debouncer::new(300);
        assert_eq!(debouncer.remaining_ms(0), None);
        debouncer.queue((), 100);
        assert_eq!(debouncer.remaining_ms(250), Some(150));
        assert_eq!(debouncer.remaining_ms(900), Some(0));
    }
}
