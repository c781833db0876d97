//! Trailing-edge debouncing driven by the event loop clock.
//!
//! Nothing here spawns threads or timers. The owner passes the current
//! [`Instant`] on every call and polls for readiness once per loop turn,
//! which keeps the behaviour deterministic under test.

use std::time::{Duration, Instant};

/// Holds at most one pending payload and the instant it becomes due.
///
/// Re-arming replaces both the payload and the deadline, so only the
/// latest value survives a burst of calls.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The quiet period this debouncer waits for.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) with `value`, due `delay` after `now`.
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the payload if its deadline has passed.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        let (_, due) = self.pending.as_ref()?;
        if now < *due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Take the payload immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending payload without delivering it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending payload becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Peek at the pending payload.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }
}

/// A debounced action: a [`Debouncer`] bundled with the function it feeds.
///
/// This is the convenience form for callers whose action owns everything it
/// touches. The document controller keeps a bare [`Debouncer`] instead,
/// because its action writes to a store the controller itself owns.
///
/// Whatever the action returns, including an `Err`, is handed back from
/// [`Debounced::poll`] untouched so the owner decides how to report it.
///
/// ```
/// use std::time::{Duration, Instant};
/// use mdpad::debounce::debounce;
///
/// let mut saved = Vec::new();
/// let mut save = debounce(|text: String| saved.push(text), Duration::from_millis(300));
/// let t = Instant::now();
/// save.call("a".to_string(), t);
/// save.call("ab".to_string(), t + Duration::from_millis(100));
/// assert!(save.poll(t + Duration::from_millis(399)).is_none());
/// assert!(save.poll(t + Duration::from_millis(400)).is_some());
/// drop(save);
/// assert_eq!(saved, ["ab"]);
/// ```
pub struct Debounced<T, F> {
    timer: Debouncer<T>,
    action: F,
}

/// Wrap `action` so that bursts of calls within `delay` collapse into one.
pub fn debounce<T, F, R>(action: F, delay: Duration) -> Debounced<T, F>
where
    F: FnMut(T) -> R,
{
    Debounced {
        timer: Debouncer::new(delay),
        action,
    }
}

impl<T, F, R> Debounced<T, F>
where
    F: FnMut(T) -> R,
{
    /// Schedule the action with `value`, cancelling any earlier schedule.
    pub fn call(&mut self, value: T, now: Instant) {
        self.timer.call(value, now);
    }

    /// Run the action if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<R> {
        let value = self.timer.take_ready(now)?;
        Some((self.action)(value))
    }

    /// Run the action now with the pending value, ignoring the deadline.
    pub fn flush(&mut self) -> Option<R> {
        let value = self.timer.flush()?;
        Some((self.action)(value))
    }

    pub const fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for Debounced<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_not_ready_before_delay() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(300));
        d.call("a", t);
        assert_eq!(d.take_ready(t + ms(299)), None);
        assert!(d.is_pending());
    }

    #[test]
    fn test_ready_exactly_at_deadline() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(300));
        d.call("a", t);
        assert_eq!(d.take_ready(t + ms(300)), Some("a"));
        assert!(!d.is_pending());
        assert_eq!(d.take_ready(t + ms(900)), None);
    }

    #[test]
    fn test_burst_coalesces_to_last_value() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(300));
        d.call(1, t);
        d.call(2, t + ms(50));
        d.call(3, t + ms(100));
        assert_eq!(d.deadline(), Some(t + ms(400)));
        assert_eq!(d.take_ready(t + ms(399)), None);
        assert_eq!(d.take_ready(t + ms(400)), Some(3));
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(300));
        d.call("x", t);
        assert_eq!(d.flush(), Some("x"));
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn test_cancel_drops_payload() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(10));
        d.call("x", t);
        d.cancel();
        assert_eq!(d.take_ready(t + ms(100)), None);
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn test_debounced_action_fires_once_with_latest_argument() {
        let t = Instant::now();
        let mut fired = Vec::new();
        {
            let mut save = debounce(|v: String| fired.push(v), ms(300));
            save.call("first".to_string(), t);
            save.call("second".to_string(), t + ms(50));
            save.call("third".to_string(), t + ms(100));

            for step in (0..=1000).step_by(10) {
                save.poll(t + ms(step));
            }
            assert!(!save.is_pending());
        }
        assert_eq!(fired, vec!["third".to_string()]);
    }

    #[test]
    fn test_debounced_action_fires_at_last_call_plus_delay() {
        let t = Instant::now();
        let mut save = debounce(|v: u32| v, ms(300));
        save.call(1, t);
        save.call(2, t + ms(50));
        save.call(3, t + ms(100));
        assert_eq!(save.poll(t + ms(399)), None);
        assert_eq!(save.poll(t + ms(400)), Some(3));
    }

    #[test]
    fn test_debounced_action_failure_reaches_caller() {
        let t = Instant::now();
        let mut save = debounce(|_: ()| -> Result<(), String> { Err("disk full".into()) }, ms(1));
        save.call((), t);
        assert_eq!(save.poll(t + ms(1)), Some(Err("disk full".to_string())));
    }

    #[test]
    fn test_debounced_flush_runs_pending_action_once() {
        let t = Instant::now();
        let mut save = debounce(|v: &str| v.len(), ms(300));
        assert_eq!(save.flush(), None);
        save.call("draft", t);
        assert_eq!(save.flush(), Some(5));
        assert!(!save.is_pending());
        assert_eq!(save.poll(t + ms(300)), None);
    }

    #[test]
    fn test_separate_quiet_periods_fire_separately() {
        let t = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.call("a", t);
        assert_eq!(d.take_ready(t + ms(100)), Some("a"));
        d.call("b", t + ms(500));
        assert_eq!(d.take_ready(t + ms(600)), Some("b"));
    }
}
