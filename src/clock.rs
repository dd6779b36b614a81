//! Time source used for polling deadlines.

/// A monotonic millisecond counter.
///
/// Only differences between readings are used, so the epoch is arbitrary. Any
/// `FnMut() -> u64` closure is a clock, e.g. `|| embassy_time::Instant::now().as_millis()`.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed point.
    fn now_ms(&mut self) -> u64;
}

impl<F> Clock for F
where
    F: FnMut() -> u64,
{
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

/// Deadline computed once when a polling loop starts.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline(Option<u64>);

impl Deadline {
    /// `timeout_ms == 0` never expires.
    pub(crate) fn after<C: Clock>(clock: &mut C, timeout_ms: u32) -> Self {
        if timeout_ms == 0 {
            return Self(None);
        }
        Self(Some(clock.now_ms().saturating_add(u64::from(timeout_ms))))
    }

    /// Like [`Deadline::after`], but a zero timeout expires immediately.
    pub(crate) fn budget<C: Clock>(clock: &mut C, timeout_ms: u32) -> Self {
        Self(Some(clock.now_ms().saturating_add(u64::from(timeout_ms))))
    }

    pub(crate) fn expired<C: Clock>(&self, clock: &mut C) -> bool {
        match self.0 {
            Some(at) => clock.now_ms() > at,
            None => false,
        }
    }
}
