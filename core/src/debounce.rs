/// Coalesces a burst of events into one action fired after a quiet period.
///
/// Timestamps are milliseconds from any monotonic clock; the caller polls
/// from its frame loop.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    quiet_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms: quiet_ms.max(0.0),
            deadline: None,
        }
    }

    /// Records an event, pushing the deadline back.
    pub fn poke(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.quiet_ms);
    }

    /// True exactly once per burst, on the first poll after the quiet period.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
