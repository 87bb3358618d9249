use std::time::{Duration, Instant};

/// Coalesces bursts of resize events into one relayout once the viewport has been
/// quiet for a while. Time is passed in explicitly so callers (and tests) control it.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<(f32, f32)>,
    last_event: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_event: None,
        }
    }

    /// Record a resize. Later events overwrite earlier ones and restart the window.
    pub fn push(&mut self, width: f32, height: f32, now: Instant) {
        self.pending = Some((width, height));
        self.last_event = Some(now);
    }

    /// The settled size, once `quiet` has passed since the last event. Each burst
    /// yields at most one size.
    pub fn poll(&mut self, now: Instant) -> Option<(f32, f32)> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.quiet {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before a pending size settles.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_event?;
        Some(self.quiet.saturating_sub(now.saturating_duration_since(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_settles_once_after_quiet_window() {
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        debouncer.push(300.0, 200.0, t0);
        debouncer.push(310.0, 200.0, t0 + Duration::from_millis(40));
        debouncer.push(320.0, 240.0, t0 + Duration::from_millis(80));

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(150)), None);
        assert_eq!(
            debouncer.remaining(t0 + Duration::from_millis(150)),
            Some(Duration::from_millis(30))
        );
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(180)), Some((320.0, 240.0)));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn nothing_pending_polls_none() {
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(100));
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert_eq!(debouncer.remaining(Instant::now()), None);
    }
}
