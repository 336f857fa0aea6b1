use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Holds the latest value until `delay` has passed without a newer one.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, at)) if at <= now => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_value_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.push("m", start);
        debouncer.push("mi", start + Duration::from_millis(100));
        debouncer.push("mil", start + Duration::from_millis(200));

        assert_eq!(debouncer.take_ready(start + Duration::from_millis(500)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(200) + SEARCH_DEBOUNCE)
        );
        assert_eq!(debouncer.take_ready(start + Duration::from_millis(600)), Some("mil"));
        assert_eq!(debouncer.take_ready(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn flush_skips_the_wait() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        debouncer.push(1, Instant::now());
        assert_eq!(debouncer.flush(), Some(1));
        assert_eq!(debouncer.deadline(), None);
    }
}
