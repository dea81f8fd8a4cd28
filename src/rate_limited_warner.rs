use std::time::{Duration, Instant};

/// Default interval between delivery failure warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Helper that rate limits delivery failure warnings.
///
/// The caller counts failures via [`record_failure`](Self::record_failure).
/// The next call to [`warn_if_due`](Self::warn_if_due) invokes the callback
/// with the number of failures since the last warning if the interval has
/// elapsed. The first failure is always reported immediately.
/// [`flush`](Self::flush) reports outstanding failures regardless of timing.
#[derive(Debug)]
pub struct RateLimitedWarner {
    interval: Duration,
    last_warn: Option<Instant>,
    failures: u64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_warn: None,
            failures: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of failures not yet reported.
    pub fn outstanding(&self) -> u64 {
        self.failures
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    /// Report outstanding failures if the interval has elapsed.
    pub fn warn_if_due(&mut self, warn: impl FnOnce(u64)) {
        self.warn_if_due_at(Instant::now(), warn);
    }

    pub(crate) fn warn_if_due_at(&mut self, now: Instant, warn: impl FnOnce(u64)) {
        let due = self
            .last_warn
            .is_none_or(|prev| now.saturating_duration_since(prev) >= self.interval);
        if due && self.failures > 0 {
            warn(std::mem::take(&mut self.failures));
            self.last_warn = Some(now);
        }
    }

    /// Immediately report any outstanding failures.
    pub fn flush(&mut self, warn: impl FnOnce(u64)) {
        if self.failures > 0 {
            warn(std::mem::take(&mut self.failures));
            self.last_warn = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn emits_first_warning_immediately() {
        let mut warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.record_failure();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
    }

    #[rstest]
    fn rate_limits_subsequent_warnings() {
        let mut warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.record_failure();
        warner.warn_if_due(|c| warnings.push(c));
        warner.record_failure();
        warner.record_failure();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
        assert_eq!(warner.outstanding(), 2);
    }

    #[rstest]
    fn summarises_after_interval() {
        let mut warner = RateLimitedWarner::new(Duration::from_millis(100));
        let start = Instant::now();
        let mut warnings = Vec::new();
        warner.record_failure();
        warner.warn_if_due_at(start, |c| warnings.push(c));
        warner.record_failure();
        warner.record_failure();
        warner.warn_if_due_at(start + Duration::from_millis(50), |c| warnings.push(c));
        warner.warn_if_due_at(start + Duration::from_millis(150), |c| warnings.push(c));
        assert_eq!(warnings, vec![1, 2]);
        assert_eq!(warner.outstanding(), 0);
    }

    #[rstest]
    fn flush_emits_pending_warning() {
        let mut warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.record_failure();
        warner.flush(|c| warnings.push(c));
        warner.flush(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
    }
}
