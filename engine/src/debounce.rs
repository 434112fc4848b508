use std::time::Duration;

/// Trailing debounce on virtual time.
///
/// Every `push` restarts the quiet period with the latest value. `poll` hands
/// the value out once the stream has been silent for `quiet`, at most once per
/// burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debounce<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Duration) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, at)| at.saturating_add(self.quiet))
    }

    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = self.deadline()?;
        if now < due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
