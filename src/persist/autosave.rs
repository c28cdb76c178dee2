use std::time::{Duration, Instant};

/// Change-driven save scheduling: each edit restarts a quiet period and the
/// snapshot is due once that period passes without another edit.
#[derive(Clone, Debug)]
pub struct Autosave {
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl Autosave {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_since: None,
        }
    }

    pub fn note_change(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.pending_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.debounce)
    }

    /// When the pending snapshot becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.debounce)
    }

    pub fn mark_saved(&mut self) {
        self.pending_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_change_restarts_the_quiet_period() {
        let start = Instant::now();
        let debounce = Duration::from_millis(500);
        let mut autosave = Autosave::new(debounce);
        assert!(!autosave.is_due(start + debounce));

        autosave.note_change(start);
        autosave.note_change(start + Duration::from_millis(400));
        assert!(!autosave.is_due(start + debounce));
        assert!(autosave.is_due(start + Duration::from_millis(900)));

        autosave.mark_saved();
        assert!(!autosave.is_pending());
        assert!(autosave.deadline().is_none());
    }
}
