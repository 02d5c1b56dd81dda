// src/app/search.rs — debounce state for the live film search
use std::time::{Duration, Instant};

/// Quiet period after the last keystroke before a lookup fires.
pub const DEBOUNCE: Duration = Duration::from_millis(300);
/// Queries shorter than this never hit the network.
pub const MIN_QUERY_LEN: usize = 2;

/// Debounced lookup scheduler. Every edit replaces the pending query and
/// pushes the deadline out; `take_due` hands back at most one query once the
/// quiet period has elapsed. Dispatched lookups carry a generation number so
/// a response that arrives after a newer dispatch (or after a selection) can
/// be recognized as stale and dropped.
pub struct DebouncedSearch {
    pending: Option<(String, Instant)>,
    generation: u64,
    in_flight: bool,
}

impl Default for DebouncedSearch {
    fn default() -> Self {
        Self {
            pending: None,
            generation: 0,
            in_flight: false,
        }
    }
}

impl DebouncedSearch {
    /// Feed the current query text. Returns true when the dropdown should
    /// hide because the query is too short to ever produce a lookup. The
    /// short branch invalidates like `cancel`: a lookup dispatched for the
    /// longer text must not reopen the dropdown after the field shrank.
    pub fn input(&mut self, query: &str, now: Instant) -> bool {
        let q = query.trim();
        if q.chars().count() < MIN_QUERY_LEN {
            self.pending = None;
            self.generation += 1;
            self.in_flight = false;
            return true;
        }
        self.pending = Some((q.to_string(), now + DEBOUNCE));
        false
    }

    /// Pop the pending query if its quiet period has elapsed. Bumps the
    /// generation, invalidating any response still in flight.
    pub fn take_due(&mut self, now: Instant) -> Option<(u64, String)> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {
                let (query, _) = self.pending.take()?;
                self.generation += 1;
                self.in_flight = true;
                Some((self.generation, query))
            }
            _ => None,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// The response for the current generation arrived.
    pub fn settle(&mut self) {
        self.in_flight = false;
    }

    /// A lookup is scheduled or awaiting its response.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight
    }

    /// Drop any pending lookup and invalidate in-flight responses. Called
    /// when the user selects a match or clears the field.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.generation += 1;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_query_never_schedules() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        assert!(d.input("i", t0));
        assert!(d.take_due(t0 + DEBOUNCE * 2).is_none());
    }

    #[test]
    fn query_fires_after_quiet_period_only() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        assert!(!d.input("inception", t0));
        assert!(d.take_due(t0 + Duration::from_millis(200)).is_none());
        let (generation, q) = d.take_due(t0 + Duration::from_millis(300)).unwrap();
        assert_eq!(q, "inception");
        assert!(d.is_current(generation));
        // Nothing left after the pop.
        assert!(d.take_due(t0 + Duration::from_millis(600)).is_none());
    }

    #[test]
    fn each_keystroke_resets_the_timer() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        d.input("inc", t0);
        d.input("ince", t0 + Duration::from_millis(200));
        // Old deadline passed, new one has not.
        assert!(d.take_due(t0 + Duration::from_millis(350)).is_none());
        let (_, q) = d.take_due(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(q, "ince");
    }

    #[test]
    fn newer_dispatch_invalidates_older_generation() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        d.input("inc", t0);
        let (first, _) = d.take_due(t0 + DEBOUNCE).unwrap();
        d.input("incep", t0 + DEBOUNCE);
        let (second, _) = d.take_due(t0 + DEBOUNCE * 2).unwrap();
        assert!(!d.is_current(first));
        assert!(d.is_current(second));
    }

    #[test]
    fn selection_cancels_pending_and_in_flight() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        d.input("old query", t0);
        let (generation, _) = d.take_due(t0 + DEBOUNCE).unwrap();
        d.cancel();
        assert!(!d.is_current(generation));
        assert!(d.take_due(t0 + DEBOUNCE * 4).is_none());
    }

    #[test]
    fn shrinking_the_query_invalidates_a_dispatched_lookup() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        d.input("inc", t0);
        let (generation, _) = d.take_due(t0 + DEBOUNCE).unwrap();
        // The field shrank below the minimum before the response landed.
        assert!(d.input("i", t0 + DEBOUNCE));
        assert!(!d.is_current(generation));
        assert!(!d.is_busy());
    }

    #[test]
    fn busy_tracks_scheduled_and_in_flight_lookups() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        assert!(!d.is_busy());
        d.input("inception", t0);
        assert!(d.is_busy());
        d.take_due(t0 + DEBOUNCE).unwrap();
        assert!(d.is_busy());
        d.settle();
        assert!(!d.is_busy());
    }

    #[test]
    fn whitespace_only_counts_as_short() {
        let mut d = DebouncedSearch::default();
        let t0 = Instant::now();
        assert!(d.input("   ", t0));
        assert!(d.take_due(t0 + DEBOUNCE).is_none());
    }
}
