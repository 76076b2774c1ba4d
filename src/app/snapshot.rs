//! Latest-wins holder for fetch results.
//!
//! Each fetch cycle takes a ticket before it starts. A finished cycle may only
//! replace the held snapshot if its ticket is newer, so a slow refresh that
//! returns after a faster, later one is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::domain::FetchReport;

/// A published fetch result and the ticket of the cycle that produced it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub seq: u64,
    pub report: FetchReport,
}

#[derive(Debug, Default)]
pub struct SnapshotSlot {
    next_ticket: AtomicU64,
    current: Mutex<Option<Arc<Snapshot>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a ticket for a cycle about to start. Tickets start at 1.
    pub fn begin(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `report` if `ticket` is newer than the held snapshot.
    ///
    /// Returns `false` when the report was stale and discarded.
    pub fn publish(&self, ticket: u64, report: FetchReport) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let held = current.as_ref().map(|s| s.seq).unwrap_or(0);
        if held >= ticket {
            debug!(ticket, held, "discarding stale fetch result");
            return false;
        }
        *current = Some(Arc::new(Snapshot { seq: ticket, report }));
        true
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when a cycle has started whose result has not been published.
    pub fn in_flight(&self) -> bool {
        let issued = self.next_ticket.load(Ordering::SeqCst);
        let held = self.current().map(|s| s.seq).unwrap_or(0);
        issued > held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, CountryOutcome};

    fn report(reason: &str) -> FetchReport {
        FetchReport::new(
            CountryOutcome::unavailable(Country::Nz, reason),
            CountryOutcome::unavailable(Country::Au, reason),
        )
    }

    #[test]
    fn late_result_from_older_cycle_is_discarded() {
        let slot = SnapshotSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(second > first);

        assert!(slot.publish(second, report("second")));
        assert!(!slot.publish(first, report("first")));

        let held = slot.current().unwrap();
        assert_eq!(held.seq, second);
        assert_eq!(held.report.nz.fallback_reason.as_deref(), Some("second"));
    }

    #[test]
    fn newer_result_replaces_older() {
        let slot = SnapshotSlot::new();
        assert!(slot.current().is_none());

        let a = slot.begin();
        assert!(slot.in_flight());
        assert!(slot.publish(a, report("a")));
        assert!(!slot.in_flight());

        let b = slot.begin();
        assert!(slot.publish(b, report("b")));
        assert_eq!(slot.current().unwrap().seq, b);
        assert!(!slot.publish(b, report("again")));
    }

    #[test]
    fn concurrent_publishers_keep_the_highest_ticket() {
        let slot = Arc::new(SnapshotSlot::new());
        let tickets: Vec<u64> = (0..8).map(|_| slot.begin()).collect();
        let max = *tickets.iter().max().unwrap();

        let handles: Vec<_> = tickets
            .into_iter()
            .rev()
            .map(|t| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || slot.publish(t, report(&t.to_string())))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(slot.current().unwrap().seq, max);
    }
}
