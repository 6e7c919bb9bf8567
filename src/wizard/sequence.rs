//! Ordering guard for asynchronous responses of one action kind

use log::debug;

/// Monotonic tag issued when a request starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

impl RequestTag {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A response is applied only if its tag is newer than the last one applied.
/// `invalidate` makes every outstanding tag stale.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    next: u64,
    applied: Option<u64>,
    floor: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTag {
        self.next += 1;
        RequestTag(self.next)
    }

    /// Record `tag` as applied if it is still current; false means discard
    pub fn accept(&mut self, tag: RequestTag) -> bool {
        let stale = tag.0 <= self.floor || self.applied.is_some_and(|applied| tag.0 <= applied);
        if stale {
            debug!("Discarding stale response #{}", tag.0);
            return false;
        }
        self.applied = Some(tag.0);
        true
    }

    /// Whether `tag` is the most recently issued one
    pub fn is_latest(&self, tag: RequestTag) -> bool {
        tag.0 == self.next
    }

    pub fn invalidate(&mut self) {
        self.floor = self.next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_completion_discards_older() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(sequencer.accept(second));
        assert!(!sequencer.accept(first));
    }

    #[test]
    fn test_in_order_completion_applies_both() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(sequencer.accept(first));
        assert!(sequencer.accept(second));
        assert!(!sequencer.accept(second));
    }

    #[test]
    fn test_invalidate_drops_outstanding() {
        let mut sequencer = RequestSequencer::new();
        let outstanding = sequencer.issue();
        sequencer.invalidate();

        assert!(!sequencer.accept(outstanding));
        let fresh = sequencer.issue();
        assert!(sequencer.is_latest(fresh));
        assert!(sequencer.accept(fresh));
    }
}
