//! Last-request-wins ordering for overlapping refreshes.
//!
//! Each refresh takes a ticket before it is sent. When responses come back
//! out of order, only a response whose ticket is newer than the last one
//! applied is kept; arrival order does not matter.

/// Sequence number handed out per refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefreshSequencer {
    issued: u64,
    applied: Option<u64>,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Record `ticket` as applied if it is newer than the last applied one.
    /// Returns false for stale responses, which the caller must drop.
    pub fn accept(&mut self, ticket: RefreshTicket) -> bool {
        match self.applied {
            Some(last) if ticket.0 <= last => false,
            _ => {
                self.applied = Some(ticket.0);
                true
            }
        }
    }

    pub fn last_applied(&self) -> Option<RefreshTicket> {
        self.applied.map(RefreshTicket)
    }

    /// Requests issued but not yet superseded by an applied response.
    pub fn outstanding(&self) -> u64 {
        self.issued - self.applied.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_responses_all_apply() {
        let mut seq = RefreshSequencer::new();
        let a = seq.issue();
        assert!(seq.accept(a));
        let b = seq.issue();
        assert!(seq.accept(b));
        assert_eq!(seq.last_applied(), Some(b));
    }

    #[test]
    fn stale_response_discarded() {
        let mut seq = RefreshSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert_eq!(seq.outstanding(), 2);
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert_eq!(seq.last_applied(), Some(second));
        assert_eq!(seq.outstanding(), 0);
    }

    #[test]
    fn duplicate_delivery_rejected() {
        let mut seq = RefreshSequencer::new();
        let t = seq.issue();
        assert!(seq.accept(t));
        assert!(!seq.accept(t));
    }
}
