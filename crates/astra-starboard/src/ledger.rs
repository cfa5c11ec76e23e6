//! At-most-once forwarding record.
//!
//! Keyed by source message id. A key is first *claimed* (in flight) and only
//! becomes a forward record once the starboard post was sent. A claim that is
//! dropped without being committed is released again, so a failed send leaves
//! no trace.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    InFlight,
    Forwarded(u64),
}

/// Process-lifetime map from source message id to starboard message id.
/// Never pruned.
#[derive(Debug, Default)]
pub struct ForwardLedger {
    entries: DashMap<u64, Slot>,
}

impl ForwardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a forward of `message_id` has been recorded.
    pub fn has_forwarded(&self, message_id: u64) -> bool {
        self.forwarded_id(message_id).is_some()
    }

    /// The starboard message created for `message_id`, if any.
    pub fn forwarded_id(&self, message_id: u64) -> Option<u64> {
        match self.entries.get(&message_id).map(|e| *e.value()) {
            Some(Slot::Forwarded(id)) => Some(id),
            _ => None,
        }
    }

    /// Record a completed forward. The first record for a message wins.
    pub fn record_forward(&self, message_id: u64, forwarded_id: u64) {
        match self.entries.entry(message_id) {
            Entry::Occupied(mut slot) => match *slot.get() {
                Slot::InFlight => {
                    slot.insert(Slot::Forwarded(forwarded_id));
                }
                Slot::Forwarded(existing) => {
                    warn!(
                        message_id,
                        existing, forwarded_id, "forward already recorded, keeping the first"
                    );
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(Slot::Forwarded(forwarded_id));
            }
        }
    }

    /// Atomically mark `message_id` as in flight.
    ///
    /// Returns `None` when the message is already forwarded or another task
    /// holds the claim.
    pub fn try_claim(&self, message_id: u64) -> Option<ForwardClaim<'_>> {
        match self.entries.entry(message_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Slot::InFlight);
                Some(ForwardClaim {
                    ledger: self,
                    message_id,
                    committed: false,
                })
            }
        }
    }

    /// Number of recorded forwards (claims in flight are not counted).
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.value(), Slot::Forwarded(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive right to forward one message.
#[derive(Debug)]
pub struct ForwardClaim<'a> {
    ledger: &'a ForwardLedger,
    message_id: u64,
    committed: bool,
}

impl ForwardClaim<'_> {
    /// Turn the claim into a permanent record. Call only after the send succeeded.
    pub fn commit(mut self, forwarded_id: u64) {
        self.ledger.record_forward(self.message_id, forwarded_id);
        self.committed = true;
    }
}

impl Drop for ForwardClaim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger
                .entries
                .remove_if(&self.message_id, |_, slot| *slot == Slot::InFlight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ledger_has_nothing() {
        let ledger = ForwardLedger::new();
        assert!(!ledger.has_forwarded(1));
        assert!(ledger.is_empty());
    }

    #[test]
    fn record_then_lookup() {
        let ledger = ForwardLedger::new();
        ledger.record_forward(1, 100);
        assert!(ledger.has_forwarded(1));
        assert_eq!(ledger.forwarded_id(1), Some(100));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn first_record_wins() {
        let ledger = ForwardLedger::new();
        ledger.record_forward(1, 100);
        ledger.record_forward(1, 200);
        assert_eq!(ledger.forwarded_id(1), Some(100));
    }

    #[test]
    fn second_claim_is_refused_while_first_is_held() {
        let ledger = ForwardLedger::new();
        let claim = ledger.try_claim(7).expect("first claim");
        assert!(ledger.try_claim(7).is_none());
        // In flight is not forwarded yet.
        assert!(!ledger.has_forwarded(7));
        drop(claim);
    }

    #[test]
    fn committed_claim_becomes_record() {
        let ledger = ForwardLedger::new();
        let claim = ledger.try_claim(7).expect("claim");
        claim.commit(70);
        assert_eq!(ledger.forwarded_id(7), Some(70));
        assert!(ledger.try_claim(7).is_none());
    }

    #[test]
    fn dropped_claim_is_released() {
        let ledger = ForwardLedger::new();
        {
            let _claim = ledger.try_claim(7).expect("claim");
        }
        assert!(ledger.is_empty());
        assert!(ledger.try_claim(7).is_some());
    }

    #[test]
    fn claims_on_other_messages_are_independent() {
        let ledger = ForwardLedger::new();
        let _a = ledger.try_claim(1).expect("a");
        assert!(ledger.try_claim(2).is_some());
    }
}
