//! Sequencing of species lookups per roster slot
//!
//! A species name can be edited again before the lookup for the previous
//! name answers. Each lookup is tagged with an increasing sequence number
//! and only the answer to the most recently issued lookup for a slot is
//! accepted.

use std::collections::HashMap;

use crate::roster::SlotId;

/// A pending species lookup for one roster slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub slot: SlotId,
    pub seq: u64,
    /// Species name the lookup was issued for
    pub species: String,
}

#[derive(Debug, Default)]
pub struct LookupTracker {
    next_seq: u64,
    latest: HashMap<SlotId, u64>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding any earlier ticket for the same slot
    pub fn issue(&mut self, slot: SlotId, species: impl Into<String>) -> LookupTicket {
        self.next_seq += 1;
        self.latest.insert(slot, self.next_seq);

        LookupTicket {
            slot,
            seq: self.next_seq,
            species: species.into(),
        }
    }

    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.seq)
    }

    /// Consume the ticket. Returns `false` for a superseded ticket, whose
    /// answer must be discarded.
    pub fn settle(&mut self, ticket: &LookupTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.latest.remove(&ticket.slot);
        true
    }

    /// Drop whatever lookup is outstanding for a slot
    pub fn forget(&mut self, slot: SlotId) {
        self.latest.remove(&slot);
    }

    pub fn pending(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PokemonSet, Roster};

    fn two_slots() -> (SlotId, SlotId) {
        let mut roster = Roster::new();
        let a = roster.add(PokemonSet::new("A")).unwrap();
        let b = roster.add(PokemonSet::new("B")).unwrap();
        (a, b)
    }

    #[test]
    fn test_latest_ticket_wins() {
        let (slot, _) = two_slots();
        let mut tracker = LookupTracker::new();

        let first = tracker.issue(slot, "Pikachu");
        let second = tracker.issue(slot, "Raichu");

        // the older answer arrives last but is still rejected
        assert!(tracker.settle(&second));
        assert!(!tracker.settle(&first));
    }

    #[test]
    fn test_stale_answer_before_fresh_one() {
        let (slot, _) = two_slots();
        let mut tracker = LookupTracker::new();

        let first = tracker.issue(slot, "Pikachu");
        let second = tracker.issue(slot, "Raichu");

        assert!(!tracker.settle(&first));
        assert!(tracker.settle(&second));
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_slots_are_independent() {
        let (a, b) = two_slots();
        let mut tracker = LookupTracker::new();

        let for_a = tracker.issue(a, "Pikachu");
        let for_b = tracker.issue(b, "Eevee");

        assert!(tracker.settle(&for_a));
        assert!(tracker.settle(&for_b));
    }

    #[test]
    fn test_forget() {
        let (a, _) = two_slots();
        let mut tracker = LookupTracker::new();

        let ticket = tracker.issue(a, "Pikachu");
        tracker.forget(a);
        assert!(!tracker.is_current(&ticket));
        assert!(!tracker.settle(&ticket));
    }

    #[test]
    fn test_settle_is_single_use() {
        let (a, _) = two_slots();
        let mut tracker = LookupTracker::new();

        let ticket = tracker.issue(a, "Pikachu");
        assert!(tracker.settle(&ticket));
        assert!(!tracker.settle(&ticket));
    }
}
