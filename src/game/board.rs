use super::mode::Mode;
use super::party::{Party, PolicyKind};
use std::collections::BTreeMap;

/// The enacted policies and the executive power slots already used on each track.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pub(super) enacted: BTreeMap<PolicyKind, usize>,
    pub(super) bonuses_used: BTreeMap<PolicyKind, Vec<bool>>,
}

impl Board {
    /// Creates an empty board with one slot per position on each of the mode's tracks.
    pub fn new(mode: Mode) -> Self {
        let enacted = PolicyKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        let bonuses_used = PolicyKind::ALL
            .iter()
            .map(|kind| (*kind, mode.track_length(*kind)))
            .filter(|(_, len)| *len > 0)
            .map(|(kind, len)| (kind, vec![false; len]))
            .collect();
        Self { enacted, bonuses_used }
    }

    /// The number of enacted policies of the given kind.
    pub fn enacted(&self, kind: PolicyKind) -> usize {
        self.enacted.get(&kind).copied().unwrap_or(0)
    }

    /// The number of enacted policies of every kind.
    pub fn total_enacted(&self) -> usize {
        self.enacted.values().sum()
    }

    /// Plays a policy, returning how many of its kind are now enacted.
    pub fn play(&mut self, kind: PolicyKind) -> usize {
        let count = self.enacted.entry(kind).or_insert(0);
        *count += 1;
        *count
    }

    /// Marks the given track position as used. Returns `true` only the first time a slot is claimed.
    pub fn claim_slot(&mut self, kind: PolicyKind, position: usize) -> bool {
        let Some(slot) = position
            .checked_sub(1)
            .and_then(|idx| self.bonuses_used.get_mut(&kind).and_then(|slots| slots.get_mut(idx)))
        else {
            return false;
        };
        !std::mem::replace(slot, true)
    }

    /// Checks whether any party has completed their policy track, in a fixed order.
    pub fn check_tracks(&self, mode: Mode) -> Option<Party> {
        [PolicyKind::Liberal, PolicyKind::Fascist, PolicyKind::Communist]
            .into_iter()
            .find(|kind| {
                let len = mode.track_length(*kind);
                len > 0 && self.enacted(*kind) >= len
            })
            .and_then(PolicyKind::party)
    }

    /// Checks whether veto power is unlocked.
    pub fn veto_unlocked(&self) -> bool {
        self.enacted(PolicyKind::Fascist) >= super::mode::VETO_THRESHOLD
    }
}
