//! What a transition reports back for delivery. Broadcast events carry only
//! public information; roles, hands and peeked cards travel as private events.

use super::executive::ExecutiveAction;
use super::party::{Party, PolicyKind};
use super::player::{PlayerId, Role};
use super::victory::WinCondition;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PublicEvent {
    RolesAssigned,
    DeckInitialized {
        cards: usize,
    },
    NominationStarted {
        president: PlayerId,
        eligible: Vec<PlayerId>,
    },
    ChancellorNominated {
        president: PlayerId,
        candidate: PlayerId,
    },
    /// A player voted; the ballot itself stays hidden until the tally.
    VoteCast {
        player: PlayerId,
    },
    ElectionResult {
        votes: BTreeMap<PlayerId, bool>,
        passed: bool,
    },
    ElectionTrackerAdvanced {
        tracker: usize,
    },
    ChaosEnacted {
        policy: PolicyKind,
    },
    GovernmentFormed {
        president: PlayerId,
        chancellor: PlayerId,
    },
    ConfirmedNotHitler {
        player: PlayerId,
    },
    PresidentDiscarded,
    VetoRequested {
        chancellor: PlayerId,
    },
    VetoResolved {
        agreed: bool,
    },
    PolicyEnacted {
        policy: PolicyKind,
        count: usize,
        chaos: bool,
    },
    ExecutivePowerGranted {
        action: ExecutiveAction,
        president: PlayerId,
    },
    PlayerInvestigated {
        president: PlayerId,
        target: PlayerId,
    },
    SpecialElectionCalled {
        president: PlayerId,
        #[serde(rename = "nextPresident")]
        next_president: PlayerId,
    },
    PoliciesPeeked {
        president: PlayerId,
    },
    PropagandaUsed {
        president: PlayerId,
        discarded: bool,
    },
    PlayerExecuted {
        player: PlayerId,
    },
    GameOver {
        condition: WinCondition,
        winners: Vec<Party>,
    },
}

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PrivateEvent {
    /// The recipient's role, and the roles their role lets them know.
    RoleAssigned {
        role: Role,
        allies: BTreeMap<PlayerId, Role>,
    },
    PolicyHand {
        policies: Vec<PolicyKind>,
        #[serde(rename = "canVeto")]
        can_veto: bool,
    },
    PeekedPolicies {
        policies: Vec<PolicyKind>,
    },
    InvestigationResult {
        target: PlayerId,
        party: Party,
    },
}

/// An event and who may see it.
#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    Broadcast(PublicEvent),
    Private { recipient: PlayerId, event: PrivateEvent },
}

impl Event {
    /// The single player this event is addressed to, if it is private.
    pub fn recipient(&self) -> Option<&PlayerId> {
        match self {
            Event::Broadcast(_) => None,
            Event::Private { recipient, .. } => Some(recipient),
        }
    }

    pub fn is_private(&self) -> bool {
        self.recipient().is_some()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let result = match self {
            Event::Broadcast(event) => serde_json::to_value(event),
            Event::Private { event, .. } => serde_json::to_value(event),
        };
        result.unwrap_or(serde_json::Value::Null)
    }
}
