use serde::{Deserialize, Serialize};
use std::fmt;

/// The factions a player can belong to.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Liberal,
    Fascist,
    Communist,
}

/// The kinds of policy card found in the deck.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Liberal,
    Fascist,
    Communist,
    Anarchist,
    AntiFascist,
    AntiCommunist,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Liberal,
        PolicyKind::Fascist,
        PolicyKind::Communist,
        PolicyKind::Anarchist,
        PolicyKind::AntiFascist,
        PolicyKind::AntiCommunist,
    ];

    /// The party whose track this policy is placed on, if it has one.
    pub fn party(self) -> Option<Party> {
        match self {
            PolicyKind::Liberal => Some(Party::Liberal),
            PolicyKind::Fascist => Some(Party::Fascist),
            PolicyKind::Communist => Some(Party::Communist),
            PolicyKind::Anarchist | PolicyKind::AntiFascist | PolicyKind::AntiCommunist => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Liberal => "liberal",
            PolicyKind::Fascist => "fascist",
            PolicyKind::Communist => "communist",
            PolicyKind::Anarchist => "anarchist",
            PolicyKind::AntiFascist => "anti_fascist",
            PolicyKind::AntiCommunist => "anti_communist",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
