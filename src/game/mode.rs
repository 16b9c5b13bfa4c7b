//! Per-mode rule tables: role counts, deck composition, track lengths and
//! the executive power attached to each track position.

use super::executive::ExecutiveAction;
use super::party::PolicyKind;
use super::player::Role;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::repeat;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 15;

/// Failed votes in a row that force a chaos enactment.
pub const ELECTION_TRACKER_LIMIT: usize = 3;

/// Fascist enactments after which electing Hitler as chancellor ends the game.
pub const HITLER_DANGER_THRESHOLD: usize = 3;

/// Fascist enactments after which the chancellor may call for a veto.
pub const VETO_THRESHOLD: usize = 5;

/// The supported game variants.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The base game: liberals, fascists and Hitler.
    #[serde(alias = "Normal")]
    Standard,
    /// The XL variant with communists and the special roles.
    #[serde(alias = "XL")]
    Extended,
}

/// The number of players holding each role.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RoleTable {
    pub liberals: usize,
    pub fascists: usize,
    pub communists: usize,
    pub hitler: usize,
    pub anarchist: usize,
    pub capitalist: usize,
    pub monarchist: usize,
}

impl RoleTable {
    pub fn total(&self) -> usize {
        self.liberals
            + self.fascists
            + self.communists
            + self.hitler
            + self.anarchist
            + self.capitalist
            + self.monarchist
    }

    pub fn count(&self, role: Role) -> usize {
        match role {
            Role::Liberal => self.liberals,
            Role::Fascist => self.fascists,
            Role::Communist => self.communists,
            Role::Hitler => self.hitler,
            Role::Anarchist => self.anarchist,
            Role::Capitalist => self.capitalist,
            Role::Monarchist => self.monarchist,
        }
    }

    /// Expands the table into a list of role labels.
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .flat_map(|role| repeat(*role).take(self.count(*role)))
            .collect()
    }
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Extended => "extended",
        }
    }

    /// Checks that the population is supported by this mode.
    pub fn check_player_count(self, num_players: usize) -> Result<(), GameError> {
        if (MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            Ok(())
        } else {
            Err(GameError::InvalidPlayerCount(num_players))
        }
    }

    /// Gets the role table for the given number of players.
    pub fn role_table(self, num_players: usize) -> Result<RoleTable, GameError> {
        self.check_player_count(num_players)?;
        let n = num_players;
        let mut table = match self {
            Mode::Standard => RoleTable {
                fascists: ((n - 1) / 2 - 1).max(1),
                hitler: 1,
                ..Default::default()
            },
            Mode::Extended => RoleTable {
                fascists: ((n - 3) / 3).max(1),
                communists: (n / 4).max(1),
                hitler: 1,
                anarchist: usize::from(n > 9),
                capitalist: usize::from(n > 10),
                monarchist: usize::from(n > 12),
                ..Default::default()
            },
        };
        table.liberals = n.checked_sub(table.total()).ok_or(GameError::RoleTableMismatch {
            mode: self.name(),
            players: n,
            roles: table.total(),
        })?;
        Ok(table)
    }

    /// The number of cards of each kind in circulation for a game of this size.
    pub fn deck_composition(self, num_players: usize) -> Vec<(PolicyKind, usize)> {
        use PolicyKind::*;
        match self {
            Mode::Standard => vec![(Liberal, 6), (Fascist, 11)],
            Mode::Extended if num_players <= 9 => vec![(Liberal, 6), (Fascist, 9), (Communist, 8)],
            Mode::Extended => vec![
                (Liberal, 6),
                (Fascist, 9),
                (Communist, 7),
                (Anarchist, 2),
                (AntiFascist, 1),
                (AntiCommunist, 1),
            ],
        }
    }

    /// The total number of policy cards in a game of this size.
    pub fn total_cards(self, num_players: usize) -> usize {
        self.deck_composition(num_players).iter().map(|(_, n)| n).sum()
    }

    /// The length of the track for the given policy kind; zero if it has no track in this mode.
    pub fn track_length(self, kind: PolicyKind) -> usize {
        match (self, kind) {
            (_, PolicyKind::Liberal) => 5,
            (_, PolicyKind::Fascist) => 6,
            (Mode::Extended, PolicyKind::Communist) => 6,
            _ => 0,
        }
    }

    /// Gets the executive power unlocked by enacting the `position`th (1-based) policy of a kind.
    pub fn executive_power(self, kind: PolicyKind, position: usize, num_players: usize) -> Option<ExecutiveAction> {
        use ExecutiveAction::*;
        match (self, kind) {
            (_, PolicyKind::Fascist) => match (num_players, position) {
                (9..=15, 1) => Some(InvestigateLoyalty),
                (7..=15, 2) => Some(InvestigateLoyalty),
                (5..=6, 3) => Some(PolicyPeek),
                (7..=15, 3) => Some(SpecialElection),
                (_, 4) => Some(Execution),
                (_, 5) => Some(Execution),
                _ => None,
            },
            (Mode::Extended, PolicyKind::Communist) => match position {
                1 => Some(InvestigateLoyalty),
                2 => Some(Propaganda),
                3 => Some(PolicyPeek),
                4 => Some(SpecialElection),
                5 => Some(Execution),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether this mode grants a one-time execution for the first anarchist policy.
    pub fn has_anarchy_execution(self) -> bool {
        self == Mode::Extended
    }

    /// Whether the given action can ever be granted in this mode.
    pub fn supports(self, action: ExecutiveAction) -> bool {
        match action {
            ExecutiveAction::Propaganda => self == Mode::Extended,
            _ => true,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
