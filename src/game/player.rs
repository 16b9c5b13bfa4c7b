use super::mode::Mode;
use super::party::Party;
use crate::error::GameError;
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, stable player identifier supplied by the lobby.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A game player.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub executed: bool,
    pub investigated: bool,
    pub not_hitler: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            executed: false,
            investigated: false,
            not_hitler: false,
        }
    }

    pub fn alive(&self) -> bool {
        !self.executed
    }
}

/// A secret role card.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Liberal,
    Fascist,
    Communist,
    Hitler,
    Anarchist,
    Capitalist,
    Monarchist,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Liberal,
        Role::Fascist,
        Role::Communist,
        Role::Hitler,
        Role::Anarchist,
        Role::Capitalist,
        Role::Monarchist,
    ];

    pub fn party(self) -> Party {
        match self {
            Role::Liberal | Role::Capitalist => Party::Liberal,
            Role::Fascist | Role::Hitler | Role::Monarchist => Party::Fascist,
            Role::Communist | Role::Anarchist => Party::Communist,
        }
    }
}

/// Builds the role multiset for the mode and deals it out uniformly at random;
/// the `i`th role belongs to the `i`th player.
pub fn assign_roles(num_players: usize, mode: Mode, rng: &mut impl Rng) -> Result<Vec<Role>, GameError> {
    let table = mode.role_table(num_players)?;
    let mut roles = table.roles();
    if roles.len() != num_players {
        return Err(GameError::RoleTableMismatch {
            mode: mode.name(),
            players: num_players,
            roles: roles.len(),
        });
    }
    roles.shuffle(rng);
    Ok(roles)
}
