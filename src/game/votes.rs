use crate::error::GameError;

use super::player::Player;

/// Tracks the ballot of each player for the current nomination.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Votes {
    votes: Vec<Option<bool>>,
}

impl Votes {
    /// Creates a new `Votes` with no ballots cast.
    pub fn new(num_players: usize) -> Self {
        Self { votes: vec![None; num_players] }
    }

    /// Rebuilds a `Votes` from per-player ballots.
    pub fn from_ballots(votes: Vec<Option<bool>>) -> Self {
        Self { votes }
    }

    /// Returns whether the given player has cast their vote.
    pub fn has_cast(&self, player_idx: usize) -> bool {
        self.votes[player_idx].is_some()
    }

    /// Records the vote of a player. A ballot cannot be changed once cast.
    pub fn vote(&mut self, player_idx: usize, vote: bool) -> Result<(), GameError> {
        let slot = self.votes.get_mut(player_idx).ok_or(GameError::PlayerNotFound)?;
        if slot.is_some() {
            return Err(GameError::AlreadyVoted);
        }
        *slot = Some(vote);
        Ok(())
    }

    /// Returns whether every living player has voted.
    pub fn is_complete(&self, players: &[Player]) -> bool {
        players
            .iter()
            .enumerate()
            .all(|(idx, player)| !player.alive() || self.has_cast(idx))
    }

    /// A strict majority of the ballots cast must be in favour; a tie fails.
    pub fn passed(&self) -> bool {
        let yes = self.votes.iter().filter(|v| **v == Some(true)).count();
        let no = self.votes.iter().filter(|v| **v == Some(false)).count();
        yes > no
    }

    /// Gets the vote of each player.
    pub fn votes(&self) -> &[Option<bool>] {
        &self.votes
    }
}
