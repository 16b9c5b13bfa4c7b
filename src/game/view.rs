//! Filtered JSON views of a game: one for the shared board, one per player.

use super::party::PolicyKind;
use super::player::{PlayerId, Role};
use super::{Game, Phase};
use crate::error::GameError;
use serde_json::{json, Value};
use std::collections::BTreeMap;

impl Game {
    /// The state everyone may see.
    pub fn get_board_json(&self) -> Value {
        let enacted: BTreeMap<PolicyKind, usize> = PolicyKind::ALL
            .iter()
            .map(|kind| (*kind, self.board.enacted(*kind)))
            .filter(|(kind, count)| *count > 0 || self.mode.track_length(*kind) > 0)
            .collect();
        let player_id = |idx: usize| self.players[idx].id.clone();

        json!({
            "gameId": self.id,
            "mode": self.mode,
            "phase": self.phase,
            "players": self.get_players_json(None),
            "president": (self.phase != Phase::Setup).then(|| player_id(self.president)),
            "chancellorCandidate": self.chancellor_candidate.map(player_id),
            "chancellor": self.chancellor.map(player_id),
            "votesCast": self.votes.votes().iter().enumerate()
                .filter(|(_, vote)| vote.is_some())
                .map(|(idx, _)| player_id(idx))
                .collect::<Vec<_>>(),
            "electionTracker": self.election_tracker,
            "enacted": enacted,
            "drawPile": self.deck.count(),
            "discardPile": self.deck.discard_count(),
            "lastPresident": self.last_government.map(|g| player_id(g.president)),
            "lastChancellor": self.last_government.map(|g| player_id(g.chancellor)),
            "pendingAction": self.pending_action,
            "vetoUnlocked": self.board.veto_unlocked(),
            "outcome": self.get_outcome_json(),
        })
    }

    /// The state a single player may see: the board plus their own secrets.
    pub fn get_player_json(&self, player: &PlayerId) -> Result<Value, GameError> {
        let idx = self.find_player(player)?;
        let mut view = self.get_board_json();
        view["players"] = self.get_players_json(Some(idx));
        view["playerId"] = json!(player);
        view["role"] = json!(self.roles.get(idx));
        view["isDead"] = json!(!self.players[idx].alive());
        view["hand"] = json!(self.hand_holder().filter(|holder| *holder == idx).map(|_| &self.hand));
        view["won"] = json!(self.outcome.map(|_| self.player_has_won(player)));
        Ok(view)
    }

    pub fn get_outcome_json(&self) -> Value {
        let Some(outcome) = self.outcome else {
            return json!({ "finished": false });
        };
        json!({
            "finished": true,
            "outcome": outcome,
            "winners": outcome.winners(self.mode)
        })
    }

    fn get_players_json(&self, viewer: Option<usize>) -> Value {
        self.players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let view_role = match viewer {
                    Some(i) => i == index || self.can_view_role(i, index),
                    None => false,
                };
                json!({
                    "id": player.id,
                    "isDead": !player.alive(),
                    "isConfirmedNotHitler": player.not_hitler,
                    "hasBeenInvestigated": player.investigated,
                    "role": if view_role { self.roles.get(index).copied() } else { None }
                })
            })
            .collect()
    }

    /// The player currently holding the policy hand.
    fn hand_holder(&self) -> Option<usize> {
        match self.phase {
            Phase::LegislativePresident => Some(self.president),
            Phase::LegislativeChancellor | Phase::VetoRequested => self.chancellor,
            _ => None,
        }
    }

    /// Whether one player's role reveals another player's role to them.
    pub(super) fn can_view_role(&self, player_idx: usize, other_idx: usize) -> bool {
        use Role::*;
        if player_idx == other_idx {
            return false;
        }
        let (Some(player), Some(other)) = (self.roles.get(player_idx), self.roles.get(other_idx)) else {
            return false;
        };

        match (player, other) {
            (Fascist, Fascist) => true,
            (Fascist, Hitler) => true,
            (Fascist, Monarchist) => true,
            (Hitler, Fascist) => self.num_ordinary_fascists() < 2,
            (Communist, Communist) => true,
            (Communist, Anarchist) => true,
            _ => false,
        }
    }

    /// The roles a player learns at the start of the game.
    pub(super) fn allies(&self, player_idx: usize) -> BTreeMap<PlayerId, Role> {
        (0..self.num_players())
            .filter(|other| self.can_view_role(player_idx, *other))
            .map(|other| (self.players[other].id.clone(), self.roles[other]))
            .collect()
    }
}
