//! The persisted form of a [Game]: a versioned, flat document with string
//! identifiers, ISO-8601 timestamps and enum labels, plus pure conversions
//! in both directions.

use super::board::Board;
use super::deck::PolicyDeck;
use super::executive::ExecutiveAction;
use super::government::Government;
use super::mode::Mode;
use super::party::PolicyKind;
use super::player::{Player, PlayerId, Role};
use super::victory::WinCondition;
use super::votes::Votes;
use super::{Game, Phase, VetoStatus};
use crate::error::GameError;
use crate::time::{iso8601, parse_iso8601};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct Snapshot {
    pub version: u32,
    pub id: String,
    pub mode: Mode,
    pub revision: u64,
    pub created_at: String,
    pub updated_at: String,
    pub players: Vec<PlayerId>,
    pub roles: BTreeMap<PlayerId, Role>,
    pub policy_deck: Vec<PolicyKind>,
    pub discard_pile: Vec<PolicyKind>,
    pub reshuffles: u32,
    pub enacted_counts: BTreeMap<PolicyKind, usize>,
    pub track_bonuses_used: BTreeMap<PolicyKind, Vec<bool>>,
    pub phase: Phase,
    pub president_index: usize,
    pub rotation_index: usize,
    pub special_president: Option<PlayerId>,
    pub chancellor_candidate: Option<PlayerId>,
    pub chancellor: Option<PlayerId>,
    pub votes: BTreeMap<PlayerId, bool>,
    pub election_tracker: usize,
    pub last_government: Option<GovernmentSnapshot>,
    pub executed_players: Vec<PlayerId>,
    pub investigated_players: Vec<PlayerId>,
    pub confirmed_not_hitler: Vec<PlayerId>,
    pub policies_in_hand: Vec<PolicyKind>,
    pub veto: VetoStatus,
    pub pending_action: Option<ExecutiveAction>,
    pub anarchy_execution_available: bool,
    pub outcome: Option<WinCondition>,
    pub rng: ChaCha8Rng,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct GovernmentSnapshot {
    pub president: PlayerId,
    pub chancellor: PlayerId,
}

impl Game {
    /// Captures the persistent state of the game.
    pub fn serialize(&self) -> Snapshot {
        let id = |idx: usize| self.players[idx].id.clone();
        let ids_where = |f: fn(&Player) -> bool| -> Vec<PlayerId> {
            self.players.iter().filter(|p| f(p)).map(|p| p.id.clone()).collect()
        };

        Snapshot {
            version: SNAPSHOT_VERSION,
            id: self.id.clone(),
            mode: self.mode,
            revision: self.revision,
            created_at: iso8601(self.created_at),
            updated_at: iso8601(self.updated_at),
            players: self.players.iter().map(|p| p.id.clone()).collect(),
            roles: self.roles.iter().enumerate().map(|(idx, role)| (id(idx), *role)).collect(),
            policy_deck: self.deck.deck.clone(),
            discard_pile: self.deck.discard.clone(),
            reshuffles: self.deck.reshuffles,
            enacted_counts: self.board.enacted.clone(),
            track_bonuses_used: self.board.bonuses_used.clone(),
            phase: self.phase,
            president_index: self.president,
            rotation_index: self.rotation,
            special_president: self.special_president.map(id),
            chancellor_candidate: self.chancellor_candidate.map(id),
            chancellor: self.chancellor.map(id),
            votes: self
                .votes
                .votes()
                .iter()
                .enumerate()
                .filter_map(|(idx, vote)| vote.map(|v| (id(idx), v)))
                .collect(),
            election_tracker: self.election_tracker,
            last_government: self.last_government.map(|g| GovernmentSnapshot {
                president: id(g.president),
                chancellor: id(g.chancellor),
            }),
            executed_players: ids_where(|p| p.executed),
            investigated_players: ids_where(|p| p.investigated),
            confirmed_not_hitler: ids_where(|p| p.not_hitler),
            policies_in_hand: self.hand.clone(),
            veto: self.veto,
            pending_action: self.pending_action,
            anarchy_execution_available: self.anarchy_execution_available,
            outcome: self.outcome,
            rng: self.rng.clone(),
        }
    }

    /// Rebuilds a game from a snapshot. Transient state starts out empty.
    pub fn restore(snapshot: Snapshot) -> Result<Self, GameError> {
        let invalid = |msg: &str| GameError::InvalidSnapshot(msg.to_string());

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GameError::InvalidSnapshot(format!("unsupported version {}", snapshot.version)));
        }
        let num_players = snapshot.players.len();
        snapshot.mode.check_player_count(num_players)?;

        let index: BTreeMap<&PlayerId, usize> = snapshot.players.iter().enumerate().map(|(i, id)| (id, i)).collect();
        if index.len() != num_players {
            return Err(invalid("duplicate player ids"));
        }
        let find = |id: &PlayerId| index.get(id).copied().ok_or_else(|| invalid("unknown player id"));
        let find_opt = |id: &Option<PlayerId>| id.as_ref().map(find).transpose();
        let id_set = |ids: &[PlayerId]| -> Result<BTreeSet<usize>, GameError> { ids.iter().map(find).collect() };

        let roles = if snapshot.roles.is_empty() {
            vec![]
        } else {
            if snapshot.roles.len() != num_players {
                return Err(invalid("roles do not cover every player"));
            }
            let table = snapshot.mode.role_table(num_players)?;
            let roles: Vec<Role> = snapshot
                .players
                .iter()
                .map(|id| snapshot.roles.get(id).copied().ok_or_else(|| invalid("player without a role")))
                .collect::<Result<_, _>>()?;
            let mut dealt = roles.clone();
            let mut expected = table.roles();
            dealt.sort();
            expected.sort();
            if dealt != expected {
                return Err(invalid("roles do not match the role table"));
            }
            roles
        };

        if snapshot.president_index >= num_players || snapshot.rotation_index >= num_players {
            return Err(invalid("president index out of range"));
        }

        let mut board = Board::new(snapshot.mode);
        for (kind, count) in &snapshot.enacted_counts {
            board.enacted.insert(*kind, *count);
        }
        for (kind, slots) in &snapshot.track_bonuses_used {
            if slots.len() != snapshot.mode.track_length(*kind) {
                return Err(invalid("track length does not match the mode"));
            }
            board.bonuses_used.insert(*kind, slots.clone());
        }

        let executed = id_set(&snapshot.executed_players)?;
        let investigated = id_set(&snapshot.investigated_players)?;
        let not_hitler = id_set(&snapshot.confirmed_not_hitler)?;
        let players = snapshot
            .players
            .iter()
            .enumerate()
            .map(|(idx, id)| Player {
                id: id.clone(),
                executed: executed.contains(&idx),
                investigated: investigated.contains(&idx),
                not_hitler: not_hitler.contains(&idx),
            })
            .collect();

        let mut ballots = vec![None; num_players];
        for (id, vote) in &snapshot.votes {
            ballots[find(id)?] = Some(*vote);
        }

        let last_government = match &snapshot.last_government {
            Some(g) => Some(Government { president: find(&g.president)?, chancellor: find(&g.chancellor)? }),
            None => None,
        };

        let created_at = parse_iso8601(&snapshot.created_at).map_err(|e| GameError::InvalidSnapshot(e.to_string()))?;
        let updated_at = parse_iso8601(&snapshot.updated_at).map_err(|e| GameError::InvalidSnapshot(e.to_string()))?;

        let game = Game {
            id: snapshot.id.clone(),
            mode: snapshot.mode,
            players,
            roles,
            deck: PolicyDeck {
                deck: snapshot.policy_deck.clone(),
                discard: snapshot.discard_pile.clone(),
                reshuffles: snapshot.reshuffles,
            },
            board,
            phase: snapshot.phase,
            president: snapshot.president_index,
            rotation: snapshot.rotation_index,
            special_president: find_opt(&snapshot.special_president)?,
            chancellor_candidate: find_opt(&snapshot.chancellor_candidate)?,
            chancellor: find_opt(&snapshot.chancellor)?,
            votes: Votes::from_ballots(ballots),
            election_tracker: snapshot.election_tracker,
            last_government,
            hand: snapshot.policies_in_hand.clone(),
            veto: snapshot.veto,
            pending_action: snapshot.pending_action,
            anarchy_execution_available: snapshot.anarchy_execution_available,
            outcome: snapshot.outcome,
            revision: snapshot.revision,
            created_at,
            updated_at,
            rng: snapshot.rng.clone(),
            outbox: vec![],
        };
        log::info!("Game {} restored at revision {}", game.id, game.revision);
        Ok(game)
    }
}
