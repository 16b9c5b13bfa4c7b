use super::event::PublicEvent;
use super::mode::HITLER_DANGER_THRESHOLD;
use super::party::{Party, PolicyKind};
use super::player::Role;
use super::{Game, Mode, Phase, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Hitler was elected chancellor after the danger threshold.
    HitlerChancellor,
    /// The liberals completed their policy track.
    LiberalPolicyTrack,
    /// The fascists completed their policy track.
    FascistPolicyTrack,
    /// The communists completed their policy track.
    CommunistPolicyTrack,
    /// Hitler was executed.
    HitlerExecuted,
}

impl WinCondition {
    /// The factions credited with the win. Executing Hitler is a win for everyone opposed to the fascists.
    pub fn winners(self, mode: Mode) -> Vec<Party> {
        match self {
            WinCondition::HitlerChancellor | WinCondition::FascistPolicyTrack => vec![Party::Fascist],
            WinCondition::LiberalPolicyTrack => vec![Party::Liberal],
            WinCondition::CommunistPolicyTrack => vec![Party::Communist],
            WinCondition::HitlerExecuted => match mode {
                Mode::Standard => vec![Party::Liberal],
                Mode::Extended => vec![Party::Liberal, Party::Communist],
            },
        }
    }
}

/// The kind of step that just happened, which decides the conditions worth checking.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Checkpoint {
    /// A chancellor was just elected.
    Election,
    /// A policy was placed on the board, by a government or by chaos.
    Enactment,
    /// A player was executed.
    Execution,
}

/// Checks every win condition in a fixed order; the first one satisfied wins.
pub fn evaluate(game: &Game, checkpoint: Checkpoint) -> Option<WinCondition> {
    if checkpoint == Checkpoint::Election && hitler_elected(game) {
        return Some(WinCondition::HitlerChancellor);
    }

    if let Some(party) = game.board.check_tracks(game.mode) {
        return Some(match party {
            Party::Liberal => WinCondition::LiberalPolicyTrack,
            Party::Fascist => WinCondition::FascistPolicyTrack,
            Party::Communist => WinCondition::CommunistPolicyTrack,
        });
    }

    if hitler_executed(game) {
        return Some(WinCondition::HitlerExecuted);
    }

    None
}

fn hitler_elected(game: &Game) -> bool {
    let Some(chancellor) = game.chancellor else {
        return false;
    };
    game.board.enacted(PolicyKind::Fascist) >= HITLER_DANGER_THRESHOLD && game.roles[chancellor] == Role::Hitler
}

fn hitler_executed(game: &Game) -> bool {
    game.players
        .iter()
        .zip(&game.roles)
        .any(|(player, role)| *role == Role::Hitler && player.executed)
}

impl Game {
    /// Ends the game if a win condition holds, returning whether it did.
    pub(super) fn check_game_over(&mut self, checkpoint: Checkpoint) -> bool {
        let Some(condition) = evaluate(self, checkpoint) else {
            return false;
        };
        self.phase = Phase::Finished;
        self.outcome = Some(condition);
        self.pending_action = None;
        self.emit(PublicEvent::GameOver { condition, winners: condition.winners(self.mode) });
        log::info!("Game {} finished: {:?}", self.id, condition);
        true
    }

    /// Returns whether a particular player has won.
    pub fn player_has_won(&self, player: &PlayerId) -> bool {
        let (Some(outcome), Ok(idx)) = (self.outcome, self.find_player(player)) else {
            return false;
        };
        outcome.winners(self.mode).contains(&self.roles[idx].party())
    }
}
