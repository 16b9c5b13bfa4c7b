//! Executive powers. Which power sits on which track position is configured per
//! mode in [`Mode::executive_power`](super::mode::Mode::executive_power); the
//! effect of each power is a handler looked up by [`power`].

use super::event::{PrivateEvent, PublicEvent};
use super::victory::Checkpoint;
use super::{Event, Game, Phase, PlayerId};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ExecutiveAction {
    /// The president learns the party membership of a player.
    InvestigateLoyalty,
    /// The president chooses the next president; the rotation then resumes from them.
    SpecialElection,
    /// The president looks at the top three cards on the deck.
    PolicyPeek,
    /// The president executes a player.
    Execution,
    /// The president looks at the top card of the deck and may discard it.
    Propaganda,
}

impl ExecutiveAction {
    pub fn label(self) -> &'static str {
        match self {
            ExecutiveAction::InvestigateLoyalty => "investigate_loyalty",
            ExecutiveAction::SpecialElection => "special_election",
            ExecutiveAction::PolicyPeek => "policy_peek",
            ExecutiveAction::Execution => "execution",
            ExecutiveAction::Propaganda => "propaganda",
        }
    }
}

impl fmt::Display for ExecutiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The president's decision when resolving an executive power.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ActionChoice {
    /// Nothing to choose; the president has seen what the power showed them.
    Acknowledge,
    /// The player the power is used on.
    Player(PlayerId),
    /// Whether to discard the card revealed by propaganda.
    Discard(bool),
}

/// The effect of one executive power.
trait Power: Sync {
    /// Called as the power is granted, before the president decides.
    fn begin(&self, _game: &mut Game, _president: usize) -> Result<(), GameError> {
        Ok(())
    }

    /// Applies the president's decision.
    fn resolve(&self, game: &mut Game, president: usize, choice: ActionChoice) -> Result<(), GameError>;
}

struct InvestigatePower;
struct SpecialElectionPower;
struct PolicyPeekPower;
struct ExecutionPower;
struct PropagandaPower;

/// Gets the handler for an executive action.
fn power(action: ExecutiveAction) -> &'static dyn Power {
    match action {
        ExecutiveAction::InvestigateLoyalty => &InvestigatePower,
        ExecutiveAction::SpecialElection => &SpecialElectionPower,
        ExecutiveAction::PolicyPeek => &PolicyPeekPower,
        ExecutiveAction::Execution => &ExecutionPower,
        ExecutiveAction::Propaganda => &PropagandaPower,
    }
}

fn target(choice: ActionChoice) -> Result<PlayerId, GameError> {
    match choice {
        ActionChoice::Player(player) => Ok(player),
        _ => Err(GameError::InvalidChoice),
    }
}

impl Power for InvestigatePower {
    fn resolve(&self, game: &mut Game, president: usize, choice: ActionChoice) -> Result<(), GameError> {
        let target = game.living_target(&target(choice)?)?;
        if game.players[target].investigated {
            return Err(GameError::InvalidPlayerChoice);
        }
        game.players[target].investigated = true;

        let target_id = game.players[target].id.clone();
        let party = game.roles[target].party();
        game.emit(PublicEvent::PlayerInvestigated {
            president: game.players[president].id.clone(),
            target: target_id.clone(),
        });
        game.emit_private(president, PrivateEvent::InvestigationResult { target: target_id, party });
        Ok(())
    }
}

impl Power for SpecialElectionPower {
    fn resolve(&self, game: &mut Game, president: usize, choice: ActionChoice) -> Result<(), GameError> {
        let next = game.living_target(&target(choice)?)?;
        game.special_president = Some(next);
        game.emit(PublicEvent::SpecialElectionCalled {
            president: game.players[president].id.clone(),
            next_president: game.players[next].id.clone(),
        });
        Ok(())
    }
}

impl Power for PolicyPeekPower {
    fn begin(&self, game: &mut Game, president: usize) -> Result<(), GameError> {
        let policies = game.deck.peek(3, &mut game.rng)?;
        game.emit_private(president, PrivateEvent::PeekedPolicies { policies });
        Ok(())
    }

    fn resolve(&self, game: &mut Game, president: usize, choice: ActionChoice) -> Result<(), GameError> {
        if choice != ActionChoice::Acknowledge {
            return Err(GameError::InvalidChoice);
        }
        game.emit(PublicEvent::PoliciesPeeked { president: game.players[president].id.clone() });
        Ok(())
    }
}

impl Power for ExecutionPower {
    fn resolve(&self, game: &mut Game, _president: usize, choice: ActionChoice) -> Result<(), GameError> {
        let target = game.living_target(&target(choice)?)?;
        game.players[target].executed = true;
        game.emit(PublicEvent::PlayerExecuted { player: game.players[target].id.clone() });
        game.check_game_over(Checkpoint::Execution);
        Ok(())
    }
}

impl Power for PropagandaPower {
    fn begin(&self, game: &mut Game, president: usize) -> Result<(), GameError> {
        let policies = game.deck.peek(1, &mut game.rng)?;
        game.emit_private(president, PrivateEvent::PeekedPolicies { policies });
        Ok(())
    }

    fn resolve(&self, game: &mut Game, president: usize, choice: ActionChoice) -> Result<(), GameError> {
        let ActionChoice::Discard(discard) = choice else {
            return Err(GameError::InvalidChoice);
        };
        if discard {
            let top = game.deck.draw(1, &mut game.rng)?;
            game.deck.discard(top);
        }
        game.emit(PublicEvent::PropagandaUsed {
            president: game.players[president].id.clone(),
            discarded: discard,
        });
        Ok(())
    }
}

impl Game {
    /// Grants the sitting president an executive power.
    pub(super) fn begin_executive_action(&mut self, action: ExecutiveAction) -> Result<(), GameError> {
        self.check_supported(action)?;
        let president = self.president;
        self.pending_action = Some(action);
        self.phase = Phase::ExecutiveAction;
        self.emit(PublicEvent::ExecutivePowerGranted {
            action,
            president: self.players[president].id.clone(),
        });
        power(action).begin(self, president)
    }

    /// Called when the president uses the executive power they were granted.
    pub fn resolve_executive_action(&mut self, actor: &PlayerId, choice: ActionChoice) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::ExecutiveAction)?;
            let president = game.expect_president(actor)?;
            let action = game.pending_action.ok_or(GameError::NoPendingDecision)?;
            game.check_supported(action)?;

            power(action).resolve(game, president, choice)?;
            game.pending_action = None;
            if game.phase != Phase::Finished {
                game.start_nomination();
            }
            Ok(())
        })
    }

    /// The executive power awaiting the president, if any.
    pub fn pending_action(&self) -> Option<ExecutiveAction> {
        self.pending_action
    }

    fn check_supported(&self, action: ExecutiveAction) -> Result<(), GameError> {
        if self.mode.supports(action) {
            Ok(())
        } else {
            Err(GameError::UnsupportedAction { mode: self.mode.name(), action: action.label() })
        }
    }
}
