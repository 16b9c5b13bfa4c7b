use super::event::{PrivateEvent, PublicEvent};
use super::executive::ExecutiveAction;
use super::party::PolicyKind;
use super::victory::Checkpoint;
use super::{Event, Game, Phase, PlayerId, VetoStatus};
use crate::error::GameError;

impl Game {
    /// Called when the president discards one of the three policies they drew.
    pub fn president_discard(&mut self, actor: &PlayerId, card_idx: usize) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            match game.phase {
                Phase::LegislativePresident => {}
                Phase::LegislativeChancellor | Phase::VetoRequested => return Err(GameError::NoPendingDecision),
                actual => return Err(GameError::WrongPhase { expected: Phase::LegislativePresident, actual }),
            }
            game.expect_president(actor)?;
            if card_idx >= game.hand.len() {
                return Err(GameError::InvalidCard);
            }
            let chancellor = game.chancellor.ok_or(GameError::NoPendingDecision)?;

            let card = game.hand.remove(card_idx);
            game.deck.discard([card]);
            game.veto = if game.board.veto_unlocked() {
                VetoStatus::CanVeto
            } else {
                VetoStatus::CannotVeto
            };
            game.phase = Phase::LegislativeChancellor;
            game.emit(PublicEvent::PresidentDiscarded);

            let event = PrivateEvent::PolicyHand {
                policies: game.hand.clone(),
                can_veto: game.veto == VetoStatus::CanVeto,
            };
            game.emit_private(chancellor, event);
            Ok(())
        })
    }

    /// Called when the chancellor enacts one of their two policies; the other is discarded.
    pub fn chancellor_enact(&mut self, actor: &PlayerId, card_idx: usize) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            match game.phase {
                Phase::LegislativeChancellor => {}
                Phase::VetoRequested => return Err(GameError::NoPendingDecision),
                actual => return Err(GameError::WrongPhase { expected: Phase::LegislativeChancellor, actual }),
            }
            game.expect_chancellor(actor)?;
            if card_idx >= game.hand.len() {
                return Err(GameError::InvalidCard);
            }

            let card = game.hand.remove(card_idx);
            let rest = std::mem::take(&mut game.hand);
            game.deck.discard(rest);
            game.enact_policy(card, false)
        })
    }

    /// Called when the chancellor proposes a veto.
    pub fn request_veto(&mut self, actor: &PlayerId) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::LegislativeChancellor)?;
            let chancellor = game.expect_chancellor(actor)?;
            if game.veto != VetoStatus::CanVeto {
                return Err(GameError::VetoUnavailable);
            }
            game.phase = Phase::VetoRequested;
            game.emit(PublicEvent::VetoRequested { chancellor: game.players[chancellor].id.clone() });
            Ok(())
        })
    }

    /// Called when the president consents to, or rejects, a proposed veto.
    pub fn respond_veto(&mut self, actor: &PlayerId, agree: bool) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::VetoRequested)?;
            game.expect_president(actor)?;
            game.emit(PublicEvent::VetoResolved { agreed: agree });

            if !agree {
                game.veto = VetoStatus::VetoDenied;
                game.phase = Phase::LegislativeChancellor;
                return Ok(());
            }

            let cards = std::mem::take(&mut game.hand);
            game.deck.discard(cards);
            game.advance_election_tracker()
        })
    }

    /// Places a policy on the board, then checks for victory and any executive power it unlocks.
    pub(super) fn enact_policy(&mut self, policy: PolicyKind, chaos: bool) -> Result<(), GameError> {
        let count = self.board.play(policy);
        self.hand.clear();
        self.emit(PublicEvent::PolicyEnacted { policy, count, chaos });

        if self.check_game_over(Checkpoint::Enactment) {
            return Ok(());
        }

        // Chaos uses up the slot without granting its power.
        let reached = self.board.claim_slot(policy, count);
        let mut power = match (chaos, reached) {
            (false, true) => self.mode.executive_power(policy, count, self.num_players()),
            _ => None,
        };

        if power.is_none()
            && !chaos
            && policy == PolicyKind::Anarchist
            && self.mode.has_anarchy_execution()
            && self.anarchy_execution_available
        {
            self.anarchy_execution_available = false;
            power = Some(ExecutiveAction::Execution);
        }

        match power {
            Some(action) => self.begin_executive_action(action),
            None => {
                self.start_nomination();
                Ok(())
            }
        }
    }
}
