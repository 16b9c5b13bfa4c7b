//! Nomination, voting, term limits, and the election tracker.

use super::event::{PrivateEvent, PublicEvent};
use super::government::Government;
use super::mode::{ELECTION_TRACKER_LIMIT, HITLER_DANGER_THRESHOLD};
use super::party::PolicyKind;
use super::victory::Checkpoint;
use super::votes::Votes;
use super::{Event, Game, Phase, PlayerId, VetoStatus};
use crate::error::GameError;

impl Game {
    /// Called when the president nominates a chancellor.
    pub fn nominate(&mut self, actor: &PlayerId, candidate: &PlayerId) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::Nomination)?;
            let president = game.expect_president(actor)?;
            let candidate = game.find_player(candidate)?;
            if !game.eligible_chancellors().contains(&candidate) {
                return Err(GameError::InvalidPlayerChoice);
            }
            game.chancellor_candidate = Some(candidate);
            game.votes = Votes::new(game.num_players());
            game.phase = Phase::Voting;
            game.emit(PublicEvent::ChancellorNominated {
                president: game.players[president].id.clone(),
                candidate: game.players[candidate].id.clone(),
            });
            Ok(())
        })
    }

    /// Called when a player casts their vote. The last ballot triggers the tally.
    pub fn cast_vote(&mut self, actor: &PlayerId, vote: bool) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::Voting)?;
            let player = game.find_player(actor)?;
            if !game.players[player].alive() {
                return Err(GameError::NotAlive);
            }
            game.votes.vote(player, vote)?;
            game.emit(PublicEvent::VoteCast { player: actor.clone() });
            if game.votes.is_complete(&game.players) {
                game.tally()?;
            }
            Ok(())
        })
    }

    /// Determines which players are eligible to be chancellor.
    pub(super) fn eligible_chancellors(&self) -> Vec<usize> {
        let living = self.num_players_alive();
        let term_limited = |idx: usize| match self.last_government {
            Some(government) => idx == government.chancellor || (living > 5 && idx == government.president),
            None => false,
        };
        let others: Vec<usize> = (0..self.num_players())
            .filter(|idx| *idx != self.president && self.players[*idx].alive())
            .collect();

        let eligible: Vec<usize> = others.iter().copied().filter(|idx| !term_limited(*idx)).collect();
        if eligible.is_empty() {
            // Too few players remain for term limits to leave anyone electable.
            return others;
        }
        eligible
    }

    fn tally(&mut self) -> Result<(), GameError> {
        let passed = self.votes.passed();
        let votes = self
            .votes
            .votes()
            .iter()
            .enumerate()
            .filter_map(|(idx, vote)| vote.map(|v| (self.players[idx].id.clone(), v)))
            .collect();
        self.emit(PublicEvent::ElectionResult { votes, passed });

        if passed {
            self.elect_government()
        } else {
            self.chancellor_candidate = None;
            self.chancellor = None;
            self.votes = Votes::new(self.num_players());
            self.advance_election_tracker()
        }
    }

    fn elect_government(&mut self) -> Result<(), GameError> {
        let chancellor = self.chancellor_candidate.take().ok_or(GameError::NoPendingDecision)?;
        let president = self.president;
        self.chancellor = Some(chancellor);
        self.last_government = Some(Government { president, chancellor });
        self.election_tracker = 0;
        self.votes = Votes::new(self.num_players());
        self.emit(PublicEvent::GovernmentFormed {
            president: self.players[president].id.clone(),
            chancellor: self.players[chancellor].id.clone(),
        });

        if self.check_game_over(Checkpoint::Election) {
            return Ok(());
        }

        if self.board.enacted(PolicyKind::Fascist) >= HITLER_DANGER_THRESHOLD {
            self.players[chancellor].not_hitler = true;
            self.emit(PublicEvent::ConfirmedNotHitler { player: self.players[chancellor].id.clone() });
        }

        self.start_legislative_session(president)
    }

    fn start_legislative_session(&mut self, president: usize) -> Result<(), GameError> {
        self.hand = self.deck.draw(3, &mut self.rng)?;
        self.veto = VetoStatus::CannotVeto;
        self.phase = Phase::LegislativePresident;
        let policies = self.hand.clone();
        self.emit_private(president, PrivateEvent::PolicyHand { policies, can_veto: false });
        Ok(())
    }

    /// Records a failed government. Reaching the limit enacts the top policy of the deck.
    pub(super) fn advance_election_tracker(&mut self) -> Result<(), GameError> {
        self.election_tracker += 1;
        self.emit(PublicEvent::ElectionTrackerAdvanced { tracker: self.election_tracker });

        if self.election_tracker < ELECTION_TRACKER_LIMIT {
            self.start_nomination();
            return Ok(());
        }

        let card = self.deck.draw(1, &mut self.rng)?;
        self.election_tracker = 0;
        self.last_government = None;
        for policy in card {
            self.emit(PublicEvent::ChaosEnacted { policy });
            self.enact_policy(policy, true)?;
        }
        Ok(())
    }

    /// Starts the next nomination round, either with the player chosen by a special election
    /// or by advancing the rotation to the next living player.
    pub(super) fn start_nomination(&mut self) {
        let president = match self.special_president.take() {
            Some(president) => president,
            None => {
                self.rotation = self.next_player(self.rotation);
                self.rotation
            }
        };
        self.start_term(president);
    }

    pub(super) fn start_term(&mut self, president: usize) {
        self.president = president;
        self.chancellor_candidate = None;
        self.chancellor = None;
        self.votes = Votes::new(self.num_players());
        self.hand.clear();
        self.veto = VetoStatus::CannotVeto;
        self.pending_action = None;
        self.phase = Phase::Nomination;

        let eligible = self
            .eligible_chancellors()
            .into_iter()
            .map(|idx| self.players[idx].id.clone())
            .collect();
        self.emit(PublicEvent::NominationStarted {
            president: self.players[president].id.clone(),
            eligible,
        });
    }
}
