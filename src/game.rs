use self::board::Board;
use self::deck::PolicyDeck;
pub use self::event::{Event, PrivateEvent, PublicEvent};
pub use self::executive::{ActionChoice, ExecutiveAction};
use self::government::Government;
pub use self::mode::Mode;
pub use self::party::PolicyKind;
use self::player::{assign_roles, Player};
pub use self::player::{PlayerId, Role};
pub use self::snapshot::Snapshot;
pub use self::victory::WinCondition;
use self::votes::Votes;
use crate::error::GameError;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

mod board;
mod deck;
mod election;
mod event;
mod executive;
mod government;
mod legislative;
mod mode;
mod party;
mod player;
mod snapshot;
mod test;
mod victory;
mod view;
mod votes;

/// A game of Secret Hitler, and the only owner of its mutable state.
#[derive(Clone, PartialEq, Debug)]
pub struct Game {
    id: String,
    mode: Mode,
    players: Vec<Player>,
    roles: Vec<Role>,
    deck: PolicyDeck,
    board: Board,
    phase: Phase,
    /// Index of the sitting president.
    president: usize,
    /// Index of the player the normal rotation has reached.
    rotation: usize,
    /// President chosen by a special election, taking office at the next nomination.
    special_president: Option<usize>,
    chancellor_candidate: Option<usize>,
    chancellor: Option<usize>,
    votes: Votes,
    election_tracker: usize,
    last_government: Option<Government>,
    hand: Vec<PolicyKind>,
    veto: VetoStatus,
    pending_action: Option<ExecutiveAction>,
    anarchy_execution_available: bool,
    outcome: Option<WinCondition>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    rng: rand_chacha::ChaCha8Rng,
    /// Events raised by the transition in progress; never persisted.
    outbox: Vec<Event>,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Roles and deck are being prepared.
    Setup,
    /// The president must nominate a chancellor.
    Nomination,
    /// Every living player must vote on the nominated government.
    Voting,
    /// The president must discard one of three policies.
    LegislativePresident,
    /// The chancellor must enact one of two policies, or call for a veto.
    LegislativeChancellor,
    /// The president must accept or reject the chancellor's veto.
    VetoRequested,
    /// The president must resolve an executive power.
    ExecutiveAction,
    /// Somebody has won.
    Finished,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Nomination => "nomination",
            Phase::Voting => "voting",
            Phase::LegislativePresident => "legislative_president",
            Phase::LegislativeChancellor => "legislative_chancellor",
            Phase::VetoRequested => "veto_requested",
            Phase::ExecutiveAction => "executive_action",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum VetoStatus {
    CannotVeto,
    CanVeto,
    VetoDenied,
}

impl Game {
    /// Creates a new game for an ordered list of players. Roles and the deck are set up separately.
    pub fn new(id: impl Into<String>, players: Vec<PlayerId>, mode: Mode, seed: u64) -> Result<Self, GameError> {
        let num_players = players.len();
        mode.check_player_count(num_players)?;

        let mut seen = BTreeSet::new();
        if let Some(dup) = players.iter().find(|p| !seen.insert(*p)) {
            return Err(GameError::DuplicatePlayer(dup.clone()));
        }

        let now = Utc::now();
        let game = Game {
            id: id.into(),
            mode,
            players: players.into_iter().map(Player::new).collect(),
            roles: vec![],
            deck: PolicyDeck::default(),
            board: Board::new(mode),
            phase: Phase::Setup,
            president: 0,
            rotation: 0,
            special_president: None,
            chancellor_candidate: None,
            chancellor: None,
            votes: Votes::new(num_players),
            election_tracker: 0,
            last_government: None,
            hand: vec![],
            veto: VetoStatus::CannotVeto,
            pending_action: None,
            anarchy_execution_available: true,
            outcome: None,
            revision: 0,
            created_at: now,
            updated_at: now,
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(seed),
            outbox: vec![],
        };
        log::info!("Game {} initialised for {} players in {} mode", game.id, num_players, mode);
        Ok(game)
    }

    /// Deals a secret role to every player.
    pub fn assign_roles(&mut self) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::Setup)?;
            if !game.roles.is_empty() {
                return Err(GameError::AlreadySetUp);
            }
            game.roles = assign_roles(game.num_players(), game.mode, &mut game.rng)?;
            game.emit(PublicEvent::RolesAssigned);
            for idx in 0..game.num_players() {
                let event = PrivateEvent::RoleAssigned {
                    role: game.roles[idx],
                    allies: game.allies(idx),
                };
                game.emit_private(idx, event);
            }
            Ok(())
        })
    }

    /// Builds and shuffles the policy deck.
    pub fn initialize_deck(&mut self) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::Setup)?;
            if game.deck.count() + game.deck.discard_count() > 0 {
                return Err(GameError::AlreadySetUp);
            }
            game.deck = PolicyDeck::new(game.mode, game.num_players(), &mut game.rng);
            game.emit(PublicEvent::DeckInitialized { cards: game.deck.count() });
            Ok(())
        })
    }

    /// Starts the first nomination round, with the first player in turn order as president.
    pub fn begin_first_term(&mut self) -> Result<Vec<Event>, GameError> {
        self.transact(|game| {
            game.expect_phase(Phase::Setup)?;
            if game.roles.is_empty() || game.deck.count() == 0 {
                return Err(GameError::NotSetUp);
            }
            game.rotation = 0;
            game.start_term(0);
            Ok(())
        })
    }

    /// Returns the game to the setup phase, so that roles and the deck can be dealt again.
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            *player = Player::new(player.id.clone());
        }
        self.roles.clear();
        self.deck = PolicyDeck::default();
        self.board = Board::new(self.mode);
        self.phase = Phase::Setup;
        self.president = 0;
        self.rotation = 0;
        self.special_president = None;
        self.chancellor_candidate = None;
        self.chancellor = None;
        self.votes = Votes::new(self.num_players());
        self.election_tracker = 0;
        self.last_government = None;
        self.hand.clear();
        self.veto = VetoStatus::CannotVeto;
        self.pending_action = None;
        self.anarchy_execution_available = true;
        self.outcome = None;
        self.revision += 1;
        self.updated_at = Utc::now();
        self.outbox.clear();
        log::info!("Game {} reset", self.id);
    }

    /// Runs a transition against a working copy, committing it only if every step succeeds.
    fn transact<F>(&mut self, transition: F) -> Result<Vec<Event>, GameError>
    where
        F: FnOnce(&mut Game) -> Result<(), GameError>,
    {
        if self.phase == Phase::Finished {
            return Err(GameError::GameFinished);
        }
        let mut next = self.clone();
        next.outbox.clear();
        transition(&mut next)?;
        next.revision += 1;
        next.updated_at = Utc::now();
        let events = std::mem::take(&mut next.outbox);
        log::debug!("Game {} is now in the {} phase (revision {})", next.id, next.phase, next.revision);
        *self = next;
        Ok(events)
    }

    /// Gets the unique game ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The number of committed transitions.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Gets the player ids in turn order.
    pub fn player_ids(&self) -> impl Iterator<Item = &'_ PlayerId> {
        self.players.iter().map(|p| &p.id)
    }

    /// Gets the sitting president.
    pub fn president(&self) -> &PlayerId {
        &self.players[self.president].id
    }

    /// Gets the elected chancellor of the current term, if there is one.
    pub fn chancellor(&self) -> Option<&PlayerId> {
        self.chancellor.map(|idx| &self.players[idx].id)
    }

    pub fn election_tracker(&self) -> usize {
        self.election_tracker
    }

    /// The number of enacted policies of the given kind.
    pub fn enacted(&self, kind: PolicyKind) -> usize {
        self.board.enacted(kind)
    }

    /// How the game ended, if it has.
    pub fn outcome(&self) -> Option<WinCondition> {
        self.outcome
    }

    /// Returns true if the game is over.
    pub fn game_over(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Cards in the draw pile, the discard pile, and on the board; constant for a dealt game.
    pub fn cards_in_circulation(&self) -> usize {
        self.deck.count() + self.deck.discard_count() + self.board.total_enacted()
    }

    /// Finds a player with the given id.
    pub fn find_player(&self, id: &PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == *id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Gets the number of players in the game.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Gets the number of players in the game that are alive.
    pub fn num_players_alive(&self) -> usize {
        self.players.iter().filter(|p| p.alive()).count()
    }

    /// Gets the number of ordinary fascists in the game.
    pub fn num_ordinary_fascists(&self) -> usize {
        self.roles.iter().filter(|r| **r == Role::Fascist).count()
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase { expected, actual: self.phase })
        }
    }

    /// Resolves the actor, who must be the sitting president.
    fn expect_president(&self, actor: &PlayerId) -> Result<usize, GameError> {
        let idx = self.find_player(actor)?;
        if idx != self.president {
            return Err(GameError::WrongActor { expected: self.players[self.president].id.clone() });
        }
        Ok(idx)
    }

    /// Resolves the actor, who must be the elected chancellor.
    fn expect_chancellor(&self, actor: &PlayerId) -> Result<usize, GameError> {
        let idx = self.find_player(actor)?;
        let chancellor = self.chancellor.ok_or(GameError::NoPendingDecision)?;
        if idx != chancellor {
            return Err(GameError::WrongActor { expected: self.players[chancellor].id.clone() });
        }
        Ok(idx)
    }

    /// Resolves a player who may be targeted: alive and not the sitting president.
    fn living_target(&self, id: &PlayerId) -> Result<usize, GameError> {
        let idx = self.find_player(id)?;
        if idx == self.president || !self.players[idx].alive() {
            return Err(GameError::InvalidPlayerChoice);
        }
        Ok(idx)
    }

    /// Finds the next alive player after the given seat, wrapping around.
    fn next_player(&self, player: usize) -> usize {
        (player + 1..self.num_players())
            .chain(0..player)
            .find(|idx| self.players[*idx].alive())
            .unwrap_or(player)
    }

    fn emit(&mut self, event: PublicEvent) {
        self.outbox.push(Event::Broadcast(event));
    }

    fn emit_private(&mut self, player: usize, event: PrivateEvent) {
        let recipient = self.players[player].id.clone();
        self.outbox.push(Event::Private { recipient, event });
    }
}
