use crate::game::{Phase, PlayerId};
use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or [Session].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("a game needs between 5 and 15 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),
    #[error("role table for {mode} with {players} players holds {roles} roles")]
    RoleTableMismatch { mode: &'static str, players: usize, roles: usize },
    #[error("executive action {action} is not available in {mode} mode")]
    UnsupportedAction { mode: &'static str, action: &'static str },
    #[error("snapshot could not be restored: {0}")]
    InvalidSnapshot(String),
    #[error("cannot draw {requested} policies, only {available} remain")]
    InsufficientCards { requested: usize, available: usize },
    #[error("the game is over")]
    GameFinished,
    #[error("this action requires the {expected} phase, but the game is in the {actual} phase")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("this action must be performed by {expected}")]
    WrongActor { expected: PlayerId },
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("an invalid card was chosen")]
    InvalidCard,
    #[error("this player has already voted")]
    AlreadyVoted,
    #[error("there is no pending decision for this player")]
    NoPendingDecision,
    #[error("veto power is not available")]
    VetoUnavailable,
    #[error("this choice does not fit the pending decision")]
    InvalidChoice,
    #[error("executed players cannot act")]
    NotAlive,
    #[error("the game has not been set up yet")]
    NotSetUp,
    #[error("the game has already been set up")]
    AlreadySetUp,
    #[error("game does not exist")]
    GameNotFound,
}

/// Coarse classification of a [GameError], used to decide who hears about it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Invalid mode, population, or rule table. Reported to operators, never to players.
    Configuration,
    /// Wrong phase, wrong actor, or a decision already taken. State is unchanged.
    InvalidTransition,
    /// The deck could not satisfy a draw even after reshuffling.
    ResourceExhaustion,
    /// A mutating call arrived after the game finished.
    TerminalStateViolation,
    /// The addressed game or player does not exist.
    NotFound,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            InvalidPlayerCount(_)
            | DuplicatePlayer(_)
            | RoleTableMismatch { .. }
            | UnsupportedAction { .. }
            | InvalidSnapshot(_) => ErrorKind::Configuration,
            InsufficientCards { .. } => ErrorKind::ResourceExhaustion,
            GameFinished => ErrorKind::TerminalStateViolation,
            WrongPhase { .. }
            | WrongActor { .. }
            | InvalidPlayerChoice
            | InvalidCard
            | InvalidChoice
            | NotAlive
            | AlreadySetUp
            | AlreadyVoted
            | NoPendingDecision
            | VetoUnavailable
            | NotSetUp => ErrorKind::InvalidTransition,
            PlayerNotFound | GameNotFound => ErrorKind::NotFound,
        }
    }

    /// Whether the error indicates a broken invariant rather than a bad request.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::ResourceExhaustion)
    }
}

/// A failure to read or write persisted snapshots.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("malformed snapshot: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("snapshot of game {id} at revision {revision} is older than the stored one")]
    Stale { id: String, revision: u64 },
    #[error(transparent)]
    Game(#[from] GameError),
}
