use crate::error::{GameError, StoreError};
use crate::game::{Event, Game, Mode, PlayerId, Snapshot};
use crate::time::iso8601;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{Rng, RngCore};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};

/// Manages all the game sessions running on the server.
pub struct SessionManager {
    sessions: DashMap<String, SessionHandle>,
    store: SnapshotStore,
}

/// The databases that games are persisted to.
#[derive(Clone)]
pub struct SnapshotStore {
    db: sled::Db,
    games: sled::Tree,
    archive: sled::Tree,
}

/// A single game session.
pub struct Session {
    /// The game itself.
    game: Game,
    /// Public events and board states, seen by every connection to the game.
    updates: broadcast::Sender<Value>,
    /// Private channels of the players currently connected.
    bindings: Bindings,
    /// Timestamp of the last time this session was interacted with.
    last_ts: Instant,
    /// Whether the finished game has been written to the archive.
    archived: bool,
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Where each connected player's private messages go.
pub type Bindings = HashMap<PlayerId, mpsc::UnboundedSender<Value>>;

/// The receiving ends handed to a connection that joins a game.
pub struct Subscription {
    pub updates: broadcast::Receiver<Value>,
    pub direct: Option<mpsc::UnboundedReceiver<Value>>,
}

/// What a committed transition leaves to be written once the lock is released.
struct Pending {
    snapshot: Snapshot,
    archive: Option<Value>,
}

const UPDATE_BUFFER: usize = 64;

/// Routes a player's private messages to a new channel, returning the channel it displaces.
pub fn bind(
    bindings: &mut Bindings,
    player: PlayerId,
    channel: mpsc::UnboundedSender<Value>,
) -> Option<mpsc::UnboundedSender<Value>> {
    bindings.insert(player, channel)
}

/// Locks a session, treating a poisoned one as gone.
pub fn lock(session: &SessionHandle) -> Result<MutexGuard<'_, Session>, GameError> {
    session.lock().map_err(|_| {
        log::error!("Found poisoned session");
        GameError::GameNotFound
    })
}

impl SnapshotStore {
    pub fn open(db: sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            games: db.open_tree("games")?,
            archive: db.open_tree("archive")?,
            db,
        })
    }

    /// Writes a snapshot, unless the stored one is from a later revision.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(snapshot)?;
        let mut stale = false;
        self.games.fetch_and_update(snapshot.id.as_bytes(), |current| {
            stale = current.map_or(false, |current| stored_revision(current) > snapshot.revision);
            match current {
                Some(current) if stale => Some(current.to_vec()),
                _ => Some(bytes.clone()),
            }
        })?;
        if stale {
            return Err(StoreError::Stale { id: snapshot.id.clone(), revision: snapshot.revision });
        }
        Ok(())
    }

    /// Restores the latest stored snapshot of a game.
    pub fn load(&self, game_id: &str) -> Result<Option<Game>, StoreError> {
        let Some(bytes) = self.games.get(game_id.as_bytes())? else {
            return Ok(None);
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(Game::restore(snapshot)?))
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.games.contains_key(game_id.as_bytes()).unwrap_or(false)
    }

    pub fn remove(&self, game_id: &str) -> Result<(), StoreError> {
        self.games.remove(game_id.as_bytes())?;
        Ok(())
    }

    /// Records a finished game.
    pub fn archive(&self, record: &Value) -> Result<(), StoreError> {
        let key = self.db.generate_id()?.to_be_bytes();
        self.archive.insert(key, record.to_string().as_bytes())?;
        Ok(())
    }

    pub fn archived(&self) -> Result<Vec<Value>, StoreError> {
        self.archive
            .iter()
            .values()
            .map(|record| Ok(serde_json::from_slice(&record?)?))
            .collect()
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

fn stored_revision(bytes: &[u8]) -> u64 {
    #[derive(Deserialize)]
    struct Header {
        revision: u64,
    }
    serde_json::from_slice::<Header>(bytes).map(|h| h.revision).unwrap_or(0)
}

impl SessionManager {
    pub fn new(db: sled::Db) -> Result<Self, StoreError> {
        let store = SnapshotStore::open(db)?;
        log::info!("Opened game store with {} saved games", store.games.len());
        Ok(Self { sessions: DashMap::new(), store })
    }

    /// Creates a game for the given players, deals it, and starts the first term.
    pub fn create_game(&self, players: Vec<PlayerId>, mode: Mode) -> Result<SessionHandle, GameError> {
        let seed = rand::thread_rng().next_u64();
        let (handle, snapshot) = loop {
            let id = Self::random_id();
            if self.store.contains(&id) {
                continue;
            }
            let entry = self.sessions.entry(id);
            if let Entry::Occupied(_) = entry {
                continue;
            }
            let mut game = Game::new(entry.key().clone(), players.clone(), mode, seed)?;
            game.assign_roles()?;
            game.initialize_deck()?;
            game.begin_first_term()?;
            let snapshot = game.serialize();
            let handle = Arc::new(Mutex::new(Session::hydrate(game)));
            entry.or_insert(handle.clone());
            break (handle, snapshot);
        };
        if let Err(err) = self.store.save(&snapshot) {
            log::error!("Could not persist game {}: {}", snapshot.id, err);
        }
        log::info!("Created game {} for {} players in {} mode", snapshot.id, snapshot.players.len(), mode);
        Ok(handle)
    }

    /// Finds a running game, restoring it from the store if it was evicted.
    pub fn find_game(&self, game_id: &str) -> Result<SessionHandle, GameError> {
        if let Some(session) = self.sessions.get(game_id) {
            return Ok(Arc::clone(&session));
        }
        let game = match self.store.load(game_id) {
            Ok(Some(game)) => game,
            Ok(None) => return Err(GameError::GameNotFound),
            Err(err) => {
                log::error!("Could not restore game {}: {}", game_id, err);
                return Err(GameError::GameNotFound);
            }
        };
        log::info!("Restored game {} at revision {}", game_id, game.revision());
        let session = self
            .sessions
            .entry(game_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::hydrate(game))));
        Ok(Arc::clone(&session))
    }

    /// Subscribes a connection to a game, binding the player's private channel if one is given.
    /// A previous connection for the same player loses its channel.
    pub fn join(&self, game_id: &str, player: Option<&PlayerId>) -> Result<Subscription, GameError> {
        let session = self.find_game(game_id)?;
        let mut session = lock(&session)?;
        let updates = session.updates.subscribe();
        let Some(player) = player else {
            return Ok(Subscription { updates, direct: None });
        };

        let state = session.game.get_player_json(player)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(update_message(&session.game, state)).ok();
        if bind(&mut session.bindings, player.clone(), tx).is_some() {
            log::info!("Player {} reconnected to game {}", player, game_id);
        }
        session.last_ts = Instant::now();
        Ok(Subscription { updates, direct: Some(rx) })
    }

    /// Applies a transition to a game and queues what it produced for every connection,
    /// then persists the new snapshot once the lock is released.
    pub fn apply<F>(&self, game_id: &str, mutation: F) -> Result<Vec<Event>, GameError>
    where
        F: FnOnce(&mut Game) -> Result<Vec<Event>, GameError>,
    {
        let session = self.find_game(game_id)?;
        let (events, pending) = {
            let mut session = lock(&session)?;
            let events = mutation(&mut session.game)?;
            let pending = session.publish(&events);
            (events, pending)
        };
        self.persist(&pending);
        Ok(events)
    }

    /// Drops a player's private channel once its connection has gone away.
    /// A newer connection for the same player keeps its binding.
    pub fn unbind(&self, game_id: &str, player: &PlayerId) {
        let Some(session) = self.sessions.get(game_id).map(|s| Arc::clone(&s)) else {
            return;
        };
        let Ok(mut session) = lock(&session) else {
            return;
        };
        if session.bindings.get(player).map_or(false, |channel| channel.is_closed()) {
            session.bindings.remove(player);
            log::debug!("Player {} left game {}", player, game_id);
        }
    }

    pub fn num_games(&self) -> usize {
        self.sessions.len()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Evicts sessions idle for longer than `ttl`, after flushing their last snapshot.
    pub fn purge_games(&self, ttl: Duration) {
        let mut expired = vec![];

        for session in self.sessions.iter() {
            let game_id = session.key();
            let Ok(session) = session.lock() else {
                log::error!("Found poisoned session: {}", game_id);
                expired.push(game_id.clone());
                continue;
            };
            if session.last_ts.elapsed() <= ttl {
                continue;
            }
            let flushed = if session.game.game_over() {
                self.store.remove(game_id)
            } else {
                self.store.save(&session.game.serialize())
            };
            match flushed {
                Ok(()) => expired.push(game_id.clone()),
                Err(err) => log::error!("Could not flush game {}: {}", game_id, err),
            }
        }

        for game_id in expired.into_iter() {
            self.sessions.remove(&game_id);
            log::info!("Evicted idle game {}", game_id);
        }
        if let Err(err) = self.store.flush() {
            log::error!("Could not flush the game store: {}", err);
        }
    }

    fn persist(&self, pending: &Pending) {
        match self.store.save(&pending.snapshot) {
            Ok(()) => {}
            Err(err @ StoreError::Stale { .. }) => log::warn!("Rejected snapshot: {}", err),
            Err(err) => log::error!("Could not persist game {}: {}", pending.snapshot.id, err),
        }
        if let Some(record) = &pending.archive {
            if let Err(err) = self.store.archive(record) {
                log::error!("Could not archive game {}: {}", pending.snapshot.id, err);
            }
        }
    }

    fn random_id() -> String {
        let mut rng = rand::thread_rng();
        (0..4)
            .map(|_| match rng.gen_range('A'..='Z') {
                // Avoid U and V because the "hitler font" can't distinguish them
                'U' => 'A',
                'V' => 'B',
                other => other,
            })
            .collect()
    }
}

impl Session {
    /// Wraps a game with no connections bound.
    fn hydrate(game: Game) -> Self {
        Self {
            archived: game.game_over(),
            game,
            updates: broadcast::channel(UPDATE_BUFFER).0,
            bindings: Bindings::new(),
            last_ts: Instant::now(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&mut self) {
        self.last_ts = Instant::now();
    }

    /// Routes the events of a committed transition: public ones to everyone, private ones
    /// only to their recipient, followed by fresh views of the game. Called with the lock
    /// held, so every connection sees transitions in the order they were committed.
    fn publish(&mut self, events: &[Event]) -> Pending {
        // Forget players whose connection has gone away.
        self.bindings.retain(|_, channel| !channel.is_closed());

        for event in events {
            match event.recipient() {
                None => {
                    // Nobody listening is not an error.
                    self.updates.send(json!({ "type": "event", "event": event.to_json() })).ok();
                }
                Some(recipient) => {
                    if let Some(channel) = self.bindings.get(recipient) {
                        channel.send(json!({ "type": "private", "event": event.to_json() })).ok();
                    }
                }
            }
        }

        self.updates.send(update_message(&self.game, self.game.get_board_json())).ok();
        for (player, channel) in self.bindings.iter() {
            if let Ok(state) = self.game.get_player_json(player) {
                channel.send(update_message(&self.game, state)).ok();
            }
        }

        let archive = if self.game.game_over() && !self.archived {
            self.archived = true;
            Some(self.archive_record())
        } else {
            None
        };

        self.last_ts = Instant::now();
        Pending {
            snapshot: self.game.serialize(),
            archive,
        }
    }

    fn archive_record(&self) -> Value {
        json!({
            "game_id": self.game.id(),
            "mode": self.game.mode(),
            "players": self.game.player_ids().collect::<Vec<_>>(),
            "started": iso8601(self.game.created_at()),
            "finished": iso8601(Utc::now()),
            "outcome": self.game.get_outcome_json()
        })
    }
}

/// A view of the game, tagged with the revision it was taken at.
fn update_message(game: &Game, state: Value) -> Value {
    json!({ "type": "update", "revision": game.revision(), "state": state })
}
