use crate::{
    error::GameError,
    game::{ActionChoice, Game, Mode, PlayerId},
    session::{lock, SessionManager, Subscription},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

/// A single connection, which could be an observer or a seated player.
pub struct Client<'a> {
    manager: &'a SessionManager,
    game_id: Option<String>,
    /// The player this connection speaks for, as established by the lobby.
    player: Option<PlayerId>,
    subscription: Option<Subscription>,
}

/// An action performed by a player.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    Nominate { candidate: PlayerId },
    CastVote { vote: bool },
    PresidentDiscard { index: usize },
    ChancellorEnact { index: usize },
    RequestVeto,
    RespondVeto { agree: bool },
    /// Resolves an investigation, special election, or execution.
    ChoosePlayer { target: PlayerId },
    /// Resolves a policy peek.
    Acknowledge,
    Propaganda { discard: bool },
}

impl<'a> Client<'a> {
    /// Creates a new game client.
    pub fn new(manager: &'a SessionManager) -> Self {
        Self {
            manager,
            game_id: None,
            player: None,
            subscription: None,
        }
    }

    /// Creates a new game session, returning its ID.
    pub fn create_game(&mut self, players: Vec<PlayerId>, mode: Mode) -> Result<String, GameError> {
        let session = self.manager.create_game(players, mode)?;
        let id = lock(&session)?.game().id().to_owned();
        Ok(id)
    }

    /// Joins a game, as a player if one is given and as an observer otherwise.
    pub fn join(&mut self, game_id: &str, player: Option<PlayerId>) -> Result<(), GameError> {
        let subscription = self.manager.join(game_id, player.as_ref())?;
        self.leave();
        self.game_id = Some(game_id.to_string());
        self.player = player;
        self.subscription = Some(subscription);
        Ok(())
    }

    /// The current view of the game for this connection.
    pub fn get_state(&self) -> Result<Value, GameError> {
        let game_id = self.game_id.as_deref().ok_or(GameError::GameNotFound)?;
        let session = self.manager.find_game(game_id)?;
        let mut session = lock(&session)?;
        session.heartbeat();
        match &self.player {
            Some(player) => session.game().get_player_json(player),
            None => Ok(session.game().get_board_json()),
        }
    }

    /// Waits for the next message for this connection. Returns `None` once another
    /// connection has taken over this player, or the game has gone away.
    pub async fn next_message(&mut self) -> Option<Value> {
        loop {
            let Some(subscription) = &mut self.subscription else {
                return std::future::pending().await;
            };
            tokio::select! {
                update = subscription.updates.recv() => match update {
                    Ok(update) => return Some(update),
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Connection fell behind by {} updates", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                },
                message = recv_direct(subscription.direct.as_mut()) => return message,
            }
        }
    }

    /// Leaves the game, giving up the player's private channel.
    pub fn leave(&mut self) {
        self.subscription = None;
        if let (Some(game_id), Some(player)) = (self.game_id.take(), self.player.take()) {
            self.manager.unbind(&game_id, &player);
        }
    }

    /// Called when a player performs an action.
    pub fn player_action(&self, action: PlayerAction) -> Result<(), GameError> {
        let player = self.player.as_ref().ok_or(GameError::PlayerNotFound)?;
        let game_id = self.game_id.as_deref().ok_or(GameError::GameNotFound)?;
        self.manager
            .apply(game_id, |game| apply_action(game, player, action))
            .map(|_| ())
    }
}

fn apply_action(game: &mut Game, player: &PlayerId, action: PlayerAction) -> Result<Vec<crate::game::Event>, GameError> {
    match action {
        PlayerAction::Nominate { candidate } => game.nominate(player, &candidate),
        PlayerAction::CastVote { vote } => game.cast_vote(player, vote),
        PlayerAction::PresidentDiscard { index } => game.president_discard(player, index),
        PlayerAction::ChancellorEnact { index } => game.chancellor_enact(player, index),
        PlayerAction::RequestVeto => game.request_veto(player),
        PlayerAction::RespondVeto { agree } => game.respond_veto(player, agree),
        PlayerAction::ChoosePlayer { target } => game.resolve_executive_action(player, ActionChoice::Player(target)),
        PlayerAction::Acknowledge => game.resolve_executive_action(player, ActionChoice::Acknowledge),
        PlayerAction::Propaganda { discard } => game.resolve_executive_action(player, ActionChoice::Discard(discard)),
    }
}

async fn recv_direct(direct: Option<&mut mpsc::UnboundedReceiver<Value>>) -> Option<Value> {
    match direct {
        Some(direct) => direct.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager() -> SessionManager {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SessionManager::new(db).unwrap()
    }

    #[test]
    fn actions_are_parsed_from_tagged_json() {
        let action: PlayerAction = serde_json::from_value(json!({ "type": "nominate", "candidate": "P2" })).unwrap();
        assert_eq!(action, PlayerAction::Nominate { candidate: "P2".into() });
        let action: PlayerAction = serde_json::from_value(json!({ "type": "respond_veto", "agree": false })).unwrap();
        assert_eq!(action, PlayerAction::RespondVeto { agree: false });
        assert!(serde_json::from_value::<PlayerAction>(json!({ "type": "assassinate" })).is_err());
    }

    #[test]
    fn observers_cannot_act() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let players = (0..5).map(|i| PlayerId::from(format!("P{}", i))).collect();
        let id = client.create_game(players, Mode::Standard).unwrap();
        client.join(&id, None).unwrap();

        let err = client.player_action(PlayerAction::CastVote { vote: true });
        assert_eq!(err, Err(GameError::PlayerNotFound));
        assert!(client.get_state().unwrap().get("role").is_none());
    }

    #[test]
    fn players_see_their_own_role() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let players = (0..5).map(|i| PlayerId::from(format!("P{}", i))).collect();
        let id = client.create_game(players, Mode::Standard).unwrap();
        client.join(&id, Some("P0".into())).unwrap();

        client
            .player_action(PlayerAction::Nominate { candidate: "P1".into() })
            .unwrap();
        let state = client.get_state().unwrap();
        assert_eq!(state["phase"], "voting");
        assert!(state["role"].is_string());
    }

    #[test]
    fn leaving_gives_up_the_private_channel() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let players = (0..5).map(|i| PlayerId::from(format!("P{}", i))).collect();
        let id = client.create_game(players, Mode::Standard).unwrap();
        client.join(&id, Some("P0".into())).unwrap();

        let session = manager.find_game(&id).unwrap();
        assert_eq!(lock(&session).unwrap().bindings().len(), 1);
        client.leave();
        assert!(lock(&session).unwrap().bindings().is_empty());
        assert_eq!(client.get_state(), Err(GameError::GameNotFound));
    }

    #[tokio::test]
    async fn updates_follow_actions() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let players = (0..5).map(|i| PlayerId::from(format!("P{}", i))).collect();
        let id = client.create_game(players, Mode::Standard).unwrap();
        client.join(&id, Some("P0".into())).unwrap();

        let initial = client.next_message().await.unwrap();
        assert_eq!(initial["type"], "update");
        let revision = initial["revision"].as_u64().unwrap();
        client
            .player_action(PlayerAction::Nominate { candidate: "P1".into() })
            .unwrap();
        let mut saw_nomination = false;
        for _ in 0..3 {
            let message = client.next_message().await.unwrap();
            if message["event"]["type"] == "chancellorNominated" {
                saw_nomination = true;
            }
            if message["type"] == "update" {
                assert_eq!(message["revision"], revision + 1);
            }
        }
        assert!(saw_nomination);
    }
}
