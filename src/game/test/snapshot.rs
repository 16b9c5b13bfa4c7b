//! Serializing and restoring games

use super::super::snapshot::SNAPSHOT_VERSION;
use super::super::{Game, Mode, Phase, PolicyKind, Snapshot};
use super::test_utils::*;
use crate::error::{ErrorKind, GameError};

fn game_in_progress() -> Game {
    let mut game = create_test_game(9, Mode::Extended, 99);
    for choice in [3, 0, 1, 1, 2, 5, 0, 7, 1, 1, 4, 2] {
        if game.game_over() {
            break;
        }
        play_step(&mut game, choice);
    }
    game
}

#[test]
fn restore_inverts_serialize() {
    let game = game_in_progress();
    let restored = Game::restore(game.serialize()).unwrap();
    assert_eq!(restored, game);
    assert!(restored.outbox.is_empty());
}

#[test]
fn a_setup_game_round_trips() {
    let game = Game::new("TEST", ids(5), Mode::Standard, 1).unwrap();
    assert_eq!(Game::restore(game.serialize()).unwrap(), game);
}

#[test]
fn restored_games_continue_identically() {
    let mut game = game_in_progress();
    let mut restored = Game::restore(game.serialize()).unwrap();

    for choice in [1, 2, 3, 0, 0, 1, 6, 2, 3, 3, 1, 0, 5, 4] {
        if game.game_over() {
            break;
        }
        let events = play_step(&mut game, choice);
        assert_eq!(play_step(&mut restored, choice), events);
    }
    assert_eq!(untimed(&restored), untimed(&game));
    assert_eq!(restored.created_at(), game.created_at());
}

/// The snapshot without its modification time, which follows the wall clock.
fn untimed(game: &Game) -> Snapshot {
    Snapshot {
        updated_at: String::new(),
        ..game.serialize()
    }
}

#[test]
fn snapshots_use_string_labels() {
    let mut game = create_standard_5_player_game();
    elect(&mut game, 1);
    let json = serde_json::to_value(game.serialize()).unwrap();

    assert_eq!(json["version"], SNAPSHOT_VERSION);
    assert_eq!(json["mode"], "standard");
    assert_eq!(json["phase"], "legislative_president");
    assert_eq!(json["roles"]["P4"], "hitler");
    assert_eq!(json["chancellor"], "P1");
    assert_eq!(json["last_government"]["president"], "P0");
    assert_eq!(json["enacted_counts"]["liberal"], 0);
    assert!(json["created_at"].as_str().unwrap().contains('T'));
    assert_eq!(json["policies_in_hand"].as_array().unwrap().len(), 3);

    let snapshot: Snapshot = serde_json::from_value(json).unwrap();
    assert_eq!(Game::restore(snapshot).unwrap(), game);
}

#[test]
fn unknown_versions_are_rejected() {
    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.version = SNAPSHOT_VERSION + 1;
    let err = Game::restore(snapshot).unwrap_err();
    assert!(matches!(err, GameError::InvalidSnapshot(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn roles_must_cover_every_player() {
    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.roles.remove(&id(2));
    assert!(matches!(Game::restore(snapshot), Err(GameError::InvalidSnapshot(_))));

    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.roles.insert(id(3), super::super::Role::Liberal);
    assert!(matches!(Game::restore(snapshot), Err(GameError::InvalidSnapshot(_))));
}

#[test]
fn unknown_players_are_rejected() {
    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.executed_players.push("stranger".into());
    assert!(matches!(Game::restore(snapshot), Err(GameError::InvalidSnapshot(_))));

    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.president_index = 5;
    assert!(matches!(Game::restore(snapshot), Err(GameError::InvalidSnapshot(_))));
}

#[test]
fn tracks_must_fit_the_mode() {
    let mut snapshot = create_standard_5_player_game().serialize();
    snapshot.track_bonuses_used.insert(PolicyKind::Communist, vec![false; 6]);
    assert!(matches!(Game::restore(snapshot), Err(GameError::InvalidSnapshot(_))));
}

#[test]
fn revision_counts_committed_transitions() {
    let mut game = create_standard_5_player_game();
    let revision = game.revision();
    game.nominate(&id(0), &id(1)).unwrap();
    assert_eq!(game.revision(), revision + 1);
    game.nominate(&id(0), &id(1)).unwrap_err();
    assert_eq!(game.revision(), revision + 1);
    assert_eq!(game.phase(), Phase::Voting);
}
