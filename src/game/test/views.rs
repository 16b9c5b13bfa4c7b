//! What each player is allowed to see

use super::super::player::Role;
use super::super::{Event, Mode, PlayerId, PolicyKind, PrivateEvent};
use super::test_utils::*;
use std::collections::BTreeMap;

fn allies_of(events: &[Event], player: &PlayerId) -> BTreeMap<PlayerId, Role> {
    events
        .iter()
        .find_map(|e| match e {
            Event::Private { recipient, event: PrivateEvent::RoleAssigned { allies, .. } } if recipient == player => {
                Some(allies.clone())
            }
            _ => None,
        })
        .unwrap()
}

#[test]
fn fascists_know_each_other_and_hitler() {
    let game = create_standard_5_player_game();
    assert_eq!(game.allies(3), BTreeMap::from([(id(4), Role::Hitler)]));
    // With a single fascist, Hitler knows them too.
    assert_eq!(game.allies(4), BTreeMap::from([(id(3), Role::Fascist)]));
    assert!(game.allies(0).is_empty());
}

#[test]
fn hitler_plays_blind_in_larger_games() {
    use Role::*;
    let game = create_game_with_roles(&[Liberal, Liberal, Liberal, Liberal, Fascist, Fascist, Hitler], Mode::Standard);
    assert!(game.allies(6).is_empty());
    assert_eq!(game.allies(4), BTreeMap::from([(id(5), Fascist), (id(6), Hitler)]));
}

#[test]
fn communists_know_each_other_and_the_anarchist() {
    let game = create_xl_10_player_game();
    assert_eq!(game.allies(6), BTreeMap::from([(id(7), Role::Communist), (id(8), Role::Anarchist)]));
    assert!(game.allies(8).is_empty());
    assert!(!game.allies(4).contains_key(&id(6)));
}

#[test]
fn fascists_know_the_monarchist() {
    let mut game = create_test_game(13, Mode::Extended, 8);
    let events = {
        game.reset();
        game.assign_roles().unwrap()
    };
    let monarchist = game.roles.iter().position(|r| *r == Role::Monarchist).unwrap();
    let fascist = game.roles.iter().position(|r| *r == Role::Fascist).unwrap();

    let allies = allies_of(&events, &id(fascist));
    assert_eq!(allies.get(&id(monarchist)), Some(&Role::Monarchist));
    assert!(allies_of(&events, &id(monarchist)).is_empty());
}

#[test]
fn the_board_hides_secrets() {
    let mut game = create_standard_5_player_game();
    game.nominate(&id(0), &id(1)).unwrap();
    game.cast_vote(&id(2), false).unwrap();

    let board = game.get_board_json();
    assert_eq!(board["votesCast"], serde_json::json!(["P2"]));
    assert!(board.get("votes").is_none());
    for player in board["players"].as_array().unwrap() {
        assert!(player["role"].is_null());
    }

    vote_all_remaining(&mut game);
    let board = game.get_board_json();
    assert!(board.get("hand").is_none());
    assert_eq!(board["drawPile"], 14);
}

#[test]
fn only_the_holder_sees_the_hand() {
    let mut game = create_standard_5_player_game();
    stack_deck(&mut game, &[PolicyKind::Liberal, PolicyKind::Fascist, PolicyKind::Fascist]);
    elect(&mut game, 1);

    let president = game.get_player_json(&id(0)).unwrap();
    assert_eq!(president["hand"], serde_json::json!(["liberal", "fascist", "fascist"]));
    assert!(game.get_player_json(&id(1)).unwrap()["hand"].is_null());

    game.president_discard(&id(0), 1).unwrap();
    assert!(game.get_player_json(&id(0)).unwrap()["hand"].is_null());
    assert_eq!(game.get_player_json(&id(1)).unwrap()["hand"], serde_json::json!(["liberal", "fascist"]));
}

#[test]
fn players_see_their_own_role_and_their_allies() {
    let game = create_standard_5_player_game();
    let view = game.get_player_json(&id(3)).unwrap();
    assert_eq!(view["role"], "fascist");
    let roles: Vec<_> = view["players"].as_array().unwrap().iter().map(|p| p["role"].clone()).collect();
    assert_eq!(roles, vec![
        serde_json::Value::Null,
        serde_json::Value::Null,
        serde_json::Value::Null,
        "fascist".into(),
        "hitler".into()
    ]);

    let view = game.get_player_json(&id(0)).unwrap();
    assert_eq!(view["role"], "liberal");
    assert!(!view["players"].to_string().contains("hitler"));
    assert!(game.get_player_json(&"nobody".into()).is_err());
}

fn vote_all_remaining(game: &mut super::super::Game) {
    for voter in [0, 1, 3, 4] {
        game.cast_vote(&id(voter), true).unwrap();
    }
}
