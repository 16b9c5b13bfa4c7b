//! Executive powers granted by the policy tracks

use super::super::party::Party;
use super::super::player::Role::*;
use super::super::{ActionChoice, Event, ExecutiveAction, Game, Mode, Phase, PolicyKind, PrivateEvent, PublicEvent, WinCondition};
use super::test_utils::*;
use crate::error::GameError;

fn create_7_player_game() -> Game {
    create_game_with_roles(&[Liberal, Liberal, Liberal, Liberal, Fascist, Fascist, Hitler], Mode::Standard)
}

/// Enacts a fascist policy with P1 as chancellor, after `already` are on the board.
fn grant_fascist_power(game: &mut Game, already: usize) -> Vec<Event> {
    set_enacted(game, PolicyKind::Fascist, already);
    stack_deck(game, &[PolicyKind::Fascist, PolicyKind::Liberal, PolicyKind::Liberal]);
    enact(game, 1, PolicyKind::Fascist)
}

#[test]
fn power_tables() {
    use ExecutiveAction::*;
    let fascist = |n, pos| Mode::Standard.executive_power(PolicyKind::Fascist, pos, n);
    assert_eq!((1..=6).map(|pos| fascist(5, pos)).collect::<Vec<_>>(), vec![None, None, Some(PolicyPeek), Some(Execution), Some(Execution), None]);
    assert_eq!(fascist(7, 1), None);
    assert_eq!(fascist(8, 2), Some(InvestigateLoyalty));
    assert_eq!(fascist(8, 3), Some(SpecialElection));
    assert_eq!(fascist(9, 1), Some(InvestigateLoyalty));

    let communist = |pos| Mode::Extended.executive_power(PolicyKind::Communist, pos, 10);
    assert_eq!(
        (1..=6).map(communist).collect::<Vec<_>>(),
        vec![Some(InvestigateLoyalty), Some(Propaganda), Some(PolicyPeek), Some(SpecialElection), Some(Execution), None]
    );
    assert_eq!(Mode::Standard.executive_power(PolicyKind::Communist, 1, 10), None);
    assert_eq!(Mode::Extended.executive_power(PolicyKind::Liberal, 3, 10), None);
}

#[test]
fn policy_peek() {
    let mut game = create_standard_5_player_game();
    let events = grant_fascist_power(&mut game, 2);
    let top: Vec<PolicyKind> = game.deck.deck[..3].to_vec();

    assert_eq!(game.phase(), Phase::ExecutiveAction);
    assert_eq!(game.pending_action(), Some(ExecutiveAction::PolicyPeek));
    assert!(events.contains(&Event::Private {
        recipient: id(0),
        event: PrivateEvent::PeekedPolicies { policies: top.clone() },
    }));

    assert_eq!(game.resolve_executive_action(&id(0), ActionChoice::Player(id(1))), Err(GameError::InvalidChoice));
    assert_eq!(game.resolve_executive_action(&id(1), ActionChoice::Acknowledge), Err(GameError::WrongActor { expected: id(0) }));
    let events = game.resolve_executive_action(&id(0), ActionChoice::Acknowledge).unwrap();
    assert!(events.contains(&Event::Broadcast(PublicEvent::PoliciesPeeked { president: id(0) })));
    assert_eq!(game.deck.deck[..3], top[..]);
    assert_eq!(game.phase(), Phase::Nomination);
    assert_eq!(game.president(), &id(1));
}

#[test]
fn investigate_loyalty() {
    let mut game = create_7_player_game();
    grant_fascist_power(&mut game, 1);
    assert_eq!(game.pending_action(), Some(ExecutiveAction::InvestigateLoyalty));

    assert_eq!(game.resolve_executive_action(&id(0), ActionChoice::Player(id(0))), Err(GameError::InvalidPlayerChoice));
    let events = game.resolve_executive_action(&id(0), ActionChoice::Player(id(6))).unwrap();

    assert!(game.players[6].investigated);
    assert!(events.contains(&Event::Broadcast(PublicEvent::PlayerInvestigated { president: id(0), target: id(6) })));
    assert!(events.contains(&Event::Private {
        recipient: id(0),
        event: PrivateEvent::InvestigationResult { target: id(6), party: Party::Fascist },
    }));
}

#[test]
fn players_are_investigated_only_once() {
    let mut game = create_7_player_game();
    game.players[4].investigated = true;
    grant_fascist_power(&mut game, 1);

    assert_eq!(game.resolve_executive_action(&id(0), ActionChoice::Player(id(4))), Err(GameError::InvalidPlayerChoice));
    assert_eq!(game.phase(), Phase::ExecutiveAction);
}

#[test]
fn special_election() {
    let mut game = create_7_player_game();
    grant_fascist_power(&mut game, 2);
    assert_eq!(game.pending_action(), Some(ExecutiveAction::SpecialElection));

    let events = game.resolve_executive_action(&id(0), ActionChoice::Player(id(5))).unwrap();
    assert!(events.contains(&Event::Broadcast(PublicEvent::SpecialElectionCalled {
        president: id(0),
        next_president: id(5)
    })));
    assert_eq!(game.president(), &id(5));

    // Once the special term ends, the rotation resumes after the president who called it.
    let candidate = id(game.eligible_chancellors()[0]);
    game.nominate(&id(5), &candidate).unwrap();
    vote_all(&mut game, false);
    assert_eq!(game.president(), &id(1));
}

#[test]
fn execution() {
    let mut game = create_standard_5_player_game();
    grant_fascist_power(&mut game, 3);
    assert_eq!(game.pending_action(), Some(ExecutiveAction::Execution));

    let events = game.resolve_executive_action(&id(0), ActionChoice::Player(id(2))).unwrap();
    assert!(events.contains(&Event::Broadcast(PublicEvent::PlayerExecuted { player: id(2) })));
    assert!(!game.players[2].alive());
    assert!(!game.game_over());
    assert_eq!(game.num_players_alive(), 4);

    assert!(matches!(game.nominate(&id(1), &id(2)), Err(GameError::InvalidPlayerChoice)));
}

#[test]
fn executing_hitler_ends_the_game() {
    let mut game = create_standard_5_player_game();
    grant_fascist_power(&mut game, 3);

    let events = game.resolve_executive_action(&id(0), ActionChoice::Player(id(4))).unwrap();
    assert_eq!(game.outcome(), Some(WinCondition::HitlerExecuted));
    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(game.pending_action(), None);
    assert!(events.contains(&Event::Broadcast(PublicEvent::GameOver {
        condition: WinCondition::HitlerExecuted,
        winners: vec![Party::Liberal]
    })));
}

#[test]
fn propaganda_may_discard_the_top_card() {
    let mut game = create_xl_10_player_game();
    set_enacted(&mut game, PolicyKind::Communist, 1);
    stack_deck(&mut game, &[PolicyKind::Communist, PolicyKind::Liberal, PolicyKind::Liberal, PolicyKind::Fascist]);
    let events = enact(&mut game, 1, PolicyKind::Communist);

    assert_eq!(game.pending_action(), Some(ExecutiveAction::Propaganda));
    assert!(events.contains(&Event::Private {
        recipient: id(0),
        event: PrivateEvent::PeekedPolicies { policies: vec![PolicyKind::Fascist] },
    }));

    let (deck, discard) = (game.deck.count(), game.deck.discard_count());
    assert_eq!(game.resolve_executive_action(&id(0), ActionChoice::Acknowledge), Err(GameError::InvalidChoice));
    game.resolve_executive_action(&id(0), ActionChoice::Discard(true)).unwrap();
    assert_eq!(game.deck.count(), deck - 1);
    assert_eq!(game.deck.discard_count(), discard + 1);
    assert_eq!(game.deck.discard.last(), Some(&PolicyKind::Fascist));
}

#[test]
fn propaganda_is_not_part_of_the_standard_game() {
    let mut game = create_standard_5_player_game();
    game.phase = Phase::ExecutiveAction;
    game.pending_action = Some(ExecutiveAction::Propaganda);

    let err = game.resolve_executive_action(&id(0), ActionChoice::Discard(false)).unwrap_err();
    assert_eq!(err, GameError::UnsupportedAction { mode: "standard", action: "propaganda" });
    assert!(!Mode::Standard.supports(ExecutiveAction::Propaganda));
}

#[test]
fn the_first_anarchist_policy_grants_an_execution() {
    let mut game = create_xl_10_player_game();
    stack_deck(&mut game, &[PolicyKind::Anarchist, PolicyKind::Liberal, PolicyKind::Liberal]);
    enact(&mut game, 1, PolicyKind::Anarchist);

    assert_eq!(game.pending_action(), Some(ExecutiveAction::Execution));
    assert!(!game.anarchy_execution_available);
    game.resolve_executive_action(&id(0), ActionChoice::Player(id(2))).unwrap();
    assert!(!game.players[2].alive());

    stack_deck(&mut game, &[PolicyKind::Anarchist, PolicyKind::Liberal, PolicyKind::Liberal]);
    enact(&mut game, 3, PolicyKind::Anarchist);
    assert_eq!(game.enacted(PolicyKind::Anarchist), 2);
    assert_eq!(game.pending_action(), None);
    assert_eq!(game.phase(), Phase::Nomination);
}

#[test]
fn powers_fire_once_per_slot() {
    let mut game = create_standard_5_player_game();
    grant_fascist_power(&mut game, 2);
    game.resolve_executive_action(&id(0), ActionChoice::Acknowledge).unwrap();

    // Put the third slot back in reach without clearing its used flag.
    game.board.enacted.insert(PolicyKind::Fascist, 2);
    stack_deck(&mut game, &[PolicyKind::Fascist, PolicyKind::Liberal, PolicyKind::Liberal]);
    enact(&mut game, 2, PolicyKind::Fascist);
    assert_eq!(game.pending_action(), None);
    assert_eq!(game.phase(), Phase::Nomination);
}
