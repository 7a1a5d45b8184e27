// Integration tests for the reversible simulator
//
// Covers:
// 1. Exact undo over random action sequences
// 2. Simultaneous head-to-head resolution and its revocation
// 3. Legality gating through the public API

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_tick_engine::config::Config;
use snake_tick_engine::game::{DeathCause, Game, SnakeInfo};
use snake_tick_engine::types::{Action, ObjectTag, Point};

fn snake(id: i32, body: &[(i32, i32)], score: i32, last_action: Action) -> SnakeInfo {
    SnakeInfo {
        id,
        alive: true,
        name: format!("snake-{}", id),
        score,
        last_action,
        shield_cooldown: 0,
        shield_time: 0,
        body: body.iter().map(|&(r, c)| Point::new(r, c)).collect(),
    }
}

/// Small crowded board with every object type near the snakes
fn crowded_game() -> Game {
    let mut game = Game::new(8, 8, 40, 0);
    game.place_object(Point::new(2, 2), ObjectTag::Score(5)).unwrap();
    game.place_object(Point::new(3, 5), ObjectTag::Growth).unwrap();
    game.place_object(Point::new(5, 2), ObjectTag::Trap).unwrap();
    game.place_object(Point::new(4, 4), ObjectTag::Wall).unwrap();
    game.place_object(Point::new(6, 6), ObjectTag::Score(21)).unwrap();
    game.add_snake(snake(1, &[(3, 3), (3, 2), (3, 1)], 30, Action::Right))
        .unwrap();
    game.add_snake(snake(2, &[(5, 5), (6, 5)], 45, Action::Up)).unwrap();
    game.add_snake(snake(3, &[(1, 6), (1, 7), (0, 7)], 5, Action::Left))
        .unwrap();
    game
}

#[test]
fn test_random_sequences_revoke_exactly() {
    let rules = Config::default_hardcoded().rules;
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let mut game = crowded_game();
        let snapshot = game.clone();
        let depth = rng.random_range(1..=12);

        let mut states = Vec::with_capacity(depth);
        for _ in 0..depth {
            states.push(game.clone());
            let actions: Vec<Action> = (0..game.snakes.len())
                .map(|_| Action::ALL[rng.random_range(0..Action::ALL.len())])
                .collect();
            game.apply_tick(&actions, &rules);
        }
        assert_eq!(game.pending_ticks(), depth);

        while let Some(before) = states.pop() {
            game.revoke_tick();
            assert_eq!(game, before);
        }
        assert_eq!(game, snapshot);
        assert_eq!(game.pending_ticks(), 0);
    }
}

#[test]
fn test_head_to_head_kills_both_and_revokes() {
    let rules = Config::default_hardcoded().rules;
    let mut game = Game::new(30, 40, 100, 0);
    game.place_object(Point::new(4, 5), ObjectTag::Wall).unwrap();
    game.place_object(Point::new(6, 5), ObjectTag::Wall).unwrap();
    game.add_snake(snake(1, &[(5, 5), (5, 4)], 0, Action::Right))
        .unwrap();
    game.add_snake(snake(2, &[(5, 7), (5, 8)], 0, Action::Left))
        .unwrap();
    let before = game.clone();

    let outcome = game.apply_tick(&[Action::Right, Action::Left], &rules);

    assert_eq!(outcome.cause_of(0), Some(DeathCause::HeadToHead));
    assert_eq!(outcome.cause_of(1), Some(DeathCause::HeadToHead));
    assert!(!game.snakes[0].alive);
    assert!(!game.snakes[1].alive);
    assert_eq!(game.cells[Point::new(5, 6)].snake, None);

    game.revoke_tick();

    assert_eq!(game, before);
    assert!(game.snakes.iter().all(|s| s.alive));
    assert_eq!(game.cells[Point::new(5, 5)].snake, Some(0));
    assert_eq!(game.cells[Point::new(5, 7)].snake, Some(1));
}

#[test]
fn test_legal_actions_respect_every_gate() {
    let rules = Config::default_hardcoded().rules;
    let mut game = Game::new(6, 6, 10, 0);
    game.place_object(Point::new(0, 1), ObjectTag::Wall).unwrap();
    // Heading left along the top edge towards a wall, too poor to shield
    game.add_snake(snake(1, &[(0, 2), (0, 3)], rules.shield_cost - 1, Action::Left))
        .unwrap();
    game.add_snake(snake(2, &[(1, 2), (1, 3)], 0, Action::Left))
        .unwrap();

    // Left is a wall, Up is off-board, Right reverses, Down is the other snake
    assert!(game.legal_actions(0, &rules).is_empty());

    game.snakes[0].score = rules.shield_cost;
    assert_eq!(game.legal_actions(0, &rules), vec![Action::Shield]);

    game.snakes[0].shield_cooldown = 1;
    assert!(!game.can_act(0, Action::Shield, &rules));

    game.remaining_ticks = 0;
    assert!(game.legal_actions(1, &rules).is_empty());
}

#[test]
fn test_reversal_is_illegal_everywhere() {
    let rules = Config::default_hardcoded().rules;
    for row in 0..6 {
        for col in 0..6 {
            for &heading in Action::MOVES.iter() {
                let mut game = Game::new(6, 6, 10, 0);
                game.add_snake(snake(1, &[(row, col)], 0, heading)).unwrap();

                let reverse = heading.opposite().unwrap();
                assert!(!game.can_act(0, reverse, &rules));

                let ahead = heading.apply(Point::new(row, col));
                let on_board = ahead.row >= 0 && ahead.row < 6 && ahead.col >= 0 && ahead.col < 6;
                assert_eq!(game.can_act(0, heading, &rules), on_board);
            }
        }
    }
}
