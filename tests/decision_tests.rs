// End-to-end tests for the decision driver
//
// Tests that:
// 1. A lone snake steps onto an adjacent score item
// 2. An already expired deadline still yields a sensible action
// 3. Protocol input, debug log and replay agree with each other

use snake_tick_engine::bot::Bot;
use snake_tick_engine::config::Config;
use snake_tick_engine::debug_logger::DebugLogger;
use snake_tick_engine::game::{Game, SnakeInfo};
use snake_tick_engine::protocol::{encode_action, parse_game};
use snake_tick_engine::replay::ReplayEngine;
use snake_tick_engine::types::{Action, ObjectTag, Point};
use std::time::Instant;

fn shallow_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.timing.max_search_depth = 2;
    config
}

/// 30x40 board, one snake of length 1 at (5,5), a score item worth 3 at (5,6)
fn lone_snake_next_to_item() -> Game {
    let mut game = Game::new(30, 40, 200, 0);
    game.place_object(Point::new(5, 6), ObjectTag::Score(3)).unwrap();
    game.add_snake(SnakeInfo {
        id: 1,
        alive: true,
        name: "me".to_string(),
        score: 0,
        last_action: Action::Right,
        shield_cooldown: 0,
        shield_time: 0,
        body: vec![Point::new(5, 5)].into_iter().collect(),
    })
    .unwrap();
    game
}

#[test]
fn test_steps_onto_adjacent_score_item() {
    let config = shallow_config();
    let rules = config.rules.clone();
    let bot = Bot::new(config);
    let mut game = lone_snake_next_to_item();
    let before = game.clone();

    let decision = bot.decide(&mut game);

    assert_eq!(decision.action, Action::Right);
    assert!(decision.depth.is_some());
    assert_eq!(game, before, "search must leave the game untouched");

    game.apply_tick(&[decision.action], &rules);
    let me = game.my_snake();
    assert_eq!(me.score, 3);
    assert_eq!(me.body.len(), 1);
    assert_eq!(me.head(), Point::new(5, 6));
}

#[test]
fn test_expired_deadline_falls_back_to_value_field() {
    let bot = Bot::new(shallow_config());
    let mut game = lone_snake_next_to_item();

    let decision = bot.decide_until(&mut game, Instant::now());

    assert_eq!(decision.depth, None);
    assert_eq!(decision.utility, None);
    assert_eq!(decision.action, Action::Right);
    assert_eq!(game.pending_ticks(), 0);
}

#[test]
fn test_search_stops_at_remaining_ticks() {
    let mut config = Config::default_hardcoded();
    config.timing.max_search_depth = 10;
    let bot = Bot::new(config);
    let mut game = lone_snake_next_to_item();
    game.remaining_ticks = 2;

    let decision = bot.decide(&mut game);

    assert_eq!(decision.depth, Some(1));
}

#[test]
fn test_protocol_log_and_replay_agree() {
    let config = shallow_config();
    let input = "200 1\n1\n5 6 3\n1\n1 me 1 0 2 0 0\n5 5\n";
    let path = std::env::temp_dir().join(format!(
        "snake_tick_engine_replay_{}.jsonl",
        std::process::id()
    ));
    let path_str = path.to_string_lossy().to_string();

    let mut game = parse_game(input, &config.board).unwrap();
    let bot = Bot::new(config.clone());
    let decision = bot.decide(&mut game);
    assert_eq!(encode_action(decision.action), "2");

    let mut logger = DebugLogger::new(true, &path_str);
    logger.log_decision(game.remaining_ticks, input, &decision);
    drop(logger);

    let engine = ReplayEngine::new(config, false);
    let entries = engine.load_log_file(&path).unwrap();
    let results = engine.replay_ticks(&entries, &[200]).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(results.len(), 1);
    assert!(results[0].matches);
    let stats = engine.generate_stats(&results);
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.mismatches, 0);
}
