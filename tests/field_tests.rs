// Integration tests for the value fields
//
// Danger must never drop when obstacles are added, and normalization must be
// stable once a field already has the target mean.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_tick_engine::config::Config;
use snake_tick_engine::field::Field;
use snake_tick_engine::game::{Game, SnakeInfo};
use snake_tick_engine::types::{Action, ObjectTag, Point};
use snake_tick_engine::values::{combine_with_danger, danger_field, value_field};

fn random_walls(rng: &mut StdRng, game: &mut Game, count: usize) {
    for _ in 0..count {
        let p = Point::new(
            rng.random_range(0..game.height() as i32),
            rng.random_range(0..game.width() as i32),
        );
        game.place_object(p, ObjectTag::Wall).unwrap();
    }
}

#[test]
fn test_adding_walls_never_lowers_danger() {
    let config = Config::default_hardcoded();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let mut game = Game::new(12, 12, 60, 0);
        random_walls(&mut rng, &mut game, 15);
        let before = danger_field(&game, &config);

        random_walls(&mut rng, &mut game, 5);
        let after = danger_field(&game, &config);

        for p in before.points() {
            assert!(
                after[p] >= before[p],
                "danger at {:?} dropped from {} to {}",
                p,
                before[p],
                after[p]
            );
        }
    }
}

#[test]
fn test_danger_rises_with_remaining_ticks() {
    let config = Config::default_hardcoded();
    let mut early = Game::new(10, 10, 200, 0);
    early.place_object(Point::new(4, 4), ObjectTag::Wall).unwrap();
    let mut late = early.clone();
    late.remaining_ticks = 5;

    let early_danger = danger_field(&early, &config);
    let late_danger = danger_field(&late, &config);

    assert!(early_danger[Point::new(4, 4)] > late_danger[Point::new(4, 4)]);
}

#[test]
fn test_standardize_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut field = Field::filled(6, 9, 0.0);
    for p in field.points().collect::<Vec<_>>() {
        field[p] = rng.random_range(0.5..10.0);
    }

    let once = field.standardize(3.0);
    let twice = once.standardize(3.0);

    assert!((once.mean() - 3.0).abs() < 1e-9);
    for p in once.points() {
        assert!((once[p] - twice[p]).abs() < 1e-9);
    }
}

#[test]
fn test_danger_caps_value_on_obstacles_only() {
    let config = Config::default_hardcoded();
    // Board corners are dangerous too, so keep the item far from all of them
    let mut game = Game::new(20, 20, 50, 0);
    game.place_object(Point::new(0, 0), ObjectTag::Wall).unwrap();
    game.place_object(Point::new(10, 10), ObjectTag::Score(10)).unwrap();
    game.add_snake(SnakeInfo {
        id: 1,
        alive: true,
        name: "me".to_string(),
        score: 0,
        last_action: Action::Left,
        shield_cooldown: 0,
        shield_time: 0,
        body: vec![Point::new(10, 13)].into_iter().collect(),
    })
    .unwrap();

    let value = value_field(&game, &config);
    let danger = danger_field(&game, &config);
    let safe = combine_with_danger(&value, &danger);

    assert!(safe[Point::new(0, 0)] < 0.0);
    assert_eq!(danger[Point::new(10, 10)], 0.0);
    assert_eq!(safe[Point::new(10, 10)], value[Point::new(10, 10)]);
}

#[test]
fn test_extra_escape_never_raises_danger() {
    let config = Config::default_hardcoded();
    let mut one_wall = Game::new(12, 12, 60, 0);
    one_wall.place_object(Point::new(4, 5), ObjectTag::Wall).unwrap();
    let mut two_walls = one_wall.clone();
    two_walls.place_object(Point::new(6, 5), ObjectTag::Wall).unwrap();

    let open = danger_field(&one_wall, &config);
    let closed = danger_field(&two_walls, &config);

    assert!(closed[Point::new(5, 5)] >= open[Point::new(5, 5)]);
    assert!(closed[Point::new(5, 5)] > 0.0);
}
