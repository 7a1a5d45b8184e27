// Value field builders
//
// Pure functions from a Game to per-cell scores: danger (expected cost of
// standing somewhere), object value (spread desirability of collectibles) and
// the end-game pull toward the center. All of them are rebuilt from scratch
// every tick.

use crate::config::Config;
use crate::field::Field;
use crate::game::Game;
use crate::types::{Action, ObjectTag, Point};

/// Distance of cells that cannot be reached
pub const UNREACHABLE: u32 = u32::MAX;

/// Danger of every cell for the controlled snake
///
/// Walls and other snakes' bodies are seeded with a cost that grows with the
/// remaining ticks, traps with a small fixed cost. Danger then spreads inward:
/// a cell inherits the smallest "three sides closed" level of its neighbours,
/// discounted per step, so a pocket is only dangerous when its exits are.
/// Off-board sides count as obstacles, so corners and edge pockets are
/// dangerous on their own. Cells next to an opponent's head, except the one
/// it just left, are overwritten with the head-to-head risk penalty
/// afterwards.
pub fn danger_field(game: &Game, config: &Config) -> Field<f64> {
    let danger_config = &config.danger;
    let (height, width) = (game.height(), game.width());
    let obstacle_cost = danger_config.obstacle_cost(game.remaining_ticks);

    let mut seeded: Field<bool> = Field::new(height, width);
    let mut seeds = Vec::new();
    for p in game.cells.points() {
        if let Some(cost) = seed_cost(game, p, obstacle_cost, danger_config.trap_cost) {
            seeded[p] = true;
            seeds.push((p, cost));
        }
    }
    // Border cells start the sweep too so the board edge relaxes its
    // neighbours even with no object nearby
    let border: Vec<(Point, f64)> = game
        .cells
        .points()
        .filter(|&p| !seeded[p] && is_border(p, height, width))
        .map(|p| (p, 0.0))
        .collect();
    seeds.extend(border);

    let decay = danger_config.decay;
    let threshold = danger_config.threshold;
    let mut danger = Field::filled(height, width, 0.0);
    danger.frontier_propagate(seeds, |field, p, update| {
        for q in p.neighbors().iter().copied() {
            if !field.contains(q) || seeded[q] {
                continue;
            }
            let candidate = decay * enclosure_level(field, q, obstacle_cost);
            if candidate >= threshold && candidate > field[q] {
                update(q, candidate);
            }
        }
    });

    for (index, snake) in game.snakes.iter().enumerate() {
        if index == game.me || !snake.alive {
            continue;
        }
        let head = snake.head();
        let behind = game
            .heading(index)
            .and_then(Action::opposite)
            .map(|back| back.apply(head));
        for q in head.neighbors().iter().copied() {
            if Some(q) == behind || !danger.contains(q) || seeded[q] {
                continue;
            }
            danger[q] = danger_config.head_risk_penalty;
        }
    }

    danger
}

fn is_border(p: Point, height: usize, width: usize) -> bool {
    p.row == 0 || p.col == 0 || p.row == height as i32 - 1 || p.col == width as i32 - 1
}

fn seed_cost(game: &Game, p: Point, obstacle_cost: f64, trap_cost: f64) -> Option<f64> {
    let cell = game.cells[p];
    if cell.object == ObjectTag::Wall {
        return Some(obstacle_cost);
    }
    if let Some(owner) = cell.snake {
        if owner != game.me && game.snakes[owner].alive {
            return Some(obstacle_cost);
        }
    }
    if cell.object == ObjectTag::Trap {
        return Some(trap_cost);
    }
    None
}

/// Min over the four ways of leaving one side open of the max danger of the
/// three closed sides; off-board sides count as `edge_cost`
fn enclosure_level(field: &Field<f64>, p: Point, edge_cost: f64) -> f64 {
    let sides = p
        .neighbors()
        .map(|q| field.get(q).copied().unwrap_or(edge_cost));
    (0..sides.len())
        .map(|open| {
            sides
                .iter()
                .enumerate()
                .filter(|(side, _)| *side != open)
                .map(|(_, v)| *v)
                .fold(f64::MIN, f64::max)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Shortest step count from `from` to every cell
///
/// Walls and traps are never entered. Cells held by snakes other than the
/// controlled one get a distance but are not walked through.
pub fn distance_field(game: &Game, from: Point) -> Field<u32> {
    let mut dist = Field::filled(game.height(), game.width(), UNREACHABLE);
    dist.frontier_propagate(std::iter::once((from, 0)), |field, p, update| {
        if p != from && held_by_other(game, p) {
            return;
        }
        let next = field[p] + 1;
        for q in p.neighbors().iter().copied() {
            match field.get(q) {
                Some(&d) if d > next && !impassable(game, q) => update(q, next),
                _ => {}
            }
        }
    });
    dist
}

fn impassable(game: &Game, p: Point) -> bool {
    matches!(game.cells[p].object, ObjectTag::Wall | ObjectTag::Trap)
}

fn held_by_other(game: &Game, p: Point) -> bool {
    match game.cells[p].snake {
        Some(owner) => owner != game.me && game.snakes[owner].alive,
        None => false,
    }
}

/// Desirability of every cell derived from collectibles on the map
pub fn object_value_field(game: &Game, config: &Config) -> Field<f64> {
    let value_config = &config.value;
    let (height, width) = (game.height(), game.width());

    let sources: Vec<(Point, f64)> = game
        .cells
        .points()
        .filter_map(|p| match game.cells[p].object {
            ObjectTag::Score(v) => Some((p, v as f64)),
            ObjectTag::Growth => Some((p, value_config.growth_value)),
            _ => None,
        })
        .collect();

    let mut result = Field::filled(height, width, 0.0);
    if !sources.is_empty() {
        let spreads: Vec<Field<f64>> = sources
            .iter()
            .map(|&(p, value)| {
                distance_field(game, p).map(|&d| {
                    if d == UNREACHABLE {
                        0.0
                    } else {
                        value / (d as f64 + 1.0)
                    }
                })
            })
            .collect();

        let total = spreads
            .iter()
            .fold(Field::filled(height, width, 0.0), |acc, spread| &acc + spread);
        let normalized = total.standardize(1.0);

        let head = game.my_snake().head();
        let mean_at_head = spreads.iter().map(|s| s[head]).sum::<f64>() / spreads.len() as f64;
        let norm_at_head = normalized[head];
        let rival_heads: Vec<Point> = game
            .snakes
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != game.me && s.alive)
            .map(|(_, s)| s.head())
            .collect();

        for (spread, &(source, _)) in spreads.iter().zip(sources.iter()) {
            let at_head = spread[head];
            let lock_on = if mean_at_head > 0.0 {
                (at_head / mean_at_head).powf(value_config.lock_on_exponent)
            } else {
                1.0
            };
            let competition = if rival_heads.iter().any(|&h| spread[h] >= at_head) {
                value_config.competition_decay
            } else {
                1.0
            };
            let weight = lock_on
                * (1.0 + norm_at_head)
                * edge_discount(source, height, width, value_config.edge_margin, value_config.edge_decay)
                * competition;
            result = result.max_with(&(spread * weight));
        }
        result = &result * value_config.correction;
    }

    for p in game.cells.points() {
        if game.cells[p].object == ObjectTag::Trap {
            result[p] += value_config.trap_value;
        }
    }
    result
}

fn edge_discount(p: Point, height: usize, width: usize, margin: i32, decay: f64) -> f64 {
    let edge = p
        .row
        .min(p.col)
        .min(height as i32 - 1 - p.row)
        .min(width as i32 - 1 - p.col);
    if edge < margin {
        decay.powi(margin - edge)
    } else {
        1.0
    }
}

/// End-game incentive toward the middle of the board
///
/// Zero outside the last `window_ticks` ticks. Inside the window the base
/// value slides from the emergence constant to the end constant and falls
/// off with distance beyond a plateau around the center.
pub fn center_value_field(game: &Game, config: &Config) -> Field<f64> {
    let center_config = &config.center;
    let (height, width) = (game.height(), game.width());
    let mut field = Field::filled(height, width, 0.0);

    let window = center_config.window_ticks;
    if window == 0 || game.remaining_ticks > window {
        return field;
    }
    let progress = 1.0 - game.remaining_ticks as f64 / window as f64;
    let base = center_config.emergence_value * (1.0 - progress) + center_config.end_value * progress;
    let center = Point::new((height as i32 - 1) / 2, (width as i32 - 1) / 2);

    for p in field.points().collect::<Vec<_>>() {
        let distance = p.manhattan(center);
        field[p] = if distance <= center_config.plateau_radius {
            base
        } else {
            base / (1 + distance - center_config.plateau_radius) as f64
        };
    }
    field
}

/// Object value plus center value, before any danger is applied
pub fn value_field(game: &Game, config: &Config) -> Field<f64> {
    &object_value_field(game, config) + &center_value_field(game, config)
}

/// Caps a value field by danger, cell by cell
///
/// Dangerous cells are worth at most minus their danger; safe cells keep
/// their value.
pub fn combine_with_danger(value: &Field<f64>, danger: &Field<f64>) -> Field<f64> {
    let ceiling = danger.map(|&d| if d > 0.0 { -d } else { f64::INFINITY });
    value.min_with(&ceiling)
}
