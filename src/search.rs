// Deadline-bounded worst-case search over simulated ticks
//
// Nearby opponents ("gamblers") have every combination of their legal actions
// enumerated; everyone else repeats their default action. Each combination is
// applied on the shared Game, scored and revoked again, and a move is worth
// the worst case over all combinations.

use itertools::{Either, Itertools};
use std::fmt;
use std::time::Instant;

use crate::config::Config;
use crate::field::Field;
use crate::game::{DeathCause, Game, TickOutcome};
use crate::types::{Action, Point};
use crate::values::{combine_with_danger, danger_field};

/// The wall-clock deadline passed before the search finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAborted;

impl fmt::Display for SearchAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search deadline exceeded")
    }
}

impl std::error::Error for SearchAborted {}

/// Every combination of one action per gambling opponent
///
/// Yields one `Vec<Action>` per combination, first opponent varying slowest.
/// With no opponents there is exactly one, empty, combination.
pub fn action_combinations(choices: &[Vec<Action>]) -> impl Iterator<Item = Vec<Action>> + '_ {
    if choices.is_empty() {
        Either::Left(std::iter::once(Vec::new()))
    } else {
        Either::Right(
            choices
                .iter()
                .map(|c| c.iter().copied())
                .multi_cartesian_product(),
        )
    }
}

/// One search run sharing a deadline and node counter
pub struct Search<'a> {
    config: &'a Config,
    deadline: Instant,
    nodes: u64,
}

impl<'a> Search<'a> {
    pub fn new(config: &'a Config, deadline: Instant) -> Self {
        Search {
            config,
            deadline,
            nodes: 0,
        }
    }

    /// Simulated ticks evaluated so far
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Utilities this close to the best count as tied
    pub fn tie_epsilon(&self) -> f64 {
        self.config.search.tie_epsilon
    }

    /// Worst-case utility of the controlled snake taking `action` now
    ///
    /// `value_field` is the root value field already capped by the root
    /// danger; `value_field_no_danger` is the raw value field that gets capped
    /// by the danger of each simulated state. The one-step lookahead past
    /// the new head reads the root `value_field`. With `depth > 0` the best
    /// follow-up action is searched recursively. Every applied tick is
    /// revoked before this returns, including on abort.
    pub fn utility_of_move(
        &mut self,
        game: &mut Game,
        action: Action,
        value_field: &Field<f64>,
        value_field_no_danger: &Field<f64>,
        depth: u32,
    ) -> Result<f64, SearchAborted> {
        if Instant::now() > self.deadline {
            return Err(SearchAborted);
        }
        let config = self.config;
        let rules = &config.rules;
        let me = game.me;
        let my_head = game.snakes[me].head();

        let gamblers = self.gambling_opponents(game, my_head, depth);
        let choices: Vec<Vec<Action>> = gamblers
            .iter()
            .map(|&i| {
                let legal = game.legal_actions(i, rules);
                if legal.is_empty() {
                    vec![game.default_action(i)]
                } else {
                    legal
                }
            })
            .collect();

        let mut actions: Vec<Action> = (0..game.snakes.len())
            .map(|i| game.default_action(i))
            .collect();
        actions[me] = action;

        let before = CaseBaseline {
            score: game.snakes[me].score,
            shields: count_shielded(game, &gamblers),
        };

        let mut worst = f64::INFINITY;
        for combination in action_combinations(&choices) {
            for (slot, &i) in gamblers.iter().enumerate() {
                actions[i] = combination[slot];
            }
            self.nodes += 1;
            let outcome = game.apply_tick(&actions, rules);
            let case = self.score_case(
                game,
                &outcome,
                action,
                &gamblers,
                &before,
                value_field,
                value_field_no_danger,
                depth,
            );
            game.revoke_tick();
            worst = worst.min(case?);
        }
        Ok(worst)
    }

    /// Opponents close enough to matter at this depth, nearest first
    fn gambling_opponents(&self, game: &Game, my_head: Point, depth: u32) -> Vec<usize> {
        let search_config = &self.config.search;
        let radius = search_config.gambling_radius(depth);
        let mut nearby: Vec<(i32, usize)> = game
            .snakes
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != game.me && s.alive)
            .map(|(i, s)| (s.head().manhattan(my_head), i))
            .filter(|(distance, _)| *distance <= radius)
            .collect();
        nearby.sort_unstable();
        nearby
            .into_iter()
            .take(search_config.max_gambling_opponents)
            .map(|(_, i)| i)
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn score_case(
        &mut self,
        game: &mut Game,
        outcome: &TickOutcome,
        action: Action,
        gamblers: &[usize],
        before: &CaseBaseline,
        value_field: &Field<f64>,
        value_field_no_danger: &Field<f64>,
        depth: u32,
    ) -> Result<f64, SearchAborted> {
        let config = self.config;
        let search_config = &config.search;
        let me = game.me;

        let mut utility =
            (game.snakes[me].score - before.score) as f64 * search_config.score_weight;
        if action == Action::Shield {
            utility += search_config.shield_use_cost;
        }

        match outcome.cause_of(me) {
            Some(cause) => {
                let factor = if cause == DeathCause::HeadToHead {
                    search_config.head_to_head_death_factor
                } else {
                    1.0
                };
                utility += search_config.death_penalty * factor;
            }
            None => {
                let danger = danger_field(game, config);
                let combined = combine_with_danger(value_field_no_danger, &danger);
                let head = game.snakes[me].head();
                utility += combined[head];

                let beyond = head
                    .neighbors()
                    .iter()
                    .filter_map(|q| value_field.get(*q).copied())
                    .fold(f64::NEG_INFINITY, f64::max);
                if beyond.is_finite() {
                    utility += search_config.lookahead_discount * beyond;
                }
            }
        }

        let shields_after = count_shielded(game, gamblers);
        utility += search_config.opponent_shield_weight * (shields_after as f64 - before.shields as f64);
        let kills = gamblers.iter().filter(|&&i| outcome.died(i)).count();
        utility += search_config.kill_reward * kills as f64;

        if depth > 0 && game.snakes[me].alive && game.remaining_ticks > 0 {
            let follow_ups = game.legal_actions(me, &config.rules);
            let future = if follow_ups.is_empty() {
                search_config.trapped_penalty
            } else {
                let mut best = f64::NEG_INFINITY;
                for next in follow_ups {
                    let value = self.utility_of_move(
                        game,
                        next,
                        value_field,
                        value_field_no_danger,
                        depth - 1,
                    )?;
                    best = best.max(value);
                }
                best
            };
            utility += search_config.depth_discount * future;
        }

        Ok(utility)
    }
}

/// State of the controlled snake and gamblers before a simulated tick
struct CaseBaseline {
    score: i32,
    shields: usize,
}

fn count_shielded(game: &Game, indices: &[usize]) -> usize {
    indices
        .iter()
        .filter(|&&i| game.snakes[i].alive && game.snakes[i].is_shielded())
        .count()
}
