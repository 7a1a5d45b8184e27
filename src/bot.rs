// Decision driver
//
// Builds the value fields once per tick, deepens the search while time and
// remaining ticks allow, and turns the best completed depth into one action.

use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::field::Field;
use crate::game::Game;
use crate::search::{Search, SearchAborted};
use crate::types::Action;
use crate::values::{combine_with_danger, danger_field, value_field};

/// What the driver chose and how far it got
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    /// Deepest fully completed search depth, if any
    pub depth: Option<u32>,
    /// Utility of the chosen action at that depth
    pub utility: Option<f64>,
    /// Actions tied for the best utility before tie-breaking
    pub candidates: Vec<Action>,
    pub nodes: u64,
    pub elapsed_ms: u128,
}

/// Move-selection engine with OOP-style API
/// Takes static configuration and re-derives its whole value model every tick
pub struct Bot {
    config: Config,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chooses an action within the configured time budget
    pub fn decide(&self, game: &mut Game) -> Decision {
        let budget = Duration::from_millis(self.config.timing.effective_budget_ms());
        self.decide_until(game, Instant::now() + budget)
    }

    /// Chooses an action, searching until `deadline` at the latest
    ///
    /// The game is left exactly as it was passed in.
    pub fn decide_until(&self, game: &mut Game, deadline: Instant) -> Decision {
        let start_time = Instant::now();
        let config = &self.config;
        let me = game.me;

        info!(
            "Tick {}: computing action for snake {}",
            game.remaining_ticks,
            game.my_snake().id
        );

        let legal = game.legal_actions(me, &config.rules);
        if legal.is_empty() {
            warn!("No legal actions available, defaulting to shield");
            return Decision {
                action: Action::Shield,
                depth: None,
                utility: None,
                candidates: Vec::new(),
                nodes: 0,
                elapsed_ms: start_time.elapsed().as_millis(),
            };
        }

        let raw_value = value_field(game, config);
        let root_danger = danger_field(game, config);
        let safe_value = combine_with_danger(&raw_value, &root_danger);
        trace!(
            "Value field mean {:.3}, danger field mean {:.3}",
            raw_value.mean(),
            root_danger.mean()
        );

        let mut search = Search::new(config, deadline);
        let mut best = legal.clone();
        let mut best_utility = None;
        let mut completed = None;
        let mut depth = 0;

        loop {
            if depth > config.timing.max_search_depth {
                debug!("Stopping search: reached max depth ({})", depth);
                break;
            }
            if depth >= game.remaining_ticks {
                debug!("Stopping search: depth {} covers the rest of the game", depth);
                break;
            }
            if Instant::now() >= deadline {
                debug!("Stopping search: budget spent before depth {}", depth);
                break;
            }

            match Self::search_depth(&mut search, game, &legal, &safe_value, &raw_value, depth) {
                Ok((actions, utility)) => {
                    debug!(
                        "Depth {} complete: best {:?} (utility {:.3}, nodes {})",
                        depth,
                        actions,
                        utility,
                        search.nodes()
                    );
                    best = actions;
                    best_utility = Some(utility);
                    completed = Some(depth);
                }
                Err(SearchAborted) => {
                    debug!("Depth {} aborted at deadline, keeping previous depth", depth);
                    break;
                }
            }
            depth += 1;
        }

        let action = Self::break_tie(game, &best, &raw_value);
        let decision = Decision {
            action,
            depth: completed,
            utility: best_utility,
            candidates: best,
            nodes: search.nodes(),
            elapsed_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Tick {}: chose {} (utility: {:?}, depth: {:?}, nodes: {}, time: {}ms)",
            game.remaining_ticks,
            decision.action.as_str(),
            decision.utility,
            decision.depth,
            decision.nodes,
            decision.elapsed_ms
        );
        decision
    }

    /// Evaluates every legal root action at one depth
    ///
    /// Returns the actions tied for the best utility and that utility.
    fn search_depth(
        search: &mut Search<'_>,
        game: &mut Game,
        legal: &[Action],
        safe_value: &Field<f64>,
        raw_value: &Field<f64>,
        depth: u32,
    ) -> Result<(Vec<Action>, f64), SearchAborted> {
        let mut scored = Vec::with_capacity(legal.len());
        for &action in legal {
            let utility = search.utility_of_move(game, action, safe_value, raw_value, depth)?;
            trace!("Depth {}: {} -> {:.3}", depth, action.as_str(), utility);
            scored.push((action, utility));
        }

        let top = scored
            .iter()
            .map(|(_, u)| *u)
            .fold(f64::NEG_INFINITY, f64::max);
        let epsilon = search.tie_epsilon();
        let tied = scored
            .iter()
            .filter(|(_, u)| *u >= top - epsilon)
            .map(|(a, _)| *a)
            .collect();
        Ok((tied, top))
    }

    /// Picks among equally good actions by the raw value of the destination
    fn break_tie(game: &Game, candidates: &[Action], raw_value: &Field<f64>) -> Action {
        let head = game.my_snake().head();
        let mut chosen: Option<(Action, f64)> = None;
        for &action in candidates {
            let score = raw_value
                .get(action.apply(head))
                .copied()
                .unwrap_or(f64::NEG_INFINITY);
            match chosen {
                Some((_, best)) if best >= score => {}
                _ => chosen = Some((action, score)),
            }
        }
        chosen.map_or(Action::Shield, |(action, _)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SnakeInfo;
    use crate::types::{ObjectTag, Point};

    fn snake(id: i32, body: &[(i32, i32)], last_action: Action) -> SnakeInfo {
        SnakeInfo {
            id,
            alive: true,
            name: format!("snake-{}", id),
            score: 0,
            last_action,
            shield_cooldown: 0,
            shield_time: 0,
            body: body.iter().map(|&(r, c)| Point::new(r, c)).collect(),
        }
    }

    #[test]
    fn test_break_tie_prefers_richer_destination() {
        let mut game = Game::new(5, 5, 10, 0);
        game.add_snake(snake(0, &[(2, 2)], Action::Right)).unwrap();
        let mut value = Field::filled(5, 5, 0.0);
        value[Point::new(1, 2)] = 2.0;
        value[Point::new(2, 3)] = 1.0;

        let action = Bot::break_tie(&game, &[Action::Right, Action::Up], &value);

        assert_eq!(action, Action::Up);
    }

    #[test]
    fn test_break_tie_keeps_first_on_equal_values() {
        let mut game = Game::new(5, 5, 10, 0);
        game.add_snake(snake(0, &[(2, 2)], Action::Right)).unwrap();
        let value = Field::filled(5, 5, 1.0);

        let action = Bot::break_tie(&game, &[Action::Up, Action::Right], &value);

        assert_eq!(action, Action::Up);
    }

    #[test]
    fn test_trapped_snake_defaults_to_shield() {
        let bot = Bot::new(Config::default_hardcoded());
        let mut game = Game::new(5, 5, 10, 0);
        game.place_object(Point::new(1, 2), ObjectTag::Wall).unwrap();
        game.place_object(Point::new(2, 3), ObjectTag::Wall).unwrap();
        game.place_object(Point::new(3, 2), ObjectTag::Wall).unwrap();
        game.add_snake(snake(0, &[(2, 2), (2, 1)], Action::Right)).unwrap();

        let decision = bot.decide(&mut game);

        assert_eq!(decision.action, Action::Shield);
        assert_eq!(decision.depth, None);
    }
}
