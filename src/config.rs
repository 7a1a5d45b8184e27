// Configuration module for reading Engine.toml
// Every tunable the simulator, value fields and search use lives here so tests
// can vary them without recompiling

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub board: BoardConfig,
    pub rules: RulesConfig,
    pub timing: TimingConfig,
    pub danger: DangerConfig,
    pub value: ValueConfig,
    pub center: CenterConfig,
    pub search: SearchConfig,
    pub debug: DebugConfig,
}

/// Fixed board dimensions; the protocol never re-sends them
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub height: usize,
    pub width: usize,
}

/// Game rule constants used by the simulator and move legality
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RulesConfig {
    pub shield_cost: i32,
    pub shield_duration: u32,
    pub shield_cooldown_ticks: u32,
    pub trap_penalty: i32,
    pub growth_per_item: usize,
    pub droplet_cap: u8,
}

/// Wall-clock budget and deepening limits
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub safety_margin_ms: u64,
    pub max_search_depth: u32,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms
            .saturating_sub(self.safety_margin_ms)
    }
}

/// Danger field seeding and propagation
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DangerConfig {
    pub wall_cost_base: f64,
    pub wall_cost_per_tick: f64,
    pub trap_cost: f64,
    pub decay: f64,
    pub threshold: f64,
    pub head_risk_penalty: f64,
}

impl DangerConfig {
    /// Cost of an obstacle cell given how much of the game is left
    pub fn obstacle_cost(&self, remaining_ticks: u32) -> f64 {
        self.wall_cost_base + self.wall_cost_per_tick * remaining_ticks as f64
    }
}

/// Object-value field weighting
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ValueConfig {
    pub growth_value: f64,
    pub lock_on_exponent: f64,
    pub edge_margin: i32,
    pub edge_decay: f64,
    pub competition_decay: f64,
    pub correction: f64,
    pub trap_value: f64,
}

/// End-game pull toward the board center
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CenterConfig {
    pub window_ticks: u32,
    pub emergence_value: f64,
    pub end_value: f64,
    pub plateau_radius: i32,
}

/// Utility weights and opponent enumeration limits
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    pub radius_base: i32,
    pub radius_per_depth: i32,
    pub max_gambling_opponents: usize,
    pub score_weight: f64,
    pub depth_discount: f64,
    pub lookahead_discount: f64,
    pub death_penalty: f64,
    pub head_to_head_death_factor: f64,
    pub shield_use_cost: f64,
    pub opponent_shield_weight: f64,
    pub kill_reward: f64,
    pub trapped_penalty: f64,
    pub tie_epsilon: f64,
}

impl SearchConfig {
    /// Manhattan radius inside which opponents are enumerated at a given depth
    pub fn gambling_radius(&self, depth: u32) -> i32 {
        self.radius_base + self.radius_per_depth * depth as i32
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Engine.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text and checks value ranges
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Engine.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Engine.toml")
    }

    /// Rejects values the simulator or search cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.board.height == 0 || self.board.width == 0 {
            return Err("board dimensions must be positive".to_string());
        }
        if self.rules.droplet_cap == 0 || self.rules.droplet_cap > 21 {
            return Err(format!(
                "rules.droplet_cap must be within 1..=21, got {}",
                self.rules.droplet_cap
            ));
        }
        if !(self.danger.decay > 0.0 && self.danger.decay < 1.0) {
            return Err(format!(
                "danger.decay must be within (0, 1), got {}",
                self.danger.decay
            ));
        }
        if self.danger.threshold <= 0.0 {
            return Err("danger.threshold must be positive".to_string());
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Engine.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                height: 30,
                width: 40,
            },
            rules: RulesConfig {
                shield_cost: 20,
                shield_duration: 5,
                shield_cooldown_ticks: 30,
                trap_penalty: 10,
                growth_per_item: 2,
                droplet_cap: 20,
            },
            timing: TimingConfig {
                response_time_budget_ms: 900,
                safety_margin_ms: 100,
                max_search_depth: 12,
            },
            danger: DangerConfig {
                wall_cost_base: 50.0,
                wall_cost_per_tick: 1.0,
                trap_cost: 5.0,
                decay: 0.5,
                threshold: 1.0,
                head_risk_penalty: 20.0,
            },
            value: ValueConfig {
                growth_value: 3.0,
                lock_on_exponent: 2.0,
                edge_margin: 2,
                edge_decay: 0.8,
                competition_decay: 0.5,
                correction: 10.0,
                trap_value: -15.0,
            },
            center: CenterConfig {
                window_ticks: 40,
                emergence_value: 30.0,
                end_value: 10.0,
                plateau_radius: 3,
            },
            search: SearchConfig {
                radius_base: 3,
                radius_per_depth: 1,
                max_gambling_opponents: 3,
                score_weight: 1.0,
                depth_discount: 0.9,
                lookahead_discount: 0.5,
                death_penalty: -1000.0,
                head_to_head_death_factor: 0.5,
                shield_use_cost: -5.0,
                opponent_shield_weight: -10.0,
                kill_reward: 50.0,
                trapped_penalty: -500.0,
                tie_epsilon: 1e-6,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "engine_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Engine.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.effective_budget_ms(), 800);
    }

    #[test]
    fn test_gambling_radius_grows_with_depth() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.gambling_radius(0), 3);
        assert_eq!(config.search.gambling_radius(4), 7);
    }

    #[test]
    fn test_engine_toml_can_be_parsed() {
        let result = Config::from_file("Engine.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Engine.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_engine_toml_matches_hardcoded_defaults() {
        let file_config = Config::from_file("Engine.toml").expect("Engine.toml should be parseable");
        assert_eq!(file_config, Config::default_hardcoded());
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_decay_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.danger.decay = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_droplet_cap_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.rules.droplet_cap = 22;
        assert!(config.validate().is_err());
    }
}
