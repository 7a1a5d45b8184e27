// Replay module for re-running recorded ticks and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the engine on each recorded protocol input
// 3. Compare recorded vs replayed actions
// 4. Summarize the comparison

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::protocol::parse_game;
use crate::types::Action;

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub tick: u32,
    pub original_action: Action,
    pub replayed_action: Action,
    pub matches: bool,
    pub utility: Option<f64>,
    pub search_depth: Option<u32>,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    bot: Bot,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DebugLogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DebugLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DebugLogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying tick {}...", entry.tick);
        }

        let original_action = Action::from_code(i64::from(entry.action))
            .ok_or_else(|| format!("Invalid action code: {}", entry.action))?;
        let mut game = parse_game(&entry.input, &self.bot.config().board)?;
        let decision = self.bot.decide(&mut game);

        let matches = original_action == decision.action;
        let result = ReplayResult {
            tick: entry.tick,
            original_action,
            replayed_action: decision.action,
            matches,
            utility: decision.utility,
            search_depth: decision.depth,
            computation_time_ms: decision.elapsed_ms,
        };

        if self.verbose {
            if matches {
                info!(
                    "Tick {}: MATCH - {} (utility: {:?}, depth: {:?}, time: {}ms)",
                    entry.tick,
                    result.replayed_action.as_str(),
                    result.utility,
                    result.search_depth,
                    result.computation_time_ms
                );
            } else {
                warn!(
                    "Tick {}: MISMATCH - Original: {}, Replayed: {} (utility: {:?}, depth: {:?}, time: {}ms)",
                    entry.tick,
                    original_action.as_str(),
                    result.replayed_action.as_str(),
                    result.utility,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", entry.tick, e);
                }
            }
        }

        results
    }

    /// Replays the entries recorded at the given remaining-tick counts
    pub fn replay_ticks(
        &self,
        entries: &[DebugLogEntry],
        ticks: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for tick in ticks {
            let entry = entries
                .iter()
                .find(|e| e.tick == *tick)
                .ok_or_else(|| format!("Tick {} not found in log file", tick))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", tick, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_ticks,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n===========================================================");
        println!("                    REPLAY REPORT");
        println!("===========================================================");
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("===========================================================\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let completed: Vec<f64> = results
                .iter()
                .filter_map(|r| r.search_depth)
                .map(f64::from)
                .collect();

            if !completed.is_empty() {
                let avg_depth = completed.iter().sum::<f64>() / completed.len() as f64;
                println!("Average Search Depth:       {:.1}", avg_depth);
            }
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("===========================================================");
            println!("                  DETAILED MISMATCHES");
            println!("===========================================================");

            for result in mismatches {
                println!(
                    "Tick {}: {} -> {} (utility: {:?}, depth: {:?}, time: {}ms)",
                    result.tick,
                    result.original_action.as_str(),
                    result.replayed_action.as_str(),
                    result.utility,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Accepts either an action name or its wire code
    pub fn parse_action(s: &str) -> Result<Action, String> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Action::from_code(code).ok_or_else(|| format!("Invalid action code: {}", s));
        }
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Invalid action: {}", s))
    }
}
