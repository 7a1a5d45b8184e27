// Debug logging module for per-tick decision records
//
// Each tick's raw input and chosen action is appended to a JSONL file so the
// replay tool can re-run the engine on exactly the same state later.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;

use crate::bot::Decision;

/// Represents a single debug log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub tick: u32,
    /// Wire code of the chosen action
    pub action: u8,
    pub depth: Option<u32>,
    /// Protocol text the decision was made from
    pub input: String,
    pub timestamp: String,
}

/// Append-only JSONL writer, a no-op when disabled
pub struct DebugLogger {
    file: Option<File>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                info!("Debug logging enabled: {}", log_file_path);
                DebugLogger { file: Some(file) }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Records one decision; failures are reported and otherwise ignored
    pub fn log_decision(&mut self, tick: u32, input: &str, decision: &Decision) {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return,
        };

        let entry = DebugLogEntry {
            tick,
            action: decision.action.code(),
            depth: decision.depth,
            input: input.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match serde_json::to_string(&entry) {
            Ok(json_line) => {
                if let Err(e) = writeln!(file, "{}", json_line) {
                    error!("Failed to write debug log entry: {}", e);
                } else if let Err(e) = file.flush() {
                    error!("Failed to flush debug log: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
            }
        }
    }
}
