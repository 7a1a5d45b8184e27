// Library exports for the tick engine
// This allows the replay tool and integration tests to use the core engine

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod field;
pub mod game;
pub mod protocol;
pub mod replay;
pub mod search;
pub mod types;
pub mod values;
