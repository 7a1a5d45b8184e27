use log::{error, info};
use std::env;
use std::io::{self, Read};
use std::process;

use snake_tick_engine::bot::Bot;
use snake_tick_engine::config::Config;
use snake_tick_engine::debug_logger::DebugLogger;
use snake_tick_engine::protocol::{encode_action, parse_game};

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead. Logs go to stderr, stdout carries only the action.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let config = Config::load_or_default();

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        error!("Failed to read tick input: {}", e);
        process::exit(1);
    }

    let mut game = match parse_game(&input, &config.board) {
        Ok(game) => game,
        Err(e) => {
            error!("Failed to parse tick input: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Parsed tick {} with {} snakes",
        game.remaining_ticks,
        game.snakes.len()
    );

    let mut debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);
    let tick = game.remaining_ticks;
    let bot = Bot::new(config);
    let decision = bot.decide(&mut game);

    debug_logger.log_decision(tick, &input, &decision);
    println!("{}", encode_action(decision.action));
}
