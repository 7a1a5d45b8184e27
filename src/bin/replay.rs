// Standalone replay tool for analyzing engine debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all ticks
//   --ticks <t1,t2>        Replay specific ticks (comma-separated remaining-tick counts)
//   --verbose              Show detailed output for each tick
//   --config <path>        Path to Engine.toml (default: Engine.toml)

use std::env;
use std::process;

use snake_tick_engine::config::Config;
use snake_tick_engine::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Snake Tick Engine Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all ticks in the log");
    eprintln!("  --ticks <T1,T2,...>     Replay specific ticks (comma-separated)");
    eprintln!("  --verbose               Show detailed output for each tick");
    eprintln!("  --config <path>         Path to Engine.toml (default: Engine.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all ticks");
    eprintln!("  replay engine_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific ticks");
    eprintln!("  replay engine_debug.jsonl --ticks 120,90,45");
}

fn parse_ticks(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid tick number '{}': {}", t, e))
        })
        .collect()
}

enum Mode {
    All,
    Ticks(Vec<u32>),
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.iter().any(|a| a == "--help") { 0 } else { 1 });
    }

    let log_file = &args[1];
    let mut config_path = "Engine.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--ticks" => {
                let value = args.get(i + 1).unwrap_or_else(|| {
                    eprintln!("Error: --ticks requires an argument");
                    process::exit(1);
                });
                let ticks = parse_ticks(value).unwrap_or_else(|e| {
                    eprintln!("Error parsing ticks: {}", e);
                    process::exit(1);
                });
                mode = Some(Mode::Ticks(ticks));
                i += 1;
            }
            "--config" => {
                config_path = args
                    .get(i + 1)
                    .unwrap_or_else(|| {
                        eprintln!("Error: --config requires an argument");
                        process::exit(1);
                    })
                    .clone();
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = mode.unwrap_or_else(|| {
        eprintln!("Error: Must specify --all or --ticks");
        print_usage();
        process::exit(1);
    });

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let entries = engine.load_log_file(log_file).unwrap_or_else(|e| {
        eprintln!("Error loading log file: {}", e);
        process::exit(1);
    });

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    let results = match mode {
        Mode::All => {
            println!("Replaying all {} ticks...\n", entries.len());
            engine.replay_all(&entries)
        }
        Mode::Ticks(ticks) => {
            println!("Replaying {} specific tick(s)...\n", ticks.len());
            engine.replay_ticks(&entries, &ticks).unwrap_or_else(|e| {
                eprintln!("Error during replay: {}", e);
                process::exit(1);
            })
        }
    };

    engine.print_report(&results);
}
