//! # Stockroom CLI
//!
//! The binary is intentionally thin: the shell lives in `src/stockroom/cli/`,
//! while this file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/)                                           │
//! │  - clap parsing of process args and shell lines (setup.rs)  │
//! │  - read loop, dispatch, tracing + config setup (commands.rs)│
//! │  - terminal rendering (print.rs)                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs): StockroomApi owns the whole context    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging goes to stderr and is controlled by `STOCKROOM_LOG` (an `EnvFilter`
//! directive such as `stockroom=debug`) or `--verbose`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
