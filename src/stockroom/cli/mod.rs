//! # CLI Behavior
//!
//! This is **one possible UI client** for stockroom, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and output
//! formatting.
//!
//! ## The Shell
//!
//! `stockroom` (or `stockroom shell`) reads one command per line from stdin. When
//! stdin is a terminal it shows a prompt; when it is piped the same commands run
//! as a script, which is how the integration tests drive it. Blank lines and lines
//! starting with `#` are skipped.
//!
//! After every line the shell fires due timers and prints notifications it has not
//! shown yet. Errors never end the session: they arrive as warning or error
//! notifications like any other message.
//!
//! ## Time in the Shell
//!
//! Filter changes are debounced, so the view lags the last command by the
//! quiescence window. Commands that show or export the view (`list`, `summary`,
//! `export`) settle first: they wait for the sample load if it is still pending
//! and flush the pipeline, so scripts always see the result of every previous
//! line.
//!
//! ## Module Structure
//!
//! - `commands`: process entry, config loading, the read loop and dispatch
//! - `print`: Output formatting (tables, colors, notifications)
//! - `setup`: Argument parsing via clap, shell line splitting, help text

mod commands;
mod print;
pub mod setup;

pub use commands::run;
