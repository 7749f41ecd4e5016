//! Terminal chat surface for skintel
//!
//! Wires the persisted conversation from `skintel-session` to the backend
//! client from `skintel-api` behind a small clap CLI.

pub mod app;
pub mod cli;
pub mod render;

pub use app::{run_command, run_repl_mode, setup_from_cli, AppConfig};
pub use cli::{Cli, Commands};
