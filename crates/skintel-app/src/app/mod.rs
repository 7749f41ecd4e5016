pub mod repl;
pub mod setup;

use anyhow::{Context, Result};
use colored::Colorize;
use skintel_types::Sender;

use crate::cli::Commands;
use crate::render;

pub use repl::run_repl_mode;
pub use setup::{build_client, init_logging, open_manager, setup_from_cli, AppConfig};

/// Execute a subcommand
pub async fn run_command(command: &Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Chat => run_repl_mode(config).await,
        Commands::History => {
            let manager = open_manager(config)?;
            render::print_transcript(manager.messages());
            println!(
                "{}",
                format!(
                    "{} messages, {} context exchanges",
                    manager.messages().len(),
                    manager.conversation_history().len() / 2
                )
                .bright_black()
            );
            Ok(())
        }
        Commands::Clear => {
            let mut manager = open_manager(config)?;
            manager.clear_chat();
            println!("{}", "✓ Chat history cleared".green());
            Ok(())
        }
        Commands::Status => {
            let status = build_client(config)
                .status()
                .await
                .context("Failed to fetch chatbot status")?;
            println!("{}", render::format_status(&status));
            Ok(())
        }
        Commands::Advice { concerns, context } => {
            let advice = build_client(config)
                .skin_advice(concerns, context.as_deref())
                .await
                .context("Failed to get skin advice")?;

            let mut manager = open_manager(config)?;
            let text = advice.advice.unwrap_or_default();
            let message = manager.add_message(text, Sender::Bot);
            render::print_message(&message);
            Ok(())
        }
    }
}
