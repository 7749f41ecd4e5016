use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use skintel_api::ApiError;
use skintel_session::{begin_turn, complete_turn, ChatBackend, TurnOutcome};

use crate::app::setup::{build_client, open_manager, AppConfig};
use crate::render;

/// What a line of REPL input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Exit,
    Clear,
    History,
    Help,
    Message(String),
    Empty,
}

pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    match trimmed {
        "" => ReplInput::Empty,
        "exit" | "quit" | "/exit" | "/quit" => ReplInput::Exit,
        "/clear" => ReplInput::Clear,
        "/history" => ReplInput::History,
        "/help" => ReplInput::Help,
        _ => ReplInput::Message(line.to_string()),
    }
}

/// What the user can do about a failed turn, if anything
pub fn failure_hint(error: &ApiError) -> Option<&'static str> {
    match error {
        ApiError::Unauthorized(_) => Some("Check your token (--token or SKINTEL_TOKEN)"),
        e if e.is_transient() => Some("The service is busy or unreachable; try again in a moment"),
        _ => None,
    }
}

/// Run interactive REPL mode
pub async fn run_repl_mode(config: &AppConfig) -> Result<()> {
    println!("{}", "🧴 Skintel - your skincare assistant".bright_cyan().bold());
    println!("{}", format!("Backend: {}", config.api_url).bright_black());
    if config.token.is_none() {
        println!(
            "{}",
            "No token set (--token or SKINTEL_TOKEN); the backend may reject requests".yellow()
        );
    }
    println!(
        "{}",
        "Type 'exit' or 'quit' to leave, '/clear' to start over, '/help' for commands\n".bright_black()
    );

    let client = build_client(config);
    let mut manager = open_manager(config)?;
    render::print_transcript(manager.messages());

    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline(&format!("{} ", "You ›".bright_cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_input(&line) {
            ReplInput::Empty => continue,
            ReplInput::Exit => break,
            ReplInput::Help => {
                println!("{}", "/history  show the conversation".bright_black());
                println!("{}", "/clear    forget the conversation".bright_black());
                println!("{}", "exit      leave".bright_black());
            }
            ReplInput::History => render::print_transcript(manager.messages()),
            ReplInput::Clear => {
                manager.clear_chat();
                println!("{}", "✓ Chat cleared".green());
                render::print_transcript(manager.messages());
            }
            ReplInput::Message(content) => {
                rl.add_history_entry(content.as_str())?;
                let Some(pending) = begin_turn(&mut manager, &content) else {
                    continue;
                };
                println!("{}", "Skintel is thinking...".bright_black());

                let result = client.reply(pending.content(), pending.context()).await;
                let hint = result.as_ref().err().and_then(failure_hint);

                match complete_turn(&mut manager, pending, result) {
                    TurnOutcome::Answered(reply) => render::print_message(&reply),
                    TurnOutcome::Failed { message, error } => {
                        eprintln!("{} {}", "⚠️".yellow(), error.yellow());
                        render::print_message(&message);
                        if let Some(hint) = hint {
                            println!("{}", hint.bright_black());
                        }
                    }
                }
            }
        }
    }

    println!("{}", "Goodbye! Your conversation has been saved.".bright_black());
    Ok(())
}
