use clap::{Parser, Subcommand};
use skintel_types::{DEFAULT_MAX_MESSAGES, DEFAULT_STORAGE_KEY};

/// CLI arguments for skintel
#[derive(Parser, Debug)]
#[command(name = "skintel")]
#[command(about = "Skintel - chat with your skincare assistant from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the skintel backend
    #[arg(long, value_name = "URL", env = "SKINTEL_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Bearer token for the backend (as issued by its login endpoint)
    #[arg(long, value_name = "TOKEN", env = "SKINTEL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory the chat history is stored in
    #[arg(long, value_name = "DIR", env = "SKINTEL_DATA_DIR", default_value = "~/.skintel")]
    pub data_dir: String,

    /// Base name of the stored history entries
    #[arg(long, value_name = "NAME", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Number of messages kept in the history
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_MESSAGES)]
    pub max_messages: usize,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat (default)
    Chat,

    /// Print the stored conversation
    History,

    /// Forget the stored conversation
    Clear,

    /// Show the chatbot's daily quota
    Status,

    /// Ask for advice about specific skin concerns
    Advice {
        /// Concerns such as acne, dryness, aging, sensitivity
        #[arg(required = true)]
        concerns: Vec<String>,

        /// Extra context for the assistant
        #[arg(long, value_name = "TEXT")]
        context: Option<String>,
    },
}
