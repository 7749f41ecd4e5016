use anyhow::{Context, Result};
use skintel_api::SkintelClient;
use skintel_session::{ConversationManager, FileStore, SessionConfig};

use crate::cli::Cli;

/// Application configuration derived from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub data_dir: String,
    pub session: SessionConfig,
}

/// Set up application configuration from CLI arguments
pub fn setup_from_cli(cli: &Cli) -> AppConfig {
    let session = SessionConfig::new()
        .with_storage_key(cli.storage_key.clone())
        .with_max_messages(cli.max_messages);

    AppConfig {
        api_url: cli.api_url.clone(),
        token: cli.token.clone().filter(|t| !t.trim().is_empty()),
        data_dir: cli.data_dir.clone(),
        session,
    }
}

/// Route `log` output through env_logger; `--verbose` raises our crates to debug
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        // Prefix match: covers skintel_app, skintel_session and skintel_api
        builder.filter_module("skintel", log::LevelFilter::Debug);
    }
    // A second init (tests) is harmless
    let _ = builder.try_init();
}

/// Open the persisted conversation
pub fn open_manager(config: &AppConfig) -> Result<ConversationManager<FileStore>> {
    let store = FileStore::new(&config.data_dir)
        .with_context(|| format!("Failed to open history directory: {}", config.data_dir))?;
    Ok(ConversationManager::new(store, config.session.clone()))
}

pub fn build_client(config: &AppConfig) -> SkintelClient {
    let client = SkintelClient::new(config.api_url.clone());
    match &config.token {
        Some(token) => client.with_token(token.clone()),
        None => client,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use skintel_types::Sender;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, extra: &[&str]) -> AppConfig {
        let data_dir = dir.path().to_string_lossy().to_string();
        let mut args = vec!["skintel", "--data-dir", data_dir.as_str()];
        args.extend(extra);
        setup_from_cli(&Cli::parse_from(args))
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, &["--token", "  "]);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_session_settings_follow_cli() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, &["--storage-key", "demo", "--max-messages", "8"]);
        assert_eq!(config.session.messages_key(), "demo-messages");
        assert_eq!(config.session.max_messages, 8);
        assert_eq!(config.session.max_exchange_pairs, 4);
    }

    #[test]
    fn test_manager_persists_between_opens() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, &[]);

        let mut manager = open_manager(&config).unwrap();
        manager.add_message("Hi", Sender::User);

        let reopened = open_manager(&config).unwrap();
        assert_eq!(reopened.messages().len(), 2);
        assert!(dir.path().join("skincare-chat-history-messages.json").exists());
    }
}
