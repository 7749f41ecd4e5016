use serde::Deserialize;

/// What the page can ask the chat widget to do.
///
/// Host pages post these as JSON, e.g. `{"type":"send","content":"hi"}` or
/// `{"type":"ask_about_concerns","concerns":["acne"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatCommand {
    Send { content: String },
    Clear,
    AskAboutConcerns { concerns: Vec<String> },
}

impl ChatCommand {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ChatCommand::parse(r#"{"type":"send","content":"Is SPF 30 enough?"}"#).unwrap(),
            ChatCommand::Send {
                content: "Is SPF 30 enough?".to_string()
            }
        );
        assert_eq!(
            ChatCommand::parse(r#"{"type":"clear"}"#).unwrap(),
            ChatCommand::Clear
        );
        assert_eq!(
            ChatCommand::parse(r#"{"type":"ask_about_concerns","concerns":["acne","redness"]}"#)
                .unwrap(),
            ChatCommand::AskAboutConcerns {
                concerns: vec!["acne".to_string(), "redness".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(ChatCommand::parse(r#"{"type":"delete_account"}"#).is_err());
        assert!(ChatCommand::parse(r#"{"type":"send"}"#).is_err());
    }
}
