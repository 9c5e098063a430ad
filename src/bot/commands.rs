//! Command parsing for slash commands such as `/nick@CoinBot New Name`

use regex::Regex;
use std::sync::LazyLock;

// Compiled once to avoid recompilation per message
static COMMAND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([A-Za-z0-9_]+)(?:@([A-Za-z0-9_]+))?(?:\s+([\s\S]*))?$")
        .expect("Command pattern should be valid")
});

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Me,
    Admin,
    Help,
    Cancel,
    Nick(Option<String>),
}

impl Command {
    /// Parse a message text into a command.
    ///
    /// Commands addressed to another bot (`/start@OtherBot`) are ignored
    /// when `bot_username` is known.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let captures = COMMAND_REGEX.captures(text.trim())?;
        let name = captures.get(1)?.as_str().to_ascii_lowercase();

        if let (Some(mention), Some(own)) = (captures.get(2), bot_username) {
            if !mention.as_str().eq_ignore_ascii_case(own) {
                return None;
            }
        }

        let args = captures
            .get(3)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match name.as_str() {
            "start" => Some(Self::Start),
            "me" => Some(Self::Me),
            "admin" => Some(Self::Admin),
            "help" => Some(Self::Help),
            "cancel" => Some(Self::Cancel),
            "nick" => Some(Self::Nick(args)),
            _ => None,
        }
    }
}
