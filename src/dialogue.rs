//! Admin dialogue module for handling the owner's balance-editing conversation.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Maximum nickname length in characters
pub const MAX_NICKNAME_CHARS: usize = 32;

/// Direction of a manual balance change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceAction {
    Add,
    Remove,
}

impl BalanceAction {
    /// Map inline keyboard callback data to an action
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "admin_add" => Some(Self::Add),
            "admin_remove" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Signed balance delta for a non-negative amount
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Add => amount,
            Self::Remove => -amount,
        }
    }
}

/// Represents the conversation state of the admin panel
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminDialogueState {
    #[default]
    Start,
    WaitingForUserId {
        action: BalanceAction,
    },
    WaitingForAmount {
        action: BalanceAction,
        user_id: i64,
    },
    WaitingForBroadcastAmount,
}

/// Type alias for our admin dialogue
pub type AdminDialogue = Dialogue<AdminDialogueState, InMemStorage<AdminDialogueState>>;

/// Rejected numeric input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Input is empty or contains something other than ASCII digits
    NotDigits,
    /// Input does not fit into a 64-bit balance
    TooLarge,
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::NotDigits => write!(f, "Input must consist of digits only"),
            InputError::TooLarge => write!(f, "Number is too large"),
        }
    }
}

impl std::error::Error for InputError {}

impl AdminDialogueState {
    /// Message key sent back when input for this step is rejected.
    ///
    /// `None` means the input is dropped without a reply: the broadcast
    /// step ignores bad amounts, and outside the dialogue there is no step.
    pub fn rejection_key(&self, error: InputError) -> Option<&'static str> {
        match self {
            Self::WaitingForUserId { .. } | Self::WaitingForAmount { .. } => Some(match error {
                InputError::NotDigits => "admin-digits-required",
                InputError::TooLarge => "admin-number-too-large",
            }),
            Self::WaitingForBroadcastAmount | Self::Start => None,
        }
    }
}

fn parse_digits(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotDigits);
    }
    trimmed.parse::<i64>().map_err(|_| InputError::TooLarge)
}

/// Parses a Telegram user id typed by the admin
pub fn parse_user_id(input: &str) -> Result<i64, InputError> {
    parse_digits(input)
}

/// Parses a coin amount typed by the admin
pub fn parse_amount(input: &str) -> Result<i64, InputError> {
    parse_digits(input)
}

/// Rejected nickname
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NicknameError {
    Empty,
    TooLong,
    InvalidCharacters,
}

/// Validates a nickname input
pub fn validate_nickname(name: &str) -> Result<String, NicknameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(NicknameError::Empty);
    }

    if trimmed.chars().count() > MAX_NICKNAME_CHARS {
        return Err(NicknameError::TooLong);
    }

    if trimmed.chars().any(char::is_control) {
        return Err(NicknameError::InvalidCharacters);
    }

    Ok(trimmed.to_string())
}
