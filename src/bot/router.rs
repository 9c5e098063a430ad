//! Routing decisions for incoming messages and callback queries

use crate::dialogue::{AdminDialogueState, BalanceAction};

use super::commands::Command;
use super::ui_builder::CALLBACK_ADMIN_BROADCAST;

/// What to do with an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Run a slash command
    Command(Command),
    /// Admin typed the target user id
    UserIdInput { action: BalanceAction },
    /// Admin typed the amount for a single user
    AmountInput { action: BalanceAction, user_id: i64 },
    /// Admin typed the amount for everyone
    BroadcastAmountInput,
    /// Register the sender and stay quiet
    AutoRegister,
}

/// Decide how to handle a message.
///
/// Commands win over a pending dialogue step. The dialogue is stored per
/// chat, so only the owner's messages may drive it.
pub fn route(state: Option<AdminDialogueState>, is_admin: bool, command: Option<Command>) -> Route {
    if let Some(command) = command {
        return Route::Command(command);
    }
    if !is_admin {
        return Route::AutoRegister;
    }

    match state {
        Some(AdminDialogueState::WaitingForUserId { action }) => Route::UserIdInput { action },
        Some(AdminDialogueState::WaitingForAmount { action, user_id }) => {
            Route::AmountInput { action, user_id }
        }
        Some(AdminDialogueState::WaitingForBroadcastAmount) => Route::BroadcastAmountInput,
        Some(AdminDialogueState::Start) | None => Route::AutoRegister,
    }
}

/// What to do with an admin panel button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRoute {
    /// Sender is not the owner; answer with a refusal, keep the state
    Reject,
    /// Send `prompt_key` and move the dialogue to `next_state`
    Prompt {
        prompt_key: &'static str,
        next_state: AdminDialogueState,
    },
    /// Unknown button data
    Ignore,
}

/// Decide how to handle callback data from the admin panel
pub fn route_callback(data: &str, is_admin: bool) -> CallbackRoute {
    if !is_admin {
        return CallbackRoute::Reject;
    }

    if let Some(action) = BalanceAction::from_callback_data(data) {
        CallbackRoute::Prompt {
            prompt_key: "admin-ask-user-id",
            next_state: AdminDialogueState::WaitingForUserId { action },
        }
    } else if data == CALLBACK_ADMIN_BROADCAST {
        CallbackRoute::Prompt {
            prompt_key: "admin-ask-broadcast-amount",
            next_state: AdminDialogueState::WaitingForBroadcastAmount,
        }
    } else {
        CallbackRoute::Ignore
    }
}
