//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: Parses slash commands
//! - `message_handler`: Handles commands, admin input and auto registration
//! - `callback_handler`: Handles admin panel callback queries
//! - `router`: Decides which handler an update goes to
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Applies admin dialogue steps to the ledger

pub mod callback_handler;
pub mod commands;
pub mod dialogue_manager;
pub mod message_handler;
pub mod router;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::{callback_handler, unmatched_callback_handler};
pub use message_handler::message_handler;

pub use commands::Command;
pub use message_handler::register_user;
pub use router::{route, route_callback, CallbackRoute, Route};
pub use ui_builder::{create_admin_keyboard, format_help, format_profile};

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::dialogue::AdminDialogueState;

/// Update handler tree shared by the dispatcher
///
/// Requires `Bot`, `Me`, `Arc<PgPool>`, `Arc<BotConfig>` and
/// `Arc<InMemStorage<AdminDialogueState>>` as dependencies.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<AdminDialogueState>, AdminDialogueState>()
                .endpoint(message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<AdminDialogueState>, AdminDialogueState>()
                .endpoint(callback_handler),
        )
        // Inline-mode queries have no chat and skip the dialogue branch
        .branch(Update::filter_callback_query().endpoint(unmatched_callback_handler))
}
