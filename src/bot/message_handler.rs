//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{Me, ParseMode};
use tracing::{debug, error, info};

// Import configuration
use crate::config::BotConfig;

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{validate_nickname, AdminDialogue, AdminDialogueState, NicknameError, MAX_NICKNAME_CHARS};

// Import database functions
use crate::db::{add_user, get_user, set_nickname, DEFAULT_USERNAME};

// Import command parsing and routing
use super::commands::Command;
use super::router::{route, Route};

// Import dialogue manager functions
use super::dialogue_manager::{
    handle_amount_input, handle_broadcast_amount_input, handle_user_id_input,
};

// Import UI builder functions
use super::ui_builder::{create_admin_keyboard, format_help, format_profile};

/// Register the sender of a message, keeping existing rows untouched
pub async fn register_user(pool: &PgPool, user: &teloxide::types::User) -> Result<bool> {
    let username = user.username.as_deref().unwrap_or(DEFAULT_USERNAME);
    add_user(pool, user.id.0 as i64, username).await
}

#[allow(clippy::too_many_arguments)]
async fn handle_command(
    bot: &Bot,
    msg: &Message,
    command: Command,
    user: &teloxide::types::User,
    dialogue: AdminDialogue,
    pool: &PgPool,
    config: &BotConfig,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let user_id = user.id.0 as i64;
    debug!(user_id, command = ?command, "Received command");

    match command {
        Command::Start => {
            register_user(pool, user).await?;
            bot.send_message(chat_id, t_lang("start-greeting", language_code))
                .await?;
        }
        Command::Me => {
            register_user(pool, user).await?;
            match get_user(pool, user_id).await? {
                Some(profile) => {
                    bot.send_message(chat_id, format_profile(&profile, language_code))
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
                None => {
                    bot.send_message(chat_id, t_lang("profile-missing", language_code))
                        .await?;
                }
            }
        }
        Command::Admin => {
            if !config.is_admin(user_id) {
                debug!(user_id, "Ignoring /admin from non-owner");
                return Ok(());
            }
            bot.send_message(chat_id, t_lang("admin-panel", language_code))
                .reply_markup(create_admin_keyboard(language_code))
                .await?;
        }
        Command::Nick(None) => {
            bot.send_message(chat_id, t_lang("nick-usage", language_code))
                .await?;
        }
        Command::Nick(Some(requested)) => {
            let reply = match validate_nickname(&requested) {
                Ok(nickname) => {
                    register_user(pool, user).await?;
                    set_nickname(pool, user_id, &nickname).await?;
                    info!(user_id, "Nickname changed");
                    t_args_lang("nick-updated", &[("nickname", &nickname)], language_code)
                }
                Err(NicknameError::Empty) => t_lang("nick-empty", language_code),
                Err(NicknameError::TooLong) => t_args_lang(
                    "nick-too-long",
                    &[("max", &MAX_NICKNAME_CHARS.to_string())],
                    language_code,
                ),
                Err(NicknameError::InvalidCharacters) => t_lang("nick-invalid", language_code),
            };
            bot.send_message(chat_id, reply).await?;
        }
        Command::Help => {
            register_user(pool, user).await?;
            bot.send_message(chat_id, format_help(config.is_admin(user_id), language_code))
                .await?;
        }
        Command::Cancel => {
            // Dialogue state is per chat, only the owner may drop it
            let active = config.is_admin(user_id)
                && !matches!(
                dialogue.get().await?,
                None | Some(AdminDialogueState::Start)
            );
            let key = if active {
                dialogue.exit().await?;
                "admin-cancelled"
            } else {
                "admin-nothing-to-cancel"
            };
            bot.send_message(chat_id, t_lang(key, language_code)).await?;
        }
    }

    Ok(())
}

async fn handle_message(
    bot: &Bot,
    msg: &Message,
    me: &Me,
    dialogue: AdminDialogue,
    pool: &PgPool,
    config: &BotConfig,
) -> Result<()> {
    // Channel posts and service messages have no sender to register
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let language_code = user.language_code.as_deref();
    let text = msg.text().unwrap_or("");

    let command = Command::parse(text, Some(me.username()));
    let is_admin = config.is_admin(user_id);
    // The dialogue is only consulted for plain owner messages
    let state = if command.is_none() && is_admin {
        dialogue.get().await?
    } else {
        None
    };

    match route(state, is_admin, command) {
        Route::Command(command) => {
            handle_command(bot, msg, command, user, dialogue, pool, config, language_code).await
        }
        Route::UserIdInput { action } => {
            handle_user_id_input(bot, msg.chat.id, dialogue, text, action, language_code).await
        }
        Route::AmountInput { action, user_id: target } => {
            handle_amount_input(
                bot,
                msg.chat.id,
                dialogue,
                pool,
                text,
                action,
                target,
                language_code,
            )
            .await
        }
        Route::BroadcastAmountInput => {
            handle_broadcast_amount_input(bot, msg.chat.id, dialogue, pool, text, language_code)
                .await
        }
        Route::AutoRegister => {
            if register_user(pool, user).await? {
                debug!(user_id, "Auto-registered user from plain message");
            }
            Ok(())
        }
    }
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    me: Me,
    pool: Arc<PgPool>,
    config: Arc<BotConfig>,
    dialogue: AdminDialogue,
) -> Result<()> {
    if let Err(e) = handle_message(&bot, &msg, &me, dialogue, &pool, &config).await {
        error!(chat_id = %msg.chat.id, error = ?e, "Failed to handle message");
        let language_code = msg
            .from
            .as_ref()
            .and_then(|user| user.language_code.as_deref());
        if let Err(send_err) = bot
            .send_message(msg.chat.id, t_lang("error-generic", language_code))
            .await
        {
            error!(chat_id = %msg.chat.id, error = %send_err, "Failed to report error to user");
        }
    }

    Ok(())
}
