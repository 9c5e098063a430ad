//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

// Import configuration
use crate::config::BotConfig;

// Import localization
use crate::localization::t_lang;

// Import dialogue types
use crate::dialogue::AdminDialogue;

// Import callback routing
use super::router::{route_callback, CallbackRoute};

/// Handle callback queries from the admin panel keyboard
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    config: Arc<BotConfig>,
    dialogue: AdminDialogue,
) -> Result<()> {
    let user_id = q.from.id.0 as i64;
    let language_code = q.from.language_code.as_deref();
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id, data, "Received callback query from user");

    match route_callback(data, config.is_admin(user_id)) {
        CallbackRoute::Reject => {
            warn!(user_id, data, "Rejected admin callback from non-owner");
            bot.answer_callback_query(q.id)
                .text(t_lang("admin-not-allowed", language_code))
                .await?;
        }
        CallbackRoute::Ignore => {
            debug!(user_id, data, "Ignoring unknown callback data");
            bot.answer_callback_query(q.id).await?;
        }
        CallbackRoute::Prompt { prompt_key, next_state } => {
            // Answered regardless of whether the prompt goes through
            let answered = bot.answer_callback_query(q.id).await;

            let chat_id = dialogue.chat_id();
            match bot.send_message(chat_id, t_lang(prompt_key, language_code)).await {
                Ok(_) => {
                    if let Err(e) = dialogue.update(next_state).await {
                        error!(user_id, error = %e, "Failed to update dialogue state");
                    }
                }
                Err(e) => {
                    // Dialogue stays where it was
                    error!(chat_id = %chat_id, error = ?e, "Failed to send admin prompt");
                }
            }

            answered?;
        }
    }

    Ok(())
}

/// Answer callback queries that carry no chat and so cannot enter a dialogue
pub async fn unmatched_callback_handler(bot: Bot, q: CallbackQuery) -> Result<()> {
    debug!(
        user_id = q.from.id.0,
        inline_message_id = ?q.inline_message_id,
        "Answering callback query without a chat"
    );
    bot.answer_callback_query(q.id).await?;
    Ok(())
}
