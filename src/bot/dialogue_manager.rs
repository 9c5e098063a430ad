//! Dialogue Manager module for handling admin dialogue state transitions

use anyhow::Result;
use sqlx::postgres::PgPool;
use teloxide::prelude::*;
use tracing::{debug, info};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{
    parse_amount, parse_user_id, AdminDialogue, AdminDialogueState, BalanceAction, InputError,
};

// Import database functions
use crate::db::{credit_all_users, update_balance};

async fn reply_input_error(
    bot: &Bot,
    chat_id: ChatId,
    step: &AdminDialogueState,
    error: InputError,
    language_code: Option<&str>,
) -> Result<()> {
    debug!(chat_id = %chat_id, step = ?step, error = %error, "Rejected admin input");
    if let Some(key) = step.rejection_key(error) {
        bot.send_message(chat_id, t_lang(key, language_code)).await?;
    }
    Ok(())
}

/// Handle the target user id typed after pressing give/take
pub async fn handle_user_id_input(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: AdminDialogue,
    input: &str,
    action: BalanceAction,
    language_code: Option<&str>,
) -> Result<()> {
    match parse_user_id(input) {
        Ok(user_id) => {
            bot.send_message(chat_id, t_lang("admin-ask-amount", language_code))
                .await?;
            dialogue
                .update(AdminDialogueState::WaitingForAmount { action, user_id })
                .await?;
        }
        Err(e) => {
            // Keep dialogue active, admin can try again
            let step = AdminDialogueState::WaitingForUserId { action };
            reply_input_error(bot, chat_id, &step, e, language_code).await?;
        }
    }
    Ok(())
}

/// Handle the amount typed for a single-user balance change
#[allow(clippy::too_many_arguments)]
pub async fn handle_amount_input(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: AdminDialogue,
    pool: &PgPool,
    input: &str,
    action: BalanceAction,
    user_id: i64,
    language_code: Option<&str>,
) -> Result<()> {
    let amount = match parse_amount(input) {
        Ok(amount) => amount,
        Err(e) => {
            let step = AdminDialogueState::WaitingForAmount { action, user_id };
            return reply_input_error(bot, chat_id, &step, e, language_code).await;
        }
    };

    let delta = action.signed(amount);
    let reply = if update_balance(pool, user_id, delta).await? {
        info!(target_user = user_id, delta, "Admin changed balance");
        t_args_lang("admin-balance-changed", &[("delta", &delta.to_string())], language_code)
    } else {
        t_args_lang("admin-user-not-found", &[("user_id", &user_id.to_string())], language_code)
    };

    bot.send_message(chat_id, reply).await?;
    dialogue.exit().await?;
    Ok(())
}

/// Handle the amount typed for a broadcast credit to every user
pub async fn handle_broadcast_amount_input(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: AdminDialogue,
    pool: &PgPool,
    input: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let amount = match parse_amount(input) {
        Ok(amount) => amount,
        Err(e) => {
            let step = AdminDialogueState::WaitingForBroadcastAmount;
            return reply_input_error(bot, chat_id, &step, e, language_code).await;
        }
    };

    let credited = credit_all_users(pool, amount).await?;
    bot.send_message(
        chat_id,
        t_args_lang(
            "admin-broadcast-done",
            &[("amount", &amount.to_string()), ("count", &credited.to_string())],
            language_code,
        ),
    )
    .await?;

    dialogue.exit().await?;
    Ok(())
}
