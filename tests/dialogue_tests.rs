use anyhow::Result;

use coin_bot::bot::{route, route_callback, CallbackRoute, Command, Route};
use coin_bot::dialogue::{
    parse_amount, parse_user_id, validate_nickname, AdminDialogueState, BalanceAction, InputError,
};

/// Test the take flow through the routing decisions
#[tokio::test]
async fn test_balance_change_flow() -> Result<()> {
    let state = match route_callback("admin_remove", true) {
        CallbackRoute::Prompt { prompt_key, next_state } => {
            assert_eq!(prompt_key, "admin-ask-user-id");
            next_state
        }
        other => panic!("Unexpected callback route: {other:?}"),
    };

    // A typo keeps the step and gets a reply
    match route(Some(state.clone()), true, Command::parse("98x", Some("coin_bot"))) {
        Route::UserIdInput { action } => {
            let error = parse_user_id("98x").expect_err("letters are rejected");
            let step = AdminDialogueState::WaitingForUserId { action };
            assert_eq!(step.rejection_key(error), Some("admin-digits-required"));
        }
        other => panic!("Unexpected route: {other:?}"),
    }

    let state = match route(Some(state), true, None) {
        Route::UserIdInput { action } => AdminDialogueState::WaitingForAmount {
            action,
            user_id: parse_user_id("987654321")?,
        },
        other => panic!("Unexpected route: {other:?}"),
    };

    match route(Some(state), true, None) {
        Route::AmountInput { action, user_id } => {
            assert_eq!(user_id, 987654321);
            assert_eq!(action.signed(parse_amount("150")?), -150);
        }
        other => panic!("Unexpected route: {other:?}"),
    }

    Ok(())
}

/// A command in the middle of a broadcast leaves the dialogue to the command
#[test]
fn test_command_interrupts_broadcast() {
    let state = Some(AdminDialogueState::WaitingForBroadcastAmount);
    assert_eq!(
        route(state.clone(), true, Command::parse("/cancel", Some("coin_bot"))),
        Route::Command(Command::Cancel)
    );
    assert_eq!(route(state.clone(), true, None), Route::BroadcastAmountInput);
    assert_eq!(
        state.and_then(|step| step.rejection_key(InputError::NotDigits)),
        None
    );
}

/// Test that dialogue states survive serialization
#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let state = AdminDialogueState::WaitingForAmount {
        action: BalanceAction::Add,
        user_id: 42,
    };

    let json = serde_json::to_string(&state)?;
    let restored: AdminDialogueState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);

    Ok(())
}

/// Test basic dialogue functionality
#[tokio::test]
async fn test_dialogue_default_state() -> Result<()> {
    let default_state = AdminDialogueState::default();
    assert!(matches!(default_state, AdminDialogueState::Start));

    Ok(())
}

/// Admin input mirrors a digits-only check
#[test]
fn test_admin_input_validation() {
    assert_eq!(parse_amount("100"), Ok(100));
    assert_eq!(parse_amount("сто"), Err(InputError::NotDigits));
    assert_eq!(parse_amount("٣"), Err(InputError::NotDigits));
    assert_eq!(parse_user_id("99999999999999999999"), Err(InputError::TooLarge));
}

/// Unit test for nickname trimming
#[test]
fn test_nickname_trimming() {
    let result = validate_nickname("  Test Nick  ");
    assert_eq!(result.unwrap(), "Test Nick");
}
