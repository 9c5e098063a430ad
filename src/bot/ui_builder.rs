//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import database types
use crate::db::User;

pub const CALLBACK_ADMIN_ADD: &str = "admin_add";
pub const CALLBACK_ADMIN_REMOVE: &str = "admin_remove";
pub const CALLBACK_ADMIN_BROADCAST: &str = "admin_broadcast";

/// Create the owner's admin panel keyboard
pub fn create_admin_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                t_lang("admin-button-add", language_code),
                CALLBACK_ADMIN_ADD,
            ),
            InlineKeyboardButton::callback(
                t_lang("admin-button-remove", language_code),
                CALLBACK_ADMIN_REMOVE,
            ),
        ],
        vec![InlineKeyboardButton::callback(
            t_lang("admin-button-broadcast", language_code),
            CALLBACK_ADMIN_BROADCAST,
        )],
    ])
}

/// Format a user's profile as Telegram HTML
pub fn format_profile(user: &User, language_code: Option<&str>) -> String {
    let nickname = html::escape(user.display_name());
    t_args_lang(
        "profile",
        &[
            ("nickname", &nickname),
            ("balance", &user.balance.to_string()),
            ("user_id", &user.user_id.to_string()),
        ],
        language_code,
    )
}

/// Format the help message; the owner also sees admin commands
pub fn format_help(is_admin: bool, language_code: Option<&str>) -> String {
    let mut help = t_lang("help-text", language_code);
    if is_admin {
        help.push_str("\n\n");
        help.push_str(&t_lang("help-admin", language_code));
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::init_localization;
    use chrono::Utc;
    use teloxide::types::InlineKeyboardButtonKind;

    fn sample_user(nickname: &str) -> User {
        User {
            user_id: 777,
            username: Some("tg_user".to_string()),
            nickname: Some(nickname.to_string()),
            balance: -25,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_keyboard_layout() {
        init_localization().unwrap();
        let keyboard = create_admin_keyboard(Some("ru"));

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
        assert_eq!(keyboard.inline_keyboard[1].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "➕ Выдать");

        let data: Vec<String> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(data, vec!["admin_add", "admin_remove", "admin_broadcast"]);
    }

    #[test]
    fn test_profile_escapes_html() {
        init_localization().unwrap();
        let profile = format_profile(&sample_user("<b>x</b> & co"), Some("en"));

        assert!(profile.contains("&lt;b&gt;x&lt;/b&gt; &amp; co"));
        assert!(profile.contains("-25 coins"));
        assert!(profile.contains("<code>777</code>"));
    }

    #[test]
    fn test_help_admin_section() {
        init_localization().unwrap();
        let user_help = format_help(false, Some("en"));
        let admin_help = format_help(true, Some("en"));

        assert!(!user_help.contains("/admin"));
        assert!(admin_help.contains("/admin"));
        assert!(admin_help.starts_with(&user_help));
    }
}
