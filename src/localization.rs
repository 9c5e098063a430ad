use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Language used when the user's language is unknown or unsupported
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages with a bundled resource file
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ru"];

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("ru", include_str!("../locales/ru/main.ftl")),
];

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<&'static str, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let bundle = Self::create_bundle(language, source)?;
            bundles.insert(*language, bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(language: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = language
            .parse()
            .with_context(|| format!("Invalid locale identifier: {language}"))?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the Unicode isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string()).unwrap_or_else(|(res, errors)| {
            warn!(language, errors = ?errors, "Locale resource parsed with errors");
            res
        });
        if let Err(errors) = bundle.add_resource(resource) {
            warn!(language, errors = ?errors, "Duplicate messages in locale resource");
        }

        Ok(bundle)
    }

    /// Get a localized message in the given language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(
                args.iter()
                    .map(|(k, v)| (*k, FluentValue::from(*v))),
            )
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, language, errors = ?errors, "Message formatted with errors");
        }

        value.into_owned()
    }
}

/// Map a Telegram `language_code` such as `ru-RU` to a supported language
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let primary = language_code
        .and_then(|code| code.split(['-', '_']).next())
        .map(|code| code.to_ascii_lowercase());

    match primary {
        Some(code) => SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|supported| *supported == code)
            .unwrap_or(DEFAULT_LANGUAGE),
        None => DEFAULT_LANGUAGE,
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Localized message for the user's language
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    match LOCALIZATION_MANAGER.get() {
        Some(manager) => manager.get_message_in_language(key, detect_language(language_code), None),
        None => format!("Missing translation: {key}"),
    }
}

/// Localized message with arguments for the user's language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    match LOCALIZATION_MANAGER.get() {
        Some(manager) => {
            let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
            manager.get_message_in_language(key, detect_language(language_code), Some(&args_map))
        }
        None => format!("Missing translation: {key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Some("ru")), "ru");
        assert_eq!(detect_language(Some("ru-RU")), "ru");
        assert_eq!(detect_language(Some("EN_us")), "en");
        assert_eq!(detect_language(Some("de")), DEFAULT_LANGUAGE);
        assert_eq!(detect_language(None), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_every_key_exists_in_every_language() {
        let manager = LocalizationManager::new().unwrap();
        let english = &manager.bundles["en"];
        let russian = &manager.bundles["ru"];

        for key in ["start-greeting", "profile", "admin-panel", "admin-broadcast-done", "help-text"] {
            assert!(english.has_message(key), "en is missing {key}");
            assert!(russian.has_message(key), "ru is missing {key}");
        }
    }

    #[test]
    fn test_global_helpers() {
        init_localization().unwrap();
        assert_eq!(t_lang("admin-digits-required", Some("ru")), "Нужны цифры.");
        assert_eq!(
            t_args_lang("admin-balance-changed", &[("delta", "-50")], Some("ru")),
            "Готово! Баланс изменен на -50."
        );
    }
}
