// ==========================================
// Meat Production Analytics - i18n
// ==========================================
// rust-i18n with English (default) and Hebrew catalogues.
// Pipelines never touch the global locale: they carry a `Messages`
// value bound to an explicit locale.
// ==========================================
// Catalogues are registered by rust_i18n::i18n! in lib.rs
// ==========================================

pub const DEFAULT_LOCALE: &str = "en";
pub const SUPPORTED_LOCALES: &[&str] = &["en", "he"];

/// Map a configured locale onto a supported one, falling back to English.
pub fn resolve_locale(raw: &str) -> &'static str {
    let wanted = raw.trim().to_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| wanted == *l || wanted.starts_with(&format!("{}-", l)))
        .unwrap_or(DEFAULT_LOCALE)
}

fn substitute(mut text: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        text = text.replace(&placeholder, v);
    }
    text
}

// ==========================================
// Messages - locale-bound translator
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    locale: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE,
        }
    }
}

impl Messages {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: resolve_locale(locale),
        }
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    pub fn text(&self, key: &str) -> String {
        let locale = self.locale;
        rust_i18n::t!(key, locale = locale).to_string()
    }

    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        substitute(self.text(key), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_substitutes_placeholders() {
        let msg = Messages::default().format("slaughter.invalid_date", &[("row", "3"), ("value", "abc")]);
        assert_eq!(msg, "Row 3: Invalid or missing date \"abc\"");
    }

    #[test]
    fn test_messages_use_their_own_locale() {
        let he = Messages::new("he");
        assert_eq!(he.locale(), "he");
        assert!(he.text("products.missing_item_id").contains("ברקוד"));
        let en = Messages::default();
        assert_eq!(en.text("products.missing_item_id"), "Barcode is missing");
    }

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale("HE"), "he");
        assert_eq!(resolve_locale("en-US"), "en");
        assert_eq!(resolve_locale("fr"), "en");
    }
}
