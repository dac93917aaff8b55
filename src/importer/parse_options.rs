// ==========================================
// Meat Production Analytics - parse options
// ==========================================

use crate::i18n::Messages;

/// Per-parse settings, read from config by the caller.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub messages: Messages,
    /// Emit a warning for every column that fell back to its default position.
    pub strict_columns: bool,
}

impl ParseOptions {
    pub fn new(messages: Messages, strict_columns: bool) -> Self {
        Self {
            messages,
            strict_columns,
        }
    }
}
