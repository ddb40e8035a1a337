//! Translation settings.

use serde::Deserialize;

/// Settings for [`translate`](crate::translate).
///
/// Read from the `[translate]` table of a config file; every field has a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateOptions {
    /// Module the chunk `require`s to get the runtime library.
    pub runtime_module: String,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Precede each command with a `-- line:col:name` comment.
    pub emit_positions: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            runtime_module: "vim".to_string(),
            indent: 2,
            emit_positions: true,
        }
    }
}
