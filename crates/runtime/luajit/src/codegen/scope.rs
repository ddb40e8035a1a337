//! Where variables live.
//!
//! A scope prefix names a fixed table known at generation time. Names
//! without one go to `g:` at script level and `l:` inside functions, except
//! single letters and curly-brace names, which are resolved when the code
//! runs.

use viml_ir::{NamePart, Scope};
use viml_value::LegacyError;

use super::{TranslateError, Translator, lua_string_literal};

/// Dictionary and key of a variable, as Lua arguments.
pub(crate) enum Storage {
    Fixed { table: String, key: String },
    /// One call returning both; it must come last in an argument list.
    Resolved(String),
}

impl Storage {
    pub(crate) fn args(&self) -> String {
        match self {
            Storage::Fixed { table, key } => format!("{table}, {key}"),
            Storage::Resolved(call) => call.clone(),
        }
    }
}

impl Translator<'_> {
    /// Lua table of a scope, or a call raising E461 when a function scope
    /// is named outside a function.
    pub(super) fn scope_table(&self, scope: Scope, display: &str) -> String {
        match scope {
            Scope::Global => "state.g".to_string(),
            Scope::Script => "state.s".to_string(),
            Scope::Vim => "state.v".to_string(),
            Scope::Buffer => "state.b".to_string(),
            Scope::Window => "state.w".to_string(),
            Scope::Tabpage => "state.t".to_string(),
            Scope::Local | Scope::Argument if self.context.in_function.is_none() => {
                self.report(LegacyError::IllegalVariableName, display)
            }
            Scope::Local => "fstate.l".to_string(),
            Scope::Argument => "fstate.a".to_string(),
        }
    }

    pub(super) fn variable_storage(&self, scope: Option<Scope>, name: &str) -> Storage {
        let key = lua_string_literal(name);
        match scope {
            Some(scope) => {
                let display = format!("{}:{name}", scope.letter());
                Storage::Fixed {
                    table: self.scope_table(scope, &display),
                    key,
                }
            }
            // Autoload variables are always global.
            None if name.contains('#') => Storage::Fixed {
                table: "state.g".to_string(),
                key,
            },
            None if name.len() == 1 => Storage::Resolved(format!(
                "vim.scope.resolve(state, {}, {key})",
                self.function_state()
            )),
            None if self.context.in_function.is_some() => Storage::Fixed {
                table: "fstate.l".to_string(),
                key,
            },
            None => Storage::Fixed {
                table: "state.g".to_string(),
                key,
            },
        }
    }

    /// Lua expression for the name a curly-brace name evaluates to, scope
    /// prefix included.
    pub(super) fn curly_name(&self, scope: Option<Scope>, parts: &[NamePart]) -> Result<String, TranslateError> {
        let mut pieces = Vec::with_capacity(parts.len() + 1);
        if let Some(scope) = scope {
            pieces.push(lua_string_literal(&format!("{}:", scope.letter())));
        }
        for part in parts {
            pieces.push(match part {
                NamePart::Literal(text) => lua_string_literal(text),
                NamePart::Expr(node) => format!("vim.str(state, {})", self.expr(node)?),
            });
        }
        Ok(format!("({})", pieces.join(" .. ")))
    }

    pub(super) fn curly_storage(&self, scope: Option<Scope>, parts: &[NamePart]) -> Result<Storage, TranslateError> {
        Ok(Storage::Resolved(format!(
            "vim.scope.resolve(state, {}, {})",
            self.function_state(),
            self.curly_name(scope, parts)?
        )))
    }

    /// Call raising `error` at the current command when the code runs.
    pub(super) fn report(&self, error: LegacyError, detail: &str) -> String {
        format!(
            "vim.err.report(state, {}, {})",
            self.position_literal(),
            lua_string_literal(&error.message(detail))
        )
    }
}
