//! Command and expression trees to Lua code generation.

mod command;
mod control;
mod expr;
mod function;
mod place;
mod scope;

use std::collections::HashSet;
use std::sync::LazyLock;

use thiserror::Error;
use tracing::debug;
use viml_ir::{CommandNode, Expression, Position};
use viml_syntax::ParseError;
use viml_value::LegacyError;

use crate::options::TranslateOptions;

/// Errors that can occur during translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// `:break` or `:continue` with no loop around it.
    #[error("{line}:{column}: {message}")]
    LoopControlOutsideLoop {
        line: usize,
        column: usize,
        error: LegacyError,
        message: String,
    },

    /// A tree the parser never produces.
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl TranslateError {
    pub(crate) fn loop_control(position: Position, error: LegacyError) -> Self {
        Self::LoopControlOutsideLoop {
            line: position.line,
            column: position.column,
            error,
            message: error.message(""),
        }
    }

    /// Legacy error behind the failure, when there is one.
    pub fn legacy(&self) -> Option<LegacyError> {
        match self {
            Self::LoopControlOutsideLoop { error, .. } => Some(*error),
            Self::Parse(err) => Some(err.legacy()),
            Self::Internal(_) => None,
        }
    }
}

/// Lua reserved keywords that need escaping.
static LUA_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
        "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    ]
    .into_iter()
    .collect()
});

fn is_lua_identifier(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !LUA_KEYWORDS.contains(name)
}

/// `table.name`, or `table["name"]` when `name` is not a Lua identifier.
pub(crate) fn lua_field(table: &str, name: &str) -> String {
    if is_lua_identifier(name) {
        format!("{table}.{name}")
    } else {
        format!("{table}[{}]", lua_string_literal(name))
    }
}

pub(crate) fn lua_string_literal(s: &str) -> String {
    lua_bytes_literal(s.as_bytes())
}

/// Quoted Lua string holding exactly `bytes`; anything outside printable
/// ASCII is written as a decimal escape.
pub(crate) fn lua_bytes_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\{byte:03}")),
        }
    }
    out.push('"');
    out
}

/// Largest magnitude a Lua number literal holds exactly.
const EXACT_LUA_INTEGER: i64 = 1 << 53;

/// Lua literal for a Number. Values a double cannot hold exactly are
/// passed to the runtime as decimal text.
pub(crate) fn lua_number(value: i64) -> String {
    if (-EXACT_LUA_INTEGER..=EXACT_LUA_INTEGER).contains(&value) {
        value.to_string()
    } else {
        format!("vim.number(\"{value}\")")
    }
}

/// Lua literal for a Float payload.
pub(crate) fn lua_float(value: f64) -> String {
    if value.is_nan() {
        "(0/0)".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "(1/0)" } else { "(-1/0)" }.to_string()
    } else {
        format!("{value:?}")
    }
}

/// What `:break`, `:continue` and `:return` compile to at the current
/// point.
#[derive(Debug, Clone, Copy)]
struct LoopContext {
    /// Number of the loop's `::continue_N::` label.
    label: usize,
    /// A protected closure lies between here and the loop, so control leaves
    /// through a status code.
    through_closure: bool,
}

#[derive(Debug, Clone, Copy)]
struct FunctionContext {
    /// `:return` leaves a protected closure and reports a status code.
    through_closure: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_loop: Option<LoopContext>,
    in_function: Option<FunctionContext>,
    /// Inside a function without `abort` and outside any `:try`: a failing
    /// command is reported and execution goes on with the next one.
    recover: bool,
}

/// Status codes a protected closure returns for control flow that has to
/// continue outside it.
pub(crate) const FLOW_BREAK: u8 = 1;
pub(crate) const FLOW_CONTINUE: u8 = 2;
pub(crate) const FLOW_RETURN: u8 = 3;

/// Generated Lua, built line by line.
pub(crate) struct Translator<'a> {
    options: &'a TranslateOptions,
    out: String,
    depth: usize,
    next_id: usize,
    context: Context,
    /// `line:col:name` of the command being translated.
    position: String,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(options: &'a TranslateOptions) -> Self {
        Self {
            options,
            out: String::new(),
            depth: 0,
            next_id: 0,
            context: Context::default(),
            position: "0:0:".to_string(),
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth * self.options.indent {
            self.out.push(' ');
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn indented<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn fresh_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    /// Run `body` with a different control-flow context, restoring the
    /// current one afterwards.
    fn with_context<T>(&mut self, context: Context, body: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.context, context);
        let result = body(self);
        self.context = saved;
        result
    }

    /// Context inside a protected closure opened here.
    fn closure_context(&self) -> Context {
        Context {
            in_loop: self.context.in_loop.map(|ctx| LoopContext {
                through_closure: true,
                ..ctx
            }),
            in_function: self.context.in_function.map(|_| FunctionContext { through_closure: true }),
            recover: self.context.recover,
        }
    }

    /// Quoted `line:col:name` for the current command.
    fn position_literal(&self) -> String {
        lua_string_literal(&self.position)
    }

    /// Lua name of the function-scope state, or `nil` outside functions.
    fn function_state(&self) -> &'static str {
        if self.context.in_function.is_some() { "fstate" } else { "nil" }
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Translate a parsed script to a Lua chunk.
pub fn translate(commands: &[CommandNode], options: &TranslateOptions) -> Result<String, TranslateError> {
    let mut translator = Translator::new(options);
    translator.line(format!("local vim = require({})", lua_string_literal(&options.runtime_module)));
    translator.line("local state = vim.state.new_script(...)");
    translator.block(commands)?;
    debug!(commands = commands.len(), "translated script");
    Ok(translator.finish())
}

/// Parse and translate a whole script.
pub fn translate_script(source: &str, options: &TranslateOptions) -> Result<String, TranslateError> {
    let commands = viml_syntax::parse_script(source)?;
    translate(&commands, options)
}

/// Translate one expression as it would be evaluated at script level. The
/// result is a Lua expression that uses `vim` and `state`.
pub fn translate_expression(expression: &Expression) -> Result<String, TranslateError> {
    let options = TranslateOptions::default();
    let translator = Translator::new(&options);
    translator.expr(&expression.root)
}
