//! Statements: one command becomes one or more Lua statements.

use tracing::trace;
use viml_ir::{
    Address, AddressBase, AssignOp, CommandKind, CommandNode, EchoKind, ExprKind, Expression, LetValue, LineRange,
};

use super::{TranslateError, Translator, lua_number, lua_string_literal};

pub(super) fn lua_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn address_literal(address: &Address) -> String {
    let (kind, base) = match address.base {
        AddressBase::Line(line) => ("line", lua_number(line)),
        AddressBase::Current => ("current", "0".to_string()),
        AddressBase::Last => ("last", "0".to_string()),
        AddressBase::Mark(mark) => ("mark", lua_string_literal(&mark.to_string())),
    };
    format!("{{\"{kind}\", {base}, {}}}", lua_number(address.offset))
}

/// `{start}` or `{start, end}` as a Lua table of addresses.
pub(super) fn range_literal(range: &LineRange) -> String {
    match &range.end {
        Some(end) => format!("{{{}, {}}}", address_literal(&range.start), address_literal(end)),
        None => format!("{{{}}}", address_literal(&range.start)),
    }
}

/// Commands that own a body or move control; modifiers in front of them
/// are not applied.
fn is_structural(kind: &CommandKind) -> bool {
    matches!(
        kind,
        CommandKind::If { .. }
            | CommandKind::While { .. }
            | CommandKind::For { .. }
            | CommandKind::Break
            | CommandKind::Continue
            | CommandKind::Function(_)
            | CommandKind::Return { .. }
            | CommandKind::Try { .. }
    )
}

impl Translator<'_> {
    pub(super) fn block(&mut self, commands: &[CommandNode]) -> Result<(), TranslateError> {
        for command in commands {
            self.command(command)?;
        }
        Ok(())
    }

    fn command(&mut self, command: &CommandNode) -> Result<(), TranslateError> {
        let position = format!(
            "{}:{}:{}",
            command.position.line,
            command.position.column,
            command.name()
        );
        trace!(%position, "command");
        let saved = std::mem::replace(&mut self.position, position);
        if self.options.emit_positions {
            self.line(format!("-- {}", self.position));
        }

        let result = if is_structural(&command.kind) {
            self.statement(command)
        } else if self.context.recover {
            self.line("vim.err.resume(state, pcall(function()");
            let context = self.closure_context();
            let result = self.indented(|t| t.with_context(context, |t| t.with_modifiers(command)));
            self.line("end))");
            result
        } else {
            self.with_modifiers(command)
        };

        self.position = saved;
        result
    }

    fn with_modifiers(&mut self, command: &CommandNode) -> Result<(), TranslateError> {
        if command.modifiers.is_empty() {
            return self.statement(command);
        }
        let modifiers: Vec<String> = command.modifiers.iter().map(|m| lua_string_literal(m)).collect();
        self.line(format!(
            "vim.commands.modifiers(state, {{{}}}, function()",
            modifiers.join(", ")
        ));
        let context = self.closure_context();
        let result = self.indented(|t| t.with_context(context, |t| t.statement(command)));
        self.line("end)");
        result
    }

    fn statement(&mut self, command: &CommandNode) -> Result<(), TranslateError> {
        match &command.kind {
            CommandKind::Let { target, op, value } => {
                let value = match value {
                    LetValue::Expr(expr) => self.expr(&expr.root)?,
                    LetValue::Heredoc(lines) => {
                        let lines: Vec<String> = lines.iter().map(|line| lua_string_literal(line)).collect();
                        format!("vim.list.new(state, {{{}}})", lines.join(", "))
                    }
                };
                let simple = if *op == AssignOp::Assign { self.simple_target(target) } else { None };
                if let Some(expr) = simple {
                    let place = self.place(&expr.root)?;
                    self.line(place.write(&value));
                } else {
                    self.line("do");
                    self.indented(|t| {
                        let value = t.hoist("value", value);
                        t.assign_target(target, *op, &value)
                    })?;
                    self.line("end");
                }
            }
            CommandKind::Unlet { targets } => {
                for target in targets {
                    self.unlet(target, command.bang)?;
                }
            }
            CommandKind::If { branches, else_body } => self.if_command(branches, else_body.as_deref())?,
            CommandKind::While { condition, body } => self.while_command(condition, body)?,
            CommandKind::For { target, iterable, body } => self.for_command(target, iterable, body)?,
            CommandKind::Break => self.break_command(command.position)?,
            CommandKind::Continue => self.continue_command(command.position)?,
            CommandKind::Try { body, catches, finally } => self.try_command(body, catches, finally.as_deref())?,
            CommandKind::Function(def) => self.function_command(def, command.bang)?,
            CommandKind::Return { value } => self.return_command(value.as_ref())?,
            CommandKind::DelFunction { name } => self.delfunction_command(name, command.bang)?,
            CommandKind::Throw { value } => {
                let value = self.expr(&value.root)?;
                self.line(format!("vim.err.throw(state, {}, {value})", self.position_literal()));
            }
            CommandKind::Call { call } => {
                let code = self.expr(&call.root)?;
                match &command.range {
                    Some(range) => self.line(format!(
                        "vim.call.range(state, {}, function() return {code} end)",
                        range_literal(range)
                    )),
                    None => self.line(code),
                }
            }
            CommandKind::Echo { kind, args } => {
                let args = self.expression_args(args)?;
                let kind = match kind {
                    EchoKind::Echo => "\"echo\"",
                    EchoKind::Echon => "\"echon\"",
                    EchoKind::Echomsg => "\"echomsg\"",
                    EchoKind::Echoerr => "\"echoerr\"",
                };
                self.line(format!(
                    "vim.commands.echo(state, {}, {kind}{args})",
                    self.position_literal()
                ));
            }
            CommandKind::Execute { args } => {
                let args = self.expression_args(args)?;
                self.line(format!("vim.commands.execute(state, {}{args})", self.position_literal()));
            }
            CommandKind::Generic { name, args } => {
                let range = command.range.as_ref().map_or_else(|| "nil".to_string(), range_literal);
                self.line(format!(
                    "vim.commands.run(state, {}, {}, {}, {range}, {})",
                    self.position_literal(),
                    lua_string_literal(name),
                    lua_bool(command.bang),
                    lua_string_literal(args)
                ));
            }
        }
        Ok(())
    }

    /// `, a, b` for trailing call arguments, or nothing.
    fn expression_args(&self, args: &[Expression]) -> Result<String, TranslateError> {
        let mut out = String::new();
        for arg in args {
            out.push_str(", ");
            out.push_str(&self.expr(&arg.root)?);
        }
        Ok(out)
    }

    fn unlet(&mut self, target: &Expression, bang: bool) -> Result<(), TranslateError> {
        let bang = lua_bool(bang);
        let code = match &target.root.kind {
            ExprKind::Variable { scope, name } => {
                format!("vim.var.unset(state, {bang}, {})", self.variable_storage(*scope, name).args())
            }
            ExprKind::CurlyName { scope, parts } => {
                format!("vim.var.unset(state, {bang}, {})", self.curly_storage(*scope, parts)?.args())
            }
            ExprKind::Subscript { base, index } => format!(
                "vim.subscript.remove(state, {bang}, {}, {})",
                self.expr(base)?,
                self.expr(index)?
            ),
            ExprKind::ConcatOrSubscript { base, key } => format!(
                "vim.subscript.remove(state, {bang}, {}, {})",
                self.expr(base)?,
                lua_string_literal(key)
            ),
            ExprKind::Slice { base, from, to } => {
                let from = match from {
                    Some(from) => self.expr(from)?,
                    None => "nil".to_string(),
                };
                let to = match to {
                    Some(to) => self.expr(to)?,
                    None => "nil".to_string(),
                };
                format!(
                    "vim.subscript.remove_slice(state, {bang}, {}, {from}, {to})",
                    self.expr(base)?
                )
            }
            ExprKind::EnvironmentVariable(name) => format!("vim.env.unset(state, {})", lua_string_literal(name)),
            other => {
                return Err(TranslateError::Internal(format!("not an unlet target: {other:?}")));
            }
        };
        self.line(code);
        Ok(())
    }
}
