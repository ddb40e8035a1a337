//! Conditionals, loops and exception handling.
//!
//! Loop bodies are wrapped in `do ... end` followed by a `::continue_N::`
//! label, so `:continue` is a `goto`. Code that runs inside a protected
//! closure (a `:try` body, a catch clause, a `finally` clause) cannot
//! `break` or `goto` out of it; it returns one of the `FLOW_*` codes
//! instead, and the code after the `pcall` carries the jump out.

use viml_ir::{AssignOp, AssignTarget, Branch, CatchClause, CommandNode, Expression, Position};
use viml_value::LegacyError;

use super::{
    Context, FLOW_BREAK, FLOW_CONTINUE, FLOW_RETURN, LoopContext, TranslateError, Translator, lua_string_literal,
};

impl Translator<'_> {
    pub(super) fn if_command(&mut self, branches: &[Branch], else_body: Option<&[CommandNode]>) -> Result<(), TranslateError> {
        for (index, branch) in branches.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "elseif" };
            let position = format!("{}:{}:{keyword}", branch.position.line, branch.position.column);
            let saved = std::mem::replace(&mut self.position, position);
            let condition = self.expr(&branch.condition.root);
            self.position = saved;
            self.line(format!("{keyword} vim.bool(state, {}) then", condition?));
            self.indented(|t| t.block(&branch.body))?;
        }
        if let Some(body) = else_body {
            self.line("else");
            self.indented(|t| t.block(body))?;
        }
        self.line("end");
        Ok(())
    }

    pub(super) fn while_command(&mut self, condition: &Expression, body: &[CommandNode]) -> Result<(), TranslateError> {
        let label = self.fresh_id();
        let condition = self.expr(&condition.root)?;
        self.line(format!("while vim.bool(state, {condition}) do"));
        self.loop_body(label, |t| t.block(body))?;
        self.line("end");
        Ok(())
    }

    /// Items appended to the List while the loop runs are visited too.
    pub(super) fn for_command(
        &mut self,
        target: &AssignTarget,
        iterable: &Expression,
        body: &[CommandNode],
    ) -> Result<(), TranslateError> {
        let label = self.fresh_id();
        let item = format!("item_{label}");
        let iterable = self.expr(&iterable.root)?;
        self.line(format!("for _, {item} in vim.iter(state, {iterable}) do"));
        self.loop_body(label, |t| {
            t.assign_target(target, AssignOp::Assign, &item)?;
            t.block(body)
        })?;
        self.line("end");
        Ok(())
    }

    fn loop_body(
        &mut self,
        label: usize,
        body: impl FnOnce(&mut Self) -> Result<(), TranslateError>,
    ) -> Result<(), TranslateError> {
        let context = Context {
            in_loop: Some(LoopContext {
                label,
                through_closure: false,
            }),
            in_function: self.context.in_function,
            recover: self.context.recover,
        };
        self.indented(|t| {
            t.line("do");
            t.indented(|t| t.with_context(context, body))?;
            t.line("end");
            t.line(format!("::continue_{label}::"));
            Ok(())
        })
    }

    pub(super) fn break_command(&mut self, position: Position) -> Result<(), TranslateError> {
        match self.context.in_loop {
            None => return Err(TranslateError::loop_control(position, LegacyError::BreakOutsideLoop)),
            Some(ctx) if ctx.through_closure => self.line(format!("do return {FLOW_BREAK} end")),
            Some(_) => self.line("do break end"),
        }
        Ok(())
    }

    pub(super) fn continue_command(&mut self, position: Position) -> Result<(), TranslateError> {
        match self.context.in_loop {
            None => return Err(TranslateError::loop_control(position, LegacyError::ContinueOutsideLoop)),
            Some(ctx) if ctx.through_closure => self.line(format!("do return {FLOW_CONTINUE} end")),
            Some(ctx) => self.line(format!("goto continue_{}", ctx.label)),
        }
        Ok(())
    }

    /// Body of a closure passed to `pcall`, one level deeper.
    pub(super) fn protected(&mut self, body: &[CommandNode]) -> Result<(), TranslateError> {
        // Errors in here belong to the surrounding `:try`.
        let context = Context {
            recover: false,
            ..self.closure_context()
        };
        self.indented(|t| t.with_context(context, |t| t.block(body)))
    }

    /// Continue a `:break`, `:continue` or `:return` that a protected
    /// closure reported in `flow`.
    fn dispatch_flow(&mut self, flow: &str, value: &str) {
        if let Some(ctx) = self.context.in_loop {
            let (leave, next) = if ctx.through_closure {
                (format!("return {FLOW_BREAK}"), format!("return {FLOW_CONTINUE}"))
            } else {
                ("break".to_string(), format!("goto continue_{}", ctx.label))
            };
            self.line(format!("if {flow} == {FLOW_BREAK} then {leave} end"));
            self.line(format!("if {flow} == {FLOW_CONTINUE} then {next} end"));
        }
        if let Some(ctx) = self.context.in_function {
            let leave = if ctx.through_closure {
                format!("return {FLOW_RETURN}, {value}")
            } else {
                format!("return {value}")
            };
            self.line(format!("if {flow} == {FLOW_RETURN} then {leave} end"));
        }
    }

    /// `:try` with its catch clauses and optional `:finally`.
    ///
    /// An exception that no clause catches stays pending while `:finally`
    /// runs and is thrown again afterwards, unless `:finally` raises its
    /// own or leaves through `:break`, `:continue` or `:return`.
    pub(super) fn try_command(
        &mut self,
        body: &[CommandNode],
        catches: &[CatchClause],
        finally: Option<&[CommandNode]>,
    ) -> Result<(), TranslateError> {
        let id = self.fresh_id();
        let ok = format!("ok_{id}");
        let flow = format!("flow_{id}");
        let value = format!("value_{id}");
        let pending = format!("pending_{id}");

        self.line("do");
        self.indented(|t| {
            t.line(format!("local {ok}, {flow}, {value} = pcall(function()"));
            t.protected(body)?;
            t.line("end)");
            t.line(format!("local {pending} = nil"));
            t.line(format!("if not {ok} then"));
            t.indented(|t| {
                t.line(format!("{pending} = vim.err.exception(state, {flow})"));
                t.line(format!("{flow} = nil"));
            });
            t.line("end");

            for (index, catch) in catches.iter().enumerate() {
                let keyword = if index == 0 { "if" } else { "elseif" };
                let pattern = catch
                    .pattern
                    .as_deref()
                    .map_or_else(|| "nil".to_string(), lua_string_literal);
                t.line(format!(
                    "{keyword} {pending} ~= nil and vim.err.matches(state, {pending}, {pattern}) then"
                ));
                t.indented(|t| t.catch_clause(catch, &pending, &flow, &value))?;
            }
            if !catches.is_empty() {
                t.line("end");
            }

            if let Some(finally) = finally {
                let clause = t.fresh_id();
                let (fin_ok, fin_flow, fin_value) =
                    (format!("ok_{clause}"), format!("flow_{clause}"), format!("value_{clause}"));
                t.line(format!("local {fin_ok}, {fin_flow}, {fin_value} = pcall(function()"));
                t.protected(finally)?;
                t.line("end)");
                t.line(format!("if not {fin_ok} then"));
                t.indented(|t| {
                    t.line(format!("{pending} = vim.err.exception(state, {fin_flow})"));
                    t.line(format!("{flow} = nil"));
                });
                t.line(format!("elseif {fin_flow} ~= nil then"));
                t.indented(|t| {
                    t.line(format!("{flow}, {value} = {fin_flow}, {fin_value}"));
                    t.line(format!("{pending} = nil"));
                });
                t.line("end");
            }

            t.line(format!("if {pending} ~= nil then vim.err.rethrow(state, {pending}) end"));
            t.dispatch_flow(&flow, &value);
            Ok::<(), TranslateError>(())
        })?;
        self.line("end");
        Ok(())
    }

    fn catch_clause(&mut self, catch: &CatchClause, pending: &str, flow: &str, value: &str) -> Result<(), TranslateError> {
        let id = self.fresh_id();
        let caught = format!("caught_{id}");
        let (ok, catch_flow, catch_value) = (format!("ok_{id}"), format!("flow_{id}"), format!("value_{id}"));
        self.line(format!("local {caught} = {pending}"));
        self.line(format!("{pending} = nil"));
        self.line(format!("local {ok}, {catch_flow}, {catch_value} = pcall(function()"));
        self.indented(|t| t.line(format!("vim.err.begin_catch(state, {caught})")));
        self.protected(&catch.body)?;
        self.line("end)");
        self.line("vim.err.end_catch(state)");
        self.line(format!("if not {ok} then"));
        self.indented(|t| t.line(format!("{pending} = vim.err.exception(state, {catch_flow})")));
        self.line("else");
        self.indented(|t| t.line(format!("{flow}, {value} = {catch_flow}, {catch_value}")));
        self.line("end");
        Ok(())
    }
}
