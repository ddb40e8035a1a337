//! User functions.
//!
//! `:function` becomes a call to `vim.user.define` with the body as a Lua
//! function `function(state, self, ...)`. The generated function checks its
//! argument count, builds the function-scope state `fstate` holding `l:`
//! and `a:`, and always returns a value.

use viml_ir::{AssignOp, Expression, FunctionDef, FunctionName};
use viml_value::LegacyError;

use super::command::lua_bool;
use super::{Context, FLOW_RETURN, FunctionContext, TranslateError, Translator, lua_number, lua_string_literal};

impl Translator<'_> {
    pub(super) fn function_command(&mut self, def: &FunctionDef, bang: bool) -> Result<(), TranslateError> {
        let display = def.name.display();
        let params: Vec<String> = def.params.iter().map(|p| lua_string_literal(p)).collect();
        let params = format!("{{{}}}", params.join(", "));
        let attributes = def.attributes;
        let is_member = matches!(def.name, FunctionName::Member(_));
        let attributes = format!(
            "{{range = {}, abort = {}, dict = {}, closure = {}}}",
            lua_bool(attributes.range),
            lua_bool(attributes.abort),
            lua_bool(attributes.dict || is_member),
            lua_bool(attributes.closure)
        );
        let name = match &def.name {
            FunctionName::Named { .. } => lua_string_literal(&display),
            FunctionName::Member(_) => "nil".to_string(),
        };
        let header = format!(
            "vim.user.define(state, {}, {name}, {}, {attributes}, {params}, {}, function(state, self, ...)",
            self.position_literal(),
            lua_bool(bang),
            lua_bool(def.varargs)
        );

        match &def.name {
            FunctionName::Named { .. } => {
                self.line(header);
                self.function_body(def, &display, &params)?;
                self.line("end)");
            }
            FunctionName::Member(target) => {
                // The anonymous function is stored in the named item.
                let funcref = format!("funcref_{}", self.fresh_id());
                self.line("do");
                self.indented(|t| {
                    t.line(format!("local {funcref} = {header}"));
                    t.function_body(def, &display, &params)?;
                    t.line("end)");
                    let place = t.place(&target.root)?;
                    t.assign(&place, AssignOp::Assign, &funcref);
                    Ok::<(), TranslateError>(())
                })?;
                self.line("end");
            }
        }
        Ok(())
    }

    fn function_body(&mut self, def: &FunctionDef, display: &str, params: &str) -> Result<(), TranslateError> {
        let outer = if def.attributes.closure { self.function_state() } else { "nil" };
        let arity = lua_number(def.params.len() as i64);
        let too_few = self.report(LegacyError::NotEnoughArguments, display);
        let too_many = self.report(LegacyError::TooManyArguments, display);
        let abort = def.attributes.abort;
        let varargs = lua_bool(def.varargs);

        let context = Context {
            in_loop: None,
            in_function: Some(FunctionContext { through_closure: abort }),
            recover: !abort,
        };
        self.indented(|t| {
            t.line(format!("if select(\"#\", ...) < {arity} then return {too_few} end"));
            if !def.varargs {
                t.line(format!("if select(\"#\", ...) > {arity} then return {too_many} end"));
            }
            t.line(format!(
                "local fstate = vim.state.new_function(state, self, {outer}, {params}, {varargs}, ...)"
            ));
            if abort {
                t.line("local ok, flow, value = pcall(function()");
                t.indented(|t| t.with_context(context, |t| t.block(&def.body)))?;
                t.line("end)");
                t.line("if not ok then return vim.err.abort(state, flow) end");
                t.line(format!("if flow == {FLOW_RETURN} then return value end"));
            } else {
                t.with_context(context, |t| t.block(&def.body))?;
            }
            t.line("return 0");
            Ok(())
        })
    }

    pub(super) fn return_command(&mut self, value: Option<&Expression>) -> Result<(), TranslateError> {
        let Some(function) = self.context.in_function else {
            let report = self.report(LegacyError::ReturnOutsideFunction, "");
            self.line(report);
            return Ok(());
        };
        let value = match value {
            Some(value) => self.expr(&value.root)?,
            None => "0".to_string(),
        };
        if function.through_closure {
            self.line(format!("do return {FLOW_RETURN}, {value} end"));
        } else {
            self.line(format!("do return {value} end"));
        }
        Ok(())
    }

    pub(super) fn delfunction_command(&mut self, name: &FunctionName, bang: bool) -> Result<(), TranslateError> {
        let function = match name {
            FunctionName::Named { .. } => lua_string_literal(&name.display()),
            FunctionName::Member(target) => self.expr(&target.root)?,
        };
        self.line(format!(
            "vim.user.delete(state, {}, {function}, {})",
            self.position_literal(),
            lua_bool(bang)
        ));
        Ok(())
    }
}
