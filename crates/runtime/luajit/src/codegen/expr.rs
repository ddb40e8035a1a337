//! Expressions. Every expression becomes one Lua expression that yields a
//! runtime value.

use viml_ir::{CaseCompare, CompareOp, ExprKind, ExprNode, OptionScope};
use viml_value::number::scan_number;

use super::{TranslateError, Translator, lua_bytes_literal, lua_field, lua_float, lua_number, lua_string_literal};

/// Runtime entry point of a comparison that is not a negation.
fn compare_function(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Equals | CompareOp::NotEquals => "vim.op.equals",
        CompareOp::Identical | CompareOp::NotIdentical => "vim.op.identical",
        CompareOp::Matches | CompareOp::NotMatches => "vim.op.matches",
        CompareOp::Greater => "vim.op.greater",
        CompareOp::GreaterOrEqual => "vim.op.greater_or_equal",
        CompareOp::Less => "vim.op.less",
        CompareOp::LessOrEqual => "vim.op.less_or_equal",
    }
}

fn case_constant(case: CaseCompare) -> &'static str {
    match case {
        CaseCompare::UseOption => "vim.USE_OPTION",
        CaseCompare::MatchCase => "vim.MATCH_CASE",
        CaseCompare::IgnoreCase => "vim.IGNORE_CASE",
    }
}

/// Builtin functions are named in lowercase; user functions start with a
/// capital, a scope or an autoload prefix.
fn is_builtin_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Translator<'_> {
    pub(crate) fn expr(&self, node: &ExprNode) -> Result<String, TranslateError> {
        let code = match &node.kind {
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => format!(
                "(function() if vim.bool(state, {}) then return {} end return {} end)()",
                self.expr(condition)?,
                self.expr(if_true)?,
                self.expr(if_false)?
            ),
            ExprKind::LogicalOr(a, b) => format!(
                "((vim.bool(state, {}) or vim.bool(state, {})) and 1 or 0)",
                self.expr(a)?,
                self.expr(b)?
            ),
            ExprKind::LogicalAnd(a, b) => format!(
                "((vim.bool(state, {}) and vim.bool(state, {})) and 1 or 0)",
                self.expr(a)?,
                self.expr(b)?
            ),
            ExprKind::Compare { op, case, lhs, rhs } => {
                let positive = format!(
                    "{}(state, {}, {}, {})",
                    compare_function(*op),
                    self.expr(lhs)?,
                    self.expr(rhs)?,
                    case_constant(*case)
                );
                if op.negation_of().is_some() {
                    format!("vim.op.negate(state, {positive})")
                } else {
                    positive
                }
            }
            ExprKind::Add(a, b) => self.binary("add", a, b)?,
            ExprKind::Subtract(a, b) => self.binary("subtract", a, b)?,
            ExprKind::Concat(a, b) => self.binary("concat", a, b)?,
            ExprKind::Multiply(a, b) => self.binary("multiply", a, b)?,
            ExprKind::Divide(a, b) => self.binary("divide", a, b)?,
            ExprKind::Modulo(a, b) => self.binary("modulo", a, b)?,
            ExprKind::Not(a) => format!("vim.op.logical_not(state, {})", self.expr(a)?),
            ExprKind::Minus(a) => format!("vim.op.negative(state, {})", self.expr(a)?),
            ExprKind::Plus(a) => format!("vim.op.positive(state, {})", self.expr(a)?),
            ExprKind::DecimalNumber(n) | ExprKind::OctalNumber(n) | ExprKind::HexNumber(n) => lua_number(*n),
            ExprKind::Float(f) => format!("vim.float({})", lua_float(*f)),
            ExprKind::DoubleQuotedString { value, .. } => lua_bytes_literal(value),
            ExprKind::SingleQuotedString(text) => lua_string_literal(text),
            ExprKind::Option { scope, name } => {
                let scope = match scope {
                    OptionScope::Default => "nil",
                    OptionScope::Global => "\"global\"",
                    OptionScope::Local => "\"local\"",
                };
                format!("vim.option.get(state, {}, {scope})", lua_string_literal(name))
            }
            ExprKind::Register(register) => {
                let name = register.map_or_else(|| "nil".to_string(), |r| lua_string_literal(&r.to_string()));
                format!("vim.register.get(state, {name})")
            }
            ExprKind::EnvironmentVariable(name) => format!("vim.env.get(state, {})", lua_string_literal(name)),
            ExprKind::Variable { scope, name } => {
                format!("vim.var.get(state, {})", self.variable_storage(*scope, name).args())
            }
            ExprKind::ScopeDict(scope) => self.scope_table(*scope, &format!("{}:", scope.letter())),
            ExprKind::CurlyName { scope, parts } => {
                format!("vim.var.get(state, {})", self.curly_storage(*scope, parts)?.args())
            }
            ExprKind::Expression(inner) => format!("({})", self.expr(inner)?),
            ExprKind::ConcatOrSubscript { base, key } => format!(
                "vim.subscript.concat_or_subscript(state, {}, {}, function() return {} end)",
                self.expr(base)?,
                lua_string_literal(key),
                self.concat_fallback(key)
            ),
            ExprKind::Subscript { base, index } => format!(
                "vim.subscript.index(state, {}, {})",
                self.expr(base)?,
                self.expr(index)?
            ),
            ExprKind::Slice { base, from, to } => format!(
                "vim.subscript.slice(state, {}, {}, {})",
                self.expr(base)?,
                self.optional(from.as_deref())?,
                self.optional(to.as_deref())?
            ),
            ExprKind::List(items) => format!("vim.list.new(state, {{{}}})", self.expr_list(items)?),
            ExprKind::Dictionary(entries) => {
                let mut flat = Vec::with_capacity(entries.len() * 2);
                for (key, value) in entries {
                    flat.push(self.expr(key)?);
                    flat.push(self.expr(value)?);
                }
                format!("vim.dict.new(state, {{{}}})", flat.join(", "))
            }
            ExprKind::Call { callee, args } => self.call(callee, args)?,
        };
        Ok(code)
    }

    fn binary(&self, op: &str, a: &ExprNode, b: &ExprNode) -> Result<String, TranslateError> {
        Ok(format!("vim.op.{op}(state, {}, {})", self.expr(a)?, self.expr(b)?))
    }

    fn optional(&self, node: Option<&ExprNode>) -> Result<String, TranslateError> {
        node.map_or_else(|| Ok("nil".to_string()), |node| self.expr(node))
    }

    pub(super) fn expr_list(&self, items: &[ExprNode]) -> Result<String, TranslateError> {
        let items = items.iter().map(|item| self.expr(item)).collect::<Result<Vec<_>, _>>()?;
        Ok(items.join(", "))
    }

    /// Right operand of `base.key` read as a concatenation: a Number when
    /// the key is one, a variable otherwise.
    fn concat_fallback(&self, key: &str) -> String {
        match scan_number(key.as_bytes(), false) {
            Some(number) if number.len == key.len() => lua_number(number.value),
            _ => format!("vim.var.get(state, {})", self.variable_storage(None, key).args()),
        }
    }

    fn call(&self, callee: &ExprNode, args: &[ExprNode]) -> Result<String, TranslateError> {
        let args = self.expr_list(args)?;
        let tail = if args.is_empty() { String::new() } else { format!(", {args}") };
        let code = match &callee.kind {
            ExprKind::Variable { scope: None, name } if is_builtin_name(name) => {
                format!("{}(state{tail})", lua_field("vim.functions", name))
            }
            ExprKind::Variable { scope, name } => {
                let display = match scope {
                    Some(scope) => format!("{}:{name}", scope.letter()),
                    None => name.clone(),
                };
                format!(
                    "vim.call.named(state, {}, {}{tail})",
                    self.function_state(),
                    lua_string_literal(&display)
                )
            }
            ExprKind::CurlyName { scope, parts } => format!(
                "vim.call.named(state, {}, {}{tail})",
                self.function_state(),
                self.curly_name(*scope, parts)?
            ),
            ExprKind::ConcatOrSubscript { base, key } => format!(
                "vim.call.method(state, {}, {}{tail})",
                self.expr(base)?,
                lua_string_literal(key)
            ),
            ExprKind::Subscript { base, index } => format!(
                "vim.call.method(state, {}, {}{tail})",
                self.expr(base)?,
                self.expr(index)?
            ),
            _ => format!("vim.call.value(state, {}{tail})", self.expr(callee)?),
        };
        Ok(code)
    }
}

