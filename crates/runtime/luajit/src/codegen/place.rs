//! Assignment targets.
//!
//! The subexpressions of a target (subscript base and index, resolved
//! scope) are evaluated once into locals, so that `let l[i] += 1` reads and
//! writes the same item.

use viml_ir::{AssignOp, AssignTarget, ExprKind, ExprNode, Expression, OptionScope};
use viml_value::LegacyError;

use super::scope::Storage;
use super::{TranslateError, Translator, lua_number, lua_string_literal};

pub(crate) enum Place {
    Variable { table: String, key: String },
    Item { base: String, index: String },
    Range { base: String, from: String, to: String },
    Option { name: String, scope: &'static str },
    Register(String),
    Environment(String),
}

impl Place {
    pub(crate) fn read(&self) -> String {
        match self {
            Place::Variable { table, key } => format!("vim.var.get(state, {table}, {key})"),
            Place::Item { base, index } => format!("vim.subscript.index(state, {base}, {index})"),
            Place::Range { base, from, to } => format!("vim.subscript.slice(state, {base}, {from}, {to})"),
            Place::Option { name, scope } => format!("vim.option.get(state, {name}, {scope})"),
            Place::Register(name) => format!("vim.register.get(state, {name})"),
            Place::Environment(name) => format!("vim.env.get(state, {name})"),
        }
    }

    pub(crate) fn write(&self, value: &str) -> String {
        match self {
            Place::Variable { table, key } => format!("vim.var.set(state, {value}, {table}, {key})"),
            Place::Item { base, index } => format!("vim.subscript.assign(state, {value}, {base}, {index})"),
            Place::Range { base, from, to } => {
                format!("vim.subscript.assign_slice(state, {value}, {base}, {from}, {to})")
            }
            Place::Option { name, scope } => format!("vim.option.set(state, {value}, {name}, {scope})"),
            Place::Register(name) => format!("vim.register.set(state, {value}, {name})"),
            Place::Environment(name) => format!("vim.env.set(state, {value}, {name})"),
        }
    }
}

impl Translator<'_> {
    /// Evaluate into a fresh local.
    pub(super) fn hoist(&mut self, prefix: &str, code: String) -> String {
        let name = format!("{prefix}_{}", self.fresh_id());
        self.line(format!("local {name} = {code}"));
        name
    }

    fn optional_hoist(&mut self, prefix: &str, node: Option<&ExprNode>) -> Result<String, TranslateError> {
        match node {
            Some(node) => {
                let code = self.expr(node)?;
                Ok(self.hoist(prefix, code))
            }
            None => Ok("nil".to_string()),
        }
    }

    fn storage_place(&mut self, storage: Storage) -> Place {
        match storage {
            Storage::Fixed { table, key } => Place::Variable { table, key },
            Storage::Resolved(call) => {
                let id = self.fresh_id();
                let (table, key) = (format!("scope_{id}"), format!("key_{id}"));
                self.line(format!("local {table}, {key} = {call}"));
                Place::Variable { table, key }
            }
        }
    }

    /// Emit the locals a target needs and describe it.
    pub(super) fn place(&mut self, target: &ExprNode) -> Result<Place, TranslateError> {
        let place = match &target.kind {
            ExprKind::Variable { scope, name } => {
                let storage = self.variable_storage(*scope, name);
                self.storage_place(storage)
            }
            ExprKind::CurlyName { scope, parts } => {
                let storage = self.curly_storage(*scope, parts)?;
                self.storage_place(storage)
            }
            ExprKind::Subscript { base, index } => {
                let base = self.expr(base)?;
                let base = self.hoist("base", base);
                let index = self.expr(index)?;
                let index = self.hoist("index", index);
                Place::Item { base, index }
            }
            ExprKind::ConcatOrSubscript { base, key } => {
                let base = self.expr(base)?;
                let base = self.hoist("base", base);
                Place::Item {
                    base,
                    index: lua_string_literal(key),
                }
            }
            ExprKind::Slice { base, from, to } => {
                let base = self.expr(base)?;
                let base = self.hoist("base", base);
                let from = self.optional_hoist("from", from.as_deref())?;
                let to = self.optional_hoist("to", to.as_deref())?;
                Place::Range { base, from, to }
            }
            ExprKind::Option { scope, name } => Place::Option {
                name: lua_string_literal(name),
                scope: match scope {
                    OptionScope::Default => "nil",
                    OptionScope::Global => "\"global\"",
                    OptionScope::Local => "\"local\"",
                },
            },
            ExprKind::Register(register) => Place::Register(
                register.map_or_else(|| "nil".to_string(), |r| lua_string_literal(&r.to_string())),
            ),
            ExprKind::EnvironmentVariable(name) => Place::Environment(lua_string_literal(name)),
            other => {
                return Err(TranslateError::Internal(format!(
                    "not an assignment target: {other:?}"
                )));
            }
        };
        Ok(place)
    }

    /// Store `value` (a Lua expression evaluated once) in `place`.
    pub(super) fn assign(&mut self, place: &Place, op: AssignOp, value: &str) {
        let stored = match op {
            AssignOp::Assign => value.to_string(),
            _ => format!(
                "vim.let.compound(state, {}, {}, {value})",
                lua_string_literal(op.token()),
                place.read()
            ),
        };
        self.line(place.write(&stored));
    }

    /// Assign `value`, a local holding the already evaluated right side, to
    /// a `:let` or `:for` target. List targets check the item count before
    /// anything is assigned.
    pub(super) fn assign_target(&mut self, target: &AssignTarget, op: AssignOp, value: &str) -> Result<(), TranslateError> {
        match target {
            AssignTarget::Single(expr) => {
                let place = self.place(&expr.root)?;
                self.assign(&place, op, value);
            }
            AssignTarget::Unpack { targets, rest } => {
                self.check_unpack(targets, rest.as_ref(), value);
                for (index, target) in targets.iter().enumerate() {
                    let place = self.place(&target.root)?;
                    let item = format!("vim.list.item(state, {value}, {})", lua_number(index as i64));
                    self.assign(&place, op, &item);
                }
                if let Some(rest) = rest {
                    let place = self.place(&rest.root)?;
                    let tail = format!(
                        "vim.subscript.slice(state, {value}, {}, nil)",
                        lua_number(targets.len() as i64)
                    );
                    self.assign(&place, op, &tail);
                }
            }
        }
        Ok(())
    }

    fn check_unpack(&mut self, targets: &[Expression], rest: Option<&Expression>, value: &str) {
        let expected = lua_number(targets.len() as i64);
        let not_list = self.report(LegacyError::ListRequired, "");
        self.line(format!("if not vim.list.is_list(state, {value}) then {not_list} end"));
        let count = self.hoist("count", format!("vim.list.len(state, {value})"));
        let too_few = self.report(LegacyError::MoreTargets, "");
        self.line(format!("if {count} < {expected} then {too_few} end"));
        if rest.is_none() {
            let too_many = self.report(LegacyError::LessTargets, "");
            self.line(format!("if {count} > {expected} then {too_many} end"));
        }
    }

    /// The target expression, when it is a single target that can be
    /// written without locals.
    pub(super) fn simple_target<'t>(&self, target: &'t AssignTarget) -> Option<&'t Expression> {
        let AssignTarget::Single(expr) = target else {
            return None;
        };
        let simple = match &expr.root.kind {
            ExprKind::Variable { scope, name } => {
                matches!(self.variable_storage(*scope, name), Storage::Fixed { .. })
            }
            ExprKind::Option { .. } | ExprKind::Register(_) | ExprKind::EnvironmentVariable(_) => true,
            _ => false,
        };
        simple.then_some(expr)
    }
}
