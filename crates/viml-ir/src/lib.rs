//! Syntax tree types for the legacy editor script language.
//!
//! This crate defines the trees the parser produces and the translator
//! consumes:
//!
//! - [`ExprNode`]: one node of an expression tree, with its [`Span`]
//! - [`Expression`]: a parsed expression together with the copy of the
//!   source text its spans point into
//! - [`CommandNode`]: one command of a script, with nested bodies for the
//!   block commands (`:if`, `:while`, `:for`, `:function`, `:try`)
//!
//! [`print_expr`] turns an expression tree back into source text that
//! parses to the same tree.

mod command;
mod expr;
mod printer;

pub use command::{
    Address, AddressBase, AssignOp, AssignTarget, Branch, CatchClause, CommandKind, CommandNode, EchoKind,
    FunctionAttributes, FunctionDef, FunctionName, LetValue, LineRange, Position,
};
pub use expr::{CaseCompare, CompareOp, ExprKind, ExprNode, Expression, NamePart, OptionScope, Scope, Span};
pub use printer::print_expr;

#[cfg(test)]
mod tests;
