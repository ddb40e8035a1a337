//! Expression printer.
//!
//! Output parses back to the same tree (spans aside). Parentheses are only
//! printed where the tree has an [`ExprKind::Expression`] node, so a tree
//! that did not come from the parser may print ambiguously.

use viml_value::format_float;

use crate::expr::{ExprKind, ExprNode, NamePart, OptionScope};

/// Float literal text. Literals too large for a double parse as infinity,
/// so infinity prints as one of those.
fn float_literal(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "1.0e400" } else { "-1.0e400" }.to_string()
    } else {
        format_float(value)
    }
}

pub fn print_expr(node: &ExprNode) -> String {
    let mut out = String::new();
    print_into(node, &mut out);
    out
}

fn print_into(node: &ExprNode, out: &mut String) {
    match &node.kind {
        ExprKind::Ternary {
            condition,
            if_true,
            if_false,
        } => {
            print_into(condition, out);
            out.push_str(" ? ");
            print_into(if_true, out);
            out.push_str(" : ");
            print_into(if_false, out);
        }
        ExprKind::LogicalOr(a, b) => binary(a, "||", b, out),
        ExprKind::LogicalAnd(a, b) => binary(a, "&&", b, out),
        ExprKind::Compare { op, case, lhs, rhs } => {
            print_into(lhs, out);
            out.push(' ');
            out.push_str(op.token());
            out.push_str(case.suffix());
            out.push(' ');
            print_into(rhs, out);
        }
        ExprKind::Add(a, b) => binary(a, "+", b, out),
        ExprKind::Subtract(a, b) => binary(a, "-", b, out),
        ExprKind::Concat(a, b) => binary(a, ".", b, out),
        ExprKind::Multiply(a, b) => binary(a, "*", b, out),
        ExprKind::Divide(a, b) => binary(a, "/", b, out),
        ExprKind::Modulo(a, b) => binary(a, "%", b, out),
        ExprKind::Not(a) => unary("!", a, out),
        ExprKind::Minus(a) => unary("-", a, out),
        ExprKind::Plus(a) => unary("+", a, out),
        ExprKind::DecimalNumber(n) => out.push_str(&n.to_string()),
        ExprKind::OctalNumber(n) => out.push_str(&format!("0{n:o}")),
        ExprKind::HexNumber(n) => out.push_str(&format!("0x{n:X}")),
        ExprKind::Float(f) => out.push_str(&float_literal(*f)),
        ExprKind::DoubleQuotedString { raw, .. } => {
            out.push('"');
            out.push_str(raw);
            out.push('"');
        }
        ExprKind::SingleQuotedString(text) => {
            out.push('\'');
            out.push_str(&text.replace('\'', "''"));
            out.push('\'');
        }
        ExprKind::Option { scope, name } => {
            out.push('&');
            match scope {
                OptionScope::Default => {}
                OptionScope::Global => out.push_str("g:"),
                OptionScope::Local => out.push_str("l:"),
            }
            out.push_str(name);
        }
        ExprKind::Register(register) => {
            out.push('@');
            out.extend(register);
        }
        ExprKind::EnvironmentVariable(name) => {
            out.push('$');
            out.push_str(name);
        }
        ExprKind::Variable { scope, name } => {
            if let Some(scope) = scope {
                out.push(scope.letter());
                out.push(':');
            }
            out.push_str(name);
        }
        ExprKind::ScopeDict(scope) => {
            out.push(scope.letter());
            out.push(':');
        }
        ExprKind::CurlyName { scope, parts } => {
            if let Some(scope) = scope {
                out.push(scope.letter());
                out.push(':');
            }
            for part in parts {
                match part {
                    NamePart::Literal(text) => out.push_str(text),
                    NamePart::Expr(expr) => {
                        out.push('{');
                        print_into(expr, out);
                        out.push('}');
                    }
                }
            }
        }
        ExprKind::Expression(inner) => {
            out.push('(');
            print_into(inner, out);
            out.push(')');
        }
        ExprKind::ConcatOrSubscript { base, key } => {
            print_into(base, out);
            out.push('.');
            out.push_str(key);
        }
        ExprKind::Subscript { base, index } => {
            print_into(base, out);
            out.push('[');
            print_into(index, out);
            out.push(']');
        }
        ExprKind::Slice { base, from, to } => {
            print_into(base, out);
            out.push('[');
            // Spaces keep `a:b` from reading as a scoped name.
            if let Some(from) = from {
                print_into(from, out);
                out.push(' ');
            }
            out.push(':');
            if let Some(to) = to {
                out.push(' ');
                print_into(to, out);
            }
            out.push(']');
        }
        ExprKind::List(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                print_into(item, out);
            }
            out.push(']');
        }
        ExprKind::Dictionary(entries) => {
            out.push('{');
            for (index, (key, value)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                print_into(key, out);
                if matches!(key.kind, ExprKind::Variable { .. } | ExprKind::CurlyName { .. }) {
                    out.push(' ');
                }
                out.push_str(": ");
                print_into(value, out);
            }
            out.push('}');
        }
        ExprKind::Call { callee, args } => {
            print_into(callee, out);
            out.push('(');
            for (index, arg) in args.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                print_into(arg, out);
            }
            out.push(')');
        }
    }
}

fn binary(lhs: &ExprNode, op: &str, rhs: &ExprNode, out: &mut String) {
    print_into(lhs, out);
    out.push(' ');
    out.push_str(op);
    out.push(' ');
    print_into(rhs, out);
}

fn unary(op: &str, operand: &ExprNode, out: &mut String) {
    out.push_str(op);
    print_into(operand, out);
}
