use pretty_assertions::assert_eq;

use crate::*;

fn node(kind: ExprKind) -> ExprNode {
    ExprNode::new(kind, Span::default())
}

fn num(n: i64) -> Box<ExprNode> {
    Box::new(node(ExprKind::DecimalNumber(n)))
}

fn var(name: &str) -> Box<ExprNode> {
    Box::new(node(ExprKind::Variable {
        scope: None,
        name: name.to_string(),
    }))
}

#[test]
fn test_print_binary_operators() {
    let tree = node(ExprKind::Add(num(1), Box::new(node(ExprKind::Multiply(num(2), num(3))))));
    assert_eq!(print_expr(&tree), "1 + 2 * 3");

    let tree = node(ExprKind::Compare {
        op: CompareOp::NotEquals,
        case: CaseCompare::IgnoreCase,
        lhs: var("a"),
        rhs: var("b"),
    });
    assert_eq!(print_expr(&tree), "a !=? b");
}

#[test]
fn test_print_numbers_keep_their_radix() {
    assert_eq!(print_expr(&node(ExprKind::OctalNumber(15))), "017");
    assert_eq!(print_expr(&node(ExprKind::OctalNumber(0))), "00");
    assert_eq!(print_expr(&node(ExprKind::HexNumber(255))), "0xFF");
    assert_eq!(print_expr(&node(ExprKind::Float(2.0))), "2.0");
    assert_eq!(print_expr(&node(ExprKind::Float(f64::INFINITY))), "1.0e400");
}

#[test]
fn test_print_strings() {
    let single = node(ExprKind::SingleQuotedString("it's".to_string()));
    assert_eq!(print_expr(&single), "'it''s'");
    let double = node(ExprKind::DoubleQuotedString {
        raw: r"a\tb".to_string(),
        value: b"a\tb".to_vec(),
    });
    assert_eq!(print_expr(&double), r#""a\tb""#);
}

#[test]
fn test_print_names_and_special_references() {
    let scoped = node(ExprKind::Variable {
        scope: Some(Scope::Global),
        name: "x".to_string(),
    });
    assert_eq!(print_expr(&scoped), "g:x");
    assert_eq!(print_expr(&node(ExprKind::ScopeDict(Scope::Script))), "s:");
    let option = node(ExprKind::Option {
        scope: OptionScope::Local,
        name: "sw".to_string(),
    });
    assert_eq!(print_expr(&option), "&l:sw");
    assert_eq!(print_expr(&node(ExprKind::Register(Some('a')))), "@a");
    assert_eq!(print_expr(&node(ExprKind::EnvironmentVariable("HOME".to_string()))), "$HOME");

    let curly = node(ExprKind::CurlyName {
        scope: None,
        parts: vec![
            NamePart::Literal("foo".to_string()),
            NamePart::Expr(node(ExprKind::Variable {
                scope: None,
                name: "i".to_string(),
            })),
        ],
    });
    assert_eq!(print_expr(&curly), "foo{i}");
}

#[test]
fn test_print_containers_and_postfix() {
    let list = node(ExprKind::List(vec![*num(1), *var("x")]));
    assert_eq!(print_expr(&list), "[1, x]");

    let dict = node(ExprKind::Dictionary(vec![
        (node(ExprKind::SingleQuotedString("k".to_string())), *num(1)),
        (*var("a"), *num(2)),
    ]));
    assert_eq!(print_expr(&dict), "{'k': 1, a : 2}");

    let slice = node(ExprKind::Slice {
        base: var("l"),
        from: Some(var("s")),
        to: None,
    });
    assert_eq!(print_expr(&slice), "l[s :]");

    let member = node(ExprKind::ConcatOrSubscript {
        base: var("d"),
        key: "key".to_string(),
    });
    assert_eq!(print_expr(&member), "d.key");

    let call = node(ExprKind::Call {
        callee: var("len"),
        args: vec![*var("l")],
    });
    assert_eq!(print_expr(&call), "len(l)");
}

#[test]
fn test_without_spans_clears_every_node() {
    let tree = ExprNode::new(
        ExprKind::Minus(Box::new(ExprNode::new(ExprKind::DecimalNumber(1), Span::new(1, 2)))),
        Span::new(0, 2),
    );
    let cleared = tree.without_spans();
    assert_eq!(cleared.span, Span::default());
    assert_eq!(cleared.children()[0].span, Span::default());
    assert_eq!(cleared, node(ExprKind::Minus(num(1))));
}

#[test]
fn test_scope_letters() {
    for scope in Scope::ALL {
        assert_eq!(Scope::from_letter(scope.letter() as u8), Some(scope));
    }
    assert_eq!(Scope::from_letter(b'x'), None);
}

#[test]
fn test_expression_text() {
    let expression = Expression {
        source: "a + b".to_string(),
        column: 5,
        root: ExprNode::new(ExprKind::Add(var("a"), var("b")), Span::new(0, 5)),
    };
    assert_eq!(expression.root_text(), "a + b");
    assert_eq!(expression.text(Span::new(4, 5)), "b");
}
