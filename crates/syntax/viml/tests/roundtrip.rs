//! Property tests: printing a parsed expression and parsing the output gives
//! back the same tree.

use proptest::prelude::*;
use rhizome_viml_syntax::parse_expression_str;
use viml_ir::print_expr;

/// Variable names, avoiding the word operators.
fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z][a-z0-9_]{1,5}").expect("valid regex"),
        prop::string::string_regex("[gsvbwt]:[a-z][a-z0-9_]{0,4}").expect("valid regex"),
        prop::string::string_regex("[a-z]{2,4}#[a-z]{1,4}").expect("valid regex"),
    ]
    .prop_filter("not an operator", |name| !matches!(name.as_str(), "is" | "isnot"))
}

fn leaf_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..100_000).prop_map(|n| n.to_string()),
        (1u32..0o77).prop_map(|n| format!("0{n:o}")),
        (0u32..=255).prop_map(|n| format!("0x{n:02x}")),
        (0.0f64..1000.0).prop_map(|f| format!("{f:.2}")),
        Just("1.0e400".to_string()),
        prop::string::string_regex("'[a-z ']{0,6}'")
            .expect("valid regex")
            .prop_map(|s| {
                // Quotes inside the body must come in pairs.
                let body = &s[1..s.len() - 1];
                format!("'{}'", body.replace('\'', "''"))
            }),
        prop::string::string_regex(r#""([a-z ]|\\[ntr"\\]|\\x4[0-9]|\\<CR>){0,5}""#).expect("valid regex"),
        prop::string::string_regex("&(g:|l:)?[a-z]{2,8}").expect("valid regex"),
        prop::string::string_regex(r"\$[A-Z_]{1,6}").expect("valid regex"),
        prop::string::string_regex("@[a-z\"]").expect("valid regex"),
        name_strategy(),
    ]
}

const BINARY: &[&str] = &["||", "&&", "+", "-", ".", "..", "*", "/", "%"];
const COMPARE: &[&str] = &["==", "!=", "=~", "!~", ">", ">=", "<", "<=", "is", "isnot"];
const CASE: &[&str] = &["", "#", "?"];
const UNARY: &[&str] = &["!", "-", "+"];

/// Source text of a valid expression. Composite operands are parenthesised
/// so that any combination is grammatical.
fn expr_strategy() -> impl Strategy<Value = String> {
    leaf_strategy().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(BINARY), inner.clone()).prop_map(|(a, op, b)| format!("({a}) {op} ({b})")),
            (
                inner.clone(),
                prop::sample::select(COMPARE),
                prop::sample::select(CASE),
                inner.clone()
            )
                .prop_map(|(a, op, case, b)| format!("({a}) {op}{case} ({b})")),
            (prop::sample::select(UNARY), inner.clone()).prop_map(|(op, a)| format!("{op}({a})")),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, a, b)| format!("({c}) ? ({a}) : ({b})")),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
            prop::collection::vec(("[a-z]{1,4}", inner.clone()), 0..3).prop_map(|entries| {
                let entries: Vec<String> = entries.into_iter().map(|(k, v)| format!("'{k}': {v}")).collect();
                format!("{{{}}}", entries.join(", "))
            }),
            (name_strategy(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(name, args)| format!("{name}({})", args.join(", "))),
            (name_strategy(), inner.clone()).prop_map(|(name, index)| format!("{name}[{index}]")),
            (name_strategy(), prop::option::of(inner.clone()), prop::option::of(inner.clone())).prop_map(
                |(name, from, to)| format!("{name}[{} : {}]", from.unwrap_or_default(), to.unwrap_or_default())
            ),
            (name_strategy(), "[a-z][a-z0-9_]{0,4}").prop_map(|(name, key)| format!("{name}.{key}")),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn print_then_parse_gives_the_same_tree(source in expr_strategy()) {
        let first = parse_expression_str(&source)
            .unwrap_or_else(|err| panic!("generated {source:?} does not parse: {err}"));
        let printed = print_expr(&first.root);
        let second = parse_expression_str(&printed)
            .unwrap_or_else(|err| panic!("printed {printed:?} (from {source:?}) does not parse: {err}"));
        prop_assert_eq!(first.root.without_spans(), second.root.without_spans());
    }

    #[test]
    fn printing_is_stable(source in expr_strategy()) {
        let first = parse_expression_str(&source).expect("generated source parses");
        let printed = print_expr(&first.root);
        let reparsed = parse_expression_str(&printed).expect("printed source parses");
        prop_assert_eq!(print_expr(&reparsed.root), printed);
    }
}

#[test]
fn test_out_of_range_float_prints_back_as_float() {
    for source in ["1.0e400", "-1.0e400", "[1.0e400, 2.5e-3]"] {
        let first = parse_expression_str(source).expect("source parses");
        let printed = print_expr(&first.root);
        let second = parse_expression_str(&printed)
            .unwrap_or_else(|err| panic!("printed {printed:?} does not parse: {err}"));
        assert_eq!(first.root.without_spans(), second.root.without_spans(), "printed {printed:?}");
    }
}
