//! Tests for the Lua code generator.

use pretty_assertions::assert_eq;
use viml_syntax::parse_expression_str;
use viml_value::LegacyError;

use crate::{TranslateError, TranslateOptions, translate_expression, translate_script};

fn options() -> TranslateOptions {
    TranslateOptions {
        emit_positions: false,
        ..TranslateOptions::default()
    }
}

fn expr(source: &str) -> String {
    let expression = parse_expression_str(source).unwrap_or_else(|err| panic!("parse {source:?}: {err}"));
    translate_expression(&expression).unwrap_or_else(|err| panic!("translate {source:?}: {err}"))
}

/// Translated script without the two prologue lines.
fn body(source: &str) -> String {
    let code = translate_script(source, &options()).unwrap_or_else(|err| panic!("translate: {err}"));
    code.lines().skip(2).map(|line| format!("{line}\n")).collect()
}

fn translate_err(source: &str) -> TranslateError {
    match translate_script(source, &options()) {
        Ok(code) => panic!("expected translation to fail, got:\n{code}"),
        Err(err) => err,
    }
}

fn index_of(code: &str, needle: &str) -> usize {
    code.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{code}"))
}

// Expressions

#[test]
fn test_arithmetic() {
    assert_eq!(expr("1 + 2 * 3"), "vim.op.add(state, 1, vim.op.multiply(state, 2, 3))");
    assert_eq!(expr("-(4 % 3)"), "vim.op.negative(state, (vim.op.modulo(state, 4, 3)))");
    assert_eq!(expr("0x10 - 010"), "vim.op.subtract(state, 16, 8)");
}

#[test]
fn test_literals() {
    assert_eq!(expr("1.5"), "vim.float(1.5)");
    assert_eq!(expr(r#""a\tb\x41""#), r#""a\tbA""#);
    assert_eq!(expr("'it''s'"), r#""it's""#);
    assert_eq!(expr(r#""\e""#), r#""\027""#);
    assert_eq!(expr("[1, 'x']"), r#"vim.list.new(state, {1, "x"})"#);
    assert_eq!(expr("{'a': 1}"), r#"vim.dict.new(state, {"a", 1})"#);
    assert_eq!(expr("[]"), "vim.list.new(state, {})");
}

#[test]
fn test_numbers_past_double_precision_stay_exact() {
    assert_eq!(expr("9007199254740992"), "9007199254740992");
    assert_eq!(expr("9007199254740993"), r#"vim.number("9007199254740993")"#);
    assert_eq!(expr("0x7fffffffffffffff"), r#"vim.number("9223372036854775807")"#);
}

#[test]
fn test_negated_comparisons_use_the_positive_operator() {
    assert_eq!(
        expr("foo !=# bar"),
        r#"vim.op.negate(state, vim.op.equals(state, vim.var.get(state, state.g, "foo"), vim.var.get(state, state.g, "bar"), vim.MATCH_CASE))"#
    );
    assert_eq!(
        expr("foo isnot bar"),
        r#"vim.op.negate(state, vim.op.identical(state, vim.var.get(state, state.g, "foo"), vim.var.get(state, state.g, "bar"), vim.USE_OPTION))"#
    );
    assert_eq!(
        expr("foo !~? 'x'"),
        r#"vim.op.negate(state, vim.op.matches(state, vim.var.get(state, state.g, "foo"), "x", vim.IGNORE_CASE))"#
    );
}

#[test]
fn test_comparison_case_modes() {
    assert_eq!(expr("1 < 2"), "vim.op.less(state, 1, 2, vim.USE_OPTION)");
    assert_eq!(expr("1 >=# 2"), "vim.op.greater_or_equal(state, 1, 2, vim.MATCH_CASE)");
    assert_eq!(expr("1 ==? 2"), "vim.op.equals(state, 1, 2, vim.IGNORE_CASE)");
}

#[test]
fn test_logic_yields_numbers() {
    assert_eq!(
        expr("1 || 0"),
        "((vim.bool(state, 1) or vim.bool(state, 0)) and 1 or 0)"
    );
    assert_eq!(expr("!1"), "vim.op.logical_not(state, 1)");
    assert_eq!(
        expr("1 ? 2 : 3"),
        "(function() if vim.bool(state, 1) then return 2 end return 3 end)()"
    );
}

#[test]
fn test_scoped_variables_are_fixed_tables() {
    assert_eq!(expr("g:x"), r#"vim.var.get(state, state.g, "x")"#);
    assert_eq!(expr("s:x"), r#"vim.var.get(state, state.s, "x")"#);
    assert_eq!(expr("v:count"), r#"vim.var.get(state, state.v, "count")"#);
    assert_eq!(expr("b:x"), r#"vim.var.get(state, state.b, "x")"#);
    assert_eq!(expr("foo"), r#"vim.var.get(state, state.g, "foo")"#);
    assert_eq!(expr("foo#bar"), r#"vim.var.get(state, state.g, "foo#bar")"#);
}

#[test]
fn test_single_letter_names_resolve_at_run_time() {
    assert_eq!(
        expr("x"),
        r#"vim.var.get(state, vim.scope.resolve(state, nil, "x"))"#
    );
}

#[test]
fn test_function_scope_outside_function_reports() {
    assert_eq!(
        expr("l:x"),
        r#"vim.var.get(state, vim.err.report(state, "0:0:", "E461: Illegal variable name: l:x"), "x")"#
    );
}

#[test]
fn test_other_value_sources() {
    assert_eq!(expr("&tabstop"), r#"vim.option.get(state, "tabstop", nil)"#);
    assert_eq!(expr("&l:tabstop"), r#"vim.option.get(state, "tabstop", "local")"#);
    assert_eq!(expr("@a"), r#"vim.register.get(state, "a")"#);
    assert_eq!(expr("$HOME"), r#"vim.env.get(state, "HOME")"#);
    assert_eq!(expr("g:"), "state.g");
}

#[test]
fn test_subscripts() {
    assert_eq!(
        expr("foo[1]"),
        r#"vim.subscript.index(state, vim.var.get(state, state.g, "foo"), 1)"#
    );
    assert_eq!(
        expr("foo[1:]"),
        r#"vim.subscript.slice(state, vim.var.get(state, state.g, "foo"), 1, nil)"#
    );
    assert_eq!(
        expr("foo.bar"),
        r#"vim.subscript.concat_or_subscript(state, vim.var.get(state, state.g, "foo"), "bar", function() return vim.var.get(state, state.g, "bar") end)"#
    );
}

#[test]
fn test_calls() {
    assert_eq!(
        expr("len(foo)"),
        r#"vim.functions.len(state, vim.var.get(state, state.g, "foo"))"#
    );
    assert_eq!(expr("Foo(1, 2)"), r#"vim.call.named(state, nil, "Foo", 1, 2)"#);
    assert_eq!(expr("s:Foo()"), r#"vim.call.named(state, nil, "s:Foo")"#);
    assert_eq!(
        expr("foo.bar(1)"),
        r#"vim.call.method(state, vim.var.get(state, state.g, "foo"), "bar", 1)"#
    );
    assert_eq!(
        expr("foo[0](1)"),
        r#"vim.call.method(state, vim.var.get(state, state.g, "foo"), 0, 1)"#
    );
}

// Statements

#[test]
fn test_prologue() {
    let code = translate_script("", &TranslateOptions::default()).expect("empty script translates");
    assert_eq!(code, "local vim = require(\"vim\")\nlocal state = vim.state.new_script(...)\n");

    let options = TranslateOptions {
        runtime_module: "legacy.runtime".to_string(),
        ..TranslateOptions::default()
    };
    let code = translate_script("", &options).expect("empty script translates");
    assert!(code.starts_with("local vim = require(\"legacy.runtime\")\n"));
}

#[test]
fn test_position_comments() {
    let code = translate_script("let g:x = 1\n  echo g:x", &TranslateOptions::default()).expect("translates");
    assert!(code.contains("-- 1:1:let\n"));
    assert!(code.contains("-- 2:3:echo\n"));
    assert!(code.contains(r#"vim.commands.echo(state, "2:3:echo", "echo", vim.var.get(state, state.g, "x"))"#));
}

#[test]
fn test_simple_let() {
    assert_eq!(body("let g:x = 1"), "vim.var.set(state, 1, state.g, \"x\")\n");
    assert_eq!(body("let &tabstop = 4"), "vim.option.set(state, 4, \"tabstop\", nil)\n");
    assert_eq!(body("let $FOO = 'x'"), "vim.env.set(state, \"x\", \"FOO\")\n");
}

#[test]
fn test_compound_let() {
    assert_eq!(
        body("let g:s .= 'x'"),
        "do\n  local value_1 = \"x\"\n  vim.var.set(state, vim.let.compound(state, \".=\", vim.var.get(state, state.g, \"s\"), value_1), state.g, \"s\")\nend\n"
    );
}

#[test]
fn test_let_item_evaluates_index_once() {
    let code = body("let g:l[g:i] += 1");
    assert!(code.contains("local base_2 = vim.var.get(state, state.g, \"l\")"));
    assert!(code.contains("local index_3 = vim.var.get(state, state.g, \"i\")"));
    assert!(code.contains(
        "vim.subscript.assign(state, vim.let.compound(state, \"+=\", vim.subscript.index(state, base_2, index_3), value_1), base_2, index_3)"
    ));
}

#[test]
fn test_destructuring_checks_length_before_assigning() {
    let code = body("let [g:a, g:b] = g:pair");
    let is_list = index_of(&code, "if not vim.list.is_list(state, value_1) then");
    let too_few = index_of(&code, "if count_2 < 2 then vim.err.report(state, \"1:1:let\", \"E688: More targets than List items\") end");
    let too_many = index_of(&code, "if count_2 > 2 then vim.err.report(state, \"1:1:let\", \"E687: Less targets than List items\") end");
    let first = index_of(&code, "vim.var.set(state, vim.list.item(state, value_1, 0), state.g, \"a\")");
    let second = index_of(&code, "vim.var.set(state, vim.list.item(state, value_1, 1), state.g, \"b\")");
    assert!(is_list < too_few && too_few < too_many && too_many < first && first < second);
}

#[test]
fn test_destructuring_with_rest_only_checks_minimum() {
    let code = body("let [g:a; g:rest] = g:items");
    assert!(code.contains("if count_2 < 1 then"));
    assert!(!code.contains("E687"));
    assert!(code.contains("vim.var.set(state, vim.subscript.slice(state, value_1, 1, nil), state.g, \"rest\")"));
}

#[test]
fn test_heredoc_let() {
    assert_eq!(
        body("let g:text =<< END\none\ntwo\nEND"),
        "vim.var.set(state, vim.list.new(state, {\"one\", \"two\"}), state.g, \"text\")\n"
    );
}

#[test]
fn test_unlet() {
    assert_eq!(body("unlet! g:x"), "vim.var.unset(state, true, state.g, \"x\")\n");
    assert_eq!(
        body("unlet g:d['key']"),
        "vim.subscript.remove(state, false, vim.var.get(state, state.g, \"d\"), \"key\")\n"
    );
    assert_eq!(body("unlet $FOO"), "vim.env.unset(state, \"FOO\")\n");
}

#[test]
fn test_if_chain() {
    assert_eq!(
        body("if g:a\n  echo 1\nelseif g:b\n  echo 2\nelse\n  echo 3\nendif"),
        concat!(
            "if vim.bool(state, vim.var.get(state, state.g, \"a\")) then\n",
            "  vim.commands.echo(state, \"2:3:echo\", \"echo\", 1)\n",
            "elseif vim.bool(state, vim.var.get(state, state.g, \"b\")) then\n",
            "  vim.commands.echo(state, \"4:3:echo\", \"echo\", 2)\n",
            "else\n",
            "  vim.commands.echo(state, \"6:3:echo\", \"echo\", 3)\n",
            "end\n",
        )
    );
}

#[test]
fn test_while_with_continue() {
    assert_eq!(
        body("while g:i < 3\n  let g:i += 1\n  continue\nendwhile"),
        concat!(
            "while vim.bool(state, vim.op.less(state, vim.var.get(state, state.g, \"i\"), 3, vim.USE_OPTION)) do\n",
            "  do\n",
            "    do\n",
            "      local value_2 = 1\n",
            "      vim.var.set(state, vim.let.compound(state, \"+=\", vim.var.get(state, state.g, \"i\"), value_2), state.g, \"i\")\n",
            "    end\n",
            "    goto continue_1\n",
            "  end\n",
            "  ::continue_1::\n",
            "end\n",
        )
    );
}

#[test]
fn test_for_assigns_each_item() {
    assert_eq!(
        body("for g:item in [1, 2]\n  break\nendfor"),
        concat!(
            "for _, item_1 in vim.iter(state, vim.list.new(state, {1, 2})) do\n",
            "  do\n",
            "    vim.var.set(state, item_1, state.g, \"item\")\n",
            "    do break end\n",
            "  end\n",
            "  ::continue_1::\n",
            "end\n",
        )
    );
}

#[test]
fn test_for_with_list_target() {
    let code = body("for [g:k, g:v] in g:pairs\nendfor");
    assert!(code.contains("if not vim.list.is_list(state, item_1) then"));
    assert!(code.contains("vim.var.set(state, vim.list.item(state, item_1, 1), state.g, \"v\")"));
}

#[test]
fn test_break_outside_loop_is_rejected() {
    let err = translate_err("echo 1\nbreak");
    assert_eq!(err.legacy(), Some(LegacyError::BreakOutsideLoop));
    assert_eq!(err.to_string(), "2:1: E587: :break without :while or :for");

    let err = translate_err("if 1\n  continue\nendif");
    assert_eq!(err.legacy(), Some(LegacyError::ContinueOutsideLoop));
}

#[test]
fn test_function_body_resets_loop_context() {
    let err = translate_err("while 1\n  function! Inner()\n    break\n  endfunction\nendwhile");
    assert_eq!(err.legacy(), Some(LegacyError::BreakOutsideLoop));

    // A loop inside the function is fine.
    let code = body("function! Inner()\n  while 1\n    break\n  endwhile\nendfunction");
    assert!(code.contains("do break end"));
}

#[test]
fn test_parse_errors_pass_through() {
    let err = translate_err("if 1");
    assert_eq!(err.legacy(), Some(LegacyError::MissingEndIf));
}

#[test]
fn test_function_definition() {
    assert_eq!(
        body("function! Add(a, b) abort\n  return a:a + a:b\nendfunction"),
        concat!(
            "vim.user.define(state, \"1:1:function\", \"Add\", true, {range = false, abort = true, dict = false, closure = false}, {\"a\", \"b\"}, false, function(state, self, ...)\n",
            "  if select(\"#\", ...) < 2 then return vim.err.report(state, \"1:1:function\", \"E119: Not enough arguments for function: Add\") end\n",
            "  if select(\"#\", ...) > 2 then return vim.err.report(state, \"1:1:function\", \"E118: Too many arguments for function: Add\") end\n",
            "  local fstate = vim.state.new_function(state, self, nil, {\"a\", \"b\"}, false, ...)\n",
            "  local ok, flow, value = pcall(function()\n",
            "    do return 3, vim.op.add(state, vim.var.get(state, fstate.a, \"a\"), vim.var.get(state, fstate.a, \"b\")) end\n",
            "  end)\n",
            "  if not ok then return vim.err.abort(state, flow) end\n",
            "  if flow == 3 then return value end\n",
            "  return 0\n",
            "end)\n",
        )
    );
}

#[test]
fn test_function_without_abort_resumes_after_errors() {
    let code = body("function! F()\n  let g:x = 1\n  silent! echo 2\n  return 1\nendfunction");
    assert!(code.contains(concat!(
        "  vim.err.resume(state, pcall(function()\n",
        "    vim.var.set(state, 1, state.g, \"x\")\n",
        "  end))\n",
    )));
    assert!(code.contains(concat!(
        "  vim.err.resume(state, pcall(function()\n",
        "    vim.commands.modifiers(state, {\"silent!\"}, function()\n",
    )));
    // `:return` leaves the function directly.
    assert!(code.contains("\n  do return 1 end\n"));

    // Inside `:try` the error goes to the try instead.
    let code = body("function! F()\n  try\n    let g:x = 1\n  endtry\nendfunction");
    assert!(!code.contains("vim.err.resume"));

    // Outside functions errors always propagate.
    assert_eq!(body("let g:x = 1"), "vim.var.set(state, 1, state.g, \"x\")\n");
}

#[test]
fn test_varargs_function_has_no_upper_bound() {
    let code = body("function s:Log(fmt, ...)\n  let msg = a:fmt\nendfunction");
    assert!(code.contains("\"s:Log\", false"));
    assert!(code.contains("if select(\"#\", ...) < 1 then"));
    assert!(!code.contains("E118"));
    assert!(code.contains("{\"fmt\"}, true, ...)"));
    // Unscoped names inside a function are local.
    assert!(code.contains("vim.var.set(state, vim.var.get(state, fstate.a, \"fmt\"), fstate.l, \"msg\")"));
}

#[test]
fn test_closure_captures_outer_function_state() {
    let code = body("function Outer()\n  function Inner() closure\n  endfunction\nendfunction");
    assert!(code.contains("local fstate = vim.state.new_function(state, self, fstate, {}, false, ...)"));
    assert!(code.contains("local fstate = vim.state.new_function(state, self, nil, {}, false, ...)"));
}

#[test]
fn test_dictionary_function_is_assigned() {
    let code = body("function g:obj.method() dict\n  return self\nendfunction");
    assert!(code.contains("local funcref_1 = vim.user.define(state, \"1:1:function\", nil, false, {range = false, abort = false, dict = true, closure = false}"));
    assert!(code.contains("local base_2 = vim.var.get(state, state.g, \"obj\")"));
    assert!(code.contains("vim.subscript.assign(state, funcref_1, base_2, \"method\")"));
}

#[test]
fn test_return_outside_function_reports_at_run_time() {
    assert_eq!(
        body("return 1"),
        "vim.err.report(state, \"1:1:return\", \"E133: :return not inside a function\")\n"
    );
}

#[test]
fn test_try_catch_finally() {
    let code = body("try\n  throw 'oops'\ncatch /^oo/\n  echo v:exception\nfinally\n  echo 'done'\nendtry");
    assert!(code.contains("local ok_1, flow_1, value_1 = pcall(function()"));
    assert!(code.contains("vim.err.throw(state, \"2:3:throw\", \"oops\")"));
    assert!(code.contains("if pending_1 ~= nil and vim.err.matches(state, pending_1, \"^oo\") then"));
    assert!(code.contains("vim.err.begin_catch(state, caught_2)"));
    assert!(code.contains("vim.err.end_catch(state)"));
    assert!(code.contains("local ok_3, flow_3, value_3 = pcall(function()"));
    let finally_error = index_of(&code, "pending_1 = vim.err.exception(state, flow_3)");
    let rethrow = index_of(&code, "if pending_1 ~= nil then vim.err.rethrow(state, pending_1) end");
    assert!(finally_error < rethrow);
    // No loop or function around: nothing to dispatch.
    assert!(!code.contains("flow_1 == "));
}

#[test]
fn test_catch_without_pattern_catches_everything() {
    let code = body("try\n  echo 1\ncatch\nendtry");
    assert!(code.contains("if pending_1 ~= nil and vim.err.matches(state, pending_1, nil) then"));
}

#[test]
fn test_loop_control_leaves_try_through_status_codes() {
    let code = body("while 1\n  try\n    break\n  finally\n    continue\n  endtry\nendwhile");
    assert!(code.contains("do return 1 end"));
    assert!(code.contains("do return 2 end"));
    assert!(code.contains("if flow_2 == 1 then break end"));
    assert!(code.contains("if flow_2 == 2 then goto continue_1 end"));
    assert!(!code.contains("flow_2 == 3"));
}

#[test]
fn test_return_inside_try_in_function() {
    let code = body("function F()\n  try\n    return 1\n  endtry\nendfunction");
    assert!(code.contains("do return 3, 1 end"));
    assert!(code.contains("if flow_1 == 3 then return value_1 end"));
}

#[test]
fn test_nested_try_propagates_status() {
    let code = body("while 1\n  try\n    try\n      break\n    endtry\n  endtry\nendwhile");
    // The inner try runs inside the outer closure.
    assert!(code.contains("if flow_3 == 1 then return 1 end"));
    assert!(code.contains("if flow_2 == 1 then break end"));
}

#[test]
fn test_call_and_ranges() {
    assert_eq!(body("call Foo(1)"), "vim.call.named(state, nil, \"Foo\", 1)\n");
    assert_eq!(
        body("1,$call Foo()"),
        "vim.call.range(state, {{\"line\", 1, 0}, {\"last\", 0, 0}}, function() return vim.call.named(state, nil, \"Foo\") end)\n"
    );
}

#[test]
fn test_generic_command() {
    let code = body("%s/a/b/g");
    assert!(code.starts_with("vim.commands.run(state, \""));
    assert!(code.ends_with(":s\", \"s\", false, {{\"line\", 1, 0}, {\"last\", 0, 0}}, \"/a/b/g\")\n"));
    assert_eq!(
        body("normal! x"),
        "vim.commands.run(state, \"1:1:normal\", \"normal\", true, nil, \"x\")\n"
    );
}

#[test]
fn test_modifiers_wrap_simple_commands() {
    let code = body("silent! call Foo()");
    assert!(code.starts_with("vim.commands.modifiers(state, {\"silent!\"}, function()\n"));
    assert!(code.contains("  vim.call.named(state, nil, \"Foo\")\n"));
    assert!(code.ends_with("end)\n"));
}

#[test]
fn test_echo_and_execute() {
    assert_eq!(
        body("echomsg 'a' 'b'"),
        "vim.commands.echo(state, \"1:1:echomsg\", \"echomsg\", \"a\", \"b\")\n"
    );
    assert_eq!(
        body("execute 'normal' 'x'"),
        "vim.commands.execute(state, \"1:1:execute\", \"normal\", \"x\")\n"
    );
    assert_eq!(body("throw 'x'"), "vim.err.throw(state, \"1:1:throw\", \"x\")\n");
}

#[test]
fn test_delfunction() {
    assert_eq!(body("delfunction! s:Foo"), "vim.user.delete(state, \"1:1:delfunction\", \"s:Foo\", true)\n");
}

#[test]
fn test_options_deserialize_with_defaults() {
    let options: TranslateOptions = toml::from_str("indent = 4").expect("valid options");
    assert_eq!(options.indent, 4);
    assert_eq!(options.runtime_module, "vim");
    assert!(options.emit_positions);

    assert!(toml::from_str::<TranslateOptions>("indnet = 4").is_err());
}
