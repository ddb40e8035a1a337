//! Arguments of the commands the parser knows.

use viml_ir::{
    AssignOp, AssignTarget, CommandKind, EchoKind, ExprKind, Expression, FunctionAttributes, FunctionDef,
    FunctionName, LetValue, Scope,
};
use viml_value::LegacyError;

use super::header::{Header, matches_abbreviation, parse_header};
use super::{Item, Marker};
use crate::error::{ParseError, ParseResult};
use crate::expr::{parse_expression, parse_lvalue};
use crate::lines::{Line, LineReader};

/// Block commands, before their bodies are read.
pub(crate) enum Opening {
    If(Expression),
    While(Expression),
    For { target: AssignTarget, iterable: Expression },
    Function(FunctionDef),
    Try,
}

/// One command parsed from a line.
pub(crate) struct Parsed {
    pub item: Option<Item>,
    /// Offset of the next command on the same line, after a `|`.
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Known {
    Let,
    Unlet,
    If,
    ElseIf,
    Else,
    EndIf,
    While,
    EndWhile,
    For,
    EndFor,
    Break,
    Continue,
    Function,
    EndFunction,
    Return,
    DelFunction,
    Try,
    Catch,
    Finally,
    EndTry,
    Throw,
    Call,
    Echo(EchoKind),
    Execute,
}

/// Full name, shortest abbreviation, command.
const COMMANDS: &[(&str, usize, Known)] = &[
    ("let", 3, Known::Let),
    ("unlet", 3, Known::Unlet),
    ("if", 2, Known::If),
    ("elseif", 5, Known::ElseIf),
    ("else", 2, Known::Else),
    ("endif", 2, Known::EndIf),
    ("while", 2, Known::While),
    ("endwhile", 4, Known::EndWhile),
    ("for", 3, Known::For),
    ("endfor", 5, Known::EndFor),
    ("break", 4, Known::Break),
    ("continue", 3, Known::Continue),
    ("function", 2, Known::Function),
    ("endfunction", 4, Known::EndFunction),
    ("return", 4, Known::Return),
    ("delfunction", 4, Known::DelFunction),
    ("try", 3, Known::Try),
    ("catch", 3, Known::Catch),
    ("finally", 4, Known::Finally),
    ("endtry", 4, Known::EndTry),
    ("throw", 2, Known::Throw),
    ("call", 3, Known::Call),
    ("echo", 2, Known::Echo(EchoKind::Echo)),
    ("echon", 5, Known::Echo(EchoKind::Echon)),
    ("echomsg", 5, Known::Echo(EchoKind::Echomsg)),
    ("echoerr", 5, Known::Echo(EchoKind::Echoerr)),
    ("execute", 3, Known::Execute),
];

/// Commands that take `|` as part of their argument.
const BAR_IN_ARGUMENT: &[(&str, usize)] = &[
    ("argdo", 5),
    ("autocmd", 2),
    ("bufdo", 5),
    ("cdo", 3),
    ("cfdo", 4),
    ("command", 3),
    ("debug", 3),
    ("folddoclosed", 7),
    ("folddoopen", 5),
    ("global", 1),
    ("help", 1),
    ("ldo", 3),
    ("lfdo", 4),
    ("lua", 3),
    ("make", 3),
    ("normal", 4),
    ("perl", 2),
    ("python", 2),
    ("ruby", 3),
    ("sign", 3),
    ("tabdo", 4),
    ("tcl", 2),
    ("vglobal", 1),
    ("windo", 5),
];

fn lookup(name: &str) -> Option<Known> {
    COMMANDS
        .iter()
        .find(|&&(full, min, _)| matches_abbreviation(name, full, min))
        .map(|&(_, _, known)| known)
}

/// Full name of a command, for diagnostics and the runtime.
pub(crate) fn full_name(name: &str) -> &str {
    COMMANDS
        .iter()
        .find(|&&(full, min, _)| matches_abbreviation(name, full, min))
        .map_or(name, |&(full, _, _)| full)
}

struct Args<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Args<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn starts_with(&self, token: &str) -> bool {
        self.text[self.pos..].starts_with(token)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_white(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// End of the command: end of line, `|` or a trailing comment.
    fn at_command_end(&self) -> bool {
        matches!(self.peek(), None | Some(b'|' | b'"'))
    }

    /// Where an expression argument could start, `"` opens a string.
    fn at_expression_end(&self) -> bool {
        matches!(self.peek(), None | Some(b'|'))
    }

    fn error(&self, error: LegacyError, detail: impl Into<String>) -> ParseError {
        ParseError::new(error, detail, self.pos)
    }

    fn expression(&mut self) -> ParseResult<Expression> {
        parse_expression(self.text, &mut self.pos)
    }

    fn required_expression(&mut self) -> ParseResult<Expression> {
        self.skip_white();
        if matches!(self.peek(), None | Some(b'|')) {
            return Err(self.error(LegacyError::InvalidExpression, ""));
        }
        self.expression()
    }

    fn lvalue(&mut self) -> ParseResult<Expression> {
        parse_lvalue(self.text, &mut self.pos)
    }

    fn word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Check that nothing but a comment or `|` follows; returns where the
    /// next command starts.
    fn finish(&mut self) -> ParseResult<Option<usize>> {
        self.skip_white();
        match self.peek() {
            None | Some(b'"') => Ok(None),
            Some(b'|') => Ok(Some(self.pos + 1)),
            _ => Err(self.error(LegacyError::TrailingCharacters, self.rest())),
        }
    }
}

pub(crate) fn parse_command<F>(line: &Line, start: usize, reader: &mut LineReader<F>) -> ParseResult<Parsed>
where
    F: FnMut() -> Option<String>,
{
    let text = line.text.as_str();
    let Some(header) = parse_header(text, start, line.number)? else {
        return Ok(Parsed {
            item: None,
            next: None,
        });
    };
    let mut args = Args {
        text,
        pos: header.args_start,
    };
    args.skip_white();

    let Some(known) = lookup(&header.name) else {
        return Ok(generic(header, args));
    };

    let item = match known {
        Known::Let => {
            // Without `=` the command lists variables.
            let listing = args.rest().split('|').next().is_none_or(|command| !command.contains('='));
            if args.at_command_end() || listing {
                return Ok(generic(header, args));
            }
            return parse_let(header, args, reader);
        }
        Known::Unlet => {
            let mut targets = Vec::new();
            while !args.at_command_end() {
                let target = args.lvalue()?;
                if !matches!(
                    target.root.kind,
                    ExprKind::Variable { .. }
                        | ExprKind::CurlyName { .. }
                        | ExprKind::Subscript { .. }
                        | ExprKind::Slice { .. }
                        | ExprKind::ConcatOrSubscript { .. }
                        | ExprKind::EnvironmentVariable(_)
                ) {
                    return Err(ParseError::new(
                        LegacyError::IllegalVariableName,
                        target.root_text(),
                        target.column,
                    ));
                }
                targets.push(target);
                args.skip_white();
            }
            if targets.is_empty() {
                return Err(args.error(LegacyError::ArgumentRequired, ""));
            }
            Item::Command(header.into_node(CommandKind::Unlet { targets }))
        }
        Known::If => Item::Open(Opening::If(args.required_expression()?), header),
        Known::ElseIf => Item::Marker(Marker::ElseIf(args.required_expression()?), header),
        Known::While => Item::Open(Opening::While(args.required_expression()?), header),
        Known::For => {
            let target = parse_target(&mut args)?;
            args.skip_white();
            let has_in = args.starts_with("in") && matches!(args.text.as_bytes().get(args.pos + 2), Some(b' ' | b'\t'));
            if !has_in {
                return Err(args.error(LegacyError::MissingIn, ""));
            }
            args.pos += 2;
            let iterable = args.required_expression()?;
            Item::Open(Opening::For { target, iterable }, header)
        }
        Known::Else => Item::Marker(Marker::Else, header),
        Known::EndIf => Item::Marker(Marker::EndIf, header),
        Known::EndWhile => Item::Marker(Marker::EndWhile, header),
        Known::EndFor => Item::Marker(Marker::EndFor, header),
        Known::EndFunction => Item::Marker(Marker::EndFunction, header),
        Known::Try => Item::Open(Opening::Try, header),
        Known::Finally => Item::Marker(Marker::Finally, header),
        Known::EndTry => Item::Marker(Marker::EndTry, header),
        Known::Catch => Item::Marker(Marker::Catch(parse_catch_pattern(&mut args)), header),
        Known::Break => Item::Command(header.into_node(CommandKind::Break)),
        Known::Continue => Item::Command(header.into_node(CommandKind::Continue)),
        Known::Function => {
            if args.at_command_end() || args.peek() == Some(b'/') || !args.rest().contains('(') {
                // Without a parameter list `:function` lists definitions.
                return Ok(generic(header, args));
            }
            Item::Open(Opening::Function(parse_function_header(&mut args)?), header)
        }
        Known::Return => {
            let value = if args.at_expression_end() {
                None
            } else {
                Some(args.expression()?)
            };
            Item::Command(header.into_node(CommandKind::Return { value }))
        }
        Known::DelFunction => {
            let start = args.pos;
            while args.peek().is_some_and(|b| !matches!(b, b' ' | b'\t' | b'|' | b'"')) {
                args.pos += 1;
            }
            if args.pos == start {
                return Err(args.error(LegacyError::FunctionNameRequired, ""));
            }
            let name = parse_function_name(&text[..args.pos], start)?;
            Item::Command(header.into_node(CommandKind::DelFunction { name }))
        }
        Known::Throw => {
            if args.at_expression_end() {
                return Err(args.error(LegacyError::ArgumentRequired, ""));
            }
            let value = args.expression()?;
            Item::Command(header.into_node(CommandKind::Throw { value }))
        }
        Known::Call => {
            if args.at_expression_end() {
                return Err(args.error(LegacyError::ArgumentRequired, ""));
            }
            let call = args.expression()?;
            if !matches!(call.root.kind, ExprKind::Call { .. }) {
                return Err(ParseError::new(
                    LegacyError::FunctionNameRequired,
                    "",
                    call.column,
                ));
            }
            Item::Command(header.into_node(CommandKind::Call { call }))
        }
        Known::Echo(kind) => {
            let exprs = parse_expression_list(&mut args)?;
            Item::Command(header.into_node(CommandKind::Echo { kind, args: exprs }))
        }
        Known::Execute => {
            let exprs = parse_expression_list(&mut args)?;
            Item::Command(header.into_node(CommandKind::Execute { args: exprs }))
        }
    };
    Ok(Parsed {
        item: Some(item),
        next: args.finish()?,
    })
}

fn parse_expression_list(args: &mut Args<'_>) -> ParseResult<Vec<Expression>> {
    let mut exprs = Vec::new();
    loop {
        args.skip_white();
        if matches!(args.peek(), None | Some(b'|')) {
            return Ok(exprs);
        }
        exprs.push(args.expression()?);
    }
}

/// A command this parser does not look into; its argument runs to the next
/// unescaped `|`, or to the end of the line for commands that take `|`
/// themselves.
fn generic(header: Header, mut args: Args<'_>) -> Parsed {
    let name = full_name(&header.name).to_string();
    let takes_bar = header.name == "!"
        || BAR_IN_ARGUMENT
            .iter()
            .any(|&(full, min)| matches_abbreviation(&header.name, full, min));
    let start = args.pos;
    let bytes = args.text.as_bytes();
    let mut next = None;
    if !takes_bar {
        while let Some(&byte) = bytes.get(args.pos) {
            if byte == b'\\' && bytes.get(args.pos + 1) == Some(&b'|') {
                args.pos += 2;
                continue;
            }
            if byte == b'|' {
                next = Some(args.pos + 1);
                break;
            }
            args.pos += 1;
        }
    } else {
        args.pos = args.text.len();
    }
    let raw = args.text[start..args.pos].trim_end().to_string();
    Parsed {
        item: Some(Item::Command(header.into_node(CommandKind::Generic { name, args: raw }))),
        next,
    }
}

/// Single target or `[a, b; rest]`.
fn parse_target(args: &mut Args<'_>) -> ParseResult<AssignTarget> {
    if !args.eat(b'[') {
        return Ok(AssignTarget::Single(args.lvalue()?));
    }
    let mut targets = Vec::new();
    let mut rest = None;
    loop {
        args.skip_white();
        if args.eat(b';') {
            args.skip_white();
            rest = Some(args.lvalue()?);
            args.skip_white();
            if !args.eat(b']') {
                return Err(args.error(LegacyError::InvalidArgument, args.rest()));
            }
            break;
        }
        targets.push(args.lvalue()?);
        args.skip_white();
        if args.eat(b',') || args.peek() == Some(b';') {
            continue;
        }
        if args.eat(b']') {
            break;
        }
        return Err(args.error(LegacyError::InvalidArgument, args.rest()));
    }
    if targets.is_empty() {
        return Err(args.error(LegacyError::InvalidArgument, args.rest()));
    }
    Ok(AssignTarget::Unpack { targets, rest })
}

fn parse_let<F>(header: Header, mut args: Args<'_>, reader: &mut LineReader<F>) -> ParseResult<Parsed>
where
    F: FnMut() -> Option<String>,
{
    let target_start = args.pos;
    let target = parse_target(&mut args)?;
    args.skip_white();

    if args.starts_with("=<<") {
        args.pos += 3;
        args.skip_white();
        let mut trim = false;
        let word_start = args.pos;
        if args.word() == "trim" {
            trim = true;
            args.skip_white();
        } else {
            args.pos = word_start;
        }
        let marker = args.rest().trim_end();
        if marker.is_empty() {
            return Err(args.error(LegacyError::MissingMarker, ""));
        }
        let lines = read_heredoc(reader, marker, trim).ok_or_else(|| args.error(LegacyError::MissingEndMarker, marker))?;
        let node = header.into_node(CommandKind::Let {
            target,
            op: AssignOp::Assign,
            value: LetValue::Heredoc(lines),
        });
        // The heredoc takes the rest of the line.
        return Ok(Parsed {
            item: Some(Item::Command(node)),
            next: None,
        });
    }

    let ops = [
        ("..=", AssignOp::Concat),
        (".=", AssignOp::Concat),
        ("+=", AssignOp::Add),
        ("-=", AssignOp::Subtract),
    ];
    let op = match ops.iter().find(|(token, _)| args.starts_with(token)) {
        Some((token, op)) => {
            args.pos += token.len();
            *op
        }
        None if args.starts_with("=") && !args.starts_with("==") => {
            args.pos += 1;
            AssignOp::Assign
        }
        None if args.at_command_end() => {
            // `:let name` shows the variable.
            args.pos = target_start;
            return Ok(generic(header, args));
        }
        None => return Err(args.error(LegacyError::TrailingCharacters, args.rest())),
    };
    let value = args.required_expression()?;
    let node = header.into_node(CommandKind::Let {
        target,
        op,
        value: LetValue::Expr(value),
    });
    Ok(Parsed {
        item: Some(Item::Command(node)),
        next: args.finish()?,
    })
}

/// Lines up to `marker`; `None` when the input ends first. With `trim` the
/// marker may be indented and the indent of the first line is removed from
/// every line.
fn read_heredoc<F>(reader: &mut LineReader<F>, marker: &str, trim: bool) -> Option<Vec<String>>
where
    F: FnMut() -> Option<String>,
{
    let mut lines = Vec::new();
    let mut indent = None;
    loop {
        let text = reader.next_raw()?.text;
        let candidate = if trim {
            text.trim_start_matches([' ', '\t'])
        } else {
            text.as_str()
        };
        if candidate == marker {
            return Some(lines);
        }
        if trim {
            let leading = text.len() - candidate.len();
            let strip = leading.min(*indent.get_or_insert(leading));
            lines.push(text[strip..].to_string());
        } else {
            lines.push(text);
        }
    }
}

/// `:catch /pattern/`; any non-alphanumeric character delimits.
fn parse_catch_pattern(args: &mut Args<'_>) -> Option<String> {
    if args.at_command_end() {
        return None;
    }
    let delimiter = args.rest().chars().next()?;
    if delimiter.is_ascii_alphanumeric() {
        let pattern = args.rest().trim_end().to_string();
        args.pos = args.text.len();
        return Some(pattern);
    }
    args.pos += delimiter.len_utf8();
    let start = args.pos;
    let mut escaped = false;
    for (offset, c) in args.text[start..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            let end = start + offset;
            args.pos = end + c.len_utf8();
            return Some(args.text[start..end].to_string());
        }
    }
    args.pos = args.text.len();
    Some(args.text[start..].to_string())
}

/// `Name(a, b, ...) range abort dict closure`, cursor on the name.
fn parse_function_header(args: &mut Args<'_>) -> ParseResult<FunctionDef> {
    let name_start = args.pos;
    let paren = name_start + args.rest().find('(').unwrap_or_default();
    let name_end = name_start + args.text[name_start..paren].trim_end().len();
    if name_end == name_start {
        return Err(args.error(LegacyError::FunctionNameRequired, ""));
    }
    let name = parse_function_name(&args.text[..name_end], name_start)?;

    args.pos = paren + 1;
    let mut params: Vec<String> = Vec::new();
    let mut varargs = false;
    loop {
        args.skip_white();
        if args.eat(b')') {
            break;
        }
        if args.starts_with("...") {
            args.pos += 3;
            varargs = true;
            args.skip_white();
            if !args.eat(b')') {
                return Err(args.error(LegacyError::InvalidArgument, args.rest()));
            }
            break;
        }
        let param_start = args.pos;
        let param = args.word();
        let valid = param
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
        if !valid || param == "firstline" || param == "lastline" {
            args.pos = param_start;
            return Err(args.error(LegacyError::IllegalArgument, args.rest()));
        }
        if params.iter().any(|existing| existing == param) {
            return Err(ParseError::new(LegacyError::DuplicateArgument, param, param_start));
        }
        params.push(param.to_string());
        args.skip_white();
        if args.eat(b',') {
            continue;
        }
        if args.eat(b')') {
            break;
        }
        return Err(args.error(LegacyError::IllegalArgument, args.rest()));
    }

    let mut attributes = FunctionAttributes::default();
    loop {
        args.skip_white();
        if args.at_command_end() {
            break;
        }
        let attribute_start = args.pos;
        match args.word() {
            "range" => attributes.range = true,
            "abort" => attributes.abort = true,
            "dict" => attributes.dict = true,
            "closure" => attributes.closure = true,
            _ => {
                args.pos = attribute_start;
                return Err(args.error(LegacyError::TrailingCharacters, args.rest()));
            }
        }
    }
    Ok(FunctionDef {
        name,
        params,
        varargs,
        attributes,
        body: Vec::new(),
    })
}

/// Function name in `buffer[start..]`, which ends where the name ends.
fn parse_function_name(buffer: &str, start: usize) -> ParseResult<FunctionName> {
    let text = &buffer[start..];
    if text.contains(['.', '[']) && !text.starts_with('<') {
        let mut cursor = start;
        let target = parse_lvalue(buffer, &mut cursor)?;
        if cursor != buffer.len()
            || !matches!(
                target.root.kind,
                ExprKind::ConcatOrSubscript { .. } | ExprKind::Subscript { .. }
            )
        {
            return Err(ParseError::new(LegacyError::InvalidArgument, text, start));
        }
        return Ok(FunctionName::Member(target));
    }

    let (scope, name) = if text.len() >= 5 && text[..5].eq_ignore_ascii_case("<SID>") {
        (Some(Scope::Script), &text[5..])
    } else if let Some(name) = text.strip_prefix("s:") {
        (Some(Scope::Script), name)
    } else if let Some(name) = text.strip_prefix("g:") {
        (Some(Scope::Global), name)
    } else {
        (None, text)
    };
    let well_formed = name
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'#');
    if !well_formed {
        return Err(ParseError::new(LegacyError::InvalidArgument, text, start));
    }
    let needs_capital = scope != Some(Scope::Script) && !name.contains('#');
    if needs_capital && !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err(ParseError::new(LegacyError::FunctionNameCapital, text, start));
    }
    Ok(FunctionName::Named {
        scope,
        name: name.to_string(),
    })
}
