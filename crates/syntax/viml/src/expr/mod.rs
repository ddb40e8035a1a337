//! Expression parser.
//!
//! Precedence climbing over the legacy grammar, lowest level first:
//!
//! ```text
//! expr1  cond ? a : b
//! expr2  a || b
//! expr3  a && b
//! expr4  a == b, a is b, a =~ b, ...   (one comparison, never chained)
//! expr5  a + b, a - b, a . b
//! expr6  a * b, a / b, a % b
//! expr7  !a, -a, +a, then a primary with its postfix chain
//! ```

mod literal;
mod primary;

use std::collections::HashMap;

use viml_ir::{CaseCompare, CompareOp, ExprKind, ExprNode, Expression, Span};
use viml_value::LegacyError;

use crate::error::{ParseError, ParseResult};

/// Most arguments a function call may take.
pub const MAX_CALL_ARGS: usize = 20;

/// Parse one expression starting at `*cursor` in `buffer`.
///
/// On success the cursor is left on the first byte after the expression
/// (trailing blanks consumed). The returned [`Expression`] owns a copy of the
/// consumed text and its spans point into that copy. On failure the cursor
/// is not moved and the error position is an offset into `buffer`.
pub fn parse_expression(buffer: &str, cursor: &mut usize) -> ParseResult<Expression> {
    let start = *cursor;
    let Some(text) = buffer.get(start..) else {
        return Err(ParseError::new(LegacyError::InvalidExpression, "", start));
    };
    let mut parser = ExprParser::new(text);
    let root = parser.parse_expr1().map_err(|err| err.shifted(start))?;
    let consumed = parser.pos;
    parser.skip_white();
    *cursor = start + parser.pos;
    Ok(Expression {
        source: text[..consumed].to_string(),
        column: start,
        root,
    })
}

/// Parse an assignment target (a name, subscript, option, register or
/// environment variable) starting at `*cursor`.
pub(crate) fn parse_lvalue(buffer: &str, cursor: &mut usize) -> ParseResult<Expression> {
    let start = *cursor;
    let Some(text) = buffer.get(start..) else {
        return Err(ParseError::new(LegacyError::InvalidExpression, "", start));
    };
    let mut parser = ExprParser::new(text);
    let root = parser.parse_primary(false).map_err(|err| err.shifted(start))?;
    let consumed = parser.pos;
    if !root.is_assignable() {
        return Err(ParseError::new(
            LegacyError::IllegalVariableName,
            &text[..consumed],
            start,
        ));
    }
    *cursor = start + consumed;
    Ok(Expression {
        source: text[..consumed].to_string(),
        column: start,
        root,
    })
}

/// Parse `text` as a single expression; anything left over is an error.
pub fn parse_expression_str(text: &str) -> ParseResult<Expression> {
    let mut cursor = 0;
    let expression = parse_expression(text, &mut cursor)?;
    if cursor < text.len() {
        return Err(ParseError::new(
            LegacyError::TrailingCharacters,
            &text[cursor..],
            cursor,
        ));
    }
    Ok(expression)
}

pub(crate) struct ExprParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Whether the `{` at an offset opens a curly-brace name, once known.
    braces: HashMap<usize, bool>,
}

impl<'a> ExprParser<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            braces: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn starts_with(&self, token: &str) -> bool {
        self.bytes[self.pos..].starts_with(token.as_bytes())
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

    /// Text from the cursor to the end, as legacy messages quote it.
    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or_default()
    }

    fn error(&self, error: LegacyError, detail: impl Into<String>) -> ParseError {
        ParseError::new(error, detail, self.pos)
    }

    fn error_here(&self, error: LegacyError) -> ParseError {
        self.error(error, self.rest())
    }

    fn node(&self, kind: ExprKind, start: usize) -> ExprNode {
        ExprNode::new(kind, Span::new(start, self.pos))
    }

    /// Ternary.
    pub(crate) fn parse_expr1(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let condition = self.parse_expr2()?;
        let end = self.pos;
        self.skip_white();
        if !self.eat(b'?') {
            self.pos = end;
            return Ok(condition);
        }
        self.skip_white();
        let if_true = self.parse_expr1()?;
        self.skip_white();
        if !self.eat(b':') {
            return Err(self.error(LegacyError::MissingColonAfterQuestion, ""));
        }
        self.skip_white();
        let if_false = self.parse_expr1()?;
        Ok(self.node(
            ExprKind::Ternary {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            start,
        ))
    }

    /// `||`
    fn parse_expr2(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let mut lhs = self.parse_expr3()?;
        loop {
            let end = self.pos;
            self.skip_white();
            if !self.starts_with("||") {
                self.pos = end;
                return Ok(lhs);
            }
            self.pos += 2;
            self.skip_white();
            let rhs = self.parse_expr3()?;
            lhs = self.node(ExprKind::LogicalOr(Box::new(lhs), Box::new(rhs)), start);
        }
    }

    /// `&&`
    fn parse_expr3(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let mut lhs = self.parse_expr4()?;
        loop {
            let end = self.pos;
            self.skip_white();
            if !self.starts_with("&&") {
                self.pos = end;
                return Ok(lhs);
            }
            self.pos += 2;
            self.skip_white();
            let rhs = self.parse_expr4()?;
            lhs = self.node(ExprKind::LogicalAnd(Box::new(lhs), Box::new(rhs)), start);
        }
    }

    /// Comparison. Not associative: `a == b == c` stops after `a == b`.
    fn parse_expr4(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let lhs = self.parse_expr5(false)?;
        let end = self.pos;
        self.skip_white();
        let Some((op, len)) = self.comparison_operator() else {
            self.pos = end;
            return Ok(lhs);
        };
        self.pos += len;
        let case = match self.peek() {
            Some(b'#') => {
                self.pos += 1;
                CaseCompare::MatchCase
            }
            Some(b'?') => {
                self.pos += 1;
                CaseCompare::IgnoreCase
            }
            _ => CaseCompare::UseOption,
        };
        self.skip_white();
        let rhs = self.parse_expr5(false)?;
        Ok(self.node(
            ExprKind::Compare {
                op,
                case,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            start,
        ))
    }

    fn comparison_operator(&self) -> Option<(CompareOp, usize)> {
        let op = match (self.peek()?, self.peek_at(1)) {
            (b'=', Some(b'=')) => (CompareOp::Equals, 2),
            (b'=', Some(b'~')) => (CompareOp::Matches, 2),
            (b'!', Some(b'=')) => (CompareOp::NotEquals, 2),
            (b'!', Some(b'~')) => (CompareOp::NotMatches, 2),
            (b'>', Some(b'=')) => (CompareOp::GreaterOrEqual, 2),
            (b'>', _) => (CompareOp::Greater, 1),
            (b'<', Some(b'=')) => (CompareOp::LessOrEqual, 2),
            (b'<', _) => (CompareOp::Less, 1),
            (b'i', Some(b's')) => {
                // `is` and `isnot` are operators only when a name does not
                // continue after them.
                let op = if self.starts_with("isnot") {
                    (CompareOp::NotIdentical, 5)
                } else {
                    (CompareOp::Identical, 2)
                };
                if self
                    .peek_at(op.1)
                    .is_some_and(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
                {
                    return None;
                }
                op
            }
            _ => return None,
        };
        Some(op)
    }

    /// `+`, `-` and `.`; after `.` the right operand never starts with a
    /// Float.
    fn parse_expr5(&mut self, want_string: bool) -> ParseResult<ExprNode> {
        let start = self.pos;
        let mut lhs = self.parse_expr6(want_string)?;
        loop {
            let end = self.pos;
            self.skip_white();
            let (len, concat) = match self.peek() {
                Some(b'+') => (1, false),
                Some(b'-') => (1, false),
                Some(b'.') if self.peek_at(1) == Some(b'.') => (2, true),
                Some(b'.') => (1, true),
                _ => {
                    self.pos = end;
                    return Ok(lhs);
                }
            };
            let op = self.bytes[self.pos];
            self.pos += len;
            self.skip_white();
            let rhs = Box::new(self.parse_expr6(concat)?);
            let lhs_box = Box::new(lhs);
            let kind = match op {
                b'+' => ExprKind::Add(lhs_box, rhs),
                b'-' => ExprKind::Subtract(lhs_box, rhs),
                _ => ExprKind::Concat(lhs_box, rhs),
            };
            lhs = self.node(kind, start);
        }
    }

    /// `*`, `/` and `%`.
    fn parse_expr6(&mut self, want_string: bool) -> ParseResult<ExprNode> {
        let start = self.pos;
        let mut lhs = self.parse_expr7(want_string)?;
        loop {
            let end = self.pos;
            self.skip_white();
            let Some(op @ (b'*' | b'/' | b'%')) = self.peek() else {
                self.pos = end;
                return Ok(lhs);
            };
            self.pos += 1;
            self.skip_white();
            let rhs = Box::new(self.parse_expr7(false)?);
            let lhs_box = Box::new(lhs);
            let kind = match op {
                b'*' => ExprKind::Multiply(lhs_box, rhs),
                b'/' => ExprKind::Divide(lhs_box, rhs),
                _ => ExprKind::Modulo(lhs_box, rhs),
            };
            lhs = self.node(kind, start);
        }
    }

    /// Unary operators, applied right to left once the operand is parsed.
    fn parse_expr7(&mut self, want_string: bool) -> ParseResult<ExprNode> {
        let mut leaders = Vec::new();
        while let Some(op @ (b'!' | b'-' | b'+')) = self.peek() {
            leaders.push((op, self.pos));
            self.pos += 1;
            self.skip_white();
        }
        let mut operand = self.parse_primary(want_string)?;
        while let Some((op, start)) = leaders.pop() {
            let inner = Box::new(operand);
            let kind = match op {
                b'!' => ExprKind::Not(inner),
                b'-' => ExprKind::Minus(inner),
                _ => ExprKind::Plus(inner),
            };
            operand = self.node(kind, start);
        }
        Ok(operand)
    }
}

/// Characters that may continue a variable or function name.
pub(crate) fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'#'
}

/// Characters that may start a variable or function name.
pub(crate) fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}
