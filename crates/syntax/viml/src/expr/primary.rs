//! Primary expressions and their postfix chains.

use viml_ir::{ExprKind, ExprNode, NamePart, Scope};
use viml_value::LegacyError;

use super::{ExprParser, MAX_CALL_ARGS, is_name_char, is_name_start};
use crate::error::ParseResult;

impl ExprParser<'_> {
    pub(super) fn parse_primary(&mut self, want_string: bool) -> ParseResult<ExprNode> {
        let base = match self.peek() {
            Some(b'0'..=b'9') => self.parse_number(want_string)?,
            Some(b'"') => self.parse_double_quoted()?,
            Some(b'\'') => self.parse_single_quoted()?,
            Some(b'[') => self.parse_list()?,
            Some(b'{') => self.parse_brace()?,
            Some(b'&') => self.parse_option()?,
            Some(b'$') => self.parse_environment()?,
            Some(b'@') => self.parse_register()?,
            Some(b'(') => self.parse_paren()?,
            Some(byte) if is_name_start(byte) => self.parse_name()?,
            _ => return Err(self.error_here(LegacyError::InvalidExpression)),
        };
        self.parse_postfix(base)
    }

    fn parse_paren(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        self.skip_white();
        let inner = self.parse_expr1()?;
        self.skip_white();
        if !self.eat(b')') {
            return Err(self.error(LegacyError::MissingParen, ""));
        }
        Ok(self.node(ExprKind::Expression(Box::new(inner)), start))
    }

    /// `[`, `.key` and `(` directly after a value, without blanks.
    fn parse_postfix(&mut self, mut base: ExprNode) -> ParseResult<ExprNode> {
        loop {
            let start = base.span.start;
            base = match self.peek() {
                Some(b'[') => self.parse_subscript(base)?,
                Some(b'(') if !base.is_literal() => self.parse_call(base)?,
                Some(b'.') if !base.is_literal() && self.peek_at(1).is_some_and(is_key_char) => {
                    self.pos += 1;
                    let key_start = self.pos;
                    while self.peek().is_some_and(is_key_char) {
                        self.pos += 1;
                    }
                    let key = self.text[key_start..self.pos].to_string();
                    self.node(
                        ExprKind::ConcatOrSubscript {
                            base: Box::new(base),
                            key,
                        },
                        start,
                    )
                }
                _ => return Ok(base),
            };
        }
    }

    /// `[i]` or `[i : j]`.
    fn parse_subscript(&mut self, base: ExprNode) -> ParseResult<ExprNode> {
        let start = base.span.start;
        self.pos += 1;
        self.skip_white();
        let from = if self.peek() == Some(b':') {
            None
        } else {
            Some(Box::new(self.parse_expr1()?))
        };
        self.skip_white();
        if self.eat(b':') {
            self.skip_white();
            let to = if self.peek() == Some(b']') {
                None
            } else {
                Some(Box::new(self.parse_expr1()?))
            };
            self.skip_white();
            if !self.eat(b']') {
                return Err(self.error(LegacyError::MissingBracket, ""));
            }
            return Ok(self.node(
                ExprKind::Slice {
                    base: Box::new(base),
                    from,
                    to,
                },
                start,
            ));
        }
        if !self.eat(b']') {
            return Err(self.error(LegacyError::MissingBracket, ""));
        }
        let Some(index) = from else {
            return Err(self.error_here(LegacyError::InvalidExpression));
        };
        Ok(self.node(
            ExprKind::Subscript {
                base: Box::new(base),
                index,
            },
            start,
        ))
    }

    /// Argument list of a call.
    fn parse_call(&mut self, callee: ExprNode) -> ParseResult<ExprNode> {
        let start = callee.span.start;
        let name = self.text[callee.span.start..callee.span.end].to_string();
        self.pos += 1;
        self.skip_white();
        let mut args = Vec::new();
        if !self.eat(b')') {
            loop {
                if args.len() == MAX_CALL_ARGS {
                    return Err(self.error(LegacyError::TooManyCallArguments, name));
                }
                args.push(self.parse_expr1()?);
                self.skip_white();
                if self.eat(b')') {
                    break;
                }
                if !self.eat(b',') {
                    return Err(self.error(LegacyError::InvalidFunctionArguments, name));
                }
                self.skip_white();
            }
        }
        Ok(self.node(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            start,
        ))
    }

    fn parse_list(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_white();
            if self.eat(b']') {
                break;
            }
            if self.at_end() {
                return Err(self.error_here(LegacyError::MissingEndOfList));
            }
            items.push(self.parse_expr1()?);
            self.skip_white();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                break;
            }
            if self.at_end() {
                return Err(self.error_here(LegacyError::MissingEndOfList));
            }
            return Err(self.error_here(LegacyError::MissingCommaInList));
        }
        Ok(self.node(ExprKind::List(items), start))
    }

    /// `{` starts a curly-brace name when the braces hold one expression and
    /// nothing else, and a Dictionary otherwise.
    fn parse_brace(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let cached = self.braces.get(&start).copied();
        let is_name = match cached {
            Some(is_name) => is_name,
            None => {
                self.pos += 1;
                self.skip_white();
                let is_name = self.peek() != Some(b'}')
                    && self.parse_expr1().is_ok()
                    && {
                        self.skip_white();
                        self.peek() == Some(b'}')
                    };
                self.pos = start;
                self.braces.insert(start, is_name);
                is_name
            }
        };
        if is_name {
            self.parse_name()
        } else {
            self.parse_dict()
        }
    }

    fn parse_dict(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_white();
            if self.eat(b'}') {
                break;
            }
            if self.at_end() {
                return Err(self.error_here(LegacyError::MissingEndOfDictionary));
            }
            let key = self.parse_expr1()?;
            self.skip_white();
            if !self.eat(b':') {
                return Err(self.error_here(LegacyError::MissingColonInDictionary));
            }
            self.skip_white();
            let value = self.parse_expr1()?;
            entries.push((key, value));
            self.skip_white();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                break;
            }
            if self.at_end() {
                return Err(self.error_here(LegacyError::MissingEndOfDictionary));
            }
            return Err(self.error_here(LegacyError::MissingCommaInDictionary));
        }
        Ok(self.node(ExprKind::Dictionary(entries), start))
    }

    /// A variable or function name: optional scope prefix, then name
    /// characters and `{expr}` pieces.
    pub(crate) fn parse_name(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        let scope = match (self.peek(), self.peek_at(1)) {
            (Some(letter), Some(b':')) => Scope::from_letter(letter),
            _ => None,
        };
        if scope.is_some() {
            self.pos += 2;
        }

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut has_expr = false;
        loop {
            match self.peek() {
                // Digits may follow a scope directly, as in `a:1`.
                Some(byte) if is_name_char(byte) && (byte != b'#' || !literal.is_empty() || has_expr) => {
                    literal.push(char::from(byte));
                    self.pos += 1;
                }
                Some(b'{') => {
                    if !literal.is_empty() {
                        parts.push(NamePart::Literal(std::mem::take(&mut literal)));
                    }
                    let brace = self.pos;
                    self.pos += 1;
                    self.skip_white();
                    let inner = self.parse_expr1()?;
                    self.skip_white();
                    if !self.eat(b'}') {
                        self.pos = brace;
                        return Err(self.error_here(LegacyError::InvalidExpression));
                    }
                    parts.push(NamePart::Expr(inner));
                    has_expr = true;
                }
                _ => break,
            }
        }

        if !has_expr {
            return match (scope, literal.is_empty()) {
                (Some(scope), true) => Ok(self.node(ExprKind::ScopeDict(scope), start)),
                (None, true) => Err(self.error_here(LegacyError::InvalidExpression)),
                (_, false) => Ok(self.node(ExprKind::Variable { scope, name: literal }, start)),
            };
        }
        if !literal.is_empty() {
            parts.push(NamePart::Literal(literal));
        }
        Ok(self.node(ExprKind::CurlyName { scope, parts }, start))
    }
}

fn is_key_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
