//! Numbers, strings and the `&option` / `$ENV` / `@r` references.

use viml_ir::{ExprKind, ExprNode, OptionScope};
use viml_value::LegacyError;
use viml_value::number::{Radix, scan_number};

use super::ExprParser;
use crate::error::ParseResult;

impl<'a> ExprParser<'a> {
    /// A Number or Float literal.
    ///
    /// A Float needs exactly `[0-9]+\.[0-9]+` with an optional exponent, and
    /// must not be followed by a letter or another `.`; otherwise the digits
    /// before the dot are a Number and the dot is left for the caller. No
    /// Float is read when `want_string` is set, so `1.2.3` and `a . 1.2`
    /// stay concatenations.
    pub(super) fn parse_number(&mut self, want_string: bool) -> ParseResult<ExprNode> {
        let start = self.pos;
        if let Some(len) = float_len(&self.bytes[start..]).filter(|_| !want_string) {
            let literal = &self.text[start..start + len];
            let value: f64 = literal
                .parse()
                .map_err(|_| self.error(LegacyError::InvalidExpression, literal))?;
            self.pos += len;
            return Ok(self.node(ExprKind::Float(value), start));
        }

        let Some(number) = scan_number(&self.bytes[start..], false) else {
            return Err(self.error_here(LegacyError::InvalidExpression));
        };
        self.pos += number.len;
        if self
            .peek()
            .is_some_and(|byte| byte.is_ascii_alphabetic() || byte == b'_')
        {
            self.pos = start;
            return Err(self.error_here(LegacyError::InvalidExpression));
        }
        let kind = match number.radix {
            Radix::Decimal => ExprKind::DecimalNumber(number.value),
            Radix::Octal => ExprKind::OctalNumber(number.value),
            Radix::Hex => ExprKind::HexNumber(number.value),
        };
        Ok(self.node(kind, start))
    }

    /// `'...'`: no escapes, `''` is one quote.
    pub(super) fn parse_single_quoted(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(offset) = self.text[self.pos..].find('\'') else {
                self.pos = start;
                return Err(self.error_here(LegacyError::MissingSingleQuote));
            };
            value.push_str(&self.text[self.pos..self.pos + offset]);
            self.pos += offset + 1;
            if self.peek() == Some(b'\'') {
                value.push('\'');
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.node(ExprKind::SingleQuotedString(value), start))
    }

    /// `"..."` with backslash escapes.
    pub(super) fn parse_double_quoted(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let body_start = self.pos;
        let mut value = Vec::new();
        loop {
            match self.peek() {
                None => {
                    self.pos = start;
                    return Err(self.error_here(LegacyError::MissingDoubleQuote));
                }
                Some(b'"') => break,
                Some(b'\\') if self.pos + 1 < self.bytes.len() => {
                    self.pos += 1;
                    self.parse_escape(&mut value);
                }
                Some(byte) => {
                    value.push(byte);
                    self.pos += 1;
                }
            }
        }
        let raw = self.text[body_start..self.pos].to_string();
        self.pos += 1;
        Ok(self.node(ExprKind::DoubleQuotedString { raw, value }, start))
    }

    /// One escape; the cursor is on the byte after the backslash.
    fn parse_escape(&mut self, out: &mut Vec<u8>) {
        let Some(byte) = self.peek() else {
            return;
        };
        self.pos += 1;
        match byte {
            b'b' => out.push(0x08),
            b'e' => out.push(0x1b),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'x' | b'X' | b'u' | b'U' => {
                let max = match byte {
                    b'x' | b'X' => 2,
                    b'u' => 4,
                    _ => 8,
                };
                let digits = self.take_while_max(max, |b| b.is_ascii_hexdigit());
                if digits.is_empty() {
                    // Not an escape after all: the letter stands for itself.
                    out.push(byte);
                    return;
                }
                let code = u32::from_str_radix(digits, 16).unwrap_or_default();
                if matches!(byte, b'x' | b'X') {
                    // `\xNN` is a raw byte, not a character.
                    out.push(code as u8);
                } else {
                    push_char(out, code);
                }
            }
            b'0'..=b'7' => {
                self.pos -= 1;
                let digits = self.take_while_max(3, |b| (b'0'..=b'7').contains(&b));
                let code = u32::from_str_radix(digits, 8).unwrap_or_default();
                out.push(code as u8);
            }
            b'<' => {
                let Some(len) = self.bytes[self.pos..].iter().position(|&b| b == b'>') else {
                    out.push(b'<');
                    return;
                };
                let name = &self.text[self.pos..self.pos + len];
                match key_code(name) {
                    Some(code) => {
                        out.extend_from_slice(code.as_bytes());
                        self.pos += len + 1;
                    }
                    None => out.push(b'<'),
                }
            }
            other => out.push(other),
        }
    }

    fn take_while_max(&mut self, max: usize, accept: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.pos - start < max && self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// `&name`, `&g:name`, `&l:name`.
    pub(super) fn parse_option(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let scope = match (self.peek(), self.peek_at(1)) {
            (Some(b'g'), Some(b':')) => {
                self.pos += 2;
                OptionScope::Global
            }
            (Some(b'l'), Some(b':')) => {
                self.pos += 2;
                OptionScope::Local
            }
            _ => OptionScope::Default,
        };
        let name_start = self.pos;
        let terminal = self.starts_with("t_")
            && self.peek_at(2).is_some_and(|b| b.is_ascii_graphic())
            && self.peek_at(3).is_some_and(|b| b.is_ascii_graphic());
        if terminal {
            // Terminal options: `t_` and two arbitrary characters.
            self.pos += 4;
        } else {
            while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
                self.pos += 1;
            }
        }
        if self.pos == name_start {
            let detail = self.text[start..].to_string();
            self.pos = start;
            return Err(self.error(LegacyError::OptionNameMissing, detail));
        }
        let name = self.text[name_start..self.pos].to_string();
        Ok(self.node(ExprKind::Option { scope, name }, start))
    }

    /// `$NAME`.
    pub(super) fn parse_environment(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        if self.pos == name_start {
            self.pos = start;
            return Err(self.error_here(LegacyError::InvalidExpression));
        }
        let name = self.text[name_start..self.pos].to_string();
        Ok(self.node(ExprKind::EnvironmentVariable(name), start))
    }

    /// `@r`; a bare `@` at the end reads the unnamed register.
    pub(super) fn parse_register(&mut self) -> ParseResult<ExprNode> {
        let start = self.pos;
        self.pos += 1;
        let register = self.text[self.pos..].chars().next();
        if let Some(register) = register {
            self.pos += register.len_utf8();
        }
        Ok(self.node(ExprKind::Register(register), start))
    }
}

/// Length of a Float literal at the start of `bytes`, if there is one.
fn float_len(bytes: &[u8]) -> Option<usize> {
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let mut pos = digits(0);
    if pos == 0 || bytes.get(pos) != Some(&b'.') || !bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    pos += 1;
    pos += digits(pos);
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits == 0 {
            return None;
        }
        pos = exp + exp_digits;
    }
    if bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'.') {
        return None;
    }
    Some(pos)
}

fn push_char(out: &mut Vec<u8>, code: u32) {
    let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

/// Bytes a `\<Key>` escape stands for. Only keys that have a plain text
/// form are known; others leave the escape as written.
fn key_code(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "cr" | "return" | "enter" => "\r",
        "nl" | "newline" | "linefeed" | "lf" => "\n",
        "tab" => "\t",
        "esc" => "\x1b",
        "space" => " ",
        "bs" | "backspace" => "\x08",
        "lt" => "<",
        "bslash" => "\\",
        "bar" => "|",
        "nul" => "\n",
        "del" => "\x7f",
        _ => return ctrl_key(&lower),
    };
    Some(code)
}

/// `<C-x>` for a letter `x`.
fn ctrl_key(name: &str) -> Option<&'static str> {
    const CONTROL: [&str; 26] = [
        "\x01", "\x02", "\x03", "\x04", "\x05", "\x06", "\x07", "\x08", "\x09", "\x0a", "\x0b", "\x0c", "\x0d",
        "\x0e", "\x0f", "\x10", "\x11", "\x12", "\x13", "\x14", "\x15", "\x16", "\x17", "\x18", "\x19", "\x1a",
    ];
    let letter = name.strip_prefix("c-")?;
    let &[byte] = letter.as_bytes() else {
        return None;
    };
    byte.is_ascii_lowercase().then(|| CONTROL[usize::from(byte - b'a')])
}
