//! Everything in front of a command's arguments: modifiers, line range,
//! name and `!`.

use viml_ir::{Address, AddressBase, LineRange, Position};
use viml_value::LegacyError;

use crate::error::{ParseError, ParseResult};

/// Parsed command prefix.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub position: Position,
    pub range: Option<LineRange>,
    pub bang: bool,
    pub modifiers: Vec<String>,
    /// Name as written.
    pub name: String,
    /// Offset of the first byte after the name and `!`.
    pub args_start: usize,
}

/// Modifiers that may precede a command: full name and shortest
/// abbreviation.
const MODIFIERS: &[(&str, usize)] = &[
    ("aboveleft", 3),
    ("belowright", 3),
    ("botright", 2),
    ("browse", 3),
    ("confirm", 4),
    ("hide", 3),
    ("keepalt", 5),
    ("keepjumps", 5),
    ("keepmarks", 3),
    ("keeppatterns", 5),
    ("leftabove", 5),
    ("lockmarks", 3),
    ("noautocmd", 3),
    ("noswapfile", 3),
    ("rightbelow", 6),
    ("sandbox", 3),
    ("silent", 3),
    ("tab", 3),
    ("topleft", 2),
    ("unsilent", 3),
    ("verbose", 4),
    ("vertical", 4),
];

pub(crate) fn matches_abbreviation(name: &str, full: &str, min: usize) -> bool {
    name.len() >= min && full.starts_with(name)
}

struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_white(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn skip_white_and_colons(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b':')) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn number(&mut self) -> Option<i64> {
        let digits = self.take_while(|b| b.is_ascii_digit());
        if digits.is_empty() {
            None
        } else {
            Some(digits.parse().unwrap_or(i64::MAX))
        }
    }
}

/// Parse the prefix of the command starting at `start`.
///
/// Returns `None` when the rest of the line holds no command: it is blank
/// or a `"` comment.
pub(crate) fn parse_header(text: &str, start: usize, line: usize) -> ParseResult<Option<Header>> {
    let mut cursor = Cursor {
        text,
        bytes: text.as_bytes(),
        pos: start,
    };
    let mut modifiers = Vec::new();
    loop {
        cursor.skip_white_and_colons();
        if matches!(cursor.peek(), None | Some(b'"')) {
            return Ok(None);
        }
        let mark = cursor.pos;
        let word = cursor.take_while(|b| b.is_ascii_alphabetic());
        let is_modifier = MODIFIERS
            .iter()
            .any(|&(full, min)| matches_abbreviation(word, full, min));
        // `:silent!` and friends; a modifier name followed by anything but a
        // blank or `!` is a command of its own.
        let bang = cursor.peek() == Some(b'!');
        let followed_by_command = matches!(cursor.bytes.get(cursor.pos + usize::from(bang)), Some(b' ' | b'\t'));
        if !is_modifier || !followed_by_command {
            cursor.pos = mark;
            break;
        }
        if bang {
            cursor.pos += 1;
        }
        modifiers.push(format!("{word}{}", if bang { "!" } else { "" }));
    }

    let command_start = cursor.pos;
    let range = parse_range(&mut cursor).map_err(|err| err.at_line(line))?;
    cursor.skip_white();

    let name = match cursor.peek() {
        Some(byte) if byte.is_ascii_alphabetic() => cursor.take_while(|b| b.is_ascii_alphabetic()).to_string(),
        Some(byte @ (b'!' | b'&' | b'<' | b'>' | b'=' | b'@' | b'*' | b'~' | b'#')) => {
            cursor.pos += 1;
            char::from(byte).to_string()
        }
        None | Some(b'|') if range.is_some() => {
            // A bare range moves the cursor.
            String::new()
        }
        _ => {
            let rest = &text[cursor.pos..];
            return Err(ParseError::new(LegacyError::InvalidArgument, rest, cursor.pos).at_line(line));
        }
    };
    let bang = !name.is_empty() && name != "!" && cursor.peek() == Some(b'!');
    if bang {
        cursor.pos += 1;
    }
    Ok(Some(Header {
        position: Position::new(line, command_start + 1),
        range,
        bang,
        modifiers,
        name,
        args_start: cursor.pos,
    }))
}

fn parse_range(cursor: &mut Cursor<'_>) -> ParseResult<Option<LineRange>> {
    if cursor.peek() == Some(b'%') {
        cursor.pos += 1;
        return Ok(Some(LineRange {
            start: Address {
                base: AddressBase::Line(1),
                offset: 0,
            },
            end: Some(Address {
                base: AddressBase::Last,
                offset: 0,
            }),
        }));
    }
    let Some(start) = parse_address(cursor)? else {
        return Ok(None);
    };
    cursor.skip_white();
    let end = if matches!(cursor.peek(), Some(b',' | b';')) {
        cursor.pos += 1;
        cursor.skip_white();
        // A missing second address means the current line.
        Some(parse_address(cursor)?.unwrap_or(Address {
            base: AddressBase::Current,
            offset: 0,
        }))
    } else {
        None
    };
    Ok(Some(LineRange { start, end }))
}

fn parse_address(cursor: &mut Cursor<'_>) -> ParseResult<Option<Address>> {
    let base = match cursor.peek() {
        Some(b'.') => {
            cursor.pos += 1;
            AddressBase::Current
        }
        Some(b'$') => {
            cursor.pos += 1;
            AddressBase::Last
        }
        Some(b'\'') => {
            cursor.pos += 1;
            let Some(mark) = cursor.text[cursor.pos..].chars().next() else {
                return Err(ParseError::new(LegacyError::InvalidArgument, "'", cursor.pos));
            };
            cursor.pos += mark.len_utf8();
            AddressBase::Mark(mark)
        }
        Some(b'0'..=b'9') => AddressBase::Line(cursor.number().unwrap_or_default()),
        Some(b'+' | b'-') => AddressBase::Current,
        _ => return Ok(None),
    };
    let mut offset = 0i64;
    while let Some(sign @ (b'+' | b'-')) = cursor.peek() {
        cursor.pos += 1;
        let amount = cursor.number().unwrap_or(1);
        offset = if sign == b'+' {
            offset.saturating_add(amount)
        } else {
            offset.saturating_sub(amount)
        };
    }
    Ok(Some(Address { base, offset }))
}
