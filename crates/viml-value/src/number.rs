//! Number-prefix parsing shared by the expression parser and string to
//! Number conversion.

use serde::Serialize;

/// Radix a number literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Radix {
    Decimal,
    Octal,
    Hex,
}

/// Result of scanning a number at the start of some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberPrefix {
    pub value: i64,
    /// Bytes consumed, including a sign and any `0x` prefix.
    pub len: usize,
    pub radix: Radix,
}

/// Scan a number at the start of `text`.
///
/// A leading `-` is accepted when `allow_sign` is set. `0x`/`0X` followed by
/// a hex digit selects hex. A leading `0` followed only by digits `0-7`
/// selects octal; any `8` or `9` in the run makes the whole run decimal, so
/// `08` and `0129` are decimal and `017` is 15. Values that overflow
/// saturate at `i64::MAX`/`i64::MIN`.
///
/// Returns `None` when `text` does not start with a digit (after the sign).
pub fn scan_number(text: &[u8], allow_sign: bool) -> Option<NumberPrefix> {
    let mut pos = 0;
    let negative = allow_sign && text.first() == Some(&b'-');
    if negative {
        pos += 1;
    }
    if !text.get(pos).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    let digits = &text[pos..];
    let radix = if digits[0] == b'0'
        && matches!(digits.get(1), Some(b'x' | b'X'))
        && digits.get(2).is_some_and(u8::is_ascii_hexdigit)
    {
        pos += 2;
        Radix::Hex
    } else if digits[0] == b'0' && is_octal_run(&digits[1..]) {
        pos += 1;
        Radix::Octal
    } else {
        Radix::Decimal
    };

    let base: u32 = match radix {
        Radix::Decimal => 10,
        Radix::Octal => 8,
        Radix::Hex => 16,
    };

    let mut magnitude: u64 = 0;
    let mut overflow = false;
    while let Some(&byte) = text.get(pos) {
        let Some(digit) = (byte as char).to_digit(base) else {
            break;
        };
        match magnitude
            .checked_mul(u64::from(base))
            .and_then(|m| m.checked_add(u64::from(digit)))
        {
            Some(next) => magnitude = next,
            None => overflow = true,
        }
        pos += 1;
    }

    let value = if negative {
        if overflow || magnitude > i64::MAX as u64 + 1 {
            i64::MIN
        } else {
            (magnitude as i128).wrapping_neg() as i64
        }
    } else if overflow || magnitude > i64::MAX as u64 {
        i64::MAX
    } else {
        magnitude as i64
    };

    Some(NumberPrefix { value, len: pos, radix })
}

/// True when `rest` (the digits after a leading `0`) is a non-empty run of
/// digits all of which are octal.
fn is_octal_run(rest: &[u8]) -> bool {
    let run: Vec<u8> = rest.iter().copied().take_while(u8::is_ascii_digit).collect();
    !run.is_empty() && run.iter().all(|d| *d <= b'7')
}

/// Convert a string to a Number the way arithmetic does: leading whitespace
/// is skipped, a number prefix is read, and anything else yields 0.
pub fn string_to_number(text: &str) -> i64 {
    let trimmed = text.trim_start_matches([' ', '\t']);
    scan_number(trimmed.as_bytes(), true).map_or(0, |prefix| prefix.value)
}
