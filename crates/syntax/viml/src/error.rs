use std::fmt;

use thiserror::Error;
use viml_value::LegacyError;

/// A parse failure: the legacy error and the text it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorKind {
    pub error: LegacyError,
    pub detail: String,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error.message(&self.detail))
    }
}

/// Parse failure at a byte offset.
///
/// For expressions the offset is into the buffer handed to the parser. For
/// scripts it is into the logical line `line` (1-based), after
/// continuation lines were joined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub line: Option<usize>,
}

impl ParseError {
    pub fn new(error: LegacyError, detail: impl Into<String>, position: usize) -> Self {
        Self {
            kind: ParseErrorKind {
                error,
                detail: detail.into(),
            },
            position,
            line: None,
        }
    }

    pub fn legacy(&self) -> LegacyError {
        self.kind.error
    }

    /// Legacy message including its `Ennn:` code.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }

    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
