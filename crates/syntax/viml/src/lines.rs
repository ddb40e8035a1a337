//! Logical lines.
//!
//! A physical line whose first non-blank character is `\` continues the
//! previous one; a line starting with `"\ ` is a comment inside such a
//! continuation and is dropped.

/// One logical line and the 1-based number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

pub struct LineReader<F> {
    getline: F,
    lookahead: Option<String>,
    next_number: usize,
}

impl<F> LineReader<F>
where
    F: FnMut() -> Option<String>,
{
    pub fn new(getline: F) -> Self {
        Self {
            getline,
            lookahead: None,
            next_number: 1,
        }
    }

    fn fetch(&mut self) -> Option<String> {
        let line = self.lookahead.take().or_else(&mut self.getline)?;
        self.next_number += 1;
        Some(line)
    }

    fn peek(&mut self) -> Option<&str> {
        if self.lookahead.is_none() {
            self.lookahead = (self.getline)();
        }
        self.lookahead.as_deref()
    }

    /// Next physical line, without joining continuations. Heredoc bodies are
    /// read this way.
    pub fn next_raw(&mut self) -> Option<Line> {
        let number = self.next_number;
        self.fetch().map(|text| Line { number, text })
    }

    /// Next logical line.
    pub fn next_logical(&mut self) -> Option<Line> {
        let number = self.next_number;
        let mut text = self.fetch()?;
        loop {
            let Some(next) = self.peek() else {
                break;
            };
            let trimmed = next.trim_start_matches([' ', '\t']);
            if trimmed.starts_with("\"\\ ") {
                self.fetch();
                continue;
            }
            let Some(rest) = trimmed.strip_prefix('\\') else {
                break;
            };
            text.push_str(rest);
            self.fetch();
        }
        Some(Line { number, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(lines: &[&str]) -> LineReader<impl FnMut() -> Option<String>> {
        let mut lines: Vec<String> = lines.iter().rev().map(|line| line.to_string()).collect();
        LineReader::new(move || lines.pop())
    }

    #[test]
    fn test_continuation_lines_join() {
        let mut reader = reader(&["let x = [", "    \\ 1,", "  \"\\ comment", "    \\ 2]", "echo x"]);
        assert_eq!(
            reader.next_logical(),
            Some(Line {
                number: 1,
                text: "let x = [ 1, 2]".to_string()
            })
        );
        assert_eq!(
            reader.next_logical(),
            Some(Line {
                number: 5,
                text: "echo x".to_string()
            })
        );
        assert_eq!(reader.next_logical(), None);
    }

    #[test]
    fn test_raw_lines_keep_backslashes() {
        let mut reader = reader(&["a", "\\b"]);
        assert_eq!(reader.next_raw().map(|line| line.text), Some("a".to_string()));
        assert_eq!(reader.next_raw().map(|line| line.text), Some("\\b".to_string()));
    }
}
