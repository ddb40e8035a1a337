//! Command parser.
//!
//! Logical lines are split into commands at `|`; each command is parsed
//! into an item, and block commands collect the items up to their end
//! command into nested bodies.

mod args;
mod header;

use tracing::{debug, trace};
use viml_ir::{Branch, CatchClause, CommandKind, CommandNode, Expression};
use viml_value::LegacyError;

use crate::error::{ParseError, ParseResult};
use crate::lines::{Line, LineReader};

pub(crate) use args::Opening;
use header::Header;

/// Parse a whole script.
pub fn parse_script(text: &str) -> ParseResult<Vec<CommandNode>> {
    let mut lines = text.lines().map(str::to_string);
    parse_lines(move || lines.next())
}

/// Parse commands from a line-getter until it returns `None`.
pub fn parse_lines<F>(getline: F) -> ParseResult<Vec<CommandNode>>
where
    F: FnMut() -> Option<String>,
{
    let mut parser = ScriptParser {
        reader: LineReader::new(getline),
        current: None,
    };
    let (body, stray) = parser.parse_body()?;
    if let Some((marker, header)) = stray {
        return Err(stray_marker(&marker, &header));
    }
    debug!(commands = body.len(), "parsed script");
    Ok(body)
}

/// Block-structure commands that do not start a block.
#[derive(Debug)]
pub(crate) enum Marker {
    ElseIf(Expression),
    Else,
    EndIf,
    EndWhile,
    EndFor,
    EndFunction,
    Catch(Option<String>),
    Finally,
    EndTry,
}

pub(crate) enum Item {
    Command(CommandNode),
    Open(Opening, Header),
    Marker(Marker, Header),
}

struct ScriptParser<F> {
    reader: LineReader<F>,
    /// Line being split into commands and the offset of the next one.
    current: Option<(Line, usize)>,
}

impl<F> ScriptParser<F>
where
    F: FnMut() -> Option<String>,
{
    fn next_item(&mut self) -> ParseResult<Option<Item>> {
        loop {
            let Some((line, start)) = self.current.take() else {
                match self.reader.next_logical() {
                    Some(line) => {
                        trace!(line = line.number, text = %line.text, "read line");
                        self.current = Some((line, 0));
                        continue;
                    }
                    None => return Ok(None),
                }
            };
            let parsed = args::parse_command(&line, start, &mut self.reader).map_err(|err| err.at_line(line.number))?;
            if let Some(next) = parsed.next {
                self.current = Some((line, next));
            }
            if let Some(item) = parsed.item {
                return Ok(Some(item));
            }
        }
    }

    /// Items up to the first block marker that does not belong to a block
    /// opened here, or to the end of input.
    fn parse_body(&mut self) -> ParseResult<(Vec<CommandNode>, Option<(Marker, Header)>)> {
        let mut body = Vec::new();
        while let Some(item) = self.next_item()? {
            match item {
                Item::Command(node) => body.push(node),
                Item::Open(opening, header) => body.push(self.parse_block(opening, header)?),
                Item::Marker(marker, header) => return Ok((body, Some((marker, header)))),
            }
        }
        Ok((body, None))
    }

    fn parse_block(&mut self, opening: Opening, header: Header) -> ParseResult<CommandNode> {
        let kind = match opening {
            Opening::If(condition) => self.parse_if(condition, &header)?,
            Opening::While(condition) => {
                let body = self.parse_loop_body(&header, "while")?;
                CommandKind::While { condition, body }
            }
            Opening::For { target, iterable } => {
                let body = self.parse_loop_body(&header, "for")?;
                CommandKind::For { target, iterable, body }
            }
            Opening::Function(mut def) => {
                def.body = self.parse_function_body(&header)?;
                debug!(name = %def.name.display(), params = def.params.len(), "parsed function");
                CommandKind::Function(def)
            }
            Opening::Try => self.parse_try(&header)?,
        };
        Ok(header.into_node(kind))
    }

    fn parse_if(&mut self, condition: Expression, header: &Header) -> ParseResult<CommandKind> {
        let mut branches = Vec::new();
        let mut else_body = None;
        let mut branch_position = header.position;
        let mut branch_condition = Some(condition);
        loop {
            let (body, marker) = self.parse_body()?;
            match branch_condition.take() {
                Some(condition) => branches.push(Branch {
                    position: branch_position,
                    condition,
                    body,
                }),
                None => else_body = Some(body),
            }
            match marker {
                Some((Marker::EndIf, _)) => break,
                Some((Marker::ElseIf(condition), next)) => {
                    if else_body.is_some() {
                        return Err(marker_error(LegacyError::ElseIfAfterElse, "", &next));
                    }
                    branch_position = next.position;
                    branch_condition = Some(condition);
                }
                Some((Marker::Else, next)) => {
                    if else_body.is_some() {
                        return Err(marker_error(LegacyError::MultipleElse, "", &next));
                    }
                    // The else body is collected by the next round.
                    else_body = Some(Vec::new());
                }
                Some((Marker::EndFunction, _)) | None => {
                    return Err(marker_error(LegacyError::MissingEndIf, "", header));
                }
                Some((marker, next)) => return Err(stray_marker(&marker, &next)),
            }
        }
        Ok(CommandKind::If { branches, else_body })
    }

    fn parse_loop_body(&mut self, header: &Header, keyword: &str) -> ParseResult<Vec<CommandNode>> {
        let (body, marker) = self.parse_body()?;
        match (marker, keyword) {
            (Some((Marker::EndWhile, _)), "while") | (Some((Marker::EndFor, _)), "for") => Ok(body),
            (Some((Marker::EndFor, next)), _) => Err(marker_error(LegacyError::EndForWithWhile, "", &next)),
            (Some((Marker::EndWhile, next)), _) => Err(marker_error(LegacyError::EndWhileWithFor, "", &next)),
            (Some((Marker::EndFunction, _)) | None, _) => Err(marker_error(
                LegacyError::MissingEndLoop,
                format!(":end{keyword}"),
                header,
            )),
            (Some((marker, next)), _) => Err(stray_marker(&marker, &next)),
        }
    }

    fn parse_function_body(&mut self, header: &Header) -> ParseResult<Vec<CommandNode>> {
        let (body, marker) = self.parse_body()?;
        match marker {
            Some((Marker::EndFunction, _)) => Ok(body),
            None => Err(marker_error(LegacyError::MissingEndFunction, "", header)),
            Some((marker, next)) => Err(stray_marker(&marker, &next)),
        }
    }

    fn parse_try(&mut self, header: &Header) -> ParseResult<CommandKind> {
        let (body, mut marker) = self.parse_body()?;
        let mut catches: Vec<CatchClause> = Vec::new();
        let mut finally = None;
        loop {
            match marker {
                Some((Marker::EndTry, _)) => break,
                Some((Marker::Catch(pattern), next)) => {
                    if finally.is_some() {
                        return Err(marker_error(LegacyError::CatchAfterFinally, "", &next));
                    }
                    let (clause_body, following) = self.parse_body()?;
                    catches.push(CatchClause {
                        position: next.position,
                        pattern,
                        body: clause_body,
                    });
                    marker = following;
                }
                Some((Marker::Finally, next)) => {
                    if finally.is_some() {
                        return Err(marker_error(LegacyError::MultipleFinally, "", &next));
                    }
                    let (finally_body, following) = self.parse_body()?;
                    finally = Some(finally_body);
                    marker = following;
                }
                Some((Marker::EndFunction, _)) | None => {
                    return Err(marker_error(LegacyError::MissingEndTry, "", header));
                }
                Some((other, next)) => return Err(stray_marker(&other, &next)),
            }
        }
        Ok(CommandKind::Try { body, catches, finally })
    }
}

fn marker_error(error: LegacyError, detail: impl Into<String>, header: &Header) -> ParseError {
    ParseError::new(error, detail, header.position.column.saturating_sub(1)).at_line(header.position.line)
}

/// Error for a block command met outside the block it belongs to.
fn stray_marker(marker: &Marker, header: &Header) -> ParseError {
    let (error, detail) = match marker {
        Marker::ElseIf(_) => (LegacyError::ElseIfWithoutIf, ""),
        Marker::Else => (LegacyError::ElseWithoutIf, ""),
        Marker::EndIf => (LegacyError::EndIfWithoutIf, ""),
        Marker::EndWhile => (LegacyError::EndLoopWithoutLoop, ":endwhile without :while"),
        Marker::EndFor => (LegacyError::EndLoopWithoutLoop, ":endfor without :for"),
        Marker::EndFunction => (LegacyError::NotInsideFunction, ":endfunction"),
        Marker::Catch(_) => (LegacyError::CatchWithoutTry, ""),
        Marker::Finally => (LegacyError::FinallyWithoutTry, ""),
        Marker::EndTry => (LegacyError::EndTryWithoutTry, ""),
    };
    marker_error(error, detail, header)
}

impl Header {
    pub(crate) fn into_node(self, kind: CommandKind) -> CommandNode {
        CommandNode {
            kind,
            position: self.position,
            range: self.range,
            bang: self.bang,
            modifiers: self.modifiers,
        }
    }
}

