//! Parser for the legacy editor script language.
//!
//! Expressions are parsed by precedence climbing into [`viml_ir::ExprNode`]
//! trees; scripts are split into logical lines and commands, with block
//! commands collecting their bodies into nested [`viml_ir::CommandNode`]s.

mod command;
mod error;
mod expr;
mod lines;

pub use command::{parse_lines, parse_script};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use expr::{MAX_CALL_ARGS, parse_expression, parse_expression_str};
pub use lines::{Line, LineReader};
