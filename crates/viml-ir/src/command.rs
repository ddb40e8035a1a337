//! Command trees.

use serde::Serialize;

use crate::expr::{Expression, Scope};

/// Where a command starts: 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandNode {
    pub kind: CommandKind,
    pub position: Position,
    pub range: Option<LineRange>,
    /// `!` after the command name.
    pub bang: bool,
    /// Modifiers in front of the command, such as `silent!`.
    pub modifiers: Vec<String>,
}

impl CommandNode {
    /// Full name of the command, as used in diagnostics.
    pub fn name(&self) -> &str {
        match &self.kind {
            CommandKind::Let { .. } => "let",
            CommandKind::Unlet { .. } => "unlet",
            CommandKind::If { .. } => "if",
            CommandKind::While { .. } => "while",
            CommandKind::For { .. } => "for",
            CommandKind::Break => "break",
            CommandKind::Continue => "continue",
            CommandKind::Function(_) => "function",
            CommandKind::Return { .. } => "return",
            CommandKind::DelFunction { .. } => "delfunction",
            CommandKind::Try { .. } => "try",
            CommandKind::Throw { .. } => "throw",
            CommandKind::Call { .. } => "call",
            CommandKind::Echo { kind, .. } => kind.name(),
            CommandKind::Execute { .. } => "execute",
            CommandKind::Generic { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressBase {
    /// Explicit line number.
    Line(i64),
    /// `.`
    Current,
    /// `$`
    Last,
    /// `'x`
    Mark(char),
}

/// One end of a line range: a base and the sum of its `+N`/`-N` offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Address {
    pub base: AddressBase,
    pub offset: i64,
}

/// Line range in front of a command. `%` is stored as `1,$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: Address,
    pub end: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Concat,
}

impl AssignOp {
    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Concat => ".=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignTarget {
    Single(Expression),
    /// `[a, b; rest]`
    Unpack {
        targets: Vec<Expression>,
        rest: Option<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LetValue {
    Expr(Expression),
    /// `=<< [trim] MARKER`: the collected lines.
    Heredoc(Vec<String>),
}

/// `:if` or `:elseif` with its body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub position: Position,
    pub condition: Expression,
    pub body: Vec<CommandNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub position: Position,
    /// Pattern between the delimiters; `None` catches everything.
    pub pattern: Option<String>,
    pub body: Vec<CommandNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoKind {
    Echo,
    Echon,
    Echomsg,
    Echoerr,
}

impl EchoKind {
    pub fn name(self) -> &'static str {
        match self {
            EchoKind::Echo => "echo",
            EchoKind::Echon => "echon",
            EchoKind::Echomsg => "echomsg",
            EchoKind::Echoerr => "echoerr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionName {
    /// `Name`, `g:Name`, `s:Name`, `<SID>Name` or `auto#load#name`.
    Named { scope: Option<Scope>, name: String },
    /// `dict.key` or `dict[key]`: the target is assigned a funcref.
    Member(Expression),
}

impl FunctionName {
    /// Name as written, for diagnostics.
    pub fn display(&self) -> String {
        match self {
            FunctionName::Named { scope: Some(scope), name } => format!("{}:{name}", scope.letter()),
            FunctionName::Named { scope: None, name } => name.clone(),
            FunctionName::Member(target) => target.root_text().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FunctionAttributes {
    pub range: bool,
    pub abort: bool,
    pub dict: bool,
    pub closure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub name: FunctionName,
    pub params: Vec<String>,
    /// `...` ends the parameter list.
    pub varargs: bool,
    pub attributes: FunctionAttributes,
    pub body: Vec<CommandNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Let {
        target: AssignTarget,
        op: AssignOp,
        value: LetValue,
    },
    Unlet {
        targets: Vec<Expression>,
    },
    If {
        /// `:if` followed by every `:elseif`.
        branches: Vec<Branch>,
        else_body: Option<Vec<CommandNode>>,
    },
    While {
        condition: Expression,
        body: Vec<CommandNode>,
    },
    For {
        target: AssignTarget,
        iterable: Expression,
        body: Vec<CommandNode>,
    },
    Break,
    Continue,
    Function(FunctionDef),
    Return {
        value: Option<Expression>,
    },
    DelFunction {
        name: FunctionName,
    },
    Try {
        body: Vec<CommandNode>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<CommandNode>>,
    },
    Throw {
        value: Expression,
    },
    Call {
        call: Expression,
    },
    Echo {
        kind: EchoKind,
        args: Vec<Expression>,
    },
    Execute {
        args: Vec<Expression>,
    },
    /// Any other command, with its argument text untouched.
    Generic {
        name: String,
        args: String,
    },
}
