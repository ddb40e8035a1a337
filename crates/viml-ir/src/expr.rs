//! Expression trees.

use serde::Serialize;

/// Byte range into the source text of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Variable scope named by a one-letter prefix such as `g:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    Script,
    Local,
    Argument,
    Buffer,
    Window,
    Tabpage,
    Vim,
}

impl Scope {
    pub const ALL: [Scope; 8] = [
        Scope::Global,
        Scope::Script,
        Scope::Local,
        Scope::Argument,
        Scope::Buffer,
        Scope::Window,
        Scope::Tabpage,
        Scope::Vim,
    ];

    pub fn from_letter(letter: u8) -> Option<Scope> {
        match letter {
            b'g' => Some(Scope::Global),
            b's' => Some(Scope::Script),
            b'l' => Some(Scope::Local),
            b'a' => Some(Scope::Argument),
            b'b' => Some(Scope::Buffer),
            b'w' => Some(Scope::Window),
            b't' => Some(Scope::Tabpage),
            b'v' => Some(Scope::Vim),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Scope::Global => 'g',
            Scope::Script => 's',
            Scope::Local => 'l',
            Scope::Argument => 'a',
            Scope::Buffer => 'b',
            Scope::Window => 'w',
            Scope::Tabpage => 't',
            Scope::Vim => 'v',
        }
    }

    /// Scopes that only exist while a function runs.
    pub fn is_function_scope(self) -> bool {
        matches!(self, Scope::Local | Scope::Argument)
    }
}

/// Case sensitivity suffix of a comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCompare {
    /// No suffix: the `'ignorecase'` option decides at run time.
    UseOption,
    /// `#` suffix.
    MatchCase,
    /// `?` suffix.
    IgnoreCase,
}

impl CaseCompare {
    pub fn suffix(self) -> &'static str {
        match self {
            CaseCompare::UseOption => "",
            CaseCompare::MatchCase => "#",
            CaseCompare::IgnoreCase => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equals,
    NotEquals,
    Identical,
    NotIdentical,
    Matches,
    NotMatches,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl CompareOp {
    pub fn token(self) -> &'static str {
        match self {
            CompareOp::Equals => "==",
            CompareOp::NotEquals => "!=",
            CompareOp::Identical => "is",
            CompareOp::NotIdentical => "isnot",
            CompareOp::Matches => "=~",
            CompareOp::NotMatches => "!~",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
        }
    }

    /// For the negated forms, the operator they negate.
    pub fn negation_of(self) -> Option<CompareOp> {
        match self {
            CompareOp::NotEquals => Some(CompareOp::Equals),
            CompareOp::NotIdentical => Some(CompareOp::Identical),
            CompareOp::NotMatches => Some(CompareOp::Matches),
            _ => None,
        }
    }
}

/// Which option value `&name` reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionScope {
    /// `&name`: the effective value.
    Default,
    /// `&g:name`
    Global,
    /// `&l:name`
    Local,
}

/// Piece of a curly-brace name such as `foo{i}bar`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePart {
    Literal(String),
    Expr(ExprNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    /// `cond ? a : b`
    Ternary {
        condition: Box<ExprNode>,
        if_true: Box<ExprNode>,
        if_false: Box<ExprNode>,
    },
    LogicalOr(Box<ExprNode>, Box<ExprNode>),
    LogicalAnd(Box<ExprNode>, Box<ExprNode>),
    Compare {
        op: CompareOp,
        case: CaseCompare,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    Add(Box<ExprNode>, Box<ExprNode>),
    Subtract(Box<ExprNode>, Box<ExprNode>),
    /// `a . b`
    Concat(Box<ExprNode>, Box<ExprNode>),
    Multiply(Box<ExprNode>, Box<ExprNode>),
    Divide(Box<ExprNode>, Box<ExprNode>),
    Modulo(Box<ExprNode>, Box<ExprNode>),
    /// `!a`
    Not(Box<ExprNode>),
    /// `-a`
    Minus(Box<ExprNode>),
    /// `+a`
    Plus(Box<ExprNode>),
    DecimalNumber(i64),
    /// `017`
    OctalNumber(i64),
    /// `0x1F`
    HexNumber(i64),
    Float(f64),
    /// `"..."`: the text between the quotes and the bytes it denotes.
    DoubleQuotedString { raw: String, value: Vec<u8> },
    /// `'...'`: the denoted text, with `''` already collapsed.
    SingleQuotedString(String),
    /// `&name`, `&g:name`, `&l:name`
    Option { scope: OptionScope, name: String },
    /// `@r`; `None` when `@` ends the input.
    Register(Option<char>),
    /// `$NAME`
    EnvironmentVariable(String),
    /// Plain or scoped name such as `foo` or `g:foo`.
    Variable { scope: Option<Scope>, name: String },
    /// Whole scope dictionary such as `g:`.
    ScopeDict(Scope),
    /// Name with `{expr}` pieces, such as `g:foo{i}bar`.
    CurlyName { scope: Option<Scope>, parts: Vec<NamePart> },
    /// Parenthesised expression.
    Expression(Box<ExprNode>),
    /// `a.key`: a dictionary lookup when `a` is a Dictionary, otherwise the
    /// concatenation of `a` and the variable `key`.
    ConcatOrSubscript { base: Box<ExprNode>, key: String },
    /// `a[i]`
    Subscript { base: Box<ExprNode>, index: Box<ExprNode> },
    /// `a[i : j]` with either bound omitted.
    Slice {
        base: Box<ExprNode>,
        from: Option<Box<ExprNode>>,
        to: Option<Box<ExprNode>>,
    },
    List(Vec<ExprNode>),
    Dictionary(Vec<(ExprNode, ExprNode)>),
    Call { callee: Box<ExprNode>, args: Vec<ExprNode> },
}

impl ExprNode {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Copy of the tree with every span zeroed, for structural comparison.
    pub fn without_spans(&self) -> ExprNode {
        let mut node = self.clone();
        node.clear_spans();
        node
    }

    fn clear_spans(&mut self) {
        self.span = Span::default();
        for child in self.children_mut() {
            child.clear_spans();
        }
    }

    /// Direct subexpressions, in source order.
    pub fn children(&self) -> Vec<&ExprNode> {
        match &self.kind {
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => vec![&**condition, &**if_true, &**if_false],
            ExprKind::LogicalOr(a, b)
            | ExprKind::LogicalAnd(a, b)
            | ExprKind::Add(a, b)
            | ExprKind::Subtract(a, b)
            | ExprKind::Concat(a, b)
            | ExprKind::Multiply(a, b)
            | ExprKind::Divide(a, b)
            | ExprKind::Modulo(a, b)
            | ExprKind::Compare { lhs: a, rhs: b, .. }
            | ExprKind::Subscript { base: a, index: b } => vec![&**a, &**b],
            ExprKind::Not(a) | ExprKind::Minus(a) | ExprKind::Plus(a) | ExprKind::Expression(a) => vec![&**a],
            ExprKind::ConcatOrSubscript { base, .. } => vec![&**base],
            ExprKind::Slice { base, from, to } => {
                let mut children: Vec<&ExprNode> = vec![&**base];
                children.extend(from.as_deref());
                children.extend(to.as_deref());
                children
            }
            ExprKind::CurlyName { parts, .. } => parts
                .iter()
                .filter_map(|part| match part {
                    NamePart::Expr(expr) => Some(expr),
                    NamePart::Literal(_) => None,
                })
                .collect(),
            ExprKind::List(items) => items.iter().collect(),
            ExprKind::Dictionary(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Call { callee, args } => std::iter::once(&**callee).chain(args).collect(),
            ExprKind::DecimalNumber(_)
            | ExprKind::OctalNumber(_)
            | ExprKind::HexNumber(_)
            | ExprKind::Float(_)
            | ExprKind::DoubleQuotedString { .. }
            | ExprKind::SingleQuotedString(_)
            | ExprKind::Option { .. }
            | ExprKind::Register(_)
            | ExprKind::EnvironmentVariable(_)
            | ExprKind::Variable { .. }
            | ExprKind::ScopeDict(_) => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut ExprNode> {
        match &mut self.kind {
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => vec![&mut **condition, &mut **if_true, &mut **if_false],
            ExprKind::LogicalOr(a, b)
            | ExprKind::LogicalAnd(a, b)
            | ExprKind::Add(a, b)
            | ExprKind::Subtract(a, b)
            | ExprKind::Concat(a, b)
            | ExprKind::Multiply(a, b)
            | ExprKind::Divide(a, b)
            | ExprKind::Modulo(a, b)
            | ExprKind::Compare { lhs: a, rhs: b, .. }
            | ExprKind::Subscript { base: a, index: b } => vec![&mut **a, &mut **b],
            ExprKind::Not(a) | ExprKind::Minus(a) | ExprKind::Plus(a) | ExprKind::Expression(a) => vec![&mut **a],
            ExprKind::ConcatOrSubscript { base, .. } => vec![&mut **base],
            ExprKind::Slice { base, from, to } => {
                let mut children: Vec<&mut ExprNode> = vec![&mut **base];
                children.extend(from.as_deref_mut());
                children.extend(to.as_deref_mut());
                children
            }
            ExprKind::CurlyName { parts, .. } => parts
                .iter_mut()
                .filter_map(|part| match part {
                    NamePart::Expr(expr) => Some(expr),
                    NamePart::Literal(_) => None,
                })
                .collect(),
            ExprKind::List(items) => items.iter_mut().collect(),
            ExprKind::Dictionary(entries) => entries.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Call { callee, args } => std::iter::once(&mut **callee).chain(args.iter_mut()).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the node is a literal (number, float or string).
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::DecimalNumber(_)
                | ExprKind::OctalNumber(_)
                | ExprKind::HexNumber(_)
                | ExprKind::Float(_)
                | ExprKind::DoubleQuotedString { .. }
                | ExprKind::SingleQuotedString(_)
        )
    }

    /// Whether the node can appear on the left of `:let`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable { .. }
                | ExprKind::CurlyName { .. }
                | ExprKind::ConcatOrSubscript { .. }
                | ExprKind::Subscript { .. }
                | ExprKind::Slice { .. }
                | ExprKind::Option { .. }
                | ExprKind::Register(_)
                | ExprKind::EnvironmentVariable(_)
        )
    }
}

/// A parsed expression.
///
/// The tree's spans are byte offsets into `source`, a copy of the text the
/// expression was parsed from; `column` is where that text started in the
/// original line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub source: String,
    pub column: usize,
    pub root: ExprNode,
}

impl Expression {
    /// Source text a span of this expression covers.
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    /// Source text of the whole expression.
    pub fn root_text(&self) -> &str {
        self.text(self.root.span)
    }
}
