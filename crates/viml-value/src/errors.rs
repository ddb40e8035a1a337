//! Legacy error catalog.
//!
//! Every coded message the parser, the translator and the value model can
//! produce lives here, so that the text embedded in generated code and the
//! text reported at parse time never drift apart.

use thiserror::Error;

use crate::heap::{DictId, ListId};

/// A legacy error code together with its message template.
///
/// Templates contain at most one `%s`, filled by [`LegacyError::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyError {
    InvalidExpression,
    NoSuchVariable,
    MissingColonAfterQuestion,
    MissingParen,
    MissingBracket,
    OptionNameMissing,
    UnknownOption,
    MissingDoubleQuote,
    MissingSingleQuote,
    InvalidFunctionArguments,
    UnknownFunction,
    TooManyArguments,
    NotEnoughArguments,
    UndefinedVariable,
    FunctionExists,
    MissingOpenParen,
    IllegalArgument,
    MissingEndFunction,
    FunctionNameCapital,
    FunctionNameRequired,
    DeleteUnknownFunction,
    ReturnOutsideFunction,
    MissingEndLoop,
    MissingMarker,
    MissingEndIf,
    NotInsideFunction,
    IllegalVariableName,
    ArgumentRequired,
    InvalidArgument,
    TrailingCharacters,
    EndIfWithoutIf,
    ElseWithoutIf,
    ElseIfWithoutIf,
    MultipleElse,
    ElseIfAfterElse,
    ContinueOutsideLoop,
    BreakOutsideLoop,
    EndLoopWithoutLoop,
    MissingEndTry,
    EndTryWithoutTry,
    CatchWithoutTry,
    CatchAfterFinally,
    ExceptionNotCaught,
    FinallyWithoutTry,
    MultipleFinally,
    ThrowVimPrefix,
    ListIndexOutOfRange,
    Internal,
    LessTargets,
    MoreTargets,
    MissingCommaInList,
    MissingEndOfList,
    MissingIn,
    NestedTooDeep,
    FuncrefAsNumber,
    FuncrefName,
    ListRequired,
    DictionaryRequired,
    KeyNotPresent,
    SliceOfDictionary,
    MissingColonInDictionary,
    DuplicateKey,
    MissingCommaInDictionary,
    MissingEndOfDictionary,
    DictFunctionWithoutDictionary,
    DictionaryAsNumber,
    FuncrefAsString,
    ListAsString,
    DictionaryAsString,
    EndForWithWhile,
    EndWhileWithFor,
    WrongVariableType,
    TooManyCallArguments,
    ListAsNumber,
    FloatAsNumber,
    FloatAsString,
    DuplicateArgument,
    MissingEndMarker,
}

impl LegacyError {
    /// The numeric `Ennn` code.
    pub fn code(self) -> u16 {
        match self {
            Self::InvalidExpression => 15,
            Self::NoSuchVariable => 108,
            Self::MissingColonAfterQuestion => 109,
            Self::MissingParen => 110,
            Self::MissingBracket => 111,
            Self::OptionNameMissing => 112,
            Self::UnknownOption => 113,
            Self::MissingDoubleQuote => 114,
            Self::MissingSingleQuote => 115,
            Self::InvalidFunctionArguments => 116,
            Self::UnknownFunction => 117,
            Self::TooManyArguments => 118,
            Self::NotEnoughArguments => 119,
            Self::UndefinedVariable => 121,
            Self::FunctionExists => 122,
            Self::MissingOpenParen => 124,
            Self::IllegalArgument => 125,
            Self::MissingEndFunction => 126,
            Self::FunctionNameCapital => 128,
            Self::FunctionNameRequired => 129,
            Self::DeleteUnknownFunction => 130,
            Self::ReturnOutsideFunction => 133,
            Self::MissingEndLoop => 170,
            Self::MissingMarker => 172,
            Self::MissingEndIf => 171,
            Self::NotInsideFunction => 193,
            Self::IllegalVariableName => 461,
            Self::ArgumentRequired => 471,
            Self::InvalidArgument => 475,
            Self::TrailingCharacters => 488,
            Self::EndIfWithoutIf => 580,
            Self::ElseWithoutIf => 581,
            Self::ElseIfWithoutIf => 582,
            Self::MultipleElse => 583,
            Self::ElseIfAfterElse => 584,
            Self::ContinueOutsideLoop => 586,
            Self::BreakOutsideLoop => 587,
            Self::EndLoopWithoutLoop => 588,
            Self::MissingEndTry => 600,
            Self::EndTryWithoutTry => 602,
            Self::CatchWithoutTry => 603,
            Self::CatchAfterFinally => 604,
            Self::ExceptionNotCaught => 605,
            Self::FinallyWithoutTry => 606,
            Self::MultipleFinally => 607,
            Self::ThrowVimPrefix => 608,
            Self::ListIndexOutOfRange => 684,
            Self::Internal => 685,
            Self::LessTargets => 687,
            Self::MoreTargets => 688,
            Self::MissingCommaInList => 696,
            Self::MissingEndOfList => 697,
            Self::MissingIn => 690,
            Self::NestedTooDeep => 698,
            Self::FuncrefAsNumber => 703,
            Self::FuncrefName => 704,
            Self::ListRequired => 714,
            Self::DictionaryRequired => 715,
            Self::KeyNotPresent => 716,
            Self::SliceOfDictionary => 719,
            Self::MissingColonInDictionary => 720,
            Self::DuplicateKey => 721,
            Self::MissingCommaInDictionary => 722,
            Self::MissingEndOfDictionary => 723,
            Self::DictFunctionWithoutDictionary => 725,
            Self::DictionaryAsNumber => 728,
            Self::FuncrefAsString => 729,
            Self::ListAsString => 730,
            Self::DictionaryAsString => 731,
            Self::EndForWithWhile => 732,
            Self::EndWhileWithFor => 733,
            Self::WrongVariableType => 734,
            Self::TooManyCallArguments => 740,
            Self::ListAsNumber => 745,
            Self::FloatAsNumber => 805,
            Self::FloatAsString => 806,
            Self::DuplicateArgument => 853,
            Self::MissingEndMarker => 990,
        }
    }

    /// The message template, without the code.
    pub fn template(self) -> &'static str {
        match self {
            Self::InvalidExpression => "Invalid expression: %s",
            Self::NoSuchVariable => "No such variable: \"%s\"",
            Self::MissingColonAfterQuestion => "Missing ':' after '?'",
            Self::MissingParen => "Missing ')'",
            Self::MissingBracket => "Missing ']'",
            Self::OptionNameMissing => "Option name missing: %s",
            Self::UnknownOption => "Unknown option: %s",
            Self::MissingDoubleQuote | Self::MissingSingleQuote => "Missing quote: %s",
            Self::InvalidFunctionArguments => "Invalid arguments for function %s",
            Self::UnknownFunction => "Unknown function: %s",
            Self::TooManyArguments => "Too many arguments for function: %s",
            Self::NotEnoughArguments => "Not enough arguments for function: %s",
            Self::UndefinedVariable => "Undefined variable: %s",
            Self::FunctionExists => "Function %s already exists, add ! to replace it",
            Self::MissingOpenParen => "Missing '(': %s",
            Self::IllegalArgument => "Illegal argument: %s",
            Self::MissingEndFunction => "Missing :endfunction",
            Self::FunctionNameCapital => "Function name must start with a capital or \"s:\": %s",
            Self::FunctionNameRequired => "Function name required",
            Self::DeleteUnknownFunction => "Unknown function: %s",
            Self::ReturnOutsideFunction => ":return not inside a function",
            Self::MissingEndLoop => "Missing %s",
            Self::MissingMarker => "Missing marker",
            Self::MissingEndIf => "Missing :endif",
            Self::NotInsideFunction => "%s not inside a function",
            Self::IllegalVariableName => "Illegal variable name: %s",
            Self::ArgumentRequired => "Argument required",
            Self::InvalidArgument => "Invalid argument: %s",
            Self::TrailingCharacters => "Trailing characters: %s",
            Self::EndIfWithoutIf => ":endif without :if",
            Self::ElseWithoutIf => ":else without :if",
            Self::ElseIfWithoutIf => ":elseif without :if",
            Self::MultipleElse => "multiple :else",
            Self::ElseIfAfterElse => ":elseif after :else",
            Self::ContinueOutsideLoop => ":continue without :while or :for",
            Self::BreakOutsideLoop => ":break without :while or :for",
            Self::EndLoopWithoutLoop => "%s",
            Self::MissingEndTry => "Missing :endtry",
            Self::EndTryWithoutTry => ":endtry without :try",
            Self::CatchWithoutTry => ":catch without :try",
            Self::CatchAfterFinally => ":catch after :finally",
            Self::ExceptionNotCaught => "Exception not caught: %s",
            Self::FinallyWithoutTry => ":finally without :try",
            Self::MultipleFinally => "multiple :finally",
            Self::ThrowVimPrefix => "Cannot :throw exceptions with 'Vim' prefix",
            Self::ListIndexOutOfRange => "list index out of range: %s",
            Self::Internal => "Internal error: %s",
            Self::LessTargets => "Less targets than List items",
            Self::MoreTargets => "More targets than List items",
            Self::MissingCommaInList => "Missing comma in List: %s",
            Self::MissingEndOfList => "Missing end of List ']': %s",
            Self::MissingIn => "Missing \"in\" after :for",
            Self::NestedTooDeep => "variable nested too deep for making a copy",
            Self::FuncrefAsNumber => "Using a Funcref as a Number",
            Self::FuncrefName => "Funcref variable name must start with a capital: %s",
            Self::ListRequired => "List required",
            Self::DictionaryRequired => "Dictionary required",
            Self::KeyNotPresent => "Key not present in Dictionary: %s",
            Self::SliceOfDictionary => "Cannot use [:] with a Dictionary",
            Self::MissingColonInDictionary => "Missing colon in Dictionary: %s",
            Self::DuplicateKey => "Duplicate key in Dictionary: %s",
            Self::MissingCommaInDictionary => "Missing comma in Dictionary: %s",
            Self::MissingEndOfDictionary => "Missing end of Dictionary '}': %s",
            Self::DictFunctionWithoutDictionary => "Calling dict function without Dictionary: %s",
            Self::DictionaryAsNumber => "Using a Dictionary as a Number",
            Self::FuncrefAsString => "using Funcref as a String",
            Self::ListAsString => "using List as a String",
            Self::DictionaryAsString => "using Dictionary as a String",
            Self::EndForWithWhile => "Using :endfor with :while",
            Self::EndWhileWithFor => "Using :endwhile with :for",
            Self::WrongVariableType => "Wrong variable type for %s=",
            Self::TooManyCallArguments => "Too many arguments for function %s",
            Self::ListAsNumber => "Using a List as a Number",
            Self::FloatAsNumber => "Using a Float as a Number",
            Self::FloatAsString => "using Float as a String",
            Self::DuplicateArgument => "Duplicate argument name: %s",
            Self::MissingEndMarker => "Missing end marker '%s'",
        }
    }

    /// Full message: `Ennn: ` followed by the template with `%s` replaced.
    pub fn message(self, arg: &str) -> String {
        format!("E{}: {}", self.code(), self.template().replacen("%s", arg, 1))
    }

    /// Whether the template takes an argument.
    pub fn takes_argument(self) -> bool {
        self.template().contains("%s")
    }
}

/// Errors raised by [`Heap`](crate::Heap) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("E684: list index out of range: {0}")]
    IndexOutOfRange(i64),

    #[error("E716: Key not present in Dictionary: {0}")]
    KeyNotPresent(String),

    #[error("{}", .0.message(""))]
    Conversion(LegacyError),

    #[error("E698: variable nested too deep for making a copy")]
    NestedTooDeep,

    #[error("E685: Internal error: list {0:?} was already freed")]
    FreedList(ListId),

    #[error("E685: Internal error: dictionary {0:?} was already freed")]
    FreedDict(DictId),
}

impl ValueError {
    /// The catalog entry this error reports.
    pub fn legacy(&self) -> LegacyError {
        match self {
            Self::IndexOutOfRange(_) => LegacyError::ListIndexOutOfRange,
            Self::KeyNotPresent(_) => LegacyError::KeyNotPresent,
            Self::Conversion(err) => *err,
            Self::NestedTooDeep => LegacyError::NestedTooDeep,
            Self::FreedList(_) | Self::FreedDict(_) => LegacyError::Internal,
        }
    }
}
