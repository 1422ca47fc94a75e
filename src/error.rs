// ABOUTME: Error types for every phase of the interpreter pipeline

use std::fmt;
use thiserror::Error;

/// A 1-based line/column pair identifying where a diagnostic occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("[{0}] unexpected closing bracket")]
    UnexpectedClosingBracket(Position),

    #[error("[{pos}] incorrect closing bracket: expected {expected} to close preceding {opener}")]
    IncorrectClosingBracket {
        pos: Position,
        expected: char,
        opener: char,
    },

    #[error("[{pos}] expected closing bracket for {opener}")]
    ExpectedClosingBracket { pos: Position, opener: char },

    #[error("[{0}] unterminated block comment")]
    UnterminatedBlockComment(Position),

    #[error("[{0}] expected closing double-quote")]
    UnterminatedString(Position),

    #[error("[{0}] bad syntax")]
    BadSyntax(Position),

    #[error("[{0}] division by zero")]
    DivisionByZero(Position),

    #[error("[{0}] rational denominator must not be negative")]
    InvalidRationalDenominator(Position),

    #[error("[{0}] symbol followed by EOF")]
    SymbolFollowedByEof(Position),

    #[error("[{0}] nested quote is not implemented")]
    NestedQuoteNotImplemented(Position),

    #[error("[{0}] feature not implemented: |identifier|")]
    PipeIdentifierNotImplemented(Position),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedClosingBracket(p) => *p,
            LexError::IncorrectClosingBracket { pos, .. } => *pos,
            LexError::ExpectedClosingBracket { pos, .. } => *pos,
            LexError::UnterminatedBlockComment(p) => *p,
            LexError::UnterminatedString(p) => *p,
            LexError::BadSyntax(p) => *p,
            LexError::DivisionByZero(p) => *p,
            LexError::InvalidRationalDenominator(p) => *p,
            LexError::SymbolFollowedByEof(p) => *p,
            LexError::NestedQuoteNotImplemented(p) => *p,
            LexError::PipeIdentifierNotImplemented(p) => *p,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("[{0}] unexpected end of input")]
    UnexpectedEof(Position),

    #[error("[{pos}] unexpected token: {found}")]
    UnexpectedToken { pos: Position, found: String },

    #[error("[{0}] check-expect requires exactly two expressions")]
    CheckExpectArity(Position),

    #[error("[{0}] define: expected a name")]
    DefineExpectedName(Position),

    #[error("[{0}] define: expected exactly one body expression")]
    DefineBodyArity(Position),

    #[error("[{0}] define-struct: expected a parenthesized list of field names")]
    DefineStructExpectedFields(Position),
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedEof(p) => *p,
            ParseError::UnexpectedToken { pos, .. } => *pos,
            ParseError::CheckExpectArity(p) => *p,
            ParseError::DefineExpectedName(p) => *p,
            ParseError::DefineBodyArity(p) => *p,
            ParseError::DefineStructExpectedFields(p) => *p,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("[{pos}] {name} used before its definition")]
    UsedBeforeDefinition { pos: Position, name: String },

    #[error("[{pos}] {name} is already defined in this scope")]
    PreviouslyDefinedName { pos: Position, name: String },

    #[error("[{pos}] {name} is a built-in name and cannot be redefined")]
    BuiltinOrImportedName { pos: Position, name: String },

    #[error("[{pos}] {name} names a structure type, not a value")]
    UsingStructureType { pos: Position, name: String },

    #[error("[{pos}] cond: expected at least one clause")]
    CondMissingClauses(Position),

    #[error("[{pos}] cond: each clause must have exactly a predicate and an answer")]
    CondMalformedClause(Position),

    #[error("[{pos}] else clause must be the last clause in cond")]
    CondElseNotLast(Position),

    #[error("[{pos}] else is not allowed outside of cond")]
    ElseNotAllowed(Position),

    #[error("[{pos}] {what} is not allowed at top level")]
    NotTopLevel { pos: Position, what: String },

    #[error("[{pos}] duplicate variable: {name}")]
    DuplicateVariable { pos: Position, name: String },

    #[error("[{pos}] {what} is a keyword and cannot be used as a name")]
    ReservedKeyword { pos: Position, what: String },

    #[error("[{pos}] function call: operator is not a function")]
    ExpectedAFunction(Position),
}

impl SemanticError {
    pub fn position(&self) -> Position {
        match self {
            SemanticError::UsedBeforeDefinition { pos, .. } => *pos,
            SemanticError::PreviouslyDefinedName { pos, .. } => *pos,
            SemanticError::BuiltinOrImportedName { pos, .. } => *pos,
            SemanticError::UsingStructureType { pos, .. } => *pos,
            SemanticError::CondMissingClauses(p) => *p,
            SemanticError::CondMalformedClause(p) => *p,
            SemanticError::CondElseNotLast(p) => *p,
            SemanticError::ElseNotAllowed(p) => *p,
            SemanticError::NotTopLevel { pos, .. } => *pos,
            SemanticError::DuplicateVariable { pos, .. } => *pos,
            SemanticError::ReservedKeyword { pos, .. } => *pos,
            SemanticError::ExpectedAFunction(p) => *p,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("[{pos}] {name}: expected {expected}, got {actual}{}", position.map(|i| format!(" at argument {i}")).unwrap_or_default())]
    IncorrectArgumentType {
        pos: Position,
        name: String,
        expected: String,
        actual: String,
        position: Option<usize>,
    },

    #[error("[{pos}] {name}: expected {expected} argument{}, got {actual}", if expected == "1" { "" } else { "s" })]
    ArityMismatch {
        pos: Position,
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("[{0}] division by zero")]
    DivisionByZero(Position),

    #[error("[{pos}] function call: {name} is not a function")]
    NotCallable { pos: Position, name: String },

    #[error("[{pos}] cond: question result is not boolean")]
    QuestionResultNotBoolean { pos: Position },

    #[error("[{0}] cond: all question results were false")]
    AllQuestionResultsFalse(Position),

    #[error("[{pos}] {name} is used before its definition")]
    UndefinedSymbol { pos: Position, name: String },

    #[error("internal interpreter error: {0}")]
    Internal(String),
}

impl EvalError {
    pub fn type_error(pos: Position, name: &str, expected: &str, actual: &str) -> Self {
        EvalError::IncorrectArgumentType {
            pos,
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            position: None,
        }
    }

    pub fn type_error_at(
        pos: Position,
        name: &str,
        expected: &str,
        actual: &str,
        index: usize,
    ) -> Self {
        EvalError::IncorrectArgumentType {
            pos,
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            position: Some(index),
        }
    }

    pub fn arity_error(pos: Position, name: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            pos,
            name: name.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            EvalError::IncorrectArgumentType { pos, .. } => *pos,
            EvalError::ArityMismatch { pos, .. } => *pos,
            EvalError::DivisionByZero(p) => *p,
            EvalError::NotCallable { pos, .. } => *pos,
            EvalError::QuestionResultNotBoolean { pos } => *pos,
            EvalError::AllQuestionResultsFalse(p) => *p,
            EvalError::UndefinedSymbol { pos, .. } => *pos,
            EvalError::Internal(_) => Position::default(),
        }
    }
}

/// Crate-level error unifying every phase so `interpret` can propagate with `?`.
#[derive(Error, Debug, Clone)]
pub enum InterpreterError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl InterpreterError {
    pub fn position(&self) -> Position {
        match self {
            InterpreterError::Lex(e) => e.position(),
            InterpreterError::Parse(e) => e.position(),
            InterpreterError::Semantic(e) => e.position(),
            InterpreterError::Eval(e) => e.position(),
        }
    }

    /// Render as the single-line `[line:column] message` form the entry point exposes.
    pub fn render(&self) -> String {
        let pos = self.position();
        let inner = self.to_string();
        if let Some(rest) = inner.strip_prefix(&format!("[{pos}] ")) {
            format!("[{pos}] {rest}")
        } else {
            format!("[{pos}] {inner}")
        }
    }
}
