//! The checked syntax tree produced by the semantic analyzer: `cond`
//! clauses have been split into predicate/body and a trailing `else`
//! reclassified, every `Id` carries the source position it needs for
//! runtime diagnostics, and struct declarations have been desugared into
//! procedure-table entries rather than inline pseudo-nodes (see
//! [`StructOp`], matching the spec's own design-note realization).
//!
//! Producing a distinct checked type (rather than flipping a
//! "passed-semantic-analysis" bit on the raw tree in place) makes
//! re-analysis a type error instead of a runtime possibility — the
//! interpreter can only ever walk a `CheckedExpr`.

use crate::error::Position;
use num_bigint::BigInt;
use num_rational::BigRational;

#[derive(Debug, Clone)]
pub enum CheckedExpr {
    Bool(bool),
    Int(BigInt),
    Rat(BigRational),
    Dec(f64),
    Str(String),
    Sym(String),
    Id { name: String, pos: Position },
    Cond {
        branches: Vec<CondBranch>,
        else_branch: Option<Box<CheckedExpr>>,
        pos: Position,
    },
    ProcCall {
        operator: String,
        operator_pos: Position,
        args: Vec<CheckedExpr>,
        pos: Position,
    },
}

#[derive(Debug, Clone)]
pub struct CondBranch {
    pub predicate: CheckedExpr,
    pub body: CheckedExpr,
}

#[derive(Debug, Clone)]
pub enum CheckedStmt {
    Expr(CheckedExpr),
    IdDef {
        name: String,
        value: CheckedExpr,
    },
    ProcDef {
        name: String,
        params: Vec<String>,
    },
    StructDef {
        name: String,
        fields: Vec<String>,
    },
    CheckExpect {
        actual: CheckedExpr,
        expected: CheckedExpr,
        pos: Position,
    },
}

#[derive(Debug, Clone)]
pub struct CheckedProgram {
    pub statements: Vec<CheckedStmt>,
}

/// One of the synthesized callables a `define-struct` form produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructOpKind {
    Make,
    Pred,
    Get(usize),
}

#[derive(Debug, Clone)]
pub struct StructOp {
    pub kind: StructOpKind,
    pub struct_tag: String,
    /// Field count of the structure type, needed to check `make-S`'s arity
    /// at call time since every struct pseudo-procedure shares this one type.
    pub field_count: usize,
}

/// A user-defined procedure's formal parameters and body, keyed by name in
/// [`ProcedureTable`]. Procedure bodies never change after semantic
/// analysis, so the table is read-only during evaluation — the same
/// invariant the scope table itself carries.
#[derive(Debug, Clone)]
pub struct UserProcedure {
    pub params: Vec<String>,
    pub body: CheckedExpr,
}

/// Either half of a callable name the semantic analyzer can register: a
/// user-written procedure, or one of the four pseudo-procedures a
/// `define-struct` synthesizes.
#[derive(Debug, Clone)]
pub enum ProcedureEntry {
    User(UserProcedure),
    Struct(StructOp),
}

/// Maps every non-builtin callable name to its definition. Populated by the
/// semantic analyzer, consumed read-only by the interpreter.
#[derive(Debug, Clone, Default)]
pub struct ProcedureTable {
    entries: std::collections::HashMap<String, ProcedureEntry>,
}

impl ProcedureTable {
    pub fn new() -> Self {
        ProcedureTable {
            entries: std::collections::HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: ProcedureEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ProcedureEntry> {
        self.entries.get(name)
    }
}
