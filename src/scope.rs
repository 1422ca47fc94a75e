//! Compile-time lexical scope tables used by the semantic analyzer.
//!
//! Scope level 0 holds built-in names, level 1 is the global program scope,
//! and each procedure body introduces a fresh level on top of its definition
//! site. Lookup walks outward through `enclosing`.

use crate::ast::StructOp;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Symbol {
    /// A name whose bound entity is decided at runtime by following the
    /// chain of value bindings — ordinary `define`d values, and formal
    /// parameters, both start out ambiguous because `(define f +)` lets any
    /// value alias a procedure.
    Ambiguous,
    /// A user or built-in procedure name, with its formal-parameter count
    /// recorded for arity checking. `params` is `None` for built-ins with a
    /// variable arity range (checked instead against the builtin registry).
    Proc { arity: ProcArity },
    /// A synthesized struct pseudo-procedure (`make-S`, `S?`, `S-field`).
    StructProc(StructOp),
    /// A declared struct type name — not itself callable.
    StructType,
}

#[derive(Debug, Clone, Copy)]
pub enum ProcArity {
    Exact(usize),
    Range { min: usize, max: Option<usize> },
}

pub struct ScopeTable {
    pub name: String,
    pub level: usize,
    pub enclosing: Option<Rc<ScopeTable>>,
    bindings: std::cell::RefCell<HashMap<String, Symbol>>,
    /// Preserves definition order for diagnostics and deterministic iteration.
    order: std::cell::RefCell<Vec<String>>,
}

impl ScopeTable {
    pub fn new_root(name: impl Into<String>, level: usize) -> Rc<Self> {
        Rc::new(ScopeTable {
            name: name.into(),
            level,
            enclosing: None,
            bindings: std::cell::RefCell::new(HashMap::new()),
            order: std::cell::RefCell::new(Vec::new()),
        })
    }

    pub fn child(self: &Rc<Self>, name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        log::debug!("scope push: level={} name={name}", self.level + 1);
        Rc::new(ScopeTable {
            name,
            level: self.level + 1,
            enclosing: Some(Rc::clone(self)),
            bindings: std::cell::RefCell::new(HashMap::new()),
            order: std::cell::RefCell::new(Vec::new()),
        })
    }

    /// True if `name` is already bound in this exact scope (not an
    /// enclosing one) — the test for redefinition errors.
    pub fn defined_locally(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn define(&self, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        self.order.borrow_mut().push(name.clone());
        self.bindings.borrow_mut().insert(name, symbol);
    }

    /// Walks outward from this scope looking for `name`.
    pub fn resolve(self: &Rc<Self>, name: &str) -> Option<Symbol> {
        self.resolve_with_level(name).map(|(sym, _)| sym)
    }

    /// As [`Self::resolve`], but also returns the level of the scope the
    /// name was actually found in — used to tell "redefines a built-in"
    /// apart from ordinary shadowing.
    pub fn resolve_with_level(self: &Rc<Self>, name: &str) -> Option<(Symbol, usize)> {
        if let Some(sym) = self.bindings.borrow().get(name) {
            log::debug!("scope resolve: name={name} level={} kind={}", self.level, symbol_kind(sym));
            return Some((sym.clone(), self.level));
        }
        self.enclosing.as_ref().and_then(|p| p.resolve_with_level(name))
    }
}

impl Drop for ScopeTable {
    fn drop(&mut self) {
        log::debug!("scope pop: level={} name={}", self.level, self.name);
    }
}

fn symbol_kind(symbol: &Symbol) -> &'static str {
    match symbol {
        Symbol::Ambiguous => "ambiguous",
        Symbol::Proc { .. } => "proc",
        Symbol::StructProc(_) => "struct-proc",
        Symbol::StructType => "struct-type",
    }
}
