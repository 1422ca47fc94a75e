//! Runtime call-stack of activation records, each binding names to values.
//!
//! Adapted from the scope-chain environment this crate also uses at
//! compile time ([`crate::scope::ScopeTable`]), but simpler: there is no
//! `set!` in this language, so a binding once made in a frame never
//! changes except by the tail-call frame rewrite (see [`Activation::rebind`]).

use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Program,
    Procedure,
}

#[derive(Debug)]
pub struct Activation {
    pub name: String,
    pub kind: ActivationKind,
    pub level: usize,
    pub enclosing: Option<Rc<Activation>>,
    bindings: RefCell<Vec<(String, Value)>>,
}

impl Activation {
    pub fn new_program() -> Rc<Self> {
        Rc::new(Activation {
            name: "program".to_string(),
            kind: ActivationKind::Program,
            level: 1,
            enclosing: None,
            bindings: RefCell::new(Vec::new()),
        })
    }

    pub fn new_call(self: &Rc<Self>, name: impl Into<String>) -> Rc<Self> {
        Rc::new(Activation {
            name: name.into(),
            kind: ActivationKind::Procedure,
            level: self.level + 1,
            enclosing: Some(Rc::clone(self)),
            bindings: RefCell::new(Vec::new()),
        })
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut bindings = self.bindings.borrow_mut();
        if let Some(slot) = bindings.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            bindings.push((name, value));
        }
    }

    /// Looks up `name` starting at this frame and walking outward.
    pub fn get(self: &Rc<Self>, name: &str) -> Option<Value> {
        if let Some((_, v)) = self.bindings.borrow().iter().find(|(n, _)| n == name) {
            return Some(v.clone());
        }
        self.enclosing.as_ref().and_then(|e| e.get(name))
    }

    /// Overwrites this frame's parameter bindings in place for tail-call
    /// self-recursion — the one mutation this language performs, confined
    /// to the evaluator's own bookkeeping rather than user-visible state.
    pub fn rebind(&self, params: &[String], values: Vec<Value>) {
        let mut bindings = self.bindings.borrow_mut();
        bindings.clear();
        for (name, value) in params.iter().cloned().zip(values) {
            bindings.push((name, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::LispNumber;
    use num_bigint::BigInt;

    fn num(n: i64) -> Value {
        Value::Number(LispNumber::Integer(BigInt::from(n)))
    }

    #[test]
    fn define_and_get() {
        let top = Activation::new_program();
        top.define("x", num(42));
        assert!(matches!(top.get("x"), Some(Value::Number(_))));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let top = Activation::new_program();
        assert!(top.get("undefined").is_none());
    }

    #[test]
    fn call_frame_sees_enclosing_bindings() {
        let top = Activation::new_program();
        top.define("x", num(1));
        let call = top.new_call("f");
        call.define("y", num(2));
        assert!(call.get("x").is_some());
        assert!(call.get("y").is_some());
    }

    #[test]
    fn call_frame_shadows_enclosing() {
        let top = Activation::new_program();
        top.define("x", num(1));
        let call = top.new_call("f");
        call.define("x", num(99));
        match call.get("x") {
            Some(Value::Number(n)) => assert!(n.numeric_eq(&LispNumber::Integer(BigInt::from(99)))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rebind_replaces_all_parameter_bindings() {
        let top = Activation::new_program();
        let call = top.new_call("f");
        call.define("a", num(1));
        call.define("b", num(2));
        call.rebind(&["a".to_string(), "b".to_string()], vec![num(10), num(20)]);
        match call.get("a") {
            Some(Value::Number(n)) => assert!(n.numeric_eq(&LispNumber::Integer(BigInt::from(10)))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
