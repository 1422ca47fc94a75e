//! Logical builtins: `and or not boolean=? boolean->string false?`.
//!
//! `and`/`or` short-circuit by evaluating their own arguments one at a
//! time instead of going through `eval_args` — the same shape `if` uses.

use super::{as_boolean, eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn and(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    for arg in args {
        let v = eval(arg, activation)?;
        if !as_boolean(&v, name, pos, 0)? {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn or(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    for arg in args {
        let v = eval(arg, activation)?;
        if as_boolean(&v, name, pos, 0)? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn not(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let b = as_boolean(&values[0], name, pos, 0)?;
    Ok(Value::Boolean(!b))
}

fn boolean_eq(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let a = as_boolean(&values[0], name, pos, 0)?;
    let b = as_boolean(&values[1], name, pos, 1)?;
    Ok(Value::Boolean(a == b))
}

fn boolean_to_string(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let b = as_boolean(&values[0], name, pos, 0)?;
    Ok(Value::String(if b { "true".to_string() } else { "false".to_string() }))
}

fn false_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let b = as_boolean(&values[0], name, pos, 0)?;
    Ok(Value::Boolean(!b))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    let variadic = ProcArity::Range { min: 0, max: None };
    entries.insert("and", Descriptor { arity: variadic, call: and });
    entries.insert("or", Descriptor { arity: variadic, call: or });

    let unary = ProcArity::Exact(1);
    entries.insert("not", Descriptor { arity: unary, call: not });
    entries.insert("boolean->string", Descriptor { arity: unary, call: boolean_to_string });
    entries.insert("false?", Descriptor { arity: unary, call: false_huh });

    entries.insert("boolean=?", Descriptor { arity: ProcArity::Exact(2), call: boolean_eq });
}
