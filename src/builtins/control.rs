//! Control builtins: `if` and `current-seconds`. `if` is registered here for
//! arity checking and so it is nameable like any other procedure; the
//! interpreter's tail-call trampoline (see `crate::interpreter`) bypasses this
//! entry and evaluates `if`'s selected arm directly when in tail position, to
//! avoid growing the Rust call stack on self-recursion. This handler covers
//! every other case: `if` nested in a non-tail position, or as an argument to
//! another call.

use super::{as_boolean, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::number::LispNumber;
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn if_(
    name: &str,
    args: &[CheckedExpr],
    activation: &Rc<Activation>,
    eval: &Evaluator,
    pos: Position,
) -> Result<Value, EvalError> {
    let cond = eval(&args[0], activation)?;
    let chosen = if as_boolean(&cond, name, pos, 0)? { &args[1] } else { &args[2] };
    eval(chosen, activation)
}

/// The one builtin with an externally observable effect: reads the system
/// clock. Exempted from the language's general prohibition on I/O because
/// it has no way to read input back, only to report elapsed wall-clock time.
fn current_seconds(
    _name: &str,
    _args: &[CheckedExpr],
    _activation: &Rc<Activation>,
    _eval: &Evaluator,
    _pos: Position,
) -> Result<Value, EvalError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Ok(Value::Number(LispNumber::from_i64(secs as i64)))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    entries.insert(
        "if",
        Descriptor {
            arity: ProcArity::Exact(3),
            call: if_,
        },
    );
    entries.insert(
        "current-seconds",
        Descriptor {
            arity: ProcArity::Exact(0),
            call: current_seconds,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position { line: 1, column: 1 }
    }

    fn eval_lit(expr: &CheckedExpr, _activation: &Rc<Activation>) -> Result<Value, EvalError> {
        match expr {
            CheckedExpr::Bool(b) => Ok(Value::Boolean(*b)),
            CheckedExpr::Int(i) => Ok(Value::Number(LispNumber::Integer(i.clone()))),
            other => unreachable!("unexpected literal in control test: {other:?}"),
        }
    }

    #[test]
    fn if_only_evaluates_the_chosen_branch() {
        let a = Activation::new_program();
        let args = [CheckedExpr::Bool(true), CheckedExpr::Int(1.into()), CheckedExpr::Int(2.into())];
        match if_("if", &args, &a, &eval_lit, pos()).unwrap() {
            Value::Number(n) => assert!(n.numeric_eq(&LispNumber::from_i64(1))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn current_seconds_returns_a_nonnegative_integer() {
        let a = Activation::new_program();
        match current_seconds("current-seconds", &[], &a, &eval_lit, pos()).unwrap() {
            Value::Number(n) => assert!(n.is_integer_valued() && !n.is_negative()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
