//! Arithmetic builtins over the numeric tower: `+ - * / = < > <= >= abs add1
//! sub1 ceiling floor round sgn sqr sqrt exp log gcd lcm modulo
//! exact->inexact`.

use super::{as_number, eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::number::LispNumber;
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn variadic_fold(
    name: &str,
    args: &[CheckedExpr],
    activation: &Rc<Activation>,
    eval: &Evaluator,
    pos: Position,
    identity: LispNumber,
    op: impl Fn(&LispNumber, &LispNumber) -> LispNumber,
) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let mut acc = identity;
    for (i, v) in values.iter().enumerate() {
        let n = as_number(v, name, pos, i)?;
        acc = op(&acc, n);
    }
    Ok(Value::Number(acc))
}

fn add(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    variadic_fold(name, args, activation, eval, pos, LispNumber::from_i64(0), LispNumber::add)
}

fn sub(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let first = as_number(&values[0], "-", pos, 0)?.clone();
    if values.len() == 1 {
        return Ok(Value::Number(first.negate()));
    }
    let mut acc = first;
    for (i, v) in values.iter().enumerate().skip(1) {
        let n = as_number(v, "-", pos, i)?;
        acc = acc.sub(n);
    }
    Ok(Value::Number(acc))
}

fn mul(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    variadic_fold(name, args, activation, eval, pos, LispNumber::from_i64(1), LispNumber::mul)
}

fn div(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let first = as_number(&values[0], "/", pos, 0)?.clone();
    if values.len() == 1 {
        return LispNumber::from_i64(1)
            .div(&first)
            .map(Value::Number)
            .ok_or(EvalError::DivisionByZero(pos));
    }
    let mut acc = first;
    for (i, v) in values.iter().enumerate().skip(1) {
        let n = as_number(v, "/", pos, i)?;
        acc = acc.div(n).ok_or(EvalError::DivisionByZero(pos))?;
    }
    Ok(Value::Number(acc))
}

fn chained_compare(
    name: &str,
    args: &[CheckedExpr],
    activation: &Rc<Activation>,
    eval: &Evaluator,
    pos: Position,
    cmp: impl Fn(&LispNumber, &LispNumber) -> bool,
) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let mut ok = true;
    for i in 0..values.len() - 1 {
        let a = as_number(&values[i], name, pos, i)?;
        let b = as_number(&values[i + 1], name, pos, i + 1)?;
        ok &= cmp(a, b);
    }
    Ok(Value::Boolean(ok))
}

fn numeric_eq(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    chained_compare(name, args, activation, eval, pos, LispNumber::numeric_eq)
}

fn lt(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    chained_compare(name, args, activation, eval, pos, |a, b| a.numeric_cmp(b).is_lt())
}

fn gt(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    chained_compare(name, args, activation, eval, pos, |a, b| a.numeric_cmp(b).is_gt())
}

fn le(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    chained_compare(name, args, activation, eval, pos, |a, b| a.numeric_cmp(b).is_le())
}

fn ge(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    chained_compare(name, args, activation, eval, pos, |a, b| a.numeric_cmp(b).is_ge())
}

macro_rules! unary_numeric {
    ($fn_name:ident, $method:ident) => {
        fn $fn_name(
            name: &str,
            args: &[CheckedExpr],
            activation: &Rc<Activation>,
            eval: &Evaluator,
            pos: Position,
        ) -> Result<Value, EvalError> {
            let values = eval_args(args, activation, eval)?;
            let n = as_number(&values[0], name, pos, 0)?;
            Ok(Value::Number(n.$method()))
        }
    };
}

unary_numeric!(abs, abs);
unary_numeric!(add1, add1);
unary_numeric!(sub1, sub1);
unary_numeric!(ceiling, ceiling);
unary_numeric!(floor, floor);
unary_numeric!(round, round);
unary_numeric!(sgn, sgn);
unary_numeric!(sqr, sqr);
unary_numeric!(sqrt, sqrt);
unary_numeric!(exp, exp);
unary_numeric!(log, log);
unary_numeric!(exact_to_inexact, exact_to_inexact);

fn modulo(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let a = as_number(&values[0], "modulo", pos, 0)?;
    let b = as_number(&values[1], "modulo", pos, 1)?;
    a.modulo(b).map(Value::Number).ok_or(EvalError::DivisionByZero(pos))
}

fn gcd(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let a = as_number(&values[0], "gcd", pos, 0)?;
    let b = as_number(&values[1], "gcd", pos, 1)?;
    a.gcd(b)
        .map(Value::Number)
        .ok_or_else(|| EvalError::type_error_at(pos, "gcd", "integer", values[0].type_name(), 0))
}

fn lcm(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let a = as_number(&values[0], "lcm", pos, 0)?;
    let b = as_number(&values[1], "lcm", pos, 1)?;
    a.lcm(b)
        .map(Value::Number)
        .ok_or_else(|| EvalError::type_error_at(pos, "lcm", "integer", values[0].type_name(), 0))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    let variadic = ProcArity::Range { min: 0, max: None };
    let at_least_one = ProcArity::Range { min: 1, max: None };

    entries.insert("+", Descriptor { arity: variadic, call: add });
    entries.insert("*", Descriptor { arity: variadic, call: mul });
    entries.insert("-", Descriptor { arity: at_least_one, call: sub });
    entries.insert("/", Descriptor { arity: at_least_one, call: div });
    entries.insert("=", Descriptor { arity: at_least_one, call: numeric_eq });
    entries.insert("<", Descriptor { arity: at_least_one, call: lt });
    entries.insert(">", Descriptor { arity: at_least_one, call: gt });
    entries.insert("<=", Descriptor { arity: at_least_one, call: le });
    entries.insert(">=", Descriptor { arity: at_least_one, call: ge });

    let unary = ProcArity::Exact(1);
    entries.insert("abs", Descriptor { arity: unary, call: abs });
    entries.insert("add1", Descriptor { arity: unary, call: add1 });
    entries.insert("sub1", Descriptor { arity: unary, call: sub1 });
    entries.insert("ceiling", Descriptor { arity: unary, call: ceiling });
    entries.insert("floor", Descriptor { arity: unary, call: floor });
    entries.insert("round", Descriptor { arity: unary, call: round });
    entries.insert("sgn", Descriptor { arity: unary, call: sgn });
    entries.insert("sqr", Descriptor { arity: unary, call: sqr });
    entries.insert("sqrt", Descriptor { arity: unary, call: sqrt });
    entries.insert("exp", Descriptor { arity: unary, call: exp });
    entries.insert("log", Descriptor { arity: unary, call: log });
    entries.insert("exact->inexact", Descriptor { arity: unary, call: exact_to_inexact });

    let binary = ProcArity::Exact(2);
    entries.insert("modulo", Descriptor { arity: binary, call: modulo });
    entries.insert("gcd", Descriptor { arity: binary, call: gcd });
    entries.insert("lcm", Descriptor { arity: binary, call: lcm });
}
