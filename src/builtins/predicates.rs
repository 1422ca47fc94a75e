//! Numeric and boolean type predicates: `zero? positive? negative? odd?
//! even? integer? rational? real? number? exact? boolean?`.
//!
//! `cons?`/`empty?`/`list?` live in `lists.rs` instead, alongside the list
//! constructors they classify. `string?`/`symbol?` live in their own
//! category modules for the same reason.

use super::{as_number, eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::number::LispNumber;
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn numeric_test(
    name: &str,
    args: &[CheckedExpr],
    activation: &Rc<Activation>,
    eval: &Evaluator,
    pos: Position,
    test: impl Fn(&LispNumber) -> bool,
) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let n = as_number(&values[0], name, pos, 0)?;
    Ok(Value::Boolean(test(n)))
}

fn zero_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    numeric_test(name, args, activation, eval, pos, LispNumber::is_zero)
}

fn positive_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    numeric_test(name, args, activation, eval, pos, LispNumber::is_positive)
}

fn negative_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    numeric_test(name, args, activation, eval, pos, LispNumber::is_negative)
}

fn odd_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let n = as_number(&values[0], name, pos, 0)?;
    if !n.is_integer_valued() {
        return Err(EvalError::type_error_at(pos, name, "integer", values[0].type_name(), 0));
    }
    let rem = n.modulo(&LispNumber::from_i64(2)).expect("modulo by nonzero constant");
    Ok(Value::Boolean(!rem.is_zero()))
}

fn even_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let n = as_number(&values[0], name, pos, 0)?;
    if !n.is_integer_valued() {
        return Err(EvalError::type_error_at(pos, name, "integer", values[0].type_name(), 0));
    }
    let rem = n.modulo(&LispNumber::from_i64(2)).expect("modulo by nonzero constant");
    Ok(Value::Boolean(rem.is_zero()))
}

fn integer_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let tested = match &values[0] {
        Value::Number(n) => n.is_integer_valued(),
        _ => false,
    };
    let _ = name;
    let _ = pos;
    Ok(Value::Boolean(tested))
}

fn rational_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let tested = matches!(
        &values[0],
        Value::Number(LispNumber::Integer(_)) | Value::Number(LispNumber::Rational(_))
    ) || matches!(&values[0], Value::Number(LispNumber::Inexact(f)) if f.is_finite());
    let _ = name;
    let _ = pos;
    Ok(Value::Boolean(tested))
}

fn real_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let tested = matches!(&values[0], Value::Number(_));
    let _ = name;
    let _ = pos;
    Ok(Value::Boolean(tested))
}

fn number_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let tested = matches!(&values[0], Value::Number(_));
    let _ = name;
    let _ = pos;
    Ok(Value::Boolean(tested))
}

fn exact_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let n = as_number(&values[0], name, pos, 0)?;
    Ok(Value::Boolean(n.is_exact()))
}

fn boolean_huh(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let tested = matches!(&values[0], Value::Boolean(_));
    let _ = name;
    let _ = pos;
    Ok(Value::Boolean(tested))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    let unary = ProcArity::Exact(1);
    entries.insert("zero?", Descriptor { arity: unary, call: zero_huh });
    entries.insert("positive?", Descriptor { arity: unary, call: positive_huh });
    entries.insert("negative?", Descriptor { arity: unary, call: negative_huh });
    entries.insert("odd?", Descriptor { arity: unary, call: odd_huh });
    entries.insert("even?", Descriptor { arity: unary, call: even_huh });
    entries.insert("integer?", Descriptor { arity: unary, call: integer_huh });
    entries.insert("rational?", Descriptor { arity: unary, call: rational_huh });
    entries.insert("real?", Descriptor { arity: unary, call: real_huh });
    entries.insert("number?", Descriptor { arity: unary, call: number_huh });
    entries.insert("exact?", Descriptor { arity: unary, call: exact_huh });
    entries.insert("boolean?", Descriptor { arity: unary, call: boolean_huh });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CheckedExpr;
    use crate::error::Position;

    fn pos() -> Position {
        Position { line: 1, column: 1 }
    }

    fn int_expr(n: i64) -> CheckedExpr {
        CheckedExpr::Int(n.into())
    }

    fn eval_lit(expr: &CheckedExpr, _activation: &Rc<Activation>) -> Result<Value, EvalError> {
        match expr {
            CheckedExpr::Int(i) => Ok(Value::Number(LispNumber::Integer(i.clone()))),
            CheckedExpr::Rat(r) => Ok(Value::Number(LispNumber::rational(r.numer().clone(), r.denom().clone()))),
            CheckedExpr::Str(s) => Ok(Value::String(s.clone())),
            other => unreachable!("unexpected literal in predicate test: {other:?}"),
        }
    }

    fn activation() -> Rc<Activation> {
        Activation::new_program()
    }

    #[test]
    fn zero_huh_detects_zero() {
        let a = activation();
        let args = [int_expr(0)];
        let result = zero_huh("zero?", &args, &a, &eval_lit, pos()).unwrap();
        assert!(matches!(result, Value::Boolean(true)));
    }

    #[test]
    fn odd_even_classify_integers() {
        let a = activation();
        let odd_args = [int_expr(3)];
        let even_args = [int_expr(4)];
        assert!(matches!(odd_huh("odd?", &odd_args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
        assert!(matches!(even_huh("even?", &even_args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
    }

    #[test]
    fn odd_on_non_integer_is_a_type_error() {
        let a = activation();
        let half = CheckedExpr::Rat(num_rational::BigRational::new(1.into(), 2.into()));
        let args = [half];
        assert!(odd_huh("odd?", &args, &a, &eval_lit, pos()).is_err());
    }

    #[test]
    fn number_huh_rejects_non_numbers() {
        let a = activation();
        let args = [CheckedExpr::Str("hi".to_string())];
        let result = number_huh("number?", &args, &a, &eval_lit, pos()).unwrap();
        assert!(matches!(result, Value::Boolean(false)));
    }
}
