//! List builtins: `cons first rest second ... eighth length list make-list
//! append member reverse list? cons? empty?`.
//!
//! `empty` itself is not registered here — it is a pre-bound value, not a
//! procedure, and is installed directly into the global activation record
//! by the interpreter (see `crate::interpreter`).

use super::{as_list, as_number, eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn cons(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let rest = as_list(&values[1], "cons", pos, 1)?;
    let mut result = Vec::with_capacity(rest.len() + 1);
    result.push(values[0].clone());
    result.extend_from_slice(rest);
    Ok(Value::List(result))
}

fn nth(name: &'static str, index: usize) -> impl Fn(&str, &[CheckedExpr], &Rc<Activation>, &Evaluator, Position) -> Result<Value, EvalError> {
    move |_n, args, activation, eval, pos| {
        let values = eval_args(args, activation, eval)?;
        let items = as_list(&values[0], name, pos, 0)?;
        items
            .get(index)
            .cloned()
            .ok_or_else(|| EvalError::type_error_at(pos, name, &format!("list of at least {} elements", index + 1), "shorter list", 0))
    }
}

fn first(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    nth("first", 0)(name, args, activation, eval, pos)
}

fn rest(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let items = as_list(&values[0], "rest", pos, 0)?;
    if items.is_empty() {
        return Err(EvalError::type_error_at(pos, name, "non-empty list", "empty list", 0));
    }
    Ok(Value::List(items[1..].to_vec()))
}

fn length(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let items = as_list(&values[0], "length", pos, 0)?;
    Ok(Value::Number(crate::number::LispNumber::from_i64(items.len() as i64)))
}

fn list(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, _pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    Ok(Value::List(values))
}

fn make_list(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let n = as_number(&values[0], "make-list", pos, 0)?;
    if !n.is_integer_valued() || n.is_negative() {
        return Err(EvalError::type_error_at(pos, "make-list", "non-negative integer", values[0].type_name(), 0));
    }
    let count = n.to_f64() as usize;
    Ok(Value::List(vec![values[1].clone(); count]))
}

fn append(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let mut result = Vec::new();
    for (i, v) in values.iter().enumerate() {
        let items = as_list(v, "append", pos, i)?;
        result.extend_from_slice(items);
    }
    Ok(Value::List(result))
}

fn member(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let items = as_list(&values[1], "member", pos, 1)?;
    Ok(Value::Boolean(items.iter().any(|item| item.values_equal(&values[0]))))
}

fn reverse(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let items = as_list(&values[0], "reverse", pos, 0)?;
    let mut reversed = items.to_vec();
    reversed.reverse();
    Ok(Value::List(reversed))
}

fn list_huh(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, _pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    Ok(Value::Boolean(matches!(&values[0], Value::List(_))))
}

fn cons_huh(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, _pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    Ok(Value::Boolean(matches!(&values[0], Value::List(items) if !items.is_empty())))
}

fn empty_huh(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let items = as_list(&values[0], "empty?", pos, 0)?;
    Ok(Value::Boolean(items.is_empty()))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    entries.insert("cons", Descriptor { arity: ProcArity::Exact(2), call: cons });
    entries.insert("first", Descriptor { arity: ProcArity::Exact(1), call: first });
    entries.insert("rest", Descriptor { arity: ProcArity::Exact(1), call: rest });

    let ordinals: [(&'static str, usize); 6] = [
        ("second", 1),
        ("third", 2),
        ("fourth", 3),
        ("fifth", 4),
        ("sixth", 5),
        ("seventh", 6),
    ];
    for (name, index) in ordinals {
        entries.insert(name, Descriptor { arity: ProcArity::Exact(1), call: ordinal_fn(name, index) });
    }
    entries.insert("eighth", Descriptor { arity: ProcArity::Exact(1), call: ordinal_fn("eighth", 7) });

    entries.insert("length", Descriptor { arity: ProcArity::Exact(1), call: length });
    entries.insert("list", Descriptor { arity: ProcArity::Range { min: 0, max: None }, call: list });
    entries.insert("make-list", Descriptor { arity: ProcArity::Exact(2), call: make_list });
    entries.insert("append", Descriptor { arity: ProcArity::Range { min: 0, max: None }, call: append });
    entries.insert("member", Descriptor { arity: ProcArity::Exact(2), call: member });
    entries.insert("reverse", Descriptor { arity: ProcArity::Exact(1), call: reverse });
    entries.insert("list?", Descriptor { arity: ProcArity::Exact(1), call: list_huh });
    entries.insert("cons?", Descriptor { arity: ProcArity::Exact(1), call: cons_huh });
    entries.insert("empty?", Descriptor { arity: ProcArity::Exact(1), call: empty_huh });
}

/// Builds the fixed-function-pointer wrapper `nth` needs, for ordinals whose
/// index is known only at registration time.
fn ordinal_fn(name: &'static str, index: usize) -> super::BuiltinFn {
    match (name, index) {
        ("second", 1) => second,
        ("third", 2) => third,
        ("fourth", 3) => fourth,
        ("fifth", 4) => fifth,
        ("sixth", 5) => sixth,
        ("seventh", 6) => seventh,
        ("eighth", 7) => eighth,
        _ => unreachable!("ordinal_fn called with an unregistered name"),
    }
}

fn second(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("second", 1)(n, a, act, e, p)
}
fn third(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("third", 2)(n, a, act, e, p)
}
fn fourth(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("fourth", 3)(n, a, act, e, p)
}
fn fifth(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("fifth", 4)(n, a, act, e, p)
}
fn sixth(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("sixth", 5)(n, a, act, e, p)
}
fn seventh(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("seventh", 6)(n, a, act, e, p)
}
fn eighth(n: &str, a: &[CheckedExpr], act: &Rc<Activation>, e: &Evaluator, p: Position) -> Result<Value, EvalError> {
    nth("eighth", 7)(n, a, act, e, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position { line: 1, column: 1 }
    }

    fn int(n: i64) -> CheckedExpr {
        CheckedExpr::Int(n.into())
    }

    fn eval_lit(expr: &CheckedExpr, _activation: &Rc<Activation>) -> Result<Value, EvalError> {
        match expr {
            CheckedExpr::Int(i) => Ok(Value::Number(crate::number::LispNumber::Integer(i.clone()))),
            CheckedExpr::ProcCall { operator, args, .. } if operator == "list" => {
                let values = args.iter().map(|a| eval_lit(a, _activation)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(values))
            }
            other => unreachable!("unexpected literal in list test: {other:?}"),
        }
    }

    fn list_expr(items: Vec<i64>) -> CheckedExpr {
        CheckedExpr::ProcCall {
            operator: "list".to_string(),
            operator_pos: pos(),
            args: items.into_iter().map(int).collect(),
            pos: pos(),
        }
    }

    #[test]
    fn cons_prepends_element() {
        let a = Activation::new_program();
        let args = [int(1), list_expr(vec![2, 3])];
        match cons("cons", &args, &a, &eval_lit, pos()).unwrap() {
            Value::List(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn first_and_rest_split_the_list() {
        let a = Activation::new_program();
        let args = [list_expr(vec![1, 2, 3])];
        match first("first", &args, &a, &eval_lit, pos()).unwrap() {
            Value::Number(n) => assert!(n.numeric_eq(&crate::number::LispNumber::from_i64(1))),
            other => panic!("unexpected {other:?}"),
        }
        match rest("rest", &args, &a, &eval_lit, pos()).unwrap() {
            Value::List(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rest_of_empty_list_is_an_error() {
        let a = Activation::new_program();
        let args = [list_expr(vec![])];
        assert!(rest("rest", &args, &a, &eval_lit, pos()).is_err());
    }

    #[test]
    fn length_counts_elements() {
        let a = Activation::new_program();
        let args = [list_expr(vec![1, 2, 3])];
        match length("length", &args, &a, &eval_lit, pos()).unwrap() {
            Value::Number(n) => assert!(n.numeric_eq(&crate::number::LispNumber::from_i64(3))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reverse_flips_order() {
        let a = Activation::new_program();
        let args = [list_expr(vec![1, 2, 3])];
        match reverse("reverse", &args, &a, &eval_lit, pos()).unwrap() {
            Value::List(items) => match &items[0] {
                Value::Number(n) => assert!(n.numeric_eq(&crate::number::LispNumber::from_i64(3))),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_huh_detects_empty_list() {
        let a = Activation::new_program();
        let args = [list_expr(vec![])];
        assert!(matches!(empty_huh("empty?", &args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
    }

    #[test]
    fn member_finds_an_equal_element() {
        let a = Activation::new_program();
        let args = [int(2), list_expr(vec![1, 2, 3])];
        assert!(matches!(member("member", &args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
    }
}
