//! Symbol category builtins: `symbol->string symbol=? symbol?`.

use super::{as_symbol, eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn symbol_to_string(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let s = as_symbol(&values[0], name, pos, 0)?;
    // `s` carries its leading apostrophe from the lexer; strip it for the string value.
    Ok(Value::String(s.strip_prefix('\'').unwrap_or(s).to_string()))
}

fn symbol_eq(name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let a = as_symbol(&values[0], name, pos, 0)?;
    let b = as_symbol(&values[1], name, pos, 1)?;
    Ok(Value::Boolean(a == b))
}

fn symbol_huh(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let _ = pos;
    Ok(Value::Boolean(matches!(&values[0], Value::Symbol(_))))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    entries.insert("symbol->string", Descriptor { arity: ProcArity::Exact(1), call: symbol_to_string });
    entries.insert("symbol?", Descriptor { arity: ProcArity::Exact(1), call: symbol_huh });
    entries.insert("symbol=?", Descriptor { arity: ProcArity::Exact(2), call: symbol_eq });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Position;

    fn pos() -> Position {
        Position { line: 1, column: 1 }
    }

    fn eval_lit(expr: &CheckedExpr, _activation: &Rc<Activation>) -> Result<Value, EvalError> {
        match expr {
            CheckedExpr::Sym(s) => Ok(Value::Symbol(s.clone())),
            other => unreachable!("unexpected literal in symbol test: {other:?}"),
        }
    }

    #[test]
    fn symbol_to_string_strips_quote() {
        let a = Activation::new_program();
        // real `CheckedExpr::Sym`/`Value::Symbol` payloads carry the leading
        // apostrophe baked in by the lexer.
        let args = [CheckedExpr::Sym("'foo".to_string())];
        match symbol_to_string("symbol->string", &args, &a, &eval_lit, pos()).unwrap() {
            Value::String(s) => assert_eq!(s, "foo"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn symbol_eq_compares_names() {
        let a = Activation::new_program();
        let args = [CheckedExpr::Sym("'a".to_string()), CheckedExpr::Sym("'a".to_string())];
        assert!(matches!(symbol_eq("symbol=?", &args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
    }

    #[test]
    fn symbol_huh_rejects_strings() {
        let a = Activation::new_program();
        let eval_str = |expr: &CheckedExpr, _a: &Rc<Activation>| -> Result<Value, EvalError> {
            match expr {
                CheckedExpr::Str(s) => Ok(Value::String(s.clone())),
                _ => unreachable!(),
            }
        };
        let args = [CheckedExpr::Str("foo".to_string())];
        assert!(matches!(symbol_huh("symbol?", &args, &a, &eval_str, pos()).unwrap(), Value::Boolean(false)));
    }
}
