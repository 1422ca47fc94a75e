//! String category builtins. The dialect exposes only `string?`; there are
//! no string-construction or -manipulation operations in this language.

use super::{eval_args, Descriptor, Evaluator};
use crate::ast::CheckedExpr;
use crate::env::Activation;
use crate::error::{EvalError, Position};
use crate::scope::ProcArity;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

fn string_huh(_name: &str, args: &[CheckedExpr], activation: &Rc<Activation>, eval: &Evaluator, pos: Position) -> Result<Value, EvalError> {
    let values = eval_args(args, activation, eval)?;
    let _ = pos;
    Ok(Value::Boolean(matches!(&values[0], Value::String(_))))
}

pub fn register(entries: &mut HashMap<&'static str, Descriptor>) {
    entries.insert("string?", Descriptor { arity: ProcArity::Exact(1), call: string_huh });
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
            CheckedExpr::Str(s) => Ok(Value::String(s.clone())),
            CheckedExpr::Int(i) => Ok(Value::Number(crate::number::LispNumber::Integer(i.clone()))),
            other => unreachable!("unexpected literal in string test: {other:?}"),
        }
    }

    #[test]
    fn string_huh_accepts_strings() {
        let a = Activation::new_program();
        let args = [CheckedExpr::Str("hi".to_string())];
        assert!(matches!(string_huh("string?", &args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(true)));
    }

    #[test]
    fn string_huh_rejects_numbers() {
        let a = Activation::new_program();
        let args = [CheckedExpr::Int(1.into())];
        assert!(matches!(string_huh("string?", &args, &a, &eval_lit, pos()).unwrap(), Value::Boolean(false)));
    }
}
