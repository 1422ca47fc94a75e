//! Runtime values produced by the interpreter.
//!
//! Distinct from [`crate::syntax::Syntax`] and [`crate::ast::CheckedExpr`]:
//! those are trees over source text, this is what evaluation actually
//! produces. A `List` is a plain vector rather than a cons chain — this
//! dialect never mutates or shares list tails, so there is nothing a cons
//! representation would buy.

use crate::number::LispNumber;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Number(LispNumber),
    String(String),
    Symbol(String),
    /// A reference to a callable by name — user procedure, built-in, or
    /// struct pseudo-procedure. The interpreter resolves the name against
    /// the procedure table at call time; the value itself carries nothing
    /// but the name printed in diagnostics and `#<procedure:NAME>`.
    Procedure(String),
    StructInstance { tag: String, fields: Vec<Value> },
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Procedure(_) => "procedure",
            Value::StructInstance { .. } => "struct",
            Value::List(_) => "list",
        }
    }

    /// Structural equality used by `check-expect` and `equal?`-style
    /// comparisons: numbers compare across exactness, lists and struct
    /// instances compare element-wise.
    pub fn values_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.numeric_eq(b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Procedure(a), Value::Procedure(b)) => a == b,
            (
                Value::StructInstance { tag: t1, fields: f1 },
                Value::StructInstance { tag: t2, fields: f2 },
            ) => t1 == t2 && f1.len() == f2.len() && f1.iter().zip(f2).all(|(a, b)| a.values_equal(b)),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.values_equal(y))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{s}\""),
            // `s` already carries its leading apostrophe from the lexer.
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Procedure(name) => write!(f, "#<procedure:{name}>"),
            Value::StructInstance { tag, .. } => write!(f, "#<{tag}>"),
            Value::List(items) => {
                if items.is_empty() {
                    return write!(f, "'()");
                }
                write!(f, "'(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn boolean_display() {
        assert_eq!(Value::Boolean(true).to_string(), "#t");
        assert_eq!(Value::Boolean(false).to_string(), "#f");
    }

    #[test]
    fn integer_display() {
        let v = Value::Number(LispNumber::Integer(BigInt::from(42)));
        assert_eq!(v.to_string(), "42");
    }

    #[test]
    fn string_display_keeps_quotes() {
        assert_eq!(Value::String("hi".to_string()).to_string(), "\"hi\"");
    }

    #[test]
    fn symbol_display_has_quote_prefix() {
        // the lexer bakes the apostrophe into the symbol's payload; Display
        // must not prepend a second one.
        assert_eq!(Value::Symbol("'foo".to_string()).to_string(), "'foo");
    }

    #[test]
    fn empty_list_display() {
        assert_eq!(Value::List(vec![]).to_string(), "'()");
    }

    #[test]
    fn nonempty_list_display() {
        let v = Value::List(vec![
            Value::Number(LispNumber::Integer(BigInt::from(1))),
            Value::Number(LispNumber::Integer(BigInt::from(2))),
        ]);
        assert_eq!(v.to_string(), "'(1 2)");
    }

    #[test]
    fn struct_instance_display_is_fieldless() {
        let v = Value::StructInstance {
            tag: "posn".to_string(),
            fields: vec![
                Value::Number(LispNumber::Integer(BigInt::from(1))),
                Value::Number(LispNumber::Integer(BigInt::from(2))),
            ],
        };
        assert_eq!(v.to_string(), "#<posn>");
    }

    #[test]
    fn procedure_display() {
        assert_eq!(Value::Procedure("f".to_string()).to_string(), "#<procedure:f>");
    }

    #[test]
    fn structural_equality_across_exactness() {
        let a = Value::Number(LispNumber::Integer(BigInt::from(1)));
        let b = Value::Number(LispNumber::Inexact(1.0));
        assert!(a.values_equal(&b));
    }
}
