//! Tree-walking interpreter over [`CheckedExpr`]/[`CheckedProgram`].
//!
//! Evaluation happens in three passes, mirroring the order the language
//! guarantees: every procedure and structure name is registered in the
//! global activation record before any body runs (so mutually recursive
//! top-level procedures resolve regardless of source order), then plain
//! variable definitions are evaluated in source order, then top-level
//! expressions and `check-expect` forms run, each preserving their own
//! relative source order in the output.
//!
//! Self tail recursion through `if` is elided into an in-place frame
//! rewrite instead of growing the Rust call stack; see [`eval_tail`] and
//! [`call_user_procedure`]. Every other call — including mutual recursion —
//! recurses through ordinary Rust function calls.

use crate::ast::{
    CheckedExpr, CheckedProgram, CheckedStmt, CondBranch, ProcedureEntry, ProcedureTable, StructOp,
    StructOpKind, UserProcedure,
};
use crate::builtins::{self, Registry};
use crate::env::Activation;
use crate::error::{EvalError, InterpreterError, Position};
use crate::lexer::Lexer;
use crate::number::LispNumber;
use crate::parser::Parser;
use crate::scope::ProcArity;
use crate::semantic;
use crate::token;
use crate::value::Value;
use std::rc::Rc;

/// One `check-expect` outcome, with actual/expected already rendered.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub line: usize,
    pub column: usize,
    pub actual: String,
    pub expected: String,
}

/// The result of interpreting one program: either the rendered outputs and
/// test results, or a single diagnostic that short-circuited the pipeline.
#[derive(Debug, Clone, Default)]
pub struct InterpretOutcome {
    pub outputs: Vec<String>,
    pub tests: Vec<CheckResult>,
    pub error: Option<String>,
}

pub fn interpret(source: &str) -> InterpretOutcome {
    match run(source) {
        Ok(outcome) => outcome,
        Err(e) => InterpretOutcome {
            outputs: Vec::new(),
            tests: Vec::new(),
            error: Some(e.render()),
        },
    }
}

/// Bundles the two read-only tables every evaluation step needs, plus the
/// global frame new call frames are rooted at — this dialect has no
/// closures, so a procedure body only ever sees globals and its own
/// parameters, never an intermediate caller's locals.
#[derive(Clone, Copy)]
struct Ctx<'a> {
    registry: &'a Registry,
    procedures: &'a ProcedureTable,
    global: &'a Rc<Activation>,
}

fn run(source: &str) -> Result<InterpretOutcome, InterpreterError> {
    token::check_brackets(source)?;
    let tokens = Lexer::tokenize(source)?;
    let program = Parser::parse_program(tokens)?;
    let (checked, procedures) = semantic::analyze_program(program)?;

    let registry = builtins::build_registry();
    let global = Activation::new_program();
    for name in registry.names() {
        global.define(name, Value::Procedure(name.to_string()));
    }
    global.define("empty", Value::List(Vec::new()));

    for stmt in &checked.statements {
        match stmt {
            CheckedStmt::ProcDef { name, .. } => global.define(name.clone(), Value::Procedure(name.clone())),
            CheckedStmt::StructDef { name, fields } => bind_struct_names(&global, name, fields),
            _ => {}
        }
    }

    let ctx = Ctx {
        registry: &registry,
        procedures: &procedures,
        global: &global,
    };

    let (definitions, expressions, tests) = partition(&checked);

    for stmt in definitions {
        if let CheckedStmt::IdDef { name, value } = stmt {
            let v = eval_expr(value, &global, ctx)?;
            global.define(name.clone(), v);
        }
    }

    let mut outputs = Vec::with_capacity(expressions.len());
    for stmt in expressions {
        if let CheckedStmt::Expr(expr) = stmt {
            outputs.push(eval_expr(expr, &global, ctx)?.to_string());
        }
    }

    let mut results = Vec::with_capacity(tests.len());
    for stmt in tests {
        if let CheckedStmt::CheckExpect { actual, expected, pos } = stmt {
            let a = eval_expr(actual, &global, ctx)?;
            let e = eval_expr(expected, &global, ctx)?;
            results.push(CheckResult {
                passed: a.values_equal(&e),
                line: pos.line,
                column: pos.column,
                actual: a.to_string(),
                expected: e.to_string(),
            });
        }
    }

    Ok(InterpretOutcome {
        outputs,
        tests: results,
        error: None,
    })
}

/// Splits statements into definitions, pure expressions, and tests, each
/// keeping its own relative source order.
fn partition(program: &CheckedProgram) -> (Vec<&CheckedStmt>, Vec<&CheckedStmt>, Vec<&CheckedStmt>) {
    let mut definitions = Vec::new();
    let mut expressions = Vec::new();
    let mut tests = Vec::new();
    for stmt in &program.statements {
        match stmt {
            CheckedStmt::IdDef { .. } => definitions.push(stmt),
            CheckedStmt::ProcDef { .. } | CheckedStmt::StructDef { .. } => {}
            CheckedStmt::Expr(_) => expressions.push(stmt),
            CheckedStmt::CheckExpect { .. } => tests.push(stmt),
        }
    }
    (definitions, expressions, tests)
}

fn bind_struct_names(global: &Rc<Activation>, struct_name: &str, fields: &[String]) {
    let make_name = format!("make-{struct_name}");
    global.define(make_name.clone(), Value::Procedure(make_name));
    let pred_name = format!("{struct_name}?");
    global.define(pred_name.clone(), Value::Procedure(pred_name));
    for field in fields {
        let getter = format!("{struct_name}-{field}");
        global.define(getter.clone(), Value::Procedure(getter));
    }
}

fn eval_expr(expr: &CheckedExpr, activation: &Rc<Activation>, ctx: Ctx) -> Result<Value, EvalError> {
    match expr {
        CheckedExpr::Bool(b) => Ok(Value::Boolean(*b)),
        CheckedExpr::Int(i) => Ok(Value::Number(LispNumber::Integer(i.clone()))),
        CheckedExpr::Rat(r) => Ok(Value::Number(LispNumber::rational(r.numer().clone(), r.denom().clone()))),
        CheckedExpr::Dec(d) => Ok(Value::Number(LispNumber::Inexact(*d))),
        CheckedExpr::Str(s) => Ok(Value::String(s.clone())),
        CheckedExpr::Sym(s) => Ok(Value::Symbol(s.clone())),
        CheckedExpr::Id { name, pos } => activation
            .get(name)
            .ok_or_else(|| EvalError::UndefinedSymbol { pos: *pos, name: name.clone() }),
        CheckedExpr::Cond { branches, else_branch, pos } => {
            eval_cond(branches, else_branch.as_deref(), *pos, activation, ctx)
        }
        CheckedExpr::ProcCall { operator, operator_pos, args, pos } => {
            eval_call(operator, *operator_pos, args, *pos, activation, ctx)
        }
    }
}

fn eval_cond(
    branches: &[CondBranch],
    else_branch: Option<&CheckedExpr>,
    pos: Position,
    activation: &Rc<Activation>,
    ctx: Ctx,
) -> Result<Value, EvalError> {
    for branch in branches {
        let test = eval_expr(&branch.predicate, activation, ctx)?;
        let taken = match test {
            Value::Boolean(b) => b,
            _ => return Err(EvalError::QuestionResultNotBoolean { pos }),
        };
        if taken {
            return eval_expr(&branch.body, activation, ctx);
        }
    }
    match else_branch {
        Some(body) => eval_expr(body, activation, ctx),
        None => Err(EvalError::AllQuestionResultsFalse(pos)),
    }
}

fn eval_call(
    operator: &str,
    operator_pos: Position,
    args: &[CheckedExpr],
    pos: Position,
    activation: &Rc<Activation>,
    ctx: Ctx,
) -> Result<Value, EvalError> {
    let bound = activation
        .get(operator)
        .ok_or_else(|| EvalError::UndefinedSymbol { pos: operator_pos, name: operator.to_string() })?;
    let resolved = match bound {
        Value::Procedure(name) => name,
        _ => return Err(EvalError::NotCallable { pos: operator_pos, name: operator.to_string() }),
    };
    dispatch(&resolved, args, pos, activation, ctx)
}

fn dispatch(
    resolved: &str,
    args: &[CheckedExpr],
    pos: Position,
    activation: &Rc<Activation>,
    ctx: Ctx,
) -> Result<Value, EvalError> {
    let result = if let Some(descriptor) = ctx.registry.get(resolved) {
        check_builtin_arity(resolved, descriptor.arity, args.len(), pos).and_then(|()| {
            let eval_cb = move |e: &CheckedExpr, a: &Rc<Activation>| eval_expr(e, a, ctx);
            (descriptor.call)(resolved, args, activation, &eval_cb, pos)
        })
    } else {
        match ctx.procedures.get(resolved) {
            Some(ProcedureEntry::Struct(op)) => eval_struct_op(resolved, op, args, pos, activation, ctx),
            Some(ProcedureEntry::User(proc)) => call_user_procedure(resolved, proc, args, pos, activation, ctx),
            None => Err(EvalError::Internal(format!("unresolved procedure name: {resolved}"))),
        }
    };
    if let Err(ref e) = result {
        log::warn!("dispatch error at {pos}: {e}");
    }
    result
}

fn check_builtin_arity(name: &str, arity: ProcArity, actual: usize, pos: Position) -> Result<(), EvalError> {
    match arity {
        ProcArity::Exact(expected) if actual != expected => {
            Err(EvalError::arity_error(pos, name, expected.to_string(), actual))
        }
        ProcArity::Range { min, max } => {
            let ok = actual >= min && max.map_or(true, |m| actual <= m);
            if ok {
                Ok(())
            } else {
                let expected = match max {
                    Some(m) if m == min => min.to_string(),
                    Some(m) => format!("{min} to {m}"),
                    None => format!("at least {min}"),
                };
                Err(EvalError::arity_error(pos, name, expected, actual))
            }
        }
        _ => Ok(()),
    }
}

fn eval_struct_op(
    name: &str,
    op: &StructOp,
    args: &[CheckedExpr],
    pos: Position,
    activation: &Rc<Activation>,
    ctx: Ctx,
) -> Result<Value, EvalError> {
    match op.kind {
        StructOpKind::Make => {
            if args.len() != op.field_count {
                return Err(EvalError::arity_error(pos, name, op.field_count.to_string(), args.len()));
            }
            let fields = args
                .iter()
                .map(|a| eval_expr(a, activation, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::StructInstance { tag: op.struct_tag.clone(), fields })
        }
        StructOpKind::Pred => {
            if args.len() != 1 {
                return Err(EvalError::arity_error(pos, name, "1", args.len()));
            }
            let v = eval_expr(&args[0], activation, ctx)?;
            Ok(Value::Boolean(matches!(&v, Value::StructInstance { tag, .. } if *tag == op.struct_tag)))
        }
        StructOpKind::Get(index) => {
            if args.len() != 1 {
                return Err(EvalError::arity_error(pos, name, "1", args.len()));
            }
            match eval_expr(&args[0], activation, ctx)? {
                Value::StructInstance { tag, fields } if tag == op.struct_tag => Ok(fields[index].clone()),
                other => Err(EvalError::type_error(pos, name, &format!("{} structure", op.struct_tag), other.type_name())),
            }
        }
    }
}

/// Calls a user-defined procedure, trampolining self tail recursion through
/// `if` instead of growing the Rust call stack.
fn call_user_procedure(
    name: &str,
    proc: &UserProcedure,
    args: &[CheckedExpr],
    pos: Position,
    activation: &Rc<Activation>,
    ctx: Ctx,
) -> Result<Value, EvalError> {
    if args.len() != proc.params.len() {
        return Err(EvalError::arity_error(pos, name, proc.params.len().to_string(), args.len()));
    }
    let values = args
        .iter()
        .map(|a| eval_expr(a, activation, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let frame = ctx.global.new_call(name.to_string());
    frame.rebind(&proc.params, values);

    loop {
        match eval_tail(&proc.body, &frame, name, ctx)? {
            TailStep::Done(v) => return Ok(v),
            TailStep::Recurse(values) => frame.rebind(&proc.params, values),
        }
    }
}

enum TailStep {
    Done(Value),
    Recurse(Vec<Value>),
}

/// Evaluates `expr` as a procedure body (or the selected arm of a nested
/// `if` within it) in tail position. A `ProcCall` that resolves to
/// `enclosing_proc` itself signals a rewrite instead of recursing; anything
/// else evaluates normally and ends the trampoline.
fn eval_tail(expr: &CheckedExpr, activation: &Rc<Activation>, enclosing_proc: &str, ctx: Ctx) -> Result<TailStep, EvalError> {
    if let CheckedExpr::ProcCall { operator, operator_pos, args, pos } = expr {
        if operator == "if" {
            if args.len() != 3 {
                return Err(EvalError::arity_error(*pos, "if", "3", args.len()));
            }
            let cond = eval_expr(&args[0], activation, ctx)?;
            let taken = match cond {
                Value::Boolean(b) => b,
                other => return Err(EvalError::type_error_at(*pos, "if", "boolean", other.type_name(), 0)),
            };
            let chosen = if taken { &args[1] } else { &args[2] };
            return eval_tail(chosen, activation, enclosing_proc, ctx);
        }

        let bound = activation
            .get(operator)
            .ok_or_else(|| EvalError::UndefinedSymbol { pos: *operator_pos, name: operator.clone() })?;
        let resolved = match bound {
            Value::Procedure(resolved_name) => resolved_name,
            _ => return Err(EvalError::NotCallable { pos: *operator_pos, name: operator.clone() }),
        };

        if resolved == enclosing_proc {
            let expected = match ctx.procedures.get(enclosing_proc) {
                Some(ProcedureEntry::User(p)) => p.params.len(),
                _ => args.len(),
            };
            if args.len() != expected {
                return Err(EvalError::arity_error(*pos, &resolved, expected.to_string(), args.len()));
            }
            let values = args
                .iter()
                .map(|a| eval_expr(a, activation, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TailStep::Recurse(values));
        }

        return Ok(TailStep::Done(dispatch(&resolved, args, *pos, activation, ctx)?));
    }
    Ok(TailStep::Done(eval_expr(expr, activation, ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_a_builtin_call() {
        let out = interpret("(+ 1 2)");
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["3".to_string()]);
    }

    #[test]
    fn defines_resolve_regardless_of_source_order() {
        let out = interpret("(define (f n) (g n)) (define (g n) (+ n 1)) (f 10)");
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["11".to_string()]);
    }

    #[test]
    fn check_expect_records_pass_and_fail() {
        let out = interpret("(check-expect (+ 1 1) 2) (check-expect (+ 1 1) 3)");
        assert_eq!(out.error, None);
        assert_eq!(out.tests.len(), 2);
        assert!(out.tests[0].passed);
        assert!(!out.tests[1].passed);
    }

    #[test]
    fn self_recursion_through_if_does_not_overflow_the_stack() {
        let out = interpret(
            "(define (count-down n) (if (zero? n) 0 (count-down (sub1 n)))) (count-down 200000)",
        );
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["0".to_string()]);
    }

    #[test]
    fn mutual_recursion_still_works_without_tco() {
        let out = interpret(
            "(define (even-p n) (if (zero? n) #t (odd-p (sub1 n)))) \
             (define (odd-p n) (if (zero? n) #f (even-p (sub1 n)))) \
             (even-p 10)",
        );
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["#t".to_string()]);
    }

    #[test]
    fn cond_all_false_is_an_error() {
        let out = interpret("(cond [#f 1] [#f 2])");
        assert!(out.error.is_some());
    }

    #[test]
    fn undefined_name_reports_a_single_line_error() {
        let out = interpret("(foo 1)");
        assert!(out.error.is_some());
        let msg = out.error.unwrap();
        assert!(msg.starts_with('['));
    }

    #[test]
    fn struct_accessors_round_trip() {
        let out = interpret(
            "(define-struct posn (x y)) (define p (make-posn 3 4)) (posn-x p) (posn-y p) (posn? p)",
        );
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["3".to_string(), "4".to_string(), "#t".to_string()]);
    }

    #[test]
    fn aliasing_a_builtin_still_calls_it() {
        let out = interpret("(define f +) (f 1 2)");
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["3".to_string()]);
    }

    #[test]
    fn empty_is_a_value_not_a_procedure() {
        let out = interpret("empty (empty? empty)");
        assert_eq!(out.error, None);
        assert_eq!(out.outputs, vec!["'()".to_string(), "#t".to_string()]);
    }
}
