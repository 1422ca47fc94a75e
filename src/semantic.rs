//! Semantic analyzer: enforces the static language rules and lowers
//! [`Syntax`]/[`Program`] into [`CheckedExpr`]/[`CheckedProgram`].
//!
//! Top-level names are registered in a preprocessing pass before any body is
//! analyzed, so mutually-referencing top-level procedures resolve regardless
//! of source order; the runtime activation-record lookup (not this pass)
//! is what fails if a forward reference is actually *evaluated* before its
//! definition runs.

use crate::ast::{
    CheckedExpr, CheckedProgram, CheckedStmt, CondBranch, ProcedureEntry, ProcedureTable,
    StructOp, StructOpKind, UserProcedure,
};
use crate::builtins;
use crate::error::{Position, SemanticError};
use crate::parser::is_keyword;
use crate::scope::{ProcArity, ScopeTable, Symbol};
use crate::syntax::{CondClauseRaw, Program, Syntax};
use std::rc::Rc;

pub fn analyze_program(program: Program) -> Result<(CheckedProgram, ProcedureTable), SemanticError> {
    let builtin_scope = ScopeTable::new_root("builtins", 0);
    let registry = builtins::build_registry();
    for name in registry.names() {
        let arity = registry.get(name).expect("name came from this registry").arity;
        builtin_scope.define(name, Symbol::Proc { arity });
    }
    builtin_scope.define("empty", Symbol::Ambiguous);
    let global = builtin_scope.child("global");

    let mut procedures = ProcedureTable::new();
    preprocess(&global, &program.statements, &mut procedures)?;

    let mut statements = Vec::with_capacity(program.statements.len());
    for stmt in &program.statements {
        statements.push(analyze_statement(&global, stmt, &mut procedures)?);
    }

    Ok((CheckedProgram { statements }, procedures))
}

/// Registers every top-level name before any body is analyzed.
fn preprocess(
    global: &Rc<ScopeTable>,
    statements: &[Syntax],
    procedures: &mut ProcedureTable,
) -> Result<(), SemanticError> {
    for stmt in statements {
        match stmt {
            Syntax::IdAssign { name, name_token, .. } => {
                check_new_name(global, name, name_token.pos)?;
                global.define(name.clone(), Symbol::Ambiguous);
            }
            Syntax::ProcAssign {
                name,
                name_token,
                params,
                ..
            } => {
                check_new_name(global, name, name_token.pos)?;
                let mut seen = std::collections::HashSet::new();
                for (param, tok) in params {
                    if is_keyword(param) {
                        return Err(SemanticError::ReservedKeyword {
                            pos: tok.pos,
                            what: param.clone(),
                        });
                    }
                    if !seen.insert(param.clone()) {
                        return Err(SemanticError::DuplicateVariable {
                            pos: tok.pos,
                            name: param.clone(),
                        });
                    }
                }
                global.define(
                    name.clone(),
                    Symbol::Proc {
                        arity: ProcArity::Exact(params.len()),
                    },
                );
            }
            Syntax::StructAssign {
                name,
                name_token,
                fields,
                ..
            } => {
                register_struct(global, name, name_token.pos, fields, procedures)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn register_struct(
    global: &Rc<ScopeTable>,
    struct_name: &str,
    pos: Position,
    fields: &[(String, crate::token::Token)],
    procedures: &mut ProcedureTable,
) -> Result<(), SemanticError> {
    if is_keyword(struct_name) {
        return Err(SemanticError::ReservedKeyword {
            pos,
            what: struct_name.to_string(),
        });
    }
    let mut seen = std::collections::HashSet::new();
    for (field, tok) in fields {
        if is_keyword(field) {
            return Err(SemanticError::ReservedKeyword {
                pos: tok.pos,
                what: field.clone(),
            });
        }
        if !seen.insert(field.clone()) {
            return Err(SemanticError::DuplicateVariable {
                pos: tok.pos,
                name: field.clone(),
            });
        }
    }

    let make_name = format!("make-{struct_name}");
    let pred_name = format!("{struct_name}?");
    let mut getter_names = Vec::with_capacity(fields.len());
    for (field, _) in fields {
        getter_names.push(format!("{struct_name}-{field}"));
    }

    check_new_name(global, &make_name, pos)?;
    check_new_name(global, &pred_name, pos)?;
    for getter in &getter_names {
        check_new_name(global, getter, pos)?;
    }
    check_new_name(global, struct_name, pos)?;

    let field_count = fields.len();
    global.define(
        make_name.clone(),
        Symbol::StructProc(StructOp {
            kind: StructOpKind::Make,
            struct_tag: struct_name.to_string(),
            field_count,
        }),
    );
    global.define(
        pred_name.clone(),
        Symbol::StructProc(StructOp {
            kind: StructOpKind::Pred,
            struct_tag: struct_name.to_string(),
            field_count,
        }),
    );
    for (index, getter) in getter_names.iter().enumerate() {
        global.define(
            getter.clone(),
            Symbol::StructProc(StructOp {
                kind: StructOpKind::Get(index),
                struct_tag: struct_name.to_string(),
                field_count,
            }),
        );
    }
    global.define(struct_name.to_string(), Symbol::StructType);

    procedures.insert(
        make_name.clone(),
        ProcedureEntry::Struct(StructOp {
            kind: StructOpKind::Make,
            struct_tag: struct_name.to_string(),
            field_count,
        }),
    );
    procedures.insert(
        pred_name.clone(),
        ProcedureEntry::Struct(StructOp {
            kind: StructOpKind::Pred,
            struct_tag: struct_name.to_string(),
            field_count,
        }),
    );
    for (index, getter) in getter_names.into_iter().enumerate() {
        procedures.insert(
            getter,
            ProcedureEntry::Struct(StructOp {
                kind: StructOpKind::Get(index),
                struct_tag: struct_name.to_string(),
                field_count,
            }),
        );
    }
    Ok(())
}

/// A name is rejected if it is already bound in this exact scope, or if it
/// would shadow a built-in (found only in the level-0 scope).
fn check_new_name(scope: &Rc<ScopeTable>, name: &str, pos: Position) -> Result<(), SemanticError> {
    if scope.defined_locally(name) {
        return Err(SemanticError::PreviouslyDefinedName {
            pos,
            name: name.to_string(),
        });
    }
    if let Some((_, level)) = scope.resolve_with_level(name) {
        if level == 0 {
            return Err(SemanticError::BuiltinOrImportedName {
                pos,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn analyze_statement(
    scope: &Rc<ScopeTable>,
    stmt: &Syntax,
    procedures: &mut ProcedureTable,
) -> Result<CheckedStmt, SemanticError> {
    match stmt {
        Syntax::IdAssign { name, value, .. } => {
            let checked_value = analyze_expr(scope, value)?;
            Ok(CheckedStmt::IdDef {
                name: name.clone(),
                value: checked_value,
            })
        }
        Syntax::ProcAssign {
            name, params, body, ..
        } => {
            let proc_scope = scope.child(name.clone());
            for (param, _) in params {
                proc_scope.define(param.clone(), Symbol::Ambiguous);
            }
            let checked_body = analyze_expr(&proc_scope, body)?;
            let param_names: Vec<String> = params.iter().map(|(n, _)| n.clone()).collect();
            procedures.insert(
                name.clone(),
                ProcedureEntry::User(UserProcedure {
                    params: param_names.clone(),
                    body: checked_body,
                }),
            );
            Ok(CheckedStmt::ProcDef {
                name: name.clone(),
                params: param_names,
            })
        }
        Syntax::StructAssign { name, fields, .. } => Ok(CheckedStmt::StructDef {
            name: name.clone(),
            fields: fields.iter().map(|(n, _)| n.clone()).collect(),
        }),
        Syntax::CheckExpect {
            actual,
            expected,
            token,
        } => {
            let checked_actual = analyze_expr(scope, actual)?;
            let checked_expected = analyze_expr(scope, expected)?;
            Ok(CheckedStmt::CheckExpect {
                actual: checked_actual,
                expected: checked_expected,
                pos: token.pos,
            })
        }
        other => Ok(CheckedStmt::Expr(analyze_expr(scope, other)?)),
    }
}

fn analyze_expr(scope: &Rc<ScopeTable>, expr: &Syntax) -> Result<CheckedExpr, SemanticError> {
    match expr {
        Syntax::Bool(b, _) => Ok(CheckedExpr::Bool(*b)),
        Syntax::Int(i, _) => Ok(CheckedExpr::Int(i.clone())),
        Syntax::Rat(r, _) => Ok(CheckedExpr::Rat(r.clone())),
        Syntax::Dec(d, _) => Ok(CheckedExpr::Dec(*d)),
        Syntax::Str(s, _) => Ok(CheckedExpr::Str(s.clone())),
        Syntax::Sym(s, _) => Ok(CheckedExpr::Sym(s.clone())),
        Syntax::Id(name, tok) => {
            if name == "else" {
                return Err(SemanticError::ElseNotAllowed(tok.pos));
            }
            if is_keyword(name) {
                return Err(SemanticError::NotTopLevel {
                    pos: tok.pos,
                    what: name.clone(),
                });
            }
            match scope.resolve(name) {
                None => Err(SemanticError::UsedBeforeDefinition {
                    pos: tok.pos,
                    name: name.clone(),
                }),
                Some(Symbol::StructType) => Err(SemanticError::UsingStructureType {
                    pos: tok.pos,
                    name: name.clone(),
                }),
                Some(_) => Ok(CheckedExpr::Id {
                    name: name.clone(),
                    pos: tok.pos,
                }),
            }
        }
        Syntax::Cond { clauses, token } => analyze_cond(scope, clauses, token.pos),
        Syntax::ProcCall {
            operator,
            args,
            token,
        } => analyze_proc_call(scope, operator, args, token.pos),
        Syntax::IdAssign { token, .. } | Syntax::ProcAssign { token, .. } => {
            Err(SemanticError::NotTopLevel {
                pos: token.pos,
                what: "define".to_string(),
            })
        }
        Syntax::StructAssign { token, .. } => Err(SemanticError::NotTopLevel {
            pos: token.pos,
            what: "define-struct".to_string(),
        }),
        Syntax::CheckExpect { token, .. } => Err(SemanticError::NotTopLevel {
            pos: token.pos,
            what: "check-expect".to_string(),
        }),
    }
}

fn analyze_cond(
    scope: &Rc<ScopeTable>,
    clauses: &[CondClauseRaw],
    pos: Position,
) -> Result<CheckedExpr, SemanticError> {
    if clauses.is_empty() {
        return Err(SemanticError::CondMissingClauses(pos));
    }

    let mut branches = Vec::new();
    let mut else_branch = None;
    let last_index = clauses.len() - 1;

    for (i, clause) in clauses.iter().enumerate() {
        let is_else_head = matches!(clause.exprs.first(), Some(Syntax::Id(n, _)) if n == "else");
        if is_else_head {
            if i != last_index {
                return Err(SemanticError::CondElseNotLast(clause.token.pos));
            }
            if clause.exprs.len() != 2 {
                return Err(SemanticError::CondMalformedClause(clause.token.pos));
            }
            else_branch = Some(Box::new(analyze_expr(scope, &clause.exprs[1])?));
            continue;
        }
        if clause.exprs.len() != 2 {
            return Err(SemanticError::CondMalformedClause(clause.token.pos));
        }
        let predicate = analyze_expr(scope, &clause.exprs[0])?;
        let body = analyze_expr(scope, &clause.exprs[1])?;
        branches.push(CondBranch { predicate, body });
    }

    Ok(CheckedExpr::Cond {
        branches,
        else_branch,
        pos,
    })
}

fn analyze_proc_call(
    scope: &Rc<ScopeTable>,
    operator: &Syntax,
    args: &[Syntax],
    pos: Position,
) -> Result<CheckedExpr, SemanticError> {
    let (operator_name, operator_pos) = match operator {
        Syntax::Id(name, tok) => (name.clone(), tok.pos),
        other => return Err(SemanticError::ExpectedAFunction(other.token().pos)),
    };

    if operator_name == "else" {
        return Err(SemanticError::ElseNotAllowed(operator_pos));
    }
    if is_keyword(&operator_name) {
        return Err(SemanticError::NotTopLevel {
            pos: operator_pos,
            what: operator_name,
        });
    }

    match scope.resolve(&operator_name) {
        None => {
            return Err(SemanticError::UsedBeforeDefinition {
                pos: operator_pos,
                name: operator_name,
            })
        }
        Some(Symbol::StructType) => {
            return Err(SemanticError::UsingStructureType {
                pos: operator_pos,
                name: operator_name,
            })
        }
        Some(_) => {}
    }

    let mut checked_args = Vec::with_capacity(args.len());
    for arg in args {
        checked_args.push(analyze_expr(scope, arg)?);
    }

    Ok(CheckedExpr::ProcCall {
        operator: operator_name,
        operator_pos,
        args: checked_args,
        pos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn analyze(src: &str) -> Result<(CheckedProgram, ProcedureTable), SemanticError> {
        let tokens = Lexer::tokenize(src).unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        analyze_program(program)
    }

    #[test]
    fn resolves_a_builtin_call() {
        assert!(analyze("(+ 1 2)").is_ok());
    }

    #[test]
    fn undefined_identifier_is_an_error() {
        assert!(matches!(
            analyze("(foo 1)"),
            Err(SemanticError::UsedBeforeDefinition { .. })
        ));
    }

    #[test]
    fn mutually_recursive_top_level_procedures_resolve() {
        let result = analyze(
            "(define (even-p n) (if (= n 0) #t (odd-p (sub1 n)))) \
             (define (odd-p n) (if (= n 0) #f (even-p (sub1 n))))",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn redefining_a_name_is_an_error() {
        assert!(matches!(
            analyze("(define x 1) (define x 2)"),
            Err(SemanticError::PreviouslyDefinedName { .. })
        ));
    }

    #[test]
    fn redefining_a_builtin_is_an_error() {
        assert!(matches!(
            analyze("(define + 1)"),
            Err(SemanticError::BuiltinOrImportedName { .. })
        ));
    }

    #[test]
    fn duplicate_formal_parameter_is_an_error() {
        assert!(matches!(
            analyze("(define (f x x) x)"),
            Err(SemanticError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn struct_synthesizes_four_bindings() {
        let (_, procedures) = analyze("(define-struct posn (x y)) (make-posn 1 2)").unwrap();
        assert!(procedures.get("make-posn").is_some());
        assert!(procedures.get("posn-x").is_some());
        assert!(procedures.get("posn-y").is_some());
    }

    #[test]
    fn using_struct_type_as_value_is_an_error() {
        assert!(matches!(
            analyze("(define-struct posn (x y)) posn"),
            Err(SemanticError::UsingStructureType { .. })
        ));
    }

    #[test]
    fn else_outside_cond_is_not_allowed() {
        assert!(matches!(
            analyze("(+ else 1)"),
            Err(SemanticError::ElseNotAllowed(_))
        ));
    }

    #[test]
    fn cond_else_must_be_last() {
        assert!(matches!(
            analyze("(cond [else 1] [#t 2])"),
            Err(SemanticError::CondElseNotLast(_))
        ));
    }

    #[test]
    fn cond_requires_at_least_one_clause() {
        let tokens = Lexer::tokenize("(cond)").unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        assert!(matches!(
            analyze_program(program),
            Err(SemanticError::CondMissingClauses(_))
        ));
    }

    #[test]
    fn malformed_cond_clause_is_an_error() {
        assert!(matches!(
            analyze("(cond [#t 1 2])"),
            Err(SemanticError::CondMalformedClause(_))
        ));
    }

    #[test]
    fn non_identifier_operator_is_not_a_function() {
        assert!(matches!(
            analyze("(1 2 3)"),
            Err(SemanticError::ExpectedAFunction(_))
        ));
    }
}
