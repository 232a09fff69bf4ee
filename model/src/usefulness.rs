//! How much of a mined fragment reappears, positionally, inside a program.
//!
//! The `count_*` functions align a fragment against one node slot by slot (never
//! searching for a better slot); the `search_*` functions try that alignment at
//! every node of a subtree. The usefulness of a fragment is the best alignment over the program
//! divided by the fragment's own size.

use crate::program::Program;
use crate::traverse::StructuralSize;
use crate::tree::{Condition, Expression, Statement, StatementKind, Var};

/// Usefulness of an expression fragment, in `[0, 1]`.
pub fn expression_usefulness(fragment: &Expression, program: &Program) -> f64 {
    let mut best = program
        .statements()
        .iter()
        .map(|s| search_expr_in_stmt(fragment, s))
        .max()
        .unwrap_or(0);
    if let Some(ret) = program.return_val() {
        best = best.max(search_expr(fragment, ret));
    }
    best as f64 / fragment.size() as f64
}

/// Usefulness of a statement fragment, in `[0, 1]`.
pub fn statement_usefulness(fragment: &Statement, program: &Program) -> f64 {
    let best = program
        .statements()
        .iter()
        .map(|s| search_stmt(fragment, s))
        .max()
        .unwrap_or(0);
    best as f64 / fragment.size() as f64
}

fn search_stmt(fragment: &Statement, s: &Statement) -> usize {
    let here = count_stmt(fragment, s);
    s.body()
        .iter()
        .map(|inner| search_stmt(fragment, inner))
        .fold(here, usize::max)
}

fn search_expr_in_stmt(fragment: &Expression, s: &Statement) -> usize {
    let body_best = s
        .body()
        .iter()
        .map(|inner| search_expr_in_stmt(fragment, inner))
        .max()
        .unwrap_or(0);
    let own = match &s.kind {
        StatementKind::VarAssignment { var, value } => var_match(fragment, var).max(search_expr(fragment, value)),
        StatementKind::FuncCall(func) => search_expr(fragment, func),
        StatementKind::If { condition, .. } | StatementKind::For { condition, .. } => {
            condition.concrete().map_or(0, |c| search_expr(fragment, c))
        }
        StatementKind::ForEach { container, .. } => search_expr(fragment, container),
    };
    own.max(body_best)
}

fn search_expr(fragment: &Expression, e: &Expression) -> usize {
    let here = count_expr(fragment, e);
    let children = match e {
        Expression::Literal(_) | Expression::Var(_) => 0,
        Expression::Op { left, right, .. } => left
            .as_ref()
            .map_or(0, |l| search_expr(fragment, l))
            .max(search_expr(fragment, right)),
        Expression::Func { args, callee, .. } => args
            .iter()
            .map(|a| search_expr(fragment, a))
            .fold(callee.as_ref().map_or(0, |c| search_expr(fragment, c)), usize::max),
    };
    here.max(children)
}

/// Matches an expression fragment against an assignment target.
fn var_match(fragment: &Expression, var: &Var) -> usize {
    match fragment {
        Expression::Var(v) if v.name == var.name => 1,
        _ => 0,
    }
}

fn count_condition(fragment: &Condition, c: &Condition) -> usize {
    match (fragment.concrete(), c.concrete()) {
        (Some(f), Some(c)) => count_expr(f, c),
        _ => 0,
    }
}

fn count_block(fragment: &[Statement], body: &[Statement]) -> usize {
    fragment.iter().zip(body).map(|(f, s)| count_stmt(f, s)).sum()
}

fn count_stmt(fragment: &Statement, s: &Statement) -> usize {
    match (&fragment.kind, &s.kind) {
        (
            StatementKind::VarAssignment { var: fv, value: fval },
            StatementKind::VarAssignment { var, value },
        ) => {
            let target = usize::from(fv.name == var.name);
            1 + target + count_expr(fval, value)
        }
        (StatementKind::FuncCall(ff), StatementKind::FuncCall(f)) => count_expr(ff, f),
        (
            StatementKind::If {
                condition: fc,
                body: fb,
            },
            StatementKind::If { condition, body },
        )
        | (
            StatementKind::For {
                condition: fc,
                body: fb,
                ..
            },
            StatementKind::For { condition, body, .. },
        ) => 1 + count_condition(fc, condition) + count_block(fb, body),
        (
            StatementKind::ForEach {
                container: fcont,
                body: fb,
                ..
            },
            StatementKind::ForEach { container, body, .. },
        ) => 1 + count_expr(fcont, container) + count_block(fb, body),
        _ => 0,
    }
}

fn count_expr(fragment: &Expression, e: &Expression) -> usize {
    match (fragment, e) {
        (Expression::Literal(f), Expression::Literal(l)) => usize::from(f.code == l.code),
        (Expression::Var(f), Expression::Var(v)) => usize::from(f.name == v.name),
        (
            Expression::Op {
                op: fop,
                left: fleft,
                right: fright,
            },
            Expression::Op { op, left, right },
        ) => {
            if fop != op {
                return 0;
            }
            let lhs = match (fleft, left) {
                (Some(fl), Some(l)) => count_expr(fl, l),
                _ => 0,
            };
            1 + lhs + count_expr(fright, right)
        }
        (
            Expression::Func {
                args: fargs,
                callee: fcallee,
                data: fdata,
            },
            Expression::Func { args, callee, data },
        ) => {
            if fdata != data {
                return 0;
            }
            let callee = match (fcallee, callee) {
                (Some(fc), Some(c)) => count_expr(fc, c),
                _ => 0,
            };
            1 + callee + fargs.iter().zip(args).map(|(f, a)| count_expr(f, a)).sum::<usize>()
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::function::{FunctionData, Kind};
    use crate::tree::{Literal, Operator};
    use crate::types::Type;

    fn int_var(name: &str) -> Expression {
        Expression::var(name, Type::int())
    }

    fn r_plus_i() -> Statement {
        Statement::assign(
            Var::new("r", Type::int()),
            Expression::binary(Operator::Add, int_var("r"), int_var("i")),
        )
    }

    fn sum_loop() -> Statement {
        Statement::for_each(
            "i",
            Type::int(),
            Expression::var("arr", Type::array_of(Type::int())),
            vec![r_plus_i()],
        )
    }

    fn target(statements: Vec<Statement>) -> Program {
        let mut p = Program::new(
            "f",
            Type::int(),
            vec![("arr".to_string(), Type::array_of(Type::int()))],
        );
        for s in statements {
            p.push_statement(s);
        }
        p.set_return(Some(int_var("r")));
        p
    }

    #[test]
    fn verbatim_statement_is_fully_useful() {
        let p = target(vec![sum_loop()]);
        assert_eq!(statement_usefulness(&sum_loop(), &p), 1.0);
    }

    #[test]
    fn nested_occurrence_is_found() {
        let wrapped = Statement::if_then(Condition::Angelic(None), vec![sum_loop()]);
        let p = target(vec![wrapped]);
        assert_eq!(statement_usefulness(&sum_loop(), &p), 1.0);
        assert_eq!(statement_usefulness(&r_plus_i(), &p), 1.0);
    }

    #[test]
    fn absent_root_variant_scores_zero() {
        let p = target(vec![r_plus_i()]);
        assert_eq!(statement_usefulness(&sum_loop(), &p), 0.0);
    }

    #[test]
    fn inner_statement_fragment_scores_its_share() {
        let p = target(vec![r_plus_i()]);
        assert_eq!(statement_usefulness(&r_plus_i(), &p), 1.0);

        let other_value = Statement::assign(
            Var::new("r", Type::int()),
            Expression::binary(Operator::Add, int_var("r"), int_var("j")),
        );
        let p = target(vec![other_value]);
        // assignment, target, `+` and `r` line up; `i` does not
        assert_eq!(statement_usefulness(&r_plus_i(), &p), 4.0 / 5.0);
    }

    #[test]
    fn alignment_is_positional() {
        let a = Statement::call(Expression::func(
            Rc::new(FunctionData::array_op(Kind::ArraySet, Type::int())),
            None,
            vec![int_var("xs"), Expression::literal(Literal::int(0)), int_var("v")],
        ));
        let fragment = Statement::if_then(Condition::Concrete(int_var("b")), vec![r_plus_i(), a.clone()]);
        let swapped = Statement::if_then(Condition::Concrete(int_var("b")), vec![a, r_plus_i()]);
        let p = target(vec![swapped]);
        // only the `if` and its condition align
        let expected = 2.0 / fragment.size() as f64;
        assert_eq!(statement_usefulness(&fragment, &p), expected);
    }

    #[test]
    fn one_sided_angelic_condition_contributes_nothing() {
        let fragment = Statement::if_then(Condition::Concrete(int_var("b")), vec![r_plus_i()]);
        let p = target(vec![Statement::if_then(Condition::Angelic(None), vec![r_plus_i()])]);
        assert_eq!(statement_usefulness(&fragment, &p), 6.0 / 7.0);
    }

    #[test]
    fn expression_fragment_searches_return_and_targets() {
        let p = target(vec![]);
        assert_eq!(expression_usefulness(&int_var("r"), &p), 1.0);

        let p = target(vec![r_plus_i()]);
        let sum = Expression::binary(Operator::Add, int_var("r"), int_var("i"));
        assert_eq!(expression_usefulness(&sum, &p), 1.0);
        let product = Expression::binary(Operator::Mul, int_var("r"), int_var("i"));
        // the root operator differs everywhere, so nothing aligns
        assert_eq!(expression_usefulness(&product, &p), 0.0);
    }
}
