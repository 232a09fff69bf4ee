//! Structural walks over expressions, statements and programs.

use std::collections::BTreeSet;

use crate::program::Program;
use crate::tree::{Condition, Expression, Statement, StatementKind};

/// Strict descendants of `e` in pre-order: callee and left operand first.
pub fn sub_expressions(e: &Expression) -> Vec<&Expression> {
    let mut out = Vec::new();
    collect_expressions(e, &mut out);
    out.remove(0);
    out
}

fn collect_expressions<'a>(e: &'a Expression, out: &mut Vec<&'a Expression>) {
    out.push(e);
    match e {
        Expression::Literal(_) | Expression::Var(_) => {}
        Expression::Op { left, right, .. } => {
            if let Some(left) = left {
                collect_expressions(left, out);
            }
            collect_expressions(right, out);
        }
        Expression::Func { args, callee, .. } => {
            if let Some(callee) = callee {
                collect_expressions(callee, out);
            }
            for arg in args {
                collect_expressions(arg, out);
            }
        }
    }
}

/// Strict descendants of `s` in pre-order.
pub fn sub_statements(s: &Statement) -> Vec<&Statement> {
    let mut out = Vec::new();
    collect_statements(s, &mut out);
    out.remove(0);
    out
}

fn collect_statements<'a>(s: &'a Statement, out: &mut Vec<&'a Statement>) {
    out.push(s);
    for inner in s.body() {
        collect_statements(inner, out);
    }
}

/// Every statement and expression of a program that can be mined for reuse.
#[derive(Debug, Default)]
pub struct Fragments<'a> {
    pub statements: Vec<&'a Statement>,
    pub expressions: Vec<&'a Expression>,
}

pub fn fragments(p: &Program) -> Fragments<'_> {
    let mut f = Fragments::default();
    for s in p.statements() {
        statement_fragments(s, &mut f);
    }
    if let Some(ret) = p.return_val() {
        collect_expressions(ret, &mut f.expressions);
    }
    f
}

fn statement_fragments<'a>(s: &'a Statement, f: &mut Fragments<'a>) {
    f.statements.push(s);
    match &s.kind {
        StatementKind::VarAssignment { value, .. } => collect_expressions(value, &mut f.expressions),
        StatementKind::FuncCall(func) => collect_expressions(func, &mut f.expressions),
        // Loop containers are not harvested: on their own they are often ill-typed
        // (think of a key view derived from another collection).
        StatementKind::If { body, .. } | StatementKind::For { body, .. } | StatementKind::ForEach { body, .. } => {
            for inner in body {
                statement_fragments(inner, f);
            }
        }
    }
}

/// Names of all variables a program references.
pub fn used_vars(p: &Program, include_loop_counters: bool) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    for s in p.statements() {
        statement_vars(s, &mut used, include_loop_counters);
    }
    if let Some(ret) = p.return_val() {
        expression_vars(ret, &mut used);
    }
    used
}

pub fn statement_vars(s: &Statement, used: &mut BTreeSet<String>, include_loop_counters: bool) {
    match &s.kind {
        StatementKind::VarAssignment { var, value } => {
            used.insert(var.name.clone());
            expression_vars(value, used);
        }
        StatementKind::FuncCall(func) => expression_vars(func, used),
        StatementKind::If { condition, body } => {
            condition_vars(condition, used);
            for inner in body {
                statement_vars(inner, used, include_loop_counters);
            }
        }
        StatementKind::For {
            var_name,
            is_while,
            condition,
            body,
        } => {
            condition_vars(condition, used);
            for inner in body {
                statement_vars(inner, used, include_loop_counters);
            }
            if include_loop_counters && !is_while {
                used.insert(var_name.clone());
            }
        }
        StatementKind::ForEach {
            var_name,
            container,
            body,
            ..
        } => {
            expression_vars(container, used);
            for inner in body {
                statement_vars(inner, used, include_loop_counters);
            }
            used.insert(var_name.clone());
        }
    }
}

fn condition_vars(c: &Condition, used: &mut BTreeSet<String>) {
    if let Some(e) = c.concrete() {
        expression_vars(e, used);
    }
}

pub fn expression_vars(e: &Expression, used: &mut BTreeSet<String>) {
    match e {
        Expression::Literal(_) => {}
        Expression::Var(var) => {
            used.insert(var.name.clone());
        }
        Expression::Op { left, right, .. } => {
            if let Some(left) = left {
                expression_vars(left, used);
            }
            expression_vars(right, used);
        }
        Expression::Func { args, callee, .. } => {
            if let Some(callee) = callee {
                expression_vars(callee, used);
            }
            for arg in args {
                expression_vars(arg, used);
            }
        }
    }
}

/// Whether any variable occurs in `e`, i.e. it is not a constant computation.
pub fn contains_var(e: &Expression) -> bool {
    match e {
        Expression::Literal(_) => false,
        Expression::Var(_) => true,
        Expression::Op { left, right, .. } => left.as_deref().is_some_and(contains_var) || contains_var(right),
        Expression::Func { args, callee, .. } => {
            callee.as_deref().is_some_and(contains_var) || args.iter().any(contains_var)
        }
    }
}

/// Structural weight, the unit of usefulness and of size-bounded search.
pub trait StructuralSize {
    fn size(&self) -> usize;
}

impl StructuralSize for Expression {
    fn size(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Var(_) => 1,
            Expression::Op { left, right, .. } => 1 + left.as_ref().map_or(0, |l| l.size()) + right.size(),
            Expression::Func { args, callee, .. } => {
                1 + callee.as_ref().map_or(0, |c| c.size()) + args.iter().map(|a| a.size()).sum::<usize>()
            }
        }
    }
}

fn condition_size(c: &Condition) -> usize {
    c.concrete().map_or(0, |e| e.size())
}

fn block_size(body: &[Statement]) -> usize {
    body.iter().map(|s| s.size()).sum()
}

impl StructuralSize for Statement {
    fn size(&self) -> usize {
        match &self.kind {
            // the target name and `=`
            StatementKind::VarAssignment { value, .. } => 2 + value.size(),
            StatementKind::FuncCall(func) => func.size(),
            StatementKind::If { condition, body } | StatementKind::For { condition, body, .. } => {
                1 + condition_size(condition) + block_size(body)
            }
            StatementKind::ForEach { container, body, .. } => 1 + container.size() + block_size(body),
        }
    }
}

impl StructuralSize for Program {
    fn size(&self) -> usize {
        // locals start at their default value, so only the declaration counts
        self.local_vars().len() + block_size(self.statements()) + self.return_val().map_or(0, |r| r.size())
    }
}

/// Number of `if`/`for` nodes whose condition is still angelic.
pub fn angelic_count(p: &Program) -> usize {
    block_angelic_count(p.statements())
}

fn block_angelic_count(body: &[Statement]) -> usize {
    body.iter()
        .map(|s| {
            let own = match &s.kind {
                StatementKind::If { condition, .. } | StatementKind::For { condition, .. } => {
                    usize::from(condition.is_angelic())
                }
                _ => 0,
            };
            own + block_angelic_count(s.body())
        })
        .sum()
}

/// Recomputes display depth: top-level statements at 1, bodies one deeper.
pub fn reset_indents(p: &mut Program) {
    reset_block_indents(p.statements_mut(), 1);
}

fn reset_block_indents(body: &mut [Statement], indent: usize) {
    for s in body {
        s.indent = indent;
        if let Some(inner) = s.body_mut() {
            reset_block_indents(inner, indent + 1);
        }
    }
}
