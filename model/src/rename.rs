use std::collections::HashMap;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::program::Program;
use crate::tree::{Condition, Expression, Statement, StatementKind, Var};

/// Old name to new name.
pub type Renames = HashMap<String, String>;

/// Applies a fixed renaming to every variable occurrence and binder.
pub trait Substitute {
    fn substitute(&mut self, renames: &Renames);
}

fn rename(name: &mut String, renames: &Renames) {
    if let Some(new) = renames.get(name.as_str()) {
        *name = new.clone();
    }
}

impl Substitute for Var {
    fn substitute(&mut self, renames: &Renames) {
        rename(&mut self.name, renames);
    }
}

impl Substitute for Expression {
    fn substitute(&mut self, renames: &Renames) {
        match self {
            Expression::Literal(_) => {}
            Expression::Var(var) => var.substitute(renames),
            Expression::Op { left, right, .. } => {
                if let Some(left) = left {
                    left.substitute(renames);
                }
                right.substitute(renames);
            }
            Expression::Func { args, callee, .. } => {
                if let Some(callee) = callee {
                    callee.substitute(renames);
                }
                for arg in args {
                    arg.substitute(renames);
                }
            }
        }
    }
}

impl Substitute for Condition {
    fn substitute(&mut self, renames: &Renames) {
        match self {
            Condition::Concrete(e) | Condition::Angelic(Some(e)) => e.substitute(renames),
            Condition::Angelic(None) => {}
        }
    }
}

impl Substitute for Statement {
    fn substitute(&mut self, renames: &Renames) {
        match &mut self.kind {
            StatementKind::VarAssignment { var, value } => {
                var.substitute(renames);
                value.substitute(renames);
            }
            StatementKind::FuncCall(func) => func.substitute(renames),
            StatementKind::If { condition, body } => {
                condition.substitute(renames);
                body.substitute(renames);
            }
            StatementKind::For {
                var_name,
                condition,
                body,
                ..
            } => {
                rename(var_name, renames);
                condition.substitute(renames);
                body.substitute(renames);
            }
            StatementKind::ForEach {
                var_name,
                container,
                body,
                ..
            } => {
                rename(var_name, renames);
                body.substitute(renames);
                container.substitute(renames);
            }
        }
    }
}

impl Substitute for Vec<Statement> {
    fn substitute(&mut self, renames: &Renames) {
        for s in self.iter_mut() {
            s.substitute(renames);
        }
    }
}

impl Substitute for Program {
    /// Also renames the scope maps; the type index is rebuilt on demand instead.
    fn substitute(&mut self, renames: &Renames) {
        self.rename_declared(renames);
        self.statements_mut().substitute(renames);
        if let Some(ret) = self.return_val_mut() {
            ret.substitute(renames);
        }
    }
}

/// A Mutator rewrites a node in place against some context.
pub trait Mutator<T, C> {
    fn mutate(&mut self, obj: &mut T, context: C) -> Result<()>;
}

/// Splices a fragment's variables into a target program's scope.
///
/// Free variables are resolved the first time they are seen and the choice is
/// recorded in `renames`, so every occurrence of one name gets the same
/// replacement. A name is kept when the program already has it at the same type;
/// otherwise a same-typed program variable is picked at random, and failing that
/// a fresh local is declared. Loop and foreach binders that collide with an
/// existing variable are given fresh names.
pub struct CompatibilityMerge<'a, R: Rng> {
    pub renames: &'a mut Renames,
    rng: &'a mut R,
}

impl<'a, R: Rng> CompatibilityMerge<'a, R> {
    pub fn new(renames: &'a mut Renames, rng: &'a mut R) -> Self {
        Self { renames, rng }
    }

    fn merge_var(&mut self, var: &mut Var, p: &mut Program) -> Result<()> {
        if let Some(new) = self.renames.get(&var.name) {
            var.name = new.clone();
            return Ok(());
        }
        if p.var_type(&var.name).as_ref() == Some(&var.ty) {
            return Ok(());
        }
        let same_type: Vec<String> = p
            .variables()
            .into_iter()
            .filter(|(_, ty)| *ty == var.ty)
            .map(|(name, _)| name)
            .collect();
        let replacement = match same_type.choose(&mut *self.rng) {
            Some(existing) => existing.clone(),
            None => {
                let fresh = p.fresh_local_var();
                p.add_local_var(&fresh, var.ty.clone())?;
                fresh
            }
        };
        debug!(from = %var.name, to = %replacement, "resolved fragment variable");
        self.renames.insert(var.name.clone(), replacement.clone());
        var.name = replacement;
        Ok(())
    }

    fn merge_condition(&mut self, c: &mut Condition, p: &mut Program) -> Result<()> {
        match c {
            Condition::Concrete(e) | Condition::Angelic(Some(e)) => self.mutate(e, p),
            Condition::Angelic(None) => Ok(()),
        }
    }

    fn merge_block(&mut self, body: &mut [Statement], p: &mut Program) -> Result<()> {
        for s in body {
            self.mutate(s, &mut *p)?;
        }
        Ok(())
    }
}

impl<'p, R: Rng> Mutator<Expression, &'p mut Program> for CompatibilityMerge<'_, R> {
    fn mutate(&mut self, e: &mut Expression, p: &'p mut Program) -> Result<()> {
        match e {
            Expression::Literal(_) => Ok(()),
            Expression::Var(var) => self.merge_var(var, p),
            Expression::Op { left, right, .. } => {
                if let Some(left) = left {
                    self.mutate(&mut **left, &mut *p)?;
                }
                self.mutate(&mut **right, p)
            }
            Expression::Func { args, callee, .. } => {
                if let Some(callee) = callee {
                    self.mutate(&mut **callee, &mut *p)?;
                }
                for arg in args {
                    self.mutate(arg, &mut *p)?;
                }
                Ok(())
            }
        }
    }
}

impl<'p, R: Rng> Mutator<Statement, &'p mut Program> for CompatibilityMerge<'_, R> {
    fn mutate(&mut self, s: &mut Statement, p: &'p mut Program) -> Result<()> {
        match &mut s.kind {
            StatementKind::VarAssignment { var, value } => {
                self.merge_var(var, p)?;
                self.mutate(value, p)
            }
            StatementKind::FuncCall(func) => self.mutate(func, p),
            StatementKind::If { condition, body } => {
                self.merge_condition(condition, p)?;
                self.merge_block(body, p)
            }
            StatementKind::For {
                var_name,
                is_while,
                condition,
                body,
            } => {
                if !*is_while {
                    if p.is_declared(var_name) {
                        let fresh = p.fresh_loop_var();
                        p.add_loop_var(&fresh)?;
                        self.renames.insert(var_name.clone(), fresh.clone());
                        *var_name = fresh;
                    } else {
                        p.add_loop_var(var_name)?;
                    }
                }
                self.merge_condition(condition, p)?;
                self.merge_block(body, p)
            }
            StatementKind::ForEach {
                var_name,
                var_type,
                container,
                body,
            } => {
                if p.is_declared(var_name) {
                    let fresh = p.fresh_elem_var();
                    p.add_elem_var(&fresh, var_type.clone())?;
                    self.renames.insert(var_name.clone(), fresh.clone());
                    *var_name = fresh;
                } else {
                    p.add_elem_var(var_name, var_type.clone())?;
                }
                self.mutate(container, &mut *p)?;
                self.merge_block(body, p)
            }
        }
    }
}

/// Makes `fragment` safe to splice into `p`, declaring whatever it needs.
pub fn merge_compatible<'a, T, R>(
    fragment: &mut T,
    renames: &'a mut Renames,
    p: &mut Program,
    rng: &'a mut R,
) -> Result<()>
where
    R: Rng,
    CompatibilityMerge<'a, R>: for<'b> Mutator<T, &'b mut Program>,
{
    CompatibilityMerge::new(renames, rng).mutate(fragment, p)
}
