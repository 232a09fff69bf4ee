use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::emit::{Emit, Emitter};
use crate::encoding::{Encode, Encoder};
use crate::error::{ModelError, Result};
use crate::tree::{Expression, Statement};
use crate::types::Type;

static LOOP_NAMES: [&str; 6] = ["i", "j", "k", "m", "n", "p"];

/// A candidate method body together with its variable bookkeeping.
///
/// Every variable lives in exactly one of the scope maps; `in_scope` holds every
/// name visible in the body and is what fresh names are checked against.
#[derive(Clone, Debug)]
pub struct Program {
    pub name: String,
    pub return_type: Type,
    statements: Vec<Statement>,
    return_val: Option<Expression>,
    params: Vec<(String, Type)>,
    local_vars: BTreeMap<String, Type>,
    loop_vars: BTreeSet<String>,
    loop_vars_declared_in_loop: BTreeSet<String>,
    elem_vars: BTreeMap<String, Type>,
    in_scope: BTreeSet<String>,
    type_to_vars: HashMap<Type, Vec<String>>,
}

impl Program {
    pub fn new(name: impl Into<String>, return_type: Type, params: Vec<(String, Type)>) -> Self {
        let mut p = Self {
            name: name.into(),
            return_type,
            statements: Vec::new(),
            return_val: None,
            params,
            local_vars: BTreeMap::new(),
            loop_vars: BTreeSet::new(),
            loop_vars_declared_in_loop: BTreeSet::new(),
            elem_vars: BTreeMap::new(),
            in_scope: BTreeSet::new(),
            type_to_vars: HashMap::new(),
        };
        let names: Vec<String> = p.params.iter().map(|(n, _)| n.clone()).collect();
        p.in_scope.extend(names);
        p.rebuild_type_index();
        p
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn statements_mut(&mut self) -> &mut Vec<Statement> {
        &mut self.statements
    }

    pub fn push_statement(&mut self, s: Statement) {
        self.statements.push(s);
    }

    pub fn return_val(&self) -> Option<&Expression> {
        self.return_val.as_ref()
    }

    pub fn return_val_mut(&mut self) -> Option<&mut Expression> {
        self.return_val.as_mut()
    }

    pub fn set_return(&mut self, value: Option<Expression>) {
        self.return_val = value;
    }

    pub fn returns(&self) -> bool {
        self.return_val.is_some()
    }

    pub fn params(&self) -> &[(String, Type)] {
        &self.params
    }

    pub fn local_vars(&self) -> &BTreeMap<String, Type> {
        &self.local_vars
    }

    pub fn loop_vars(&self) -> &BTreeSet<String> {
        &self.loop_vars
    }

    pub fn loop_vars_declared_in_loop(&self) -> &BTreeSet<String> {
        &self.loop_vars_declared_in_loop
    }

    pub fn elem_vars(&self) -> &BTreeMap<String, Type> {
        &self.elem_vars
    }

    pub fn in_scope(&self) -> &BTreeSet<String> {
        &self.in_scope
    }

    /// Type of a declared variable, searching every scope map.
    pub fn var_type(&self, name: &str) -> Option<Type> {
        if let Some((_, ty)) = self.params.iter().find(|(n, _)| n == name) {
            return Some(ty.clone());
        }
        if let Some(ty) = self.local_vars.get(name).or_else(|| self.elem_vars.get(name)) {
            return Some(ty.clone());
        }
        if self.loop_vars.contains(name) || self.loop_vars_declared_in_loop.contains(name) {
            return Some(Type::int());
        }
        None
    }

    /// Whether `name` is declared anywhere or otherwise visible.
    pub fn is_declared(&self, name: &str) -> bool {
        self.var_type(name).is_some() || self.in_scope.contains(name)
    }

    /// Every declared variable with its type, in name order.
    pub fn variables(&self) -> BTreeMap<String, Type> {
        let mut vars: BTreeMap<String, Type> = self.params.iter().cloned().collect();
        vars.extend(self.local_vars.iter().map(|(n, t)| (n.clone(), t.clone())));
        vars.extend(self.elem_vars.iter().map(|(n, t)| (n.clone(), t.clone())));
        for n in self.loop_vars.iter().chain(&self.loop_vars_declared_in_loop) {
            vars.insert(n.clone(), Type::int());
        }
        vars
    }

    fn declare(&mut self, name: &str, ty: Type) -> Result<()> {
        if self.var_type(name).is_some() {
            return Err(ModelError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        self.in_scope.insert(name.to_string());
        self.type_to_vars.entry(ty).or_default().push(name.to_string());
        Ok(())
    }

    pub fn add_local_var(&mut self, name: &str, ty: Type) -> Result<()> {
        self.declare(name, ty.clone())?;
        self.local_vars.insert(name.to_string(), ty);
        Ok(())
    }

    /// A loop counter declared at the top of the body.
    pub fn add_loop_var(&mut self, name: &str) -> Result<()> {
        self.declare(name, Type::int())?;
        self.loop_vars.insert(name.to_string());
        Ok(())
    }

    /// A loop counter declared in its own loop header.
    pub fn add_loop_var_declared_in_loop(&mut self, name: &str) -> Result<()> {
        self.declare(name, Type::int())?;
        self.loop_vars_declared_in_loop.insert(name.to_string());
        Ok(())
    }

    pub fn add_elem_var(&mut self, name: &str, ty: Type) -> Result<()> {
        self.declare(name, ty.clone())?;
        self.elem_vars.insert(name.to_string(), ty);
        Ok(())
    }

    pub fn add_to_scope(&mut self, name: &str) {
        self.in_scope.insert(name.to_string());
    }

    /// Variables of the given type, as last indexed.
    pub fn vars_of_type(&self, ty: &Type) -> &[String] {
        self.type_to_vars.get(ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recomputes the type index from the scope maps.
    pub fn rebuild_type_index(&mut self) {
        let mut index: HashMap<Type, Vec<String>> = HashMap::new();
        for (name, ty) in self.variables() {
            index.entry(ty).or_default().push(name);
        }
        self.type_to_vars = index;
    }

    fn fresh(&self, candidates: impl Iterator<Item = String>) -> String {
        candidates
            .into_iter()
            .find(|n| !self.is_declared(n))
            .unwrap_or_default()
    }

    pub fn fresh_local_var(&self) -> String {
        self.fresh((0..).map(|i| format!("var{i}")))
    }

    pub fn fresh_loop_var(&self) -> String {
        let singles = LOOP_NAMES.iter().map(|n| n.to_string());
        let numbered = (1..).flat_map(|i| LOOP_NAMES.iter().map(move |n| format!("{n}{i}")));
        self.fresh(singles.chain(numbered))
    }

    pub fn fresh_elem_var(&self) -> String {
        self.fresh(std::iter::once("elem".to_string()).chain((1..).map(|i| format!("elem{i}"))))
    }

    /// Applies `renames` to every scope map at once, so swaps and chains
    /// resolve against the names as they were. The type index is left alone.
    pub(crate) fn rename_declared(&mut self, renames: &HashMap<String, String>) {
        let rename = |name: &String| renames.get(name).unwrap_or(name).clone();
        for (name, _) in self.params.iter_mut() {
            *name = rename(name);
        }
        let rename_map = |map: &BTreeMap<String, Type>| -> BTreeMap<String, Type> {
            map.iter().map(|(n, t)| (rename(n), t.clone())).collect()
        };
        self.local_vars = rename_map(&self.local_vars);
        self.elem_vars = rename_map(&self.elem_vars);
        let rename_set = |set: &BTreeSet<String>| -> BTreeSet<String> { set.iter().map(rename).collect() };
        self.loop_vars = rename_set(&self.loop_vars);
        self.loop_vars_declared_in_loop = rename_set(&self.loop_vars_declared_in_loop);
        self.in_scope = rename_set(&self.in_scope);
        debug!(count = renames.len(), program = %self.name, "renamed variables");
    }
}

impl Encode for Program {
    fn encode(&self, e: &mut Encoder) {
        for s in &self.statements {
            s.encode(e);
        }
        if let Some(ret) = &self.return_val {
            e.tag('r');
            ret.encode(e);
        }
    }
}

impl Emit for Program {
    fn emit(&self, e: &mut Emitter) {
        let style = e.style();
        let params = self
            .params
            .iter()
            .map(|(n, t)| format!("{} {}", t.name(style), n))
            .collect::<Vec<_>>()
            .join(", ");
        e.emit_line(
            0,
            &format!("public static {} {}({}) {{", self.return_type.name(style), self.name, params),
        );
        let mut body = Emitter::new(style).with_outer_counters(self.loop_vars.clone());
        for (name, ty) in &self.local_vars {
            body.emit_line(1, &format!("{} {} = {};", ty.name(style), name, ty.default_value()));
        }
        for name in &self.loop_vars {
            body.emit_line(1, &format!("int {name} = 0;"));
        }
        for s in &self.statements {
            s.emit(&mut body);
        }
        if let Some(ret) = &self.return_val {
            let mut value = Emitter::new(style);
            ret.emit(&mut value);
            body.emit_line(1, &format!("return {};", value.emit()));
        }
        let body = body.emit();
        if !body.is_empty() {
            e.emit_inline("\n");
            e.emit_inline(&body);
        }
        e.emit_line(0, "}");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree::{Condition, Operator, Var};
    use crate::types::NameStyle;

    fn program() -> Program {
        Program::new(
            "sum",
            Type::int(),
            vec![("arr".to_string(), Type::array_of(Type::int()))],
        )
    }

    #[test]
    fn scope_maps_are_exclusive() {
        let mut p = program();
        p.add_local_var("r", Type::int()).unwrap();
        assert!(matches!(
            p.add_elem_var("r", Type::int()),
            Err(ModelError::DuplicateVariable { .. })
        ));
        assert!(p.add_loop_var("arr").is_err());
        assert!(p.in_scope().contains("r"));
    }

    #[test]
    fn fresh_names_avoid_every_map() {
        let mut p = program();
        p.add_local_var("var0", Type::int()).unwrap();
        p.add_to_scope("var1");
        assert_eq!(p.fresh_local_var(), "var2");
        p.add_loop_var("i").unwrap();
        p.add_elem_var("j", Type::int()).unwrap();
        assert_eq!(p.fresh_loop_var(), "k");
        assert_eq!(p.fresh_elem_var(), "elem");
    }

    #[test]
    fn type_index_tracks_declarations_until_rebuilt() {
        let mut p = program();
        p.add_local_var("r", Type::int()).unwrap();
        assert_eq!(p.vars_of_type(&Type::int()), ["r".to_string()]);
        p.rename_declared(&[("r".to_string(), "total".to_string())].into_iter().collect());
        assert_eq!(p.vars_of_type(&Type::int()), ["r".to_string()]);
        p.rebuild_type_index();
        assert_eq!(p.vars_of_type(&Type::int()), ["total".to_string()]);
        assert_eq!(p.var_type("total"), Some(Type::int()));
        assert!(!p.is_declared("r"));
    }

    #[test]
    fn renders_declarations_and_return() {
        let mut p = program();
        p.add_local_var("r", Type::int()).unwrap();
        p.add_loop_var("i").unwrap();
        let arr_len = Expression::var("n", Type::int());
        let mut body = Statement::assign(Var::new("r", Type::int()), Expression::var("i", Type::int()));
        body.indent = 2;
        let mut loop_ = Statement::for_loop(
            "i",
            Condition::Concrete(Expression::binary(Operator::Lt, Expression::var("i", Type::int()), arr_len)),
            vec![body],
        );
        loop_.indent = 1;
        p.push_statement(loop_);
        p.set_return(Some(Expression::var("r", Type::int())));
        let expected = "\
public static int sum(int[] arr) {
    int r = 0;
    int i = 0;
    for (i = 0; i < n; i++) {
        r = i;
    }
    return r;
}";
        assert_eq!(p.render(NameStyle::Simple), expected);
    }
}
