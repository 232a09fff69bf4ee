use std::collections::BTreeSet;

use crate::function::Kind;
use crate::tree::{Condition, Expression, Statement, StatementKind};
use crate::types::NameStyle;

const INDENT: &str = "    ";

/// Accumulates source-like text for expressions, statements and programs.
pub struct Emitter {
    style: NameStyle,
    output: String,
    /// Loop counters declared at the top of the enclosing program rather than in
    /// their loop header.
    outer_counters: BTreeSet<String>,
}

impl Emitter {
    pub fn new(style: NameStyle) -> Self {
        Self {
            style,
            output: String::new(),
            outer_counters: BTreeSet::new(),
        }
    }

    pub fn with_outer_counters(mut self, counters: BTreeSet<String>) -> Self {
        self.outer_counters = counters;
        self
    }

    pub fn style(&self) -> NameStyle {
        self.style
    }

    pub fn emit_inline(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Starts a new line at the given depth.
    pub fn emit_line(&mut self, indent: usize, s: &str) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        for _ in 0..indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(s);
    }

    pub fn emit(self) -> String {
        self.output
    }

    fn emit_wrapped(&mut self, e: &Expression, paren: bool) {
        if paren {
            self.emit_inline("(");
            e.emit(self);
            self.emit_inline(")");
        } else {
            e.emit(self);
        }
    }

    fn emit_args(&mut self, args: &[Expression]) {
        self.emit_inline("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.emit_inline(", ");
            }
            arg.emit(self);
        }
        self.emit_inline(")");
    }
}

pub trait Emit {
    fn emit(&self, e: &mut Emitter);

    fn render(&self, style: NameStyle) -> String {
        let mut e = Emitter::new(style);
        self.emit(&mut e);
        e.emit()
    }
}

impl Emit for Expression {
    fn emit(&self, e: &mut Emitter) {
        let this = self.precedence();
        match self {
            Expression::Literal(lit) => e.emit_inline(&lit.code),
            Expression::Var(var) => e.emit_inline(&var.name),
            Expression::Op {
                op,
                left: None,
                right,
            } => {
                e.emit_inline(op.symbol());
                e.emit_wrapped(right, this.paren_right(right.precedence()));
            }
            Expression::Op {
                op,
                left: Some(left),
                right,
            } => {
                e.emit_wrapped(left, this.paren_left(left.precedence()));
                e.emit_inline(" ");
                e.emit_inline(op.symbol());
                e.emit_inline(" ");
                e.emit_wrapped(right, this.paren_right(right.precedence()));
            }
            Expression::Func { args, callee, data } => {
                let name = data.name(e.style()).to_string();
                let owner = data
                    .callee_type
                    .as_ref()
                    .map(|t| t.name(e.style()))
                    .unwrap_or_default();
                match data.kind {
                    Kind::Method => {
                        match callee {
                            Some(c) => e.emit_wrapped(c, this.paren_left(c.precedence())),
                            None => e.emit_inline(&owner),
                        }
                        e.emit_inline(".");
                        e.emit_inline(&name);
                        e.emit_args(args);
                    }
                    Kind::Constructor => {
                        e.emit_inline("new ");
                        e.emit_inline(&name);
                        e.emit_args(args);
                    }
                    Kind::Field => {
                        match callee {
                            Some(c) if !data.is_static => e.emit_wrapped(c, this.paren_left(c.precedence())),
                            _ => e.emit_inline(&owner),
                        }
                        e.emit_inline(".");
                        e.emit_inline(&name);
                    }
                    Kind::ArrayGet | Kind::ArraySet | Kind::ArrayLength => {
                        if let Some(array) = args.first() {
                            e.emit_wrapped(array, this.paren_left(array.precedence()));
                        }
                        if data.kind == Kind::ArrayLength {
                            e.emit_inline(".length");
                            return;
                        }
                        e.emit_inline("[");
                        if let Some(index) = args.get(1) {
                            index.emit(e);
                        }
                        e.emit_inline("]");
                        if let Some(value) = args.get(2) {
                            e.emit_inline(" = ");
                            value.emit(e);
                        }
                    }
                }
            }
        }
    }
}

impl Emit for Condition {
    fn emit(&self, e: &mut Emitter) {
        match self {
            Condition::Concrete(expr) | Condition::Angelic(Some(expr)) => expr.emit(e),
            Condition::Angelic(None) => e.emit_inline("<angelic>"),
        }
    }
}

fn inline(e: &Emitter, node: &impl Emit) -> String {
    let mut inner = Emitter::new(e.style).with_outer_counters(e.outer_counters.clone());
    node.emit(&mut inner);
    inner.emit()
}

fn emit_block(e: &mut Emitter, indent: usize, header: String, body: &[Statement]) {
    e.emit_line(indent, &format!("{header} {{"));
    for s in body {
        s.emit(e);
    }
    e.emit_line(indent, "}");
}

impl Emit for Statement {
    fn emit(&self, e: &mut Emitter) {
        match &self.kind {
            StatementKind::VarAssignment { var, value } => {
                let line = format!("{} = {};", var.name, inline(e, value));
                e.emit_line(self.indent, &line);
            }
            StatementKind::FuncCall(func) => {
                let line = format!("{};", inline(e, func));
                e.emit_line(self.indent, &line);
            }
            StatementKind::If { condition, body } => {
                let header = format!("if ({})", inline(e, condition));
                emit_block(e, self.indent, header, body);
            }
            StatementKind::For {
                var_name,
                is_while,
                condition,
                body,
            } => {
                let cond = inline(e, condition);
                let header = if *is_while {
                    format!("while ({cond})")
                } else if e.outer_counters.contains(var_name) {
                    format!("for ({var_name} = 0; {cond}; {var_name}++)")
                } else {
                    format!("for (int {var_name} = 0; {cond}; {var_name}++)")
                };
                emit_block(e, self.indent, header, body);
            }
            StatementKind::ForEach {
                var_name,
                var_type,
                container,
                body,
            } => {
                let header = format!(
                    "for ({} {} : {})",
                    var_type.name(e.style),
                    var_name,
                    inline(e, container)
                );
                emit_block(e, self.indent, header, body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::function::{ComponentRecord, FunctionData, TypeSig};
    use crate::tree::{Literal, Operator, Var};
    use crate::types::Type;

    fn int_var(name: &str) -> Expression {
        Expression::var(name, Type::int())
    }

    fn list_method(name: &str, args: Vec<TypeSig>, is_static: bool) -> Rc<FunctionData> {
        Rc::new(FunctionData::from_record(
            &ComponentRecord {
                kind: Kind::Method,
                declaring: "java.util.Collections".to_string(),
                name: name.to_string(),
                returns: Some(TypeSig::concrete("int")),
                args,
                is_static,
                instantiate: vec![],
            },
            None,
        ))
    }

    #[test]
    fn binary_operators_parenthesize_minimally() {
        let a_plus_b = Expression::binary(Operator::Add, int_var("a"), int_var("b"));
        let times = Expression::binary(Operator::Mul, a_plus_b.clone(), int_var("c"));
        assert_eq!(times.render(NameStyle::Qualified), "(a + b) * c");

        let left_assoc = Expression::binary(Operator::Sub, a_plus_b.clone(), int_var("c"));
        assert_eq!(left_assoc.render(NameStyle::Qualified), "a + b - c");

        let right_nested = Expression::binary(Operator::Sub, int_var("c"), a_plus_b);
        assert_eq!(right_nested.render(NameStyle::Qualified), "c - (a + b)");
    }

    #[test]
    fn unary_operands_are_wrapped_when_looser() {
        let sum = Expression::binary(Operator::Add, int_var("a"), int_var("b"));
        let neg = Expression::unary(Operator::Neg, sum);
        assert_eq!(neg.render(NameStyle::Qualified), "-(a + b)");
        let not = Expression::unary(Operator::Not, Expression::var("ok", Type::boolean()));
        assert_eq!(not.render(NameStyle::Qualified), "!ok");
    }

    #[test]
    fn static_calls_use_owner_name_per_style() {
        let max = list_method("max", vec![TypeSig::concrete("int"), TypeSig::concrete("int")], true);
        let call = Expression::func(max, None, vec![int_var("a"), Expression::literal(Literal::int(2))]);
        assert_eq!(call.render(NameStyle::Qualified), "java.util.Collections.max(a, 2)");
        assert_eq!(call.render(NameStyle::Simple), "Collections.max(a, 2)");
    }

    #[test]
    fn callee_looser_than_dot_is_wrapped() {
        let hash = list_method("hashCode", vec![], false);
        let sum = Expression::binary(Operator::Add, int_var("a"), int_var("b"));
        let call = Expression::func(hash, Some(sum), vec![]);
        assert_eq!(call.render(NameStyle::Simple), "(a + b).hashCode()");
    }

    #[test]
    fn array_operations_render_like_source() {
        let arr = Expression::var("arr", Type::array_of(Type::int()));
        let get = Expression::func(
            Rc::new(FunctionData::array_op(Kind::ArrayGet, Type::int())),
            None,
            vec![arr.clone(), int_var("i")],
        );
        assert_eq!(get.render(NameStyle::Simple), "arr[i]");
        let len = Expression::func(
            Rc::new(FunctionData::array_op(Kind::ArrayLength, Type::int())),
            None,
            vec![arr.clone()],
        );
        assert_eq!(len.render(NameStyle::Simple), "arr.length");
        let set = Expression::func(
            Rc::new(FunctionData::array_op(Kind::ArraySet, Type::int())),
            None,
            vec![arr, int_var("i"), Expression::literal(Literal::int(0))],
        );
        assert_eq!(Statement::call(set).render(NameStyle::Simple), "arr[i] = 0;");
    }

    #[test]
    fn blocks_use_recorded_indent() {
        let mut inner = Statement::assign(Var::new("r", Type::int()), int_var("i"));
        inner.indent = 2;
        let mut loop_ = Statement::for_loop(
            "i",
            Condition::Concrete(Expression::binary(Operator::Lt, int_var("i"), int_var("n"))),
            vec![inner],
        );
        loop_.indent = 1;
        assert_eq!(
            loop_.render(NameStyle::Simple),
            "    for (int i = 0; i < n; i++) {\n        r = i;\n    }"
        );
    }

    #[test]
    fn open_angelic_condition_is_marked() {
        let s = Statement::while_loop(Condition::Angelic(None), vec![]);
        assert_eq!(s.render(NameStyle::Simple), "while (<angelic>) {\n}");
    }
}
