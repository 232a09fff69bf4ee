use std::fmt::Write;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::encoding::{Encode, Encoder};
use crate::function::{FunctionData, Kind};
use crate::types::Type;

/// Binding strength used to decide where parentheses are needed, loosest first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Precedence {
    Assignment,
    Or,
    And,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Dot,
    New,
    Atom,
}

impl Precedence {
    /// Whether a child printed to the left of this operator needs parentheses.
    pub fn paren_left(self, child: Precedence) -> bool {
        child < self
    }

    /// Whether a child printed to the right of this operator needs parentheses.
    pub fn paren_right(self, child: Precedence) -> bool {
        child <= self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    Not,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl Operator {
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::Neg)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Not => "!",
            Operator::Neg | Operator::Sub => "-",
            Operator::Add => "+",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            Operator::Not | Operator::Neg => Precedence::Unary,
            Operator::Mul | Operator::Div | Operator::Rem => Precedence::Multiplicative,
            Operator::Add | Operator::Sub => Precedence::Additive,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => Precedence::Relational,
            Operator::Eq | Operator::Ne => Precedence::Equality,
            Operator::And => Precedence::And,
            Operator::Or => Precedence::Or,
        }
    }

    /// Single character used in canonical encodings.
    fn code(self) -> char {
        match self {
            Operator::Not => '!',
            Operator::Neg => '~',
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Rem => '%',
            Operator::Eq => '=',
            Operator::Ne => '#',
            Operator::Lt => '<',
            Operator::Le => '(',
            Operator::Gt => '>',
            Operator::Ge => ')',
            Operator::And => '&',
            Operator::Or => '|',
        }
    }
}

/// A constant, kept as its source text. Two literals are the same when their
/// text is; the type only informs rendering and typing.
#[derive(Clone, Debug)]
pub struct Literal {
    pub code: String,
    pub ty: Type,
}

impl Literal {
    pub fn new(code: impl Into<String>, ty: Type) -> Self {
        Self {
            code: code.into(),
            ty,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::new(value.to_string(), Type::int())
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(value.to_string(), Type::boolean())
    }

    /// A string constant, quoted and escaped the way Java source expects.
    pub fn string(value: &str) -> Self {
        Self::new(java_quote(value), Type::concrete("java.lang.String"))
    }

    pub fn null(ty: Type) -> Self {
        Self::new("null", ty)
    }
}

fn java_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
    out
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// A variable reference. The name is rewritten in place when fragments are renamed.
/// Identity is the name alone.
#[derive(Clone, Debug)]
pub struct Var {
    pub name: String,
    pub ty: Type,
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Var {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Equality and hashing follow the canonical encoding: components compare by
/// their encoding key (array operations by kind alone), never by the types
/// carried on variables and literals.
#[derive(Clone, Debug)]
pub enum Expression {
    Literal(Literal),
    Var(Var),
    Op {
        op: Operator,
        left: Option<Box<Expression>>,
        right: Box<Expression>,
    },
    Func {
        args: Vec<Expression>,
        callee: Option<Box<Expression>>,
        data: Rc<FunctionData>,
    },
}

fn same_component(a: &FunctionData, b: &FunctionData) -> bool {
    a.kind == b.kind && (a.kind.is_array_op() || a.encoding_key() == b.encoding_key())
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Literal(a), Expression::Literal(b)) => a == b,
            (Expression::Var(a), Expression::Var(b)) => a == b,
            (
                Expression::Op { op, left, right },
                Expression::Op {
                    op: other_op,
                    left: other_left,
                    right: other_right,
                },
            ) => op == other_op && left == other_left && right == other_right,
            (
                Expression::Func { args, callee, data },
                Expression::Func {
                    args: other_args,
                    callee: other_callee,
                    data: other_data,
                },
            ) => same_component(data, other_data) && callee == other_callee && args == other_args,
            _ => false,
        }
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Expression::Literal(lit) => lit.hash(state),
            Expression::Var(var) => var.hash(state),
            Expression::Op { op, left, right } => {
                op.hash(state);
                left.hash(state);
                right.hash(state);
            }
            Expression::Func { args, callee, data } => {
                data.kind.hash(state);
                if !data.kind.is_array_op() {
                    data.encoding_key().hash(state);
                }
                callee.hash(state);
                args.hash(state);
            }
        }
    }
}

impl Expression {
    pub fn literal(lit: Literal) -> Self {
        Expression::Literal(lit)
    }

    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Expression::Var(Var::new(name, ty))
    }

    pub fn unary(op: Operator, operand: Expression) -> Self {
        Expression::Op {
            op,
            left: None,
            right: Box::new(operand),
        }
    }

    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Expression::Op {
            op,
            left: Some(Box::new(left)),
            right: Box::new(right),
        }
    }

    pub fn func(data: Rc<FunctionData>, callee: Option<Expression>, args: Vec<Expression>) -> Self {
        Expression::Func {
            args,
            callee: callee.map(Box::new),
            data,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Expression::Literal(lit) => lit.ty.clone(),
            Expression::Var(var) => var.ty.clone(),
            Expression::Op { op, right, .. } => match op {
                Operator::Neg | Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Rem => {
                    right.ty()
                }
                _ => Type::boolean(),
            },
            Expression::Func { data, .. } => data.return_type.clone(),
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Expression::Literal(lit) if lit.code.starts_with('-') => Precedence::Unary,
            Expression::Literal(_) | Expression::Var(_) => Precedence::Atom,
            Expression::Op { op, .. } => op.precedence(),
            Expression::Func { data, .. } => match data.kind {
                Kind::Method | Kind::Field | Kind::ArrayGet | Kind::ArrayLength => Precedence::Dot,
                Kind::Constructor => Precedence::New,
                Kind::ArraySet => Precedence::Assignment,
            },
        }
    }
}

/// The test of an `if` or loop.
///
/// An angelic condition is left open during search and later resolved by running
/// the candidate; the resolved expression is remembered once known.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Condition {
    Concrete(Expression),
    Angelic(Option<Expression>),
}

impl Condition {
    pub fn is_angelic(&self) -> bool {
        matches!(self, Condition::Angelic(_))
    }

    /// The expression that is actually tested, if the condition is concrete.
    pub fn concrete(&self) -> Option<&Expression> {
        match self {
            Condition::Concrete(e) => Some(e),
            Condition::Angelic(_) => None,
        }
    }

    pub fn remembered(&self) -> Option<&Expression> {
        match self {
            Condition::Angelic(remembered) => remembered.as_ref(),
            Condition::Concrete(_) => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum StatementKind {
    VarAssignment {
        var: Var,
        value: Expression,
    },
    /// A call evaluated for its effect; always a `Func` expression.
    FuncCall(Expression),
    If {
        condition: Condition,
        body: Vec<Statement>,
    },
    For {
        var_name: String,
        is_while: bool,
        condition: Condition,
        body: Vec<Statement>,
    },
    ForEach {
        var_name: String,
        var_type: Type,
        container: Expression,
        body: Vec<Statement>,
    },
}

/// A statement and its display depth.
///
/// The depth is derived from the statement's position and is not part of its
/// identity; see [`crate::traverse::reset_indents`].
#[derive(Clone, Debug)]
pub struct Statement {
    pub indent: usize,
    pub kind: StatementKind,
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Statement {}

impl Hash for Statement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self { indent: 0, kind }
    }

    pub fn assign(var: Var, value: Expression) -> Self {
        Self::new(StatementKind::VarAssignment { var, value })
    }

    pub fn call(func: Expression) -> Self {
        Self::new(StatementKind::FuncCall(func))
    }

    pub fn if_then(condition: Condition, body: Vec<Statement>) -> Self {
        Self::new(StatementKind::If { condition, body })
    }

    pub fn for_loop(var_name: impl Into<String>, condition: Condition, body: Vec<Statement>) -> Self {
        Self::new(StatementKind::For {
            var_name: var_name.into(),
            is_while: false,
            condition,
            body,
        })
    }

    pub fn while_loop(condition: Condition, body: Vec<Statement>) -> Self {
        Self::new(StatementKind::For {
            var_name: String::new(),
            is_while: true,
            condition,
            body,
        })
    }

    pub fn for_each(
        var_name: impl Into<String>,
        var_type: Type,
        container: Expression,
        body: Vec<Statement>,
    ) -> Self {
        Self::new(StatementKind::ForEach {
            var_name: var_name.into(),
            var_type,
            container,
            body,
        })
    }

    /// Nested statements of a control statement, empty otherwise.
    pub fn body(&self) -> &[Statement] {
        match &self.kind {
            StatementKind::If { body, .. }
            | StatementKind::For { body, .. }
            | StatementKind::ForEach { body, .. } => body,
            StatementKind::VarAssignment { .. } | StatementKind::FuncCall(_) => &[],
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut Vec<Statement>> {
        match &mut self.kind {
            StatementKind::If { body, .. }
            | StatementKind::For { body, .. }
            | StatementKind::ForEach { body, .. } => Some(body),
            StatementKind::VarAssignment { .. } | StatementKind::FuncCall(_) => None,
        }
    }
}

impl Encode for Expression {
    fn encode(&self, e: &mut Encoder) {
        match self {
            Expression::Literal(lit) => {
                e.tag('c');
                e.text(&lit.code);
                e.tag(';');
            }
            Expression::Var(var) => var.encode(e),
            Expression::Op { op, left, right } => {
                e.tag('o');
                e.tag(op.code());
                if let Some(left) = left {
                    left.encode(e);
                }
                right.encode(e);
            }
            Expression::Func { args, callee, data } => match data.kind {
                Kind::Method | Kind::Constructor | Kind::Field => {
                    e.tag('f');
                    data.encode(e);
                    e.tag(':');
                    if let Some(callee) = callee {
                        callee.encode(e);
                    }
                    for arg in args {
                        arg.encode(e);
                    }
                }
                Kind::ArrayGet => {
                    e.tag('g');
                    encode_all(args, e);
                }
                Kind::ArraySet => {
                    e.tag('s');
                    encode_all(args, e);
                }
                Kind::ArrayLength => {
                    e.tag('l');
                    encode_all(args, e);
                }
            },
        }
    }
}

fn encode_all(exprs: &[Expression], e: &mut Encoder) {
    for expr in exprs {
        expr.encode(e);
    }
}

impl Encode for Var {
    fn encode(&self, e: &mut Encoder) {
        e.tag('v');
        e.text(&self.name);
        e.tag(';');
    }
}

impl Encode for Condition {
    fn encode(&self, e: &mut Encoder) {
        match self {
            Condition::Concrete(expr) => {
                e.tag('k');
                expr.encode(e);
            }
            Condition::Angelic(None) => e.tag('?'),
            Condition::Angelic(Some(remembered)) => {
                e.tag('!');
                remembered.encode(e);
            }
        }
    }
}

impl Encode for Statement {
    fn encode(&self, e: &mut Encoder) {
        match &self.kind {
            StatementKind::VarAssignment { var, value } => {
                e.tag('a');
                var.encode(e);
                value.encode(e);
            }
            StatementKind::FuncCall(func) => {
                e.tag('x');
                func.encode(e);
            }
            StatementKind::If { condition, body } => {
                e.tag('i');
                condition.encode(e);
                encode_block(body, e);
            }
            StatementKind::For {
                var_name,
                is_while,
                condition,
                body,
            } => {
                if *is_while {
                    e.tag('w');
                } else {
                    e.tag('r');
                    e.text(var_name);
                    e.tag(';');
                }
                condition.encode(e);
                encode_block(body, e);
            }
            StatementKind::ForEach {
                var_name,
                var_type,
                container,
                body,
            } => {
                e.tag('e');
                e.text(var_name);
                e.tag(':');
                e.text(&var_type.qualified_name());
                e.tag(';');
                container.encode(e);
                encode_block(body, e);
            }
        }
    }
}

fn encode_block(body: &[Statement], e: &mut Encoder) {
    e.tag('{');
    for s in body {
        s.encode(e);
    }
    e.tag('}');
}
