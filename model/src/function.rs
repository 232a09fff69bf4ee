use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::encoding::Encoder;
use crate::types::{NameStyle, Type};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Method,
    Constructor,
    Field,
    ArrayGet,
    ArraySet,
    ArrayLength,
}

impl Kind {
    pub fn is_array_op(self) -> bool {
        matches!(self, Kind::ArrayGet | Kind::ArraySet | Kind::ArrayLength)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Method => "METHOD",
            Kind::Constructor => "CONSTRUCTOR",
            Kind::Field => "FIELD",
            Kind::ArrayGet => "ARR_GET",
            Kind::ArraySet => "ARR_SET",
            Kind::ArrayLength => "ARR_LEN",
        };
        f.write_str(s)
    }
}

fn object_bound() -> String {
    "java.lang.Object".to_string()
}

/// A type position in a catalog record, before type arguments are substituted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSig {
    /// A bare type parameter such as `E`.
    Param {
        param: String,
        #[serde(default = "object_bound")]
        bound: String,
    },
    /// Mentions type parameters without being one, e.g. `java.util.List<E>`.
    Generic { generic: String, erased: String },
    Void { void: bool },
    Array { array: Box<TypeSig> },
    Concrete(String),
}

impl TypeSig {
    pub fn concrete(name: impl Into<String>) -> Self {
        TypeSig::Concrete(name.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        TypeSig::Param {
            param: name.into(),
            bound: object_bound(),
        }
    }

    /// The type this position has with all type information erased.
    pub fn erasure(&self) -> Type {
        match self {
            TypeSig::Param { bound, .. } => Type::concrete(bound.clone()),
            TypeSig::Generic { erased, .. } => Type::concrete(erased.clone()),
            TypeSig::Void { .. } => Type::Void,
            TypeSig::Array { array } => Type::array_of(array.erasure()),
            TypeSig::Concrete(name) => Type::parse(name),
        }
    }

    fn is_generic(&self) -> bool {
        match self {
            TypeSig::Param { .. } | TypeSig::Generic { .. } => true,
            TypeSig::Array { array } => array.is_generic(),
            TypeSig::Void { .. } | TypeSig::Concrete(_) => false,
        }
    }

    /// Resolves this position against the record's substitution.
    ///
    /// Returns `None` when the position involves generics in a way a single
    /// substitution cannot make concrete.
    fn resolve(&self, substitution: Option<&Type>) -> Option<Type> {
        match (self, substitution) {
            (TypeSig::Param { .. }, Some(ty)) => Some(ty.clone()),
            (TypeSig::Param { .. }, None) => Some(self.erasure()),
            (sig, Some(_)) if sig.is_generic() => None,
            (sig, _) => Some(sig.erasure()),
        }
    }
}

/// One component as supplied by the catalog loader.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub kind: Kind,
    #[serde(default)]
    pub declaring: String,
    #[serde(default)]
    pub name: String,
    pub returns: Option<TypeSig>,
    #[serde(default)]
    pub args: Vec<TypeSig>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Concrete type arguments this record should be instantiated with.
    #[serde(default)]
    pub instantiate: Vec<String>,
}

/// Identity of the element a record describes, independent of any substitution.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct Element {
    declaring: String,
    name: String,
    erased_args: Vec<Type>,
}

/// Canonical descriptor for a method, constructor, field or array operation.
///
/// Equality and hashing follow the underlying element (or, for array operations,
/// the argument types). Ordering for display is a separate key, see
/// [`FunctionData::compare_to`].
#[derive(Clone, Debug)]
pub struct FunctionData {
    pub kind: Kind,
    name: Option<String>,
    simple_name: Option<String>,
    pub callee_type: Option<Type>,
    pub return_type: Type,
    pub arg_types: Vec<Type>,
    pub is_static: bool,
    pub returns: bool,
    returns_generic: bool,
    valid: bool,
    element: Option<Element>,
    encoding_key: String,
    comparison_key: String,
}

impl FunctionData {
    /// Instantiates a catalog record, optionally with a concrete type argument.
    pub fn from_record(record: &ComponentRecord, substitution: Option<&Type>) -> Self {
        let mut valid = true;
        let mut resolve = |sig: &TypeSig| {
            sig.resolve(substitution).unwrap_or_else(|| {
                valid = false;
                sig.erasure()
            })
        };
        let declaring = Type::concrete(record.declaring.clone());
        let erased_args: Vec<Type> = record.args.iter().map(TypeSig::erasure).collect();

        let (name, simple_name, return_type, arg_types, is_static, returns_generic) =
            match record.kind {
                Kind::Method => {
                    let ret_sig = record.returns.clone().unwrap_or(TypeSig::Void { void: true });
                    let return_type = resolve(&ret_sig);
                    let arg_types = if record.name == "equals" && record.args.len() == 1 {
                        vec![declaring.clone()]
                    } else {
                        record.args.iter().map(&mut resolve).collect()
                    };
                    let returns_generic = !return_type.is_void() && ret_sig.is_generic();
                    (
                        record.name.clone(),
                        record.name.clone(),
                        return_type,
                        arg_types,
                        record.is_static,
                        returns_generic,
                    )
                }
                Kind::Constructor => {
                    let (name, simple) = match substitution {
                        Some(ty) => (
                            format!("{}<{}>", record.declaring, ty.name(NameStyle::Qualified)),
                            format!(
                                "{}<{}>",
                                declaring.name(NameStyle::Simple),
                                ty.name(NameStyle::Simple)
                            ),
                        ),
                        None => (record.declaring.clone(), declaring.name(NameStyle::Simple)),
                    };
                    let arg_types = record.args.iter().map(&mut resolve).collect();
                    (name, simple, declaring.clone(), arg_types, true, false)
                }
                Kind::Field => {
                    let ret_sig = record.returns.clone().unwrap_or_else(|| TypeSig::concrete("java.lang.Object"));
                    let return_type = resolve(&ret_sig);
                    (
                        record.name.clone(),
                        record.name.clone(),
                        return_type,
                        Vec::new(),
                        record.is_static,
                        ret_sig.is_generic(),
                    )
                }
                Kind::ArrayGet | Kind::ArraySet | Kind::ArrayLength => {
                    let elem = record
                        .args
                        .first()
                        .map(|sig| resolve(sig))
                        .and_then(|ty| ty.element().cloned())
                        .unwrap_or_else(|| Type::concrete("java.lang.Object"));
                    return Self::array_op(record.kind, elem);
                }
            };

        let element = Element {
            declaring: record.declaring.clone(),
            name: record.name.clone(),
            erased_args,
        };
        let mut data = Self {
            kind: record.kind,
            name: Some(name),
            simple_name: Some(simple_name),
            callee_type: Some(declaring),
            returns: !return_type.is_void(),
            return_type,
            arg_types,
            is_static,
            returns_generic,
            valid,
            element: Some(element),
            encoding_key: String::new(),
            comparison_key: String::new(),
        };
        data.set_keys();
        data
    }

    /// One of the built-in array pseudo-operations over arrays of `elem`.
    pub fn array_op(kind: Kind, elem: Type) -> Self {
        let array = Type::array_of(elem.clone());
        let (return_type, arg_types) = match kind {
            Kind::ArrayGet => (elem, vec![array, Type::int()]),
            Kind::ArraySet => (Type::Void, vec![array, Type::int(), elem]),
            _ => (Type::int(), vec![array]),
        };
        let mut data = Self {
            kind,
            name: None,
            simple_name: None,
            callee_type: None,
            returns: !return_type.is_void(),
            return_type,
            arg_types,
            is_static: true,
            returns_generic: false,
            valid: true,
            element: None,
            encoding_key: String::new(),
            comparison_key: String::new(),
        };
        data.set_keys();
        data
    }

    fn set_keys(&mut self) {
        let callee = self.callee_type.as_ref().map(Type::qualified_name);
        let name = self.name.as_deref().unwrap_or("null");
        self.encoding_key = format!(
            "{}{}-{}-{}-{}",
            self.kind,
            callee.as_deref().unwrap_or("~"),
            name,
            self.arg_types.len(),
            self.is_static
        );
        let mut key = format!(
            "{} {} {}",
            callee.as_deref().unwrap_or("null"),
            name,
            self.arg_types.len()
        );
        for arg in &self.arg_types {
            key.push(' ');
            key.push_str(&arg.qualified_name());
        }
        self.comparison_key = key;
    }

    pub fn name(&self, style: NameStyle) -> &str {
        let name = match style {
            NameStyle::Qualified => &self.name,
            NameStyle::Simple => &self.simple_name,
        };
        name.as_deref().unwrap_or("")
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn returns_generic(&self) -> bool {
        self.returns_generic
    }

    /// Structural key shared by every descriptor that encodes to the same token.
    pub fn encoding_key(&self) -> &str {
        &self.encoding_key
    }

    /// Appends this descriptor's per-run token.
    pub fn encode(&self, e: &mut Encoder) {
        e.token(&self.encoding_key);
    }

    /// Deterministic display ordering: declaring type, name, then argument types.
    pub fn compare_to(&self, other: &FunctionData) -> Ordering {
        if std::ptr::eq(self, other) {
            return Ordering::Equal;
        }
        self.comparison_key.cmp(&other.comparison_key)
    }

    /// Human readable signature, e.g. `java.lang.String.substring(int) -> java.lang.String`.
    pub fn signature(&self, style: NameStyle) -> String {
        let args = self
            .arg_types
            .iter()
            .map(|t| t.name(style))
            .collect::<Vec<_>>()
            .join(", ");
        let owner = match (&self.kind, &self.callee_type) {
            (Kind::Constructor, _) => "new ".to_string(),
            (_, Some(ty)) => format!("{}.", ty.name(style)),
            (_, None) => String::new(),
        };
        let name = match self.kind {
            Kind::ArrayGet => "[get]",
            Kind::ArraySet => "[set]",
            Kind::ArrayLength => "[length]",
            _ => self.name(style),
        };
        let ret = self.return_type.name(style);
        match self.kind {
            Kind::Field => format!("{owner}{name} -> {ret}"),
            _ => format!("{owner}{name}({args}) -> {ret}"),
        }
    }
}

impl PartialEq for FunctionData {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            Kind::Method => self.name == other.name && self.element == other.element,
            Kind::Constructor | Kind::Field => self.element == other.element,
            Kind::ArrayGet | Kind::ArraySet | Kind::ArrayLength => self.arg_types == other.arg_types,
        }
    }
}

impl Eq for FunctionData {}

impl Hash for FunctionData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        match self.kind {
            Kind::ArrayGet | Kind::ArraySet | Kind::ArrayLength => self.arg_types.hash(state),
            _ => self.element.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingTable;

    fn method(declaring: &str, name: &str, args: Vec<TypeSig>, returns: TypeSig) -> ComponentRecord {
        ComponentRecord {
            kind: Kind::Method,
            declaring: declaring.to_string(),
            name: name.to_string(),
            returns: Some(returns),
            args,
            is_static: false,
            instantiate: Vec::new(),
        }
    }

    fn token(data: &FunctionData, table: &mut EncodingTable) -> String {
        let mut e = Encoder::new(table);
        data.encode(&mut e);
        e.finish()
    }

    #[test]
    fn same_name_different_class_gets_distinct_tokens() {
        let a = FunctionData::from_record(
            &method("java.util.List", "size", vec![], TypeSig::concrete("int")),
            None,
        );
        let b = FunctionData::from_record(
            &method("java.util.Set", "size", vec![], TypeSig::concrete("int")),
            None,
        );
        let mut table = EncodingTable::new();
        assert_ne!(token(&a, &mut table), token(&b, &mut table));
        assert_ne!(a, b);
    }

    #[test]
    fn structural_key_decides_token() {
        let record = method("java.util.List", "get", vec![TypeSig::concrete("int")], TypeSig::param("E"));
        let ints = FunctionData::from_record(&record, Some(&Type::concrete("java.lang.Integer")));
        let strings = FunctionData::from_record(&record, Some(&Type::concrete("java.lang.String")));
        let mut table = EncodingTable::new();
        assert_eq!(token(&ints, &mut table), token(&strings, &mut table));
        assert_eq!(ints.return_type, Type::concrete("java.lang.Integer"));
        assert!(ints.returns_generic());
        assert_eq!(ints, strings);
    }

    #[test]
    fn bare_parameter_without_substitution_is_erased() {
        let record = method("java.util.List", "get", vec![TypeSig::concrete("int")], TypeSig::param("E"));
        let data = FunctionData::from_record(&record, None);
        assert!(data.is_valid());
        assert_eq!(data.return_type, Type::concrete("java.lang.Object"));
    }

    #[test]
    fn nested_generic_with_substitution_is_invalid() {
        let record = method(
            "java.util.List",
            "subList",
            vec![TypeSig::concrete("int"), TypeSig::concrete("int")],
            TypeSig::Generic {
                generic: "java.util.List<E>".to_string(),
                erased: "java.util.List".to_string(),
            },
        );
        assert!(!FunctionData::from_record(&record, Some(&Type::concrete("java.lang.Integer"))).is_valid());
        assert!(FunctionData::from_record(&record, None).is_valid());
    }

    #[test]
    fn equals_takes_declaring_type() {
        let record = method(
            "java.awt.Point",
            "equals",
            vec![TypeSig::concrete("java.lang.Object")],
            TypeSig::concrete("boolean"),
        );
        let data = FunctionData::from_record(&record, None);
        assert_eq!(data.arg_types, vec![Type::concrete("java.awt.Point")]);
    }

    #[test]
    fn constructor_names_follow_substitution() {
        let record = ComponentRecord {
            kind: Kind::Constructor,
            declaring: "java.util.ArrayList".to_string(),
            name: String::new(),
            returns: None,
            args: vec![],
            is_static: false,
            instantiate: vec![],
        };
        let data = FunctionData::from_record(&record, Some(&Type::concrete("java.lang.Integer")));
        assert_eq!(data.name(NameStyle::Qualified), "java.util.ArrayList<java.lang.Integer>");
        assert_eq!(data.name(NameStyle::Simple), "ArrayList<Integer>");
        assert!(data.is_static);
        assert_eq!(data.return_type, Type::concrete("java.util.ArrayList"));
    }

    #[test]
    fn array_ops_compare_by_argument_types() {
        let a = FunctionData::array_op(Kind::ArrayGet, Type::int());
        let b = FunctionData::array_op(Kind::ArrayGet, Type::int());
        let c = FunctionData::array_op(Kind::ArrayGet, Type::boolean());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.return_type, Type::int());
        assert!(!FunctionData::array_op(Kind::ArraySet, Type::int()).returns);
    }

    #[test]
    fn ordering_uses_declaring_type_then_name() {
        let a = FunctionData::from_record(&method("a.A", "z", vec![], TypeSig::concrete("int")), None);
        let b = FunctionData::from_record(&method("b.B", "a", vec![], TypeSig::concrete("int")), None);
        assert_eq!(a.compare_to(&b), Ordering::Less);
        assert_eq!(b.compare_to(&a), Ordering::Greater);
        assert_eq!(a.compare_to(&a), Ordering::Equal);
    }
}
