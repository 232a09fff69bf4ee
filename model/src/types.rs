use std::fmt;

use serde::{Deserialize, Serialize};

/// How component and type names are printed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `java.util.ArrayList`
    #[default]
    Qualified,
    /// `ArrayList`
    Simple,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    Void,
    Concrete(String),
    Array(Box<Type>),
}

impl Type {
    pub fn concrete(name: impl Into<String>) -> Self {
        Type::Concrete(name.into())
    }

    /// Parses a qualified type name as written in a catalog, e.g. `int[][]`.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name.strip_suffix("[]") {
            Some(elem) => Type::array_of(Type::parse(elem)),
            None if name == "void" => Type::Void,
            None => Type::concrete(name),
        }
    }

    pub fn int() -> Self {
        Type::concrete("int")
    }

    pub fn boolean() -> Self {
        Type::concrete("boolean")
    }

    pub fn array_of(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Element type of an array type.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Fully qualified name, used for ordering and encoding keys.
    pub fn qualified_name(&self) -> String {
        self.name(NameStyle::Qualified)
    }

    pub fn name(&self, style: NameStyle) -> String {
        match self {
            Type::Void => "void".to_string(),
            Type::Concrete(name) => match style {
                NameStyle::Qualified => name.clone(),
                NameStyle::Simple => simplify(name).to_string(),
            },
            Type::Array(elem) => format!("{}[]", elem.name(style)),
        }
    }

    /// Source text of the value a freshly declared variable of this type holds.
    pub fn default_value(&self) -> &'static str {
        match self {
            Type::Concrete(name) => match name.as_str() {
                "int" | "long" | "short" | "byte" => "0",
                "double" | "float" => "0.0",
                "boolean" => "false",
                "char" => "'\\0'",
                _ => "null",
            },
            _ => "null",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Strips the package prefix of a qualified name, keeping any type arguments intact.
pub fn simplify(name: &str) -> &str {
    let head = name.find('<').map_or(name, |i| &name[..i]);
    match head.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => name,
    }
}
