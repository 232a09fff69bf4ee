//! The closed set of components a synthesis run may call.
//!
//! A catalog file is TOML: a list of `[[component]]` tables, each a
//! [`ComponentRecord`], plus an optional `arrays` list of element types whose
//! array operations should be offered.
//!
//! ```toml
//! arrays = ["int"]
//!
//! [[component]]
//! kind = "method"
//! declaring = "java.util.List"
//! name = "get"
//! returns = { param = "E" }
//! args = ["int"]
//! instantiate = ["java.lang.Integer"]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ModelError, Result};
use crate::function::{ComponentRecord, FunctionData, Kind};
use crate::types::{NameStyle, Type};

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "component")]
    components: Vec<ComponentRecord>,
    #[serde(default)]
    arrays: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    components: Vec<Rc<FunctionData>>,
    array_ops: HashMap<(Kind, Type), Rc<FunctionData>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, refusing ones that could not be instantiated.
    pub fn register(&mut self, data: FunctionData) -> Result<Rc<FunctionData>> {
        if !data.is_valid() {
            return Err(ModelError::NonInstantiable(data.signature(NameStyle::Qualified)));
        }
        if data.kind.is_array_op() {
            let elem = data
                .arg_types
                .first()
                .and_then(Type::element)
                .cloned()
                .unwrap_or(Type::Void);
            let entry = self.array_ops.entry((data.kind, elem)).or_insert_with(|| Rc::new(data));
            return Ok(Rc::clone(entry));
        }
        let data = Rc::new(data);
        self.components.push(Rc::clone(&data));
        Ok(data)
    }

    /// The array operation of `kind` over `elem[]`, created on first use.
    pub fn array_op(&mut self, kind: Kind, elem: Type) -> Rc<FunctionData> {
        let entry = self
            .array_ops
            .entry((kind, elem.clone()))
            .or_insert_with(|| Rc::new(FunctionData::array_op(kind, elem)));
        Rc::clone(entry)
    }

    /// Instantiates every record, once per listed type argument (or once
    /// erased when none are listed). Instantiations that are not valid are
    /// logged and left out.
    pub fn from_records(records: &[ComponentRecord]) -> Self {
        let mut catalog = Self::new();
        for record in records {
            let substitutions: Vec<Option<Type>> = if record.instantiate.is_empty() {
                vec![None]
            } else {
                record.instantiate.iter().map(|t| Some(Type::parse(t))).collect()
            };
            for sub in substitutions {
                let data = FunctionData::from_record(record, sub.as_ref());
                if let Err(err) = catalog.register(data) {
                    warn!(declaring = %record.declaring, name = %record.name, "skipping component: {err}");
                }
            }
        }
        debug!(
            components = catalog.components.len(),
            array_ops = catalog.array_ops.len(),
            "built catalog"
        );
        catalog
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(source)?;
        let mut catalog = Self::from_records(&file.components);
        for elem in &file.arrays {
            let elem = Type::parse(elem);
            for kind in [Kind::ArrayGet, Kind::ArraySet, Kind::ArrayLength] {
                catalog.array_op(kind, elem.clone());
            }
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Number of descriptors, array operations included.
    pub fn len(&self) -> usize {
        self.components.len() + self.array_ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Components in registration order, array operations excluded.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<FunctionData>> {
        self.components.iter()
    }

    /// Components declared by `declaring` under `name`.
    pub fn lookup<'a>(&'a self, declaring: &'a str, name: &'a str) -> impl Iterator<Item = &'a Rc<FunctionData>> {
        let declaring = Type::parse(declaring);
        self.components
            .iter()
            .filter(move |c| c.callee_type.as_ref() == Some(&declaring) && c.name(NameStyle::Qualified) == name)
    }

    /// Every descriptor in display order.
    pub fn sorted(&self) -> Vec<Rc<FunctionData>> {
        let mut all: Vec<Rc<FunctionData>> = self
            .components
            .iter()
            .chain(self.array_ops.values())
            .cloned()
            .collect();
        all.sort_by(|a, b| a.compare_to(b));
        all
    }
}
