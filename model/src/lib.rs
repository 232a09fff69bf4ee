pub mod catalog;
pub mod config;
pub mod emit;
pub mod encoding;
pub mod error;
pub mod function;
pub mod mining;
pub mod program;
pub mod rename;
pub mod report;
pub mod timing;
pub mod traverse;
pub mod tree;
pub mod types;
pub mod usefulness;

pub use crate::catalog::Catalog;
pub use crate::config::{Settings, SynthesisTask};
pub use crate::emit::{Emit, Emitter};
pub use crate::encoding::{Encode, Encoder, EncodingTable};
pub use crate::error::{ModelError, Result};
pub use crate::function::{ComponentRecord, FunctionData, Kind, TypeSig};
pub use crate::mining::{mean_usefulness, Fragment, FragmentCorpus};
pub use crate::program::Program;
pub use crate::rename::{merge_compatible, CompatibilityMerge, Mutator, Renames, Substitute};
pub use crate::report::{Algorithm, SearchCounters, SynthesisReport};
pub use crate::timing::TimeLog;
pub use crate::traverse::StructuralSize;
pub use crate::tree::{Condition, Expression, Literal, Operator, Statement, StatementKind, Var};
pub use crate::types::{NameStyle, Type};
pub use crate::usefulness::{expression_usefulness, statement_usefulness};
