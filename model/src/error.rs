use std::path::PathBuf;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A component whose generic signature could not be made concrete.
    #[error("non-instantiable signature: {0}")]
    NonInstantiable(String),
    #[error("variable `{name}` is already declared in this program")]
    DuplicateVariable { name: String },
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = result::Result<T, ModelError>;
