use crate::cache::CacheError;
use crate::compile::CompileError;
use crate::config::ConfigError;
use crate::sparse_set::SetError;
use crate::ucd::UcdError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of a generation run. None of these are recoverable: generation stops at the first
/// error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Set(#[from] SetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Ucd(#[from] UcdError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("generated Rust code does not parse: {0}")]
    Syntax(#[from] syn::Error),
}
