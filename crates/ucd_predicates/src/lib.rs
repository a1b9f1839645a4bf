//! Compiles sets of Unicode code points into branch-light boolean classification functions
//! (`is_letter`, `is_whitespace`, ...) for each code unit type, emitted as C++ or Rust source.
//!
//! A set is compiled by recursively subdividing its span and, for each sub-span, picking the
//! cheapest of a handful of candidate expressions (constants, range checks, modular arithmetic,
//! bitmask tests), a bitmask lookup table, or a dispatch over fixed-size children.

#![allow(clippy::len_without_is_empty, clippy::large_enum_variant)]

mod collections;
mod display;

pub mod cache;
pub mod code_unit;
pub mod compile;
pub mod config;
pub mod emit;
pub mod error;
pub mod expr;
pub mod sparse_set;
pub mod supplier;
pub mod ucd;

#[cfg(test)]
mod tests;

pub use cache::CodePointCache;
pub use code_unit::CodeUnit;
pub use compile::{Compiler, Domain, Predicate};
pub use config::Config;
pub use error::{Error, Result};
pub use expr::Expr;
pub use sparse_set::{Element, SparseSet};
pub use supplier::{DomainSupplier, Query, UcdSupplier};
pub use ucd::UnicodeDatabase;
