//! Resolving catalog functions to code point sets and compiled predicates.

use crate::catalog::Function;

use anyhow::{Context, Result};
use tracing::{debug, info};
use ucd_predicates::{
    CodeUnit, Compiler, Domain, DomainSupplier, Predicate, SparseSet, UcdSupplier,
};

/// The code points of an identification function for one code unit.
pub struct Resolved {
    pub set: SparseSet,

    /// Values of the code unit not in `set`, for negative tests
    pub inverse: SparseSet,

    /// `None` when the set is empty or the code unit forwards to a proxy
    pub predicate: Option<Predicate>,
}

pub struct Generator<'a> {
    supplier: UcdSupplier<'a>,
    compiler: Compiler,
    verify: bool,
}

impl<'a> Generator<'a> {
    pub fn new(supplier: UcdSupplier<'a>, compiler: Compiler, verify: bool) -> Self {
        Generator {
            supplier,
            compiler,
            verify,
        }
    }

    /// Resolve `function` for `code_unit`. Returns `None` for functions that are not identification
    /// functions.
    pub fn resolve(&mut self, function: &Function, code_unit: &CodeUnit) -> Result<Option<Resolved>> {
        let query = match function.query(code_unit) {
            Some(query) => query,
            None => return Ok(None),
        };

        let set = self
            .supplier
            .code_points(&query, code_unit)
            .with_context(|| format!("resolving the code points of {}", function.name))?;
        let inverse = self
            .supplier
            .inverse(&query, code_unit)
            .with_context(|| format!("resolving the inverse of {}", function.name))?;

        let predicate = if set.is_empty() || code_unit.proxy.is_some() {
            None
        } else {
            Some(self.compile(function, &set, code_unit)?)
        };

        Ok(Some(Resolved {
            set,
            inverse,
            predicate,
        }))
    }

    fn compile(&self, function: &Function, set: &SparseSet, code_unit: &CodeUnit) -> Result<Predicate> {
        let predicate = self
            .compiler
            .compile(set, Domain::for_code_unit(code_unit))
            .with_context(|| format!("compiling {}({})", function.name, code_unit.name))?;

        debug!(
            function = function.name,
            code_unit = code_unit.name,
            nodes = predicate.root().node_count(),
            "compiled"
        );

        if self.verify {
            predicate
                .verify(set)
                .with_context(|| format!("verifying {}({})", function.name, code_unit.name))?;
            info!(function = function.name, code_unit = code_unit.name, "verified");
        }

        Ok(predicate)
    }
}
