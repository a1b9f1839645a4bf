//! Resolves code point queries ("letters below 128", "0-9 and a-f") to finished sets for a
//! particular code unit.

use crate::cache::{content_hash, CodePointCache};
use crate::code_unit::{CodeUnit, MAX_CODE_POINT};
use crate::error::Result;
use crate::sparse_set::{Element, SparseSet};
use crate::ucd::UnicodeDatabase;

use serde::Serialize;
use tracing::debug;

/// Values past the largest code point included in inverse sets, so that tests of a predicate also
/// cover a few invalid inputs.
const INVERSE_OVERSHOOT: u32 = 10;

/// Code points that are in any of `categories`, listed in `values`, or have all of `properties`,
/// limited to `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub bits: u32,
    pub min: u32,
    pub max: u32,
    pub categories: Vec<String>,
    pub properties: Vec<String>,
    pub values: Vec<Element>,
}

impl Query {
    /// Empty query for `code_unit`, over all code points.
    pub fn new(code_unit: &CodeUnit) -> Query {
        Query {
            bits: code_unit.bits,
            min: 0,
            max: MAX_CODE_POINT,
            categories: vec![],
            properties: vec![],
            values: vec![],
        }
    }

    pub fn in_categories(mut self, categories: &[&str]) -> Query {
        self.categories
            .extend(categories.iter().map(|name| (*name).to_owned()));
        self
    }

    pub fn with_properties(mut self, properties: &[&str]) -> Query {
        self.properties
            .extend(properties.iter().map(|name| (*name).to_owned()));
        self
    }

    pub fn with_values<E: Into<Element>>(mut self, values: impl IntoIterator<Item = E>) -> Query {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn at_least(mut self, min: u32) -> Query {
        self.min = min;
        self
    }

    pub fn at_most(mut self, max: u32) -> Query {
        self.max = max;
        self
    }

    /// Cache key of the query's code points.
    pub fn hash(&self) -> Result<String> {
        Ok(content_hash(self)?)
    }

    /// Cache key of the inverse of the query's code points.
    pub fn inverse_hash(&self) -> Result<String> {
        Ok(content_hash(&(self.hash()?, -1))?)
    }
}

/// Source of the sets predicates are compiled from.
pub trait DomainSupplier {
    /// Finished set of the code points matching `query` that `code_unit` can represent.
    fn code_points(&mut self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet>;

    /// Finished set of the values of `code_unit` not matching `query`, up to a little past the
    /// largest code point.
    fn inverse(&mut self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet>;
}

/// Resolves queries against a [`UnicodeDatabase`], memoizing results in a [`CodePointCache`].
pub struct UcdSupplier<'a> {
    db: &'a UnicodeDatabase,
    cache: CodePointCache,
}

impl<'a> UcdSupplier<'a> {
    pub fn new(db: &'a UnicodeDatabase, cache: CodePointCache) -> Self {
        UcdSupplier { db, cache }
    }

    pub fn cache(&self) -> &CodePointCache {
        &self.cache
    }

    fn resolve(&self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet> {
        let min = query.min;
        let max = query.max.min(code_unit.max_code_point());
        let mut set = SparseSet::new();

        let mut add = |element: Element| -> Result<()> {
            let first = element.first().max(min);
            let last = element.last().min(max);
            if first > last {
                return Ok(());
            }
            match code_unit.dead_zone() {
                Some((dead_first, dead_last)) if first <= dead_last && dead_first <= last => {
                    if first < dead_first {
                        set.add((first, dead_first - 1))?;
                    }
                    if dead_last < last {
                        set.add((dead_last + 1, last))?;
                    }
                }
                _ => set.add((first, last))?,
            }
            Ok(())
        };

        if !query.categories.is_empty() {
            let categories: Vec<&str> = query.categories.iter().map(String::as_str).collect();
            let mut members = self.db.with_categories(&categories)?;
            members.finish()?;
            for element in members.elements() {
                add(*element)?;
            }
        }

        for element in &query.values {
            add(*element)?;
        }

        if !query.properties.is_empty() {
            let properties: Vec<&str> = query.properties.iter().map(String::as_str).collect();
            let mut members = self.db.with_properties(&properties)?;
            members.finish()?;
            for element in members.elements() {
                add(*element)?;
            }
        }

        set.finish()?;
        Ok(set)
    }

    // Resolve `query`, caching the set and its inverse.
    fn resolve_and_store(&mut self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet> {
        let set = self.resolve(query, code_unit)?;
        let inverse = set.inverse(0, code_unit.max().min(MAX_CODE_POINT + INVERSE_OVERSHOOT));
        debug!(
            code_unit = code_unit.name,
            len = set.len(),
            inverse_len = inverse.len(),
            "resolved code point query"
        );
        self.cache.store(&query.hash()?, &set)?;
        self.cache.store(&query.inverse_hash()?, &inverse)?;
        Ok(set)
    }
}

impl<'a> DomainSupplier for UcdSupplier<'a> {
    fn code_points(&mut self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet> {
        if let Some(set) = self.cache.get(&query.hash()?) {
            return Ok(set.clone());
        }
        self.resolve_and_store(query, code_unit)
    }

    fn inverse(&mut self, query: &Query, code_unit: &CodeUnit) -> Result<SparseSet> {
        let hash = query.inverse_hash()?;
        if self.cache.get(&hash).is_none() {
            self.resolve_and_store(query, code_unit)?;
        }
        match self.cache.get(&hash) {
            Some(set) => Ok(set.clone()),
            None => panic!("inverse set was not cached"),
        }
    }
}
