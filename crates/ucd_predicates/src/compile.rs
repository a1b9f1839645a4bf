//! Compiles a set of code points into a predicate.
//!
//! Each [`Node`] classifies the inputs of its span. A node either picks the best scoring closed
//! form expression, packs the set into a bitmask table, or splits its range into children and
//! dispatches on the child index.

mod candidates;
mod dispatch;

pub use dispatch::{Case, Dispatch, Tail};

use crate::code_unit::{CodeUnit, MAX_CODE_POINT};
use crate::config::{Config, ConfigError};
use crate::expr::Expr;
use crate::sparse_set::{Element, SetError, SparseSet};

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

/// Largest value checked exhaustively by [`Predicate::verify`].
pub const VERIFY_LIMIT: u32 = 0x11FFFF;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(
        "values {first:#X} - {last:#X} are outside of the span {span_first:#X} - {span_last:#X}"
    )]
    OutOfSpan {
        first: u32,
        last: u32,
        span_first: u32,
        span_last: u32,
    },

    #[error("dispatch over {first:#X} - {last:#X} has neither cases nor a default")]
    UnhandledDispatch { first: u32, last: u32 },

    #[error("predicate returns {actual} for {value:#X}")]
    Mismatch { value: u32, actual: bool },

    #[error(transparent)]
    Set(#[from] SetError),
}

/// The inputs a predicate is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Span of the root node
    pub first: u32,
    pub last: u32,

    /// Largest input. Inputs in `(last, limit]` are classified as false.
    pub limit: u32,
}

impl Domain {
    pub fn new(first: u32, last: u32) -> Domain {
        assert!(first <= last, "domain bounds are reversed");
        Domain {
            first,
            last,
            limit: last,
        }
    }

    /// All values of a code unit type, with the root span capped at the largest code point.
    pub fn for_code_unit(code_unit: &CodeUnit) -> Domain {
        Domain {
            first: 0,
            last: code_unit.max().min(MAX_CODE_POINT),
            limit: code_unit.max(),
        }
    }
}

/// A node of the predicate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    set: SparseSet,
    span_first: u32,
    span_last: u32,
    level: u32,
    // `None` until `finish`
    logic: Option<Logic>,
}

/// How a node classifies its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logic {
    Expr(Leaf),
    Table(Table),
    Dispatch(Dispatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub expr: Expr,

    /// The expression is false for every input below the span
    pub handles_low: bool,

    /// The expression is false for every input above the span
    pub handles_high: bool,
}

impl Leaf {
    pub fn closed(&self) -> bool {
        self.handles_low && self.handles_high
    }
}

/// Inputs below `below` or above `above` are rejected before the rest of the node's logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guard {
    pub below: Option<u32>,
    pub above: Option<u32>,
}

impl Guard {
    pub fn is_empty(&self) -> bool {
        self.below.is_none() && self.above.is_none()
    }

    pub fn excludes(&self, c: u32) -> bool {
        matches!(self.below, Some(below) if c < below)
            || matches!(self.above, Some(above) if c > above)
    }
}

/// One bit per value in `[offset, offset + words.len() * word_size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub guard: Guard,
    pub offset: u32,
    pub word_size: u32,
    pub words: Vec<u64>,
}

impl Table {
    fn eval(&self, c: u32) -> bool {
        if self.guard.excludes(c) {
            return false;
        }
        let relative = u64::from(c - self.offset);
        let word_size = u64::from(self.word_size);
        let word = self.words[(relative / word_size) as usize];
        word & (1u64 << (relative % word_size)) != 0
    }
}

impl Node {
    pub fn new(span_first: u32, span_last: u32, level: u32) -> Node {
        Node::with_set(SparseSet::new(), span_first, span_last, level)
    }

    pub(crate) fn with_set(set: SparseSet, span_first: u32, span_last: u32, level: u32) -> Node {
        assert!(span_first <= span_last, "node span is reversed");
        Node {
            set,
            span_first,
            span_last,
            level,
            logic: None,
        }
    }

    /// Add values to classify as true. Fails after the node is finished.
    pub fn add<E: Into<Element>>(&mut self, element: E) -> Result<(), SetError> {
        self.set.add(element)
    }

    pub fn set(&self) -> &SparseSet {
        &self.set
    }

    pub fn span(&self) -> (u32, u32) {
        (self.span_first, self.span_last)
    }

    pub fn span_size(&self) -> u64 {
        u64::from(self.span_last - self.span_first) + 1
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn is_finished(&self) -> bool {
        self.logic.is_some()
    }

    pub fn logic(&self) -> &Logic {
        match &self.logic {
            Some(logic) => logic,
            None => panic!("node has not been finished"),
        }
    }

    pub fn always_false(&self) -> bool {
        self.set.is_empty()
    }

    pub fn always_true(&self) -> bool {
        !self.set.is_empty() && self.set.len() == self.span_size()
    }

    /// The node's expression when it has one.
    pub fn leaf(&self) -> Option<&Leaf> {
        match self.logic() {
            Logic::Expr(leaf) => Some(leaf),
            _ => None,
        }
    }

    // Width of the range between the first and last member, 0 for an empty set.
    fn width(&self) -> u64 {
        match self.set.bounds() {
            Some((first, last)) => u64::from(last - first) + 1,
            None => 0,
        }
    }

    fn subdivision_allowed(&self, config: &Config) -> bool {
        let width = self.width();
        (config.depth_limit == 0 || self.level + 1 < config.depth_limit)
            && width > 4
            && config.child_size(width) < width
    }

    fn makes_bitmask_table(&self, config: &Config) -> bool {
        let width = self.width();
        let word_size = u64::from(config.word_size);
        config.bitmask_tables
            && width >= word_size * 4
            && width <= word_size * 256
            && !self.set.is_contiguous()
            && self.set.len() * 40 >= width
    }

    // Rejects inputs outside of the set's bounds, where the span (or at the root, the domain)
    // extends past them.
    fn exclusion_guard(&self, domain: &Domain) -> Guard {
        let (first, last) = match self.set.bounds() {
            Some(bounds) => bounds,
            None => return Guard::default(),
        };
        let high_edge = if self.is_root() {
            domain.limit
        } else {
            self.span_last
        };
        Guard {
            below: if first > self.span_first {
                Some(first)
            } else {
                None
            },
            above: if last < high_edge { Some(last) } else { None },
        }
    }

    /// Decide how the node classifies its span. Finishes the set if needed. Runs once, later
    /// calls do nothing.
    pub fn finish(&mut self, config: &Config, domain: &Domain) -> Result<(), CompileError> {
        if self.logic.is_some() {
            return Ok(());
        }

        if !self.set.is_finished() {
            self.set.finish()?;
        }

        if let Some((first, last)) = self.set.bounds() {
            if first < self.span_first || last > self.span_last {
                return Err(CompileError::OutOfSpan {
                    first,
                    last,
                    span_first: self.span_first,
                    span_last: self.span_last,
                });
            }
        }

        let mut candidates = candidates::candidates(self, config, domain);
        // Stable, so the first of the best scoring candidates wins
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        for candidate in &candidates {
            trace!(
                level = self.level,
                score = candidate.score,
                "candidate {}",
                candidate.leaf.expr
            );
        }

        if let Some(best) = candidates.into_iter().next() {
            let leaf = if self.is_root() {
                self.clamp(best.leaf, domain)
            } else {
                best.leaf
            };
            debug!(
                level = self.level,
                span_first = self.span_first,
                span_last = self.span_last,
                score = best.score,
                "expression {}",
                leaf.expr
            );
            self.logic = Some(Logic::Expr(leaf));
            return Ok(());
        }

        let guard = self.exclusion_guard(domain);

        if self.makes_bitmask_table(config) {
            let table = self.bitmask_table(guard, config.word_size);
            debug!(
                level = self.level,
                words = table.words.len(),
                "bitmask table for {:#X} - {:#X}",
                table.offset,
                self.span_last
            );
            self.logic = Some(Logic::Table(table));
            return Ok(());
        }

        let dispatch = dispatch::build(self, guard, config, domain)?;
        self.logic = Some(Logic::Dispatch(dispatch));
        Ok(())
    }

    // Add the range checks a root expression needs to be correct over the whole domain.
    fn clamp(&self, leaf: Leaf, domain: &Domain) -> Leaf {
        let mut guards: SmallVec<[Expr; 3]> = SmallVec::new();
        if !leaf.handles_low && self.span_first > domain.first {
            guards.push(Expr::Ge(self.span_first));
        }
        if !leaf.handles_high && self.span_last < domain.limit {
            guards.push(Expr::Le(self.span_last));
        }
        if guards.is_empty() {
            return leaf;
        }
        guards.push(leaf.expr);
        Leaf {
            expr: Expr::and(guards),
            handles_low: true,
            handles_high: true,
        }
    }

    fn bitmask_table(&self, guard: Guard, word_size: u32) -> Table {
        let (first, _) = self.set.bounds().unwrap_or((self.span_first, self.span_first));
        let word_size_64 = u64::from(word_size);
        let mut words = vec![0u64; ((self.width() + word_size_64 - 1) / word_size_64) as usize];
        for value in self.set.iter() {
            let relative = u64::from(value - first);
            words[(relative / word_size_64) as usize] |= 1u64 << (relative % word_size_64);
        }
        Table {
            guard,
            offset: first,
            word_size,
            words,
        }
    }

    /// Classify `c`. `c` must be in the span, or for the root, in the domain.
    pub fn evaluate(&self, c: u32) -> bool {
        match self.logic() {
            Logic::Expr(leaf) => leaf.expr.eval(c, None),
            Logic::Table(table) => table.eval(c),
            Logic::Dispatch(dispatch) => dispatch.eval(c),
        }
    }

    /// Number of nodes in the tree rooted at this node.
    pub fn node_count(&self) -> usize {
        match self.logic() {
            Logic::Dispatch(dispatch) => {
                1 + dispatch.children.iter().map(Node::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Compiles finished sets with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new(config: Config) -> Result<Compiler, ConfigError> {
        config.validate()?;
        Ok(Compiler { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile `set` into a predicate over `domain`. An unfinished set is finished first.
    pub fn compile(&self, set: &SparseSet, domain: Domain) -> Result<Predicate, CompileError> {
        let mut root = Node::with_set(set.clone(), domain.first, domain.last, 0);
        root.finish(&self.config, &domain)?;
        debug!(
            nodes = root.node_count(),
            "compiled {} values over {:#X} - {:#X}",
            root.set.len(),
            domain.first,
            domain.last
        );
        Ok(Predicate {
            root,
            domain,
            word_size: self.config.word_size,
        })
    }
}

/// A compiled predicate, total over its domain.
#[derive(Debug, Clone)]
pub struct Predicate {
    root: Node,
    domain: Domain,
    word_size: u32,
}

impl Predicate {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn word_size(&self) -> u32 {
        self.word_size
    }

    /// The code points the predicate was compiled from.
    pub fn set(&self) -> &SparseSet {
        &self.root.set
    }

    /// Evaluate the predicate for `c`, which must be in `[domain.first, domain.limit]`.
    pub fn evaluate(&self, c: u32) -> bool {
        self.root.evaluate(c)
    }

    /// Check the predicate against `set` for every input of the domain up to [`VERIFY_LIMIT`],
    /// and for the 256 largest inputs.
    pub fn verify(&self, set: &SparseSet) -> Result<(), CompileError> {
        let exhaustive_last = self.domain.limit.min(VERIFY_LIMIT);
        let top_first = self
            .domain
            .limit
            .saturating_sub(255)
            .max(exhaustive_last.saturating_add(1));

        let mut inputs = (self.domain.first..=exhaustive_last).chain(top_first..=self.domain.limit);

        match inputs.find(|c| self.evaluate(*c) != set.contains(*c)) {
            Some(value) => Err(CompileError::Mismatch {
                value,
                actual: self.evaluate(value),
            }),
            None => Ok(()),
        }
    }
}
