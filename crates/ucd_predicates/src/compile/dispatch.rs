//! Subdivision of a node into children, and the dispatch that selects between them.

use super::{CompileError, Domain, Guard, Logic, Node};
use crate::config::Config;
use crate::expr::{mask_of, Expr};

use tracing::debug;

/// Selects a child by `selector = (c - offset) / child_size`.
///
/// Evaluation order: `guard`, then `trues` (return true), then `falses` (return false), then
/// `tail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub guard: Guard,
    pub offset: u32,
    pub child_size: u32,
    pub children: Vec<Node>,
    pub trues: Expr,
    pub falses: Expr,
    pub tail: Tail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tail {
    Return(Expr),

    /// Return `default` unless the selector is `index`, otherwise continue with child `index`
    Guarded { index: u32, default: bool },

    /// Continue with child `index`. Other children are handled before the tail.
    Inline(u32),

    /// `default` of `None` means children without a case are handled before the tail
    Switch {
        cases: Vec<Case>,
        default: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Return { index: u32, value: bool },
    Child(u32),
}

impl Case {
    pub fn index(&self) -> u32 {
        match self {
            Case::Return { index, .. } => *index,
            Case::Child(index) => *index,
        }
    }
}

impl Dispatch {
    pub fn selector(&self, c: u32) -> u64 {
        u64::from(c - self.offset) / u64::from(self.child_size)
    }

    pub fn child(&self, index: u32) -> &Node {
        &self.children[index as usize]
    }

    /// Number of references to the selector in the generated code.
    pub fn selector_references(&self) -> usize {
        let tail = match &self.tail {
            Tail::Return(expr) => expr.selector_references(),
            Tail::Guarded { .. } | Tail::Switch { .. } => 1,
            Tail::Inline(_) => 0,
        };
        self.trues.selector_references() + self.falses.selector_references() + tail
    }

    pub(super) fn eval(&self, c: u32) -> bool {
        if self.guard.excludes(c) {
            return false;
        }

        let selector = self.selector(c);

        if self.trues.eval(c, Some(selector)) {
            return true;
        }

        if self.falses.eval(c, Some(selector)) {
            return false;
        }

        match &self.tail {
            Tail::Return(expr) => expr.eval(c, Some(selector)),
            Tail::Guarded { index, default } => {
                if selector != u64::from(*index) {
                    *default
                } else {
                    self.child(*index).evaluate(c)
                }
            }
            Tail::Inline(index) => self.child(*index).evaluate(c),
            Tail::Switch { cases, default } => {
                match cases.iter().find(|case| u64::from(case.index()) == selector) {
                    Some(Case::Return { value, .. }) => *value,
                    Some(Case::Child(index)) => self.child(*index).evaluate(c),
                    None => match default {
                        Some(default) => *default,
                        None => panic!("unreachable dispatch branch for {:#X}", c),
                    },
                }
            }
        }
    }
}

// What the tail needs to do for a child that is not handled before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    // Handled before the tail, any outcome will do
    DontCare,
    Const(bool),
    Child,
}

pub(super) fn build(
    node: &Node,
    guard: Guard,
    config: &Config,
    domain: &Domain,
) -> Result<Dispatch, CompileError> {
    let (first, last) = match node.set.bounds() {
        Some(bounds) => bounds,
        None => panic!("subdividing an empty node"),
    };
    let width = u64::from(last - first) + 1;
    let child_size = config.child_size(width);
    let child_count = (width + child_size - 1) / child_size;

    debug!(
        level = node.level,
        children = child_count,
        child_size,
        "subdividing {:#X} - {:#X}",
        first,
        last
    );

    let mut children = Vec::with_capacity(child_count as usize);
    for child_idx in 0..child_count {
        let child_first = u64::from(first) + child_idx * child_size;
        let child_last = (child_first + child_size - 1).min(u64::from(last));
        let (child_first, child_last) = (child_first as u32, child_last as u32);
        let mut child = Node::with_set(
            node.set.subset(child_first, child_last),
            child_first,
            child_last,
            node.level + 1,
        );
        child.finish(config, domain)?;
        children.push(child);
    }

    let mut trues = vec![];
    let mut falses = vec![];
    let mut entries: Vec<Entry> = children
        .iter()
        .map(|child| {
            if child.always_false() {
                Entry::Const(false)
            } else if child.always_true() {
                Entry::Const(true)
            } else {
                Entry::Child
            }
        })
        .collect();

    // Children that are always true or always false become a single bit test on the selector
    if config.hoisting() {
        for value in [true, false] {
            let indices: Vec<u32> = (0..entries.len() as u32)
                .filter(|idx| entries[*idx as usize] == Entry::Const(value))
                .collect();
            if indices.len() >= 2 && indices.len() <= config.word_size as usize {
                let test = Expr::SelBit {
                    mask: mask_of(indices.iter().copied()),
                };
                if value {
                    trues.push(test);
                } else {
                    falses.push(test);
                }
                for idx in indices {
                    entries[idx as usize] = Entry::DontCare;
                }
            }
        }
    }

    // Single value children that test for their value without range checks are hoisted into the
    // leading OR
    for (idx, child) in children.iter().enumerate() {
        if entries[idx] != Entry::Child || child.set.len() != 1 {
            continue;
        }
        if let Logic::Expr(leaf) = child.logic() {
            if leaf.closed() {
                trues.push(leaf.expr.clone());
                entries[idx] = Entry::Const(false);
            }
        }
    }

    let tail = tail(&children, &entries, first, last)?;

    let (trues, falses, tail) = simplify(Expr::or(trues), Expr::or(falses), tail);

    Ok(Dispatch {
        guard,
        offset: first,
        child_size: child_size as u32,
        children,
        trues,
        falses,
        tail,
    })
}

fn tail(
    children: &[Node],
    entries: &[Entry],
    first: u32,
    last: u32,
) -> Result<Tail, CompileError> {
    let count = |entry: Entry| entries.iter().filter(|e| **e == entry).count();
    let true_count = count(Entry::Const(true));
    let false_count = count(Entry::Const(false));
    let child_count = count(Entry::Child);

    if child_count == 0 && true_count == 0 {
        // Everything that is true is caught by `trues`
        return Ok(Tail::Return(Expr::Const(false)));
    }

    if child_count == 0 && false_count == 0 {
        return Ok(Tail::Return(Expr::Const(true)));
    }

    let default = if false_count > true_count {
        Some(false)
    } else if true_count > 0 {
        Some(true)
    } else {
        None
    };

    let cases: Vec<Case> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let index = idx as u32;
            match entry {
                Entry::DontCare => None,
                Entry::Const(value) if Some(*value) == default => None,
                Entry::Const(value) => Some(Case::Return {
                    index,
                    value: *value,
                }),
                Entry::Child => Some(Case::Child(index)),
            }
        })
        .collect();

    match cases.as_slice() {
        [] => match default {
            Some(default) => Ok(Tail::Return(Expr::Const(default))),
            // No default means no constant entries, and without children every entry was
            // handled by the early returns above
            None => Err(CompileError::UnhandledDispatch { first, last }),
        },
        [case] => {
            let index = case.index();
            let expr = match case {
                Case::Return { value, .. } => Some(Expr::Const(*value)),
                Case::Child(index) => children[*index as usize]
                    .leaf()
                    .map(|leaf| leaf.expr.clone()),
            };
            Ok(match (expr, default) {
                (Some(expr), Some(true)) => Tail::Return(Expr::or(vec![Expr::SelNe(index), expr])),
                (Some(expr), Some(false)) => {
                    Tail::Return(Expr::and(vec![Expr::SelEq(index), expr]))
                }
                (Some(expr), None) => Tail::Return(expr),
                (None, Some(default)) => Tail::Guarded { index, default },
                (None, None) => Tail::Inline(index),
            })
        }
        _ => Ok(Tail::Switch { cases, default }),
    }
}

// Merge the leading tests into a returned expression. `trues` and `falses` never hold for the same
// input.
fn simplify(trues: Expr, falses: Expr, tail: Tail) -> (Expr, Expr, Tail) {
    let none = || Expr::Const(false);
    match tail {
        Tail::Return(Expr::Const(false)) => (none(), none(), Tail::Return(trues)),
        Tail::Return(Expr::Const(true)) => (none(), none(), Tail::Return(Expr::not(falses))),
        Tail::Return(expr) if falses == none() => {
            (none(), none(), Tail::Return(Expr::or(vec![trues, expr])))
        }
        Tail::Return(expr) if trues == none() => (
            none(),
            none(),
            Tail::Return(Expr::and(vec![Expr::not(falses), expr])),
        ),
        tail => (trues, falses, tail),
    }
}
