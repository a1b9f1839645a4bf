//! Closed form expressions a node can be classified with, and their scores.

use super::{Domain, Leaf, Node};
use crate::config::Config;
use crate::expr::{mask_of, Expr};

pub(super) struct Candidate {
    pub score: i64,
    pub leaf: Leaf,
}

/// Largest divisor tried for modular expressions.
const MAX_DIVISOR: u32 = 10;

// Candidates in order of preference on equal score.
pub(super) fn candidates(node: &Node, config: &Config, domain: &Domain) -> Vec<Candidate> {
    let mut candidates = Scorer {
        node,
        domain,
        candidates: vec![],
    };

    candidates.constants();
    candidates.single_gap();
    candidates.contiguous();
    candidates.modular();
    if config.bitmask_expressions {
        candidates.bitmask(config.word_size);
    }
    candidates.compound(config);

    candidates.candidates
}

struct Scorer<'a> {
    node: &'a Node,
    domain: &'a Domain,
    candidates: Vec<Candidate>,
}

impl Scorer<'_> {
    fn push(&mut self, base: i64, expr: Expr, mut handles_low: bool, mut handles_high: bool) {
        // A root expression is trivially correct past a span edge that is the domain edge
        if self.node.is_root() {
            handles_low |= self.node.span_first == self.domain.first;
            handles_high |= self.node.span_last == self.domain.limit;
        }

        let bonus = 5 * i64::from(handles_low)
            + 5 * i64::from(handles_high)
            + 15 * i64::from(handles_low && handles_high);

        self.candidates.push(Candidate {
            score: base * (100 + bonus) / 100,
            leaf: Leaf {
                expr,
                handles_low,
                handles_high,
            },
        });
    }

    fn constants(&mut self) {
        // Only claim edges at the root when the span reaches the domain edge
        let edges = !self.node.is_root();

        if self.node.always_false() {
            self.push(1000, Expr::Const(false), edges, edges);
        }

        if self.node.always_true() {
            self.push(1000, Expr::Const(true), edges, edges);
        }
    }

    // c != A, or a single comparison when the gap is at an edge of the span
    fn single_gap(&mut self) {
        let set = &self.node.set;
        if set.is_empty() || set.len() + 1 != self.node.span_size() {
            return;
        }

        let (span_first, span_last) = self.node.span();
        let gap = match set.inverse(span_first, span_last).first() {
            Some(gap) => gap,
            None => return,
        };

        if gap == span_first {
            self.push(750, Expr::Ge(gap + 1), true, false);
        } else if gap == span_last {
            self.push(750, Expr::Le(gap - 1), false, true);
        } else {
            self.push(750, Expr::Ne(gap), false, false);
        }
    }

    // c == A, A <= c, c <= B, A <= c && c <= B
    fn contiguous(&mut self) {
        let set = &self.node.set;
        if set.is_empty() || set.len() >= self.node.span_size() || !set.is_contiguous() {
            return;
        }

        let (first, last) = match set.bounds() {
            Some(bounds) => bounds,
            None => return,
        };
        let (span_first, span_last) = self.node.span();

        if first == last {
            self.push(750, Expr::Eq(first), true, true);
        } else if first > span_first && last < span_last {
            self.push(
                750,
                Expr::and(vec![Expr::Ge(first), Expr::Le(last)]),
                true,
                true,
            );
        } else if last < span_last {
            self.push(750, Expr::Le(last), false, true);
        } else {
            self.push(750, Expr::Ge(first), true, false);
        }
    }

    // (c + add) % div == 0, with range checks where congruent values outside of the set fall in
    // the span
    fn modular(&mut self) {
        let set = &self.node.set;
        let (first, last) = match set.bounds() {
            Some(bounds) => bounds,
            None => return,
        };
        let (span_first, span_last) = self.node.span();

        for div in 2..=MAX_DIVISOR {
            for add in 0..div {
                if (u64::from(first) + u64::from(add)) % u64::from(div) != 0 {
                    continue;
                }

                let matches = (first..=last).all(|i| {
                    ((u64::from(i) + u64::from(add)) % u64::from(div) == 0) == set.contains(i)
                });
                if !matches {
                    continue;
                }

                let div_64 = u64::from(div);
                let add_64 = u64::from(add);
                let lowest_congruent =
                    u64::from(span_first) + (div_64 - (u64::from(span_first) + add_64) % div_64) % div_64;
                let highest_congruent =
                    u64::from(span_last) - (u64::from(span_last) + add_64) % div_64;

                let mut score = 500;
                let mut bools = vec![];
                let low_guard = lowest_congruent < u64::from(first);
                let high_guard = highest_congruent > u64::from(last);
                if add != 0 {
                    score -= 10;
                }
                if low_guard {
                    bools.push(Expr::Ge(first));
                    score -= 10;
                }
                if high_guard {
                    bools.push(Expr::Le(last));
                    score -= 10;
                }
                bools.push(Expr::Mod { add, div });

                self.push(score, Expr::and(bools), low_guard, high_guard);
                return;
            }
        }
    }

    // (1 << (c - first)) & mask
    fn bitmask(&mut self, word_size: u32) {
        let set = &self.node.set;
        let (first, last) = match set.bounds() {
            Some(bounds) => bounds,
            None => return,
        };
        if u64::from(last - first) + 1 > u64::from(word_size) {
            return;
        }
        let (span_first, span_last) = self.node.span();

        let mask = mask_of(set.iter().map(|value| value - first));

        let mut bools = vec![];
        let handles_low = first > span_first;
        let handles_high = last < span_last;
        if handles_low {
            bools.push(Expr::Ge(first));
        }
        if handles_high {
            bools.push(Expr::Le(last));
        }
        bools.push(Expr::Bit {
            offset: first,
            mask,
        });

        let score = 500 - 10 * bools.len() as i64;
        self.push(score, Expr::and(bools), handles_low, handles_high);
    }

    // (A <= c && c <= B) || c == C || ...
    fn compound(&mut self, config: &Config) {
        let set = &self.node.set;
        if set.is_empty() {
            return;
        }
        let disjuncts = set.sparse_value_count() + set.contiguous_subrange_count();
        if disjuncts > config.compound_boolean_limit && self.node.subdivision_allowed(config) {
            return;
        }
        let (span_first, span_last) = self.node.span();

        let mut bools = Vec::with_capacity(disjuncts);
        let mut comparisons = 0;
        let mut closed = true;

        for (first, last) in set.ranges() {
            let mut ands = vec![];
            if first > span_first {
                ands.push(Expr::Ge(first));
            }
            if last < span_last {
                ands.push(Expr::Le(last));
            }
            comparisons += ands.len() as i64;
            closed &= ands.len() == 2;
            bools.push(Expr::and(ands));
        }

        for value in set.values() {
            bools.push(Expr::Eq(value));
            comparisons += 1;
        }

        let mut score = 500;
        if self.node.is_root() && comparisons <= 4 {
            score += 200;
        }
        score -= 20 * comparisons;

        self.push(score, Expr::or(bools), closed, closed);
    }
}
