//! Boolean expressions over a code unit `c`, and optionally over the child index of a dispatch.
//!
//! Synthesis builds these, emitters render them. Build compound expressions with [`Expr::and`],
//! [`Expr::or`] and [`Expr::not`] so that constants are folded away.

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(bool),

    /// `c == A`
    Eq(u32),

    /// `c != A`
    Ne(u32),

    /// `A <= c`
    Ge(u32),

    /// `c <= A`
    Le(u32),

    /// `(c + add) % div == 0`
    Mod { add: u32, div: u32 },

    /// `(1 << (c - offset)) & mask`. Only defined for `c - offset` in `0..64`.
    Bit { offset: u32, mask: u64 },

    /// `selector == A`
    SelEq(u32),

    /// `selector != A`
    SelNe(u32),

    /// `(1 << selector) & mask`
    SelBit { mask: u64 },

    Not(Box<Expr>),

    And(Vec<Expr>),

    Or(Vec<Expr>),
}

impl Expr {
    /// Conjunction of `exprs`. Nested conjunctions are flattened, `true` operands are dropped, and
    /// a `false` operand makes the whole thing `false`.
    pub fn and<I: IntoIterator<Item = Expr>>(exprs: I) -> Expr {
        Expr::junction(exprs, false)
    }

    /// Disjunction of `exprs`, the dual of [`Expr::and`].
    pub fn or<I: IntoIterator<Item = Expr>>(exprs: I) -> Expr {
        Expr::junction(exprs, true)
    }

    // `absorbing` is the constant that decides the junction: `true` for OR, `false` for AND.
    fn junction<I: IntoIterator<Item = Expr>>(exprs: I, absorbing: bool) -> Expr {
        let mut operands: Vec<Expr> = vec![];

        for expr in exprs {
            match expr {
                Expr::Const(value) if value == absorbing => return Expr::Const(absorbing),
                Expr::Const(_) => {}
                Expr::Or(inner) if absorbing => operands.extend(inner),
                Expr::And(inner) if !absorbing => operands.extend(inner),
                other => operands.push(other),
            }
        }

        match operands.len() {
            0 => Expr::Const(!absorbing),
            1 => operands.pop().unwrap_or(Expr::Const(!absorbing)),
            _ if absorbing => Expr::Or(operands),
            _ => Expr::And(operands),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Expr {
        match expr {
            Expr::Const(value) => Expr::Const(!value),
            Expr::Eq(value) => Expr::Ne(value),
            Expr::Ne(value) => Expr::Eq(value),
            Expr::SelEq(index) => Expr::SelNe(index),
            Expr::SelNe(index) => Expr::SelEq(index),
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }

    pub fn is_const(&self) -> Option<bool> {
        match self {
            Expr::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the expression refers to the dispatch child index.
    pub fn uses_selector(&self) -> bool {
        self.selector_references() != 0
    }

    /// Number of times the dispatch child index is referenced.
    pub fn selector_references(&self) -> usize {
        match self {
            Expr::SelEq(_) | Expr::SelNe(_) | Expr::SelBit { .. } => 1,
            Expr::Not(inner) => inner.selector_references(),
            Expr::And(exprs) | Expr::Or(exprs) => {
                exprs.iter().map(Expr::selector_references).sum()
            }
            _ => 0,
        }
    }

    /// Number of comparisons and bit tests in the expression.
    pub fn comparisons(&self) -> usize {
        match self {
            Expr::Const(_) => 0,
            Expr::Not(inner) => inner.comparisons(),
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().map(Expr::comparisons).sum(),
            _ => 1,
        }
    }

    /// Evaluate the expression for code unit `c`. `selector` is the dispatch child index, when
    /// evaluated inside a dispatch.
    ///
    /// Operands of `And` and `Or` are evaluated left to right with short-circuiting, same as the
    /// generated code. Panics when the expression is not defined for `c`, e.g. a bit test with a
    /// shift out of range: generated code would have undefined behavior there.
    pub fn eval(&self, c: u32, selector: Option<u64>) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::Eq(value) => c == *value,
            Expr::Ne(value) => c != *value,
            Expr::Ge(value) => *value <= c,
            Expr::Le(value) => c <= *value,
            Expr::Mod { add, div } => (u64::from(c) + u64::from(*add)) % u64::from(*div) == 0,
            Expr::Bit { offset, mask } => {
                let shift = i64::from(c) - i64::from(*offset);
                assert!(
                    (0..64).contains(&shift),
                    "bit test of {:#X} with offset {:#X} is out of range",
                    c,
                    offset
                );
                (1u64 << shift) & mask != 0
            }
            Expr::SelEq(index) => expect_selector(selector) == u64::from(*index),
            Expr::SelNe(index) => expect_selector(selector) != u64::from(*index),
            Expr::SelBit { mask } => {
                let selector = expect_selector(selector);
                assert!(selector < 64, "selector {} is out of range", selector);
                (1u64 << selector) & mask != 0
            }
            Expr::Not(inner) => !inner.eval(c, selector),
            Expr::And(exprs) => exprs.iter().all(|expr| expr.eval(c, selector)),
            Expr::Or(exprs) => exprs.iter().any(|expr| expr.eval(c, selector)),
        }
    }
}

fn expect_selector(selector: Option<u64>) -> u64 {
    match selector {
        Some(selector) => selector,
        None => panic!("selector test outside of a dispatch"),
    }
}

/// Bitmask with the given bits set.
pub fn mask_of<I: IntoIterator<Item = u32>>(bits: I) -> u64 {
    bits.into_iter().fold(0, |mask, bit| mask | (1u64 << bit))
}

/// Debug rendering, e.g. `(65 <= c && c <= 67) || c == 200`.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Eq(value) => write!(f, "c == {}", value),
            Expr::Ne(value) => write!(f, "c != {}", value),
            Expr::Ge(value) => write!(f, "{} <= c", value),
            Expr::Le(value) => write!(f, "c <= {}", value),
            Expr::Mod { add: 0, div } => write!(f, "c % {} == 0", div),
            Expr::Mod { add, div } => write!(f, "(c + {}) % {} == 0", add, div),
            Expr::Bit { offset, mask } => write!(f, "(1 << (c - {})) & {:#X}", offset, mask),
            Expr::SelEq(index) => write!(f, "sel == {}", index),
            Expr::SelNe(index) => write!(f, "sel != {}", index),
            Expr::SelBit { mask } => write!(f, "(1 << sel) & {:#X}", mask),
            Expr::Not(inner) => write!(f, "!({})", inner),
            Expr::And(exprs) => display_junction(f, exprs, " && "),
            Expr::Or(exprs) => display_junction(f, exprs, " || "),
        }
    }
}

fn display_junction(f: &mut Formatter<'_>, exprs: &[Expr], sep: &str) -> fmt::Result {
    for (idx, expr) in exprs.iter().enumerate() {
        if idx != 0 {
            write!(f, "{}", sep)?;
        }
        match expr {
            Expr::And(_) | Expr::Or(_) | Expr::Bit { .. } | Expr::SelBit { .. } => {
                write!(f, "({})", expr)?
            }
            _ => write!(f, "{}", expr)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding() {
        assert_eq!(Expr::and(vec![]), Expr::Const(true));
        assert_eq!(Expr::or(vec![]), Expr::Const(false));
        assert_eq!(
            Expr::and(vec![Expr::Eq(1), Expr::Const(false)]),
            Expr::Const(false)
        );
        assert_eq!(
            Expr::or(vec![Expr::Eq(1), Expr::Const(true)]),
            Expr::Const(true)
        );
        assert_eq!(Expr::and(vec![Expr::Const(true), Expr::Eq(1)]), Expr::Eq(1));
        assert_eq!(
            Expr::or(vec![Expr::Or(vec![Expr::Eq(1), Expr::Eq(2)]), Expr::Eq(3)]),
            Expr::Or(vec![Expr::Eq(1), Expr::Eq(2), Expr::Eq(3)])
        );
        assert_eq!(
            Expr::and(vec![Expr::Or(vec![Expr::Eq(1), Expr::Eq(2)]), Expr::Le(3)]),
            Expr::And(vec![Expr::Or(vec![Expr::Eq(1), Expr::Eq(2)]), Expr::Le(3)])
        );
        assert_eq!(Expr::not(Expr::Eq(4)), Expr::Ne(4));
        assert_eq!(Expr::not(Expr::not(Expr::Ge(4))), Expr::Ge(4));
    }

    #[test]
    fn eval() {
        let expr = Expr::or(vec![
            Expr::and(vec![Expr::Ge(65), Expr::Le(67)]),
            Expr::Eq(200),
        ]);
        assert!(expr.eval(65, None));
        assert!(expr.eval(200, None));
        assert!(!expr.eval(68, None));

        let modular = Expr::Mod { add: 3, div: 5 };
        assert!(modular.eval(2, None));
        assert!(modular.eval(7, None));
        assert!(!modular.eval(5, None));

        let bits = Expr::Bit {
            offset: 10,
            mask: 0b101,
        };
        assert!(bits.eval(10, None));
        assert!(!bits.eval(11, None));
        assert!(bits.eval(12, None));

        let selector = Expr::SelBit { mask: 0b110 };
        assert!(selector.eval(0, Some(2)));
        assert!(!selector.eval(0, Some(0)));
    }

    #[test]
    fn guards_short_circuit() {
        let expr = Expr::and(vec![
            Expr::Ge(10),
            Expr::Bit {
                offset: 10,
                mask: 1,
            },
        ]);
        assert!(!expr.eval(5, None));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn unguarded_bit_test() {
        Expr::Bit {
            offset: 10,
            mask: 1,
        }
        .eval(5, None);
    }

    #[test]
    fn selector_references() {
        let expr = Expr::or(vec![
            Expr::SelBit { mask: 3 },
            Expr::and(vec![Expr::SelEq(4), Expr::Eq(7)]),
        ]);
        assert_eq!(expr.selector_references(), 2);
        assert_eq!(expr.comparisons(), 3);
        assert!(!Expr::Eq(1).uses_selector());
    }

    #[test]
    fn display() {
        let expr = Expr::or(vec![
            Expr::and(vec![Expr::Ge(65), Expr::Le(67)]),
            Expr::Eq(200),
        ]);
        assert_eq!(expr.to_string(), "(65 <= c && c <= 67) || c == 200");
        assert_eq!(
            Expr::Mod { add: 0, div: 2 }.to_string(),
            "c % 2 == 0"
        );
    }
}
