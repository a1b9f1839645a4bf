use crate::sparse_set::Element;

use std::fmt::{self, Display, Formatter};

/// Displays set elements as `a, b - c, d` with a custom value formatter.
pub struct SetDisplay<'a, F> {
    elements: &'a [Element],
    format: F,
}

impl<'a, F> SetDisplay<'a, F> {
    pub fn new(elements: &'a [Element], format: F) -> Self {
        SetDisplay { elements, format }
    }
}

impl<F: Fn(u32) -> String> Display for SetDisplay<'_, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        display_list(
            f,
            self.elements.len(),
            &mut self.elements.iter().map(|element| match element {
                Element::Value(value) => (self.format)(*value),
                Element::Range { first, last } => {
                    format!("{} - {}", (self.format)(*first), (self.format)(*last))
                }
            }),
        )
    }
}

fn display_list<A: Display>(
    f: &mut Formatter<'_>,
    n_elems: usize,
    elems: &mut dyn Iterator<Item = A>,
) -> fmt::Result {
    for (elem_idx, elem) in elems.enumerate() {
        write!(f, "{}", elem)?;
        if elem_idx != n_elems - 1 {
            write!(f, ", ")?;
        }
    }
    Ok(())
}
