//! C++ rendering of predicates, as the body of `bool name(code_unit c) noexcept`.

use super::wrap::{indent_with_tabs, strip_brackets, wrap_chain};
use super::{selector_name, summary, table_name};
use crate::code_unit::CodeUnit;
use crate::compile::{Case, Dispatch, Guard, Logic, Node, Predicate, Table, Tail};
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppOptions {
    /// Declaration specifiers of bitmask tables. Functions are `constexpr`, so `static` needs
    /// C++23.
    pub table_storage: String,

    /// Macro taking a condition the compiler may assume, e.g. `MUU_ASSUME`
    pub assume_macro: Option<String>,

    /// Default branch of switches that have no default outcome
    pub unreachable: String,

    /// Whether tables and switches are followed by a summary comment
    pub summaries: bool,
}

impl Default for CppOptions {
    fn default() -> Self {
        CppOptions {
            table_storage: "constexpr".to_owned(),
            assume_macro: None,
            unreachable: "__builtin_unreachable();".to_owned(),
            summaries: true,
        }
    }
}

pub struct CppEmitter<'a> {
    code_unit: CodeUnit,
    options: &'a CppOptions,
}

/// Integer literal for a bitmask of the given width.
pub fn bitmask_literal(value: u64, bits: u32) -> String {
    format!("0x{:X}{}", value, if bits > 32 { "ull" } else { "u" })
}

// Width a bit test with this mask needs.
fn mask_bits(mask: u64) -> u32 {
    if mask >> 32 != 0 {
        64
    } else {
        32
    }
}

// `(1 << (index - offset)) & mask`
fn bit_test(index: &str, offset: u32, mask: u64, bits: u32) -> String {
    let index = if offset != 0 {
        format!("({} - 0x{:X}u)", index, offset)
    } else {
        index.to_owned()
    };
    format!(
        "(1{} << {}) & {}",
        if bits > 32 { "ull" } else { "u" },
        index,
        bitmask_literal(mask, bits)
    )
}

// Unsigned type and literal suffix for index arithmetic on `c`.
fn index_type(word_size: u32) -> (&'static str, &'static str) {
    if word_size > 32 {
        ("uint_least64_t", "ull")
    } else {
        ("uint_least32_t", "u")
    }
}

impl<'a> CppEmitter<'a> {
    pub fn new(code_unit: CodeUnit, options: &'a CppOptions) -> Self {
        CppEmitter { code_unit, options }
    }

    /// Function body classifying `c`, without the enclosing braces.
    pub fn body(&self, predicate: &Predicate) -> String {
        let root = predicate.root();
        if let Some(leaf) = root.leaf() {
            if let Some(value) = leaf.expr.is_const() {
                return format!("static_cast<void>(c);\nreturn {};", value);
            }
        }
        self.node(root, predicate.word_size())
    }

    fn lit(&self, value: u32) -> String {
        self.code_unit.literal(value)
    }

    fn node(&self, node: &Node, word_size: u32) -> String {
        match node.logic() {
            Logic::Expr(leaf) => format!("return {};", self.wrapped(&leaf.expr, "", node.level())),
            Logic::Table(table) => self.table(node, table),
            Logic::Dispatch(dispatch) => self.dispatch(node, dispatch, word_size),
        }
    }

    /// Render an expression. `selector` is how the dispatch child index is spelled.
    pub fn expr(&self, expr: &Expr, selector: &str) -> String {
        match expr {
            Expr::Const(value) => value.to_string(),
            Expr::Eq(value) => format!("c == {}", self.lit(*value)),
            Expr::Ne(value) => format!("c != {}", self.lit(*value)),
            Expr::Ge(value) => format!("{} <= c", self.lit(*value)),
            Expr::Le(value) => format!("c <= {}", self.lit(*value)),
            Expr::Mod { add: 0, div } => {
                format!("(static_cast<uint_least32_t>(c) % {}u) == 0u", div)
            }
            Expr::Mod { add, div } => format!(
                "((static_cast<uint_least32_t>(c) + {}u) % {}u) == 0u",
                add, div
            ),
            Expr::Bit { offset, mask } => {
                let bits = mask_bits(*mask);
                let index = format!("static_cast<uint_least{}_t>(c)", bits);
                bit_test(&index, *offset, *mask, bits)
            }
            Expr::SelEq(index) => format!("{} == {}", selector, index),
            Expr::SelNe(index) => format!("{} != {}", selector, index),
            // the selector can exceed the highest bit of the mask
            Expr::SelBit { mask } => bit_test(selector, 0, *mask, 64),
            Expr::Not(inner) => format!("!({})", strip_brackets(&self.expr(inner, selector))),
            Expr::And(exprs) => self.junction(exprs, "&&", selector),
            Expr::Or(exprs) => self.junction(exprs, "||", selector),
        }
    }

    fn operand(&self, expr: &Expr, selector: &str) -> String {
        match expr {
            Expr::And(_) | Expr::Or(_) | Expr::Bit { .. } | Expr::SelBit { .. } => {
                format!("({})", self.expr(expr, selector))
            }
            _ => self.expr(expr, selector),
        }
    }

    fn junction(&self, exprs: &[Expr], sep: &str, selector: &str) -> String {
        exprs
            .iter()
            .map(|expr| self.operand(expr, selector))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", sep))
    }

    // Top level junctions are wrapped at the column limit.
    fn wrapped(&self, expr: &Expr, selector: &str, level: u32) -> String {
        let indent = 16 + 8 * level as usize;
        let (exprs, sep) = match expr {
            Expr::And(exprs) => (exprs, "&&"),
            Expr::Or(exprs) => (exprs, "||"),
            _ => return strip_brackets(&self.expr(expr, selector)).to_owned(),
        };
        let operands: Vec<String> = exprs
            .iter()
            .map(|expr| self.operand(expr, selector))
            .collect();
        wrap_chain(&operands, sep, "\t", indent)
    }

    fn guard(&self, node: &Node, guard: &Guard, out: &mut Vec<String>) {
        let mut exclusions = vec![];
        if let Some(below) = guard.below {
            exclusions.push(format!("c < {}", self.lit(below)));
        }
        if let Some(above) = guard.above {
            exclusions.push(format!("c > {}", self.lit(above)));
        }
        if !exclusions.is_empty() {
            out.push(format!("if ({})\n\treturn false;", exclusions.join(" || ")));
        }

        if let (Some(assume), Some((first, last))) = (&self.options.assume_macro, node.set().bounds())
        {
            let mut assumptions = vec![];
            if guard.below.is_none() && first > 0 {
                assumptions.push(format!("{} <= c", self.lit(first)));
            }
            if guard.above.is_none() {
                assumptions.push(format!("c <= {}", self.lit(last)));
            }
            if !assumptions.is_empty() {
                out.push(format!("{}({});", assume, assumptions.join(" && ")));
            }
        }

        if !out.is_empty() {
            out.push(String::new());
        }
    }

    fn table(&self, node: &Node, table: &Table) -> String {
        let mut out = vec![];
        self.guard(node, &table.guard, &mut out);

        let word_size = table.word_size;
        let name = table_name(node.level());
        let digits = (word_size / 4) as usize;
        let suffix = if word_size > 32 { "ull" } else { "u" };
        let per_line = (256 / word_size as usize).min(6);

        out.push(format!(
            "{} uint_least{}_t {}[] =\n{{",
            self.options.table_storage, word_size, name
        ));
        for words in table.words.chunks(per_line) {
            let line: Vec<String> = words
                .iter()
                .map(|word| format!("0x{:0digits$X}{},", word, suffix, digits = digits))
                .collect();
            out.push(format!("\t{}", line.join(" ")));
        }
        out.push("};".to_owned());

        let (ty, lit_suffix) = index_type(word_size);
        let cast = format!("static_cast<{}>(c)", ty);
        let relative = if table.offset != 0 {
            format!("({} - 0x{:X}{})", cast, table.offset, lit_suffix)
        } else {
            cast.clone()
        };
        let bit_index = if table.offset % word_size != 0 {
            relative.clone()
        } else {
            cast
        };
        out.push(format!(
            "return {}[{} / 0x{:X}{}]\n\t& (0x1{} << ({} % 0x{:X}{}));",
            name,
            relative,
            word_size,
            lit_suffix,
            suffix,
            bit_index,
            word_size,
            lit_suffix
        ));

        if self.options.summaries {
            out.push(summary(node.set()));
        }
        out.join("\n")
    }

    fn dispatch(&self, node: &Node, dispatch: &Dispatch, word_size: u32) -> String {
        let mut out = vec![];
        self.guard(node, &dispatch.guard, &mut out);

        let (ty, lit_suffix) = index_type(64);
        let mut selector = format!("static_cast<{}>(c)", ty);
        if dispatch.offset > 0 {
            selector = format!("({} - 0x{:X}{})", selector, dispatch.offset, lit_suffix);
        }
        selector = format!("{} / 0x{:X}{}", selector, dispatch.child_size, lit_suffix);

        let selector = if dispatch.selector_references() > 1 {
            let name = selector_name(node.level());
            out.push(format!("const auto {} = {};", name, selector));
            name
        } else {
            format!("({})", selector)
        };

        if dispatch.trues != Expr::Const(false) {
            out.push(format!(
                "if ({})\n\treturn true;",
                self.wrapped(&dispatch.trues, &selector, node.level())
            ));
        }
        if dispatch.falses != Expr::Const(false) {
            out.push(format!(
                "if ({})\n\treturn false;",
                self.wrapped(&dispatch.falses, &selector, node.level())
            ));
        }

        match &dispatch.tail {
            Tail::Return(expr) => {
                out.push(format!(
                    "return {};",
                    self.wrapped(expr, &selector, node.level())
                ));
            }
            Tail::Guarded { index, default } => {
                out.push(format!(
                    "if ({} != {})\n\treturn {};",
                    strip_brackets(&selector),
                    index,
                    default
                ));
                out.push(self.node(dispatch.child(*index), word_size));
            }
            Tail::Inline(index) => out.push(self.node(dispatch.child(*index), word_size)),
            Tail::Switch { cases, default } => {
                out.push(format!("switch ({})\n{{", strip_brackets(&selector)));
                for case in cases {
                    out.push(self.case(dispatch, case, word_size));
                }
                match default {
                    Some(default) => out.push(format!("\tdefault: return {};", default)),
                    None => out.push(format!("\tdefault: {}", self.options.unreachable)),
                }
                out.push("}".to_owned());
                if self.options.summaries {
                    out.push(summary(node.set()));
                }
            }
        }

        out.join("\n")
    }

    fn case(&self, dispatch: &Dispatch, case: &Case, word_size: u32) -> String {
        match case {
            Case::Return { index, value } => format!("\tcase 0x{:02X}: return {};", index, value),
            Case::Child(index) => {
                let child = dispatch.child(*index);
                match child.leaf() {
                    Some(leaf) => format!(
                        "\tcase 0x{:02X}: return {};",
                        index,
                        self.wrapped(&leaf.expr, "", child.level())
                            .replace('\n', "\n\t\t")
                    ),
                    None => {
                        let (span_first, span_last) = child.span();
                        format!(
                            "\tcase 0x{:02X}: // [{}] {:04X} - {:04X}\n\t{{\n{}\n\t}}",
                            index,
                            index,
                            span_first,
                            span_last,
                            indent_with_tabs(&self.node(child, word_size), 2)
                        )
                    }
                }
            }
        }
    }
}

/// Full definition of a predicate function around `body`.
pub fn function(code_unit: &CodeUnit, name: &str, attributes: Option<&str>, body: &str) -> String {
    let mut out = String::from("[[nodiscard]]\n");
    if let Some(attributes) = attributes {
        out.push_str(attributes);
        out.push('\n');
    }
    out.push_str(&format!(
        "constexpr bool {}({} c) noexcept\n{{\n{}\n}}",
        name,
        code_unit.name,
        indent_with_tabs(body, 1)
    ));
    out
}
