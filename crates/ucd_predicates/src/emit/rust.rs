//! Rust rendering of predicates, as `const fn name(c: uN) -> bool`.

use super::{selector_name, table_name};
use crate::code_unit::CodeUnit;
use crate::compile::{Case, Dispatch, Guard, Logic, Node, Predicate, Table, Tail};
use crate::expr::Expr;

use proc_macro2::{Literal, Span, TokenStream};
use quote::{format_ident, quote};

pub struct RustEmitter {
    code_unit: CodeUnit,
}

fn hex_u64(value: u64) -> syn::LitInt {
    syn::LitInt::new(&format!("0x{:X}u64", value), Span::call_site())
}

impl RustEmitter {
    pub fn new(code_unit: CodeUnit) -> Self {
        RustEmitter { code_unit }
    }

    /// Generate a `pub const fn` named `name` implementing `predicate`. Fails when `name` is not a
    /// valid identifier.
    pub fn function(&self, name: &str, predicate: &Predicate) -> syn::Result<syn::ItemFn> {
        let name: syn::Ident = syn::parse_str(name)?;
        let ty = format_ident!("{}", self.code_unit.rust_type());
        let body = self.body(predicate);

        syn::parse2(quote!(
            #[inline]
            #[must_use]
            pub const fn #name(c: #ty) -> bool {
                #body
            }
        ))
    }

    pub fn body(&self, predicate: &Predicate) -> TokenStream {
        let root = predicate.root();
        if let Some(value) = root.leaf().and_then(|leaf| leaf.expr.is_const()) {
            return quote!(
                let _ = c;
                #value
            );
        }
        self.node(root)
    }

    fn lit(&self, value: u32) -> syn::LitInt {
        syn::LitInt::new(&self.code_unit.rust_literal(value), Span::call_site())
    }

    fn node(&self, node: &Node) -> TokenStream {
        match node.logic() {
            Logic::Expr(leaf) => self.expr(&leaf.expr, &quote!()),
            Logic::Table(table) => self.table(node, table),
            Logic::Dispatch(dispatch) => self.dispatch(node, dispatch),
        }
    }

    // A node body as a single expression.
    fn block(&self, node: &Node) -> TokenStream {
        match node.logic() {
            Logic::Expr(leaf) => self.expr(&leaf.expr, &quote!()),
            _ => {
                let body = self.node(node);
                quote!({ #body })
            }
        }
    }

    pub fn expr(&self, expr: &Expr, selector: &TokenStream) -> TokenStream {
        match expr {
            Expr::Const(value) => quote!(#value),
            Expr::Eq(value) => {
                let value = self.lit(*value);
                quote!(c == #value)
            }
            Expr::Ne(value) => {
                let value = self.lit(*value);
                quote!(c != #value)
            }
            Expr::Ge(value) => {
                let value = self.lit(*value);
                quote!(#value <= c)
            }
            Expr::Le(value) => {
                let value = self.lit(*value);
                quote!(c <= #value)
            }
            Expr::Mod { add: 0, div } => {
                let div = Literal::u64_suffixed(u64::from(*div));
                quote!((c as u64) % #div == 0)
            }
            Expr::Mod { add, div } => {
                let add = Literal::u64_suffixed(u64::from(*add));
                let div = Literal::u64_suffixed(u64::from(*div));
                quote!(((c as u64) + #add) % #div == 0)
            }
            Expr::Bit { offset, mask } => {
                let offset = hex_u64(u64::from(*offset));
                let mask = hex_u64(*mask);
                quote!(((1u64 << ((c as u64) - #offset)) & #mask) != 0)
            }
            Expr::SelEq(index) => {
                let index = Literal::u64_suffixed(u64::from(*index));
                quote!(#selector == #index)
            }
            Expr::SelNe(index) => {
                let index = Literal::u64_suffixed(u64::from(*index));
                quote!(#selector != #index)
            }
            Expr::SelBit { mask } => {
                let mask = hex_u64(*mask);
                quote!(((1u64 << #selector) & #mask) != 0)
            }
            Expr::Not(inner) => {
                let inner = self.expr(inner, selector);
                quote!(!(#inner))
            }
            Expr::And(exprs) => {
                let operands = exprs.iter().map(|expr| self.operand(expr, selector));
                quote!(#(#operands)&&*)
            }
            Expr::Or(exprs) => {
                let operands = exprs.iter().map(|expr| self.operand(expr, selector));
                quote!(#(#operands)||*)
            }
        }
    }

    fn operand(&self, expr: &Expr, selector: &TokenStream) -> TokenStream {
        let tokens = self.expr(expr, selector);
        match expr {
            Expr::And(_) | Expr::Or(_) => quote!((#tokens)),
            _ => tokens,
        }
    }

    fn guard(&self, guard: &Guard) -> TokenStream {
        let mut conditions = vec![];
        if let Some(below) = guard.below {
            let below = self.lit(below);
            conditions.push(quote!(c < #below));
        }
        if let Some(above) = guard.above {
            let above = self.lit(above);
            conditions.push(quote!(c > #above));
        }
        if conditions.is_empty() {
            quote!()
        } else {
            quote!(
                if #(#conditions)||* {
                    return false;
                }
            )
        }
    }

    fn table(&self, node: &Node, table: &Table) -> TokenStream {
        let guard = self.guard(&table.guard);
        let name = format_ident!("{}", table_name(node.level()).to_uppercase());
        let len = table.words.len();
        let words = table.words.iter().map(|word| hex_u64(*word));
        let offset = hex_u64(u64::from(table.offset));
        let word_size = Literal::u64_suffixed(u64::from(table.word_size));

        quote!(
            #guard
            const #name: [u64; #len] = [#(#words),*];
            let relative = (c as u64) - #offset;
            ((#name[(relative / #word_size) as usize] >> (relative % #word_size)) & 1) != 0
        )
    }

    fn dispatch(&self, node: &Node, dispatch: &Dispatch) -> TokenStream {
        let guard = self.guard(&dispatch.guard);

        let size = hex_u64(u64::from(dispatch.child_size));
        let value = if dispatch.offset > 0 {
            let offset = hex_u64(u64::from(dispatch.offset));
            quote!(((c as u64) - #offset) / #size)
        } else {
            quote!((c as u64) / #size)
        };

        let selector_ident = format_ident!("{}", selector_name(node.level()));
        let (declaration, selector) = if dispatch.selector_references() > 0 {
            (
                quote!(let #selector_ident: u64 = #value;),
                quote!(#selector_ident),
            )
        } else {
            (quote!(), quote!())
        };

        let trues = if dispatch.trues != Expr::Const(false) {
            let trues = self.expr(&dispatch.trues, &selector);
            quote!(if #trues { return true; })
        } else {
            quote!()
        };

        let falses = if dispatch.falses != Expr::Const(false) {
            let falses = self.expr(&dispatch.falses, &selector);
            quote!(if #falses { return false; })
        } else {
            quote!()
        };

        let tail = match &dispatch.tail {
            Tail::Return(expr) => self.expr(expr, &selector),
            Tail::Guarded { index, default } => {
                let index_lit = Literal::u64_suffixed(u64::from(*index));
                let body = self.node(dispatch.child(*index));
                quote!(
                    if #selector != #index_lit {
                        return #default;
                    }
                    #body
                )
            }
            Tail::Inline(index) => self.node(dispatch.child(*index)),
            Tail::Switch { cases, default } => {
                let arms = cases.iter().map(|case| {
                    let index = Literal::u64_suffixed(u64::from(case.index()));
                    let body = match case {
                        Case::Return { value, .. } => quote!(#value),
                        Case::Child(index) => self.block(dispatch.child(*index)),
                    };
                    quote!(#index => #body,)
                });
                let default = match default {
                    Some(default) => quote!(#default),
                    None => quote!(unreachable!()),
                };
                quote!(
                    match #selector {
                        #(#arms)*
                        _ => #default,
                    }
                )
            }
        };

        quote!(
            #guard
            #declaration
            #trues
            #falses
            #tail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{Compiler, Domain};
    use crate::config::Config;
    use crate::sparse_set::{Element, SparseSet};

    fn function<E: Into<Element>>(
        elements: impl IntoIterator<Item = E>,
        code_unit: CodeUnit,
        domain: Domain,
    ) -> String {
        let mut set = SparseSet::from_elements(elements).unwrap();
        set.finish().unwrap();
        let predicate = Compiler::new(Config::default())
            .unwrap()
            .compile(&set, domain)
            .unwrap();
        let item = RustEmitter::new(code_unit)
            .function("is_member", &predicate)
            .unwrap();
        assert_eq!(item.sig.ident, "is_member");
        assert!(item.sig.constness.is_some());
        quote!(#item).to_string()
    }

    #[test]
    fn contiguous_range() {
        let code = function(
            [(0x41u32, 0x5Au32)],
            CodeUnit::CHAR8,
            Domain::for_code_unit(&CodeUnit::CHAR8),
        );
        assert!(code.contains("0x41u8 <= c && c <= 0x5Au8"), "{}", code);
    }

    #[test]
    fn empty() {
        let code = function(
            Vec::<u32>::new(),
            CodeUnit::CHAR16,
            Domain::for_code_unit(&CodeUnit::CHAR16),
        );
        assert!(code.contains("let _ = c ; false"), "{}", code);
    }

    #[test]
    fn switch() {
        let mut elements: Vec<Element> = (0u32..=126).step_by(2).map(Element::from).collect();
        elements.push(Element::from(200));
        let code = function(elements, CodeUnit::CHAR16, Domain::new(0, 300));
        assert!(code.contains("match child_index_0"), "{}", code);
        assert!(code.contains("_ => false"), "{}", code);
        assert!(code.contains("c == 0xC8u16"), "{}", code);
    }

    #[test]
    fn invalid_name() {
        let mut set = SparseSet::new();
        set.finish().unwrap();
        let predicate = Compiler::new(Config::default())
            .unwrap()
            .compile(&set, Domain::new(0, 127))
            .unwrap();
        assert!(RustEmitter::new(CodeUnit::CHAR8)
            .function("is not a name", &predicate)
            .is_err());
    }
}
