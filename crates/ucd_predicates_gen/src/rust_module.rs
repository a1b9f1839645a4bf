//! Rust module writer, one module of `const fn`s per code unit.

use crate::catalog::{Kind, FUNCTIONS};
use crate::generate::Generator;

use anyhow::{Context, Result};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, ToTokens};
use ucd_predicates::code_unit::MAX_CODE_POINT;
use ucd_predicates::emit::rust::RustEmitter;
use ucd_predicates::CodeUnit;

pub fn file_name(code_unit: &CodeUnit) -> String {
    format!("unicode_{}.rs", code_unit.file_stem())
}

fn lit(code_unit: &CodeUnit, value: u32) -> syn::LitInt {
    syn::LitInt::new(&code_unit.rust_literal(value), Span::call_site())
}

fn call_all(names: &[&str]) -> Vec<TokenStream> {
    names
        .iter()
        .map(|name| {
            let name = format_ident!("{}", name);
            quote!(#name(c))
        })
        .collect()
}

/// Generate the module of `code_unit`. Code units that forward to another type get no module.
pub fn generate(generator: &mut Generator, code_unit: &CodeUnit) -> Result<Option<String>> {
    if code_unit.proxy.is_some() {
        return Ok(None);
    }

    let emitter = RustEmitter::new(*code_unit);
    let ty = format_ident!("{}", code_unit.rust_type());
    let mut items = vec![];

    for function in &FUNCTIONS {
        let name = format_ident!("{}", function.name);
        let doc = function.description(code_unit);

        let body = match function.kind {
            Kind::Identify { .. } => {
                let resolved = generator.resolve(function, code_unit)?;
                match resolved.and_then(|resolved| resolved.predicate) {
                    Some(predicate) => {
                        let item = emitter
                            .function(function.name, &predicate)
                            .with_context(|| format!("generating {}", function.name))?;
                        items.push(quote!(#[doc = #doc] #item));
                        continue;
                    }
                    None => quote!(let _ = c; false),
                }
            }
            Kind::AnyOf(names) => {
                let calls = call_all(names);
                quote!(#(#calls)||*)
            }
            Kind::NoneOf(names) => {
                let calls = call_all(names);
                quote!(#(!#calls)&&*)
            }
            Kind::NotCodePoint if code_unit.max() >= MAX_CODE_POINT => {
                let max = lit(code_unit, MAX_CODE_POINT);
                quote!(c > #max)
            }
            Kind::NotCodePoint => quote!(!is_ascii_code_point(c) && !is_non_ascii_code_point(c)),
            Kind::CodePointBoundary => match code_unit.bits {
                8 => quote!((c & 0b1100_0000) != 0b1000_0000),
                16 => {
                    let (high_last, low_end) = (lit(code_unit, 0xDBFF), lit(code_unit, 0xE000));
                    quote!(c <= #high_last || c >= #low_end)
                }
                _ => {
                    let max = lit(code_unit, MAX_CODE_POINT);
                    quote!(c <= #max)
                }
            },
        };

        items.push(quote!(
            #[doc = #doc]
            #[inline]
            #[must_use]
            pub const fn #name(c: #ty) -> bool {
                #body
            }
        ));
    }

    let file: syn::File =
        syn::parse2(quote!(#(#items)*)).context("generated module does not parse")?;

    let mut out = String::from(
        "// This file was generated by ucd_predicates_gen - do not modify it directly\n\n",
    );
    out.push_str(&file.into_token_stream().to_string());
    out.push('\n');

    Ok(Some(out))
}
