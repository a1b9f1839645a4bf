
use test_utils::{first_mismatch, DERIVED_CORE_PROPERTIES, PROP_LIST, UNICODE_DATA};
use ucd_predicates::emit::cpp::{self, CppEmitter, CppOptions};
use ucd_predicates::emit::rust::RustEmitter;
use ucd_predicates::{
    CodePointCache, CodeUnit, Compiler, Config, Domain, DomainSupplier, Element, Query,
    UcdSupplier, UnicodeDatabase,
};

use quote::ToTokens;

fn database() -> UnicodeDatabase {
    UnicodeDatabase::parse(UNICODE_DATA, [PROP_LIST, DERIVED_CORE_PROPERTIES]).unwrap()
}

const LETTERS: [&str; 3] = ["Ll", "Lo", "Lu"];

#[test]
fn ascii_letters() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR8)
        .in_categories(&LETTERS)
        .at_most(127);

    let letters = supplier.code_points(&query, &CodeUnit::CHAR8).unwrap();
    assert_eq!(
        letters.iter().collect::<Vec<_>>(),
        vec![0x41, 0x42, 0x43, 0x61, 0x62, 0x63]
    );

    let predicate = Compiler::new(Config::default())
        .unwrap()
        .compile(&letters, Domain::for_code_unit(&CodeUnit::CHAR8))
        .unwrap();
    assert_eq!(first_mismatch(&letters, &predicate), None);

    let options = CppOptions::default();
    let body = CppEmitter::new(CodeUnit::CHAR8, &options).body(&predicate);
    let function = cpp::function(&CodeUnit::CHAR8, "is_ascii_letter", None, &body);
    assert!(
        function.starts_with("[[nodiscard]]\nconstexpr bool is_ascii_letter(char8_t c) noexcept\n{\n\t"),
        "{}",
        function
    );
    assert!(function.ends_with("\n}"));
}

#[test]
fn non_ascii_letters_include_ranges() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR32)
        .in_categories(&LETTERS)
        .at_least(128);

    let letters = supplier.code_points(&query, &CodeUnit::CHAR32).unwrap();
    assert!(letters.contains(0x4E00));
    assert!(letters.contains(0x9FFF));
    assert!(!letters.contains(0x41));
    assert_eq!(letters.contiguous_subrange_count(), 1);

    let predicate = Compiler::new(Config::default())
        .unwrap()
        .compile(&letters, Domain::for_code_unit(&CodeUnit::CHAR32))
        .unwrap();
    predicate.verify(&letters).unwrap();
}

#[test]
fn non_ascii_whitespace_in_utf16() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR16)
        .with_properties(&["White_Space"])
        .at_least(128);

    let whitespace = supplier.code_points(&query, &CodeUnit::CHAR16).unwrap();
    assert_eq!(
        whitespace.iter().collect::<Vec<_>>(),
        vec![0xA0, 0x2028, 0x3000]
    );

    let predicate = Compiler::new(Config::default())
        .unwrap()
        .compile(&whitespace, Domain::for_code_unit(&CodeUnit::CHAR16))
        .unwrap();
    assert_eq!(first_mismatch(&whitespace, &predicate), None);
}

#[test]
fn utf8_code_units_only_cover_ascii() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR8)
        .with_properties(&["White_Space"])
        .at_least(128);

    let whitespace = supplier.code_points(&query, &CodeUnit::CHAR8).unwrap();
    assert!(whitespace.is_empty());

    let predicate = Compiler::new(Config::default())
        .unwrap()
        .compile(&whitespace, Domain::for_code_unit(&CodeUnit::CHAR8))
        .unwrap();
    let options = CppOptions::default();
    assert_eq!(
        CppEmitter::new(CodeUnit::CHAR8, &options).body(&predicate),
        "static_cast<void>(c);\nreturn false;"
    );
}

#[test]
fn inverse_of_digits() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR8).with_values([(0x30u32, 0x39u32)]);
    let inverse = supplier.inverse(&query, &CodeUnit::CHAR8).unwrap();
    assert_eq!(
        inverse.elements(),
        &[
            Element::Range {
                first: 0,
                last: 0x2F
            },
            Element::Range {
                first: 0x3A,
                last: 0xFF
            },
        ]
    );
}

#[test]
fn rust_backend() {
    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
    let query = Query::new(&CodeUnit::CHAR16).in_categories(&["Nd"]);
    let digits = supplier.code_points(&query, &CodeUnit::CHAR16).unwrap();

    let predicate = Compiler::new(Config::default())
        .unwrap()
        .compile(&digits, Domain::for_code_unit(&CodeUnit::CHAR16))
        .unwrap();
    let item = RustEmitter::new(CodeUnit::CHAR16)
        .function("is_digit", &predicate)
        .unwrap();
    let code = item.to_token_stream().to_string();
    assert!(code.contains("pub const fn is_digit (c : u16) -> bool"), "{}", code);
    assert!(code.contains("0x0660u16"), "{}", code);
}

#[test]
fn cached_sets_survive_the_database() {
    let dir = std::env::temp_dir().join(format!("ucd_predicates_scenarios_{}", std::process::id()));
    let query = Query::new(&CodeUnit::CHAR32).in_categories(&["Nd"]);

    let db = database();
    let mut supplier = UcdSupplier::new(&db, CodePointCache::new(dir.clone()));
    let digits = supplier.code_points(&query, &CodeUnit::CHAR32).unwrap();

    // Without the files the query can only be answered from the cache
    let empty = UnicodeDatabase::parse("", Vec::<&str>::new()).unwrap();
    let mut supplier = UcdSupplier::new(&empty, CodePointCache::new(dir.clone()));
    assert_eq!(
        supplier.code_points(&query, &CodeUnit::CHAR32).unwrap(),
        digits
    );
    assert!(supplier.inverse(&query, &CodeUnit::CHAR32).unwrap().contains(0x41));

    std::fs::remove_dir_all(&dir).unwrap();
}
