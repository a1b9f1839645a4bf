//! The functions generated for every code unit type.

use ucd_predicates::{CodeUnit, Query};

const LETTER: &[&str] = &["Ll", "Lm", "Lo", "Lt", "Lu"];
const NUMBER: &[&str] = &["Nd", "Nl"];
const COMBINING_MARK: &[&str] = &["Mn", "Mc"];

/// How a function computes its result.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Membership in a set of code points, compiled into a predicate
    Identify {
        categories: &'static [&'static str],
        properties: &'static [&'static str],
        values: &'static [(u32, u32)],
        min: u32,
        max: u32,
    },

    /// True when any of the functions is
    AnyOf(&'static [&'static str]),

    /// True when none of the functions is
    NoneOf(&'static [&'static str]),

    /// Values that are not code points
    NotCodePoint,

    /// Code units that start a code point
    CodePointBoundary,
}

#[derive(Debug, Clone, Copy)]
pub struct Function {
    pub name: &'static str,

    /// Documentation, with `{}` standing for what a value of the code unit is called
    pub description: &'static str,

    pub kind: Kind,

    /// Groups of functions of which exactly one is true for any value
    pub mutex_groups: &'static [u32],
}

impl Function {
    pub fn description(&self, code_unit: &CodeUnit) -> String {
        self.description.replace("{}", &specifier(code_unit))
    }

    /// The code point query of an identification function.
    pub fn query(&self, code_unit: &CodeUnit) -> Option<Query> {
        match self.kind {
            Kind::Identify {
                categories,
                properties,
                values,
                min,
                max,
            } => Some(
                Query::new(code_unit)
                    .in_categories(categories)
                    .with_properties(properties)
                    .with_values(values.iter().copied())
                    .at_least(min)
                    .at_most(max),
            ),
            _ => None,
        }
    }
}

/// What a value of `code_unit` is called in descriptions.
pub fn specifier(code_unit: &CodeUnit) -> String {
    match code_unit.name {
        "char" | "unsigned char" => "character".to_owned(),
        "wchar_t" => "wide character".to_owned(),
        _ => format!("UTF-{} code unit", code_unit.bits),
    }
}

const ANY: u32 = u32::MAX;

const fn categories(categories: &'static [&'static str], min: u32, max: u32) -> Kind {
    Kind::Identify {
        categories,
        properties: &[],
        values: &[],
        min,
        max,
    }
}

const fn properties(properties: &'static [&'static str], min: u32, max: u32) -> Kind {
    Kind::Identify {
        categories: &[],
        properties,
        values: &[],
        min,
        max,
    }
}

const fn values(values: &'static [(u32, u32)]) -> Kind {
    Kind::Identify {
        categories: &[],
        properties: &[],
        values,
        min: 0,
        max: ANY,
    }
}

const fn function(
    name: &'static str,
    description: &'static str,
    kind: Kind,
    mutex_groups: &'static [u32],
) -> Function {
    Function {
        name,
        description,
        kind,
        mutex_groups,
    }
}

pub static FUNCTIONS: [Function; 33] = [
    // is_ascii_*
    function(
        "is_ascii_code_point",
        "Returns true if a {} is a valid code point from the ASCII range.",
        values(&[(0, 127)]),
        &[1],
    ),
    function(
        "is_ascii_hyphen",
        "Returns true if a {} is a hyphen code point from the ASCII range.",
        properties(&["Hyphen"], 0, 127),
        &[2],
    ),
    function(
        "is_ascii_letter",
        "Returns true if a {} is a letter code point from the ASCII range.",
        categories(LETTER, 0, 127),
        &[3],
    ),
    function(
        "is_ascii_lowercase",
        "Returns true if a {} is a lowercase code point from the ASCII range.",
        properties(&["Lowercase"], 0, 127),
        &[6],
    ),
    function(
        "is_ascii_number",
        "Returns true if a {} is a number code point from the ASCII range.",
        categories(NUMBER, 0, 127),
        &[4],
    ),
    function(
        "is_ascii_uppercase",
        "Returns true if a {} is an uppercase code point from the ASCII range.",
        properties(&["Uppercase"], 0, 127),
        &[7],
    ),
    function(
        "is_ascii_whitespace",
        "Returns true if a {} is a whitespace code point from the ASCII range.",
        properties(&["White_Space"], 0, 127),
        &[5],
    ),
    // is_non_ascii_*
    function(
        "is_non_ascii_code_point",
        "Returns true if a {} is a valid code point from outside the ASCII range.",
        values(&[(128, ANY)]),
        &[1],
    ),
    function(
        "is_non_ascii_hyphen",
        "Returns true if a {} is a hyphen code point from outside the ASCII range.",
        properties(&["Hyphen"], 128, ANY),
        &[2],
    ),
    function(
        "is_non_ascii_letter",
        "Returns true if a {} is a letter code point from outside the ASCII range.",
        categories(LETTER, 128, ANY),
        &[3],
    ),
    function(
        "is_non_ascii_lowercase",
        "Returns true if a {} is a lowercase code point from outside the ASCII range.",
        properties(&["Lowercase"], 128, ANY),
        &[6],
    ),
    function(
        "is_non_ascii_number",
        "Returns true if a {} is a number code point from outside the ASCII range.",
        categories(NUMBER, 128, ANY),
        &[4],
    ),
    function(
        "is_non_ascii_uppercase",
        "Returns true if a {} is an uppercase code point from outside the ASCII range.",
        properties(&["Uppercase"], 128, ANY),
        &[7],
    ),
    function(
        "is_non_ascii_whitespace",
        "Returns true if a {} is a whitespace code point from outside the ASCII range.",
        properties(&["White_Space"], 128, ANY),
        &[5],
    ),
    // is_not_*
    function(
        "is_not_code_point",
        "Returns true if a {} is not a valid code point.",
        Kind::NotCodePoint,
        &[1],
    ),
    function(
        "is_not_hyphen",
        "Returns true if a {} is not a hyphen code point.",
        Kind::NoneOf(&["is_ascii_hyphen", "is_non_ascii_hyphen"]),
        &[2],
    ),
    function(
        "is_not_letter",
        "Returns true if a {} is not a letter code point.",
        Kind::NoneOf(&["is_ascii_letter", "is_non_ascii_letter"]),
        &[3],
    ),
    function(
        "is_not_lowercase",
        "Returns true if a {} is not a lowercase code point.",
        Kind::NoneOf(&["is_ascii_lowercase", "is_non_ascii_lowercase"]),
        &[6],
    ),
    function(
        "is_not_number",
        "Returns true if a {} is not a number code point.",
        Kind::NoneOf(&["is_ascii_number", "is_non_ascii_number"]),
        &[4],
    ),
    function(
        "is_not_uppercase",
        "Returns true if a {} is not an uppercase code point.",
        Kind::NoneOf(&["is_ascii_uppercase", "is_non_ascii_uppercase"]),
        &[7],
    ),
    function(
        "is_not_whitespace",
        "Returns true if a {} is not a whitespace code point.",
        Kind::NoneOf(&["is_ascii_whitespace", "is_non_ascii_whitespace"]),
        &[5],
    ),
    // everything else
    function(
        "is_code_point",
        "Returns true if a {} is a valid code point.",
        values(&[(0, ANY)]),
        &[],
    ),
    function(
        "is_code_point_boundary",
        "Returns true if a {} is a code point boundary.",
        Kind::CodePointBoundary,
        &[],
    ),
    function(
        "is_combining_mark",
        "Returns true if a {} is a combining mark code point.",
        categories(COMBINING_MARK, 0, ANY),
        &[],
    ),
    function(
        "is_decimal_digit",
        "Returns true if a {} is a decimal digit code point.",
        values(&[(0x30, 0x39)]),
        &[],
    ),
    function(
        "is_hexadecimal_digit",
        "Returns true if a {} is a hexadecimal digit code point.",
        values(&[(0x61, 0x66), (0x41, 0x46), (0x30, 0x39)]),
        &[],
    ),
    function(
        "is_hyphen",
        "Returns true if a {} is a hyphen code point.",
        Kind::AnyOf(&["is_ascii_hyphen", "is_non_ascii_hyphen"]),
        &[],
    ),
    function(
        "is_letter",
        "Returns true if a {} is a letter code point.",
        Kind::AnyOf(&["is_ascii_letter", "is_non_ascii_letter"]),
        &[],
    ),
    function(
        "is_lowercase",
        "Returns true if a {} is a lowercase code point.",
        Kind::AnyOf(&["is_ascii_lowercase", "is_non_ascii_lowercase"]),
        &[],
    ),
    function(
        "is_number",
        "Returns true if a {} is a number code point.",
        Kind::AnyOf(&["is_ascii_number", "is_non_ascii_number"]),
        &[],
    ),
    function(
        "is_octal_digit",
        "Returns true if a {} is an octal digit code point.",
        values(&[(0x30, 0x37)]),
        &[],
    ),
    function(
        "is_uppercase",
        "Returns true if a {} is an uppercase code point.",
        Kind::AnyOf(&["is_ascii_uppercase", "is_non_ascii_uppercase"]),
        &[],
    ),
    function(
        "is_whitespace",
        "Returns true if a {} is a whitespace code point.",
        Kind::AnyOf(&["is_ascii_whitespace", "is_non_ascii_whitespace"]),
        &[],
    ),
];

/// Members of each mutual exclusion group, sorted by group then by name.
pub fn mutex_groups() -> Vec<(u32, Vec<&'static str>)> {
    let mut groups: Vec<(u32, Vec<&'static str>)> = vec![];
    for function in &FUNCTIONS {
        for group in function.mutex_groups {
            match groups.iter_mut().find(|(id, _)| id == group) {
                Some((_, names)) => names.push(function.name),
                None => groups.push((*group, vec![function.name])),
            }
        }
    }
    groups.sort_by_key(|(id, _)| *id);
    for (_, names) in &mut groups {
        names.sort_unstable();
    }
    groups
}
