//! C++ header and Catch2 test writers.

use crate::catalog::{self, Function, Kind, FUNCTIONS};
use crate::generate::{Generator, Resolved};

use anyhow::Result;
use ucd_predicates::code_unit::MAX_CODE_POINT;
use ucd_predicates::emit::cpp::{self, CppEmitter, CppOptions};
use ucd_predicates::emit::wrap::indent_with_tabs;
use ucd_predicates::CodeUnit;

const PREAMBLE: &str = "\
//-----
// this file was generated by ucd_predicates_gen - do not modify it directly
//-----
";

/// Name of the header generated for `code_unit`.
pub fn header_file_name(code_unit: &CodeUnit) -> String {
    format!("unicode_{}.h", code_unit.file_stem())
}

pub fn tests_file_name(code_unit: &CodeUnit) -> String {
    format!("unicode_{}.cpp", code_unit.file_stem())
}

pub const TEST_HELPERS_FILE_NAME: &str = "unicode_test_helpers.h";

/// Layout of the generated headers.
pub struct HeaderOptions {
    pub namespace: String,

    /// Line between `[[nodiscard]]` and the function declaration
    pub attributes: Option<String>,

    pub emitter: CppOptions,
}

pub struct Output {
    pub header: String,

    /// No tests are generated for `wchar_t`, whose width depends on the platform
    pub tests: Option<String>,
}

/// Generate the header of `code_unit`, and its tests.
pub fn generate(
    generator: &mut Generator,
    code_unit: &CodeUnit,
    options: &HeaderOptions,
) -> Result<Output> {
    let emitter = CppEmitter::new(*code_unit, &options.emitter);
    let mut header = header_start(code_unit, options);
    let mut tests = if code_unit.name == CodeUnit::WCHAR.name {
        None
    } else {
        Some(tests_start(code_unit, options))
    };

    for function in &FUNCTIONS {
        let resolved = generator.resolve(function, code_unit)?;
        let body = body(function, code_unit, resolved.as_ref(), &emitter);

        header.push_str(&format!("\t/// \\brief {}\n", function.description(code_unit)));
        let definition = cpp::function(code_unit, function.name, options.attributes.as_deref(), &body);
        header.push_str(&indent_with_tabs(&definition, 1));
        header.push_str("\n\n");

        if let (Some(tests), Some(resolved)) = (&mut tests, &resolved) {
            tests.push_str(&test_case(function, code_unit, resolved));
        }
    }

    header.push_str("}\n");
    if is_char8(code_unit) {
        header.push_str("\n#endif // __cpp_char8_t\n");
    }

    if let Some(tests) = &mut tests {
        if is_char8(code_unit) {
            tests.push_str("#endif // __cpp_char8_t\n");
        }
    }

    Ok(Output { header, tests })
}

fn is_char8(code_unit: &CodeUnit) -> bool {
    code_unit.name == CodeUnit::CHAR8.name
}

fn header_start(code_unit: &CodeUnit, options: &HeaderOptions) -> String {
    let mut out = String::from(PREAMBLE);
    out.push_str("#pragma once\n\n");

    if code_unit.name == CodeUnit::CHAR.name {
        out.push_str(&format!(
            "#include \"{}\"\n",
            header_file_name(&CodeUnit::UNSIGNED_CHAR)
        ));
    } else if code_unit.name == CodeUnit::WCHAR.name {
        out.push_str("#include <cwchar>\n#include <type_traits>\n");
        out.push_str(&format!(
            "#include \"{}\"\n#include \"{}\"\n",
            header_file_name(&CodeUnit::CHAR16),
            header_file_name(&CodeUnit::CHAR32)
        ));
    } else {
        out.push_str("#include <cstdint>\n");
    }

    if is_char8(code_unit) {
        out.push_str("\n#ifdef __cpp_char8_t\n");
    }

    out.push_str(&format!("\nnamespace {}\n{{\n", options.namespace));
    if code_unit.name == CodeUnit::WCHAR.name {
        out.push_str(
            "\tnamespace impl\n\t{\n\t\tusing wchar_code_unit = \
             std::conditional_t<(WCHAR_MAX > 0xFFFF), char32_t, char16_t>;\n\t}\n\n",
        );
    }
    out
}

fn body(
    function: &Function,
    code_unit: &CodeUnit,
    resolved: Option<&Resolved>,
    emitter: &CppEmitter,
) -> String {
    if let Some(resolved) = resolved {
        if resolved.set.is_empty() {
            return "static_cast<void>(c);\nreturn false;".to_owned();
        }
    }

    if let Some(proxy) = code_unit.proxy {
        return format!("return {}(static_cast<{}>(c));", function.name, proxy);
    }

    let lit = |value: u32| code_unit.literal(value);
    match (function.kind, resolved) {
        (Kind::Identify { .. }, Some(Resolved {
            predicate: Some(predicate),
            ..
        })) => emitter.body(predicate),
        (Kind::AnyOf(names), _) => format!(
            "return {};",
            names
                .iter()
                .map(|name| format!("{}(c)", name))
                .collect::<Vec<_>>()
                .join(" || ")
        ),
        (Kind::NoneOf(names), _) => format!(
            "return {};",
            names
                .iter()
                .map(|name| format!("!{}(c)", name))
                .collect::<Vec<_>>()
                .join(" && ")
        ),
        (Kind::NotCodePoint, _) if code_unit.max() >= MAX_CODE_POINT => {
            format!("return {} < c;", lit(MAX_CODE_POINT))
        }
        (Kind::NotCodePoint, _) => {
            "return !is_ascii_code_point(c) && !is_non_ascii_code_point(c);".to_owned()
        }
        (Kind::CodePointBoundary, _) => match code_unit.bits {
            8 => "return (c & 0b11000000u) != 0b10000000u;".to_owned(),
            16 => format!("return c <= {} || {} <= c;", lit(0xDBFF), lit(0xE000)),
            _ => format!("return c <= {};", lit(MAX_CODE_POINT)),
        },
        (Kind::Identify { .. }, _) => unreachable!("{} was not compiled", function.name),
    }
}

/// Definitions the generated tests rely on, written once next to them.
pub const TEST_HELPERS: &str = r#"//-----
// this file was generated by ucd_predicates_gen - do not modify it directly
//-----
#pragma once

#include <catch2/catch_test_macros.hpp>
#include <cstddef>
#include <cstdint>

template <typename T>
using code_unit_func = bool(T) noexcept;

template <typename T>
struct code_unit_range
{
	T first;
	T last;
};

template <typename T, size_t Group>
struct code_unit_func_group;

template <typename T, typename U>
bool in(code_unit_func<T>* fn, const code_unit_range<U>& range) noexcept
{
	for (U c = range.first;; c++)
	{
		if (!fn(static_cast<T>(c)))
			return false;
		if (c == range.last)
			return true;
	}
}

template <typename T, typename U>
bool not_in(code_unit_func<T>* fn, const code_unit_range<U>& range) noexcept
{
	for (U c = range.first;; c++)
	{
		if (fn(static_cast<T>(c)))
			return false;
		if (c == range.last)
			return true;
	}
}

template <size_t Group, typename T>
bool in_only(code_unit_func<T>* fn, T c) noexcept
{
	for (auto other : code_unit_func_group<T, Group>::functions)
		if (other != fn && other(c))
			return false;
	return true;
}

template <size_t Group, typename T, typename U>
bool in_only(code_unit_func<T>* fn, const code_unit_range<U>& range) noexcept
{
	for (U c = range.first;; c++)
	{
		if (!in_only<Group>(fn, static_cast<T>(c)))
			return false;
		if (c == range.last)
			return true;
	}
}
"#;

fn tests_start(code_unit: &CodeUnit, options: &HeaderOptions) -> String {
    let mut out = String::from(PREAMBLE);
    out.push_str(&format!("#include \"{}\"\n", TEST_HELPERS_FILE_NAME));
    out.push_str(&format!("#include \"{}\"\n\n", header_file_name(code_unit)));
    if is_char8(code_unit) {
        out.push_str("#ifdef __cpp_char8_t\n\n");
    }
    out.push_str(&format!("using namespace {};\n\n", options.namespace));

    for (group, names) in catalog::mutex_groups() {
        out.push_str(&format!(
            "template <>\nstruct code_unit_func_group<{}, {}>\n{{\n",
            code_unit.name, group
        ));
        out.push_str(&format!(
            "\tstatic constexpr code_unit_func<{}>* functions[] =\n\t{{\n",
            code_unit.name
        ));
        for name in names {
            out.push_str(&format!("\t\t{},\n", name));
        }
        out.push_str("\t};\n};\n\n");
    }
    out
}

// Items per line of test data arrays.
const RANGES_PER_LINE: usize = 3;
const VALUES_PER_LINE: usize = 6;

fn array(items: Vec<String>, per_line: usize) -> String {
    items
        .chunks(per_line)
        .map(|line| format!("\t\t{}", line.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn test_case(function: &Function, code_unit: &CodeUnit, resolved: &Resolved) -> String {
    let mut out = format!(
        "TEST_CASE(\"unicode - {} ({})\")\n{{\n",
        function.name, code_unit.name
    );
    out.push_str(&format!(
        "\tstatic constexpr auto fn = static_cast<code_unit_func<{}>*>({});\n",
        code_unit.name, function.name
    ));

    let groups = function.mutex_groups;
    for (set, expected) in [(&resolved.set, true), (&resolved.inverse, false)] {
        if set.is_empty() {
            continue;
        }
        // Only members are required to be outside of the other functions of their groups
        let group_checks = expected && !groups.is_empty();

        out.push_str(&format!("\n\t// values which should return {}\n", expected));

        if set.contiguous_subrange_count() > 0 {
            let ranges = set
                .ranges()
                .map(|(first, last)| {
                    format!(
                        "{{ {}, {} }},",
                        code_unit.literal(first),
                        code_unit.literal(last)
                    )
                })
                .collect();
            out.push_str(&format!(
                "\tstatic constexpr code_unit_range<uint_least32_t> {}_ranges[] =\n\t{{\n{}\n\t}};\n",
                expected,
                array(ranges, RANGES_PER_LINE)
            ));
            out.push_str(&format!("\tfor (const auto& r : {}_ranges)\n", expected));
            if group_checks {
                out.push_str("\t{\n");
            }
            out.push_str(&format!(
                "\t\tREQUIRE({}in(fn, r));\n",
                if expected { "" } else { "not_" }
            ));
            if group_checks {
                for group in groups {
                    out.push_str(&format!("\t\tREQUIRE(in_only<{}>(fn, r));\n", group));
                }
                out.push_str("\t}\n");
            }
        }

        if set.sparse_value_count() > 0 {
            let values = set
                .values()
                .map(|value| format!("{},", code_unit.literal(value)))
                .collect();
            out.push_str(&format!(
                "\tstatic constexpr uint_least32_t {}_values[] =\n\t{{\n{}\n\t}};\n",
                expected,
                array(values, VALUES_PER_LINE)
            ));
            out.push_str(&format!("\tfor (auto v : {}_values)\n", expected));
            if group_checks {
                out.push_str("\t{\n");
            }
            out.push_str(&format!(
                "\t\tREQUIRE({}fn(static_cast<{}>(v)));\n",
                if expected { "" } else { "!" },
                code_unit.name
            ));
            if group_checks {
                for group in groups {
                    out.push_str(&format!(
                        "\t\tREQUIRE(in_only<{}>(fn, static_cast<{}>(v)));\n",
                        group, code_unit.name
                    ));
                }
                out.push_str("\t}\n");
            }
        }
    }

    out.push_str("}\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucd_predicates::{CodePointCache, Compiler, Config, UcdSupplier, UnicodeDatabase};

    const UNICODE_DATA: &str = "\
0020;SPACE;Zs;0;WS;;;;;N;;;;;
002D;HYPHEN-MINUS;Pd;0;ES;;;;;N;;;;;
0030;DIGIT ZERO;Nd;0;EN;;0;0;0;N;;;;;
0031;DIGIT ONE;Nd;0;EN;;1;1;1;N;;;;;
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
0061;LATIN SMALL LETTER A;Ll;0;L;;;;;N;;;0041;;0041
00AA;FEMININE ORDINAL INDICATOR;Lo;0;L;<super> 0061;;;;N;;;;;
01C5;LATIN CAPITAL LETTER D WITH SMALL LETTER Z WITH CARON;Lt;0;L;<compat> 0044 017E;;;;N;;;01C4;01C6;01C5
02B0;MODIFIER LETTER SMALL H;Lm;0;L;<super> 0068;;;;N;;;;;
0300;COMBINING GRAVE ACCENT;Mn;230;NSM;;;;;N;NON-SPACING GRAVE;;;;
0903;DEVANAGARI SIGN VISARGA;Mc;0;L;;;;;N;;;;;
16EE;RUNIC ARLAUG SYMBOL;Nl;0;L;;;;;N;;;;;
2010;HYPHEN;Pd;0;ON;;;;;N;;;;;
3000;IDEOGRAPHIC SPACE;Zs;0;WS;<wide> 0020;;;;N;;;;;
";

    const PROP_LIST: &str = "\
0020          ; White_Space
3000          ; White_Space
002D          ; Hyphen
2010          ; Hyphen
0061          ; Lowercase
00AA          ; Lowercase
0041          ; Uppercase
";

    fn generate_for(code_unit: &CodeUnit) -> Output {
        let db = UnicodeDatabase::parse(UNICODE_DATA, [PROP_LIST]).unwrap();
        let supplier = UcdSupplier::new(&db, CodePointCache::in_memory());
        let compiler = Compiler::new(Config::default()).unwrap();
        let mut generator = Generator::new(supplier, compiler, true);
        let options = HeaderOptions {
            namespace: "unicode".to_owned(),
            attributes: None,
            emitter: CppOptions::default(),
        };
        generate(&mut generator, code_unit, &options).unwrap()
    }

    #[test]
    fn utf32_header() {
        let output = generate_for(&CodeUnit::CHAR32);
        let header = &output.header;
        assert!(header.starts_with(PREAMBLE));
        assert!(header.contains("#include <cstdint>"));
        assert!(header.contains("\tconstexpr bool is_letter(char32_t c) noexcept\n"));
        assert!(header.contains("\t\treturn is_ascii_letter(c) || is_non_ascii_letter(c);\n"));
        assert!(header.contains("\t\treturn U'\\U0010FFFF' < c;\n"));
        assert!(header.contains("U'0' <= c"));
        assert!(header.ends_with("}\n"));

        let tests = output.tests.unwrap();
        assert!(tests.contains("struct code_unit_func_group<char32_t, 1>"));
        assert!(tests.contains("TEST_CASE(\"unicode - is_ascii_hyphen (char32_t)\")"));
        assert!(tests.contains("REQUIRE(in_only<2>(fn, static_cast<char32_t>(v)));"));
    }

    #[test]
    fn utf8_non_ascii_functions_are_false() {
        let output = generate_for(&CodeUnit::CHAR8);
        let header = &output.header;
        assert!(header.contains("#ifdef __cpp_char8_t"));
        assert!(header.contains(
            "constexpr bool is_non_ascii_letter(char8_t c) noexcept\n\t{\n\t\tstatic_cast<void>(c);\n\t\treturn false;\n\t}"
        ));
        assert!(header.contains("\t\treturn (c & 0b11000000u) != 0b10000000u;\n"));
        assert!(output.tests.unwrap().ends_with("#endif // __cpp_char8_t\n"));
    }

    #[test]
    fn proxies_forward() {
        let output = generate_for(&CodeUnit::CHAR);
        assert!(output
            .header
            .contains("#include \"unicode_unsigned_char.h\""));
        assert!(output
            .header
            .contains("\t\treturn is_letter(static_cast<unsigned char>(c));\n"));
        assert!(output.tests.is_some());

        let output = generate_for(&CodeUnit::WCHAR);
        assert!(output
            .header
            .contains("return is_whitespace(static_cast<impl::wchar_code_unit>(c));"));
        assert!(output.tests.is_none());
    }
}
