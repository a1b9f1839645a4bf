//! Code unit types that predicates are generated for, and their literal formatting.

/// Largest Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// UTF-16 surrogates, which are not code points.
pub const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// Describes a code unit type: how wide it is, which of its values are code points, and how to
/// spell its values as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeUnit {
    /// C++ type name
    pub name: &'static str,

    pub bits: u32,

    /// Prefix of character literals, e.g. `u8` in `u8'a'`
    pub literal_prefix: &'static str,

    /// Whether values are always spelled as integers rather than character literals
    pub integral_literals: bool,

    /// Type that functions taking this code unit forward to, instead of being generated
    pub proxy: Option<&'static str>,
}

impl CodeUnit {
    pub const CHAR: CodeUnit = CodeUnit {
        name: "char",
        bits: 8,
        literal_prefix: "",
        integral_literals: false,
        proxy: Some("unsigned char"),
    };

    /// Used when `char8_t` is not available.
    pub const UNSIGNED_CHAR: CodeUnit = CodeUnit {
        name: "unsigned char",
        bits: 8,
        literal_prefix: "",
        integral_literals: true,
        proxy: None,
    };

    pub const CHAR8: CodeUnit = CodeUnit {
        name: "char8_t",
        bits: 8,
        literal_prefix: "u8",
        integral_literals: false,
        proxy: None,
    };

    pub const CHAR16: CodeUnit = CodeUnit {
        name: "char16_t",
        bits: 16,
        literal_prefix: "u",
        integral_literals: false,
        proxy: None,
    };

    pub const CHAR32: CodeUnit = CodeUnit {
        name: "char32_t",
        bits: 32,
        literal_prefix: "U",
        integral_literals: false,
        proxy: None,
    };

    /// Width is platform-defined; functions forward to the proxy, so 16 bits is enough here.
    pub const WCHAR: CodeUnit = CodeUnit {
        name: "wchar_t",
        bits: 16,
        literal_prefix: "L",
        integral_literals: false,
        proxy: Some("impl::wchar_code_unit"),
    };

    pub const ALL: [CodeUnit; 6] = [
        CodeUnit::CHAR,
        CodeUnit::UNSIGNED_CHAR,
        CodeUnit::CHAR8,
        CodeUnit::CHAR16,
        CodeUnit::CHAR32,
        CodeUnit::WCHAR,
    ];

    pub fn from_name(name: &str) -> Option<CodeUnit> {
        CodeUnit::ALL.iter().copied().find(|unit| unit.name == name)
    }

    /// Largest value of the type.
    pub fn max(&self) -> u32 {
        if self.bits >= 32 {
            u32::MAX
        } else {
            (1 << self.bits) - 1
        }
    }

    /// Largest value of the type that is a code point on its own. 8-bit units only encode ASCII
    /// directly.
    pub fn max_code_point(&self) -> u32 {
        if self.bits == 8 {
            0x7F
        } else {
            self.max().min(MAX_CODE_POINT)
        }
    }

    /// Values that can never be code points in this encoding.
    pub fn dead_zone(&self) -> Option<(u32, u32)> {
        if self.bits == 16 {
            Some(SURROGATES)
        } else {
            None
        }
    }

    pub fn is_code_point(&self, value: u32) -> bool {
        value <= self.max_code_point()
            && !matches!(self.dead_zone(), Some((first, last)) if first <= value && value <= last)
    }

    pub fn can_represent_any_non_ascii(&self) -> bool {
        self.bits > 8
    }

    pub fn can_represent_all_non_ascii(&self) -> bool {
        self.bits > 8 && self.max() >= MAX_CODE_POINT
    }

    /// Fixed width unsigned integer type with the same range.
    pub fn equivalent_integer(&self) -> &'static str {
        match self.bits {
            8 => "uint8_t",
            16 => "uint_least16_t",
            _ => "uint_least32_t",
        }
    }

    /// Identifier-safe version of the type name, e.g. `unsigned_char`.
    pub fn file_stem(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// C++ literal for a value of this type.
    pub fn literal(&self, value: u32) -> String {
        // Surrogates are not valid universal character names in any width
        let surrogate = SURROGATES.0 <= value && value <= SURROGATES.1;
        if self.integral_literals || surrogate || !self.is_code_point(value) {
            return hex_integer_literal(value);
        }

        let body = match value {
            0x00 => "\\0".to_owned(),
            0x07 => "\\a".to_owned(),
            0x08 => "\\b".to_owned(),
            0x09 => "\\t".to_owned(),
            0x0A => "\\n".to_owned(),
            0x0B => "\\v".to_owned(),
            0x0C => "\\f".to_owned(),
            0x0D => "\\r".to_owned(),
            0x27 => "\\'".to_owned(),
            0x5C => "\\\\".to_owned(),
            0x20..=0x7E => char::from(value as u8).to_string(),
            _ if value > 0xFFFF => format!("\\U{:08X}", value),
            _ if value > 0xFF => format!("\\u{:04X}", value),
            _ => format!("\\x{:02X}", value),
        };

        format!("{}'{}'", self.literal_prefix, body)
    }

    /// Rust unsigned integer type with the width of this code unit.
    pub fn rust_type(&self) -> &'static str {
        match self.bits {
            8 => "u8",
            16 => "u16",
            _ => "u32",
        }
    }

    /// Rust hex literal with the width suffix, e.g. `0x41u8`.
    pub fn rust_literal(&self, value: u32) -> String {
        let digits = if value > 0xFFFF {
            8
        } else if value > 0xFF {
            4
        } else {
            2
        };
        format!("0x{:0width$X}{}", value, self.rust_type(), width = digits)
    }
}

/// Hex integer literal zero padded to 2, 4 or 8 digits, e.g. `0x0041u`.
pub fn hex_integer_literal(value: u32) -> String {
    if value > 0xFFFF {
        format!("0x{:08X}u", value)
    } else if value > 0xFF {
        format!("0x{:04X}u", value)
    } else {
        format!("0x{:02X}u", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(CodeUnit::CHAR8.max(), 0xFF);
        assert_eq!(CodeUnit::CHAR8.max_code_point(), 0x7F);
        assert_eq!(CodeUnit::CHAR16.max(), 0xFFFF);
        assert_eq!(CodeUnit::CHAR16.max_code_point(), 0xFFFF);
        assert_eq!(CodeUnit::CHAR32.max(), u32::MAX);
        assert_eq!(CodeUnit::CHAR32.max_code_point(), MAX_CODE_POINT);

        assert!(!CodeUnit::CHAR8.can_represent_any_non_ascii());
        assert!(CodeUnit::CHAR16.can_represent_any_non_ascii());
        assert!(!CodeUnit::CHAR16.can_represent_all_non_ascii());
        assert!(CodeUnit::CHAR32.can_represent_all_non_ascii());
    }

    #[test]
    fn surrogates_are_not_code_points() {
        assert!(CodeUnit::CHAR16.is_code_point(0xD7FF));
        assert!(!CodeUnit::CHAR16.is_code_point(0xD800));
        assert!(!CodeUnit::CHAR16.is_code_point(0xDFFF));
        assert!(CodeUnit::CHAR16.is_code_point(0xE000));
        assert!(CodeUnit::CHAR32.is_code_point(0xD800));
        assert!(!CodeUnit::CHAR32.is_code_point(0x110000));
    }

    #[test]
    fn cpp_literals() {
        assert_eq!(CodeUnit::CHAR8.literal(0x41), "u8'A'");
        assert_eq!(CodeUnit::CHAR8.literal(0x0A), "u8'\\n'");
        assert_eq!(CodeUnit::CHAR8.literal(0x1F), "u8'\\x1F'");
        assert_eq!(CodeUnit::CHAR8.literal(0x7F), "u8'\\x7F'");
        assert_eq!(CodeUnit::CHAR8.literal(0x80), "0x80u");
        assert_eq!(CodeUnit::CHAR8.literal(0x27), "u8'\\''");
        assert_eq!(CodeUnit::CHAR8.literal(0x5C), "u8'\\\\'");
        assert_eq!(CodeUnit::UNSIGNED_CHAR.literal(0x41), "0x41u");
        assert_eq!(CodeUnit::CHAR16.literal(0x3A9), "u'\\u03A9'");
        assert_eq!(CodeUnit::CHAR16.literal(0xD800), "0xD800u");
        assert_eq!(CodeUnit::CHAR32.literal(0x1F600), "U'\\U0001F600'");
        assert_eq!(CodeUnit::CHAR32.literal(0x110000), "0x00110000u");
        assert_eq!(CodeUnit::CHAR32.literal(0xD800), "0xD800u");
        assert_eq!(CodeUnit::CHAR32.literal(0xDFFF), "0xDFFFu");
        assert_eq!(CodeUnit::CHAR32.literal(0xE000), "U'\\uE000'");
        assert_eq!(CodeUnit::WCHAR.literal(0x20), "L' '");
    }

    #[test]
    fn rust_literals() {
        assert_eq!(CodeUnit::CHAR8.rust_literal(0x41), "0x41u8");
        assert_eq!(CodeUnit::CHAR16.rust_literal(0x3A9), "0x03A9u16");
        assert_eq!(CodeUnit::CHAR32.rust_literal(0x1F600), "0x0001F600u32");
    }

    #[test]
    fn lookup() {
        assert_eq!(
            CodeUnit::from_name("unsigned char"),
            Some(CodeUnit::UNSIGNED_CHAR)
        );
        assert_eq!(CodeUnit::from_name("char64_t"), None);
        assert_eq!(CodeUnit::UNSIGNED_CHAR.file_stem(), "unsigned_char");
    }
}
