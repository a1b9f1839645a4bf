//! Line wrapping and indentation of generated C++.

/// Column generated lines are wrapped at.
pub const COLUMN_LIMIT: usize = 120;

/// Width of a tab when measuring lines.
pub const TAB_WIDTH: usize = 4;

/// Join `operands` with `sep`, starting a new line (with `wrap_prefix`, then `sep`) before any
/// operand that would reach the column limit. `indent` is the column the text starts at.
pub fn wrap_chain<S: AsRef<str>>(operands: &[S], sep: &str, wrap_prefix: &str, indent: usize) -> String {
    let prefix_width: usize = wrap_prefix
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum();

    let mut out = String::new();
    let mut line_len = 0;

    for (idx, operand) in operands.iter().enumerate() {
        let operand = operand.as_ref().trim();
        if idx == 0 {
            out.push_str(operand);
            line_len = operand.len();
        } else if line_len + operand.len() + indent >= COLUMN_LIMIT {
            out.push('\n');
            out.push_str(wrap_prefix);
            out.push_str(sep);
            out.push(' ');
            out.push_str(operand);
            line_len = prefix_width + sep.len() + 1 + operand.len();
        } else {
            out.push(' ');
            out.push_str(sep);
            out.push(' ');
            out.push_str(operand);
            line_len += sep.len() + operand.len() + 2;
        }
    }

    out
}

/// Indent every non-empty line of `text` by `count` tabs.
pub fn indent_with_tabs(text: &str, count: usize) -> String {
    if count == 0 {
        return text.to_owned();
    }
    let indent = "\t".repeat(count);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove brackets enclosing the whole of `s`, e.g. `((a) || (b))` becomes `(a) || (b)`.
pub fn strip_brackets(mut s: &str) -> &str {
    while let Some(inner) = enclosed(s) {
        s = inner;
    }
    s
}

// The text inside the brackets, when `s` is a single bracketed group.
fn enclosed(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                // `(a) || (b)`: the first bracket closes before the end
                depth = depth.checked_sub(1)?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Some(inner)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_chain() {
        assert_eq!(wrap_chain(&["a", "b", "c"], "||", "\t", 0), "a || b || c");
    }

    #[test]
    fn long_chain() {
        let operands: Vec<String> = (0..20).map(|i| format!("c == 0x{:04X}u", i)).collect();
        let wrapped = wrap_chain(&operands, "||", "\t", 8);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[1].starts_with("\t|| c == "));
        for line in lines {
            assert!(line.len() + 8 <= COLUMN_LIMIT);
        }
    }

    #[test]
    fn indent() {
        assert_eq!(indent_with_tabs("a\n\nb", 2), "\t\ta\n\n\t\tb");
        assert_eq!(indent_with_tabs("a", 0), "a");
    }

    #[test]
    fn brackets() {
        assert_eq!(strip_brackets("((a || b))"), "a || b");
        assert_eq!(strip_brackets("(a) || (b)"), "(a) || (b)");
        assert_eq!(strip_brackets("a"), "a");
        assert_eq!(strip_brackets("(a) && b)"), "(a) && b)");
    }
}
