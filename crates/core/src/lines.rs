//! Line splitting and the `(current, next)` cursor the dispatcher walks.

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

/// Split source text into lines.
///
/// A leading byte-order mark is dropped and `\r\n` endings are normalised.
/// A trailing newline does not produce an extra empty line.
pub fn split_lines(input: &str) -> Vec<String> {
    strip_bom(input)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// A line holding nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A non-blank line that starts with whitespace.
pub fn is_indented(line: &str) -> bool {
    !is_blank(line) && line.starts_with([' ', '\t'])
}

/// Leading whitespace width in columns (tabs advance to the next multiple of 4).
pub fn indentation(line: &str) -> usize {
    let mut col = 0;
    for b in line.bytes() {
        match b {
            b' ' => col += 1,
            b'\t' => col += 4 - (col % 4),
            _ => break,
        }
    }
    col
}

/// Peekable window over a list of lines.
///
/// The cursor starts before the first line, so the first pair is
/// `("", line1)` and the last one is `(lineN, "")`. Empty input still yields
/// a single `("", "")` pair.
#[derive(Debug)]
pub struct LineCursor<'a> {
    lines: &'a [String],
    // Index of the line returned by `peek_next`; `current` is the one before it.
    next: usize,
}

impl<'a> LineCursor<'a> {
    /// Create a cursor positioned on the first pair.
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines, next: 0 }
    }

    /// Line under the cursor (`""` for the virtual line before the input).
    pub fn current(&self) -> &'a str {
        match self.next.checked_sub(1) {
            Some(idx) => self.lines.get(idx).map(String::as_str).unwrap_or(""),
            None => "",
        }
    }

    /// Line after the current one (`""` past the end).
    pub fn peek_next(&self) -> &'a str {
        self.lines.get(self.next).map(String::as_str).unwrap_or("")
    }

    /// 1-based number of the current line (0 for the virtual first line).
    pub fn line_number(&self) -> usize {
        self.next
    }

    /// Move to the next pair. Returns `false` once every line has been current.
    pub fn advance(&mut self) -> bool {
        if self.next >= self.lines.len() {
            return false;
        }
        self.next += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(input: &str) -> Vec<(String, String)> {
        let lines = split_lines(input);
        let mut cursor = LineCursor::new(&lines);
        let mut out = Vec::new();
        loop {
            out.push((cursor.current().to_string(), cursor.peek_next().to_string()));
            if !cursor.advance() {
                break;
            }
        }
        out
    }

    #[test]
    fn empty_input_yields_one_blank_pair() {
        assert_eq!(pairs(""), vec![(String::new(), String::new())]);
    }

    #[test]
    fn pairs_cover_every_line_twice() {
        let got = pairs("a\nb\n");
        let expected: Vec<(String, String)> = vec![
            ("".into(), "a".into()),
            ("a".into(), "b".into()),
            ("b".into(), "".into()),
        ];
        assert_eq!(got, expected);
    }

    #[test]
    fn line_numbers_follow_current() {
        let lines = split_lines("x\ny");
        let mut cursor = LineCursor::new(&lines);
        assert_eq!(cursor.line_number(), 0);
        cursor.advance();
        assert_eq!(cursor.line_number(), 1);
        assert_eq!(cursor.current(), "x");
    }

    #[test]
    fn split_strips_bom_and_carriage_returns() {
        assert_eq!(split_lines("\u{feff}one\r\ntwo\r\n"), vec!["one", "two"]);
    }

    #[test]
    fn indentation_helpers() {
        assert!(is_blank("   "));
        assert!(!is_indented("   "));
        assert!(is_indented("  x"));
        assert!(!is_indented("x"));
        assert_eq!(indentation("  x"), 2);
        assert_eq!(indentation(" \tx"), 4);
    }
}
