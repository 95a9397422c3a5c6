/// Characters allowed at the start of an xml2rfc anchor.
fn is_anchor_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == ':'
}

/// Characters allowed anywhere else in an anchor.
fn is_anchor_char(ch: char) -> bool {
    is_anchor_start(ch) || ch.is_ascii_digit() || ch == '-' || ch == '.'
}

/// Turn heading or link text into an xml2rfc anchor.
///
/// ASCII letters are lowercased; digits, `_`, `:`, `-` and `.` pass through;
/// every other character becomes a hyphen. A first character that may not
/// start an XML name is replaced by a hyphen as well. Runs of hyphens are
/// not collapsed.
///
/// ```
/// use rst2rfcxml_core::slug::anchor;
///
/// assert_eq!(anchor("Foo bar"), "foo-bar");
/// assert_eq!(anchor("2. Intro"), "-.-intro");
/// ```
pub fn anchor(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.chars() {
        if !is_anchor_char(ch) {
            slug.push('-');
        } else if slug.is_empty() && !is_anchor_start(ch) {
            slug.push('-');
        } else {
            slug.push(ch.to_ascii_lowercase());
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basic() {
        assert_eq!(anchor("Hello World"), "hello-world");
    }

    #[test]
    fn punctuation_becomes_hyphens_without_collapsing() {
        assert_eq!(anchor("Foo, Bar & Baz"), "foo--bar---baz");
    }

    #[test]
    fn leading_digit_is_replaced() {
        assert_eq!(anchor("1 Introduction"), "--introduction");
        assert_eq!(anchor("-dash"), "-dash");
    }

    #[test]
    fn non_ascii_letters_are_replaced() {
        assert_eq!(anchor("Héllo"), "h-llo");
    }

    #[test]
    fn empty_text_gives_empty_anchor() {
        assert_eq!(anchor(""), "");
    }

    #[test]
    fn anchor_parity_table() {
        let cases: Vec<(&str, &str)> = vec![
            ("Foo", "foo"),
            ("Foo bar", "foo-bar"),
            ("Terminology", "terminology"),
            ("Security Considerations", "security-considerations"),
            ("ns:element", "ns:element"),
            ("v1.2_final", "v1.2_final"),
            (":colon", ":colon"),
            ("_under", "_under"),
            (".dot", "-dot"),
            ("IANA (Registry)", "iana--registry-"),
        ];

        for (input, expected) in &cases {
            let actual = anchor(input);
            assert_eq!(
                &actual, expected,
                "Mismatch for {:?}: got {:?}, expected {:?}",
                input, actual, expected
            );
        }
    }
}
