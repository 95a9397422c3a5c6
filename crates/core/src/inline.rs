//! Inline markup: escaping, literal/strong/emphasis spans and cross references.

use std::fmt::Write as _;

use crate::slug::anchor;

/// Looks up external link targets declared as references.
pub trait ReferenceResolver {
    /// Return the anchor registered for `target` and count the citation.
    fn resolve(&mut self, target: &str) -> Option<String>;
}

/// Resolver for contexts where no references exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReferences;

impl ReferenceResolver for NoReferences {
    fn resolve(&mut self, _target: &str) -> Option<String> {
        None
    }
}

/// Result of transforming one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    /// XML-ready text.
    pub text: String,
    /// Targets of external links that no reference declared, as written.
    pub unresolved: Vec<String>,
}

enum Segment<'a> {
    Plain(&'a str),
    Literal(&'a str),
}

/// Transform one line of inline markup into xml2rfc text.
///
/// The text is trimmed, a trailing literal-block marker (`::`) is reduced,
/// `&`, `<` and `>` are escaped, ``` ``literal`` ``` becomes `<tt>`, `**x**`
/// becomes `<strong>`, `*x*` becomes `<em>`, and `` `text`_ `` links become
/// `<xref>` elements.
pub fn transform(text: &str, resolver: &mut impl ReferenceResolver) -> Inline {
    let text = strip_literal_marker(text.trim());
    let escaped = html_escape::encode_text(text);

    let mut marked = String::with_capacity(escaped.len());
    for segment in split_literals(&escaped) {
        match segment {
            Segment::Literal(content) => {
                write!(marked, "<tt>{}</tt>", content.trim()).ok();
            }
            Segment::Plain(plain) => {
                let strong = pair_markers(plain, "**", "strong");
                let emphasis = pair_markers(&strong, "*", "em");
                marked.push_str(&unescape(&emphasis));
            }
        }
    }

    let mut unresolved = Vec::new();
    let text = resolve_links(&marked, resolver, &mut unresolved);
    Inline { text, unresolved }
}

/// `Para::` keeps one colon, `Para ::` and a bare `::` drop the marker.
fn strip_literal_marker(text: &str) -> &str {
    let Some(body) = text.strip_suffix("::") else {
        return text;
    };
    if body.is_empty() || body.ends_with(char::is_whitespace) {
        body.trim_end()
    } else {
        &text[..text.len() - 1]
    }
}

fn split_literals(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("``") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("``") else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Plain(&rest[..open]));
        }
        segments.push(Segment::Literal(&after[..close]));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Plain(rest));
    }
    segments
}

/// Byte offset of the first `marker` not preceded by a backslash escape.
fn find_unescaped(text: &str, marker: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if text[idx..].starts_with(marker) {
            return Some(idx);
        }
    }
    None
}

/// Wrap the nearest pairs of unescaped `marker`s in `<tag>`.
fn pair_markers(text: &str, marker: &str, tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = find_unescaped(rest, marker) {
        let after = &rest[start + marker.len()..];
        match find_unescaped(after, marker) {
            Some(0) => {
                // empty pair: leave both markers alone
                out.push_str(&rest[..start + 2 * marker.len()]);
                rest = &after[marker.len()..];
            }
            Some(end) => {
                out.push_str(&rest[..start]);
                write!(out, "<{tag}>{}</{tag}>", &after[..end]).ok();
                rest = &after[end + marker.len()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn unescape(text: &str) -> String {
    text.replace("\\*", "*").replace("\\|", "|")
}

fn resolve_links(
    text: &str,
    resolver: &mut impl ReferenceResolver,
    unresolved: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('`') {
        let after = &rest[open + 1..];
        let Some(close) = after.find("`_") else {
            break;
        };
        out.push_str(&rest[..open]);
        let inner = &after[..close];
        match link(inner, resolver) {
            Ok(xref) => out.push_str(&xref),
            Err(target) => {
                out.push_str(&rest[open..open + close + 3]);
                unresolved.push(target);
            }
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

/// Render the inside of a `` `...`_ `` span; `Err` carries an unknown target.
fn link(inner: &str, resolver: &mut impl ReferenceResolver) -> Result<String, String> {
    // Angle brackets were escaped before links are looked at.
    if let Some(body) = inner.strip_suffix("&gt;")
        && let Some(lt) = body.rfind("&lt;")
    {
        let target = &body[lt + "&lt;".len()..];
        let title = match body[..lt].trim() {
            "" => target,
            title => title,
        };
        let base = target.split('#').next().unwrap_or(target);
        return match resolver.resolve(base) {
            Some(anchor) => Ok(format!("<xref target=\"{anchor}\">{title}</xref>")),
            None => Err(target.to_string()),
        };
    }

    let target = anchor(&html_escape::decode_html_entities(inner));
    Ok(format!("<xref target=\"{target}\">{inner}</xref>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Targets {
        anchors: HashMap<String, String>,
        hits: usize,
    }

    impl ReferenceResolver for Targets {
        fn resolve(&mut self, target: &str) -> Option<String> {
            let found = self.anchors.get(target).cloned();
            if found.is_some() {
                self.hits += 1;
            }
            found
        }
    }

    fn plain(text: &str) -> String {
        transform(text, &mut NoReferences).text
    }

    #[test]
    fn emphasis_strong_literal() {
        assert_eq!(plain("*foo*"), "<em>foo</em>");
        assert_eq!(plain("**foo**"), "<strong>foo</strong>");
        assert_eq!(plain("``foo``"), "<tt>foo</tt>");
        assert_eq!(plain("a **b** and *c*"), "a <strong>b</strong> and <em>c</em>");
    }

    #[test]
    fn escaped_markers() {
        assert_eq!(plain("\\*"), "*");
        assert_eq!(plain("\\*\\*foo\\*\\*"), "**foo**");
        assert_eq!(plain("**foo\\*\\*bar**"), "<strong>foo**bar</strong>");
        assert_eq!(plain("*foo\\*bar*"), "<em>foo*bar</em>");
        assert_eq!(plain("a \\| b"), "a | b");
    }

    #[test]
    fn literal_spans_are_not_marked_up() {
        assert_eq!(plain("`` *x* ``"), "<tt>*x*</tt>");
        assert_eq!(plain("``a < b``"), "<tt>a &lt; b</tt>");
    }

    #[test]
    fn xml_special_characters_are_escaped() {
        assert_eq!(plain("a & b < c > d"), "a &amp; b &lt; c &gt; d");
    }

    #[test]
    fn unpaired_marker_stays() {
        assert_eq!(plain("2 * 3"), "2 * 3");
        assert_eq!(plain("****"), "****");
    }

    #[test]
    fn trailing_literal_marker() {
        assert_eq!(plain("Paragraph::"), "Paragraph:");
        assert_eq!(plain("Paragraph: ::"), "Paragraph:");
        assert_eq!(plain("::"), "");
    }

    #[test]
    fn internal_link() {
        assert_eq!(
            plain("see `Foo bar`_ here"),
            "see <xref target=\"foo-bar\">Foo bar</xref> here"
        );
    }

    #[test]
    fn external_link_resolves_and_counts() {
        let mut targets = Targets::default();
        targets
            .anchors
            .insert("https://example.com/target".into(), "SAMPLE".into());
        let inline = transform(
            "`Sample reference <https://example.com/target#section-2>`_",
            &mut targets,
        );
        assert_eq!(inline.text, "<xref target=\"SAMPLE\">Sample reference</xref>");
        assert!(inline.unresolved.is_empty());
        assert_eq!(targets.hits, 1);
    }

    #[test]
    fn unresolved_link_is_left_alone() {
        let inline = transform("`Other <https://nowhere.example>`_", &mut NoReferences);
        assert_eq!(inline.text, "`Other &lt;https://nowhere.example&gt;`_");
        assert_eq!(inline.unresolved, vec!["https://nowhere.example".to_string()]);
    }
}
