//! Explicit markup recognition.
//!
//! Classifies lines that start with `..` into the directives the converter
//! understands. Substitution definitions (`.. |name| replace:: value`) are
//! not directives; they are left to [`crate::metadata::parse_assignment`].
//! Anything else beginning with `.. ` is an RST comment.

use crate::metadata::parse_assignment;

/// A recognised explicit markup line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `.. contents::`, handled by xml2rfc itself.
    Contents,
    /// `.. sectnum::`, handled by xml2rfc itself.
    SectNum,
    /// `.. header::`, starts the document proper.
    Header,
    /// `.. code-block:: [language]`.
    CodeBlock {
        /// Language argument, if any.
        language: Option<&'a str>,
    },
    /// `.. glossary::`.
    Glossary,
    /// `.. admonition:: Title`.
    Admonition {
        /// Title shown in bold.
        title: &'a str,
    },
    /// `.. table:: Caption`.
    Table {
        /// Caption written as `<name>`.
        caption: &'a str,
    },
    /// `.. include:: path`.
    Include {
        /// Path as written.
        path: &'a str,
    },
    /// Any other explicit markup: comments and hyperlink targets.
    Comment {
        /// Text after the leading `..`.
        text: &'a str,
    },
}

/// Parse an explicit markup line like `.. code-block:: c`.
///
/// Returns `None` if the line is not explicit markup or is a substitution
/// definition. Leading indentation is ignored.
pub fn parse_directive(line: &str) -> Option<Directive<'_>> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("..")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    if parse_assignment(trimmed).is_some() {
        return None;
    }
    let rest = rest.trim();

    let Some((name, argument)) = rest.split_once("::") else {
        return Some(Directive::Comment { text: rest });
    };
    let name = name.trim();
    let argument = argument.trim();
    // `.. _label: target` and `.. |sub| image::` are comments as far as we care.
    if name.contains(char::is_whitespace) {
        return Some(Directive::Comment { text: rest });
    }

    let directive = match name.to_ascii_lowercase().as_str() {
        "contents" => Directive::Contents,
        "sectnum" => Directive::SectNum,
        "header" => Directive::Header,
        "code-block" | "code" | "sourcecode" => Directive::CodeBlock {
            language: Some(argument).filter(|language| !language.is_empty()),
        },
        "glossary" => Directive::Glossary,
        "admonition" => Directive::Admonition { title: argument },
        "table" => Directive::Table { caption: argument },
        "include" => Directive::Include { path: argument },
        _ => Directive::Comment { text: rest },
    };
    Some(directive)
}

/// Make text safe inside an XML comment.
pub fn sanitize_comment(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_supported_directives() {
        assert_eq!(parse_directive(".. contents::"), Some(Directive::Contents));
        assert_eq!(parse_directive(".. sectnum::"), Some(Directive::SectNum));
        assert_eq!(parse_directive(".. header::"), Some(Directive::Header));
        assert_eq!(parse_directive(".. glossary::"), Some(Directive::Glossary));
        assert_eq!(
            parse_directive(".. code-block::"),
            Some(Directive::CodeBlock { language: None })
        );
        assert_eq!(
            parse_directive(".. code-block:: c"),
            Some(Directive::CodeBlock {
                language: Some("c")
            })
        );
        assert_eq!(
            parse_directive(".. admonition:: Note well"),
            Some(Directive::Admonition { title: "Note well" })
        );
        assert_eq!(
            parse_directive(".. table:: Codes"),
            Some(Directive::Table { caption: "Codes" })
        );
        assert_eq!(
            parse_directive(".. include:: part.rst"),
            Some(Directive::Include { path: "part.rst" })
        );
    }

    #[test]
    fn other_explicit_markup_is_a_comment() {
        assert_eq!(
            parse_directive(".. this is a remark"),
            Some(Directive::Comment {
                text: "this is a remark"
            })
        );
        assert_eq!(
            parse_directive(".. note:: hi"),
            Some(Directive::Comment { text: "note:: hi" })
        );
        assert_eq!(
            parse_directive(".. _label: https://example.com"),
            Some(Directive::Comment {
                text: "_label: https://example.com"
            })
        );
        assert_eq!(parse_directive(".."), Some(Directive::Comment { text: "" }));
    }

    #[test]
    fn substitutions_and_plain_text_are_not_directives() {
        assert_eq!(parse_directive(".. |docName| replace:: x"), None);
        assert_eq!(parse_directive("...and so on"), None);
        assert_eq!(parse_directive("text"), None);
    }

    #[test]
    fn comment_dashes_are_broken_up() {
        assert_eq!(sanitize_comment("a -- b"), "a - - b");
        assert_eq!(sanitize_comment("---"), "- - -");
    }
}
