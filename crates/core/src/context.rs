//! Open-element stack.
//!
//! Every structural decision the dispatcher makes ends up as a push or a pop
//! here. Pushing writes the opening markup at the depth before the push,
//! popping writes the closing markup at the depth after the pop, so the
//! stack depth is always the indentation of the next line of content.

use std::fmt::Write as _;

/// Attributes of the `<rfc>` root element, captured when the header is seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfcAttributes {
    /// Intellectual property rights statement.
    pub ipr: String,
    /// Draft name.
    pub doc_name: String,
    /// Document category (`std`, `info`, ...).
    pub category: String,
    /// Submission stream.
    pub submission_type: String,
}

/// The kind of element currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// Document root (`<rfc>`).
    Rfc(RfcAttributes),
    /// Front matter (`<front>`).
    Front,
    /// Document title inside the front matter.
    Title {
        /// Short title; the attribute is left out when empty.
        abbrev: String,
    },
    /// Abstract inside the front matter.
    Abstract,
    /// Main body (`<middle>`).
    Middle,
    /// Back matter (`<back>`).
    Back,
    /// One list of bibliographic references.
    References,
    /// Numbered section created from a heading.
    Section {
        /// Slugified heading text.
        anchor: String,
        /// Heading text, already escaped for an attribute value.
        title: String,
    },
    /// Paragraph (`<t>`).
    Text,
    /// Bulleted list.
    UnorderedList,
    /// Enumerated list.
    OrderedList,
    /// List entry.
    ListItem,
    /// Definition list (`<dl>`).
    DefinitionList,
    /// Term of a definition list.
    DefinitionTerm,
    /// Description of a definition list term.
    DefinitionDescription,
    /// Indented quotation.
    BlockQuote,
    /// Literal block introduced by `::`.
    Artwork,
    /// Literal block from a `code-block` directive.
    SourceCode {
        /// Optional language given to the directive.
        language: Option<String>,
    },
    /// Admonition.
    Aside,
    /// XML comment holding an RST comment.
    Comment,
    /// Table element.
    Table,
    /// Header row of a table.
    TableHeader,
    /// Body of a table.
    TableBody,
    /// Body row.
    TableRow,
    /// Body cell.
    TableCell,
    /// Swallows the blank line that follows a directive; emits nothing.
    ConsumeBlankLine,
}

impl Context {
    /// Opening markup, `None` for contexts that emit nothing.
    pub fn open_tag(&self) -> Option<String> {
        let tag = match self {
            Context::Rfc(attrs) => format!(
                "<rfc ipr=\"{}\" docName=\"{}\" category=\"{}\" submissionType=\"{}\">\n",
                attrs.ipr, attrs.doc_name, attrs.category, attrs.submission_type
            ),
            Context::Front => "<front>".to_string(),
            Context::Title { abbrev } if abbrev.is_empty() => "<title>".to_string(),
            Context::Title { abbrev } => format!("<title abbrev=\"{abbrev}\">"),
            Context::Abstract => "<abstract>".to_string(),
            Context::Middle => "<middle>".to_string(),
            Context::Back => "<back>".to_string(),
            Context::References => "<references>".to_string(),
            Context::Section { anchor, title } => {
                format!("<section anchor=\"{anchor}\" title=\"{title}\">")
            }
            Context::Text => "<t>".to_string(),
            Context::UnorderedList => "<ul>".to_string(),
            Context::OrderedList => "<ol>".to_string(),
            Context::ListItem => "<li>".to_string(),
            Context::DefinitionList => "<dl>".to_string(),
            Context::DefinitionTerm => "<dt>".to_string(),
            Context::DefinitionDescription => "<dd>".to_string(),
            Context::BlockQuote => "<blockquote>".to_string(),
            Context::Artwork => "<artwork>".to_string(),
            Context::SourceCode { language: None } => "<sourcecode>".to_string(),
            Context::SourceCode {
                language: Some(language),
            } => format!("<sourcecode type=\"{language}\">"),
            Context::Aside => "<aside>".to_string(),
            Context::Comment => "<!--".to_string(),
            Context::Table => "<table>".to_string(),
            Context::TableHeader => "<thead><tr>".to_string(),
            Context::TableBody => "<tbody>".to_string(),
            Context::TableRow => "<tr>".to_string(),
            Context::TableCell => "<td>".to_string(),
            Context::ConsumeBlankLine => return None,
        };
        Some(tag)
    }

    /// Closing markup, `None` for contexts that emit nothing.
    pub fn close_tag(&self) -> Option<&'static str> {
        let tag = match self {
            Context::Rfc(_) => "</rfc>",
            Context::Front => "</front>",
            Context::Title { .. } => "</title>",
            Context::Abstract => "</abstract>",
            Context::Middle => "</middle>",
            Context::Back => "</back>",
            Context::References => "</references>",
            Context::Section { .. } => "</section>",
            Context::Text => "</t>",
            Context::UnorderedList => "</ul>",
            Context::OrderedList => "</ol>",
            Context::ListItem => "</li>",
            Context::DefinitionList => "</dl>",
            Context::DefinitionTerm => "</dt>",
            Context::DefinitionDescription => "</dd>",
            Context::BlockQuote => "</blockquote>",
            Context::Artwork => "</artwork>",
            Context::SourceCode { .. } => "</sourcecode>",
            Context::Aside => "</aside>",
            Context::Comment => "-->",
            Context::Table => "</table>",
            Context::TableHeader => "</tr></thead>",
            Context::TableBody => "</tbody>",
            Context::TableRow => "</tr>",
            Context::TableCell => "</td>",
            Context::ConsumeBlankLine => return None,
        };
        Some(tag)
    }

    /// Literal blocks copy their lines verbatim.
    pub fn is_literal(&self) -> bool {
        matches!(self, Context::Artwork | Context::SourceCode { .. })
    }

    /// Any part of a table: cell contents never escape past these.
    pub fn is_table_part(&self) -> bool {
        matches!(
            self,
            Context::Table
                | Context::TableHeader
                | Context::TableBody
                | Context::TableRow
                | Context::TableCell
        )
    }
}

/// Stack of open contexts that writes markup as it changes.
#[derive(Debug, Default)]
pub struct ContextStack {
    stack: Vec<Context>,
}

impl ContextStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Innermost open context.
    pub fn top(&self) -> Option<&Context> {
        self.stack.last()
    }

    /// Check whether the innermost context matches.
    pub fn top_is(&self, pred: impl Fn(&Context) -> bool) -> bool {
        self.stack.last().is_some_and(pred)
    }

    /// Check whether any open context matches.
    pub fn contains(&self, pred: impl Fn(&Context) -> bool) -> bool {
        self.stack.iter().any(pred)
    }

    /// Open contexts, outermost first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Context> {
        self.stack.iter()
    }

    /// Index (from the bottom) of the innermost context matching `pred`.
    pub fn rposition(&self, pred: impl Fn(&Context) -> bool) -> Option<usize> {
        self.stack.iter().rposition(pred)
    }

    /// Indentation for a line written at the current depth.
    pub fn indent(&self) -> String {
        " ".repeat(self.depth())
    }

    /// Write one line of content at the current depth.
    pub fn write_line(&self, out: &mut String, text: &str) {
        writeln!(out, "{}{}", self.indent(), text).ok();
    }

    /// Open a context.
    pub fn push(&mut self, out: &mut String, context: Context) {
        log::trace!("push {:?} at depth {}", context, self.depth());
        if let Some(tag) = context.open_tag() {
            self.write_line(out, &tag);
        }
        self.stack.push(context);
    }

    /// Open several contexts with their opening markup on one line.
    pub fn push_joined(&mut self, out: &mut String, contexts: Vec<Context>) {
        let tags: String = contexts.iter().filter_map(Context::open_tag).collect();
        self.write_line(out, &tags);
        self.stack.extend(contexts);
    }

    /// Close the innermost context. Returns `None` on an empty stack.
    pub fn pop(&mut self, out: &mut String) -> Option<Context> {
        let context = self.stack.pop()?;
        if let Some(tag) = context.close_tag() {
            self.write_line(out, tag);
        }
        log::trace!("pop {:?} to depth {}", context, self.depth());
        Some(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_indent_by_depth() {
        let mut out = String::new();
        let mut stack = ContextStack::new();
        stack.push(&mut out, Context::BlockQuote);
        stack.push(&mut out, Context::Text);
        stack.write_line(&mut out, "hello");
        assert_eq!(stack.pop(&mut out), Some(Context::Text));
        assert_eq!(stack.pop(&mut out), Some(Context::BlockQuote));
        assert_eq!(out, "<blockquote>\n <t>\n  hello\n </t>\n</blockquote>\n");
    }

    #[test]
    fn consume_blank_line_is_silent() {
        let mut out = String::new();
        let mut stack = ContextStack::new();
        stack.push(&mut out, Context::ConsumeBlankLine);
        assert_eq!(stack.depth(), 1);
        stack.pop(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn joined_push_writes_one_line() {
        let mut out = String::new();
        let mut stack = ContextStack::new();
        stack.push_joined(&mut out, vec![Context::Table, Context::TableHeader]);
        assert_eq!(out, "<table><thead><tr>\n");
        assert_eq!(stack.depth(), 2);
        assert!(stack.top_is(|c| *c == Context::TableHeader));
    }

    #[test]
    fn pop_on_empty_stack_is_none() {
        let mut out = String::new();
        let mut stack = ContextStack::new();
        assert_eq!(stack.pop(&mut out), None);
    }

    #[test]
    fn attribute_markup() {
        let section = Context::Section {
            anchor: "foo".into(),
            title: "Foo".into(),
        };
        assert_eq!(
            section.open_tag().as_deref(),
            Some("<section anchor=\"foo\" title=\"Foo\">")
        );
        let code = Context::SourceCode {
            language: Some("c".into()),
        };
        assert_eq!(code.open_tag().as_deref(), Some("<sourcecode type=\"c\">"));
        let title = Context::Title {
            abbrev: String::new(),
        };
        assert_eq!(title.open_tag().as_deref(), Some("<title>"));
    }
}
