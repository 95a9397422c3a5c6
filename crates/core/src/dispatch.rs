//! The line dispatcher.
//!
//! Every `(current, next)` pair goes through an ordered chain of recognizers;
//! the first one that claims the line wins. The order matters: directives are
//! seen before anything else, literal blocks protect their contents from the
//! structural recognizers, and the paragraph fallback handles whatever is
//! left.

use std::fmt::Write as _;

use crate::context::{Context, RfcAttributes};
use crate::converter::Converter;
use crate::directives::{Directive, parse_directive, sanitize_comment};
use crate::error::{ConvertError, Warning};
use crate::lines::{indentation, is_blank, is_indented};
use crate::metadata::parse_assignment;
use crate::render::PROLOGUE;
use crate::slug::anchor;
use crate::table::is_separator;

/// Kind of list a list item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Enumerated,
}

/// Split a column-0 list item into its kind and text.
fn list_item(line: &str) -> Option<(ListKind, &str)> {
    for bullet in ["* ", "- ", "+ "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some((ListKind::Bullet, rest));
        }
    }

    let (label, rest) = line
        .split_once(". ")
        .or_else(|| line.split_once(") "))?;
    if label == "#" || (!label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())) {
        return Some((ListKind::Enumerated, rest));
    }
    None
}

fn is_list_item(line: &str) -> bool {
    list_item(line).is_some()
}

/// Heading level for `current` underlined by `next`.
fn heading_level(current: &str, next: &str) -> Option<usize> {
    let text = current.trim();
    let underline = next.trim_end();
    if text.is_empty() {
        return None;
    }
    let marker = underline.chars().next()?;
    let level = match marker {
        '=' => 1,
        '-' => 2,
        '~' => 3,
        _ => return None,
    };
    if !underline.chars().all(|ch| ch == marker) {
        return None;
    }
    if underline.chars().count() < text.chars().count() {
        return None;
    }
    Some(level)
}

/// Contexts a blank line ends.
fn closes_at_blank_line(context: &Context) -> bool {
    matches!(
        context,
        Context::BlockQuote
            | Context::ListItem
            | Context::OrderedList
            | Context::UnorderedList
            | Context::Text
            | Context::DefinitionDescription
            | Context::Artwork
            | Context::Comment
            | Context::ConsumeBlankLine
    )
}

/// Contexts a block quote never closes.
fn is_block_boundary(context: &Context) -> bool {
    matches!(
        context,
        Context::Section { .. }
            | Context::TableCell
            | Context::Abstract
            | Context::Aside
            | Context::Middle
            | Context::Front
            | Context::Back
    )
}

fn is_table_mode(context: &Context) -> bool {
    matches!(context, Context::TableHeader | Context::TableBody)
}

impl Converter {
    /// Process one line given the line that follows it.
    pub(crate) fn process_line(&mut self, current: &str, next: &str) -> Result<(), ConvertError> {
        log::trace!("{}: {:?}", self.location, current);

        // A directive followed directly by content has no blank line to eat.
        if !is_blank(current) && self.stack.top_is(|c| *c == Context::ConsumeBlankLine) {
            self.close_context()?;
        }

        if self.handle_directive(current)? {
            return Ok(());
        }
        self.close_on_dedent(current)?;
        if self.handle_blank_line(current, next)? {
            return Ok(());
        }
        if self.handle_title_or_section(current, next)? {
            return Ok(());
        }
        if self.handle_table(current)? {
            return Ok(());
        }
        if self.handle_assignment(current) {
            return Ok(());
        }
        if self.handle_literal(current) {
            return Ok(());
        }
        if self.handle_definition_term(current, next)? {
            return Ok(());
        }
        if self.handle_artwork(current, next)? {
            return Ok(());
        }
        if self.handle_block_quote(current, next)? {
            return Ok(());
        }
        self.handle_paragraph(current)
    }

    fn write_line(&mut self, text: &str) {
        self.stack.write_line(&mut self.output, text);
    }

    fn push(&mut self, context: Context) {
        self.stack.push(&mut self.output, context);
    }

    fn close_if(&mut self, pred: impl Fn(&Context) -> bool) -> Result<(), ConvertError> {
        if self.stack.top_is(pred) {
            self.close_context()?;
        }
        Ok(())
    }

    fn handle_directive(&mut self, current: &str) -> Result<bool, ConvertError> {
        let Some(directive) = parse_directive(current) else {
            return Ok(false);
        };
        if is_indented(current)
            && self
                .stack
                .top_is(|c| c.is_literal() || *c == Context::Comment)
        {
            return Ok(false);
        }
        self.close_on_dedent(current)?;
        log::debug!("{}: {:?}", self.location, directive);

        match directive {
            Directive::Contents | Directive::SectNum => {}
            Directive::Header => {
                self.output.push_str(PROLOGUE);
                let attributes = RfcAttributes {
                    ipr: self.metadata.ipr.replace('"', "&quot;"),
                    doc_name: self.metadata.doc_name.replace('"', "&quot;"),
                    category: self.metadata.category.replace('"', "&quot;"),
                    submission_type: self.metadata.submission_type.replace('"', "&quot;"),
                };
                self.push(Context::Rfc(attributes));
                self.push(Context::Front);
            }
            Directive::CodeBlock { language } => {
                self.close_if(|c| *c == Context::Text)?;
                self.open_body_block();
                let language =
                    language.map(|l| html_escape::encode_double_quoted_attribute(l).into_owned());
                self.push(Context::SourceCode { language });
                self.push(Context::ConsumeBlankLine);
            }
            Directive::Glossary => {
                self.close_if(|c| *c == Context::Text)?;
                self.open_body_block();
                self.push(Context::DefinitionList);
                self.push(Context::ConsumeBlankLine);
            }
            Directive::Admonition { title } => {
                self.close_if(|c| *c == Context::Text)?;
                self.open_body_block();
                self.push(Context::Aside);
                let title = self.inline(title);
                self.write_line(&format!("<t><strong>{title}</strong></t>"));
                self.push(Context::ConsumeBlankLine);
            }
            Directive::Table { caption } => {
                self.close_if(|c| *c == Context::Text)?;
                self.open_body_block();
                self.push(Context::Table);
                let caption = self.inline(caption);
                self.write_line(&format!("<name>{caption}</name>"));
                self.push(Context::ConsumeBlankLine);
            }
            Directive::Include { path } => {
                log::debug!("{}: including {}", self.location, path);
                self.process_file(path)?;
            }
            Directive::Comment { text } => {
                self.push(Context::Comment);
                if !text.is_empty() {
                    self.write_line(&sanitize_comment(text));
                }
            }
        }
        Ok(true)
    }

    /// An unindented line ends the innermost literal, aside or comment.
    fn close_on_dedent(&mut self, current: &str) -> Result<(), ConvertError> {
        if is_blank(current) || is_indented(current) {
            return Ok(());
        }
        let innermost = self.stack.rposition(|c| {
            c.is_literal() || c.is_table_part() || matches!(c, Context::Aside | Context::Comment)
        });
        let closable = innermost
            .and_then(|idx| self.stack.iter().nth(idx))
            .is_some_and(|c| !c.is_table_part());
        if let Some(idx) = innermost
            && closable
        {
            self.pop_to(idx)?;
        }
        Ok(())
    }

    fn handle_blank_line(&mut self, current: &str, next: &str) -> Result<bool, ConvertError> {
        if !is_blank(current) {
            return Ok(false);
        }
        if self.stack.top_is(|c| *c == Context::ConsumeBlankLine) {
            self.close_context()?;
            return Ok(true);
        }
        if !is_blank(next) && !is_indented(next) {
            let innermost = self.stack.rposition(|c| c.is_literal() || c.is_table_part());
            let closable = innermost
                .and_then(|idx| self.stack.iter().nth(idx))
                .is_some_and(Context::is_literal);
            if let Some(idx) = innermost
                && closable
            {
                self.pop_to(idx)?;
            }
        }
        Ok(false)
    }

    fn handle_title_or_section(&mut self, current: &str, next: &str) -> Result<bool, ConvertError> {
        if self.pending_underline {
            self.pending_underline = false;
            return Ok(true);
        }
        if self
            .stack
            .top_is(|c| c.is_literal() || is_table_mode(c))
        {
            return Ok(false);
        }
        // Cell text is paragraph content; a section would escape the cell.
        if self.stack.contains(|c| *c == Context::TableCell) {
            return Ok(false);
        }

        let only_equals = !current.is_empty() && current.chars().all(|ch| ch == '=');
        if only_equals && self.stack.top_is(|c| *c == Context::Front) {
            let abbrev = self.metadata.title_abbr.replace('"', "&quot;");
            self.push(Context::Title { abbrev });
            return Ok(true);
        }
        if self.stack.top_is(|c| matches!(c, Context::Title { .. })) {
            if only_equals {
                self.close_context()?;
            } else if !is_blank(current) {
                let text = self.inline(current);
                writeln!(self.output, "{text}").ok();
            }
            return Ok(true);
        }

        let Some(level) = heading_level(current, next) else {
            return Ok(false);
        };
        self.open_section(current, level)?;
        self.pending_underline = true;
        Ok(true)
    }

    fn open_section(&mut self, heading: &str, level: usize) -> Result<(), ConvertError> {
        if self.stack.contains(|c| *c == Context::Front) {
            self.finish_front()?;
            self.push(Context::Middle);
        }

        let base = self
            .stack
            .rposition(|c| *c == Context::Middle)
            .map_or(0, |idx| idx + 1);
        self.pop_to(base + level - 1)?;

        let title = self.inline(heading).replace('"', "&quot;");
        let section = Context::Section {
            anchor: anchor(heading.trim()),
            title,
        };
        log::debug!("{}: level {} section {:?}", self.location, level, section);
        self.push(section);
        Ok(())
    }

    fn handle_table(&mut self, current: &str) -> Result<bool, ConvertError> {
        if self.stack.top_is(Context::is_literal) {
            return Ok(false);
        }

        if is_separator(current) && !self.stack.contains(|c| *c == Context::TableCell) {
            if self.stack.top_is(|c| *c == Context::TableBody) {
                if let Some(row) = self.table.take_row() {
                    self.write_row(row)?;
                }
                self.close_context()?;
                self.close_if(|c| *c == Context::Table)?;
            } else if self.stack.top_is(|c| *c == Context::TableHeader) {
                self.close_context()?;
                self.push(Context::TableBody);
            } else if self.stack.top_is(|c| *c == Context::Table) {
                self.table.start(current);
                self.push(Context::TableHeader);
            } else {
                while self.stack.top_is(|c| {
                    matches!(
                        c,
                        Context::Text | Context::DefinitionDescription | Context::DefinitionList
                    )
                }) {
                    self.close_context()?;
                }
                self.open_body_block();
                self.table.start(current);
                self.stack
                    .push_joined(&mut self.output, vec![Context::Table, Context::TableHeader]);
            }
            return Ok(true);
        }

        if self.stack.top_is(|c| *c == Context::TableHeader) {
            for cell in self.table.split(current) {
                let text = self.inline(&cell);
                self.write_line(&format!("<th>{text}</th>"));
            }
            return Ok(true);
        }

        if self.stack.top_is(|c| *c == Context::TableBody) {
            if is_blank(current) {
                if self.table.has_pending_row() {
                    self.table.append(current);
                }
            } else if self.table.starts_row(current) || !self.table.has_pending_row() {
                if let Some(row) = self.table.start_row(current) {
                    self.write_row(row)?;
                }
            } else {
                self.table.append(current);
            }
            return Ok(true);
        }

        Ok(false)
    }

    fn handle_assignment(&mut self, current: &str) -> bool {
        if self.stack.top_is(Context::is_literal) {
            return false;
        }
        let Some(assignment) = parse_assignment(current) else {
            return false;
        };
        if !self.metadata.assign(&assignment) {
            self.diagnostics.warn(Warning::UnknownVariable {
                location: self.location.clone(),
                name: assignment.name.to_string(),
            });
        }
        true
    }

    fn handle_literal(&mut self, current: &str) -> bool {
        if self.stack.top_is(Context::is_literal) {
            if is_blank(current) {
                self.pending_blank_lines += 1;
                return true;
            }
            for _ in 0..std::mem::take(&mut self.pending_blank_lines) {
                self.output.push('\n');
            }
            writeln!(self.output, "{}", html_escape::encode_text(current)).ok();
            return true;
        }

        if self.stack.top_is(|c| *c == Context::Comment) && !is_blank(current) {
            self.write_line(&sanitize_comment(current.trim()));
            return true;
        }
        false
    }

    fn handle_definition_term(&mut self, current: &str, next: &str) -> Result<bool, ConvertError> {
        if is_blank(current) || is_blank(next) {
            return Ok(false);
        }
        if self.stack.top_is(|c| *c == Context::DefinitionTerm) {
            return Ok(false);
        }
        if is_list_item(current) || is_list_item(next.trim_start()) {
            return Ok(false);
        }
        let starts_alphanumeric = current
            .trim_start()
            .trim_start_matches(['*', '`'])
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        if !starts_alphanumeric || indentation(next) <= indentation(current) {
            return Ok(false);
        }

        self.close_if(|c| *c == Context::Text)?;
        self.close_if(|c| *c == Context::DefinitionDescription)?;
        if !self.stack.top_is(|c| *c == Context::DefinitionList) {
            self.open_body_block();
            self.push(Context::DefinitionList);
        }
        self.push(Context::DefinitionTerm);
        let term = self.inline(current);
        self.write_line(&term);
        Ok(true)
    }

    fn handle_artwork(&mut self, current: &str, next: &str) -> Result<bool, ConvertError> {
        if is_blank(current) || !is_blank(next) || !current.trim_end().ends_with("::") {
            return Ok(false);
        }
        if current.trim() != "::" {
            self.handle_paragraph(current)?;
        }
        self.close_if(|c| *c == Context::Text)?;
        self.push(Context::Artwork);
        self.push(Context::ConsumeBlankLine);
        Ok(true)
    }

    fn handle_block_quote(&mut self, current: &str, next: &str) -> Result<bool, ConvertError> {
        if !is_blank(current) || !is_indented(next) || is_separator(next) {
            return Ok(false);
        }
        if self
            .stack
            .top_is(|c| c.is_literal() || *c == Context::Comment)
        {
            return Ok(false);
        }
        // Whatever survives this blank line decides whether indentation is
        // a quotation or just the body of an enclosing construct.
        let settled = self.stack.iter().rev().find(|c| !closes_at_blank_line(c));
        if settled.is_some_and(|c| matches!(c, Context::Aside | Context::DefinitionList)) {
            return Ok(false);
        }

        self.pop_until(is_block_boundary)?;
        self.open_body_block();
        self.push(Context::BlockQuote);
        Ok(true)
    }

    fn handle_paragraph(&mut self, line: &str) -> Result<(), ConvertError> {
        if is_blank(line) {
            while self.stack.top_is(closes_at_blank_line) {
                self.close_context()?;
            }
            return Ok(());
        }

        if let Some((kind, rest)) = list_item(line) {
            self.open_list_item(kind)?;
            let text = self.inline(rest);
            self.write_line(&text);
            return Ok(());
        }

        if self.stack.top_is(|c| *c == Context::DefinitionTerm) {
            self.close_context()?;
            self.push(Context::DefinitionDescription);
        } else if !self.stack.top_is(|c| {
            matches!(
                c,
                Context::Text
                    | Context::BlockQuote
                    | Context::ListItem
                    | Context::DefinitionDescription
            )
        }) {
            self.close_if(|c| *c == Context::DefinitionList)?;
            self.open_body_block();
            self.push(Context::Text);
        }

        let text = self.inline(line);
        self.write_line(&text);
        Ok(())
    }

    fn open_list_item(&mut self, kind: ListKind) -> Result<(), ConvertError> {
        let (list, other) = match kind {
            ListKind::Bullet => (Context::UnorderedList, Context::OrderedList),
            ListKind::Enumerated => (Context::OrderedList, Context::UnorderedList),
        };
        self.close_if(|c| *c == Context::ListItem)?;
        self.close_if(|c| *c == other)?;
        if !self.stack.top_is(|c| *c == list) {
            self.close_if(|c| matches!(c, Context::Text | Context::DefinitionList))?;
            self.open_body_block();
            self.push(list);
        }
        self.push(Context::ListItem);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_markers() {
        assert_eq!(list_item("* One"), Some((ListKind::Bullet, "One")));
        assert_eq!(list_item("- One"), Some((ListKind::Bullet, "One")));
        assert_eq!(list_item("+ One"), Some((ListKind::Bullet, "One")));
        assert_eq!(list_item("1. One"), Some((ListKind::Enumerated, "One")));
        assert_eq!(list_item("12) One"), Some((ListKind::Enumerated, "One")));
        assert_eq!(list_item("#. One"), Some((ListKind::Enumerated, "One")));
        assert_eq!(list_item("**bold**"), None);
        assert_eq!(list_item("  * indented"), None);
        assert_eq!(list_item("Mr. Smith"), None);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level("Foo", "==="), Some(1));
        assert_eq!(heading_level("Foo", "---"), Some(2));
        assert_eq!(heading_level("Foo", "~~~~~"), Some(3));
        assert_eq!(heading_level("Foobar", "==="), None);
        assert_eq!(heading_level("Foo", "=-="), None);
        assert_eq!(heading_level("", "==="), None);
        assert_eq!(heading_level("Foo", ""), None);
    }
}
