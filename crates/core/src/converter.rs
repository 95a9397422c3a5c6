//! Conversion session: owns all state and drives the line dispatcher.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use crate::context::{Context, ContextStack};
use crate::error::{ConvertError, Diagnostics, SourceLocation, Warning};
use crate::inline::{self, Inline};
use crate::lines::{LineCursor, split_lines};
use crate::metadata::Metadata;
use crate::options::ConvertOptions;
use crate::render;
use crate::table::TableBuilder;

/// Output and warnings of a finished conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The xml2rfc document.
    pub xml: String,
    /// Non-fatal problems met on the way.
    pub diagnostics: Diagnostics,
}

/// One conversion session.
///
/// Feed it text with [`Converter::process_str`] or files with
/// [`Converter::process_file`], then call [`Converter::finish`] to close every
/// open element and write the back matter.
///
/// ```
/// use rst2rfcxml_core::Converter;
///
/// let mut converter = Converter::new();
/// converter.process_str("Hello *world*").unwrap();
/// converter.finish().unwrap();
/// assert_eq!(converter.output(), "<t>\n Hello <em>world</em>\n</t>\n");
/// ```
#[derive(Debug, Default)]
pub struct Converter {
    pub(crate) stack: ContextStack,
    pub(crate) metadata: Metadata,
    pub(crate) table: TableBuilder,
    pub(crate) output: String,
    pub(crate) options: ConvertOptions,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) location: SourceLocation,
    /// Directories of the files being read, innermost last.
    base_dirs: Vec<PathBuf>,
    /// The next line is the underline of a heading just opened.
    pub(crate) pending_underline: bool,
    /// Blank lines seen inside a literal block and not yet written.
    pub(crate) pending_blank_lines: usize,
    pub(crate) authors_emitted: bool,
}

impl Converter {
    /// Create a session with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given options.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Convert in-memory text.
    pub fn process_str(&mut self, input: &str) -> Result<(), ConvertError> {
        let lines = split_lines(input);
        self.process_lines(&lines)
    }

    /// Convert a file.
    ///
    /// Relative paths are resolved against the directory of the file being
    /// processed (for includes), then the configured include root, then
    /// taken as given.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConvertError> {
        let path = path.as_ref();
        let base_dir = self.base_dir();
        let resolved = match &base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        log::debug!("reading {}", resolved.display());

        let input = fs::read_to_string(&resolved).map_err(|source| {
            ConvertError::read(resolved.clone(), base_dir.unwrap_or_default(), source)
        })?;

        let parent = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
        self.base_dirs.push(parent);
        let saved = mem::replace(&mut self.location, SourceLocation::with_file(resolved, 0));
        let result = self.process_str(&input);
        self.location = saved;
        self.base_dirs.pop();
        result
    }

    /// Convert several files into one document and finish it.
    pub fn process_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), ConvertError> {
        for path in paths {
            self.process_file(path)?;
        }
        self.finish()
    }

    /// Feed already split lines through the dispatcher.
    pub fn process_lines(&mut self, lines: &[String]) -> Result<(), ConvertError> {
        let mut cursor = LineCursor::new(lines);
        loop {
            self.location.line = cursor.line_number();
            self.process_line(cursor.current(), cursor.peek_next())?;
            if !cursor.advance() {
                break;
            }
        }
        Ok(())
    }

    /// Close every open element and write the back matter.
    pub fn finish(&mut self) -> Result<(), ConvertError> {
        if !self.options.emit_back_matter {
            return self.unwind();
        }

        if let Some(root) = self.stack.rposition(|c| matches!(c, Context::Rfc(_))) {
            self.finish_front()?;
            self.pop_to(root + 1)?;
            self.stack.push(&mut self.output, Context::Back);
            self.write_references();
        } else {
            self.unwind()?;
            if self.metadata.has_citations() {
                self.stack.push(&mut self.output, Context::Back);
                self.write_references();
            }
        }
        self.unwind()
    }

    /// Close every open element without writing back matter.
    pub fn unwind(&mut self) -> Result<(), ConvertError> {
        self.pop_to(0)
    }

    /// Output written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consume the session and return its output.
    pub fn into_output(self) -> String {
        self.output
    }

    /// Warnings collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Variables, authors and references seen so far.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.base_dirs
            .last()
            .cloned()
            .or_else(|| self.options.include_root.clone())
    }

    fn write_references(&mut self) {
        let base_uri = match (&self.metadata.base_target_uri, &self.options.base_target_uri) {
            (uri, _) if !uri.is_empty() => uri.clone(),
            (_, Some(uri)) => uri.clone(),
            _ => String::new(),
        };
        render::write_references(&mut self.output, &mut self.stack, &self.metadata, &base_uri);
    }

    /// Inline-transform `text`, turning unknown link targets into warnings.
    pub(crate) fn inline(&mut self, text: &str) -> String {
        let Inline { text, unresolved } = inline::transform(text, &mut self.metadata);
        for target in unresolved {
            self.diagnostics.warn(Warning::UnresolvedReference {
                location: self.location.clone(),
                target,
            });
        }
        text
    }

    /// Write the authors the first time the front matter gets content.
    pub(crate) fn write_authors(&mut self) {
        if mem::replace(&mut self.authors_emitted, true) {
            return;
        }
        let depth = self.stack.depth();
        for author in self.metadata.authors() {
            render::write_author(&mut self.output, depth, author);
        }
    }

    /// Inside the front matter, body text belongs to the abstract.
    pub(crate) fn open_body_block(&mut self) {
        if self.stack.top_is(|c| *c == Context::Front) {
            self.write_authors();
            self.stack.push(&mut self.output, Context::Abstract);
        }
    }

    /// Close the front matter if it is still open.
    pub(crate) fn finish_front(&mut self) -> Result<(), ConvertError> {
        if !self.stack.contains(|c| *c == Context::Front) {
            return Ok(());
        }
        self.pop_until(|c| *c == Context::Front)?;
        self.write_authors();
        self.close_context()?;
        Ok(())
    }

    /// Close the innermost element, flushing a pending table row first.
    pub(crate) fn close_context(&mut self) -> Result<Context, ConvertError> {
        if self.stack.top_is(|c| *c == Context::TableBody)
            && let Some(row) = self.table.take_row()
        {
            self.write_row(row)?;
        }
        let context = self
            .stack
            .pop(&mut self.output)
            .ok_or_else(|| ConvertError::internal("close on an empty context stack"))?;
        if context.is_literal() {
            self.pending_blank_lines = 0;
        }
        Ok(context)
    }

    fn close_implicitly(&mut self) -> Result<(), ConvertError> {
        if matches!(
            self.stack.top(),
            Some(Context::TableHeader | Context::TableBody)
        ) {
            self.diagnostics.warn(Warning::UnterminatedTable {
                location: self.location.clone(),
            });
        }
        self.close_context().map(|_| ())
    }

    /// Close elements until `depth` remain open.
    pub(crate) fn pop_to(&mut self, depth: usize) -> Result<(), ConvertError> {
        while self.stack.depth() > depth {
            self.close_implicitly()?;
        }
        Ok(())
    }

    /// Close elements until the innermost one matches or none are left.
    pub(crate) fn pop_until(
        &mut self,
        pred: impl Fn(&Context) -> bool,
    ) -> Result<(), ConvertError> {
        while self.stack.depth() > 0 && !self.stack.top_is(&pred) {
            self.close_implicitly()?;
        }
        Ok(())
    }

    /// Write a table row, converting each cell's text as nested markup.
    ///
    /// The enclosing table's column layout and pending row are set aside
    /// while the cells are converted, so nothing inside a cell can disturb
    /// them.
    pub(crate) fn write_row(&mut self, cells: Vec<String>) -> Result<(), ConvertError> {
        let line = self.location.line;
        let table = mem::take(&mut self.table);
        let result = self.write_cells(cells);
        self.table = table;
        self.location.line = line;
        result
    }

    fn write_cells(&mut self, cells: Vec<String>) -> Result<(), ConvertError> {
        self.stack.push(&mut self.output, Context::TableRow);
        for cell in cells {
            self.stack.push(&mut self.output, Context::TableCell);
            let lines = split_lines(&cell);
            self.process_lines(&lines)?;
            self.pop_until(|c| *c == Context::TableCell)?;
            self.close_context()?;
        }
        self.close_context()?;
        Ok(())
    }
}

/// Convert in-memory text into a complete document.
pub fn convert_str(input: &str, options: ConvertOptions) -> Result<Conversion, ConvertError> {
    let mut converter = Converter::with_options(options);
    converter.process_str(input)?;
    converter.finish()?;
    Ok(converter.into_conversion())
}

/// Convert files, in order, into one document.
pub fn convert_files<P: AsRef<Path>>(
    paths: &[P],
    options: ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let mut converter = Converter::with_options(options);
    converter.process_files(paths)?;
    Ok(converter.into_conversion())
}

impl Converter {
    fn into_conversion(self) -> Conversion {
        Conversion {
            xml: self.output,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_nothing() {
        let mut converter = Converter::new();
        converter.process_str("").unwrap();
        converter.finish().unwrap();
        assert_eq!(converter.output(), "");
        assert_eq!(converter.depth(), 0);
    }

    #[test]
    fn close_on_empty_stack_is_internal_error() {
        let mut converter = Converter::new();
        let err = converter.close_context().unwrap_err();
        assert!(matches!(err, ConvertError::Internal(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let mut converter = Converter::new();
        let err = converter
            .process_file("definitely/not/here.rst")
            .unwrap_err();
        match err {
            ConvertError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("definitely/not/here.rst"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(converter.base_dirs.is_empty());
    }

    #[test]
    fn include_root_is_used_for_in_memory_input() {
        let options = ConvertOptions {
            include_root: Some(PathBuf::from("/nonexistent-root")),
            ..ConvertOptions::default()
        };
        let mut converter = Converter::with_options(options);
        let err = converter.process_str(".. include:: part.rst").unwrap_err();
        match err {
            ConvertError::Read { path, base_dir, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent-root/part.rst"));
                assert_eq!(base_dir, PathBuf::from("/nonexistent-root"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn back_matter_can_be_disabled() {
        let options = ConvertOptions {
            emit_back_matter: false,
            ..ConvertOptions::default()
        };
        let conversion = convert_str(".. header::\n\nAbstract.\n", options).unwrap();
        assert!(!conversion.xml.contains("<back>"));
        assert!(conversion.xml.ends_with("</rfc>\n"));
    }
}
