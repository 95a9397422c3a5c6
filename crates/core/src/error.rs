use std::path::PathBuf;

use thiserror::Error;

/// Source location information for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path (absent for in-memory input).
    pub file: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl SourceLocation {
    /// Create a new source location without file information.
    pub fn new(line: usize) -> Self {
        Self { file: None, line }
    }

    /// Create a source location with file information.
    pub fn with_file(file: PathBuf, line: usize) -> Self {
        Self {
            file: Some(file),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}", file.display(), self.line)
        } else {
            write!(f, "<input>:{}", self.line)
        }
    }
}

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An input file (top-level or included) could not be read.
    #[error("can't read {} (base directory {}): {source}", .path.display(), .base_dir.display())]
    Read {
        /// Path as resolved for opening.
        path: PathBuf,
        /// Directory the path was resolved against.
        base_dir: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Conversion options could not be parsed.
    #[error("invalid options: {0}")]
    Config(#[from] serde_json::Error),
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Create a read error for `path` resolved against `base_dir`.
    pub fn read(
        path: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Read {
            path: path.into(),
            base_dir: base_dir.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Non-fatal conditions that degrade into literal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// External link whose target was never declared as a reference.
    UnresolvedReference {
        /// Where the link appeared.
        location: SourceLocation,
        /// Raw target string inside the angle brackets.
        target: String,
    },
    /// Assignment to a variable nobody reads.
    UnknownVariable {
        /// Where the assignment appeared.
        location: SourceLocation,
        /// Variable name as written between the bars.
        name: String,
    },
    /// Table still open when its enclosing context closed.
    UnterminatedTable {
        /// Where the table was closed implicitly.
        location: SourceLocation,
    },
}

impl Warning {
    /// Get the location of this warning.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Warning::UnresolvedReference { location, .. } => location,
            Warning::UnknownVariable { location, .. } => location,
            Warning::UnterminatedTable { location } => location,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnresolvedReference { location, target } => {
                write!(f, "{}: no reference declared for target '{}'", location, target)
            }
            Warning::UnknownVariable { location, name } => {
                write!(f, "{}: unknown variable '{}'", location, name)
            }
            Warning::UnterminatedTable { location } => {
                write!(f, "{}: table closed without a final separator line", location)
            }
        }
    }
}

/// Collection of warnings gathered during one conversion.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warnings in the order they were raised.
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and forward it to the log.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of collected warnings.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
