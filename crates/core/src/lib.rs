#![deny(missing_docs)]
//! rst2rfcxml core: converts a restricted reStructuredText dialect into
//! xml2rfc XML with a single-pass, line-driven parser.

/// Open-element stack and per-element markup.
pub mod context;
/// Conversion session and entry points.
pub mod converter;
/// Explicit markup (`.. name::`) recognition.
pub mod directives;
mod dispatch;
/// Error and diagnostic types.
pub mod error;
/// Inline markup transformation.
pub mod inline;
/// Line splitting and the lookahead cursor.
pub mod lines;
/// Document variables, authors and references.
pub mod metadata;
/// Conversion options.
pub mod options;
/// Generated front and back matter.
pub mod render;
/// Anchor generation.
pub mod slug;
/// Simple-table column handling.
pub mod table;

pub use context::{Context, ContextStack};
pub use converter::{Conversion, Converter, convert_files, convert_str};
pub use error::{ConvertError, Diagnostics, SourceLocation, Warning};
pub use inline::{NoReferences, ReferenceResolver};
pub use metadata::Metadata;
pub use options::ConvertOptions;
pub use slug::anchor;
