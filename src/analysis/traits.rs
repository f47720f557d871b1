//! Core traits for language analysis.

use std::path::Path;

use thiserror::Error;

use super::CompilationUnit;

/// Why a file could not be turned into a declaration tree.
///
/// Callers treat every variant as "skip this file"; none of them abort a run.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to load grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("parser produced no tree for {0}")]
    NoTree(String),
    #[error("no analyzer for {0}")]
    Unsupported(String),
    #[error("syntax error in {path} at {line}:{column}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Language-specific parser adapter.
///
/// Implementations wrap a grammar library and hand back the normalized
/// declaration model. Parsing is all-or-nothing: a file with any syntax
/// error yields `Err`, never a partial unit.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser
/// per call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "java").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse one source file into its declarations.
    fn parse(&self, path: &Path, source: &[u8]) -> Result<CompilationUnit, ParseError>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
