//! AST-backed analysis of Java codebases.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ SourceUnits     │────▶│ JavaAnalyzer │────▶│CompilationUnit │
//! └─────────────────┘     │ (tree-sitter)│     │ (Declarations, │
//!                         └──────────────┘     │  BodyNode tree)│
//!                                              └────────────────┘
//!                                                      │
//!                     ┌────────────────────────────────┼──────────────┐
//!                     ▼                                ▼              ▼
//!             ┌──────────────┐              ┌──────────────┐  ┌──────────────┐
//!             │ complexity   │              │ dependencies │  │ routes       │
//!             └──────────────┘              │ (two-phase)  │  │ (entry points│
//!                     │                     └──────────────┘  │  only)       │
//!                     └──────────────┬─────────────┘          └──────────────┘
//!                                    ▼
//!                           ┌──────────────────┐
//!                           │ KnowledgeBuilder │
//!                           └──────────────────┘
//! ```
//!
//! Only [`java`] touches tree-sitter; every other module consumes the
//! declaration model in [`model`].

mod context;
pub mod complexity;
pub mod dependencies;
mod java;
pub mod knowledge;
mod model;
pub mod routes;
mod traits;

pub use complexity::{ComplexityLabel, ComplexityScore};
pub use context::{AnalysisContext, Corpus, SkippedFile};
pub use java::JavaAnalyzer;
pub use knowledge::{
    ClassMetadata, EnrichOptions, KnowledgeBuilder, MethodMetadata, ProjectKnowledge,
};
pub use model::{
    Annotation, BindingSource, BodyNode, ClassKey, CompilationUnit, Declaration, DeclarationKind,
    Field, HttpVerb, LogicalOp, LoopKind, MethodDecl, NodeKind, Parameter, RoutingHints, Span,
    TypeRef,
};
pub use routes::{Route, RouteModel, RouteParam};
pub use traits::{LanguageAnalyzer, ParseError};

use once_cell::sync::Lazy;

/// Static storage for the Java analyzer.
static JAVA_ANALYZER: Lazy<JavaAnalyzer> = Lazy::new(JavaAnalyzer::new);

/// Load every grammar up front instead of on first use.
pub fn register_analyzers() {
    Lazy::force(&JAVA_ANALYZER);
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer handles the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    let java: &'static JavaAnalyzer = &JAVA_ANALYZER;
    java.handles_extension(ext)
        .then_some(java as &'static dyn LanguageAnalyzer)
}
