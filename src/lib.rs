//! Javalens - static analysis of Java codebases.
//!
//! Javalens parses a Java source tree into a normalized declaration model and
//! derives from it a knowledge report (per-class and per-method facts,
//! cyclomatic complexity, intra-project dependencies) and, for request
//! handling classes, the inferred HTTP route surface. The route model drives
//! an Express.js scaffold.
//!
//! # Architecture
//!
//! - `scan`: directory traversal, exclusion and categorization into `SourceUnit`s
//! - `analysis`: tree-sitter parser adapter and the analyzers built on it
//! - `enrich`: optional natural-language enrichment providers
//! - `scaffold`: Express.js generation from route models
//! - `report`: JSON artifacts, text/HTML reports and terminal output
//! - `config`: layered configuration
//! - `logging`: tracing subscriber setup for the binary
//!
//! The analysis pipeline never fails as a whole: unparseable files are
//! skipped and enrichment is optional.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod report;
pub mod scaffold;
pub mod scan;

pub use analysis::{
    AnalysisContext, ClassMetadata, CompilationUnit, ComplexityLabel, ComplexityScore, Corpus,
    Declaration, DeclarationKind, JavaAnalyzer, KnowledgeBuilder, LanguageAnalyzer,
    MethodMetadata, ParseError, ProjectKnowledge, Route, RouteModel, RouteParam,
};
pub use config::{AppConfig, ConfigError};
pub use enrich::{build_enricher, Completion, EnrichError, Enricher, TokenUsage};
pub use scaffold::ConversionResult;
pub use scan::{Category, Scanner, SourceUnit};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    analysis::register_analyzers();
}
