//! Corpus parsing.
//!
//! The AnalysisContext provides:
//! - Parallel parsing of discovered source units
//! - Per-file failure isolation (a bad file is recorded, never fatal)
//! - Deterministic ordering of the parsed corpus

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::routes::{infer_routes, RouteModel};
use crate::analysis::{get_analyzer, CompilationUnit, DeclarationKind, ParseError};
use crate::scan::{Category, SourceUnit};

/// A file left out of the corpus and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Every successfully parsed unit, sorted by path, plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub units: Vec<CompilationUnit>,
    pub skipped: Vec<SkippedFile>,
}

impl Corpus {
    pub fn unit(&self, path: &str) -> Option<&CompilationUnit> {
        self.units.iter().find(|u| u.path == path)
    }

    pub fn declaration_count(&self) -> usize {
        self.units.iter().map(|u| u.declarations.len()).sum()
    }

    /// Route models for classes and interfaces of entry-point units.
    pub fn route_models(&self) -> Vec<RouteModel> {
        self.units
            .iter()
            .filter(|u| u.category == Category::EntryPoint)
            .flat_map(|u| u.declarations.iter())
            .filter(|d| matches!(d.kind, DeclarationKind::Class | DeclarationKind::Interface))
            .map(infer_routes)
            .collect()
    }
}

/// Parses source units relative to a base directory.
pub struct AnalysisContext {
    /// Base directory for relative path resolution.
    base_dir: PathBuf,
}

impl AnalysisContext {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Parse one unit. The unit's root-relative path becomes the unit path.
    pub fn parse_unit(&self, unit: &SourceUnit) -> Result<CompilationUnit, ParseError> {
        let full_path = if unit.full_path.as_os_str().is_empty() {
            self.base_dir.join(&unit.path)
        } else {
            unit.full_path.clone()
        };

        let ext = full_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let analyzer =
            get_analyzer(ext).ok_or_else(|| ParseError::Unsupported(unit.path.clone()))?;

        let bytes = fs::read(&full_path).map_err(|source| ParseError::Io {
            path: unit.path.clone(),
            source,
        })?;
        // Non-UTF-8 bytes are replaced rather than rejected.
        let source = String::from_utf8_lossy(&bytes);

        let mut parsed = analyzer.parse(Path::new(&unit.path), source.as_bytes())?;
        parsed.category = unit.category;
        Ok(parsed)
    }

    /// Parse all units in parallel. Failures are collected, not propagated.
    pub fn parse_corpus(&self, units: &[SourceUnit]) -> Corpus {
        let results: Vec<_> = units
            .par_iter()
            .map(|u| (u, self.parse_unit(u)))
            .collect();

        let mut corpus = Corpus::default();
        for (unit, result) in results {
            match result {
                Ok(parsed) => {
                    debug!(path = %unit.path, declarations = parsed.declarations.len(), "parsed");
                    corpus.units.push(parsed);
                }
                Err(e) => {
                    warn!(path = %unit.path, error = %e, "skipping unparseable file");
                    corpus.skipped.push(SkippedFile {
                        path: unit.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        corpus.units.sort_by(|a, b| a.path.cmp(&b.path));
        corpus.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        info!(
            parsed = corpus.units.len(),
            skipped = corpus.skipped.len(),
            "parsed corpus"
        );
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_unit(root: &Path, rel: &str, content: &str, category: Category) -> SourceUnit {
        let full_path = root.join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        SourceUnit {
            path: rel.to_string(),
            full_path,
            size_bytes: content.len() as u64,
            category,
        }
    }

    #[test]
    fn test_parse_corpus_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let units = vec![
            source_unit(root, "b/Good.java", "class Good {}", Category::Model),
            source_unit(root, "a/Bad.java", "class Bad { void f( }", Category::Service),
            source_unit(root, "a/Fine.java", "interface Fine {}", Category::Unknown),
        ];

        let corpus = AnalysisContext::new(root).parse_corpus(&units);

        let parsed: Vec<_> = corpus.units.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(parsed, vec!["a/Fine.java", "b/Good.java"]);
        assert_eq!(corpus.unit("b/Good.java").unwrap().category, Category::Model);
        assert_eq!(corpus.skipped.len(), 1);
        assert_eq!(corpus.skipped[0].path, "a/Bad.java");
        assert!(corpus.skipped[0].reason.contains("syntax error"));
    }

    #[test]
    fn test_deeply_nested_file_parses_beside_siblings() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let terms: Vec<String> = (0..20_000).map(|i| format!("\"s{i}\"")).collect();
        let deep = format!("class Deep {{ String f() {{ return {}; }} }}", terms.join(" + "));
        let units = vec![
            source_unit(root, "Deep.java", &deep, Category::Unknown),
            source_unit(root, "Ok.java", "class Ok { void g() {} }", Category::Unknown),
        ];

        let corpus = AnalysisContext::new(root).parse_corpus(&units);

        let parsed: Vec<_> = corpus.units.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(parsed, vec!["Deep.java", "Ok.java"]);
        assert!(corpus.skipped.is_empty());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let units = vec![SourceUnit {
            path: "Gone.java".to_string(),
            full_path: PathBuf::new(),
            size_bytes: 0,
            category: Category::Unknown,
        }];

        let corpus = AnalysisContext::new(temp.path()).parse_corpus(&units);
        assert!(corpus.units.is_empty());
        assert_eq!(corpus.skipped[0].path, "Gone.java");
    }

    #[test]
    fn test_route_models_only_for_entry_points() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let units = vec![
            source_unit(
                root,
                "web/OrderController.java",
                "class OrderController { void getOrder(long id) {} } enum Status { A }",
                Category::EntryPoint,
            ),
            source_unit(
                root,
                "svc/OrderService.java",
                "class OrderService { void getOrder(long id) {} }",
                Category::Service,
            ),
        ];

        let corpus = AnalysisContext::new(root).parse_corpus(&units);
        let models = corpus.route_models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].class_name, "OrderController");
        assert_eq!(models[0].routes[0].path, "/order-controller/get-order");
        assert_eq!(corpus.declaration_count(), 3);
    }
}
