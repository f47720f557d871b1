//! Source discovery and categorisation.
//!
//! Walks a codebase, prunes excluded directories, keeps `.java` files under
//! the size limit and labels each with a coarse [`Category`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{CategorizationRule, ConfigError, ReaderConfig};

/// Extensions picked up by the scanner.
const SOURCE_EXTENSIONS: &[&str] = &["java"];

/// Coarse architectural role of a source file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    EntryPoint,
    Service,
    DataAccess,
    Model,
    #[default]
    Unknown,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::EntryPoint,
        Category::Service,
        Category::DataAccess,
        Category::Model,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EntryPoint => "entry-point",
            Category::Service => "service",
            Category::DataAccess => "data-access",
            Category::Model => "model",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    /// Root-relative, `/`-separated.
    pub path: String,
    #[serde(skip)]
    pub full_path: PathBuf,
    pub size_bytes: u64,
    pub category: Category,
}

/// Configured directory walker.
pub struct Scanner {
    exclude: GlobSet,
    max_bytes: u64,
    rules: Vec<CategorizationRule>,
}

impl Scanner {
    pub fn new(config: &ReaderConfig) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_globs {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: config.exclude_globs.join(", "),
            source,
        })?;

        Ok(Self {
            exclude,
            max_bytes: config.max_file_size_kb.saturating_mul(1024),
            rules: config.categorization_rules.clone(),
        })
    }

    fn is_excluded(&self, rel: &str) -> bool {
        !rel.is_empty() && self.exclude.is_match(rel)
    }

    /// Discover source files under `root`, sorted by path.
    pub fn scan(&self, root: &Path) -> anyhow::Result<Vec<SourceUnit>> {
        let mut units = Vec::new();

        let walker = WalkDir::new(root).follow_links(true).into_iter();
        for entry in walker.filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            // Skip hidden directories
            if e.file_name().to_string_lossy().starts_with('.') {
                return false;
            }
            let rel = relative_path(root, e.path());
            !self.is_excluded(&format!("{rel}/"))
        }) {
            let entry = entry.with_context(|| format!("walking {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !SOURCE_EXTENSIONS.contains(&ext) {
                continue;
            }

            let rel = relative_path(root, path);
            if self.is_excluded(&rel) {
                debug!(path = %rel, "excluded by pattern");
                continue;
            }

            let size_bytes = entry
                .metadata()
                .with_context(|| format!("reading metadata of {}", path.display()))?
                .len();
            if self.max_bytes > 0 && size_bytes > self.max_bytes {
                debug!(path = %rel, size_bytes, "skipping oversized file");
                continue;
            }

            let category = categorize(&rel, &self.rules);
            units.push(SourceUnit {
                path: rel,
                full_path: path.to_path_buf(),
                size_bytes,
                category,
            });
        }

        units.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(units)
    }
}

/// `root`-relative path with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Label a file by name rules first, then by its directory names.
pub fn categorize(rel_path: &str, rules: &[CategorizationRule]) -> Category {
    let lower = rel_path.to_lowercase();
    let mut segments = lower.rsplit('/');
    let file_name = segments.next().unwrap_or_default();

    if let Some(rule) = rules
        .iter()
        .find(|r| !r.pattern.is_empty() && file_name.contains(&r.pattern.to_lowercase()))
    {
        return rule.category;
    }

    segments
        .find_map(|dir| match dir {
            "controller" | "controllers" | "web" | "rest" => Some(Category::EntryPoint),
            "service" | "services" => Some(Category::Service),
            "repository" | "repositories" | "repo" | "dao" | "mapper" => {
                Some(Category::DataAccess)
            }
            "model" | "models" | "entity" | "entities" | "domain" | "dto" => Some(Category::Model),
            _ => None,
        })
        .unwrap_or(Category::Unknown)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    fn rules() -> Vec<CategorizationRule> {
        ReaderConfig::default().categorization_rules
    }

    #[test]
    fn test_categorize_by_file_name() {
        let r = rules();
        assert_eq!(categorize("a/OrderController.java", &r), Category::EntryPoint);
        assert_eq!(categorize("a/UserResource.java", &r), Category::EntryPoint);
        assert_eq!(categorize("a/OrderService.java", &r), Category::Service);
        assert_eq!(categorize("a/OrderRepository.java", &r), Category::DataAccess);
        assert_eq!(categorize("a/userdao.java", &r), Category::DataAccess);
        assert_eq!(categorize("a/OrderEntity.java", &r), Category::Model);
    }

    #[test]
    fn test_categorize_by_directory() {
        let r = rules();
        assert_eq!(categorize("src/web/Orders.java", &r), Category::EntryPoint);
        assert_eq!(categorize("src/service/Billing.java", &r), Category::Service);
        assert_eq!(categorize("src/dao/Jdbc.java", &r), Category::DataAccess);
        assert_eq!(categorize("src/domain/Order.java", &r), Category::Model);
        assert_eq!(categorize("src/util/Strings.java", &r), Category::Unknown);
    }

    #[test]
    fn test_custom_rule_wins() {
        let mut r = vec!["Handler=entry-point".parse().unwrap()];
        r.extend(rules());
        assert_eq!(categorize("model/EventHandler.java", &r), Category::EntryPoint);
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("entry-point".parse::<Category>().unwrap(), Category::EntryPoint);
        assert_eq!("DATA_ACCESS".parse::<Category>().unwrap(), Category::DataAccess);
        assert!("gateway".parse::<Category>().is_err());
        assert_eq!(Category::DataAccess.to_string(), "data-access");
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for dir in ["src/web", "src/model", "target/classes", ".idea", "src/build"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("src/web/ZController.java"), "class ZController {}").unwrap();
        fs::write(root.join("src/model/A.java"), "class A {}").unwrap();
        fs::write(root.join("src/model/notes.txt"), "ignored").unwrap();
        fs::write(root.join("target/classes/Gen.java"), "class Gen {}").unwrap();
        fs::write(root.join(".idea/Ide.java"), "class Ide {}").unwrap();
        fs::write(root.join("src/build/Out.java"), "class Out {}").unwrap();
        fs::write(root.join("src/Big.java"), "x".repeat(2048)).unwrap();

        let config = ReaderConfig {
            max_file_size_kb: 1,
            ..ReaderConfig::default()
        };
        let units = Scanner::new(&config).unwrap().scan(root).unwrap();

        let found: Vec<_> = units.iter().map(|u| (u.path.as_str(), u.category)).collect();
        assert_eq!(
            found,
            vec![
                ("src/model/A.java", Category::Model),
                ("src/web/ZController.java", Category::EntryPoint),
            ]
        );
        assert_eq!(units[0].size_bytes, 10);
    }

    #[test]
    fn test_inventory_json_shape() {
        let unit = SourceUnit {
            path: "a/B.java".to_string(),
            full_path: PathBuf::from("/tmp/a/B.java"),
            size_bytes: 42,
            category: Category::DataAccess,
        };
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"path": "a/B.java", "sizeBytes": 42, "category": "data-access"})
        );
    }
}
