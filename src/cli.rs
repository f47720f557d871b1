//! Command-line interface for javalens.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use crate::analysis::{AnalysisContext, EnrichOptions, KnowledgeBuilder};
use crate::config::{AppConfig, CategorizationRule, DISCOVERY_FILES};
use crate::enrich::{self, EnrichError};
use crate::report::{self, RunSummary};
use crate::scaffold;
use crate::scan::Scanner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Directory under `--out` that receives the generated Express scaffold.
pub const SCAFFOLD_DIR: &str = "Scaffold";

/// Static analysis of Java codebases.
///
/// Javalens parses a Java source tree, scores method complexity, resolves
/// intra-project dependencies, infers the HTTP surface of controllers and
/// writes a knowledge report plus an Express.js scaffold.
#[derive(Parser)]
#[command(name = "javalens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a Java codebase and write knowledge, reports and scaffold
    Analyze(AnalyzeArgs),
    /// Write a commented default configuration file
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Root of the Java codebase
    pub codebase: PathBuf,

    /// Path to a config file (default: auto-discover in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enrichment provider: none, local, openai or anthropic
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// Additional exclusion glob (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Output directory
    #[arg(short, long, default_value = "Output")]
    pub out: PathBuf,

    /// Skip files larger than this many KiB (0 disables the limit)
    #[arg(long)]
    pub max_file_size_kb: Option<u64>,

    /// Categorization rule PATTERN=CATEGORY, checked before configured rules (repeatable)
    #[arg(long = "categories")]
    pub categories: Vec<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Do not generate the Express scaffold
    #[arg(long)]
    pub no_scaffold: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "javalens.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = include_str!("templates/javalens.yaml");

/// Resolve the configuration for an analyze run: file and environment
/// through [`AppConfig::load`], then the command-line flags.
pub fn load_config(args: &AnalyzeArgs) -> anyhow::Result<AppConfig> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let mut config = AppConfig::load(args.config.as_deref(), &cwd)?;
    apply_cli_overrides(&mut config, args)?;
    config.validate()?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    if let Some(provider) = &args.llm_provider {
        config.llm.provider = provider.parse()?;
    }
    config.reader.exclude_globs.extend(args.exclude.iter().cloned());
    if let Some(kb) = args.max_file_size_kb {
        config.reader.max_file_size_kb = kb;
    }
    if !args.categories.is_empty() {
        let mut rules = args
            .categories
            .iter()
            .map(|s| s.parse::<CategorizationRule>())
            .collect::<Result<Vec<_>, _>>()?;
        rules.append(&mut config.reader.categorization_rules);
        config.reader.categorization_rules = rules;
    }
    Ok(())
}

/// Run the analyze command with an already resolved configuration.
pub fn run_analyze(args: &AnalyzeArgs, config: &AppConfig) -> anyhow::Result<i32> {
    let started = Instant::now();

    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Resolve codebase
    let root = match args.codebase.canonicalize() {
        Ok(p) if p.is_dir() => p,
        Ok(p) => {
            eprintln!("Error: not a directory: {}", p.display());
            return Ok(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: cannot access codebase {:?}: {}", args.codebase, e);
            return Ok(EXIT_ERROR);
        }
    };

    // Scan and parse
    let files = Scanner::new(&config.reader)?.scan(&root)?;
    if files.is_empty() {
        warn!(root = %root.display(), "no Java files found");
    }
    let corpus = AnalysisContext::new(&root).parse_corpus(&files);

    // Knowledge, enriched when a provider is available
    let enricher = match enrich::build_enricher(&config.llm) {
        Ok(e) => e,
        Err(EnrichError::MissingApiKey(var)) => {
            warn!(
                provider = %config.llm.provider,
                "{} is not set, continuing without enrichment", var
            );
            None
        }
        Err(e) => return Err(e.into()),
    };
    let mut builder = KnowledgeBuilder::new();
    if let Some(e) = enricher.as_deref() {
        builder = builder.with_enricher(e, EnrichOptions::from(&config.llm));
    }
    let knowledge = builder.build(&corpus.units);
    let routes = corpus.route_models();
    info!(
        classes = knowledge.modules.len(),
        routes = routes.len(),
        "analysis complete"
    );

    // Scaffold
    let scaffold_dir = args.out.join(SCAFFOLD_DIR);
    let conversions = if args.no_scaffold {
        Vec::new()
    } else {
        scaffold::generate(&corpus, &files, &scaffold_dir)?
    };

    // Reports
    let codebase = args.codebase.to_string_lossy().to_string();
    let summary = RunSummary {
        codebase: &codebase,
        files: &files,
        skipped: &corpus.skipped,
        knowledge: &knowledge,
        routes: &routes,
        conversions: &conversions,
        enrichment: enricher.as_deref().map(|e| (e.name(), e.usage())),
        elapsed: started.elapsed(),
        source_root: Some(root.as_path()),
        scaffold_dir: (!args.no_scaffold).then_some(scaffold_dir.as_path()),
    };
    let artifacts = report::write_artifacts(&args.out, &summary)?;

    match args.format.as_str() {
        "json" => report::write_json(&knowledge)?,
        _ => report::write_pretty(&summary, Some(&artifacts)),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to choose another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize categories and enrichment", args.output.display());
    if DISCOVERY_FILES.iter().any(|name| args.output == Path::new(name)) {
        println!("  2. Run: javalens analyze <codebase>");
    } else {
        println!(
            "  2. Run: javalens analyze <codebase> --config {}",
            args.output.display()
        );
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use crate::scan::Category;
    use tempfile::TempDir;

    fn analyze_args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["javalens", "analyze", "src"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Analyze(args) => args,
            Commands::Init(_) => unreachable!(),
        }
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let args = analyze_args(&[
            "--llm-provider",
            "local",
            "--exclude",
            "**/generated/**",
            "--max-file-size-kb",
            "0",
            "--categories",
            "Handler=entry-point",
        ]);
        let mut config = AppConfig::default();
        apply_cli_overrides(&mut config, &args).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Local);
        assert_eq!(
            config.reader.exclude_globs.last().map(String::as_str),
            Some("**/generated/**")
        );
        assert_eq!(config.reader.max_file_size_kb, 0);
        assert_eq!(config.reader.categorization_rules[0].pattern, "Handler");
        assert_eq!(
            config.reader.categorization_rules[0].category,
            Category::EntryPoint
        );
        assert!(config.reader.categorization_rules.len() > 1);
    }

    #[test]
    fn test_invalid_category_flag_is_rejected() {
        let args = analyze_args(&["--categories", "Handler=gateway"]);
        let mut config = AppConfig::default();
        assert!(apply_cli_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_missing_codebase_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let mut args = analyze_args(&[]);
        args.codebase = missing;
        args.out = temp.path().join("out");
        let code = run_analyze(&args, &AppConfig::default()).unwrap();
        assert_eq!(code, EXIT_ERROR);
    }

    #[test]
    fn test_init_writes_parseable_template() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf/javalens.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let config = AppConfig::parse_file(&output).unwrap();
        assert_eq!(config, AppConfig::default());

        // A second run refuses to overwrite without --force
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
        let forced = InitArgs {
            output,
            force: true,
        };
        assert_eq!(run_init(&forced).unwrap(), EXIT_SUCCESS);
    }
}
