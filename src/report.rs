//! Output for javalens runs.
//!
//! Artifacts written under the output directory:
//! - `Knowledge/knowledge.json`, `Knowledge/routes.json`, `Knowledge/files.json`
//! - `Reports/report.txt` and `Reports/report.html`, including directory
//!   listings of the source tree and the generated scaffold
//!
//! Plus a colored terminal summary, or the knowledge JSON on stdout.

use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use walkdir::WalkDir;

use crate::analysis::{ComplexityLabel, ProjectKnowledge, RouteModel, SkippedFile};
use crate::enrich::TokenUsage;
use crate::scaffold::ConversionResult;
use crate::scan::SourceUnit;

pub const KNOWLEDGE_DIR: &str = "Knowledge";
pub const REPORTS_DIR: &str = "Reports";

/// Everything a run produced that the reports describe.
pub struct RunSummary<'a> {
    pub codebase: &'a str,
    pub files: &'a [SourceUnit],
    pub skipped: &'a [SkippedFile],
    pub knowledge: &'a ProjectKnowledge,
    pub routes: &'a [RouteModel],
    pub conversions: &'a [ConversionResult],
    /// Provider name and usage, when enrichment ran.
    pub enrichment: Option<(&'a str, TokenUsage)>,
    pub elapsed: Duration,
    /// Listed in the reports when set and present on disk.
    pub source_root: Option<&'a Path>,
    pub scaffold_dir: Option<&'a Path>,
}

/// Paths of the files written by [`write_artifacts`].
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub knowledge: PathBuf,
    pub routes: PathBuf,
    pub files: PathBuf,
    pub text_report: PathBuf,
    pub html_report: PathBuf,
}

/// Write every artifact under `out_dir`.
pub fn write_artifacts(out_dir: &Path, summary: &RunSummary) -> anyhow::Result<Artifacts> {
    let knowledge_dir = out_dir.join(KNOWLEDGE_DIR);
    let reports_dir = out_dir.join(REPORTS_DIR);
    for dir in [&knowledge_dir, &reports_dir] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let artifacts = Artifacts {
        knowledge: knowledge_dir.join("knowledge.json"),
        routes: knowledge_dir.join("routes.json"),
        files: knowledge_dir.join("files.json"),
        text_report: reports_dir.join("report.txt"),
        html_report: reports_dir.join("report.html"),
    };

    write_json_file(&artifacts.knowledge, summary.knowledge)?;
    write_json_file(&artifacts.routes, &summary.routes)?;
    write_json_file(&artifacts.files, &summary.files)?;
    write_file(&artifacts.text_report, &render_text(summary)?)?;
    write_file(&artifacts.html_report, &render_html(summary)?)?;

    tracing::info!(dir = %out_dir.display(), "reports written");
    Ok(artifacts)
}

fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, &json)
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

// =============================================================================
// JSON Format
// =============================================================================

/// Write the knowledge report to stdout.
pub fn write_json(knowledge: &ProjectKnowledge) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(knowledge)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Aggregates shared by the text and HTML reports
// =============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
struct ComplexityCounts {
    low: usize,
    medium: usize,
    high: usize,
}

impl ComplexityCounts {
    fn of(knowledge: &ProjectKnowledge) -> Self {
        let mut counts = Self::default();
        for method in knowledge.modules.iter().flat_map(|m| m.methods.iter()) {
            match method.complexity_label {
                ComplexityLabel::Low => counts.low += 1,
                ComplexityLabel::Medium => counts.medium += 1,
                ComplexityLabel::High => counts.high += 1,
            }
        }
        counts
    }
}

fn bytes_total(conversions: &[ConversionResult]) -> (u64, u64) {
    conversions
        .iter()
        .fold((0, 0), |(i, o), c| (i + c.bytes_in, o + c.bytes_out))
}

fn route_count(routes: &[RouteModel]) -> usize {
    routes.iter().map(|r| r.routes.len()).sum()
}

/// Indented listing of everything under `root`, sorted by name, two spaces
/// per level. Hidden entries are left out.
pub fn tree_listing(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry in tree listing");
                None
            }
        })
        .map(|e| {
            let indent = "  ".repeat(e.depth() - 1);
            let slash = if e.file_type().is_dir() { "/" } else { "" };
            format!("{indent}{}{slash}", e.file_name().to_string_lossy())
        })
        .collect()
}

/// Titled listings for the directories a summary names.
fn trees(summary: &RunSummary) -> Vec<(&'static str, Vec<String>)> {
    [
        ("Source tree", summary.source_root),
        ("Scaffold tree", summary.scaffold_dir),
    ]
    .into_iter()
    .filter_map(|(title, dir)| {
        let dir = dir.filter(|d| d.is_dir())?;
        Some((title, tree_listing(dir)))
    })
    .collect()
}

// =============================================================================
// Text Format
// =============================================================================

/// Render the plain-text report.
pub fn render_text(summary: &RunSummary) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let knowledge = summary.knowledge;
    let counts = ComplexityCounts::of(knowledge);
    let (bytes_in, bytes_out) = bytes_total(summary.conversions);

    writeln!(out, "javalens v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Codebase: {}", summary.codebase)?;
    writeln!(out, "Total time: {:.2}s", summary.elapsed.as_secs_f64())?;
    writeln!(out)?;

    writeln!(out, "== Summary ==")?;
    writeln!(out, "Files scanned:  {}", summary.files.len())?;
    writeln!(out, "Files skipped:  {}", summary.skipped.len())?;
    writeln!(out, "Classes:        {}", knowledge.modules.len())?;
    writeln!(out, "Methods:        {}", knowledge.method_count())?;
    writeln!(
        out,
        "Complexity:     {} low, {} medium, {} high",
        counts.low, counts.medium, counts.high
    )?;
    writeln!(out, "Routes:         {}", route_count(summary.routes))?;
    match &summary.enrichment {
        Some((provider, usage)) => writeln!(
            out,
            "Tokens:         {} in, {} out ({})",
            usage.input_tokens, usage.output_tokens, provider
        )?,
        None => writeln!(out, "Tokens:         enrichment disabled")?,
    }
    writeln!(out)?;

    writeln!(out, "== Overview ==")?;
    writeln!(out, "{}", knowledge.project_overview)?;
    writeln!(out)?;

    writeln!(out, "== Conversions ({}) ==", summary.conversions.len())?;
    for c in summary.conversions {
        writeln!(
            out,
            "{} -> {} [{}] {} B -> {} B in {:.1} ms",
            c.source, c.target, c.category, c.bytes_in, c.bytes_out, c.elapsed_ms
        )?;
    }
    if !summary.conversions.is_empty() {
        writeln!(out, "Total: {} B -> {} B", bytes_in, bytes_out)?;
    }
    writeln!(out)?;

    writeln!(out, "== Classes ==")?;
    for class in &knowledge.modules {
        writeln!(out, "{} ({})", class.name, class.file)?;
        if !class.description.is_empty() {
            writeln!(out, "  {}", class.description)?;
        }
        if !class.dependencies.is_empty() {
            writeln!(out, "  depends on: {}", class.dependencies.join(", "))?;
        }
        for m in &class.methods {
            writeln!(
                out,
                "  - {}  [{} {}]",
                m.signature, m.complexity_label, m.complexity_score
            )?;
        }
    }

    if !summary.skipped.is_empty() {
        writeln!(out)?;
        writeln!(out, "== Skipped ==")?;
        for s in summary.skipped {
            writeln!(out, "{}: {}", s.path, s.reason)?;
        }
    }

    for (title, lines) in trees(summary) {
        writeln!(out)?;
        writeln!(out, "== {title} ==")?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
    }

    Ok(out)
}

// =============================================================================
// HTML Format
// =============================================================================

/// Escape text for HTML element and attribute content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the HTML report. All interpolated text is escaped.
pub fn render_html(summary: &RunSummary) -> Result<String, std::fmt::Error> {
    let e = escape_html;
    let knowledge = summary.knowledge;
    let counts = ComplexityCounts::of(knowledge);
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>javalens report: {}</title>", e(summary.codebase))?;
    writeln!(
        out,
        "<style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:4px 8px;text-align:left}}\
         .Low{{color:#2a7}}.Medium{{color:#c80}}.High{{color:#c22}}</style>"
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>javalens report</h1>")?;
    writeln!(out, "<p>Codebase: <code>{}</code></p>", e(summary.codebase))?;
    writeln!(
        out,
        "<p>Total time: {:.2}s</p>",
        summary.elapsed.as_secs_f64()
    )?;

    writeln!(out, "<h2>Summary</h2>")?;
    writeln!(out, "<table>")?;
    let rows = [
        ("Files scanned", summary.files.len().to_string()),
        ("Files skipped", summary.skipped.len().to_string()),
        ("Classes", knowledge.modules.len().to_string()),
        ("Methods", knowledge.method_count().to_string()),
        (
            "Complexity",
            format!("{} low, {} medium, {} high", counts.low, counts.medium, counts.high),
        ),
        ("Routes", route_count(summary.routes).to_string()),
        (
            "Tokens",
            match &summary.enrichment {
                Some((provider, usage)) => format!(
                    "{} in, {} out ({})",
                    usage.input_tokens, usage.output_tokens, provider
                ),
                None => "enrichment disabled".to_string(),
            },
        ),
    ];
    for (label, value) in rows {
        writeln!(out, "<tr><th>{}</th><td>{}</td></tr>", label, e(&value))?;
    }
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Overview</h2>")?;
    writeln!(out, "<p>{}</p>", e(&knowledge.project_overview))?;

    if !summary.conversions.is_empty() {
        writeln!(out, "<h2>Conversions</h2>")?;
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>Source</th><th>Target</th><th>Category</th><th>Bytes in</th><th>Bytes out</th><th>ms</th></tr>"
        )?;
        for c in summary.conversions {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>",
                e(&c.source),
                e(&c.target),
                c.category,
                c.bytes_in,
                c.bytes_out,
                c.elapsed_ms
            )?;
        }
        writeln!(out, "</table>")?;
    }

    writeln!(out, "<h2>Classes</h2>")?;
    for class in &knowledge.modules {
        writeln!(
            out,
            "<h3>{} <small>{}</small></h3>",
            e(&class.name),
            e(&class.file)
        )?;
        if !class.description.is_empty() {
            writeln!(out, "<p>{}</p>", e(&class.description))?;
        }
        if !class.dependencies.is_empty() {
            writeln!(
                out,
                "<p>Depends on: {}</p>",
                e(&class.dependencies.join(", "))
            )?;
        }
        if !class.methods.is_empty() {
            writeln!(out, "<ul>")?;
            for m in &class.methods {
                writeln!(
                    out,
                    "<li><code>{}</code> <span class=\"{}\">{} ({})</span></li>",
                    e(&m.signature),
                    m.complexity_label,
                    m.complexity_label,
                    m.complexity_score
                )?;
            }
            writeln!(out, "</ul>")?;
        }
    }

    if !summary.skipped.is_empty() {
        writeln!(out, "<h2>Skipped files</h2>")?;
        writeln!(out, "<ul>")?;
        for s in summary.skipped {
            writeln!(out, "<li><code>{}</code>: {}</li>", e(&s.path), e(&s.reason))?;
        }
        writeln!(out, "</ul>")?;
    }

    for (title, lines) in trees(summary) {
        writeln!(out, "<h2>{title}</h2>")?;
        writeln!(out, "<pre>{}</pre>", e(&lines.join("\n")))?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write the run summary in pretty (human-readable) format.
pub fn write_pretty(summary: &RunSummary, artifacts: Option<&Artifacts>) {
    let knowledge = summary.knowledge;

    // Header
    println!();
    print!("  ");
    print!("{}", "javalens".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Codebase: ".dimmed());
    println!("{}", summary.codebase);
    print!("  {}", "Files:    ".dimmed());
    print!("{} scanned", summary.files.len());
    if !summary.skipped.is_empty() {
        print!(", {}", format!("{} skipped", summary.skipped.len()).yellow());
    }
    println!();
    println!();

    write_complexity_summary(knowledge);
    println!();

    if !summary.skipped.is_empty() {
        write_skipped(summary.skipped);
        println!();
    }

    if !summary.routes.is_empty() {
        write_routes(summary.routes);
        println!();
    }

    if !summary.conversions.is_empty() {
        println!(
            "  {} {} files",
            "Scaffold:".bold(),
            summary.conversions.len()
        );
        println!();
    }

    match &summary.enrichment {
        Some((provider, usage)) => println!(
            "  {} {} in / {} out ({})",
            "Tokens:".bold(),
            usage.input_tokens,
            usage.output_tokens,
            provider
        ),
        None => println!("  {}", "Enrichment disabled".dimmed()),
    }

    if let Some(a) = artifacts {
        print!("  {}", "Knowledge: ".dimmed());
        println!("{}", a.knowledge.display().to_string().blue());
        print!("  {}", "Report:    ".dimmed());
        println!("{}", a.html_report.display().to_string().blue());
    }

    print!("  {}", format!("Done in {:.2}s", summary.elapsed.as_secs_f64()).dimmed());
    println!();
    println!();
}

fn write_complexity_summary(knowledge: &ProjectKnowledge) {
    let counts = ComplexityCounts::of(knowledge);
    print!("  {} ", "Classes:".bold());
    print!("{}", knowledge.modules.len());
    print!("  {} ", "Methods:".bold());
    println!("{}", knowledge.method_count());

    print!("  {} ", "Complexity:".bold());
    print!("{} ", counts.low.to_string().green());
    print!("low  ");
    print!("{} ", counts.medium.to_string().yellow());
    print!("medium  ");
    print!("{} ", counts.high.to_string().red());
    println!("high");

    // Hottest methods first
    let mut hot: Vec<_> = knowledge
        .modules
        .iter()
        .flat_map(|c| c.methods.iter().map(move |m| (c, m)))
        .filter(|(_, m)| m.complexity_label == ComplexityLabel::High)
        .collect();
    hot.sort_by(|a, b| b.1.complexity_score.cmp(&a.1.complexity_score));

    for (class, method) in hot.iter().take(10) {
        print!("    {} ", "HIGH".red());
        print!("{:>3}  ", method.complexity_score);
        print!("{}", class.name.blue());
        println!(".{}", method.name);
    }
}

fn write_routes(routes: &[RouteModel]) {
    println!("  {} ({}):", "Routes".bold(), route_count(routes));
    for model in routes {
        println!("    {}", model.class_name.blue());
        for route in &model.routes {
            print!("      {:<7}", route.http.as_str().to_uppercase().green());
            print!("{}", route.path);
            println!("  {}", format!("-> {}", route.method_name).dimmed());
        }
    }
}

fn write_skipped(skipped: &[SkippedFile]) {
    println!("  {} ({}):", "Skipped".yellow(), skipped.len());
    for s in skipped {
        print!("    {}", s.path.blue());
        println!("  {}", s.reason.dimmed());
    }
}
