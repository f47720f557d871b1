//! Knowledge aggregation.
//!
//! Combines complexity and dependency results into [`ProjectKnowledge`],
//! then optionally asks an [`Enricher`] for class and project descriptions.

use std::collections::HashMap;
use std::fmt::Write as _;

use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::complexity::{self, ComplexityLabel};
use crate::analysis::dependencies::TypeUniverse;
use crate::analysis::routes::PLACEHOLDER_TYPE;
use crate::analysis::{ClassKey, CompilationUnit, Declaration, MethodDecl};
use crate::config::LlmConfig;
use crate::enrich::{truncate_chars, Enricher};

/// Overview used when no enrichment is available.
pub const DEFAULT_OVERVIEW: &str = "Auto-generated overview. Configure an LLM provider to enrich.";

const CLASS_DESCRIPTION_CHARS: usize = 500;
const OVERVIEW_CHARS: usize = 600;
const OVERVIEW_CLASS_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetadata {
    pub name: String,
    pub signature: String,
    pub description: String,
    #[serde(rename = "complexity")]
    pub complexity_label: ComplexityLabel,
    pub complexity_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMetadata {
    /// Source file, used as part of the class identity.
    #[serde(skip)]
    pub file: String,
    pub name: String,
    pub description: String,
    /// Internal types only, sorted, self excluded.
    pub dependencies: Vec<String>,
    pub methods: Vec<MethodMetadata>,
}

impl ClassMetadata {
    pub fn key(&self) -> ClassKey {
        ClassKey::new(&self.file, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKnowledge {
    pub project_overview: String,
    pub modules: Vec<ClassMetadata>,
}

impl ProjectKnowledge {
    pub fn method_count(&self) -> usize {
        self.modules.iter().map(|c| c.methods.len()).sum()
    }
}

/// Bounds applied to enrichment prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Prompts are cut to this many characters.
    pub max_prompt_chars: usize,
    /// Signatures included per class prompt.
    pub max_signatures: usize,
    /// In-flight class requests.
    pub concurrency: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for EnrichOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_prompt_chars: config.max_input_tokens,
            max_signatures: config.max_signatures_per_class,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// Builds [`ProjectKnowledge`] from parsed units.
pub struct KnowledgeBuilder<'a> {
    enricher: Option<&'a dyn Enricher>,
    options: EnrichOptions,
}

impl Default for KnowledgeBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> KnowledgeBuilder<'a> {
    pub fn new() -> Self {
        Self {
            enricher: None,
            options: EnrichOptions::default(),
        }
    }

    pub fn with_enricher(mut self, enricher: &'a dyn Enricher, options: EnrichOptions) -> Self {
        self.enricher = Some(enricher);
        self.options = options;
        self
    }

    /// Structural analysis, then enrichment if configured. Never fails.
    pub fn build(&self, units: &[CompilationUnit]) -> ProjectKnowledge {
        let mut knowledge = self.analyze(units);

        if let Some(enricher) = self.enricher {
            match tokio::runtime::Runtime::new() {
                Ok(runtime) => {
                    runtime.block_on(enrich(&mut knowledge, enricher, &self.options));
                }
                Err(e) => warn!(error = %e, "cannot start runtime, skipping enrichment"),
            }
        }

        knowledge
    }

    /// Structural part only: complexity and dependencies.
    pub fn analyze(&self, units: &[CompilationUnit]) -> ProjectKnowledge {
        // Phase 1 must see every unit before any class resolves.
        let universe = TypeUniverse::collect(units);
        info!(types = universe.len(), "collected declared types");

        let modules: Vec<ClassMetadata> = units
            .par_iter()
            .flat_map_iter(|unit| {
                let universe = &universe;
                unit.declarations
                    .iter()
                    .map(move |decl| class_metadata(&unit.path, decl, universe))
            })
            .collect();

        ProjectKnowledge {
            project_overview: DEFAULT_OVERVIEW.to_string(),
            modules,
        }
    }
}

fn class_metadata(file: &str, decl: &Declaration, universe: &TypeUniverse) -> ClassMetadata {
    let methods = decl
        .methods
        .iter()
        .map(|m| {
            let score = complexity::score(m);
            MethodMetadata {
                name: m.name.clone(),
                signature: render_signature(m),
                description: String::new(),
                complexity_label: score.label,
                complexity_score: score.score,
            }
        })
        .collect();

    ClassMetadata {
        file: file.to_string(),
        name: decl.name.clone(),
        description: String::new(),
        dependencies: universe.resolve(decl),
        methods,
    }
}

/// `public List<User> find(String name, int... ids)`.
///
/// Unknown parameter types render as `Object`; if formatting fails the bare
/// method name is returned.
pub fn render_signature(method: &MethodDecl) -> String {
    try_render_signature(method).unwrap_or_else(|_| method.name.clone())
}

fn try_render_signature(method: &MethodDecl) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    for modifier in &method.modifiers {
        write!(out, "{modifier} ")?;
    }
    match &method.return_type {
        Some(t) if !t.rendered.is_empty() => write!(out, "{t} ")?,
        Some(_) => write!(out, "{PLACEHOLDER_TYPE} ")?,
        None => write!(out, "void ")?,
    }
    write!(out, "{}(", method.name)?;
    for (i, param) in method.parameters.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        let type_name = param
            .type_ref
            .as_ref()
            .map(|t| t.rendered.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(PLACEHOLDER_TYPE);
        let dots = if param.variadic { "..." } else { "" };
        write!(out, "{type_name}{dots} {}", param.name)?;
    }
    write!(out, ")")?;
    Ok(out)
}

fn class_prompt(class: &ClassMetadata, options: &EnrichOptions) -> String {
    let signatures: Vec<&str> = class
        .methods
        .iter()
        .take(options.max_signatures)
        .map(|m| m.signature.as_str())
        .collect();
    let dependencies = if class.dependencies.is_empty() {
        "None".to_string()
    } else {
        class.dependencies.join(", ")
    };

    let prompt = format!(
        "You are summarizing a Java class for documentation.\n\
         Class: {}\n\
         Dependencies: {}\n\
         Method signatures:\n{}\n\
         Write a concise 1-2 sentence description of the class purpose.",
        class.name,
        dependencies,
        signatures.join("\n"),
    );
    truncate_chars(&prompt, options.max_prompt_chars)
}

fn overview_prompt(knowledge: &ProjectKnowledge, options: &EnrichOptions) -> String {
    let names: Vec<&str> = knowledge
        .modules
        .iter()
        .take(OVERVIEW_CLASS_LIMIT)
        .map(|c| c.name.as_str())
        .collect();
    let prompt = format!(
        "Summarize this Java project in 1-2 sentences based on class names: {}",
        names.join(", ")
    );
    truncate_chars(&prompt, options.max_prompt_chars)
}

/// Attach descriptions in place. Class requests run concurrently and are
/// matched back by [`ClassKey`]; failures leave the default text.
pub async fn enrich(
    knowledge: &mut ProjectKnowledge,
    enricher: &dyn Enricher,
    options: &EnrichOptions,
) {
    if knowledge.modules.is_empty() {
        return;
    }

    let prompts: Vec<(ClassKey, String)> = knowledge
        .modules
        .iter()
        .map(|c| (c.key(), class_prompt(c, options)))
        .collect();
    info!(classes = prompts.len(), provider = enricher.name(), "enriching classes");

    let mut descriptions: HashMap<ClassKey, String> = stream::iter(prompts)
        .map(|(key, prompt)| async move {
            let outcome = enricher.complete(&prompt).await;
            (key, outcome)
        })
        .buffer_unordered(options.concurrency.max(1))
        .filter_map(|(key, outcome)| async move {
            match outcome {
                Ok(completion) => Some((
                    key,
                    truncate_chars(completion.text.trim(), CLASS_DESCRIPTION_CHARS),
                )),
                Err(e) => {
                    warn!(class = %key, error = %e, "class enrichment failed");
                    None
                }
            }
        })
        .collect()
        .await;

    for class in &mut knowledge.modules {
        if let Some(description) = descriptions.remove(&class.key()) {
            class.description = description;
        }
    }

    match enricher.complete(&overview_prompt(knowledge, options)).await {
        Ok(completion) => {
            let text = completion.text.trim();
            if !text.is_empty() {
                knowledge.project_overview = truncate_chars(text, OVERVIEW_CHARS);
            }
        }
        Err(e) => warn!(error = %e, "overview enrichment failed"),
    }
    debug!(usage = ?enricher.usage(), "enrichment finished");
}
