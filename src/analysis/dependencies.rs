//! Intra-corpus type dependencies.
//!
//! Two phases over the whole corpus:
//! 1. [`TypeUniverse::collect`] gathers every declared top-level type name.
//! 2. [`TypeUniverse::resolve`] intersects each declaration's referenced
//!    types with that set.
//!
//! Phase 2 needs a finished universe, so the universe is only obtainable as
//! the return value of phase 1 and is read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::{ClassKey, CompilationUnit, Declaration};

/// Every type name declared anywhere in the parsed corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeUniverse {
    names: BTreeSet<String>,
}

impl TypeUniverse {
    /// Phase 1. Units that failed to parse are simply not in `units`.
    pub fn collect(units: &[CompilationUnit]) -> Self {
        let names = units
            .iter()
            .flat_map(|u| u.declarations.iter())
            .map(|d| d.name.clone())
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Phase 2 for one declaration: sorted, deduplicated, self excluded.
    pub fn resolve(&self, decl: &Declaration) -> Vec<String> {
        referenced_types(decl)
            .into_iter()
            .filter(|name| name != &decl.name && self.contains(name))
            .collect()
    }
}

/// Type names mentioned by fields, parameters and return types, including
/// generic arguments.
pub fn referenced_types(decl: &Declaration) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();

    for field in &decl.fields {
        refs.extend(field.type_ref.referenced_names().into_iter().map(String::from));
    }

    for method in &decl.methods {
        let params = method.parameters.iter().filter_map(|p| p.type_ref.as_ref());
        for type_ref in params.chain(method.return_type.iter()) {
            refs.extend(type_ref.referenced_names().into_iter().map(String::from));
        }
    }

    refs
}

/// Both phases over a corpus, keyed by class identity.
pub fn extract_all(units: &[CompilationUnit]) -> BTreeMap<ClassKey, Vec<String>> {
    let universe = TypeUniverse::collect(units);

    units
        .iter()
        .flat_map(|u| {
            u.declarations
                .iter()
                .map(move |d| (ClassKey::new(&u.path, &d.name), d))
        })
        .map(|(key, decl)| (key, universe.resolve(decl)))
        .collect()
}
