//! # Documentation Search
//!
//! Lexical search over every markdown document in the asset tree:
//! component readmes (`<category>_<name>.md`) and per-version changelogs.
//!
//! ## Scoring
//!
//! Documents and queries are reduced to sets of lowercase alphanumeric
//! terms. Each query term is weighted by its inverse document frequency,
//! and a document's similarity is the weighted fraction of query terms it
//! contains, so scores fall in `[0, 1]` and a document holding every query
//! term scores `1.0`. Only documents with a positive score are returned,
//! ordered by similarity (descending) and then id.

use std::collections::{HashMap, HashSet};

use colschema_core::{CollectorVersion, ComponentCategory};
use serde::Serialize;

use crate::error::RegistryError;
use crate::store::{parse_component_stem, MarkdownFile, SchemaStore};

/// Result count used when a query does not set one.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One indexed markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// `<version>/<file stem>`, unique across the tree.
    pub id: String,
    /// Version directory the document lives in.
    pub version: CollectorVersion,
    /// Component category, for component readmes.
    pub category: Option<ComponentCategory>,
    /// Component name, for component readmes.
    pub component: Option<String>,
    /// Path relative to the asset root.
    pub file_path: String,
    /// Document text.
    pub content: String,
}

impl DocumentEntry {
    fn from_markdown(version: CollectorVersion, file: MarkdownFile) -> Self {
        let (category, component) = match parse_component_stem(&file.stem) {
            Some((category, name)) => (Some(category), Some(name.to_string())),
            None => (None, None),
        };
        Self {
            id: format!("{version}/{}", file.stem),
            version,
            category,
            component,
            file_path: file.path,
            content: file.content,
        }
    }
}

/// A documentation search request. Filters are optional and conjunctive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocQuery {
    /// Free-text query.
    pub text: String,
    /// Only documents from this version.
    pub version: Option<CollectorVersion>,
    /// Only readmes of this category.
    pub category: Option<ComponentCategory>,
    /// Only readmes of this component name.
    pub component: Option<String>,
    /// Upper bound on returned matches; at least one is always allowed.
    pub max_results: usize,
}

impl DocQuery {
    /// An unfiltered query returning up to [`DEFAULT_MAX_RESULTS`] matches.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: None,
            category: None,
            component: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Restrict to one version.
    pub fn with_version(mut self, version: CollectorVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Restrict to one category.
    pub fn with_category(mut self, category: ComponentCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to one component name.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Cap the number of matches.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    fn admits(&self, entry: &DocumentEntry) -> bool {
        self.version.map_or(true, |v| v == entry.version)
            && self.category.map_or(true, |c| entry.category == Some(c))
            && self
                .component
                .as_deref()
                .map_or(true, |name| entry.component.as_deref() == Some(name))
    }
}

/// A scored search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMatch {
    /// `<version>/<stem>`, e.g. `0.138.0/receiver_otlp`.
    pub id: String,
    /// Collector version the document belongs to.
    pub version: String,
    /// Component category; absent for changelogs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ComponentCategory>,
    /// Component name; absent for changelogs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Location relative to the asset root.
    pub file_path: String,
    /// Full document text.
    pub content: String,
    /// In `[0, 1]`.
    pub similarity: f64,
}

#[derive(Debug)]
struct IndexedDocument {
    entry: DocumentEntry,
    terms: HashSet<String>,
}

/// Term index over every markdown document in a store.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    documents: Vec<IndexedDocument>,
    document_frequency: HashMap<String, usize>,
}

impl DocumentIndex {
    /// Index every markdown document in every version of `store`.
    pub fn build(store: &dyn SchemaStore) -> Result<Self, RegistryError> {
        let mut entries = Vec::new();
        for version in store.list_versions()? {
            for file in store.markdown_files(&version)? {
                entries.push(DocumentEntry::from_markdown(version, file));
            }
        }
        let index = Self::from_entries(entries);
        tracing::info!(documents = index.len(), "built documentation index");
        Ok(index)
    }

    /// Index an explicit set of documents.
    pub fn from_entries(entries: impl IntoIterator<Item = DocumentEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let terms: HashSet<String> = tokenize(&entry.content).collect();
            for term in &terms {
                *index.document_frequency.entry(term.clone()).or_default() += 1;
            }
            index.documents.push(IndexedDocument { entry, terms });
        }
        index
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Run a query.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyQuery`] if the query text has no terms.
    pub fn search(&self, query: &DocQuery) -> Result<Vec<DocumentMatch>, RegistryError> {
        let query_terms: HashSet<String> = tokenize(&query.text).collect();
        if query_terms.is_empty() {
            return Err(RegistryError::EmptyQuery);
        }

        let weights: Vec<(&str, f64)> = query_terms
            .iter()
            .map(|term| (term.as_str(), self.idf(term)))
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();

        let mut matches: Vec<DocumentMatch> = self
            .documents
            .iter()
            .filter(|doc| query.admits(&doc.entry))
            .filter_map(|doc| {
                let matched: f64 = weights
                    .iter()
                    .filter(|(term, _)| doc.terms.contains(*term))
                    .map(|(_, w)| w)
                    .sum();
                let similarity = (matched / total).clamp(0.0, 1.0);
                (similarity > 0.0).then(|| to_match(&doc.entry, similarity))
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(query.max_results.max(1));

        tracing::debug!(query = %query.text, hits = matches.len(), "documentation search");
        Ok(matches)
    }

    /// Smoothed inverse document frequency; always positive.
    fn idf(&self, term: &str) -> f64 {
        let n = self.documents.len() as f64;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f64;
        1.0 + ((n + 1.0) / (df + 1.0)).ln()
    }
}

fn to_match(entry: &DocumentEntry, similarity: f64) -> DocumentMatch {
    DocumentMatch {
        id: entry.id.clone(),
        version: entry.version.to_string(),
        category: entry.category,
        component: entry.component.clone(),
        file_path: entry.file_path.clone(),
        content: entry.content.clone(),
        similarity,
    }
}

/// Lowercase alphanumeric runs of `text`.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}
