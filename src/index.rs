use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::tfidf::tf_idf;
use crate::tokenizer::tokenize;

/// Term statistics for one indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Occurrences per token.
    pub term_frequency: HashMap<String, u64>,
    /// Total token count, the tf denominator.
    pub total_tokens: u64,
    /// Source file modification time when it was indexed.
    pub last_modified: DateTime<Utc>,
}

impl Document {
    /// Build term statistics for `content`.
    #[must_use]
    pub fn from_content(content: &str, last_modified: DateTime<Utc>) -> Self {
        let mut term_frequency: HashMap<String, u64> = HashMap::new();
        let mut total_tokens = 0;
        for token in tokenize(content) {
            *term_frequency.entry(token).or_insert(0) += 1;
            total_tokens += 1;
        }
        Self { term_frequency, total_tokens, last_modified }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub rank: f64,
}

/// In-memory tf-idf index.
///
/// Owns per-document statistics, corpus document frequencies and the set of
/// watched directories. `document_frequency[t]` always equals the number of
/// documents whose term frequencies contain `t`; it is maintained on every
/// add and remove and never rebuilt. Entries that drop to zero are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStore {
    documents: BTreeMap<String, Document>,
    document_frequency: HashMap<String, u64>,
    watched_directories: BTreeSet<String>,
}

impl IndexStore {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `path` is unknown or was indexed from an older file.
    #[must_use]
    pub fn requires_reindexing(&self, path: &str, last_modified: DateTime<Utc>) -> bool {
        self.documents.get(path).is_none_or(|doc| doc.last_modified < last_modified)
    }

    /// Index `content` under `path`, replacing any previous statistics.
    pub fn add_document(&mut self, path: &str, last_modified: DateTime<Utc>, content: &str) {
        self.remove_document(path);

        let document = Document::from_content(content, last_modified);
        for token in document.term_frequency.keys() {
            *self.document_frequency.entry(token.clone()).or_insert(0) += 1;
        }

        tracing::debug!(
            path,
            tokens = document.total_tokens,
            distinct = document.term_frequency.len(),
            "Document indexed"
        );
        self.documents.insert(path.to_string(), document);
    }

    /// Retract the statistics of `path`. Unknown paths are ignored.
    ///
    /// Returns true if a document was removed.
    pub fn remove_document(&mut self, path: &str) -> bool {
        let Some(document) = self.documents.remove(path) else {
            return false;
        };

        for token in document.term_frequency.keys() {
            if let Some(df) = self.document_frequency.get_mut(token) {
                *df = df.saturating_sub(1);
            }
        }
        true
    }

    /// Rank documents against a free-text query.
    ///
    /// Scores are the sum of per-token tf-idf. Documents scoring exactly
    /// zero or NaN are dropped; the rest are sorted by descending rank, ties
    /// in path order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let tokens: Vec<String> = tokenize(query).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let total = self.documents.len();
        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .filter_map(|(path, document)| {
                let rank: f64 = tokens
                    .iter()
                    .map(|token| tf_idf(token, document, total, &self.document_frequency))
                    .sum();
                (rank != 0.0 && !rank.is_nan()).then(|| SearchHit { path: path.clone(), rank })
            })
            .collect();

        hits.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        hits
    }

    /// Register a directory. Returns false if it was already watched.
    pub fn add_watched_directory(&mut self, path: &str) -> bool {
        self.watched_directories.insert(path.to_string())
    }

    /// Unregister a directory. Returns false if it was not watched.
    pub fn remove_watched_directory(&mut self, path: &str) -> bool {
        self.watched_directories.remove(path)
    }

    /// Watched directories in path order.
    pub fn watched_directories(&self) -> impl Iterator<Item = &str> {
        self.watched_directories.iter().map(String::as_str)
    }

    /// Statistics stored for `path`.
    #[must_use]
    pub fn document(&self, path: &str) -> Option<&Document> {
        self.documents.get(path)
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of documents containing `token`, `None` if it was never seen.
    #[must_use]
    pub fn document_frequency(&self, token: &str) -> Option<u64> {
        self.document_frequency.get(token).copied()
    }

    /// Indexed paths located below `directory`.
    #[must_use]
    pub fn documents_under(&self, directory: &Path) -> Vec<String> {
        self.documents.keys().filter(|path| Path::new(path).starts_with(directory)).cloned().collect()
    }
}
