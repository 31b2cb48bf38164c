use std::collections::HashMap;

use crate::index::Document;

/// Relevance of `token` for `document` within a corpus of `total_documents`.
///
/// `tf = count / total_tokens` and `idf = log10(total_documents / df)`, where
/// `df` is taken as 1 when the token has no non-zero document frequency.
/// A document without tokens yields NaN; callers filter it out.
#[must_use]
pub fn tf_idf(
    token: &str,
    document: &Document,
    total_documents: usize,
    document_frequency: &HashMap<String, u64>,
) -> f64 {
    let idf = inverse_document_frequency(token, total_documents, document_frequency);
    term_frequency(token, document) * idf
}

#[allow(clippy::cast_precision_loss)]
fn term_frequency(token: &str, document: &Document) -> f64 {
    let count = document.term_frequency.get(token).copied().unwrap_or(0);
    count as f64 / document.total_tokens as f64
}

#[allow(clippy::cast_precision_loss)]
fn inverse_document_frequency(
    token: &str,
    total_documents: usize,
    document_frequency: &HashMap<String, u64>,
) -> f64 {
    // Zero entries are retained after removals; score them like unseen tokens.
    let df = document_frequency.get(token).copied().filter(|&df| df > 0).unwrap_or(1);
    (total_documents as f64 / df as f64).log10()
}
