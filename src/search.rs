use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::index::SearchHit;

pub use crate::cli::OutputFormat;

/// Configuration for presenting query results.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Output format
    pub format: OutputFormat,
    /// Maximum results to print
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { format: OutputFormat::Plain, max_results: 20 }
    }
}

/// JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub results: &'a [SearchHit],
}

/// Writes ranked hits to an output stream.
pub struct ResultPrinter {
    config: SearchConfig,
}

impl ResultPrinter {
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Format and output search results, truncated to `max_results`.
    ///
    /// # Errors
    /// Returns `IndexerError` if:
    /// - Writing to the output stream fails (wrapped as `IndexerError::Io`)
    /// - JSON serialization fails (when using JSON format)
    pub fn print<W: Write>(&self, hits: &[SearchHit], output: &mut W) -> Result<()> {
        let hits = &hits[..hits.len().min(self.config.max_results)];
        match self.config.format {
            OutputFormat::Plain => Self::print_plain(hits, output),
            OutputFormat::Json => Self::print_json(hits, output),
        }
    }

    /// One `rank<TAB>path` line per hit.
    fn print_plain<W: Write>(hits: &[SearchHit], output: &mut W) -> Result<()> {
        for hit in hits {
            writeln!(output, "{:.6}\t{}", hit.rank, hit.path)?;
        }
        Ok(())
    }

    fn print_json<W: Write>(hits: &[SearchHit], output: &mut W) -> Result<()> {
        let json = serde_json::to_string_pretty(&JsonOutput { results: hits })?;
        writeln!(output, "{json}")?;
        Ok(())
    }
}
