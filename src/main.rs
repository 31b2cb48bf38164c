use std::io::Write;
use std::path::Path;

use clap::{CommandFactory, Parser};
use locseng::{
    cli::{Cli, Commands, OutputFormat},
    engine::{DirectoryStats, Engine},
    error::{ExitCode, IndexerError},
    persist::JsonFileStore,
    search::{ResultPrinter, SearchConfig},
};

type FileEngine = Engine<JsonFileStore>;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Default: WARN level. RUST_LOG=info or RUST_LOG=debug for verbose output.
    // Quiet flag (-q/--quiet) disables all logging output.
    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr) // stdout carries results
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }

    let index_path = match cli.index_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve index path");
            return ExitCode::from(&e).into();
        }
    };

    // Nothing to do: print usage without touching the index.
    if cli.command.is_none() && cli.query_string().is_none() {
        let mut help = Cli::command();
        if let Err(e) = help.print_help() {
            tracing::error!(error = %e, "Failed to print help");
            return ExitCode::IoErr.into();
        }
        return ExitCode::Ok.into();
    }

    let mut engine = match Engine::open(JsonFileStore::new(&index_path), cli.indexer_config()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(
                error = %e,
                index_path = %index_path.display(),
                "Failed to open index"
            );
            return ExitCode::from(&e).into();
        }
    };

    match &cli.command {
        Some(Commands::Add { path }) => run_add(&mut engine, path),
        Some(Commands::Remove { path }) => run_remove(&mut engine, path),
        Some(Commands::List) => run_list(&engine),
        Some(Commands::Refresh) => run_refresh(&mut engine),
        Some(Commands::Query { query, format, limit }) => {
            // Fall back to top-level query words
            let words = if query.is_empty() { &cli.query } else { query };
            let config =
                SearchConfig { format: format.unwrap_or(OutputFormat::Plain), max_results: *limit };
            run_query(&engine, &words.join(" "), config)
        }
        None => {
            let query = cli.query_string().unwrap_or_default();
            run_query(&engine, &query, SearchConfig::default())
        }
    }
}

fn log_directory_stats(stats: &DirectoryStats, message: &str) {
    tracing::info!(
        files = stats.files_indexed,
        unchanged = stats.files_unchanged,
        skipped = stats.files_skipped,
        removed = stats.files_removed,
        duration_secs = %format!("{:.2}", stats.duration.as_secs_f64()),
        "{message}"
    );
}

fn fail(error: &IndexerError, message: &str) -> std::process::ExitCode {
    tracing::error!(error = %error, "{message}");
    ExitCode::from(error).into()
}

fn run_add(engine: &mut FileEngine, path: &Path) -> std::process::ExitCode {
    match engine.add_directory(path) {
        Ok(stats) => {
            log_directory_stats(&stats, "Indexing complete");
            ExitCode::Ok.into()
        }
        Err(e) => fail(&e, "Failed to add directory"),
    }
}

fn run_remove(engine: &mut FileEngine, path: &Path) -> std::process::ExitCode {
    match engine.remove_directory(path) {
        Ok(stats) => {
            log_directory_stats(&stats, "Directory removed");
            ExitCode::Ok.into()
        }
        Err(e) => fail(&e, "Failed to remove directory"),
    }
}

fn run_refresh(engine: &mut FileEngine) -> std::process::ExitCode {
    match engine.refresh() {
        Ok(stats) => {
            log_directory_stats(&stats, "Indexing complete");
            ExitCode::Ok.into()
        }
        Err(e) => fail(&e, "Refresh failed"),
    }
}

fn run_list(engine: &FileEngine) -> std::process::ExitCode {
    let mut stdout = std::io::stdout().lock();
    for directory in engine.directories() {
        if let Err(e) = writeln!(stdout, "{directory}") {
            return fail(&IndexerError::Io { source: e }, "Failed to output directories");
        }
    }
    ExitCode::Ok.into()
}

fn run_query(engine: &FileEngine, query: &str, config: SearchConfig) -> std::process::ExitCode {
    let hits = engine.query(query);
    tracing::info!(query, results = hits.len(), "Query complete");

    let printer = ResultPrinter::new(config);
    if let Err(e) = printer.print(&hits, &mut std::io::stdout().lock()) {
        return fail(&e, "Failed to output search results");
    }
    ExitCode::Ok.into()
}
