//! neo4jdump
//!
//! Dumps a whole Neo4j graph, nodes first and relationships second, as one
//! line per record. The dump goes to stdout (or `--output FILE`); progress,
//! logs and error reports go to stderr.
//!
//! # Usage
//!
//! ```bash
//! neo4jdump --host http://localhost:7474 --size 500 > graph.dump
//! ```

use tracing::{info, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use neo4jdump::cli::CliInterface;
use neo4jdump::connection::{ConnectionManager, HttpGraphStore};
use neo4jdump::error::{ErrorWrapper, Result};
use neo4jdump::export::{DumpWriter, ExportCoordinator, ProgressMode, RecordWriter};
use neo4jdump::utils::DiagnosticStream;

/// Application entry point
#[tokio::main]
async fn main() {
    let wrapper = ErrorWrapper::new(DiagnosticStream::stderr());

    if let Err(e) = run(&wrapper).await {
        // Faults raised by the export are already reported.
        wrapper.observe("Error", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or validate configuration
/// 4. Connect, open the output sink and run the export
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run(wrapper: &ErrorWrapper) -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let config = cli.config();
    config.validate()?;

    cli.print_banner();

    let mut manager = ConnectionManager::new(config.connection.clone());
    manager.connect().await?;
    if let Some(version) = manager.server_version() {
        cli.print_connection_info(version);
    }

    let writer: Box<dyn RecordWriter> = match &config.export.output {
        Some(path) => Box::new(DumpWriter::create(path).await?),
        None => Box::new(DumpWriter::stdout()),
    };
    let mode = ProgressMode::detect(cli.progress_enabled(), wrapper.diagnostics());

    let mut coordinator = ExportCoordinator::new(
        Box::new(HttpGraphStore::new(manager)),
        writer,
        wrapper.clone(),
    )
    .with_batch_size(config.export.batch_size)
    .with_progress(mode);

    let result = coordinator.execute().await?;
    info!(
        "Dumped {} nodes and {} relations in {} ms",
        result.nodes.records, result.relationships.records, result.elapsed_ms
    );
    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// Events go to stderr; stdout is reserved for the dump. `RUST_LOG`, when
/// set, replaces the level derived from flags and configuration.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
