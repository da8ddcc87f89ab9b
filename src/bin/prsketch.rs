//! prsketch CLI — stream an edge list into a rank sketch and poll queries.
//!
//! Usage:
//!   prsketch run --config session.yaml [--file edges.txt] [--format text|json]
//!   prsketch query --config session.yaml [--file edges.txt] [--format text|json]

use clap::{Parser, Subcommand, ValueEnum};
use prsketch::adapter::{join_ingest, IngestResult};
use prsketch::{
    CancellationToken, IngestPipeline, IngestReport, QueryPoller, QueryReport, SessionConfig,
    SketchEngine,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(
    name = "prsketch",
    version,
    about = "Rank sketch for streaming directed graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream the edge file and print query reports on every poll interval
    Run {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Ingest the whole edge file, then print one query report
    Query {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(clap::Args)]
struct SessionArgs {
    /// Path to the session file (YAML or JSON)
    #[arg(long, short)]
    config: PathBuf,
    /// Override the edge file named in the session
    #[arg(long)]
    file: Option<PathBuf>,
    /// Output format for reports
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &QueryReport, format: Format) {
    match format {
        Format::Text => print!("{}", report),
        Format::Json => match serde_json::to_string(report) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("failed to serialize report: {}", e),
        },
    }
}

/// Load the session and build the engine it describes
fn open_session(args: &SessionArgs) -> Result<(SessionConfig, Arc<SketchEngine>), String> {
    let mut session = SessionConfig::load(&args.config)
        .map_err(|e| format!("failed to load {}: {}", args.config.display(), e))?;
    if let Some(file) = &args.file {
        session.file_path = file.clone();
    }
    let engine = SketchEngine::with_seed(session.sketch, session.seed)
        .map_err(|e| format!("invalid sketch: {}", e))?;
    info!(
        width = session.sketch.width,
        depth = session.sketch.depth,
        pattern_length = session.sketch.pattern_length,
        conflict_limit = session.sketch.conflict_limit,
        file = %session.file_path.display(),
        batch_size = session.batch_size,
        queries = session.queries.len(),
        "session loaded"
    );
    Ok((session, Arc::new(engine)))
}

/// Stream the session's edge file into `engine` while publishing polled
/// reports to `emit`.
///
/// `interrupt` resolving cancels ingestion between batches. Either way the
/// poller is stopped, one final report is published and `emit` has seen every
/// report before this returns.
async fn stream_session<F, E>(
    session: &SessionConfig,
    engine: Arc<SketchEngine>,
    interrupt: F,
    mut emit: E,
) -> IngestResult<IngestReport>
where
    F: Future,
    E: FnMut(&QueryReport) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let pipeline = IngestPipeline::new(engine.clone()).with_batch_size(session.batch_size);
    let mut ingest = pipeline.spawn_file(session.file_path.clone(), cancel.clone());

    let poller = QueryPoller::new(engine, session.queries.clone(), session.poll_interval());
    let mut reports = poller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => emit(&report),
                Err(RecvError::Lagged(n)) => error!(skipped = n, "report printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let poll_cancel = CancellationToken::new();
    let polling = {
        let poll_cancel = poll_cancel.clone();
        let mut poller = poller;
        tokio::spawn(async move {
            poller.run(&poll_cancel).await;
            poller
        })
    };

    let finished = tokio::select! {
        result = join_ingest(&mut ingest) => Some(result),
        _ = interrupt => None,
    };
    let outcome = match finished {
        Some(result) => result,
        None => {
            info!("interrupted, stopping ingestion");
            cancel.cancel();
            join_ingest(&mut ingest).await
        }
    };

    poll_cancel.cancel();
    match polling.await {
        Ok(mut poller) => {
            // final answers once ingestion has stopped
            poller.poll_once();
        }
        Err(e) => error!("query poller failed: {}", e),
    }
    if let Err(e) = printer.await {
        error!("report printer failed: {}", e);
    }
    outcome
}

async fn cmd_run(args: SessionArgs) -> i32 {
    let (session, engine) = match open_session(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let format = args.format;
    let outcome = stream_session(&session, engine, tokio::signal::ctrl_c(), move |report| {
        print_report(report, format)
    })
    .await;

    match outcome {
        Ok(report) => {
            info!(
                batches = report.batches,
                edges = report.edges,
                skipped = report.skipped,
                cancelled = report.cancelled,
                "ingestion finished"
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_query(args: SessionArgs) -> i32 {
    let (session, engine) = match open_session(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let pipeline = IngestPipeline::new(engine.clone()).with_batch_size(session.batch_size);
    match pipeline.ingest_file(&session.file_path, &CancellationToken::new()) {
        Ok(report) => info!(batches = report.batches, edges = report.edges, "ingestion finished"),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    let interval = session.poll_interval();
    let mut poller = QueryPoller::new(engine, session.queries, interval);
    print_report(&poller.poll_once(), args.format);
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let code = match cli.command {
        Commands::Run { session } => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("failed to create tokio runtime: {}", e);
                    std::process::exit(1);
                }
            };
            rt.block_on(cmd_run(session))
        }
        Commands::Query { session } => cmd_query(session),
    };
    std::process::exit(code);
}
