//! RastrWin CLI - connect to and probe the RastrWin COM server

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rastr_connect::{
    inspect, AutomationHost, ConnectionReport, ConnectionResolver, ConnectionStrategy,
    DiagnosticSink, MemberLookup, ReportStatus, ResolverConfig, WriterSink,
    TROUBLESHOOTING_HINTS,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "rastr")]
#[command(author, version, about = "Connect to the RastrWin automation server over COM")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Try each connection strategy in order and report which one worked
    Connect(SessionArgs),

    /// Connect, then check that the expected members are present
    Probe(SessionArgs),

    /// List the connection strategies that would be tried
    Strategies {
        /// JSON config file with a custom strategy list
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Default)]
struct SessionArgs {
    /// JSON config file with strategies, timeout and members to probe
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Try this ProgID instead of the configured strategies
    #[arg(long)]
    prog_id: Option<String>,

    /// Try this CLSID (plain, then with type info) instead of the configured strategies
    #[arg(long)]
    guid: Option<String>,

    /// Give up on the whole run after this many milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Print the report as JSON on stdout (progress goes to stderr)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Connect(args) => run_session(&args, false),
        Commands::Probe(args) => run_session(&args, true),
        Commands::Strategies { config } => list_strategies(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    match path {
        Some(path) => ResolverConfig::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(ResolverConfig::default()),
    }
}

/// Apply `--prog-id` / `--guid` overrides. Either one replaces the configured
/// list; together they give ProgID, GUID, then type-cached GUID.
fn effective_config(args: &SessionArgs) -> Result<ResolverConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if args.prog_id.is_some() || args.guid.is_some() {
        let mut strategies = Vec::new();
        if let Some(prog_id) = &args.prog_id {
            strategies.push(ConnectionStrategy::prog_id(prog_id.clone()));
        }
        if let Some(guid) = &args.guid {
            Uuid::parse_str(guid).with_context(|| format!("'{guid}' is not a valid GUID"))?;
            strategies.push(ConnectionStrategy::guid(guid.clone()));
            strategies.push(ConnectionStrategy::type_cached(guid.clone()));
        }
        config.strategies = strategies;
    }
    if args.timeout_ms.is_some() {
        config.timeout_ms = args.timeout_ms;
    }

    config.validate().context("Invalid connection strategies")?;
    Ok(config)
}

fn run_session(args: &SessionArgs, probe: bool) -> Result<ExitCode> {
    let config = effective_config(args)?;
    let resolver = config.resolver()?;
    let members = probe.then(|| config.probe_members.clone());
    let json = args.json;

    // The host and every handle it creates stay on the session thread.
    let job = move || {
        let host = rastr_com::platform_host();
        if json {
            let mut sink = WriterSink::new(std::io::stderr());
            session(&resolver, &host, members.as_deref(), &mut sink)
        } else {
            let mut sink = WriterSink::new(std::io::stdout());
            session(&resolver, &host, members.as_deref(), &mut sink)
        }
    };

    let report = match config.timeout() {
        Some(deadline) => match run_with_deadline(job, deadline)? {
            Some(report) => report,
            None => {
                let report = ConnectionReport::timed_out(deadline);
                if let Some(reason) = &report.reason {
                    eprintln!("Could not connect: {reason}");
                }
                report
            }
        },
        None => job(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if report.is_connected() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Resolve a handle, optionally inspect it, and summarize. The handle is
/// released before this returns.
fn session<H>(
    resolver: &ConnectionResolver,
    host: &H,
    members: Option<&[String]>,
    sink: &mut impl DiagnosticSink,
) -> ConnectionReport
where
    H: AutomationHost,
    H::Handle: MemberLookup,
{
    let outcome = resolver.resolve(host, sink);
    let mut report = ConnectionReport::from_outcome(&outcome);

    if let (Some(members), Some(handle)) = (members, outcome.handle()) {
        sink.line("Inspecting connected object:");
        report = report.with_inspection(inspect(handle, members, sink));
    }

    if report.status == ReportStatus::Exhausted {
        sink.line("Check that:");
        for (i, hint) in TROUBLESHOOTING_HINTS.iter().enumerate() {
            sink.line(&format!("  {}. {hint}", i + 1));
        }
    }

    report
}

/// Run `job` on its own thread. `Ok(None)` means the deadline passed first;
/// the thread is left to finish on its own.
fn run_with_deadline<T, F>(job: F, deadline: Duration) -> Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("rastr-session".to_string())
        .spawn(move || {
            let _ = tx.send(job());
        })
        .context("Failed to start session thread")?;

    match rx.recv_timeout(deadline) {
        Ok(value) => Ok(Some(value)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => bail!("Session thread panicked"),
    }
}

fn list_strategies(config: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config)?;

    for (i, strategy) in config.strategies.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}",
            i + 1,
            strategy.label(),
            strategy.method(),
            strategy.identifier()
        );
    }

    Ok(ExitCode::SUCCESS)
}
