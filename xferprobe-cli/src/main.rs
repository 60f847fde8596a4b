//! xferprobe CLI
//!
//! Probes a PortMaster checkout and its runtime artifacts from the outside.
//!
//! Usage from the project root:
//!   xferprobe layout                 # Check the source/build directory layout
//!   xferprobe logs                   # Confirm busy-retry entries in the runtime log
//!   xferprobe checksum               # MD5 and size of the sample transfer file
//!   xferprobe harness                # Run AutoTest.exe with a timeout
//!   xferprobe diagnose --text "..."  # Classify captured error-window text
//!   xferprobe all                    # Everything above, plus a JSON report
//!
//! Exit code is 0 when every check passed and 1 otherwise.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

use commands::{
    AllCommand, ChecksumCommand, DiagnoseCommand, HarnessCommand, LayoutCommand, LogsCommand,
    ReportCommands,
};

#[derive(Parser)]
#[command(name = "xferprobe")]
#[command(about = "Out-of-process checks for the PortMaster transfer tool")]
#[command(
    long_about = "xferprobe checks a PortMaster checkout from the outside: directory layout, busy-retry evidence in runtime logs, sample file digests, the AutoTest harness, and error-dialog diagnosis."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// PortMaster project root; other paths default relative to it
    #[arg(
        long,
        global = true,
        env = "XFERPROBE_PROJECT_ROOT",
        default_value = "."
    )]
    pub project_root: PathBuf,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the expected source and build paths exist
    Layout(LayoutCommand),
    /// Count busy-retry patterns in the runtime log
    Logs(LogsCommand),
    /// Compute MD5 and size of the sample file
    Checksum(ChecksumCommand),
    /// Run the AutoTest harness with a bounded timeout
    Harness(HarnessCommand),
    /// Diagnose captured error-window text
    Diagnose(DiagnoseCommand),
    /// Run every probe and write the JSON report
    All(AllCommand),
    /// Inspect previously written reports
    #[command(subcommand)]
    Report(ReportCommands),
}

/// `XFERPROBE_LOG_DIR`, else a per-user data directory.
fn log_dir() -> PathBuf {
    std::env::var_os("XFERPROBE_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("xferprobe")
                .join("logs")
        })
}

/// Console logging to stderr, plus a daily file when the log directory is writable.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let dir = log_dir();
    let file_layer = std::fs::create_dir_all(&dir).ok().map(|_| {
        fmt::layer()
            .with_writer(tracing_appender::rolling::daily(&dir, "xferprobe.log"))
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result: Result<bool> = match &cli.command {
        Commands::Layout(cmd) => cmd.execute(&cli.global),
        Commands::Logs(cmd) => cmd.execute(&cli.global),
        Commands::Checksum(cmd) => cmd.execute(&cli.global),
        Commands::Harness(cmd) => cmd.execute(&cli.global).await,
        Commands::Diagnose(cmd) => cmd.execute(),
        Commands::All(cmd) => cmd.execute(&cli.global).await,
        Commands::Report(cmd) => cmd.execute(),
    };

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(1);
        }
    }
}
