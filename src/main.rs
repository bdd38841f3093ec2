//! Command line entry point.

use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    ArgAction,
    Args,
    Parser,
    Subcommand,
};
use js_i18n_locales::config::ConfigManager;
use js_i18n_locales::{
    LocalesPipeline,
    PipelineError,
    TaskTarget,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{
    EnvFilter,
    Layer,
    fmt,
};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "js-i18n-locales",
    version,
    about = "Extract, compile and exchange i18n locale files"
)]
struct Cli {
    /// Workspace root all paths are relative to.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file. Defaults to `.locales.json` in the workspace root.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Operation to run.
    #[command(subcommand)]
    command: Command,
}

/// Pipeline operations.
#[derive(Subcommand, Debug)]
enum Command {
    /// Scan sources and update every locale store.
    Refresh(TaskArgs),
    /// Compile locale stores into JavaScript artifacts.
    Compile(TaskArgs),
    /// Export locale stores as CSV tables.
    Export(TaskArgs),
    /// Import translated CSV tables into existing locale stores.
    Import(TaskArgs),
}

/// Sources and destination shared by every command.
#[derive(Args, Debug)]
struct TaskArgs {
    /// Source glob, relative to the workspace root. Repeat for several.
    #[arg(long = "src", value_name = "GLOB", action = ArgAction::Append)]
    sources: Vec<String>,

    /// Destination path containing the locale placeholder.
    #[arg(long = "dest")]
    destination: Option<String>,

    /// Explicit files replacing the source globs.
    files: Vec<PathBuf>,
}

impl From<TaskArgs> for TaskTarget {
    fn from(args: TaskArgs) -> Self {
        let target = Self::new(args.sources).with_files(args.files);
        match args.destination {
            Some(destination) => target.with_destination(destination),
            None => target,
        }
    }
}

/// Installs the stderr layer and, with `log_file`, a non-blocking file
/// layer. The returned guard flushes the file on drop.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let (file_layer, guard) = log_file
        .map(|path| {
            let directory =
                path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .map_or_else(|| "js-i18n-locales.log".into(), ToOwned::to_owned);
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (layer, guard)
        })
        .unzip();

    tracing_subscriber::registry().with(console_layer).with(file_layer).init();
    guard
}

/// Loads the settings and runs the requested operation.
async fn run(cli: Cli) -> Result<(), PipelineError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(cli.root.clone()), cli.config.as_deref())?;
    let mut pipeline = LocalesPipeline::new(cli.root, config_manager.get_settings().clone())?;

    let outcomes = match cli.command {
        Command::Refresh(args) => pipeline.refresh(&args.into()).await?,
        Command::Compile(args) => pipeline.compile(&args.into()).await?,
        Command::Export(args) => pipeline.export(&args.into()).await?,
        Command::Import(args) => pipeline.import(&args.into()).await?,
    };
    tracing::debug!(files = outcomes.len(), "Done");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
