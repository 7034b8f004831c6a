use crate::commands::{run_allocate, run_report, AllocateArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intern_placement::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Intern Placement",
    about = "Allocate medical interns to training facilities and report on the result",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Allocate an intern roster against a facility capacity sheet
    Allocate(AllocateArgs),
    /// Summarise a previously exported schedule
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Allocate(args) => run_allocate(args),
        Command::Report(args) => run_report(args),
    }
}
