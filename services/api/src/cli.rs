use crate::demo::{run_demo, DemoArgs};
use crate::export::{run_csv_export, run_hash_password, run_pdf_export, CsvExportArgs, HashPasswordArgs, PdfExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dosmicos_hiring::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dosmicos Hiring",
    about = "Run the Dosmicos marketing hiring service and its admin tooling from the command line",
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
    /// Export stored applications without going through the admin console
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Admin account helpers
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Walk a sample candidate through the wizard and write the resulting exports
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ExportCommand {
    /// Write every stored application to a CSV file
    Csv(CsvExportArgs),
    /// Write one application to a PDF report
    Pdf(PdfExportArgs),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Print the SHA-256 digest to place in ADMIN_PASSWORD_SHA256
    HashPassword(HashPasswordArgs),
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
        Command::Export {
            command: ExportCommand::Csv(args),
        } => run_csv_export(args),
        Command::Export {
            command: ExportCommand::Pdf(args),
        } => run_pdf_export(args),
        Command::Admin {
            command: AdminCommand::HashPassword(args),
        } => run_hash_password(args),
        Command::Demo(args) => run_demo(args),
    }
}
