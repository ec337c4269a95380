use crate::demo::{run_demo, run_slug, DemoArgs, SlugArgs};
use crate::server;
use casting::config::BackendKind;
use casting::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Casting Back-Office",
    about = "Run the casting roster and artist submission API from the command line",
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
    /// Print the public slug an artist name would be published under
    Slug(SlugArgs),
    /// Walk a sample submission through intake, approval, and rejection in memory
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the data backend (`memory` or `rest`)
    #[arg(long)]
    pub(crate) backend: Option<BackendKind>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Slug(args) => {
            run_slug(args);
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}
