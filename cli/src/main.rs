//! cm360-deploy - Deploy the CM360 conversion upload pipeline to Google Cloud

use clap::{CommandFactory, Parser, error::ErrorKind};

use cm360_deploy::cli::Cli;
use cm360_deploy::domain::DeployError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cm360_deploy::logging::init(cli.verbose, cli.no_color);

    if let Err(e) = cli.run().await {
        if let Some(DeployError::MissingProject) = e.downcast_ref::<DeployError>() {
            Cli::command()
                .error(ErrorKind::MissingRequiredArgument, e.to_string())
                .exit();
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
