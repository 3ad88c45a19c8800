use clap::Parser;
use radar_cli::{cli::Cli, logging};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = radar_cli::run(cli).await {
        error!(target = "webradar", error = %err, "session ended with an error");
        std::process::exit(1);
    }
}
