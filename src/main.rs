use std::process::ExitCode;

use clap::Parser;
use redlite::server;
use tracing::error;

const PORT: u16 = 6379;

#[derive(Parser, Debug)]
struct Args {
    /// The port to listen on
    #[arg(short, long, default_value_t = PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = server::run(args.port).await {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
