use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use networth::config::{ServeConfig, SimulateArgs};

#[derive(Debug, Parser)]
#[command(name = "networth", about = "Monte Carlo household net-worth simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON API.
    Serve(ServeConfig),
    /// Run one simulation and print the summary as JSON.
    Simulate(SimulateArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("networth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(config) => {
            if let Err(e) = config.validate() {
                eprintln!("{e}");
                std::process::exit(2);
            }
            if let Err(e) = networth::api::run_http_server(config).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Simulate(args) => {
            let result = tokio::task::spawn_blocking(move || networth::api::simulate_from_args(args))
                .await;
            match result {
                Ok(Ok(json)) => println!("{json}"),
                Ok(Err(e)) => {
                    eprintln!("Simulation error: {e}");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Simulation task failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
