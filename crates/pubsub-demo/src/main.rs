//! PubSub demo entry point.

use clap::Parser;
use pubsub_registry::RegistryConfig;
use tracing_subscriber::{fmt, EnvFilter};

use pubsub_demo::cli::Cli;
use pubsub_demo::scenarios::{self, Transcript};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let config = RegistryConfig::new().with_key_policy(cli.key_policy.into());
    let transcript = Transcript::new();

    let mut failed = false;
    for scenario in cli.scenario.expand() {
        let result = scenarios::run(scenario, &config, &transcript);
        println!("[{:?}]", scenario);
        for line in transcript.take() {
            println!("  {}", line);
        }
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}
