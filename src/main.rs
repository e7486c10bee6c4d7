use clap::Parser;
use scrollshot::cli::{self, Args};
use tracing_subscriber::EnvFilter;

/// Load environment variables from .env file if present.
/// Silently ignores if .env doesn't exist.
fn load_env() {
    let _ = dotenv::dotenv();
}

/// Route `log` records to stderr. `RUST_LOG` overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Load .env file before anything else
    load_env();
    init_logging();

    let args = Args::parse();
    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
