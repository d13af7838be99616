use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use paramstore::cli::{handle_version_command, parse_args, run, CliCommand, USAGE};

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            print!("{}", USAGE);
            Ok(())
        }
        CliCommand::Run(options) => {
            color_eyre::install()?;
            init_tracing();
            run(options).await
        }
    }
}
