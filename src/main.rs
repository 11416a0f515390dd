use clap::Parser;
use tracing_subscriber::EnvFilter;

use genoscreen::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins; otherwise the verbosity flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("genoscreen=debug,info")
        } else {
            EnvFilter::new("genoscreen=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Serve(args) => {
            cli::serve::run(args)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Screen(args) => {
            cli::screen::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Checksum(args) => {
            cli::checksum::run(args, cli.format)?;
        }
    }

    Ok(())
}
