mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.command.verbose());

    match cli.command {
        Commands::Analyze {
            path,
            pretty,
            verbose,
        } => {
            let analysis = pydeps::analyze_detailed(&path)
                .with_context(|| format!("failed to analyze {}", path.display()))?;

            let stdout = std::io::stdout();
            pydeps::output::write_graph(&mut stdout.lock(), &analysis.graph, pretty)?;

            if verbose {
                pydeps::output::print_summary(&analysis.stats, &analysis.skipped);
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve {
            config,
            bind,
            data_dir,
            verbose: _,
        } => {
            let config = pydeps::config::ServerConfig::load(&config).with_overrides(bind, data_dir);
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(pydeps::web::serve(config))?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON output.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
