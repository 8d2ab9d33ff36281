use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wsync")]
#[command(about = "Watch remnants -> marketplace stock/price sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the remnants feed against every target and push updates
    Sync {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Only sync these targets (repeatable). Default: all.
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Fetch and reconcile, but send nothing.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Read remnants from a local .xls/.xlsx instead of downloading.
        #[arg(long)]
        feed_file: Option<String>,

        /// Treat unused config keys as an error.
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> ...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Fetch one target's offer catalog and print its size
    Catalog {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Target name
        #[arg(long)]
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience: local secrets file, then the conventional one.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Sync {
            config_paths,
            targets,
            dry_run,
            feed_file,
            strict_config,
        } => {
            commands::sync::run_sync(commands::sync::SyncArgs {
                config_paths,
                targets,
                dry_run,
                feed_file,
                strict_config,
            })
            .await?;
        }

        Commands::ConfigHash { paths } => {
            let loaded = wsync_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Catalog {
            config_paths,
            target,
        } => {
            commands::catalog::run_catalog(&config_paths, &target).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays `key=value` only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
