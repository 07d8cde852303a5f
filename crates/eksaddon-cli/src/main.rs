//! eksaddon CLI - resource IDs and tag reconciliation for EKS addons

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "eksaddon")]
#[command(author = "eksaddon Contributors")]
#[command(version)]
#[command(about = "Resource IDs and tag reconciliation for EKS addons", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Provider configuration file (default tags and ignored tags)
    #[arg(long, global = true, env = "EKSADDON_PROVIDER")]
    provider: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode or decode addon resource IDs
    Id {
        #[command(subcommand)]
        command: IdCommands,
    },

    /// Show the effective tags for an addon spec
    Tags {
        /// Addon spec file
        spec: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the tag changes needed to bring remote tags in line with a spec
    Diff {
        /// Addon spec file
        spec: PathBuf,

        /// File holding the tags currently on the addon
        #[arg(short, long)]
        remote: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an addon spec against the provider configuration
    Validate {
        /// Addon spec file
        spec: PathBuf,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IdCommands {
    /// Build a resource ID from cluster and addon names
    Encode {
        cluster_name: String,
        addon_name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a resource ID into cluster and addon names
    Decode {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let provider = cli.provider.as_deref();

    match cli.command {
        Commands::Id { command } => match command {
            IdCommands::Encode {
                cluster_name,
                addon_name,
                json,
            } => commands::id::encode(&cluster_name, &addon_name, json),
            IdCommands::Decode { id, json } => commands::id::decode(&id, json),
        },

        Commands::Tags { spec, json } => commands::tags::run(&spec, provider, json),

        Commands::Diff { spec, remote, json } => {
            commands::diff::run(&spec, &remote, provider, json)
        }

        Commands::Validate { spec, json } => commands::validate::run(&spec, provider, json),
    }
}
