mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{cache::CacheSubcommand, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skillgraph",
    about = "Skill catalog maintenance: metadata cache, combo graph, and session triage",
    version,
    propagate_version = true
)]
struct Cli {
    /// Home directory holding the catalog (default: the user's home)
    #[arg(long, global = true, env = "SKILLGRAPH_HOME")]
    home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect signals, auto-apply safe fixes, and refresh the review queue
    Orchestrate {
        /// Always rewrite the review queue and print the full report
        #[arg(long)]
        full: bool,

        /// Generate combos in this process instead of a child process
        #[arg(long)]
        in_process: bool,
    },

    /// Score relationships and write combo lists into descriptors
    Combos {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Promote entry strength from usage counts
    Ranks {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show combo partners for an entry that was just used (once per session)
    Suggest {
        /// Entry name as invoked, e.g. `pdf` or `office:pdf`
        entry: String,
    },

    /// Rank distribution and long-unused entries
    Stats,

    /// Check workflow chains for references to entries that do not exist
    Audit {
        /// Always audit, and print the full report
        #[arg(long)]
        full: bool,
    },

    /// Render the cross-reference graph as Mermaid, coloured by rarity tier
    Map {
        /// Write the map to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Inspect or drop the metadata snapshot
    Cache {
        #[command(subcommand)]
        subcommand: CacheSubcommand,
    },

    /// Show or validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // session hooks (orchestrate, its combos child, audit) never fail on config
    let open: fn(Option<&std::path::Path>) -> anyhow::Result<root::Home> = match cli.command {
        Commands::Orchestrate { .. } | Commands::Combos { .. } | Commands::Audit { .. } => {
            root::Home::open_best_effort
        }
        _ => root::Home::open,
    };
    let result = open(cli.home.as_deref()).and_then(|home| match cli.command {
        Commands::Orchestrate { full, in_process } => {
            cmd::orchestrate::run(&home, full, in_process, cli.json)
        }
        Commands::Combos { dry_run } => cmd::combos::run(&home, dry_run, cli.json),
        Commands::Ranks { dry_run } => cmd::ranks::run(&home, dry_run, cli.json),
        Commands::Suggest { entry } => cmd::suggest::run(&home, &entry, cli.json),
        Commands::Stats => cmd::stats::run(&home, cli.json),
        Commands::Audit { full } => cmd::audit::run(&home, full, cli.json),
        Commands::Map { output } => cmd::map::run(&home, output.as_deref(), cli.json),
        Commands::Cache { subcommand } => cmd::cache::run(&home, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&home, subcommand, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
