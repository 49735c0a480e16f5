pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "menuwise",
    about = "Menuwise operator CLI",
    long_about = "Operate menu classification runs, co-purchase analysis, and recommendation \
                  queries against the configured database.",
    after_help = "Examples:\n  menuwise seed\n  menuwise classify\n  menuwise recommend --cart <item-id> --strategy upsell"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic demo menu and order history (idempotent)")]
    Seed,
    #[command(about = "Classify the active menu, or a single item with --id")]
    Classify {
        #[arg(long, help = "Classify only this item id")]
        id: Option<String>,
    },
    #[command(about = "Rank recommendation candidates for a cart")]
    Recommend {
        #[arg(long, value_delimiter = ',', help = "Comma-separated item ids already in the cart")]
        cart: Vec<String>,
        #[arg(long, default_value = "balanced", help = "balanced, upsell, or cross_sell")]
        strategy: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    #[command(about = "Show items frequently bought together with one item")]
    Pairings {
        #[arg(long, help = "The item id to find partners for")]
        id: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    #[command(about = "Show per-category counts and revenue for the active menu")]
    Stats,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Classify { id } => commands::classify::run(id.as_deref()),
        Command::Recommend { cart, strategy, limit } => {
            commands::recommend::run(&cart, &strategy, limit)
        }
        Command::Pairings { id, limit } => commands::pairings::run(&id, limit),
        Command::Stats => commands::stats::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
