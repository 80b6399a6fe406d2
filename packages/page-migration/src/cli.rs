//! Command-line interface for the page migration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Definitions, MigrationConfig};
use crate::error::Result;
use crate::field::LandingPageFieldConverter;
use crate::migrator::{
    EventLevel, MigrationEvent, MigrationOptions, MigrationOutcome, Migrator, Operator, Prompt,
};
use crate::storage::{create_pool, MySqlContentRepository, MySqlPageGateway};

const MIGRATE_HELP: &str = "\
Migrates legacy landing pages into the normalized page tables.

Back up your database before running this command. Use --dry-run first to see
which pages would be migrated; nothing is written in that mode.

Connection settings are read from DATABASE_URL and DATABASE_MAX_CONNECTIONS.";

/// Page Migration - Move legacy XML landing pages into the page tables.
#[derive(Parser)]
#[command(name = "page-migration")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate landing page fields of every content version.
    #[command(long_about = MIGRATE_HELP)]
    Migrate {
        /// Report what would be migrated without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Layout and block definitions file (default: config/definitions.yaml)
        #[arg(short, long)]
        definitions: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            dry_run,
            definitions,
        } => migrate_command(dry_run, definitions).await,
    }
}

/// Execute the migrate command.
async fn migrate_command(dry_run: bool, definitions: Option<PathBuf>) -> Result<()> {
    let mut config = MigrationConfig::from_env()?;
    if let Some(path) = definitions {
        config = config.with_definitions_path(path);
    }

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    pb.set_message("Loading definitions...");
    let definitions = match Definitions::load(&config.definitions_path) {
        Ok(definitions) => definitions,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let layouts = definitions.layouts.len();
    let blocks = definitions.blocks.len();
    let converter = Arc::new(LandingPageFieldConverter::new(definitions.into_parser()));

    pb.set_message("Connecting to database...");
    let pool = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!(
        "{} {} layouts, {} block types from {}",
        style("Loaded").bold(),
        style(layouts).cyan(),
        style(blocks).cyan(),
        config.definitions_path.display()
    );
    println!();

    let repository = MySqlContentRepository::new(pool.clone());
    let mut gateway = MySqlPageGateway::new(pool);
    let mut operator = ConsoleOperator::new();
    let options = MigrationOptions::default()
        .with_dry_run(dry_run)
        .with_field_type(config.field_type.clone());

    let outcome = Migrator::new(&repository, &mut gateway, &mut operator, converter, options)
        .run()
        .await?;

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &MigrationOutcome) {
    let summary = match outcome {
        MigrationOutcome::NothingToMigrate | MigrationOutcome::Cancelled => return,
        MigrationOutcome::Aborted { summary, .. } | MigrationOutcome::Completed(summary) => {
            summary
        }
    };

    println!();
    println!("  Content items: {}", summary.candidates);
    println!("  Versions: {}", summary.versions);
    println!("  Migrated: {}", style(summary.migrated).green());
    println!("  Skipped: {}", summary.skipped);
    if summary.failed > 0 {
        println!("  Failed: {}", style(summary.failed).red().bold());
    }
    if summary.unreadable_versions > 0 {
        println!(
            "  Unreadable versions: {}",
            style(summary.unreadable_versions).yellow().bold()
        );
    }
}

/// Operator talking to the terminal.
pub struct ConsoleOperator {
    term: Term,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for ConsoleOperator {
    fn report(&mut self, event: &MigrationEvent) {
        match event.level() {
            EventLevel::Note => println!("{} {event}", style("[NOTE]").yellow()),
            EventLevel::Warning => println!("{} {event}", style("[WARNING]").yellow().bold()),
            EventLevel::Section => {
                println!();
                println!("{}", style(event).bold().underlined());
            }
            EventLevel::Error => eprintln!("{} {event}", style("[ERROR]").red().bold()),
            EventLevel::Success => println!("{} {event}", style("[OK]").green().bold()),
        }
    }

    fn decide(&mut self, prompt: Prompt<'_>) -> bool {
        let default = prompt.default_answer();
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let question = format!("{} {} ", style(prompt).green(), style(hint).dim());

        let answer = self
            .term
            .write_str(&question)
            .and_then(|()| self.term.read_line());

        match answer {
            Ok(input) => parse_answer(&input, default),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read answer, using default");
                default
            }
        }
    }
}

/// Interpret a yes/no answer; anything unrecognized means the default.
fn parse_answer(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
