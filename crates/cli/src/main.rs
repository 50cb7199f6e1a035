use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Bookshelf service tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending schema migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookshelf CLI starting");

    match cli.command {
        Command::Serve => bookshelf_app::serve(&settings).await,
        Command::Migrate { dry_run } => {
            let migrations = bookshelf_app::migrate(&settings, dry_run).await?;
            report(&migrations, dry_run);
            Ok(())
        }
    }
}

fn report(migrations: &[String], dry_run: bool) {
    if migrations.is_empty() {
        println!("database schema is up to date");
        return;
    }

    let verb = if dry_run { "pending" } else { "applied" };
    for label in migrations {
        println!("{verb} {label}");
    }
}
