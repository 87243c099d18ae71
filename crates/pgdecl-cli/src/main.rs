//! pgdecl CLI
//!
//! Drives the extension lifecycle against one database from the command line.

mod config;
mod error;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use pgdecl::{
    Capabilities, CatalogLocks, Extension, ExtensionResource, InstalledExtension, PgCatalog, Pool,
    Resource,
};
use tracing_subscriber::EnvFilter;

use config::Settings;
use error::{CliError, Result};

/// Declaratively manage PostgreSQL extensions.
#[derive(Parser, Debug)]
#[command(name = "pgdecl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, env = "PGDECL_POOL_SIZE", global = true)]
    pool_size: Option<usize>,

    /// Log every statement sent to the server
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Command to run
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Install an extension (no-op if already installed)
    Create {
        name: String,
        /// Schema to install the extension's objects into
        #[arg(long)]
        schema: Option<String>,
        /// Version to install instead of the default
        #[arg(long)]
        version: Option<String>,
    },
    /// Show an installed extension
    Show { name: String },
    /// Check whether an extension is installed
    Exists { name: String },
    /// Move an extension to another schema and/or change its version
    Update {
        name: String,
        #[arg(long)]
        schema: Option<String>,
        /// Target version; an empty string means the default version
        #[arg(long)]
        version: Option<String>,
    },
    /// Update an extension to its default version
    Upgrade { name: String },
    /// Drop an extension
    Drop { name: String },
    /// Adopt an already-installed extension
    Import { name: String },
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pgdecl=debug" } else { "pgdecl=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.database_url, cli.pool_size)?;
    eprintln!("{} {}", "database:".dimmed(), settings.redacted_url());

    let pool = Pool::connect(&settings.database_url, settings.pool_size)?;
    let conn = pool.get().await?;
    let capabilities = Capabilities::detect(&conn).await?;
    tracing::debug!(version = %capabilities.version(), database = pool.database(), "connected");

    let locks = CatalogLocks::new();
    let extensions = ExtensionResource::new(
        PgCatalog::new(conn),
        capabilities,
        locks.for_database(pool.database()),
    );

    match cli.command {
        Commands::Create {
            name,
            schema,
            version,
        } => {
            let desired = Extension {
                name,
                schema,
                version,
            };
            report(&desired.name, extensions.create(&desired).await?);
        }
        Commands::Show { name } => {
            report(&name, extensions.read(&name).await?);
        }
        Commands::Exists { name } => {
            let exists = extensions.exists(&name).await?;
            println!("{}", exists);
        }
        Commands::Update {
            name,
            schema,
            version,
        } => {
            let previous = extensions
                .read(&name)
                .await?
                .ok_or_else(|| CliError::NotInstalled(name.clone()))?;
            let desired = Extension {
                name: name.clone(),
                schema,
                version,
            };
            report(&name, extensions.update(&name, &previous, &desired).await?);
        }
        Commands::Upgrade { name } => {
            report(&name, extensions.upgrade(&name).await?);
        }
        Commands::Drop { name } => {
            extensions.delete(&name).await?;
            println!("{} {}", "dropped".red(), name.bold());
        }
        Commands::Import { name } => {
            let imported = extensions
                .import(&name)
                .await?
                .ok_or_else(|| CliError::NotInstalled(name.clone()))?;
            report(&name, Some(imported));
        }
    }

    Ok(())
}

fn report(name: &str, observed: Option<InstalledExtension>) {
    match observed {
        Some(ext) => println!(
            "{} {} (schema {})",
            ext.name.green().bold(),
            ext.version,
            ext.schema.cyan()
        ),
        None => println!("{} {}", name.bold(), "not installed".yellow()),
    }
}
