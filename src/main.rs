//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "SeungHo Choi")]
#[command(version)]
#[command(about = "A personal portfolio site: live server or pre-rendered static pages", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-render every page into the output directory
    #[command(alias = "g")]
    Generate {
        /// Output directory (defaults to `public_dir` from _config.yml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start the live server
    #[command(alias = "s")]
    Server {
        /// Port to listen on [default: 8000]
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to [default: localhost]
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Delete the output directory
    Clean,

    /// List portfolio content
    List {
        /// Type of content to list (projects, experience, skills)
        #[arg(default_value = "projects")]
        r#type: String,
    },

    /// Create a markdown overlay for a project
    New {
        /// Project id
        id: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate { output, watch } => {
            let mut folio = folio::Folio::new(&base_dir)?;
            if let Some(output) = output {
                folio.public_dir = if output.is_absolute() {
                    output
                } else {
                    base_dir.join(output)
                };
            }

            tracing::info!("Generating static files...");
            folio::commands::generate::run(&folio)?;
            println!("Generated successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                folio::commands::generate::watch(&folio).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let folio = folio::Folio::new(&base_dir)?;
            let port = port.unwrap_or(folio.config.server.port);
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&folio, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let folio = folio::Folio::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&folio, &r#type)?;
        }

        Commands::New { id } => {
            let folio = folio::Folio::new(&base_dir)?;
            tracing::info!("Creating overlay for project {}", id);
            folio::commands::new::run(&folio, &id)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
