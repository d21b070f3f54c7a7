//! CLI entry point for cms-preview

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_preview::{commands, Preview};

#[derive(Parser)]
#[command(name = "cms-preview")]
#[command(version)]
#[command(about = "Preview CMS content with allowlisted iframe embeds", long_about = None)]
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
    /// Initialize a new preview site with sample posts
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, featured)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print the rendered body of one post
    Render {
        /// Post slug or id
        id: String,
    },

    /// Report every embed and whether it is allowed
    Check {
        /// Fail if any embed is blocked or invalid
        #[arg(long)]
        strict: bool,
    },

    /// Generate static preview pages
    #[command(alias = "g")]
    Generate,

    /// Start the preview server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Enable static mode (no content reload)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "cms_preview=debug,info"
    } else {
        "cms_preview=info"
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
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing preview site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized preview site in {:?}", target_dir);
        }

        Commands::List { r#type } => {
            let preview = Preview::new(&base_dir)?;
            commands::list::run(&preview, &r#type)?;
        }

        Commands::Render { id } => {
            let preview = Preview::new(&base_dir)?;
            commands::render::run(&preview, &id)?;
        }

        Commands::Check { strict } => {
            let preview = Preview::new(&base_dir)?;
            commands::check::run(&preview, strict)?;
        }

        Commands::Generate => {
            let preview = Preview::new(&base_dir)?;
            tracing::info!("Generating static files...");
            preview.generate()?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, r#static } => {
            let preview = Preview::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            cms_preview::server::start(&preview, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let preview = Preview::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            preview.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("cms-preview version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
