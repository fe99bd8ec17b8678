//! CLI entry point for galley

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "galley")]
#[command(version = "0.1.0")]
#[command(about = "A Jekyll-flavored static site generator for personal blogs", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new post
        title: String,

        /// Path for the new file, relative to its layout directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Watch for file changes and rebuild
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the site locally with live reload
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Address to bind to
        #[arg(short, long, default_value = "localhost")]
        bind: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve files only, without watching or live reload
        #[arg(long)]
        no_watch: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, page, category)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "galley=debug,info"
    } else {
        "galley=info"
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
        Commands::Init { dir } => {
            let target_dir = if dir.is_absolute() {
                dir
            } else {
                base_dir.join(dir)
            };
            galley::commands::init::run(&target_dir)?;
            println!("Initialized new site in {}", target_dir.display());
        }

        Commands::New {
            layout,
            title,
            path,
        } => {
            let site = galley::Galley::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            galley::commands::new::run(&site, &title, &layout, path.as_deref())?;
        }

        Commands::Build { watch } => {
            let site = galley::Galley::new(&base_dir)?;

            galley::commands::build::run(&site)?;

            if watch {
                tracing::info!("Watching for file changes...");
                galley::commands::build::watch(&site)?;
            }
        }

        Commands::Serve {
            port,
            bind,
            open,
            no_watch,
        } => {
            let site = galley::Galley::new(&base_dir)?;

            // Build first so there is something to serve
            galley::commands::build::run(&site)?;

            galley::server::start(&site, &bind, port, !no_watch, open).await?;
        }

        Commands::Clean => {
            let site = galley::Galley::new(&base_dir)?;
            galley::commands::clean::run(&site)?;
        }

        Commands::List { r#type } => {
            let site = galley::Galley::new(&base_dir)?;
            galley::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("galley version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
