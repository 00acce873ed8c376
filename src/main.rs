//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio::{commands, server, Folio};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Rolwin Monteiro")]
#[command(version = "0.1.0")]
#[command(about = "A fast static site generator for personal blogs and portfolios", long_about = None)]
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
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Build the site into the public directory
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

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the public directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

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

    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing folio site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized empty folio site in {:?}", target_dir);
        }

        Commands::New { title } => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            commands::new::run(&folio, &title)?;
        }

        Commands::Build { watch } => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Building site...");
            folio.build()?;
            println!("Build finished.");

            if watch {
                commands::build::watch(&folio).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let folio = Folio::new(&base_dir)?;

            tracing::info!("Building site...");
            folio.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&folio, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let folio = Folio::new(&base_dir)?;
            commands::list::run(&folio, &r#type)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
