//! CLI entry point for cms-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_blog::server::ServerOptions;
use cms_blog::Blog;

#[derive(Parser)]
#[command(name = "cms-blog")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "A static blog generator backed by a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read unpublished content from this preview ref
    #[arg(long, global = true)]
    preview: Option<String>,

    /// Read posts from a JSON fixture file instead of the CMS
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Regenerate the site every N seconds, 0 to disable
        #[arg(short, long, default_value = "86400")]
        revalidate: u64,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List posts, newest first
    List {
        /// Stop after this many listing pages
        #[arg(long)]
        pages: Option<usize>,
    },

    /// Show a single post
    Show {
        /// The post uid
        uid: String,
    },

    /// Clean the public folder
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "cms_blog=debug,info"
    } else {
        "cms_blog=info"
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

    // Secrets usually live in .env next to _config.yml
    if let Err(e) = dotenvy::from_path(base_dir.join(".env")) {
        if !e.not_found() {
            tracing::warn!("Failed to read .env: {}", e);
        }
    }

    let mut blog = Blog::new(&base_dir)?;
    if let Some(preview) = cli.preview {
        blog.config.cms.preview_ref = Some(preview);
    }
    let fixtures = cli.fixtures.as_deref();
    if fixtures.is_some() {
        blog.clear_preview();
    }

    match cli.command {
        Commands::Generate => {
            let source = blog.content_source(fixtures)?;
            tracing::info!("Generating static files...");
            cms_blog::commands::generate::run(&blog, source.as_ref()).await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            revalidate,
            open,
        } => {
            let source = blog.content_source(fixtures)?;

            // Generate first
            tracing::info!("Generating static files...");
            cms_blog::commands::generate::run(&blog, source.as_ref()).await?;

            let options = ServerOptions {
                ip,
                port,
                revalidate: (revalidate > 0).then(|| Duration::from_secs(revalidate)),
                open,
            };
            tracing::info!("Starting server at http://{}:{}", options.ip, options.port);
            cms_blog::server::start(&blog, source, options).await?;
        }

        Commands::List { pages } => {
            let source = blog.content_source(fixtures)?;
            cms_blog::commands::list::run(&blog, source.as_ref(), pages).await?;
        }

        Commands::Show { uid } => {
            let source = blog.content_source(fixtures)?;
            cms_blog::commands::show::run(&blog, source.as_ref(), &uid).await?;
        }

        Commands::Clean => {
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }
    }

    Ok(())
}
