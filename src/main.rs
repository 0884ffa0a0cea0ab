//! CLI entry point for postdeck

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postdeck::commands::check::OutputFormat;
use postdeck::Site;

#[derive(Parser)]
#[command(name = "postdeck")]
#[command(version)]
#[command(about = "Load, lint and publish a collection of Markdown posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
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

    /// Create a new post from the archetype
    New {
        /// Title of the new post
        title: String,

        /// Slug (defaults to the slugified title)
        #[arg(short, long)]
        slug: Option<String>,

        /// Write the post with `draft = false`
        #[arg(long)]
        publish: bool,
    },

    /// Generate the static site
    #[command(alias = "b")]
    Build {
        /// Include drafts
        #[arg(short = 'D', long)]
        drafts: bool,

        /// Include posts dated in the future
        #[arg(short = 'F', long)]
        future: bool,

        /// Regenerate on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Lint front matter across the collection
    #[command(alias = "lint")]
    Check {
        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// List site content
    List {
        /// Type of content to list (post, draft, slug, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Build, then serve the output with live reload
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "1313")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Include drafts
        #[arg(short = 'D', long)]
        drafts: bool,

        /// Serve without watching for changes
        #[arg(long)]
        r#static: bool,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Remove the output directory
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "postdeck=debug,info"
    } else {
        "postdeck=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            postdeck::commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {:?}", target_dir);
        }

        Commands::New {
            title,
            slug,
            publish,
        } => {
            let site = Site::new(&base_dir)?;
            let path =
                postdeck::commands::new::create_post(&site, &title, slug.as_deref(), !publish)?;
            println!("Created {:?}", path);
        }

        Commands::Build {
            drafts,
            future,
            watch,
        } => {
            let mut site = Site::new(&base_dir)?;
            site.config.build_drafts |= drafts;
            site.config.build_future |= future;

            site.generate()?;
            println!("Generated successfully!");

            if watch {
                tokio::task::spawn_blocking(move || postdeck::commands::build::watch(&site))
                    .await??;
            }
        }

        Commands::Check { format, strict } => {
            let site = Site::new(&base_dir)?;
            postdeck::commands::check::run(&site, format, strict)?;
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            postdeck::commands::list::run(&site, &r#type)?;
        }

        Commands::Serve {
            port,
            ip,
            drafts,
            r#static,
            open,
        } => {
            let mut site = Site::new(&base_dir)?;
            site.config.build_drafts |= drafts;

            site.generate()?;
            postdeck::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("postdeck version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
