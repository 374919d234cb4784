//! sitesnap CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sitesnap::{
    commands::{cmd_clone, cmd_crawl, cmd_download, cmd_init, print_crawl_result},
    config::Config,
    error::{Error, Result},
};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sitesnap")]
#[command(version, about = "Snapshot websites and generate page clones", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Crawl a site breadth-first and print the normalized pages
    Crawl {
        /// Seed URL
        url: String,

        /// Override the page cap from the config
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Render a page in a headless browser and generate a clone of it
    Clone {
        /// Page to clone
        url: String,

        /// Write the generated HTML to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a single page with absolutized references and save it
    Download {
        /// Page to download
        url: String,

        /// Output file
        #[arg(short, long, default_value = sitesnap::models::DOWNLOAD_FILENAME)]
        output: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if e.kind().status_code() == 500 {
            error!("{}", e);
        }
        eprintln!("Error: {}", e.public_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => handle_init(cli.config, force),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sitesnap", &mut std::io::stdout());
            Ok(())
        }
        Commands::Crawl { url, max_pages } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(max_pages) = max_pages {
                config.crawl.max_pages = max_pages;
                config.validate()?;
            }

            let result = cmd_crawl(&config, &url).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_crawl_result(&result);
            }
            Ok(())
        }
        Commands::Clone { url, output } => {
            let config = load_config(cli.config.as_deref())?;
            let result = cmd_clone(&config, &url).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(path) = output {
                std::fs::write(&path, &result.generated_html)?;
                println!("✓ Clone of {} written to {}", result.source_url, path.display());
            } else {
                println!("{}", result.generated_html);
            }
            Ok(())
        }
        Commands::Download { url, output } => {
            let config = load_config(cli.config.as_deref())?;
            let page = cmd_download(&config, &url).await?;
            std::fs::write(&output, &page.html)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": output.display().to_string(),
                        "content_type": page.content_type,
                        "content_disposition": page.content_disposition(),
                        "bytes": page.html.len(),
                    })
                );
            } else {
                println!("✓ Saved {} ({} bytes)", output.display(), page.html.len());
            }
            Ok(())
        }
    }
}

fn handle_init(config: Option<PathBuf>, force: bool) -> Result<()> {
    // A .toml path names the file itself; anything else names its directory
    let config_file = config.map(|path| {
        if path.extension().map_or(false, |e| e == "toml") {
            path
        } else {
            path.join("config.toml")
        }
    });

    let config_path = cmd_init(config_file, force)?;

    println!("✓ sitesnap initialized successfully");
    println!("  Config: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config file to customize settings");
    println!("  2. Export OPENAI_API_KEY (or set generation.api_key) for 'sitesnap clone'");
    println!("  3. Crawl a site: sitesnap crawl https://example.com");

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load(path),
        Some(path) => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        None => Config::load_from(None),
    }
}
