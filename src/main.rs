use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mangashelf::backend::LibraryApi;
use mangashelf::chapters::{clean_manga_title, extract_chapter_number, format_chapter_display};
use mangashelf::extractors::{engine, HtmlPage};
use mangashelf::models::{ProgressUpdate, ReadingStatus};
use mangashelf::traits::LibraryBackend;
use mangashelf::{Config, MetadataService};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mangashelf")]
#[command(about = "Manga metadata extraction and reading-progress tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "mangashelf.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported websites in match order
    Sites,
    /// Show how a URL is classified
    Inspect { url: String },
    /// Print the script that would be injected for a URL
    Script { url: String },
    /// Run a site's extraction against a saved HTML page
    Extract {
        url: String,
        /// Saved page HTML
        #[arg(long)]
        html: PathBuf,
    },
    /// Parse and validate a page reply (reads stdin when no file is given)
    Parse { file: Option<PathBuf> },
    /// Extract the chapter number from a reader URL
    Chapter {
        url: String,
        /// Page title used when the URL has no chapter number
        #[arg(long)]
        title: Option<String>,
    },
    /// Strip site names and chapter suffixes from a title
    CleanTitle { title: String },
    /// Record reading progress for a library entry
    Progress { entry_id: String, url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    debug!("Loaded configuration: {:?}", config);

    let service = MetadataService::new(config.extraction.clone());

    match cli.command {
        Commands::Sites => {
            println!("{:<4} {:<15}", "#", "Website");
            println!("{}", "-".repeat(20));
            for (index, site) in service.supported_websites().iter().enumerate() {
                println!("{:<4} {:<15}", index + 1, site);
            }
        }
        Commands::Inspect { url } => {
            let adapter = service.extractor_for_url(&url);
            println!("URL:          {}", url);
            println!("Adapter:      {}", adapter.map(|a| a.name()).unwrap_or("none"));
            println!("Extractable:  {}", service.is_extractable(&url));
            println!("Chapter page: {}", service.is_chapter_page(&url));
            if let Some(series) = service.series_url_for(&url) {
                println!("Series URL:   {}", series);
            }
            if let Some(chapter) = extract_chapter_number(&url, None) {
                println!("Chapter:      {}", format_chapter_display(&chapter));
            }
        }
        Commands::Script { url } => match service.injection_script(&url) {
            Some(script) => println!("{}", script),
            None => bail!("no extraction script for {}", url),
        },
        Commands::Extract { url, html } => {
            let Some(adapter) = service.extractor_for_url(&url) else {
                bail!("website not supported: {}", url);
            };
            let content = tokio::fs::read_to_string(&html)
                .await
                .with_context(|| format!("failed to read {}", html.display()))?;

            info!("Extracting {} with {} adapter", url, adapter.name());
            let page = HtmlPage::parse(url.as_str(), &content);
            let reply = engine::evaluate_to_message(adapter.plan(), &page);

            match service.parse_and_validate(&reply) {
                Some(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
                None => bail!("no usable metadata in page, raw result: {}", reply),
            }
        }
        Commands::Parse { file } => {
            let raw = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            match service.parse_and_validate(&raw) {
                Some(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
                None => bail!("reply rejected"),
            }
        }
        Commands::Chapter { url, title } => match extract_chapter_number(&url, title.as_deref()) {
            Some(chapter) => println!("{}", chapter),
            None => bail!("no chapter number found in {}", url),
        },
        Commands::CleanTitle { title } => println!("{}", clean_manga_title(&title)),
        Commands::Progress { entry_id, url } => {
            let Some(chapter) = extract_chapter_number(&url, None) else {
                bail!("no chapter number found in {}", url);
            };
            let api = LibraryApi::new(&config.backend)?;
            let update = ProgressUpdate {
                last_read_url: url,
                current_chapter: chapter,
                status: ReadingStatus::Reading,
            };
            let entry = api.update_progress(&entry_id, &update).await?;
            println!(
                "{} -> {} ({}%)",
                entry.id,
                format_chapter_display(&entry.current_chapter),
                entry.progress
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("mangashelf={}", level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
