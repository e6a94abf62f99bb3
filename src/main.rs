mod error;
mod fetcher;
mod index;
mod parser;
mod report;
mod settings;

use std::time::Instant;

use clap::{Parser, Subcommand};

use fetcher::{Fetcher, PageOutcome};
use settings::Settings;

#[derive(Parser)]
#[command(name = "bdr_scraper", about = "4K UHD review metadata scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover reviews on the index page, scrape and print all of them
    Run {
        /// Index page listing the reviews (default: BDR_INDEX_URL or built-in)
        #[arg(long)]
        index_url: Option<String>,
        /// Anchor text marking a review link
        #[arg(long)]
        link_text: Option<String>,
        /// Max reviews to scrape (default: all discovered)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Scrape a single review page
    Page {
        url: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Dump the text fragments a selector yields on one page
    Fragments {
        url: String,
        #[arg(short, long, default_value = "p")]
        selector: String,
    },
    /// List review URLs found on the index page
    Links {
        #[arg(long)]
        index_url: Option<String>,
        #[arg(long)]
        link_text: Option<String>,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// One JSON object per line instead of text
    #[arg(long, conflicts_with = "table")]
    json: bool,
    /// Compact table instead of one block per review
    #[arg(long)]
    table: bool,
}

impl OutputArgs {
    fn print(&self, outcomes: &[PageOutcome]) -> anyhow::Result<()> {
        if self.json {
            report::print_json(outcomes)?;
        } else if self.table {
            report::print_table(outcomes)?;
        } else {
            report::print_records(outcomes)?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    let fetcher = Fetcher::new(&settings)?;

    let result = match cli.command {
        Commands::Run {
            index_url,
            link_text,
            limit,
            output,
        } => {
            let index_url = index_url.unwrap_or(settings.index_url);
            let link_text = link_text.unwrap_or(settings.link_text);
            let mut urls = index::fetch_review_urls(&fetcher, &index_url, &link_text).await?;
            if urls.is_empty() {
                println!("No review links containing {:?} on {}.", link_text, index_url);
                return Ok(());
            }
            if let Some(n) = limit {
                urls.truncate(n);
            }

            eprintln!("Scraping {} reviews...", urls.len());
            let (outcomes, stats) = fetcher.scrape_reviews(&urls).await?;
            output.print(&outcomes)?;
            eprintln!(
                "Done: {} scraped ({} ok, {} errors).",
                stats.total, stats.ok, stats.errors
            );
            Ok(())
        }
        Commands::Page { url, output } => {
            let outcome = fetcher.scrape_review(&url).await;
            output.print(std::slice::from_ref(&outcome))?;
            Ok(())
        }
        Commands::Fragments { url, selector } => {
            let doc = fetcher.fetch_document(&url).await?;
            let fragments = doc.select_fragments(&selector)?;
            for (i, fragment) in fragments.iter().enumerate() {
                println!("{:4} : {}", i, fragment);
            }
            eprintln!("{} fragments", fragments.len());
            Ok(())
        }
        Commands::Links {
            index_url,
            link_text,
        } => {
            let index_url = index_url.unwrap_or(settings.index_url);
            let link_text = link_text.unwrap_or(settings.link_text);
            let urls = index::fetch_review_urls(&fetcher, &index_url, &link_text).await?;
            for url in &urls {
                println!("{}", url);
            }
            eprintln!("{} review links", urls.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
