use anyhow::{Context, Result};
use reqwest::Url;
use tracing::info;

use crate::fetcher::Fetcher;

/// Fetch the review index page and return the review URLs it links to.
pub async fn fetch_review_urls(fetcher: &Fetcher, index_url: &str, link_text: &str) -> Result<Vec<String>> {
    let base = Url::parse(index_url).with_context(|| format!("Invalid index url {}", index_url))?;

    info!("Fetching review index: {}", index_url);
    let doc = fetcher
        .fetch_document(index_url)
        .await
        .context("Failed to fetch review index")?;

    let urls: Vec<String> = doc
        .links_containing(link_text, Some(&base))
        .into_iter()
        .filter(|url| url.as_str() != base.as_str())
        .collect();

    info!("Review links containing {:?}: {}", link_text, urls.len());
    Ok(urls)
}
