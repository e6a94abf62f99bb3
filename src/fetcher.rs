use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::PageError;
use crate::parser::{self, fragments::Document, record::Record};
use crate::settings::Settings;

/// Per-URL result of a batch. A failed page never stops the batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    #[serde(rename = "ok")]
    Parsed { record: Record },
    Failed { url: String, reason: String },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Parsed { record } => &record.url,
            PageOutcome::Failed { url, .. } => url,
        }
    }
}

/// Scrape stats returned after completion.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Fetcher { client }
    }

    /// GET `url` and parse the body. Non-2xx answers are errors.
    pub async fn fetch_document(&self, url: &str) -> Result<Document, PageError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|source| {
            if source.is_builder() {
                PageError::InvalidUrl { url: url.to_string(), source }
            } else {
                PageError::Transport { url: url.to_string(), source }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| PageError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(url, bytes = body.len(), latency_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(Document::parse(&body))
    }

    /// Fetch one review and assemble its record.
    pub async fn scrape_review(&self, url: &str) -> PageOutcome {
        match self.fetch_document(url).await {
            Ok(doc) => {
                let record = parser::process_page(url, &doc);
                debug!(url, found = record.found_count(), "assembled");
                PageOutcome::Parsed { record }
            }
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                PageOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Scrape reviews one after another, in input order.
    pub async fn scrape_reviews(&self, urls: &[String]) -> Result<(Vec<PageOutcome>, ScrapeStats)> {
        let total = urls.len();
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta}) {wide_msg}")?
                .progress_chars("=> "),
        );

        let mut outcomes = Vec::with_capacity(total);
        let mut stats = ScrapeStats {
            total,
            ..Default::default()
        };

        for url in urls {
            let outcome = self.scrape_review(url).await;
            pb.set_message(outcome.url().to_string());
            match outcome {
                PageOutcome::Parsed { .. } => stats.ok += 1,
                PageOutcome::Failed { .. } => stats.errors += 1,
            }
            outcomes.push(outcome);
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!("Scraped {} pages ({} ok, {} errors)", stats.total, stats.ok, stats.errors);

        Ok((outcomes, stats))
    }
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parser::record::Field;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned `(path, status, body)` answers on a local port; unknown
    /// paths get a 404. Returns the base url.
    pub(crate) async fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, String::new()));
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    pub(crate) fn local_fetcher() -> Fetcher {
        Fetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_parses_review() {
        let base = serve(vec![("/howards-end/", 200, fixture("wiedersehen-in-howards-end-4k-uhd"))]).await;
        let url = format!("{}/howards-end/", base);

        match local_fetcher().scrape_review(&url).await {
            PageOutcome::Parsed { record } => {
                assert_eq!(record.url, url);
                assert_eq!(record.get(Field::Director).as_str(), "James Ivory");
                assert_eq!(record.get(Field::PictureQuality).as_str(), "80%");
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = serve(vec![("/gone/", 410, String::new())]).await;
        let err = local_fetcher()
            .fetch_document(&format!("{}/gone/", base))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PageError::Status { status: 410, .. }));
    }

    #[tokio::test]
    async fn invalid_url_is_an_error() {
        let err = local_fetcher().fetch_document("not a url").await.err().unwrap();
        assert!(matches!(err, PageError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn batch_continues_past_broken_pages() {
        let base = serve(vec![
            ("/coco/", 200, fixture("coco-4k-uhd")),
            ("/howards-end/", 200, fixture("wiedersehen-in-howards-end-4k-uhd")),
        ])
        .await;
        let urls = vec![
            format!("{}/coco/", base),
            format!("{}/missing/", base),
            format!("{}/howards-end/", base),
        ];

        let (outcomes, stats) = local_fetcher().scrape_reviews(&urls).await.unwrap();
        assert_eq!(stats, ScrapeStats { total: 3, ok: 2, errors: 1 });
        let seen: Vec<&str> = outcomes.iter().map(|o| o.url()).collect();
        assert_eq!(seen, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(matches!(&outcomes[1], PageOutcome::Failed { reason, .. } if reason.contains("404")));
    }

    #[test]
    fn outcome_json_shape() {
        let failed = PageOutcome::Failed {
            url: "https://example.com/x".into(),
            reason: "boom".into(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["url"], "https://example.com/x");

        let ok = PageOutcome::Parsed {
            record: parser::record::assemble("t", "u", &Default::default()),
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["record"]["fields"]["director"], "?");
    }
}
