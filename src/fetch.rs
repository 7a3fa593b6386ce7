use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::Html;
use sha2::{Digest, Sha256};
use tracing::warn;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("benchwatch/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// Visible text of a loaded page, one line per rendered text run.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub text: String,
}

/// Loads a URL and returns its rendered text. The rest of the pipeline only
/// sees this seam, never page structure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RenderedPage>;
}

pub struct HttpPageFetcher {
    page_dump: Option<PathBuf>,
}

impl HttpPageFetcher {
    pub fn new(page_dump: Option<PathBuf>) -> Self {
        Self { page_dump }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<RenderedPage> {
        let response = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed GET request: {url}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed reading response body: {url}"))?;
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(anyhow!("GET {url} returned {status}: {preview}"));
        }

        let text = html_to_text(&body);
        if let Some(path) = &self.page_dump {
            // Write-only diagnostic; never worth failing a cycle over.
            if let Err(err) = fs::write(path, &text) {
                warn!("failed writing page dump {}: {err}", path.display());
            }
        }
        Ok(RenderedPage {
            url: url.to_string(),
            text,
        })
    }
}

/// Reduce an HTML document to its visible text, one line per text node.
/// Script, style and noscript content is dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| matches!(element.name(), "script" | "style" | "noscript"))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    lines.join("\n")
}

pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
