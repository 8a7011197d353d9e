use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::{ExtractorError, Result};

/// Raw article text plus the fetch metadata carried into the response body.
/// Owned by one pipeline invocation, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

/// Fetches the referenced document and reduces it to text. Implementations
/// must bound the fetch with a timeout so a slow origin cannot pin a worker.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Article>;
}

/// HTTP fetcher. The client is built once and shared across requests; its
/// timeout covers the whole exchange.
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kew/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExtractorError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self, url: &Url) -> Result<Article> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ExtractorError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::Fetch(format!("origin returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractorError::Fetch(e.to_string()))?;

        let (title, text) = extract_content(&body);

        Ok(Article {
            url: url.to_string(),
            title,
            text,
        })
    }
}

/// Title plus paragraph text. Parsing stays in this sync helper; the parsed
/// document is not `Send` and must not live across an await point.
fn extract_content(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| normalize(&el.text().collect::<String>()))
        })
        .filter(|t| !t.is_empty());

    let mut text = String::new();
    if let Ok(sel) = Selector::parse("p") {
        let paragraphs: Vec<String> = document
            .select(&sel)
            .map(|el| normalize(&el.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .collect();
        text = paragraphs.join("\n");
    }

    // Documents without <p> markup still carry their text in the body.
    if text.is_empty() {
        if let Ok(sel) = Selector::parse("body") {
            if let Some(body) = document.select(&sel).next() {
                text = normalize(&body.text().collect::<String>());
            }
        }
    }

    (title, text)
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
