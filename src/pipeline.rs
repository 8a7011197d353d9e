use std::sync::Arc;
use tracing::debug;

use crate::client_key::ClientKey;
use crate::error::{ExtractorError, Result};
use crate::fetcher::ArticleFetcher;
use crate::keywords::KeywordExtractor;
use crate::language::{self, LanguageDetector};
use crate::rate_limiter::{now_ms, RateLimiter};
use crate::response::ExtractionResponse;
use crate::validation::RequestValidator;

/// Sequences one request through validation, admission control and the
/// extraction collaborators, short-circuiting on the first failure. Stage
/// order is fixed: the local URL check runs before any I/O, the admission
/// check runs before the fetch so throttled clients never trigger downstream
/// work, and the language gate runs before the heavier extraction call.
pub struct Pipeline {
    rate_limiter: RateLimiter,
    fetcher: Arc<dyn ArticleFetcher>,
    detector: Arc<dyn LanguageDetector>,
    extractor: KeywordExtractor,
}

impl Pipeline {
    pub fn new(
        rate_limiter: RateLimiter,
        fetcher: Arc<dyn ArticleFetcher>,
        detector: Arc<dyn LanguageDetector>,
        extractor: KeywordExtractor,
    ) -> Self {
        Self {
            rate_limiter,
            fetcher,
            detector,
            extractor,
        }
    }

    pub async fn run(&self, raw_url: Option<&str>, client: &ClientKey) -> Result<ExtractionResponse> {
        let url = RequestValidator::validate_url(raw_url)?;
        debug!(url = %url, "url validated");

        if !self.rate_limiter.check_and_record(client, now_ms()).await? {
            debug!(client = %client, "admission rejected");
            return Err(ExtractorError::RateLimitExceeded);
        }

        let article = self.fetcher.fetch(&url).await?;
        debug!(url = %url, chars = article.text.len(), "article fetched");

        let locale = self.detector.detect(&article.text);
        let profile = language::resolve_profile(locale.as_deref())?;
        debug!(?profile, "language resolved");

        let keywords = self.extractor.extract(&article.text, profile);
        debug!(count = keywords.len(), "keywords extracted");

        Ok(ExtractionResponse { keywords, article })
    }

    pub async fn store_available(&self) -> bool {
        self.rate_limiter.store_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::Article;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use url::Url;

    struct StubFetcher {
        text: &'static str,
    }

    #[async_trait]
    impl ArticleFetcher for StubFetcher {
        async fn fetch(&self, url: &Url) -> Result<Article> {
            Ok(Article {
                url: url.to_string(),
                title: Some("Stub article".to_string()),
                text: self.text.to_string(),
            })
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ArticleFetcher for FailingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Article> {
            Err(ExtractorError::Fetch("connection refused".to_string()))
        }
    }

    struct FixedDetector(Option<&'static str>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn pipeline(
        max_requests: u32,
        fetcher: Arc<dyn ArticleFetcher>,
        detector: FixedDetector,
    ) -> Pipeline {
        Pipeline::new(
            RateLimiter::new(Arc::new(MemoryStore::new()), max_requests, 60),
            fetcher,
            Arc::new(detector),
            KeywordExtractor::new(0.25),
        )
    }

    fn stub_fetcher() -> Arc<dyn ArticleFetcher> {
        Arc::new(StubFetcher {
            text: "keyword keyword keyword extraction extraction pipeline",
        })
    }

    #[tokio::test]
    async fn successful_run_returns_ranked_keywords_and_article() {
        let pipeline = pipeline(6, stub_fetcher(), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.10");

        let response = pipeline
            .run(Some("http://example.com/article"), &client)
            .await
            .unwrap();

        assert_eq!(response.article.url, "http://example.com/article");
        assert_eq!(response.keywords[0].term, "keyword");
        assert!((response.keywords[0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_url_fails_before_anything_else() {
        let pipeline = pipeline(6, stub_fetcher(), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.11");

        let result = pipeline.run(None, &client).await;
        assert!(matches!(result, Err(ExtractorError::MissingUrl)));
    }

    #[tokio::test]
    async fn exhausted_quota_rejects_with_rate_limit() {
        let pipeline = pipeline(1, stub_fetcher(), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.12");

        pipeline
            .run(Some("http://example.com/a"), &client)
            .await
            .unwrap();

        let result = pipeline.run(Some("http://example.com/b"), &client).await;
        assert!(matches!(result, Err(ExtractorError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn validation_precedes_admission_control() {
        let pipeline = pipeline(1, stub_fetcher(), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.13");

        pipeline
            .run(Some("http://example.com/a"), &client)
            .await
            .unwrap();

        // Quota is gone, but the malformed URL must still win.
        let result = pipeline.run(Some("ftp://example.com"), &client).await;
        assert!(matches!(result, Err(ExtractorError::MalformedUrl)));
    }

    #[tokio::test]
    async fn undetected_language_terminates_the_pipeline() {
        let pipeline = pipeline(6, stub_fetcher(), FixedDetector(None));
        let client = ClientKey::from_ip("192.0.2.14");

        let result = pipeline.run(Some("http://example.com"), &client).await;
        assert!(matches!(result, Err(ExtractorError::UnsupportedLanguage)));
    }

    #[tokio::test]
    async fn unsupported_language_terminates_the_pipeline() {
        let pipeline = pipeline(6, stub_fetcher(), FixedDetector(Some("de")));
        let client = ClientKey::from_ip("192.0.2.15");

        let result = pipeline.run(Some("http://example.com"), &client).await;
        assert!(matches!(result, Err(ExtractorError::UnsupportedLanguage)));
    }

    #[tokio::test]
    async fn fetch_failures_propagate_unmapped() {
        let pipeline = pipeline(6, Arc::new(FailingFetcher), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.16");

        let result = pipeline.run(Some("http://example.com"), &client).await;
        assert!(matches!(result, Err(ExtractorError::Fetch(_))));
    }

    #[tokio::test]
    async fn rejected_attempts_still_consume_window_slots() {
        let pipeline = pipeline(2, Arc::new(FailingFetcher), FixedDetector(Some("en")));
        let client = ClientKey::from_ip("192.0.2.17");

        // Both admitted attempts fail at the fetch stage, but their
        // admissions were charged at arrival.
        for _ in 0..2 {
            let result = pipeline.run(Some("http://example.com"), &client).await;
            assert!(matches!(result, Err(ExtractorError::Fetch(_))));
        }

        let result = pipeline.run(Some("http://example.com"), &client).await;
        assert!(matches!(result, Err(ExtractorError::RateLimitExceeded)));
    }
}
