use serde::Serialize;

use crate::fetcher::Article;
use crate::keywords::Keyword;

/// Body of a successful extraction: the ranked keyword sequence plus the
/// fetched article. Built once per request and discarded after send.
#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    pub keywords: Vec<Keyword>,
    pub article: Article,
}
