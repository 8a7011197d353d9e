use crate::error::{ExtractorError, Result};
use url::Url;

/// Checks presence and scheme of the requested URL. Runs before any network
/// or store access and has no side effects.
pub struct RequestValidator;

impl RequestValidator {
    /// `MissingUrl` when the parameter is absent, `MalformedUrl` when the
    /// value does not parse as a URL or its scheme is not http/https.
    /// Schemes compare case-insensitively; `Url` normalizes them to
    /// lowercase.
    pub fn validate_url(raw: Option<&str>) -> Result<Url> {
        let raw = raw.ok_or(ExtractorError::MissingUrl)?;
        let url = Url::parse(raw).map_err(|_| ExtractorError::MalformedUrl)?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ExtractorError::MalformedUrl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameter_is_missing_url() {
        assert!(matches!(
            RequestValidator::validate_url(None),
            Err(ExtractorError::MissingUrl)
        ));
    }

    #[test]
    fn unparseable_value_is_malformed() {
        assert!(matches!(
            RequestValidator::validate_url(Some("not a url")),
            Err(ExtractorError::MalformedUrl)
        ));
        assert!(matches!(
            RequestValidator::validate_url(Some("example.com/article")),
            Err(ExtractorError::MalformedUrl)
        ));
    }

    #[test]
    fn disallowed_scheme_is_malformed() {
        assert!(matches!(
            RequestValidator::validate_url(Some("ftp://example.com")),
            Err(ExtractorError::MalformedUrl)
        ));
        assert!(matches!(
            RequestValidator::validate_url(Some("file:///etc/passwd")),
            Err(ExtractorError::MalformedUrl)
        ));
    }

    #[test]
    fn http_and_https_pass_regardless_of_case() {
        assert!(RequestValidator::validate_url(Some("http://example.com")).is_ok());
        assert!(RequestValidator::validate_url(Some("https://example.com/article?id=1")).is_ok());
        assert!(RequestValidator::validate_url(Some("HTTP://EXAMPLE.COM")).is_ok());
        assert!(RequestValidator::validate_url(Some("HtTpS://example.com")).is_ok());
    }

    #[test]
    fn validation_is_idempotent() {
        for raw in ["http://example.com", "ftp://example.com", "nonsense"] {
            let first = RequestValidator::validate_url(Some(raw)).is_ok();
            let second = RequestValidator::validate_url(Some(raw)).is_ok();
            assert_eq!(first, second);
        }
    }
}
