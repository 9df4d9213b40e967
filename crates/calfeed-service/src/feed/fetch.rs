//! The fetch seam and its HTTP implementation.

use calfeed_core::constants::USER_AGENT;
use std::time::Duration;

use crate::error::FetchError;

/// Retrieves the text of a feed by URL.
pub trait FeedFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Fetches feeds over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    http: reqwest::Client,
}

impl HttpFeedFetcher {
    /// ## Summary
    /// Creates a fetcher whose requests give up after `timeout`.
    ///
    /// ## Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl FeedFetcher for HttpFeedFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = normalize_feed_url(url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "text/calendar, */*;q=0.5")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        tracing::debug!(bytes = body.len(), "Fetched feed");

        Ok(body)
    }
}

/// ## Summary
/// Trims the URL and rewrites the `webcal://` scheme to `https://`.
#[must_use]
pub fn normalize_feed_url(url: &str) -> String {
    let url = url.trim();
    match url.get(..9) {
        Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &url[9..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_feed_url() {
        assert_eq!(
            normalize_feed_url("webcal://example.com/cal.ics"),
            "https://example.com/cal.ics"
        );
        assert_eq!(
            normalize_feed_url("  WEBCAL://example.com/cal.ics "),
            "https://example.com/cal.ics"
        );
        assert_eq!(
            normalize_feed_url("https://example.com/cal.ics"),
            "https://example.com/cal.ics"
        );
        assert_eq!(normalize_feed_url("webcal:"), "webcal:");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFeedFetcher::new(Duration::from_secs(5)).is_ok());
    }
}
