use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/100.0.4896.75 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// HTTP client for the crawl loops. Owned by the orchestrator and
/// passed down explicitly; one per site worker.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }

    /// Fetch a page body. Timeouts are retried indefinitely with a
    /// fixed short delay; other transport errors propagate.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        for attempt in 1.. {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let text = resp
                        .text()
                        .await
                        .with_context(|| format!("failed to read body of {}", url))?;
                    return Ok(text);
                }
                Err(e) if e.is_timeout() => {
                    warn!("Timeout: {} (try {})", url, attempt);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("request failed: {}", url));
                }
            }
        }
        unreachable!("retry loop only exits by return")
    }
}
