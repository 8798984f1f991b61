use std::time::Duration;

use rand::Rng;
use reqwest::{header, Client, Response};
use tracing::{debug, warn};

use crate::parse::{listing_url_from_link_header, user_agent_from_page};
use crate::{info_time, Config, Error, Result};

/// A `Client` plus the browser identity every request is sent with.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agent: String,
}

impl Fetcher {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let res = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        Ok(res)
    }

    /// Requests a page and returns its body as text, whatever the status.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let html = self.get(url).await?.text().await?;
        Ok(html)
    }

    /// Requests a file and returns its bytes. Anything other than a 2xx is an error, so an
    /// error page is never saved under a pamphlet's name.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let res = self.get(url).await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(res.bytes().await?.to_vec())
    }
}

/// Fetches the current Chrome user-agent string from useragentstring.com.
///
/// Never fails: a transport error, a non-200 answer or a page without an entry all fall
/// back to `config.fallback_user_agent`.
pub async fn resolve_user_agent(client: &Client, config: &Config) -> String {
    match fetch_user_agent(client, &config.user_agent_source).await {
        Ok(Some(agent)) => {
            info_time!("Using user agent: {agent}");
            agent
        }
        Ok(None) => {
            warn!(source = %config.user_agent_source, "no user agent on page, using fallback");
            config.fallback_user_agent.clone()
        }
        Err(err) => {
            warn!(source = %config.user_agent_source, %err, "user agent lookup failed, using fallback");
            config.fallback_user_agent.clone()
        }
    }
}

async fn fetch_user_agent(client: &Client, source: &str) -> Result<Option<String>> {
    let res = client.get(source).send().await?;
    if res.status() != reqwest::StatusCode::OK {
        return Ok(None);
    }
    let html = res.text().await?;
    user_agent_from_page(&html)
}

/// Finds the WordPress JSON page behind the public "all merit badges" page.
///
/// scouting.org renumbers its WordPress pages now and then; reading the `Link` header
/// keeps us pointed at the right one. Falls back to the last known page when the header
/// is missing or has no API relation. Failing to reach the page at all is fatal.
pub async fn locate_listing(fetcher: &Fetcher, config: &Config) -> Result<String> {
    let res = fetcher.get(&config.all_badges_url()).await?;

    // WordPress sends each relation as its own `Link` header.
    let links = res
        .headers()
        .get_all(header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(", ");
    let found = listing_url_from_link_header(&links);

    match found {
        Some(url) => {
            info_time!("Found wordpress page: {url}");
            Ok(url)
        }
        None => {
            warn!(
                fallback = %config.fallback_listing_url,
                "couldn't find the current all merit badges page, DEFAULTING"
            );
            Ok(config.fallback_listing_url.clone())
        }
    }
}

/// Random pause in whole tenths of a second, bounds inclusive.
pub fn polite_delay((low, high): (u64, u64)) -> Duration {
    let (low, high) = (low.min(high), low.max(high));
    let tenths = rand::thread_rng().gen_range(low..=high);
    Duration::from_millis(tenths * 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polite_delay_in_range() {
        for _ in 0..200 {
            let delay = polite_delay((10, 40));
            assert!(delay >= Duration::from_secs(1), "{delay:?}");
            assert!(delay <= Duration::from_secs(4), "{delay:?}");
            assert_eq!(delay.as_millis() % 100, 0);
        }
    }

    #[test]
    fn test_polite_delay_degenerate_ranges() {
        assert_eq!(polite_delay((0, 0)), Duration::ZERO);
        assert_eq!(polite_delay((3, 3)), Duration::from_millis(300));
        let swapped = polite_delay((10, 1));
        assert!(swapped >= Duration::from_millis(100) && swapped <= Duration::from_secs(1));
    }
}
