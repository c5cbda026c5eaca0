use crate::config::MonitorConfig;
use crate::error::ScanError;
use crate::fetchers::Fetcher;
use crate::results::FetchedDocument;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Fetches pages through WebDriver sessions so scripted content is rendered
///
/// Each fetch borrows an idle session or opens a new one, so the number of
/// sessions grows to the number of concurrent fetches. A session that fails
/// is closed instead of being returned.
pub struct WebDriverFetcher {
    webdriver_url: String,
    fetch_timeout: Duration,
    idle: Mutex<Vec<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str, fetch_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            fetch_timeout,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            &config.webdriver_url,
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    /// Close every idle WebDriver session
    pub async fn close(&self) {
        let clients = std::mem::take(&mut *self.idle.lock().await);
        for client in clients {
            close_client(client).await;
        }
    }

    async fn checkout(&self) -> Result<Client, ScanError> {
        let idle = self.idle.lock().await.pop();
        match idle {
            Some(client) => Ok(client),
            None => connect_to_webdriver(&self.webdriver_url).await,
        }
    }

    async fn load(&self, client: &Client, url: &str) -> Result<FetchedDocument, ScanError> {
        client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, "accessing", url))?;

        let source = client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))?;

        let title = client.title().await.ok().filter(|t| !t.is_empty());

        Ok(FetchedDocument::new(url, title, source))
    }
}

impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ScanError> {
        Url::parse(url).map_err(|e| ScanError::fetch(url, format!("invalid URL: {}", e)))?;

        let started = std::time::Instant::now();
        ::log::debug!("FETCH: {}", url);

        let client = self.checkout().await?;
        let result = match timeout(self.fetch_timeout, self.load(&client, url)).await {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("Timeout fetching: {}", url);
                Err(ScanError::fetch(url, "timed out"))
            }
        };

        // A failed session may be dead; the next fetch opens a fresh one
        if result.is_ok() {
            self.idle.lock().await.push(client);
        } else {
            close_client(client).await;
        }

        ::log::debug!(
            "Fetched {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );
        result
    }
}

async fn close_client(client: Client) {
    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver client: {}", e);
    }
}

/// Connects to the WebDriver instance, trying well-known local ports after the configured one
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, ScanError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // geckodriver / Selenium default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(ScanError::fetch(
        webdriver_url,
        "could not connect to any WebDriver server",
    ))
}

/// Maps navigation errors, noting lost sessions separately
fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &str) -> ScanError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    ScanError::fetch(url, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_rejected_without_session() {
        let fetcher = WebDriverFetcher::new("http://localhost:4444", Duration::from_secs(1));
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(ScanError::Fetch { .. })));
        assert!(fetcher.idle.lock().await.is_empty());

        // Nothing to close
        fetcher.close().await;
    }
}
