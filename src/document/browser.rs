use super::{Document, HtmlDocument, SHOW_MORE_SELECTOR};
use crate::error::DocumentError;
use fantoccini::{Client, ClientBuilder, Locator};
use scraper::{ElementRef, Selector};
use std::time::Duration;
use url::Url;

/// A live page in a WebDriver session.
///
/// Lookups run against a snapshot of the page source taken after navigation,
/// and retaken after the expansion click.
pub struct BrowserDocument {
    client: Client,
    snapshot: HtmlDocument,
}

impl BrowserDocument {
    /// Navigates `client` to `url` and snapshots the loaded page. The session
    /// is closed if the page cannot be loaded.
    pub async fn open(client: Client, url: &str) -> Result<Self, DocumentError> {
        ::log::debug!("Navigating to {}", url);
        let loaded = match client.goto(url).await {
            Ok(()) => take_snapshot(&client).await,
            Err(e) => Err(e.into()),
        };
        match loaded {
            Ok(snapshot) => Ok(Self { client, snapshot }),
            Err(e) => {
                if let Err(close_err) = client.close().await {
                    ::log::debug!("Failed to close WebDriver session: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Ends the WebDriver session
    pub async fn close(self) -> Result<(), DocumentError> {
        self.client.close().await?;
        Ok(())
    }
}

impl Document for BrowserDocument {
    fn location(&self) -> Result<Url, DocumentError> {
        self.snapshot.location()
    }

    fn select<'a>(&'a self, selector: &Selector) -> Result<Vec<ElementRef<'a>>, DocumentError> {
        self.snapshot.select(selector)
    }

    async fn expand(&mut self, delay: Duration) -> Result<bool, DocumentError> {
        let control = match self.client.find(Locator::Css(SHOW_MORE_SELECTOR)).await {
            Ok(control) => control,
            Err(e) if e.is_no_such_element() => {
                ::log::debug!("No show more control on page");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        control.click().await?;
        ::log::debug!("Clicked show more, waiting {:?}", delay);
        tokio::time::sleep(delay).await;

        self.snapshot = take_snapshot(&self.client).await?;
        Ok(true)
    }
}

async fn take_snapshot(client: &Client) -> Result<HtmlDocument, DocumentError> {
    let url = client.current_url().await?;
    let source = client.source().await?;
    Ok(HtmlDocument::from_parts(url, &source))
}

/// Connects to the WebDriver instance, trying common local ports if the
/// configured one is unreachable
pub async fn connect(webdriver_url: &str) -> Result<Client, DocumentError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://127.0.0.1:4444",
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
    Err(DocumentError::Connect {
        url: webdriver_url.to_string(),
    })
}
