pub mod kamis;
pub mod parser;

use async_trait::async_trait;
use std::time::Duration;

/// One table row as ordered, cleaned text cells. Empty cells are kept.
pub type RawRow = Vec<String>;

/// KAMIS wholesale price page for rice
pub const DEFAULT_SCRAPE_URL: &str = "https://www.kamis.or.kr/customer/price/wholesale/item.do";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("browser session failed to start: {0}")]
    SessionStartup(String),
    #[error("page load failed: {0}")]
    PageLoad(String),
    #[error("price table not found: {0}")]
    SelectorNotFound(String),
}

/// Anything that can produce the raw rows of the price table.
///
/// The browser-backed [`kamis::KamisScraper`] is the production source;
/// tests plug in fixed tables.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub url: String,
    pub user_agent: String,
    /// Time to let client-side rendering finish after navigation
    pub settle: Duration,
    /// Per-CDP-request timeout inside the browser session
    pub request_timeout: Duration,
    pub chrome_executable: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCRAPE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            settle: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
            chrome_executable: None,
        }
    }
}
