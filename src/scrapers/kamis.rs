use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::parser::extract_table_rows;
use super::{RawRow, RowSource, ScrapeError, ScraperConfig};

/// How long a graceful close may take before the process is killed
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Scrapes the KAMIS wholesale price table through a headless Chromium.
///
/// The page renders its table client-side, so a plain HTTP fetch returns an
/// empty shell. Each call launches a fresh browser and tears it down again.
pub struct KamisScraper {
    config: ScraperConfig,
}

impl KamisScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    async fn render_page(&self, session: &BrowserSession) -> Result<String, ScrapeError> {
        let page = session
            .browser()?
            .new_page(self.config.url.as_str())
            .await
            .map_err(|e| ScrapeError::PageLoad(format!("{}: {}", self.config.url, e)))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::PageLoad(format!("{}: {}", self.config.url, e)))?;

        // No readiness signal from the site; give its scripts time to fill the table
        tokio::time::sleep(self.config.settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| ScrapeError::PageLoad(format!("reading page content: {}", e)))?;

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", self.config.url, e);
        }

        Ok(html)
    }
}

#[async_trait]
impl RowSource for KamisScraper {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError> {
        info!(url = %self.config.url, "Launching headless browser");

        let session = BrowserSession::launch(&self.config).await?;
        let rendered = self.render_page(&session).await;
        session.close().await;

        let rows = extract_table_rows(&rendered?)?;
        info!(rows = rows.len(), "Extracted price table rows");
        Ok(rows)
    }
}

/// RAII guard around a launched browser and its CDP event loop.
///
/// `close()` is the normal path. If the guard is dropped instead (an error
/// bubbling up, or the run being cancelled by a timeout), the browser is
/// closed from a background task so the Chromium process never outlives the run.
struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

impl BrowserSession {
    async fn launch(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent))
            .request_timeout(config.request_timeout);

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(ScrapeError::SessionStartup)?;

        let (browser, handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::SessionStartup(e.to_string()))?;

        let handler = tokio::spawn(drive_events(handler));

        Ok(Self {
            browser: Some(browser),
            handler: Some(handler),
        })
    }

    fn browser(&self) -> Result<&Browser, ScrapeError> {
        self.browser
            .as_ref()
            .ok_or_else(|| ScrapeError::SessionStartup("browser already closed".to_string()))
    }

    async fn close(mut self) {
        if let Some(browser) = self.browser.take() {
            shutdown(browser, self.handler.take(), CLOSE_GRACE).await;
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let Some(browser) = self.browser.take() else {
            return;
        };
        let handler = self.handler.take();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!("Browser session dropped without close, shutting down in background");
                runtime.spawn(shutdown(browser, handler, CLOSE_GRACE));
            }
            Err(_) => {
                // No runtime left to drive CDP; Browser's own Drop kills the child
                if let Some(handler) = handler {
                    handler.abort();
                }
                drop(browser);
            }
        }
    }
}

/// Poll the CDP event loop until the connection ends.
///
/// A single message that fails to decode (e.g. an event this protocol version
/// does not know) must not stop the loop, or every later command hangs.
async fn drive_events<S, E>(mut events: S)
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: Display,
{
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            debug!("Skipping undecodable CDP message: {}", e);
        }
    }
}

/// The parts of a browser process that teardown needs.
#[async_trait]
trait BrowserProcess: Send {
    async fn request_close(&mut self) -> Result<(), String>;
    async fn wait_exit(&mut self) -> std::io::Result<()>;
    async fn force_kill(&mut self) -> Option<std::io::Result<()>>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<(), String> {
        self.close().await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn wait_exit(&mut self) -> std::io::Result<()> {
        self.wait().await.map(|_| ())
    }

    async fn force_kill(&mut self) -> Option<std::io::Result<()>> {
        self.kill().await
    }
}

/// Close the browser, falling back to killing the process when the graceful
/// path fails or does not finish within `grace`.
async fn shutdown<B: BrowserProcess>(
    mut browser: B,
    handler: Option<JoinHandle<()>>,
    grace: Duration,
) {
    let closed = match tokio::time::timeout(grace, browser.request_close()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Failed to close browser: {}", e);
            false
        }
        Err(_) => {
            warn!("Browser close request timed out after {:?}", grace);
            false
        }
    };

    let exited = closed
        && match tokio::time::timeout(grace, browser.wait_exit()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Failed to wait for browser process: {}", e);
                false
            }
            Err(_) => {
                warn!("Browser process still running {:?} after close", grace);
                false
            }
        };

    if !exited {
        match browser.force_kill().await {
            Some(Ok(())) => info!("Killed browser process"),
            Some(Err(e)) => warn!("Failed to kill browser process: {}", e),
            None => {}
        }
    }

    if let Some(handler) = handler {
        handler.abort();
    }
    debug!("Browser session released");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    /// Fake process whose close and exit behaviour is scripted per test
    struct ScriptedProcess {
        close_fails: bool,
        exits: bool,
        killed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl BrowserProcess for ScriptedProcess {
        async fn request_close(&mut self) -> Result<(), String> {
            if self.close_fails {
                Err("send failed: handler gone".to_string())
            } else {
                Ok(())
            }
        }

        async fn wait_exit(&mut self) -> std::io::Result<()> {
            if self.exits {
                Ok(())
            } else {
                std::future::pending().await
            }
        }

        async fn force_kill(&mut self) -> Option<std::io::Result<()>> {
            self.killed.store(true, Ordering::SeqCst);
            Some(Ok(()))
        }
    }

    fn process(close_fails: bool, exits: bool) -> (ScriptedProcess, Arc<AtomicBool>) {
        let killed = Arc::new(AtomicBool::new(false));
        let process = ScriptedProcess {
            close_fails,
            exits,
            killed: killed.clone(),
        };
        (process, killed)
    }

    #[tokio::test]
    async fn test_event_loop_survives_bad_message() {
        let mut events = stream::iter(vec![Ok(()), Err("unknown event"), Ok(())]);

        drive_events(&mut events).await;

        assert!(events.next().await.is_none(), "loop stopped before the stream ended");
    }

    #[tokio::test]
    async fn test_shutdown_kills_when_close_fails() {
        let (browser, killed) = process(true, false);
        let started = Instant::now();

        shutdown(browser, None, Duration::from_secs(5)).await;

        assert!(killed.load(Ordering::SeqCst));
        // Never waits on a process that was not told to quit
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_shutdown_kills_when_exit_hangs() {
        let (browser, killed) = process(false, false);

        tokio::time::timeout(
            Duration::from_secs(2),
            shutdown(browser, None, Duration::from_millis(50)),
        )
        .await
        .expect("shutdown must be bounded");

        assert!(killed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_shutdown_clean_exit_does_not_kill() {
        let (browser, killed) = process(false, true);

        shutdown(browser, None, Duration::from_millis(50)).await;

        assert!(!killed.load(Ordering::SeqCst));
    }
}
