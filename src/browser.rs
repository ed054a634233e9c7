use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::{
    config::NavigatorSettings,
    error::{WatchError, WatchResult},
    navigator::{PageNavigator, TableRow},
    text_manipulators::extract_schedule_rows,
};

/// A visible Chromium window the operator can log into by hand.
pub struct ChromeNavigator {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeNavigator {
    pub async fn launch(settings: &NavigatorSettings) -> WatchResult<Self> {
        let mut builder = BrowserConfig::builder()
            .with_head()
            .arg("--start-maximized")
            .request_timeout(settings.implicit_wait);
        if !settings.webdriver_path.trim().is_empty() {
            builder = builder.chrome_executable(settings.webdriver_path.trim());
        }
        if let Some(dir) = &settings.user_data_path {
            builder = builder.user_data_dir(dir);
        }
        let browser_config = builder.build().map_err(WatchError::NavigatorInit)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            WatchError::NavigatorInit(format!(
                "error loading browser on `{}`: {e}",
                settings.webdriver_path
            ))
        })?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {e}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| WatchError::NavigatorInit(format!("cannot open a tab: {e}")))?;
        info!("Browser started");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Could not wait for the browser process: {e}");
        }
        self.handler.abort();
        info!("Browser closed");
    }
}

#[async_trait]
impl PageNavigator for ChromeNavigator {
    async fn navigate(&mut self, url: &str) -> WatchResult<()> {
        info!("Opening page: {url}");
        self.page
            .goto(url)
            .await
            .map_err(|e| WatchError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn current_url(&self) -> WatchResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| WatchError::Navigation(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn page_title(&self) -> WatchResult<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| WatchError::Navigation(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn rows(&self) -> WatchResult<Vec<TableRow>> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| WatchError::Navigation(e.to_string()))?;
        extract_schedule_rows(&html)
    }
}
