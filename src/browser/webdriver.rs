//! W3C WebDriver implementation of [`Browser`]

use std::future::Future;
use std::path::Path;

use async_trait::async_trait;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tokio::time::{sleep, Instant};

use crate::common::config::{BrowserKind, WebDriverConfig};
use crate::common::{Error, Result};

use super::{Browser, Locator, WaitPolicy};

/// A browser session driven through a WebDriver server
pub struct WebDriverBrowser {
    driver: WebDriver,
    wait: WaitPolicy,
}

impl WebDriverBrowser {
    /// Open a new session on the configured WebDriver server
    pub async fn connect(config: &WebDriverConfig, wait: WaitPolicy) -> Result<Self> {
        tracing::debug!(url = %config.url, browser = ?config.browser, "Opening browser session");

        let driver = match config.browser {
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(config.url.as_str(), caps).await?
            }
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(config.url.as_str(), caps).await?
            }
        };

        Ok(Self { driver, wait })
    }

    /// Find the element right now, without waiting
    async fn find_now(&self, locator: &Locator) -> Result<WebElement> {
        let candidates = self.driver.find_all(By::Css(locator.selector.as_str())).await?;

        for element in candidates {
            if let Some(needle) = &locator.contains {
                // Stale or detached candidates read as empty and are skipped
                let text = element.text().await.unwrap_or_default();
                if !text.contains(needle.as_str()) {
                    continue;
                }
            }

            match &locator.text {
                Some(text) => {
                    let xpath = Locator::text_xpath(text);
                    let inner = element.find_all(By::XPath(xpath.as_str())).await?;
                    if let Some(inner) = inner.into_iter().next() {
                        return Ok(inner);
                    }
                }
                None => return Ok(element),
            }
        }

        Err(Error::element_not_found(locator, self.wait.timeout.as_secs()))
    }

    /// Run `op` until it succeeds or the wait policy runs out
    ///
    /// Missing elements and WebDriver errors (stale, not interactable) are
    /// retried; anything else fails at once.
    async fn retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = Instant::now() + self.wait.timeout;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let retryable = e.is_retryable() || matches!(e, Error::WebDriver(_));
                    if !retryable || Instant::now() >= deadline {
                        return Err(e);
                    }
                    tracing::trace!("Retrying: {}", e);
                }
            }
            sleep(self.wait.poll).await;
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn visit(&self, url: &str) -> Result<()> {
        tracing::debug!("visit {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn set_cookie(&self, name: &str, value: &str) -> Result<()> {
        self.driver.add_cookie(Cookie::new(name, value)).await?;
        Ok(())
    }

    async fn click(&self, target: &Locator) -> Result<()> {
        tracing::debug!("click {}", target);
        self.retry(|| async move {
            self.find_now(target).await?.click().await?;
            Ok(())
        })
        .await
    }

    async fn type_text(&self, target: &Locator, text: &str, submit: bool) -> Result<()> {
        tracing::debug!("type {:?} into {}", text, target);
        let element = self.retry(|| self.find_now(target)).await?;
        if submit {
            element.send_keys(text + Key::Enter).await?;
        } else {
            element.send_keys(text).await?;
        }
        Ok(())
    }

    async fn select_option(&self, target: &Locator, option: &str) -> Result<()> {
        tracing::debug!("select {:?} in {}", option, target);
        let element = self.retry(|| self.find_now(target)).await?;
        let select = SelectElement::new(&element).await?;
        select.select_by_visible_text(option).await?;
        Ok(())
    }

    async fn text(&self, target: &Locator) -> Result<String> {
        self.retry(|| async move { Ok(self.find_now(target).await?.text().await?) })
            .await
    }

    async fn is_visible(&self, target: &Locator) -> Result<bool> {
        self.retry(|| async move { Ok(self.find_now(target).await?.is_displayed().await?) })
            .await
    }

    async fn css_value(&self, target: &Locator, property: &str) -> Result<String> {
        self.retry(|| async move {
            Ok(self.find_now(target).await?.css_value(property).await?)
        })
        .await
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.driver.screenshot(path).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.driver.clone().quit().await?;
        Ok(())
    }
}
