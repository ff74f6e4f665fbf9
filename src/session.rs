use std::time::Duration;

use anyhow::{Context, Result};
use thirtyfour::prelude::*;
use tracing::debug;

pub const BASE_URL: &str = "https://www.jumbo.com.ar";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Standard wait for elements to turn up.
pub const ELEMENT_WAIT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One owned browser session. Acquired once per invocation and quit on every
/// exit path, success or failure.
pub struct Session {
    driver: WebDriver,
}

impl Session {
    /// Connect to the WebDriver endpoint (`WEBDRIVER_URL`, default
    /// `http://localhost:9515`) and open a maximized Chrome window.
    pub async fn connect() -> Result<Self> {
        let endpoint = std::env::var("WEBDRIVER_URL")
            .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string());
        let caps = DesiredCapabilities::chrome();
        let driver = WebDriver::new(&endpoint, caps)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", endpoint))?;
        driver.maximize_window().await?;
        Ok(Self { driver })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("navigating to {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        self.driver.refresh().await?;
        Ok(())
    }

    /// Move the mouse over an element to reveal hover-only content.
    pub async fn hover(&self, element: &WebElement) -> Result<()> {
        self.driver
            .action_chain()
            .move_to_element_center(element)
            .perform()
            .await?;
        Ok(())
    }

    /// Wait for a selector to be present and visible.
    pub async fn wait_visible(&self, css: &str) -> Result<WebElement> {
        let element = self
            .driver
            .query(By::Css(css))
            .wait(ELEMENT_WAIT, POLL_INTERVAL)
            .first()
            .await
            .with_context(|| format!("No element for selector {}", css))?;
        element
            .wait_until()
            .wait(ELEMENT_WAIT, POLL_INTERVAL)
            .displayed()
            .await
            .with_context(|| format!("Element never became visible: {}", css))?;
        Ok(element)
    }

    /// Wait for a selector to be present and clickable.
    pub async fn wait_clickable(&self, css: &str) -> Result<WebElement> {
        let element = self
            .driver
            .query(By::Css(css))
            .wait(ELEMENT_WAIT, POLL_INTERVAL)
            .first()
            .await
            .with_context(|| format!("No element for selector {}", css))?;
        element
            .wait_until()
            .wait(ELEMENT_WAIT, POLL_INTERVAL)
            .clickable()
            .await
            .with_context(|| format!("Element never became clickable: {}", css))?;
        Ok(element)
    }

    /// True if the element with `id` shows up within `timeout`.
    pub async fn marker_present(&self, id: &str, timeout: Duration) -> bool {
        self.driver
            .query(By::Id(id))
            .wait(timeout, POLL_INTERVAL)
            .exists()
            .await
            .unwrap_or(false)
    }

    pub async fn find_all(&self, by: By) -> Result<Vec<WebElement>> {
        Ok(self.driver.find_all(by).await?)
    }

    /// Close the browser.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

/// Parts of the menu emit relative hrefs; stored URLs are always absolute.
pub fn absolutize(href: &str) -> String {
    let href = href.trim();
    if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        href.to_string()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_href_gets_the_site_origin() {
        assert_eq!(
            absolutize("/almacen/aceites"),
            "https://www.jumbo.com.ar/almacen/aceites"
        );
    }

    #[test]
    fn absolute_href_is_untouched() {
        assert_eq!(
            absolutize("https://www.jumbo.com.ar/almacen"),
            "https://www.jumbo.com.ar/almacen"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            absolutize("  /almacen \n"),
            "https://www.jumbo.com.ar/almacen"
        );
    }
}
