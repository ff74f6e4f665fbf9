use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::catalog::{CatalogTree, ProductCollection};
use crate::extract::{product_from_card, CardSnapshot, PriceBox};
use crate::session::{absolutize, Session, ELEMENT_WAIT};
use crate::store;

const PRODUCT_CARD: &str = "div.vtex-search-result-3-x-galleryItem.vtex-search-result-3-x-galleryItem--normal.vtex-search-result-3-x-galleryItem--grid.pa4";
const PRICE_BOX: &str = "div.vtex-flex-layout-0-x-flexColChild.vtex-flex-layout-0-x-flexColChild--shelf-main-price-box.pb0";
/// Rendered listing pages always carry this container; blank loads do not.
const LOAD_MARKER_ID: &str = "Wpndialogcontainer";

const LOAD_ATTEMPTS: u32 = 3;
const LOAD_COOLDOWN: Duration = Duration::from_secs(2);
/// Cards render shortly after navigation.
const PAGE_SETTLE: Duration = Duration::from_secs(2);

/// What the traversal needs from a live listing page. `Session` provides the
/// real one; tests script their own.
#[async_trait]
pub trait ListingPage {
    async fn open(&mut self, url: &str) -> Result<()>;
    async fn reload(&mut self) -> Result<()>;
    /// True once the page-live marker has turned up.
    async fn marker_appeared(&mut self) -> bool;
    async fn product_cards(&mut self) -> Result<Vec<CardSnapshot>>;
}

#[async_trait]
impl ListingPage for Session {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.goto(url).await?;
        sleep(PAGE_SETTLE).await;
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        self.refresh().await
    }

    async fn marker_appeared(&mut self) -> bool {
        self.marker_present(LOAD_MARKER_ID, ELEMENT_WAIT).await
    }

    async fn product_cards(&mut self) -> Result<Vec<CardSnapshot>> {
        sleep(PAGE_SETTLE).await;
        let mut cards = Vec::new();
        for element in self.find_all(By::Css(PRODUCT_CARD)).await? {
            match snapshot_card(&element).await {
                Ok(card) => cards.push(card),
                Err(e) => warn!("Unreadable product card: {:#}", e),
            }
        }
        Ok(cards)
    }
}

/// Reduce one card element to plain strings. A missing heading, anchor or
/// price box becomes `None` for the policy layer to judge; only a failure
/// inside the price box itself is an error.
async fn snapshot_card(element: &WebElement) -> Result<CardSnapshot> {
    let name = match element.find(By::Tag("h2")).await {
        Ok(heading) => Some(heading.text().await?.trim().to_string()),
        Err(_) => None,
    };

    let url = match element.find(By::Tag("a")).await {
        Ok(anchor) => anchor.attr("href").await?.map(|href| absolutize(&href)),
        Err(_) => None,
    };

    let price_box = match element.find_all(By::Css(PRICE_BOX)).await?.into_iter().next() {
        Some(box_element) => Some(snapshot_price_box(&box_element).await?),
        None => None,
    };

    Ok(CardSnapshot {
        name,
        url,
        price_box,
    })
}

async fn snapshot_price_box(box_element: &WebElement) -> Result<PriceBox> {
    let container = box_element.find(By::Tag("span")).await?;

    let mut blocks = Vec::new();
    for child in container.find_all(By::XPath("./div")).await? {
        blocks.push(child.text().await?.trim().to_string());
    }

    let list_sibling = match container.find(By::XPath("following-sibling::div")).await {
        Ok(div) => Some(div.text().await?.trim().to_string()),
        Err(_) => None,
    };

    Ok(PriceBox {
        blocks,
        list_sibling,
    })
}

/// Distinguish a rendered listing from a blank load: wait for the marker,
/// and on a miss reload, cool down, retry. Three misses fail the page.
pub async fn verify_loaded(page: &mut dyn ListingPage, url: &str) -> Result<bool> {
    for attempt in 1..=LOAD_ATTEMPTS {
        if page.marker_appeared().await {
            return Ok(true);
        }
        warn!(
            "{} did not load, reloading ({}/{})",
            url, attempt, LOAD_ATTEMPTS
        );
        page.reload().await?;
        sleep(LOAD_COOLDOWN).await;
    }
    Ok(false)
}

/// Totals for one extraction run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub pages: usize,
    pub pages_failed: usize,
    pub products: usize,
    pub cards_skipped: usize,
}

/// Visit every leaf page in tree order, scrape its cards, and rewrite
/// `out_path` with the full collection after each page, so a crash never
/// loses a completed leaf. A leaf that fails verification is skipped with
/// zero products; the run continues.
pub async fn extract_catalog(
    page: &mut dyn ListingPage,
    tree: &CatalogTree,
    out_path: &Path,
    limit: Option<usize>,
) -> Result<(ProductCollection, ExtractStats)> {
    let mut leaves = tree.leaves();
    if let Some(n) = limit {
        leaves.truncate(n);
    }

    let pb = ProgressBar::new(leaves.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut collection = ProductCollection::default();
    let mut stats = ExtractStats::default();

    for leaf in &leaves {
        info!("Visiting {} | {}", leaf.name, leaf.url);
        page.open(&leaf.url).await?;

        if !verify_loaded(page, &leaf.url).await? {
            warn!("Giving up on {}, moving to the next leaf", leaf.name);
            stats.pages_failed += 1;
            pb.inc(1);
            continue;
        }

        let cards = page.product_cards().await?;
        info!("Found {} product cards on {}", cards.len(), leaf.name);

        for card in &cards {
            match product_from_card(card) {
                Ok(product) => collection.products.push(product),
                Err(skip) => {
                    warn!("Skipping card on {}: {}", leaf.name, skip);
                    stats.cards_skipped += 1;
                }
            }
        }

        stats.pages += 1;
        store::save_products(out_path, &collection)?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    stats.products = collection.products.len();
    info!(
        "Extracted {} products from {} pages ({} failed, {} cards skipped)",
        stats.products, stats.pages, stats.pages_failed, stats.cards_skipped
    );

    Ok((collection, stats))
}

// ── Tests ──
