use anyhow::{Context, Result};
use thirtyfour::prelude::*;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::catalog::{CatalogTree, Category, GeneralCategory, Subcategory};
use crate::session::{absolutize, Session, BASE_URL};

const MENU_BUTTON: &str = "div.vtex-menu-2-x-styledLinkContent.vtex-menu-2-x-styledLinkContent--header-category.flex.justify-between.nowrap";
const DEPARTMENT_MENU: &str = "section.vtex-menu-2-x-submenu.vtex-menu-2-x-submenu--department-menu.w-100.flex.justify-center.flex-column";
const SUBMENU_COLUMN: &str = "div.vtex-flex-layout-0-x-flexColChild.vtex-flex-layout-0-x-flexColChild--col-submenu.pb0";

/// The home page needs a beat before the menu is interactive.
const HOME_SETTLE: Duration = Duration::from_secs(5);
/// Hovered panels render asynchronously.
const HOVER_SETTLE: Duration = Duration::from_secs(1);

/// Open the department menu on the home page and walk it, hovering each
/// entry to reveal its panel. Returns the tree in menu order.
pub async fn discover_catalog(session: &Session) -> Result<CatalogTree> {
    session.goto(BASE_URL).await?;
    sleep(HOME_SETTLE).await;

    let menu_button = session
        .wait_clickable(MENU_BUTTON)
        .await
        .context("Category menu button not found on home page")?;
    menu_button.click().await?;

    let menu = session
        .wait_visible(DEPARTMENT_MENU)
        .await
        .context("Department menu did not open")?;

    // The first li is the menu header, not a department.
    let entries = menu.find_all(By::Tag("li")).await?;
    let mut tree = CatalogTree::default();

    for (idx, entry) in entries.iter().enumerate().skip(1) {
        match read_department(session, entry).await {
            Ok(general) => {
                info!("{}: {} categories", general.name, general.categories.len());
                tree.general_categories.push(general);
            }
            Err(e) => warn!("Skipping department entry {}: {:#}", idx, e),
        }
    }

    Ok(tree)
}

/// Hover one department entry and read its general category plus the
/// revealed submenu columns.
async fn read_department(session: &Session, entry: &WebElement) -> Result<GeneralCategory> {
    session.hover(entry).await?;
    sleep(HOVER_SETTLE).await;

    let anchor = entry
        .find(By::Tag("a"))
        .await
        .context("department entry has no link")?;
    let name = anchor.text().await?.trim().to_string();
    let href = anchor
        .attr("href")
        .await?
        .context("department link has no href")?;

    let mut general = GeneralCategory {
        name,
        url: absolutize(&href),
        categories: Vec::new(),
    };

    // The last two columns of the panel are not category lists.
    let mut columns = entry.find_all(By::Css(SUBMENU_COLUMN)).await?;
    let keep = columns.len().saturating_sub(2);
    columns.truncate(keep);

    for column in &columns {
        match read_column(column).await {
            Ok(Some(category)) => general.categories.push(category),
            Ok(None) => {}
            Err(e) => warn!("Skipping submenu column under {}: {:#}", general.name, e),
        }
    }

    Ok(general)
}

/// The first anchor in a column is the category, every following anchor a
/// subcategory of it.
async fn read_column(column: &WebElement) -> Result<Option<Category>> {
    let anchors = column.find_all(By::Tag("a")).await?;
    let Some((first, rest)) = anchors.split_first() else {
        return Ok(None);
    };

    let href = first
        .attr("href")
        .await?
        .context("category link has no href")?;
    let mut category = Category {
        name: first.text().await?.trim().to_string(),
        url: absolutize(&href),
        subcategories: Vec::new(),
    };

    for anchor in rest {
        match read_subcategory(anchor).await {
            Ok(sub) => category.subcategories.push(sub),
            Err(e) => warn!("Skipping subcategory under {}: {:#}", category.name, e),
        }
    }

    Ok(Some(category))
}

async fn read_subcategory(anchor: &WebElement) -> Result<Subcategory> {
    let href = anchor
        .attr("href")
        .await?
        .context("subcategory link has no href")?;
    Ok(Subcategory {
        name: anchor.text().await?.trim().to_string(),
        url: absolutize(&href),
    })
}
