pub mod price;

use std::fmt;

use crate::catalog::{Product, SKU_PLACEHOLDER};
use price::parse_price;

/// Plain snapshot of one product card, as read off the rendered page.
/// Missing pieces are `None`; the decision about them is made in
/// [`product_from_card`], not at the DOM.
#[derive(Debug, Clone, Default)]
pub struct CardSnapshot {
    /// Text of the card heading.
    pub name: Option<String>,
    /// Href of the card's first anchor, already absolutized.
    pub url: Option<String>,
    pub price_box: Option<PriceBox>,
}

/// The card's price area: the texts of the price container's immediate child
/// blocks, plus the block following the container itself, which holds the
/// list price when a discount is shown.
#[derive(Debug, Clone, Default)]
pub struct PriceBox {
    pub blocks: Vec<String>,
    pub list_sibling: Option<String>,
}

/// Why one card was dropped while its siblings kept going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoName,
    NoUrl,
    NoPriceBox,
    NoListPrice,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NoName => write!(f, "card has no heading"),
            Skip::NoUrl => write!(f, "card has no link"),
            Skip::NoPriceBox => write!(f, "card has no price box"),
            Skip::NoListPrice => write!(f, "discounted card has no list price block"),
        }
    }
}

/// Decide one card.
///
/// One price block means no discount: it is both the list and the final
/// price. Two or more blocks mean a discount: the first is the final
/// (discounted) price and the list price sits in the block after the price
/// container. Zero blocks price the product at 0.0 on both sides.
pub fn product_from_card(card: &CardSnapshot) -> Result<Product, Skip> {
    let name = card.name.as_deref().ok_or(Skip::NoName)?;
    let url = card.url.as_deref().ok_or(Skip::NoUrl)?;
    let price_box = card.price_box.as_ref().ok_or(Skip::NoPriceBox)?;

    let (list_price, final_price) = match price_box.blocks.as_slice() {
        [] => (0.0, 0.0),
        [only] => {
            let price = parse_price(only);
            (price, price)
        }
        [discounted, ..] => {
            let final_price = parse_price(discounted);
            let list = price_box.list_sibling.as_deref().ok_or(Skip::NoListPrice)?;
            (parse_price(list), final_price)
        }
    };

    Ok(Product {
        name: name.to_string(),
        sku: SKU_PLACEHOLDER.to_string(),
        list_price,
        final_price,
        url: url.to_string(),
    })
}

// ── Tests ──
