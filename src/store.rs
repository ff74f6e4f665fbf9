use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{CatalogTree, ProductCollection};

pub const CATEGORIES_FILE: &str = "categories.json";
pub const PRODUCTS_FILE: &str = "products.json";

/// Full rewrite of the category file. No merging with previous runs.
pub fn save_categories(path: &Path, tree: &CatalogTree) -> Result<()> {
    write_json(path, tree)
}

pub fn load_categories(path: &Path) -> Result<CatalogTree> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read {} (run 'categories' first)",
            path.display()
        )
    })?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed catalog in {}", path.display()))
}

/// Full rewrite of the product file. Called after every visited leaf page so
/// completed pages survive a crash.
pub fn save_products(path: &Path, collection: &ProductCollection) -> Result<()> {
    write_json(path, collection)
}

pub fn load_products(path: &Path) -> Result<ProductCollection> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed products in {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, GeneralCategory, Product, SKU_PLACEHOLDER};

    fn tree() -> CatalogTree {
        CatalogTree {
            general_categories: vec![GeneralCategory {
                name: "Bebés y Niños".into(),
                url: "https://www.jumbo.com.ar/bebes-y-ninos".into(),
                categories: vec![Category {
                    name: "Pañales".into(),
                    url: "https://www.jumbo.com.ar/bebes-y-ninos/panales".into(),
                    subcategories: vec![],
                }],
            }],
        }
    }

    #[test]
    fn categories_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        save_categories(&path, &tree()).unwrap();
        let back = load_categories(&path).unwrap();
        assert_eq!(back, tree());
    }

    #[test]
    fn non_ascii_is_written_literally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        save_categories(&path, &tree()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Bebés y Niños"));
        assert!(raw.contains("Pañales"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");

        let one = ProductCollection {
            products: vec![Product {
                name: "Yerba mate 500 g".into(),
                sku: SKU_PLACEHOLDER.into(),
                list_price: 1200.0,
                final_price: 1200.0,
                url: "https://www.jumbo.com.ar/yerba/p".into(),
            }],
        };
        save_products(&path, &one).unwrap();
        save_products(&path, &ProductCollection::default()).unwrap();

        let back = load_products(&path).unwrap();
        assert!(back.products.is_empty());
    }

    #[test]
    fn missing_categories_file_mentions_the_first_stage() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_categories(&dir.path().join("categories.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("run 'categories' first"));
    }
}
