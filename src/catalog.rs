use serde::{Deserialize, Serialize};

/// SKU extraction is not implemented; every product carries this sentinel.
pub const SKU_PLACEHOLDER: &str = "SKU-DUMMY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
    #[serde(rename = "subcategorias", default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralCategory {
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<Category>,
}

/// Root of categories.json. Menu order is preserved everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTree {
    #[serde(rename = "categorias_generales")]
    pub general_categories: Vec<GeneralCategory>,
}

/// One listing page to visit: a subcategory, or a category that has none.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub name: String,
    pub url: String,
}

impl CatalogTree {
    /// Flatten the tree into the ordered list of leaf pages. A category's
    /// subcategories are its leaves; a category without subcategories is a
    /// leaf itself.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        for general in &self.general_categories {
            for category in &general.categories {
                if category.subcategories.is_empty() {
                    leaves.push(Leaf {
                        name: category.name.clone(),
                        url: category.url.clone(),
                    });
                } else {
                    for sub in &category.subcategories {
                        leaves.push(Leaf {
                            name: sub.name.clone(),
                            url: sub.url.clone(),
                        });
                    }
                }
            }
        }
        leaves
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "precio_lista")]
    pub list_price: f64,
    #[serde(rename = "precio_final")]
    pub final_price: f64,
    pub url: String,
}

/// Root of products.json. Insertion order is visitation order; duplicates
/// reachable from several category paths are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCollection {
    #[serde(rename = "productos")]
    pub products: Vec<Product>,
}

// ── Tests ──
