use serde::{Deserialize, Serialize};

/// A material category (`GET /materials/categories`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
}

/// The category embedded in a material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CategoryRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A downloadable resource in the free library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Material {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Option<CategoryRef>,
    #[serde(rename = "sizeKB", default)]
    pub size_kb: Option<u64>,
    #[serde(default)]
    pub downloads: u64,
}

impl Material {
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("Uncategorized")
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.id.as_str())
    }

    /// One-line summary: "Guides | 512 KB | 40 Downloads".
    pub fn summary(&self) -> String {
        let size = self
            .size_kb
            .map(|kb| format!("{} KB", kb))
            .unwrap_or_else(|| "? KB".to_string());
        format!("{} | {} | {} Downloads", self.category_name(), size, self.downloads)
    }
}
