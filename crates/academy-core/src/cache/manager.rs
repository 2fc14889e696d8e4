use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Category, Material};

/// Catalog older than this is refetched at start.
const CATALOG_STALE_MINUTES: i64 = 60;

const CATALOG_FILE: &str = "catalog.json";

/// A cached value and when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// Never negative, even if the clock moved backwards
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes().max(0)
    }

    /// "just now", "12m ago", "3h ago", "2d ago" (hours and days rounded)
    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            0 => "just now".to_string(),
            m @ 1..=59 => format!("{}m ago", m),
            m @ 60..=1439 => format!("{}h ago", (m + 30) / 60),
            m => format!("{}d ago", (m + 720) / 1440),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CATALOG_STALE_MINUTES
    }
}

/// The public half of the library: active categories and published materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub materials: Vec<Material>,
}

/// Keeps the last fetched catalog on disk.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache dir {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn catalog_path(&self) -> PathBuf {
        self.cache_dir.join(CATALOG_FILE)
    }

    /// The cached catalog; a corrupt file reads as absent
    pub fn load_catalog(&self) -> Option<CachedData<Catalog>> {
        let path = self.catalog_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Catalog cache unreadable");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cached) => Some(cached),
            Err(e) => {
                debug!(error = %e, "Discarding malformed catalog cache");
                None
            }
        }
    }

    pub fn save_catalog(&self, categories: &[Category], materials: &[Material]) -> Result<()> {
        let cached = CachedData::new(Catalog {
            categories: categories.to_vec(),
            materials: materials.to_vec(),
        });
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.catalog_path(), contents).context("Failed to write catalog cache")?;
        debug!(materials = materials.len(), "Catalog cached");
        Ok(())
    }

    /// True when the catalog is missing, unreadable or older than an hour
    pub fn catalog_stale(&self) -> bool {
        self.load_catalog().map(|c| c.is_stale()).unwrap_or(true)
    }

    /// "5m ago" style age of the catalog, or "never"
    pub fn catalog_age(&self) -> String {
        self.load_catalog()
            .map(|c| c.age_display())
            .unwrap_or_else(|| "never".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;
    use chrono::Duration;

    fn material(id: &str) -> Material {
        Material {
            id: id.to_string(),
            title: format!("Notes {}", id),
            description: None,
            category: Some(CategoryRef {
                id: "c1".to_string(),
                name: "Guides".to_string(),
            }),
            size_kb: Some(120),
            downloads: 3,
        }
    }

    #[test]
    fn test_age_display_rounding() {
        let mut cached = CachedData::new(());
        assert_eq!(cached.age_display(), "just now");
        cached.cached_at = Utc::now() - Duration::minutes(12);
        assert_eq!(cached.age_display(), "12m ago");
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::minutes(70);
        assert_eq!(cached.age_display(), "1h ago");
        cached.cached_at = Utc::now() - Duration::minutes(1440 + 13 * 60);
        assert_eq!(cached.age_display(), "2d ago");
        cached.cached_at = Utc::now() + Duration::minutes(5);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_is_stale_after_an_hour() {
        let mut cached = CachedData::new(());
        assert!(!cached.is_stale());
        cached.cached_at = Utc::now() - Duration::minutes(61);
        assert!(cached.is_stale());
    }

    #[test]
    fn test_catalog_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheManager::new(dir.path().join("cache")).expect("cache dir");
        assert!(cache.load_catalog().is_none());
        assert!(cache.catalog_stale());
        assert_eq!(cache.catalog_age(), "never");

        let categories = vec![Category {
            id: "c1".to_string(),
            name: "Guides".to_string(),
            is_active: true,
        }];
        cache
            .save_catalog(&categories, &[material("m1"), material("m2")])
            .expect("save");

        let cached = cache.load_catalog().expect("cached catalog");
        assert_eq!(cached.data.categories, categories);
        assert_eq!(cached.data.materials.len(), 2);
        assert!(!cache.catalog_stale());
        assert_eq!(cache.catalog_age(), "just now");
    }

    #[test]
    fn test_malformed_catalog_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("cache dir");
        std::fs::write(dir.path().join(CATALOG_FILE), "{not json").expect("write");
        assert!(cache.load_catalog().is_none());
        assert!(cache.catalog_stale());
    }
}
