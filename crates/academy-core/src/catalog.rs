//! Search and category filtering for the free-material library.

use crate::models::{Category, Material};

/// Search box plus category dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    pub search: String,
    /// Category id; `None` means all categories
    pub category: Option<String>,
}

impl MaterialFilter {
    /// Case-insensitive title match AND category match
    pub fn matches(&self, material: &Material) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty() || material.title.to_lowercase().contains(&needle);
        let matches_category = match self.category {
            None => true,
            Some(ref id) => material.category_id() == Some(id.as_str()),
        };
        matches_search && matches_category
    }

    pub fn apply<'a>(&self, materials: &'a [Material]) -> Vec<&'a Material> {
        materials.iter().filter(|m| self.matches(m)).collect()
    }

    /// Step the category filter through "all" and then each category
    pub fn cycle_category(&mut self, categories: &[Category]) {
        let position = self
            .category
            .as_ref()
            .and_then(|id| categories.iter().position(|c| &c.id == id));
        self.category = match position {
            None if self.category.is_none() => categories.first().map(|c| c.id.clone()),
            None => None,
            Some(i) => categories.get(i + 1).map(|c| c.id.clone()),
        };
    }

    /// Label for the selected category
    pub fn category_label<'a>(&self, categories: &'a [Category]) -> &'a str {
        self.category
            .as_ref()
            .and_then(|id| categories.iter().find(|c| &c.id == id))
            .map(|c| c.name.as_str())
            .unwrap_or("All Categories")
    }
}

/// Categories offered as filters
pub fn active_categories(categories: &[Category]) -> Vec<Category> {
    categories.iter().filter(|c| c.is_active).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;

    fn material(id: &str, title: &str, category: &str) -> Material {
        Material {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            category: Some(CategoryRef {
                id: category.to_string(),
                name: category.to_uppercase(),
            }),
            size_kb: Some(10),
            downloads: 0,
        }
    }

    fn category(id: &str, active: bool) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Cat {}", id),
            is_active: active,
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let materials = vec![
            material("1", "IELTS Writing Guide", "c1"),
            material("2", "PTE Speaking", "c2"),
        ];
        let filter = MaterialFilter {
            search: "ielts".to_string(),
            category: None,
        };
        let found = filter.apply(&materials);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_search_and_category_combine() {
        let materials = vec![
            material("1", "Guide A", "c1"),
            material("2", "Guide B", "c2"),
            material("3", "Workbook", "c2"),
        ];
        let filter = MaterialFilter {
            search: "guide".to_string(),
            category: Some("c2".to_string()),
        };
        let ids: Vec<_> = filter.apply(&materials).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let materials = vec![material("1", "A", "c1"), material("2", "B", "c2")];
        assert_eq!(MaterialFilter::default().apply(&materials).len(), 2);
    }

    #[test]
    fn test_cycle_category() {
        let categories = vec![category("c1", true), category("c2", true)];
        let mut filter = MaterialFilter::default();
        assert_eq!(filter.category_label(&categories), "All Categories");

        filter.cycle_category(&categories);
        assert_eq!(filter.category.as_deref(), Some("c1"));
        assert_eq!(filter.category_label(&categories), "Cat c1");
        filter.cycle_category(&categories);
        assert_eq!(filter.category.as_deref(), Some("c2"));
        filter.cycle_category(&categories);
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_cycle_from_vanished_category_resets() {
        let mut filter = MaterialFilter {
            search: String::new(),
            category: Some("gone".to_string()),
        };
        filter.cycle_category(&[category("c1", true)]);
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_active_categories() {
        let categories = vec![category("c1", true), category("c2", false)];
        let active = active_categories(&categories);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "c1");
    }
}
