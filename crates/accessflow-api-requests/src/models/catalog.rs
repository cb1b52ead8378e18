//! Response models for the access catalog endpoint.

use accessflow_governance::{catalog, Category, Department};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A grantable catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemResponse {
    /// Canonical item name used in requests.
    pub name: String,
    /// Display label.
    pub label: String,
}

/// One catalog category and its items, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogCategoryResponse {
    /// Category key, e.g. "main_cloud".
    pub key: String,
    pub label: String,
    pub items: Vec<CatalogItemResponse>,
}

/// The full access catalog plus the selectable departments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub categories: Vec<CatalogCategoryResponse>,
    pub departments: Vec<String>,
}

impl CatalogResponse {
    pub fn build() -> Self {
        let categories = catalog::categories()
            .iter()
            .map(|&category: &Category| CatalogCategoryResponse {
                key: category.as_str().to_string(),
                label: category.label().to_string(),
                items: catalog::items(category)
                    .iter()
                    .map(|item| CatalogItemResponse {
                        name: item.name.to_string(),
                        label: item.label.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            categories,
            departments: Department::ALL
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_response_shape() {
        let catalog = CatalogResponse::build();
        let keys: Vec<&str> = catalog.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            keys,
            ["main_cloud", "gov_cloud", "log_search", "search_index", "other"]
        );
        assert_eq!(catalog.categories[0].items[0].name, "core-payment");
        assert_eq!(catalog.departments.len(), 10);
    }
}
