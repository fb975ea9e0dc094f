//! In-memory catalog filtering, sorting and pagination.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::{Product, ProductStatus};
use crate::services::errmsg;
use crate::services::error::{Result, ServiceError};

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Largest page a single query may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Catalog sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// Catalog browse parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub status: Option<ProductStatus>,
    pub in_stock_only: bool,
    pub include_unpublished: bool,
    pub sort: ProductSort,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl CatalogQuery {
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_price_cents, self.max_price_cents) {
            if min > max {
                return Err(ServiceError::invalid(errmsg::PRICE_RANGE_INVERTED));
            }
        }
        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    fn matches(&self, product: &Product, search: Option<&str>, threshold: i64) -> bool {
        if !product.published && !self.include_unpublished {
            return false;
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(needle) = search {
            let hit = [&product.name, &product.description, &product.category]
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        if self.min_price_cents.is_some_and(|min| product.price_cents < min) {
            return false;
        }
        if self.max_price_cents.is_some_and(|max| product.price_cents > max) {
            return false;
        }
        if self.in_stock_only && product.stock <= 0 {
            return false;
        }
        if let Some(status) = self.status {
            if product.status(threshold) != status {
                return false;
            }
        }
        true
    }
}

/// Filter and sort without paginating.
pub fn matching(products: Vec<Product>, query: &CatalogQuery, threshold: i64) -> Vec<Product> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut found: Vec<Product> = products
        .into_iter()
        .filter(|p| query.matches(p, search.as_deref(), threshold))
        .collect();

    // Newest first is the tie-break for every other order.
    found.sort_by_key(|p| Reverse(p.created_at));
    match query.sort {
        ProductSort::Newest => {}
        ProductSort::PriceAsc => found.sort_by_key(|p| p.price_cents),
        ProductSort::PriceDesc => found.sort_by_key(|p| Reverse(p.price_cents)),
        ProductSort::Name => found.sort_by_cached_key(|p| p.name.to_lowercase()),
    }
    found
}

/// Filter, sort, then cut the requested page.
pub fn filter(products: Vec<Product>, query: &CatalogQuery, threshold: i64) -> Vec<Product> {
    paginate(matching(products, query, threshold), query)
}

pub(crate) fn paginate(products: Vec<Product>, query: &CatalogQuery) -> Vec<Product> {
    products
        .into_iter()
        .skip(query.offset)
        .take(query.page_size())
        .collect()
}

/// Distinct categories of published products, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter(|p| p.published)
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_utils::product;

    fn catalog() -> Vec<Product> {
        let mut gems = product("100 Gems", "gems", 1_000, 50);
        let mut pass = product("Season Pass", "passes", 4_500, 5);
        let mut coins = product("Coin Sack", "coins", 1_000, 0);
        let mut hidden = product("Dev Bundle", "gems", 10, 99);
        hidden.published = false;

        let base = gems.created_at;
        gems.created_at = base - Duration::minutes(3);
        pass.created_at = base - Duration::minutes(2);
        coins.created_at = base - Duration::minutes(1);
        hidden.created_at = base;
        vec![gems, pass, coins, hidden]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_unpublished_hidden_by_default() {
        let found = filter(catalog(), &CatalogQuery::default(), 10);
        assert_eq!(names(&found), vec!["Coin Sack", "Season Pass", "100 Gems"]);
    }

    #[test]
    fn test_include_unpublished() {
        let query = CatalogQuery {
            include_unpublished: true,
            ..Default::default()
        };
        assert_eq!(filter(catalog(), &query, 10).len(), 4);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let query = CatalogQuery {
            search: Some("PASS".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter(catalog(), &query, 10)), vec!["Season Pass"]);

        let by_description = CatalogQuery {
            search: Some("sack for your".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter(catalog(), &by_description, 10)), vec!["Coin Sack"]);
    }

    #[test]
    fn test_price_sort_is_stable() {
        let query = CatalogQuery {
            sort: ProductSort::PriceAsc,
            ..Default::default()
        };
        // Equal prices keep catalog order (newest first).
        assert_eq!(
            names(&filter(catalog(), &query, 10)),
            vec!["Coin Sack", "100 Gems", "Season Pass"]
        );
    }

    #[test]
    fn test_sort_by_name_and_price_desc() {
        let by_name = CatalogQuery {
            sort: ProductSort::Name,
            ..Default::default()
        };
        assert_eq!(
            names(&filter(catalog(), &by_name, 10)),
            vec!["100 Gems", "Coin Sack", "Season Pass"]
        );

        let by_price = CatalogQuery {
            sort: ProductSort::PriceDesc,
            ..Default::default()
        };
        assert_eq!(filter(catalog(), &by_price, 10)[0].name, "Season Pass");
    }

    #[test]
    fn test_status_and_stock_filters() {
        let low = CatalogQuery {
            status: Some(ProductStatus::LowStock),
            ..Default::default()
        };
        assert_eq!(names(&filter(catalog(), &low, 10)), vec!["Season Pass"]);

        let in_stock = CatalogQuery {
            in_stock_only: true,
            ..Default::default()
        };
        assert!(!names(&filter(catalog(), &in_stock, 10)).contains(&"Coin Sack"));
    }

    #[test]
    fn test_price_range_and_category() {
        let query = CatalogQuery {
            min_price_cents: Some(500),
            max_price_cents: Some(2_000),
            category: Some("GEMS".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter(catalog(), &query, 10)), vec!["100 Gems"]);
    }

    #[test]
    fn test_pagination_after_sort() {
        let query = CatalogQuery {
            sort: ProductSort::Name,
            limit: Some(1),
            offset: 1,
            ..Default::default()
        };
        assert_eq!(names(&filter(catalog(), &query, 10)), vec!["Coin Sack"]);
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let query = CatalogQuery {
            min_price_cents: Some(100),
            max_price_cents: Some(50),
            ..Default::default()
        };
        assert!(matches!(query.validate(), Err(ServiceError::Invalid(_))));
    }

    #[test]
    fn test_categories_only_published() {
        assert_eq!(categories(&catalog()), vec!["coins", "gems", "passes"]);
    }
}
