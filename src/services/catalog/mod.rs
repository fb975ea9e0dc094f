//! Product catalog: customer browsing and back-office product management.

mod query;

pub use query::{
    categories, filter, matching, CatalogQuery, ProductSort, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

use query::paginate;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::errmsg;
use super::error::{Result, ServiceError};
use super::validation::{require_at_most, require_non_negative, require_positive, require_text};
use crate::domain::{NewProduct, Product, ProductPatch, ProductStatus, MAX_PRICE_CENTS, MAX_STOCK};
use crate::interfaces::ProductStore;

/// A product with its derived stock status.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub status: ProductStatus,
}

impl ProductView {
    pub fn new(product: Product, low_stock_threshold: i64) -> Self {
        let status = product.status(low_stock_threshold);
        Self { product, status }
    }
}

/// One page of browse results.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<ProductView>,
    /// Matches before pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    low_stock_threshold: i64,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>, low_stock_threshold: i64) -> Self {
        Self {
            products,
            low_stock_threshold,
        }
    }

    fn view(&self, product: Product) -> ProductView {
        ProductView::new(product, self.low_stock_threshold)
    }

    pub async fn browse(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        query.validate()?;

        let found = matching(self.products.list().await?, query, self.low_stock_threshold);
        let total = found.len();
        let items = paginate(found, query)
            .into_iter()
            .map(|p| self.view(p))
            .collect();

        Ok(CatalogPage {
            items,
            total,
            limit: query.page_size(),
            offset: query.offset,
        })
    }

    /// Fetch a product. Unpublished products are invisible unless
    /// `include_unpublished` is set.
    pub async fn get(&self, id: Uuid, include_unpublished: bool) -> Result<ProductView> {
        match self.products.get(id).await? {
            Some(product) if product.published || include_unpublished => Ok(self.view(product)),
            _ => Err(ServiceError::not_found("product", id)),
        }
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(categories(&self.products.list().await?))
    }

    pub async fn create_product(&self, input: NewProduct) -> Result<ProductView> {
        require_text(&input.name, errmsg::PRODUCT_NAME_REQUIRED)?;
        require_text(&input.category, errmsg::PRODUCT_CATEGORY_REQUIRED)?;
        require_positive(input.price_cents, errmsg::PRICE_POSITIVE)?;
        require_at_most(input.price_cents, MAX_PRICE_CENTS, errmsg::PRICE_TOO_HIGH)?;
        require_non_negative(input.stock, errmsg::STOCK_NON_NEGATIVE)?;
        require_at_most(input.stock, MAX_STOCK, errmsg::STOCK_TOO_HIGH)?;

        let product = input.into_product(Utc::now());
        self.products.insert(&product).await?;

        info!(
            product_id = %product.id,
            name = %product.name,
            stock = product.stock,
            "Product created"
        );
        Ok(self.view(product))
    }

    pub async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<ProductView> {
        if let Some(name) = &patch.name {
            require_text(name, errmsg::PRODUCT_NAME_REQUIRED)?;
        }
        if let Some(category) = &patch.category {
            require_text(category, errmsg::PRODUCT_CATEGORY_REQUIRED)?;
        }
        if let Some(price) = patch.price_cents {
            require_positive(price, errmsg::PRICE_POSITIVE)?;
            require_at_most(price, MAX_PRICE_CENTS, errmsg::PRICE_TOO_HIGH)?;
        }

        let mut product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))?;
        patch.apply(&mut product, Utc::now());
        self.products.update(&product).await?;

        info!(product_id = %id, "Product updated");
        Ok(self.view(product))
    }

    /// Add `delta` units (negative to remove). Stock stays within
    /// `0..=MAX_STOCK`.
    pub async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<ProductView> {
        let current = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))?;
        require_at_most(
            current.stock.saturating_add(delta),
            MAX_STOCK,
            errmsg::STOCK_TOO_HIGH,
        )?;

        let stock = self.products.adjust_stock(id, delta).await?;
        info!(product_id = %id, delta, stock, "Stock adjusted");
        self.get(id, true).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<()> {
        if !self.products.delete(id).await? {
            return Err(ServiceError::not_found("product", id));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Stores;
    use crate::test_utils::seed_product;

    fn service(stores: &Stores) -> CatalogService {
        CatalogService::new(stores.products.clone(), 10)
    }

    fn new_product(name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            category: "gems".to_string(),
            price_cents,
            stock,
            published: true,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_product_derives_status() {
        let stores = Stores::in_memory();
        let view = service(&stores)
            .create_product(new_product("  500 Gems ", 4_000, 3))
            .await
            .unwrap();

        assert_eq!(view.product.name, "500 Gems");
        assert_eq!(view.status, ProductStatus::LowStock);
    }

    #[tokio::test]
    async fn test_create_product_validation() {
        let stores = Stores::in_memory();
        let catalog = service(&stores);

        for input in [
            new_product(" ", 100, 1),
            new_product("Gems", 0, 1),
            new_product("Gems", 100, -1),
            new_product("Gems", MAX_PRICE_CENTS + 1, 1),
            new_product("Gems", i64::MAX, 1),
            new_product("Gems", 100, MAX_STOCK + 1),
        ] {
            let err = catalog.create_product(input).await.unwrap_err();
            assert!(matches!(err, ServiceError::Invalid(_)));
        }
    }

    #[tokio::test]
    async fn test_get_hides_unpublished_from_customers() {
        let stores = Stores::in_memory();
        let catalog = service(&stores);
        let product = seed_product(&stores, "Dev Bundle", 100, 5).await;
        catalog
            .update_product(
                product.id,
                ProductPatch {
                    published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = catalog.get(product.id, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert!(catalog.get(product.id, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_browse_reports_total_before_pagination() {
        let stores = Stores::in_memory();
        for i in 0..5 {
            seed_product(&stores, &format!("Pack {i}"), 100 * (i + 1), 20).await;
        }

        let page = service(&stores)
            .browse(&CatalogQuery {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_adjust_stock_cannot_go_negative() {
        let stores = Stores::in_memory();
        let catalog = service(&stores);
        let product = seed_product(&stores, "Gems", 100, 2).await;

        let view = catalog.adjust_stock(product.id, 10).await.unwrap();
        assert_eq!(view.product.stock, 12);

        let err = catalog.adjust_stock(product.id, -13).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_out_of_range_deltas() {
        let stores = Stores::in_memory();
        let catalog = service(&stores);
        let product = seed_product(&stores, "Gems", 100, 10).await;

        let err = catalog.adjust_stock(product.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        let err = catalog.adjust_stock(product.id, i64::MIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let stock = stores.products.get(product.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);
    }

    #[tokio::test]
    async fn test_update_product_rejects_price_above_cap() {
        let stores = Stores::in_memory();
        let product = seed_product(&stores, "Gems", 100, 10).await;

        let err = service(&stores)
            .update_product(
                product.id,
                ProductPatch {
                    price_cents: Some(i64::MAX / 2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_product() {
        let stores = Stores::in_memory();
        let err = service(&stores).delete_product(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
