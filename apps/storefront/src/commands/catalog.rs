//! # Catalog Commands
//!
//! Product browsing for everyone; catalog, stock and supplier management
//! for staff.
//!
//! ## Stock Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  record_purchase ──► SupplierPurchase + supply price ──┐                │
//! │                                                        ├──► quantity ↑  │
//! │  restock (no supplier) ────────────────────────────────┘                │
//! │                                                                         │
//! │  set_stock ─────────────────────────────────────────────► quantity = n  │
//! │                                                                         │
//! │  checkout ──────────────────────────────────────────────► quantity ↓    │
//! │  cancel order ──────────────────────────────────────────► quantity ↑    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use tracing::{debug, info};
use zoo_core::validation::validate_purchase_quantity;
use zoo_core::{
    Category, CoreError, Money, Product, Supplier, SupplierProduct, SupplierPurchase,
};
use zoo_db::{NewProduct, NewSupplier};

use super::require_staff;
use crate::error::ApiError;
use crate::state::DbState;

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;

fn parse_price(amount: &str) -> Result<Money, ApiError> {
    Ok(Money::parse_exact(amount).map_err(CoreError::from)?)
}

// =============================================================================
// Browsing
// =============================================================================

/// Searches products by name or article substring.
///
/// ## Arguments
/// * `query` - Search term; blank lists products by name
/// * `limit` - Maximum results (default: 20, max: 100)
pub async fn search_products(
    db: &DbState,
    query: &str,
    limit: Option<u32>,
) -> Result<Vec<Product>, ApiError> {
    let start = Instant::now();
    let query = query.trim();
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);

    let products = db.inner().products().search(query, limit).await?;

    debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = products.len(),
        query = %query,
        "search_products complete"
    );

    Ok(products)
}

pub async fn get_product(db: &DbState, product_id: &str) -> Result<Product, ApiError> {
    Ok(db.inner().products().require(product_id).await?)
}

pub async fn list_categories(db: &DbState) -> Result<Vec<Category>, ApiError> {
    Ok(db.inner().catalog().list_categories().await?)
}

pub async fn products_in_category(
    db: &DbState,
    category_id: &str,
) -> Result<Vec<Product>, ApiError> {
    Ok(db.inner().products().list_by_category(category_id).await?)
}

// =============================================================================
// Staff: Catalog
// =============================================================================

pub async fn create_category(
    db: &DbState,
    actor_id: &str,
    name: &str,
    description: Option<&str>,
    parent_id: Option<&str>,
) -> Result<Category, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db
        .inner()
        .catalog()
        .create_category(name, description, parent_id)
        .await?)
}

pub async fn create_product(
    db: &DbState,
    actor_id: &str,
    product: NewProduct,
) -> Result<Product, ApiError> {
    require_staff(db, actor_id).await?;
    let product = db.inner().products().insert(product).await?;
    info!(article = %product.article, "Product created");
    Ok(product)
}

/// Sets the stock level outright (inventory correction).
pub async fn set_stock(
    db: &DbState,
    actor_id: &str,
    product_id: &str,
    quantity: i64,
) -> Result<Product, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().products().set_quantity(product_id, quantity).await?)
}

/// Changes the price. Placed orders keep the price they were sold at.
pub async fn set_price(
    db: &DbState,
    actor_id: &str,
    product_id: &str,
    price: &str,
) -> Result<Product, ApiError> {
    require_staff(db, actor_id).await?;
    let price = parse_price(price)?;
    Ok(db.inner().products().set_price(product_id, price.cents()).await?)
}

// =============================================================================
// Staff: Suppliers
// =============================================================================

pub async fn create_supplier(
    db: &DbState,
    actor_id: &str,
    supplier: NewSupplier,
) -> Result<Supplier, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().catalog().create_supplier(supplier).await?)
}

pub async fn list_suppliers(db: &DbState, actor_id: &str) -> Result<Vec<Supplier>, ApiError> {
    require_staff(db, actor_id).await?;
    Ok(db.inner().catalog().list_suppliers().await?)
}

pub async fn link_supplier(
    db: &DbState,
    actor_id: &str,
    supplier_id: &str,
    product_id: &str,
    supply_price: &str,
    is_main_supplier: bool,
) -> Result<SupplierProduct, ApiError> {
    require_staff(db, actor_id).await?;
    let price = parse_price(supply_price)?;
    Ok(db
        .inner()
        .catalog()
        .link_supplier(supplier_id, product_id, price.cents(), is_main_supplier)
        .await?)
}

/// Records a delivery from a supplier and adds it to stock.
pub async fn record_purchase(
    db: &DbState,
    actor_id: &str,
    supplier_id: &str,
    product_id: &str,
    quantity: i64,
    unit_price: &str,
) -> Result<SupplierPurchase, ApiError> {
    require_staff(db, actor_id).await?;
    let price = parse_price(unit_price)?;
    Ok(db
        .inner()
        .catalog()
        .record_purchase(supplier_id, product_id, quantity, price.cents())
        .await?)
}

/// What a delivery for one supplier looks like.
#[derive(Debug, Clone)]
pub struct Delivery<'a> {
    /// Supplier name, matched case-insensitively.
    pub supplier: &'a str,
    /// Unit price; defaults to the supplier's last supply price.
    pub unit_price: Option<&'a str>,
}

/// Adds `quantity` units of the product with `article` to stock.
///
/// With a delivery the units are recorded as a supplier purchase;
/// without one the stock level is simply raised.
pub async fn restock(
    db: &DbState,
    actor_id: &str,
    article: &str,
    quantity: i64,
    delivery: Option<Delivery<'_>>,
) -> Result<Product, ApiError> {
    require_staff(db, actor_id).await?;
    validate_purchase_quantity(quantity).map_err(CoreError::from)?;

    let products = db.inner().products();
    let product = products
        .get_by_article(article)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", article))?;

    match delivery {
        Some(delivery) => {
            let catalog = db.inner().catalog();
            let supplier = catalog
                .list_suppliers()
                .await?
                .into_iter()
                .find(|s| s.name.eq_ignore_ascii_case(delivery.supplier.trim()))
                .ok_or_else(|| ApiError::not_found("Supplier", delivery.supplier))?;

            let unit_price_cents = match delivery.unit_price {
                Some(price) => parse_price(price)?.cents(),
                None => catalog
                    .supplier_products_for(&product.id)
                    .await?
                    .into_iter()
                    .find(|link| link.supplier_id == supplier.id)
                    .map(|link| link.supply_price_cents)
                    .ok_or_else(|| {
                        ApiError::validation(format!(
                            "No supply price known for {} from {}; pass a unit price",
                            product.article, supplier.name
                        ))
                    })?,
            };

            catalog
                .record_purchase(&supplier.id, &product.id, quantity, unit_price_cents)
                .await?;
        }
        None => {
            let restocked = product
                .quantity
                .checked_add(quantity)
                .ok_or(CoreError::InvalidQuantity { quantity })?;
            products.set_quantity(&product.id, restocked).await?;
        }
    }

    let restocked = products.require(&product.id).await?;
    info!(
        article = %restocked.article,
        added = quantity,
        quantity = restocked.quantity,
        "Product restocked"
    );
    Ok(restocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_search_and_browse() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let cats = create_category(&db, &admin.id, "Cats", None, None)
            .await
            .unwrap();
        create_product(
            &db,
            &admin.id,
            NewProduct {
                name: "Dry cat food".to_string(),
                article: "CAT-001".to_string(),
                description: None,
                category_id: Some(cats.id.clone()),
                price_cents: 1250,
                quantity: 4,
            },
        )
        .await
        .unwrap();
        fixtures::product(&db, "DOG-001", 900, 2).await;

        let found = search_products(&db, "cat food", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article, "CAT-001");

        assert_eq!(products_in_category(&db, &cats.id).await.unwrap().len(), 1);
        assert_eq!(list_categories(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_staff_stock_and_price() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let alice = fixtures::customer(&db, "alice").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 4).await;

        let err = set_stock(&db, &alice.id, &food.id, 10).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        assert_eq!(set_stock(&db, &admin.id, &food.id, 10).await.unwrap().quantity, 10);
        assert!(set_stock(&db, &admin.id, &food.id, -1).await.is_err());

        let food = set_price(&db, &admin.id, &food.id, "12.99").await.unwrap();
        assert_eq!(food.price_cents, 1299);
    }

    #[tokio::test]
    async fn test_restock_with_and_without_supplier() {
        let db = fixtures::db().await;
        let admin = fixtures::staff(&db, "admin").await;
        let food = fixtures::product(&db, "CAT-001", 1000, 4).await;
        let supplier = create_supplier(
            &db,
            &admin.id,
            NewSupplier {
                name: "Happy Paws Wholesale".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let restocked = restock(&db, &admin.id, "CAT-001", 6, None).await.unwrap();
        assert_eq!(restocked.quantity, 10);

        let delivery = Delivery {
            supplier: "happy paws wholesale",
            unit_price: None,
        };
        let err = restock(&db, &admin.id, "CAT-001", 5, Some(delivery.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        link_supplier(&db, &admin.id, &supplier.id, &food.id, "6.50", true)
            .await
            .unwrap();
        let restocked = restock(&db, &admin.id, "CAT-001", 5, Some(delivery))
            .await
            .unwrap();
        assert_eq!(restocked.quantity, 15);

        let purchases = db
            .inner()
            .catalog()
            .purchases_for_product(&food.id)
            .await
            .unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].price_per_unit_cents, 650);
        assert_eq!(purchases[0].total_price_cents, 3250);

        let err = restock(&db, &admin.id, "NOPE-1", 1, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = restock(&db, &admin.id, "CAT-001", i64::MAX, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_product(&db, &food.id).await.unwrap().quantity, 15);
    }
}
