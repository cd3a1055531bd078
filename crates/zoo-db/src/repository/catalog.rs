//! # Catalog Repository
//!
//! Categories, suppliers and supplier purchases.
//!
//! ## Supplier Purchase
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_purchase(supplier, product, qty, unit price)                    │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  INSERT supplier_purchases (total = qty × unit price)                   │
//! │  UPSERT supplier_products  (supply price, last supply date)             │
//! │  UPDATE products           (quantity += qty)                            │
//! │       │                                                                 │
//! │       ▼  COMMIT (any failure rolls all three back)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::{new_id, product};
use zoo_core::validation::{validate_name, validate_price_cents, validate_purchase_quantity};
use zoo_core::{Category, CoreError, Money, Supplier, SupplierProduct, SupplierPurchase};

/// Fields for a new supplier.
#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Repository for categories, suppliers and deliveries.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category, optionally under a parent.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        parent_id: Option<&str>,
    ) -> DbResult<Category> {
        let name = name.trim();
        validate_name("name", name).map_err(CoreError::from)?;

        let category = Category {
            id: new_id(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            parent_id: parent_id.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(name = %category.name, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, parent_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.parent_id)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists categories by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, parent_id, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, parent_id, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Creates a supplier.
    pub async fn create_supplier(&self, new: NewSupplier) -> DbResult<Supplier> {
        let name = new.name.trim().to_string();
        validate_name("name", &name).map_err(CoreError::from)?;

        let supplier = Supplier {
            id: new_id(),
            name,
            address: new.address.trim().to_string(),
            phone: new.phone.trim().to_string(),
            email: new.email.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(name = %supplier.name, "Creating supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, address, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn list_suppliers(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, address, phone, email, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn get_supplier(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, address, phone, email, created_at FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Links a supplier to a product it delivers, or updates the link.
    pub async fn link_supplier(
        &self,
        supplier_id: &str,
        product_id: &str,
        supply_price_cents: i64,
        is_main_supplier: bool,
    ) -> DbResult<SupplierProduct> {
        validate_price_cents(supply_price_cents).map_err(CoreError::from)?;

        sqlx::query(
            r#"
            INSERT INTO supplier_products (
                id, supplier_id, product_id, is_main_supplier, supply_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (supplier_id, product_id) DO UPDATE SET
                is_main_supplier = excluded.is_main_supplier,
                supply_price_cents = excluded.supply_price_cents
            "#,
        )
        .bind(new_id())
        .bind(supplier_id)
        .bind(product_id)
        .bind(is_main_supplier)
        .bind(supply_price_cents)
        .execute(&self.pool)
        .await?;

        let link = sqlx::query_as::<_, SupplierProduct>(
            r#"
            SELECT id, supplier_id, product_id, is_main_supplier,
                   supply_price_cents, last_supply_date
            FROM supplier_products
            WHERE supplier_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(supplier_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    /// Supplier links for a product, main supplier first.
    pub async fn supplier_products_for(&self, product_id: &str) -> DbResult<Vec<SupplierProduct>> {
        let links = sqlx::query_as::<_, SupplierProduct>(
            r#"
            SELECT id, supplier_id, product_id, is_main_supplier,
                   supply_price_cents, last_supply_date
            FROM supplier_products
            WHERE product_id = ?1
            ORDER BY is_main_supplier DESC, supply_price_cents
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Records a delivery and adds it to stock, in one transaction.
    pub async fn record_purchase(
        &self,
        supplier_id: &str,
        product_id: &str,
        quantity: i64,
        price_per_unit_cents: i64,
    ) -> DbResult<SupplierPurchase> {
        validate_purchase_quantity(quantity).map_err(CoreError::from)?;
        validate_price_cents(price_per_unit_cents).map_err(CoreError::from)?;

        let total_price = Money::from_cents(price_per_unit_cents)
            .checked_multiply_quantity(quantity)
            .ok_or(CoreError::InvalidQuantity { quantity })?;

        let purchase = SupplierPurchase {
            id: new_id(),
            supplier_id: supplier_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            price_per_unit_cents,
            total_price_cents: total_price.cents(),
            purchase_date: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO supplier_purchases (
                id, supplier_id, product_id, quantity,
                price_per_unit_cents, total_price_cents, purchase_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.product_id)
        .bind(purchase.quantity)
        .bind(purchase.price_per_unit_cents)
        .bind(purchase.total_price_cents)
        .bind(purchase.purchase_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO supplier_products (
                id, supplier_id, product_id, is_main_supplier,
                supply_price_cents, last_supply_date
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5)
            ON CONFLICT (supplier_id, product_id) DO UPDATE SET
                supply_price_cents = excluded.supply_price_cents,
                last_supply_date = excluded.last_supply_date
            "#,
        )
        .bind(new_id())
        .bind(&purchase.supplier_id)
        .bind(&purchase.product_id)
        .bind(purchase.price_per_unit_cents)
        .bind(purchase.purchase_date)
        .execute(&mut *tx)
        .await?;

        product::return_stock(&mut tx, &purchase.product_id, purchase.quantity).await?;

        tx.commit().await?;

        info!(
            supplier_id = %purchase.supplier_id,
            product_id = %purchase.product_id,
            quantity = purchase.quantity,
            "Supplier purchase recorded"
        );

        Ok(purchase)
    }

    /// Deliveries of a product, newest first.
    pub async fn purchases_for_product(&self, product_id: &str) -> DbResult<Vec<SupplierPurchase>> {
        let purchases = sqlx::query_as::<_, SupplierPurchase>(
            r#"
            SELECT id, supplier_id, product_id, quantity,
                   price_per_unit_cents, total_price_cents, purchase_date
            FROM supplier_purchases
            WHERE product_id = ?1
            ORDER BY purchase_date DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_categories() {
        let db = fixtures::db().await;
        let catalog = db.catalog();

        let pets = catalog.create_category("Pets", None, None).await.unwrap();
        let cats = catalog
            .create_category("Cat food", Some("  "), Some(&pets.id))
            .await
            .unwrap();

        assert_eq!(cats.parent_id.as_deref(), Some(pets.id.as_str()));
        assert!(cats.description.is_none());

        let all = catalog.list_categories().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Cat food");
        assert!(catalog.get_category(&pets.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_purchase_restocks() {
        let db = fixtures::db().await;
        let product = fixtures::product(&db, "PARROT-CAGE", 9900, 1).await;
        let supplier = db
            .catalog()
            .create_supplier(NewSupplier {
                name: "Feathers Ltd".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let purchase = db
            .catalog()
            .record_purchase(&supplier.id, &product.id, 4, 6000)
            .await
            .unwrap();
        assert_eq!(purchase.total_price_cents, 24000);

        // A second delivery updates the same supplier link
        db.catalog()
            .record_purchase(&supplier.id, &product.id, 1, 5500)
            .await
            .unwrap();

        let product = db.products().require(&product.id).await.unwrap();
        assert_eq!(product.quantity, 6);

        let links = db.catalog().supplier_products_for(&product.id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].supply_price_cents, 5500);
        assert!(links[0].last_supply_date.is_some());

        let purchases = db.catalog().purchases_for_product(&product.id).await.unwrap();
        assert_eq!(purchases.len(), 2);
    }

    #[tokio::test]
    async fn test_record_purchase_rejects_bad_quantity() {
        let db = fixtures::db().await;
        let product = fixtures::product(&db, "LEASH", 700, 0).await;

        let result = db.catalog().record_purchase("nobody", &product.id, 0, 100).await;
        assert!(result.is_err());

        // Unknown supplier fails the FK and rolls back the stock change
        let result = db.catalog().record_purchase("nobody", &product.id, 2, 100).await;
        assert!(result.is_err());
        let product = db.products().require(&product.id).await.unwrap();
        assert_eq!(product.quantity, 0);

        // Total price past i64::MAX
        let err = db
            .catalog()
            .record_purchase("nobody", &product.id, i64::MAX, 100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::DbError::Domain(CoreError::InvalidQuantity { .. })
        ));
    }

    #[tokio::test]
    async fn test_link_supplier() {
        let db = fixtures::db().await;
        let product = fixtures::product(&db, "AQUARIUM", 20000, 1).await;
        let supplier = db
            .catalog()
            .create_supplier(NewSupplier {
                name: "Glassworks".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let link = db
            .catalog()
            .link_supplier(&supplier.id, &product.id, 15000, true)
            .await
            .unwrap();
        assert!(link.is_main_supplier);
        assert!(link.last_supply_date.is_none());
    }
}
