//! # Repository Module
//!
//! Database repositories for Zooshop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  storefront command                                                     │
//! │       │                                                                 │
//! │       │  db.carts().add(customer_id, product_id, 2)                     │
//! │       ▼                                                                 │
//! │  CartRepository                                                         │
//! │  ├── load(&self, customer_id)        ──► Cart (live prices)             │
//! │  ├── add(&self, customer, product, qty)                                 │
//! │  │        │                                                             │
//! │  │        └── zoo_core::cart::plan_add decides, SQL applies             │
//! │  └── update / increase / decrease / remove / clear                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Business rules stay in zoo-core; repositories only load and store.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - accounts and staff flag
//! - [`ProductRepository`](product::ProductRepository) - product CRUD, search, stock
//! - [`CatalogRepository`](catalog::CatalogRepository) - categories, suppliers, purchases
//! - [`CartRepository`](cart::CartRepository) - the cart ledger
//! - [`PromoRepository`](promo::PromoRepository) - promo codes and usages
//! - [`OrderRepository`](order::OrderRepository) - order history and status
//! - [`ReviewRepository`](review::ReviewRepository) - product reviews
//! - [`StatisticsRepository`](statistics::StatisticsRepository) - dashboard inputs

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod product;
pub mod promo;
pub mod review;
pub mod statistics;

/// Fresh UUID v4 as a string, the ID format of every table.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shared fixtures for repository tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;
    use crate::repository::product::NewProduct;
    use zoo_core::{Customer, Product};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn customer(db: &Database, username: &str) -> Customer {
        db.customers()
            .create(NewCustomer {
                username: username.to_string(),
                email: Some(format!("{}@example.com", username)),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn staff(db: &Database, username: &str) -> Customer {
        db.customers()
            .create(NewCustomer {
                username: username.to_string(),
                is_staff: true,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, article: &str, price_cents: i64, quantity: i64) -> Product {
        db.products()
            .insert(NewProduct {
                name: format!("Product {}", article),
                article: article.to_string(),
                description: None,
                category_id: None,
                price_cents,
                quantity,
            })
            .await
            .unwrap()
    }
}
