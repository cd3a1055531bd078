//! # Demo Data
//!
//! Fills an empty database with a small pet-shop catalog, two accounts and
//! a welcome promo. Used by the `seed` binary and `zooshop seed`.
//!
//! Each product gets:
//! - Article: `{CATEGORY}-{NAME}-{INDEX}`
//! - Price: 1.99 - 39.99 plus a size addon
//! - Stock: 0 - 40

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::catalog::NewSupplier;
use crate::repository::customer::NewCustomer;
use crate::repository::product::NewProduct;
use zoo_core::promo::PromoDraft;

/// Product names per category.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "CAT",
        "Cats",
        &["Dry Food", "Wet Food", "Litter", "Scratching Post", "Feather Wand"],
    ),
    (
        "DOG",
        "Dogs",
        &["Kibble", "Chew Bone", "Leash", "Collar", "Squeaky Ball"],
    ),
    ("BRD", "Birds", &["Seed Mix", "Cage", "Perch", "Cuttlebone"]),
    ("FSH", "Fish", &["Flakes", "Aquarium", "Filter", "Water Conditioner"]),
    ("ROD", "Rodents", &["Hay", "Wheel", "Bedding", "Pellets"]),
];

/// Size variants with their price addon in cents.
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 250), ("Large", 600)];

/// What a seed run created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
    pub promos: usize,
    /// Set when the database already had products and nothing was written.
    pub skipped: bool,
}

/// Seeds up to `max_products` products plus accounts and a promo.
pub async fn seed_demo(db: &Database, max_products: usize) -> DbResult<SeedReport> {
    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..Default::default()
        });
    }

    let mut report = SeedReport::default();

    let supplier = db
        .catalog()
        .create_supplier(NewSupplier {
            name: "Happy Paws Wholesale".to_string(),
            address: "12 Market St".to_string(),
            phone: "+375 17 000 00 00".to_string(),
            email: "orders@happypaws.example".to_string(),
        })
        .await?;

    let mut seed = 0usize;
    'categories: for (code, category_name, names) in CATEGORIES {
        let category = db.catalog().create_category(category_name, None, None).await?;
        report.categories += 1;

        for name in names.iter() {
            for (size, addon) in SIZES {
                if report.products >= max_products {
                    break 'categories;
                }

                let product = db
                    .products()
                    .insert(generate_product(code, name, size, *addon, &category.id, seed))
                    .await?;
                db.catalog()
                    .link_supplier(&supplier.id, &product.id, product.price_cents * 6 / 10, true)
                    .await?;

                report.products += 1;
                seed += 1;
            }
        }
    }

    db.customers()
        .create(NewCustomer {
            username: "admin".to_string(),
            email: Some("admin@zooshop.example".to_string()),
            is_staff: true,
            ..Default::default()
        })
        .await?;
    db.customers()
        .create(NewCustomer {
            username: "demo".to_string(),
            email: Some("demo@zooshop.example".to_string()),
            address: Some("1 Demo Lane".to_string()),
            ..Default::default()
        })
        .await?;
    report.customers = 2;

    let now = Utc::now();
    db.promos()
        .create(PromoDraft {
            code: "WELCOME5".to_string(),
            description: Some("5.00 off a first order of 20.00 or more".to_string()),
            discount_cents: 500,
            valid_from: now,
            valid_until: now + Duration::days(365),
            min_order_cents: 2000,
            max_uses: None,
            is_active: true,
        })
        .await?;
    report.promos = 1;

    info!(
        categories = report.categories,
        products = report.products,
        "Demo data seeded"
    );

    Ok(report)
}

fn generate_product(
    code: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    category_id: &str,
    seed: usize,
) -> NewProduct {
    let short: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();

    NewProduct {
        name: format!("{} {}", name, size),
        article: format!("{}-{}-{:03}", code, short, seed),
        description: None,
        category_id: Some(category_id.to_string()),
        price_cents: 199 + ((seed * 37) % 3800) as i64 + price_addon,
        quantity: (seed % 41) as i64,
    }
}
