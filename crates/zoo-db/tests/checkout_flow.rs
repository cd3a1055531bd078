//! End-to-end cart → promo → checkout → statistics flows against an
//! in-memory database.

use chrono::{Duration, Utc};
use zoo_core::checkout::{AppliedPromo, CheckoutPolicy, CheckoutRequest, PromoNotice};
use zoo_core::promo::PromoDraft;
use zoo_core::stats::Mode;
use zoo_core::{CoreError, Customer, Money, OrderStatus, Product, Promo, PromoRejection};
use zoo_db::{Database, DbConfig, DbError, NewCustomer, NewProduct};

// =============================================================================
// Fixtures
// =============================================================================

async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn shopper(db: &Database, username: &str) -> Customer {
    db.customers()
        .create(NewCustomer {
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn product(db: &Database, article: &str, price_cents: i64, quantity: i64) -> Product {
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

async fn promo(db: &Database, code: &str, discount_cents: i64, min_order_cents: i64) -> Promo {
    let now = Utc::now();
    db.promos()
        .create(PromoDraft {
            code: code.to_string(),
            description: None,
            discount_cents,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            min_order_cents,
            max_uses: None,
            is_active: true,
        })
        .await
        .unwrap()
}

/// A at 10.00 (stock 5) × 2 and B at 5.00 (stock 1) × 1: subtotal 25.00.
async fn standard_cart(db: &Database, customer: &Customer) -> (Product, Product) {
    let a = product(db, "A-100", 1000, 5).await;
    let b = product(db, "B-200", 500, 1).await;
    db.carts().add(&customer.id, &a.id, 2).await.unwrap();
    db.carts().add(&customer.id, &b.id, 1).await.unwrap();
    (a, b)
}

async fn stock(db: &Database, product: &Product) -> i64 {
    db.products().require(&product.id).await.unwrap().quantity
}

/// Mirrors the storefront's apply step: quote against the cart subtotal.
async fn apply(db: &Database, customer: &Customer, code: &str) -> Result<AppliedPromo, DbError> {
    let subtotal = db.carts().load(&customer.id).await?.total_price();
    let quote = db.promos().quote(code, &customer.id, subtotal, Utc::now()).await?;
    Ok(AppliedPromo::new(quote.code.clone(), quote.discount()))
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_checkout_with_valid_promo() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    let (a, b) = standard_cart(&db, &alice).await;
    let spring = promo(&db, "SPRING5", 500, 2000).await;

    let applied = apply(&db, &alice, "spring5").await.unwrap();
    assert_eq!(applied.discount, "5.00");

    let receipt = db
        .checkout()
        .place_order(&alice.id, Some(&applied), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();

    let order = &receipt.order;
    assert_eq!(order.subtotal_cents, 2500);
    assert_eq!(order.discount_cents, 500);
    assert_eq!(order.total_cents, 2000);
    assert!(order.totals_consistent());
    assert_eq!(order.promo_id.as_deref(), Some(spring.id.as_str()));
    assert_eq!(receipt.items.len(), 2);
    assert!(receipt.promo_notice.is_none());

    assert_eq!(stock(&db, &a).await, 3);
    assert_eq!(stock(&db, &b).await, 0);
    assert!(db.carts().load(&alice.id).await.unwrap().is_empty());

    let usages = db.promos().usages(&spring.id).await.unwrap();
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].order_id.as_deref(), Some(order.id.as_str()));
    let spring = db.promos().get_by_id(&spring.id).await.unwrap().unwrap();
    assert_eq!(spring.uses_count, 1);
}

#[tokio::test]
async fn test_promo_below_minimum_and_plain_checkout() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    standard_cart(&db, &alice).await;
    promo(&db, "BIGSPENDER", 500, 3000).await;

    let err = apply(&db, &alice, "BIGSPENDER").await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::PromoInvalid {
            reason: PromoRejection::BelowMinimum { .. },
            ..
        })
    ));

    let receipt = db
        .checkout()
        .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();
    assert_eq!(receipt.order.total_cents, 2500);
    assert_eq!(receipt.order.discount_cents, 0);
}

#[tokio::test]
async fn test_stale_session_promo_is_dropped() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    standard_cart(&db, &alice).await;
    promo(&db, "BIGSPENDER", 500, 3000).await;

    // Session still remembers a promo that no longer qualifies
    let stale = AppliedPromo::new("BIGSPENDER", Money::from_cents(500));
    let receipt = db
        .checkout()
        .place_order(&alice.id, Some(&stale), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();

    assert_eq!(receipt.order.total_cents, 2500);
    assert!(matches!(
        receipt.promo_notice,
        Some(PromoNotice::NoLongerValid {
            reason: PromoRejection::BelowMinimum { .. },
            ..
        })
    ));

    // A promo deleted from under the session is reported as not found
    let bob = shopper(&db, "bob").await;
    let c = product(&db, "C-300", 700, 2).await;
    db.carts().add(&bob.id, &c.id, 1).await.unwrap();
    let ghost = AppliedPromo::new("GHOST", Money::from_cents(100));
    let receipt = db
        .checkout()
        .place_order(&bob.id, Some(&ghost), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();
    assert_eq!(receipt.order.total_cents, 700);
    assert!(matches!(receipt.promo_notice, Some(PromoNotice::NotFound { .. })));
}

#[tokio::test]
async fn test_overstocked_line_rolls_everything_back() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    let (a, b) = standard_cart(&db, &alice).await;
    let c = product(&db, "C-300", 700, 4).await;
    db.carts().add(&alice.id, &c.id, 4).await.unwrap();

    // Stock drops after the items went into the cart
    db.products().set_quantity(&c.id, 3).await.unwrap();

    let err = db
        .checkout()
        .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock {
            available: 3,
            requested: 4,
            ..
        })
    ));

    assert_eq!(db.orders().count().await.unwrap(), 0);
    assert_eq!(stock(&db, &a).await, 5);
    assert_eq!(stock(&db, &b).await, 1);
    assert_eq!(stock(&db, &c).await, 3);
    assert_eq!(db.carts().load(&alice.id).await.unwrap().total_items(), 7);
}

#[tokio::test]
async fn test_promo_is_single_use_per_customer() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    standard_cart(&db, &alice).await;
    let spring = promo(&db, "SPRING5", 500, 2000).await;

    let applied = apply(&db, &alice, "SPRING5").await.unwrap();
    db.checkout()
        .place_order(&alice.id, Some(&applied), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();

    // Refill the cart above the minimum and try again
    let d = product(&db, "D-400", 2500, 3).await;
    db.carts().add(&alice.id, &d.id, 1).await.unwrap();

    let err = apply(&db, &alice, "SPRING5").await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::PromoInvalid {
            reason: PromoRejection::AlreadyUsed,
            ..
        })
    ));

    // Replaying the old session value does not get the discount either
    let receipt = db
        .checkout()
        .place_order(&alice.id, Some(&applied), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();
    assert_eq!(receipt.order.discount_cents, 0);
    assert!(matches!(
        receipt.promo_notice,
        Some(PromoNotice::NoLongerValid {
            reason: PromoRejection::AlreadyUsed,
            ..
        })
    ));
    assert_eq!(db.promos().usages(&spring.id).await.unwrap().len(), 1);

    // Another customer can still use it
    let bob = shopper(&db, "bob").await;
    db.carts().add(&bob.id, &d.id, 1).await.unwrap();
    assert!(apply(&db, &bob, "SPRING5").await.is_ok());
}

#[tokio::test]
async fn test_tampered_session_discount_rejected() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    let (a, _) = standard_cart(&db, &alice).await;
    let spring = promo(&db, "SPRING5", 500, 2000).await;

    for forged in ["25.00", "5.001", "five"] {
        let tampered = AppliedPromo {
            code: "SPRING5".to_string(),
            discount: forged.to_string(),
        };
        let err = db
            .checkout()
            .place_order(&alice.id, Some(&tampered), CheckoutRequest::default(), &CheckoutPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::PromoTampering { .. })));
    }

    assert_eq!(db.orders().count().await.unwrap(), 0);
    assert_eq!(stock(&db, &a).await, 5);
    assert!(db.promos().usages(&spring.id).await.unwrap().is_empty());

    // Trailing zeros are the same amount
    let padded = AppliedPromo {
        code: "SPRING5".to_string(),
        discount: "5.000".to_string(),
    };
    let receipt = db
        .checkout()
        .place_order(&alice.id, Some(&padded), CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();
    assert_eq!(receipt.order.total_cents, 2000);
}

#[tokio::test]
async fn test_order_prices_are_frozen() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    let (a, _) = standard_cart(&db, &alice).await;

    let receipt = db
        .checkout()
        .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();

    db.products().set_price(&a.id, 9900).await.unwrap();

    let detail = db
        .orders()
        .get_for_customer(&receipt.order.id, &alice.id)
        .await
        .unwrap();
    let line = detail.lines.iter().find(|l| l.product_id == a.id).unwrap();
    assert_eq!(line.price_cents, 1000);
    assert_eq!(detail.order.total_cents, 2500);

    let bob = shopper(&db, "bob").await;
    let err = db
        .orders()
        .get_for_customer(&receipt.order.id, &bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(_))));
}

#[tokio::test]
async fn test_status_lifecycle_and_cancel_restores_stock() {
    let db = setup().await;
    let alice = shopper(&db, "alice").await;
    let (a, b) = standard_cart(&db, &alice).await;

    let receipt = db
        .checkout()
        .place_order(&alice.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
        .await
        .unwrap();
    let id = receipt.order.id.clone();

    let paid = db.orders().update_status(&id, OrderStatus::Paid).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    let err = db
        .orders()
        .update_status(&id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InvalidStatusTransition { .. })
    ));

    db.orders().update_status(&id, OrderStatus::Cancelled).await.unwrap();
    assert_eq!(stock(&db, &a).await, 5);
    assert_eq!(stock(&db, &b).await, 1);

    assert!(db.orders().update_status(&id, OrderStatus::Shipped).await.is_err());

    let cancelled = db.orders().list_all(Some(OrderStatus::Cancelled)).await.unwrap();
    assert_eq!(cancelled.len(), 1);
    assert!(db.orders().list_all(Some(OrderStatus::Paid)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_after_orders() {
    let db = setup().await;
    let pets = db.catalog().create_category("Dogs", None, None).await.unwrap();
    let bone = db
        .products()
        .insert(NewProduct {
            name: "Chew Bone".to_string(),
            article: "DOG-BONE".to_string(),
            description: None,
            category_id: Some(pets.id.clone()),
            price_cents: 1000,
            quantity: 20,
        })
        .await
        .unwrap();
    let seed = product(&db, "SEED", 2000, 20).await;

    for (name, bones, seeds) in [("alice", 1, 0), ("bob", 2, 0), ("carol", 0, 1)] {
        let customer = shopper(&db, name).await;
        if bones > 0 {
            db.carts().add(&customer.id, &bone.id, bones).await.unwrap();
        }
        if seeds > 0 {
            db.carts().add(&customer.id, &seed.id, seeds).await.unwrap();
        }
        db.checkout()
            .place_order(&customer.id, None, CheckoutRequest::default(), &CheckoutPolicy::default())
            .await
            .unwrap();
    }

    let dashboard = db.statistics().dashboard().await.unwrap();
    assert_eq!(dashboard.revenue.order_count, 3);
    assert_eq!(dashboard.revenue.total_revenue.cents(), 5000);
    // Totals 10.00, 20.00, 20.00
    assert_eq!(dashboard.revenue.mode, Mode::Single(Money::from_cents(2000)));

    let popular = dashboard.most_popular_category.unwrap();
    assert_eq!(popular.category_name, "Dogs");
    assert_eq!(popular.quantity, 3);

    assert_eq!(dashboard.top_by_quantity[0].product_name, "Chew Bone");
    assert_eq!(dashboard.top_by_revenue[0].revenue.cents(), 3000);

    let processing = dashboard
        .orders_by_status
        .iter()
        .find(|s| s.status == OrderStatus::Processing)
        .unwrap();
    assert_eq!(processing.count, 3);
}
