//! # Statistics Aggregator
//!
//! Read-only reducers over historical orders. Recomputed per request from
//! rows loaded by `zoo_db::repository::statistics`; nothing is cached.
//!
//! ## Dashboard Contents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order totals ──► summarize ──► revenue, mean, median, mode,            │
//! │                                 variance, std deviation                 │
//! │                                                                         │
//! │  Sold lines ────► rank_categories ──► popularity (Σ qty)                │
//! │                                       profitability (Σ price × qty)     │
//! │              └──► top_products ─────► top 3 by quantity / by revenue    │
//! │                                                                         │
//! │  Statuses ──────► count_by_status ──► orders per status                 │
//! │                                                                         │
//! │  Birth dates ───► summarize_ages ───► client age mean, median           │
//! │  Products ──────► products_alphabetical                                 │
//! │  Customers ─────► clients_alphabetical (staff left out)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All orders count, whatever their status. Money values are exact decimals
//! in major units; mean, variance and standard deviation are rounded to two
//! places, the median is exact.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Customer, OrderStatus, Product};
use crate::TOP_PRODUCTS_LIMIT;

// =============================================================================
// Revenue Summary
// =============================================================================

/// Most frequent order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Mode {
    /// No orders.
    Empty,
    /// One value has the highest frequency.
    Single(Money),
    /// Several distinct values share the highest frequency, ascending.
    Tied(Vec<Money>),
}

/// Summary statistics over order totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub order_count: usize,
    pub total_revenue: Money,
    pub mean: Decimal,
    pub median: Decimal,
    pub mode: Mode,
    /// Population variance.
    pub variance: Decimal,
    /// Population standard deviation.
    pub std_dev: Decimal,
}

/// Mean of the values, unrounded. Zero for an empty slice.
fn exact_mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().copied().sum::<Decimal>() / Decimal::from(values.len() as i64)
}

/// Median: the central value, or the mean of the two central values.
///
/// ```rust
/// use rust_decimal::Decimal;
/// use zoo_core::money::Money;
/// use zoo_core::stats::median;
///
/// let even: Vec<Money> = [1000, 2000, 3000, 4000].map(Money::from_cents).to_vec();
/// assert_eq!(median(&even), Decimal::new(25, 0));
///
/// let odd: Vec<Money> = [1000, 2000, 3000].map(Money::from_cents).to_vec();
/// assert_eq!(median(&odd), Decimal::new(20, 0));
/// ```
pub fn median(totals: &[Money]) -> Decimal {
    median_of(totals.iter().map(Money::to_decimal).collect())
}

fn median_of(mut values: Vec<Decimal>) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }

    values.sort();

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / Decimal::TWO
    } else {
        values[mid]
    }
}

/// Most frequent value, reporting ties instead of picking one.
pub fn mode(totals: &[Money]) -> Mode {
    if totals.is_empty() {
        return Mode::Empty;
    }

    let mut frequency: BTreeMap<Money, usize> = BTreeMap::new();
    for total in totals {
        *frequency.entry(*total).or_default() += 1;
    }

    let highest = frequency.values().copied().max().unwrap_or(0);
    let tied: Vec<Money> = frequency
        .iter()
        .filter(|(_, count)| **count == highest)
        .map(|(value, _)| *value)
        .collect();

    match tied.as_slice() {
        [single] => Mode::Single(*single),
        _ => Mode::Tied(tied),
    }
}

/// Population variance and standard deviation, unrounded.
fn spread(values: &[Decimal]) -> (Decimal, Decimal) {
    if values.is_empty() {
        return (Decimal::ZERO, Decimal::ZERO);
    }

    let mean = exact_mean(values);
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len() as i64);
    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

    (variance, std_dev)
}

/// Reduces order totals into a [`RevenueSummary`].
pub fn summarize(totals: &[Money]) -> RevenueSummary {
    let values: Vec<Decimal> = totals.iter().map(Money::to_decimal).collect();
    let (variance, std_dev) = spread(&values);

    RevenueSummary {
        order_count: totals.len(),
        total_revenue: totals.iter().copied().sum(),
        mean: exact_mean(&values).round_dp(2),
        median: median(totals),
        mode: mode(totals),
        variance: variance.round_dp(2),
        std_dev: std_dev.round_dp(2),
    }
}

// =============================================================================
// Rankings
// =============================================================================

/// One sold order line with its product and category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SoldLine {
    pub product_id: String,
    pub product_name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub quantity: i64,
    /// Frozen unit price.
    pub price_cents: i64,
}

impl SoldLine {
    fn revenue(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// Sales aggregated per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category_id: Option<String>,
    pub category_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Sales aggregated per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Categories sorted by units sold and by revenue, both descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRankings {
    pub popularity: Vec<CategorySales>,
    pub profitability: Vec<CategorySales>,
}

impl CategoryRankings {
    pub fn most_popular(&self) -> Option<&CategorySales> {
        self.popularity.first()
    }

    pub fn most_profitable(&self) -> Option<&CategorySales> {
        self.profitability.first()
    }
}

const UNCATEGORIZED: &str = "Uncategorized";

/// Groups sold lines by category and ranks them.
///
/// Ties are broken by category name.
pub fn rank_categories(lines: &[SoldLine]) -> CategoryRankings {
    let mut by_category: HashMap<Option<String>, CategorySales> = HashMap::new();
    for line in lines {
        let entry = by_category
            .entry(line.category_id.clone())
            .or_insert_with(|| CategorySales {
                category_id: line.category_id.clone(),
                category_name: line
                    .category_name
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                quantity: 0,
                revenue: Money::zero(),
            });
        entry.quantity += line.quantity;
        entry.revenue += line.revenue();
    }

    let mut popularity: Vec<CategorySales> = by_category.into_values().collect();
    let mut profitability = popularity.clone();

    popularity.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    profitability.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    CategoryRankings {
        popularity,
        profitability,
    }
}

fn product_totals(lines: &[SoldLine]) -> Vec<ProductSales> {
    let mut by_product: HashMap<&str, ProductSales> = HashMap::new();
    for line in lines {
        let entry = by_product
            .entry(line.product_id.as_str())
            .or_insert_with(|| ProductSales {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: 0,
                revenue: Money::zero(),
            });
        entry.quantity += line.quantity;
        entry.revenue += line.revenue();
    }
    by_product.into_values().collect()
}

fn by_name_then_id(a: &ProductSales, b: &ProductSales) -> Ordering {
    a.product_name
        .cmp(&b.product_name)
        .then_with(|| a.product_id.cmp(&b.product_id))
}

/// Top products by units sold. Products with nothing sold are left out.
pub fn top_by_quantity(lines: &[SoldLine], limit: usize) -> Vec<ProductSales> {
    let mut products: Vec<ProductSales> = product_totals(lines)
        .into_iter()
        .filter(|p| p.quantity > 0)
        .collect();
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| by_name_then_id(a, b)));
    products.truncate(limit);
    products
}

/// Top products by revenue. Products with no revenue are left out.
pub fn top_by_revenue(lines: &[SoldLine], limit: usize) -> Vec<ProductSales> {
    let mut products: Vec<ProductSales> = product_totals(lines)
        .into_iter()
        .filter(|p| p.revenue.is_positive())
        .collect();
    products.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| by_name_then_id(a, b)));
    products.truncate(limit);
    products
}

// =============================================================================
// Counts
// =============================================================================

/// Number of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Counts orders per status, listing every status even when zero.
pub fn count_by_status(statuses: &[OrderStatus]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: statuses.iter().filter(|s| *s == status).count() as i64,
        })
        .collect()
}

/// Number of products in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryProductCount {
    pub category_id: String,
    pub category_name: String,
    pub product_count: i64,
}

/// Average star rating rounded to two places, `None` without ratings.
pub fn average_rating(ratings: &[i64]) -> Option<Decimal> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().sum();
    Some((Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(2))
}

// =============================================================================
// Clients and Listings
// =============================================================================

/// Age in full years on `today`. The birthday itself counts.
///
/// ```rust
/// use chrono::NaiveDate;
/// use zoo_core::stats::age_on;
///
/// let birth = NaiveDate::from_ymd_opt(2000, 3, 10).unwrap();
/// assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), 23);
/// assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()), 24);
/// ```
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

/// Ages of the clients that gave a birth date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeSummary {
    pub client_count: usize,
    /// Rounded to two places. `None` without birth dates.
    pub mean: Option<Decimal>,
    pub median: Option<Decimal>,
}

/// Reduces birth dates into an [`AgeSummary`] as of `today`.
pub fn summarize_ages(birth_dates: &[NaiveDate], today: NaiveDate) -> AgeSummary {
    if birth_dates.is_empty() {
        return AgeSummary {
            client_count: 0,
            mean: None,
            median: None,
        };
    }

    let ages: Vec<Decimal> = birth_dates
        .iter()
        .map(|birth| Decimal::from(age_on(*birth, today)))
        .collect();

    AgeSummary {
        client_count: ages.len(),
        mean: Some(exact_mean(&ages).round_dp(2)),
        median: Some(median_of(ages)),
    }
}

/// One product in the alphabetical catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    pub product_id: String,
    pub name: String,
    pub article: String,
    pub price: Money,
    pub quantity: i64,
}

/// Products by name, ignoring case, then by ID.
pub fn products_alphabetical(products: &[Product]) -> Vec<ProductListing> {
    let mut listing: Vec<ProductListing> = products
        .iter()
        .map(|p| ProductListing {
            product_id: p.id.clone(),
            name: p.name.clone(),
            article: p.article.clone(),
            price: Money::from_cents(p.price_cents),
            quantity: p.quantity,
        })
        .collect();
    listing.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    listing
}

/// One client in the alphabetical client listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListing {
    pub customer_id: String,
    pub username: String,
    pub email: Option<String>,
    pub age: Option<i64>,
}

/// Non-staff accounts by username.
pub fn clients_alphabetical(customers: &[Customer], today: NaiveDate) -> Vec<ClientListing> {
    let mut listing: Vec<ClientListing> = customers
        .iter()
        .filter(|c| !c.is_staff)
        .map(|c| ClientListing {
            customer_id: c.id.clone(),
            username: c.username.clone(),
            email: c.email.clone(),
            age: c.birth_date.map(|birth| age_on(birth, today)),
        })
        .collect();
    listing.sort_by(|a, b| a.username.cmp(&b.username));
    listing
}

// =============================================================================
// Dashboard
// =============================================================================

/// Rows the dashboard is computed from.
#[derive(Debug, Clone, Default)]
pub struct DashboardInputs {
    pub order_totals: Vec<Money>,
    pub statuses: Vec<OrderStatus>,
    pub sold: Vec<SoldLine>,
    pub products_per_category: Vec<CategoryProductCount>,
    pub products: Vec<Product>,
    /// Every account; staff are filtered out here.
    pub customers: Vec<Customer>,
}

/// Everything the staff statistics page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub revenue: RevenueSummary,
    pub most_popular_category: Option<CategorySales>,
    pub most_profitable_category: Option<CategorySales>,
    pub categories: CategoryRankings,
    pub top_by_quantity: Vec<ProductSales>,
    pub top_by_revenue: Vec<ProductSales>,
    pub orders_by_status: Vec<StatusCount>,
    pub products_per_category: Vec<CategoryProductCount>,
    pub client_ages: AgeSummary,
    pub products_alphabetical: Vec<ProductListing>,
    pub clients_alphabetical: Vec<ClientListing>,
}

impl Dashboard {
    /// Builds the dashboard with ages counted as of `today`.
    pub fn build(inputs: DashboardInputs, today: NaiveDate) -> Self {
        let DashboardInputs {
            order_totals,
            statuses,
            sold,
            products_per_category,
            products,
            customers,
        } = inputs;

        let birth_dates: Vec<NaiveDate> = customers
            .iter()
            .filter(|c| !c.is_staff)
            .filter_map(|c| c.birth_date)
            .collect();

        let categories = rank_categories(&sold);
        Dashboard {
            revenue: summarize(&order_totals),
            most_popular_category: categories.most_popular().cloned(),
            most_profitable_category: categories.most_profitable().cloned(),
            top_by_quantity: top_by_quantity(&sold, TOP_PRODUCTS_LIMIT),
            top_by_revenue: top_by_revenue(&sold, TOP_PRODUCTS_LIMIT),
            categories,
            orders_by_status: count_by_status(&statuses),
            products_per_category,
            client_ages: summarize_ages(&birth_dates, today),
            products_alphabetical: products_alphabetical(&products),
            clients_alphabetical: clients_alphabetical(&customers, today),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: &[i64]) -> Vec<Money> {
        cents.iter().copied().map(Money::from_cents).collect()
    }

    fn sold(product: &str, category: Option<&str>, quantity: i64, price_cents: i64) -> SoldLine {
        SoldLine {
            product_id: format!("id-{}", product),
            product_name: product.to_string(),
            category_id: category.map(|c| format!("cat-{}", c)),
            category_name: category.map(str::to_string),
            quantity,
            price_cents,
        }
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&money(&[1000, 2000, 3000, 4000])), Decimal::new(25, 0));
        assert_eq!(median(&money(&[3000, 1000, 2000])), Decimal::new(20, 0));
        assert_eq!(median(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_mode_variants() {
        assert_eq!(mode(&[]), Mode::Empty);
        assert_eq!(
            mode(&money(&[1000, 2000, 2000])),
            Mode::Single(Money::from_cents(2000))
        );
        assert_eq!(
            mode(&money(&[3000, 1000, 2000])),
            Mode::Tied(money(&[1000, 2000, 3000]))
        );
        assert_eq!(
            mode(&money(&[3000, 1000, 1000, 3000, 2000])),
            Mode::Tied(money(&[1000, 3000]))
        );
        assert_eq!(mode(&money(&[1500])), Mode::Single(Money::from_cents(1500)));
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&money(&[1000, 2000, 3000, 4000]));
        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.total_revenue.cents(), 10_000);
        assert_eq!(summary.mean, Decimal::new(25, 0));
        // Population variance of 10, 20, 30, 40 is 125.
        assert_eq!(summary.variance, Decimal::new(125, 0));
        assert_eq!(summary.std_dev, Decimal::new(1118, 2));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.order_count, 0);
        assert!(summary.total_revenue.is_zero());
        assert_eq!(summary.mean, Decimal::ZERO);
        assert_eq!(summary.std_dev, Decimal::ZERO);
        assert_eq!(summary.mode, Mode::Empty);
    }

    #[test]
    fn test_rank_categories() {
        let lines = vec![
            sold("Dog leash", Some("Dogs"), 5, 500),
            sold("Dog bed", Some("Dogs"), 1, 4000),
            sold("Fish food", Some("Fish"), 10, 100),
            sold("Cat toy", None, 1, 300),
        ];
        let rankings = rank_categories(&lines);

        assert_eq!(rankings.most_popular().unwrap().category_name, "Fish");
        assert_eq!(rankings.most_popular().unwrap().quantity, 10);
        assert_eq!(rankings.most_profitable().unwrap().category_name, "Dogs");
        assert_eq!(rankings.most_profitable().unwrap().revenue.cents(), 6500);
        assert_eq!(rankings.popularity.last().unwrap().category_name, UNCATEGORIZED);
    }

    #[test]
    fn test_rank_categories_empty() {
        let rankings = rank_categories(&[]);
        assert!(rankings.most_popular().is_none());
        assert!(rankings.most_profitable().is_none());
    }

    #[test]
    fn test_top_products_ties_by_name() {
        let lines = vec![
            sold("Parrot seed", None, 2, 100),
            sold("Aquarium", None, 2, 100),
            sold("Hamster wheel", None, 3, 100),
            sold("Zebra finch food", None, 2, 100),
            sold("Free sticker", None, 5, 0),
        ];

        let by_qty: Vec<String> = top_by_quantity(&lines, 3)
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(by_qty, vec!["Free sticker", "Hamster wheel", "Aquarium"]);

        let by_revenue: Vec<String> = top_by_revenue(&lines, 3)
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(by_revenue, vec!["Hamster wheel", "Aquarium", "Parrot seed"]);
    }

    #[test]
    fn test_top_products_merges_lines() {
        let lines = vec![sold("Dog bed", None, 1, 4000), sold("Dog bed", None, 2, 3500)];
        let top = top_by_revenue(&lines, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[0].revenue.cents(), 11_000);
    }

    #[test]
    fn test_count_by_status_lists_all() {
        let counts = count_by_status(&[OrderStatus::Paid, OrderStatus::Paid, OrderStatus::Cancelled]);
        assert_eq!(counts.len(), OrderStatus::ALL.len());
        assert_eq!(counts[0], StatusCount { status: OrderStatus::Processing, count: 0 });
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[4].count, 1);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client(username: &str, birth_date: Option<NaiveDate>, is_staff: bool) -> Customer {
        Customer {
            id: format!("id-{}", username),
            username: username.to_string(),
            email: None,
            phone: None,
            address: None,
            birth_date,
            is_staff,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = date(1990, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), 33);
        assert_eq!(age_on(birth, date(2024, 6, 15)), 34);
        assert_eq!(age_on(birth, date(2024, 12, 1)), 34);

        // Leap day birthdays turn over on March 1st in common years.
        let leap = date(2000, 2, 29);
        assert_eq!(age_on(leap, date(2023, 2, 28)), 22);
        assert_eq!(age_on(leap, date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_summarize_ages() {
        let today = date(2024, 6, 15);
        // Ages 20, 30, 35, 40.
        let births = [date(2004, 1, 1), date(1994, 6, 15), date(1989, 3, 3), date(1984, 6, 1)];
        let summary = summarize_ages(&births, today);
        assert_eq!(summary.client_count, 4);
        assert_eq!(summary.mean, Some(Decimal::new(3125, 2)));
        assert_eq!(summary.median, Some(Decimal::new(325, 1)));

        let odd = summarize_ages(&births[..3], today);
        assert_eq!(odd.median, Some(Decimal::new(30, 0)));

        let empty = summarize_ages(&[], today);
        assert_eq!(empty.client_count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.median, None);
    }

    #[test]
    fn test_clients_alphabetical_skips_staff() {
        let today = date(2024, 6, 15);
        let customers = vec![
            client("zoe", Some(date(2000, 1, 1)), false),
            client("admin", None, true),
            client("bob", None, false),
        ];

        let listing = clients_alphabetical(&customers, today);
        let names: Vec<&str> = listing.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "zoe"]);
        assert_eq!(listing[0].age, None);
        assert_eq!(listing[1].age, Some(24));
    }

    #[test]
    fn test_dashboard_counts_only_client_ages() {
        let today = date(2024, 6, 15);
        let inputs = DashboardInputs {
            customers: vec![
                client("alice", Some(date(2004, 6, 15)), false),
                client("bob", Some(date(1994, 6, 15)), false),
                client("admin", Some(date(1950, 1, 1)), true),
                client("carol", None, false),
            ],
            ..Default::default()
        };

        let dashboard = Dashboard::build(inputs, today);
        assert_eq!(dashboard.client_ages.client_count, 2);
        assert_eq!(dashboard.client_ages.mean, Some(Decimal::new(25, 0)));
        assert_eq!(dashboard.client_ages.median, Some(Decimal::new(25, 0)));
        assert_eq!(dashboard.clients_alphabetical.len(), 3);
        assert!(dashboard.products_alphabetical.is_empty());
        assert_eq!(dashboard.revenue.order_count, 0);
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[5, 4, 4]), Some(Decimal::new(433, 2)));
    }
}
