//! # Zooshop Operator CLI
//!
//! Maintenance and staff reports against the shop database.
//!
//! ```text
//! zooshop [--config zooshop.toml] [--staff admin] <COMMAND>
//!
//!   migrate          apply pending migrations, print status
//!   seed             fill an empty database with demo data
//!   init-config      write the effective configuration to a file
//!   stats            staff dashboard (JSON)
//!   orders           list orders, by status or customer (JSON)
//!   set-status       move an order along its lifecycle
//!   validate-promo   check a code against an amount for a customer
//!   restock          add stock, optionally as a supplier delivery
//! ```
//!
//! Reports go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use storefront::commands::{catalog, order, promo, statistics};
use storefront::state::{AppConfig, DbState};
use storefront::{init_tracing, Storefront};
use tracing::info;
use zoo_db::seed::seed_demo;

#[derive(Debug, Parser)]
#[command(name = "zooshop", about = "Zooshop operator CLI", long_about = None)]
struct Cli {
    /// Config file; defaults to the platform config directory
    #[arg(long, global = true, env = "ZOOSHOP_CONFIG")]
    config: Option<PathBuf>,

    /// Staff account used for staff-only commands
    #[arg(long, global = true, default_value = "admin")]
    staff: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending migrations and print the migration status
    Migrate,
    /// Fill an empty database with demo categories, products and accounts
    Seed(SeedArgs),
    /// Write the effective configuration to the config file
    InitConfig(InitConfigArgs),
    /// Print the statistics dashboard
    Stats,
    /// List orders
    Orders(OrdersArgs),
    /// Change an order's status
    SetStatus(SetStatusArgs),
    /// Check a promo code against an amount
    ValidatePromo(ValidatePromoArgs),
    /// Add stock for a product
    Restock(RestockArgs),
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Maximum number of products to create
    #[arg(long)]
    count: Option<usize>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct OrdersArgs {
    /// Only orders in this status (processing, paid, shipped, delivered, cancelled)
    #[arg(long)]
    status: Option<String>,

    /// Only orders of this customer (username)
    #[arg(long)]
    customer: Option<String>,
}

#[derive(Debug, Args)]
struct SetStatusArgs {
    order_id: String,
    status: String,
}

#[derive(Debug, Args)]
struct ValidatePromoArgs {
    code: String,

    /// Order amount, e.g. 25.00
    amount: String,

    /// Customer (username) the promo would be used by
    #[arg(long)]
    customer: String,
}

#[derive(Debug, Args)]
struct RestockArgs {
    /// Product article
    article: String,

    /// Units to add
    quantity: i64,

    /// Record the units as a delivery from this supplier (name)
    #[arg(long)]
    supplier: Option<String>,

    /// Unit price of the delivery; defaults to the last supply price
    #[arg(long, requires = "supplier")]
    unit_price: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::InitConfig(args) = &cli.command {
        return init_config(cli.config.clone(), args.force);
    }

    let shop = Storefront::start(cli.config.clone()).await?;
    let db = &shop.db;

    match cli.command {
        Commands::Migrate => {
            let status = db.inner().migration_status().await?;
            print_json(&status)?;
        }
        Commands::Seed(args) => {
            let report = seed_demo(db.inner(), args.count.unwrap_or(usize::MAX)).await?;
            print_json(&report)?;
        }
        Commands::InitConfig(_) => {}
        Commands::Stats => {
            let staff_id = account_id(db, &cli.staff).await?;
            let dashboard = statistics::get_statistics(db, &staff_id).await?;
            print_json(&dashboard)?;
        }
        Commands::Orders(args) => {
            let staff_id = account_id(db, &cli.staff).await?;
            let mut orders = order::list_orders(db, &staff_id, args.status.as_deref()).await?;
            if let Some(username) = args.customer {
                let customer_id = account_id(db, &username).await?;
                orders.retain(|o| o.customer_id == customer_id);
            }
            print_json(&orders)?;
        }
        Commands::SetStatus(args) => {
            let staff_id = account_id(db, &cli.staff).await?;
            let updated =
                order::set_order_status(db, &staff_id, &args.order_id, &args.status).await?;
            print_json(&updated)?;
        }
        Commands::ValidatePromo(args) => {
            let customer_id = account_id(db, &args.customer).await?;
            let quote =
                promo::validate_promo(db, &customer_id, &args.code, &args.amount).await?;
            print_json(&quote)?;
        }
        Commands::Restock(args) => {
            let staff_id = account_id(db, &cli.staff).await?;
            let delivery = args.supplier.as_deref().map(|supplier| catalog::Delivery {
                supplier,
                unit_price: args.unit_price.as_deref(),
            });
            let product =
                catalog::restock(db, &staff_id, &args.article, args.quantity, delivery).await?;
            print_json(&product)?;
        }
    }

    db.inner().close().await;
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let target = path
        .or_else(AppConfig::default_config_path)
        .ok_or_else(|| anyhow!("no config path available; pass --config"))?;

    if target.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", target.display());
    }

    let config = AppConfig::load(Some(target.clone()))?;
    let written = config.save(Some(target))?;
    info!(path = %written.display(), "Config written");
    println!("{}", written.display());
    Ok(())
}

async fn account_id(db: &DbState, username: &str) -> anyhow::Result<String> {
    let account = db
        .inner()
        .customers()
        .get_by_username(username)
        .await?
        .with_context(|| format!("no account named '{}'", username))?;
    Ok(account.id)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
