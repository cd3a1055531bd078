//! # Statistics Command
//!
//! The staff dashboard, recomputed from all orders on every call.

use tracing::{debug, info};
use zoo_core::stats::Dashboard;

use super::require_staff;
use crate::error::ApiError;
use crate::state::DbState;

/// Revenue summary, category and product rankings, status counts.
pub async fn get_statistics(db: &DbState, actor_id: &str) -> Result<Dashboard, ApiError> {
    debug!(actor_id = %actor_id, "get_statistics command");
    require_staff(db, actor_id).await?;

    let dashboard = db.inner().statistics().dashboard().await?;
    info!(
        orders = dashboard.revenue.order_count,
        revenue = %dashboard.revenue.total_revenue,
        "Statistics computed"
    );
    Ok(dashboard)
}
