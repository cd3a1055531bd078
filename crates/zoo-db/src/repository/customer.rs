//! # Customer Repository
//!
//! Accounts that shop or, flagged as staff, manage the shop.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::new_id;
use zoo_core::validation::{validate_birth_date, validate_name};
use zoo_core::{CoreError, Customer};

/// Fields for registering a customer.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_staff: bool,
}

/// Repository for customer accounts.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer. Usernames are unique.
    pub async fn create(&self, new: NewCustomer) -> DbResult<Customer> {
        let username = new.username.trim().to_string();
        validate_name("username", &username).map_err(CoreError::from)?;

        let now = Utc::now();
        if let Some(birth) = new.birth_date {
            validate_birth_date(birth, now.date_naive()).map_err(CoreError::from)?;
        }

        let customer = Customer {
            id: new_id(),
            username,
            email: blank_to_none(new.email),
            phone: blank_to_none(new.phone),
            address: blank_to_none(new.address),
            birth_date: new.birth_date,
            is_staff: new.is_staff,
            created_at: now,
        };

        debug!(username = %customer.username, is_staff = customer.is_staff, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers
                (id, username, email, phone, address, birth_date, is_staff, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.username)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.birth_date)
        .bind(customer.is_staff)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, username, email, phone, address, birth_date, is_staff, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, username, email, phone, address, birth_date, is_staff, created_at
            FROM customers
            WHERE username = ?1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Every account, staff included, by username.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, username, email, phone, address, birth_date, is_staff, created_at
            FROM customers
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing customer is an error.
    pub async fn require(&self, id: &str) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()).into())
    }

    /// Requires the customer to be staff.
    pub async fn require_staff(&self, id: &str) -> DbResult<Customer> {
        let customer = self.require(id).await?;
        if !customer.is_staff {
            return Err(CoreError::not_permitted("staff only").into());
        }
        Ok(customer)
    }

    /// Requires a non-staff account. Staff manage the shop but do not buy.
    pub async fn require_shopper(&self, id: &str) -> DbResult<Customer> {
        let customer = self.require(id).await?;
        if customer.is_staff {
            return Err(CoreError::not_permitted("staff accounts cannot shop").into());
        }
        Ok(customer)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
