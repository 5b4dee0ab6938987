//! Postgres order repository.
//!
//! Updates go through [`OrderUpdate`], a sparse intent object: only the
//! fields that are present are written, so a legitimate zero value can
//! still be set and an absent field is never clobbered.

use crate::error::OrderError;
use crate::model::{Order, OrderStatus, PaymentMethod};
use crate::service::OrderRepository;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

/// A new order row; the database assigns the id.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owner of the order.
    pub user_id: Uuid,
    /// Parts the order is composed of.
    pub part_ids: Vec<Uuid>,
    /// Total price in cents.
    pub total_price: i64,
    /// Initial status.
    pub status: OrderStatus,
}

/// Sparse update intent.
///
/// `expected_status`, when present, turns the update into an optimistic
/// write: the row is only touched while it still has that status, and a
/// zero-row outcome is reported as a conflict.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    /// Replace the part list.
    pub part_ids: Option<Vec<Uuid>>,
    /// Replace the total price.
    pub total_price: Option<i64>,
    /// Set the payment transaction.
    pub transaction_id: Option<Uuid>,
    /// Set the payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Move to a new status.
    pub status: Option<OrderStatus>,
    /// Optimistic guard: only update while the row has this status.
    pub expected_status: Option<OrderStatus>,
}

impl OrderUpdate {
    /// Whether the intent writes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.part_ids.is_none()
            && self.total_price.is_none()
            && self.transaction_id.is_none()
            && self.payment_method.is_none()
            && self.status.is_none()
    }

    /// Transitioning to `PAID` requires the paid metadata to land in the
    /// same write; enforced here so no code path can persist a paid
    /// order without it.
    pub(crate) fn validate(&self) -> Result<(), OrderError> {
        if self.status == Some(OrderStatus::Paid)
            && (self.transaction_id.is_none() || self.payment_method.is_none())
        {
            return Err(OrderError::Internal(anyhow::anyhow!(
                "setting status=PAID requires transaction_id and payment_method"
            )));
        }
        Ok(())
    }
}

/// sqlx-backed [`OrderRepository`].
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Uuid, OrderError> {
        let row = sqlx::query(
            "INSERT INTO orders (user_id, part_ids, total_price, status) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(order.user_id)
        .bind(&order.part_ids)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.get("id"))
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Order, OrderError> {
        let row = sqlx::query(
            "SELECT id, user_id, part_ids, total_price, transaction_id, payment_method, status \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or(OrderError::OrderNotFound)?;

        order_from_row(&row)
    }

    async fn update(&self, id: Uuid, update: &OrderUpdate) -> Result<(), OrderError> {
        update.validate()?;
        if update.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE orders SET ");
        let mut first = true;

        if let Some(part_ids) = &update.part_ids {
            set_separator(&mut qb, &mut first);
            qb.push("part_ids = ").push_bind(part_ids.clone());
        }
        if let Some(total_price) = update.total_price {
            set_separator(&mut qb, &mut first);
            qb.push("total_price = ").push_bind(total_price);
        }
        if let Some(transaction_id) = update.transaction_id {
            set_separator(&mut qb, &mut first);
            qb.push("transaction_id = ").push_bind(transaction_id);
        }
        if let Some(payment_method) = update.payment_method {
            set_separator(&mut qb, &mut first);
            qb.push("payment_method = ").push_bind(payment_method.as_str());
        }
        if let Some(status) = update.status {
            set_separator(&mut qb, &mut first);
            qb.push("status = ").push_bind(status.as_str());
        }

        qb.push(" WHERE id = ").push_bind(id);
        if let Some(expected) = update.expected_status {
            qb.push(" AND status = ").push_bind(expected.as_str());
        }

        let result = qb.build().execute(&self.pool).await.map_err(internal)?;

        if result.rows_affected() == 0 {
            // The guard lost the race, or the row is gone.
            return if update.expected_status.is_some() {
                Err(OrderError::OrderConflict)
            } else {
                Err(OrderError::OrderNotFound)
            };
        }

        Ok(())
    }
}

fn set_separator(qb: &mut QueryBuilder<'_, Postgres>, first: &mut bool) {
    if !*first {
        qb.push(", ");
    }
    *first = false;
}

fn order_from_row(row: &PgRow) -> Result<Order, OrderError> {
    let status: String = row.get("status");
    let status: OrderStatus = status.parse().map_err(OrderError::UnknownStatus)?;

    let payment_method: Option<String> = row.get("payment_method");
    let payment_method = payment_method
        .map(|m| m.parse::<PaymentMethod>())
        .transpose()
        .map_err(|e| OrderError::Internal(anyhow::anyhow!("stored payment method: {e}")))?;

    Ok(Order {
        id: row.get("id"),
        user_id: row.get("user_id"),
        part_ids: row.get("part_ids"),
        total_price: row.get("total_price"),
        transaction_id: row.get("transaction_id"),
        payment_method,
        status,
    })
}

fn internal(e: sqlx::Error) -> OrderError {
    OrderError::Internal(anyhow::Error::new(e).context("orders repository"))
}
