//! Order state machine.
//!
//! All mutation of an order flows through [`OrderService`]. External
//! collaborators are behind seam traits so the state machine is testable
//! without a database, a broker, or the sibling services.
//!
//! Database calls run under per-operation deadlines (read and write
//! configured separately) layered inside the caller's task: dropping the
//! request future cancels both the deadline and the operation, so the
//! deadline never outlives ambient cancellation.

use crate::error::OrderError;
use crate::model::{CreateOrder, CreateOrderResult, Order, OrderStatus, PaymentMethod, PartSummary};
use crate::repository::{NewOrder, OrderUpdate};
use async_trait::async_trait;
use astradock_platform::events::PaidOrderEvent;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Order persistence seam.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order; the store assigns the id.
    async fn create(&self, order: &NewOrder) -> Result<Uuid, OrderError>;
    /// Load an order; missing maps to [`OrderError::OrderNotFound`].
    async fn order_by_id(&self, id: Uuid) -> Result<Order, OrderError>;
    /// Apply a sparse update.
    async fn update(&self, id: Uuid, update: &OrderUpdate) -> Result<(), OrderError>;
}

/// Parts filter sent to the catalog. Only the ids field is used by the
/// order service, but the shape matches the catalog's full filter.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PartsFilter {
    /// Part ids to select.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ids: Vec<Uuid>,
}

/// Catalog RPC seam.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// List the parts matching `filter`; an empty result is not an
    /// error.
    async fn list_parts(&self, filter: &PartsFilter) -> Result<Vec<PartSummary>, OrderError>;
}

/// Payment RPC seam. Returns the raw transaction identifier string; the
/// service parses it.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Authorize payment for an order.
    async fn pay_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        method: PaymentMethod,
    ) -> Result<String, OrderError>;
}

/// Seam for emitting `order.paid` events.
#[async_trait]
pub trait PaidOrderPublisher: Send + Sync {
    /// Emit one paid-order event.
    async fn publish(&self, event: PaidOrderEvent) -> anyhow::Result<()>;
}

/// The order service.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    inventory: Arc<dyn InventoryClient>,
    payment: Arc<dyn PaymentClient>,
    publisher: Arc<dyn PaidOrderPublisher>,
    read_db_timeout: Duration,
    write_db_timeout: Duration,
}

impl OrderService {
    /// Wire up the service with its collaborators and DB deadlines.
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        inventory: Arc<dyn InventoryClient>,
        payment: Arc<dyn PaymentClient>,
        publisher: Arc<dyn PaidOrderPublisher>,
        read_db_timeout: Duration,
        write_db_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            inventory,
            payment,
            publisher,
            read_db_timeout,
            write_db_timeout,
        }
    }

    /// Create an order in `PENDING_PAYMENT`.
    ///
    /// Validates the input, checks existence and stock of every part
    /// against the catalog, sums the total price, and persists the
    /// order under the write deadline.
    ///
    /// # Errors
    ///
    /// - [`OrderError::Validation`] on a nil user or empty part list
    /// - [`OrderError::BadGateway`] if the catalog is unreachable
    /// - [`OrderError::PartNotFound`] if the catalog returned fewer
    ///   parts than requested
    /// - [`OrderError::PartsOutOfStock`] listing the parts with no stock
    pub async fn create(&self, params: CreateOrder) -> Result<CreateOrderResult, OrderError> {
        if params.user_id.is_nil() {
            return Err(OrderError::Validation("user_uuid must be non-nil".into()));
        }
        if params.part_ids.is_empty() {
            return Err(OrderError::Validation("part_uuids must be non-empty".into()));
        }

        let parts = self
            .inventory
            .list_parts(&PartsFilter {
                ids: params.part_ids.clone(),
            })
            .await?;

        if parts.len() != params.part_ids.len() {
            return Err(OrderError::PartNotFound);
        }

        let ended: Vec<Uuid> = parts
            .iter()
            .filter(|p| p.stock_quantity <= 0)
            .map(|p| p.id)
            .collect();
        if !ended.is_empty() {
            warn!(part_ids = ?ended, "order rejected: parts out of stock");
            return Err(OrderError::PartsOutOfStock(ended));
        }

        let total_price: i64 = parts.iter().map(|p| p.price_cents).sum();

        let id = self
            .write_scope("order.service.create", self.repo.create(&NewOrder {
                user_id: params.user_id,
                part_ids: params.part_ids,
                total_price,
                status: OrderStatus::PendingPayment,
            }))
            .await?;

        info!(order_id = %id, total_price, "order created");
        Ok(CreateOrderResult { id, total_price })
    }

    /// Pay a `PENDING_PAYMENT` order.
    ///
    /// On success the order moves to `PAID` with its transaction id and
    /// payment method set, and a `PaidOrderEvent` emission is spawned
    /// best-effort: a failed emission is logged and the order stays
    /// `PAID`.
    ///
    /// # Errors
    ///
    /// - [`OrderError::OrderConflict`] from any status other than
    ///   `PENDING_PAYMENT`
    /// - [`OrderError::BadGateway`] if the payment service is
    ///   unreachable; its validation failures propagate as
    ///   [`OrderError::Validation`]
    /// - [`OrderError::Internal`] if the returned transaction id is not
    ///   a UUID
    pub async fn pay(&self, order_id: Uuid, method: PaymentMethod) -> Result<Uuid, OrderError> {
        let order = self
            .read_scope("order.service.pay", self.repo.order_by_id(order_id))
            .await?;

        match order.status {
            OrderStatus::PendingPayment => {}
            OrderStatus::Paid | OrderStatus::Cancelled | OrderStatus::Completed => {
                return Err(OrderError::OrderConflict);
            }
        }

        let raw_transaction = self
            .payment
            .pay_order(order.id, order.user_id, method)
            .await?;

        // A malformed transaction id from an otherwise successful
        // authorization is corruption, not a gateway failure.
        let transaction_id = Uuid::parse_str(&raw_transaction).map_err(|e| {
            OrderError::Internal(anyhow::anyhow!(
                "payment returned malformed transaction id {raw_transaction:?}: {e}"
            ))
        })?;

        self.write_scope(
            "order.service.pay",
            self.repo.update(order.id, &OrderUpdate {
                transaction_id: Some(transaction_id),
                payment_method: Some(method),
                status: Some(OrderStatus::Paid),
                expected_status: Some(OrderStatus::PendingPayment),
                ..OrderUpdate::default()
            }),
        )
        .await?;

        self.spawn_paid_event(&order, method, transaction_id);

        info!(order_id = %order.id, transaction_id = %transaction_id, "order paid");
        Ok(transaction_id)
    }

    /// Cancel a `PENDING_PAYMENT` order.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderConflict`] from any other status, terminal
    /// ones included.
    pub async fn cancel(&self, order_id: Uuid) -> Result<(), OrderError> {
        let order = self
            .read_scope("order.service.cancel", self.repo.order_by_id(order_id))
            .await?;

        if order.status != OrderStatus::PendingPayment {
            return Err(OrderError::OrderConflict);
        }

        self.write_scope(
            "order.service.cancel",
            self.repo.update(order.id, &OrderUpdate {
                status: Some(OrderStatus::Cancelled),
                expected_status: Some(OrderStatus::PendingPayment),
                ..OrderUpdate::default()
            }),
        )
        .await?;

        info!(order_id = %order.id, "order cancelled");
        Ok(())
    }

    /// Load one order.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderNotFound`] if it does not exist.
    pub async fn order_by_id(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.read_scope("order.service.order_by_id", self.repo.order_by_id(order_id))
            .await
    }

    /// Mark a `PAID` order `COMPLETED`.
    ///
    /// Driven by the assembled-event consumer. Idempotent: an order
    /// already in `COMPLETED` is a no-op success.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderConflict`] from `PENDING_PAYMENT` or
    /// `CANCELLED`.
    pub async fn complete(&self, order_id: Uuid) -> Result<(), OrderError> {
        let order = self
            .read_scope("order.service.complete", self.repo.order_by_id(order_id))
            .await?;

        match order.status {
            OrderStatus::Completed => return Ok(()),
            OrderStatus::Paid => {}
            OrderStatus::PendingPayment | OrderStatus::Cancelled => {
                return Err(OrderError::OrderConflict);
            }
        }

        self.write_scope(
            "order.service.complete",
            self.repo.update(order.id, &OrderUpdate {
                status: Some(OrderStatus::Completed),
                expected_status: Some(OrderStatus::Paid),
                ..OrderUpdate::default()
            }),
        )
        .await?;

        info!(order_id = %order.id, "order completed");
        Ok(())
    }

    fn spawn_paid_event(&self, order: &Order, method: PaymentMethod, transaction_id: Uuid) {
        let publisher = Arc::clone(&self.publisher);
        let event = PaidOrderEvent {
            event_id: Uuid::new_v4(),
            order_id: order.id,
            user_id: order.user_id,
            payment_method: method.as_str().to_string(),
            transaction_id,
        };
        tokio::spawn(async move {
            // No outbox: emission is best-effort after the PAID commit.
            if let Err(e) = publisher.publish(event).await {
                error!(error = %e, "failed to publish paid-order event");
            }
        });
    }

    async fn read_scope<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, OrderError>>,
    ) -> Result<T, OrderError> {
        Self::deadline(op, self.read_db_timeout, fut).await
    }

    async fn write_scope<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, OrderError>>,
    ) -> Result<T, OrderError> {
        Self::deadline(op, self.write_db_timeout, fut).await
    }

    async fn deadline<T>(
        op: &'static str,
        limit: Duration,
        fut: impl Future<Output = Result<T, OrderError>>,
    ) -> Result<T, OrderError> {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(OrderError::Internal(anyhow::anyhow!(
                "{op}: database deadline of {limit:?} exceeded"
            ))),
        }
    }
}
