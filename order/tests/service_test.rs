//! State-machine tests for the order service, run against in-memory
//! collaborators.

use astradock_order::consumer::AssembledHandler;
use astradock_order::error::OrderError;
use astradock_order::model::{CreateOrder, Order, OrderStatus, PaymentMethod, PartSummary};
use astradock_order::repository::{NewOrder, OrderUpdate};
use astradock_order::service::{
    InventoryClient, OrderRepository, OrderService, PaidOrderPublisher, PartsFilter, PaymentClient,
};
use astradock_platform::bus::{Message, MessageHandler};
use astradock_platform::events::{AssembledShipEvent, PaidOrderEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Repository with the same sparse-update and optimistic-guard
/// semantics as the Postgres implementation.
#[derive(Default)]
struct InMemoryRepo {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryRepo {
    fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn create(&self, order: &NewOrder) -> Result<Uuid, OrderError> {
        let id = Uuid::new_v4();
        self.orders.lock().unwrap().insert(
            id,
            Order {
                id,
                user_id: order.user_id,
                part_ids: order.part_ids.clone(),
                total_price: order.total_price,
                transaction_id: None,
                payment_method: None,
                status: order.status,
            },
        );
        Ok(id)
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Order, OrderError> {
        self.get(id).ok_or(OrderError::OrderNotFound)
    }

    async fn update(&self, id: Uuid, update: &OrderUpdate) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&id).ok_or(OrderError::OrderNotFound)?;

        if let Some(expected) = update.expected_status {
            if order.status != expected {
                return Err(OrderError::OrderConflict);
            }
        }
        if let Some(part_ids) = &update.part_ids {
            order.part_ids = part_ids.clone();
        }
        if let Some(total_price) = update.total_price {
            order.total_price = total_price;
        }
        if let Some(transaction_id) = update.transaction_id {
            order.transaction_id = Some(transaction_id);
        }
        if let Some(payment_method) = update.payment_method {
            order.payment_method = Some(payment_method);
        }
        if let Some(status) = update.status {
            order.status = status;
        }
        Ok(())
    }
}

struct StubInventory {
    parts: Vec<PartSummary>,
    fail_transport: bool,
}

#[async_trait]
impl InventoryClient for StubInventory {
    async fn list_parts(&self, filter: &PartsFilter) -> Result<Vec<PartSummary>, OrderError> {
        if self.fail_transport {
            return Err(OrderError::BadGateway("inventory unreachable".into()));
        }
        Ok(self
            .parts
            .iter()
            .filter(|p| filter.ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

struct StubPayment {
    transaction: String,
    calls: AtomicUsize,
}

impl StubPayment {
    fn returning(transaction: impl Into<String>) -> Self {
        Self {
            transaction: transaction.into(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentClient for StubPayment {
    async fn pay_order(
        &self,
        _order_id: Uuid,
        _user_id: Uuid,
        _method: PaymentMethod,
    ) -> Result<String, OrderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transaction.clone())
    }
}

#[derive(Default)]
struct CapturingPublisher {
    events: Mutex<Vec<PaidOrderEvent>>,
}

#[async_trait]
impl PaidOrderPublisher for CapturingPublisher {
    async fn publish(&self, event: PaidOrderEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

struct Fixture {
    repo: Arc<InMemoryRepo>,
    payment: Arc<StubPayment>,
    publisher: Arc<CapturingPublisher>,
    service: Arc<OrderService>,
    part: PartSummary,
}

fn fixture_with_parts(parts: Vec<PartSummary>) -> Fixture {
    let part = parts.first().cloned().unwrap_or(PartSummary {
        id: Uuid::new_v4(),
        price_cents: 0,
        stock_quantity: 0,
    });
    let repo = Arc::new(InMemoryRepo::default());
    let payment = Arc::new(StubPayment::returning(Uuid::new_v4().to_string()));
    let publisher = Arc::new(CapturingPublisher::default());
    let service = Arc::new(OrderService::new(
        Arc::clone(&repo) as Arc<dyn OrderRepository>,
        Arc::new(StubInventory {
            parts,
            fail_transport: false,
        }),
        Arc::clone(&payment) as Arc<dyn PaymentClient>,
        Arc::clone(&publisher) as Arc<dyn PaidOrderPublisher>,
        Duration::from_secs(1),
        Duration::from_secs(1),
    ));
    Fixture {
        repo,
        payment,
        publisher,
        service,
        part,
    }
}

fn fixture() -> Fixture {
    fixture_with_parts(vec![PartSummary {
        id: Uuid::new_v4(),
        price_cents: 5000,
        stock_quantity: 2,
    }])
}

async fn create_pending(fx: &Fixture) -> Uuid {
    fx.service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![fx.part.id],
        })
        .await
        .unwrap()
        .id
}

async fn wait_for_published(publisher: &CapturingPublisher) -> PaidOrderEvent {
    for _ in 0..100 {
        if let Some(event) = publisher.events.lock().unwrap().first().cloned() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("paid-order event was never published");
}

#[tokio::test]
async fn create_prices_the_order_and_starts_pending() {
    let fx = fixture();

    let result = fx
        .service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![fx.part.id],
        })
        .await
        .unwrap();

    assert_eq!(result.total_price, 5000);
    let stored = fx.repo.get(result.id).unwrap();
    assert_eq!(stored.status, OrderStatus::PendingPayment);
    assert_eq!(stored.transaction_id, None);
}

#[tokio::test]
async fn create_rejects_nil_user_and_empty_parts() {
    let fx = fixture();

    let err = fx
        .service
        .create(CreateOrder {
            user_id: Uuid::nil(),
            part_ids: vec![fx.part.id],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));

    let err = fx
        .service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));
}

#[tokio::test]
async fn create_with_unknown_part_is_part_not_found() {
    let fx = fixture();

    let err = fx
        .service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![fx.part.id, Uuid::new_v4()],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::PartNotFound));
    assert!(fx.repo.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_with_exhausted_part_lists_the_offender() {
    let dead_part = PartSummary {
        id: Uuid::new_v4(),
        price_cents: 700,
        stock_quantity: 0,
    };
    let fx = fixture_with_parts(vec![dead_part.clone()]);

    let err = fx
        .service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![dead_part.id],
        })
        .await
        .unwrap_err();

    match err {
        OrderError::PartsOutOfStock(ids) => assert_eq!(ids, vec![dead_part.id]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.repo.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_propagates_catalog_transport_failure() {
    let repo = Arc::new(InMemoryRepo::default());
    let service = OrderService::new(
        repo,
        Arc::new(StubInventory {
            parts: vec![],
            fail_transport: true,
        }),
        Arc::new(StubPayment::returning("ignored")),
        Arc::new(CapturingPublisher::default()),
        Duration::from_secs(1),
        Duration::from_secs(1),
    );

    let err = service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![Uuid::new_v4()],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::BadGateway(_)));
}

#[tokio::test]
async fn pay_moves_to_paid_with_metadata_and_emits() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;

    let transaction = fx
        .service
        .pay(order_id, PaymentMethod::Card)
        .await
        .unwrap();

    let stored = fx.repo.get(order_id).unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.transaction_id, Some(transaction));
    assert_eq!(stored.payment_method, Some(PaymentMethod::Card));

    let event = wait_for_published(&fx.publisher).await;
    assert_eq!(event.order_id, order_id);
    assert_eq!(event.transaction_id, transaction);
    assert_eq!(event.payment_method, "CARD");
}

#[tokio::test]
async fn double_pay_conflicts_without_a_second_authorization() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;

    fx.service.pay(order_id, PaymentMethod::Card).await.unwrap();
    let err = fx
        .service
        .pay(order_id, PaymentMethod::Card)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::OrderConflict));
    assert_eq!(fx.payment.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pay_with_malformed_transaction_id_is_a_hard_error() {
    let part = PartSummary {
        id: Uuid::new_v4(),
        price_cents: 100,
        stock_quantity: 1,
    };
    let repo = Arc::new(InMemoryRepo::default());
    let service = OrderService::new(
        Arc::clone(&repo) as Arc<dyn OrderRepository>,
        Arc::new(StubInventory {
            parts: vec![part.clone()],
            fail_transport: false,
        }),
        Arc::new(StubPayment::returning("definitely-not-a-uuid")),
        Arc::new(CapturingPublisher::default()),
        Duration::from_secs(1),
        Duration::from_secs(1),
    );

    let order_id = service
        .create(CreateOrder {
            user_id: Uuid::new_v4(),
            part_ids: vec![part.id],
        })
        .await
        .unwrap()
        .id;

    let err = service.pay(order_id, PaymentMethod::Card).await.unwrap_err();
    assert!(matches!(err, OrderError::Internal(_)));
    // Not a gateway failure, and the order is left untouched.
    assert_eq!(repo.get(order_id).unwrap().status, OrderStatus::PendingPayment);
}

#[tokio::test]
async fn cancel_then_pay_conflicts_and_stays_cancelled() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;

    fx.service.cancel(order_id).await.unwrap();
    let err = fx
        .service
        .pay(order_id, PaymentMethod::Card)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::OrderConflict));
    assert_eq!(fx.repo.get(order_id).unwrap().status, OrderStatus::Cancelled);
    assert_eq!(fx.payment.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_after_pay_conflicts() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;

    fx.service.pay(order_id, PaymentMethod::Sbp).await.unwrap();
    let err = fx.service.cancel(order_id).await.unwrap_err();

    assert!(matches!(err, OrderError::OrderConflict));
    assert_eq!(fx.repo.get(order_id).unwrap().status, OrderStatus::Paid);
}

#[tokio::test]
async fn complete_is_idempotent_and_strict_elsewhere() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;

    // Not yet paid: strict conflict.
    assert!(matches!(
        fx.service.complete(order_id).await.unwrap_err(),
        OrderError::OrderConflict
    ));

    fx.service.pay(order_id, PaymentMethod::Card).await.unwrap();
    fx.service.complete(order_id).await.unwrap();
    assert_eq!(fx.repo.get(order_id).unwrap().status, OrderStatus::Completed);

    // Second completion is a no-op success, and terminal stays terminal.
    fx.service.complete(order_id).await.unwrap();
    let stored = fx.repo.get(order_id).unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert!(stored.transaction_id.is_some());
    assert!(stored.payment_method.is_some());
}

#[tokio::test]
async fn missing_order_maps_to_not_found() {
    let fx = fixture();
    assert!(matches!(
        fx.service.order_by_id(Uuid::new_v4()).await.unwrap_err(),
        OrderError::OrderNotFound
    ));
}

fn assembled_message(event: &AssembledShipEvent) -> Message {
    Message {
        key: event.order_id.as_bytes().to_vec(),
        value: event.encode().unwrap(),
        topic: "order.assembled".into(),
        partition: 0,
        offset: 1,
        timestamp: None,
        headers: HashMap::new(),
    }
}

#[tokio::test]
async fn assembled_consumer_completes_paid_orders() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;
    fx.service.pay(order_id, PaymentMethod::Card).await.unwrap();

    let handler = AssembledHandler::new(Arc::clone(&fx.service));
    let event = AssembledShipEvent {
        event_id: Uuid::new_v4(),
        order_id,
        user_id: Uuid::new_v4(),
        build_duration_secs: 10,
    };

    handler.handle(&assembled_message(&event)).await.unwrap();
    assert_eq!(fx.repo.get(order_id).unwrap().status, OrderStatus::Completed);

    // Redelivery of the same event must succeed so the offset advances.
    handler.handle(&assembled_message(&event)).await.unwrap();
}

#[tokio::test]
async fn assembled_consumer_swallows_terminal_conflicts() {
    let fx = fixture();
    let order_id = create_pending(&fx).await;
    fx.service.cancel(order_id).await.unwrap();

    let handler = AssembledHandler::new(Arc::clone(&fx.service));
    let event = AssembledShipEvent {
        event_id: Uuid::new_v4(),
        order_id,
        user_id: Uuid::new_v4(),
        build_duration_secs: 10,
    };

    // Cancelled order: conflict from the service, success at the seam.
    handler.handle(&assembled_message(&event)).await.unwrap();
    assert_eq!(fx.repo.get(order_id).unwrap().status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn assembled_consumer_rejects_malformed_payloads() {
    let fx = fixture();
    let handler = AssembledHandler::new(Arc::clone(&fx.service));

    let msg = Message {
        key: vec![],
        value: vec![0xde, 0xad],
        topic: "order.assembled".into(),
        partition: 0,
        offset: 7,
        timestamp: None,
        headers: HashMap::new(),
    };

    assert!(handler.handle(&msg).await.is_err());
}
