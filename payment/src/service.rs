//! Payment authorization.

use crate::model::{PayOrder, PaymentError};
use tracing::info;
use uuid::Uuid;

/// The payment service. Stateless: authorization is simulated by
/// issuing a fresh transaction id for every valid request.
#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentService;

impl PaymentService {
    /// Create the service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Authorize a payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] when the request fails
    /// contract validation.
    pub fn pay_order(&self, request: &PayOrder) -> Result<Uuid, PaymentError> {
        request.validate()?;

        let transaction_id = Uuid::new_v4();
        info!(
            order_id = %request.order_uuid,
            user_id = %request.user_uuid,
            payment_method = %request.payment_method,
            transaction_id = %transaction_id,
            "payment succeeded"
        );
        Ok(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentMethod;

    #[test]
    fn each_authorization_gets_a_fresh_transaction() {
        let service = PaymentService::new();
        let request = PayOrder {
            order_uuid: Uuid::new_v4(),
            user_uuid: Uuid::new_v4(),
            payment_method: PaymentMethod::Sbp,
        };

        let first = service.pay_order(&request).unwrap();
        let second = service.pay_order(&request).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn invalid_request_is_rejected() {
        let service = PaymentService::new();
        let request = PayOrder {
            order_uuid: Uuid::nil(),
            user_uuid: Uuid::new_v4(),
            payment_method: PaymentMethod::Card,
        };

        assert!(service.pay_order(&request).is_err());
    }
}
