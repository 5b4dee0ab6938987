//! Wire events exchanged between the services.
//!
//! Payloads are bincode-encoded; the field order of each struct is the
//! wire schema and must not be reordered. UUIDs serialize as their raw
//! 16 bytes under bincode, and the same 16 bytes of the order id are the
//! record key on both topics, pinning every event of one order to one
//! partition.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Codec failures for wire events.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload could not be encoded.
    #[error("encode event: {0}")]
    Encode(#[source] bincode::Error),
    /// The payload bytes do not match the schema.
    #[error("decode event: {0}")]
    Decode(#[source] bincode::Error),
}

/// Emitted by the order service after an order commits to `PAID`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidOrderEvent {
    /// Unique id of this emission.
    pub event_id: Uuid,
    /// The paid order.
    pub order_id: Uuid,
    /// Owner of the order.
    pub user_id: Uuid,
    /// Method the order was paid with, as its wire name.
    pub payment_method: String,
    /// Transaction issued by the payment service.
    pub transaction_id: Uuid,
}

/// Emitted by the assembly worker once the build delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledShipEvent {
    /// Unique id of this emission.
    pub event_id: Uuid,
    /// The assembled order.
    pub order_id: Uuid,
    /// Owner of the order.
    pub user_id: Uuid,
    /// Wall-clock build time in whole seconds.
    pub build_duration_secs: u64,
}

impl PaidOrderEvent {
    /// Encode to the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] on serializer failure.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    /// Decode from the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes do not match the
    /// schema.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(CodecError::Decode)
    }
}

impl AssembledShipEvent {
    /// Encode to the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] on serializer failure.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    /// Decode from the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes do not match the
    /// schema.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(CodecError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_order_round_trips() {
        let event = PaidOrderEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_method: "CARD".to_string(),
            transaction_id: Uuid::new_v4(),
        };

        let decoded = PaidOrderEvent::decode(&event.encode().unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn assembled_ship_round_trips() {
        let event = AssembledShipEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            build_duration_secs: 10,
        };

        let decoded = AssembledShipEvent::decode(&event.encode().unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(AssembledShipEvent::decode(&[0xff, 0x01]).is_err());
    }
}
