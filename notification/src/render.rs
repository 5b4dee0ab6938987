//! Chat message templates.
//!
//! One Markdown template per event kind. UUIDs only contain hex digits
//! and dashes, which Markdown leaves alone, so the values are
//! interpolated as-is.

use astradock_platform::events::{AssembledShipEvent, PaidOrderEvent};

/// Greeting sent in reply to `/start`.
pub const WELCOME: &str = "\
👋 *Hi! I am the AstraDock notification bot.*

I will ping you about the important events of your orders:
💳 order paid
🚀 ship assembly finished

Place an order in the service and I will keep you posted.
If notifications land in the wrong place, check that you are signed in
with the right account.";

/// Render the paid-order notification.
#[must_use]
pub fn paid_order(event: &PaidOrderEvent) -> String {
    format!(
        "💳 *Order paid*\n\n\
         Order: `{}`\n\
         Payment method: {}\n\
         Transaction: `{}`\n\n\
         The dock crew is starting the build.",
        event.order_id, event.payment_method, event.transaction_id
    )
}

/// Render the ship-assembled notification.
#[must_use]
pub fn ship_assembled(event: &AssembledShipEvent) -> String {
    format!(
        "🚀 *Ship assembled*\n\n\
         Order: `{}`\n\
         Build time: {} s\n\n\
         Your ship is ready for pickup at the dock.",
        event.order_id, event.build_duration_secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn paid_order_mentions_order_and_transaction() {
        let event = PaidOrderEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_method: "CARD".into(),
            transaction_id: Uuid::new_v4(),
        };

        let text = paid_order(&event);
        assert!(text.contains(&event.order_id.to_string()));
        assert!(text.contains(&event.transaction_id.to_string()));
        assert!(text.contains("CARD"));
    }

    #[test]
    fn ship_assembled_mentions_build_time() {
        let event = AssembledShipEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            build_duration_secs: 10,
        };

        let text = ship_assembled(&event);
        assert!(text.contains(&event.order_id.to_string()));
        assert!(text.contains("10 s"));
    }
}
