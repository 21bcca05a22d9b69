//! Gateway callback event parsing.
//!
//! Stripe posts a JSON envelope with the interesting object nested
//! under `data.object`. Only two event families matter to this service;
//! callers acknowledge and drop everything else.

use serde::Deserialize;

/// Callback event types this service handles.
pub mod event_types {
    /// A checkout session finished paying.
    pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
    /// A charge was refunded.
    pub const CHARGE_REFUNDED: &str = "charge.refunded";
}

/// Envelope for a gateway callback payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEvent {
    /// Gateway-assigned event id (`evt_...`), the idempotency key.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Payload section of the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The domain object the event describes; shape depends on `type`.
    pub object: serde_json::Value,
}

/// Completed checkout session, narrowed to the fields fulfillment needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedSession {
    pub id: String,
    pub payment_intent: Option<String>,
    pub client_reference_id: Option<String>,
}

/// Refunded charge, narrowed to the fields refund handling needs.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundedCharge {
    pub id: String,
    pub payment_intent: Option<String>,
}

/// Parse a raw callback body into a [`GatewayEvent`].
pub fn parse_event(payload: &str) -> Result<GatewayEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

impl GatewayEvent {
    /// The session object, when this is a checkout completion.
    ///
    /// `None` for other event types or an object that does not parse as
    /// a session.
    pub fn as_completed_session(&self) -> Option<CompletedSession> {
        if self.event_type != event_types::CHECKOUT_COMPLETED {
            return None;
        }
        serde_json::from_value(self.data.object.clone()).ok()
    }

    /// The charge object, when this is a refund.
    pub fn as_refunded_charge(&self) -> Option<RefundedCharge> {
        if self.event_type != event_types::CHARGE_REFUNDED {
            return None;
        }
        serde_json::from_value(self.data.object.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETED_FIXTURE: &str = r#"{
        "id": "evt_1A2b3C",
        "object": "event",
        "api_version": "2024-06-20",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_456",
                "object": "checkout.session",
                "amount_total": 5000,
                "payment_intent": "pi_789",
                "client_reference_id": "user:event:2",
                "payment_status": "paid"
            }
        }
    }"#;

    const REFUNDED_FIXTURE: &str = r#"{
        "id": "evt_9Z8y7X",
        "type": "charge.refunded",
        "data": {
            "object": {
                "id": "ch_111",
                "object": "charge",
                "payment_intent": "pi_789",
                "refunded": true
            }
        }
    }"#;

    #[test]
    fn test_parses_completed_session() {
        let event = parse_event(COMPLETED_FIXTURE).expect("fixture should parse");
        assert_eq!(event.id, "evt_1A2b3C");
        assert_eq!(event.event_type, event_types::CHECKOUT_COMPLETED);

        let session = event
            .as_completed_session()
            .expect("completion event should yield a session");
        assert_eq!(session.id, "cs_test_456");
        assert_eq!(session.payment_intent.as_deref(), Some("pi_789"));
        assert_eq!(session.client_reference_id.as_deref(), Some("user:event:2"));
    }

    #[test]
    fn test_donation_session_has_no_reference() {
        let payload = r#"{
            "id": "evt_don",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_don",
                    "payment_intent": "pi_don",
                    "client_reference_id": null
                }
            }
        }"#;

        let session = parse_event(payload)
            .expect("payload should parse")
            .as_completed_session()
            .expect("completion event should yield a session");
        assert_eq!(session.client_reference_id, None);
    }

    #[test]
    fn test_parses_refunded_charge() {
        let event = parse_event(REFUNDED_FIXTURE).expect("fixture should parse");

        let charge = event
            .as_refunded_charge()
            .expect("refund event should yield a charge");
        assert_eq!(charge.id, "ch_111");
        assert_eq!(charge.payment_intent.as_deref(), Some("pi_789"));
    }

    #[test]
    fn test_accessors_respect_event_type() {
        let completed = parse_event(COMPLETED_FIXTURE).unwrap();
        let refunded = parse_event(REFUNDED_FIXTURE).unwrap();

        assert!(completed.as_refunded_charge().is_none());
        assert!(refunded.as_completed_session().is_none());
    }

    #[test]
    fn test_unknown_event_type_parses_but_yields_nothing() {
        let payload = r#"{
            "id": "evt_misc",
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1" } }
        }"#;

        let event = parse_event(payload).expect("unknown types still parse");
        assert!(event.as_completed_session().is_none());
        assert!(event.as_refunded_charge().is_none());
    }

    #[test]
    fn test_malformed_object_yields_none() {
        let payload = r#"{
            "id": "evt_bad",
            "type": "checkout.session.completed",
            "data": { "object": { "id": 42 } }
        }"#;

        let event = parse_event(payload).expect("envelope still parses");
        assert!(event.as_completed_session().is_none());
    }

    #[test]
    fn test_missing_envelope_fields_fail() {
        assert!(parse_event(r#"{ "id": "evt_x" }"#).is_err());
        assert!(parse_event("not json").is_err());
    }
}
