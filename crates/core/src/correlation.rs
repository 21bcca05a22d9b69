//! Purchase correlation references.
//!
//! A checkout session carries `"{user_id}:{event_id}:{quantity}"` as its
//! client reference, so the asynchronous payment callback can be tied back
//! to the purchase intent without a session store. Donation sessions carry
//! no reference at all.

use crate::types::DbId;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CorrelationError {
    #[error("reference must have exactly three segments")]
    Malformed,

    #[error("reference contains an invalid id")]
    InvalidId,

    #[error("reference contains an invalid quantity")]
    InvalidQuantity,
}

/// A parsed purchase reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRef {
    pub user_id: DbId,
    pub event_id: DbId,
    pub quantity: u32,
}

/// Encode a purchase intent into a client reference string.
pub fn encode(user_id: DbId, event_id: DbId, quantity: u32) -> String {
    format!("{user_id}:{event_id}:{quantity}")
}

/// Parse a client reference back into its parts.
///
/// Quantity range policy is the caller's concern; this only rejects zero
/// and non-numeric values.
pub fn decode(reference: &str) -> Result<PurchaseRef, CorrelationError> {
    let mut parts = reference.split(':');
    let (Some(user), Some(event), Some(quantity), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CorrelationError::Malformed);
    };

    let user_id = user.parse().map_err(|_| CorrelationError::InvalidId)?;
    let event_id = event.parse().map_err(|_| CorrelationError::InvalidId)?;
    let quantity: u32 = quantity
        .parse()
        .map_err(|_| CorrelationError::InvalidQuantity)?;
    if quantity == 0 {
        return Err(CorrelationError::InvalidQuantity);
    }

    Ok(PurchaseRef {
        user_id,
        event_id,
        quantity,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn round_trips_a_reference() {
        let user = Uuid::new_v4();
        let event = Uuid::new_v4();
        let parsed = decode(&encode(user, event, 3)).unwrap();
        assert_eq!(parsed.user_id, user);
        assert_eq!(parsed.event_id, event);
        assert_eq!(parsed.quantity, 3);
    }

    #[test]
    fn rejects_missing_segments() {
        let user = Uuid::new_v4();
        assert_eq!(
            decode(&format!("{user}:{}", Uuid::new_v4())),
            Err(CorrelationError::Malformed)
        );
        assert_eq!(decode(""), Err(CorrelationError::Malformed));
    }

    #[test]
    fn rejects_extra_segments() {
        let reference = format!("{}:{}:2:extra", Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(decode(&reference), Err(CorrelationError::Malformed));
    }

    #[test]
    fn rejects_non_uuid_ids() {
        assert_eq!(
            decode(&format!("alice:{}:1", Uuid::new_v4())),
            Err(CorrelationError::InvalidId)
        );
    }

    #[test]
    fn rejects_zero_or_garbage_quantity() {
        let user = Uuid::new_v4();
        let event = Uuid::new_v4();
        assert_eq!(
            decode(&format!("{user}:{event}:0")),
            Err(CorrelationError::InvalidQuantity)
        );
        assert_eq!(
            decode(&format!("{user}:{event}:lots")),
            Err(CorrelationError::InvalidQuantity)
        );
        assert_eq!(
            decode(&format!("{user}:{event}:-2")),
            Err(CorrelationError::InvalidQuantity)
        );
    }
}
