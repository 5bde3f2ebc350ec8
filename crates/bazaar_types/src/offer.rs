//! # Offer Records
//!
//! Standing offers and winning bids as read back from the marketplace.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::listing::{ListingId, Price};

/// An offer (or bid) standing against a listing.
///
/// The same record shape covers direct-listing offers and auction bids;
/// for bids the `expires_at` field carries the auction close time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Listing the offer targets.
    pub listing_id: ListingId,
    /// Account making the offer.
    pub offeror: Address,
    /// Currency the offer is denominated in.
    pub currency: Address,
    /// Offered price per token.
    pub price_per_token: U256,
    /// Number of tokens wanted.
    pub quantity: U256,
    /// Unix time the offer lapses.
    pub expires_at: u64,
}

impl Offer {
    /// Total value of the offer across its whole quantity.
    #[inline]
    #[must_use]
    pub fn total(&self) -> Price {
        Price {
            currency: self.currency,
            amount: self.quantity.saturating_mul(self.price_per_token),
        }
    }

    /// Whether the offer is still standing at the given unix time.
    #[inline]
    #[must_use]
    pub const fn is_live_at(&self, unix_time: u64) -> bool {
        unix_time < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_total() {
        let offer = Offer {
            listing_id: U256::from(1),
            offeror: Address::repeat_byte(0xaa),
            currency: Address::ZERO,
            price_per_token: U256::from(50),
            quantity: U256::from(4),
            expires_at: 10_000,
        };
        assert_eq!(offer.total().amount, U256::from(200));
        assert!(offer.is_live_at(9_999));
        assert!(!offer.is_live_at(10_000));
    }
}
