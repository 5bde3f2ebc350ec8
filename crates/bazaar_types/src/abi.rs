//! # Contract Definitions
//!
//! The marketplace event ABI, generated with alloy's `sol!` macro. The
//! feed only needs the event signatures for topic matching; decoding is
//! done by hand in [`crate::events`] to avoid intermediate allocations.

// The sol! macro generates code that we can't document, so allow missing_docs
#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// The marketplace contract surface this client listens to.
    ///
    /// Only events are declared here; calls go through provider traits
    /// so embedders can bring their own transport.
    #[derive(Debug)]
    interface IBazaarMarket {
        /// Emitted when a listing of either kind is created.
        event ListingAdded(
            uint256 indexed listingId,
            address indexed assetContract,
            address indexed lister
        );

        /// Emitted when an offer or bid lands against a listing.
        event NewOffer(
            uint256 indexed listingId,
            address indexed offeror,
            uint8 indexed listingType,
            uint256 quantityWanted,
            uint256 totalOfferAmount,
            address currency
        );

        /// Emitted when a listing sells, by buyout or auction settlement.
        event NewSale(
            uint256 indexed listingId,
            address indexed assetContract,
            address indexed lister,
            address buyer,
            uint256 quantityBought,
            uint256 totalPricePaid
        );
    }
}
