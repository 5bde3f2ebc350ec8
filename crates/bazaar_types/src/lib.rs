//! # BAZAAR Marketplace Vocabulary
//!
//! Plain-data types shared by every layer of the marketplace client:
//! listings, offers, chain descriptors, the event ABI and raw-log decoding.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   raw logs   ┌─────────────────┐
//! │  Marketplace    │ ──────────▶  │  events::       │
//! │  Contract       │              │  MarketEvent    │
//! └─────────────────┘              └────────┬────────┘
//!                                           │
//!                                           ▼
//!                                  ┌─────────────────┐
//!                                  │  listing/offer  │
//!                                  │  records        │
//!                                  └─────────────────┘
//! ```
//!
//! This crate is deliberately inert: no async, no caching, no I/O.
//! Everything here is a value type the client crate moves around.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod abi;
pub mod chain;
pub mod events;
pub mod listing;
pub mod offer;

pub use chain::ChainDescriptor;
pub use events::{
    EventDecoder, ListingAddedEvent, MarketEvent, NewOfferEvent, NewSaleEvent,
    LISTING_ADDED_TOPIC, NEW_OFFER_TOPIC, NEW_SALE_TOPIC,
};
pub use listing::{
    BuyNow, CancelListing, Listing, ListingFilter, ListingId, ListingKind, MutationReceipt,
    NewAuctionListing, NewDirectListing, Price,
};
pub use offer::Offer;
