//! # Provider Ports
//!
//! The traits a marketplace backend implements and the capability
//! handle that binds one deployed contract to those implementations.
//!
//! The client never talks to a transport itself: embedders implement
//! these ports over whatever RPC stack they run (or over an in-memory
//! book in tests) and hand the client a [`MarketHandle`].

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use bazaar_types::{
    Listing, ListingFilter, ListingId, MutationReceipt, NewAuctionListing, NewDirectListing,
    Offer, Price,
};

use crate::error::{ClientError, ClientResult, ProviderError};

/// Core marketplace surface every deployment exposes.
#[async_trait]
pub trait MarketplaceProvider: Send + Sync {
    /// Reads one listing by id.
    async fn get_listing(&self, listing_id: ListingId) -> Result<Listing, ProviderError>;

    /// Enumerates listings matching a filter, open or not.
    async fn get_all_listings(
        &self,
        filter: ListingFilter,
    ) -> Result<Vec<Listing>, ProviderError>;

    /// Enumerates listings matching a filter that are open right now.
    async fn get_active_listings(
        &self,
        filter: ListingFilter,
    ) -> Result<Vec<Listing>, ProviderError>;

    /// Total number of listings ever created on the contract.
    async fn get_total_count(&self) -> Result<U256, ProviderError>;

    /// Places an offer against a listing of either kind.
    async fn make_offer(
        &self,
        listing_id: ListingId,
        price_per_token: U256,
        quantity: U256,
    ) -> Result<MutationReceipt, ProviderError>;
}

/// Fixed-price capability of a marketplace deployment.
#[async_trait]
pub trait DirectMarket: Send + Sync {
    /// Creates a fixed-price listing.
    async fn create_listing(
        &self,
        listing: NewDirectListing,
    ) -> Result<MutationReceipt, ProviderError>;

    /// Cancels a fixed-price listing owned by the signer.
    async fn cancel_listing(&self, listing_id: ListingId)
        -> Result<MutationReceipt, ProviderError>;

    /// Accepts a standing offer on a fixed-price listing.
    async fn accept_offer(
        &self,
        listing_id: ListingId,
        offeror: Address,
    ) -> Result<MutationReceipt, ProviderError>;

    /// Buys a quantity from a fixed-price listing.
    async fn buyout_listing(
        &self,
        listing_id: ListingId,
        quantity: U256,
        recipient: Option<Address>,
    ) -> Result<MutationReceipt, ProviderError>;
}

/// Auction capability of a marketplace deployment.
#[async_trait]
pub trait AuctionMarket: Send + Sync {
    /// Creates an auction listing.
    async fn create_listing(
        &self,
        listing: NewAuctionListing,
    ) -> Result<MutationReceipt, ProviderError>;

    /// Cancels an auction that has not received a qualifying bid.
    async fn cancel_listing(&self, listing_id: ListingId)
        -> Result<MutationReceipt, ProviderError>;

    /// Places a bid on a running auction.
    async fn make_bid(
        &self,
        listing_id: ListingId,
        bid_per_token: U256,
    ) -> Result<MutationReceipt, ProviderError>;

    /// Current best bid, or `None` when nothing qualifies yet.
    async fn get_winning_bid(&self, listing_id: ListingId)
        -> Result<Option<Offer>, ProviderError>;

    /// Winner of a closed auction.
    ///
    /// Providers signal "no winner yet" with the failure
    /// [`ProviderError::no_winner`]; readers treat that as an expected
    /// absence rather than a fault.
    async fn get_winner(&self, listing_id: ListingId) -> Result<Address, ProviderError>;

    /// Contract-wide minimum step between successive bids, in basis
    /// points of the current winning bid.
    async fn get_bid_buffer_bps(&self) -> Result<U256, ProviderError>;

    /// Smallest bid per token the auction accepts next.
    async fn get_minimum_next_bid(&self, listing_id: ListingId) -> Result<Price, ProviderError>;

    /// Settles a closed auction, transferring asset and proceeds.
    async fn execute_sale(&self, listing_id: ListingId) -> Result<MutationReceipt, ProviderError>;

    /// Buys a running auction out at its buyout price.
    async fn buyout_listing(&self, listing_id: ListingId)
        -> Result<MutationReceipt, ProviderError>;
}

/// One deployed marketplace contract with whatever capabilities its
/// backend exposes.
///
/// Reads and writes take the handle as `Option<&MarketHandle>`: while a
/// handle is still being resolved, reads report pending and writes fail
/// fast, which mirrors how embedders come up (config first, handle
/// later). Missing capabilities are permanent for the handle's lifetime
/// and surface as unsupported-operation failures.
#[derive(Clone)]
pub struct MarketHandle {
    chain_id: u64,
    address: Address,
    core: Arc<dyn MarketplaceProvider>,
    direct: Option<Arc<dyn DirectMarket>>,
    auction: Option<Arc<dyn AuctionMarket>>,
}

impl MarketHandle {
    /// Binds a contract address to its core provider.
    #[must_use]
    pub fn new(chain_id: u64, address: Address, core: Arc<dyn MarketplaceProvider>) -> Self {
        Self {
            chain_id,
            address,
            core,
            direct: None,
            auction: None,
        }
    }

    /// Attaches the fixed-price capability.
    #[must_use]
    pub fn with_direct(mut self, direct: Arc<dyn DirectMarket>) -> Self {
        self.direct = Some(direct);
        self
    }

    /// Attaches the auction capability.
    #[must_use]
    pub fn with_auction(mut self, auction: Arc<dyn AuctionMarket>) -> Self {
        self.auction = Some(auction);
        self
    }

    /// Chain the contract is deployed on.
    #[inline]
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Address of the deployed contract.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The core provider.
    #[must_use]
    pub fn core(&self) -> &Arc<dyn MarketplaceProvider> {
        &self.core
    }

    /// The fixed-price capability, when the backend exposes it.
    #[must_use]
    pub fn direct(&self) -> Option<&Arc<dyn DirectMarket>> {
        self.direct.as_ref()
    }

    /// The auction capability, when the backend exposes it.
    #[must_use]
    pub fn auction(&self) -> Option<&Arc<dyn AuctionMarket>> {
        self.auction.as_ref()
    }

    /// The fixed-price capability, or the unsupported-operation failure
    /// naming the operation that needed it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unsupported`] when the backend did not
    /// attach a fixed-price port.
    pub fn require_direct(&self, operation: &'static str) -> ClientResult<Arc<dyn DirectMarket>> {
        self.direct
            .as_ref()
            .map(Arc::clone)
            .ok_or(ClientError::Unsupported { operation })
    }

    /// The auction capability, or the unsupported-operation failure
    /// naming the operation that needed it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unsupported`] when the backend did not
    /// attach an auction port.
    pub fn require_auction(&self, operation: &'static str) -> ClientResult<Arc<dyn AuctionMarket>> {
        self.auction
            .as_ref()
            .map(Arc::clone)
            .ok_or(ClientError::Unsupported { operation })
    }
}

impl fmt::Debug for MarketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketHandle")
            .field("chain_id", &self.chain_id)
            .field("address", &self.address)
            .field("direct", &self.direct.is_some())
            .field("auction", &self.auction.is_some())
            .finish()
    }
}
