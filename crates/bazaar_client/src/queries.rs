//! # Read Surface
//!
//! The eight marketplace reads, each one a thin binding of inputs to a
//! [`QueryKey`] and a provider call, routed through the [`QueryEngine`].
//!
//! Reads are input-gated the way the embedder experiences the world:
//! no handle yet, or no listing id yet, means [`QueryResult::Pending`]
//! and no provider traffic. Real faults - an unsupported chain, a
//! handle without the needed capability - report as failures because
//! waiting will not fix them.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use bazaar_types::{Listing, ListingFilter, ListingId, Offer, Price};

use crate::config::ClientConfig;
use crate::engine::{QueryEngine, QueryResult};
use crate::error::{ClientError, ClientResult};
use crate::keys::QueryKey;
use crate::provider::MarketHandle;

/// The cached read surface for marketplace contracts.
///
/// Holds no per-contract state: one instance serves any number of
/// handles, and all of them share the engine's cache.
pub struct MarketQueries {
    engine: Arc<QueryEngine>,
    config: Arc<ClientConfig>,
}

impl MarketQueries {
    /// Binds a read surface to an engine and a configuration.
    #[must_use]
    pub fn new(engine: Arc<QueryEngine>, config: Arc<ClientConfig>) -> Self {
        Self { engine, config }
    }

    /// The engine behind this surface.
    #[must_use]
    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    /// One listing by id.
    pub async fn listing(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
    ) -> QueryResult<Listing> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        let Some(listing_id) = listing_id else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let key = match scoped_key(handle, "get_listing", &listing_id) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        let provider = Arc::clone(handle.core());
        self.engine
            .run_query(&key, async move {
                provider
                    .get_listing(listing_id)
                    .await
                    .map_err(ClientError::from)
            })
            .await
    }

    /// All listings matching a filter, open or not.
    ///
    /// An absent filter is the default filter, not a disabled read.
    pub async fn all_listings(
        &self,
        handle: Option<&MarketHandle>,
        filter: Option<ListingFilter>,
    ) -> QueryResult<Vec<Listing>> {
        self.listings_page(handle, filter, false).await
    }

    /// Listings matching a filter that are open right now.
    pub async fn active_listings(
        &self,
        handle: Option<&MarketHandle>,
        filter: Option<ListingFilter>,
    ) -> QueryResult<Vec<Listing>> {
        self.listings_page(handle, filter, true).await
    }

    async fn listings_page(
        &self,
        handle: Option<&MarketHandle>,
        filter: Option<ListingFilter>,
        active_only: bool,
    ) -> QueryResult<Vec<Listing>> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let filter = filter.unwrap_or_default();
        let operation = if active_only {
            "get_active_listings"
        } else {
            "get_all_listings"
        };
        let key = match scoped_key(handle, operation, &filter) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        let provider = Arc::clone(handle.core());
        self.engine
            .run_query(&key, async move {
                let page = if active_only {
                    provider.get_active_listings(filter).await
                } else {
                    provider.get_all_listings(filter).await
                };
                page.map_err(ClientError::from)
            })
            .await
    }

    /// Total number of listings ever created on the contract.
    pub async fn total_count(&self, handle: Option<&MarketHandle>) -> QueryResult<U256> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let key = match scoped_key(handle, "get_total_count", &()) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        let provider = Arc::clone(handle.core());
        self.engine
            .run_query(&key, async move {
                provider.get_total_count().await.map_err(ClientError::from)
            })
            .await
    }

    /// Current best bid on an auction, `None` while nothing qualifies.
    pub async fn winning_bid(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
    ) -> QueryResult<Option<Offer>> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        let Some(listing_id) = listing_id else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let auction = match handle.require_auction("auction.get_winning_bid") {
            Ok(auction) => auction,
            Err(err) => return QueryResult::Failed(err),
        };
        let key = match scoped_key(handle, "get_winning_bid", &listing_id) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        self.engine
            .run_query(&key, async move {
                auction
                    .get_winning_bid(listing_id)
                    .await
                    .map_err(ClientError::from)
            })
            .await
    }

    /// Winner of a closed auction.
    ///
    /// `Ready(None)` means the provider reported the tolerated
    /// "no winner yet" condition; any other failure surfaces as
    /// [`QueryResult::Failed`].
    pub async fn winner(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
    ) -> QueryResult<Option<Address>> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        let Some(listing_id) = listing_id else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let auction = match handle.require_auction("auction.get_winner") {
            Ok(auction) => auction,
            Err(err) => return QueryResult::Failed(err),
        };
        let key = match scoped_key(handle, "get_winner", &listing_id) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        self.engine
            .run_query(&key, async move {
                match auction.get_winner(listing_id).await {
                    Ok(winner) => Ok(Some(winner)),
                    // Absence of a winner is a state, not a fault.
                    Err(err) if err.is_no_winner() => Ok(None),
                    Err(err) => Err(ClientError::Provider(err)),
                }
            })
            .await
    }

    /// Contract-wide bid step, in basis points of the winning bid.
    pub async fn bid_buffer_bps(&self, handle: Option<&MarketHandle>) -> QueryResult<U256> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let auction = match handle.require_auction("auction.get_bid_buffer_bps") {
            Ok(auction) => auction,
            Err(err) => return QueryResult::Failed(err),
        };
        let key = match scoped_key(handle, "get_bid_buffer_bps", &()) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        self.engine
            .run_query(&key, async move {
                auction
                    .get_bid_buffer_bps()
                    .await
                    .map_err(ClientError::from)
            })
            .await
    }

    /// Smallest bid per token the auction accepts next.
    pub async fn minimum_next_bid(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
    ) -> QueryResult<Price> {
        let Some(handle) = handle else {
            return QueryResult::Pending;
        };
        let Some(listing_id) = listing_id else {
            return QueryResult::Pending;
        };
        if let Err(err) = self.supported(handle) {
            return QueryResult::Failed(err);
        }
        let auction = match handle.require_auction("auction.get_minimum_next_bid") {
            Ok(auction) => auction,
            Err(err) => return QueryResult::Failed(err),
        };
        let key = match scoped_key(handle, "get_minimum_next_bid", &listing_id) {
            Ok(key) => key,
            Err(err) => return QueryResult::Failed(err),
        };
        self.engine
            .run_query(&key, async move {
                auction
                    .get_minimum_next_bid(listing_id)
                    .await
                    .map_err(ClientError::from)
            })
            .await
    }

    fn supported(&self, handle: &MarketHandle) -> ClientResult<()> {
        if self.config.is_supported(handle.chain_id()) {
            Ok(())
        } else {
            Err(ClientError::InvalidConfig(format!(
                "chain {} is not in the supported set",
                handle.chain_id()
            )))
        }
    }
}

fn scoped_key<P>(handle: &MarketHandle, operation: &'static str, params: &P) -> ClientResult<QueryKey>
where
    P: serde::Serialize + ?Sized,
{
    QueryKey::derive(
        handle.chain_id(),
        Some(handle.address()),
        operation,
        params,
    )
}
