//! # Mutation Dispatcher
//!
//! The seven marketplace writes. Every write walks the same
//! precondition ladder - active account, resolved handle, supported
//! chain, required capability, required parameters - and settles
//! through [`QueryEngine::run_mutation`], so the contract scope is
//! invalidated whether the provider reported success or failure.
//!
//! Writes are never queued or ordered against each other: two
//! in-flight writes race at the provider exactly as two independent
//! wallets would.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use bazaar_types::{
    BuyNow, CancelListing, ListingId, MutationReceipt, NewAuctionListing, NewDirectListing,
};

use crate::config::ClientConfig;
use crate::engine::QueryEngine;
use crate::error::{ClientError, ClientResult, ProviderError};
use crate::identity::WalletIdentity;
use crate::provider::MarketHandle;

/// The write surface for marketplace contracts.
pub struct MarketMutations {
    engine: Arc<QueryEngine>,
    identity: Arc<dyn WalletIdentity>,
    config: Arc<ClientConfig>,
}

impl MarketMutations {
    /// Binds a write surface to an engine, a wallet and a configuration.
    #[must_use]
    pub fn new(
        engine: Arc<QueryEngine>,
        identity: Arc<dyn WalletIdentity>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            engine,
            identity,
            config,
        }
    }

    /// Creates a fixed-price listing.
    pub async fn create_direct_listing(
        &self,
        handle: Option<&MarketHandle>,
        listing: NewDirectListing,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let direct = handle.require_direct("direct.create_listing")?;
        self.run(handle, "create_direct_listing", async move {
            direct.create_listing(listing).await
        })
        .await
    }

    /// Creates an auction listing.
    pub async fn create_auction_listing(
        &self,
        handle: Option<&MarketHandle>,
        listing: NewAuctionListing,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let auction = handle.require_auction("auction.create_listing")?;
        self.run(handle, "create_auction_listing", async move {
            auction.create_listing(listing).await
        })
        .await
    }

    /// Cancels a listing through the entry point its tag names.
    ///
    /// The tag travels in the request type, so a request can never be
    /// dispatched against the wrong mechanism.
    pub async fn cancel_listing(
        &self,
        handle: Option<&MarketHandle>,
        request: Option<CancelListing>,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let request = request.ok_or(ClientError::MissingParameter { name: "listing_id" })?;
        match request {
            CancelListing::Direct(listing_id) => {
                let direct = handle.require_direct("direct.cancel_listing")?;
                self.run(handle, "cancel_direct_listing", async move {
                    direct.cancel_listing(listing_id).await
                })
                .await
            }
            CancelListing::Auction(listing_id) => {
                let auction = handle.require_auction("auction.cancel_listing")?;
                self.run(handle, "cancel_auction_listing", async move {
                    auction.cancel_listing(listing_id).await
                })
                .await
            }
        }
    }

    /// Places a bid on a running auction.
    ///
    /// A zero bid carries no information the contract could act on, so
    /// it is rejected here without touching the provider.
    pub async fn make_bid(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
        bid_per_token: U256,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let listing_id = required(listing_id, "listing_id")?;
        if bid_per_token.is_zero() {
            return Err(ClientError::MissingParameter {
                name: "bid_per_token",
            });
        }
        let auction = handle.require_auction("auction.make_bid")?;
        self.run(handle, "make_bid", async move {
            auction.make_bid(listing_id, bid_per_token).await
        })
        .await
    }

    /// Places an offer against a listing of either kind.
    pub async fn make_offer(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
        price_per_token: U256,
        quantity: U256,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let listing_id = required(listing_id, "listing_id")?;
        let provider = Arc::clone(handle.core());
        self.run(handle, "make_offer", async move {
            provider
                .make_offer(listing_id, price_per_token, quantity)
                .await
        })
        .await
    }

    /// Accepts a standing offer on a fixed-price listing.
    pub async fn accept_offer(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
        offeror: Option<Address>,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let listing_id = required(listing_id, "listing_id")?;
        let offeror = required(offeror, "offeror")?;
        let direct = handle.require_direct("direct.accept_offer")?;
        self.run(handle, "accept_offer", async move {
            direct.accept_offer(listing_id, offeror).await
        })
        .await
    }

    /// Settles a closed auction.
    pub async fn execute_sale(
        &self,
        handle: Option<&MarketHandle>,
        listing_id: Option<ListingId>,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let listing_id = required(listing_id, "listing_id")?;
        let auction = handle.require_auction("auction.execute_sale")?;
        self.run(handle, "execute_sale", async move {
            auction.execute_sale(listing_id).await
        })
        .await
    }

    /// Buys a listing out through the entry point its tag names.
    pub async fn buy_now(
        &self,
        handle: Option<&MarketHandle>,
        request: Option<BuyNow>,
    ) -> ClientResult<MutationReceipt> {
        let handle = self.preflight(handle)?;
        let request = request.ok_or(ClientError::MissingParameter { name: "listing_id" })?;
        match request {
            BuyNow::Direct {
                listing_id,
                quantity,
                recipient,
            } => {
                let direct = handle.require_direct("direct.buyout_listing")?;
                self.run(handle, "buy_now_direct", async move {
                    direct.buyout_listing(listing_id, quantity, recipient).await
                })
                .await
            }
            BuyNow::Auction { listing_id } => {
                let auction = handle.require_auction("auction.buyout_listing")?;
                self.run(handle, "buy_now_auction", async move {
                    auction.buyout_listing(listing_id).await
                })
                .await
            }
        }
    }

    /// The ladder every write climbs before touching a provider.
    fn preflight<'h>(&self, handle: Option<&'h MarketHandle>) -> ClientResult<&'h MarketHandle> {
        if self.identity.active_account().is_none() {
            return Err(ClientError::Unauthenticated);
        }
        let handle = handle.ok_or(ClientError::MissingHandle)?;
        if !self.config.is_supported(handle.chain_id()) {
            return Err(ClientError::InvalidConfig(format!(
                "chain {} is not in the supported set",
                handle.chain_id()
            )));
        }
        Ok(handle)
    }

    /// Runs the provider call, then invalidates the contract scope.
    ///
    /// Invalidation is registered before the outcome is reported, and
    /// on failure as much as on success.
    async fn run<T, F>(
        &self,
        handle: &MarketHandle,
        operation: &'static str,
        mutate: F,
    ) -> ClientResult<T>
    where
        F: Future<Output = Result<T, ProviderError>> + Send,
    {
        let chain_id = handle.chain_id();
        let address = handle.address();
        let outcome = self
            .engine
            .run_mutation(mutate, |engine| engine.invalidate_scope(chain_id, address))
            .await;
        match outcome {
            Ok(value) => {
                tracing::debug!(operation, %address, "mutation settled");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(operation, %address, error = %err, "mutation failed; scope invalidated");
                Err(ClientError::Provider(err))
            }
        }
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> ClientResult<T> {
    value.ok_or(ClientError::MissingParameter { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::identity::StaticWallet;
    use crate::testing::InMemoryMarket;

    fn fixture(connected: bool) -> (MarketMutations, Arc<InMemoryMarket>) {
        let engine = Arc::new(QueryEngine::new(EngineConfig::testing()));
        let wallet = if connected {
            StaticWallet::connected(Address::repeat_byte(0xab))
        } else {
            StaticWallet::disconnected()
        };
        let config = Arc::new(ClientConfig::default());
        let market = Arc::new(InMemoryMarket::new(1, Address::repeat_byte(0x5a)));
        (
            MarketMutations::new(engine, Arc::new(wallet), config),
            market,
        )
    }

    #[tokio::test]
    async fn test_identity_is_checked_before_handle() {
        let (mutations, _market) = fixture(false);
        // Both the wallet and the handle are missing; the wallet wins.
        let err = mutations
            .execute_sale(None, Some(U256::from(1)))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Unauthenticated);
    }

    #[tokio::test]
    async fn test_missing_handle_fails_fast() {
        let (mutations, market) = fixture(true);
        let err = mutations
            .execute_sale(None, Some(U256::from(1)))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::MissingHandle);
        assert_eq!(market.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_parameter_fails_fast() {
        let (mutations, market) = fixture(true);
        let handle = market.handle();
        let err = mutations.cancel_listing(Some(&handle), None).await.unwrap_err();
        assert_eq!(err, ClientError::MissingParameter { name: "listing_id" });
        assert_eq!(market.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_bid_never_reaches_the_provider() {
        let (mutations, market) = fixture(true);
        let handle = market.handle();
        let err = mutations
            .make_bid(Some(&handle), Some(U256::from(1)), U256::ZERO)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::MissingParameter {
                name: "bid_per_token"
            }
        );
        assert_eq!(market.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_chain_is_rejected() {
        let (mutations, _) = fixture(true);
        let market = Arc::new(InMemoryMarket::new(31_337, Address::repeat_byte(0x5a)));
        let handle = market.handle();
        let err = mutations
            .execute_sale(Some(&handle), Some(U256::from(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
        assert_eq!(market.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_capability_is_unsupported() {
        let (mutations, market) = fixture(true);
        let handle = market.core_only_handle();
        let err = mutations
            .execute_sale(Some(&handle), Some(U256::from(1)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Unsupported {
                operation: "auction.execute_sale"
            }
        );
        assert_eq!(market.write_calls(), 0);
    }
}
