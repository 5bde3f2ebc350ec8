//! # Test Providers
//!
//! Deterministic in-process implementations of the provider ports, for
//! tests and benchmarks that must run without network I/O. The book
//! behaves like a tiny marketplace: listings have ids and windows, bids
//! must clear the buffer, sales clear the book.
//!
//! Every port call is counted per operation, so cache behavior can be
//! asserted as "the provider was asked exactly once".

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use bazaar_types::{
    Listing, ListingFilter, ListingId, ListingKind, MarketEvent, MutationReceipt,
    NewAuctionListing, NewDirectListing, NewOfferEvent, Offer, Price,
};
use parking_lot::Mutex;

use crate::error::ProviderError;
use crate::provider::{AuctionMarket, DirectMarket, MarketHandle, MarketplaceProvider};

/// Basis points a new bid must beat the standing bid by.
const DEFAULT_BID_BUFFER_BPS: u64 = 500;

/// Unix time the in-memory clock starts at.
const DEFAULT_CLOCK: u64 = 1_000_000;

/// A ready-made open direct listing for seeding test books.
#[must_use]
pub fn sample_direct_listing(id: u64, seller: Address) -> Listing {
    Listing {
        id: U256::from(id),
        kind: ListingKind::Direct,
        seller,
        asset_contract: Address::repeat_byte(0x22),
        token_id: U256::from(id),
        quantity: U256::from(5),
        currency: Address::ZERO,
        buyout_price_per_token: U256::from(100),
        reserve_price_per_token: None,
        start_time: 0,
        end_time: u64::MAX,
    }
}

/// A ready-made open auction listing for seeding test books.
#[must_use]
pub fn sample_auction_listing(id: u64, seller: Address) -> Listing {
    Listing {
        id: U256::from(id),
        kind: ListingKind::Auction,
        seller,
        asset_contract: Address::repeat_byte(0x22),
        token_id: U256::from(id),
        quantity: U256::from(1),
        currency: Address::ZERO,
        buyout_price_per_token: U256::from(1_000),
        reserve_price_per_token: Some(U256::from(100)),
        start_time: 0,
        end_time: u64::MAX,
    }
}

/// The mutable book behind an [`InMemoryMarket`].
#[derive(Debug, Default)]
struct MarketBook {
    listings: BTreeMap<ListingId, Listing>,
    offers: Vec<Offer>,
    winning_bids: BTreeMap<ListingId, Offer>,
    winners: BTreeMap<ListingId, Address>,
    next_id: u64,
}

/// Deterministic in-process marketplace implementing all three ports.
///
/// The market doubles as its own signer: writes act as the account
/// given to [`InMemoryMarket::with_signer`], the way a provider built
/// over a real wallet would sign as that wallet.
pub struct InMemoryMarket {
    chain_id: u64,
    address: Address,
    signer: Address,
    bid_buffer_bps: U256,
    clock: AtomicU64,
    tx_counter: AtomicU64,
    book: Mutex<MarketBook>,
    calls: Mutex<HashMap<&'static str, u64>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryMarket {
    /// An empty market for one contract address on one chain.
    #[must_use]
    pub fn new(chain_id: u64, address: Address) -> Self {
        Self {
            chain_id,
            address,
            signer: Address::repeat_byte(0x01),
            bid_buffer_bps: U256::from(DEFAULT_BID_BUFFER_BPS),
            clock: AtomicU64::new(DEFAULT_CLOCK),
            tx_counter: AtomicU64::new(0),
            book: Mutex::new(MarketBook::default()),
            calls: Mutex::new(HashMap::new()),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Sets the account this market signs writes as.
    #[must_use]
    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = signer;
        self
    }

    /// Seeds the book with a listing.
    #[must_use]
    pub fn with_listing(self, listing: Listing) -> Self {
        {
            let mut book = self.book.lock();
            let id = u64::try_from(listing.id).unwrap_or(u64::MAX);
            book.next_id = book.next_id.max(id.saturating_add(1));
            book.listings.insert(listing.id, listing);
        }
        self
    }

    /// A handle exposing every capability of this market.
    #[must_use]
    pub fn handle(self: &Arc<Self>) -> MarketHandle {
        MarketHandle::new(
            self.chain_id,
            self.address,
            Arc::clone(self) as Arc<dyn MarketplaceProvider>,
        )
        .with_direct(Arc::clone(self) as Arc<dyn DirectMarket>)
        .with_auction(Arc::clone(self) as Arc<dyn AuctionMarket>)
    }

    /// A handle exposing only the core port, for capability tests.
    #[must_use]
    pub fn core_only_handle(self: &Arc<Self>) -> MarketHandle {
        MarketHandle::new(
            self.chain_id,
            self.address,
            Arc::clone(self) as Arc<dyn MarketplaceProvider>,
        )
    }

    /// Moves the market's clock, changing which listings are active.
    pub fn set_clock(&self, unix_time: u64) {
        self.clock.store(unix_time, Ordering::SeqCst);
    }

    /// How many times one operation was called.
    #[must_use]
    pub fn calls(&self, operation: &str) -> u64 {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Total read-port calls.
    #[must_use]
    pub fn read_calls(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Total write-port calls.
    #[must_use]
    pub fn write_calls(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// The account this market signs writes as.
    #[inline]
    #[must_use]
    pub const fn signer(&self) -> Address {
        self.signer
    }

    fn record_read(&self, operation: &'static str) {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }

    fn record_write(&self, operation: &'static str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }

    fn next_receipt(&self, listing_id: Option<ListingId>) -> MutationReceipt {
        let nonce = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        MutationReceipt {
            tx_hash: B256::new(U256::from(nonce).to_be_bytes()),
            listing_id,
        }
    }

    fn not_found(listing_id: ListingId) -> ProviderError {
        ProviderError::with_code("NOT_FOUND", format!("listing {listing_id} does not exist"))
    }

    fn wrong_kind(listing_id: ListingId, wanted: ListingKind) -> ProviderError {
        let mechanism = match wanted {
            ListingKind::Direct => "direct",
            ListingKind::Auction => "auction",
        };
        ProviderError::with_code(
            "WRONG_KIND",
            format!("listing {listing_id} is not a {mechanism} listing"),
        )
    }

    fn fetch_kind(
        book: &MarketBook,
        listing_id: ListingId,
        wanted: ListingKind,
    ) -> Result<Listing, ProviderError> {
        let listing = book
            .listings
            .get(&listing_id)
            .copied()
            .ok_or_else(|| Self::not_found(listing_id))?;
        if listing.kind == wanted {
            Ok(listing)
        } else {
            Err(Self::wrong_kind(listing_id, wanted))
        }
    }
}

#[async_trait]
impl MarketplaceProvider for InMemoryMarket {
    async fn get_listing(&self, listing_id: ListingId) -> Result<Listing, ProviderError> {
        self.record_read("get_listing");
        let book = self.book.lock();
        book.listings
            .get(&listing_id)
            .copied()
            .ok_or_else(|| Self::not_found(listing_id))
    }

    async fn get_all_listings(
        &self,
        filter: ListingFilter,
    ) -> Result<Vec<Listing>, ProviderError> {
        self.record_read("get_all_listings");
        let book = self.book.lock();
        Ok(page(book.listings.values(), &filter, None))
    }

    async fn get_active_listings(
        &self,
        filter: ListingFilter,
    ) -> Result<Vec<Listing>, ProviderError> {
        self.record_read("get_active_listings");
        let now = self.clock.load(Ordering::SeqCst);
        let book = self.book.lock();
        Ok(page(book.listings.values(), &filter, Some(now)))
    }

    async fn get_total_count(&self) -> Result<U256, ProviderError> {
        self.record_read("get_total_count");
        let book = self.book.lock();
        Ok(U256::from(book.next_id))
    }

    async fn make_offer(
        &self,
        listing_id: ListingId,
        price_per_token: U256,
        quantity: U256,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("make_offer");
        let mut book = self.book.lock();
        let listing = book
            .listings
            .get(&listing_id)
            .copied()
            .ok_or_else(|| Self::not_found(listing_id))?;
        book.offers.push(Offer {
            listing_id,
            offeror: self.signer,
            currency: listing.currency,
            price_per_token,
            quantity,
            expires_at: u64::MAX,
        });
        Ok(self.next_receipt(Some(listing_id)))
    }
}

#[async_trait]
impl DirectMarket for InMemoryMarket {
    async fn create_listing(
        &self,
        listing: NewDirectListing,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("create_direct_listing");
        let mut book = self.book.lock();
        let id = U256::from(book.next_id);
        book.next_id += 1;
        book.listings.insert(
            id,
            Listing {
                id,
                kind: ListingKind::Direct,
                seller: self.signer,
                asset_contract: listing.asset_contract,
                token_id: listing.token_id,
                quantity: listing.quantity,
                currency: listing.currency,
                buyout_price_per_token: listing.buyout_price_per_token,
                reserve_price_per_token: None,
                start_time: listing.start_time,
                end_time: listing.end_time(),
            },
        );
        Ok(self.next_receipt(Some(id)))
    }

    async fn cancel_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("cancel_direct_listing");
        let mut book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Direct)?;
        book.listings.remove(&listing_id);
        book.offers.retain(|offer| offer.listing_id != listing_id);
        Ok(self.next_receipt(Some(listing_id)))
    }

    async fn accept_offer(
        &self,
        listing_id: ListingId,
        offeror: Address,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("accept_offer");
        let mut book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Direct)?;
        let standing = book
            .offers
            .iter()
            .rev()
            .any(|offer| offer.listing_id == listing_id && offer.offeror == offeror);
        if !standing {
            return Err(ProviderError::with_code(
                "NOT_FOUND",
                format!("no offer from {offeror} on listing {listing_id}"),
            ));
        }
        book.listings.remove(&listing_id);
        book.offers.retain(|offer| offer.listing_id != listing_id);
        Ok(self.next_receipt(Some(listing_id)))
    }

    async fn buyout_listing(
        &self,
        listing_id: ListingId,
        quantity: U256,
        _recipient: Option<Address>,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("buy_direct");
        let mut book = self.book.lock();
        let listing = Self::fetch_kind(&book, listing_id, ListingKind::Direct)?;
        if quantity > listing.quantity {
            return Err(ProviderError::with_code(
                "INSUFFICIENT_QUANTITY",
                format!("listing {listing_id} holds {} tokens", listing.quantity),
            ));
        }
        let remaining = listing.quantity - quantity;
        if remaining.is_zero() {
            book.listings.remove(&listing_id);
            book.offers.retain(|offer| offer.listing_id != listing_id);
        } else if let Some(entry) = book.listings.get_mut(&listing_id) {
            entry.quantity = remaining;
        }
        Ok(self.next_receipt(Some(listing_id)))
    }
}

#[async_trait]
impl AuctionMarket for InMemoryMarket {
    async fn create_listing(
        &self,
        listing: NewAuctionListing,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("create_auction_listing");
        let mut book = self.book.lock();
        let id = U256::from(book.next_id);
        book.next_id += 1;
        book.listings.insert(
            id,
            Listing {
                id,
                kind: ListingKind::Auction,
                seller: self.signer,
                asset_contract: listing.asset_contract,
                token_id: listing.token_id,
                quantity: listing.quantity,
                currency: listing.currency,
                buyout_price_per_token: listing.buyout_price_per_token,
                reserve_price_per_token: Some(listing.reserve_price_per_token),
                start_time: listing.start_time,
                end_time: listing.end_time(),
            },
        );
        Ok(self.next_receipt(Some(id)))
    }

    async fn cancel_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("cancel_auction_listing");
        let mut book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        if book.winning_bids.contains_key(&listing_id) {
            return Err(ProviderError::with_code(
                "HAS_BIDS",
                format!("auction {listing_id} already has a qualifying bid"),
            ));
        }
        book.listings.remove(&listing_id);
        Ok(self.next_receipt(Some(listing_id)))
    }

    async fn make_bid(
        &self,
        listing_id: ListingId,
        bid_per_token: U256,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("make_bid");
        let mut book = self.book.lock();
        let listing = Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        let floor = minimum_next_bid_amount(&book, &listing, self.bid_buffer_bps);
        if bid_per_token < floor {
            return Err(ProviderError::with_code(
                "BID_TOO_LOW",
                format!("bid {bid_per_token} is below the floor of {floor}"),
            ));
        }
        book.winning_bids.insert(
            listing_id,
            Offer {
                listing_id,
                offeror: self.signer,
                currency: listing.currency,
                price_per_token: bid_per_token,
                quantity: listing.quantity,
                expires_at: listing.end_time,
            },
        );
        Ok(self.next_receipt(Some(listing_id)))
    }

    async fn get_winning_bid(
        &self,
        listing_id: ListingId,
    ) -> Result<Option<Offer>, ProviderError> {
        self.record_read("get_winning_bid");
        let book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        Ok(book.winning_bids.get(&listing_id).copied())
    }

    async fn get_winner(&self, listing_id: ListingId) -> Result<Address, ProviderError> {
        self.record_read("get_winner");
        let book = self.book.lock();
        book.winners
            .get(&listing_id)
            .copied()
            .ok_or_else(ProviderError::no_winner)
    }

    async fn get_bid_buffer_bps(&self) -> Result<U256, ProviderError> {
        self.record_read("get_bid_buffer_bps");
        Ok(self.bid_buffer_bps)
    }

    async fn get_minimum_next_bid(&self, listing_id: ListingId) -> Result<Price, ProviderError> {
        self.record_read("get_minimum_next_bid");
        let book = self.book.lock();
        let listing = Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        Ok(Price {
            currency: listing.currency,
            amount: minimum_next_bid_amount(&book, &listing, self.bid_buffer_bps),
        })
    }

    async fn execute_sale(&self, listing_id: ListingId) -> Result<MutationReceipt, ProviderError> {
        self.record_write("execute_sale");
        let mut book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        let Some(bid) = book.winning_bids.remove(&listing_id) else {
            return Err(ProviderError::with_code(
                "NO_BIDS",
                format!("auction {listing_id} has no qualifying bid to settle"),
            ));
        };
        book.listings.remove(&listing_id);
        book.winners.insert(listing_id, bid.offeror);
        Ok(self.next_receipt(Some(listing_id)))
    }

    async fn buyout_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<MutationReceipt, ProviderError> {
        self.record_write("buy_auction");
        let mut book = self.book.lock();
        Self::fetch_kind(&book, listing_id, ListingKind::Auction)?;
        book.listings.remove(&listing_id);
        book.winning_bids.remove(&listing_id);
        book.winners.insert(listing_id, self.signer);
        Ok(self.next_receipt(Some(listing_id)))
    }
}

/// Applies a filter plus pagination to a listing iterator.
fn page<'a>(
    listings: impl Iterator<Item = &'a Listing>,
    filter: &ListingFilter,
    active_at: Option<u64>,
) -> Vec<Listing> {
    let start = usize::try_from(filter.start).unwrap_or(usize::MAX);
    let count = filter
        .count
        .map_or(usize::MAX, |count| usize::try_from(count).unwrap_or(usize::MAX));
    listings
        .filter(|listing| filter.matches(listing))
        .filter(|listing| active_at.map_or(true, |now| listing.is_open_at(now)))
        .skip(start)
        .take(count)
        .copied()
        .collect()
}

/// Smallest per-token bid the book accepts next for a listing.
fn minimum_next_bid_amount(book: &MarketBook, listing: &Listing, buffer_bps: U256) -> U256 {
    match book.winning_bids.get(&listing.id) {
        Some(bid) => {
            let scale = U256::from(10_000u64);
            bid.price_per_token
                .saturating_mul(scale + buffer_bps)
                .checked_div(scale)
                .unwrap_or(bid.price_per_token)
        }
        None => listing
            .reserve_price_per_token
            .unwrap_or(listing.buyout_price_per_token),
    }
}

/// Deterministic marketplace event generator for tests and benchmarks.
///
/// Produces a rotating pattern of offers across a handful of listings
/// without any I/O, in the spirit of replaying a recorded feed.
pub struct OfferSimulator {
    sequence: u64,
}

impl OfferSimulator {
    /// Creates a simulator at the start of its pattern.
    #[must_use]
    pub const fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Generates the next offer event in the pattern.
    pub fn next_offer(&mut self) -> NewOfferEvent {
        let seq = self.sequence;
        self.sequence += 1;

        NewOfferEvent {
            listing_id: U256::from(1 + seq % 4),
            offeror: Address::repeat_byte(0xa0 + (seq % 5) as u8),
            listing_kind: if seq % 3 == 0 {
                ListingKind::Auction
            } else {
                ListingKind::Direct
            },
            quantity_wanted: U256::from(1 + seq % 3),
            total_offer_amount: U256::from(100 + seq * 10),
            currency: Address::ZERO,
            block_number: 1 + seq / 3,
        }
    }

    /// Generates the next offer as a ready-to-fold feed event.
    pub fn next_event(&mut self) -> MarketEvent {
        MarketEvent::NewOffer(self.next_offer())
    }

    /// Encodes an offer event back into raw log form.
    ///
    /// Useful for exercising the raw-log path end to end without a
    /// transport.
    #[must_use]
    pub fn encode_new_offer(event: &NewOfferEvent) -> (Vec<[u8; 32]>, Vec<u8>) {
        let mut offeror = [0u8; 32];
        offeror[12..].copy_from_slice(event.offeror.as_slice());
        let mut kind = [0u8; 32];
        kind[31] = event.listing_kind.as_u8();
        let topics = vec![
            bazaar_types::NEW_OFFER_TOPIC,
            event.listing_id.to_be_bytes(),
            offeror,
            kind,
        ];

        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&event.quantity_wanted.to_be_bytes::<32>());
        data.extend_from_slice(&event.total_offer_amount.to_be_bytes::<32>());
        let mut currency = [0u8; 32];
        currency[12..].copy_from_slice(event.currency.as_slice());
        data.extend_from_slice(&currency);
        (topics, data)
    }
}

impl Default for OfferSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bazaar_types::EventDecoder;

    use super::*;

    const MARKET: Address = Address::repeat_byte(0x5a);
    const SELLER: Address = Address::repeat_byte(0x11);

    #[tokio::test]
    async fn test_book_lifecycle() {
        let market = InMemoryMarket::new(1, MARKET)
            .with_signer(Address::repeat_byte(0xab))
            .with_listing(sample_direct_listing(0, SELLER));

        let listing = market.get_listing(U256::ZERO).await.unwrap();
        assert_eq!(listing.seller, SELLER);
        assert_eq!(market.get_total_count().await.unwrap(), U256::from(1));

        // Partial buyout shrinks the listing; full buyout removes it.
        let receipt = DirectMarket::buyout_listing(&market, U256::ZERO, U256::from(2), None)
            .await
            .unwrap();
        assert_eq!(receipt.listing_id, Some(U256::ZERO));
        assert_eq!(
            market.get_listing(U256::ZERO).await.unwrap().quantity,
            U256::from(3)
        );

        DirectMarket::buyout_listing(&market, U256::ZERO, U256::from(3), None)
            .await
            .unwrap();
        assert!(market.get_listing(U256::ZERO).await.unwrap_err().code() == Some("NOT_FOUND"));
        assert_eq!(market.calls("get_listing"), 3);
        assert_eq!(market.write_calls(), 2);
    }

    #[tokio::test]
    async fn test_auction_flow_produces_winner() {
        let market = InMemoryMarket::new(1, MARKET)
            .with_signer(Address::repeat_byte(0xab))
            .with_listing(sample_auction_listing(3, SELLER));
        let id = U256::from(3);

        // Nothing qualifies yet: tolerated absence, low bid rejected.
        assert!(market.get_winner(id).await.unwrap_err().is_no_winner());
        let low = market.make_bid(id, U256::from(50)).await.unwrap_err();
        assert_eq!(low.code(), Some("BID_TOO_LOW"));

        market.make_bid(id, U256::from(100)).await.unwrap();
        let bid = market.get_winning_bid(id).await.unwrap().unwrap();
        assert_eq!(bid.price_per_token, U256::from(100));

        // Next bid must clear the 5% buffer.
        let floor = market.get_minimum_next_bid(id).await.unwrap();
        assert_eq!(floor.amount, U256::from(105));

        market.execute_sale(id).await.unwrap();
        assert_eq!(
            market.get_winner(id).await.unwrap(),
            Address::repeat_byte(0xab)
        );
        assert!(market.get_listing(id).await.unwrap_err().code() == Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_active_listings_respect_the_clock() {
        let mut closed = sample_direct_listing(1, SELLER);
        closed.end_time = 500;
        let market = InMemoryMarket::new(1, MARKET)
            .with_listing(sample_direct_listing(0, SELLER))
            .with_listing(closed);

        let all = market.get_all_listings(ListingFilter::any()).await.unwrap();
        assert_eq!(all.len(), 2);

        // Default clock sits past the closed listing's window.
        let active = market
            .get_active_listings(ListingFilter::any())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, U256::ZERO);

        market.set_clock(100);
        let active = market
            .get_active_listings(ListingFilter::any())
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_simulator_round_trips_through_decoder() {
        let mut simulator = OfferSimulator::new();
        let offer = simulator.next_offer();
        let (topics, data) = OfferSimulator::encode_new_offer(&offer);

        let decoded = EventDecoder::decode_new_offer(&topics, &data, offer.block_number).unwrap();
        assert_eq!(decoded, offer);
    }
}
