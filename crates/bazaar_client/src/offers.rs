//! # Offers View
//!
//! A fold of feed events into a queryable picture of standing offers.
//! The view is single-owner state: one consumer drains a feed receiver
//! into it and asks questions between drains. Nothing here locks,
//! because nothing here is shared.

use alloy_primitives::Address;
use bazaar_types::{ListingId, MarketEvent, NewOfferEvent};
use crossbeam_channel::Receiver;

/// Standing offers per listing, folded from the event feed.
///
/// Offers arrive in block order, so "the offeror's newest offer" is
/// simply the last one recorded - and that is the one a seller can
/// act on, since each new offer from an account replaces its last.
#[derive(Debug, Default)]
pub struct OffersView {
    offers: Vec<NewOfferEvent>,
    last_block: u64,
    events_seen: u64,
}

impl OffersView {
    /// An empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the view.
    pub fn apply(&mut self, event: &MarketEvent) {
        self.events_seen += 1;
        self.last_block = self.last_block.max(event.block_number());
        match event {
            MarketEvent::NewOffer(offer) => self.offers.push(*offer),
            // A sold listing's book is dead; drop it.
            MarketEvent::NewSale(sale) => {
                self.offers.retain(|offer| offer.listing_id != sale.listing_id);
            }
            MarketEvent::ListingAdded(_) | MarketEvent::NewBlock(_) => {}
        }
    }

    /// Drains everything currently queued on a feed receiver.
    ///
    /// Returns the number of events folded in.
    pub fn drain(&mut self, receiver: &Receiver<MarketEvent>) -> usize {
        let mut folded = 0;
        while let Ok(event) = receiver.try_recv() {
            self.apply(&event);
            folded += 1;
        }
        folded
    }

    /// Every standing offer against one listing, oldest first.
    pub fn offers_for(&self, listing_id: ListingId) -> impl Iterator<Item = &NewOfferEvent> {
        self.offers
            .iter()
            .filter(move |offer| offer.listing_id == listing_id)
    }

    /// The newest offer one account has standing against a listing.
    #[must_use]
    pub fn latest_by_offeror(
        &self,
        listing_id: ListingId,
        offeror: Address,
    ) -> Option<&NewOfferEvent> {
        self.offers
            .iter()
            .rev()
            .find(|offer| offer.listing_id == listing_id && offer.offeror == offeror)
    }

    /// The highest per-token offer against a listing; later offers win
    /// ties.
    #[must_use]
    pub fn best_offer(&self, listing_id: ListingId) -> Option<&NewOfferEvent> {
        self.offers_for(listing_id)
            .max_by_key(|offer| offer.price_per_token())
    }

    /// Number of standing offers across all listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Whether the view has no standing offers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Highest block number any folded event carried.
    #[inline]
    #[must_use]
    pub const fn last_block(&self) -> u64 {
        self.last_block
    }

    /// Total events folded into this view.
    #[inline]
    #[must_use]
    pub const fn events_seen(&self) -> u64 {
        self.events_seen
    }
}
