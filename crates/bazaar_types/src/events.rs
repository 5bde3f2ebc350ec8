//! # Marketplace Events
//!
//! Decoded marketplace log records and the raw-log decoder.
//! Decoding is done straight from topic/data bytes with no intermediate
//! allocations; unknown signatures and malformed payloads simply return
//! `None` so a feed can skip them without surfacing an error.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;

use crate::abi::IBazaarMarket;
use crate::listing::{ListingId, ListingKind};

/// Topic-0 signature of `NewOffer`, for matching raw logs.
pub const NEW_OFFER_TOPIC: [u8; 32] = IBazaarMarket::NewOffer::SIGNATURE_HASH.0;

/// Topic-0 signature of `ListingAdded`, for matching raw logs.
pub const LISTING_ADDED_TOPIC: [u8; 32] = IBazaarMarket::ListingAdded::SIGNATURE_HASH.0;

/// Topic-0 signature of `NewSale`, for matching raw logs.
pub const NEW_SALE_TOPIC: [u8; 32] = IBazaarMarket::NewSale::SIGNATURE_HASH.0;

/// All marketplace events the client cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketEvent {
    /// An offer or bid landed against a listing.
    NewOffer(NewOfferEvent),
    /// A listing of either kind was created.
    ListingAdded(ListingAddedEvent),
    /// A listing sold, by buyout or auction settlement.
    NewSale(NewSaleEvent),
    /// A new block was sealed (for sync bookkeeping).
    NewBlock(u64),
}

impl MarketEvent {
    /// Decodes one raw log into a marketplace event.
    ///
    /// Returns `None` when the signature topic is missing or unknown,
    /// or when a known event's payload does not decode.
    #[must_use]
    pub fn from_log(topics: &[[u8; 32]], data: &[u8], block_number: u64) -> Option<Self> {
        let signature = topics.first()?;
        if *signature == NEW_OFFER_TOPIC {
            return EventDecoder::decode_new_offer(topics, data, block_number).map(Self::NewOffer);
        }
        if *signature == LISTING_ADDED_TOPIC {
            return EventDecoder::decode_listing_added(topics, block_number)
                .map(Self::ListingAdded);
        }
        if *signature == NEW_SALE_TOPIC {
            return EventDecoder::decode_new_sale(topics, data, block_number).map(Self::NewSale);
        }
        None
    }

    /// Block the event was sealed in.
    #[inline]
    #[must_use]
    pub const fn block_number(&self) -> u64 {
        match self {
            Self::NewOffer(event) => event.block_number,
            Self::ListingAdded(event) => event.block_number,
            Self::NewSale(event) => event.block_number,
            Self::NewBlock(number) => *number,
        }
    }
}

/// `NewOffer` event data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewOfferEvent {
    /// Listing the offer targets.
    pub listing_id: ListingId,
    /// Account making the offer.
    pub offeror: Address,
    /// Mechanism of the targeted listing.
    pub listing_kind: ListingKind,
    /// Number of tokens wanted.
    pub quantity_wanted: U256,
    /// Total amount offered across the whole quantity.
    pub total_offer_amount: U256,
    /// Currency the offer is denominated in.
    pub currency: Address,
    /// Block number where this occurred.
    pub block_number: u64,
}

impl NewOfferEvent {
    /// Offered price per token.
    ///
    /// A zero-quantity offer (possible on malformed contracts) is read
    /// as an offer for a single token so the division stays defined.
    #[inline]
    #[must_use]
    pub fn price_per_token(&self) -> U256 {
        if self.quantity_wanted.is_zero() {
            self.total_offer_amount
        } else {
            self.total_offer_amount / self.quantity_wanted
        }
    }
}

/// `ListingAdded` event data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListingAddedEvent {
    /// Contract-assigned id of the new listing.
    pub listing_id: ListingId,
    /// NFT contract holding the listed asset.
    pub asset_contract: Address,
    /// Account that created the listing.
    pub lister: Address,
    /// Block number where this occurred.
    pub block_number: u64,
}

/// `NewSale` event data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewSaleEvent {
    /// Listing that sold.
    pub listing_id: ListingId,
    /// NFT contract holding the sold asset.
    pub asset_contract: Address,
    /// Seller of record.
    pub lister: Address,
    /// Buying account.
    pub buyer: Address,
    /// Number of tokens bought.
    pub quantity_bought: U256,
    /// Total paid across the whole quantity.
    pub total_price_paid: U256,
    /// Block number where this occurred.
    pub block_number: u64,
}

/// Event decoder for raw log data.
///
/// Optimized for speed - fields are read directly from bytes at fixed
/// ABI offsets rather than through a generic decoder.
pub struct EventDecoder;

impl EventDecoder {
    /// Decodes a `NewOffer` event from raw log data.
    ///
    /// # Arguments
    ///
    /// * `topics` - The indexed event topics
    /// * `data` - The non-indexed event data
    /// * `block_number` - Block where the event occurred
    ///
    /// # Returns
    ///
    /// Decoded event, or `None` if the payload does not match the ABI.
    #[must_use]
    pub fn decode_new_offer(
        topics: &[[u8; 32]],
        data: &[u8],
        block_number: u64,
    ) -> Option<NewOfferEvent> {
        // Topics: signature + listingId + offeror + listingType = 4.
        // Data: quantityWanted(32) | totalOfferAmount(32) | currency(32).
        if topics.len() < 4 || data.len() < 96 {
            return None;
        }

        let listing_id = U256::from_be_slice(&topics[1]);
        let offeror = Address::from_slice(&topics[2][12..32]);
        let listing_kind = ListingKind::from_u8(topics[3][31])?;

        let quantity_wanted = U256::from_be_slice(&data[0..32]);
        let total_offer_amount = U256::from_be_slice(&data[32..64]);
        let currency = Address::from_slice(&data[76..96]);

        Some(NewOfferEvent {
            listing_id,
            offeror,
            listing_kind,
            quantity_wanted,
            total_offer_amount,
            currency,
            block_number,
        })
    }

    /// Decodes a `ListingAdded` event from its topics.
    ///
    /// The event carries no non-indexed data.
    #[must_use]
    pub fn decode_listing_added(
        topics: &[[u8; 32]],
        block_number: u64,
    ) -> Option<ListingAddedEvent> {
        // Topics: signature + listingId + assetContract + lister = 4.
        if topics.len() < 4 {
            return None;
        }

        let listing_id = U256::from_be_slice(&topics[1]);
        let asset_contract = Address::from_slice(&topics[2][12..32]);
        let lister = Address::from_slice(&topics[3][12..32]);

        Some(ListingAddedEvent {
            listing_id,
            asset_contract,
            lister,
            block_number,
        })
    }

    /// Decodes a `NewSale` event from raw log data.
    #[must_use]
    pub fn decode_new_sale(
        topics: &[[u8; 32]],
        data: &[u8],
        block_number: u64,
    ) -> Option<NewSaleEvent> {
        // Topics: signature + listingId + assetContract + lister = 4.
        // Data: buyer(32) | quantityBought(32) | totalPricePaid(32).
        if topics.len() < 4 || data.len() < 96 {
            return None;
        }

        let listing_id = U256::from_be_slice(&topics[1]);
        let asset_contract = Address::from_slice(&topics[2][12..32]);
        let lister = Address::from_slice(&topics[3][12..32]);

        let buyer = Address::from_slice(&data[12..32]);
        let quantity_bought = U256::from_be_slice(&data[32..64]);
        let total_price_paid = U256::from_be_slice(&data[64..96]);

        Some(NewSaleEvent {
            listing_id,
            asset_contract,
            lister,
            buyer,
            quantity_bought,
            total_price_paid,
            block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u256_topic(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes()
    }

    fn address_topic(byte: u8) -> [u8; 32] {
        let mut topic = [0u8; 32];
        topic[12..].copy_from_slice(Address::repeat_byte(byte).as_slice());
        topic
    }

    fn kind_topic(tag: u8) -> [u8; 32] {
        let mut topic = [0u8; 32];
        topic[31] = tag;
        topic
    }

    fn new_offer_log() -> (Vec<[u8; 32]>, Vec<u8>) {
        let topics = vec![
            NEW_OFFER_TOPIC,
            u256_topic(7),        // listingId
            address_topic(0xaa),  // offeror
            kind_topic(1),        // listingType = auction
        ];
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&u256_topic(4)); // quantityWanted
        data.extend_from_slice(&u256_topic(200)); // totalOfferAmount
        data.extend_from_slice(&address_topic(0xcc)); // currency
        (topics, data)
    }

    #[test]
    fn test_decode_new_offer() {
        let (topics, data) = new_offer_log();
        let event = EventDecoder::decode_new_offer(&topics, &data, 42).unwrap();

        assert_eq!(event.listing_id, U256::from(7));
        assert_eq!(event.offeror, Address::repeat_byte(0xaa));
        assert_eq!(event.listing_kind, ListingKind::Auction);
        assert_eq!(event.quantity_wanted, U256::from(4));
        assert_eq!(event.total_offer_amount, U256::from(200));
        assert_eq!(event.currency, Address::repeat_byte(0xcc));
        assert_eq!(event.block_number, 42);
        assert_eq!(event.price_per_token(), U256::from(50));
    }

    #[test]
    fn test_decode_new_offer_rejects_unknown_listing_type() {
        let (mut topics, data) = new_offer_log();
        topics[3] = kind_topic(9);
        assert!(EventDecoder::decode_new_offer(&topics, &data, 42).is_none());
    }

    #[test]
    fn test_decode_new_offer_rejects_short_data() {
        let (topics, data) = new_offer_log();
        assert!(EventDecoder::decode_new_offer(&topics, &data[..64], 42).is_none());
    }

    #[test]
    fn test_decode_listing_added() {
        let topics = vec![
            LISTING_ADDED_TOPIC,
            u256_topic(3),
            address_topic(0x11),
            address_topic(0x22),
        ];
        let event = EventDecoder::decode_listing_added(&topics, 100).unwrap();
        assert_eq!(event.listing_id, U256::from(3));
        assert_eq!(event.asset_contract, Address::repeat_byte(0x11));
        assert_eq!(event.lister, Address::repeat_byte(0x22));
    }

    #[test]
    fn test_from_log_dispatch() {
        let (topics, data) = new_offer_log();
        let event = MarketEvent::from_log(&topics, &data, 42).unwrap();
        assert!(matches!(event, MarketEvent::NewOffer(_)));
        assert_eq!(event.block_number(), 42);

        // Unknown signature is skipped, not an error.
        let unknown = vec![[0xffu8; 32], u256_topic(1)];
        assert!(MarketEvent::from_log(&unknown, &[], 42).is_none());

        // Empty topics never decode.
        assert!(MarketEvent::from_log(&[], &[], 42).is_none());
    }

    #[test]
    fn test_zero_quantity_offer_price() {
        let (topics, mut data) = new_offer_log();
        data[0..32].copy_from_slice(&u256_topic(0));
        let event = EventDecoder::decode_new_offer(&topics, &data, 42).unwrap();
        assert_eq!(event.price_per_token(), U256::from(200));
    }
}
