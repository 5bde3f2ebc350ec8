//! # Listing Records
//!
//! The core marketplace vocabulary: listings, creation payloads, filters
//! and the tagged dispatch payloads for cancel/buy operations.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Unique identifier a marketplace contract assigns to a listing.
pub type ListingId = U256;

/// The two sale mechanisms a listing can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    /// Fixed-price sale, fulfilled per-token until quantity runs out.
    Direct,
    /// English auction settled by `execute_sale` after close.
    Auction,
}

impl ListingKind {
    /// Decodes the on-chain `uint8` listing-type tag.
    ///
    /// Returns `None` for tags this client does not know, so a contract
    /// upgrade can never be misread as one of the known mechanisms.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Direct),
            1 => Some(Self::Auction),
            _ => None,
        }
    }

    /// The on-chain `uint8` tag for this kind.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Direct => 0,
            Self::Auction => 1,
        }
    }
}

/// An amount of some ERC-20 currency (or the zero address for the
/// chain's native coin).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Currency contract address; `Address::ZERO` means native coin.
    pub currency: Address,
    /// Amount in the currency's smallest unit.
    pub amount: U256,
}

/// A listing as read back from the marketplace contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Contract-assigned listing id.
    pub id: ListingId,
    /// Sale mechanism.
    pub kind: ListingKind,
    /// Account that created the listing.
    pub seller: Address,
    /// NFT contract holding the listed asset.
    pub asset_contract: Address,
    /// Token id within `asset_contract`.
    pub token_id: U256,
    /// Number of tokens listed.
    pub quantity: U256,
    /// Currency every price field below is denominated in.
    pub currency: Address,
    /// Instant-purchase price per token.
    pub buyout_price_per_token: U256,
    /// Auction reserve per token; `None` on direct listings.
    pub reserve_price_per_token: Option<U256>,
    /// Unix time the listing opens.
    pub start_time: u64,
    /// Unix time the listing closes.
    pub end_time: u64,
}

impl Listing {
    /// Total cost of buying the full quantity outright.
    #[inline]
    #[must_use]
    pub fn buyout_total(&self) -> Price {
        Price {
            currency: self.currency,
            amount: self.quantity.saturating_mul(self.buyout_price_per_token),
        }
    }

    /// Whether this listing settles through the auction mechanism.
    #[inline]
    #[must_use]
    pub const fn is_auction(&self) -> bool {
        matches!(self.kind, ListingKind::Auction)
    }

    /// Whether the listing window contains the given unix time.
    #[inline]
    #[must_use]
    pub const fn is_open_at(&self, unix_time: u64) -> bool {
        self.start_time <= unix_time && unix_time < self.end_time
    }
}

/// Payload for creating a fixed-price listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectListing {
    /// NFT contract holding the asset to list.
    pub asset_contract: Address,
    /// Token id within `asset_contract`.
    pub token_id: U256,
    /// Number of tokens to list.
    pub quantity: U256,
    /// Sale currency; `Address::ZERO` for the native coin.
    pub currency: Address,
    /// Asking price per token.
    pub buyout_price_per_token: U256,
    /// Unix time the listing opens.
    pub start_time: u64,
    /// Seconds the listing stays open.
    pub duration_secs: u64,
}

/// Payload for creating an auction listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuctionListing {
    /// NFT contract holding the asset to list.
    pub asset_contract: Address,
    /// Token id within `asset_contract`.
    pub token_id: U256,
    /// Number of tokens to list.
    pub quantity: U256,
    /// Bid currency; `Address::ZERO` for the native coin.
    pub currency: Address,
    /// Instant-win price per token; buying out closes the auction.
    pub buyout_price_per_token: U256,
    /// Minimum opening bid per token.
    pub reserve_price_per_token: U256,
    /// Unix time bidding opens.
    pub start_time: u64,
    /// Seconds the auction runs.
    pub duration_secs: u64,
}

impl NewDirectListing {
    /// Unix time the listing would close.
    #[inline]
    #[must_use]
    pub const fn end_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration_secs)
    }
}

impl NewAuctionListing {
    /// Unix time the auction would close.
    #[inline]
    #[must_use]
    pub const fn end_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration_secs)
    }
}

/// Filter and pagination window for listing enumeration reads.
///
/// The default filter matches everything from the first listing onward,
/// leaving the page size to the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Only listings created by this seller.
    pub seller: Option<Address>,
    /// Only listings for assets from this contract.
    pub asset_contract: Option<Address>,
    /// Only listings for this token id.
    pub token_id: Option<U256>,
    /// Index of the first listing to return.
    pub start: u64,
    /// Maximum number of listings to return; `None` for provider default.
    pub count: Option<u64>,
}

impl ListingFilter {
    /// Filter matching every listing.
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the filter to a single seller.
    #[must_use]
    pub fn by_seller(seller: Address) -> Self {
        Self {
            seller: Some(seller),
            ..Self::default()
        }
    }

    /// Restricts the filter to one asset contract.
    #[must_use]
    pub fn by_asset(asset_contract: Address) -> Self {
        Self {
            asset_contract: Some(asset_contract),
            ..Self::default()
        }
    }

    /// Whether a listing passes the field filters (pagination aside).
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(seller) = self.seller {
            if listing.seller != seller {
                return false;
            }
        }
        if let Some(asset_contract) = self.asset_contract {
            if listing.asset_contract != asset_contract {
                return false;
            }
        }
        if let Some(token_id) = self.token_id {
            if listing.token_id != token_id {
                return false;
            }
        }
        true
    }
}

/// Cancel request, tagged by the mechanism that owns the listing.
///
/// Direct and auction listings cancel through different contract entry
/// points; carrying the tag in the type makes a mistagged request
/// unrepresentable instead of a runtime string comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelListing {
    /// Cancel a fixed-price listing.
    Direct(ListingId),
    /// Cancel an auction that has not yet received a winning bid.
    Auction(ListingId),
}

impl CancelListing {
    /// The listing being cancelled.
    #[inline]
    #[must_use]
    pub const fn listing_id(&self) -> ListingId {
        match *self {
            Self::Direct(id) | Self::Auction(id) => id,
        }
    }

    /// The mechanism tag carried by this request.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ListingKind {
        match self {
            Self::Direct(_) => ListingKind::Direct,
            Self::Auction(_) => ListingKind::Auction,
        }
    }
}

/// Instant-purchase request, tagged by mechanism.
///
/// A direct buy names a quantity (and optionally a receiving account);
/// an auction buyout always takes the whole lot at the buyout price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyNow {
    /// Buy from a fixed-price listing.
    Direct {
        /// Listing to buy from.
        listing_id: ListingId,
        /// Number of tokens to buy.
        quantity: U256,
        /// Account receiving the tokens; defaults to the caller.
        recipient: Option<Address>,
    },
    /// Buy out a running auction at its buyout price.
    Auction {
        /// Auction to buy out.
        listing_id: ListingId,
    },
}

impl BuyNow {
    /// The listing being bought.
    #[inline]
    #[must_use]
    pub const fn listing_id(&self) -> ListingId {
        match *self {
            Self::Direct { listing_id, .. } | Self::Auction { listing_id } => listing_id,
        }
    }

    /// The mechanism tag carried by this request.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ListingKind {
        match self {
            Self::Direct { .. } => ListingKind::Direct,
            Self::Auction { .. } => ListingKind::Auction,
        }
    }
}

/// Settlement record a provider returns for a successful write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReceipt {
    /// Hash of the settling transaction.
    pub tx_hash: B256,
    /// Listing the write touched or created, when the provider knows it.
    pub listing_id: Option<ListingId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Listing {
        Listing {
            id: U256::from(7),
            kind: ListingKind::Direct,
            seller: Address::repeat_byte(0x11),
            asset_contract: Address::repeat_byte(0x22),
            token_id: U256::from(42),
            quantity: U256::from(3),
            currency: Address::ZERO,
            buyout_price_per_token: U256::from(100),
            reserve_price_per_token: None,
            start_time: 1_000,
            end_time: 2_000,
        }
    }

    #[test]
    fn test_listing_kind_tags() {
        assert_eq!(ListingKind::from_u8(0), Some(ListingKind::Direct));
        assert_eq!(ListingKind::from_u8(1), Some(ListingKind::Auction));
        // Unknown tags must be rejected, not defaulted.
        assert_eq!(ListingKind::from_u8(2), None);
        assert_eq!(ListingKind::Auction.as_u8(), 1);
    }

    #[test]
    fn test_buyout_total() {
        let listing = sample_listing();
        let total = listing.buyout_total();
        assert_eq!(total.amount, U256::from(300));
        assert_eq!(total.currency, Address::ZERO);
    }

    #[test]
    fn test_listing_window() {
        let listing = sample_listing();
        assert!(!listing.is_open_at(999));
        assert!(listing.is_open_at(1_000));
        assert!(listing.is_open_at(1_999));
        // Close bound is exclusive.
        assert!(!listing.is_open_at(2_000));
    }

    #[test]
    fn test_filter_matches() {
        let listing = sample_listing();
        assert!(ListingFilter::any().matches(&listing));
        assert!(ListingFilter::by_seller(Address::repeat_byte(0x11)).matches(&listing));
        assert!(!ListingFilter::by_seller(Address::repeat_byte(0x99)).matches(&listing));
        assert!(!ListingFilter::by_asset(Address::repeat_byte(0x33)).matches(&listing));
    }

    #[test]
    fn test_cancel_dispatch_carries_kind() {
        let cancel = CancelListing::Auction(U256::from(5));
        assert_eq!(cancel.kind(), ListingKind::Auction);
        assert_eq!(cancel.listing_id(), U256::from(5));

        let buy = BuyNow::Direct {
            listing_id: U256::from(9),
            quantity: U256::from(1),
            recipient: None,
        };
        assert_eq!(buy.kind(), ListingKind::Direct);
        assert_eq!(buy.listing_id(), U256::from(9));
    }

    #[test]
    fn test_listing_serialization_is_stable() {
        let listing = sample_listing();
        let first = serde_json::to_string(&listing).unwrap();
        let second = serde_json::to_string(&listing).unwrap();
        // Cache keys depend on byte-for-byte stable serialization.
        assert_eq!(first, second);
        assert!(first.contains("\"0x7\""));
    }
}
