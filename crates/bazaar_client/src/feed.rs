//! # Event Feed
//!
//! Push-side counterpart of the cached read surface. Raw marketplace
//! logs come in from whatever transport the embedder runs, get decoded
//! once, and fan out over a bounded channel to however many consumers
//! subscribe.
//!
//! The feed never blocks a producer: when a consumer falls behind and
//! the channel fills, new events are counted as dropped and discarded.
//! Consumers that need a complete picture re-read through the query
//! surface; the feed is a freshness signal, not a ledger.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   RPC/WS     │ ──▶ │     Feed     │ ──▶ │   Channel    │ ──▶ Views
//! │   Logs       │     │   (Decoder)  │     │   (Bounded)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use bazaar_types::MarketEvent;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Configuration for the event feed.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Only decode logs emitted by this contract; `None` decodes all.
    pub contract_address: Option<Address>,
    /// Channel buffer size for decoded events.
    pub channel_buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            contract_address: None,
            channel_buffer: 1024,
        }
    }
}

impl FeedConfig {
    /// A feed watching a single marketplace contract.
    #[must_use]
    pub fn for_contract(contract_address: Address) -> Self {
        Self {
            contract_address: Some(contract_address),
            ..Self::default()
        }
    }
}

/// Statistics for the event feed.
#[derive(Debug, Default)]
pub struct FeedStats {
    /// Decoded events handed to the channel.
    pub events_published: AtomicU64,
    /// Events discarded because the channel was full.
    pub events_dropped: AtomicU64,
    /// Raw logs skipped: wrong contract or unknown/undecodable shape.
    pub logs_skipped: AtomicU64,
}

/// Bounded fanout of decoded marketplace events.
pub struct EventFeed {
    sender: Sender<MarketEvent>,
    receiver: Receiver<MarketEvent>,
    stats: Arc<FeedStats>,
    config: FeedConfig,
}

impl EventFeed {
    /// Creates a feed with the given configuration.
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        let (sender, receiver) = bounded(config.channel_buffer);
        Self {
            sender,
            receiver,
            stats: Arc::new(FeedStats::default()),
            config,
        }
    }

    /// Returns a clone of the event receiver.
    ///
    /// Receivers compete for events; give each independent consumer its
    /// own feed if every one must see every event.
    #[must_use]
    pub fn receiver(&self) -> Receiver<MarketEvent> {
        self.receiver.clone()
    }

    /// Shared handle to the feed counters.
    #[must_use]
    pub fn stats(&self) -> Arc<FeedStats> {
        Arc::clone(&self.stats)
    }

    /// The configuration this feed was built with.
    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Publishes an already-decoded event.
    ///
    /// Returns `false` when the channel is full and the event was
    /// dropped.
    pub fn publish(&self, event: MarketEvent) -> bool {
        if self.sender.try_send(event).is_ok() {
            self.stats.events_published.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(block = event.block_number(), "feed full; event dropped");
            false
        }
    }

    /// Decodes one raw log and publishes the result.
    ///
    /// # Arguments
    ///
    /// * `emitter` - Contract that emitted the log
    /// * `topics` - Event topics
    /// * `data` - Non-indexed event data
    /// * `block_number` - Block the log was sealed in
    ///
    /// # Returns
    ///
    /// `true` if the log decoded to a known event and was published.
    pub fn process_raw_log(
        &self,
        emitter: Address,
        topics: &[[u8; 32]],
        data: &[u8],
        block_number: u64,
    ) -> bool {
        if let Some(watched) = self.config.contract_address {
            if watched != emitter {
                self.stats.logs_skipped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        }

        match MarketEvent::from_log(topics, data, block_number) {
            Some(event) => self.publish(event),
            None => {
                self.stats.logs_skipped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Publishes a new-block marker for sync bookkeeping.
    pub fn announce_block(&self, block_number: u64) -> bool {
        self.publish(MarketEvent::NewBlock(block_number))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use bazaar_types::NEW_OFFER_TOPIC;

    use super::*;

    const MARKET: Address = Address::repeat_byte(0x5a);

    fn new_offer_log() -> (Vec<[u8; 32]>, Vec<u8>) {
        let mut offeror = [0u8; 32];
        offeror[12..].copy_from_slice(Address::repeat_byte(0xaa).as_slice());
        let mut kind = [0u8; 32];
        kind[31] = 0;
        let topics = vec![NEW_OFFER_TOPIC, U256::from(7).to_be_bytes(), offeror, kind];

        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&U256::from(1).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(500).to_be_bytes::<32>());
        let mut currency = [0u8; 32];
        currency[12..].copy_from_slice(Address::repeat_byte(0xcc).as_slice());
        data.extend_from_slice(&currency);
        (topics, data)
    }

    #[test]
    fn test_publish_and_receive() {
        let feed = EventFeed::new(FeedConfig::default());
        let receiver = feed.receiver();

        assert!(feed.announce_block(42));
        let event = receiver.try_recv().unwrap();
        assert_eq!(event, MarketEvent::NewBlock(42));
        assert_eq!(feed.stats().events_published.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_raw_log_decodes_and_fans_out() {
        let feed = EventFeed::new(FeedConfig::for_contract(MARKET));
        let receiver = feed.receiver();
        let (topics, data) = new_offer_log();

        assert!(feed.process_raw_log(MARKET, &topics, &data, 42));
        match receiver.try_recv().unwrap() {
            MarketEvent::NewOffer(offer) => {
                assert_eq!(offer.listing_id, U256::from(7));
                assert_eq!(offer.total_offer_amount, U256::from(500));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_contract_is_skipped() {
        let feed = EventFeed::new(FeedConfig::for_contract(MARKET));
        let (topics, data) = new_offer_log();

        assert!(!feed.process_raw_log(Address::repeat_byte(0x99), &topics, &data, 42));
        assert!(feed.receiver().try_recv().is_err());
        assert_eq!(feed.stats().logs_skipped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unknown_signature_is_skipped() {
        let feed = EventFeed::new(FeedConfig::default());
        let topics = vec![[0xffu8; 32]];

        assert!(!feed.process_raw_log(MARKET, &topics, &[], 42));
        assert_eq!(feed.stats().logs_skipped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let feed = EventFeed::new(FeedConfig {
            contract_address: None,
            channel_buffer: 1,
        });

        assert!(feed.announce_block(1));
        assert!(!feed.announce_block(2));
        assert_eq!(feed.stats().events_dropped.load(Ordering::Relaxed), 1);

        // Consumer catches up; publishing resumes.
        assert_eq!(feed.receiver().try_recv().unwrap(), MarketEvent::NewBlock(1));
        assert!(feed.announce_block(3));
    }
}
