//! # BAZAAR Marketplace Client
//!
//! Cache-aware client layer for on-chain marketplace contracts.
//!
//! ## Design Principles
//!
//! 1. **Reads are cached, writes invalidate** - Every read goes through
//!    the keyed query engine; every write invalidates its contract scope
//!    on settlement, success or failure
//! 2. **One provider call per distinct in-flight read** - Concurrent
//!    reads of one key coalesce onto a single fetch
//! 3. **No retries on writes** - A marketplace write may land on chain
//!    even when it reports failure, so this layer never re-sends
//! 4. **Explicit context** - Configuration and wallet identity are
//!    passed in by handle, never read from ambient global state
//!
//! ## Thread Safety
//!
//! The engine and both surfaces are `Send + Sync` and cheap to share
//! behind an `Arc`. Nothing here spawns tasks or owns a runtime; fetch
//! futures run on the caller's task.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bazaar_client::{ClientConfig, EngineConfig, MarketQueries, QueryEngine};
//!
//! let engine = Arc::new(QueryEngine::new(EngineConfig::default()));
//! let config = Arc::new(ClientConfig::load("bazaar.toml")?);
//! let queries = MarketQueries::new(engine, config);
//!
//! // Pending until the embedder resolves a handle; cached afterwards.
//! let listing = queries.listing(handle.as_ref(), Some(listing_id)).await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod identity;
pub mod keys;
pub mod mutations;
pub mod offers;
pub mod provider;
pub mod queries;
pub mod testing;

pub use config::{ClientConfig, GatewayKeys};
pub use engine::{EngineConfig, EngineStats, QueryEngine, QueryResult};
pub use error::{ClientError, ClientResult, ProviderError};
pub use feed::{EventFeed, FeedConfig, FeedStats};
pub use identity::{StaticWallet, WalletIdentity};
pub use keys::QueryKey;
pub use mutations::MarketMutations;
pub use offers::OffersView;
pub use provider::{AuctionMarket, DirectMarket, MarketHandle, MarketplaceProvider};
pub use queries::MarketQueries;
