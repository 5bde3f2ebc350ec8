//! # Client Performance Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - Key derivation: < 5µs
//! - Raw-log decode: < 1µs
//!
//! Run with: `cargo bench --package bazaar_client`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use alloy_primitives::{Address, U256};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bazaar_client::testing::OfferSimulator;
use bazaar_client::QueryKey;
use bazaar_types::{EventDecoder, ListingFilter, MarketEvent};

const MARKET: Address = Address::repeat_byte(0x5a);

/// Benchmark: cache-key derivation across parameter shapes.
fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_derivation");

    group.bench_function("scalar_params", |b| {
        b.iter(|| {
            black_box(QueryKey::derive(
                1,
                Some(MARKET),
                "get_listing",
                black_box(&42u64),
            ))
        });
    });

    let filter = ListingFilter {
        seller: Some(Address::repeat_byte(0x11)),
        asset_contract: Some(Address::repeat_byte(0x22)),
        token_id: Some(U256::from(7)),
        start: 0,
        count: Some(100),
    };
    group.bench_function("struct_params", |b| {
        b.iter(|| {
            black_box(QueryKey::derive(
                1,
                Some(MARKET),
                "get_active_listings",
                black_box(&filter),
            ))
        });
    });

    group.finish();
}

/// Benchmark: decoding raw marketplace logs into events.
fn bench_event_decoding(c: &mut Criterion) {
    let mut simulator = OfferSimulator::new();
    let offer = simulator.next_offer();
    let (topics, data) = OfferSimulator::encode_new_offer(&offer);

    c.bench_function("decode_new_offer", |b| {
        b.iter(|| {
            black_box(EventDecoder::decode_new_offer(
                black_box(&topics),
                black_box(&data),
                42,
            ))
        });
    });

    c.bench_function("from_log_dispatch", |b| {
        b.iter(|| black_box(MarketEvent::from_log(black_box(&topics), black_box(&data), 42)));
    });
}

/// Benchmark: key derivation cost as filter pagination grows.
fn bench_filter_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_page_size");
    for count in [10u64, 100, 1_000] {
        let filter = ListingFilter {
            count: Some(count),
            ..ListingFilter::any()
        };
        group.bench_with_input(BenchmarkId::from_parameter(count), &filter, |b, filter| {
            b.iter(|| black_box(QueryKey::derive(1, Some(MARKET), "get_all_listings", filter)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_key_derivation,
    bench_event_decoding,
    bench_filter_sizes
);
criterion_main!(benches);
