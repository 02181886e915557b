//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check codec, sanitizer and store invariants.

use proptest::prelude::*;
use serde_json::Value;

use chrono::{DateTime, Duration, FixedOffset, TimeZone};

use crate::cache::key::sanitize;
use crate::cache::{codec, CacheStore, ManualClock, Ttl};
use crate::storage::{MemoryGateway, StorageGateway};

// == Test Setup ==
fn start() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .unwrap()
}

fn new_store() -> (CacheStore<MemoryGateway, ManualClock>, ManualClock) {
    let clock = ManualClock::new(start());
    (CacheStore::with_clock(MemoryGateway::new(), clock.clone()), clock)
}

// == Strategies ==
/// Generates keys that survive sanitization unchanged
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,64}".prop_map(|s| s)
}

/// Generates arbitrary JSON documents (floats excluded, they do not compare exactly)
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,32}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generates a sequence of store operations
#[derive(Debug, Clone)]
enum CacheOp {
    Save { key: String, owner: Option<u64> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    let key = "[a-d]{1,2}";
    prop_oneof![
        (key, prop::option::of(0u64..3)).prop_map(|(key, owner)| CacheOp::Save { key, owner }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Decoding an encoded value gives back the same value.
    #[test]
    fn prop_codec_roundtrip(value in json_value_strategy()) {
        let text = codec::encode(&value).unwrap();
        let back: Value = codec::decode("k", &text).unwrap();
        prop_assert_eq!(back, value);
    }

    // Sanitizing twice is the same as sanitizing once.
    #[test]
    fn prop_sanitize_idempotent(raw in ".{0,64}") {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(once.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    // A stored value is returned unchanged before its deadline.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in json_value_strategy()) {
        let (store, _) = new_store();

        prop_assert!(store.save(&key, &value, Ttl::Minutes(10), None).unwrap());
        let retrieved: Option<Value> = store.get(&key, None).unwrap();
        prop_assert_eq!(retrieved, Some(value));
    }

    // The second save of a key replaces the first, leaving one row.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in json_value_strategy(),
        value2 in json_value_strategy(),
        owner1 in prop::option::of(any::<u32>()),
        owner2 in prop::option::of(any::<u32>()),
    ) {
        let (store, _) = new_store();

        store.save(&key, &value1, Ttl::Minutes(1), owner1.map(u64::from)).unwrap();
        store.save(&key, &value2, Ttl::Never, owner2.map(u64::from)).unwrap();

        let retrieved: Option<Value> = store.get(&key, None).unwrap();
        prop_assert_eq!(retrieved, Some(value2));
        prop_assert_eq!(store.gateway().len(), 1);

        let row = store.gateway().find_by_key(&key).unwrap().unwrap();
        prop_assert_eq!(row.owner_id, owner2.map(u64::from));
        prop_assert_eq!(row.expires_at, None);
    }

    // Deleting a saved key removes exactly one row, after which reads miss.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy()) {
        let (store, _) = new_store();
        store.save(&key, "value", Ttl::Never, None).unwrap();

        prop_assert_eq!(store.delete(&key), 1);
        prop_assert_eq!(store.get::<String>(&key, None).unwrap(), None);
        prop_assert_eq!(store.delete(&key), 0);
    }

    // Any TTL in minutes stays readable until the clock reaches it, then misses.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), minutes in 1u32..10_000) {
        let (store, clock) = new_store();
        store.save(&key, "v", Ttl::Minutes(minutes), None).unwrap();

        clock.advance(Duration::minutes(i64::from(minutes)) - Duration::seconds(1));
        prop_assert!(store.get::<String>(&key, None).unwrap().is_some());

        clock.advance(Duration::seconds(1));
        prop_assert!(store.get::<String>(&key, None).unwrap().is_none());
        prop_assert!(store.gateway().is_empty());
    }

    // Hit and miss counters match the outcomes callers observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (store, _) = new_store();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Save { key, owner } => {
                    prop_assert!(store.save(&key, &key, Ttl::Never, owner).unwrap());
                }
                CacheOp::Get { key } => match store.get::<String>(&key, None).unwrap() {
                    Some(value) => {
                        prop_assert_eq!(value, key);
                        expected_hits += 1;
                    }
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }
}
