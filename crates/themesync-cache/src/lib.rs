//! themesync Cache Tier
//!
//! Keeps recently resolved configuration close so that the resolver can
//! avoid redundant network fetches and survive short backend outages.
//!
//! # Architecture
//!
//! ```text
//! PreloadSlot (host snapshot, wins the first load)
//!      ↓ miss
//! MemoryCache<T> (moka, per-entry TTL, lazy expiry)
//!      ↓ miss
//! PersistentConfigCache (KeyValueStore: document + timestamp + identity)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod persistent;
pub mod preload;
pub mod store;
pub mod tier;

pub use error::{StorageError, StorageResult};
pub use memory::{CacheEntry, MemoryCache};
pub use persistent::{PersistentConfigCache, CONFIG_KEY, IDENTITY_KEY, TIMESTAMP_KEY};
pub use preload::{PreloadSlot, PRELOAD_ENV_VAR};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use tier::{CacheLevel, CacheTier, CONFIG_TTL, REFERENCE_DATA_TTL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
