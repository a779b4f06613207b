//! themesync Remote Resolver
//!
//! Talks to the configuration service and decides, per request, whether the
//! answer comes from the preloaded snapshot, the caches or the network.
//!
//! # Architecture
//!
//! ```text
//!                ┌────────────────┐
//!  TokenProvider │ ConfigResolver │ CacheTier
//!       ────────►│ (strategy chain│◄────────
//!                └───────┬────────┘
//!                        │ bearer token
//!                ┌───────▼──────────┐
//!                │ RemoteConfigStore│  HttpConfigStore / InMemoryConfigStore
//!                └──────────────────┘
//! ```

#![warn(unreachable_pub)]

pub mod auth;
pub mod error;
pub mod http;
pub mod memory;
pub mod resolver;
pub mod store;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use error::{SyncError, SyncResult};
pub use http::{HttpConfigStore, DEFAULT_TIMEOUT};
pub use memory::InMemoryConfigStore;
pub use resolver::{ConfigResolver, FetchStrategy, ResolutionSource, ResolvedConfig};
pub use store::{RemoteConfig, RemoteConfigStore, StoreError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
