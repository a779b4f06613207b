//! themesync: configuration synchronization engine
//!
//! Keeps an editable interface configuration in step with its saved
//! baseline, resolves it from competing sources and applies it to a
//! rendering surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     ConfigSync                       │
//! │  initialize · update · apply_preset · save · ...     │
//! └──────┬───────────────────┬────────────────────┬──────┘
//!        │                   │                    │
//! ┌──────▼───────┐   ┌───────▼──────┐   ┌─────────▼──────┐
//! │ConfigResolver│   │  StateStore  │   │ ApplyScheduler │
//! │ preload      │   │  reduce()    │   │ ConfigApplicator│
//! │ memory/disk  │   │  Phase       │   │ RenderSurface  │
//! │ network      │   └───────┬──────┘   └────────────────┘
//! └──────────────┘           │
//!                    ┌───────▼──────┐
//!                    │ChangeWatcher │  storage events · polling
//!                    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use themesync_apply::InMemorySurface;
//! use themesync_core::{ConfigSync, SyncConfig};
//! use themesync_remote::StaticTokenProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::from_file("themesync.toml")?.with_env_overrides()?;
//! themesync_core::logging::init(config.log_format)?;
//!
//! let auth = Arc::new(StaticTokenProvider::new("token", "user-1"));
//! let sync = ConfigSync::from_config(config, auth, InMemorySurface::new().shared())?;
//! sync.initialize().await;
//! println!("{}", sync.changes_summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod watch;

pub use config::SyncConfig;
pub use error::{ConfigError, ConfigResult};
pub use logging::LogFormat;
pub use sync::{ConfigSync, ConfigSyncBuilder, InitOutcome};
pub use watch::{ChangeWatcher, RefreshSignal};

pub use themesync_remote::{FetchStrategy, SyncError, SyncResult};
pub use themesync_state::{Phase, SyncState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
