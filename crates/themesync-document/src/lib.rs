//! themesync document model
//!
//! The interface configuration document and everything needed to reason
//! about two versions of it.
//!
//! # Core Concepts
//!
//! - [`ConfigurationDocument`]: theme, logos, branding and activation flag
//! - [`ConfigPatch`]: typed partial document (shallow merge)
//! - [`PresetDocument`]: named reference configuration
//! - [`compare`]: canonical equality, targeted differences, short hashes
//!
//! # Example
//!
//! ```rust
//! use themesync_document::{compare, ConfigurationDocument};
//!
//! let saved = ConfigurationDocument::emergency_default();
//! let mut live = saved.clone();
//! live.branding.app_name = "Acme Admin".to_string();
//!
//! let result = compare::compare(&live, &saved);
//! assert!(!result.are_equal);
//! assert_eq!(result.differences.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod canonical;
pub mod compare;
mod context;
mod document;
mod error;
mod hash;
mod preset;

pub use compare::{Comparison, ComparisonHashes};
pub use context::{ConfigContext, ConfigSource};
pub use document::{
    Branding, ColorPalettes, ConfigPatch, ConfigurationDocument, LogoSet, LogoSlot, Scale,
    ThemeConfig, ThemeMode, Typography, LOGO_SLOTS, PALETTE_NAMES, SHADE_KEYS,
};
pub use error::{CompareError, DocumentError, ErrorInfo, FailureReason};
pub use hash::{DocumentHash, HashParseError};
pub use preset::{NewPreset, PresetDocument, PresetUpdate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
