//! themesync Side-Effect Applicator
//!
//! Turns a configuration document into observable effects on a
//! [`RenderSurface`]: style variables, document title, meta description and
//! favicon.
//!
//! ```text
//! ConfigSync ──schedule(doc)──► ApplyScheduler ──(debounce)──► ConfigApplicator ──► RenderSurface
//!            ──apply_now(doc)─┘
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod applicator;
pub mod scheduler;
pub mod surface;

pub use applicator::{force_refresh, ApplyReport, ApplyStep, ConfigApplicator};
pub use scheduler::{ApplyScheduler, DEFAULT_DEBOUNCE};
pub use surface::{InMemorySurface, RenderSurface, SharedSurface, SurfaceError, SurfaceOp};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
