//! Rendering surface abstraction

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

/// Surface operation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Surface not attached (no document, detached window, ...)
    #[error("surface unavailable: {0}")]
    Unavailable(String),

    /// Surface refused a value
    #[error("surface rejected {target}: {reason}")]
    Rejected { target: String, reason: String },
}

/// Where configuration side effects land
pub trait RenderSurface: Send + Debug {
    /// Set a style variable on the root element
    ///
    /// # Errors
    /// Returns error if the surface cannot take the value
    fn set_variable(&mut self, name: &str, value: &str) -> Result<(), SurfaceError>;

    /// Remove a style variable
    ///
    /// # Errors
    /// Returns error if the surface cannot be written
    fn remove_variable(&mut self, name: &str) -> Result<(), SurfaceError>;

    /// Set the document title
    ///
    /// # Errors
    /// Returns error if the surface cannot be written
    fn set_title(&mut self, title: &str) -> Result<(), SurfaceError>;

    /// Set the meta description
    ///
    /// # Errors
    /// Returns error if the surface cannot be written
    fn set_meta_description(&mut self, description: &str) -> Result<(), SurfaceError>;

    /// Point the favicon link at `href`, creating the link if missing
    ///
    /// # Errors
    /// Returns error if the surface cannot be written
    fn set_favicon(&mut self, href: &str) -> Result<(), SurfaceError>;

    /// Force a style recomputation
    ///
    /// # Errors
    /// Returns error if the surface cannot be written
    fn reflow(&mut self) -> Result<(), SurfaceError>;
}

/// Surface shared between the caller and the scheduler task
pub type SharedSurface = Arc<Mutex<dyn RenderSurface>>;

/// Operation selector for [`InMemorySurface::fail_on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceOp {
    Variable,
    Title,
    MetaDescription,
    Favicon,
    Reflow,
}

/// Recording surface
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemorySurface {
    pub variables: BTreeMap<String, String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    /// `None` until the favicon link is first created
    pub favicon: Option<String>,
    pub favicon_links_created: usize,
    pub reflows: usize,
    failing: BTreeSet<SurfaceOp>,
}

impl InMemorySurface {
    /// Empty surface
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap for sharing with a scheduler
    #[must_use]
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// Make every call of `op` fail
    #[must_use]
    pub fn fail_on(mut self, op: SurfaceOp) -> Self {
        self.failing.insert(op);
        self
    }

    /// Stop failing every operation
    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Value of a style variable
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    fn check(&self, op: SurfaceOp, target: &str) -> Result<(), SurfaceError> {
        if self.failing.contains(&op) {
            return Err(SurfaceError::Rejected {
                target: target.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl RenderSurface for InMemorySurface {
    fn set_variable(&mut self, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::Variable, name)?;
        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_variable(&mut self, name: &str) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::Variable, name)?;
        self.variables.remove(name);
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::Title, "title")?;
        self.title = Some(title.to_string());
        Ok(())
    }

    fn set_meta_description(&mut self, description: &str) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::MetaDescription, "meta description")?;
        self.meta_description = Some(description.to_string());
        Ok(())
    }

    fn set_favicon(&mut self, href: &str) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::Favicon, "favicon")?;
        if self.favicon.is_none() {
            self.favicon_links_created += 1;
        }
        self.favicon = Some(href.to_string());
        Ok(())
    }

    fn reflow(&mut self) -> Result<(), SurfaceError> {
        self.check(SurfaceOp::Reflow, "reflow")?;
        self.reflows += 1;
        Ok(())
    }
}
