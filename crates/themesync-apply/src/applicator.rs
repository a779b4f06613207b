//! Document → surface side effects
//!
//! Variable naming:
//!
//! | Source | Variable |
//! |--------|----------|
//! | `theme.colors.{palette}.{shade}` | `--color-{palette}-{shade}` |
//! | `theme.colors.{primary,secondary,accent}.500` | `--color-{palette}` |
//! | `theme.typography.fontFamily.{k}` | `--font-family-{k}` |
//! | `theme.typography.fontSize.{k}` | `--font-size-{k}` |
//! | `theme.typography.fontWeight.{k}` | `--font-weight-{k}` |
//! | `theme.typography.lineHeight.{k}` | `--line-height-{k}` |
//! | `theme.spacing.{k}` | `--spacing-{k}` |
//! | `theme.borderRadius.{k}` | `--radius-{k}` |
//! | `theme.shadows.{k}` | `--shadow-{k}` |
//! | `theme.mode` | `--theme-mode` |

use std::collections::BTreeSet;
use std::fmt;

use themesync_document::{ConfigurationDocument, Scale, ThemeMode};

use crate::surface::{RenderSurface, SurfaceError};

/// Palettes that also get an unsuffixed alias to their 500 shade
const ALIASED_PALETTES: [&str; 3] = ["primary", "secondary", "accent"];
const ALIAS_SHADE: &str = "500";

/// One independently guarded application step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyStep {
    ClearPrevious,
    Colors,
    Typography,
    Layout,
    Metadata,
    Favicon,
}

impl fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClearPrevious => "clear-previous",
            Self::Colors => "colors",
            Self::Typography => "typography",
            Self::Layout => "layout",
            Self::Metadata => "metadata",
            Self::Favicon => "favicon",
        };
        f.write_str(name)
    }
}

/// Outcome of one [`ConfigApplicator::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Variables currently set by the applicator
    pub variables: usize,
    /// Steps that failed (later steps still ran)
    pub failed: Vec<ApplyStep>,
}

impl ApplyReport {
    /// No step failed
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies documents to a surface, remembering which variables it set
#[derive(Debug, Default)]
pub struct ConfigApplicator {
    applied: BTreeSet<String>,
}

impl ConfigApplicator {
    /// Applicator with nothing applied yet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables set by the last application
    #[must_use]
    pub fn applied_variables(&self) -> &BTreeSet<String> {
        &self.applied
    }

    /// Apply `doc`. Idempotent: applying the same document twice leaves the
    /// surface in the same state as applying it once.
    pub fn apply(
        &mut self,
        doc: &ConfigurationDocument,
        surface: &mut dyn RenderSurface,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        self.guard(&mut report, ApplyStep::ClearPrevious, |this| {
            this.clear_previous(surface)
        });
        self.guard(&mut report, ApplyStep::Colors, |this| {
            this.apply_colors(doc, surface)
        });
        self.guard(&mut report, ApplyStep::Typography, |this| {
            let typography = &doc.theme.typography;
            this.apply_scale(surface, "font-family", &typography.font_family)?;
            this.apply_scale(surface, "font-size", &typography.font_size)?;
            this.apply_scale(surface, "font-weight", &typography.font_weight)?;
            this.apply_scale(surface, "line-height", &typography.line_height)
        });
        self.guard(&mut report, ApplyStep::Layout, |this| {
            this.apply_scale(surface, "spacing", &doc.theme.spacing)?;
            this.apply_scale(surface, "radius", &doc.theme.border_radius)?;
            this.apply_scale(surface, "shadow", &doc.theme.shadows)
        });
        self.guard(&mut report, ApplyStep::Metadata, |_| {
            apply_metadata(doc, surface)
        });
        self.guard(&mut report, ApplyStep::Favicon, |_| apply_favicon(doc, surface));

        report.variables = self.applied.len();
        tracing::debug!(
            variables = report.variables,
            failed = report.failed.len(),
            theme = %doc.theme.name,
            "configuration applied"
        );
        report
    }

    fn guard(
        &mut self,
        report: &mut ApplyReport,
        step: ApplyStep,
        run: impl FnOnce(&mut Self) -> Result<(), SurfaceError>,
    ) {
        if let Err(e) = run(self) {
            tracing::warn!(%step, error = %e, "configuration step failed");
            report.failed.push(step);
        }
    }

    /// Names that could not be removed stay tracked for the next apply
    fn clear_previous(&mut self, surface: &mut dyn RenderSurface) -> Result<(), SurfaceError> {
        let mut first_error = None;
        for name in std::mem::take(&mut self.applied) {
            if let Err(e) = surface.remove_variable(&name) {
                first_error.get_or_insert(e);
                self.applied.insert(name);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn apply_colors(
        &mut self,
        doc: &ConfigurationDocument,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), SurfaceError> {
        let mode = match doc.theme.mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        self.set(surface, "--theme-mode", mode)?;
        for (palette, scale) in doc.theme.colors.named() {
            self.apply_scale(surface, &format!("color-{palette}"), scale)?;
            if ALIASED_PALETTES.contains(&palette) {
                if let Some(value) = scale.get(ALIAS_SHADE) {
                    self.set(surface, &format!("--color-{palette}"), value)?;
                }
            }
        }
        Ok(())
    }

    fn apply_scale(
        &mut self,
        surface: &mut dyn RenderSurface,
        prefix: &str,
        scale: &Scale,
    ) -> Result<(), SurfaceError> {
        for (key, value) in scale {
            self.set(surface, &format!("--{prefix}-{key}"), value)?;
        }
        Ok(())
    }

    fn set(
        &mut self,
        surface: &mut dyn RenderSurface,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError> {
        surface.set_variable(name, value)?;
        self.applied.insert(name.to_string());
        Ok(())
    }
}

fn apply_metadata(
    doc: &ConfigurationDocument,
    surface: &mut dyn RenderSurface,
) -> Result<(), SurfaceError> {
    let branding = &doc.branding;
    surface.set_title(&branding.app_name)?;
    surface.set_meta_description(&branding.app_description)
}

fn apply_favicon(
    doc: &ConfigurationDocument,
    surface: &mut dyn RenderSurface,
) -> Result<(), SurfaceError> {
    match doc.logos.favicon.image_url.as_deref() {
        Some(href) if !href.is_empty() => surface.set_favicon(href),
        _ => Ok(()),
    }
}

/// Force the surface to recompute styles
///
/// # Errors
/// Returns error if the surface refuses the reflow
pub fn force_refresh(surface: &mut dyn RenderSurface) -> Result<(), SurfaceError> {
    surface.reflow()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{InMemorySurface, SurfaceOp};
    use pretty_assertions::assert_eq;

    fn doc() -> ConfigurationDocument {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.branding.app_name = "Acme Admin".to_string();
        doc.branding.app_description = "Back office".to_string();
        doc.logos.favicon.image_url = Some("/favicon.png".to_string());
        doc
    }

    #[test]
    fn applies_every_section() {
        let doc = doc();
        let mut surface = InMemorySurface::new();
        let report = ConfigApplicator::new().apply(&doc, &mut surface);

        assert!(report.is_complete());
        let primary_500 = doc.theme.colors.primary.get("500").unwrap();
        assert_eq!(surface.variable("--color-primary-500"), Some(primary_500.as_str()));
        assert_eq!(surface.variable("--color-primary"), Some(primary_500.as_str()));
        assert!(surface.variable("--color-neutral").is_none());
        assert_eq!(surface.variable("--theme-mode"), Some("light"));
        assert_eq!(surface.title.as_deref(), Some("Acme Admin"));
        assert_eq!(surface.meta_description.as_deref(), Some("Back office"));
        assert_eq!(surface.favicon.as_deref(), Some("/favicon.png"));
        assert_eq!(report.variables, surface.variables.len());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let doc = doc();
        let mut applicator = ConfigApplicator::new();
        let mut once = InMemorySurface::new();
        applicator.apply(&doc, &mut once);

        let mut twice = once.clone();
        applicator.apply(&doc, &mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn variables_from_previous_document_are_removed() {
        let mut first = doc();
        first.theme.spacing.insert("huge".to_string(), "8rem".to_string());
        let second = doc();

        let mut applicator = ConfigApplicator::new();
        let mut surface = InMemorySurface::new();
        applicator.apply(&first, &mut surface);
        assert!(surface.variable("--spacing-huge").is_some());

        applicator.apply(&second, &mut surface);
        assert!(surface.variable("--spacing-huge").is_none());
    }

    #[test]
    fn failed_step_does_not_stop_later_steps() {
        let mut surface = InMemorySurface::new().fail_on(SurfaceOp::Title);
        let report = ConfigApplicator::new().apply(&doc(), &mut surface);

        assert_eq!(report.failed, vec![ApplyStep::Metadata]);
        assert!(surface.title.is_none());
        assert_eq!(surface.favicon.as_deref(), Some("/favicon.png"));
        assert!(surface.variable("--color-primary").is_some());
    }

    #[test]
    fn variables_that_failed_to_clear_are_retried() {
        let mut first = doc();
        first.theme.spacing.insert("huge".to_string(), "8rem".to_string());
        let second = doc();

        let mut applicator = ConfigApplicator::new();
        let mut surface = InMemorySurface::new();
        applicator.apply(&first, &mut surface);

        let mut surface = surface.fail_on(SurfaceOp::Variable);
        let report = applicator.apply(&second, &mut surface);
        assert!(report.failed.contains(&ApplyStep::ClearPrevious));
        assert!(applicator.applied_variables().contains("--spacing-huge"));

        surface.clear_failures();
        assert!(applicator.apply(&second, &mut surface).is_complete());
        assert!(surface.variable("--spacing-huge").is_none());
    }

    #[test]
    fn empty_branding_replaces_previous_metadata() {
        let mut blank = doc();
        blank.branding.app_name.clear();
        blank.branding.app_description.clear();

        let mut applicator = ConfigApplicator::new();
        let mut surface = InMemorySurface::new();
        applicator.apply(&doc(), &mut surface);
        applicator.apply(&blank, &mut surface);

        assert_eq!(surface.title.as_deref(), Some(""));
        assert_eq!(surface.meta_description.as_deref(), Some(""));
    }

    #[test]
    fn no_favicon_without_image() {
        let mut doc = doc();
        doc.logos.favicon.image_url = None;
        let mut surface = InMemorySurface::new();
        ConfigApplicator::new().apply(&doc, &mut surface);
        assert_eq!(surface.favicon_links_created, 0);
    }

    #[test]
    fn force_refresh_reflows() {
        let mut surface = InMemorySurface::new();
        force_refresh(&mut surface).unwrap();
        assert_eq!(surface.reflows, 1);
    }
}
