//! Configuration document model
//!
//! The wire format is camelCase JSON. Scales are string-keyed maps so that a
//! document coming from the store can carry any key set; [`SHADE_KEYS`] is the
//! set every colour palette is expected to provide.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Shade keys every colour palette must define
pub const SHADE_KEYS: [&str; 10] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900",
];

/// Palette names, in application order
pub const PALETTE_NAMES: [&str; 4] = ["primary", "secondary", "accent", "neutral"];

/// Logo slot names, in application order
pub const LOGO_SLOTS: [&str; 3] = ["main", "sidebar", "favicon"];

/// A named scale (shade → colour, step → length, ...)
pub type Scale = BTreeMap<String, String>;

/// Light or dark rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light mode
    #[default]
    Light,
    /// Dark mode
    Dark,
}

/// The four colour palettes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalettes {
    pub primary: Scale,
    pub secondary: Scale,
    pub accent: Scale,
    pub neutral: Scale,
}

impl ColorPalettes {
    /// Palettes paired with their names, in [`PALETTE_NAMES`] order
    #[must_use]
    pub fn named(&self) -> [(&'static str, &Scale); 4] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("neutral", &self.neutral),
        ]
    }
}

/// Typography scales
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub font_family: Scale,
    pub font_size: Scale,
    pub font_weight: Scale,
    pub line_height: Scale,
}

/// Theme sub-document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub name: String,
    pub mode: ThemeMode,
    pub colors: ColorPalettes,
    pub typography: Typography,
    pub spacing: Scale,
    pub border_radius: Scale,
    pub shadows: Scale,
}

/// One logo slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoSlot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub show_text: bool,
    pub show_image: bool,
}

impl LogoSlot {
    /// Text-only slot
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            image_url: None,
            text: Some(text.into()),
            show_text: true,
            show_image: false,
        }
    }

    /// `showImage` is set but there is nothing to show
    #[inline]
    #[must_use]
    pub fn shows_missing_image(&self) -> bool {
        self.show_image && self.image_url.as_deref().map_or(true, str::is_empty)
    }
}

/// Logo sub-document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSet {
    pub main: LogoSlot,
    pub sidebar: LogoSlot,
    pub favicon: LogoSlot,
}

impl LogoSet {
    /// Slots paired with their names, in [`LOGO_SLOTS`] order
    #[must_use]
    pub fn named(&self) -> [(&'static str, &LogoSlot); 3] {
        [
            ("main", &self.main),
            ("sidebar", &self.sidebar),
            ("favicon", &self.favicon),
        ]
    }
}

/// Branding sub-document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branding {
    pub app_name: String,
    pub app_description: String,
    pub tagline: String,
    pub company_name: String,
    pub login_title: String,
    pub login_subtitle: String,
}

/// The interface configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub logos: LogoSet,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl ConfigurationDocument {
    /// Last-resort document with no business-specific values.
    ///
    /// Used only when every other source has failed so that the rendering
    /// layer always has a complete configuration.
    #[must_use]
    pub fn emergency_default() -> Self {
        Self {
            id: None,
            theme: ThemeConfig {
                name: "Default".to_string(),
                mode: ThemeMode::Light,
                colors: ColorPalettes {
                    primary: scale(&[
                        "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6",
                        "#2563eb", "#1d4ed8", "#1e40af", "#1e3a8a",
                    ]),
                    secondary: scale(&[
                        "#f8fafc", "#f1f5f9", "#e2e8f0", "#cbd5e1", "#94a3b8", "#64748b",
                        "#475569", "#334155", "#1e293b", "#0f172a",
                    ]),
                    accent: scale(&[
                        "#f0fdfa", "#ccfbf1", "#99f6e4", "#5eead4", "#2dd4bf", "#14b8a6",
                        "#0d9488", "#0f766e", "#115e59", "#134e4a",
                    ]),
                    neutral: scale(&[
                        "#fafafa", "#f5f5f5", "#e5e5e5", "#d4d4d4", "#a3a3a3", "#737373",
                        "#525252", "#404040", "#262626", "#171717",
                    ]),
                },
                typography: Typography {
                    font_family: pairs(&[
                        ("sans", "system-ui, sans-serif"),
                        ("mono", "ui-monospace, monospace"),
                    ]),
                    font_size: pairs(&[
                        ("xs", "0.75rem"),
                        ("sm", "0.875rem"),
                        ("base", "1rem"),
                        ("lg", "1.125rem"),
                        ("xl", "1.25rem"),
                    ]),
                    font_weight: pairs(&[("normal", "400"), ("medium", "500"), ("bold", "700")]),
                    line_height: pairs(&[("tight", "1.25"), ("normal", "1.5")]),
                },
                spacing: pairs(&[
                    ("xs", "0.25rem"),
                    ("sm", "0.5rem"),
                    ("md", "1rem"),
                    ("lg", "1.5rem"),
                    ("xl", "2rem"),
                ]),
                border_radius: pairs(&[("sm", "0.125rem"), ("md", "0.375rem"), ("lg", "0.5rem")]),
                shadows: pairs(&[
                    ("sm", "0 1px 2px 0 rgb(0 0 0 / 0.05)"),
                    ("md", "0 4px 6px -1px rgb(0 0 0 / 0.1)"),
                ]),
            },
            logos: LogoSet {
                main: LogoSlot::text("Application"),
                sidebar: LogoSlot::text("App"),
                favicon: LogoSlot::default(),
            },
            branding: Branding {
                app_name: "Application".to_string(),
                app_description: "Administration console".to_string(),
                tagline: String::new(),
                company_name: String::new(),
                login_title: "Sign in".to_string(),
                login_subtitle: String::new(),
            },
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Check that every palette carries the full shade set.
    ///
    /// # Errors
    /// Returns the first missing shade found.
    pub fn validate(&self) -> Result<(), DocumentError> {
        for (palette, shades) in self.theme.colors.named() {
            if let Some(missing) = SHADE_KEYS.iter().find(|k| !shades.contains_key(**k)) {
                return Err(DocumentError::MissingShade {
                    palette: palette.to_string(),
                    shade: (*missing).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Logo slots that ask for an image without providing one
    #[must_use]
    pub fn logo_issues(&self) -> Vec<String> {
        self.logos
            .named()
            .into_iter()
            .filter(|(_, slot)| slot.shows_missing_image())
            .map(|(name, _)| format!("logos.{name}: showImage is set without an imageUrl"))
            .collect()
    }

    /// Shallow-merge a patch: each present section replaces the whole section.
    #[must_use]
    pub fn merged(&self, patch: ConfigPatch) -> Self {
        let ConfigPatch {
            theme,
            logos,
            branding,
            is_active,
        } = patch;

        let mut next = self.clone();
        if let Some(theme) = theme {
            next.theme = theme;
        }
        if let Some(logos) = logos {
            next.logos = logos;
        }
        if let Some(branding) = branding {
            next.branding = branding;
        }
        if let Some(is_active) = is_active {
            next.is_active = is_active;
        }
        next
    }
}

impl Default for ConfigurationDocument {
    fn default() -> Self {
        Self::emergency_default()
    }
}

/// Partial document for `UPDATE_CONFIG`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logos: Option<LogoSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ConfigPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch carrying every editable section of `doc`
    #[must_use]
    pub fn from_document(doc: &ConfigurationDocument) -> Self {
        // Destructured so that a new document field is a compile error here.
        let ConfigurationDocument {
            id: _,
            theme,
            logos,
            branding,
            is_active,
            created_at: _,
            updated_at: _,
        } = doc;
        Self {
            theme: Some(theme.clone()),
            logos: Some(logos.clone()),
            branding: Some(branding.clone()),
            is_active: Some(*is_active),
        }
    }

    /// With theme
    #[inline]
    #[must_use]
    pub fn with_theme(mut self, theme: ThemeConfig) -> Self {
        self.theme = Some(theme);
        self
    }

    /// With logos
    #[inline]
    #[must_use]
    pub fn with_logos(mut self, logos: LogoSet) -> Self {
        self.logos = Some(logos);
        self
    }

    /// With branding
    #[inline]
    #[must_use]
    pub fn with_branding(mut self, branding: Branding) -> Self {
        self.branding = Some(branding);
        self
    }

    /// With activation flag
    #[inline]
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// True if the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.logos.is_none()
            && self.branding.is_none()
            && self.is_active.is_none()
    }
}

fn scale(values: &[&str; 10]) -> Scale {
    SHADE_KEYS
        .iter()
        .zip(values.iter())
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn pairs(entries: &[(&str, &str)]) -> Scale {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_default_is_complete() {
        let doc = ConfigurationDocument::emergency_default();
        assert!(doc.validate().is_ok());
        assert!(doc.logo_issues().is_empty());
        assert!(doc.id.is_none());
    }

    #[test]
    fn validate_reports_missing_shade() {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.theme.colors.accent.remove("700");
        let err = doc.validate().unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MissingShade { ref palette, ref shade } if palette == "accent" && shade == "700"
        ));
    }

    #[test]
    fn logo_issue_for_image_without_url() {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.logos.sidebar.show_image = true;
        let issues = doc.logo_issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("logos.sidebar"));
    }

    #[test]
    fn camel_case_wire_format() {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.id = Some("cfg-1".to_string());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["branding"]["appName"], "Application");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["theme"]["mode"], "light");
        assert_eq!(json["theme"]["colors"]["primary"]["500"], "#3b82f6");
        assert!(json["logos"]["main"].get("showText").is_some());
    }

    #[test]
    fn sparse_json_fills_defaults() {
        let doc: ConfigurationDocument =
            serde_json::from_str(r#"{"branding": {"appName": "Acme"}}"#).unwrap();
        assert_eq!(doc.branding.app_name, "Acme");
        assert!(doc.is_active);
        assert!(doc.theme.colors.primary.is_empty());
    }

    #[test]
    fn merge_replaces_whole_sections() {
        let doc = ConfigurationDocument::emergency_default();
        let branding = Branding {
            app_name: "X".to_string(),
            ..Branding::default()
        };
        let merged = doc.merged(ConfigPatch::new().with_branding(branding));

        assert_eq!(merged.branding.app_name, "X");
        assert_eq!(merged.branding.login_title, "");
        assert_eq!(merged.theme, doc.theme);
    }

    #[test]
    fn full_patch_reproduces_document() {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.is_active = false;
        let patch = ConfigPatch::from_document(&doc);
        let rebuilt = ConfigurationDocument::emergency_default().merged(patch);
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn empty_patch_is_noop() {
        let doc = ConfigurationDocument::emergency_default();
        assert!(ConfigPatch::new().is_empty());
        assert_eq!(doc.merged(ConfigPatch::new()), doc);
    }
}
