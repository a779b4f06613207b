//! Comparison engine
//!
//! Equality is decided on the canonical form of each document (volatile
//! fields stripped, keys sorted), never on structural identity. The
//! field-targeted [`differences`] pass is advisory: it feeds the change
//! summary and does not cover every field that can make two documents unequal.
//!
//! Normalization failures fail open: the documents are reported as different
//! so an edit is never silently treated as saved.

use serde_json::Value as JsonValue;

use crate::canonical::{canonical_json, strip_volatile};
use crate::document::{ConfigurationDocument, LogoSlot};
use crate::error::CompareError;
use crate::hash::DocumentHash;

/// Result of comparing a live document against a baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Canonical forms are identical
    pub are_equal: bool,
    /// Advisory, human-readable list of targeted changes
    pub differences: Vec<String>,
    /// Short-hash inputs; absent when normalization failed
    pub hashes: Option<ComparisonHashes>,
}

/// Content hashes of both normalized documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonHashes {
    pub current: DocumentHash,
    pub saved: DocumentHash,
}

impl ComparisonHashes {
    /// `current→saved` using short hashes
    #[must_use]
    pub fn short_pair(&self) -> String {
        format!("{}→{}", self.current.short(), self.saved.short())
    }
}

/// Canonical string for a document.
///
/// # Errors
/// Returns error if the document cannot be serialized.
pub fn normalize(doc: &ConfigurationDocument) -> Result<String, CompareError> {
    let value = serde_json::to_value(doc)?;
    Ok(normalize_value(&value))
}

/// Canonical string for raw document JSON
#[must_use]
pub fn normalize_value(value: &JsonValue) -> String {
    canonical_json(&strip_volatile(value))
}

/// Deep copy with the volatile fields cleared
#[must_use]
pub fn normalized(doc: &ConfigurationDocument) -> ConfigurationDocument {
    let mut copy = doc.clone();
    copy.id = None;
    copy.updated_at = None;
    copy
}

/// Compare `current` against `saved`
#[must_use]
pub fn compare(current: &ConfigurationDocument, saved: &ConfigurationDocument) -> Comparison {
    match (normalize(current), normalize(saved)) {
        (Ok(a), Ok(b)) => {
            let are_equal = a == b;
            Comparison {
                are_equal,
                differences: if are_equal {
                    Vec::new()
                } else {
                    differences(current, saved)
                },
                hashes: Some(ComparisonHashes {
                    current: DocumentHash::of_canonical(&a),
                    saved: DocumentHash::of_canonical(&b),
                }),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "normalization failed, treating documents as different");
            Comparison {
                are_equal: false,
                differences: differences(current, saved),
                hashes: None,
            }
        }
    }
}

/// Canonical equality
#[inline]
#[must_use]
pub fn are_equal(a: &ConfigurationDocument, b: &ConfigurationDocument) -> bool {
    compare(a, b).are_equal
}

/// Whether `current` diverges from `saved`.
///
/// Same answer as `!compare(current, saved).are_equal`, with two shortcuts:
/// the same instance is never dirty, and any logo change is always dirty.
#[must_use]
pub fn has_unsaved_changes(current: &ConfigurationDocument, saved: &ConfigurationDocument) -> bool {
    if std::ptr::eq(current, saved) {
        return false;
    }
    if current.logos != saved.logos {
        return true;
    }
    !are_equal(current, saved)
}

/// Targeted field differences, one line per changed field
#[must_use]
pub fn differences(current: &ConfigurationDocument, saved: &ConfigurationDocument) -> Vec<String> {
    let mut out = Vec::new();

    push_change(
        &mut out,
        "branding.appName",
        &saved.branding.app_name,
        &current.branding.app_name,
    );
    push_change(
        &mut out,
        "branding.appDescription",
        &saved.branding.app_description,
        &current.branding.app_description,
    );
    push_change(&mut out, "theme.name", &saved.theme.name, &current.theme.name);

    let primary = |doc: &ConfigurationDocument| {
        doc.theme
            .colors
            .primary
            .get("500")
            .cloned()
            .unwrap_or_default()
    };
    push_change(
        &mut out,
        "theme.colors.primary.500",
        &primary(saved),
        &primary(current),
    );

    for ((name, now), (_, before)) in current.logos.named().into_iter().zip(saved.logos.named()) {
        logo_changes(&mut out, name, before, now);
    }

    out
}

/// Summary line built from [`differences`]
#[must_use]
pub fn changes_summary(current: &ConfigurationDocument, saved: &ConfigurationDocument) -> String {
    let comparison = compare(current, saved);
    if comparison.are_equal {
        return "No changes".to_string();
    }
    match comparison.differences.len() {
        0 => "Unsaved changes".to_string(),
        n => format!("{n} change(s): {}", comparison.differences.join("; ")),
    }
}

fn logo_changes(out: &mut Vec<String>, slot: &str, before: &LogoSlot, now: &LogoSlot) {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    push_change(
        out,
        &format!("logos.{slot}.imageUrl"),
        &opt(&before.image_url),
        &opt(&now.image_url),
    );
    push_change(
        out,
        &format!("logos.{slot}.text"),
        &opt(&before.text),
        &opt(&now.text),
    );
    if before.show_text != now.show_text {
        out.push(format!(
            "logos.{slot}.showText: {} → {}",
            before.show_text, now.show_text
        ));
    }
    if before.show_image != now.show_image {
        out.push(format!(
            "logos.{slot}.showImage: {} → {}",
            before.show_image, now.show_image
        ));
    }
}

fn push_change(out: &mut Vec<String>, field: &str, before: &str, now: &str) {
    if before != now {
        out.push(format!("{field}: \"{before}\" → \"{now}\""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc() -> ConfigurationDocument {
        ConfigurationDocument::emergency_default()
    }

    #[test]
    fn volatile_fields_do_not_affect_equality() {
        let a = doc();
        let mut b = doc();
        b.id = Some("cfg-42".to_string());
        b.updated_at = Some(Utc::now());

        let result = compare(&a, &b);
        assert!(result.are_equal);
        assert!(result.differences.is_empty());
        let hashes = result.hashes.unwrap();
        assert_eq!(hashes.current, hashes.saved);
    }

    #[test]
    fn created_at_is_not_volatile() {
        let a = doc();
        let mut b = doc();
        b.created_at = Some(Utc::now());
        assert!(!are_equal(&a, &b));
    }

    #[test]
    fn app_name_change_is_listed() {
        let saved = doc();
        let mut current = doc();
        current.branding.app_name = "X".to_string();

        let result = compare(&current, &saved);
        assert!(!result.are_equal);
        assert_eq!(
            result.differences,
            vec!["branding.appName: \"Application\" → \"X\"".to_string()]
        );
        let hashes = result.hashes.unwrap();
        assert_ne!(hashes.current, hashes.saved);
        assert!(hashes.short_pair().contains('→'));
    }

    #[test]
    fn untargeted_change_is_unequal_without_difference_lines() {
        let saved = doc();
        let mut current = doc();
        current
            .theme
            .spacing
            .insert("md".to_string(), "1.25rem".to_string());

        let result = compare(&current, &saved);
        assert!(!result.are_equal);
        assert!(result.differences.is_empty());
        assert_eq!(changes_summary(&current, &saved), "Unsaved changes");
    }

    #[test]
    fn logo_changes_listed_per_field() {
        let saved = doc();
        let mut current = doc();
        current.logos.favicon.image_url = Some("/favicon.png".to_string());
        current.logos.favicon.show_image = true;

        let diffs = differences(&current, &saved);
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].starts_with("logos.favicon.imageUrl"));
        assert_eq!(diffs[1], "logos.favicon.showImage: false → true");
    }

    #[test]
    fn summary_counts_changes() {
        let saved = doc();
        let mut current = doc();
        current.branding.app_name = "A".to_string();
        current.theme.name = "Night".to_string();

        let summary = changes_summary(&current, &saved);
        assert!(summary.starts_with("2 change(s): "));
        assert!(summary.contains("theme.name"));
        assert_eq!(changes_summary(&saved, &saved), "No changes");
    }

    #[test]
    fn same_instance_is_clean() {
        let d = doc();
        assert!(!has_unsaved_changes(&d, &d));
    }

    #[test]
    fn raw_key_order_is_irrelevant() {
        let a: JsonValue =
            serde_json::from_str(r#"{"branding":{"appName":"A","tagline":"t"},"isActive":true}"#)
                .unwrap();
        let b: JsonValue =
            serde_json::from_str(r#"{"isActive":true,"branding":{"tagline":"t","appName":"A"}}"#)
                .unwrap();
        assert_eq!(normalize_value(&a), normalize_value(&b));
    }

    #[test]
    fn normalized_round_trips() {
        let mut d = doc();
        d.id = Some("1".to_string());
        assert!(compare(&normalized(&d), &d).are_equal);
    }

    #[test]
    fn normalize_value_ignores_id() {
        let a = json!({"id": 1, "theme": {}});
        let b = json!({"theme": {}});
        assert_eq!(normalize_value(&a), normalize_value(&b));
    }

    fn arb_doc() -> impl Strategy<Value = ConfigurationDocument> {
        (
            "[A-Za-z ]{0,12}",
            "#[0-9a-f]{6}",
            any::<bool>(),
            proptest::option::of("/[a-z]{1,8}\\.png"),
            proptest::option::of("[a-z]{1,6}"),
        )
            .prop_map(|(name, color, show_text, image, id)| {
                let mut d = ConfigurationDocument::emergency_default();
                d.branding.app_name = name;
                d.theme.colors.primary.insert("500".to_string(), color);
                d.logos.main.show_text = show_text;
                d.logos.sidebar.image_url = image;
                d.id = id;
                d
            })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_clone_stable(d in arb_doc()) {
            let copy = d.clone();
            prop_assert_eq!(normalize(&d).unwrap(), normalize(&copy).unwrap());
        }

        #[test]
        fn prop_normalized_equals_original(d in arb_doc()) {
            prop_assert!(compare(&normalized(&d), &d).are_equal);
        }

        #[test]
        fn prop_fast_path_matches_full_compare(a in arb_doc(), b in arb_doc()) {
            prop_assert_eq!(has_unsaved_changes(&a, &b), !compare(&a, &b).are_equal);
        }
    }
}
