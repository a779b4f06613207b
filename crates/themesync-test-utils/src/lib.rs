//! Testing utilities for the themesync workspace
//!
//! Shared documents, presets and pre-wired collaborators.

#![allow(missing_docs)]

use std::sync::Arc;

use themesync_document::{ConfigurationDocument, LogoSlot, PresetDocument};
use themesync_remote::{InMemoryConfigStore, StaticTokenProvider};

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_USER: &str = "user-1";

/// Emergency default with a distinct application name
pub fn document_named(app_name: &str) -> ConfigurationDocument {
    let mut doc = ConfigurationDocument::emergency_default();
    doc.branding.app_name = app_name.to_string();
    doc
}

/// A fully branded document as a store would return it
pub fn sample_document() -> ConfigurationDocument {
    let mut doc = document_named("Acme Admin");
    doc.id = Some("config-acme".to_string());
    doc.theme.name = "acme".to_string();
    doc.branding.app_description = "Acme back office".to_string();
    doc.branding.company_name = "Acme Corp".to_string();
    doc.theme
        .colors
        .primary
        .insert("500".to_string(), "#e11d48".to_string());
    doc.logos.main = LogoSlot {
        image_url: Some("https://cdn.example.com/acme.svg".to_string()),
        text: Some("Acme".to_string()),
        show_text: true,
        show_image: true,
    };
    doc.logos.favicon = LogoSlot {
        image_url: Some("https://cdn.example.com/acme.ico".to_string()),
        text: None,
        show_text: false,
        show_image: true,
    };
    doc
}

fn preset(id: &str, name: &str, is_system: bool) -> PresetDocument {
    let mut config = document_named(name);
    config.theme.name = name.to_lowercase();
    PresetDocument {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} preset"),
        config,
        is_system,
        is_default: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn system_preset(id: &str, name: &str) -> PresetDocument {
    preset(id, name, true)
}

pub fn user_preset(id: &str, name: &str) -> PresetDocument {
    preset(id, name, false)
}

/// One system preset (`sys-default`) and one user preset (`user-ocean`)
pub fn sample_presets() -> Vec<PresetDocument> {
    let mut default = system_preset("sys-default", "Default");
    default.is_default = true;
    vec![default, user_preset("user-ocean", "Ocean")]
}

/// Store seeded with `doc` and [`sample_presets`]
pub fn seeded_store(doc: ConfigurationDocument) -> Arc<InMemoryConfigStore> {
    Arc::new(
        InMemoryConfigStore::new()
            .with_config(doc)
            .with_presets(sample_presets()),
    )
}

/// Signed in as [`TEST_USER`]
pub fn signed_in() -> Arc<StaticTokenProvider> {
    Arc::new(StaticTokenProvider::new(TEST_TOKEN, TEST_USER))
}
