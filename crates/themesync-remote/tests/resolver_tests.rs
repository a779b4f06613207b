//! Resolver precedence and failure handling

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use themesync_cache::{
    CacheTier, KeyValueStore, MemoryKeyValueStore, PersistentConfigCache, PreloadSlot,
};
use themesync_document::{
    ConfigContext, ConfigSource, ConfigurationDocument, FailureReason, NewPreset, PresetDocument,
    PresetUpdate,
};
use themesync_remote::{
    ConfigResolver, FetchStrategy, InMemoryConfigStore, ResolutionSource, StaticTokenProvider,
    SyncError,
};

fn named(name: &str) -> ConfigurationDocument {
    let mut doc = ConfigurationDocument::emergency_default();
    doc.branding.app_name = name.to_string();
    doc
}

struct Fixture {
    store: Arc<InMemoryConfigStore>,
    auth: Arc<StaticTokenProvider>,
    cache: Arc<CacheTier>,
    resolver: ConfigResolver,
}

fn fixture(store: InMemoryConfigStore, cache: CacheTier) -> Fixture {
    let store = Arc::new(store);
    let auth = Arc::new(StaticTokenProvider::new("token", "alice"));
    let cache = Arc::new(cache);
    let resolver = ConfigResolver::new(store.clone(), auth.clone(), cache.clone());
    Fixture {
        store,
        auth,
        cache,
        resolver,
    }
}

#[tokio::test]
async fn network_result_is_written_through() {
    let f = fixture(
        InMemoryConfigStore::new().with_config(named("remote")),
        CacheTier::default(),
    );

    let resolved = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    assert_eq!(resolved.origin, ResolutionSource::Network);
    assert_eq!(resolved.document.branding.app_name, "remote");
    assert_eq!(
        f.cache.memory_config().await.map(|d| d.branding.app_name),
        Some("remote".to_string())
    );
}

#[tokio::test]
async fn preload_wins_over_everything() {
    for strategy in [FetchStrategy::BackendFirst, FetchStrategy::CacheFirst] {
        let cache = CacheTier::default().with_preload(PreloadSlot::with_document(named("boot")));
        let f = fixture(InMemoryConfigStore::new().with_config(named("remote")), cache);
        f.cache.store_config(&named("memory")).await;

        let resolved = f.resolver.get_current_config(strategy).await.unwrap();
        assert_eq!(resolved.origin, ResolutionSource::Preloaded);
        assert_eq!(resolved.document.branding.app_name, "boot");
        assert_eq!(f.store.request_count(), 0);
    }
}

#[tokio::test]
async fn preload_is_used_for_one_load_only() {
    let cache = CacheTier::default().with_preload(PreloadSlot::with_document(named("boot")));
    let f = fixture(InMemoryConfigStore::new().with_config(named("remote")), cache);

    let first = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    assert_eq!(first.origin, ResolutionSource::Preloaded);
    assert_eq!(
        f.cache.memory_config().await.map(|d| d.branding.app_name),
        Some("boot".to_string())
    );

    let second = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    assert_eq!(second.origin, ResolutionSource::Network);
    assert_eq!(second.document.branding.app_name, "remote");

    f.store.set_reachable(false);
    let offline = f.resolver.cached_fallback().await.unwrap();
    assert_eq!(offline.origin, ResolutionSource::Memory);
    assert_eq!(offline.document.branding.app_name, "remote");
}

#[tokio::test]
async fn cache_first_skips_network_on_hit() {
    let f = fixture(
        InMemoryConfigStore::new().with_config(named("remote")),
        CacheTier::default(),
    );
    f.cache.store_config(&named("cached")).await;

    let resolved = f
        .resolver
        .get_current_config(FetchStrategy::CacheFirst)
        .await
        .unwrap();
    assert_eq!(resolved.origin, ResolutionSource::Memory);
    assert_eq!(resolved.context.source, ConfigSource::Local);
    assert_eq!(f.store.request_count(), 0);
}

#[tokio::test]
async fn offline_with_persistent_cache_falls_back() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    kv.set(themesync_cache::IDENTITY_KEY, "alice").unwrap();
    PersistentConfigCache::new(kv.clone())
        .store_document(&named("from disk"))
        .unwrap();

    let f = fixture(
        InMemoryConfigStore::new(),
        CacheTier::default().with_persistent(kv),
    );
    f.store.set_reachable(false);

    let resolved = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    assert_eq!(resolved.origin, ResolutionSource::Persistent);
    assert_eq!(resolved.document.branding.app_name, "from disk");
}

#[tokio::test]
async fn offline_without_cache_raises_network_error() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());
    f.store.set_reachable(false);

    let err = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap_err();
    assert_eq!(err.reason(), FailureReason::Network);
}

#[tokio::test(start_paused = true)]
async fn expired_memory_entry_is_not_used() {
    let f = fixture(
        InMemoryConfigStore::new(),
        CacheTier::new(Duration::from_secs(300)),
    );
    f.cache.store_config(&named("stale soon")).await;
    tokio::time::advance(Duration::from_secs(301)).await;
    f.store.set_reachable(false);

    let err = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn missing_token_is_auth_error_without_cache_fallback() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());
    f.cache.store_config(&named("cached")).await;
    f.auth.revoke();

    let err = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap_err();
    assert_eq!(err.reason(), FailureReason::Auth);
}

#[tokio::test]
async fn backend_only_never_substitutes_cache() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());
    f.cache.store_config(&named("cached")).await;
    f.store.set_reachable(false);

    assert!(f
        .resolver
        .get_current_config(FetchStrategy::BackendOnly)
        .await
        .is_err());
}

#[tokio::test]
async fn empty_store_without_cache_is_validation_error() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());
    let err = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap_err();
    assert_eq!(err.reason(), FailureReason::Validation);

    let fallback = f.resolver.resolve_or_default(FetchStrategy::BackendFirst).await;
    assert_eq!(fallback.origin, ResolutionSource::EmergencyDefault);
    assert_eq!(fallback.document, ConfigurationDocument::emergency_default());
}

#[tokio::test]
async fn network_context_is_reported() {
    let store = InMemoryConfigStore::new().with_config(named("org"));
    store.set_context(ConfigContext {
        source: ConfigSource::Organization,
        is_global_admin: true,
    });
    let f = fixture(store, CacheTier::default());

    let resolved = f
        .resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    assert_eq!(resolved.context.source, ConfigSource::Organization);
    assert!(resolved.context.is_global_admin);
}

#[tokio::test]
async fn identity_switch_hides_previous_users_cache() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let f = fixture(
        InMemoryConfigStore::new().with_config(named("alice remote")),
        CacheTier::default().with_persistent(kv),
    );
    f.resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();

    f.auth.sign_in("token-b", "bob");
    f.store.set_reachable(false);
    assert!(f.resolver.cached_fallback().await.is_none());
}

#[tokio::test]
async fn identity_switch_clears_memory_only_cache() {
    let f = fixture(
        InMemoryConfigStore::new()
            .with_config(named("alice-draft"))
            .with_presets(vec![PresetDocument {
                id: "user-ocean".to_string(),
                name: "Ocean".to_string(),
                description: String::new(),
                config: named("ocean"),
                is_system: false,
                is_default: false,
                created_at: None,
                updated_at: None,
            }]),
        CacheTier::default(),
    );
    f.resolver
        .get_current_config(FetchStrategy::BackendFirst)
        .await
        .unwrap();
    f.resolver.get_presets().await.unwrap();

    f.auth.sign_in("token-b", "bob");
    f.store.set_reachable(false);

    for strategy in [FetchStrategy::BackendFirst, FetchStrategy::CacheFirst] {
        let err = f.resolver.get_current_config(strategy).await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::Network);
    }
    assert!(f.resolver.cached_fallback().await.is_none());
    assert!(f.resolver.get_presets().await.is_err());
}

#[tokio::test]
async fn save_writes_through_and_failure_leaves_cache() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());

    let saved = f.resolver.save_config(&named("saved")).await.unwrap();
    assert!(saved.id.is_some());
    assert_eq!(f.cache.memory_config().await, Some(saved.clone()));

    f.store.set_reject_saves(true);
    let err = f.resolver.save_config(&named("rejected")).await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::Network);
    assert_eq!(f.cache.memory_config().await, Some(saved));
}

#[tokio::test]
async fn system_presets_rejected_before_request() {
    let system = PresetDocument {
        id: "sys-default".to_string(),
        name: "Default".to_string(),
        description: String::new(),
        config: named("system"),
        is_system: true,
        is_default: true,
        created_at: None,
        updated_at: None,
    };
    let f = fixture(
        InMemoryConfigStore::new().with_presets(vec![system.clone()]),
        CacheTier::default(),
    );
    assert_eq!(f.resolver.get_presets().await.unwrap().len(), 1);
    let requests = f.store.request_count();

    let err = f.resolver.delete_preset("sys-default").await.unwrap_err();
    assert_eq!(err, SyncError::SystemPreset("sys-default".to_string()));
    let err = f
        .resolver
        .update_preset("sys-default", &PresetUpdate::from(&system))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SystemPreset(_)));
    assert_eq!(f.store.request_count(), requests);
}

#[tokio::test]
async fn presets_fall_back_to_cache_when_offline() {
    let f = fixture(InMemoryConfigStore::new(), CacheTier::default());
    let created = f
        .resolver
        .create_preset(&NewPreset::from_config("Mine", "", &named("mine")))
        .await
        .unwrap();
    assert_eq!(f.resolver.get_presets().await.unwrap(), vec![created.clone()]);

    f.store.set_reachable(false);
    assert_eq!(f.resolver.get_presets().await.unwrap(), vec![created]);
}
