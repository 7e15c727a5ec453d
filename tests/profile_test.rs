/*!
 * Profile Cache & Account-Type Tests
 *
 * Pins down the cached current-user contract: at most one source fetch for
 * repeated non-forced loads, a forced load always re-fetching, failed
 * fetches cached as loaded-nothing, explicit invalidation, and the
 * cache -> metadata hint -> source fallback chain for the effective
 * account type. Also exercises the database-backed source end to end.
 */

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use finboard_server::errors::ReadError;
use finboard_server::models::{AccountType, Profile, Role};
use finboard_server::profile::{
    CacheSlot, DbProfileSource, ProfileService, ProfileSource,
};

struct CountingSource {
    profile: Option<Profile>,
    fail: bool,
    calls: AtomicUsize,
}

impl CountingSource {
    fn with(profile: Option<Profile>) -> Self {
        Self {
            profile,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            profile: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ProfileSource for CountingSource {
    async fn fetch_profile(&self, _user_id: &str) -> Result<Option<Profile>, ReadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ReadError::Query("simulated backend failure".to_string()))
        } else {
            Ok(self.profile.clone())
        }
    }
}

fn business_profile(id: &str) -> Profile {
    let mut profile = test_profile(id, Role::Admin, None);
    profile.account_type = Some(AccountType::Business);
    profile
}

#[tokio::test]
async fn second_non_forced_load_is_a_cache_hit() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    let first = service.load_current_user("u1", false).await;
    let second = service.load_current_user("u1", false).await;

    assert_eq!(first, second);
    assert!(first.is_some());
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forced_load_always_fetches() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    service.load_current_user("u1", false).await;
    service.load_current_user("u1", true).await;
    service.load_current_user("u1", true).await;

    assert_eq!(service.source().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn clearing_the_cache_resets_to_unloaded() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    service.load_current_user("u1", false).await;
    assert!(matches!(
        service.cached_slot("u1").await,
        CacheSlot::Loaded(Some(_))
    ));

    service.clear_user_cache("u1").await;
    assert_eq!(service.cached_slot("u1").await, CacheSlot::Unloaded);

    service.load_current_user("u1", false).await;
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_fetch_is_cached_as_loaded_none() {
    let service = ProfileService::new(CountingSource::failing());

    assert!(service.load_current_user("u1", false).await.is_none());
    // Loaded(None) is remembered: no retry storm on repeat calls.
    assert!(service.load_current_user("u1", false).await.is_none());
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        service.cached_slot("u1").await,
        CacheSlot::Loaded(None)
    );
}

#[tokio::test]
async fn unloaded_slot_is_distinct_from_loaded_none() {
    let service = ProfileService::new(CountingSource::with(None));

    assert_eq!(service.cached_slot("u1").await, CacheSlot::Unloaded);
    service.load_current_user("u1", false).await;
    assert_eq!(service.cached_slot("u1").await, CacheSlot::Loaded(None));
}

#[tokio::test]
async fn cached_users_are_isolated_per_id() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    service.load_current_user("u1", false).await;
    assert_eq!(service.cached_slot("u2").await, CacheSlot::Unloaded);
}

#[test]
fn account_type_normalization_is_total() {
    for raw in ["Personnel", "personal", "PRIVATE", " private "] {
        assert_eq!(AccountType::parse(raw), Some(AccountType::Personal), "{raw}");
    }
    for raw in ["Company", "business", "Commercial", "BUSINESS"] {
        assert_eq!(AccountType::parse(raw), Some(AccountType::Business), "{raw}");
    }
    for raw in ["", "enterprise", "per sonal", "123"] {
        assert_eq!(AccountType::parse(raw), None, "{raw}");
    }
}

#[tokio::test]
async fn effective_type_prefers_cached_profile() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));
    service.load_current_user("u1", false).await;

    // A contradictory hint loses to the cache, and no extra fetch happens.
    let resolved = service.effective_account_type("u1", Some("personal")).await;
    assert_eq!(resolved, Some(AccountType::Business));
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn effective_type_uses_metadata_hint_without_fetching() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    let resolved = service.effective_account_type("u1", Some("Company")).await;
    assert_eq!(resolved, Some(AccountType::Business));
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn effective_type_falls_back_to_source_on_garbage_hint() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    let resolved = service.effective_account_type("u1", Some("enterprise")).await;
    assert_eq!(resolved, Some(AccountType::Business));
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn effective_type_falls_back_to_source_without_hint() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));

    let resolved = service.effective_account_type("u1", None).await;
    assert_eq!(resolved, Some(AccountType::Business));
    assert_eq!(service.source().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn business_check_follows_effective_type() {
    let service = ProfileService::new(CountingSource::with(Some(business_profile("u1"))));
    assert!(service.is_business_account("u1", None).await);

    let personal = ProfileService::new(CountingSource::with(Some(test_profile(
        "u2",
        Role::Admin,
        None,
    ))));
    assert!(!personal.is_business_account("u2", Some("Personnel")).await);
}

#[tokio::test]
async fn effective_type_is_none_when_nothing_knows() {
    let service = ProfileService::new(CountingSource::with(None));

    assert_eq!(service.effective_account_type("u1", None).await, None);
}

#[tokio::test]
async fn db_source_loads_and_normalizes_profile_row() {
    let (db, _temp_dir) = setup_test_db().await;
    // "Company" in the row must normalize to Business on load.
    let user_id = create_test_user(&db, "boss@example.com", "Admin", Some("Company"), None).await;

    let service = ProfileService::new(DbProfileSource::new(db));
    let profile = service
        .load_current_user(&user_id, false)
        .await
        .expect("profile should load");

    assert_eq!(profile.id, user_id);
    assert_eq!(profile.role, Role::Admin);
    assert_eq!(profile.account_type, Some(AccountType::Business));
}

#[tokio::test]
async fn db_source_caches_missing_user_as_loaded_none() {
    let (db, _temp_dir) = setup_test_db().await;
    let service = ProfileService::new(DbProfileSource::new(db));

    assert!(service.load_current_user("no-such-user", false).await.is_none());
    assert_eq!(
        service.cached_slot("no-such-user").await,
        CacheSlot::Loaded(None)
    );
}
