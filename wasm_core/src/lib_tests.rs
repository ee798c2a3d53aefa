use super::*;
use crate::cache::CachePolicy;
use crate::clock::ManualClock;
use crate::storage::MemoryStorage;
use std::collections::BTreeMap;

fn memory_cache(
    max_age_ms: u64,
    swr_ms: u64,
) -> (ClientCache<MemoryStorage, ManualClock>, ManualClock) {
    let clock = ManualClock::new(10_000);
    let mut policies = BTreeMap::new();
    policies.insert("api".to_string(), CachePolicy::new(max_age_ms, swr_ms, 2));
    let cache = ClientCache::with_policies(
        LocalStore::new(MemoryStorage::new(), "toolbox"),
        clock.clone(),
        3,
        policies,
    );
    (cache, clock)
}

#[test]
fn search_tools_internal_applies_limit() {
    let all = search_tools_internal("timer", 0, &SearchOptions::default());
    assert!(all.len() >= 2);
    let one = search_tools_internal("timer", 1, &SearchOptions::default());
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].tool.id, all[0].tool.id);
}

#[test]
fn search_tools_internal_empty_query() {
    assert!(search_tools_internal("", 5, &SearchOptions::default()).is_empty());
}

#[test]
fn search_results_serialize_for_the_host() {
    let hits = search_tools_internal("JWT Decoder", 1, &SearchOptions::default());
    let json = serde_json::to_value(&hits).expect("serializable");
    assert_eq!(json[0]["tool"]["id"], "jwt-decoder");
    assert_eq!(json[0]["score"], 1.0);
    assert_eq!(json[0]["matchedFields"][0], "name");
    assert!(json[0].get("exactName").is_none());
}

#[test]
fn percentage_internal_uses_ui_names() {
    let res = percentage_internal("percentOf", 25.0, 200.0).expect("calc ok");
    assert_eq!(res.result, 50.0);
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["type"], "percentOf");
    assert!(json.get("direction").is_none());

    let change = percentage_internal("change", 100.0, 120.0).unwrap();
    assert_eq!(change.explanation, "100 → 120 = 20.00% increase");
}

#[test]
fn bmi_internal_defaults_to_metric() {
    let res = bmi_internal(70.0, 175.0, "").expect("bmi ok");
    assert_eq!(res.unit_system, UnitSystem::Metric);
    assert!(bmi_internal(70.0, 175.0, "stone").is_err());
}

#[test]
fn lorem_internal_parses_options() {
    let text = lorem_internal(r#"{"unit":"words","count":4,"startWithLorem":true,"seed":7}"#)
        .expect("lorem ok");
    assert_eq!(text, "Lorem ipsum dolor sit");
    assert!(!lorem_internal("").unwrap().is_empty());
    assert!(lorem_internal("{bad").is_err());
}

#[test]
fn cache_reply_reports_status() {
    let (mut cache, clock) = memory_cache(1_000, 1_000);
    let miss = cache_get_internal(&mut cache, "api", "users").unwrap();
    assert_eq!(
        miss,
        CacheReply {
            status: "miss",
            data: None
        }
    );

    cache
        .set("api", "users", &serde_json::json!({"count": 2}))
        .unwrap();
    let fresh = cache_get_internal(&mut cache, "api", "users").unwrap();
    assert_eq!(fresh.status, "fresh");
    assert_eq!(fresh.data.unwrap()["count"], 2);

    clock.advance(1_500);
    let stale = cache_get_internal(&mut cache, "api", "users").unwrap();
    assert_eq!(stale.status, "stale");
}

#[test]
fn cache_reply_keeps_policy_bounded() {
    let (mut cache, clock) = memory_cache(60_000, 0);
    for key in ["a", "b", "c"] {
        cache.set("api", key, &key).unwrap();
        clock.advance(1);
    }
    assert_eq!(cache.store().keys().unwrap().len(), 2);
    assert_eq!(
        cache_get_internal(&mut cache, "api", "a").unwrap().status,
        "miss"
    );
}

#[test]
fn preferences_and_cache_keep_separate_keys() {
    let mut prefs = LocalStore::new(MemoryStorage::new(), config::preferences_prefix(""));
    prefs.set("theme", "dark").unwrap();
    prefs.set("cache:default:recent", &["json-formatter"]).unwrap();

    let store = LocalStore::new(prefs.storage().clone(), config::DEFAULT_STORAGE_PREFIX);
    let mut cache = ClientCache::new(store, ManualClock::new(0), 1);
    cache.set("default", "rates", &1).unwrap();
    assert_eq!(cache.purge_expired().unwrap(), 0);
    assert_eq!(cache.clear_all().unwrap(), 1);

    let storage = cache.store().storage().clone();
    assert_eq!(storage.len(), 2);
    let prefs = LocalStore::new(storage, config::preferences_prefix(""));
    assert_eq!(prefs.keys().unwrap(), vec!["cache:default:recent", "theme"]);
}

#[test]
fn pomodoro_settings_convert_minutes() {
    let settings = pomodoro_settings(25.0, 5.0, 15.0, 4).expect("settings ok");
    assert_eq!(settings, PomodoroSettings::default());
    assert!(pomodoro_settings(-1.0, 5.0, 15.0, 4).is_err());
    assert!(millis_from_js(f64::NAN).is_err());
    assert_eq!(millis_from_js(1.4).unwrap(), 1);
}

#[test]
fn config_round_trips_through_defaults() {
    let config = ToolkitConfig::from_json(r#"{"cacheVersion":4}"#).unwrap();
    assert_eq!(config.cache_version, 4);
    assert_eq!(config.storage_prefix, config::DEFAULT_STORAGE_PREFIX);
}
