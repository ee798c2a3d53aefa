use std::sync::Once;

use console_error_panic_hook::set_once as set_panic_hook;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

pub mod cache;
pub mod calc;
pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod search;
pub mod storage;
pub mod text;
pub mod timer;

use cache::{CacheLookup, CacheStats, ClientCache};
use calc::bmi::{BmiResult, UnitSystem, calculate_bmi};
use calc::percentage::{self, PercentageResult};
use clock::{Clock, SystemClock};
use config::ToolkitConfig;
use error::ToolError;
use registry::{Tool, all_tools};
use search::{SearchOptions, SearchResult};
use storage::{BrowserStorage, LocalStore, Storage};
use text::lorem::LoremOptions;
use timer::{Countdown, Pomodoro, PomodoroSettings, Stopwatch, TimerSnapshot};

static LOGGER: Once = Once::new();

#[wasm_bindgen(start)]
pub fn wasm_start() {
    set_panic_hook();
    init_logger(log::Level::Info);
}

fn init_logger(level: log::Level) {
    LOGGER.call_once(|| {
        #[cfg(target_arch = "wasm32")]
        wasm_logger::init(wasm_logger::Config::new(level));
    });
    log::set_max_level(level.to_level_filter());
}

/// Adjusts console verbosity after startup (`trace` .. `error`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    init_logger(config::parse_log_level(level));
}

fn js_error(err: ToolError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Serializes with plain JS objects for maps so `serde_json::Value` payloads
/// round-trip through `JSON.stringify` unchanged.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn from_js(value: JsValue) -> Result<Value, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Validates the host config and returns it with defaults filled in.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> Result<JsValue, JsValue> {
    let config = ToolkitConfig::from_json(config_json).map_err(js_error)?;
    init_logger(config.log_level());
    to_js(&config)
}

#[wasm_bindgen]
pub fn list_tools() -> Result<JsValue, JsValue> {
    to_js(all_tools())
}

#[wasm_bindgen]
pub fn search_tools(query: &str, limit: u32) -> Result<JsValue, JsValue> {
    to_js(&search_tools_internal(query, limit, &SearchOptions::default()))
}

/// Same as [`search_tools`] but with host-supplied options (JSON).
#[wasm_bindgen]
pub fn search_tools_with(query: &str, options_json: &str) -> Result<JsValue, JsValue> {
    let options: SearchOptions = if options_json.trim().is_empty() {
        SearchOptions::default()
    } else {
        serde_json::from_str(options_json).map_err(|err| js_error(err.into()))?
    };
    to_js(&search_tools_internal(query, 0, &options))
}

fn search_tools_internal(
    query: &str,
    limit: u32,
    options: &SearchOptions,
) -> Vec<SearchResult<'static>> {
    let mut options = options.clone();
    if limit > 0 {
        options.limit = Some(limit as usize);
    }
    search::search(query, all_tools(), &options)
}

#[wasm_bindgen]
pub fn suggest_tools(query: &str, limit: u32) -> Result<JsValue, JsValue> {
    to_js(&search::suggest(query, all_tools(), limit as usize))
}

#[wasm_bindgen]
pub fn find_tool(id: &str) -> Result<JsValue, JsValue> {
    match registry::find_tool(id) {
        Some(tool) => to_js::<Tool>(tool),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen]
pub fn percentage_calculate(kind: &str, a: f64, b: f64) -> Result<JsValue, JsValue> {
    percentage_internal(kind, a, b)
        .map_err(js_error)
        .and_then(|res| to_js(&res))
}

fn percentage_internal(kind: &str, a: f64, b: f64) -> Result<PercentageResult, ToolError> {
    percentage::calculate(kind, a, b)
}

#[wasm_bindgen]
pub fn bmi_calculate(weight: f64, height: f64, units: &str) -> Result<JsValue, JsValue> {
    bmi_internal(weight, height, units)
        .map_err(js_error)
        .and_then(|res| to_js(&res))
}

fn bmi_internal(weight: f64, height: f64, units: &str) -> Result<BmiResult, ToolError> {
    calculate_bmi(weight, height, UnitSystem::parse(units)?)
}

#[wasm_bindgen]
pub fn format_json_text(input: &str, minify: bool) -> Result<String, JsValue> {
    text::json::format_json(input, minify).map_err(js_error)
}

#[wasm_bindgen]
pub fn validate_json_text(input: &str) -> Result<JsValue, JsValue> {
    to_js(&text::json::validate_json(input))
}

#[wasm_bindgen]
pub fn jwt_decode(token: &str) -> Result<JsValue, JsValue> {
    text::jwt::decode_jwt(token, SystemClock.now_millis())
        .map_err(js_error)
        .and_then(|res| to_js(&res))
}

#[wasm_bindgen]
pub fn jwt_encode(payload_input: &str, secret: &str, algorithm: &str) -> Result<String, JsValue> {
    text::jwt::encode_jwt(payload_input, secret, algorithm).map_err(js_error)
}

#[wasm_bindgen]
pub fn gradient_css(gradient_json: &str) -> Result<String, JsValue> {
    text::gradient::gradient_css(gradient_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn lorem_ipsum(options_json: &str) -> Result<String, JsValue> {
    lorem_internal(options_json).map_err(js_error)
}

fn lorem_internal(options_json: &str) -> Result<String, ToolError> {
    let options: LoremOptions = if options_json.trim().is_empty() {
        LoremOptions::default()
    } else {
        serde_json::from_str(options_json)?
    };
    text::lorem::generate_lorem(&options)
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct CacheReply {
    status: &'static str,
    data: Option<Value>,
}

impl From<CacheLookup<Value>> for CacheReply {
    fn from(lookup: CacheLookup<Value>) -> Self {
        match lookup {
            CacheLookup::Fresh(data) => CacheReply {
                status: "fresh",
                data: Some(data),
            },
            CacheLookup::Stale(data) => CacheReply {
                status: "stale",
                data: Some(data),
            },
            CacheLookup::Miss => CacheReply {
                status: "miss",
                data: None,
            },
        }
    }
}

fn cache_get_internal<S: Storage, C: Clock>(
    cache: &mut ClientCache<S, C>,
    policy: &str,
    key: &str,
) -> Result<CacheReply, ToolError> {
    cache.get::<Value>(policy, key).map(CacheReply::from)
}

/// `localStorage`-backed cache handle for the host.
#[wasm_bindgen]
pub struct ToolCache {
    inner: ClientCache<BrowserStorage, SystemClock>,
}

#[wasm_bindgen]
impl ToolCache {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ToolCache, JsValue> {
        let config = ToolkitConfig::from_json(config_json).map_err(js_error)?;
        let storage = BrowserStorage::new().map_err(js_error)?;
        let store = LocalStore::new(storage, config.storage_prefix);
        Ok(ToolCache {
            inner: ClientCache::with_policies(
                store,
                SystemClock,
                config.cache_version,
                config.cache_policies,
            ),
        })
    }

    /// Returns `{ status: "fresh" | "stale" | "miss", data }`.
    pub fn get(&mut self, policy: &str, key: &str) -> Result<JsValue, JsValue> {
        cache_get_internal(&mut self.inner, policy, key)
            .map_err(js_error)
            .and_then(|reply| to_js(&reply))
    }

    pub fn set(&mut self, policy: &str, key: &str, data: JsValue) -> Result<(), JsValue> {
        let value = from_js(data)?;
        self.inner.set(policy, key, &value).map_err(js_error)
    }

    pub fn invalidate(&mut self, policy: &str, key: &str) -> Result<(), JsValue> {
        self.inner.invalidate(policy, key).map_err(js_error)
    }

    pub fn clear(&mut self, policy: &str) -> Result<u32, JsValue> {
        self.inner
            .clear(policy)
            .map(|n| n as u32)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = purgeExpired)]
    pub fn purge_expired(&mut self) -> Result<u32, JsValue> {
        self.inner
            .purge_expired()
            .map(|n| n as u32)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = beginRevalidation)]
    pub fn begin_revalidation(&mut self, policy: &str, key: &str) -> bool {
        self.inner.begin_revalidation(policy, key)
    }

    #[wasm_bindgen(js_name = endRevalidation)]
    pub fn end_revalidation(&mut self, policy: &str, key: &str) {
        self.inner.end_revalidation(policy, key);
    }

    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_js::<CacheStats>(&self.inner.stats())
    }
}

/// Typed preference storage (favorites, last inputs) under `<prefix>:prefs`,
/// apart from the cache entries that share the app prefix.
#[wasm_bindgen]
pub struct PreferenceStore {
    inner: LocalStore<BrowserStorage>,
}

#[wasm_bindgen]
impl PreferenceStore {
    #[wasm_bindgen(constructor)]
    pub fn new(prefix: &str) -> Result<PreferenceStore, JsValue> {
        let storage = BrowserStorage::new().map_err(js_error)?;
        Ok(PreferenceStore {
            inner: LocalStore::new(storage, config::preferences_prefix(prefix)),
        })
    }

    /// Returns the stored value, or `fallback` when missing or unreadable.
    pub fn get(&mut self, key: &str, fallback: JsValue) -> Result<JsValue, JsValue> {
        let fallback = from_js(fallback)?;
        to_js(&self.inner.get_or_default(key, fallback))
    }

    pub fn set(&mut self, key: &str, value: JsValue) -> Result<(), JsValue> {
        let value = from_js(value)?;
        self.inner.set(key, &value).map_err(js_error)
    }

    pub fn remove(&mut self, key: &str) -> Result<(), JsValue> {
        self.inner.remove(key).map_err(js_error)
    }

    pub fn keys(&self) -> Result<JsValue, JsValue> {
        self.inner
            .keys()
            .map_err(js_error)
            .and_then(|keys| to_js(&keys))
    }
}

#[wasm_bindgen]
pub struct CountdownTimer {
    inner: Countdown,
}

#[wasm_bindgen]
impl CountdownTimer {
    #[wasm_bindgen(constructor)]
    pub fn new(duration_ms: f64) -> Result<CountdownTimer, JsValue> {
        let duration = millis_from_js(duration_ms).map_err(js_error)?;
        Countdown::new(duration)
            .map(|inner| CountdownTimer { inner })
            .map_err(js_error)
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Returns `true` on the tick that reaches zero.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        self.inner.tick(elapsed_ms.max(0.0) as u64)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js::<TimerSnapshot>(&self.inner.snapshot())
    }
}

#[wasm_bindgen]
#[derive(Default)]
pub struct StopwatchTimer {
    inner: Stopwatch,
}

#[wasm_bindgen]
impl StopwatchTimer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StopwatchTimer {
        StopwatchTimer::default()
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn tick(&mut self, elapsed_ms: f64) {
        self.inner.tick(elapsed_ms.max(0.0) as u64);
    }

    pub fn lap(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.lap() {
            Some(lap) => to_js(lap),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.inner.elapsed_ms() as f64
    }

    pub fn laps(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.laps())
    }
}

#[wasm_bindgen]
pub struct PomodoroTimer {
    inner: Pomodoro,
}

#[wasm_bindgen]
impl PomodoroTimer {
    /// Durations in minutes, as entered in the settings form.
    #[wasm_bindgen(constructor)]
    pub fn new(
        work_minutes: f64,
        short_break_minutes: f64,
        long_break_minutes: f64,
        sessions_before_long_break: u32,
    ) -> Result<PomodoroTimer, JsValue> {
        let settings = pomodoro_settings(
            work_minutes,
            short_break_minutes,
            long_break_minutes,
            sessions_before_long_break,
        )
        .map_err(js_error)?;
        Pomodoro::new(settings)
            .map(|inner| PomodoroTimer { inner })
            .map_err(js_error)
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    /// Returns the new phase name when the tick ended the current one.
    pub fn tick(&mut self, elapsed_ms: f64) -> Result<JsValue, JsValue> {
        match self.inner.tick(elapsed_ms.max(0.0) as u64) {
            Some(phase) => to_js(&phase),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn skip(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.skip())
    }

    #[wasm_bindgen(js_name = completedSessions)]
    pub fn completed_sessions(&self) -> u32 {
        self.inner.completed_sessions()
    }

    pub fn phase(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.phase())
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.snapshot())
    }
}

fn millis_from_js(value: f64) -> Result<u64, ToolError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ToolError::invalid("duration must be a non-negative number"));
    }
    Ok(value.round() as u64)
}

fn pomodoro_settings(
    work_minutes: f64,
    short_break_minutes: f64,
    long_break_minutes: f64,
    sessions_before_long_break: u32,
) -> Result<PomodoroSettings, ToolError> {
    const MINUTE: f64 = 60_000.0;
    Ok(PomodoroSettings {
        work_ms: millis_from_js(work_minutes * MINUTE)?,
        short_break_ms: millis_from_js(short_break_minutes * MINUTE)?,
        long_break_ms: millis_from_js(long_break_minutes * MINUTE)?,
        sessions_before_long_break,
    })
}

#[cfg(test)]
mod lib_tests;
