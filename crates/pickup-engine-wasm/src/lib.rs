//! WASM bindings for pickup-engine.
//!
//! Exposes schedule expansion, schedule planning, and bulk apartment generation
//! to the dashboard via `wasm-bindgen`. All complex types are passed as JSON
//! strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p pickup-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/pickup-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/pickup_engine_wasm.wasm
//! ```
//!
//! Each export is a thin wrapper over a plain Rust function returning
//! `Result<String, String>`, so the conversion logic is testable off-wasm.

use chrono::NaiveDate;
use pickup_engine::{
    BulkApartmentSpec, Occurrence, ScheduleRecord, ScheduleRequest, SchedulingPolicy, UserId,
    WeekdaySet,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct OccurrenceDto {
    date: String,
    start: String,
    end: String,
}

impl From<&Occurrence> for OccurrenceDto {
    fn from(o: &Occurrence) -> Self {
        Self {
            date: o.date.format("%Y-%m-%d").to_string(),
            start: pickup_engine::clock::format_clock(o.window.start),
            end: pickup_engine::clock::format_clock(o.window.end),
        }
    }
}

#[derive(Serialize)]
struct UnitsDto {
    labels: Vec<String>,
    count: usize,
}

/// Optional policy override accepted alongside a request.
#[derive(Deserialize)]
struct RequestEnvelope {
    request: ScheduleRequest,
    #[serde(default)]
    policy: SchedulingPolicy,
}

fn parse_request(json: &str) -> Result<(ScheduleRequest, SchedulingPolicy), String> {
    // `{request, policy}` is recognised by its `request` key; anything else
    // must be a bare request. Each shape reports its own parse error.
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid schedule request JSON: {}", e))?;
    if value.get("request").is_some() {
        let envelope: RequestEnvelope = serde_json::from_value(value)
            .map_err(|e| format!("Invalid schedule request envelope: {}", e))?;
        return Ok((envelope.request, envelope.policy));
    }
    serde_json::from_value::<ScheduleRequest>(value)
        .map(|r| (r, SchedulingPolicy::default()))
        .map_err(|e| format!("Invalid schedule request JSON: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Plain Rust implementations
// ---------------------------------------------------------------------------

fn expand_schedule_impl(request_json: &str) -> Result<String, String> {
    let (request, policy) = parse_request(request_json)?;
    request.validate(&policy).map_err(|e| e.to_string())?;
    let occurrences = pickup_engine::expand_request(&request).map_err(|e| e.to_string())?;
    let dtos: Vec<OccurrenceDto> = occurrences.iter().map(OccurrenceDto::from).collect();
    to_json(&dtos)
}

fn plan_schedule_impl(request_json: &str, created_by: &str) -> Result<String, String> {
    let (request, policy) = parse_request(request_json)?;
    let created_by: UserId = created_by
        .parse()
        .map_err(|e| format!("Invalid user id '{}': {}", created_by, e))?;
    let plan = pickup_engine::plan(&request, &policy, created_by).map_err(|e| e.to_string())?;
    let records: Vec<_> = std::iter::once(&plan.parent).chain(plan.children.iter()).collect();
    to_json(&records)
}

fn parse_spec(spec_json: &str) -> Result<BulkApartmentSpec, String> {
    serde_json::from_str(spec_json).map_err(|e| format!("Invalid bulk apartment spec JSON: {}", e))
}

fn generate_units_impl(spec_json: &str) -> Result<String, String> {
    let spec = parse_spec(spec_json)?;
    let labels = pickup_engine::generate_labels(&spec).map_err(|e| e.to_string())?;
    let count = labels.len();
    to_json(&UnitsDto { labels, count })
}

fn preview_units_impl(spec_json: &str, limit: usize) -> Result<String, String> {
    let spec = parse_spec(spec_json)?;
    let labels = pickup_engine::preview(&spec, limit).map_err(|e| e.to_string())?;
    to_json(&labels)
}

fn summarize_schedules_impl(records_json: &str, today: &str) -> Result<String, String> {
    let records: Vec<ScheduleRecord> = serde_json::from_str(records_json)
        .map_err(|e| format!("Invalid schedule records JSON: {}", e))?;
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", today, e))?;
    to_json(&pickup_engine::summarize(&records, today))
}

fn preset_days_impl(name: &str) -> Result<String, String> {
    let set = WeekdaySet::preset(name).ok_or_else(|| {
        format!(
            "Unknown day preset: '{}'. Available presets: weekdays, sun-thurs, weekends",
            name
        )
    })?;
    to_json(&set)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Validate and expand a schedule request.
///
/// `request_json` is either a `ScheduleRequest` object or `{request, policy}`.
/// Returns a JSON array of `{date, start, end}` objects.
#[wasm_bindgen(js_name = "expandSchedule")]
pub fn expand_schedule(request_json: &str) -> Result<String, JsValue> {
    expand_schedule_impl(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Build the unsaved records for a request: parent first, then children.
///
/// `created_by` is the creating user's UUID. Returns a JSON array of records.
#[wasm_bindgen(js_name = "planSchedule")]
pub fn plan_schedule(request_json: &str, created_by: &str) -> Result<String, JsValue> {
    plan_schedule_impl(request_json, created_by).map_err(|e| JsValue::from_str(&e))
}

/// Generate every unit label for a bulk apartment spec.
///
/// Returns `{labels, count}`.
#[wasm_bindgen(js_name = "generateUnits")]
pub fn generate_units(spec_json: &str) -> Result<String, JsValue> {
    generate_units_impl(spec_json).map_err(|e| JsValue::from_str(&e))
}

/// Labels for the dashboard preview (first two floors, at most `limit`).
#[wasm_bindgen(js_name = "previewUnits")]
pub fn preview_units(spec_json: &str, limit: usize) -> Result<String, JsValue> {
    preview_units_impl(spec_json, limit).map_err(|e| JsValue::from_str(&e))
}

/// Analytics summary (totals, completion rate, six monthly buckets, status
/// counts) for a JSON array of schedule records. `today` is `YYYY-MM-DD`.
#[wasm_bindgen(js_name = "summarizeSchedules")]
pub fn summarize_schedules(records_json: &str, today: &str) -> Result<String, JsValue> {
    summarize_schedules_impl(records_json, today).map_err(|e| JsValue::from_str(&e))
}

/// Day indices for a named preset (`weekdays`, `sun-thurs`, `weekends`).
#[wasm_bindgen(js_name = "presetDays")]
pub fn preset_days(name: &str) -> Result<String, JsValue> {
    preset_days_impl(name).map_err(|e| JsValue::from_str(&e))
}
