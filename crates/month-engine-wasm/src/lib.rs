//! WASM bindings for month-engine.
//!
//! Exposes month rendering and recurrence parsing to JavaScript via
//! `wasm-bindgen`. Complex values cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p month-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/month_engine_wasm.wasm
//! ```

use month_engine::{
    parse_items, CalendarViewState, ItemOptions, LabelConfig, MonthGrid, PopulateReport,
    RecurrenceRule, YearMonth,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct RenderedMonthDto<'a> {
    #[serde(flatten)]
    grid: &'a MonthGrid,
    report: PopulateReport,
}

// ---------------------------------------------------------------------------
// Plain-Rust implementations (JsValue only exists on wasm targets)
// ---------------------------------------------------------------------------

fn render_month_json(
    items_json: &str,
    list_id: &str,
    month: &str,
    timezone: &str,
    title_max_chars: Option<u32>,
) -> Result<String, String> {
    let month: YearMonth = month.parse().map_err(|e| format!("{}", e))?;
    let items = parse_items(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    let options = ItemOptions::with_timezone(timezone).map_err(|e| e.to_string())?;

    let mut config = LabelConfig::default();
    if let Some(width) = title_max_chars {
        config.title_max_chars = width as usize;
    }

    let mut grid = MonthGrid::new(CalendarViewState::new(list_id, month));
    let report = grid.populate(&items, &options, &config);

    serde_json::to_string(&RenderedMonthDto {
        grid: &grid,
        report,
    })
    .map_err(|e| format!("Serialization error: {}", e))
}

fn parse_recurrence_json(descriptor: &str) -> Result<String, String> {
    let rule = RecurrenceRule::parse(descriptor).map_err(|e| e.to_string())?;
    serde_json::to_string(&rule).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Render one month of list items as a grid.
///
/// Returns a JSON string with `view`, `weeks` (Sunday-first, `null` for blank
/// slots) and a `report` of expanded/skipped/placed counts.
///
/// # Arguments
/// - `items_json` -- list items, as a bare array or `{"value": [...]}`
/// - `list_id` -- list identifier used in cell ids
/// - `month` -- `YYYY-MM`
/// - `timezone` -- IANA timezone timed items are shown in (e.g., "Asia/Tokyo")
/// - `title_max_chars` -- optional title cut-off (default 10)
#[wasm_bindgen(js_name = "renderMonth")]
pub fn render_month(
    items_json: &str,
    list_id: &str,
    month: &str,
    timezone: &str,
    title_max_chars: Option<u32>,
) -> Result<String, JsValue> {
    render_month_json(items_json, list_id, month, timezone, title_max_chars)
        .map_err(|e| JsValue::from_str(&e))
}

/// Parse a recurrence descriptor and return the rule as a JSON string.
#[wasm_bindgen(js_name = "parseRecurrence")]
pub fn parse_recurrence(descriptor: &str) -> Result<String, JsValue> {
    parse_recurrence_json(descriptor).map_err(|e| JsValue::from_str(&e))
}
