//! WebAssembly bindings for evplan.
//!
//! This module provides JavaScript-accessible functions for the planner.
//! Every function takes and returns JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::data::embedded_catalog;
use crate::display::{format_plan_text, showdown_string};
use crate::models::{CalculationInput, CalculationResult, Item, StatsTable};
use crate::optimizer::calculate as calculate_plan;
use crate::parser::{apply_parsed_targets, parse_ev_string, scan_inventory_text};

/// JavaScript-friendly calculation output.
#[derive(Debug, Clone, Serialize)]
pub struct JsCalculateResult {
    pub success: bool,
    pub error: Option<String>,
    pub result: Option<CalculationResult>,
    pub plan_text: Option<String>,
    pub showdown: Option<String>,
    pub generated_at: String,
}

/// JavaScript-friendly output of EV string parsing.
#[derive(Debug, Clone, Serialize)]
pub struct JsParsedTargets {
    pub target_evs: StatsTable,
    pub message: Option<String>,
    pub warnings: Vec<String>,
    pub raw_line: Option<String>,
}

/// Reports a problem on the browser console (or the log when run natively).
fn report(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    log::warn!("{}", message);
}

/// Current time as an ISO-8601 string.
fn timestamp() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        String::from(js_sys::Date::new_0().to_iso_string())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Run the planner with the given configuration.
///
/// Takes a JSON `CalculationInput` and returns a JSON `JsCalculateResult`.
#[wasm_bindgen]
pub fn calculate(input_json: &str) -> String {
    let generated_at = timestamp();
    let raw: CalculationInput = match serde_json::from_str(input_json) {
        Ok(i) => i,
        Err(e) => {
            let error = format!("Invalid input: {}", e);
            report(&error);
            return serde_json::to_string(&JsCalculateResult {
                success: false,
                error: Some(error),
                result: None,
                plan_text: None,
                showdown: None,
                generated_at,
            })
            .unwrap_or_default();
        }
    };

    let input = raw.with_capped_evs();
    if input != raw {
        report("EVs above the caps were reduced to 252 per stat and 510 total.");
    }

    let catalog = embedded_catalog();
    let result = calculate_plan(&catalog, &input);
    let plan_text = format_plan_text(&catalog, &result, &input.current_evs, &input.target_evs);

    serde_json::to_string(&JsCalculateResult {
        success: true,
        error: None,
        result: Some(result),
        plan_text: Some(plan_text),
        showdown: Some(showdown_string(&input.target_evs)),
        generated_at,
    })
    .unwrap_or_default()
}

/// Parse a Showdown export into capped target EVs.
#[wasm_bindgen]
pub fn parse_evs(text: &str) -> String {
    let parsed = parse_ev_string(text);
    let (target_evs, warnings) = apply_parsed_targets(&parsed.evs);
    serde_json::to_string(&JsParsedTargets {
        target_evs,
        message: parsed.message,
        warnings,
        raw_line: parsed.raw_line,
    })
    .unwrap_or_default()
}

/// Read item quantities out of recognised screen text.
/// Returns `{"quantities": {...}, "warnings": [...]}`.
#[wasm_bindgen]
pub fn scan_inventory(text: &str) -> String {
    #[derive(Serialize)]
    struct ScanOutput {
        quantities: std::collections::BTreeMap<String, u32>,
        warnings: Vec<String>,
    }

    let scan = scan_inventory_text(&embedded_catalog(), text);
    serde_json::to_string(&ScanOutput {
        quantities: scan.quantities,
        warnings: scan.warnings,
    })
    .unwrap_or_default()
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the item catalog as a JSON array.
#[wasm_bindgen]
pub fn get_catalog() -> String {
    let catalog = embedded_catalog();
    let items: Vec<&Item> = catalog.items().iter().collect();
    serde_json::to_string(&items).unwrap_or_default()
}
