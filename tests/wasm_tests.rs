//! Tests for the JSON-in / JSON-out bindings, run natively.

use evplan::wasm::{calculate, get_catalog, get_version, parse_evs, scan_inventory};
use serde_json::Value;

#[test]
fn test_calculate_valid_input() {
    let input = r#"{
        "current_evs": {},
        "target_evs": {"attack": 252, "sp_defense": 6, "speed": 252},
        "inventory": {"protein": 30, "carbos": 30},
        "current_league_points": 50000
    }"#;

    let output: Value = serde_json::from_str(&calculate(input)).unwrap();

    assert_eq!(output["success"], true);
    assert!(output["error"].is_null());
    assert_eq!(output["result"]["status"], "met_with_purchases");
    assert_eq!(output["result"]["remaining_league_points"], 20_000);
    assert_eq!(output["showdown"], "252 Atk / 6 SpD / 252 Spe");
    assert!(output["plan_text"].as_str().unwrap().contains("Shopping List:"));
    assert!(!output["generated_at"].as_str().unwrap().is_empty());
}

#[test]
fn test_calculate_caps_stat_above_252() {
    let input = r#"{
        "current_evs": {},
        "target_evs": {"attack": 400},
        "current_league_points": 1000000
    }"#;

    let output: Value = serde_json::from_str(&calculate(input)).unwrap();
    let result = &output["result"];

    assert_eq!(output["success"], true);
    assert_eq!(result["evs_gained_per_stat"]["attack"], 252);
    assert_eq!(result["items_to_use"]["protein"], 26);
    assert_eq!(output["showdown"], "252 Atk");
}

#[test]
fn test_calculate_caps_total_above_510() {
    let input = r#"{
        "current_evs": {},
        "target_evs": {"hp": 252, "attack": 400, "speed": 400},
        "current_league_points": 1000000
    }"#;

    let output: Value = serde_json::from_str(&calculate(input)).unwrap();
    let gained = &output["result"]["evs_gained_per_stat"];

    assert_eq!(gained["hp"], 252);
    assert_eq!(gained["attack"], 252);
    assert_eq!(gained["speed"], 6);
    assert_eq!(output["result"]["status"], "met_with_purchases");
    assert_eq!(output["showdown"], "252 HP / 252 Atk / 6 Spe");
}

#[test]
fn test_calculate_invalid_input() {
    let output: Value = serde_json::from_str(&calculate("{ nope")).unwrap();

    assert_eq!(output["success"], false);
    assert!(output["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input:"));
    assert!(output["result"].is_null());
}

#[test]
fn test_parse_evs_binding() {
    let output: Value =
        serde_json::from_str(&parse_evs("EVs: 252 HP / 252 Def / 252 SpD")).unwrap();

    assert_eq!(output["target_evs"]["hp"], 252);
    assert_eq!(output["target_evs"]["defense"], 252);
    assert_eq!(output["target_evs"]["sp_defense"], 6);
    assert_eq!(output["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn test_scan_inventory_binding() {
    let output: Value = serde_json::from_str(&scan_inventory("Carbos x9")).unwrap();

    assert_eq!(output["quantities"]["carbos"], 9);
    assert!(output["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_catalog_and_version() {
    let catalog: Value = serde_json::from_str(&get_catalog()).unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 18);
    assert_eq!(catalog[0]["id"], "hp-up");
    assert_eq!(catalog[0]["affected_stat"], "HP");

    assert_eq!(get_version(), env!("CARGO_PKG_VERSION"));
}
