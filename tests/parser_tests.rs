//! Tests for the text input adapters.

use std::collections::BTreeMap;

use evplan::data::embedded_catalog;
use evplan::models::{Inventory, ItemCategory, Stat, StatsTable};
use evplan::parser::{
    apply_parsed_targets, apply_quick_update, parse_currency, parse_ev_string, parse_quantity,
    scan_inventory_text, ParseError,
};

#[test]
fn test_parse_ev_string_long_names() {
    let parsed = parse_ev_string("EVs: 4 HP / 252 Sp. Atk / 252 Speed");

    assert_eq!(parsed.evs[&Stat::Hp], 4);
    assert_eq!(parsed.evs[&Stat::SpAttack], 252);
    assert_eq!(parsed.evs[&Stat::Speed], 252);
    assert_eq!(parsed.raw_line.as_deref(), Some("EVs: 4 HP / 252 Sp. Atk / 252 Speed"));
}

#[test]
fn test_parse_ev_string_caps_and_ignores_unknown() {
    let parsed = parse_ev_string("evs: 300 Atk / 10 Luck / 6 SpD");

    assert_eq!(parsed.evs[&Stat::Attack], 252);
    assert_eq!(parsed.evs[&Stat::SpDefense], 6);
    assert_eq!(parsed.evs.len(), 2);
}

#[test]
fn test_parse_ev_string_multiple_lines() {
    let parsed = parse_ev_string("EVs: 252 Atk\nEVs: 252 Def");

    assert_eq!(parsed.evs.get(&Stat::Attack), Some(&252));
    assert!(parsed.evs.get(&Stat::Defense).is_none());
    assert_eq!(
        parsed.message.as_deref(),
        Some("Multiple EV lines detected. Using the first one found: 'EVs: 252 Atk'.")
    );
}

#[test]
fn test_parse_ev_string_without_ev_line() {
    let parsed = parse_ev_string("Garchomp @ Choice Scarf\nAbility: Rough Skin");
    assert!(parsed.evs.is_empty());
    assert_eq!(parsed.message.as_deref(), Some("No 'EVs:' line found in the input."));

    let empty = parse_ev_string("   ");
    assert!(empty.message.is_none());
}

#[test]
fn test_apply_parsed_targets_within_limit() {
    let parsed = parse_ev_string("EVs: 252 Atk / 6 SpD / 252 Spe");
    let (targets, warnings) = apply_parsed_targets(&parsed.evs);

    assert_eq!(targets, StatsTable::from_array([0, 252, 0, 0, 6, 252]));
    assert!(warnings.is_empty());
}

#[test]
fn test_apply_parsed_targets_over_limit() {
    let evs: BTreeMap<Stat, u32> = [
        (Stat::Hp, 252),
        (Stat::Attack, 252),
        (Stat::Defense, 100),
        (Stat::Speed, 4),
    ]
    .into_iter()
    .collect();

    let (targets, warnings) = apply_parsed_targets(&evs);

    assert_eq!(targets, StatsTable::from_array([252, 252, 6, 0, 0, 0]));
    assert_eq!(
        warnings,
        vec![
            "Partially applied Defense: 6 EVs (total limit 510 reached).".to_string(),
            "Could not apply EVs for Speed: total limit of 510 already reached.".to_string(),
        ]
    );
}

#[test]
fn test_parse_currency() {
    assert_eq!(parse_currency("12,500"), 12_500);
    assert_eq!(parse_currency(" 300 "), 300);
    assert_eq!(parse_currency(""), 0);
    assert_eq!(parse_currency("-5"), 0);
    assert_eq!(parse_currency("1.5"), 1);
    assert_eq!(parse_currency("12abc"), 12);
    assert_eq!(parse_currency("3,000 LP"), 3_000);
}

#[test]
fn test_parse_quantity_words() {
    assert_eq!(parse_quantity("12"), Some(12));
    assert_eq!(parse_quantity("Three"), Some(3));
    assert_eq!(parse_quantity("twenty"), Some(20));
    assert_eq!(parse_quantity("many"), None);
    assert_eq!(parse_quantity("-1"), None);
}

#[test]
fn test_quick_update_sets_in_category_order() {
    let catalog = embedded_catalog();
    let inventory: Inventory = [("protein".to_string(), 1)].into_iter().collect();
    let orders = catalog.default_sort_orders();

    let update =
        apply_quick_update(&catalog, &inventory, &orders, ItemCategory::Vitamin, "5, 1 zero 10.")
            .unwrap();

    assert_eq!(update.inventory["hp-up"], 5);
    assert_eq!(update.inventory["protein"], 1);
    assert_eq!(update.inventory["iron"], 0);
    assert_eq!(update.inventory["calcium"], 10);
    assert!(!update.inventory.contains_key("zinc"));
    assert_eq!(
        update.updated,
        vec![
            ("hp-up".to_string(), 5),
            ("iron".to_string(), 0),
            ("calcium".to_string(), 10),
        ]
    );
    assert_eq!(update.skipped, 0);
}

#[test]
fn test_quick_update_follows_user_order() {
    let catalog = embedded_catalog();
    let mut orders = catalog.default_sort_orders();
    orders.insert(
        ItemCategory::Feather,
        vec!["swift-feather".to_string(), "health-feather".to_string()],
    );

    let update = apply_quick_update(
        &catalog,
        &Inventory::new(),
        &orders,
        ItemCategory::Feather,
        "40 2 x 7",
    )
    .unwrap();

    assert_eq!(update.inventory["swift-feather"], 40);
    assert_eq!(update.inventory["health-feather"], 2);
    // "x" is skipped, so the next quantity lands on the item after it.
    assert!(!update.inventory.contains_key("muscle-feather"));
    assert_eq!(update.inventory["resist-feather"], 7);
    assert_eq!(update.skipped, 1);
}

#[test]
fn test_quick_update_errors() {
    let catalog = embedded_catalog();
    let orders = catalog.default_sort_orders();

    let empty =
        apply_quick_update(&catalog, &Inventory::new(), &orders, ItemCategory::Mochi, " . ");
    assert_eq!(empty, Err(ParseError::EmptyInput));

    let invalid =
        apply_quick_update(&catalog, &Inventory::new(), &orders, ItemCategory::Mochi, "a b c");
    assert_eq!(invalid, Err(ParseError::NoValidQuantities(3, ItemCategory::Mochi)));
    assert_eq!(
        invalid.unwrap_err().to_string(),
        "No valid quantities found. All 3 entries were invalid for Mochi."
    );
}

#[test]
fn test_scan_inventory_text() {
    let catalog = embedded_catalog();
    let text = "Bag\nHP Up x4\n  Swift Feather   x 120\n9 Health Mochi\nIron\n";

    let scan = scan_inventory_text(&catalog, text);

    assert_eq!(scan.quantities["hp-up"], 4);
    assert_eq!(scan.quantities["swift-feather"], 120);
    assert_eq!(scan.quantities["health-mochi"], 9);
    assert!(!scan.quantities.contains_key("iron"));
    assert_eq!(
        scan.warnings,
        vec!["Found \"Iron\" but couldn't parse quantity on line: \"iron\".".to_string()]
    );
}

#[test]
fn test_scan_apply_to_keeps_unscanned_items() {
    let catalog = embedded_catalog();
    let inventory: Inventory = [("protein".to_string(), 3), ("zinc".to_string(), 8)]
        .into_iter()
        .collect();

    let scan = scan_inventory_text(&catalog, "Zinc x2");
    let updated = scan.apply_to(&inventory);

    assert_eq!(updated["protein"], 3);
    assert_eq!(updated["zinc"], 2);
}
