//! Text input adapters.
//!
//! These turn free-form text into planner inputs: Showdown `EVs:` lines into
//! target tables, currency fields into numbers, positional quick-update
//! strings and scanned inventory screens into item quantities.

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{
    Catalog, Inventory, ItemCategory, ItemSortOrders, Stat, StatsTable, MAX_EV_PER_STAT,
    MAX_TOTAL_EVS,
};

static EV_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*([a-z.\s]+)").expect("valid EV part regex"));

static EV_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/,]+").expect("valid separator regex"));

static QUANTITY_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,]+").expect("valid quantity separator regex"));

static SCANNED_QUANTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:x\s*|\b)(\d+)\b").expect("valid quantity regex"));

/// Errors from the text adapters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Input is empty.")]
    EmptyInput,
    #[error("No valid quantities found. All {0} entries were invalid for {1}.")]
    NoValidQuantities(usize, ItemCategory),
}

/// Maps a normalised stat name (lowercase, no dots, single spaces) to a stat.
fn stat_from_shorthand(key: &str) -> Option<Stat> {
    let stat = match key {
        "hp" => Stat::Hp,
        "atk" | "attack" => Stat::Attack,
        "def" | "defense" => Stat::Defense,
        "spa" | "spatk" | "sp atk" | "spattack" | "sp attack" | "special attack" => {
            Stat::SpAttack
        }
        "spd" | "spdef" | "sp def" | "spdefense" | "sp defense" | "special defense" => {
            Stat::SpDefense
        }
        "spe" | "speed" => Stat::Speed,
        _ => return None,
    };
    Some(stat)
}

/// Result of reading a Showdown-style `EVs:` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvParse {
    /// Values found, each capped at [`MAX_EV_PER_STAT`]
    pub evs: BTreeMap<Stat, u32>,
    /// Informational message about the input, if any
    pub message: Option<String>,
    /// The `EVs:` line that was used
    pub raw_line: Option<String>,
}

/// Parses the first `EVs:` line of a Showdown export.
///
/// # Example
///
/// ```
/// use evplan::models::Stat;
/// use evplan::parser::parse_ev_string;
///
/// let parsed = parse_ev_string("Garchomp @ Life Orb\nEVs: 252 Atk / 4 SpD / 252 Spe");
/// assert_eq!(parsed.evs[&Stat::Attack], 252);
/// assert_eq!(parsed.evs[&Stat::SpDefense], 4);
/// assert!(parsed.message.is_none());
/// ```
pub fn parse_ev_string(input: &str) -> EvParse {
    let mut parsed = EvParse::default();
    let mut multiple_lines = false;

    for line in input.lines() {
        let trimmed = line.trim();
        if !trimmed.to_lowercase().starts_with("evs:") {
            continue;
        }
        if parsed.raw_line.is_some() {
            multiple_lines = true;
            continue;
        }

        let ev_part = trimmed.get(4..).unwrap_or("").trim();
        parsed.raw_line = Some(format!("EVs: {}", ev_part));

        for part in EV_SEPARATOR.split(ev_part) {
            let Some(caps) = EV_PART.captures(part.trim()) else {
                continue;
            };
            let Ok(value) = caps[1].parse::<u32>() else {
                continue;
            };
            let key = caps[2]
                .trim()
                .to_lowercase()
                .replace('.', "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(stat) = stat_from_shorthand(&key) {
                parsed.evs.insert(stat, value.min(MAX_EV_PER_STAT));
            }
        }
    }

    if let (true, Some(raw)) = (multiple_lines, &parsed.raw_line) {
        parsed.message = Some(format!(
            "Multiple EV lines detected. Using the first one found: '{}'.",
            raw
        ));
    } else if parsed.raw_line.is_none() && !input.trim().is_empty() {
        parsed.message = Some("No 'EVs:' line found in the input.".to_string());
    }

    parsed
}

/// Builds a fresh target table from parsed values, honouring the total cap.
///
/// Stats are applied in stat order. A stat that would overflow
/// [`MAX_TOTAL_EVS`] receives whatever capacity remains.
///
/// # Returns
///
/// The new targets and one warning per stat that was cut short.
pub fn apply_parsed_targets(evs: &BTreeMap<Stat, u32>) -> (StatsTable, Vec<String>) {
    let mut targets = StatsTable::default();
    let mut total = 0;
    let mut warnings = Vec::new();

    for stat in Stat::ALL {
        let value = evs.get(&stat).copied().unwrap_or(0).min(MAX_EV_PER_STAT);
        if value == 0 {
            continue;
        }
        if total + value <= MAX_TOTAL_EVS {
            targets.set(stat, value);
            total += value;
            continue;
        }
        let remaining = MAX_TOTAL_EVS - total;
        if remaining > 0 {
            targets.set(stat, remaining);
            total += remaining;
            warnings.push(format!(
                "Partially applied {}: {} EVs (total limit {} reached).",
                stat, remaining, MAX_TOTAL_EVS
            ));
        } else {
            warnings.push(format!(
                "Could not apply EVs for {}: total limit of {} already reached.",
                stat, MAX_TOTAL_EVS
            ));
        }
    }

    (targets, warnings)
}

/// Parses a currency field such as `"12,500"`.
///
/// Commas are dropped and the leading run of digits is used, so trailing
/// junk is ignored. Input without leading digits is 0.
///
/// ```
/// use evplan::parser::parse_currency;
///
/// assert_eq!(parse_currency("12,500"), 12_500);
/// assert_eq!(parse_currency("12abc"), 12);
/// assert_eq!(parse_currency("lots"), 0);
/// ```
pub fn parse_currency(value: &str) -> u64 {
    let cleaned = value.replace(',', "");
    let digits: String = cleaned
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Parses a quantity given as digits or as an English number word.
pub fn parse_quantity(word: &str) -> Option<u32> {
    let word = word.trim().to_lowercase();
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word.as_str() {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "one hundred" => 100,
        "two hundred" => 200,
        "two fifty two" => 252,
        _ => return None,
    };
    Some(n)
}

/// Result of a positional quick update for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickUpdate {
    pub inventory: Inventory,
    /// `(item id, new quantity)` for every entry that changed
    pub updated: Vec<(String, u32)>,
    /// Entries that were not valid quantities
    pub skipped: usize,
}

/// Applies a list of quantities to a category's items, in the user's order.
///
/// `"5 3 0 10"` sets the first four items of the category. Extra entries are
/// ignored; invalid ones are counted as skipped. A trailing period (as left
/// by dictation) is dropped.
///
/// # Errors
///
/// [`ParseError::EmptyInput`] for blank input, and
/// [`ParseError::NoValidQuantities`] when every entry was invalid.
pub fn apply_quick_update(
    catalog: &Catalog,
    inventory: &Inventory,
    sort_orders: &ItemSortOrders,
    category: ItemCategory,
    input: &str,
) -> Result<QuickUpdate, ParseError> {
    let mut text = input.trim();
    if let Some(stripped) = text.strip_suffix('.') {
        text = stripped.trim();
    }
    if text.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let items = catalog.ordered_category_items(category, sort_orders);
    let entries: Vec<&str> = QUANTITY_SEPARATOR
        .split(text)
        .filter(|s| !s.is_empty())
        .collect();

    let mut updated_inventory = inventory.clone();
    let mut updated = Vec::new();
    let mut skipped = 0;

    for (item, entry) in items.iter().zip(entries.iter()) {
        match parse_quantity(entry) {
            Some(quantity) => {
                if inventory.get(&item.id) != Some(&quantity) {
                    updated.push((item.id.clone(), quantity));
                }
                updated_inventory.insert(item.id.clone(), quantity);
            }
            None => skipped += 1,
        }
    }

    let considered = entries.len().min(items.len());
    if considered > 0 && skipped == considered {
        return Err(ParseError::NoValidQuantities(skipped, category));
    }

    Ok(QuickUpdate {
        inventory: updated_inventory,
        updated,
        skipped,
    })
}

/// Quantities read from a scanned inventory screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryScan {
    pub quantities: BTreeMap<String, u32>,
    pub warnings: Vec<String>,
}

impl InventoryScan {
    /// Writes the scanned quantities over `inventory`.
    pub fn apply_to(&self, inventory: &Inventory) -> Inventory {
        let mut updated = inventory.clone();
        for (id, quantity) in &self.quantities {
            updated.insert(id.clone(), *quantity);
        }
        updated
    }
}

/// Reads item quantities out of recognised screen text.
///
/// For each catalog item, the first line mentioning its name is used. The
/// quantity is the first number after removing the name, optionally
/// prefixed with `x` (`"Protein x12"`, `"12 Protein"`).
///
/// ```
/// use evplan::data::embedded_catalog;
/// use evplan::parser::scan_inventory_text;
///
/// let catalog = embedded_catalog();
/// let scan = scan_inventory_text(&catalog, "Protein x12\nCarbos 3\nZinc ???");
/// assert_eq!(scan.quantities["protein"], 12);
/// assert_eq!(scan.quantities["carbos"], 3);
/// assert_eq!(scan.warnings.len(), 1);
/// ```
pub fn scan_inventory_text(catalog: &Catalog, text: &str) -> InventoryScan {
    let lines: Vec<String> = text.lines().map(|l| l.trim().to_lowercase()).collect();
    let mut scan = InventoryScan::default();

    for item in catalog.items() {
        let name = item.name.to_lowercase();
        let Some(line) = lines.iter().find(|line| line.contains(&name)) else {
            continue;
        };

        let without_name = line.replacen(&name, " ", 1);
        let quantity = SCANNED_QUANTITY
            .captures(&without_name)
            .and_then(|caps| caps[1].parse::<u32>().ok());

        match quantity {
            Some(quantity) => {
                debug!("Scanned {} x {}", quantity, item.name);
                scan.quantities.insert(item.id.clone(), quantity);
            }
            None => {
                let preview: String = line.chars().take(60).collect();
                let ellipsis = if line.chars().count() > 60 { "..." } else { "" };
                scan.warnings.push(format!(
                    "Found \"{}\" but couldn't parse quantity on line: \"{}{}\".",
                    item.name, preview, ellipsis
                ));
            }
        }
    }

    scan
}
