//! Data loading functionality for evplan.
//!
//! This module loads the item catalog from CSV (either the copy embedded in
//! the binary or a user-supplied file) and reads or writes inventories and
//! item sort orders as JSON.

use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::models::{Catalog, CatalogRow, Inventory, Item, ItemCategory, ItemSortOrders};

/// The default catalog shipped with the crate.
const EMBEDDED_CATALOG: &str = include_str!("../data/items.csv");

/// Reads catalog rows from any CSV source, skipping rows that fail to parse.
///
/// # CSV Format
///
/// Expected columns: `id, name, category, stat, ev_gain, sprite`
fn read_catalog_rows<R: Read>(reader: R) -> Vec<Item> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut items = Vec::new();
    for (line, result) in rdr.deserialize::<CatalogRow>().enumerate() {
        match result {
            Ok(row) => items.push(Item::from(row)),
            Err(e) => warn!("Skipping catalog row {}: {}", line + 1, e),
        }
    }
    items
}

/// Returns the built-in catalog of 6 Vitamins, 6 Mochi and 6 Feathers.
///
/// # Example
///
/// ```
/// use evplan::data::embedded_catalog;
/// use evplan::models::Stat;
///
/// let catalog = embedded_catalog();
/// assert_eq!(catalog.len(), 18);
/// assert_eq!(catalog.vitamin_for(Stat::Speed).unwrap().id, "carbos");
/// ```
pub fn embedded_catalog() -> Catalog {
    let items = read_catalog_rows(EMBEDDED_CATALOG.as_bytes());
    Catalog::new(items).unwrap_or_else(|e| {
        warn!("Embedded catalog is invalid ({}); using an empty catalog", e);
        Catalog::default()
    })
}

/// Loads a catalog from a CSV file.
///
/// # Arguments
///
/// * `path` - Path to a CSV file in the same format as `data/items.csv`
///
/// # Returns
///
/// The validated [`Catalog`], or an error if the file cannot be read or
/// contains duplicate or empty ids.
pub fn load_catalog(path: &Path) -> Result<Catalog, Box<dyn Error>> {
    let file = File::open(path)?;
    let items = read_catalog_rows(file);
    debug!("Loaded {} catalog items from {}", items.len(), path.display());
    Ok(Catalog::new(items)?)
}

/// Cleans a raw inventory JSON value against the catalog.
///
/// Only ids known to the catalog are kept. Negative or non-numeric
/// quantities become 0. Every catalog item is present in the result.
pub fn sanitize_inventory(catalog: &Catalog, raw: &Value) -> Inventory {
    let mut inventory: Inventory = catalog
        .items()
        .iter()
        .map(|item| (item.id.clone(), 0))
        .collect();

    if let Value::Object(entries) = raw {
        for (id, value) in entries {
            if catalog.get(id).is_none() {
                debug!("Ignoring unknown inventory id '{}'", id);
                continue;
            }
            let quantity = match value {
                Value::Number(n) => n
                    .as_u64()
                    .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                    .unwrap_or(0),
                Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
                _ => 0,
            };
            inventory.insert(id.clone(), u32::try_from(quantity).unwrap_or(u32::MAX));
        }
    }
    inventory
}

/// Loads an inventory (`{"item-id": quantity}`) from a JSON file.
pub fn load_inventory(path: &Path, catalog: &Catalog) -> Result<Inventory, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&text)?;
    Ok(sanitize_inventory(catalog, &raw))
}

/// Writes an inventory to a JSON file, pretty-printed.
pub fn save_inventory(path: &Path, inventory: &Inventory) -> Result<(), Box<dyn Error>> {
    let text = serde_json::to_string_pretty(inventory)?;
    fs::write(path, text)?;
    Ok(())
}

/// Resolves stored sort orders against the catalog.
///
/// A category's stored order is accepted only when it lists every item of
/// that category exactly once. Anything else falls back to catalog order.
pub fn resolve_sort_orders(
    catalog: &Catalog,
    stored: &BTreeMap<String, Vec<String>>,
) -> ItemSortOrders {
    let mut orders = catalog.default_sort_orders();

    for category in ItemCategory::ALL {
        let Some(candidate) = stored.get(&category.to_string()) else {
            continue;
        };
        let Some(defaults) = orders.get(&category) else {
            continue;
        };
        let mut seen: Vec<&String> = Vec::with_capacity(candidate.len());
        let is_permutation = candidate.len() == defaults.len()
            && candidate.iter().all(|id| {
                let fresh = !seen.contains(&id);
                seen.push(id);
                fresh && defaults.contains(id)
            });
        if is_permutation {
            orders.insert(category, candidate.clone());
        } else {
            warn!("Invalid item order for {}; using default", category);
        }
    }
    orders
}

/// Loads sort orders from a JSON file of the form `{"Vitamin": ["zinc", ...]}`.
pub fn load_sort_orders(path: &Path, catalog: &Catalog) -> Result<ItemSortOrders, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let stored: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)?;
    Ok(resolve_sort_orders(catalog, &stored))
}
