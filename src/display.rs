//! Display and formatting utilities for evplan.
//!
//! This module renders a [`CalculationResult`] as a plain-text plan, a
//! Showdown EV string, a JSON export document, or a boxed report on stdout.

use serde::Serialize;

use crate::models::{
    CalculationResult, Catalog, Inventory, ItemCategory, Stat, StatsTable, UsageSource,
    MAX_TOTAL_EVS, VITAMIN_COST,
};

/// Formats an integer with comma thousands separators.
///
/// # Example
///
/// ```
/// use evplan::display::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(999), "999");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats targets as a Showdown `EVs:` value, skipping zero stats.
///
/// ```
/// use evplan::display::showdown_string;
/// use evplan::models::StatsTable;
///
/// let targets = StatsTable::from_array([0, 252, 0, 0, 6, 252]);
/// assert_eq!(showdown_string(&targets), "252 Atk / 6 SpD / 252 Spe");
/// ```
pub fn showdown_string(targets: &StatsTable) -> String {
    let parts: Vec<String> = targets
        .iter()
        .filter(|&(_, value)| value > 0)
        .map(|(stat, value)| format!("{} {}", value, stat.showdown_abbrev()))
        .collect();
    if parts.is_empty() {
        return "0 HP / 0 Atk / 0 Def / 0 SpA / 0 SpD / 0 Spe".to_string();
    }
    parts.join(" / ")
}

fn category_marker(category: Option<ItemCategory>) -> &'static str {
    match category {
        Some(ItemCategory::Vitamin) => "[V]",
        Some(ItemCategory::Mochi) => "[M]",
        Some(ItemCategory::Feather) => "[F]",
        None => "[-]",
    }
}

/// Renders the full plan as plain text.
///
/// Sections: status, global summary, per-stat usage, shopping list (when a
/// purchase was considered) and warnings.
pub fn format_plan_text(
    catalog: &Catalog,
    result: &CalculationResult,
    current: &StatsTable,
    target: &StatsTable,
) -> String {
    let mut text = String::new();
    text.push_str("EV Training Plan\n================\n\n");
    text.push_str(&format!("Overall Status: {}\n\n", result.overall_status_message));

    let achieved_total = Stat::ALL
        .iter()
        .map(|&s| current.get(s).saturating_add(result.evs_gained_per_stat.get(s)))
        .fold(0u32, u32::saturating_add);
    text.push_str("Global Summary:\n");
    text.push_str(&format!(
        "  Total EVs Achieved: {} / {}\n",
        achieved_total, MAX_TOTAL_EVS
    ));
    text.push_str(&format!(
        "  EVs Remaining to Cap: {}\n",
        MAX_TOTAL_EVS.saturating_sub(achieved_total)
    ));
    text.push_str(&format!(
        "  Total Items Used in Plan: {}\n\n",
        result.total_items_used()
    ));

    text.push_str("Target EVs & Item Usage:\n--------------------------\n");
    for stat in Stat::ALL {
        let gained = result.evs_gained_per_stat.get(stat);
        text.push_str(&format!("{}:\n", stat));
        text.push_str(&format!(
            "  Target: {}, Achieved: {} (Current: {}, Gained: +{})\n",
            target.get(stat),
            current.get(stat).saturating_add(gained),
            current.get(stat),
            gained
        ));
        let still = result.evs_still_needed.get(stat);
        if still > 0 {
            text.push_str(&format!("  Still Needs: {} EVs\n", still));
        }

        let uses: Vec<_> = result
            .item_usage_details
            .iter()
            .filter(|u| u.stat == stat)
            .collect();
        if !uses.is_empty() {
            text.push_str("  Items Used/Needed:\n");
            for usage in uses {
                let marker = category_marker(catalog.get(&usage.item_id).map(|item| item.category));
                let source = match usage.source {
                    UsageSource::Purchase => "to purchase",
                    UsageSource::Inventory => "from inventory",
                };
                text.push_str(&format!(
                    "    - {} {} {} (+{} EVs) ({})\n",
                    marker, usage.quantity, usage.item_name, usage.evs_gained, source
                ));
            }
        }
        text.push('\n');
    }

    if result.purchase_attempted {
        text.push_str("Shopping List:\n-----------------\n");
        let cost = result.total_purchase_cost.unwrap_or(0);
        if let (Some(to_buy), None) = (&result.vitamins_to_purchase, result.monetary_shortfall) {
            text.push_str("  Vitamins to Purchase:\n");
            for (id, quantity) in to_buy {
                if let Some(item) = catalog.get(id) {
                    text.push_str(&format!(
                        "    - {} {} (Cost: {} LP/$)\n",
                        quantity,
                        item.name,
                        format_number(u64::from(*quantity) * VITAMIN_COST)
                    ));
                }
            }
            text.push_str(&format!(
                "  Total Purchase Cost: {} LP/$\n",
                format_number(cost)
            ));
            if let Some(used) = result.funds_used {
                text.push_str(&format!(
                    "  Will be Paid with: {} LP, {} $\n",
                    format_number(used.lp),
                    format_number(used.pd)
                ));
            }
            text.push_str(&format!(
                "  Funds After Purchase: {} LP, {} $\n",
                format_number(result.remaining_league_points),
                format_number(result.remaining_poke_dollars)
            ));
        } else if let (Some(shortfall), Some(unaffordable)) =
            (result.monetary_shortfall, &result.item_shortfall)
        {
            text.push_str(&format!(
                "  Insufficient Funds! Shortfall: {} LP/$\n",
                format_number(shortfall)
            ));
            text.push_str("  Vitamins you need to buy but can't afford:\n");
            for (id, quantity) in unaffordable {
                if let Some(item) = catalog.get(id) {
                    text.push_str(&format!(
                        "    - {} {} (Would cost: {} LP/$)\n",
                        quantity,
                        item.name,
                        format_number(u64::from(*quantity) * VITAMIN_COST)
                    ));
                }
            }
            text.push_str(&format!(
                "  Total cost of unaffordable items: {} LP/$\n",
                format_number(cost)
            ));
        }
        text.push('\n');
    }

    if !result.warnings.is_empty() {
        text.push_str("Warnings & Notes:\n-----------------\n");
        for warning in &result.warnings {
            text.push_str(&format!("- {}\n", warning));
        }
    }

    text
}

/// JSON document written by the export command.
#[derive(Debug, Clone, Serialize)]
pub struct PlanExport<'a> {
    pub calculation_result: &'a CalculationResult,
    pub current_evs: &'a StatsTable,
    pub target_evs: &'a StatsTable,
    pub plan_text_summary: String,
    pub generated_at: String,
}

impl<'a> PlanExport<'a> {
    pub fn new(
        catalog: &Catalog,
        result: &'a CalculationResult,
        current: &'a StatsTable,
        target: &'a StatsTable,
        generated_at: String,
    ) -> Self {
        PlanExport {
            calculation_result: result,
            current_evs: current,
            target_evs: target,
            plan_text_summary: format_plan_text(catalog, result, current, target),
            generated_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Item counts per category plus the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub vitamins: u32,
    pub mochi: u32,
    pub feathers: u32,
    pub total: u32,
}

/// Counts the items owned in each category. Unknown ids are ignored.
pub fn inventory_summary(catalog: &Catalog, inventory: &Inventory) -> InventorySummary {
    let mut summary = InventorySummary::default();
    for item in catalog.items() {
        let count = inventory.get(&item.id).copied().unwrap_or(0);
        match item.category {
            ItemCategory::Vitamin => summary.vitamins += count,
            ItemCategory::Mochi => summary.mochi += count,
            ItemCategory::Feather => summary.feathers += count,
        }
        summary.total += count;
    }
    summary
}

/// Prints a short inventory overview to stdout.
pub fn display_inventory_summary(catalog: &Catalog, inventory: &Inventory) {
    let summary = inventory_summary(catalog, inventory);
    println!("Inventory:");
    println!("  Vitamins:  {}", summary.vitamins);
    println!("  Mochi:     {}", summary.mochi);
    println!("  Feathers:  {}", summary.feathers);
    println!("  Total:     {}", summary.total);
}

/// Displays the complete plan to stdout.
///
/// This function prints:
/// - Per-stat progress with the items to use
/// - The shopping list or the shortfall
/// - Warnings and the overall status
pub fn display_results(
    catalog: &Catalog,
    result: &CalculationResult,
    current: &StatsTable,
    target: &StatsTable,
) {
    println!();
    println!("+================================================================+");
    println!("|                      EV TRAINING PLAN                          |");
    println!("+================================================================+");
    println!();

    println!("[STAT BREAKDOWN]");
    println!("----------------------------------------------------------------");
    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>8}",
        "Stat", "Current", "Target", "Gained", "Missing"
    );
    println!("----------------------------------------------------------------");
    for stat in Stat::ALL {
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>8}",
            stat.display_name(),
            current.get(stat),
            target.get(stat),
            format!("+{}", result.evs_gained_per_stat.get(stat)),
            result.evs_still_needed.get(stat)
        );
    }

    if !result.item_usage_details.is_empty() {
        println!();
        println!("[ITEMS TO USE]");
        println!("----------------------------------------------------------------");
        for (i, usage) in result.item_usage_details.iter().enumerate() {
            let marker = category_marker(catalog.get(&usage.item_id).map(|item| item.category));
            match usage.source {
                UsageSource::Inventory => println!(
                    "  Step {}: Use {} x {} {} on {} (+{} EVs)",
                    i + 1,
                    usage.quantity,
                    marker,
                    usage.item_name,
                    usage.stat,
                    usage.evs_gained
                ),
                UsageSource::Purchase => println!(
                    "  Step {}: Buy and use {} x {} {} on {} (+{} EVs)",
                    i + 1,
                    usage.quantity,
                    marker,
                    usage.item_name,
                    usage.stat,
                    usage.evs_gained
                ),
            }
        }
    }

    if result.purchase_attempted {
        println!();
        println!("[PURCHASE]");
        println!("----------------------------------------------------------------");
        println!(
            "  Total Cost:       {} LP/$",
            format_number(result.total_purchase_cost.unwrap_or(0))
        );
        match (result.funds_used, result.monetary_shortfall) {
            (Some(used), _) => {
                println!(
                    "  Paid With:        {} LP, {} $",
                    format_number(used.lp),
                    format_number(used.pd)
                );
                println!(
                    "  Funds Left:       {} LP, {} $",
                    format_number(result.remaining_league_points),
                    format_number(result.remaining_poke_dollars)
                );
            }
            (None, Some(shortfall)) => {
                println!("  Shortfall:        {} LP/$", format_number(shortfall));
            }
            (None, None) => {}
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("[WARNINGS]");
        println!("----------------------------------------------------------------");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    println!("[STATUS] {}", result.overall_status_message);
    println!();
}
