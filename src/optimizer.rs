//! EV allocation and purchase planning.
//!
//! This module contains the core planning logic. [`allocate`] spends the
//! player's inventory stat by stat, [`plan_purchase`] prices the Vitamins
//! needed to close what is left and splits the cost between the two
//! currencies, and [`calculate`] merges both into a [`CalculationResult`].
//!
//! Everything here is a pure function of its arguments: inputs are borrowed,
//! working copies are fresh per call, and no step can fail.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use log::debug;

use crate::display::format_number;
use crate::models::{
    CalculationInput, CalculationResult, Catalog, CurrencyPriority, Funds, FundsUsed, Inventory,
    Item, ItemCategory, ItemSortOrders, ItemUsage, PlanStatus, Stat, StatsTable, UsageSource,
    VITAMIN_COST,
};

/// Outcome of spending inventory on the stat gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// EVs gained per stat from owned items
    pub gained_per_stat: StatsTable,
    /// Working inventory after all stats were processed
    pub remaining_inventory: Inventory,
    /// One record per (stat, item) consumption, in processing order
    pub usage_details: Vec<ItemUsage>,
    /// Quantity consumed per item id
    pub items_used: BTreeMap<String, u32>,
    /// EVs each stat still needs after inventory
    pub residual_need: StatsTable,
}

/// How a purchase was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseDecision {
    /// Nothing had to be bought.
    NotNeeded,
    /// The purchase went through.
    Funded { funds_used: FundsUsed, remaining: Funds },
    /// The player cannot afford it; balances are untouched.
    Shortfall { amount: u64 },
}

/// Outcome of pricing and paying for the Vitamins left to buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// Vitamins wanted, by item id, in the order they were first needed
    pub wanted: Vec<(String, u32)>,
    pub total_cost: u64,
    pub decision: PurchaseDecision,
    /// EVs gained from purchased items (all zero unless funded)
    pub gained_per_stat: StatsTable,
    /// Purchase records, empty unless funded
    pub usage_details: Vec<ItemUsage>,
    /// Stats with residual need but no purchasable Vitamin in the catalog
    pub unpurchasable: Vec<Stat>,
}

impl PurchaseOutcome {
    /// Balances after the purchase, or `funds` unchanged.
    pub fn balances_after(&self, funds: Funds) -> Funds {
        match self.decision {
            PurchaseDecision::Funded { remaining, .. } => remaining,
            _ => funds,
        }
    }

    fn wanted_map(&self) -> BTreeMap<String, u32> {
        self.wanted.iter().cloned().collect()
    }
}

/// Orders the candidate items for one stat.
///
/// Higher yield first, Vitamins before other categories on equal yield,
/// then the user's order within the item's category, then catalog order.
/// Items not listed in their category's order sort after the listed ones.
fn candidates_for_stat<'a>(
    catalog: &'a Catalog,
    stat: Stat,
    sort_orders: &ItemSortOrders,
) -> Vec<&'a Item> {
    let mut candidates: Vec<(usize, &Item)> = catalog
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| item.affected_stat == stat)
        .collect();

    candidates.sort_by_key(|&(catalog_index, item)| {
        let user_rank = sort_orders
            .get(&item.category)
            .and_then(|ids| ids.iter().position(|id| *id == item.id))
            .unwrap_or(usize::MAX);
        (
            Reverse(item.ev_gain),
            item.category != ItemCategory::Vitamin,
            user_rank,
            catalog_index,
        )
    });

    candidates.into_iter().map(|(_, item)| item).collect()
}

/// Spends owned items on each stat's gap, in stat order.
///
/// For every stat the gap is `max(0, target - current)`. Candidates are
/// walked in priority order and each contributes
/// `min(floor(need / ev_gain), available)` units, so a stat never gains more
/// than it needs. Items with no yield are skipped. The working inventory is
/// shared across stats, and the caller's inventory is left untouched.
///
/// # Example
///
/// ```
/// use evplan::data::embedded_catalog;
/// use evplan::models::{Inventory, ItemSortOrders, Stat, StatsTable};
/// use evplan::optimizer::allocate;
///
/// let catalog = embedded_catalog();
/// let current = StatsTable::default();
/// let target = StatsTable::from_array([0, 252, 0, 0, 0, 0]);
/// let inventory: Inventory = [("protein".to_string(), 30)].into_iter().collect();
///
/// let allocation = allocate(&catalog, &current, &target, &inventory, &ItemSortOrders::new());
/// assert_eq!(allocation.gained_per_stat.get(Stat::Attack), 250);
/// assert_eq!(allocation.remaining_inventory["protein"], 5);
/// assert_eq!(allocation.residual_need.get(Stat::Attack), 2);
/// ```
pub fn allocate(
    catalog: &Catalog,
    current: &StatsTable,
    target: &StatsTable,
    inventory: &Inventory,
    sort_orders: &ItemSortOrders,
) -> Allocation {
    let mut working = inventory.clone();
    let mut gained_per_stat = StatsTable::default();
    let mut residual_need = StatsTable::default();
    let mut usage_details = Vec::new();
    let mut items_used: BTreeMap<String, u32> = BTreeMap::new();

    for stat in Stat::ALL {
        let mut need = target.get(stat).saturating_sub(current.get(stat));
        if need == 0 {
            continue;
        }

        for item in candidates_for_stat(catalog, stat, sort_orders) {
            if need == 0 {
                break;
            }
            if item.ev_gain == 0 {
                continue;
            }
            let available = working.get(&item.id).copied().unwrap_or(0);
            if available == 0 {
                continue;
            }

            let use_count = (need / item.ev_gain).min(available);
            if use_count == 0 {
                continue;
            }

            let gained = use_count * item.ev_gain;
            *gained_per_stat.get_mut(stat) += gained;
            need -= gained;
            working.insert(item.id.clone(), available - use_count);
            *items_used.entry(item.id.clone()).or_insert(0) += use_count;
            debug!(
                "{}: using {} x {} from inventory (+{} EVs, {} left to go)",
                stat, use_count, item.name, gained, need
            );
            usage_details.push(ItemUsage {
                stat,
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                quantity: use_count,
                evs_gained: gained,
                source: UsageSource::Inventory,
            });
        }

        residual_need.set(stat, need);
    }

    Allocation {
        gained_per_stat,
        remaining_inventory: working,
        usage_details,
        items_used,
        residual_need,
    }
}

/// Splits `cost` between the two balances, priority currency first.
///
/// The caller guarantees the combined balance covers the cost.
fn split_payment(cost: u64, funds: Funds, priority: CurrencyPriority) -> (FundsUsed, Funds) {
    let (first_balance, second_balance) = match priority {
        CurrencyPriority::Lp => (funds.league_points, funds.poke_dollars),
        CurrencyPriority::Pd => (funds.poke_dollars, funds.league_points),
    };
    let from_first = cost.min(first_balance);
    let from_second = (cost - from_first).min(second_balance);

    let funds_used = match priority {
        CurrencyPriority::Lp => FundsUsed {
            lp: from_first,
            pd: from_second,
        },
        CurrencyPriority::Pd => FundsUsed {
            lp: from_second,
            pd: from_first,
        },
    };
    let remaining = Funds {
        league_points: funds.league_points - funds_used.lp,
        poke_dollars: funds.poke_dollars - funds_used.pd,
    };
    (funds_used, remaining)
}

/// Prices the Vitamins needed for the residual gaps and pays for them.
///
/// Each stat with residual need buys `ceil(residual / ev_gain)` of its
/// Vitamin at [`VITAMIN_COST`] each, and gains at most its residual. The
/// purchase goes through only if both
/// balances together cover the full cost; otherwise nothing is deducted and
/// the difference is reported as a shortfall.
///
/// # Example
///
/// ```
/// use evplan::data::embedded_catalog;
/// use evplan::models::{CurrencyPriority, Funds, StatsTable};
/// use evplan::optimizer::{plan_purchase, PurchaseDecision};
///
/// let catalog = embedded_catalog();
/// let residual = StatsTable::from_array([0, 0, 0, 0, 6, 0]);
/// let funds = Funds { league_points: 20_000, poke_dollars: 0 };
///
/// let outcome = plan_purchase(&catalog, &residual, funds, CurrencyPriority::Lp);
/// assert_eq!(outcome.total_cost, 10_000);
/// assert!(matches!(outcome.decision, PurchaseDecision::Funded { .. }));
/// ```
pub fn plan_purchase(
    catalog: &Catalog,
    residual: &StatsTable,
    funds: Funds,
    priority: CurrencyPriority,
) -> PurchaseOutcome {
    let mut wanted: Vec<(String, u32)> = Vec::new();
    let mut total_cost: u64 = 0;
    let mut unpurchasable = Vec::new();

    for (stat, need) in residual.iter() {
        if need == 0 {
            continue;
        }
        let Some(vitamin) = catalog.vitamin_for(stat).filter(|v| v.ev_gain > 0) else {
            debug!("{}: no purchasable Vitamin, {} EVs stay unmet", stat, need);
            unpurchasable.push(stat);
            continue;
        };

        let quantity = need.div_ceil(vitamin.ev_gain);
        match wanted.iter_mut().find(|(id, _)| *id == vitamin.id) {
            Some((_, existing)) => *existing += quantity,
            None => wanted.push((vitamin.id.clone(), quantity)),
        }
        total_cost = total_cost.saturating_add(u64::from(quantity) * VITAMIN_COST);
    }

    let mut outcome = PurchaseOutcome {
        wanted,
        total_cost,
        decision: PurchaseDecision::NotNeeded,
        gained_per_stat: StatsTable::default(),
        usage_details: Vec::new(),
        unpurchasable,
    };

    if total_cost == 0 {
        return outcome;
    }

    if funds.total() < total_cost {
        let amount = total_cost - funds.total();
        debug!("Cannot afford {} for Vitamins, short by {}", total_cost, amount);
        outcome.decision = PurchaseDecision::Shortfall { amount };
        return outcome;
    }

    let (funds_used, remaining) = split_payment(total_cost, funds, priority);
    debug!(
        "Buying Vitamins for {} (LP {}, $ {})",
        total_cost, funds_used.lp, funds_used.pd
    );
    outcome.decision = PurchaseDecision::Funded {
        funds_used,
        remaining,
    };

    for (id, quantity) in &outcome.wanted {
        let Some(item) = catalog.get(id) else {
            continue;
        };
        // The last Vitamin may overshoot; only the residual counts as gained.
        let gained = quantity
            .saturating_mul(item.ev_gain)
            .min(residual.get(item.affected_stat));
        *outcome.gained_per_stat.get_mut(item.affected_stat) += gained;
        outcome.usage_details.push(ItemUsage {
            stat: item.affected_stat,
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            quantity: *quantity,
            evs_gained: gained,
            source: UsageSource::Purchase,
        });
    }

    outcome
}

/// Picks the summary status. Rules are checked in priority order.
fn plan_status(
    total_needed: u32,
    purchase: &PurchaseOutcome,
    all_goals_met: bool,
    any_usage: bool,
) -> PlanStatus {
    let purchase_attempted = purchase.total_cost > 0;
    let shortfall = matches!(purchase.decision, PurchaseDecision::Shortfall { .. });

    if total_needed == 0 {
        PlanStatus::NothingNeeded
    } else if !purchase_attempted && all_goals_met && !any_usage {
        // Cannot fire while `total_needed > 0`; listed to keep the cascade complete.
        PlanStatus::AlreadyMet
    } else if !purchase_attempted && all_goals_met {
        PlanStatus::MetFromInventory
    } else if purchase_attempted && !shortfall && all_goals_met {
        PlanStatus::MetWithPurchases
    } else if shortfall {
        PlanStatus::InsufficientFunds
    } else if !purchase_attempted {
        PlanStatus::UnmetWithoutPurchase
    } else {
        PlanStatus::PartiallyMet
    }
}

/// Computes the full plan for one set of inputs.
///
/// Inventory is spent first via [`allocate`], the remainder is priced and
/// paid for via [`plan_purchase`], and the two are merged. Unmet goals and
/// unaffordable purchases are reported in the result's fields and warnings.
///
/// # Example
///
/// ```
/// use evplan::data::embedded_catalog;
/// use evplan::models::{CalculationInput, PlanStatus, StatsTable};
/// use evplan::optimizer::calculate;
///
/// let catalog = embedded_catalog();
/// let input = CalculationInput {
///     target_evs: StatsTable::from_array([0, 0, 0, 0, 0, 20]),
///     current_league_points: 50_000,
///     ..Default::default()
/// };
///
/// let result = calculate(&catalog, &input);
/// assert_eq!(result.status, PlanStatus::MetWithPurchases);
/// assert_eq!(result.items_to_use["carbos"], 2);
/// assert_eq!(result.remaining_league_points, 30_000);
/// ```
pub fn calculate(catalog: &Catalog, input: &CalculationInput) -> CalculationResult {
    let funds = input.funds();
    let needed = input.current_evs.needed_to_reach(&input.target_evs);

    let allocation = allocate(
        catalog,
        &input.current_evs,
        &input.target_evs,
        &input.inventory,
        &input.item_sort_orders,
    );
    let purchase = plan_purchase(
        catalog,
        &allocation.residual_need,
        funds,
        input.currency_priority,
    );

    let mut evs_gained_per_stat = allocation.gained_per_stat;
    for stat in Stat::ALL {
        *evs_gained_per_stat.get_mut(stat) += purchase.gained_per_stat.get(stat);
    }

    let mut items_to_use = allocation.items_used;
    for usage in &purchase.usage_details {
        *items_to_use.entry(usage.item_id.clone()).or_insert(0) += usage.quantity;
    }

    let mut item_usage_details = allocation.usage_details;
    item_usage_details.extend(purchase.usage_details.iter().cloned());

    let mut evs_still_needed = StatsTable::default();
    for stat in Stat::ALL {
        let still = needed
            .get(stat)
            .saturating_sub(evs_gained_per_stat.get(stat));
        evs_still_needed.set(stat, still);
    }

    let mut warnings = Vec::new();
    if let PurchaseDecision::Shortfall { amount } = purchase.decision {
        warnings.push(format!(
            "You are short {} LP/$ for required Vitamins.",
            format_number(amount)
        ));
    }
    for (stat, still) in evs_still_needed.iter() {
        if still > 0 {
            warnings.push(format!("Still need {} EVs for {}.", still, stat));
        }
    }
    for stat in &purchase.unpurchasable {
        warnings.push(format!("No purchasable Vitamin available for {}.", stat));
    }

    let status = plan_status(
        needed.total(),
        &purchase,
        evs_still_needed.total() == 0,
        !item_usage_details.is_empty(),
    );

    let balances = purchase.balances_after(funds);
    let (vitamins_to_purchase, funds_used, monetary_shortfall, item_shortfall) =
        match purchase.decision {
            PurchaseDecision::NotNeeded => (None, None, None, None),
            PurchaseDecision::Funded { funds_used, .. } => {
                (Some(purchase.wanted_map()), Some(funds_used), None, None)
            }
            PurchaseDecision::Shortfall { amount } => {
                (None, None, Some(amount), Some(purchase.wanted_map()))
            }
        };

    CalculationResult {
        items_to_use,
        item_usage_details,
        remaining_inventory: allocation.remaining_inventory,
        evs_gained_per_stat,
        evs_still_needed,
        warnings,
        overall_status_message: status.message().to_string(),
        status,
        vitamins_to_purchase,
        total_purchase_cost: (purchase.total_cost > 0).then_some(purchase.total_cost),
        funds_used,
        remaining_league_points: balances.league_points,
        remaining_poke_dollars: balances.poke_dollars,
        monetary_shortfall,
        item_shortfall,
        purchase_attempted: purchase.total_cost > 0,
    }
}

/// Applies a finished plan to the player's state.
///
/// Every catalog item takes its post-plan quantity from
/// `result.remaining_inventory` (items the plan never touched keep their
/// quantity from `inventory`). Balances change only when the plan's
/// purchase went through.
///
/// # Returns
///
/// The updated inventory and balances.
pub fn apply_result(
    catalog: &Catalog,
    result: &CalculationResult,
    inventory: &Inventory,
) -> (Inventory, Funds) {
    let mut updated = inventory.clone();
    for item in catalog.items() {
        let quantity = result
            .remaining_inventory
            .get(&item.id)
            .or_else(|| inventory.get(&item.id))
            .copied()
            .unwrap_or(0);
        updated.insert(item.id.clone(), quantity);
    }

    let funds = Funds {
        league_points: result.remaining_league_points,
        poke_dollars: result.remaining_poke_dollars,
    };
    (updated, funds)
}
