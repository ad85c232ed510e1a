//! Data models and structures for evplan.
//!
//! This module contains the core data structures used throughout the crate:
//! stats and stat tables, the item catalog, inventories, calculation inputs
//! and the calculation result consumed by display code.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum EVs a single stat can hold.
pub const MAX_EV_PER_STAT: u32 = 252;

/// Maximum EVs across all six stats.
pub const MAX_TOTAL_EVS: u32 = 510;

/// Price of one Vitamin, payable in League Points or Poké Dollars.
pub const VITAMIN_COST: u64 = 10_000;

/// One of the six trainable stats.
///
/// The declaration order is the iteration order used everywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    #[serde(rename = "HP")]
    Hp,
    #[serde(rename = "Attack")]
    Attack,
    #[serde(rename = "Defense")]
    Defense,
    #[serde(rename = "Sp. Attack", alias = "SpAttack")]
    SpAttack,
    #[serde(rename = "Sp. Defense", alias = "SpDefense")]
    SpDefense,
    #[serde(rename = "Speed")]
    Speed,
}

impl Stat {
    /// All stats in their fixed order.
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpAttack,
        Stat::SpDefense,
        Stat::Speed,
    ];

    /// Human readable name, as used in warnings and plan text.
    pub fn display_name(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpAttack => "Sp. Attack",
            Stat::SpDefense => "Sp. Defense",
            Stat::Speed => "Speed",
        }
    }

    /// Abbreviation used by Showdown team exports.
    pub fn showdown_abbrev(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Attack => "Atk",
            Stat::Defense => "Def",
            Stat::SpAttack => "SpA",
            Stat::SpDefense => "SpD",
            Stat::Speed => "Spe",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A value for every stat.
///
/// Missing fields deserialize as 0, so a table is always fully populated.
///
/// # Example
///
/// ```
/// use evplan::models::{Stat, StatsTable};
///
/// let mut table = StatsTable::default();
/// table.set(Stat::Speed, 252);
/// *table.get_mut(Stat::Attack) += 10;
///
/// assert_eq!(table.get(Stat::Speed), 252);
/// assert_eq!(table.total(), 262);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsTable {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl StatsTable {
    /// Builds a table from values given in stat order.
    pub fn from_array(values: [u32; 6]) -> Self {
        let [hp, attack, defense, sp_attack, sp_defense, speed] = values;
        StatsTable {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAttack => self.sp_attack,
            Stat::SpDefense => self.sp_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut u32 {
        match stat {
            Stat::Hp => &mut self.hp,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpAttack => &mut self.sp_attack,
            Stat::SpDefense => &mut self.sp_defense,
            Stat::Speed => &mut self.speed,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        *self.get_mut(stat) = value;
    }

    /// Sum over all six stats, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        Stat::ALL
            .iter()
            .fold(0u32, |acc, &s| acc.saturating_add(self.get(s)))
    }

    /// Iterates `(stat, value)` pairs in stat order.
    pub fn iter(&self) -> impl Iterator<Item = (Stat, u32)> + '_ {
        Stat::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    /// Per-stat gap `max(0, target - self)`.
    pub fn needed_to_reach(&self, target: &StatsTable) -> StatsTable {
        let mut need = StatsTable::default();
        for stat in Stat::ALL {
            need.set(stat, target.get(stat).saturating_sub(self.get(stat)));
        }
        need
    }

    /// Returns a copy with `stat` set to `value`, respecting both EV caps.
    ///
    /// The value is first clamped to [`MAX_EV_PER_STAT`]. If the new total
    /// exceeds [`MAX_TOTAL_EVS`], the edited stat absorbs the overflow.
    ///
    /// ```
    /// use evplan::models::{Stat, StatsTable};
    ///
    /// let table = StatsTable::from_array([0, 252, 0, 0, 6, 0]);
    /// let edited = table.with_target(Stat::Speed, 252);
    /// assert_eq!(edited.get(Stat::Speed), 252);
    ///
    /// let over = edited.with_target(Stat::Hp, 100);
    /// assert_eq!(over.get(Stat::Hp), 0);
    /// ```
    pub fn with_target(&self, stat: Stat, value: u32) -> StatsTable {
        let mut edited = *self;
        edited.set(stat, value.min(MAX_EV_PER_STAT));
        let total = edited.total();
        if total > MAX_TOTAL_EVS {
            let overflow = total - MAX_TOTAL_EVS;
            let clamped = edited.get(stat).saturating_sub(overflow);
            edited.set(stat, clamped);
        }
        edited
    }

    /// Returns a copy that respects both EV caps.
    ///
    /// Stats are visited in stat order; each is clamped to
    /// [`MAX_EV_PER_STAT`] and then to whatever is left of [`MAX_TOTAL_EVS`].
    ///
    /// ```
    /// use evplan::models::StatsTable;
    ///
    /// let raw = StatsTable::from_array([300, 252, 100, 0, 0, 4]);
    /// assert_eq!(raw.clamped(), StatsTable::from_array([252, 252, 6, 0, 0, 0]));
    /// ```
    pub fn clamped(&self) -> StatsTable {
        let mut capped = StatsTable::default();
        let mut remaining = MAX_TOTAL_EVS;
        for (stat, value) in self.iter() {
            let value = value.min(MAX_EV_PER_STAT).min(remaining);
            capped.set(stat, value);
            remaining -= value;
        }
        capped
    }
}

/// Category an item belongs to. Ordering follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Vitamin,
    Mochi,
    Feather,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 3] = [
        ItemCategory::Vitamin,
        ItemCategory::Mochi,
        ItemCategory::Feather,
    ];

    /// Section title used in plan text and inventory summaries.
    pub fn plural(self) -> &'static str {
        match self {
            ItemCategory::Vitamin => "Vitamins",
            ItemCategory::Mochi => "Mochi",
            ItemCategory::Feather => "Feathers",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemCategory::Vitamin => "Vitamin",
            ItemCategory::Mochi => "Mochi",
            ItemCategory::Feather => "Feather",
        };
        f.write_str(name)
    }
}

/// A consumable that raises a single stat by a flat amount.
///
/// # Example
///
/// ```
/// use evplan::models::{Item, ItemCategory, Stat};
///
/// let protein = Item {
///     id: "protein".to_string(),
///     name: "Protein".to_string(),
///     category: ItemCategory::Vitamin,
///     affected_stat: Stat::Attack,
///     ev_gain: 10,
///     sprite: "protein".to_string(),
/// };
/// assert!(protein.is_vitamin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique key (e.g., "hp-up", "swift-feather")
    pub id: String,
    /// Display name
    pub name: String,
    pub category: ItemCategory,
    /// The one stat this item raises
    pub affected_stat: Stat,
    /// EVs gained per unit consumed
    pub ev_gain: u32,
    /// Sprite reference for front-ends; unused by the planner
    pub sprite: String,
}

impl Item {
    pub fn is_vitamin(&self) -> bool {
        self.category == ItemCategory::Vitamin
    }
}

/// Errors raised while building a [`Catalog`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog item has an empty id (row {0})")]
    EmptyId(usize),
    #[error("duplicate catalog item id '{0}'")]
    DuplicateId(String),
}

/// Immutable, ordered list of every known item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Validates and wraps a list of items, preserving their order.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        for (index, item) in items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(index + 1));
            }
            if items[..index].iter().any(|other| other.id == item.id) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Catalog { items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items raising `stat`, in catalog order.
    pub fn items_for_stat(&self, stat: Stat) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(move |item| item.affected_stat == stat)
    }

    /// Items in `category`, in catalog order.
    pub fn items_in_category(&self, category: ItemCategory) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(move |item| item.category == category)
    }

    /// The purchasable Vitamin for `stat`, if the catalog has one.
    pub fn vitamin_for(&self, stat: Stat) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.is_vitamin() && item.affected_stat == stat)
    }

    /// Catalog declaration order for every category.
    pub fn default_sort_orders(&self) -> ItemSortOrders {
        ItemCategory::ALL
            .iter()
            .map(|&category| {
                let ids = self
                    .items_in_category(category)
                    .map(|item| item.id.clone())
                    .collect();
                (category, ids)
            })
            .collect()
    }

    /// A category's items in the user's order, with unlisted items appended
    /// in catalog order and unknown ids ignored.
    pub fn ordered_category_items(
        &self,
        category: ItemCategory,
        sort_orders: &ItemSortOrders,
    ) -> Vec<&Item> {
        let mut ordered: Vec<&Item> = sort_orders
            .get(&category)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.get(id))
                    .filter(|item| item.category == category)
                    .collect()
            })
            .unwrap_or_default();
        for item in self.items_in_category(category) {
            if !ordered.iter().any(|o| o.id == item.id) {
                ordered.push(item);
            }
        }
        ordered
    }
}

/// Quantity owned per item id. Ids that are absent count as zero.
pub type Inventory = BTreeMap<String, u32>;

/// Per-category consumption preference (item ids in priority order).
pub type ItemSortOrders = BTreeMap<ItemCategory, Vec<String>>;

/// Which currency pays for Vitamins first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPriority {
    /// League Points first
    #[default]
    Lp,
    /// Poké Dollars first
    Pd,
}

/// Balances of both currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funds {
    pub league_points: u64,
    pub poke_dollars: u64,
}

impl Funds {
    pub fn total(&self) -> u64 {
        self.league_points.saturating_add(self.poke_dollars)
    }
}

/// Amount of each currency spent on a purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsUsed {
    pub lp: u64,
    pub pd: u64,
}

/// Where the items of a usage record come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageSource {
    Inventory,
    Purchase,
}

/// One line of the plan: use `quantity` of an item on `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUsage {
    pub stat: Stat,
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub evs_gained: u32,
    pub source: UsageSource,
}

/// Everything a calculation needs. Only the two stat tables are required
/// when deserializing; the rest default to empty inventory, catalog order,
/// no funds and League Points first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub current_evs: StatsTable,
    pub target_evs: StatsTable,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub item_sort_orders: ItemSortOrders,
    #[serde(default)]
    pub current_league_points: u64,
    #[serde(default)]
    pub current_poke_dollars: u64,
    #[serde(default)]
    pub currency_priority: CurrencyPriority,
}

impl CalculationInput {
    /// Copy of the input with both stat tables run through [`StatsTable::clamped`].
    pub fn with_capped_evs(&self) -> CalculationInput {
        CalculationInput {
            current_evs: self.current_evs.clamped(),
            target_evs: self.target_evs.clamped(),
            ..self.clone()
        }
    }

    pub fn funds(&self) -> Funds {
        Funds {
            league_points: self.current_league_points,
            poke_dollars: self.current_poke_dollars,
        }
    }
}

/// Summary outcome of a calculation. Variants are listed in the order they
/// are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    NothingNeeded,
    AlreadyMet,
    MetFromInventory,
    MetWithPurchases,
    InsufficientFunds,
    UnmetWithoutPurchase,
    PartiallyMet,
}

impl PlanStatus {
    pub fn message(self) -> &'static str {
        match self {
            PlanStatus::NothingNeeded => {
                "No EV changes targeted or goals already met. No items needed."
            }
            PlanStatus::AlreadyMet => "EV goals already met. No items needed.",
            PlanStatus::MetFromInventory => "Successfully calculated item usage from inventory!",
            PlanStatus::MetWithPurchases => {
                "Successfully calculated item usage, including purchases!"
            }
            PlanStatus::InsufficientFunds => "Insufficient funds to purchase all needed Vitamins.",
            PlanStatus::UnmetWithoutPurchase => {
                "Could not meet all EV goals with available inventory."
            }
            PlanStatus::PartiallyMet => {
                "Met some EV goals with purchases, but some targets still not fully achieved."
            }
        }
    }
}

/// The complete plan produced by [`crate::optimizer::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Inventory and purchased quantities merged per item id
    pub items_to_use: BTreeMap<String, u32>,
    /// Ordered usage records; inventory records first, then purchases
    pub item_usage_details: Vec<ItemUsage>,
    /// Inventory after consuming owned items, before any purchase
    pub remaining_inventory: Inventory,
    pub evs_gained_per_stat: StatsTable,
    pub evs_still_needed: StatsTable,
    pub warnings: Vec<String>,
    pub overall_status_message: String,
    pub status: PlanStatus,
    /// Set only when the purchase went through
    pub vitamins_to_purchase: Option<BTreeMap<String, u32>>,
    /// Set whenever something had to be bought, affordable or not
    pub total_purchase_cost: Option<u64>,
    pub funds_used: Option<FundsUsed>,
    /// Post-purchase balances, or the input balances when nothing was bought
    pub remaining_league_points: u64,
    pub remaining_poke_dollars: u64,
    pub monetary_shortfall: Option<u64>,
    /// Vitamins that were needed but could not be afforded
    pub item_shortfall: Option<BTreeMap<String, u32>>,
    pub purchase_attempted: bool,
}

impl CalculationResult {
    /// True when every stat reached its target.
    pub fn all_goals_met(&self) -> bool {
        self.evs_still_needed.total() == 0
    }

    /// Total number of items used or bought.
    pub fn total_items_used(&self) -> u32 {
        self.items_to_use.values().sum()
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for the item catalog.
#[derive(Debug, Deserialize)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub stat: Stat,
    pub ev_gain: u32,
    #[serde(default)]
    pub sprite: Option<String>,
}

impl From<CatalogRow> for Item {
    fn from(row: CatalogRow) -> Self {
        let sprite = row
            .sprite
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| row.id.clone());
        Item {
            id: row.id,
            name: row.name,
            category: row.category,
            affected_stat: row.stat,
            ev_gain: row.ev_gain,
            sprite,
        }
    }
}
